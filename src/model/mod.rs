pub mod config;
pub mod goal;
pub mod task;
pub mod user;

pub use config::*;
pub use goal::*;
pub use task::*;
pub use user::*;
