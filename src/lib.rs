pub mod api;
pub mod cli;
pub mod io;
pub mod model;
pub mod state;
pub mod tui;
pub mod util;
