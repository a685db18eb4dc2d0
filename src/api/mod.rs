pub mod client;
pub mod error;
pub mod http;
pub mod transport;

pub use client::{ApiClient, Backend};
pub use error::ApiError;
pub use http::{HttpClient, HttpRequest, HttpResponse, Method, ReqwestClient};
pub use transport::{Body, Transport};
