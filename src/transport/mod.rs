//! Transport layer: HTTP API and terminal client

pub mod cli;
pub mod errors;
pub mod http;
pub mod protocol;

pub use errors::ApiError;
pub use http::{build_router, run_http_server, AppState};
