pub mod app;
mod deserializers;
pub mod routes;

pub use app::{router, run_server, AppState};
