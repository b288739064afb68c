pub mod configuration;
pub mod db;
pub mod error;
pub mod query;
pub mod quiz;
pub mod server;
pub mod store;
pub mod telemetry;

pub use error::{TriviaError, TriviaResult};
