pub mod config;
pub mod controller;
pub mod environment;
pub mod error;
pub mod logger;
pub mod models;
pub mod panel;
pub mod probe;
pub mod session;
pub mod transport;

#[cfg(test)]
mod testing;

pub use controller::{FormController, Outcome};
pub use error::ClientError;
