// backup-rs Core - Domain Logic & Ports
// NO infrastructure dependencies: AWS access lives behind port::ObjectStore

pub mod application;
pub mod domain;
pub mod error;
pub mod port;

pub use error::{AppError, Result};
