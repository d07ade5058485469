pub use config::*;
pub use error::*;
pub use id::*;
pub use service::*;

mod config;
mod error;
mod id;
mod service;
pub mod store;
