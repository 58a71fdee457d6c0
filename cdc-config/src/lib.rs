//! Configuration loading and shared configuration types for the CDC services.

mod environment;
mod load;
pub mod shared;

pub use environment::Environment;
pub use load::{Config, ConfigLayer, LoadConfigError, load_config, load_config_from};
