pub mod env;
mod loader;

pub use env::{AppConfig, DirectoryConfig};
pub use loader::load_config;
