/// Configuration module - Load and validate client configuration
pub mod schema;
pub mod loader;

pub use schema::ClientConfig;
pub use loader::{load_adjacent_config, load_config};
