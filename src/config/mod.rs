pub mod environment;
pub mod types;

pub use types::HealthConfig;
