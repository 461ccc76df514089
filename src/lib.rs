pub mod config;
pub mod logging;
pub mod monitor;
pub mod notifications;
pub mod probe;
pub mod version;
