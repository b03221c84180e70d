pub mod config;
pub mod module;

pub use config::*;
pub use module::*;
