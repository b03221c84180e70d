pub mod manager;
pub mod platform;
pub mod repository;

pub use manager::*;
pub use platform::*;
pub use repository::*;
