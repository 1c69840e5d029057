//! The world the combat core lives in: collaborator contracts and simple implementations.

pub mod memory;
pub mod services;
pub mod types;

pub use memory::*;
pub use services::*;
pub use types::*;
