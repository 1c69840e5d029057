//! Shared engine: clock and scheduler, events, config, errors and the game orchestrator.

#![allow(unused_imports)]

pub mod config;
pub mod constants;
pub mod error;
pub mod events;
pub mod game;
pub mod rng;
pub mod scheduler;

pub use config::*;
pub use error::*;
pub use events::*;
pub use game::*;
pub use scheduler::*;
