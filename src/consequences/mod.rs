//! Combat consequences: injuries, reputation, witnesses, grudges and street events.

#![allow(unused_imports)]

pub mod injury;
pub mod logic;
pub mod types;

pub use injury::*;
pub use logic::*;
pub use types::*;
