//! Enemy encounters: when trouble finds the player, and who shows up.

#![allow(unused_imports)]

pub mod logic;
pub mod tables;
pub mod types;

pub use logic::*;
pub use tables::*;
pub use types::*;
