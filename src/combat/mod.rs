//! Turn-based combat: enemy data, combat math, enemy AI and the combat state machine.

#![allow(unused_imports)]

pub mod ai;
pub mod enemy;
pub mod logic;
pub mod math;
pub mod types;

pub use ai::*;
pub use enemy::*;
pub use logic::*;
pub use math::*;
pub use types::*;
