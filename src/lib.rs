//! Hustle - street combat core for a life-simulation game.
//!
//! Turn-based fights (`combat`), the encounters that start them
//! (`encounters`), and what happens afterwards (`consequences`), driven by a
//! fixed 100 ms tick (`core::Game`). The rest of the game is reached only
//! through the collaborator traits in `world`.

pub mod build_info;
pub mod combat;
pub mod consequences;
pub mod core;
pub mod encounters;
pub mod utils;
pub mod world;
