//! A chess game that gates content behind a win against a built-in opponent.
//!
//! - [`logic`]: the rules engine boundary.
//! - [`player::ai`]: evaluator, alpha-beta search and skill-based selection.
//! - [`game`]: clocks, timers and the session state machine with its driver.

pub mod config;
pub mod core;
pub mod display;
pub mod game;
pub mod logic;
pub mod player;
