//! Frontline - deterministic simulation core for a territorial-conquest game
//!
//! The game advances in ticks. Every change to the world is made by an
//! execution: attacks, constructions, bombs, ships and per-player upkeep
//! are all scheduled and ticked in insertion order, so replaying the same
//! intents from the same seed reproduces the same match.

pub mod core;
pub mod execution;
pub mod game;
pub mod headless;
pub mod map;
pub mod pathfinding;
