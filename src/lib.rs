//! Cambium Agent - control core of a game-playing bot
//!
//! Strategies are scheduled once per host frame, observations are sampled from
//! the world, a remote policy turns them into inputs, and training rewards are
//! detected and reported alongside.

pub mod agent;
pub mod bridge;
pub mod core;
pub mod effector;
pub mod governor;
pub mod host;
pub mod observation;
pub mod reward;
pub mod service;
pub mod strategy;

pub use agent::Agent;
