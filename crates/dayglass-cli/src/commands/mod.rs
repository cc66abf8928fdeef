pub mod chain;
pub mod config;
pub mod events;
pub mod gaps;
pub mod learn;
pub mod pillar;
pub mod stage;
pub mod vibe;
