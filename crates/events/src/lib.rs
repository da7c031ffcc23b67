//! Event system for revloop
//!
//! This crate provides the event bus and event types that make a workflow
//! run observable: every cycle, phase, collaborator return, verdict and
//! confirmation exchange is published to subscribers as it happens.

mod bus;
mod types;

pub use bus::EventBus;
pub use types::*;
