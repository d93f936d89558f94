//! Board-agnostic core logic for PLTN simulator nodes
//!
//! This crate contains everything a node does that does not touch hardware:
//!
//! - Hardware seams (actuators, byte streams, clock)
//! - Threshold-to-power-level derivation
//! - Operating state machines for the generation and visualizer roles
//! - Sequencers that turn inputs and elapsed time into actuator actions
//! - The per-iteration node loop tying decoder, sequencer and broadcaster
//! - Configuration type definitions

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod config;
pub mod inputs;
pub mod mode;
pub mod node;
pub mod sequencer;
pub mod state;
pub mod time;
pub mod traits;

pub use node::{Cycle, Node};
pub use time::{Instant, Interval};
