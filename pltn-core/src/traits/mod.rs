//! Hardware abstraction traits
//!
//! These traits define the interface between the sequencing logic and
//! board-specific implementations. The core never owns a register.

pub mod actuator;
pub mod link;

pub use actuator::{Action, Actuators, Channel, DigitalOutput};
pub use link::{ByteSink, ByteSource, Clock};
