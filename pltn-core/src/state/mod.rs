//! Operating states
//!
//! The generation plant runs an explicit, finite, deterministic machine.
//! Visualizers mirror a pump status received over the link.

pub mod events;
pub mod machine;
pub mod pump;

pub use events::Event;
pub use machine::OperatingState;
pub use pump::PumpStatus;
