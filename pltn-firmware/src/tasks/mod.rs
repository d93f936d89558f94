//! Embassy async tasks
//!
//! Each role runs a single control task: one node iteration, its log
//! lines, then a short sleep.

pub mod generation;
pub mod visualizer;

pub use generation::generation_task;
pub use visualizer::visualizer_task;
