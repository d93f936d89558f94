//! RP2040-specific adapters for PLTN nodes
//!
//! This crate connects the core seams to embassy-rp:
//! - Buffered UART halves as byte source and sink
//! - Embassy time driver as the core clock
//! - PWM slice configuration shared by motors and LEDs

#![no_std]

pub mod clock;
pub mod pwm;
pub mod uart;

pub use clock::EmbassyClock;
pub use uart::{UartSink, UartSource};
