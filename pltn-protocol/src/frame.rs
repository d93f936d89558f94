//! Frame extraction from a raw byte stream
//!
//! The decoder is fed one byte at a time. Outside a frame everything but
//! the start marker is thrown away. Inside a frame bytes accumulate in a
//! fixed-capacity buffer until the end marker arrives, at which point the
//! payload (without markers) is parked as the single pending payload.
//!
//! While a payload is pending the decoder refuses further bytes. Callers
//! reading from a UART should check [`FrameDecoder::is_ready`] first so the
//! bytes stay queued in the transport instead of being consumed and lost.

use heapless::Vec;

use crate::{END_MARKER, START_MARKER};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Maximum payload length held by the decoder
pub const MAX_PAYLOAD_SIZE: usize = 49;

/// Maximum encoded frame size (START + payload + END + newline)
pub const MAX_FRAME_SIZE: usize = 1 + MAX_PAYLOAD_SIZE + 1 + 1;

/// Errors raised when building outbound frames
///
/// Decoding never fails: malformed input is discarded silently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// Output buffer cannot hold the encoded frame
    BufferTooSmall,
    /// Key is empty, too long, or contains a protocol delimiter
    InvalidKey,
    /// Message already holds the maximum number of fields
    TooManyFields,
}

/// What to do with payload bytes that arrive once the buffer is full
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum OverflowPolicy {
    /// Keep the head of the frame, drop the excess, deliver it truncated
    #[default]
    DropIncoming,
    /// Keep the tail of the frame, evicting the oldest buffered byte
    DropOldest,
    /// Abandon the whole frame and skip to its end marker
    Reject,
}

/// Result of feeding one byte to the decoder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Feed {
    /// Byte was outside a frame (or inside a rejected one) and was dropped
    Discarded,
    /// Byte was appended to the open frame
    Accepted,
    /// Buffer was full; the overflow policy was applied
    Overflowed,
    /// End marker closed the frame; a payload is now pending
    Complete,
    /// A payload is already pending; the byte was refused
    Busy,
}

/// Running counters kept by the decoder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DecoderStats {
    /// Payloads delivered
    pub frames: u32,
    /// Frames that hit the capacity limit (counted once per frame)
    pub overflows: u32,
    /// Frames abandoned under [`OverflowPolicy::Reject`]
    pub rejected: u32,
    /// Bytes refused because a payload was still pending
    pub busy_rejections: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DecodeState {
    /// Waiting for a start marker
    Hunting,
    /// Collecting payload bytes
    InFrame,
    /// Skipping the remainder of a rejected frame
    Discarding,
}

/// Byte-at-a-time frame decoder with a bounded payload buffer
#[derive(Debug, Clone)]
pub struct FrameDecoder<const N: usize = MAX_PAYLOAD_SIZE> {
    state: DecodeState,
    buffer: Vec<u8, N>,
    pending: Option<Vec<u8, N>>,
    policy: OverflowPolicy,
    frame_overflowed: bool,
    stats: DecoderStats,
}

impl<const N: usize> Default for FrameDecoder<N> {
    fn default() -> Self {
        Self::new(OverflowPolicy::default())
    }
}

impl<const N: usize> FrameDecoder<N> {
    /// Create a decoder with the given overflow policy
    pub const fn new(policy: OverflowPolicy) -> Self {
        Self {
            state: DecodeState::Hunting,
            buffer: Vec::new(),
            pending: None,
            policy,
            frame_overflowed: false,
            stats: DecoderStats {
                frames: 0,
                overflows: 0,
                rejected: 0,
                busy_rejections: 0,
            },
        }
    }

    /// Counters since power-on
    pub fn stats(&self) -> DecoderStats {
        self.stats
    }

    /// True while a decoded payload waits to be taken
    pub fn is_ready(&self) -> bool {
        self.pending.is_some()
    }

    /// True while a frame is open
    pub fn in_frame(&self) -> bool {
        self.state == DecodeState::InFrame
    }

    /// Take the pending payload, clearing the ready flag
    pub fn take(&mut self) -> Option<Vec<u8, N>> {
        self.pending.take()
    }

    /// Drop any partial frame and pending payload
    pub fn reset(&mut self) {
        self.state = DecodeState::Hunting;
        self.buffer.clear();
        self.pending = None;
        self.frame_overflowed = false;
    }

    /// Feed a single byte
    pub fn feed(&mut self, byte: u8) -> Feed {
        if self.pending.is_some() {
            self.stats.busy_rejections = self.stats.busy_rejections.saturating_add(1);
            return Feed::Busy;
        }

        match self.state {
            DecodeState::Hunting => {
                if byte == START_MARKER {
                    self.buffer.clear();
                    self.frame_overflowed = false;
                    self.state = DecodeState::InFrame;
                    Feed::Accepted
                } else {
                    Feed::Discarded
                }
            }
            DecodeState::InFrame => {
                if byte == END_MARKER {
                    self.complete();
                    Feed::Complete
                } else if self.buffer.push(byte).is_ok() {
                    Feed::Accepted
                } else {
                    self.overflow(byte);
                    Feed::Overflowed
                }
            }
            DecodeState::Discarding => {
                if byte == END_MARKER {
                    self.state = DecodeState::Hunting;
                }
                Feed::Discarded
            }
        }
    }

    /// Feed bytes until a payload becomes ready
    ///
    /// Returns the number of bytes consumed. Bytes after the completing
    /// end marker are left to the caller.
    pub fn feed_bytes(&mut self, bytes: &[u8]) -> usize {
        let mut consumed = 0;
        for &byte in bytes {
            if self.is_ready() {
                break;
            }
            self.feed(byte);
            consumed += 1;
        }
        consumed
    }

    fn complete(&mut self) {
        let mut payload = Vec::new();
        core::mem::swap(&mut payload, &mut self.buffer);
        self.pending = Some(payload);
        self.state = DecodeState::Hunting;
        self.frame_overflowed = false;
        self.stats.frames = self.stats.frames.saturating_add(1);
    }

    fn overflow(&mut self, byte: u8) {
        if !self.frame_overflowed {
            self.frame_overflowed = true;
            self.stats.overflows = self.stats.overflows.saturating_add(1);
        }

        match self.policy {
            OverflowPolicy::DropIncoming => {}
            OverflowPolicy::DropOldest => {
                if !self.buffer.is_empty() {
                    self.buffer.remove(0);
                }
                // Room was just made, unless N == 0
                let _ = self.buffer.push(byte);
            }
            OverflowPolicy::Reject => {
                self.buffer.clear();
                self.state = DecodeState::Discarding;
                self.stats.rejected = self.stats.rejected.saturating_add(1);
            }
        }
    }
}
