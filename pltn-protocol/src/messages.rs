//! Key/value messages carried inside frames
//!
//! Parsing is a single full scan over every pair. A field whose value is
//! not a number decodes as zero; it never stops the other fields from
//! being read. Keys the receiver does not know about are kept in the
//! message and simply never looked up.

use core::fmt::{self, Write};

use heapless::{String, Vec};

use crate::frame::{FrameError, MAX_FRAME_SIZE};
use crate::{END_MARKER, KEY_VALUE_SEPARATOR, LINE_TERMINATOR, PAIR_SEPARATOR, START_MARKER};

/// Maximum key length in bytes
pub const MAX_KEY_LEN: usize = 16;

/// Maximum number of distinct fields per message
pub const MAX_FIELDS: usize = 8;

/// Field name
pub type Key = String<MAX_KEY_LEN>;

// Well-known keys
/// Control rod 2 position (0-100)
pub const KEY_ROD2: &str = "rod2";
/// Control rod 3 position (0-100)
pub const KEY_ROD3: &str = "rod3";
/// Power level broadcast by the generation node
pub const KEY_POWER: &str = "pwr";
/// Primary loop pump status
pub const KEY_PUMP_PRIMARY: &str = "pump1";
/// Secondary loop pump status
pub const KEY_PUMP_SECONDARY: &str = "pump2";
/// Tertiary loop pump status
pub const KEY_PUMP_TERTIARY: &str = "pump3";

/// A single key/value pair
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Field {
    pub key: Key,
    pub value: u32,
}

/// An ordered set of fields with unique keys
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Message {
    fields: Vec<Field, MAX_FIELDS>,
}

impl Message {
    /// Create an empty message
    pub const fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// Create a message holding one field
    pub fn single(key: &str, value: u32) -> Result<Self, FrameError> {
        let mut message = Self::new();
        message.insert(key, value)?;
        Ok(message)
    }

    /// Parse a decoded payload (markers already stripped)
    ///
    /// Tokens without a separator, empty keys, oversized keys and keys
    /// containing frame markers are skipped. A repeated key keeps the last
    /// value. Fields past capacity are dropped.
    pub fn parse(payload: &[u8]) -> Self {
        let mut message = Self::new();
        for (key, value) in pairs(payload) {
            let _ = message.insert(key, value);
        }
        message
    }

    /// Set a field, replacing any existing value for the key
    pub fn insert(&mut self, key: &str, value: u32) -> Result<(), FrameError> {
        if !is_valid_key(key) {
            return Err(FrameError::InvalidKey);
        }

        if let Some(field) = self.fields.iter_mut().find(|f| f.key.as_str() == key) {
            field.value = value;
            return Ok(());
        }

        let mut owned = Key::new();
        owned.push_str(key).map_err(|_| FrameError::InvalidKey)?;
        self.fields
            .push(Field { key: owned, value })
            .map_err(|_| FrameError::TooManyFields)
    }

    /// Look up a field value
    pub fn get(&self, key: &str) -> Option<u32> {
        self.fields
            .iter()
            .find(|f| f.key.as_str() == key)
            .map(|f| f.value)
    }

    /// Iterate over fields in arrival order
    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.fields.iter().map(|f| (f.key.as_str(), f.value))
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// True if the message holds no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Encode as a complete frame including the line terminator
    ///
    /// Returns the number of bytes written.
    pub fn encode(&self, buffer: &mut [u8]) -> Result<usize, FrameError> {
        let mut out = SliceWriter::new(buffer);

        out.push(START_MARKER)?;
        for (index, field) in self.fields.iter().enumerate() {
            if index > 0 {
                out.push(PAIR_SEPARATOR)?;
            }
            write!(
                out,
                "{}{}{}",
                field.key,
                KEY_VALUE_SEPARATOR as char,
                field.value
            )
            .map_err(|_| FrameError::BufferTooSmall)?;
        }
        out.push(END_MARKER)?;
        out.push(LINE_TERMINATOR)?;

        Ok(out.written())
    }

    /// Encode into a buffer sized so the receiver's decoder never truncates it
    pub fn encode_to_vec(&self) -> Result<Vec<u8, MAX_FRAME_SIZE>, FrameError> {
        let mut buffer = [0u8; MAX_FRAME_SIZE];
        let len = self.encode(&mut buffer)?;
        let mut vec = Vec::new();
        vec.extend_from_slice(&buffer[..len])
            .map_err(|_| FrameError::BufferTooSmall)?;
        Ok(vec)
    }
}

/// Every well-formed pair of a payload, in arrival order
///
/// Unlike [`Message::parse`] this holds nothing, so a receiver looking for
/// a few keys sees them however many unknown pairs come first. Duplicates
/// are yielded as they appear.
pub fn pairs(payload: &[u8]) -> impl Iterator<Item = (&str, u32)> + '_ {
    payload.split(|&b| b == PAIR_SEPARATOR).filter_map(|token| {
        let split = token.iter().position(|&b| b == KEY_VALUE_SEPARATOR)?;
        let key = core::str::from_utf8(&token[..split]).ok()?;
        is_valid_key(key).then(|| (key, parse_value(&token[split + 1..])))
    })
}

/// Parse a field value
///
/// Leading spaces are skipped, then the leading run of ASCII digits is
/// read. Anything after the digits is ignored. No digits at all yields 0.
/// Values too large for `u32` saturate.
pub fn parse_value(bytes: &[u8]) -> u32 {
    bytes
        .iter()
        .skip_while(|b| b.is_ascii_whitespace())
        .take_while(|b| b.is_ascii_digit())
        .fold(0u32, |acc, &b| {
            acc.saturating_mul(10).saturating_add(u32::from(b - b'0'))
        })
}

/// True if `key` can be carried on the wire unchanged
///
/// Keys are non-empty, at most [`MAX_KEY_LEN`] bytes, and free of frame
/// delimiters.
pub fn is_valid_key(key: &str) -> bool {
    !key.is_empty()
        && key.len() <= MAX_KEY_LEN
        && !key.bytes().any(|b| {
            matches!(
                b,
                START_MARKER | END_MARKER | PAIR_SEPARATOR | KEY_VALUE_SEPARATOR | LINE_TERMINATOR
            )
        })
}

/// `fmt::Write` adapter over a byte slice
struct SliceWriter<'a> {
    buffer: &'a mut [u8],
    pos: usize,
}

impl<'a> SliceWriter<'a> {
    fn new(buffer: &'a mut [u8]) -> Self {
        Self { buffer, pos: 0 }
    }

    fn push(&mut self, byte: u8) -> Result<(), FrameError> {
        let slot = self
            .buffer
            .get_mut(self.pos)
            .ok_or(FrameError::BufferTooSmall)?;
        *slot = byte;
        self.pos += 1;
        Ok(())
    }

    fn written(&self) -> usize {
        self.pos
    }
}

impl Write for SliceWriter<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let end = self.pos + s.len();
        let dest = self.buffer.get_mut(self.pos..end).ok_or(fmt::Error)?;
        dest.copy_from_slice(s.as_bytes());
        self.pos = end;
        Ok(())
    }
}
