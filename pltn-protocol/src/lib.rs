//! Node-to-node link protocol
//!
//! Every controller in the plant chain talks to its neighbour over a
//! point-to-point UART using short ASCII frames:
//!
//! ```text
//! <key1:value1;key2:value2;...>\n
//! ```
//!
//! - `<` opens a frame, `>` closes it, the trailing newline is cosmetic
//! - pairs are separated by `;`, key and value by the first `:`
//! - values are non-negative decimal integers
//!
//! There is no length prefix, checksum, sequence number or acknowledgement.
//! A frame that is cut short is simply never delivered, and a garbled
//! value decodes as zero without disturbing the other pairs.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod frame;
pub mod messages;

pub use frame::{
    DecoderStats, Feed, FrameDecoder, FrameError, OverflowPolicy, MAX_FRAME_SIZE,
    MAX_PAYLOAD_SIZE,
};
pub use messages::{
    is_valid_key, pairs, parse_value, Field, Key, Message, KEY_POWER, KEY_PUMP_PRIMARY,
    KEY_PUMP_SECONDARY, KEY_PUMP_TERTIARY, KEY_ROD2, KEY_ROD3, MAX_FIELDS, MAX_KEY_LEN,
};

/// Opens a frame
pub const START_MARKER: u8 = b'<';

/// Closes a frame
pub const END_MARKER: u8 = b'>';

/// Separates key/value pairs inside a payload
pub const PAIR_SEPARATOR: u8 = b';';

/// Separates a key from its value
pub const KEY_VALUE_SEPARATOR: u8 = b':';

/// Appended after every encoded frame
pub const LINE_TERMINATOR: u8 = b'\n';
