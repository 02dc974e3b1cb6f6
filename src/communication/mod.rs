//! Wire protocol for advertisement telemetry
//!
//! Two layers, kept separate:
//!
//! - [`frame`] - the advertisement frame layout: 5-byte header (length,
//!   manufacturer-data tag, vendor id, channel) followed by the payload.
//! - [`codec`] - the self-describing value encoding carried in the payload.
//!
//! The frame layer decides whether an advertisement belongs to this protocol
//! at all; the codec never sees foreign traffic.

pub mod codec;
pub mod frame;
