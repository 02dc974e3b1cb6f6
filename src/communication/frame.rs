//! Advertisement frame layout
//!
//! Every frame fits in one legacy BLE advertisement (31 bytes) and starts
//! with a 5-byte header:
//!
//! ```text
//! [length] [0xFF] [vendor lo] [vendor hi] [channel] [payload ...]
//! ```
//!
//! `length` counts every byte after itself, so a well-formed frame satisfies
//! `frame.len() - 1 == frame[0]`. The manufacturer-data tag and vendor id
//! distinguish this protocol from unrelated BLE traffic sharing the medium.

/// Maximum size of one advertisement frame (hard BLE limit)
pub const ADV_MAX_SIZE: usize = 31;

/// Header size: length, manufacturer tag, vendor id (2 bytes), channel
pub const ADV_HEADER_SIZE: usize = 5;

/// Maximum encoded payload size per frame
pub const PAYLOAD_MAX_SIZE: usize = ADV_MAX_SIZE - ADV_HEADER_SIZE;

/// Manufacturer-specific data AD type
pub const MANUFACTURER_DATA: u8 = 0xFF;

/// Vendor id marking frames of this protocol (little-endian on the wire)
pub const VENDOR_ID: u16 = 0x0397;

/// Why an inbound advertisement was not accepted as a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// Not this protocol: too short, wrong AD type, or wrong vendor id
    Foreign,
    /// Matches the protocol markers but fails self-consistency checks
    Malformed,
}

impl core::fmt::Display for FrameError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            FrameError::Foreign => write!(f, "not a telemetry frame"),
            FrameError::Malformed => write!(f, "malformed telemetry frame"),
        }
    }
}

/// Validate an inbound advertisement and extract its channel.
///
/// Foreign traffic is expected on a shared medium and reported as
/// [`FrameError::Foreign`]. A frame that carries the protocol markers but
/// whose `length` field disagrees with the actual byte count, or that
/// exceeds the 31-byte ceiling, is [`FrameError::Malformed`]. The size check
/// matters: downstream the frame is copied verbatim into a fixed 31-byte
/// slot.
pub fn validate(data: &[u8]) -> Result<u8, FrameError> {
    let vendor = VENDOR_ID.to_le_bytes();
    if data.len() <= ADV_HEADER_SIZE
        || data[1] != MANUFACTURER_DATA
        || data[2] != vendor[0]
        || data[3] != vendor[1]
    {
        return Err(FrameError::Foreign);
    }
    if data.len() - 1 != data[0] as usize || data.len() > ADV_MAX_SIZE {
        return Err(FrameError::Malformed);
    }
    Ok(data[4])
}

/// Write the 5-byte header for a frame of `total_size` bytes.
///
/// `total_size` includes the header itself and must not exceed
/// [`ADV_MAX_SIZE`]; the caller checks the ceiling before encoding.
pub fn write_header(buf: &mut [u8; ADV_MAX_SIZE], total_size: usize, channel: u8) {
    debug_assert!(total_size >= ADV_HEADER_SIZE && total_size <= ADV_MAX_SIZE);
    let vendor = VENDOR_ID.to_le_bytes();
    buf[0] = (total_size - 1) as u8;
    buf[1] = MANUFACTURER_DATA;
    buf[2] = vendor[0];
    buf[3] = vendor[1];
    buf[4] = channel;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_frame(channel: u8, payload: &[u8]) -> Vec<u8> {
        let total = ADV_HEADER_SIZE + payload.len();
        let mut frame = vec![
            (total - 1) as u8,
            MANUFACTURER_DATA,
            VENDOR_ID.to_le_bytes()[0],
            VENDOR_ID.to_le_bytes()[1],
            channel,
        ];
        frame.extend_from_slice(payload);
        frame
    }

    #[test]
    fn test_validate_accepts_well_formed_frame() {
        let frame = valid_frame(7, &[0x20]);
        assert_eq!(validate(&frame), Ok(7));
    }

    #[test]
    fn test_validate_rejects_short_data() {
        assert_eq!(validate(&[]), Err(FrameError::Foreign));
        // Header-only is not a frame either; a frame carries payload.
        assert_eq!(
            validate(&[4, MANUFACTURER_DATA, 0x97, 0x03, 7]),
            Err(FrameError::Foreign)
        );
    }

    #[test]
    fn test_validate_rejects_wrong_ad_type() {
        let mut frame = valid_frame(7, &[0x20]);
        frame[1] = 0x16; // service data, not manufacturer data
        assert_eq!(validate(&frame), Err(FrameError::Foreign));
    }

    #[test]
    fn test_validate_rejects_wrong_vendor_id() {
        let mut frame = valid_frame(7, &[0x20]);
        frame[2] = 0xEF;
        frame[3] = 0xBE;
        assert_eq!(validate(&frame), Err(FrameError::Foreign));
    }

    #[test]
    fn test_validate_rejects_inconsistent_length_field() {
        let mut frame = valid_frame(7, &[0x20]);
        frame[0] += 1;
        assert_eq!(validate(&frame), Err(FrameError::Malformed));
    }

    #[test]
    fn test_validate_rejects_oversized_frame() {
        let frame = valid_frame(7, &[0u8; 40]);
        assert_eq!(frame.len() - 1, frame[0] as usize);
        assert_eq!(validate(&frame), Err(FrameError::Malformed));
    }

    #[test]
    fn test_write_header_layout() {
        let mut buf = [0u8; ADV_MAX_SIZE];
        write_header(&mut buf, 8, 5);
        assert_eq!(&buf[..ADV_HEADER_SIZE], &[7, 0xFF, 0x97, 0x03, 5]);
    }

    #[test]
    fn test_header_round_trip() {
        let mut buf = [0u8; ADV_MAX_SIZE];
        buf[ADV_HEADER_SIZE] = 0x20; // one empty-string value
        write_header(&mut buf, ADV_HEADER_SIZE + 1, 18);
        assert_eq!(validate(&buf[..ADV_HEADER_SIZE + 1]), Ok(18));
    }
}
