//! Per-channel receive state
//!
//! One fixed slot per observed channel, created at radio initialization and
//! rewritten in place for every accepted frame - the ingestion path never
//! allocates. Each slot tracks the last update time, a smoothed RSSI
//! estimate, and a verbatim copy of the last valid frame.
//!
//! # Sharing
//!
//! The scan handler writes slots from the BLE stack's delivery context
//! while the application reads them from its own. Every operation here runs
//! inside one short critical section bounded by a slot lookup plus a 31-byte
//! copy, which keeps the handler's non-blocking contract intact.
//!
//! # Staleness
//!
//! Expiry is lazy: there is no background timer. Read-path operations first
//! compare the slot age against [`OBSERVED_DATA_TIMEOUT_MS`] and reset the
//! RSSI to [`RSSI_NONE`] when the data is too old.

use core::cell::RefCell;

use critical_section::Mutex;
use heapless::Vec;

use crate::communication::frame::{ADV_HEADER_SIZE, ADV_MAX_SIZE};

/// Sentinel RSSI meaning "no signal"
pub const RSSI_NONE: i8 = -128;

/// Smoothing window of the RSSI filter
pub const RSSI_FILTER_WINDOW_MS: u64 = 512;

/// Age after which observed data no longer counts
pub const OBSERVED_DATA_TIMEOUT_MS: u64 = 1000;

/// Most channels one registry can observe
pub const MAX_OBSERVE_CHANNELS: usize = 8;

/// Registry setup errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RegistryError {
    /// More observed channels requested than [`MAX_OBSERVE_CHANNELS`]
    CapacityExceeded,
}

impl core::fmt::Display for RegistryError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            RegistryError::CapacityExceeded => {
                write!(f, "more than {} observed channels", MAX_OBSERVE_CHANNELS)
            }
        }
    }
}

/// Receive state of one observed channel
struct ChannelSlot {
    channel: u8,
    last_update_ms: u64,
    filtered_rssi_dbm: i8,
    /// Payload bytes of the last valid frame
    raw_len: u8,
    /// Verbatim copy of the last valid frame, header included
    raw: [u8; ADV_MAX_SIZE],
}

impl ChannelSlot {
    const fn new(channel: u8, now_ms: u64) -> Self {
        Self {
            channel,
            last_update_ms: now_ms,
            filtered_rssi_dbm: RSSI_NONE,
            raw_len: 0,
            raw: [0; ADV_MAX_SIZE],
        }
    }

    fn expire_if_stale(&mut self, now_ms: u64) {
        if now_ms.saturating_sub(self.last_update_ms) > OBSERVED_DATA_TIMEOUT_MS {
            self.filtered_rssi_dbm = RSSI_NONE;
        }
    }
}

/// Receive state for all observed channels.
///
/// Owned per radio instance and shared by reference with that radio's scan
/// observer; two radios in one process keep fully independent state.
pub struct ChannelRegistry {
    slots: Mutex<RefCell<Vec<ChannelSlot, MAX_OBSERVE_CHANNELS>>>,
}

impl ChannelRegistry {
    /// Create an empty registry.
    pub const fn new() -> Self {
        Self {
            slots: Mutex::new(RefCell::new(Vec::new())),
        }
    }

    /// Allocate one slot per distinct channel, replacing any previous set.
    ///
    /// Slots start with no signal and `now_ms` as their timestamp, so a
    /// channel that never hears anything reports absent rather than stale.
    pub fn initialize(&self, channels: &[u8], now_ms: u64) -> Result<(), RegistryError> {
        critical_section::with(|cs| {
            let mut slots = self.slots.borrow_ref_mut(cs);
            slots.clear();
            for &channel in channels {
                if slots.iter().any(|slot| slot.channel == channel) {
                    continue;
                }
                slots
                    .push(ChannelSlot::new(channel, now_ms))
                    .map_err(|_| RegistryError::CapacityExceeded)?;
            }
            Ok(())
        })
    }

    /// Whether `channel` has a slot.
    pub fn is_observed(&self, channel: u8) -> bool {
        critical_section::with(|cs| {
            self.slots
                .borrow_ref(cs)
                .iter()
                .any(|slot| slot.channel == channel)
        })
    }

    /// Number of observed channels.
    pub fn channel_count(&self) -> usize {
        critical_section::with(|cs| self.slots.borrow_ref(cs).len())
    }

    /// Record a validated frame for `channel`.
    ///
    /// Returns false when the channel is not observed (the frame is simply
    /// not ours to store). The caller has already validated the frame, so
    /// `frame.len()` is within `(ADV_HEADER_SIZE, ADV_MAX_SIZE]`.
    ///
    /// The RSSI filter is a time-weighted moving average over
    /// [`RSSI_FILTER_WINDOW_MS`]: samples arriving after an idle gap of a
    /// full window replace the estimate outright, frequent samples blend in
    /// gradually.
    pub(crate) fn ingest(&self, channel: u8, rssi: i8, frame: &[u8], now_ms: u64) -> bool {
        debug_assert!(frame.len() > ADV_HEADER_SIZE && frame.len() <= ADV_MAX_SIZE);
        critical_section::with(|cs| {
            let mut slots = self.slots.borrow_ref_mut(cs);
            let Some(slot) = slots.iter_mut().find(|slot| slot.channel == channel) else {
                return false;
            };

            let elapsed = now_ms
                .saturating_sub(slot.last_update_ms)
                .min(RSSI_FILTER_WINDOW_MS) as i64;
            slot.last_update_ms = now_ms;

            let window = RSSI_FILTER_WINDOW_MS as i64;
            let blended = (slot.filtered_rssi_dbm as i64 * (window - elapsed)
                + rssi as i64 * elapsed)
                .div_euclid(window);
            slot.filtered_rssi_dbm = blended as i8;

            slot.raw_len = (frame.len() - ADV_HEADER_SIZE) as u8;
            slot.raw[..frame.len()].copy_from_slice(frame);
            true
        })
    }

    /// Smoothed signal strength for `channel` in dBm.
    ///
    /// Absent when the channel is not observed, has never been heard, or
    /// has gone stale.
    pub fn signal_strength(&self, channel: u8, now_ms: u64) -> Option<i8> {
        critical_section::with(|cs| {
            let mut slots = self.slots.borrow_ref_mut(cs);
            let slot = slots.iter_mut().find(|slot| slot.channel == channel)?;
            slot.expire_if_stale(now_ms);
            (slot.filtered_rssi_dbm != RSSI_NONE).then_some(slot.filtered_rssi_dbm)
        })
    }

    /// Copy the last frame for `channel` out of its slot.
    ///
    /// Applies the same staleness rules as [`Self::signal_strength`] and
    /// returns the payload length on success. The copy bounds the time the
    /// slot is held against the scan handler.
    pub(crate) fn copy_frame(
        &self,
        channel: u8,
        now_ms: u64,
        out: &mut [u8; ADV_MAX_SIZE],
    ) -> Option<usize> {
        critical_section::with(|cs| {
            let mut slots = self.slots.borrow_ref_mut(cs);
            let slot = slots.iter_mut().find(|slot| slot.channel == channel)?;
            slot.expire_if_stale(now_ms);
            if slot.filtered_rssi_dbm == RSSI_NONE {
                return None;
            }
            out.copy_from_slice(&slot.raw);
            Some(slot.raw_len as usize)
        })
    }
}

impl Default for ChannelRegistry {
    fn default() -> Self {
        Self::new()
    }
}
