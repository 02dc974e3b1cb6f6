//! Scan-result ingestion
//!
//! [`ScanObserver`] is the handler the BLE stack invokes for every received
//! advertisement. It runs in the stack's own event-delivery context, so the
//! whole path is allocation-free and bounded: validate the frame, look up
//! the channel slot, update it, done. Faults are never errors here - the
//! medium is shared with arbitrary other traffic, so foreign and malformed
//! advertisements are counted and dropped silently.

use core::sync::atomic::{AtomicU32, Ordering};

use crate::communication::frame::{self, FrameError};
use crate::platform::traits::{ClockInterface, ScanReport, ScanResultHandler};
use crate::radio::registry::ChannelRegistry;

/// Ingestion counters, one per disposition
#[derive(Debug, Default)]
struct Counters {
    accepted: AtomicU32,
    foreign: AtomicU32,
    malformed: AtomicU32,
    unknown_channel: AtomicU32,
}

/// Snapshot of the ingestion counters for monitoring and diagnostics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct IngestStats {
    /// Frames stored into the registry
    pub accepted: u32,
    /// Advertisements that were not this protocol at all
    pub foreign: u32,
    /// Protocol frames failing self-consistency checks
    pub malformed: u32,
    /// Valid frames on channels this node does not observe
    pub unknown_channel: u32,
}

/// Scan-result handler feeding a [`ChannelRegistry`].
///
/// Constructed once next to the registry it writes and registered with the
/// BLE stack before scanning starts. Applications that drive the stack
/// themselves can instead call [`ScanObserver::process`] from their own
/// handler and use the returned channel for follow-up logic.
pub struct ScanObserver<'a, C: ClockInterface> {
    registry: &'a ChannelRegistry,
    clock: C,
    counters: Counters,
}

impl<'a, C: ClockInterface> ScanObserver<'a, C> {
    pub fn new(registry: &'a ChannelRegistry, clock: C) -> Self {
        Self {
            registry,
            clock,
            counters: Counters::default(),
        }
    }

    /// Ingest one scan report.
    ///
    /// Returns the channel whose slot was updated, or `None` when the
    /// advertisement was foreign, malformed, or on an unobserved channel.
    pub fn process(&self, report: &ScanReport<'_>) -> Option<u8> {
        let channel = match frame::validate(report.data) {
            Ok(channel) => channel,
            Err(FrameError::Foreign) => {
                self.bump(&self.counters.foreign);
                return None;
            }
            Err(FrameError::Malformed) => {
                self.bump(&self.counters.malformed);
                return None;
            }
        };

        let now_ms = self.clock.now_ms();
        if !self.registry.ingest(channel, report.rssi, report.data, now_ms) {
            self.bump(&self.counters.unknown_channel);
            return None;
        }

        self.bump(&self.counters.accepted);
        crate::log_trace!("frame accepted on channel {}", channel);
        Some(channel)
    }

    /// Current ingestion counters.
    pub fn stats(&self) -> IngestStats {
        IngestStats {
            accepted: self.counters.accepted.load(Ordering::Relaxed),
            foreign: self.counters.foreign.load(Ordering::Relaxed),
            malformed: self.counters.malformed.load(Ordering::Relaxed),
            unknown_channel: self.counters.unknown_channel.load(Ordering::Relaxed),
        }
    }

    // Load-then-store instead of an atomic RMW: the counters have a single
    // writer (the stack's delivery context) and targets without CAS must
    // still be able to run this path.
    fn bump(&self, counter: &AtomicU32) {
        counter.store(
            counter.load(Ordering::Relaxed).wrapping_add(1),
            Ordering::Relaxed,
        );
    }
}

impl<C: ClockInterface + Sync> ScanResultHandler for ScanObserver<'_, C> {
    fn on_scan_result(&self, report: &ScanReport<'_>) {
        self.process(report);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::communication::frame::{ADV_HEADER_SIZE, ADV_MAX_SIZE};
    use crate::platform::mock::MockClock;

    fn report<'a>(rssi: i8, data: &'a [u8]) -> ScanReport<'a> {
        ScanReport {
            addr_type: 0,
            addr: [0; 6],
            adv_type: 0,
            rssi,
            data,
        }
    }

    fn test_frame(channel: u8, payload: &[u8]) -> std::vec::Vec<u8> {
        let total = ADV_HEADER_SIZE + payload.len();
        let mut buf = [0u8; ADV_MAX_SIZE];
        buf[ADV_HEADER_SIZE..total].copy_from_slice(payload);
        frame::write_header(&mut buf, total, channel);
        buf[..total].to_vec()
    }

    #[test]
    fn test_accepted_frame_updates_registry_and_returns_channel() {
        let registry = ChannelRegistry::new();
        registry.initialize(&[4], 0).unwrap();
        let clock = MockClock::new();
        clock.set_ms(512);
        let observer = ScanObserver::new(&registry, &clock);

        let frame = test_frame(4, &[0x20]);
        assert_eq!(observer.process(&report(-40, &frame)), Some(4));
        assert_eq!(registry.signal_strength(4, 512), Some(-40));
        assert_eq!(observer.stats().accepted, 1);
    }

    #[test]
    fn test_foreign_vendor_id_leaves_registry_unchanged() {
        let registry = ChannelRegistry::new();
        registry.initialize(&[4], 0).unwrap();
        let clock = MockClock::new();
        clock.set_ms(512);
        let observer = ScanObserver::new(&registry, &clock);

        let mut frame = test_frame(4, &[0x20]);
        frame[2] = 0xEF;
        frame[3] = 0xBE;
        assert_eq!(observer.process(&report(-40, &frame)), None);
        assert_eq!(registry.signal_strength(4, 512), None);
        assert_eq!(
            observer.stats(),
            IngestStats {
                foreign: 1,
                ..IngestStats::default()
            }
        );
    }

    #[test]
    fn test_inconsistent_length_leaves_registry_unchanged() {
        let registry = ChannelRegistry::new();
        registry.initialize(&[4], 0).unwrap();
        let clock = MockClock::new();
        clock.set_ms(512);
        let observer = ScanObserver::new(&registry, &clock);

        let mut frame = test_frame(4, &[0x20]);
        frame[0] = frame[0].wrapping_add(1);
        assert_eq!(observer.process(&report(-40, &frame)), None);
        assert_eq!(registry.signal_strength(4, 512), None);
        assert_eq!(observer.stats().malformed, 1);
    }

    #[test]
    fn test_unobserved_channel_is_ignored() {
        let registry = ChannelRegistry::new();
        registry.initialize(&[4], 0).unwrap();
        let clock = MockClock::new();
        let observer = ScanObserver::new(&registry, &clock);

        let frame = test_frame(9, &[0x20]);
        assert_eq!(observer.process(&report(-40, &frame)), None);
        assert_eq!(observer.stats().unknown_channel, 1);
    }

    #[test]
    fn test_unrelated_ble_traffic_is_foreign() {
        let registry = ChannelRegistry::new();
        registry.initialize(&[4], 0).unwrap();
        let clock = MockClock::new();
        let observer = ScanObserver::new(&registry, &clock);

        // Typical flags + shortened-name advertisement from some other device.
        let data = [0x02, 0x01, 0x06, 0x05, 0x08, b'p', b'i', b'c', b'o'];
        assert_eq!(observer.process(&report(-70, &data)), None);
        assert_eq!(observer.stats().foreign, 1);
    }

    #[test]
    fn test_stats_accumulate_per_disposition() {
        let registry = ChannelRegistry::new();
        registry.initialize(&[4], 0).unwrap();
        let clock = MockClock::new();
        clock.set_ms(512);
        let observer = ScanObserver::new(&registry, &clock);

        let good = test_frame(4, &[0x20]);
        let other_channel = test_frame(9, &[0x20]);
        let mut bad_len = good.clone();
        bad_len[0] += 1;

        observer.process(&report(-40, &good));
        observer.process(&report(-40, &good));
        observer.process(&report(-40, &other_channel));
        observer.process(&report(-40, &bad_len));
        observer.process(&report(-40, &[]));

        assert_eq!(
            observer.stats(),
            IngestStats {
                accepted: 2,
                foreign: 1,
                malformed: 1,
                unknown_channel: 1,
            }
        );
    }
}
