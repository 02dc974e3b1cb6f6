//! Radio subsystem
//!
//! [`BleRadio`] is the application-facing object: it owns the BLE stack
//! collaborator and the send/receive buffers, shares a [`registry::ChannelRegistry`]
//! with the scan observer, and exposes the three operations of the
//! transport - `broadcast`, `observe`, `signal_strength`.

pub mod observer;
pub mod registry;

use crate::communication::codec::{self, CodecError, Payload};
use crate::communication::frame::{self, ADV_HEADER_SIZE, ADV_MAX_SIZE};
use crate::platform::error::PlatformError;
use crate::platform::traits::{BleInterface, ClockInterface, SCAN_FOREVER};
use registry::{ChannelRegistry, RegistryError};

/// Default time between scan window starts
pub const SCAN_INTERVAL_US: u32 = 30_000;

/// Default listening time within each scan interval
pub const SCAN_WINDOW_US: u32 = 30_000;

/// Default advertising interval
pub const ADVERTISE_INTERVAL_US: u32 = 40_000;

/// Radio tuning parameters
///
/// The defaults give a continuous scan duty cycle and a 40 ms advertising
/// interval; most applications only set `broadcast_channel`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RadioConfig {
    /// Channel this node broadcasts on
    pub broadcast_channel: u8,
    pub scan_interval_us: u32,
    pub scan_window_us: u32,
    pub advertise_interval_us: u32,
}

impl Default for RadioConfig {
    fn default() -> Self {
        Self {
            broadcast_channel: 0,
            scan_interval_us: SCAN_INTERVAL_US,
            scan_window_us: SCAN_WINDOW_US,
            advertise_interval_us: ADVERTISE_INTERVAL_US,
        }
    }
}

/// Radio operation errors
///
/// Everything here indicates a caller-side problem (payload does not fit,
/// too many channels) or a collaborator fault. Medium noise never surfaces
/// as an error; see the observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RadioError {
    /// Encoded frame would exceed the 31-byte advertisement
    PayloadTooLarge { size: usize },
    /// A value in the payload cannot be put on the wire
    Codec(CodecError),
    /// The BLE stack rejected an operation
    Platform(PlatformError),
    /// Registry setup failed
    Registry(RegistryError),
}

impl core::fmt::Display for RadioError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            RadioError::PayloadTooLarge { size } => {
                write!(f, "frame of {} bytes exceeds {} byte limit", size, ADV_MAX_SIZE)
            }
            RadioError::Codec(e) => write!(f, "codec error: {}", e),
            RadioError::Platform(e) => write!(f, "platform error: {}", e),
            RadioError::Registry(e) => write!(f, "registry error: {}", e),
        }
    }
}

impl From<CodecError> for RadioError {
    fn from(e: CodecError) -> Self {
        RadioError::Codec(e)
    }
}

impl From<PlatformError> for RadioError {
    fn from(e: PlatformError) -> Self {
        RadioError::Platform(e)
    }
}

impl From<RegistryError> for RadioError {
    fn from(e: RegistryError) -> Self {
        RadioError::Registry(e)
    }
}

/// Connectionless telemetry radio.
///
/// Broadcasts on one configured channel and observes the channels its
/// registry was initialized with. The registry is shared by reference so
/// the scan observer (registered separately with the BLE stack) can write
/// it from the stack's delivery context.
pub struct BleRadio<'a, B: BleInterface, C: ClockInterface> {
    ble: B,
    clock: C,
    config: RadioConfig,
    registry: &'a ChannelRegistry,
    send_buffer: [u8; ADV_MAX_SIZE],
    recv_buffer: [u8; ADV_MAX_SIZE],
}

impl<'a, B: BleInterface, C: ClockInterface> BleRadio<'a, B, C> {
    /// Create a radio and start a continuous scan.
    ///
    /// Initializes the registry for `observe_channels` and configures the
    /// stack's scan with the intervals from `config`. The scan handler must
    /// already be registered; see the crate example.
    pub fn new(
        ble: B,
        clock: C,
        registry: &'a ChannelRegistry,
        observe_channels: &[u8],
        config: RadioConfig,
    ) -> Result<Self, RadioError> {
        let mut radio = Self::attach(ble, clock, registry, observe_channels, config)?;
        radio
            .ble
            .start_scan(SCAN_FOREVER, config.scan_interval_us, config.scan_window_us)?;
        crate::log_info!(
            "radio up: broadcast channel {}, observing {} channels",
            config.broadcast_channel,
            registry.channel_count()
        );
        Ok(radio)
    }

    /// Create a radio without touching scan state.
    ///
    /// For applications that drive the BLE stack themselves: the registry
    /// is initialized, but scanning is left exactly as the caller
    /// configured it.
    pub fn attach(
        ble: B,
        clock: C,
        registry: &'a ChannelRegistry,
        observe_channels: &[u8],
        config: RadioConfig,
    ) -> Result<Self, RadioError> {
        registry.initialize(observe_channels, clock.now_ms())?;
        Ok(Self {
            ble,
            clock,
            config,
            registry,
            send_buffer: [0; ADV_MAX_SIZE],
            recv_buffer: [0; ADV_MAX_SIZE],
        })
    }

    /// Most recent payload observed on `channel`.
    ///
    /// Absent when the channel is not observed, nothing has been heard, or
    /// the last frame is older than the staleness timeout. Borrowed `Str`/
    /// `Bytes` values alias this radio's receive buffer and live until the
    /// next `observe` call; copy them out for anything longer.
    pub fn observe(&mut self, channel: u8) -> Option<Payload<'_>> {
        let len = self
            .registry
            .copy_frame(channel, self.clock.now_ms(), &mut self.recv_buffer)?;
        Some(codec::decode(
            &self.recv_buffer[ADV_HEADER_SIZE..ADV_HEADER_SIZE + len],
        ))
    }

    /// Smoothed signal strength on `channel` in dBm, with the same absence
    /// rules as [`Self::observe`].
    pub fn signal_strength(&self, channel: u8) -> Option<i8> {
        self.registry.signal_strength(channel, self.clock.now_ms())
    }

    /// Broadcast a payload on the configured channel, or stop broadcasting.
    ///
    /// `None` stops advertising without encoding anything. Otherwise the
    /// payload is encoded behind a frame header and handed to the stack,
    /// replacing the previous advertisement. A payload that cannot fit one
    /// advertisement fails with [`RadioError::PayloadTooLarge`] and leaves
    /// the send buffer and the advertised state untouched.
    pub fn broadcast(&mut self, data: Option<&Payload<'_>>) -> Result<(), RadioError> {
        let Some(payload) = data else {
            self.ble.stop_advertise()?;
            return Ok(());
        };

        let total = ADV_HEADER_SIZE + codec::encoded_size(payload)?;
        if total > ADV_MAX_SIZE {
            crate::log_warn!("broadcast payload needs {} bytes, limit is {}", total, ADV_MAX_SIZE);
            return Err(RadioError::PayloadTooLarge { size: total });
        }

        codec::encode(payload, &mut self.send_buffer, ADV_HEADER_SIZE)?;
        frame::write_header(&mut self.send_buffer, total, self.config.broadcast_channel);
        self.ble
            .start_advertise(self.config.advertise_interval_us, &self.send_buffer[..total])?;
        Ok(())
    }

    pub fn config(&self) -> &RadioConfig {
        &self.config
    }

    /// The owned BLE collaborator.
    pub fn ble(&self) -> &B {
        &self.ble
    }

    pub fn ble_mut(&mut self) -> &mut B {
        &mut self.ble
    }
}
