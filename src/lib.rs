#![cfg_attr(not(any(test, feature = "mock")), no_std)]

//! pico_radio - Connectionless BLE advertisement telemetry for embedded nodes
//!
//! Nodes exchange small structured values by broadcasting BLE advertisements
//! tagged with a logical channel number (0-255). There are no connections:
//! every node periodically transmits its own payload and keeps last-value-wins
//! receive state for the channels it observes. This is a best-effort, lossy
//! telemetry transport.
//!
//! ## Limitations
//!
//! - No retransmission, acknowledgement, or ordering guarantees
//! - No encryption or authentication
//! - One advertisement is at most 31 bytes (26 bytes of payload)
//!
//! ## Example
//!
//! ```rust,ignore
//! use pico_radio::communication::codec::{Payload, Value};
//! use pico_radio::platform::embassy::EmbassyClock;
//! use pico_radio::platform::traits::BleInterface;
//! use pico_radio::radio::observer::ScanObserver;
//! use pico_radio::radio::registry::ChannelRegistry;
//! use pico_radio::radio::{BleRadio, RadioConfig};
//! use static_cell::StaticCell;
//!
//! static REGISTRY: StaticCell<ChannelRegistry> = StaticCell::new();
//! static OBSERVER: StaticCell<ScanObserver<'static, EmbassyClock>> = StaticCell::new();
//!
//! let registry: &'static ChannelRegistry = REGISTRY.init(ChannelRegistry::new());
//! let observer = OBSERVER.init(ScanObserver::new(registry, EmbassyClock));
//! ble.register_scan_handler(observer)?;
//!
//! // Broadcast on channel 5, listen on channels 4 and 18.
//! let config = RadioConfig {
//!     broadcast_channel: 5,
//!     ..RadioConfig::default()
//! };
//! let mut radio = BleRadio::new(ble, EmbassyClock, registry, &[4, 18], config)?;
//!
//! loop {
//!     if let Some(data) = radio.observe(4) {
//!         // Most recent payload seen on channel 4.
//!     }
//!     let values = [Value::from("hello, world!"), Value::from(3.14f32)];
//!     radio.broadcast(Some(&Payload::sequence(&values)?))?;
//! }
//! ```

// Platform abstraction layer (BLE stack and clock collaborators)
pub mod platform;

// Core infrastructure (logging)
pub mod core;

// Wire protocol (value codec and advertisement frame layout)
pub mod communication;

// Radio subsystem (channel registry, scan ingestion, observe/broadcast API)
pub mod radio;
