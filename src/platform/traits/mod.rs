//! Platform trait definitions
//!
//! Each trait models one external collaborator of the radio core. Concrete
//! implementations live outside this crate (or in the mock module for
//! tests), keeping all stack-specific code behind these seams.

mod ble;
mod clock;

pub use ble::{BleInterface, ScanReport, ScanResultHandler, SCAN_FOREVER};
pub use clock::ClockInterface;
