//! BLE stack interface
//!
//! Models the four primitives the radio needs from an observer-role BLE
//! stack: register a scan-result handler, run a passive scan, and start or
//! stop non-connectable advertising. Everything else about the stack
//! (host setup, addresses, connections) is outside this crate's scope.

use crate::platform::Result;

/// Scan duration meaning "scan until told otherwise"
pub const SCAN_FOREVER: u32 = 0;

/// One received advertisement, as delivered by the stack.
///
/// Field meanings follow the stack's own scan-result event; `data` is the
/// raw advertising payload and is only valid for the duration of the
/// handler call.
#[derive(Debug, Clone, Copy)]
pub struct ScanReport<'a> {
    /// Advertiser address type (stack-specific encoding)
    pub addr_type: u8,
    /// Advertiser address
    pub addr: [u8; 6],
    /// Advertisement PDU type (stack-specific encoding)
    pub adv_type: u8,
    /// Received signal strength in dBm
    pub rssi: i8,
    /// Raw advertising data
    pub data: &'a [u8],
}

/// Receiver of scan-result events.
///
/// The stack invokes this from its own event-delivery context, which may be
/// interrupt-adjacent: implementations must not block, allocate, or do
/// unbounded work. `Sync` because the handler is shared between that
/// context and the application.
pub trait ScanResultHandler: Sync {
    fn on_scan_result(&self, report: &ScanReport<'_>);
}

/// Observer-role BLE stack primitives.
pub trait BleInterface {
    /// Register the handler that receives scan results.
    ///
    /// Called once during setup, before scanning starts. The handler must
    /// live for the rest of the program; stacks deliver events to it at any
    /// time after registration.
    fn register_scan_handler(&mut self, handler: &'static dyn ScanResultHandler) -> Result<()>;

    /// Start a passive scan.
    ///
    /// # Arguments
    ///
    /// * `duration_ms` - scan duration, or [`SCAN_FOREVER`] for a continuous scan
    /// * `interval_us` - time between scan window starts
    /// * `window_us` - listening time within each interval
    fn start_scan(&mut self, duration_ms: u32, interval_us: u32, window_us: u32) -> Result<()>;

    /// Advertise `payload` as non-connectable advertising data at the given
    /// interval, replacing any previous advertisement.
    fn start_advertise(&mut self, interval_us: u32, payload: &[u8]) -> Result<()>;

    /// Stop advertising. A no-op when nothing is being advertised.
    fn stop_advertise(&mut self) -> Result<()>;
}
