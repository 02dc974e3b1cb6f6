//! Platform abstraction layer
//!
//! The radio core never talks to a BLE stack or a clock directly; it goes
//! through the traits defined here. Deployments bind them to a concrete
//! stack behind a target feature, tests bind them to the mock module.

pub mod error;
pub mod traits;

// Clock backend built on embassy-time (feature-gated)
#[cfg(feature = "embassy")]
pub mod embassy;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

// Re-export commonly used types
pub use error::{BleError, PlatformError, Result};
pub use traits::{BleInterface, ClockInterface, ScanReport, ScanResultHandler};
