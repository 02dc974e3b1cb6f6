//! Core infrastructure
//!
//! Fundamental plumbing shared by the rest of the crate; currently the
//! logging abstraction.

pub mod logging;
