//! Library surface of the saftfix CLI.
//!
//! The binary in `main.rs` is a thin front door over `saftfix-core`; this
//! crate exposes the change-log rendering used by it and by integration
//! tests.

pub mod report;
