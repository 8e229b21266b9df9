//! estrich-qc: EN 13813 quality-control statistics and conformity engine
//!
//! The computational core of a factory-production-control (FPC) system for
//! screed ("Estrich") manufacturers. It takes raw laboratory measurements
//! and a production's declared performance class and answers three
//! questions:
//!
//! - does an individual sample conform to the declared class under the
//!   EN 13813 two-tier acceptance rule? ([`conformity`])
//! - how is the production line behaving statistically — mean, spread,
//!   process capability, control limits, trend? ([`spc`])
//! - are the scheduled FPC checks for a production-volume tier being
//!   performed on time? ([`fpc`])
//!
//! The crate is a library invoked in-process by the surrounding
//! application. Persistence, notification delivery, and document
//! rendering are the caller's concern; fail-level evaluations are handed
//! to the caller through the [`alert::AlertSink`] seam.

pub mod alert;
pub mod conformity;
pub mod core;
pub mod entities;
pub mod fpc;
pub mod spc;
pub mod spec;
