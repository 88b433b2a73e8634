//! probeman — drives integration tests against a remote HTTP server and
//! reports the results.
//!
//! The interesting machinery lives in four places: a dual-sink structured
//! logger that sanitizes sensitive fields before anything hits disk
//! ([`logging`]), a scoped request tracker that logs every outbound call on
//! every exit path ([`engine::tracker`]), a concurrent fan-out executor that
//! preserves per-request identity ([`engine::fanout`]), and a result
//! collector / reporter pair that classifies outcomes and derives
//! recommendations ([`report`]).

pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod logging;
pub mod report;
pub mod suite;

pub use config::ServerConfig;
pub use error::{Error, Result};
