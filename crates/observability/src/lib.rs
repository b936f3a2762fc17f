//! # klarton-observability
//!
//! - Structured Logging via tracing-subscriber (text oder JSON)
//! - Fortschrittsmeldungen der Frame-Pipeline als Log-Eintraege

pub mod logging;
pub mod progress;

pub use logging::{log_format_gueltig, log_level_gueltig, logging_initialisieren};
pub use progress::LogProgress;
