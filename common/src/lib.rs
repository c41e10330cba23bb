//! # hwrev common
//!
//! Shared building blocks for the hardware revision discovery pipeline.
//!
//! * **[`device`]**: the per-device record set and the UDI grammar.
//! * **[`config`]**: run configuration and its validation.
//! * **[`error`]**: error taxonomy shared by the pipeline stages.
//! * **[`services`]**: contracts for the external services the pipeline consumes.

pub mod config;
pub mod device;
pub mod error;
pub mod services;

/// Target used by [`success!`] so the terminal formatter can render it apart from plain info.
pub const SUCCESS_TARGET: &str = "hwrev::success";

#[macro_export]
macro_rules! info {
    ($($arg:tt)*) => {
        ::tracing::info!($($arg)*)
    };
}

#[macro_export]
macro_rules! success {
    ($($arg:tt)*) => {
        ::tracing::info!(target: $crate::SUCCESS_TARGET, $($arg)*)
    };
}

#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {
        ::tracing::warn!($($arg)*)
    };
}
