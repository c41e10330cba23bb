//! # hwrev core
//!
//! The hardware revision discovery pipeline and the clients it talks through.
//!
//! * **[`discovery`]**: orchestrates the stages below over one owned inventory.
//! * **[`catalog`]**, **[`status`]**, **[`enricher`]**: the three pipeline stages.
//! * **[`export`]**: the result table and run summary.
//! * **[`cucm`]**: SOAP and UDS clients for the cluster's directory and status services.

pub mod catalog;
pub mod cucm;
pub mod discovery;
pub mod enricher;
pub mod export;
pub mod status;
pub mod xml;
