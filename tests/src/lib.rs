//! End-to-end checks of the discovery pipeline against in-memory cluster services.

pub mod fakes;

mod device_http;
mod pipeline;
