//! Cross-cutting request-processing hooks installed at startup.

pub mod request_log;
pub mod trace;

pub use request_log::RequestLog;
pub use trace::{Trace, TraceId};
