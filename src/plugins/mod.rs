//! Reference middleware shipped with the crate: JSON response decoding,
//! dotted-path context assignment and request logging.

mod json;
mod log;
mod property;

pub use json::{JsonDecode, json_decode};
pub use log::{Logger, RequestLog, logger, logger_with};
pub use property::{SetProperty, set_property};
