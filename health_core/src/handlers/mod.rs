//! The health endpoint: request handler, result encoding and handler composition

pub mod compose;
pub mod encoder;
pub mod health;

pub use compose::{new_handler, start_periodic_checks, stop_periodic_checks, Handler, HandlerBuilder, PeriodicChecks};
pub use encoder::{JsonEncoder, ResultEncoder};
pub use health::{disable_response_cache, HealthCheckHandler, CONTENT_TYPE_JSON};
