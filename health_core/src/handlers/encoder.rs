//! Serialization of aggregated results into the response body

use crate::error::Result;
use crate::status::AggregatedCheckStatus;

pub trait ResultEncoder: Send + Sync {
    fn encode(&self, status: &AggregatedCheckStatus) -> Result<Vec<u8>>;
}

/// Compact JSON via serde.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonEncoder;

impl ResultEncoder for JsonEncoder {
    fn encode(&self, status: &AggregatedCheckStatus) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(status)?)
    }
}
