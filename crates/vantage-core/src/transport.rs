//! Transport abstraction.
//!
//! The client only talks to the network through [`ApiTransport`], so tests can
//! substitute a recording fake for the HTTP implementation.

use async_trait::async_trait;
use std::fmt::Debug;

use crate::error::Result;
use crate::params::RequestParameters;
use crate::types::{DataType, RawResponse};

/// Performs a single API call.
#[async_trait]
pub trait ApiTransport: Send + Sync + Debug {
    /// Returns the name of this transport (e.g., "AlphaVantage").
    fn name(&self) -> &str;

    /// Sends the parameters and decodes the body in the requested format.
    ///
    /// Implementations apply their own throttling before sending.
    async fn fetch(&self, params: &RequestParameters, datatype: DataType) -> Result<RawResponse>;
}
