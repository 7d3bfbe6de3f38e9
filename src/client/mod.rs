pub(crate) mod http;
pub(crate) mod rpc;

pub use http::{ZabbixClient, ZabbixClientBuilder};
pub use rpc::{RequestParams, RpcEnvelope, RpcError};

use crate::Result;
use crate::error::Error;

/// Reduces a result list that must hold exactly one element.
pub(crate) fn expect_one<T>(mut items: Vec<T>) -> Result<T> {
    if items.len() == 1 {
        Ok(items.remove(0))
    } else {
        Err(Error::ExpectedOneResult { count: items.len() })
    }
}
