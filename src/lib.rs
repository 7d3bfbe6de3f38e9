#![forbid(unsafe_code)]
#![deny(clippy::unwrap_used, clippy::expect_used)]

pub mod application;
pub mod client;
pub mod error;
pub mod lld;
pub mod params;
pub mod proxy;
pub mod user;
pub mod user_group;
mod wire;

pub use application::Application;
pub use client::{RequestParams, RpcEnvelope, RpcError, ZabbixClient, ZabbixClientBuilder};
pub use error::Error;
pub use lld::LldRule;
pub use params::Params;
pub use proxy::Proxy;
pub use user::User;
pub use user_group::{UserGroup, UserGroupId, UserGroupPermission};

// Re-exported for the `params!` macro expansion; not part of the public API.
#[doc(hidden)]
pub use serde_json as _serde_json;

pub type Result<T> = std::result::Result<T, error::Error>;
