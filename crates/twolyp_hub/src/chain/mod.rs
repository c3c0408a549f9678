//! JSON-RPC access to the token contract: fetching, caching, ABI decoding.

mod cache;
pub(crate) mod decode;
pub(crate) mod fetch;

pub use cache::{Cache, CacheError};
pub use decode::{decode_address, decode_bool, decode_uint, wei_to_tokens, DecodeError};
pub use fetch::{RpcClient, RpcConfig, RpcError};
