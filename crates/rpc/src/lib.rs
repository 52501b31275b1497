//! Account abstraction (ERC-4337) bundler and node JSON-RPC client
//!
//! This crate contains a JSON-RPC client for talking to Ethereum execution clients and ERC-4337
//! bundlers over HTTP. It supports single calls and batched calls; batch responses may arrive in
//! any order and are correlated back into request order by id.

mod client;
mod error;
mod types;

pub use client::RpcClient;
pub use error::{ClientError, ClientResult};
pub use types::{JsonRpcError, Request};
