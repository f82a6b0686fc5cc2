//! Typed client for a blockchain JSON-RPC node.
//!
//! Covers node health and version, slot and block height, balances and
//! account data, the latest blockhash, signature statuses and rent
//! exemption. Public keys and signatures are checked locally (base58, 32
//! and 64 bytes) before a request is sent.

pub mod client;
pub mod config;
pub mod error;
pub mod input;
pub mod types;

pub use client::RpcClient;
pub use config::{Cluster, Commitment, RpcConfig};
pub use error::{RpcError, RpcErrorCode};
pub use types::{AccountInfo, Health, LatestBlockhash, RpcContext, RpcResponse, SignatureStatus, Version};
