//! JSON-RPC request envelope and result schemas.

use connect_core::validate::check_not_empty;
use connect_core::{Validate, ValidationError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::config::Commitment;
use crate::input::PUBKEY_LEN;

pub(crate) const JSONRPC_VERSION: &str = "2.0";

#[derive(Debug, Clone, Serialize)]
pub(crate) struct RpcRequest<'a> {
    pub jsonrpc: &'static str,
    pub id: String,
    pub method: &'a str,
    pub params: Value,
}

impl<'a> RpcRequest<'a> {
    pub fn new(method: &'a str, params: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id: Uuid::new_v4().to_string(),
            method,
            params,
        }
    }
}

fn check_base58(field: &str, value: &str, len: usize) -> Result<(), ValidationError> {
    match bs58::decode(value).into_vec() {
        Ok(bytes) if bytes.len() == len => Ok(()),
        _ => Err(ValidationError::constraint(
            field,
            format!("`{value}` is not a {len}-byte base58 value"),
        )),
    }
}

/// `getHealth` answers `"ok"`; an unhealthy node answers with an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Health {
    Ok,
}

impl Validate for Health {}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Version {
    #[serde(rename = "solana-core")]
    pub core: String,
    #[serde(rename = "feature-set")]
    pub feature_set: Option<u64>,
}

impl Validate for Version {
    fn validate(&self) -> Result<(), ValidationError> {
        check_not_empty("solana-core", &self.core)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcContext {
    pub slot: u64,
    pub api_version: Option<String>,
}

/// A value read at the slot named by `context`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RpcResponse<T> {
    pub context: RpcContext,
    pub value: T,
}

impl<T: Validate> Validate for RpcResponse<T> {
    fn validate(&self) -> Result<(), ValidationError> {
        self.value.validate()
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountInfo {
    /// Account data and its encoding, e.g. `["", "base64"]`.
    pub data: (String, String),
    pub executable: bool,
    pub lamports: u64,
    pub owner: String,
    pub rent_epoch: u64,
    pub space: Option<u64>,
}

impl Validate for AccountInfo {
    fn validate(&self) -> Result<(), ValidationError> {
        check_base58("owner", &self.owner, PUBKEY_LEN)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LatestBlockhash {
    pub blockhash: String,
    pub last_valid_block_height: u64,
}

impl Validate for LatestBlockhash {
    fn validate(&self) -> Result<(), ValidationError> {
        check_base58("blockhash", &self.blockhash, PUBKEY_LEN)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureStatus {
    pub slot: u64,
    /// `None` once the block is rooted.
    pub confirmations: Option<u64>,
    /// Transaction error, if the transaction failed.
    pub err: Option<Value>,
    pub confirmation_status: Option<Commitment>,
}

impl Validate for SignatureStatus {}

#[cfg(test)]
mod tests {
    use super::*;
    use connect_core::validate::validate_value;
    use serde_json::json;

    #[test]
    fn request_envelope_has_uuid_id() {
        let request = RpcRequest::new("getSlot", json!([]));
        let encoded = serde_json::to_value(&request).unwrap();
        assert_eq!(encoded["jsonrpc"], json!("2.0"));
        assert_eq!(encoded["method"], json!("getSlot"));
        assert!(Uuid::parse_str(encoded["id"].as_str().unwrap()).is_ok());
    }

    #[test]
    fn health_accepts_only_ok() {
        assert_eq!(validate_value::<Health>(json!("ok")).unwrap(), Health::Ok);
        assert!(validate_value::<Health>(json!("behind")).is_err());
    }

    #[test]
    fn account_info_reads_camel_case() {
        let info: RpcResponse<Option<AccountInfo>> = validate_value(json!({
            "context": {"slot": 5, "apiVersion": "1.18.22"},
            "value": {
                "data": ["", "base64"],
                "executable": true,
                "lamports": 1,
                "owner": "11111111111111111111111111111111",
                "rentEpoch": 7,
                "space": 0
            }
        }))
        .unwrap();
        assert_eq!(info.context.slot, 5);
        assert_eq!(info.value.unwrap().rent_epoch, 7);
    }

    #[test]
    fn missing_account_is_none() {
        let info: RpcResponse<Option<AccountInfo>> =
            validate_value(json!({"context": {"slot": 5}, "value": null})).unwrap();
        assert!(info.value.is_none());
    }

    #[test]
    fn malformed_blockhash_is_rejected() {
        let err = validate_value::<LatestBlockhash>(json!({
            "blockhash": "not-base58!",
            "lastValidBlockHeight": 10
        }))
        .unwrap_err();
        assert!(err.to_string().contains("blockhash"));
    }

    #[test]
    fn signature_status_parses_commitment() {
        let statuses: RpcResponse<Vec<Option<SignatureStatus>>> = validate_value(json!({
            "context": {"slot": 9},
            "value": [null, {"slot": 8, "confirmations": null, "err": null, "confirmationStatus": "finalized"}]
        }))
        .unwrap();
        assert!(statuses.value[0].is_none());
        let status = statuses.value[1].as_ref().unwrap();
        assert_eq!(status.confirmation_status, Some(Commitment::Finalized));
    }
}
