//! JSON-RPC node client.
//!
//! # Design
//! Every method POSTs a JSON-RPC 2.0 envelope to the node URL, so the URL
//! does not identify the operation. Requests are dispatched with
//! [`call_named`] and parsed with the method name as the endpoint, which is
//! what logs and error metadata show.

use connect_core::error::metadata;
use connect_core::mapping::{call_named, interpret};
use connect_core::{HttpRequest, HttpResponse, RequestBuilder, ReqwestTransport, Transport, Validate};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::config::RpcConfig;
use crate::error::{RpcError, RpcErrorCode, PROFILE};
use crate::input;
use crate::types::{
    AccountInfo, Health, LatestBlockhash, RpcRequest, RpcResponse, SignatureStatus, Version,
};

pub const GET_HEALTH: &str = "getHealth";
pub const GET_VERSION: &str = "getVersion";
pub const GET_SLOT: &str = "getSlot";
pub const GET_BLOCK_HEIGHT: &str = "getBlockHeight";
pub const GET_BALANCE: &str = "getBalance";
pub const GET_ACCOUNT_INFO: &str = "getAccountInfo";
pub const GET_LATEST_BLOCKHASH: &str = "getLatestBlockhash";
pub const GET_SIGNATURE_STATUSES: &str = "getSignatureStatuses";
pub const GET_MINIMUM_BALANCE_FOR_RENT_EXEMPTION: &str = "getMinimumBalanceForRentExemption";

#[derive(Debug, Clone)]
pub struct RpcClient<T = ReqwestTransport> {
    config: RpcConfig,
    transport: T,
}

impl RpcClient<ReqwestTransport> {
    pub fn with_reqwest(config: RpcConfig) -> Self {
        Self::new(config, ReqwestTransport::new())
    }
}

impl<T: Transport> RpcClient<T> {
    pub fn new(config: RpcConfig, transport: T) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &RpcConfig {
        &self.config
    }

    fn commitment(&self) -> Value {
        json!({"commitment": self.config.commitment()})
    }

    /// Wrap `method` and `params` in a JSON-RPC envelope with a fresh id.
    pub fn build_request(&self, method: &str, params: Value) -> Result<HttpRequest, RpcError> {
        let envelope = RpcRequest::new(method, params);
        let request = RequestBuilder::post(self.config.url(), "")
            .query_opt("api-key", self.config.api_key())
            .timeout(self.config.timeout())
            .json(&envelope)
            .map_err(|e| RpcError::with_reason(RpcErrorCode::InvalidInput, &e).with_cause(e))?;
        Ok(request.build())
    }

    /// Interpret a node response to `method`.
    pub fn parse_response<R>(&self, method: &str, response: HttpResponse) -> Result<R, RpcError>
    where
        R: DeserializeOwned + Validate,
    {
        interpret(&PROFILE, method, response)
    }

    async fn execute<R>(&self, method: &str, params: Value) -> Result<R, RpcError>
    where
        R: DeserializeOwned + Validate,
    {
        let request = self
            .build_request(method, params)
            .map_err(|e| e.annotate("endpoint", method))?;
        call_named(&self.transport, &PROFILE, method, request).await
    }

    pub async fn get_health(&self) -> Result<Health, RpcError> {
        self.execute(GET_HEALTH, json!([])).await
    }

    pub async fn get_version(&self) -> Result<Version, RpcError> {
        self.execute(GET_VERSION, json!([])).await
    }

    pub async fn get_slot(&self) -> Result<u64, RpcError> {
        self.execute(GET_SLOT, json!([self.commitment()])).await
    }

    pub async fn get_block_height(&self) -> Result<u64, RpcError> {
        self.execute(GET_BLOCK_HEIGHT, json!([self.commitment()])).await
    }

    pub fn build_get_balance(&self, pubkey: &str) -> Result<HttpRequest, RpcError> {
        let pubkey = input::pubkey(pubkey)?;
        self.build_request(GET_BALANCE, json!([pubkey, self.commitment()]))
    }

    /// Balance in lamports.
    pub async fn get_balance(&self, pubkey: &str) -> Result<RpcResponse<u64>, RpcError> {
        let request = self
            .build_get_balance(pubkey)
            .map_err(|e| e.annotate("endpoint", GET_BALANCE))?;
        call_named(&self.transport, &PROFILE, GET_BALANCE, request).await
    }

    /// `value` is `None` when the account does not exist.
    pub async fn get_account_info(&self, pubkey: &str) -> Result<RpcResponse<Option<AccountInfo>>, RpcError> {
        let pubkey = input::pubkey(pubkey).map_err(|e| e.annotate("endpoint", GET_ACCOUNT_INFO))?;
        let options = json!({"commitment": self.config.commitment(), "encoding": "base64"});
        self.execute(GET_ACCOUNT_INFO, json!([pubkey, options])).await
    }

    pub async fn get_latest_blockhash(&self) -> Result<RpcResponse<LatestBlockhash>, RpcError> {
        self.execute(GET_LATEST_BLOCKHASH, json!([self.commitment()])).await
    }

    /// One entry per signature, in order; `None` for signatures the node
    /// does not know.
    pub async fn get_signature_statuses<S: AsRef<str>>(
        &self,
        signatures: &[S],
    ) -> Result<RpcResponse<Vec<Option<SignatureStatus>>>, RpcError> {
        let signatures =
            input::signatures(signatures).map_err(|e| e.annotate("endpoint", GET_SIGNATURE_STATUSES))?;
        let requested = signatures.len();
        let options = json!({"searchTransactionHistory": true});
        let statuses: RpcResponse<Vec<Option<SignatureStatus>>> = self
            .execute(GET_SIGNATURE_STATUSES, json!([signatures, options]))
            .await?;
        if statuses.value.len() != requested {
            return Err(RpcError::new(
                RpcErrorCode::InvalidResponse,
                metadata([
                    ("endpoint", Value::from(GET_SIGNATURE_STATUSES)),
                    (
                        "reason",
                        Value::from(format!(
                            "{} statuses returned for {requested} signatures",
                            statuses.value.len()
                        )),
                    ),
                ]),
            ));
        }
        Ok(statuses)
    }

    /// Lamports an account of `data_len` bytes needs to be rent exempt.
    pub async fn get_minimum_balance_for_rent_exemption(&self, data_len: usize) -> Result<u64, RpcError> {
        self.execute(
            GET_MINIMUM_BALANCE_FOR_RENT_EXEMPTION,
            json!([data_len, self.commitment()]),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Cluster, Commitment};
    use connect_core::RecordingTransport;
    use std::error::Error as _;

    const NODE: &str = "http://node.test";
    const SYSTEM_PROGRAM: &str = "11111111111111111111111111111111";

    fn client(transport: RecordingTransport) -> RpcClient<RecordingTransport> {
        let config = RpcConfig::new(Cluster::Custom(NODE.to_string()))
            .unwrap()
            .with_api_key("key-1")
            .unwrap()
            .with_commitment(Commitment::Confirmed);
        RpcClient::new(config, transport)
    }

    fn ok(result: Value) -> Value {
        json!({"jsonrpc": "2.0", "id": "x", "result": result})
    }

    #[test]
    fn build_request_wraps_json_rpc_envelope() {
        let req = client(RecordingTransport::new())
            .build_get_balance(SYSTEM_PROGRAM)
            .unwrap();
        assert_eq!(req.path, NODE);
        assert_eq!(req.query_value("api-key"), Some("key-1"));
        let body = req.json_body().unwrap();
        assert_eq!(body["jsonrpc"], json!("2.0"));
        assert_eq!(body["method"], json!("getBalance"));
        assert_eq!(body["params"], json!([SYSTEM_PROGRAM, {"commitment": "confirmed"}]));
    }

    #[test]
    fn every_request_gets_a_fresh_id() {
        let rpc = client(RecordingTransport::new());
        let first = rpc.build_request(GET_SLOT, json!([])).unwrap().json_body().unwrap();
        let second = rpc.build_request(GET_SLOT, json!([])).unwrap().json_body().unwrap();
        assert_ne!(first["id"], second["id"]);
    }

    #[test]
    fn parse_response_extracts_result() {
        let rpc = client(RecordingTransport::new());
        let slot: u64 = rpc.parse_response(GET_SLOT, HttpResponse::new(200, ok(json!(42)))).unwrap();
        assert_eq!(slot, 42);
    }

    #[tokio::test]
    async fn get_balance_returns_lamports_and_context() {
        let transport = RecordingTransport::replying(200, ok(json!({"context": {"slot": 7}, "value": 5000})));
        let balance = client(transport).get_balance(SYSTEM_PROGRAM).await.unwrap();
        assert_eq!(balance.value, 5000);
        assert_eq!(balance.context.slot, 7);
    }

    #[tokio::test]
    async fn invalid_pubkey_never_reaches_node() {
        let rpc = client(RecordingTransport::new());
        let err = rpc.get_account_info("not a key").await.unwrap_err();
        assert_eq!(err.code(), RpcErrorCode::InvalidInput);
        assert!(rpc.transport.requests().is_empty());
    }

    #[tokio::test]
    async fn rejected_input_names_the_method() {
        let rpc = client(RecordingTransport::new());
        let err = rpc.get_balance("short").await.unwrap_err();
        assert_eq!(err.code(), RpcErrorCode::InvalidInput);
        assert_eq!(err.metadata()["endpoint"], json!(GET_BALANCE));

        let err = rpc.get_account_info("not a key").await.unwrap_err();
        assert_eq!(err.metadata()["endpoint"], json!(GET_ACCOUNT_INFO));
    }

    #[tokio::test]
    async fn rpc_error_names_the_method() {
        let transport = RecordingTransport::replying(
            200,
            json!({"jsonrpc": "2.0", "id": "x", "error": {"code": -32007, "message": "Slot 5 was skipped"}}),
        );
        let err = client(transport).get_block_height().await.unwrap_err();
        assert_eq!(err.code(), RpcErrorCode::SlotSkipped);
        assert_eq!(err.metadata()["endpoint"], json!("getBlockHeight"));
        assert_eq!(err.message(), "slot was skipped or is missing for getBlockHeight");
    }

    #[tokio::test]
    async fn unhealthy_node_is_service_unavailable() {
        let transport = RecordingTransport::replying(
            200,
            json!({"jsonrpc": "2.0", "id": "x", "error": {"code": -32005, "message": "Node is behind by 42 slots"}}),
        );
        let err = client(transport).get_health().await.unwrap_err();
        assert_eq!(err.code(), RpcErrorCode::ServiceUnavailable);
    }

    #[tokio::test]
    async fn wrong_result_type_is_invalid_response() {
        let transport = RecordingTransport::replying(200, ok(json!("not a number")));
        let err = client(transport).get_slot().await.unwrap_err();
        assert_eq!(err.code(), RpcErrorCode::InvalidResponse);
        assert!(err.source().is_some());
    }

    #[tokio::test]
    async fn status_count_must_match_request() {
        let signature = bs58::encode([1u8; 64]).into_string();
        let transport = RecordingTransport::replying(200, ok(json!({"context": {"slot": 1}, "value": []})));
        let err = client(transport)
            .get_signature_statuses(&[signature])
            .await
            .unwrap_err();
        assert_eq!(err.code(), RpcErrorCode::InvalidResponse);
        assert!(err.message().contains("0 statuses returned for 1 signatures"));
    }
}
