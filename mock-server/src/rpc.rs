//! Blockchain JSON-RPC node emulation.

use std::collections::HashMap;

use axum::{
    extract::Query,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};

pub const API_KEY_REVOKED: &str = "revoked";
pub const API_KEY_THROTTLED: &str = "throttled";

pub const SLOT: u64 = 250_000_000;
pub const BLOCK_HEIGHT: u64 = 230_000_000;
pub const BALANCE: u64 = 1_500_000_000;
pub const BLOCKHASH: &str = "EkSnNWid2cvwEVnVx9aBqawnmiCNiDgp3gUdkDPTKN1N";
/// Account that exists on the emulated chain (the system program).
pub const KNOWN_ACCOUNT: &str = "11111111111111111111111111111111";
pub const LAMPORTS_PER_BYTE_YEAR: u64 = 3_480;

pub fn router() -> Router {
    Router::new().route("/", post(handle))
}

#[derive(Debug, Deserialize)]
struct RpcCall {
    #[serde(default)]
    id: Value,
    method: Option<String>,
    #[serde(default = "no_params")]
    params: Value,
}

fn no_params() -> Value {
    json!([])
}

fn context() -> Value {
    json!({"apiVersion": "1.18.22", "slot": SLOT})
}

fn error(id: &Value, code: i64, message: &str) -> Value {
    json!({"jsonrpc": "2.0", "id": id, "error": {"code": code, "message": message}})
}

fn result(id: &Value, result: Value) -> Value {
    json!({"jsonrpc": "2.0", "id": id, "result": result})
}

async fn handle(Query(params): Query<HashMap<String, String>>, body: String) -> Response {
    match params.get("api-key").map(String::as_str) {
        Some(API_KEY_REVOKED) => return (StatusCode::UNAUTHORIZED, "Unauthorized").into_response(),
        Some(API_KEY_THROTTLED) => {
            return (
                StatusCode::TOO_MANY_REQUESTS,
                Json(error(&Value::Null, 429, "Too many requests for a specific RPC call")),
            )
                .into_response()
        }
        _ => {}
    }

    let Ok(call) = serde_json::from_str::<RpcCall>(&body) else {
        return Json(error(&Value::Null, -32700, "Parse error")).into_response();
    };
    let Some(method) = call.method.as_deref() else {
        return Json(error(&call.id, -32600, "Invalid request")).into_response();
    };

    let reply = match dispatch(method, &call.params) {
        Ok(value) => result(&call.id, value),
        Err((code, message)) => error(&call.id, code, &message),
    };
    Json(reply).into_response()
}

fn first_string(params: &Value) -> Result<&str, (i64, String)> {
    params
        .get(0)
        .and_then(Value::as_str)
        .ok_or((-32602, "Invalid params: expected string at position 0".to_string()))
}

fn dispatch(method: &str, params: &Value) -> Result<Value, (i64, String)> {
    match method {
        "getHealth" => Ok(json!("ok")),
        "getVersion" => Ok(json!({"solana-core": "1.18.22", "feature-set": 3_469_865_029u64})),
        "getSlot" => Ok(json!(SLOT)),
        "getBlockHeight" => Ok(json!(BLOCK_HEIGHT)),
        "getBalance" => {
            first_string(params)?;
            Ok(json!({"context": context(), "value": BALANCE}))
        }
        "getAccountInfo" => {
            let account = first_string(params)?;
            let value = if account == KNOWN_ACCOUNT {
                json!({
                    "data": ["", "base64"],
                    "executable": true,
                    "lamports": 1,
                    "owner": "NativeLoader1111111111111111111111111111111",
                    "rentEpoch": 18_446_744_073_709_551_615u64,
                    "space": 14
                })
            } else {
                Value::Null
            };
            Ok(json!({"context": context(), "value": value}))
        }
        "getLatestBlockhash" => Ok(json!({
            "context": context(),
            "value": {"blockhash": BLOCKHASH, "lastValidBlockHeight": BLOCK_HEIGHT + 150}
        })),
        "getSignatureStatuses" => {
            let signatures = params
                .get(0)
                .and_then(Value::as_array)
                .ok_or((-32602, "Invalid params: expected array".to_string()))?;
            let statuses: Vec<Value> = signatures.iter().map(|_| Value::Null).collect();
            Ok(json!({"context": context(), "value": statuses}))
        }
        "getMinimumBalanceForRentExemption" => {
            let len = params
                .get(0)
                .and_then(Value::as_u64)
                .ok_or((-32602, "Invalid params: expected integer".to_string()))?;
            Ok(json!((len + 128) * LAMPORTS_PER_BYTE_YEAR * 2))
        }
        "getBlock" => Err((-32004, "Block not available for slot".to_string())),
        _ => Err((-32601, "Method not found".to_string())),
    }
}
