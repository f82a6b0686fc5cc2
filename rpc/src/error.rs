//! Error codes and response conventions of the JSON-RPC node.
//!
//! # Design
//! Transport-level problems (bad key, throttling, gateway failures) arrive
//! as HTTP statuses; everything else arrives as HTTP 200 with an `error`
//! member. The numeric JSON-RPC code, rendered as a string, is the vendor
//! message the rules match on.

use connect_core::mapping::{ErrorRule, StatusMatch, VendorProfile};
use connect_core::ConnectError;
use serde_json::Value;

connect_core::error_codes! {
    /// Machine-readable failure codes of the JSON-RPC connect.
    pub enum RpcErrorCode {
        InvalidToken => ("invalid_token", "RPC API key was rejected (status {status_code})"),
        NotFound => ("not_found", "RPC endpoint not found (status {status_code})"),
        RateLimitExceeded => ("rate_limit_exceeded", "RPC rate limit exceeded on {endpoint}"),
        ServiceUnavailable => ("service_unavailable", "RPC node unavailable for {endpoint}"),
        InvalidRequest => ("invalid_request", "RPC node rejected the request for {endpoint}"),
        MethodNotFound => ("method_not_found", "RPC method {endpoint} is not supported by the node"),
        InvalidParams => ("invalid_params", "RPC node rejected the parameters of {endpoint}"),
        BlockNotAvailable => ("block_not_available", "block not available for {endpoint}"),
        SlotSkipped => ("slot_skipped", "slot was skipped or is missing for {endpoint}"),
        InvalidResponse => ("invalid_response", "RPC response for {endpoint} did not match the expected schema: {reason}"),
        InvalidInput => ("invalid_input", "invalid RPC input: {reason}"),
        InvalidConfiguration => ("invalid_configuration", "invalid RPC configuration: {reason}"),
        UnknownError => ("unknown_error", "unknown RPC error"),
    }
    unknown = UnknownError,
    invalid_response = InvalidResponse,
    unavailable = ServiceUnavailable,
    invalid_input = InvalidInput,
    invalid_configuration = InvalidConfiguration,
}

pub type RpcError = ConnectError<RpcErrorCode>;

const OK: StatusMatch = StatusMatch::Exact(200);

static RULES: &[ErrorRule<RpcErrorCode>] = &[
    ErrorRule::message(OK, "-32700", RpcErrorCode::InvalidRequest),
    ErrorRule::message(OK, "-32600", RpcErrorCode::InvalidRequest),
    ErrorRule::message(OK, "-32601", RpcErrorCode::MethodNotFound),
    ErrorRule::message(OK, "-32602", RpcErrorCode::InvalidParams),
    ErrorRule::message(OK, "-32001", RpcErrorCode::BlockNotAvailable),
    ErrorRule::message(OK, "-32004", RpcErrorCode::BlockNotAvailable),
    ErrorRule::message(OK, "-32005", RpcErrorCode::ServiceUnavailable),
    ErrorRule::message(OK, "-32007", RpcErrorCode::SlotSkipped),
    ErrorRule::message(OK, "-32009", RpcErrorCode::SlotSkipped),
    ErrorRule::status(401, RpcErrorCode::InvalidToken),
    ErrorRule::status(403, RpcErrorCode::InvalidToken),
    ErrorRule::status(404, RpcErrorCode::NotFound),
    ErrorRule::status(429, RpcErrorCode::RateLimitExceeded),
    ErrorRule::range(500, 599, RpcErrorCode::ServiceUnavailable),
];

fn has_error(body: &Value) -> bool {
    body.get("error").is_some_and(|e| !e.is_null())
}

fn result(body: Value) -> Value {
    match body {
        Value::Object(mut map) => map.remove("result").unwrap_or(Value::Null),
        _ => Value::Null,
    }
}

fn error_code(body: &Value) -> Option<String> {
    body.get("error")?.get("code").map(Value::to_string)
}

pub(crate) static PROFILE: VendorProfile<RpcErrorCode> = VendorProfile {
    name: "rpc",
    success_status: 200,
    failure_in_body: has_error,
    payload: result,
    vendor_message: error_code,
    rules: RULES,
};
