//! Caller-input normalization for the JSON-RPC operations.

use crate::error::{RpcError, RpcErrorCode};

pub const PUBKEY_LEN: usize = 32;
pub const SIGNATURE_LEN: usize = 64;
/// Most signatures one `getSignatureStatuses` call accepts.
pub const MAX_SIGNATURES: usize = 256;

fn invalid(reason: impl std::fmt::Display) -> RpcError {
    RpcError::with_reason(RpcErrorCode::InvalidInput, reason)
}

/// Decode `raw` as base58 and require exactly `len` bytes.
pub fn base58(field: &str, raw: &str, len: usize) -> Result<String, RpcError> {
    let value = raw.trim();
    let bytes = bs58::decode(value)
        .into_vec()
        .map_err(|e| invalid(format!("{field} `{value}` is not base58: {e}")).with_cause(e))?;
    if bytes.len() != len {
        return Err(invalid(format!(
            "{field} `{value}` decodes to {} bytes, expected {len}",
            bytes.len()
        )));
    }
    Ok(value.to_string())
}

pub fn pubkey(raw: &str) -> Result<String, RpcError> {
    base58("public key", raw, PUBKEY_LEN)
}

pub fn signatures<S: AsRef<str>>(raw: &[S]) -> Result<Vec<String>, RpcError> {
    if raw.is_empty() {
        return Err(invalid("at least one signature is required"));
    }
    if raw.len() > MAX_SIGNATURES {
        return Err(invalid(format!(
            "{} signatures exceed the limit of {MAX_SIGNATURES}",
            raw.len()
        )));
    }
    raw.iter()
        .map(|s| base58("signature", s.as_ref(), SIGNATURE_LEN))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SYSTEM_PROGRAM: &str = "11111111111111111111111111111111";

    #[test]
    fn pubkey_is_trimmed() {
        assert_eq!(pubkey(&format!(" {SYSTEM_PROGRAM}\n")).unwrap(), SYSTEM_PROGRAM);
    }

    #[test]
    fn pubkey_rejects_non_base58() {
        let err = pubkey("0OIl0OIl0OIl0OIl0OIl0OIl0OIl0OIl").unwrap_err();
        assert_eq!(err.code(), RpcErrorCode::InvalidInput);
    }

    #[test]
    fn pubkey_rejects_wrong_length() {
        let err = pubkey("1111").unwrap_err();
        assert!(err.message().contains("expected 32"));
    }

    #[test]
    fn signatures_must_be_64_bytes() {
        let signature = bs58::encode([7u8; 64]).into_string();
        assert_eq!(signatures(&[signature.as_str()]).unwrap(), vec![signature.clone()]);
        assert!(signatures(&[SYSTEM_PROGRAM]).is_err());
    }

    #[test]
    fn signature_list_is_bounded() {
        assert!(signatures::<&str>(&[]).is_err());
        let signature = bs58::encode([7u8; 64]).into_string();
        let many = vec![signature; MAX_SIGNATURES + 1];
        assert!(signatures(&many).is_err());
    }
}
