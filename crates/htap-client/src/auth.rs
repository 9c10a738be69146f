//! Gateway credentials as an HTTP Basic `Authorization` header.

use base64::{engine::general_purpose, Engine as _};

/// `Basic base64(public_key:private_key)`, per RFC 7617. No signing.
pub fn basic_authorization(public_key: &str, private_key: &str) -> String {
    let credentials = format!("{}:{}", public_key, private_key);
    let encoded = general_purpose::STANDARD.encode(credentials.as_bytes());
    format!("Basic {}", encoded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_auth_format() {
        // "alice:secret" in standard base64
        assert_eq!(basic_authorization("alice", "secret"), "Basic YWxpY2U6c2VjcmV0");
    }

    #[test]
    fn test_basic_auth_roundtrips() {
        let header = basic_authorization("PUB-KEY", "priv:with:colons");
        let encoded = header.strip_prefix("Basic ").unwrap();
        let decoded = general_purpose::STANDARD.decode(encoded).unwrap();
        assert_eq!(decoded, b"PUB-KEY:priv:with:colons");
    }
}
