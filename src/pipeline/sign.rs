//! Webhook request signing for the Feishu/Lark custom robot.

use base64::prelude::{Engine as _, BASE64_STANDARD};
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Signs a webhook timestamp.
///
/// The platform keys HMAC-SHA256 with `"{timestamp}\n{secret}"` over an
/// empty message and expects the digest base64-encoded. The receiver rejects
/// timestamps more than an hour old, so the signature is computed per send.
#[must_use]
pub fn sign(timestamp: i64, secret: &str) -> String {
    let key = format!("{timestamp}\n{secret}");
    let mac = HmacSha256::new_from_slice(key.as_bytes())
        .unwrap_or_else(|_| unreachable!("HMAC-SHA256 accepts keys of any length"));
    BASE64_STANDARD.encode(mac.finalize().into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_reference_signatures() {
        assert_eq!(sign(1_599_360_473, "demo"), "l1N0gAcBjdwBvGm1xMjOF0XSyaLRpR7tuO5dHfhAYc8=");
        assert_eq!(sign(1_700_000_000, "s3cret"), "IX3eHI0/v/Td7jqJ0ynSEK3Dq5JY3HUZeoeMgVZeZGo=");
    }

    #[test]
    fn signature_changes_with_timestamp() {
        assert_ne!(sign(1_700_000_000, "s3cret"), sign(1_700_000_001, "s3cret"));
        assert_eq!(sign(1_700_000_001, "s3cret"), "LgxtC9OJEgi4/dj901ts2fkyCuycJCKLHHyVuHuemlE=");
    }
}
