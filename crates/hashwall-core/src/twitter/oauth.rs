//! OAuth 1.0a request signing (HMAC-SHA1).
//!
//! Every request carries an `Authorization: OAuth ...` header whose
//! signature covers the method, the base URL and all query/form parameters.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use hmac::{Hmac, Mac};
use rand::Rng;
use rand::distributions::Alphanumeric;
use sha1::Sha1;

use super::credentials::Credentials;
use crate::domain::SourceError;

type HmacSha1 = Hmac<Sha1>;

const SIGNATURE_METHOD: &str = "HMAC-SHA1";
const VERSION: &str = "1.0";

/// RFC 3986 percent-encoding: everything except unreserved characters.
pub fn percent_encode(s: &str) -> String {
    let mut result = String::with_capacity(s.len() * 3);
    for byte in s.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                result.push(byte as char)
            }
            _ => result.push_str(&format!("%{byte:02X}")),
        }
    }
    result
}

/// `METHOD&enc(url)&enc(sorted encoded params)`.
pub fn signature_base_string(method: &str, url: &str, params: &[(String, String)]) -> String {
    let mut encoded: Vec<(String, String)> = params
        .iter()
        .map(|(k, v)| (percent_encode(k), percent_encode(v)))
        .collect();
    encoded.sort();

    let param_string = encoded
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");

    format!(
        "{}&{}&{}",
        method.to_uppercase(),
        percent_encode(url),
        percent_encode(&param_string)
    )
}

/// Base64 HMAC-SHA1 of `base` keyed with `enc(consumer_secret)&enc(token_secret)`.
pub fn sign(base: &str, consumer_secret: &str, token_secret: &str) -> Result<String, SourceError> {
    let key = format!(
        "{}&{}",
        percent_encode(consumer_secret),
        percent_encode(token_secret)
    );
    let mut mac = HmacSha1::new_from_slice(key.as_bytes())
        .map_err(|e| SourceError::Signing(e.to_string()))?;
    mac.update(base.as_bytes());
    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}

fn nonce() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(32)
        .map(char::from)
        .collect()
}

/// Builds `Authorization` headers for one set of credentials.
#[derive(Debug, Clone)]
pub struct OAuthSigner {
    credentials: Credentials,
}

impl OAuthSigner {
    pub fn new(credentials: Credentials) -> Self {
        Self { credentials }
    }

    /// Header for a request with a fresh nonce.
    ///
    /// `params` are the query string or form body parameters that will be
    /// sent with the request.
    pub fn authorization(
        &self,
        method: &str,
        url: &str,
        params: &[(String, String)],
        timestamp: i64,
    ) -> Result<String, SourceError> {
        self.authorization_with_nonce(method, url, params, timestamp, &nonce())
    }

    pub fn authorization_with_nonce(
        &self,
        method: &str,
        url: &str,
        params: &[(String, String)],
        timestamp: i64,
        nonce: &str,
    ) -> Result<String, SourceError> {
        let mut oauth_params = vec![
            ("oauth_consumer_key".to_string(), self.credentials.consumer_key.clone()),
            ("oauth_nonce".to_string(), nonce.to_string()),
            ("oauth_signature_method".to_string(), SIGNATURE_METHOD.to_string()),
            ("oauth_timestamp".to_string(), timestamp.to_string()),
            ("oauth_token".to_string(), self.credentials.access_token.clone()),
            ("oauth_version".to_string(), VERSION.to_string()),
        ];

        let mut all_params = params.to_vec();
        all_params.extend(oauth_params.iter().cloned());
        let base = signature_base_string(method, url, &all_params);
        let signature = sign(
            &base,
            &self.credentials.consumer_secret,
            &self.credentials.access_secret,
        )?;
        oauth_params.push(("oauth_signature".to_string(), signature));
        oauth_params.sort();

        let header = oauth_params
            .iter()
            .map(|(k, v)| format!("{}=\"{}\"", percent_encode(k), percent_encode(v)))
            .collect::<Vec<_>>()
            .join(", ");
        Ok(format!("OAuth {header}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn percent_encode_keeps_unreserved_only() {
        assert_eq!(percent_encode("Ladies + Gentlemen"), "Ladies%20%2B%20Gentlemen");
        assert_eq!(percent_encode("a-b_c.d~e"), "a-b_c.d~e");
        assert_eq!(percent_encode("#fashrev"), "%23fashrev");
        assert_eq!(percent_encode("☃"), "%E2%98%83");
    }

    #[test]
    fn base_string_sorts_and_double_encodes() {
        let params = pairs(&[
            ("status", "Hello Ladies + Gentlemen, a signed OAuth request!"),
            ("include_entities", "true"),
            ("oauth_consumer_key", "xvz1evFS4wEEPTGEFPHBog"),
            ("oauth_nonce", "kYjzVBB8Y0ZFabxSWbWovY3uYSQ2pTgmZeNu2VS4cg"),
            ("oauth_signature_method", "HMAC-SHA1"),
            ("oauth_timestamp", "1318622958"),
            ("oauth_token", "370773112-GmHxMAgYyLbNEtIKZeRNFsMKPR9EyMZeS9weJAEb"),
            ("oauth_version", "1.0"),
        ]);

        let base = signature_base_string(
            "post",
            "https://api.twitter.com/1.1/statuses/update.json",
            &params,
        );

        assert_eq!(
            base,
            "POST&https%3A%2F%2Fapi.twitter.com%2F1.1%2Fstatuses%2Fupdate.json&\
             include_entities%3Dtrue%26\
             oauth_consumer_key%3Dxvz1evFS4wEEPTGEFPHBog%26\
             oauth_nonce%3DkYjzVBB8Y0ZFabxSWbWovY3uYSQ2pTgmZeNu2VS4cg%26\
             oauth_signature_method%3DHMAC-SHA1%26\
             oauth_timestamp%3D1318622958%26\
             oauth_token%3D370773112-GmHxMAgYyLbNEtIKZeRNFsMKPR9EyMZeS9weJAEb%26\
             oauth_version%3D1.0%26\
             status%3DHello%2520Ladies%2520%252B%2520Gentlemen%252C%2520a%2520signed%2520OAuth%2520request%2521"
        );
    }

    #[test]
    fn signature_is_deterministic_base64_sha1() {
        let a = sign("GET&x&y", "consumer", "token").unwrap();
        let b = sign("GET&x&y", "consumer", "token").unwrap();
        let c = sign("GET&x&y", "consumer", "other").unwrap();

        assert_eq!(a, b);
        assert_ne!(a, c);
        // 20 bytes -> 28 base64 chars
        assert_eq!(a.len(), 28);
        assert_eq!(STANDARD.decode(&a).unwrap().len(), 20);
    }

    #[test]
    fn header_lists_sorted_oauth_params() {
        let signer = OAuthSigner::new(Credentials {
            consumer_key: "ck".into(),
            consumer_secret: "cs".into(),
            access_token: "at".into(),
            access_secret: "as".into(),
        });
        let params = pairs(&[("q", "#fashrev")]);

        let header = signer
            .authorization_with_nonce("GET", "https://example.test/search", &params, 1_460_000_000, "abc")
            .unwrap();

        assert!(header.starts_with("OAuth oauth_consumer_key=\"ck\", oauth_nonce=\"abc\", "));
        assert!(header.contains("oauth_signature_method=\"HMAC-SHA1\""));
        assert!(header.contains("oauth_timestamp=\"1460000000\""));
        assert!(header.contains("oauth_token=\"at\""));
        assert!(header.ends_with("oauth_version=\"1.0\""));
        // request params are signed but not put in the header
        assert!(!header.contains("fashrev"));

        let again = signer
            .authorization_with_nonce("GET", "https://example.test/search", &params, 1_460_000_000, "abc")
            .unwrap();
        assert_eq!(header, again);
    }

    #[test]
    fn fresh_nonce_per_request() {
        let signer = OAuthSigner::new(Credentials {
            consumer_key: "ck".into(),
            consumer_secret: "cs".into(),
            access_token: "at".into(),
            access_secret: "as".into(),
        });

        let a = signer.authorization("GET", "https://example.test", &[], 1).unwrap();
        let b = signer.authorization("GET", "https://example.test", &[], 1).unwrap();
        assert_ne!(a, b);
    }
}
