//! Credentials and the request-signing step.
//!
//! Signing is the last stage of request building and is deliberately a
//! pluggable seam: the service family has revised its signature algorithm
//! over time, and the pipeline only requires that *some* authentication
//! material ends up on the request. The shipped [`QueryStringSigner`]
//! implements the version-2 query-string scheme (HMAC-SHA256 over
//! method, host, path, and the sorted query string).

use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use hmac::{Hmac, KeyInit, Mac};
use jiff::Timestamp;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use sha2::Sha256;
use tracing::debug;
use zeroize::{Zeroize, ZeroizeOnDrop};

use super::error::MwsError;
use super::request::BuiltRequest;

type HmacSha256 = Hmac<Sha256>;

/// Secret wrapper that zeroes its memory on drop and never renders the full
/// value in `Debug` or `Display` output.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct SecureString(String);

impl SecureString {
    /// Wraps a secret value.
    pub fn new(value: String) -> Self {
        Self(value)
    }

    /// Returns the inner value.
    ///
    /// Avoid holding the reference longer than the signing step needs it.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SecureString {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("SecureString")
            .field("value", &"[REDACTED]")
            .finish()
    }
}

impl fmt::Display for SecureString {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Counted in characters so the mask never splits a UTF-8 sequence.
        let length = self.0.chars().count();
        if length <= 8 {
            write!(formatter, "***")
        } else {
            let head: String = self.0.chars().take(4).collect();
            let tail: String = self.0.chars().skip(length - 4).collect();
            write!(formatter, "{head}...{tail}")
        }
    }
}

impl From<String> for SecureString {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for SecureString {
    fn from(value: &str) -> Self {
        Self::new(value.to_string())
    }
}

/// Account identity used to authenticate requests.
#[derive(Debug, Clone)]
pub struct Credentials {
    /// Public access key identifier.
    pub access_key_id: String,
    /// Secret signing key.
    pub secret_key: SecureString,
    /// Merchant/seller identifier sent with every request.
    pub seller_id: String,
}

impl Credentials {
    /// Creates a credential set.
    pub fn new(
        access_key_id: impl Into<String>,
        secret_key: impl Into<SecureString>,
        seller_id: impl Into<String>,
    ) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_key: secret_key.into(),
            seller_id: seller_id.into(),
        }
    }
}

/// Attaches whatever authentication material the remote service requires.
///
/// Invoked once per invocation on the fully-built request, as the final step
/// of request building.
pub trait RequestSigner: fmt::Debug + Send + Sync {
    /// Mutates the request to carry authentication material.
    ///
    /// # Errors
    ///
    /// Returns [`MwsError::Signature`] when signing material cannot be
    /// computed.
    fn sign(&self, request: &mut BuiltRequest) -> Result<(), MwsError>;
}

/// The version-2 query-string signing scheme.
///
/// Appends identity and timestamp query fields, then a `Signature` field:
/// `Base64(HMAC-SHA256(secret, StringToSign))` where
///
/// ```text
/// StringToSign = HTTP-Verb + "\n" +
///                Host + "\n" +
///                Path + "\n" +
///                CanonicalizedQueryString
/// ```
#[derive(Debug)]
pub struct QueryStringSigner {
    credentials: Credentials,
    version: String,
}

impl QueryStringSigner {
    /// Creates a signer for the given credentials and API version string.
    pub fn new(credentials: Credentials, version: impl Into<String>) -> Self {
        Self {
            credentials,
            version: version.into(),
        }
    }
}

impl RequestSigner for QueryStringSigner {
    fn sign(&self, request: &mut BuiltRequest) -> Result<(), MwsError> {
        request.append_query("AWSAccessKeyId", &self.credentials.access_key_id);
        request.append_query("SellerId", &self.credentials.seller_id);
        request.append_query("SignatureMethod", "HmacSHA256");
        request.append_query("SignatureVersion", "2");
        request.append_query("Timestamp", &Timestamp::now().to_string());
        request.append_query("Version", &self.version);

        let string_to_sign = build_string_to_sign(request);
        debug!(access_key_id = %self.credentials.access_key_id, "signing request");
        let signature = compute_signature(self.credentials.secret_key.as_str(), &string_to_sign)?;
        request.append_query("Signature", &signature);
        Ok(())
    }
}

/// Unreserved characters per the signing scheme; everything else is
/// percent-encoded, including space as `%20`.
const SIGNING_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

fn build_string_to_sign(request: &BuiltRequest) -> String {
    let mut pairs: Vec<(String, String)> = request
        .url
        .query_pairs()
        .map(|(name, value)| (name.into_owned(), value.into_owned()))
        .collect();
    pairs.sort();

    let canonical_query = pairs
        .iter()
        .map(|(name, value)| {
            format!(
                "{}={}",
                utf8_percent_encode(name, SIGNING_ENCODE_SET),
                utf8_percent_encode(value, SIGNING_ENCODE_SET)
            )
        })
        .collect::<Vec<_>>()
        .join("&");

    format!(
        "{}\n{}\n{}\n{canonical_query}",
        request.method,
        request.url.host_str().unwrap_or_default(),
        request.url.path(),
    )
}

fn compute_signature(secret_key: &str, string_to_sign: &str) -> Result<String, MwsError> {
    let mut mac =
        HmacSha256::new_from_slice(secret_key.as_bytes()).map_err(|err| MwsError::Signature {
            message: err.to_string(),
        })?;
    mac.update(string_to_sign.as_bytes());
    Ok(BASE64.encode(mac.finalize().into_bytes()))
}
