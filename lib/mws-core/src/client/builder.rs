use std::sync::Arc;
use std::time::Duration;

use url::Url;

use super::auth::{Credentials, QueryStringSigner, RequestSigner};
use super::error::MwsError;
use super::operation::{OperationSpec, Registry};
use super::transport::{HttpTransport, ReqwestTransport};
use super::MwsClient;

/// Production endpoint used when none is configured.
pub const DEFAULT_ENDPOINT: &str = "https://mws.amazonservices.com/";

/// API version string sent with every request by the default signer.
pub const DEFAULT_VERSION: &str = "2009-01-01";

/// Builder for [`MwsClient`] instances.
///
/// # Example
///
/// ```rust,no_run
/// use mws_core::{Credentials, MwsClient};
///
/// # fn main() -> Result<(), mws_core::MwsError> {
/// let client = MwsClient::builder()
///     .with_credentials(Credentials::new("AKID...", "secret", "SELLER123"))
///     .with_timeout(std::time::Duration::from_secs(30))
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct MwsClientBuilder {
    endpoint: Option<String>,
    credentials: Option<Credentials>,
    version: Option<String>,
    timeout: Option<Duration>,
    transport: Option<Arc<dyn HttpTransport>>,
    signer: Option<Arc<dyn RequestSigner>>,
    extra_operations: Vec<OperationSpec>,
}

impl MwsClientBuilder {
    /// Sets the service endpoint.
    ///
    /// Defaults to [`DEFAULT_ENDPOINT`]. Regional deployments use a
    /// different host with the same protocol.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Sets the account credentials used by the default signer.
    ///
    /// Required unless a custom signer is provided with
    /// [`with_signer`](Self::with_signer).
    #[must_use]
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Overrides the API version string. Defaults to [`DEFAULT_VERSION`].
    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Sets the transport timeout.
    ///
    /// Timeouts surface as [`MwsError::Transport`] failures; the pipeline
    /// defines no other cancellation mechanism. Ignored when a custom
    /// transport is provided.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Substitutes the HTTP transport, e.g. an in-memory double in tests.
    #[must_use]
    pub fn with_transport(mut self, transport: impl HttpTransport + 'static) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    /// Substitutes the request-signing step.
    #[must_use]
    pub fn with_signer(mut self, signer: impl RequestSigner + 'static) -> Self {
        self.signer = Some(Arc::new(signer));
        self
    }

    /// Registers an operation beyond the standard table.
    ///
    /// Validation (single HTTP-BODY parameter, unique action name) happens
    /// in [`build`](Self::build).
    #[must_use]
    pub fn with_operation(mut self, spec: OperationSpec) -> Self {
        self.extra_operations.push(spec);
        self
    }

    /// Builds the client: parses the endpoint, assembles the registry, and
    /// wires the transport and signer.
    ///
    /// # Errors
    ///
    /// Fails on an unparseable endpoint, an invalid extra operation spec,
    /// missing credentials (when no custom signer is set), or transport
    /// construction failure.
    pub fn build(self) -> Result<MwsClient, MwsError> {
        let Self {
            endpoint,
            credentials,
            version,
            timeout,
            transport,
            signer,
            extra_operations,
        } = self;

        let endpoint = Url::parse(endpoint.as_deref().unwrap_or(DEFAULT_ENDPOINT))?;
        let version = version.unwrap_or_else(|| DEFAULT_VERSION.to_string());

        let signer = match signer {
            Some(signer) => signer,
            None => {
                let credentials = credentials.ok_or_else(|| MwsError::Signature {
                    message: "credentials are required unless a custom signer is provided"
                        .to_string(),
                })?;
                Arc::new(QueryStringSigner::new(credentials, version))
            }
        };

        let transport: Arc<dyn HttpTransport> = match transport {
            Some(transport) => transport,
            None => match timeout {
                Some(timeout) => Arc::new(ReqwestTransport::with_timeout(timeout)?),
                None => Arc::new(ReqwestTransport::new()?),
            },
        };

        let mut registry = Registry::standard()?;
        for spec in extra_operations {
            registry.register(spec)?;
        }

        Ok(MwsClient {
            endpoint,
            registry: Arc::new(registry),
            transport,
            signer,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::client::operation::ResultShape;

    use super::*;

    #[test]
    fn build_requires_credentials_or_a_custom_signer() {
        let err = MwsClientBuilder::default().build().unwrap_err();
        assert!(matches!(err, MwsError::Signature { .. }));
    }

    #[test]
    fn invalid_endpoint_is_rejected() {
        let err = MwsClientBuilder::default()
            .with_credentials(Credentials::new("key", "secret", "seller"))
            .with_endpoint("not a url")
            .build()
            .unwrap_err();
        assert!(matches!(err, MwsError::UrlError(_)));
    }

    #[test]
    fn extra_operations_are_validated_at_build_time() {
        let err = MwsClientBuilder::default()
            .with_credentials(Credentials::new("key", "secret", "seller"))
            .with_operation(OperationSpec {
                action: "SubmitFeed", // collides with the standard table
                params: &[],
                result: ResultShape::Raw,
            })
            .build()
            .unwrap_err();
        assert!(matches!(err, MwsError::InvalidOperationSpec { .. }));
    }
}
