use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use http::header::CONTENT_TYPE;
use http::{HeaderMap, HeaderName, HeaderValue, Method};
use md5::{Digest, Md5};
use url::Url;

use super::args::{Argument, CallArgs};
use super::auth::RequestSigner;
use super::convert::to_wire;
use super::error::MwsError;
use super::operation::{OperationSpec, TypeTag};

/// The `Content-MD5` integrity header, set on body-bearing requests and
/// verified on responses that declare it.
pub(crate) const CONTENT_MD5: HeaderName = HeaderName::from_static("content-md5");

/// A fully-formed outbound request.
///
/// Transient: one per invocation, discarded after the call returns. The verb
/// is POST exactly when a body is present.
#[derive(Debug, Clone)]
pub struct BuiltRequest {
    /// Target URL with all encoded query fields.
    pub url: Url,
    /// GET without a body, POST with one.
    pub method: Method,
    /// Outgoing headers, including integrity headers for body-bearing
    /// requests.
    pub headers: HeaderMap,
    /// The HTTP-BODY parameter's converted content, when supplied.
    pub body: Option<String>,
}

impl BuiltRequest {
    /// Appends one query field to the target URL.
    ///
    /// Used by [`RequestSigner`] implementations to attach authentication
    /// material.
    pub fn append_query(&mut self, name: &str, value: &str) {
        self.url.query_pairs_mut().append_pair(name, value);
    }
}

/// Builds the outbound request for one invocation.
///
/// Walks the spec's parameters in declaration order, converting scalars via
/// the type-conversion collaborator and encoding structured lists as
/// positionally-indexed keys; never mutates `args` and is deterministic for
/// identical inputs (excluding time-dependent signer material).
///
/// # Errors
///
/// Fails fast with [`MwsError::MissingArgument`] before any network I/O when
/// a required parameter is absent; propagates conversion and signing
/// failures.
pub(crate) fn build_request(
    spec: &OperationSpec,
    args: &CallArgs,
    endpoint: &Url,
    signer: &dyn RequestSigner,
) -> Result<BuiltRequest, MwsError> {
    let mut query: Vec<(String, String)> = Vec::new();
    let mut body: Option<String> = None;

    for param in spec.params {
        let Some(argument) = args.get(param.name) else {
            if param.required {
                return Err(MwsError::MissingArgument {
                    name: param.name.to_string(),
                });
            }
            continue;
        };

        match param.tag {
            TypeTag::List(element_type) => {
                let Argument::List(items) = argument else {
                    return Err(MwsError::Conversion {
                        type_tag: "list",
                        message: format!("{} expects an ordered sequence", param.name),
                    });
                };
                // Structured-list convention: Name.ElementType.N, 1-based,
                // elements passed through unconverted.
                for (index, item) in items.iter().enumerate() {
                    query.push((
                        format!("{}.{}.{}", param.name, element_type, index + 1),
                        item.clone(),
                    ));
                }
            }
            TypeTag::HttpBody => {
                let content = to_wire(param.tag, argument)?;
                if body.replace(content).is_some() {
                    return Err(MwsError::InvalidOperationSpec {
                        action: spec.action.to_string(),
                        message: "more than one HTTP-BODY parameter was supplied".to_string(),
                    });
                }
            }
            tag => query.push((param.name.to_string(), to_wire(tag, argument)?)),
        }
    }

    query.push(("Action".to_string(), spec.action.to_string()));

    let mut url = endpoint.clone();
    {
        let mut pairs = url.query_pairs_mut();
        for (name, value) in &query {
            pairs.append_pair(name, value);
        }
    }

    let mut headers = HeaderMap::new();
    let method = if let Some(content) = &body {
        headers.insert(
            CONTENT_MD5,
            HeaderValue::from_str(&content_md5(content.as_bytes()))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/xml"));
        Method::POST
    } else {
        Method::GET
    };

    let mut request = BuiltRequest {
        url,
        method,
        headers,
        body,
    };
    signer.sign(&mut request)?;
    Ok(request)
}

/// Base64-encoded MD5 digest, the `Content-MD5` wire form.
pub(crate) fn content_md5(bytes: &[u8]) -> String {
    BASE64.encode(Md5::digest(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::operation::{ParamSpec, ResultShape};

    #[derive(Debug)]
    struct NoSigner;

    impl RequestSigner for NoSigner {
        fn sign(&self, _request: &mut BuiltRequest) -> Result<(), MwsError> {
            Ok(())
        }
    }

    fn endpoint() -> Url {
        Url::parse("https://mws.example.com/").unwrap()
    }

    fn query_pairs(request: &BuiltRequest) -> Vec<(String, String)> {
        request
            .url
            .query_pairs()
            .map(|(name, value)| (name.into_owned(), value.into_owned()))
            .collect()
    }

    const TAG_LIST_PARAMS: &[ParamSpec] = &[ParamSpec {
        name: "Tags",
        tag: TypeTag::List("Id"),
        required: false,
    }];

    const TAG_LIST_SPEC: OperationSpec = OperationSpec {
        action: "TagThings",
        params: TAG_LIST_PARAMS,
        result: ResultShape::Raw,
    };

    #[test]
    fn structured_list_uses_positional_keys_and_no_bare_key() {
        let args = CallArgs::new().with("Tags", vec!["a", "b", "c"]);
        let request = build_request(&TAG_LIST_SPEC, &args, &endpoint(), &NoSigner).unwrap();

        let pairs = query_pairs(&request);
        assert!(pairs.contains(&("Tags.Id.1".to_string(), "a".to_string())));
        assert!(pairs.contains(&("Tags.Id.2".to_string(), "b".to_string())));
        assert!(pairs.contains(&("Tags.Id.3".to_string(), "c".to_string())));
        assert!(pairs.iter().all(|(name, _)| name != "Tags"));
    }

    #[test]
    fn operations_without_a_body_produce_a_get_with_action() {
        let request =
            build_request(&TAG_LIST_SPEC, &CallArgs::new(), &endpoint(), &NoSigner).unwrap();

        assert_eq!(request.method, Method::GET);
        assert!(request.body.is_none());
        assert!(query_pairs(&request).contains(&("Action".to_string(), "TagThings".to_string())));
    }

    const BODY_PARAMS: &[ParamSpec] = &[
        ParamSpec { name: "FeedContent", tag: TypeTag::HttpBody, required: true },
        ParamSpec { name: "FeedType", tag: TypeTag::Str, required: true },
    ];

    const BODY_SPEC: OperationSpec = OperationSpec {
        action: "SubmitFeed",
        params: BODY_PARAMS,
        result: ResultShape::Raw,
    };

    #[test]
    fn body_parameter_produces_post_with_integrity_headers() {
        let args = CallArgs::new()
            .with("FeedContent", "<xml/>")
            .with("FeedType", "_POST_PRODUCT_DATA_");
        let request = build_request(&BODY_SPEC, &args, &endpoint(), &NoSigner).unwrap();

        assert_eq!(request.method, Method::POST);
        assert_eq!(request.body.as_deref(), Some("<xml/>"));
        assert_eq!(
            request.headers.get(CONTENT_MD5).and_then(|value| value.to_str().ok()),
            Some(content_md5(b"<xml/>").as_str())
        );
        assert_eq!(
            request.headers.get(CONTENT_TYPE).and_then(|value| value.to_str().ok()),
            Some("text/xml")
        );
        // The body parameter never becomes a query field.
        assert!(query_pairs(&request).iter().all(|(name, _)| name != "FeedContent"));
    }

    #[test]
    fn missing_required_argument_fails_fast_and_names_it() {
        let args = CallArgs::new().with("FeedContent", "<xml/>");
        let err = build_request(&BODY_SPEC, &args, &endpoint(), &NoSigner).unwrap_err();
        assert!(matches!(
            err,
            MwsError::MissingArgument { name } if name == "FeedType"
        ));
    }

    #[test]
    fn optional_arguments_are_skipped_when_absent() {
        const OPTIONAL: &[ParamSpec] = &[ParamSpec {
            name: "MaxCount",
            tag: TypeTag::NonNegativeInteger,
            required: false,
        }];
        const SPEC: OperationSpec = OperationSpec {
            action: "CountThings",
            params: OPTIONAL,
            result: ResultShape::Raw,
        };

        let request = build_request(&SPEC, &CallArgs::new(), &endpoint(), &NoSigner).unwrap();
        assert!(query_pairs(&request).iter().all(|(name, _)| name != "MaxCount"));
    }

    #[test]
    fn builder_is_deterministic_for_identical_inputs() {
        let args = CallArgs::new()
            .with("FeedContent", "<xml/>")
            .with("FeedType", "_POST_PRODUCT_DATA_");
        let first = build_request(&BODY_SPEC, &args, &endpoint(), &NoSigner).unwrap();
        let second = build_request(&BODY_SPEC, &args, &endpoint(), &NoSigner).unwrap();
        assert_eq!(first.url, second.url);
        assert_eq!(first.body, second.body);
    }

    #[test]
    fn content_md5_matches_known_vector() {
        // MD5("") = d41d8cd98f00b204e9800998ecf8427e
        assert_eq!(content_md5(b""), "1B2M2Y8AsgTpgAmY7PhCfg==");
    }
}
