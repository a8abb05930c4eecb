//! Interpretation of authentication-layer responses.

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use super::credential::CredentialSource;
use super::endpoint::path_hint;
use super::Status;
use crate::registry::{ProviderClass, WireApi};

/// Everything that can go wrong in a probe. Probe failures never escape as
/// errors: each one is folded into a layer of the result.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub(crate) enum ProbeError {
    #[error("invalid base URL \"{0}\"")]
    InvalidUrl(String),
    #[error("{0}")]
    TransportFailure(String),
    #[error(
        "authentication rejected (HTTP {http_code}){}",
        .vendor_message.as_ref().map(|m| format!(": {m}")).unwrap_or_default()
    )]
    AuthenticationFailed {
        http_code: u16,
        vendor_message: Option<String>,
        suggestions: Vec<String>,
    },
    #[error("endpoint not found (HTTP {http_code})")]
    EndpointNotFound { http_code: u16, hint: String },
    #[error("endpoint reachable but request shape rejected (HTTP {0})")]
    ProtocolMismatch(u16),
    #[error("unexpected HTTP status {0}")]
    UnexpectedStatus(u16),
}

impl ProbeError {
    pub(crate) fn severity(&self) -> Status {
        match self {
            ProbeError::ProtocolMismatch(_) => Status::Warning,
            _ => Status::Error,
        }
    }

    pub(crate) fn http_code(&self) -> Option<u16> {
        match self {
            ProbeError::AuthenticationFailed { http_code, .. }
            | ProbeError::EndpointNotFound { http_code, .. } => Some(*http_code),
            ProbeError::ProtocolMismatch(code) | ProbeError::UnexpectedStatus(code) => {
                Some(*code)
            }
            ProbeError::InvalidUrl(_) | ProbeError::TransportFailure(_) => None,
        }
    }

    pub(crate) fn suggestions(&self) -> Vec<String> {
        match self {
            ProbeError::InvalidUrl(_) => {
                vec!["use an absolute http:// or https:// URL".to_string()]
            }
            ProbeError::AuthenticationFailed { suggestions, .. } => suggestions.clone(),
            ProbeError::EndpointNotFound { hint, .. } => vec![
                "the base URL or wire API path may be wrong".to_string(),
                hint.clone(),
            ],
            ProbeError::ProtocolMismatch(_) => vec![
                "a bare request against a chat-style endpoint is often rejected; \
                 this is usually harmless"
                    .to_string(),
            ],
            ProbeError::TransportFailure(_) | ProbeError::UnexpectedStatus(_) => Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
#[strum(serialize_all = "UPPERCASE")]
pub(crate) enum Method {
    Get,
    Head,
}

/// What was sent in the authentication layer.
#[derive(Debug, Clone, Copy)]
pub(crate) struct AuthRequest<'a> {
    pub base_url: &'a str,
    pub class: ProviderClass,
    pub wire_api: WireApi,
    pub method: Method,
    pub credential_source: CredentialSource,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Verdict {
    Passed(String),
    Failed(ProbeError),
}

impl Verdict {
    pub(crate) fn status(&self) -> Status {
        match self {
            Verdict::Passed(_) => Status::Success,
            Verdict::Failed(err) => err.severity(),
        }
    }
}

pub(crate) fn classify_status(request: &AuthRequest, status: u16, body: Option<&str>) -> Verdict {
    match status {
        200 => Verdict::Passed("endpoint reachable and authenticated".to_string()),
        401 | 403 => {
            let mut suggestions = vec!["check the API key or token".to_string()];

            if request.credential_source == CredentialSource::None {
                suggestions.push(
                    "no credential was supplied; set an environment variable name or a token"
                        .to_string(),
                );
            }

            Verdict::Failed(ProbeError::AuthenticationFailed {
                http_code: status,
                vendor_message: body.and_then(vendor_message),
                suggestions,
            })
        }
        404 | 405 if request.method == Method::Head => {
            Verdict::Passed("endpoint exists, HEAD unsupported".to_string())
        }
        404 => Verdict::Failed(ProbeError::EndpointNotFound {
            http_code: status,
            hint: path_hint(request.base_url, request.class, request.wire_api),
        }),
        405 | 400 => Verdict::Failed(ProbeError::ProtocolMismatch(status)),
        _ => Verdict::Failed(ProbeError::UnexpectedStatus(status)),
    }
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: Option<Value>,
    message: Option<String>,
}

/// Extracts the vendor's error message from an error body. Understands the
/// OpenAI shape (`{"error": {"message", "code"}}`), the Anthropic shape
/// (`{"type": "error", "error": {"type", "message"}}`) and a few looser
/// variants.
pub(crate) fn vendor_message(body: &str) -> Option<String> {
    let envelope: ErrorEnvelope = serde_json::from_str(body.trim()).ok()?;

    let message = match envelope.error {
        Some(Value::Object(error)) => {
            let message = error.get("message").and_then(Value::as_str);
            let code = error
                .get("code")
                .and_then(|c| c.as_str().map(str::to_string).or_else(|| c.as_i64().map(|n| n.to_string())));

            match (message, code) {
                (Some(message), _) => Some(message.to_string()),
                (None, Some(code)) => Some(code),
                (None, None) => None,
            }
        }
        Some(Value::String(message)) => Some(message),
        _ => None,
    };

    message
        .or(envelope.message)
        .map(|m| m.trim().to_string())
        .filter(|m| !m.is_empty())
}
