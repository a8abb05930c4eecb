//! Credential fields hold either the name of an environment variable or a
//! literal token. Which one is inferred: a defined, non-empty variable wins,
//! otherwise the value has to look like a token.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum_macros::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub(crate) enum CredentialSource {
    Environment,
    Literal,
    None,
}

#[derive(Clone, PartialEq, Eq)]
pub(crate) struct ResolvedCredential {
    pub value: Option<String>,
    pub source: CredentialSource,
}

// Keep tokens out of logs.
impl std::fmt::Debug for ResolvedCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedCredential")
            .field("value", &self.value.as_ref().map(|_| "<redacted>"))
            .field("source", &self.source)
            .finish()
    }
}

impl ResolvedCredential {
    fn none() -> ResolvedCredential {
        ResolvedCredential {
            value: None,
            source: CredentialSource::None,
        }
    }
}

pub(crate) fn resolve_credential(raw_field: Option<&str>) -> ResolvedCredential {
    resolve_credential_with(raw_field, |name| std::env::var(name).ok())
}

pub(crate) fn resolve_credential_with<F>(raw_field: Option<&str>, lookup: F) -> ResolvedCredential
where
    F: Fn(&str) -> Option<String>,
{
    let field = match raw_field.map(str::trim).filter(|f| !f.is_empty()) {
        Some(field) => field,
        None => return ResolvedCredential::none(),
    };

    if let Some(value) = lookup(field).filter(|v| !v.trim().is_empty()) {
        return ResolvedCredential {
            value: Some(value),
            source: CredentialSource::Environment,
        };
    }

    if looks_like_token(field) {
        return ResolvedCredential {
            value: Some(field.to_string()),
            source: CredentialSource::Literal,
        };
    }

    ResolvedCredential::none()
}

fn looks_like_token(field: &str) -> bool {
    // Anthropic, then OpenAI style keys
    if field.starts_with("sk-ant-") || field.starts_with("sk-") {
        return true;
    }

    // JWT header
    if field.starts_with("eyJ") {
        return true;
    }

    let len = field.chars().count();

    if field.contains('.') && len >= 30 {
        return true;
    }

    len >= 20
        && field
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}
