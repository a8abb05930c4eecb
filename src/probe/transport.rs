//! Wrapper around Reqwest's error type to facilitate exclusive matching, and
//! the single place probe requests are sent from.

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Client, StatusCode};
use std::error::Error as StdError;
use std::fmt;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use url::Url;

use super::classify::Method;
use crate::registry::ProviderClass;

pub(crate) const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorKind {
    ConnectFailed,
    DecodingFailed,
    RedirectPolicyViolated,
    TimedOut,
    Cancelled,
    InvalidHeader,
    UnknownReqwestError,
}

#[derive(Debug)]
pub(crate) struct Error {
    kind: ErrorKind,
    source: Option<reqwest::Error>,
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::new(err)
    }
}

impl Error {
    pub(crate) fn new(err: reqwest::Error) -> Error {
        let kind = if err.is_decode() {
            ErrorKind::DecodingFailed
        } else if err.is_timeout() {
            ErrorKind::TimedOut
        } else if err.is_redirect() {
            ErrorKind::RedirectPolicyViolated
        } else if err.is_connect() {
            ErrorKind::ConnectFailed
        } else {
            ErrorKind::UnknownReqwestError
        };

        Error {
            kind,
            source: Some(err),
        }
    }

    fn from_kind(kind: ErrorKind) -> Error {
        Error { kind, source: None }
    }

    pub(crate) fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// The error and every underlying cause, e.g. "connection failed: error
    /// sending request: dns error: failed to lookup address information".
    pub(crate) fn details(&self) -> String {
        let mut details = self.to_string();
        let mut cause = self.source();

        while let Some(err) = cause {
            let text = err.to_string();

            if !details.ends_with(&text) {
                details.push_str(": ");
                details.push_str(&text);
            }

            cause = err.source();
        }

        details
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ErrorKind::ConnectFailed => write!(f, "connection failed"),
            ErrorKind::DecodingFailed => write!(f, "decoding failed"),
            ErrorKind::RedirectPolicyViolated => write!(f, "redirect policy violated"),
            ErrorKind::TimedOut => write!(f, "timed out"),
            ErrorKind::Cancelled => write!(f, "probe cancelled"),
            ErrorKind::InvalidHeader => write!(f, "credential is not a valid header value"),
            ErrorKind::UnknownReqwestError => write!(f, "request failed"),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source.as_ref().map(|e| e as &(dyn StdError + 'static))
    }
}

#[derive(Debug)]
pub(crate) struct ProbeResponse {
    pub status: StatusCode,
    pub body: Option<String>,
}

fn sensitive(value: &str) -> Result<HeaderValue, Error> {
    let mut value =
        HeaderValue::from_str(value).map_err(|_| Error::from_kind(ErrorKind::InvalidHeader))?;
    value.set_sensitive(true);

    Ok(value)
}

/// `Authorization: Bearer <token>` when a credential is present.
pub(crate) fn bearer_headers(credential: Option<&str>) -> Result<HeaderMap, Error> {
    let mut headers = HeaderMap::new();

    if let Some(token) = credential {
        headers.insert(AUTHORIZATION, sensitive(&format!("Bearer {token}"))?);
    }

    Ok(headers)
}

/// Bearer auth plus whatever the provider class needs to recognize the
/// request as one of its own.
pub(crate) fn protocol_headers(
    class: ProviderClass,
    credential: Option<&str>,
) -> Result<HeaderMap, Error> {
    let mut headers = bearer_headers(credential)?;

    if class == ProviderClass::Anthropic {
        if let Some(token) = credential {
            headers.insert("x-api-key", sensitive(token)?);
        }

        headers.insert("anthropic-version", HeaderValue::from_static(ANTHROPIC_VERSION));
    }

    Ok(headers)
}

/// Sends one probe request. Any HTTP response, whatever its status, is `Ok`.
pub(crate) async fn send(
    client: &Client,
    method: Method,
    url: &Url,
    headers: HeaderMap,
    timeout: Duration,
    cancel: &CancellationToken,
) -> Result<ProbeResponse, Error> {
    let request = match method {
        Method::Get => client.get(url.clone()),
        Method::Head => client.head(url.clone()),
    }
    .headers(headers)
    .timeout(timeout);

    let exchange = async {
        let response = request.send().await?;
        let status = response.status();

        // The body only feeds error messages; failing to read it is not a
        // transport failure.
        let body = match method {
            Method::Get if !status.is_success() => response.text().await.ok(),
            _ => None,
        };

        Ok::<_, Error>(ProbeResponse { status, body })
    };

    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(Error::from_kind(ErrorKind::Cancelled)),
        result = exchange => result,
    }
}
