use url::Url;

use super::classify::ProbeError;
use crate::registry::{ProviderClass, WireApi};

/// Parses a configured base URL. Only absolute http(s) URLs with a host are
/// accepted.
pub(crate) fn parse_base_url(base_url: &str) -> Result<Url, ProbeError> {
    let invalid = || ProbeError::InvalidUrl(base_url.to_string());

    let url = Url::parse(base_url.trim()).map_err(|_| invalid())?;

    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(invalid());
    }

    Ok(url)
}

fn is_version_segment(segment: &str) -> bool {
    segment
        .strip_prefix('v')
        .is_some_and(|digits| !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()))
}

pub(crate) fn test_segment(class: ProviderClass) -> &'static str {
    match class {
        ProviderClass::Anthropic => "messages",
        ProviderClass::OpenAICompatible => "models",
    }
}

/// Builds the URL the authentication layer probes.
///
/// A single trailing slash is ignored. A base already ending in a version
/// segment (`/v1`, `/v2`, ...) gets the test segment appended directly,
/// anything else gets `/v1/` inserted first.
pub(crate) fn build_test_url(base_url: &str, class: ProviderClass) -> Result<Url, ProbeError> {
    let mut url = parse_base_url(base_url)?;

    let versioned = url.path_segments().is_some_and(|segments| {
        let mut segments: Vec<&str> = segments.collect();

        if segments.last() == Some(&"") {
            segments.pop();
        }

        segments.last().is_some_and(|s| is_version_segment(s))
    });

    {
        let mut path = url
            .path_segments_mut()
            .map_err(|_| ProbeError::InvalidUrl(base_url.to_string()))?;

        path.pop_if_empty();

        if !versioned {
            path.push("v1");
        }

        path.push(test_segment(class));
    }

    Ok(url)
}

/// Where the endpoint was expected, shown when the test URL answers 404.
pub(crate) fn path_hint(base_url: &str, class: ProviderClass, wire_api: WireApi) -> String {
    let base = base_url.trim().trim_end_matches('/');

    match (class, wire_api) {
        (ProviderClass::Anthropic, _) => format!(
            "Anthropic-compatible endpoints are expected at {base}/v1/messages; \
             check whether the base URL needs a path prefix such as /anthropic"
        ),
        (ProviderClass::OpenAICompatible, WireApi::Responses) => format!(
            "the responses wire API expects {base}/v1/responses; \
             switch the connector to the chat wire API if the provider only offers /v1/chat/completions"
        ),
        (ProviderClass::OpenAICompatible, WireApi::Chat) => format!(
            "the chat wire API expects {base}/v1/chat/completions and {base}/v1/models; \
             the base URL usually ends in /v1"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn openai(base: &str) -> String {
        build_test_url(base, ProviderClass::OpenAICompatible)
            .unwrap()
            .to_string()
    }

    #[test]
    fn test_versioning() {
        assert_eq!(openai("https://api.example.com/v1"), "https://api.example.com/v1/models");
        assert_eq!(openai("https://api.example.com"), "https://api.example.com/v1/models");
        assert_eq!(openai("https://api.example.com/v2"), "https://api.example.com/v2/models");
        assert_eq!(openai("https://api.example.com/v1/"), "https://api.example.com/v1/models");
        assert_eq!(openai("https://api.example.com/"), "https://api.example.com/v1/models");
    }

    #[test]
    fn test_prefixed_paths() {
        assert_eq!(
            openai("https://openrouter.ai/api/v1"),
            "https://openrouter.ai/api/v1/models"
        );
        assert_eq!(
            openai("http://localhost:8080/proxy"),
            "http://localhost:8080/proxy/v1/models"
        );
        // "version" is not a version segment
        assert_eq!(
            openai("https://api.example.com/version"),
            "https://api.example.com/version/v1/models"
        );
    }

    #[test]
    fn test_anthropic_segment() {
        let url = build_test_url("https://gw.example.com/anthropic", ProviderClass::Anthropic).unwrap();

        assert_eq!(url.as_str(), "https://gw.example.com/anthropic/v1/messages");
    }

    #[test]
    fn test_invalid_urls() {
        for base in ["", "not a url", "ftp://example.com", "api.example.com/v1", "file:///tmp"] {
            assert!(
                matches!(
                    build_test_url(base, ProviderClass::OpenAICompatible),
                    Err(ProbeError::InvalidUrl(_))
                ),
                "{base}"
            );
        }
    }

    #[test]
    fn test_version_segment() {
        assert!(is_version_segment("v1"));
        assert!(is_version_segment("v10"));
        assert!(!is_version_segment("v"));
        assert!(!is_version_segment("v1beta"));
        assert!(!is_version_segment("api"));
    }

    #[test]
    fn test_path_hint_mentions_base() {
        let hint = path_hint("https://gw.example.com/", ProviderClass::Anthropic, WireApi::Chat);

        assert!(hint.contains("https://gw.example.com/v1/messages"));
    }
}
