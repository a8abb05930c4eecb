//! Layered connectivity diagnostics for a configured provider endpoint.
//!
//! A probe answers "will this base URL and credential work?" without running
//! a completion. It runs in two layers:
//!
//! - Connectivity: a `HEAD` against the bare base URL. Any HTTP response at
//!   all passes. Only a transport failure (DNS, TLS, refused connection,
//!   timeout) fails it, and that is the one outcome that skips the next
//!   layer.
//! - Authentication: a request against the provider class's test endpoint
//!   (`/v1/models` for OpenAI-compatible providers, `/v1/messages` for
//!   Anthropic) whose status code is classified into success, warning or
//!   error with suggestions the user can act on.
//!
//! A probe never fails. Every failure mode, including an unparseable base URL
//! and cancellation, is represented in the returned [`ProviderTestResult`],
//! and the overall status is always derived from the layers.

pub(crate) mod classify;
pub(crate) mod credential;
pub(crate) mod endpoint;
pub(crate) mod transport;

use futures_util::future::join_all;
use reqwest::Client;
use serde::Serialize;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use self::classify::{classify_status, AuthRequest, Method, ProbeError, Verdict};
use self::credential::{resolve_credential, ResolvedCredential};
use self::endpoint::{build_test_url, parse_base_url};
use self::transport::ErrorKind;
use crate::registry::{Consumer, Provider, ProviderClass, WireApi};

pub(crate) const CONNECTIVITY_TIMEOUT: Duration = Duration::from_secs(5);
pub(crate) const AUTHENTICATION_TIMEOUT: Duration = Duration::from_secs(8);

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, strum_macros::Display, strum_macros::EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub(crate) enum Status {
    Success,
    Warning,
    Error,
    Skipped,
}

impl Status {
    fn severity(self) -> u8 {
        match self {
            Status::Skipped => 0,
            Status::Success => 1,
            Status::Warning => 2,
            Status::Error => 3,
        }
    }

    /// The worst of the statuses of the layers that ran. Skipped layers do
    /// not count.
    pub(crate) fn worst<I: IntoIterator<Item = Status>>(statuses: I) -> Status {
        statuses
            .into_iter()
            .filter(|s| *s != Status::Skipped)
            .max_by_key(|s| s.severity())
            .unwrap_or(Status::Skipped)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum_macros::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub(crate) enum Layer {
    Connectivity,
    Authentication,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
enum Stage {
    Idle,
    Connectivity,
    Authentication,
    Done,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LayerResult {
    pub layer: Layer,
    pub status: Status,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_code: Option<u16>,
    pub duration_ms: u64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
}

impl LayerResult {
    fn skipped(layer: Layer, reason: &str) -> LayerResult {
        LayerResult {
            layer,
            status: Status::Skipped,
            message: format!("skipped because {reason}"),
            details: None,
            http_code: None,
            duration_ms: 0,
            suggestions: Vec::new(),
        }
    }

    fn failed(layer: Layer, err: ProbeError, details: Option<String>, started: Instant) -> LayerResult {
        LayerResult {
            layer,
            status: err.severity(),
            message: err.to_string(),
            details,
            http_code: err.http_code(),
            duration_ms: elapsed_ms(started),
            suggestions: err.suggestions(),
        }
    }

    fn transport_failure(layer: Layer, err: transport::Error, started: Instant) -> LayerResult {
        let details = err.details();
        let hint = match err.kind() {
            ErrorKind::TimedOut => {
                Some("the endpoint did not answer in time; raise the timeout or check for a proxy")
            }
            ErrorKind::ConnectFailed => {
                Some("check the host name, the port and the network connection")
            }
            ErrorKind::InvalidHeader => {
                Some("the credential contains characters that cannot be sent in a header")
            }
            _ => None,
        };

        let mut result = LayerResult::failed(
            layer,
            ProbeError::TransportFailure(err.to_string()),
            Some(details),
            started,
        );

        result.suggestions.extend(hint.map(str::to_string));
        result
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ProviderTestResult {
    pub success: bool,
    pub layers: Vec<LayerResult>,
    pub summary: String,
}

impl ProviderTestResult {
    fn from_layers(layers: Vec<LayerResult>) -> ProviderTestResult {
        let overall = Status::worst(layers.iter().map(|l| l.status));

        let summary = match overall {
            Status::Success => "all checks passed".to_string(),
            Status::Warning | Status::Error => layers
                .iter()
                .find(|l| l.status == overall)
                .map(|l| format!("{} {}: {}", l.layer, overall, l.message))
                .unwrap_or_else(|| overall.to_string()),
            Status::Skipped => "no checks ran".to_string(),
        };

        ProviderTestResult {
            success: overall == Status::Success,
            layers,
            summary,
        }
    }

    pub(crate) fn overall(&self) -> Status {
        Status::worst(self.layers.iter().map(|l| l.status))
    }
}

/// Per-request timeouts and the signal that aborts an in-flight probe.
#[derive(Debug, Clone)]
pub(crate) struct ProbeOptions {
    pub connectivity_timeout: Duration,
    pub authentication_timeout: Duration,
    pub cancel: CancellationToken,
}

impl Default for ProbeOptions {
    fn default() -> Self {
        ProbeOptions {
            connectivity_timeout: CONNECTIVITY_TIMEOUT,
            authentication_timeout: AUTHENTICATION_TIMEOUT,
            cancel: CancellationToken::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ConnectorReport {
    pub consumer: Consumer,
    pub base_url: String,
    pub result: ProviderTestResult,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ConnectorsReport {
    pub provider_id: String,
    pub success: bool,
    pub reports: Vec<ConnectorReport>,
    pub summary: String,
}

pub(crate) struct Prober {
    client: Client,
    options: ProbeOptions,
}

impl Prober {
    pub(crate) fn new(options: ProbeOptions) -> Prober {
        Prober {
            client: Client::new(),
            options,
        }
    }

    /// Probes one endpoint. `credential_field` is an environment variable
    /// name or a literal token.
    pub(crate) async fn test_provider(
        &self,
        base_url: &str,
        class: ProviderClass,
        wire_api: WireApi,
        credential_field: Option<&str>,
    ) -> ProviderTestResult {
        let credential = resolve_credential(credential_field);

        debug!(
            stage = %Stage::Idle,
            base_url,
            %class,
            credential_source = %credential.source,
            "starting probe"
        );

        let mut layers = Vec::with_capacity(2);

        debug!(stage = %Stage::Connectivity, base_url, "probing");
        let connectivity = self.check_connectivity(base_url, &credential).await;
        let reachable = connectivity.status != Status::Error;
        layers.push(connectivity);

        if reachable {
            debug!(stage = %Stage::Authentication, base_url, "probing");
            layers.push(
                self.check_authentication(base_url, class, wire_api, &credential)
                    .await,
            );
        } else {
            let reason = if self.options.cancel.is_cancelled() {
                "the probe was cancelled"
            } else if parse_base_url(base_url).is_err() {
                "the base URL is invalid"
            } else {
                "the endpoint is unreachable"
            };

            layers.push(LayerResult::skipped(Layer::Authentication, reason));
        }

        let result = ProviderTestResult::from_layers(layers);

        info!(
            stage = %Stage::Done,
            base_url,
            success = result.success,
            summary = %result.summary,
            "probe finished"
        );

        result
    }

    async fn check_connectivity(
        &self,
        base_url: &str,
        credential: &ResolvedCredential,
    ) -> LayerResult {
        let started = Instant::now();

        let url = match parse_base_url(base_url) {
            Ok(url) => url,
            Err(err) => return LayerResult::failed(Layer::Connectivity, err, None, started),
        };

        let headers = match transport::bearer_headers(credential.value.as_deref()) {
            Ok(headers) => headers,
            Err(err) => return LayerResult::transport_failure(Layer::Connectivity, err, started),
        };

        let response = transport::send(
            &self.client,
            Method::Head,
            &url,
            headers,
            self.options.connectivity_timeout,
            &self.options.cancel,
        )
        .await;

        match response {
            Ok(response) => LayerResult {
                layer: Layer::Connectivity,
                status: Status::Success,
                message: format!("endpoint reachable (HTTP {})", response.status.as_u16()),
                details: None,
                http_code: Some(response.status.as_u16()),
                duration_ms: elapsed_ms(started),
                suggestions: Vec::new(),
            },
            Err(err) => LayerResult::transport_failure(Layer::Connectivity, err, started),
        }
    }

    async fn check_authentication(
        &self,
        base_url: &str,
        class: ProviderClass,
        wire_api: WireApi,
        credential: &ResolvedCredential,
    ) -> LayerResult {
        let started = Instant::now();

        let url = match build_test_url(base_url, class) {
            Ok(url) => url,
            Err(err) => return LayerResult::failed(Layer::Authentication, err, None, started),
        };

        let headers = match transport::protocol_headers(class, credential.value.as_deref()) {
            Ok(headers) => headers,
            Err(err) => {
                return LayerResult::transport_failure(Layer::Authentication, err, started)
            }
        };

        let method = match class {
            ProviderClass::Anthropic => Method::Head,
            ProviderClass::OpenAICompatible => Method::Get,
        };

        let response = match self.authenticate(method, &url, headers.clone()).await {
            Ok(response) => response,
            Err(err) => {
                return LayerResult::transport_failure(Layer::Authentication, err, started)
            }
        };

        let code = response.status.as_u16();
        let mut body = response.body;

        // A rejected HEAD carries no body; fetch it to surface the vendor's
        // own explanation.
        if method == Method::Head && matches!(code, 401 | 403) {
            body = self
                .authenticate(Method::Get, &url, headers)
                .await
                .ok()
                .and_then(|r| r.body);
        }

        let request = AuthRequest {
            base_url,
            class,
            wire_api,
            method,
            credential_source: credential.source,
        };

        let details = Some(format!("{method} {url}"));

        let verdict = classify_status(&request, code, body.as_deref());
        let status = verdict.status();

        match verdict {
            Verdict::Passed(message) => LayerResult {
                layer: Layer::Authentication,
                status,
                message,
                details,
                http_code: Some(code),
                duration_ms: elapsed_ms(started),
                suggestions: Vec::new(),
            },
            Verdict::Failed(err) => {
                let mut layer = LayerResult::failed(Layer::Authentication, err, details, started);
                layer.http_code = Some(code);
                layer
            }
        }
    }

    async fn authenticate(
        &self,
        method: Method,
        url: &url::Url,
        headers: reqwest::header::HeaderMap,
    ) -> Result<transport::ProbeResponse, transport::Error> {
        transport::send(
            &self.client,
            method,
            url,
            headers,
            self.options.authentication_timeout,
            &self.options.cancel,
        )
        .await
    }

    /// Probes every connector of `provider` that has a base URL. The probes
    /// run concurrently and independently of each other.
    pub(crate) async fn test_connectors(&self, provider: &Provider) -> ConnectorsReport {
        let targets: Vec<(Consumer, String, WireApi, Option<&str>)> = provider
            .connectors
            .iter()
            .filter_map(|(consumer, connector)| {
                let base_url = connector.base_url.as_deref()?.trim();

                if base_url.is_empty() {
                    return None;
                }

                Some((
                    *consumer,
                    base_url.to_string(),
                    connector.wire_api,
                    provider.effective_credential_field(*consumer),
                ))
            })
            .collect();

        let probes = targets.iter().map(|(consumer, base_url, wire_api, credential)| async move {
            ConnectorReport {
                consumer: *consumer,
                base_url: base_url.clone(),
                result: self
                    .test_provider(base_url, provider.class, *wire_api, *credential)
                    .await,
            }
        });

        let reports = join_all(probes).await;

        let summary = if reports.is_empty() {
            "no connector has a base URL configured".to_string()
        } else {
            reports
                .iter()
                .map(|r| format!("{}: {}", r.consumer, r.result.summary))
                .collect::<Vec<_>>()
                .join("; ")
        };

        ConnectorsReport {
            provider_id: provider.id.clone(),
            success: !reports.is_empty() && reports.iter().all(|r| r.result.success),
            reports,
            summary,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::model::Connector;
    use strum::IntoEnumIterator;
    use wiremock::{matchers, Mock, MockServer, ResponseTemplate};

    fn prober() -> Prober {
        Prober::new(ProbeOptions::default())
    }

    async fn reachable_root(server: &MockServer) {
        Mock::given(matchers::method("HEAD"))
            .and(matchers::path("/"))
            .respond_with(ResponseTemplate::new(200))
            .mount(server)
            .await;
    }

    #[test]
    fn test_worst_status() {
        assert_eq!(
            Status::worst([Status::Success, Status::Warning]),
            Status::Warning
        );
        assert_eq!(Status::worst([Status::Error, Status::Skipped]), Status::Error);
        assert_eq!(
            Status::worst([Status::Warning, Status::Error, Status::Success]),
            Status::Error
        );
        assert_eq!(Status::worst([]), Status::Skipped);

        for status in Status::iter() {
            assert_eq!(Status::worst([status]), status);
        }
    }

    #[test]
    fn test_summary_is_derived() {
        let ok = |layer| LayerResult {
            layer,
            status: Status::Success,
            message: "ok".to_string(),
            details: None,
            http_code: Some(200),
            duration_ms: 1,
            suggestions: Vec::new(),
        };

        let result = ProviderTestResult::from_layers(vec![
            ok(Layer::Connectivity),
            ok(Layer::Authentication),
        ]);
        assert!(result.success);
        assert_eq!(result.summary, "all checks passed");

        let mut warned = ok(Layer::Authentication);
        warned.status = Status::Warning;
        warned.message = "shape rejected".to_string();

        let result = ProviderTestResult::from_layers(vec![ok(Layer::Connectivity), warned]);
        assert!(!result.success);
        assert_eq!(result.overall(), Status::Warning);
        assert_eq!(result.summary, "authentication warning: shape rejected");
    }

    #[tokio::test]
    async fn test_anthropic_invalid_key() {
        let server = MockServer::start().await;
        let token = "sk-ant-REDACTED";

        reachable_root(&server).await;

        Mock::given(matchers::path("/v1/messages"))
            .and(matchers::header("anthropic-version", "2023-06-01"))
            .and(matchers::header("authorization", format!("Bearer {token}").as_str()))
            .respond_with(ResponseTemplate::new(401).set_body_string(
                r#"{"type":"error","error":{"type":"authentication_error","message":"invalid x-api-key"}}"#,
            ))
            .mount(&server)
            .await;

        let result = prober()
            .test_provider(&server.uri(), ProviderClass::Anthropic, WireApi::Chat, Some(token))
            .await;

        assert!(!result.success);
        assert_eq!(result.overall(), Status::Error);
        assert!(result.summary.contains("invalid x-api-key"), "{}", result.summary);

        let auth = &result.layers[1];
        assert_eq!(auth.layer, Layer::Authentication);
        assert_eq!(auth.status, Status::Error);
        assert_eq!(auth.http_code, Some(401));
        assert_eq!(auth.suggestions, vec!["check the API key or token".to_string()]);
    }

    #[tokio::test]
    async fn test_openai_without_credential() {
        let server = MockServer::start().await;

        Mock::given(matchers::method("HEAD"))
            .and(matchers::path("/v1"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        Mock::given(matchers::method("GET"))
            .and(matchers::path("/v1/models"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"data":[]}"#))
            .expect(1)
            .mount(&server)
            .await;

        let base = format!("{}/v1", server.uri());
        let result = prober()
            .test_provider(&base, ProviderClass::OpenAICompatible, WireApi::Chat, None)
            .await;

        assert!(result.success, "{}", result.summary);
        assert_eq!(result.layers.len(), 2);
        assert!(result.layers.iter().all(|l| l.status == Status::Success));

        let requests = server.received_requests().await.unwrap();
        assert!(requests
            .iter()
            .all(|r| !r.headers.contains_key("authorization")));
    }

    #[tokio::test]
    async fn test_connectivity_sends_bearer() {
        let server = MockServer::start().await;
        let token = "sk-proj-connectivity-check";

        Mock::given(matchers::method("HEAD"))
            .and(matchers::path("/v1"))
            .and(matchers::header("authorization", format!("Bearer {token}").as_str()))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(matchers::method("GET"))
            .and(matchers::path("/v1/models"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let base = format!("{}/v1", server.uri());
        let result = prober()
            .test_provider(&base, ProviderClass::OpenAICompatible, WireApi::Chat, Some(token))
            .await;

        assert_eq!(result.layers[0].status, Status::Success);
        assert_eq!(result.layers[0].http_code, Some(204));
        assert!(result.success, "{}", result.summary);
    }

    #[tokio::test]
    async fn test_unresolvable_host() {
        let result = prober()
            .test_provider(
                "http://provider.invalid",
                ProviderClass::OpenAICompatible,
                WireApi::Chat,
                Some("sk-test"),
            )
            .await;

        assert!(!result.success);
        assert_eq!(result.layers[0].status, Status::Error);
        assert!(result.layers[0].details.is_some());
        assert_eq!(result.layers[1].status, Status::Skipped);
        assert_eq!(
            result.layers[1].message,
            "skipped because the endpoint is unreachable"
        );
        assert_eq!(result.overall(), Status::Error);
        assert!(result.summary.starts_with("connectivity error"));
    }

    #[tokio::test]
    async fn test_invalid_base_url() {
        let result = prober()
            .test_provider("api.example.com", ProviderClass::OpenAICompatible, WireApi::Chat, None)
            .await;

        assert_eq!(result.layers[0].status, Status::Error);
        assert!(result.layers[0].message.contains("invalid base URL"));
        assert_eq!(result.layers[1].status, Status::Skipped);
        assert_eq!(result.layers[1].message, "skipped because the base URL is invalid");
    }

    #[tokio::test]
    async fn test_any_status_is_reachable() {
        let server = MockServer::start().await;

        Mock::given(matchers::method("HEAD"))
            .and(matchers::path("/"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        Mock::given(matchers::path("/v1/models"))
            .respond_with(ResponseTemplate::new(405))
            .mount(&server)
            .await;

        let result = prober()
            .test_provider(&server.uri(), ProviderClass::OpenAICompatible, WireApi::Chat, None)
            .await;

        assert_eq!(result.layers[0].status, Status::Success);
        assert_eq!(result.layers[0].http_code, Some(404));
        // 405 on GET
        assert_eq!(result.layers[1].status, Status::Warning);
        assert_eq!(result.overall(), Status::Warning);
    }

    #[tokio::test]
    async fn test_anthropic_head_unsupported() {
        let server = MockServer::start().await;
        reachable_root(&server).await;

        Mock::given(matchers::method("HEAD"))
            .and(matchers::path("/v1/messages"))
            .respond_with(ResponseTemplate::new(405))
            .mount(&server)
            .await;

        let result = prober()
            .test_provider(&server.uri(), ProviderClass::Anthropic, WireApi::Chat, None)
            .await;

        assert!(result.success, "{}", result.summary);
        assert_eq!(result.layers[1].http_code, Some(405));
    }

    #[tokio::test]
    async fn test_not_found_hint() {
        let server = MockServer::start().await;
        reachable_root(&server).await;

        Mock::given(matchers::path("/v1/models"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let result = prober()
            .test_provider(&server.uri(), ProviderClass::OpenAICompatible, WireApi::Responses, None)
            .await;

        let auth = &result.layers[1];
        assert_eq!(auth.status, Status::Error);
        assert!(auth.suggestions.iter().any(|s| s.contains("/v1/responses")));
    }

    #[tokio::test]
    async fn test_server_error_is_verbatim() {
        let server = MockServer::start().await;
        reachable_root(&server).await;

        Mock::given(matchers::path("/v1/models"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let result = prober()
            .test_provider(&server.uri(), ProviderClass::OpenAICompatible, WireApi::Chat, None)
            .await;

        assert_eq!(result.layers[1].status, Status::Error);
        assert_eq!(result.layers[1].message, "unexpected HTTP status 500");
    }

    #[tokio::test]
    async fn test_connectivity_timeout() {
        let server = MockServer::start().await;

        Mock::given(matchers::method("HEAD"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
            .mount(&server)
            .await;

        let prober = Prober::new(ProbeOptions {
            connectivity_timeout: Duration::from_millis(100),
            ..ProbeOptions::default()
        });

        let result = prober
            .test_provider(&server.uri(), ProviderClass::OpenAICompatible, WireApi::Chat, None)
            .await;

        assert_eq!(result.layers[0].status, Status::Error);
        assert_eq!(result.layers[0].message, "timed out");
        assert!(result.layers[0].suggestions[0].contains("did not answer in time"));
        assert_eq!(result.layers[1].status, Status::Skipped);
    }

    #[tokio::test]
    async fn test_cancelled_probe() {
        let server = MockServer::start().await;

        Mock::given(matchers::method("HEAD"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
            .mount(&server)
            .await;

        let options = ProbeOptions::default();
        let cancel = options.cancel.clone();
        let prober = Prober::new(options);

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            cancel.cancel();
        });

        let result = prober
            .test_provider(&server.uri(), ProviderClass::OpenAICompatible, WireApi::Chat, None)
            .await;

        assert_eq!(result.layers[0].message, "probe cancelled");
        assert!(result.layers[0].suggestions.is_empty());
        assert_eq!(result.layers[1].status, Status::Skipped);
        assert_eq!(
            result.layers[1].message,
            "skipped because the probe was cancelled"
        );
        assert!(!result.success);
    }

    #[tokio::test]
    async fn test_connectors_are_independent() {
        let server = MockServer::start().await;
        reachable_root(&server).await;

        Mock::given(matchers::path("/v1/models"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let mut provider = Provider::blank("mixed", ProviderClass::OpenAICompatible);
        provider
            .connectors
            .insert(Consumer::Codex, Connector::with_base_url(&server.uri()));
        provider.connectors.insert(
            Consumer::ClaudeCode,
            Connector::with_base_url("http://claude.invalid"),
        );

        let report = prober().test_connectors(&provider).await;

        assert_eq!(report.reports.len(), 2);
        assert!(!report.success);

        let codex = report
            .reports
            .iter()
            .find(|r| r.consumer == Consumer::Codex)
            .unwrap();
        let claude = report
            .reports
            .iter()
            .find(|r| r.consumer == Consumer::ClaudeCode)
            .unwrap();

        assert!(codex.result.success);
        assert_eq!(claude.result.layers[1].status, Status::Skipped);
        assert!(report.summary.contains("codex: all checks passed"));
    }

    #[tokio::test]
    async fn test_no_connectors() {
        let provider = Provider::blank("empty", ProviderClass::Anthropic);

        let report = prober().test_connectors(&provider).await;

        assert!(!report.success);
        assert!(report.reports.is_empty());
    }
}
