//! HTTP probe logic.
//!
//! Sends a single GET against the picks API with the appropriate auth
//! header, capturing status code and full body. One probe per TCP
//! connection; the harness is sequential and volumes are tiny.

use std::time::Duration;

use http_body_util::BodyExt;
use serde_json::Value;
use tracing::debug;

use pickwatch_core::config::HarnessConfig;
use pickwatch_core::error::{HarnessError, HarnessResult};

use crate::retry::RetryPolicy;

/// Result of a single HTTP probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// 2xx response with body.
    Ok { status: u16, body: String },
    /// Non-2xx response with body.
    HttpError { status: u16, body: String },
    /// Connection error, handshake failure, or timeout.
    Failed { reason: String },
}

/// Which auth header the endpoint expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Auth {
    /// No auth header (e.g. `/health`).
    None,
    /// `X-API-Key` (the `/live/*` surface).
    ApiKey,
    /// `X-Admin-Token` (the `/ops/*` and `/internal/*` surfaces).
    Admin,
}

/// Parsed probe target: host:port plus an optional path prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetUrl {
    pub address: String,
    pub path_prefix: String,
}

impl TargetUrl {
    /// Parse a base URL like `http://api.internal:8080` or
    /// `http://10.0.0.5:8080/v2`.
    ///
    /// Only plain http is supported; the harness runs inside the
    /// perimeter and the backend terminates TLS at its edge.
    pub fn parse(base_url: &str) -> HarnessResult<Self> {
        let rest = base_url
            .strip_prefix("http://")
            .ok_or_else(|| {
                HarnessError::Config(format!(
                    "base_url must start with http:// (got {base_url:?})"
                ))
            })?
            .trim_end_matches('/');

        let (authority, prefix) = match rest.find('/') {
            Some(idx) => (&rest[..idx], &rest[idx..]),
            None => (rest, ""),
        };
        if authority.is_empty() {
            return Err(HarnessError::Config(format!("empty host in {base_url:?}")));
        }

        let address = if authority.contains(':') {
            authority.to_string()
        } else {
            format!("{authority}:80")
        };

        Ok(Self {
            address,
            path_prefix: prefix.to_string(),
        })
    }

    fn full_path(&self, path: &str) -> String {
        format!("{}{path}", self.path_prefix)
    }
}

/// Probes the picks API, attaching auth headers and applying the retry
/// policy for transient failures.
#[derive(Debug, Clone)]
pub struct Prober {
    target: TargetUrl,
    api_key: Option<String>,
    admin_token: Option<String>,
    timeout: Duration,
    policy: RetryPolicy,
}

impl Prober {
    pub fn from_config(config: &HarnessConfig) -> HarnessResult<Self> {
        Ok(Self {
            target: TargetUrl::parse(&config.target.base_url)?,
            api_key: config.target.api_key.clone(),
            admin_token: config.target.admin_token.clone(),
            timeout: config.timeout(),
            policy: RetryPolicy::new(
                config.retry.max_attempts,
                config.base_backoff(),
                config.max_backoff(),
            ),
        })
    }

    pub fn target(&self) -> &TargetUrl {
        &self.target
    }

    fn auth_header(&self, auth: Auth) -> Option<(&'static str, &str)> {
        match auth {
            Auth::None => None,
            Auth::ApiKey => self.api_key.as_deref().map(|k| ("x-api-key", k)),
            Auth::Admin => self.admin_token.as_deref().map(|t| ("x-admin-token", t)),
        }
    }

    /// Execute a single GET probe. Never errors; failures are encoded in
    /// the outcome so the caller decides whether they fail the check.
    pub async fn fetch(&self, path: &str, auth: Auth) -> ProbeOutcome {
        let full_path = self.target.full_path(path);
        http_get(
            &self.target.address,
            &full_path,
            self.auth_header(auth),
            self.timeout,
        )
        .await
    }

    /// Single-attempt fetch, parsed as JSON. Maps each failure class to
    /// its `HarnessError` variant.
    pub async fn fetch_json(&self, path: &str, auth: Auth) -> HarnessResult<Value> {
        match self.fetch(path, auth).await {
            ProbeOutcome::Ok { body, .. } => {
                serde_json::from_str(&body).map_err(|e| HarnessError::Json {
                    endpoint: path.to_string(),
                    reason: e.to_string(),
                })
            }
            ProbeOutcome::HttpError { status, .. } => Err(HarnessError::Status {
                endpoint: path.to_string(),
                status,
            }),
            ProbeOutcome::Failed { reason } => Err(HarnessError::Network {
                endpoint: path.to_string(),
                reason,
            }),
        }
    }

    /// Fetch with retries. Transient failures back off exponentially;
    /// the last error is returned once attempts are exhausted.
    pub async fn get_json(&self, path: &str, auth: Auth) -> HarnessResult<Value> {
        let mut backoff = self.policy.base_backoff();
        let mut last_err = None;

        for attempt in 1..=self.policy.max_attempts() {
            match self.fetch_json(path, auth).await {
                Ok(value) => {
                    if attempt > 1 {
                        debug!(%path, attempt, "probe recovered after retry");
                    }
                    return Ok(value);
                }
                Err(e) if e.is_transient() && attempt < self.policy.max_attempts() => {
                    debug!(%path, attempt, error = %e, backoff_ms = backoff.as_millis() as u64,
                        "transient probe failure, backing off");
                    tokio::time::sleep(backoff).await;
                    backoff = self.policy.next_backoff(backoff);
                    last_err = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        // Unreachable unless max_attempts is 0, which config rejects.
        Err(last_err.unwrap_or_else(|| HarnessError::Network {
            endpoint: path.to_string(),
            reason: "no attempts executed".to_string(),
        }))
    }
}

/// Raw HTTP GET over a fresh TCP connection.
async fn http_get(
    address: &str,
    path: &str,
    auth_header: Option<(&'static str, &str)>,
    timeout: Duration,
) -> ProbeOutcome {
    let uri = format!("http://{address}{path}");

    let result = tokio::time::timeout(timeout, async {
        let stream = match tokio::net::TcpStream::connect(address).await {
            Ok(s) => s,
            Err(e) => {
                debug!(error = %e, %uri, "probe connection failed");
                return ProbeOutcome::Failed {
                    reason: format!("connect: {e}"),
                };
            }
        };

        let io = hyper_util::rt::TokioIo::new(stream);
        let (mut sender, conn) = match hyper::client::conn::http1::handshake(io).await {
            Ok(pair) => pair,
            Err(e) => {
                debug!(error = %e, %uri, "probe handshake failed");
                return ProbeOutcome::Failed {
                    reason: format!("handshake: {e}"),
                };
            }
        };

        // Drive the connection in the background.
        tokio::spawn(async move {
            let _ = conn.await;
        });

        let mut builder = http::Request::builder()
            .method("GET")
            .uri(&uri)
            .header("host", address)
            .header("accept", "application/json")
            .header("user-agent", "pickwatch/0.1");
        if let Some((name, value)) = auth_header {
            builder = builder.header(name, value);
        }
        let req = match builder.body(http_body_util::Empty::<bytes::Bytes>::new()) {
            Ok(r) => r,
            Err(e) => {
                return ProbeOutcome::Failed {
                    reason: format!("request build: {e}"),
                };
            }
        };

        let resp = match sender.send_request(req).await {
            Ok(r) => r,
            Err(e) => {
                debug!(error = %e, %uri, "probe request failed");
                return ProbeOutcome::Failed {
                    reason: format!("request: {e}"),
                };
            }
        };

        let status = resp.status().as_u16();
        let body = match resp.into_body().collect().await {
            Ok(collected) => String::from_utf8_lossy(&collected.to_bytes()).into_owned(),
            Err(e) => {
                return ProbeOutcome::Failed {
                    reason: format!("body read: {e}"),
                };
            }
        };

        if (200..300).contains(&status) {
            ProbeOutcome::Ok { status, body }
        } else {
            debug!(status, %uri, "probe non-2xx");
            ProbeOutcome::HttpError { status, body }
        }
    })
    .await;

    match result {
        Ok(outcome) => outcome,
        Err(_) => {
            debug!(%uri, "probe timed out");
            ProbeOutcome::Failed {
                reason: format!("timeout after {}ms", timeout.as_millis()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_plain_host_port() {
        let t = TargetUrl::parse("http://api.internal:8080").unwrap();
        assert_eq!(t.address, "api.internal:8080");
        assert_eq!(t.path_prefix, "");
    }

    #[test]
    fn parse_defaults_port_80() {
        let t = TargetUrl::parse("http://picks.example.com").unwrap();
        assert_eq!(t.address, "picks.example.com:80");
    }

    #[test]
    fn parse_keeps_path_prefix() {
        let t = TargetUrl::parse("http://10.0.0.5:8080/v2").unwrap();
        assert_eq!(t.address, "10.0.0.5:8080");
        assert_eq!(t.path_prefix, "/v2");
        assert_eq!(t.full_path("/health"), "/v2/health");
    }

    #[test]
    fn parse_strips_trailing_slash() {
        let t = TargetUrl::parse("http://api:8080/").unwrap();
        assert_eq!(t.path_prefix, "");
    }

    #[test]
    fn parse_rejects_https_and_garbage() {
        assert!(TargetUrl::parse("https://api:8080").is_err());
        assert!(TargetUrl::parse("api:8080").is_err());
        assert!(TargetUrl::parse("http://").is_err());
    }

    #[tokio::test]
    async fn probe_closed_port_fails() {
        let outcome = http_get("127.0.0.1:1", "/health", None, Duration::from_millis(200)).await;
        assert!(matches!(outcome, ProbeOutcome::Failed { .. }));
    }
}
