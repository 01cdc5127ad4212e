// Authenticated request layer for the local client API

use parking_lot::RwLock;
use reqwest::{header, Method, StatusCode};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::error::{ApiError, LocateError};
use super::locator::ConnectionSource;
use super::types::ConnectionInfo;
use crate::logging::redact;

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy)]
pub struct GatewaySettings {
  pub request_timeout: Duration,
  pub connect_timeout: Duration,
}

impl Default for GatewaySettings {
  fn default() -> Self {
    Self {
      request_timeout: DEFAULT_REQUEST_TIMEOUT,
      connect_timeout: DEFAULT_CONNECT_TIMEOUT,
    }
  }
}

/// Issues requests against the discovered client and owns its connection info.
///
/// Never retries on its own: a failed request is reported once and the
/// caller decides when to try again.
pub struct ApiGateway {
  http: reqwest::Client,
  source: Arc<dyn ConnectionSource>,
  connection: RwLock<Option<ConnectionInfo>>,
}

impl ApiGateway {
  pub fn new(source: Arc<dyn ConnectionSource>) -> reqwest::Result<Self> {
    Self::with_settings(source, GatewaySettings::default())
  }

  pub fn with_settings(
    source: Arc<dyn ConnectionSource>,
    settings: GatewaySettings,
  ) -> reqwest::Result<Self> {
    // The client serves a self-signed certificate on 127.0.0.1 only.
    let http = reqwest::Client::builder()
      .danger_accept_invalid_certs(true)
      .timeout(settings.request_timeout)
      .connect_timeout(settings.connect_timeout)
      .pool_max_idle_per_host(2)
      .build()?;

    Ok(Self {
      http,
      source,
      connection: RwLock::new(None),
    })
  }

  pub fn connection(&self) -> Option<ConnectionInfo> {
    self.connection.read().clone()
  }

  pub fn is_connected(&self) -> bool {
    self.connection.read().is_some()
  }

  /// Run discovery and replace the held connection info.
  pub fn connect(&self) -> Result<ConnectionInfo, LocateError> {
    let info = self.source.locate()?;
    let mut current = self.connection.write();
    if current.as_ref() != Some(&info) {
      info!(
        base_url = %info.base_url,
        credential = %redact(&info.credential),
        "connected to League client"
      );
    }
    *current = Some(info.clone());
    Ok(info)
  }

  /// Return the held connection, running discovery only when there is none.
  pub fn ensure_connected(&self) -> Result<ConnectionInfo, LocateError> {
    if let Some(info) = self.connection() {
      return Ok(info);
    }
    self.connect()
  }

  pub fn disconnect(&self) {
    if self.connection.write().take().is_some() {
      info!("dropped League client connection");
    }
  }

  pub async fn get(&self, path: &str) -> Result<serde_json::Value, ApiError> {
    self.request(Method::GET, path, None).await
  }

  pub async fn request(
    &self,
    method: Method,
    path: &str,
    body: Option<&serde_json::Value>,
  ) -> Result<serde_json::Value, ApiError> {
    let Some(connection) = self.connection() else {
      return Err(ApiError::Disconnected);
    };

    let url = format!("{}{}", connection.base_url.trim_end_matches('/'), path);
    let mut request = self
      .http
      .request(method.clone(), &url)
      .header(header::AUTHORIZATION, connection.authorization_header())
      .header(header::ACCEPT, "application/json");
    if let Some(body) = body {
      request = request.json(body);
    }

    let response = match request.send().await {
      Ok(response) => response,
      Err(e) if e.is_timeout() => {
        debug!(%method, path, "request timed out");
        return Err(ApiError::Timeout {
          path: path.to_string(),
        });
      }
      Err(e) => {
        // The client may have restarted on another port; rediscover next time.
        warn!(%method, path, error = %e, "request failed, discarding connection");
        self.disconnect();
        return Err(ApiError::Network {
          path: path.to_string(),
          message: e.to_string(),
        });
      }
    };

    let status = response.status();
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
      // Same port, new token: the client restarted. Rediscover next time.
      warn!(%method, path, status = status.as_u16(), "credential rejected, discarding connection");
      self.disconnect();
      return Err(ApiError::Unauthorized {
        path: path.to_string(),
        status: status.as_u16(),
      });
    }
    if status != StatusCode::OK {
      debug!(%method, path, status = status.as_u16(), "non-200 response");
      return Err(ApiError::Http {
        path: path.to_string(),
        status: status.as_u16(),
      });
    }

    response.json::<serde_json::Value>().await.map_err(|e| {
      if e.is_timeout() {
        ApiError::Timeout {
          path: path.to_string(),
        }
      } else {
        ApiError::InvalidBody {
          path: path.to_string(),
          message: e.to_string(),
        }
      }
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::lcu::locator::FixedEndpoint;

  struct NeverFound;

  impl ConnectionSource for NeverFound {
    fn locate(&self) -> Result<ConnectionInfo, LocateError> {
      Err(LocateError::ProcessNotFound("LeagueClientUx".into()))
    }
  }

  #[tokio::test]
  async fn test_request_without_connection_is_disconnected() {
    let gateway = ApiGateway::new(Arc::new(NeverFound)).unwrap();
    let err = gateway.get("/lol-gameflow/v1/session").await.unwrap_err();
    assert!(matches!(err, ApiError::Disconnected));
    assert!(gateway.ensure_connected().is_err());
    assert!(!gateway.is_connected());
  }

  #[tokio::test]
  async fn test_refused_connection_is_network_error_and_disconnects() {
    // Bind and drop a listener so the port is very likely closed.
    let port = {
      let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
      listener.local_addr().unwrap().port()
    };
    let info = ConnectionInfo::new(format!("http://127.0.0.1:{}", port), "Y3JlZA==");
    let gateway = ApiGateway::new(Arc::new(FixedEndpoint(info))).unwrap();
    gateway.ensure_connected().unwrap();

    let err = gateway.get("/lol-gameflow/v1/session").await.unwrap_err();
    assert!(err.is_connectivity(), "unexpected error: {err}");
    assert!(!gateway.is_connected());
  }

  /// Test: the client restarted on the same port with a new token
  ///
  /// Expected: the 401 is reported as Unauthorized and the held connection
  /// is dropped so the next cycle runs discovery again.
  #[tokio::test]
  async fn test_rejected_credential_disconnects() {
    let endpoint = crate::mock::MockEndpoint::start(0).await.unwrap();
    let stale = ConnectionInfo::new(endpoint.base_url(), "c3RhbGU6dG9rZW4=");
    let gateway = ApiGateway::new(Arc::new(FixedEndpoint(stale))).unwrap();
    gateway.ensure_connected().unwrap();

    let err = gateway.get("/lol-gameflow/v1/session").await.unwrap_err();
    assert!(matches!(err, ApiError::Unauthorized { status: 401, .. }), "unexpected error: {err}");
    assert!(err.is_connectivity());
    assert!(!gateway.is_connected());

    endpoint.shutdown().await;
  }

  #[test]
  fn test_ensure_connected_reuses_held_connection() {
    let info = ConnectionInfo::from_port_token(1234, "tok");
    let gateway = ApiGateway::new(Arc::new(FixedEndpoint(info.clone()))).unwrap();
    assert_eq!(gateway.ensure_connected().unwrap(), info);
    assert_eq!(gateway.connection(), Some(info));
    gateway.disconnect();
    assert!(gateway.connection().is_none());
  }
}
