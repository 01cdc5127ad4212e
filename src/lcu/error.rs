// Error handling for LCU discovery, requests and snapshot assembly

use thiserror::Error;

/// Discovery failed. Expected while the client is closed; retried on a timer.
#[derive(Debug, Error)]
pub enum LocateError {
  #[error("no running {0} process found")]
  ProcessNotFound(String),

  #[error("client process found but {0} is missing from its arguments")]
  MissingArgument(&'static str),

  #[error("no valid lockfile found")]
  LockfileNotFound,

  #[error("failed to list processes: {0}")]
  ProcessListing(String),
}

#[derive(Debug, Error)]
pub enum ApiError {
  /// No connection info is held; nothing was sent.
  #[error("not connected to the League client")]
  Disconnected,

  #[error("{path} returned HTTP {status}")]
  Http { path: String, status: u16 },

  /// The held credential was refused (401/403); the client likely restarted.
  #[error("{path} rejected the credential with HTTP {status}")]
  Unauthorized { path: String, status: u16 },

  #[error("request to {path} failed: {message}")]
  Network { path: String, message: String },

  #[error("request to {path} timed out")]
  Timeout { path: String },

  #[error("invalid response body from {path}: {message}")]
  InvalidBody { path: String, message: String },
}

impl ApiError {
  pub fn status(&self) -> Option<u16> {
    match self {
      Self::Http { status, .. } | Self::Unauthorized { status, .. } => Some(*status),
      _ => None,
    }
  }

  pub fn is_connectivity(&self) -> bool {
    matches!(
      self,
      Self::Disconnected | Self::Network { .. } | Self::Timeout { .. } | Self::Unauthorized { .. }
    )
  }

  /// The gateway no longer holds a usable connection. A timeout does not
  /// count: one slow request says nothing about the others.
  pub fn is_client_lost(&self) -> bool {
    matches!(
      self,
      Self::Disconnected | Self::Network { .. } | Self::Unauthorized { .. }
    )
  }
}

#[derive(Debug, Error)]
pub enum AssembleError {
  #[error("client not found: {0}")]
  NotFound(#[from] LocateError),

  #[error(transparent)]
  Api(#[from] ApiError),

  /// The gameflow and champion select endpoints disagreed; try again next cycle.
  #[error("incomplete champion select state: {0}")]
  IncompleteState(String),
}

impl AssembleError {
  /// True when the failure means the client is unreachable rather than
  /// reachable but returning something unusable.
  pub fn is_connectivity(&self) -> bool {
    match self {
      Self::NotFound(_) => true,
      Self::Api(err) => err.is_connectivity(),
      Self::IncompleteState(_) => false,
    }
  }
}

/// Why a single roster entry was dropped from the snapshot.
#[derive(Debug, Error)]
pub(crate) enum PlayerError {
  #[error("roster entry has no summoner id")]
  MissingSummonerId,

  #[error("summoner {id} lookup failed: {source}")]
  Summoner { id: u64, source: ApiError },
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_connectivity_classification() {
    assert!(AssembleError::from(LocateError::LockfileNotFound).is_connectivity());
    assert!(AssembleError::from(ApiError::Disconnected).is_connectivity());
    assert!(AssembleError::from(ApiError::Timeout { path: "/x".into() }).is_connectivity());
    assert!(!AssembleError::from(ApiError::Http {
      path: "/x".into(),
      status: 404
    })
    .is_connectivity());
    assert!(!AssembleError::IncompleteState("no session".into()).is_connectivity());
    assert!(AssembleError::from(ApiError::Unauthorized {
      path: "/x".into(),
      status: 401
    })
    .is_connectivity());
  }

  #[test]
  fn test_timeout_is_not_a_lost_client() {
    assert!(!ApiError::Timeout { path: "/x".into() }.is_client_lost());
    assert!(ApiError::Disconnected.is_client_lost());
    assert!(ApiError::Network {
      path: "/x".into(),
      message: "refused".into()
    }
    .is_client_lost());
    assert!(ApiError::Unauthorized {
      path: "/x".into(),
      status: 403
    }
    .is_client_lost());
  }

  #[test]
  fn test_http_status_accessor() {
    let err = ApiError::Http {
      path: "/lol-champ-select/v1/session".into(),
      status: 404,
    };
    assert_eq!(err.status(), Some(404));
    assert_eq!(
      err.to_string(),
      "/lol-champ-select/v1/session returned HTTP 404"
    );
    assert_eq!(ApiError::Disconnected.status(), None);
  }
}
