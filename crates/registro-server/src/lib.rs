//! Wiring for the `registro` binary: configuration and the top-level router.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use axum::Router;
use registro_api::Settings;
use registro_core::store::RegistryStore;
use serde::Deserialize;
use tower_http::trace::TraceLayer;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `REGISTRO_*` environment variables.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct ServerConfig {
  #[serde(default = "ServerConfig::default_host")]
  pub host:          String,
  #[serde(default = "ServerConfig::default_port")]
  pub port:          u16,
  #[serde(default = "ServerConfig::default_store_path")]
  pub store_path:    PathBuf,
  #[serde(default = "ServerConfig::default_balance_limit")]
  pub balance_limit: u64,
}

impl ServerConfig {
  fn default_host() -> String { "127.0.0.1".to_owned() }

  fn default_port() -> u16 { 8080 }

  fn default_store_path() -> PathBuf { PathBuf::from("registro.db") }

  fn default_balance_limit() -> u64 { Settings::DEFAULT_BALANCE_LIMIT }

  pub fn bind_address(&self) -> String { format!("{}:{}", self.host, self.port) }

  pub fn settings(&self) -> Settings {
    Settings { balance_limit: self.balance_limit }
  }
}

/// Expand a leading `~/` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// The API router with request tracing applied.
pub fn router<S>(store: Arc<S>, config: &ServerConfig) -> Router
where
  S: RegistryStore + 'static,
{
  Router::new()
    .merge(registro_api::api_router(store, config.settings()))
    .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
  use axum::{
    body::Body,
    http::{Request, StatusCode},
  };
  use registro_store_sqlite::SqliteStore;
  use tower::ServiceExt as _;

  use super::*;

  #[test]
  fn empty_config_takes_defaults() {
    let config: ServerConfig = serde_json::from_str("{}").unwrap();
    assert_eq!(config.bind_address(), "127.0.0.1:8080");
    assert_eq!(config.store_path, PathBuf::from("registro.db"));
    assert_eq!(config.settings(), Settings::default());
  }

  #[test]
  fn balance_limit_is_configurable() {
    let config: ServerConfig =
      serde_json::from_str(r#"{"port": 9000, "balance_limit": 500}"#).unwrap();
    assert_eq!(config.port, 9000);
    assert_eq!(config.settings().balance_limit, 500);
  }

  #[test]
  fn tilde_is_left_alone_when_not_leading() {
    let path = Path::new("data/~/registro.db");
    assert_eq!(expand_tilde(path), path);
  }

  #[tokio::test]
  async fn router_serves_api_routes() {
    let store = SqliteStore::open_in_memory().await.expect("in-memory store");
    let config: ServerConfig = serde_json::from_str("{}").unwrap();
    let app = router(Arc::new(store), &config);

    let response = app
      .oneshot(Request::get("/customers").body(Body::empty()).unwrap())
      .await
      .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
  }
}
