//! Access tokens for the device-management API

use echo_relay_shared::DownstreamError;
use serde::Deserialize;
use tracing::debug;

/// Path of the default service account token on the metadata server
pub const METADATA_TOKEN_PATH: &str =
    "/computeMetadata/v1/instance/service-accounts/default/token";

/// Where bearer tokens come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenSource {
    /// A token supplied through configuration
    Static(String),
    /// The instance metadata server of the hosting platform
    MetadataServer { endpoint: String },
}

/// Token response of the metadata server
#[derive(Debug, Deserialize)]
struct MetadataToken {
    access_token: String,
    #[serde(default)]
    expires_in: u64,
}

impl TokenSource {
    /// Pick the token source for the given configuration
    pub fn from_config(access_token: Option<String>, metadata_endpoint: &str) -> Self {
        match access_token {
            Some(token) if !token.is_empty() => TokenSource::Static(token),
            _ => TokenSource::MetadataServer {
                endpoint: metadata_endpoint.trim_end_matches('/').to_string(),
            },
        }
    }

    /// Obtain a bearer token
    ///
    /// Tokens are fetched per call and never cached.
    pub async fn token(&self, client: &reqwest::Client) -> Result<String, DownstreamError> {
        match self {
            TokenSource::Static(token) => Ok(token.clone()),
            TokenSource::MetadataServer { endpoint } => {
                let url = format!("{endpoint}{METADATA_TOKEN_PATH}");
                let response = client
                    .get(&url)
                    .header("Metadata-Flavor", "Google")
                    .send()
                    .await
                    .map_err(|e| DownstreamError::Auth(e.to_string()))?;

                let status = response.status();
                if !status.is_success() {
                    return Err(DownstreamError::Auth(format!(
                        "metadata server replied with status {status}"
                    )));
                }

                let token: MetadataToken = response
                    .json()
                    .await
                    .map_err(|e| DownstreamError::Auth(e.to_string()))?;

                debug!("Obtained access token (expires in {}s)", token.expires_in);
                Ok(token.access_token)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::get;
    use axum::{Json, Router};
    use tokio::net::TcpListener;

    async fn spawn_metadata_server() -> String {
        async fn token(headers: HeaderMap) -> Result<Json<serde_json::Value>, StatusCode> {
            match headers.get("Metadata-Flavor").and_then(|v| v.to_str().ok()) {
                Some("Google") => Ok(Json(serde_json::json!({
                    "access_token": "meta-token",
                    "expires_in": 3599,
                    "token_type": "Bearer"
                }))),
                _ => Err(StatusCode::FORBIDDEN),
            }
        }

        let app = Router::new().route(METADATA_TOKEN_PATH, get(token));
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        format!("http://{addr}")
    }

    #[test]
    fn test_token_source_selection() {
        assert_eq!(
            TokenSource::from_config(Some("abc".into()), "http://metadata"),
            TokenSource::Static("abc".into())
        );
        assert_eq!(
            TokenSource::from_config(Some(String::new()), "http://metadata/"),
            TokenSource::MetadataServer {
                endpoint: "http://metadata".into()
            }
        );
        assert!(matches!(
            TokenSource::from_config(None, "http://metadata"),
            TokenSource::MetadataServer { .. }
        ));
    }

    #[tokio::test]
    async fn test_static_token() {
        let source = TokenSource::Static("abc".into());
        let token = source.token(&reqwest::Client::new()).await.unwrap();
        assert_eq!(token, "abc");
    }

    #[tokio::test]
    async fn test_metadata_server_token() {
        let endpoint = spawn_metadata_server().await;
        let source = TokenSource::MetadataServer { endpoint };

        let token = source.token(&reqwest::Client::new()).await.unwrap();
        assert_eq!(token, "meta-token");
    }

    #[tokio::test]
    async fn test_metadata_server_unreachable() {
        // Bind then drop to get a port nothing listens on
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let source = TokenSource::MetadataServer {
            endpoint: format!("http://{addr}"),
        };
        let result = source.token(&reqwest::Client::new()).await;
        assert!(matches!(result, Err(DownstreamError::Auth(_))));
    }
}
