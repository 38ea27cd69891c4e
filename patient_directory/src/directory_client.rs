// patient_directory/src/directory_client.rs

use std::time::Duration;

use async_trait::async_trait;
use lib::config::DirectoryConfig;
use log::{debug, error};
use models::errors::{SchedulingError, SchedulingResult};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, StatusCode};
use serde_json::Value;

/// Anything shorter is treated as an error page rather than a token.
pub const MIN_TOKEN_LEN: usize = 20;

const SEARCH_PATH: &str = "/buscar/segurados";

#[async_trait]
pub trait PatientDirectory: Send + Sync {
    /// First page of beneficiaries matching a name or CPF, passed through as
    /// the directory returned it.
    async fn search(&self, query: &str) -> SchedulingResult<Value>;
}

/// Accepts `{"token": "..."}`, a JSON string, or a raw text body.
pub fn extract_token(body: &str) -> Option<String> {
    let token = match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(map)) => map.get("token").and_then(Value::as_str).map(str::to_string),
        Ok(Value::String(token)) => Some(token),
        Ok(_) => None,
        Err(_) => Some(body.trim().to_string()),
    }?;
    if token.len() < MIN_TOKEN_LEN {
        return None;
    }
    Some(token)
}

fn upstream(status: Option<StatusCode>, message: impl Into<String>) -> SchedulingError {
    let message = message.into();
    error!("Patient directory failure ({:?}): {}", status, message);
    SchedulingError::Upstream { status: status.map(|s| s.as_u16()), message }
}

fn transport(context: &str, err: reqwest::Error) -> SchedulingError {
    upstream(err.status(), format!("{}: {}", context, err))
}

pub struct HttpPatientDirectory {
    client: Client,
    token_url: Option<String>,
    api_url: Option<String>,
    page_size: u32,
}

impl HttpPatientDirectory {
    pub fn new(config: &DirectoryConfig) -> SchedulingResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SchedulingError::Configuration(format!("failed to build directory client: {}", e)))?;
        Ok(HttpPatientDirectory {
            client,
            token_url: config.token_url.clone(),
            api_url: config.api_url.clone(),
            page_size: config.page_size,
        })
    }

    /// Fetched per search; tokens are never reused across requests.
    async fn fetch_token(&self) -> SchedulingResult<String> {
        let url = self
            .token_url
            .as_deref()
            .ok_or_else(|| upstream(None, "directory token URL is not configured"))?;
        let response = self.client.get(url).send().await.map_err(|e| transport("token request", e))?;
        let status = response.status();
        if !status.is_success() {
            return Err(upstream(Some(status), "token endpoint returned an error"));
        }
        let body = response.text().await.map_err(|e| transport("token body", e))?;
        extract_token(&body).ok_or_else(|| upstream(None, "token missing or invalid in response"))
    }
}

#[async_trait]
impl PatientDirectory for HttpPatientDirectory {
    async fn search(&self, query: &str) -> SchedulingResult<Value> {
        let query = query.trim();
        if query.is_empty() {
            return Err(SchedulingError::validation("name is required"));
        }
        let api_url = self
            .api_url
            .as_deref()
            .ok_or_else(|| upstream(None, "directory API URL is not configured"))?;
        let token = self.fetch_token().await?;
        let url = format!("{}{}", api_url.trim_end_matches('/'), SEARCH_PATH);
        let page_size = self.page_size.to_string();
        debug!("Searching patient directory, page size {}", page_size);

        let response = self
            .client
            .get(&url)
            .query(&[("page", "0"), ("size", page_size.as_str()), ("elegivel", "true"), ("nomeCpf", query)])
            .bearer_auth(&token)
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await
            .map_err(|e| transport("directory search", e))?;
        let status = response.status();
        if !status.is_success() {
            return Err(upstream(Some(status), "external directory returned an error"));
        }
        response.json::<Value>().await.map_err(|e| transport("directory response", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::net::SocketAddr;
    use warp::http::StatusCode as WarpStatus;
    use warp::Filter;

    const TOKEN: &str = "abcdefghijklmnopqrstuvwxyz";

    fn config(addr: SocketAddr) -> DirectoryConfig {
        DirectoryConfig {
            token_url: Some(format!("http://{}/token", addr)),
            api_url: Some(format!("http://{}/api/", addr)),
            timeout_secs: 5,
            page_size: 10,
        }
    }

    /// Fake token service plus directory. The search echoes its query string
    /// so the test can see what was forwarded.
    fn spawn_fake(token_body: &'static str, token_status: u16) -> SocketAddr {
        let token = warp::path("token").map(move || {
            warp::reply::with_status(token_body.to_string(), WarpStatus::from_u16(token_status).unwrap())
        });
        let search = warp::path!("api" / "buscar" / "segurados")
            .and(warp::query::<HashMap<String, String>>())
            .and(warp::header::<String>("authorization"))
            .map(|params: HashMap<String, String>, auth: String| {
                if auth != format!("Bearer {}", TOKEN) {
                    return warp::reply::with_status(warp::reply::json(&"bad token"), WarpStatus::UNAUTHORIZED);
                }
                let body = serde_json::json!({ "content": [{ "nome": params["nomeCpf"] }], "query": params });
                warp::reply::with_status(warp::reply::json(&body), WarpStatus::OK)
            });
        let (addr, server) = warp::serve(token.or(search)).bind_ephemeral(([127, 0, 0, 1], 0));
        tokio::spawn(server);
        addr
    }

    #[test]
    fn token_shapes() {
        assert_eq!(extract_token(&format!("{{\"token\":\"{}\"}}", TOKEN)).as_deref(), Some(TOKEN));
        assert_eq!(extract_token(&format!("\"{}\"", TOKEN)).as_deref(), Some(TOKEN));
        assert_eq!(extract_token(&format!("{}\n", TOKEN)).as_deref(), Some(TOKEN));
        assert_eq!(extract_token("{\"token\":\"short\"}"), None);
        assert_eq!(extract_token("{\"other\":1}"), None);
        assert_eq!(extract_token("[]"), None);
    }

    #[tokio::test]
    async fn search_forwards_query_with_fresh_token() {
        let addr = spawn_fake("{\"token\":\"abcdefghijklmnopqrstuvwxyz\"}", 200);
        let directory = HttpPatientDirectory::new(&config(addr)).unwrap();

        let page = directory.search("Ana Silva").await.unwrap();
        assert_eq!(page["content"][0]["nome"], "Ana Silva");
        assert_eq!(page["query"]["size"], "10");
        assert_eq!(page["query"]["page"], "0");
        assert_eq!(page["query"]["elegivel"], "true");
    }

    #[tokio::test]
    async fn failed_token_fetch_propagates_status() {
        let addr = spawn_fake("unavailable", 503);
        let directory = HttpPatientDirectory::new(&config(addr)).unwrap();
        let err = directory.search("Ana").await.unwrap_err();
        assert!(matches!(err, SchedulingError::Upstream { status: Some(503), .. }));
    }

    #[tokio::test]
    async fn short_token_is_rejected() {
        let addr = spawn_fake("{\"token\":\"nope\"}", 200);
        let directory = HttpPatientDirectory::new(&config(addr)).unwrap();
        let err = directory.search("Ana").await.unwrap_err();
        assert!(matches!(err, SchedulingError::Upstream { status: None, .. }));
    }

    #[tokio::test]
    async fn blank_query_is_validation() {
        let directory = HttpPatientDirectory::new(&DirectoryConfig::default()).unwrap();
        assert!(matches!(directory.search("  ").await, Err(SchedulingError::Validation(_))));
    }

    #[tokio::test]
    async fn missing_urls_are_upstream_errors() {
        let directory = HttpPatientDirectory::new(&DirectoryConfig::default()).unwrap();
        assert!(matches!(directory.search("Ana").await, Err(SchedulingError::Upstream { .. })));
    }
}
