//! HTTP adapter for the progress-tracking API

use crate::ports::{ProgressAck, ProgressReport, ProgressReporter, ReportError};
use async_trait::async_trait;
use reqwest::StatusCode;
use std::time::Duration;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Where and how to reach the progress API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointSettings {
    pub base_url: String,
    pub path: String,
    pub token: Option<String>,
    pub timeout: Duration,
}

impl EndpointSettings {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            path: "/api/reading-progress".to_string(),
            token: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn url(&self) -> String {
        let base = self.base_url.trim_end_matches('/');
        if self.path.is_empty() {
            base.to_string()
        } else if self.path.starts_with('/') {
            format!("{base}{}", self.path)
        } else {
            format!("{base}/{}", self.path)
        }
    }
}

/// Posts progress as JSON and reads back the XP award.
#[derive(Debug, Clone)]
pub struct HttpProgressReporter {
    client: reqwest::Client,
    url: String,
    token: Option<String>,
    timeout: Duration,
}

impl HttpProgressReporter {
    pub fn new(settings: &EndpointSettings) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: settings.url(),
            token: settings.token.clone().filter(|t| !t.is_empty()),
            timeout: settings.timeout,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn auth_request(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => request.header("Authorization", format!("Bearer {token}")),
            None => request,
        }
    }
}

#[async_trait]
impl ProgressReporter for HttpProgressReporter {
    async fn report(
        &self,
        article_id: &str,
        read_percentage: u8,
    ) -> Result<ProgressAck, ReportError> {
        let body = ProgressReport {
            article_id: article_id.to_string(),
            read_percentage,
        };
        let request = self
            .client
            .post(&self.url)
            .json(&body)
            .timeout(self.timeout);

        let response = self
            .auth_request(request)
            .send()
            .await
            .map_err(|e| ReportError::Transport(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(ReportError::Unauthorized);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ReportError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let text = response
            .text()
            .await
            .map_err(|e| ReportError::Transport(e.to_string()))?;
        if text.trim().is_empty() {
            return Ok(ProgressAck::default());
        }
        serde_json::from_str(&text).map_err(|e| ReportError::Decode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::State;
    use axum::http::{header, HeaderMap, StatusCode};
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::{json, Value};
    use std::sync::{Arc, Mutex};
    use tokio::net::TcpListener;

    #[derive(Debug, Clone)]
    struct Received {
        authorization: Option<String>,
        body: Value,
    }

    #[derive(Clone)]
    struct ProgressApi {
        status: StatusCode,
        reply: &'static str,
        received: Arc<Mutex<Vec<Received>>>,
    }

    async fn record_progress(
        State(api): State<ProgressApi>,
        headers: HeaderMap,
        Json(body): Json<Value>,
    ) -> (StatusCode, &'static str) {
        let authorization = headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        api.received.lock().unwrap().push(Received {
            authorization,
            body,
        });
        (api.status, api.reply)
    }

    /// Serves `POST /progress` with a canned reply and records what it was sent.
    async fn serve(
        status: StatusCode,
        reply: &'static str,
    ) -> (String, Arc<Mutex<Vec<Received>>>) {
        let received = Arc::new(Mutex::new(Vec::new()));
        let app = Router::new()
            .route("/progress", post(record_progress))
            .with_state(ProgressApi {
                status,
                reply,
                received: Arc::clone(&received),
            });

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (format!("http://{addr}"), received)
    }

    fn reporter(base_url: &str, token: Option<&str>) -> HttpProgressReporter {
        let mut settings = EndpointSettings::new(base_url);
        settings.path = "/progress".to_string();
        settings.token = token.map(str::to_string);
        settings.timeout = Duration::from_secs(5);
        HttpProgressReporter::new(&settings)
    }

    #[test]
    fn test_url_joining() {
        let mut settings = EndpointSettings::new("https://api.example.com/");
        assert_eq!(
            settings.url(),
            "https://api.example.com/api/reading-progress"
        );
        settings.path = "v1/progress".to_string();
        assert_eq!(settings.url(), "https://api.example.com/v1/progress");
    }

    #[tokio::test]
    async fn test_posts_json_with_bearer_token() {
        let (url, received) = serve(StatusCode::OK, r#"{"xp_earned": 20}"#).await;

        let ack = reporter(&url, Some("s3cret"))
            .report("gm-article", 50)
            .await
            .unwrap();
        assert_eq!(ack.xp_earned, 20);

        let received = received.lock().unwrap();
        assert_eq!(received.len(), 1);
        assert_eq!(received[0].authorization.as_deref(), Some("Bearer s3cret"));
        assert_eq!(
            received[0].body,
            json!({"articleId": "gm-article", "readPercentage": 50})
        );
    }

    #[tokio::test]
    async fn test_missing_xp_is_zero() {
        let (url, received) = serve(StatusCode::OK, r#"{"success": true}"#).await;
        let ack = reporter(&url, None).report("a", 5).await.unwrap();
        assert_eq!(ack, ProgressAck::default());

        let received = received.lock().unwrap();
        assert_eq!(received.len(), 1);
        assert_eq!(received[0].authorization, None);
    }

    #[tokio::test]
    async fn test_empty_body_is_zero() {
        let (url, _received) = serve(StatusCode::OK, "").await;
        let ack = reporter(&url, None).report("a", 5).await.unwrap();
        assert_eq!(ack, ProgressAck::default());
    }

    #[tokio::test]
    async fn test_error_status() {
        let (url, _received) = serve(StatusCode::INTERNAL_SERVER_ERROR, "boom").await;
        let err = reporter(&url, None).report("a", 5).await.unwrap_err();
        assert!(matches!(err, ReportError::Status { status: 500, ref body } if body == "boom"));
    }

    #[tokio::test]
    async fn test_unauthorized() {
        let (url, received) = serve(StatusCode::UNAUTHORIZED, "").await;
        let err = reporter(&url, Some("expired")).report("a", 5).await.unwrap_err();
        assert!(matches!(err, ReportError::Unauthorized));
        assert_eq!(
            received.lock().unwrap()[0].authorization.as_deref(),
            Some("Bearer expired")
        );
    }

    #[tokio::test]
    async fn test_undecodable_body() {
        let (url, _received) = serve(StatusCode::OK, "not json").await;
        let err = reporter(&url, None).report("a", 5).await.unwrap_err();
        assert!(matches!(err, ReportError::Decode(_)));
    }

    #[tokio::test]
    async fn test_connection_refused() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = reporter(&format!("http://{addr}"), None)
            .report("a", 5)
            .await
            .unwrap_err();
        assert!(matches!(err, ReportError::Transport(_)));
    }
}
