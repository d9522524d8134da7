//! REST fallbacks for data the socket does not carry.

use std::time::Duration;

use async_trait::async_trait;
use campus_common::{Notification, UserProfile};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::RealtimeError;

/// Notification endpoints, as a seam for tests.
#[async_trait]
pub trait NotificationApi: Send + Sync {
    async fn list_notifications(&self, user_id: &str) -> Result<Vec<Notification>, RealtimeError>;
    async fn mark_notification_read(&self, id: &str) -> Result<(), RealtimeError>;
    async fn mark_all_notifications_read(&self, user_id: &str) -> Result<(), RealtimeError>;
}

/// Thin client for the web application's REST API.
#[derive(Clone)]
pub struct RestClient {
    http: reqwest::Client,
    base_url: String,
}

impl RestClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, RealtimeError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `GET /api/users/{userId}`
    pub async fn fetch_profile(&self, user_id: &str) -> Result<UserProfile, RealtimeError> {
        let url = format!("{}/api/users/{}", self.base_url, urlencoding::encode(user_id));
        self.get_json(&url).await
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, RealtimeError> {
        debug!(url = %url, "GET");
        let resp = check(self.http.get(url).send().await?).await?;
        Ok(resp.json().await?)
    }

    async fn post_empty(&self, url: &str) -> Result<(), RealtimeError> {
        debug!(url = %url, "POST");
        check(self.http.post(url).send().await?).await?;
        Ok(())
    }
}

async fn check(resp: reqwest::Response) -> Result<reqwest::Response, RealtimeError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let message = resp.text().await.unwrap_or_default();
    Err(RealtimeError::Api {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl NotificationApi for RestClient {
    async fn list_notifications(&self, user_id: &str) -> Result<Vec<Notification>, RealtimeError> {
        let url = format!(
            "{}/api/notifications?userId={}",
            self.base_url,
            urlencoding::encode(user_id)
        );
        self.get_json(&url).await
    }

    async fn mark_notification_read(&self, id: &str) -> Result<(), RealtimeError> {
        let url = format!(
            "{}/api/notifications/{}/read",
            self.base_url,
            urlencoding::encode(id)
        );
        self.post_empty(&url).await
    }

    async fn mark_all_notifications_read(&self, user_id: &str) -> Result<(), RealtimeError> {
        let url = format!(
            "{}/api/notifications/read-all?userId={}",
            self.base_url,
            urlencoding::encode(user_id)
        );
        self.post_empty(&url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::sync::oneshot;

    /// Serve one canned HTTP response and report the request line.
    async fn serve_once(status: &'static str, body: &'static str) -> (String, oneshot::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = oneshot::channel();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 4096];
            let n = socket.read(&mut buf).await.unwrap();
            let request = String::from_utf8_lossy(&buf[..n]).to_string();
            let request_line = request.lines().next().unwrap_or_default().to_string();
            let _ = tx.send(request_line);

            let response = format!(
                "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
        });

        (format!("http://{addr}"), rx)
    }

    fn client(base: &str) -> RestClient {
        RestClient::new(base, Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn fetch_profile_decodes_user() {
        let (base, request) = serve_once(
            "200 OK",
            r#"{"id":"u1","name":"Ada","email":"ada@campus.example.edu","department":"CS"}"#,
        )
        .await;

        let profile = client(&base).fetch_profile("u1").await.unwrap();
        assert_eq!(profile.name, "Ada");
        assert_eq!(profile.department.as_deref(), Some("CS"));
        assert_eq!(request.await.unwrap(), "GET /api/users/u1 HTTP/1.1");
    }

    #[tokio::test]
    async fn list_notifications_passes_user_query() {
        let (base, request) = serve_once(
            "200 OK",
            r#"[{"id":"n1","type":"like","content":"Grace liked your post","isRead":false,"createdAt":"2024-03-01T10:00:00Z","userId":"u1"}]"#,
        )
        .await;

        let items = client(&base).list_notifications("u1").await.unwrap();
        assert_eq!(items.len(), 1);
        assert!(!items[0].is_read);
        assert_eq!(
            request.await.unwrap(),
            "GET /api/notifications?userId=u1 HTTP/1.1"
        );
    }

    #[tokio::test]
    async fn non_success_status_maps_to_api_error() {
        let (base, _request) = serve_once("404 Not Found", r#"{"error":"Notification not found"}"#).await;

        let err = client(&base).mark_notification_read("n9").await.unwrap_err();
        match err {
            RealtimeError::Api { status, message } => {
                assert_eq!(status, 404);
                assert!(message.contains("Notification not found"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn mark_all_read_posts_to_read_all() {
        let (base, request) = serve_once("200 OK", "{}").await;
        client(&base).mark_all_notifications_read("u 1").await.unwrap();
        assert_eq!(
            request.await.unwrap(),
            "POST /api/notifications/read-all?userId=u%201 HTTP/1.1"
        );
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        assert_eq!(client("http://localhost:3000/").base_url(), "http://localhost:3000");
    }
}
