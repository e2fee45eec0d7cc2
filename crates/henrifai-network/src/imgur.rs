//! Imgur 업로드 클라이언트.
//!
//! `ImageHost` 포트 구현. base64 PNG를 익명 업로드하고 공개 링크를 돌려받는다.

use async_trait::async_trait;
use henrifai_core::error::CoreError;
use henrifai_core::ports::image_host::ImageHost;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};

use crate::http::{self, RetryPolicy};

#[derive(Debug, Deserialize)]
struct UploadResponse {
    #[serde(default)]
    data: Option<UploadData>,
}

#[derive(Debug, Deserialize)]
struct UploadData {
    #[serde(default)]
    link: Option<String>,
}

/// Imgur 업로더: `ImageHost` 포트 구현
#[derive(Debug)]
pub struct ImgurUploader {
    client: reqwest::Client,
    base_url: String,
    client_id: String,
    retry: RetryPolicy,
}

impl ImgurUploader {
    /// 새 업로더 생성
    pub fn new(base_url: &str, client_id: &str, timeout: Duration) -> Result<Self, CoreError> {
        if client_id.trim().is_empty() {
            return Err(CoreError::Config("Imgur Client-ID 미설정".to_string()));
        }
        Ok(Self {
            client: http::build_client(timeout)?,
            base_url: base_url.trim_end_matches('/').to_string(),
            client_id: client_id.to_string(),
            retry: RetryPolicy::default(),
        })
    }

    /// 재시도 정책 설정
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    fn upload_body(base64_image: &str, title: Option<&str>) -> serde_json::Value {
        let mut body = serde_json::json!({
            "image": base64_image,
            "type": "base64",
        });
        if let Some(title) = title {
            body["title"] = serde_json::Value::String(title.to_string());
        }
        body
    }
}

#[async_trait]
impl ImageHost for ImgurUploader {
    async fn upload(&self, base64_image: &str, title: Option<&str>) -> Result<String, CoreError> {
        debug!("이미지 업로드: {} bytes (base64)", base64_image.len());

        let url = format!("{}/upload", self.base_url);
        let body = Self::upload_body(base64_image, title);

        let link = http::execute_with_retry(self.retry, || async {
            let resp = self
                .client
                .post(&url)
                .header(
                    reqwest::header::AUTHORIZATION,
                    format!("Client-ID {}", self.client_id),
                )
                .json(&body)
                .send()
                .await
                .map_err(|e| http::send_error("업로드 요청 실패", e))?;

            let resp = http::check_response(resp, "Imgur").await?;
            let parsed: UploadResponse = resp
                .json()
                .await
                .map_err(|e| CoreError::Upload(format!("업로드 응답 파싱 실패: {e}")))?;

            parsed
                .data
                .and_then(|d| d.link)
                .filter(|link| !link.is_empty())
                .ok_or_else(|| CoreError::Upload("응답에 링크 없음".to_string()))
        })
        .await?;

        info!("이미지 업로드 완료: {link}");
        Ok(link)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use mockito::Matcher;

    fn uploader(server: &mockito::ServerGuard) -> ImgurUploader {
        ImgurUploader::new(&server.url(), "abc123", Duration::from_secs(5))
            .unwrap()
            .with_retry(RetryPolicy::none())
    }

    #[test]
    fn empty_client_id_is_config_error() {
        assert_matches!(
            ImgurUploader::new("https://api.imgur.com/3", "  ", Duration::from_secs(1)),
            Err(CoreError::Config(_))
        );
    }

    #[tokio::test]
    async fn upload_returns_link() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/upload")
            .match_header("authorization", "Client-ID abc123")
            .match_body(Matcher::Json(serde_json::json!({
                "image": "iVBORw0KGgo=",
                "title": "a9993e364706816aba3e25717850c26c9cd0d89d",
                "type": "base64",
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"data":{"id":"x1","link":"https://i.imgur.com/x1.png"},"success":true,"status":200}"#,
            )
            .create_async()
            .await;

        let link = uploader(&server)
            .upload(
                "iVBORw0KGgo=",
                Some("a9993e364706816aba3e25717850c26c9cd0d89d"),
            )
            .await
            .unwrap();

        assert_eq!(link, "https://i.imgur.com/x1.png");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn upload_without_title_omits_field() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/upload")
            .match_body(Matcher::Json(serde_json::json!({
                "image": "AAAA",
                "type": "base64",
            })))
            .with_status(200)
            .with_body(r#"{"data":{"link":"https://i.imgur.com/y.png"}}"#)
            .create_async()
            .await;

        let link = uploader(&server).upload("AAAA", None).await.unwrap();
        assert_eq!(link, "https://i.imgur.com/y.png");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn missing_link_is_upload_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/upload")
            .with_status(200)
            .with_body(r#"{"data":{"error":"nope"},"success":false}"#)
            .create_async()
            .await;

        assert_matches!(
            uploader(&server).upload("AAAA", None).await,
            Err(CoreError::Upload(_))
        );
    }

    #[tokio::test]
    async fn rejected_client_id_is_auth_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/upload")
            .with_status(403)
            .with_body(r#"{"data":{"error":"Invalid client_id"}}"#)
            .create_async()
            .await;

        assert_matches!(
            uploader(&server).upload("AAAA", None).await,
            Err(CoreError::Auth(_))
        );
    }
}
