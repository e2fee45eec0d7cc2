//! 유니코드 이모지 데이터셋 클라이언트.
//!
//! `EmojiDatasetSource` 포트 구현. 시작 시 한 번 데이터셋 JSON을 내려받는다.

use async_trait::async_trait;
use henrifai_core::error::CoreError;
use henrifai_core::models::emoji::EmojiDataEntry;
use henrifai_core::ports::emoji_source::EmojiDatasetSource;
use std::time::Duration;
use tracing::debug;

use crate::http::{self, RetryPolicy};

/// 이모지 데이터셋 HTTP 클라이언트
pub struct EmojiDataClient {
    client: reqwest::Client,
    url: String,
    retry: RetryPolicy,
}

impl EmojiDataClient {
    /// 새 데이터셋 클라이언트 생성
    pub fn new(url: &str, timeout: Duration) -> Result<Self, CoreError> {
        Ok(Self {
            client: http::build_client(timeout)?,
            url: url.to_string(),
            retry: RetryPolicy::default(),
        })
    }

    /// 재시도 정책 설정
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

#[async_trait]
impl EmojiDatasetSource for EmojiDataClient {
    async fn fetch_entries(&self) -> Result<Vec<EmojiDataEntry>, CoreError> {
        debug!("이모지 데이터셋 요청: {}", self.url);

        let entries: Vec<EmojiDataEntry> = http::execute_with_retry(self.retry, || async {
            let resp = self
                .client
                .get(&self.url)
                .send()
                .await
                .map_err(|e| http::send_error("데이터셋 요청 실패", e))?;
            let resp = http::check_response(resp, "EmojiDataset").await?;
            resp.json()
                .await
                .map_err(|e| CoreError::catalog_load("baseline", format!("데이터셋 파싱 실패: {e}")))
        })
        .await?;

        debug!("이모지 데이터셋 수신: {}개 항목", entries.len());
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[tokio::test]
    async fn fetch_entries_success() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/emoji.json")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"[
                    {"name":"SMILE","unified":"1F604","short_name":"smile","short_names":["smile"]},
                    {"unified":"1F44D","short_name":"+1","short_names":["+1","thumbsup"],"sort_order":1}
                ]"#,
            )
            .create_async()
            .await;

        let client =
            EmojiDataClient::new(&format!("{}/emoji.json", server.url()), Duration::from_secs(5))
                .unwrap();
        let entries = client.fetch_entries().await.unwrap();

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].short_names, vec!["+1", "thumbsup"]);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn malformed_dataset_is_catalog_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/emoji.json")
            .with_status(200)
            .with_body(r#"{"not":"a list"}"#)
            .create_async()
            .await;

        let client =
            EmojiDataClient::new(&format!("{}/emoji.json", server.url()), Duration::from_secs(5))
                .unwrap()
                .with_retry(RetryPolicy::none());

        assert_matches!(
            client.fetch_entries().await,
            Err(CoreError::CatalogLoad { ref source_name, .. }) if source_name == "baseline"
        );
    }

    #[tokio::test]
    async fn not_found_is_not_retried() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/emoji.json")
            .with_status(404)
            .expect(1)
            .create_async()
            .await;

        let client =
            EmojiDataClient::new(&format!("{}/emoji.json", server.url()), Duration::from_secs(5))
                .unwrap();

        assert_matches!(client.fetch_entries().await, Err(CoreError::NotFound { .. }));
        mock.assert_async().await;
    }
}
