//! Slack Web API 클라이언트.
//!
//! - `WorkspaceEmojiSource`: `emoji.list` (봇 토큰)
//! - `CommandResponder`: 커맨드 `response_url`로 응답 POST
//! - Socket Mode 연결 URL 발급: `apps.connections.open` (앱 토큰)

use async_trait::async_trait;
use henrifai_core::config::SlackConfig;
use henrifai_core::error::CoreError;
use henrifai_core::models::command::CommandResponse;
use henrifai_core::ports::chat::CommandResponder;
use henrifai_core::ports::emoji_source::WorkspaceEmojiSource;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

use crate::http::{self, RetryPolicy};

#[derive(Debug, Deserialize)]
struct EmojiListResponse {
    #[serde(default)]
    ok: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    emoji: Option<HashMap<String, String>>,
}

#[derive(Debug, Deserialize)]
struct ConnectionsOpenResponse {
    #[serde(default)]
    ok: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    url: Option<String>,
}

/// Slack Web API 클라이언트
pub struct SlackWebClient {
    client: reqwest::Client,
    api_base_url: String,
    bot_token: String,
    app_token: String,
    retry: RetryPolicy,
}

impl SlackWebClient {
    /// 새 Web API 클라이언트 생성
    pub fn new(
        api_base_url: &str,
        bot_token: &str,
        app_token: &str,
        timeout: Duration,
    ) -> Result<Self, CoreError> {
        Ok(Self {
            client: http::build_client(timeout)?,
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            bot_token: bot_token.to_string(),
            app_token: app_token.to_string(),
            retry: RetryPolicy::default(),
        })
    }

    /// 설정에서 클라이언트 생성
    pub fn from_config(config: &SlackConfig) -> Result<Self, CoreError> {
        Self::new(
            &config.api_base_url,
            &config.bot_token,
            &config.app_token,
            Duration::from_millis(config.request_timeout_ms),
        )
    }

    /// 재시도 정책 설정
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    fn endpoint(&self, method: &str) -> String {
        format!("{}/{method}", self.api_base_url)
    }

    /// Socket Mode WebSocket URL 발급 (`apps.connections.open`)
    pub async fn open_connection(&self) -> Result<String, CoreError> {
        let url = self.endpoint("apps.connections.open");

        let parsed: ConnectionsOpenResponse = http::execute_with_retry(self.retry, || async {
            let resp = self
                .client
                .post(&url)
                .bearer_auth(&self.app_token)
                .send()
                .await
                .map_err(|e| http::send_error("apps.connections.open 요청 실패", e))?;
            let resp = http::check_response(resp, "Slack").await?;
            resp.json()
                .await
                .map_err(|e| CoreError::Internal(format!("apps.connections.open 응답 파싱 실패: {e}")))
        })
        .await?;

        if !parsed.ok {
            let reason = parsed.error.unwrap_or_else(|| "unknown_error".to_string());
            return Err(slack_api_error("apps.connections.open", reason));
        }

        parsed
            .url
            .filter(|u| !u.is_empty())
            .ok_or_else(|| CoreError::Internal("apps.connections.open 응답에 url 없음".to_string()))
    }
}

/// Slack `ok: false` 응답 매핑: 인증 관련 코드는 `Auth`
fn slack_api_error(method: &str, reason: String) -> CoreError {
    match reason.as_str() {
        "invalid_auth" | "not_authed" | "account_inactive" | "token_revoked" | "not_allowed_token_type" => {
            CoreError::Auth(format!("{method}: {reason}"))
        }
        _ => CoreError::Internal(format!("{method}: {reason}")),
    }
}

#[async_trait]
impl WorkspaceEmojiSource for SlackWebClient {
    async fn list_custom_emoji(&self) -> Result<HashMap<String, String>, CoreError> {
        let url = self.endpoint("emoji.list");
        debug!("워크스페이스 이모지 조회: {url}");

        let parsed: EmojiListResponse = http::execute_with_retry(self.retry, || async {
            let resp = self
                .client
                .get(&url)
                .bearer_auth(&self.bot_token)
                .send()
                .await
                .map_err(|e| http::send_error("emoji.list 요청 실패", e))?;
            let resp = http::check_response(resp, "Slack").await?;
            resp.json().await.map_err(|e| {
                CoreError::catalog_load("workspace", format!("emoji.list 응답 파싱 실패: {e}"))
            })
        })
        .await?;

        if !parsed.ok {
            let reason = parsed.error.unwrap_or_else(|| "ok 필드 없음".to_string());
            return Err(CoreError::catalog_load("workspace", format!("emoji.list: {reason}")));
        }

        parsed
            .emoji
            .ok_or_else(|| CoreError::catalog_load("workspace", "emoji.list 응답에 emoji 필드 없음"))
    }
}

#[async_trait]
impl CommandResponder for SlackWebClient {
    async fn respond(
        &self,
        response_url: &str,
        response: &CommandResponse,
    ) -> Result<(), CoreError> {
        debug!("커맨드 응답 전송: attachments={}", response.attachments.len());

        http::execute_with_retry(self.retry, || async {
            let resp = self
                .client
                .post(response_url)
                .json(response)
                .send()
                .await
                .map_err(|e| http::send_error("커맨드 응답 전송 실패", e))?;
            http::check_response(resp, "Slack").await?;
            Ok(())
        })
        .await
    }
}
