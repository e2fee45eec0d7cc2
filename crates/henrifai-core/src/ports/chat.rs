//! 채팅 플랫폼 응답 포트.
//!
//! 구현: `henrifai-network` crate (Slack `response_url`)

use async_trait::async_trait;

use crate::error::CoreError;
use crate::models::command::CommandResponse;

/// 커맨드 응답 전송 인터페이스
#[async_trait]
pub trait CommandResponder: Send + Sync {
    /// 커맨드에 응답 전송
    async fn respond(&self, response_url: &str, response: &CommandResponse)
        -> Result<(), CoreError>;
}
