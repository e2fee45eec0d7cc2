//! 이모지 소스 포트.
//!
//! 구현: `henrifai-network` crate (iamcal 데이터셋, Slack `emoji.list`),
//! `henrifai-render` crate (로컬 데이터셋 파일)

use async_trait::async_trait;
use std::collections::HashMap;

use crate::error::CoreError;
use crate::models::emoji::EmojiDataEntry;

/// 기본 이모지 데이터셋 소스
#[async_trait]
pub trait EmojiDatasetSource: Send + Sync {
    /// 데이터셋 전체 항목 조회
    async fn fetch_entries(&self) -> Result<Vec<EmojiDataEntry>, CoreError>;
}

/// 워크스페이스 커스텀 이모지 소스
#[async_trait]
pub trait WorkspaceEmojiSource: Send + Sync {
    /// 커스텀 이모지 이름 → 값(URL 또는 `alias:<name>`) 조회
    async fn list_custom_emoji(&self) -> Result<HashMap<String, String>, CoreError>;
}
