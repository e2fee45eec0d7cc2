//! 로컬 이모지 데이터셋 파일.
//!
//! iamcal/emoji-data `emoji.json`과 같은 형식의 파일을 읽는다.

use async_trait::async_trait;
use henrifai_core::error::CoreError;
use henrifai_core::models::emoji::EmojiDataEntry;
use henrifai_core::ports::emoji_source::EmojiDatasetSource;
use std::path::PathBuf;
use tracing::debug;

/// 파일 기반 이모지 데이터셋: `EmojiDatasetSource` 포트 구현
#[derive(Debug, Clone)]
pub struct FileEmojiDataset {
    path: PathBuf,
}

impl FileEmojiDataset {
    /// 새 파일 데이터셋 생성
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl EmojiDatasetSource for FileEmojiDataset {
    async fn fetch_entries(&self) -> Result<Vec<EmojiDataEntry>, CoreError> {
        let content = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            CoreError::catalog_load(
                "baseline",
                format!("데이터셋 파일 읽기 실패: {}: {e}", self.path.display()),
            )
        })?;

        let entries: Vec<EmojiDataEntry> = serde_json::from_str(&content).map_err(|e| {
            CoreError::catalog_load("baseline", format!("데이터셋 파싱 실패: {e}"))
        })?;

        debug!(path = %self.path.display(), count = entries.len(), "로컬 데이터셋 로드");
        Ok(entries)
    }
}
