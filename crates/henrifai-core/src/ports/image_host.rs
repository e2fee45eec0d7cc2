//! 이미지 호스트 포트.
//!
//! 구현: `henrifai-network` crate (Imgur)

use async_trait::async_trait;

use crate::error::CoreError;

/// 이미지 업로드 인터페이스
#[async_trait]
pub trait ImageHost: Send + Sync {
    /// base64 이미지 업로드 후 공개 URL 반환
    async fn upload(&self, base64_image: &str, title: Option<&str>) -> Result<String, CoreError>;
}
