//! 래스터라이저 포트.
//!
//! 구현: `henrifai-render` crate (헤드리스 Chrome),
//! `henrifai-network` crate (HTTP 렌더링 서비스)

use async_trait::async_trait;

use crate::error::CoreError;
use crate::models::render::RasterSize;

/// HTML 문서 → 고정 크기 PNG 변환
#[async_trait]
pub trait Rasterizer: Send + Sync {
    /// 완성된 HTML 문서를 PNG 바이트로 래스터화
    async fn rasterize(&self, html: &str, size: RasterSize) -> Result<Vec<u8>, CoreError>;

    /// 래스터라이저 이름 (로그용)
    fn name(&self) -> &str;
}
