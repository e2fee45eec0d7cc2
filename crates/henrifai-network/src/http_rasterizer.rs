//! 원격 래스터화 서비스 클라이언트.
//!
//! `Rasterizer` 포트 구현. `{html, width, height}`를 POST하고 PNG 바이트를 받는다.
//! 타임아웃/재시도는 렌더 파이프라인이 담당하므로 여기서는 재시도하지 않는다.

use async_trait::async_trait;
use henrifai_core::error::CoreError;
use henrifai_core::models::render::RasterSize;
use henrifai_core::ports::rasterizer::Rasterizer;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

use crate::http;

#[derive(Debug, Serialize)]
struct RasterizeRequest<'a> {
    html: &'a str,
    width: u32,
    height: u32,
}

/// HTTP 래스터라이저
pub struct HttpRasterizer {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpRasterizer {
    /// 새 래스터라이저 생성
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, CoreError> {
        Ok(Self {
            client: http::build_client(timeout)?,
            endpoint: endpoint.to_string(),
        })
    }
}

#[async_trait]
impl Rasterizer for HttpRasterizer {
    async fn rasterize(&self, html: &str, size: RasterSize) -> Result<Vec<u8>, CoreError> {
        debug!("원격 래스터화 요청: {} ({}x{})", self.endpoint, size.width, size.height);

        let resp = self
            .client
            .post(&self.endpoint)
            .json(&RasterizeRequest {
                html,
                width: size.width,
                height: size.height,
            })
            .send()
            .await
            .map_err(|e| CoreError::Rasterize(format!("래스터화 요청 실패: {e}")))?;

        let resp = http::check_response(resp, "Rasterizer")
            .await
            .map_err(|e| CoreError::Rasterize(e.to_string()))?;

        let bytes = resp
            .bytes()
            .await
            .map_err(|e| CoreError::Rasterize(format!("래스터화 응답 읽기 실패: {e}")))?;
        Ok(bytes.to_vec())
    }

    fn name(&self) -> &str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use mockito::Matcher;

    const SIZE: RasterSize = RasterSize {
        width: 600,
        height: 240,
    };

    #[tokio::test]
    async fn returns_png_bytes() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/render")
            .match_body(Matcher::Json(serde_json::json!({
                "html": "<p>hi</p>",
                "width": 600,
                "height": 240,
            })))
            .with_status(200)
            .with_header("content-type", "image/png")
            .with_body([0x89u8, b'P', b'N', b'G'])
            .create_async()
            .await;

        let rasterizer =
            HttpRasterizer::new(&format!("{}/render", server.url()), Duration::from_secs(5))
                .unwrap();
        let png = rasterizer.rasterize("<p>hi</p>", SIZE).await.unwrap();

        assert_eq!(png, vec![0x89, b'P', b'N', b'G']);
        assert_eq!(rasterizer.name(), "http");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn server_error_is_rasterize_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/render")
            .with_status(500)
            .with_body("browser crashed")
            .create_async()
            .await;

        let rasterizer =
            HttpRasterizer::new(&format!("{}/render", server.url()), Duration::from_secs(5))
                .unwrap();

        assert_matches!(
            rasterizer.rasterize("<p/>", SIZE).await,
            Err(CoreError::Rasterize(ref msg)) if msg.contains("browser crashed")
        );
    }
}
