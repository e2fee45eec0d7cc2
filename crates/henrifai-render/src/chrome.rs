//! 헤드리스 Chrome 래스터라이저.
//!
//! HTML 문서를 호출별 임시 디렉토리에 쓰고 `chromium --headless --screenshot`으로 PNG를 얻는다.
//! 호출이 취소(타임아웃)되면 하위 프로세스는 종료되고 임시 디렉토리는 삭제된다.

use async_trait::async_trait;
use henrifai_core::error::CoreError;
use henrifai_core::models::render::RasterSize;
use henrifai_core::ports::rasterizer::Rasterizer;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::{debug, warn};

/// 헤드리스 Chrome 래스터라이저: `Rasterizer` 포트 구현
#[derive(Debug, Clone)]
pub struct ChromeRasterizer {
    binary: String,
    work_dir: PathBuf,
}

impl ChromeRasterizer {
    /// 실행 파일 이름/경로로 생성 (작업 디렉토리: 시스템 임시 디렉토리)
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            work_dir: std::env::temp_dir(),
        }
    }

    /// 작업 디렉토리 지정
    pub fn with_work_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.work_dir = dir.into();
        self
    }

    /// Chrome 명령 인자 구성
    fn args(page_url: &str, screenshot: &Path, size: RasterSize) -> Vec<String> {
        vec![
            "--headless=new".to_string(),
            "--disable-gpu".to_string(),
            "--hide-scrollbars".to_string(),
            "--no-first-run".to_string(),
            "--default-background-color=00000000".to_string(),
            format!("--window-size={},{}", size.width, size.height),
            format!("--screenshot={}", screenshot.display()),
            page_url.to_string(),
        ]
    }

    async fn run(
        &self,
        html_path: &Path,
        png_path: &Path,
        size: RasterSize,
    ) -> Result<Vec<u8>, CoreError> {
        let page_url = url::Url::from_file_path(html_path)
            .map_err(|_| {
                CoreError::Rasterize(format!("파일 URL 변환 실패: {}", html_path.display()))
            })?
            .to_string();

        let output = Command::new(&self.binary)
            .args(Self::args(&page_url, png_path, size))
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| CoreError::Rasterize(format!("{} 실행 실패: {e}", self.binary)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(CoreError::Rasterize(format!(
                "{} 종료 코드 {:?}: {}",
                self.binary,
                output.status.code(),
                stderr.chars().take(200).collect::<String>()
            )));
        }

        let png = tokio::fs::read(png_path)
            .await
            .map_err(|e| CoreError::Rasterize(format!("스크린샷 읽기 실패: {e}")))?;
        Ok(png)
    }
}

#[async_trait]
impl Rasterizer for ChromeRasterizer {
    async fn rasterize(&self, html: &str, size: RasterSize) -> Result<Vec<u8>, CoreError> {
        // 호출이 중간에 취소되어도 drop 시점에 디렉토리째 삭제된다
        let scratch = tempfile::Builder::new()
            .prefix("henrifai-")
            .tempdir_in(&self.work_dir)?;
        let html_path = scratch.path().join("page.html");
        let png_path = scratch.path().join("page.png");

        tokio::fs::write(&html_path, html).await?;
        debug!(
            path = %html_path.display(),
            width = size.width,
            height = size.height,
            "Chrome 래스터화"
        );

        let result = self.run(&html_path, &png_path, size).await;

        if let Err(e) = scratch.close() {
            warn!("임시 디렉토리 삭제 실패: {e}");
        }

        result
    }

    fn name(&self) -> &str {
        "chrome"
    }
}
