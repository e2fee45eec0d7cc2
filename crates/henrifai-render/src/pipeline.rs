//! 렌더 파이프라인.
//!
//! 메시지 합성 → 워터마크 계산 → 템플릿 병합 → 래스터화.
//! 래스터화는 1회 타임아웃과 타임아웃 시 재시도 횟수를 적용한다.

use henrifai_core::config::RasterizerConfig;
use henrifai_core::error::CoreError;
use henrifai_core::models::render::{
    DegradedReason, RasterSize, RenderContext, RenderOutcome, RenderRequest, RenderedImage,
};
use henrifai_core::ports::rasterizer::Rasterizer;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::catalog::EmojiCatalog;
use crate::compositor;
use crate::identity;
use crate::template::TemplateStore;

/// 래스터화 정책
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RasterPolicy {
    /// 출력 크기
    pub size: RasterSize,
    /// 1회 타임아웃
    pub timeout: Duration,
    /// 타임아웃 시 재시도 횟수
    pub retries_on_timeout: u32,
}

impl RasterPolicy {
    /// 설정에서 정책 생성
    pub fn from_config(config: &RasterizerConfig) -> Self {
        Self {
            size: RasterSize {
                width: config.width,
                height: config.height,
            },
            timeout: Duration::from_millis(config.timeout_ms),
            retries_on_timeout: config.retries_on_timeout,
        }
    }
}

/// 메시지 → 이미지 렌더 파이프라인
pub struct RenderPipeline {
    catalog: Arc<EmojiCatalog>,
    templates: Arc<TemplateStore>,
    rasterizer: Arc<dyn Rasterizer>,
    policy: RasterPolicy,
}

impl RenderPipeline {
    /// 새 파이프라인 생성
    pub fn new(
        catalog: Arc<EmojiCatalog>,
        templates: Arc<TemplateStore>,
        rasterizer: Arc<dyn Rasterizer>,
        policy: RasterPolicy,
    ) -> Self {
        Self {
            catalog,
            templates,
            rasterizer,
            policy,
        }
    }

    /// 이모지 카탈로그
    pub fn catalog(&self) -> &Arc<EmojiCatalog> {
        &self.catalog
    }

    /// 템플릿 저장소
    pub fn templates(&self) -> &Arc<TemplateStore> {
        &self.templates
    }

    /// 렌더 컨텍스트 생성 (현재 시각 사용)
    pub fn prepare(&self, request: &RenderRequest) -> RenderContext {
        self.prepare_with_time(request, identity::time_now())
    }

    /// 렌더 컨텍스트 생성 (시각 지정)
    pub fn prepare_with_time(&self, request: &RenderRequest, timestamp: String) -> RenderContext {
        RenderContext {
            composed_markup: compositor::compose(&request.raw_text, &self.catalog),
            timestamp,
            watermark_color: identity::color_for(&request.author_id),
        }
    }

    /// 컨텍스트를 템플릿에 병합한 HTML 문서
    pub fn document(&self, ctx: &RenderContext) -> Result<String, CoreError> {
        self.templates.require()?.merge(ctx)
    }

    /// 요청을 이미지로 렌더링
    ///
    /// 템플릿이 없으면 래스터라이저를 호출하지 않고 `TemplateMissing`을 반환한다.
    pub async fn render(&self, request: &RenderRequest) -> Result<RenderOutcome, CoreError> {
        let template = self.templates.require()?;
        let ctx = self.prepare(request);
        let html = template.merge(&ctx)?;

        let png = self.rasterize(&html).await?;
        let degraded = self.degraded_reasons();
        if !degraded.is_empty() {
            debug!(?degraded, "이모지 세트 일부 미로드 상태로 렌더링");
        }

        Ok(RenderOutcome {
            image: RenderedImage::new(png),
            degraded,
        })
    }

    /// 타임아웃/재시도 정책을 적용한 래스터화
    pub async fn rasterize(&self, html: &str) -> Result<Vec<u8>, CoreError> {
        let attempts = self.policy.retries_on_timeout.saturating_add(1);

        for attempt in 1..=attempts {
            let call = self.rasterizer.rasterize(html, self.policy.size);
            match tokio::time::timeout(self.policy.timeout, call).await {
                Ok(Ok(png)) if png.is_empty() => {
                    return Err(CoreError::Rasterize(format!(
                        "{}: 빈 이미지",
                        self.rasterizer.name()
                    )));
                }
                Ok(result) => return result,
                Err(_) => {
                    warn!(
                        "래스터화 타임아웃 (시도 {attempt}/{attempts}, {}, {:?})",
                        self.rasterizer.name(),
                        self.policy.timeout
                    );
                }
            }
        }

        Err(CoreError::ExecutionTimeout {
            timeout_ms: u64::try_from(self.policy.timeout.as_millis()).unwrap_or(u64::MAX),
        })
    }

    fn degraded_reasons(&self) -> Vec<DegradedReason> {
        let status = self.catalog.status();
        let mut reasons = Vec::new();
        if !status.baseline_loaded {
            reasons.push(DegradedReason::BaselineEmojiUnavailable);
        }
        if !status.workspace_loaded {
            reasons.push(DegradedReason::WorkspaceEmojiUnavailable);
        }
        reasons
    }
}
