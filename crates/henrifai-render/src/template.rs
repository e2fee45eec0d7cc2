//! 레이아웃 템플릿.
//!
//! Handlebars 레이아웃 문서에 렌더 컨텍스트를 병합한다.
//!
//! - `{{name}}`: HTML 이스케이프 후 삽입
//! - `{{{name}}}`: 그대로 삽입 (메시지 마크업용)
//!
//! 슬롯 이름: `message`, `time`, `watermarkColor`. 알 수 없는 이름은 빈 문자열이 된다.

use handlebars::Handlebars;
use henrifai_core::error::CoreError;
use henrifai_core::models::render::RenderContext;
use parking_lot::RwLock;
use serde_json::json;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info};

/// 레지스트리에 등록되는 레이아웃 이름
const LAYOUT: &str = "layout";

/// 컴파일된 레이아웃 템플릿
pub struct LayoutTemplate {
    registry: Handlebars<'static>,
}

impl fmt::Debug for LayoutTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayoutTemplate").finish_non_exhaustive()
    }
}

impl LayoutTemplate {
    /// 템플릿 소스 컴파일
    ///
    /// 문법 오류는 `TemplateMissing`: 쓸 수 있는 레이아웃이 없는 것과 같다.
    pub fn parse(source: &str) -> Result<Self, CoreError> {
        let mut registry = Handlebars::new();
        registry
            .register_template_string(LAYOUT, source)
            .map_err(|e| CoreError::TemplateMissing(format!("템플릿 문법 오류: {e}")))?;
        Ok(Self { registry })
    }

    /// 파일에서 템플릿 로드 (시작 시 1회)
    ///
    /// 파일이 없거나 읽을 수 없으면 `TemplateMissing`.
    pub fn load(path: &Path) -> Result<Self, CoreError> {
        let source = std::fs::read_to_string(path)
            .map_err(|e| CoreError::TemplateMissing(format!("{}: {}", path.display(), e)))?;
        Self::parse(&source)
    }

    /// 렌더 컨텍스트 병합
    pub fn merge(&self, ctx: &RenderContext) -> Result<String, CoreError> {
        let data = json!({
            "message": ctx.composed_markup,
            "time": ctx.timestamp,
            "watermarkColor": ctx.watermark_color,
        });
        self.registry
            .render(LAYOUT, &data)
            .map_err(|e| CoreError::Internal(format!("템플릿 병합 실패: {e}")))
    }
}

/// 템플릿 저장소: 시작 시 로드, 디버그 엔드포인트에서 재로드
#[derive(Debug)]
pub struct TemplateStore {
    path: PathBuf,
    current: RwLock<Option<Arc<LayoutTemplate>>>,
}

impl TemplateStore {
    /// 경로에서 템플릿을 로드해 저장소 생성
    ///
    /// 로드 실패는 에러 로그만 남기고 빈 저장소를 만든다. 이 경우 렌더링은 `TemplateMissing`.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let current = match LayoutTemplate::load(&path) {
            Ok(template) => {
                info!(path = %path.display(), "레이아웃 템플릿 로드");
                Some(Arc::new(template))
            }
            Err(e) => {
                error!("레이아웃 템플릿 로드 실패, 렌더링 비활성: {e}");
                None
            }
        };
        Self {
            path,
            current: RwLock::new(current),
        }
    }

    /// 이미 컴파일된 템플릿으로 저장소 생성
    pub fn from_template(path: impl Into<PathBuf>, template: LayoutTemplate) -> Self {
        Self {
            path: path.into(),
            current: RwLock::new(Some(Arc::new(template))),
        }
    }

    /// 템플릿 파일 경로
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 현재 템플릿
    pub fn current(&self) -> Option<Arc<LayoutTemplate>> {
        self.current.read().clone()
    }

    /// 현재 템플릿, 없으면 `TemplateMissing`
    pub fn require(&self) -> Result<Arc<LayoutTemplate>, CoreError> {
        self.current()
            .ok_or_else(|| CoreError::TemplateMissing(self.path.display().to_string()))
    }

    /// 파일에서 다시 로드
    ///
    /// 읽기나 컴파일에 실패하면 기존 템플릿을 유지한다.
    pub async fn reload(&self) -> Result<Arc<LayoutTemplate>, CoreError> {
        let source = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            CoreError::TemplateMissing(format!("{}: {}", self.path.display(), e))
        })?;
        let template = Arc::new(LayoutTemplate::parse(&source)?);
        *self.current.write() = Some(template.clone());
        Ok(template)
    }
}
