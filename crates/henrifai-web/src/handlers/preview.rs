//! 렌더 미리보기 핸들러.
//!
//! - `GET /?message=`: 미리보기 작성자로 렌더링한 PNG
//! - `GET /html?message=`: 템플릿을 디스크에서 다시 읽은 뒤 병합한 HTML 문서

use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use henrifai_core::models::render::RenderRequest;
use tracing::{debug, warn};

use crate::error::ApiError;
use crate::handlers::PreviewQuery;
use crate::AppState;

/// GET /: PNG 미리보기
pub async fn preview_image(
    State(state): State<AppState>,
    Query(query): Query<PreviewQuery>,
) -> Result<Response, ApiError> {
    let request = RenderRequest::new(&state.preview_author, &query.message);
    let outcome = state.pipeline.render(&request).await?;

    if outcome.is_degraded() {
        debug!(degraded = ?outcome.degraded, "미리보기 렌더링 (일부 이모지 세트 없음)");
    }

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "image/png")],
        outcome.image.into_bytes(),
    )
        .into_response())
}

/// GET /html: 병합된 HTML 문서
pub async fn preview_html(
    State(state): State<AppState>,
    Query(query): Query<PreviewQuery>,
) -> Result<Html<String>, ApiError> {
    if let Err(e) = state.pipeline.templates().reload().await {
        warn!("템플릿 재로드 실패, 기존 템플릿 사용: {e}");
    }

    let request = RenderRequest::new(&state.preview_author, &query.message);
    let ctx = state.pipeline.prepare(&request);
    let html = state.pipeline.document(&ctx)?;
    Ok(Html(html))
}
