//! 라우트 정의.

use axum::routing::get;
use axum::Router;

use crate::handlers;
use crate::AppState;

/// 미리보기 라우트 생성
pub fn preview_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::preview::preview_image))
        .route("/html", get(handlers::preview::preview_html))
}
