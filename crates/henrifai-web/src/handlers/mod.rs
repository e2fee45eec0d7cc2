//! API 핸들러 모듈.

pub mod preview;

use serde::Deserialize;

/// 미리보기 쿼리 파라미터
#[derive(Debug, Default, Deserialize)]
pub struct PreviewQuery {
    /// 렌더링할 메시지 (기본: 빈 문자열)
    #[serde(default)]
    pub message: String,
}
