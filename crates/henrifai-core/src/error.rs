//! henrifai 핵심 에러 타입.
//!
//! 모든 어댑터 crate는 자체 에러 타입에서 `#[from] CoreError`로 래핑한다.

use thiserror::Error;

/// 코어 레이어 에러.
/// 카탈로그 로드, 템플릿, 래스터화, 업로드 등 파이프라인 공통 에러를 정의한다.
#[derive(Debug, Error)]
pub enum CoreError {
    /// JSON 직렬화/역직렬화 실패
    #[error("직렬화 에러: {0}")]
    Serialization(#[from] serde_json::Error),

    /// 설정값 오류
    #[error("설정 에러: {0}")]
    Config(String),

    /// 이모지 카탈로그 로드 실패 (기본 세트 또는 워크스페이스 세트)
    ///
    /// 요청을 중단시키지 않는다. 해당 세트는 빈 상태로 남는다.
    #[error("이모지 카탈로그 로드 실패 ({source_name}): {message}")]
    CatalogLoad {
        /// 실패한 세트 (예: "baseline", "workspace")
        source_name: String,
        /// 실패 사유
        message: String,
    },

    /// 레이아웃 템플릿 없음: 템플릿이 로드될 때까지 렌더링 불가
    #[error("레이아웃 템플릿 없음: {0}")]
    TemplateMissing(String),

    /// 래스터화 실패
    #[error("래스터화 실패: {0}")]
    Rasterize(String),

    /// 이미지 호스트 업로드 실패
    #[error("업로드 실패: {0}")]
    Upload(String),

    /// 인증 실패 (토큰 오류, Client-ID 오류 등)
    #[error("인증 에러: {0}")]
    Auth(String),

    /// 리소스를 찾을 수 없음
    #[error("{resource_type} 미발견: {id}")]
    NotFound {
        /// 리소스 종류 (예: "API", "Emoji")
        resource_type: String,
        /// 리소스 식별자
        id: String,
    },

    /// 내부 에러 (예상치 못한 상황)
    #[error("내부 에러: {0}")]
    Internal(String),

    /// 네트워크 에러 (연결 실패, 타임아웃)
    #[error("네트워크 에러: {0}")]
    Network(String),

    /// Rate Limit 초과 (429)
    #[error("요청 한도 초과, {retry_after_secs}초 후 재시도")]
    RateLimit {
        /// 재시도 대기 시간 (초)
        retry_after_secs: u64,
    },

    /// 서비스 일시 불가 (503)
    #[error("서비스 일시 불가: {0}")]
    ServiceUnavailable(String),

    /// 실행 타임아웃
    #[error("실행 타임아웃: {timeout_ms}ms 초과")]
    ExecutionTimeout {
        /// 초과된 타임아웃 시간 (밀리초)
        timeout_ms: u64,
    },

    /// I/O 에러
    #[error("I/O 에러: {0}")]
    Io(#[from] std::io::Error),
}

impl CoreError {
    /// 카탈로그 로드 에러 생성 헬퍼
    pub fn catalog_load(source_name: &str, message: impl Into<String>) -> Self {
        CoreError::CatalogLoad {
            source_name: source_name.to_string(),
            message: message.into(),
        }
    }

    /// 재시도 가능한 에러인지 판별
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            CoreError::Network(_) | CoreError::ServiceUnavailable(_) | CoreError::RateLimit { .. }
        )
    }
}
