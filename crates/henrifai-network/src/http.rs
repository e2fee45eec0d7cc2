//! 공통 HTTP 유틸리티.
//!
//! 클라이언트 생성, 상태 코드 → `CoreError` 매핑, exponential backoff 재시도.

use henrifai_core::error::CoreError;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// 429 응답에 Retry-After가 없을 때 기본 대기 시간 (초)
pub const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

/// 재시도 정책
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// 최대 재시도 횟수 (첫 시도 제외)
    pub max_retries: u32,
    /// 첫 재시도 대기 시간
    pub initial_delay: Duration,
    /// 대기 시간 상한
    pub max_delay: Duration,
}

impl RetryPolicy {
    /// 재시도 횟수만 지정한 정책 (1s → 2s → 4s, 최대 30s)
    pub fn with_max_retries(max_retries: u32) -> Self {
        Self {
            max_retries,
            ..Self::default()
        }
    }

    /// 재시도 없음
    pub fn none() -> Self {
        Self::with_max_retries(0)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
        }
    }
}

/// 타임아웃이 설정된 HTTP 클라이언트 생성
pub fn build_client(timeout: Duration) -> Result<reqwest::Client, CoreError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| CoreError::Network(format!("HTTP 클라이언트 빌드 실패: {e}")))
}

/// 전송 에러 매핑: 타임아웃/연결 실패는 재시도 가능한 `Network`
pub fn send_error(context: &str, err: reqwest::Error) -> CoreError {
    CoreError::Network(format!("{context}: {err}"))
}

/// 응답 상태 코드 확인 및 에러 매핑
///
/// 401/403 → `Auth`, 404 → `NotFound`, 429 → `RateLimit`, 503 → `ServiceUnavailable`.
pub async fn check_response(
    resp: reqwest::Response,
    resource: &str,
) -> Result<reqwest::Response, CoreError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let retry_after = resp
        .headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(DEFAULT_RETRY_AFTER_SECS);

    let text = resp.text().await.unwrap_or_else(|e| {
        warn!("응답 본문 읽기 실패: {e}");
        String::new()
    });

    match status.as_u16() {
        401 | 403 => Err(CoreError::Auth(format!("{resource} 인증 실패: {text}"))),
        404 => Err(CoreError::NotFound {
            resource_type: resource.to_string(),
            id: text,
        }),
        429 => Err(CoreError::RateLimit {
            retry_after_secs: retry_after,
        }),
        503 => Err(CoreError::ServiceUnavailable(text)),
        _ => Err(CoreError::Internal(format!(
            "{resource} 에러 ({status}): {text}"
        ))),
    }
}

/// 재시도가 포함된 요청 실행
///
/// 재시도 가능한 에러만 다시 시도한다. RateLimit은 서버 지정 대기 시간을 따른다.
pub async fn execute_with_retry<F, Fut, T>(policy: RetryPolicy, operation: F) -> Result<T, CoreError>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, CoreError>>,
{
    let mut delay = policy.initial_delay;
    let mut attempt = 0;

    loop {
        match operation().await {
            Ok(result) => return Ok(result),
            Err(e) => {
                if !e.is_retryable() || attempt >= policy.max_retries {
                    return Err(e);
                }
                attempt += 1;

                let wait = match &e {
                    CoreError::RateLimit { retry_after_secs } => {
                        Duration::from_secs(*retry_after_secs)
                    }
                    _ => delay,
                };
                warn!(
                    "요청 실패 (시도 {attempt}/{}): {e}, {wait:?} 후 재시도",
                    policy.max_retries + 1
                );

                tokio::time::sleep(wait).await;
                delay = (delay * 2).min(policy.max_delay);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast(max_retries: u32) -> RetryPolicy {
        RetryPolicy {
            max_retries,
            initial_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(4),
        }
    }

    async fn get(server: &mockito::ServerGuard, path: &str) -> Result<reqwest::Response, CoreError> {
        let client = build_client(Duration::from_secs(5)).unwrap();
        let resp = client
            .get(format!("{}{path}", server.url()))
            .send()
            .await
            .map_err(|e| send_error("테스트 요청 실패", e))?;
        check_response(resp, "Test").await
    }

    #[test]
    fn default_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_retries, 3);
        assert_eq!(policy.initial_delay, Duration::from_secs(1));
        assert_eq!(RetryPolicy::none().max_retries, 0);
    }

    #[tokio::test]
    async fn status_mapping() {
        let mut server = mockito::Server::new_async().await;
        let _m401 = server.mock("GET", "/401").with_status(401).create_async().await;
        let _m404 = server
            .mock("GET", "/404")
            .with_status(404)
            .with_body("gone")
            .create_async()
            .await;
        let _m429 = server
            .mock("GET", "/429")
            .with_status(429)
            .with_header("retry-after", "7")
            .create_async()
            .await;
        let _m429d = server.mock("GET", "/429d").with_status(429).create_async().await;
        let _m503 = server.mock("GET", "/503").with_status(503).create_async().await;
        let _m500 = server.mock("GET", "/500").with_status(500).create_async().await;
        let _m200 = server.mock("GET", "/ok").with_status(200).create_async().await;

        assert_matches!(get(&server, "/401").await, Err(CoreError::Auth(_)));
        assert_matches!(
            get(&server, "/404").await,
            Err(CoreError::NotFound { ref id, .. }) if id == "gone"
        );
        assert_matches!(
            get(&server, "/429").await,
            Err(CoreError::RateLimit { retry_after_secs: 7 })
        );
        assert_matches!(
            get(&server, "/429d").await,
            Err(CoreError::RateLimit { retry_after_secs: DEFAULT_RETRY_AFTER_SECS })
        );
        assert_matches!(get(&server, "/503").await, Err(CoreError::ServiceUnavailable(_)));
        assert_matches!(get(&server, "/500").await, Err(CoreError::Internal(_)));
        assert!(get(&server, "/ok").await.is_ok());
    }

    #[tokio::test]
    async fn retries_retryable_until_exhausted() {
        let calls = AtomicU32::new(0);
        let result: Result<(), CoreError> = execute_with_retry(fast(2), || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(CoreError::ServiceUnavailable("busy".into()))
        })
        .await;

        assert_matches!(result, Err(CoreError::ServiceUnavailable(_)));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn non_retryable_fails_immediately() {
        let calls = AtomicU32::new(0);
        let result: Result<(), CoreError> = execute_with_retry(fast(3), || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(CoreError::Auth("bad token".into()))
        })
        .await;

        assert_matches!(result, Err(CoreError::Auth(_)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn recovers_after_transient_failure() {
        let calls = AtomicU32::new(0);
        let result = execute_with_retry(fast(3), || async {
            if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(CoreError::Network("reset".into()))
            } else {
                Ok(42)
            }
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
