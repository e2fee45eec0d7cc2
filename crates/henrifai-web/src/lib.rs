//! # henrifai-web
//!
//! 로컬 디버그 웹 서버.
//! 채팅 플랫폼을 거치지 않고 렌더 결과를 확인한다.
//!
//! ## 기능
//! - `GET /?message=`: PNG 미리보기
//! - `GET /html?message=`: 템플릿 재로드 후 병합된 HTML

pub mod error;
pub mod handlers;
pub mod routes;

use axum::Router;
use henrifai_core::config::WebConfig;
use henrifai_render::RenderPipeline;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

/// 포트 바인드 최대 시도 횟수
const MAX_PORT_ATTEMPTS: u16 = 10;

/// 웹 서버 애플리케이션 상태
#[derive(Clone)]
pub struct AppState {
    /// 렌더 파이프라인
    pub pipeline: Arc<RenderPipeline>,
    /// 미리보기 작성자 식별자
    pub preview_author: String,
}

/// 디버그 웹 서버
pub struct WebServer {
    config: WebConfig,
    state: AppState,
}

impl WebServer {
    /// 새 웹 서버 생성
    pub fn new(pipeline: Arc<RenderPipeline>, config: WebConfig) -> Self {
        let state = AppState {
            pipeline,
            preview_author: config.preview_author.clone(),
        };
        Self { config, state }
    }

    /// 라우터 구성
    pub fn router(&self) -> Router {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        Router::new()
            .merge(routes::preview_routes())
            .layer(
                ServiceBuilder::new()
                    .layer(TraceLayer::new_for_http())
                    .layer(cors),
            )
            .with_state(self.state.clone())
    }

    /// 서버 실행
    ///
    /// 설정 포트가 사용 중이면 다음 포트를 시도한다 (최대 10개).
    /// `shutdown_rx`가 `true`가 되면 진행 중인 요청을 마치고 종료한다.
    pub async fn run(self, mut shutdown_rx: watch::Receiver<bool>) -> Result<(), std::io::Error> {
        let host = if self.config.allow_external {
            "0.0.0.0"
        } else {
            "127.0.0.1"
        };

        let app = self.router();
        let (listener, addr) = bind_with_fallback(host, self.config.port).await?;
        info!("디버그 웹 서버 시작: http://{addr}");

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                loop {
                    if *shutdown_rx.borrow() {
                        info!("웹 서버 종료 신호 수신");
                        break;
                    }
                    if shutdown_rx.changed().await.is_err() {
                        break;
                    }
                }
            })
            .await?;

        info!("디버그 웹 서버 종료");
        Ok(())
    }

    /// 서버 URL 반환 (설정 포트 기준)
    pub fn url(&self) -> String {
        format!("http://localhost:{}", self.config.port)
    }
}

/// 기본 포트부터 차례로 바인드 시도
///
/// `AddrInUse`만 다음 포트로 넘어가고 다른 에러는 즉시 반환한다.
async fn bind_with_fallback(
    host: &str,
    base_port: u16,
) -> Result<(TcpListener, SocketAddr), std::io::Error> {
    let mut last_error = None;

    for attempt in 0..MAX_PORT_ATTEMPTS {
        let Some(port) = base_port.checked_add(attempt) else {
            break;
        };

        let addr: SocketAddr = match format!("{host}:{port}").parse() {
            Ok(a) => a,
            Err(e) => {
                error!("잘못된 주소 {host}:{port}: {e}");
                continue;
            }
        };

        match TcpListener::bind(addr).await {
            Ok(listener) => {
                if attempt > 0 {
                    warn!("포트 {base_port} 사용 불가, 대체 포트 {port} 사용");
                }
                let bound = listener.local_addr().unwrap_or(addr);
                return Ok((listener, bound));
            }
            Err(e) if e.kind() == std::io::ErrorKind::AddrInUse => {
                warn!("포트 {port} 이미 사용 중, 다음 포트 시도");
                last_error = Some(e);
            }
            Err(e) => return Err(e),
        }
    }

    Err(last_error.unwrap_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::AddrInUse,
            format!(
                "포트 {}-{} 모두 사용 불가",
                base_port,
                base_port.saturating_add(MAX_PORT_ATTEMPTS - 1)
            ),
        )
    }))
}
