//! # henrifai-app
//!
//! henrifai 봇 바이너리 진입점.
//! DI 컨테이너 역할, Socket Mode 커맨드 디스패치, 라이프사이클 관리.

mod command_handler;
mod lifecycle;

use anyhow::{Context, Result};
use clap::Parser;
use henrifai_core::config::{AppConfig, RasterizerKind};
use henrifai_core::config_manager::ConfigManager;
use henrifai_core::models::command::SlashCommand;
use henrifai_core::ports::emoji_source::EmojiDatasetSource;
use henrifai_core::ports::rasterizer::Rasterizer;
use henrifai_network::emoji_data::EmojiDataClient;
use henrifai_network::http::RetryPolicy;
use henrifai_network::http_rasterizer::HttpRasterizer;
use henrifai_network::imgur::ImgurUploader;
use henrifai_network::slack::SlackWebClient;
use henrifai_network::socket_mode::SocketModeClient;
use henrifai_render::chrome::ChromeRasterizer;
use henrifai_render::dataset::FileEmojiDataset;
use henrifai_render::{EmojiCatalog, RasterPolicy, RenderPipeline, TemplateStore};
use henrifai_web::WebServer;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::command_handler::CommandHandler;
use crate::lifecycle::LifecycleManager;

/// 이모지 데이터셋 다운로드 타임아웃
const DATASET_TIMEOUT: Duration = Duration::from_secs(30);

/// 커맨드 채널 용량
const COMMAND_CHANNEL_CAPACITY: usize = 64;

/// henrifai: 메시지를 이미지로 바꿔 올리는 Slack 봇
#[derive(Parser, Debug)]
#[command(name = "henrifai")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// 설정 파일 경로 (기본: 플랫폼별 설정 디렉토리의 config.json)
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// 로그 레벨 (trace, debug, info, warn, error)
    #[arg(long, short = 'l', default_value = "info")]
    log_level: String,

    /// 디버그 웹 서버 포트
    #[arg(long, short = 'p')]
    port: Option<u16>,

    /// 레이아웃 템플릿 경로
    #[arg(long, short = 't')]
    template: Option<PathBuf>,

    /// Slack 연결 없이 디버그 웹 서버만 실행
    #[arg(long)]
    no_slack: bool,
}

/// 설정 로드 + 환경변수/CLI 덮어쓰기
fn load_config(args: &Args) -> Result<AppConfig> {
    let manager = match &args.config {
        Some(path) => ConfigManager::with_path(path.clone()),
        None => ConfigManager::new(),
    }
    .context("설정 관리자 초기화 실패")?;
    info!("설정 파일: {}", manager.config_path().display());

    let mut config = manager.get();
    config.apply_env_overrides();
    if let Some(port) = args.port {
        config.web.port = port;
    }
    if let Some(template) = &args.template {
        config.template.path = template.clone();
    }

    config.validate_rasterizer()?;
    Ok(config)
}

/// 기본 이모지 세트 로드: 실패해도 계속 진행
async fn load_baseline(catalog: &EmojiCatalog, config: &AppConfig) {
    let source: Box<dyn EmojiDatasetSource> = match &config.emoji.dataset_path {
        Some(path) => Box::new(FileEmojiDataset::new(path.clone())),
        None => match EmojiDataClient::new(&config.emoji.dataset_url, DATASET_TIMEOUT) {
            Ok(client) => Box::new(client),
            Err(e) => {
                warn!("이모지 데이터셋 클라이언트 생성 실패: {e}");
                return;
            }
        },
    };

    match catalog.load_baseline(source.as_ref()).await {
        Ok(count) => info!("기본 이모지 {count}개 로드"),
        Err(e) => warn!("기본 이모지 로드 실패, 이모지 치환 없이 진행: {e}"),
    }
}

/// 설정에 따른 래스터라이저 생성
fn build_rasterizer(config: &AppConfig) -> Result<Arc<dyn Rasterizer>> {
    let rasterizer: Arc<dyn Rasterizer> = match config.rasterizer.kind {
        RasterizerKind::Chrome => Arc::new(ChromeRasterizer::new(
            config.rasterizer.chrome_path.clone(),
        )),
        RasterizerKind::Http => {
            let endpoint = config.rasterizer.endpoint.as_deref().unwrap_or_default();
            Arc::new(HttpRasterizer::new(endpoint, config.rasterize_timeout())?)
        }
    };
    info!("래스터라이저: {}", rasterizer.name());
    Ok(rasterizer)
}

/// Slack Socket Mode 수신 + 커맨드 디스패치
fn run_slack(
    config: &AppConfig,
    pipeline: Arc<RenderPipeline>,
    lifecycle: &LifecycleManager,
) -> Result<Vec<tokio::task::JoinHandle<()>>> {
    config.validate_for_slack()?;

    let web = Arc::new(SlackWebClient::from_config(&config.slack)?);
    let uploader = ImgurUploader::new(
        &config.imgur.base_url,
        &config.imgur.client_id,
        config.upload_timeout(),
    )?
    .with_retry(RetryPolicy::with_max_retries(config.imgur.max_retries));

    let handler = Arc::new(
        CommandHandler::new(pipeline, web.clone(), Arc::new(uploader), web.clone())
            .with_notify_on_error(config.command.notify_on_error),
    );

    let (tx, mut rx) = mpsc::channel::<SlashCommand>(COMMAND_CHANNEL_CAPACITY);
    let socket = SocketModeClient::new(web, &config.slack.command, config.slack.max_retry_secs);
    let socket_shutdown = lifecycle.subscribe();
    let socket_task = tokio::spawn(async move {
        if let Err(e) = socket.run(tx, socket_shutdown).await {
            error!("Socket Mode 종료: {e}");
        }
    });

    let dispatch_task = tokio::spawn(async move {
        while let Some(command) = rx.recv().await {
            let handler = handler.clone();
            tokio::spawn(async move {
                match handler.handle(&command).await {
                    Ok(Some(outcome)) => {
                        info!(degraded = ?outcome.degraded, "이미지 게시: {}", outcome.link)
                    }
                    Ok(None) => {}
                    Err(e) => error!(user = %command.user_id, "커맨드 처리 실패: {e}"),
                }
            });
        }
        info!("커맨드 디스패치 종료");
    });

    info!("Slack 커맨드 대기: {}", config.slack.command);
    Ok(vec![socket_task, dispatch_task])
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("henrifai v{} 시작", env!("CARGO_PKG_VERSION"));

    let config = load_config(&args)?;

    let catalog = Arc::new(EmojiCatalog::new());
    load_baseline(&catalog, &config).await;

    let templates = Arc::new(TemplateStore::open(config.template.path.clone()));
    let pipeline = Arc::new(RenderPipeline::new(
        catalog,
        templates,
        build_rasterizer(&config)?,
        RasterPolicy::from_config(&config.rasterizer),
    ));

    let lifecycle = LifecycleManager::new();
    let mut tasks = Vec::new();

    if config.web.enabled {
        let server = WebServer::new(pipeline.clone(), config.web.clone());
        info!("디버그 웹 서버: {}", server.url());
        let shutdown_rx = lifecycle.subscribe();
        tasks.push(tokio::spawn(async move {
            if let Err(e) = server.run(shutdown_rx).await {
                error!("디버그 웹 서버 에러: {e}");
            }
        }));
    }

    if args.no_slack {
        info!("Slack 연결 비활성 (--no-slack)");
    } else {
        tasks.extend(run_slack(&config, pipeline.clone(), &lifecycle)?);
    }

    if tasks.is_empty() {
        warn!("실행할 작업 없음 (웹 서버 비활성 + --no-slack)");
        return Ok(());
    }

    lifecycle.wait_for_signal().await;

    for task in tasks {
        if let Err(e) = task.await {
            warn!("작업 종료 대기 실패: {e}");
        }
    }

    info!("henrifai 종료");
    Ok(())
}
