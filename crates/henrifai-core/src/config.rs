//! 애플리케이션 설정 구조체.
//!
//! Slack 토큰, 이미지 호스트, 이모지 데이터셋, 레이아웃 템플릿, 래스터라이저,
//! 디버그 웹 서버 설정을 정의한다. `ConfigManager`를 통해 JSON 파일에서 로드하고
//! 비밀값은 환경변수로 덮어쓴다.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::CoreError;

/// 봇 토큰 환경변수
pub const ENV_BOT_TOKEN: &str = "HENRIFAI_BOT_TOKEN";
/// 앱 레벨 토큰 환경변수 (Socket Mode)
pub const ENV_APP_TOKEN: &str = "HENRIFAI_APP_TOKEN";
/// Imgur Client-ID 환경변수
pub const ENV_IMGUR_CLIENT_ID: &str = "HENRIFAI_IMGUR_CLIENT_ID";

/// 최상위 애플리케이션 설정
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Slack 연결 설정
    #[serde(default)]
    pub slack: SlackConfig,
    /// 이미지 호스트(Imgur) 설정
    #[serde(default)]
    pub imgur: ImgurConfig,
    /// 기본 이모지 데이터셋 설정
    #[serde(default)]
    pub emoji: EmojiConfig,
    /// 레이아웃 템플릿 설정
    #[serde(default)]
    pub template: TemplateConfig,
    /// 래스터라이저 설정
    #[serde(default)]
    pub rasterizer: RasterizerConfig,
    /// 디버그 웹 서버 설정
    #[serde(default)]
    pub web: WebConfig,
    /// 커맨드 처리 설정
    #[serde(default)]
    pub command: CommandConfig,
}

// ============================================================
// Slack 설정
// ============================================================

/// Slack 설정: Socket Mode + Web API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlackConfig {
    /// 봇 토큰 (`xoxb-`), `emoji.list` 호출에 사용
    #[serde(default)]
    pub bot_token: String,
    /// 앱 레벨 토큰 (`xapp-`), `apps.connections.open` 호출에 사용
    #[serde(default)]
    pub app_token: String,
    /// Web API 기본 URL
    #[serde(default = "default_slack_api_base_url")]
    pub api_base_url: String,
    /// 처리할 슬래시 커맨드 이름
    #[serde(default = "default_slack_command")]
    pub command: String,
    /// 재연결 최대 대기 시간 (초)
    #[serde(default = "default_slack_max_retry_secs")]
    pub max_retry_secs: u64,
    /// Web API 요청 타임아웃 (밀리초)
    #[serde(default = "default_slack_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl Default for SlackConfig {
    fn default() -> Self {
        Self {
            bot_token: String::new(),
            app_token: String::new(),
            api_base_url: default_slack_api_base_url(),
            command: default_slack_command(),
            max_retry_secs: default_slack_max_retry_secs(),
            request_timeout_ms: default_slack_request_timeout_ms(),
        }
    }
}

// ============================================================
// 이미지 호스트 설정
// ============================================================

/// Imgur 업로드 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImgurConfig {
    /// Client-ID (익명 업로드)
    #[serde(default)]
    pub client_id: String,
    /// API 기본 URL
    #[serde(default = "default_imgur_base_url")]
    pub base_url: String,
    /// 업로드 요청 타임아웃 (밀리초)
    #[serde(default = "default_imgur_timeout_ms")]
    pub timeout_ms: u64,
    /// 재시도 횟수
    #[serde(default = "default_imgur_max_retries")]
    pub max_retries: u32,
}

impl Default for ImgurConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            base_url: default_imgur_base_url(),
            timeout_ms: default_imgur_timeout_ms(),
            max_retries: default_imgur_max_retries(),
        }
    }
}

// ============================================================
// 이모지 / 템플릿 설정
// ============================================================

/// 기본 이모지 데이터셋 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmojiConfig {
    /// 데이터셋 URL (iamcal/emoji-data 형식)
    #[serde(default = "default_emoji_dataset_url")]
    pub dataset_url: String,
    /// 로컬 데이터셋 파일: 지정하면 URL 대신 사용
    #[serde(default)]
    pub dataset_path: Option<PathBuf>,
}

impl Default for EmojiConfig {
    fn default() -> Self {
        Self {
            dataset_url: default_emoji_dataset_url(),
            dataset_path: None,
        }
    }
}

/// 레이아웃 템플릿 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateConfig {
    /// 템플릿 파일 경로
    #[serde(default = "default_template_path")]
    pub path: PathBuf,
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            path: default_template_path(),
        }
    }
}

// ============================================================
// 래스터라이저 설정
// ============================================================

/// 래스터라이저 종류
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RasterizerKind {
    /// 헤드리스 Chrome/Chromium 하위 프로세스
    #[default]
    Chrome,
    /// 외부 HTTP 렌더링 서비스
    Http,
}

/// 래스터라이저 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RasterizerConfig {
    /// 래스터라이저 종류
    #[serde(default)]
    pub kind: RasterizerKind,
    /// Chrome 실행 파일 경로 또는 이름
    #[serde(default = "default_chrome_path")]
    pub chrome_path: String,
    /// HTTP 렌더링 서비스 엔드포인트 (`kind = "http"`일 때 필수)
    #[serde(default)]
    pub endpoint: Option<String>,
    /// 출력 이미지 너비 (px)
    #[serde(default = "default_raster_width")]
    pub width: u32,
    /// 출력 이미지 높이 (px)
    #[serde(default = "default_raster_height")]
    pub height: u32,
    /// 래스터화 1회 타임아웃 (밀리초)
    #[serde(default = "default_raster_timeout_ms")]
    pub timeout_ms: u64,
    /// 타임아웃 시 재시도 횟수
    #[serde(default = "default_raster_retries")]
    pub retries_on_timeout: u32,
}

impl Default for RasterizerConfig {
    fn default() -> Self {
        Self {
            kind: RasterizerKind::default(),
            chrome_path: default_chrome_path(),
            endpoint: None,
            width: default_raster_width(),
            height: default_raster_height(),
            timeout_ms: default_raster_timeout_ms(),
            retries_on_timeout: default_raster_retries(),
        }
    }
}

// ============================================================
// 웹 / 커맨드 설정
// ============================================================

/// 디버그 웹 서버 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebConfig {
    /// 디버그 서버 활성화 여부
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// 서버 포트 (기본: 3000)
    #[serde(default = "default_web_port")]
    pub port: u16,
    /// 외부 접근 허용 여부 (false: 127.0.0.1 only)
    #[serde(default)]
    pub allow_external: bool,
    /// 미리보기 이미지에 사용할 작성자 식별자
    #[serde(default = "default_preview_author")]
    pub preview_author: String,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            port: default_web_port(),
            allow_external: false,
            preview_author: default_preview_author(),
        }
    }
}

/// 커맨드 처리 설정
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommandConfig {
    /// 실패 시 사용자에게 안내 메시지 전송 (기본: 조용히 무시)
    #[serde(default)]
    pub notify_on_error: bool,
}

impl AppConfig {
    /// 기본 설정 생성
    pub fn default_config() -> Self {
        Self::default()
    }

    /// 환경변수로 비밀값 덮어쓰기
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// 조회 함수로 비밀값 덮어쓰기 (빈 값은 무시)
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get(ENV_BOT_TOKEN) {
            self.slack.bot_token = v;
        }
        if let Some(v) = get(ENV_APP_TOKEN) {
            self.slack.app_token = v;
        }
        if let Some(v) = get(ENV_IMGUR_CLIENT_ID) {
            self.imgur.client_id = v;
        }
    }

    /// Slack 연동에 필요한 값 검증
    pub fn validate_for_slack(&self) -> Result<(), CoreError> {
        if self.slack.bot_token.is_empty() {
            return Err(CoreError::Config(format!(
                "Slack 봇 토큰 미설정 ({ENV_BOT_TOKEN})"
            )));
        }
        if self.slack.app_token.is_empty() {
            return Err(CoreError::Config(format!(
                "Slack 앱 토큰 미설정 ({ENV_APP_TOKEN})"
            )));
        }
        if self.imgur.client_id.is_empty() {
            return Err(CoreError::Config(format!(
                "Imgur Client-ID 미설정 ({ENV_IMGUR_CLIENT_ID})"
            )));
        }
        Ok(())
    }

    /// 래스터라이저 설정 검증
    pub fn validate_rasterizer(&self) -> Result<(), CoreError> {
        let r = &self.rasterizer;
        if r.width == 0 || r.height == 0 {
            return Err(CoreError::Config(format!(
                "잘못된 이미지 크기: {}x{}",
                r.width, r.height
            )));
        }
        if r.kind == RasterizerKind::Http && r.endpoint.as_deref().unwrap_or("").is_empty() {
            return Err(CoreError::Config(
                "HTTP 래스터라이저 엔드포인트 미설정".to_string(),
            ));
        }
        Ok(())
    }

    /// 래스터화 타임아웃을 Duration으로 반환
    pub fn rasterize_timeout(&self) -> Duration {
        Duration::from_millis(self.rasterizer.timeout_ms)
    }

    /// 업로드 타임아웃을 Duration으로 반환
    pub fn upload_timeout(&self) -> Duration {
        Duration::from_millis(self.imgur.timeout_ms)
    }

    /// Slack Web API 타임아웃을 Duration으로 반환
    pub fn slack_timeout(&self) -> Duration {
        Duration::from_millis(self.slack.request_timeout_ms)
    }
}

// ============================================================
// 기본값 함수
// ============================================================

fn default_true() -> bool {
    true
}

fn default_slack_api_base_url() -> String {
    "https://slack.com/api".to_string()
}

fn default_slack_command() -> String {
    "/henrifai".to_string()
}

fn default_slack_max_retry_secs() -> u64 {
    30
}

fn default_slack_request_timeout_ms() -> u64 {
    10_000
}

fn default_imgur_base_url() -> String {
    "https://api.imgur.com/3".to_string()
}

fn default_imgur_timeout_ms() -> u64 {
    30_000
}

fn default_imgur_max_retries() -> u32 {
    3
}

fn default_emoji_dataset_url() -> String {
    "https://raw.githubusercontent.com/iamcal/emoji-data/master/emoji.json".to_string()
}

fn default_template_path() -> PathBuf {
    PathBuf::from("template.html")
}

fn default_chrome_path() -> String {
    "chromium".to_string()
}

fn default_raster_width() -> u32 {
    600
}

fn default_raster_height() -> u32 {
    240
}

fn default_raster_timeout_ms() -> u64 {
    20_000
}

fn default_raster_retries() -> u32 {
    1
}

fn default_web_port() -> u16 {
    3000
}

fn default_preview_author() -> String {
    "dev".to_string()
}
