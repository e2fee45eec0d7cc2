//! Slack Socket Mode 수신 루프.
//!
//! `apps.connections.open`으로 발급받은 WebSocket에 연결해 envelope을 수신한다.
//! 모든 envelope은 `envelope_id`로 즉시 ack하고, 설정된 슬래시 커맨드만 채널로 전달한다.
//! 연결이 끊기면 exponential backoff로 재연결한다. 인증 실패는 재시도하지 않는다.

use futures::{SinkExt, StreamExt};
use henrifai_core::error::CoreError;
use henrifai_core::models::command::SlashCommand;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, error, info, warn};

use crate::slack::SlackWebClient;

/// 수신한 envelope
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Envelope {
    /// 연결 수립
    Hello,
    /// 서버 측 연결 종료 예고 (재연결 필요)
    Disconnect {
        /// 종료 사유 (예: "refresh_requested")
        reason: String,
    },
    /// 슬래시 커맨드
    SlashCommand {
        /// ack용 envelope ID
        envelope_id: String,
        /// 커맨드 페이로드
        command: SlashCommand,
    },
    /// 처리하지 않는 envelope (events_api, interactive 등)
    Other {
        /// envelope 종류
        kind: String,
        /// ack용 envelope ID
        envelope_id: Option<String>,
    },
}

impl Envelope {
    /// ack가 필요한 envelope ID
    pub fn envelope_id(&self) -> Option<&str> {
        match self {
            Envelope::SlashCommand { envelope_id, .. } => Some(envelope_id),
            Envelope::Other { envelope_id, .. } => envelope_id.as_deref(),
            Envelope::Hello | Envelope::Disconnect { .. } => None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawEnvelope {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    envelope_id: Option<String>,
    #[serde(default)]
    payload: Option<serde_json::Value>,
    #[serde(default)]
    reason: Option<String>,
}

/// envelope JSON 파싱
pub fn parse_envelope(text: &str) -> Result<Envelope, CoreError> {
    let raw: RawEnvelope = serde_json::from_str(text)?;

    match raw.kind.as_str() {
        "hello" => Ok(Envelope::Hello),
        "disconnect" => Ok(Envelope::Disconnect {
            reason: raw.reason.unwrap_or_default(),
        }),
        "slash_commands" => {
            let envelope_id = raw
                .envelope_id
                .ok_or_else(|| CoreError::Internal("slash_commands envelope_id 없음".to_string()))?;
            let payload = raw
                .payload
                .ok_or_else(|| CoreError::Internal("slash_commands payload 없음".to_string()))?;
            Ok(Envelope::SlashCommand {
                envelope_id,
                command: serde_json::from_value(payload)?,
            })
        }
        _ => Ok(Envelope::Other {
            kind: raw.kind,
            envelope_id: raw.envelope_id,
        }),
    }
}

/// envelope ack 본문
pub fn ack_message(envelope_id: &str) -> String {
    serde_json::json!({ "envelope_id": envelope_id }).to_string()
}

/// 한 연결의 종료 방식
#[derive(Debug, PartialEq, Eq)]
enum SessionEnd {
    Shutdown,
    Reconnect,
}

/// Socket Mode 클라이언트
pub struct SocketModeClient {
    web: Arc<SlackWebClient>,
    command: String,
    max_retry_secs: u64,
}

impl SocketModeClient {
    /// 새 Socket Mode 클라이언트 생성
    ///
    /// `command`와 이름이 같은 슬래시 커맨드만 전달한다.
    pub fn new(web: Arc<SlackWebClient>, command: &str, max_retry_secs: u64) -> Self {
        Self {
            web,
            command: command.to_string(),
            max_retry_secs: max_retry_secs.max(1),
        }
    }

    /// 수신 루프 실행
    ///
    /// `shutdown`이 `true`가 되거나 송신 측이 닫히면 종료한다.
    pub async fn run(
        &self,
        tx: mpsc::Sender<SlashCommand>,
        mut shutdown: watch::Receiver<bool>,
    ) -> Result<(), CoreError> {
        let mut retry_delay = 1u64;

        loop {
            if *shutdown.borrow() {
                return Ok(());
            }

            match self.session(&tx, &mut shutdown).await {
                Ok(SessionEnd::Shutdown) => {
                    info!("Socket Mode 종료");
                    return Ok(());
                }
                Ok(SessionEnd::Reconnect) => {
                    retry_delay = 1;
                    info!("Socket Mode 재연결");
                    continue;
                }
                Err(CoreError::Auth(e)) => {
                    error!("Socket Mode 인증 실패, 재연결 중단: {e}");
                    return Err(CoreError::Auth(e));
                }
                Err(e) => warn!("Socket Mode 연결 에러: {e}"),
            }

            warn!("Socket Mode 재연결 대기: {retry_delay}초");
            let stop = tokio::select! {
                _ = tokio::time::sleep(Duration::from_secs(retry_delay)) => false,
                changed = shutdown.changed() => changed.is_err() || *shutdown.borrow(),
            };
            if stop {
                return Ok(());
            }
            retry_delay = (retry_delay * 2).min(self.max_retry_secs);
        }
    }

    async fn session(
        &self,
        tx: &mpsc::Sender<SlashCommand>,
        shutdown: &mut watch::Receiver<bool>,
    ) -> Result<SessionEnd, CoreError> {
        let url = self.web.open_connection().await?;
        info!("Socket Mode 연결: {}", url.split('?').next().unwrap_or(&url));

        let (ws_stream, _) = tokio_tungstenite::connect_async(url.as_str())
            .await
            .map_err(|e| CoreError::Network(format!("WebSocket 연결 실패: {e}")))?;
        let (mut write, mut read) = ws_stream.split();

        loop {
            let msg = tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        let _ = write.send(Message::Close(None)).await;
                        return Ok(SessionEnd::Shutdown);
                    }
                    continue;
                }
                msg = read.next() => msg,
            };

            let text = match msg {
                Some(Ok(Message::Text(text))) => text,
                Some(Ok(Message::Close(frame))) => {
                    debug!("WebSocket 종료 프레임: {frame:?}");
                    return Ok(SessionEnd::Reconnect);
                }
                Some(Ok(_)) => continue, // Ping/Pong/Binary
                Some(Err(e)) => {
                    return Err(CoreError::Network(format!("WebSocket 수신 에러: {e}")));
                }
                None => return Ok(SessionEnd::Reconnect),
            };

            let envelope = match parse_envelope(text.as_str()) {
                Ok(envelope) => envelope,
                Err(e) => {
                    warn!("envelope 파싱 실패: {e}");
                    continue;
                }
            };

            if let Some(id) = envelope.envelope_id() {
                write
                    .send(Message::text(ack_message(id)))
                    .await
                    .map_err(|e| CoreError::Network(format!("ack 전송 실패: {e}")))?;
            }

            match envelope {
                Envelope::Hello => debug!("Socket Mode hello 수신"),
                Envelope::Disconnect { reason } => {
                    info!("Socket Mode disconnect 수신: {reason}");
                    return Ok(SessionEnd::Reconnect);
                }
                Envelope::SlashCommand { command, .. } => {
                    if command.command != self.command {
                        debug!("다른 커맨드 무시: {}", command.command);
                        continue;
                    }
                    if tx.send(command).await.is_err() {
                        debug!("커맨드 수신 측 종료");
                        return Ok(SessionEnd::Shutdown);
                    }
                }
                Envelope::Other { kind, .. } => debug!("처리하지 않는 envelope: {kind}"),
            }
        }
    }
}
