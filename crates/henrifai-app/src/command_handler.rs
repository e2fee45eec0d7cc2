//! 슬래시 커맨드 처리.
//!
//! 워크스페이스 이모지 확인 → 렌더링 → 업로드 → 응답.
//! 빈 텍스트는 아무것도 하지 않는다.
//! 실패는 호출자에게 돌려주고, 설정된 경우에만 사용자에게 알린다.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use henrifai_core::error::CoreError;
use henrifai_core::models::command::{CommandResponse, SlashCommand};
use henrifai_core::models::render::{DegradedReason, RenderRequest};
use henrifai_core::ports::chat::CommandResponder;
use henrifai_core::ports::emoji_source::WorkspaceEmojiSource;
use henrifai_core::ports::image_host::ImageHost;
use henrifai_render::identity;
use henrifai_render::RenderPipeline;
use std::sync::Arc;
use tracing::{debug, warn};

/// 커맨드 처리 결과
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutcome {
    /// 업로드된 이미지 링크
    pub link: String,
    /// 일부 이모지 세트 없이 렌더링된 경우 그 사유
    pub degraded: Vec<DegradedReason>,
}

/// 슬래시 커맨드 처리기
pub struct CommandHandler {
    pipeline: Arc<RenderPipeline>,
    workspace: Arc<dyn WorkspaceEmojiSource>,
    host: Arc<dyn ImageHost>,
    responder: Arc<dyn CommandResponder>,
    notify_on_error: bool,
}

impl CommandHandler {
    /// 새 처리기 생성
    pub fn new(
        pipeline: Arc<RenderPipeline>,
        workspace: Arc<dyn WorkspaceEmojiSource>,
        host: Arc<dyn ImageHost>,
        responder: Arc<dyn CommandResponder>,
    ) -> Self {
        Self {
            pipeline,
            workspace,
            host,
            responder,
            notify_on_error: false,
        }
    }

    /// 실패 시 사용자 알림 여부 설정
    pub fn with_notify_on_error(mut self, notify: bool) -> Self {
        self.notify_on_error = notify;
        self
    }

    /// 커맨드 처리
    ///
    /// 텍스트가 비어 있으면 렌더링/업로드/응답 없이 `Ok(None)`.
    pub async fn handle(
        &self,
        command: &SlashCommand,
    ) -> Result<Option<CommandOutcome>, CoreError> {
        if command.text.is_empty() {
            debug!(user = %command.user_id, "빈 커맨드 무시");
            return Ok(None);
        }

        match self.process(command).await {
            Ok(outcome) => Ok(Some(outcome)),
            Err(e) => {
                if self.notify_on_error && !command.response_url.is_empty() {
                    let notice =
                        CommandResponse::text_only(&format!("이미지를 만들지 못했습니다: {e}"));
                    if let Err(notify_err) =
                        self.responder.respond(&command.response_url, &notice).await
                    {
                        warn!("실패 알림 전송 실패: {notify_err}");
                    }
                }
                Err(e)
            }
        }
    }

    async fn process(&self, command: &SlashCommand) -> Result<CommandOutcome, CoreError> {
        let author = author_of(command);
        debug!(author, text_len = command.text.len(), "커맨드 수신");

        match self
            .pipeline
            .catalog()
            .ensure_workspace_loaded(self.workspace.as_ref())
            .await
        {
            Ok(true) => debug!("워크스페이스 이모지 첫 로드"),
            Ok(false) => {}
            Err(e) => warn!("워크스페이스 이모지 로드 실패, 기본 세트로 진행: {e}"),
        }

        let outcome = self
            .pipeline
            .render(&RenderRequest::new(author, command.text.as_str()))
            .await?;

        let encoded = STANDARD.encode(outcome.image.as_bytes());
        let title = identity::author_title(author);
        let link = self.host.upload(&encoded, Some(&title)).await?;

        self.responder
            .respond(&command.response_url, &CommandResponse::with_image(&link))
            .await?;

        debug!("커맨드 응답 완료");
        Ok(CommandOutcome {
            link,
            degraded: outcome.degraded,
        })
    }
}

/// 워터마크/제목에 쓸 작성자 식별자 (사용자 이름, 없으면 사용자 ID)
fn author_of(command: &SlashCommand) -> &str {
    if command.user_name.is_empty() {
        command.user_id.as_str()
    } else {
        command.user_name.as_str()
    }
}
