//! 채팅 플랫폼 커맨드 모델.

use serde::{Deserialize, Serialize};

/// 슬래시 커맨드 호출 (Slack `slash_commands` 페이로드)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlashCommand {
    /// 커맨드 이름 (예: "/henrifai")
    pub command: String,
    /// 커맨드 뒤 텍스트
    #[serde(default)]
    pub text: String,
    /// 호출한 사용자 ID
    #[serde(default)]
    pub user_id: String,
    /// 호출한 사용자 이름 (워터마크 색상 계산에 사용)
    #[serde(default)]
    pub user_name: String,
    /// 응답 전송 URL
    #[serde(default)]
    pub response_url: String,
}

/// 응답 첨부
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    /// 첨부 텍스트
    pub text: String,
    /// 이미지 URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// 썸네일 URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumb_url: Option<String>,
}

/// 커맨드 응답 (Slack `response_url` 본문)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandResponse {
    /// 본문 텍스트
    pub text: String,
    /// 링크 펼침
    pub unfurl_links: bool,
    /// 미디어 펼침
    pub unfurl_media: bool,
    /// 첨부 목록
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,
}

impl CommandResponse {
    /// 이미지 링크 응답: 본문과 첨부 모두 같은 URL
    pub fn with_image(link: &str) -> Self {
        Self {
            text: link.to_string(),
            unfurl_links: true,
            unfurl_media: true,
            attachments: vec![Attachment {
                text: String::new(),
                image_url: Some(link.to_string()),
                thumb_url: Some(link.to_string()),
            }],
        }
    }

    /// 텍스트만 있는 응답
    pub fn text_only(text: &str) -> Self {
        Self {
            text: text.to_string(),
            unfurl_links: false,
            unfurl_media: false,
            attachments: Vec::new(),
        }
    }
}
