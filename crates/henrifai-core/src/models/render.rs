//! 렌더 파이프라인 모델.
//!
//! `RenderRequest` → `RenderContext` → `RenderedImage` 순서로 흐른다.

use serde::{Deserialize, Serialize};

/// 메시지 토큰: 리터럴 텍스트 또는 이모지 참조
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageToken {
    /// 그대로 출력되는 텍스트
    Literal(String),
    /// `:name:` 형식의 이모지 참조 (구분자 제외 이름)
    EmojiRef(String),
}

impl MessageToken {
    /// 원문 텍스트 복원 (이모지 참조는 구분자 포함)
    pub fn source_text(&self) -> String {
        match self {
            MessageToken::Literal(text) => text.clone(),
            MessageToken::EmojiRef(name) => format!(":{name}:"),
        }
    }
}

/// 렌더 요청: 파이프라인 불변 입력
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderRequest {
    /// 작성자 식별자 (예: Slack user_name "firstname.lastname")
    pub author_id: String,
    /// 원본 메시지
    pub raw_text: String,
}

impl RenderRequest {
    /// 새 렌더 요청 생성
    pub fn new(author_id: impl Into<String>, raw_text: impl Into<String>) -> Self {
        Self {
            author_id: author_id.into(),
            raw_text: raw_text.into(),
        }
    }
}

/// 렌더 컨텍스트: 템플릿 슬롯에 채워지는 파생 값
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderContext {
    /// 이모지가 치환된 메시지 마크업
    pub composed_markup: String,
    /// `HH:MM` 시각
    pub timestamp: String,
    /// `#rrggbb` 워터마크 색상
    pub watermark_color: String,
}

/// 래스터 출력 크기 (px)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RasterSize {
    /// 너비
    pub width: u32,
    /// 높이
    pub height: u32,
}

/// 래스터화된 이미지 (PNG 바이트)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedImage {
    bytes: Vec<u8>,
}

impl RenderedImage {
    /// 바이트 버퍼로 생성
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// 바이트 슬라이스
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// 소유권 이전
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// 바이트 길이
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// 빈 이미지 여부
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// 렌더링은 성공했지만 품질이 떨어진 이유
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DegradedReason {
    /// 기본 이모지 세트 미로드: 표준 이모지가 텍스트로 남음
    BaselineEmojiUnavailable,
    /// 워크스페이스 이모지 세트 미로드: 커스텀 이모지가 텍스트로 남음
    WorkspaceEmojiUnavailable,
}

/// 렌더 결과
#[derive(Debug, Clone)]
pub struct RenderOutcome {
    /// 래스터화된 이미지
    pub image: RenderedImage,
    /// 품질 저하 사유 (비어 있으면 정상)
    pub degraded: Vec<DegradedReason>,
}

impl RenderOutcome {
    /// 품질 저하 여부
    pub fn is_degraded(&self) -> bool {
        !self.degraded.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_source_text() {
        assert_eq!(MessageToken::Literal("hi ".into()).source_text(), "hi ");
        assert_eq!(MessageToken::EmojiRef("smile".into()).source_text(), ":smile:");
        assert_eq!(MessageToken::EmojiRef(String::new()).source_text(), "::");
    }

    #[test]
    fn outcome_degraded_flag() {
        let ok = RenderOutcome {
            image: RenderedImage::new(vec![1, 2, 3]),
            degraded: vec![],
        };
        assert!(!ok.is_degraded());
        assert_eq!(ok.image.len(), 3);

        let degraded = RenderOutcome {
            image: RenderedImage::new(vec![]),
            degraded: vec![DegradedReason::WorkspaceEmojiUnavailable],
        };
        assert!(degraded.is_degraded());
        assert!(degraded.image.is_empty());
    }
}
