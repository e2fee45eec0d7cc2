//! 이모지 표현 모델.

use serde::{Deserialize, Serialize};

/// Slack 별칭 값 접두사 (`alias:<target>`)
const ALIAS_PREFIX: &str = "alias:";

/// 이모지 이름에 대응하는 시각적 표현
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum EmojiRepr {
    /// HTML 숫자 문자 참조 시퀀스 (기본 세트, 예: `&#x1F604`)
    CharRef(String),
    /// 커스텀 이모지 이미지 URL (워크스페이스 세트)
    ImageUrl(String),
    /// 다른 이모지 이름을 가리키는 별칭 (워크스페이스 세트)
    Alias(String),
}

impl EmojiRepr {
    /// Slack `emoji.list` 값을 표현으로 변환
    pub fn from_workspace_value(value: &str) -> Self {
        match value.strip_prefix(ALIAS_PREFIX) {
            Some(target) => EmojiRepr::Alias(target.to_string()),
            None => EmojiRepr::ImageUrl(value.to_string()),
        }
    }
}

/// 기본 이모지 데이터셋 항목 (iamcal/emoji-data `emoji.json`)
///
/// 사용하지 않는 필드는 무시한다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmojiDataEntry {
    /// 대표 short name (예: "smile")
    pub short_name: String,
    /// 모든 short name (대표 포함)
    #[serde(default)]
    pub short_names: Vec<String>,
    /// `-`로 구분된 유니코드 코드포인트 시퀀스 (예: "1F468-200D-1F469")
    pub unified: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_entry_ignores_unknown_fields() {
        let json = r#"{
            "name": "SMILING FACE WITH OPEN MOUTH AND SMILING EYES",
            "unified": "1F604",
            "short_name": "smile",
            "short_names": ["smile"],
            "category": "Smileys & Emotion"
        }"#;
        let entry: EmojiDataEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.short_name, "smile");
        assert_eq!(entry.unified, "1F604");
    }

    #[test]
    fn data_entry_without_short_names() {
        let entry: EmojiDataEntry =
            serde_json::from_str(r#"{"short_name": "x", "unified": "274C"}"#).unwrap();
        assert!(entry.short_names.is_empty());
    }

    #[test]
    fn empty_alias_target_is_kept() {
        assert_eq!(
            EmojiRepr::from_workspace_value("alias:"),
            EmojiRepr::Alias(String::new())
        );
    }
}
