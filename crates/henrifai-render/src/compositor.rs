//! 메시지 합성.
//!
//! 원본 텍스트를 리터럴/이모지 참조 토큰으로 나누고(`tokenize`),
//! 해석 가능한 이모지 참조를 마크업으로 치환해 이어 붙인다(`compose`).
//! 해석되지 않은 참조는 구분자를 포함한 원문 그대로 남는다.

use henrifai_core::models::emoji::EmojiRepr;
use henrifai_core::models::render::MessageToken;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::catalog::EmojiCatalog;

/// `:name:`: 이름에 콜론과 줄바꿈 문자는 올 수 없다
static SHORTCODE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r":([^:\n\r\x{2028}\x{2029}]*):").expect("shortcode 패턴은 항상 유효")
});

/// 텍스트를 토큰 시퀀스로 분리
///
/// 빈 리터럴은 만들지 않는다. `detokenize(tokenize(s)) == s`.
pub fn tokenize(text: &str) -> Vec<MessageToken> {
    let mut tokens = Vec::new();
    let mut last = 0;

    for caps in SHORTCODE.captures_iter(text) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        if whole.start() > last {
            tokens.push(MessageToken::Literal(text[last..whole.start()].to_string()));
        }
        tokens.push(MessageToken::EmojiRef(name.as_str().to_string()));
        last = whole.end();
    }

    if last < text.len() {
        tokens.push(MessageToken::Literal(text[last..].to_string()));
    }

    tokens
}

/// 토큰 시퀀스를 원문으로 복원
pub fn detokenize(tokens: &[MessageToken]) -> String {
    tokens.iter().map(MessageToken::source_text).collect()
}

/// 이모지 치환 후 마크업 생성
pub fn compose(text: &str, catalog: &EmojiCatalog) -> String {
    tokenize(text)
        .into_iter()
        .map(|token| render_token(token, catalog))
        .collect()
}

fn render_token(token: MessageToken, catalog: &EmojiCatalog) -> String {
    match token {
        MessageToken::Literal(text) => text,
        MessageToken::EmojiRef(name) if name.is_empty() => "::".to_string(),
        MessageToken::EmojiRef(name) => match catalog.resolve(&name) {
            Some(EmojiRepr::CharRef(chars)) => chars,
            Some(EmojiRepr::ImageUrl(url)) => emoji_span(&url),
            Some(EmojiRepr::Alias(_)) | None => format!(":{name}:"),
        },
    }
}

/// 커스텀 이모지 인라인 요소
fn emoji_span(url: &str) -> String {
    format!(r#"<span class="emoji" style="background-image: url({url})"></span>"#)
}

#[cfg(test)]
mod tests {
    use super::*;
    use henrifai_core::models::emoji::EmojiDataEntry;
    use std::collections::HashMap;

    fn catalog() -> EmojiCatalog {
        let mut baseline = HashMap::new();
        baseline.insert("smile".to_string(), EmojiRepr::CharRef("&#x1f604".into()));
        baseline.insert("+1".to_string(), EmojiRepr::CharRef("&#x1F44D".into()));

        let mut workspace = HashMap::new();
        workspace.insert(
            "party".to_string(),
            EmojiRepr::ImageUrl("https://e.slack/party.png".into()),
        );
        EmojiCatalog::with_sets(baseline, Some(workspace))
    }

    #[test]
    fn plain_text_is_identity() {
        let catalog = catalog();
        for text in ["", "hello world", "<b>bold</b> & more", "한글 메시지", "a\nb"] {
            assert_eq!(compose(text, &catalog), text);
        }
    }

    #[test]
    fn baseline_substitution() {
        assert_eq!(
            compose("hello :smile: world", &catalog()),
            "hello &#x1f604 world"
        );
    }

    #[test]
    fn unknown_shortcode_is_kept() {
        let empty = EmojiCatalog::new();
        assert_eq!(compose(":unknown_tag:", &empty), ":unknown_tag:");
        assert_eq!(
            compose("a :nope: b :smile:", &catalog()),
            "a :nope: b &#x1f604"
        );
    }

    #[test]
    fn workspace_substitution_uses_span() {
        assert_eq!(
            compose(":party:", &catalog()),
            r#"<span class="emoji" style="background-image: url(https://e.slack/party.png)"></span>"#
        );
    }

    #[test]
    fn adjacent_shortcodes() {
        assert_eq!(
            compose(":smile::smile:", &catalog()),
            "&#x1f604&#x1f604"
        );
        assert_eq!(
            compose(":smile::+1:", &catalog()),
            "&#x1f604&#x1F44D"
        );
    }

    #[test]
    fn unterminated_colon_is_literal() {
        assert_eq!(compose("time: 10", &catalog()), "time: 10");
        assert_eq!(compose("ratio 1:2 :smile", &catalog()), "ratio 1:2 :smile");
    }

    #[test]
    fn colon_pairing_is_left_to_right() {
        // "10:30 :smile:" → ":30 :"가 먼저 짝지어지고 "smile:"은 리터럴
        assert_eq!(
            tokenize("10:30 :smile:"),
            vec![
                MessageToken::Literal("10".into()),
                MessageToken::EmojiRef("30 ".into()),
                MessageToken::Literal("smile:".into()),
            ]
        );
        assert_eq!(compose("10:30 :smile:", &catalog()), "10:30 :smile:");
    }

    #[test]
    fn line_break_prevents_shortcode() {
        assert_eq!(
            tokenize("a:b\nc:smile:"),
            vec![
                MessageToken::Literal("a:b\nc".into()),
                MessageToken::EmojiRef("smile".into()),
            ]
        );
    }

    #[test]
    fn empty_name_is_literal() {
        assert_eq!(compose("a::b", &catalog()), "a::b");
    }

    #[test]
    fn tokenize_roundtrip() {
        for text in [
            "",
            ":",
            "::",
            ":::",
            "hello :smile: world",
            ":a::b:c:",
            "no emoji here",
            "줄\n바꿈 :x:\r\n:y:",
        ] {
            assert_eq!(detokenize(&tokenize(text)), text, "input: {text:?}");
        }
    }

    #[test]
    fn baseline_names_from_dataset_compose() {
        let entries = vec![EmojiDataEntry {
            short_name: "family".into(),
            short_names: vec!["family".into()],
            unified: "1F468-200D-1F469".into(),
        }];
        let catalog = EmojiCatalog::with_sets(EmojiCatalog::build_baseline(&entries), None);
        let out = compose("we :family:", &catalog);
        assert_eq!(out, "we &#x1F468&#x200D&#x1F469");
        assert!(!out.contains(":family:"));
    }
}
