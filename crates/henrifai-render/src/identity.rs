//! 작성자 식별 워터마크.
//!
//! 작성자 식별자 → 워터마크 색상, 현재 시각 → `HH:MM`, 식별자 → 업로드 제목 해시.
//! 색상은 결정적이지만 충돌에 강하지 않다. 마지막 `.` 뒤 세 글자가 같으면 같은 색이 된다.
//! 소수의 테마 색을 나누는 용도이며 신원 증명이 아니다.

use chrono::Timelike;
use sha1::{Digest, Sha1};

/// 식별자 → `#rrggbb` 워터마크 색상
///
/// 마지막 `.` 뒤 문자열의 앞 세 UTF-16 코드 유닛을 각각 최소 두 자리 16진수로 이어 붙이고
/// 여섯 자리가 되도록 왼쪽을 `0`으로 채운다. 부족한 글자는 아무것도 기여하지 않는다.
/// 0xFF를 넘는 코드 유닛은 두 자리를 넘으므로 결과가 7자보다 길어질 수 있다.
pub fn color_for(identifier: &str) -> String {
    let last_segment = identifier.rsplit('.').next().unwrap_or_default();

    let hex: String = last_segment
        .encode_utf16()
        .take(3)
        .map(|unit| format!("{unit:02x}"))
        .collect();

    format!("#{hex:0>6}")
}

/// 현재 로컬 시각 `HH:MM`
pub fn time_now() -> String {
    format_time(&chrono::Local::now())
}

/// 시각을 `HH:MM`(0 채움)으로 포맷
pub fn format_time<T: Timelike>(time: &T) -> String {
    format!("{:02}:{:02}", time.hour(), time.minute())
}

/// 업로드 제목용 작성자 해시 (SHA-1, 소문자 16진수)
pub fn author_title(identifier: &str) -> String {
    let mut hasher = Sha1::new();
    hasher.update(identifier.as_bytes());
    format!("{:x}", hasher.finalize())
}
