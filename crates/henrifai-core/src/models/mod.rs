//! 도메인 모델.
//!
//! 요청 단위로 생성/폐기되는 데이터 구조체. 이모지 카탈로그만 프로세스 수명 동안 유지된다.

pub mod command;
pub mod emoji;
pub mod render;
