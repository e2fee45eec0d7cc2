//! # henrifai-network
//!
//! HTTP/WebSocket 네트워크 어댑터.
//! 코어 포트(`EmojiDatasetSource`, `WorkspaceEmojiSource`, `CommandResponder`,
//! `ImageHost`, `Rasterizer`)를 외부 서비스에 연결한다.
//!
//! - `emoji_data`: 유니코드 이모지 데이터셋 다운로드
//! - `slack`: Slack Web API (`emoji.list`, `apps.connections.open`, `response_url`)
//! - `socket_mode`: Slack Socket Mode 수신 루프 (자동 재연결)
//! - `imgur`: 이미지 업로드
//! - `http_rasterizer`: 원격 래스터화 서비스
//!
//! ## 사용 예시
//!
//! ```rust,ignore
//! use henrifai_network::imgur::ImgurUploader;
//! use henrifai_network::slack::SlackWebClient;
//! ```

pub mod emoji_data;
pub mod http;
pub mod http_rasterizer;
pub mod imgur;
pub mod slack;
pub mod socket_mode;
