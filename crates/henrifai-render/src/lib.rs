//! # henrifai-render
//!
//! 메시지 → 이미지 렌더 파이프라인.
//!
//! ## 흐름
//!
//! 원본 메시지 + 작성자 → [`compositor`] (이모지 치환) → [`identity`] (색상/시각)
//! → [`template`] (레이아웃 병합) → [`Rasterizer`](henrifai_core::ports::rasterizer::Rasterizer)
//! → PNG
//!
//! [`pipeline::RenderPipeline`]이 위 단계를 묶고 래스터화 타임아웃/재시도를 적용한다.

pub mod catalog;
pub mod chrome;
pub mod compositor;
pub mod dataset;
pub mod identity;
pub mod pipeline;
pub mod template;

pub use catalog::EmojiCatalog;
pub use pipeline::{RasterPolicy, RenderPipeline};
pub use template::{LayoutTemplate, TemplateStore};
