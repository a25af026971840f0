pub mod client;
pub mod error;
pub mod types;

pub use client::{GeminiClient, TextRewriter};
pub use types::Rewrite;
