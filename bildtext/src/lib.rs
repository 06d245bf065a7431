//! bildtext - Image tags, accessibility descriptions and narrated audio from AI services

pub mod cache;
pub mod config;
pub mod describe;
pub mod error;
pub mod image;
pub mod prompts;
pub mod response;
pub mod text;
pub mod tts;

pub use error::{Error, Result};
