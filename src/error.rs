//! Startup error types
//!
//! Only resource acquisition can fail. Once the first frame is running
//! nothing returns an error: full pools and off-screen geometry are absorbed.

use crate::config::ConfigError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PondError {
    #[error("SDL error: {0}")]
    Sdl(String),
    #[error("failed to create window: {0}")]
    Window(String),
    #[error("failed to create renderer: {0}")]
    Renderer(String),
    #[error("failed to create texture: {0}")]
    Texture(String),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub type PondResult<T> = Result<T, PondError>;
