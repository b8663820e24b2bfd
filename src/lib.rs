pub mod config;
pub mod error;
pub mod logger;
pub mod models;
pub mod openai;
pub mod repl;
pub mod session;
pub mod signal;
pub mod storage;

pub use config::Config;
pub use error::{ImageGenError, Result};
pub use models::{GenerationRequest, ImageCount, ImageSize, Quality};
pub use openai::{ImageClient, ImageGenerator};
pub use session::{Command, LineReader, Session, SessionConfig};
pub use storage::ImageStore;
