//! Pure data: appearance config and conversation sessions

pub mod config;
pub mod session;

pub use config::{clamp_sidebar_width, ShellConfig, SubmitKey, Theme};
pub use session::{Message, Role, Session, SessionId};
