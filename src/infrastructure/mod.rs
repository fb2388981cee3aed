//! Infrastructure layer - External service implementations

pub mod api_key;
pub mod clipboard;
pub mod logging;
pub mod notification;
pub mod session;
