//! Domain layer - API key records, form state and the boundaries the
//! dashboard talks through

pub mod api_key;
pub mod clipboard;
pub mod error;
pub mod notification;
pub mod session;

pub use api_key::{
    ApiKeyChanges, ApiKeyId, ApiKeyRecord, ApiKeyStore, ApiKeySummary, DraftForm, KeyType,
    ModalState, NewApiKey,
};
pub use clipboard::Clipboard;
pub use error::DomainError;
pub use notification::{NotificationKind, Notifier};
pub use session::{Session, SessionProvider};
