pub mod errors;
pub mod id;

pub use errors::{AiError, ConfigError, MentorError, StoreError};
pub use id::{new_id, SessionId};

pub type Result<T> = std::result::Result<T, MentorError>;
