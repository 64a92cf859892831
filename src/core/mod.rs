pub mod attachment;
pub mod batch;
pub mod bounce;
pub mod mail;

pub use crate::domain::model::{AttachmentSource, EmailMessage, SendResponse};
pub use crate::domain::ports::{ConfigProvider, EmailBackend};
pub use crate::utils::error::Result;
