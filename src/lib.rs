pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::CliConfig;
pub use config::PostmarkSettings;

pub use adapters::http::PostmarkClient;
pub use app::backend::PostmarkBackend;
pub use crate::core::{batch::BatchMail, bounce::BounceManager, mail::Mail, mail::SendMode};
pub use domain::model::{
    Attachment, AttachmentSource, BounceQuery, EmailMessage, Header, SendResponse, TrackLinks,
};
pub use domain::ports::{ConfigProvider, EmailBackend};
pub use utils::error::{PostmarkError, Result};
