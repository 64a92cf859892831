//! 將各種附件來源轉成 Postmark 的附件格式
//!
//! MIME part 會被解析：內容依 Content-Transfer-Encoding 解碼後重新以 base64
//! 編碼，`Content-ID` 去掉角括號，若為 inline 則加上 `cid:` 前綴。

use crate::domain::model::{Attachment, AttachmentSource};
use crate::utils::error::{PostmarkError, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use mailparse::{DispositionType, MailHeaderMap};
use std::path::Path;

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

pub fn normalize_attachment(source: &AttachmentSource) -> Result<Attachment> {
    match source {
        AttachmentSource::Data {
            name,
            content,
            content_type,
            content_id,
        } => Ok(Attachment {
            name: name.clone(),
            content: STANDARD.encode(content),
            content_type: content_type
                .clone()
                .unwrap_or_else(|| guess_content_type(name)),
            content_id: content_id.clone(),
        }),
        AttachmentSource::Encoded(attachment) => Ok(attachment.clone()),
        AttachmentSource::File(path) => from_file(path),
        AttachmentSource::Mime(raw) => from_mime_part(raw),
    }
}

pub fn normalize_attachments(sources: &[AttachmentSource]) -> Result<Vec<Attachment>> {
    sources.iter().map(normalize_attachment).collect()
}

fn from_file(path: &Path) -> Result<Attachment> {
    let content = std::fs::read(path)?;
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| {
            PostmarkError::missing_value(format!(
                "Cannot attach {} without a valid file name",
                path.display()
            ))
        })?
        .to_string();

    tracing::debug!("Attaching file {} ({} bytes)", path.display(), content.len());

    Ok(Attachment {
        content_type: guess_content_type(&name),
        content: STANDARD.encode(&content),
        name,
        content_id: None,
    })
}

fn from_mime_part(raw: &[u8]) -> Result<Attachment> {
    let part = mailparse::parse_mail(raw)?;
    let disposition = part.get_content_disposition();

    let name = disposition
        .params
        .get("filename")
        .or_else(|| part.ctype.params.get("name"))
        .cloned()
        .ok_or_else(|| PostmarkError::missing_value("Cannot attach a MIME part without a filename"))?;

    let body = part.get_body_raw()?;

    let content_id = part.headers.get_first_value("Content-ID").map(|id| {
        let id = id.trim();
        let id = id
            .strip_prefix('<')
            .and_then(|s| s.strip_suffix('>'))
            .unwrap_or(id);
        if disposition.disposition == DispositionType::Inline {
            format!("cid:{}", id)
        } else {
            id.to_string()
        }
    });

    Ok(Attachment {
        name,
        content: STANDARD.encode(&body),
        content_type: part.ctype.mimetype.clone(),
        content_id,
    })
}

fn guess_content_type(name: &str) -> String {
    mime_guess::from_path(name)
        .first()
        .map(|mime| mime.to_string())
        .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string())
}
