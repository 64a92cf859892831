//! 宿主應用程式的 email backend：把通用的 `EmailMessage` 轉成 Postmark 訊息後送出。
//!
//! 單封訊息走 `/email`，多封訊息合併成一次 `/email/batch` 請求。

use crate::core::batch::BatchMail;
use crate::core::mail::Mail;
use crate::domain::model::{EmailMessage, Header};
use crate::domain::ports::{ConfigProvider, EmailBackend};
use crate::utils::error::Result;

pub struct PostmarkBackend<C: ConfigProvider> {
    settings: C,
    fail_silently: bool,
}

impl<C: ConfigProvider> PostmarkBackend<C> {
    /// 設定值在送出時才檢查；零秒的 timeout 會在建立 HTTP 客戶端時回報錯誤
    pub fn new(settings: C) -> Self {
        Self {
            settings,
            fail_silently: false,
        }
    }

    pub fn with_fail_silently(mut self, fail_silently: bool) -> Self {
        self.fail_silently = fail_silently;
        self
    }

    pub fn settings(&self) -> &C {
        &self.settings
    }

    /// 沒有任何收件者的訊息回傳 `None`
    pub fn build_message(&self, message: &EmailMessage) -> Option<Mail> {
        if message.recipients().next().is_none() {
            tracing::debug!("Skipping message {:?} without recipients", message.subject);
            return None;
        }

        let mut text_body = Some(message.body.clone());
        let mut html_body = message
            .alternatives
            .iter()
            .find(|(_, mimetype)| mimetype == "text/html")
            .map(|(content, _)| content.clone());

        if message.content_subtype == "html" {
            // html 內容不當作純文字送出
            text_body = None;
            html_body = Some(message.body.clone());
        }

        let mut reply_to = if message.reply_to.is_empty() {
            None
        } else {
            Some(message.reply_to.join(","))
        };

        let mut custom_headers: Vec<Header> = Vec::new();
        for header in &message.extra_headers {
            if header.name.eq_ignore_ascii_case("Reply-To") {
                reply_to = Some(header.value.clone());
            } else {
                custom_headers.push(header.clone());
            }
        }

        let mut mail = Mail::from_settings(&self.settings);
        if let Some(from_email) = message.from_email.as_ref().filter(|f| !f.trim().is_empty()) {
            mail.sender = Some(from_email.clone());
        }
        mail.to = message.to.clone();
        mail.cc = message.cc.clone();
        mail.bcc = message.bcc.clone();
        mail.subject = Some(message.subject.clone());
        mail.text_body = text_body;
        mail.html_body = html_body;
        mail.reply_to = reply_to;
        mail.custom_headers = custom_headers;
        mail.attachments = message.attachments.clone();
        mail.tag = message.tag.clone();
        mail.track_opens = mail.track_opens || message.track_opens;

        Some(mail)
    }

    fn send(&self, messages: &[EmailMessage]) -> Result<bool> {
        let mails: Vec<Mail> = messages
            .iter()
            .filter_map(|message| self.build_message(message))
            .collect();

        match mails.len() {
            0 => Ok(false),
            1 if messages.len() == 1 => {
                mails[0].send()?;
                Ok(true)
            }
            _ => {
                BatchMail::from_settings(mails, &self.settings).send()?;
                Ok(true)
            }
        }
    }
}

impl<C: ConfigProvider> EmailBackend for PostmarkBackend<C> {
    fn send_messages(&self, messages: &[EmailMessage]) -> Result<usize> {
        if messages.is_empty() {
            return Ok(0);
        }

        match self.send(messages) {
            Ok(true) => Ok(messages.len()),
            Ok(false) => Ok(0),
            Err(e) if self.fail_silently => {
                tracing::warn!("Failed to send {} e-mail(s): {}", messages.len(), e);
                Ok(0)
            }
            Err(e) => Err(e),
        }
    }
}
