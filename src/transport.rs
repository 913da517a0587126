//! Outbound half of the chat transport adapter
//!
//! Speaks HTTP to the platform adapter service: send/edit operations plus
//! photo download for inbound captures. The inbound half is the webhook in
//! `api`.

use crate::runtime::traits::{Transport, TransportError};
use crate::state_machine::event::MessageId;
use crate::state_machine::state::{BlobHandle, ChatId};
use crate::texts::Keyboard;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct SendResponse {
    message_id: i64,
}

pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

fn request_err(err: reqwest::Error) -> TransportError {
    TransportError::Request(err.to_string())
}

async fn check_status(response: Response) -> Result<Response, TransportError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(TransportError::Response(format!("{status}: {body}")))
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send_text(
        &self,
        chat: ChatId,
        text: &str,
        keyboard: Option<&Keyboard>,
    ) -> Result<MessageId, TransportError> {
        let response = self
            .client
            .post(self.url("/send_text"))
            .json(&serde_json::json!({
                "chat_id": chat.0,
                "text": text,
                "keyboard": keyboard,
            }))
            .send()
            .await
            .map_err(request_err)?;
        let body: SendResponse = check_status(response)
            .await?
            .json()
            .await
            .map_err(request_err)?;
        Ok(MessageId(body.message_id))
    }

    async fn edit_text(
        &self,
        chat: ChatId,
        message: MessageId,
        text: &str,
        keyboard: Option<&Keyboard>,
    ) -> Result<(), TransportError> {
        let response = self
            .client
            .post(self.url("/edit_text"))
            .json(&serde_json::json!({
                "chat_id": chat.0,
                "message_id": message.0,
                "text": text,
                "keyboard": keyboard,
            }))
            .send()
            .await
            .map_err(request_err)?;
        check_status(response).await?;
        Ok(())
    }

    async fn send_photo(
        &self,
        chat: ChatId,
        photo: Vec<u8>,
        caption: &str,
        keyboard: Option<&Keyboard>,
    ) -> Result<MessageId, TransportError> {
        let keyboard_json = match keyboard {
            Some(keyboard) => serde_json::to_string(keyboard)
                .map_err(|e| TransportError::Request(e.to_string()))?,
            None => String::new(),
        };
        let part = Part::bytes(photo)
            .file_name("photo.jpg")
            .mime_str("image/jpeg")
            .map_err(request_err)?;
        let mut form = Form::new()
            .text("chat_id", chat.0.to_string())
            .text("caption", caption.to_string())
            .part("photo", part);
        if !keyboard_json.is_empty() {
            form = form.text("keyboard", keyboard_json);
        }

        let response = self
            .client
            .post(self.url("/send_photo"))
            .multipart(form)
            .send()
            .await
            .map_err(request_err)?;
        let body: SendResponse = check_status(response)
            .await?
            .json()
            .await
            .map_err(request_err)?;
        Ok(MessageId(body.message_id))
    }

    async fn edit_caption(
        &self,
        chat: ChatId,
        message: MessageId,
        caption: &str,
        keyboard: Option<&Keyboard>,
    ) -> Result<(), TransportError> {
        let response = self
            .client
            .post(self.url("/edit_caption"))
            .json(&serde_json::json!({
                "chat_id": chat.0,
                "message_id": message.0,
                "caption": caption,
                "keyboard": keyboard,
            }))
            .send()
            .await
            .map_err(request_err)?;
        check_status(response).await?;
        Ok(())
    }

    async fn fetch_photo(&self, handle: &BlobHandle) -> Result<Vec<u8>, TransportError> {
        let response = self
            .client
            .get(self.url("/photo"))
            .query(&[("handle", handle.0.as_str())])
            .send()
            .await
            .map_err(request_err)?;
        let bytes = check_status(response)
            .await?
            .bytes()
            .await
            .map_err(request_err)?;
        Ok(bytes.to_vec())
    }
}
