//! WhatsApp Business Cloud delivery: media upload and template messages.

use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder, Response, multipart};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::foundation::error::{CardError, CardResult};

/// Default Graph API root, pinned to v21.0.
pub const DEFAULT_GRAPH_BASE_URL: &str = "https://graph.facebook.com/v21.0";

/// Template sent with the rendered postcard as its image header.
pub const TEMPLATE_CONGRATULATION: &str = "congratulation_msg";

/// Template carrying a single text parameter.
pub const TEMPLATE_NOTIFICATION: &str = "notification_msg";

/// Language code every template is sent with.
pub const TEMPLATE_LANGUAGE: &str = "en";

/// Identifier the messaging API assigns to uploaded media.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MediaId(pub String);

impl std::fmt::Display for MediaId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Outbound messaging used by the pipeline.
pub trait MessagingDelivery {
    /// Upload raw image bytes, returning the media id to reference in a template header.
    fn upload_media(&self, bytes: Vec<u8>, file_name: &str, mime: &str) -> CardResult<MediaId>;

    /// Send an approved template with optional body text parameters and image header.
    fn send_template(
        &self,
        name: &str,
        body_params: &[String],
        header_media: Option<&MediaId>,
    ) -> CardResult<()>;
}

/// Connection settings for [`WhatsAppClient`].
#[derive(Clone, Debug)]
pub struct WhatsAppConfig {
    /// Graph API root, without trailing slash.
    pub base_url: String,
    /// Bearer token.
    pub api_token: String,
    /// Sending phone-number id.
    pub phone_number_id: String,
    /// Recipient number in any formatting; only digits are sent.
    pub recipient: String,
    /// Timeout for message sends.
    pub send_timeout: Duration,
    /// Timeout for media uploads.
    pub upload_timeout: Duration,
}

/// Blocking client for the WhatsApp Business Cloud API.
pub struct WhatsAppClient {
    client: Client,
    cfg: WhatsAppConfig,
}

impl WhatsAppClient {
    /// Build a client; send timeout is the client default, uploads override it per request.
    pub fn new(cfg: WhatsAppConfig) -> CardResult<Self> {
        let client = Client::builder()
            .timeout(cfg.send_timeout)
            .build()
            .map_err(|e| CardError::config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client, cfg })
    }

    /// Recipient with formatting stripped.
    pub fn recipient_digits(&self) -> String {
        digits_only(&self.cfg.recipient)
    }

    fn endpoint(&self, leaf: &str) -> String {
        format!(
            "{}/{}/{}",
            self.cfg.base_url.trim_end_matches('/'),
            self.cfg.phone_number_id,
            leaf
        )
    }

    fn post_messages(&self, payload: &Value, what: &str) -> CardResult<Response> {
        let req = self
            .client
            .post(self.endpoint("messages"))
            .bearer_auth(&self.cfg.api_token)
            .json(payload);
        send_checked(req, what)
    }

    /// Send a plain text message; returns the message id reported by the API.
    #[tracing::instrument(skip_all)]
    pub fn send_text(&self, body: &str) -> CardResult<String> {
        let payload = json!({
            "messaging_product": "whatsapp",
            "recipient_type": "individual",
            "to": self.recipient_digits(),
            "type": "text",
            "text": { "body": body },
        });
        let resp = self.post_messages(&payload, "send text message")?;
        Ok(message_id(resp))
    }

    /// Send an image by public URL with a caption.
    #[tracing::instrument(skip_all, fields(url = image_url))]
    pub fn send_image_link(&self, image_url: &str, caption: &str) -> CardResult<String> {
        let payload = json!({
            "messaging_product": "whatsapp",
            "recipient_type": "individual",
            "to": self.recipient_digits(),
            "type": "image",
            "image": { "link": image_url, "caption": caption },
        });
        let resp = self.post_messages(&payload, "send image message")?;
        Ok(message_id(resp))
    }
}

impl MessagingDelivery for WhatsAppClient {
    #[tracing::instrument(skip(self, bytes), fields(len = bytes.len()))]
    fn upload_media(&self, bytes: Vec<u8>, file_name: &str, mime: &str) -> CardResult<MediaId> {
        let part = multipart::Part::bytes(bytes)
            .file_name(file_name.to_owned())
            .mime_str(mime)
            .map_err(|e| CardError::upload(format!("invalid mime type {mime:?}: {e}")))?;
        let form = multipart::Form::new()
            .part("file", part)
            .text("messaging_product", "whatsapp")
            .text("type", mime.to_owned());
        let req = self
            .client
            .post(self.endpoint("media"))
            .bearer_auth(&self.cfg.api_token)
            .timeout(self.cfg.upload_timeout)
            .multipart(form);
        let resp = send_checked(req, "upload media")?;
        let body: UploadResponse = resp
            .json()
            .map_err(|e| CardError::upload(format!("unreadable upload response: {e}")))?;
        match body.id {
            Some(id) if !id.is_empty() => {
                tracing::info!(media_id = %id, "media uploaded");
                Ok(MediaId(id))
            }
            _ => Err(CardError::upload("upload response carried no media id")),
        }
    }

    #[tracing::instrument(skip(self, body_params, header_media))]
    fn send_template(
        &self,
        name: &str,
        body_params: &[String],
        header_media: Option<&MediaId>,
    ) -> CardResult<()> {
        let payload = template_payload(&self.recipient_digits(), name, body_params, header_media);
        self.post_messages(&payload, "send template")?;
        tracing::info!(template = name, "template sent");
        Ok(())
    }
}

#[derive(Deserialize)]
struct UploadResponse {
    #[serde(default)]
    id: Option<String>,
}

#[derive(Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    messages: Vec<MessageRef>,
}

#[derive(Deserialize)]
struct MessageRef {
    #[serde(default)]
    id: Option<String>,
}

fn message_id(resp: Response) -> String {
    resp.json::<MessagesResponse>()
        .ok()
        .and_then(|r| r.messages.into_iter().next())
        .and_then(|m| m.id)
        .unwrap_or_else(|| "unknown".to_owned())
}

fn send_checked(req: RequestBuilder, what: &str) -> CardResult<Response> {
    let resp = req.send().map_err(|e| CardError::from_reqwest(what, e))?;
    let status = resp.status().as_u16();
    if status != 200 {
        let body = resp.text().unwrap_or_default();
        match status_hint(status) {
            Some(hint) => tracing::error!(status, %body, hint, "{what} failed"),
            None => tracing::error!(status, %body, "{what} failed"),
        }
        return Err(CardError::http_status(status, what));
    }
    Ok(resp)
}

/// Build the JSON body of a template message.
///
/// The header component is present only with media; the body component only with parameters.
pub fn template_payload(
    to: &str,
    name: &str,
    body_params: &[String],
    header_media: Option<&MediaId>,
) -> Value {
    let mut components = Vec::new();
    if let Some(media) = header_media {
        components.push(json!({
            "type": "header",
            "parameters": [{ "type": "image", "image": { "id": media.0 } }],
        }));
    }
    if !body_params.is_empty() {
        let params: Vec<Value> = body_params
            .iter()
            .map(|p| json!({ "type": "text", "text": p }))
            .collect();
        components.push(json!({ "type": "body", "parameters": params }));
    }
    json!({
        "messaging_product": "whatsapp",
        "to": to,
        "type": "template",
        "template": {
            "name": name,
            "language": { "code": TEMPLATE_LANGUAGE },
            "components": components,
        },
    })
}

/// Keep ASCII digits only.
pub fn digits_only(s: &str) -> String {
    s.chars().filter(char::is_ascii_digit).collect()
}

/// Operator hint for common failure statuses.
pub fn status_hint(status: u16) -> Option<&'static str> {
    match status {
        401 => Some("invalid token; check WHATSAPP_API_TOKEN"),
        403 => Some(
            "permission denied; the token needs whatsapp_business_messaging and access to the account",
        ),
        404 => Some("invalid phone number id; check WHATSAPP_PHONE_NUMBER_ID"),
        _ => None,
    }
}

/// Show the first 20 characters of a token followed by an ellipsis.
pub fn mask_token(token: &str) -> String {
    let prefix: String = token.chars().take(20).collect();
    format!("{prefix}...")
}

/// Result of checking which messaging credentials are configured.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CredentialReport {
    /// Masked token, when set.
    pub token: Option<String>,
    /// Phone-number id, when set.
    pub phone_number_id: Option<String>,
    /// Recipient digits, when set.
    pub recipient: Option<String>,
}

impl CredentialReport {
    /// Inspect raw credential values; blanks and known placeholders count as unset.
    pub fn inspect(token: Option<&str>, phone_number_id: Option<&str>, recipient: Option<&str>) -> Self {
        let set = |v: Option<&str>, placeholder: &str| {
            v.map(str::trim)
                .filter(|v| !v.is_empty() && *v != placeholder)
                .map(str::to_owned)
        };
        Self {
            token: set(token, "YOUR_PERMANENT_TOKEN_HERE").map(|t| mask_token(&t)),
            phone_number_id: set(phone_number_id, "YOUR_PHONE_NUMBER_ID_HERE"),
            recipient: set(recipient, "").map(|r| digits_only(&r)).filter(|r| !r.is_empty()),
        }
    }

    /// Names of the variables still missing.
    pub fn missing(&self) -> Vec<&'static str> {
        let mut out = Vec::new();
        if self.token.is_none() {
            out.push("WHATSAPP_API_TOKEN");
        }
        if self.phone_number_id.is_none() {
            out.push("WHATSAPP_PHONE_NUMBER_ID");
        }
        if self.recipient.is_none() {
            out.push("TARGET_PHONE_NUMBER");
        }
        out
    }

    /// `true` when every credential is present.
    pub fn is_complete(&self) -> bool {
        self.missing().is_empty()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/delivery/whatsapp.rs"]
mod tests;
