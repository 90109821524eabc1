use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use notarium_core::{timestamp, Credential, CredentialMetadata, Digest};
use serde::{Serialize, Serializer};

use crate::config::NotificationConfig;

/// Greeting used when the recipient has no display name.
const DEFAULT_RECIPIENT_NAME: &str = "credential holder";

/// A file attached to a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attachment {
    pub filename: String,
    pub content_type: String,
    #[serde(serialize_with = "as_base64")]
    pub bytes: Vec<u8>,
}

/// A fully composed message, ready for a [`crate::Mailer`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MailMessage {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub html_body: String,
    pub text_body: String,
    pub attachments: Vec<Attachment>,
}

fn as_base64<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&STANDARD.encode(bytes))
}

/// Public verification URL: the base URL followed by the hex digest.
pub fn verification_url(base_url: &str, digest: &Digest) -> String {
    format!("{}{}", base_url, digest.to_hex())
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Compose the notification for an anchored credential.
///
/// `document` is attached verbatim as `credential.json`; `code_image` is
/// attached as `credential-qr.png` when present.
pub fn compose(
    config: &NotificationConfig,
    credential: &Credential,
    metadata: &CredentialMetadata,
    document: &[u8],
    url: &str,
    code_image: Option<(Vec<u8>, String)>,
) -> MailMessage {
    let name = metadata
        .recipient
        .name
        .as_deref()
        .unwrap_or(DEFAULT_RECIPIENT_NAME);
    let registered_at = timestamp::format(&metadata.timestamp);
    let expires = timestamp::format(&credential.credential_data.expiration_date);

    let mut text_body = format!(
        "Dear {name},\n\n\
         The fingerprint of your document has been registered on the ledger at {registered_at} \
         in transaction {tx}, block {block}. Attached is your verifiable credential, valid until \
         {expires}.\n\nVerify it at any time: {url}\n",
        tx = metadata.transaction,
        block = metadata.block_number,
    );
    let mut html_body = format!(
        "<html><body><p>Dear {name},</p>\
         <p>The fingerprint of your document has been registered on the ledger at {registered_at} \
         in transaction {tx}, block {block}. Attached is your verifiable credential, valid until \
         {expires}.</p>\
         <p>Verify it at any time: <a href=\"{url}\">{url}</a></p>",
        name = escape_html(name),
        tx = escape_html(&metadata.transaction),
        block = escape_html(&metadata.block_number),
        url = escape_html(url),
    );
    if let Some(contact) = &config.support_contact {
        text_body.push_str(&format!("\nQuestions? Write to {}.\n", contact));
        html_body.push_str(&format!(
            "<p>Questions? Write to {}.</p>",
            escape_html(contact)
        ));
    }
    text_body.push_str(&format!("\n{}\n", config.organization));
    html_body.push_str(&format!(
        "<p>{}</p></body></html>",
        escape_html(&config.organization)
    ));

    let mut attachments = vec![Attachment {
        filename: "credential.json".into(),
        content_type: "application/json".into(),
        bytes: document.to_vec(),
    }];
    if let Some((bytes, content_type)) = code_image {
        attachments.push(Attachment {
            filename: "credential-qr.png".into(),
            content_type,
            bytes,
        });
    }

    MailMessage {
        from: config.sender.clone(),
        to: metadata.recipient.email.clone(),
        subject: config.subject.clone(),
        html_body,
        text_body,
        attachments,
    }
}
