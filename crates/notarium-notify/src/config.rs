use serde::{Deserialize, Serialize};

/// Mail identity and wording, injected rather than hardcoded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationConfig {
    /// `From` address of outgoing messages.
    #[serde(default = "default_sender")]
    pub sender: String,
    /// Subject line.
    #[serde(default = "default_subject")]
    pub subject: String,
    /// Public verification endpoint; the hex digest is appended to it.
    #[serde(default = "default_verification_base_url")]
    pub verification_base_url: String,
    /// Name used to sign messages.
    #[serde(default = "default_organization")]
    pub organization: String,
    /// Address recipients can write to with questions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub support_contact: Option<String>,
}

fn default_sender() -> String {
    "notarization@localhost".into()
}
fn default_subject() -> String {
    "Your verifiable credential".into()
}
fn default_verification_base_url() -> String {
    "http://localhost:8080/verify/".into()
}
fn default_organization() -> String {
    "Notarium".into()
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            sender: default_sender(),
            subject: default_subject(),
            verification_base_url: default_verification_base_url(),
            organization: default_organization(),
            support_contact: None,
        }
    }
}
