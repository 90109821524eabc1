use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::error::CoreError;
use crate::timestamp;

/// First entry of every credential's type list.
pub const VERIFIABLE_CREDENTIAL: &str = "VerifiableCredential";

/// Who receives the credential once it is anchored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipient {
    /// Contact email address.
    pub email: String,
    /// Display name used when addressing the recipient.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Recipient {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            name: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    fn validate(&self) -> Result<(), CoreError> {
        let valid = match self.email.split_once('@') {
            Some((local, domain)) => {
                !local.is_empty()
                    && !domain.is_empty()
                    && !domain.contains('@')
                    && !self.email.chars().any(char::is_whitespace)
            }
            None => false,
        };
        if valid {
            Ok(())
        } else {
            Err(CoreError::InvalidSubject(format!(
                "invalid recipient email: {:?}",
                self.email
            )))
        }
    }
}

/// Inbound request to anchor one credential.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialSubject {
    /// Declared credential type, e.g. `DiplomaCredential`.
    #[serde(rename = "type")]
    pub credential_type: String,
    /// Document content being attested.
    pub content: Map<String, Value>,
    #[serde(with = "timestamp")]
    pub issuance_date: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub expiration_date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evidence: Option<Value>,
    pub recipient: Recipient,
}

impl CredentialSubject {
    /// Check the subject once at ingress.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.credential_type.trim().is_empty() {
            return Err(CoreError::InvalidSubject("credential type is empty".into()));
        }
        if self.expiration_date <= self.issuance_date {
            return Err(CoreError::InvalidSubject(format!(
                "expiration {} is not after issuance {}",
                timestamp::format(&self.expiration_date),
                timestamp::format(&self.issuance_date)
            )));
        }
        self.recipient.validate()
    }

    /// Expiration as Unix seconds, the form the ledger stores.
    pub fn expiration_epoch(&self) -> i64 {
        self.expiration_date.timestamp()
    }
}

/// Proof envelope carried by every credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Proof {
    #[serde(rename = "type")]
    pub proof_type: String,
    pub verification_method: String,
    #[serde(with = "timestamp")]
    pub created: DateTime<Utc>,
}

/// The credential document whose canonical bytes are anchored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialData {
    /// `urn:uuid:<v7>`, unique per credential.
    pub id: String,
    #[serde(rename = "type")]
    pub types: Vec<String>,
    pub issuer: String,
    #[serde(with = "timestamp")]
    pub issuance_date: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub expiration_date: DateTime<Utc>,
    pub credential_subject: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evidence: Option<Value>,
    pub proof: Proof,
}

impl CredentialData {
    /// Assemble credential data from a subject, generating a fresh id.
    pub fn build(subject: &CredentialSubject, issuer: &str, proof: Proof) -> Self {
        Self {
            id: new_credential_id(),
            types: vec![
                VERIFIABLE_CREDENTIAL.to_string(),
                subject.credential_type.clone(),
            ],
            issuer: issuer.to_string(),
            issuance_date: subject.issuance_date,
            expiration_date: subject.expiration_date,
            credential_subject: subject.content.clone(),
            evidence: subject.evidence.clone().filter(|v| !v.is_null()),
            proof,
        }
    }

    pub fn expiration_epoch(&self) -> i64 {
        self.expiration_date.timestamp()
    }
}

/// Generate a time-ordered credential identifier.
pub fn new_credential_id() -> String {
    format!("urn:uuid:{}", Uuid::now_v7())
}

/// Ledger facts recorded once an anchor is confirmed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialMetadata {
    /// Block number as a decimal string.
    pub block_number: String,
    #[serde(with = "timestamp")]
    pub timestamp: DateTime<Utc>,
    /// Transaction reference (hex hash).
    pub transaction: String,
    pub recipient: Recipient,
}

/// Credential data plus its anchoring metadata (absent until confirmed).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credential {
    pub credential_data: CredentialData,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<CredentialMetadata>,
}

impl Credential {
    pub fn new(credential_data: CredentialData) -> Self {
        Self {
            credential_data,
            metadata: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.credential_data.id
    }

    pub fn is_anchored(&self) -> bool {
        self.metadata.is_some()
    }
}

/// A presented credential: either a bare document or a full credential.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CredentialDocument {
    Full(Credential),
    Data(CredentialData),
}

impl CredentialDocument {
    pub fn data(&self) -> &CredentialData {
        match self {
            Self::Full(c) => &c.credential_data,
            Self::Data(d) => d,
        }
    }
}

impl From<Credential> for CredentialDocument {
    fn from(c: Credential) -> Self {
        Self::Full(c)
    }
}

impl From<CredentialData> for CredentialDocument {
    fn from(d: CredentialData) -> Self {
        Self::Data(d)
    }
}

/// Structured error carried by a [`VerifyResponse`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

/// Aggregate verdict for a verification batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyResponse {
    pub valid: bool,
    pub error: ErrorDetail,
}

impl VerifyResponse {
    pub const CODE_OK: &'static str = "200";
    pub const CODE_INVALID: &'static str = "400";
    pub const MESSAGE_OK: &'static str = "OK";
    pub const MESSAGE_INVALID: &'static str = "Credential is invalid";

    /// A response with no failures recorded yet.
    pub fn ok() -> Self {
        Self {
            valid: true,
            error: ErrorDetail {
                code: Self::CODE_OK.into(),
                message: Self::MESSAGE_OK.into(),
            },
        }
    }

    /// Record an invalid item. Only the first failure sets code and message.
    pub fn record_invalid(&mut self) {
        if self.valid {
            self.valid = false;
            self.error = ErrorDetail {
                code: Self::CODE_INVALID.into(),
                message: Self::MESSAGE_INVALID.into(),
            };
        }
    }
}

impl Default for VerifyResponse {
    fn default() -> Self {
        Self::ok()
    }
}
