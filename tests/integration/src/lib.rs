//! Fixtures shared by the integration scenarios.

use chrono::{TimeZone, Utc};
use notarium_anchor::{AnchorParams, AnchoringConfig, PollConfig, VerifyParams};
use notarium_core::{CredentialSubject, Recipient};
use notarium_ledger::{Address, SigningContext};
use zeroize::Zeroizing;

pub const ISSUER_KEY: &str = "4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318";
pub const OTHER_KEY: &str = "8da4ef21b864d2cc526dbdb2a120bd2874c36c9d0a1fb7f8c63d7f7a8b41de8f";
pub const ISSUER_DID: &str = "did:example:issuer1";
pub const ENDPOINT: &str = "memory://integration";

pub fn contract() -> Address {
    Address::from_bytes([0xC0; 20])
}

pub fn account(key: &str) -> Address {
    SigningContext::from_hex_key(key)
        .expect("valid test key")
        .account()
        .clone()
}

/// The diploma subject used throughout: author Ana Ruiz, valid for 2024.
pub fn diploma(author: &str) -> CredentialSubject {
    let mut content = serde_json::Map::new();
    content.insert("author".into(), author.into());
    CredentialSubject {
        credential_type: "DiplomaCredential".into(),
        content,
        issuance_date: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        expiration_date: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
        evidence: None,
        recipient: Recipient::new("ana@example.org").with_name(author),
    }
}

/// A subject with a distinct expiration day, so faults can target it.
pub fn numbered(n: u32) -> CredentialSubject {
    let mut subject = diploma(&format!("Holder {n}"));
    subject.expiration_date = Utc.with_ymd_and_hms(2025, 1, 1 + n, 0, 0, 0).unwrap();
    subject.recipient = Recipient::new(format!("holder{n}@example.org"));
    subject
}

/// Millisecond-scale polling so timeouts resolve quickly.
pub fn fast_config() -> AnchoringConfig {
    AnchoringConfig {
        concurrency: 4,
        poll: PollConfig {
            initial_interval_ms: 2,
            max_interval_ms: 20,
            multiplier: 2.0,
            timeout_ms: 150,
        },
        ..Default::default()
    }
}

pub fn anchor_params() -> AnchorParams {
    AnchorParams {
        endpoint: ENDPOINT.into(),
        issuer: ISSUER_DID.into(),
        contract: contract(),
        private_key: Zeroizing::new(ISSUER_KEY.to_string()),
    }
}

pub fn verify_params(key: &str) -> VerifyParams {
    VerifyParams {
        endpoint: ENDPOINT.into(),
        contract: contract(),
        account: account(key),
    }
}
