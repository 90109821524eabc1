//! Integration test: verification batches and their strict error policy.

use std::sync::Arc;

use notarium_anchor::{BatchOrchestrator, CancelSignal, VerifyError};
use notarium_core::{Credential, CredentialDocument, VerifyResponse};
use notarium_integration_tests::*;
use notarium_ledger::{LedgerError, MemoryConnector, MemoryLedger};
use notarium_notify::{MemoryMailer, NotificationConfig, NotificationDispatcher};

async fn anchored(
    ledger: Arc<MemoryLedger>,
    authors: &[&str],
) -> (Arc<MemoryConnector>, BatchOrchestrator, Vec<Credential>) {
    let connector = Arc::new(MemoryConnector::new(ledger));
    let orchestrator = BatchOrchestrator::new(connector.clone(), fast_config());
    let subjects: Vec<_> = authors.iter().map(|a| diploma(a)).collect();
    let credentials = orchestrator
        .anchor_batch(&subjects, &anchor_params(), CancelSignal::never())
        .await
        .unwrap()
        .into_iter()
        .filter_map(|o| o.into_credential())
        .collect();
    (connector, orchestrator, credentials)
}

fn documents(credentials: &[Credential]) -> Vec<CredentialDocument> {
    credentials.iter().cloned().map(Into::into).collect()
}

#[tokio::test]
async fn test_all_valid() {
    let ledger = Arc::new(MemoryLedger::new());
    let (connector, orchestrator, credentials) =
        anchored(ledger, &["Ana Ruiz", "Bo Chen", "Cy Diaz"]).await;

    let response = orchestrator
        .verify_batch(&documents(&credentials), &verify_params(ISSUER_KEY))
        .await
        .unwrap();
    assert_eq!(response, VerifyResponse::ok());
    // One connection for anchoring, one for verification.
    assert_eq!(connector.connect_count(), 2);
    assert_eq!(connector.close_count(), 2);
}

#[tokio::test]
async fn test_bare_credential_data_is_accepted() {
    let ledger = Arc::new(MemoryLedger::new());
    let (_, orchestrator, credentials) = anchored(ledger, &["Ana Ruiz"]).await;

    let json = serde_json::to_string(&credentials[0].credential_data).unwrap();
    let document: CredentialDocument = serde_json::from_str(&json).unwrap();
    assert!(matches!(document, CredentialDocument::Data(_)));

    let response = orchestrator
        .verify_batch(&[document], &verify_params(ISSUER_KEY))
        .await
        .unwrap();
    assert!(response.valid);
}

#[tokio::test]
async fn test_invalid_item_keeps_first_failure_code() {
    let ledger = Arc::new(MemoryLedger::new());
    let (_, orchestrator, mut credentials) =
        anchored(ledger, &["Ana Ruiz", "Bo Chen", "Cy Diaz"]).await;
    credentials[0].credential_data.issuer = "did:example:mallory".into();
    credentials[2].credential_data.issuer = "did:example:mallory".into();

    let response = orchestrator
        .verify_batch(&documents(&credentials), &verify_params(ISSUER_KEY))
        .await
        .unwrap();
    assert!(!response.valid);
    assert_eq!(response.error.code, VerifyResponse::CODE_INVALID);
    assert_eq!(response.error.message, VerifyResponse::MESSAGE_INVALID);
}

#[tokio::test]
async fn test_query_error_aborts_remaining_items() {
    let ledger = Arc::new(MemoryLedger::new());
    let (connector, orchestrator, credentials) =
        anchored(ledger.clone(), &["Ana Ruiz", "Bo Chen", "Cy Diaz"]).await;
    ledger.fail_queries_containing("Bo Chen");

    let result = orchestrator
        .verify_batch(&documents(&credentials), &verify_params(ISSUER_KEY))
        .await;
    match result {
        Err(VerifyError::Query {
            credential_id,
            source: LedgerError::Query(_),
        }) => assert_eq!(credential_id, credentials[1].id()),
        other => panic!("expected query error, got {:?}", other),
    }
    // The connection is still released.
    assert_eq!(connector.close_count(), 2);
}

#[tokio::test]
async fn test_unreachable_ledger() {
    let ledger = Arc::new(MemoryLedger::new());
    let (connector, orchestrator, credentials) = anchored(ledger, &["Ana Ruiz"]).await;
    connector.set_reachable(false);

    let result = orchestrator
        .verify_batch(&documents(&credentials), &verify_params(ISSUER_KEY))
        .await;
    assert!(matches!(result, Err(VerifyError::Connection(_))));
}

#[tokio::test]
async fn test_verification_survives_ledger_restart() {
    let ledger = Arc::new(MemoryLedger::new());
    let (_, _, credentials) = anchored(ledger.clone(), &["Ana Ruiz"]).await;

    let snapshot = serde_json::to_string(&ledger.snapshot()).unwrap();
    let restored = Arc::new(MemoryLedger::from_snapshot(
        serde_json::from_str(&snapshot).unwrap(),
    ));
    let orchestrator =
        BatchOrchestrator::new(Arc::new(MemoryConnector::new(restored)), fast_config());

    let response = orchestrator
        .verify_batch(&documents(&credentials), &verify_params(ISSUER_KEY))
        .await
        .unwrap();
    assert!(response.valid);
}

#[tokio::test]
async fn test_verify_and_notify_sends_valid_items_only() {
    let ledger = Arc::new(MemoryLedger::new());
    let (connector, _, mut credentials) = anchored(ledger, &["Ana Ruiz", "Bo Chen"]).await;
    credentials[1].credential_data.credential_subject.insert("author".into(), "Eve".into());

    let mailer = Arc::new(MemoryMailer::new());
    let orchestrator = BatchOrchestrator::new(connector, fast_config()).with_notifier(Arc::new(
        NotificationDispatcher::new(mailer.clone(), NotificationConfig::default()),
    ));

    let response = orchestrator
        .verify_and_notify(&credentials, &verify_params(ISSUER_KEY))
        .await
        .unwrap();
    assert!(!response.valid);
    let sent = mailer.sent().await;
    assert_eq!(sent.len(), 1);
    assert!(sent[0].text_body.contains("Dear Ana Ruiz"));
}
