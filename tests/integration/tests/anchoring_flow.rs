//! Integration test: anchoring batches end to end against the development
//! ledger, including per-item failure isolation.

use std::sync::Arc;
use std::time::{Duration, Instant};

use notarium_anchor::{cancel_pair, AnchorError, BatchError, BatchOrchestrator, CancelSignal};
use notarium_core::{fingerprint, AnchorState, CredentialDocument, VerifyResponse};
use notarium_integration_tests::*;
use notarium_ledger::{LedgerError, MemoryConnector, MemoryLedger};
use notarium_notify::{MemoryMailer, NotificationConfig, NotificationDispatcher};

fn orchestrator(ledger: Arc<MemoryLedger>) -> (Arc<MemoryConnector>, BatchOrchestrator) {
    let connector = Arc::new(MemoryConnector::new(ledger));
    let orchestrator = BatchOrchestrator::new(connector.clone(), fast_config());
    (connector, orchestrator)
}

// =========================================================================
// Round trip
// =========================================================================

#[tokio::test]
async fn test_anchor_then_verify_round_trip() {
    let ledger = Arc::new(MemoryLedger::new().with_confirmation_polls(2));
    let (_, orchestrator) = orchestrator(ledger.clone());

    let outcomes = orchestrator
        .anchor_batch(&[diploma("Ana Ruiz")], &anchor_params(), CancelSignal::never())
        .await
        .unwrap();
    assert_eq!(outcomes[0].state(), AnchorState::MetadataAttached);
    let credential = outcomes[0].credential().unwrap().clone();

    // The stored document re-parses to the same digest.
    let json = serde_json::to_string(&credential).unwrap();
    let restored: CredentialDocument = serde_json::from_str(&json).unwrap();
    assert_eq!(
        fingerprint(restored.data()).unwrap().digest,
        fingerprint(&credential.credential_data).unwrap().digest
    );

    let response = orchestrator
        .verify_batch(&[restored], &verify_params(ISSUER_KEY))
        .await
        .unwrap();
    assert_eq!(response, VerifyResponse::ok());
}

#[tokio::test]
async fn test_stored_document_with_evidence_verifies() {
    let ledger = Arc::new(MemoryLedger::new());
    let (_, orchestrator) = orchestrator(ledger);

    let mut with_evidence = numbered(1);
    with_evidence.evidence = Some(serde_json::json!({"kind": "transcript", "pages": 3}));
    let mut null_evidence = numbered(2);
    null_evidence.evidence = Some(serde_json::Value::Null);

    let outcomes = orchestrator
        .anchor_batch(
            &[with_evidence, null_evidence],
            &anchor_params(),
            CancelSignal::never(),
        )
        .await
        .unwrap();

    let mut restored = Vec::new();
    for outcome in &outcomes {
        assert_eq!(outcome.state(), AnchorState::MetadataAttached);
        let json = serde_json::to_string(outcome.credential().unwrap()).unwrap();
        let document: CredentialDocument = serde_json::from_str(&json).unwrap();
        restored.push(document);
    }

    let response = orchestrator
        .verify_batch(&restored, &verify_params(ISSUER_KEY))
        .await
        .unwrap();
    assert_eq!(response, VerifyResponse::ok());
}

#[tokio::test]
async fn test_different_issuer_account_is_invalid() {
    let ledger = Arc::new(MemoryLedger::new());
    let (_, orchestrator) = orchestrator(ledger);

    let outcomes = orchestrator
        .anchor_batch(&[diploma("Ana Ruiz")], &anchor_params(), CancelSignal::never())
        .await
        .unwrap();
    let data = outcomes[0].credential().unwrap().credential_data.clone();

    let response = orchestrator
        .verify_batch(&[data.into()], &verify_params(OTHER_KEY))
        .await
        .unwrap();
    assert!(!response.valid);
    assert_eq!(response.error.code, "400");
    assert_eq!(response.error.message, "Credential is invalid");
}

#[tokio::test]
async fn test_tampering_any_field_is_detected() {
    let ledger = Arc::new(MemoryLedger::new());
    let (_, orchestrator) = orchestrator(ledger);
    let outcomes = orchestrator
        .anchor_batch(&[diploma("Ana Ruiz")], &anchor_params(), CancelSignal::never())
        .await
        .unwrap();
    let original = outcomes[0].credential().unwrap().credential_data.clone();

    let mut content = original.clone();
    content.credential_subject.insert("author".into(), "Mallory".into());
    let mut issuer = original.clone();
    issuer.issuer = "did:example:mallory".into();
    let mut expiry = original.clone();
    expiry.expiration_date = expiry.expiration_date + chrono::Duration::days(365);
    let mut proof = original.clone();
    proof.proof.verification_method = "0x0000000000000000000000000000000000000000".into();

    for tampered in [content, issuer, expiry, proof] {
        let response = orchestrator
            .verify_batch(&[tampered.into()], &verify_params(ISSUER_KEY))
            .await
            .unwrap();
        assert!(!response.valid);
    }
}

// =========================================================================
// Partial failure
// =========================================================================

#[tokio::test]
async fn test_submission_failure_is_isolated() {
    let ledger = Arc::new(MemoryLedger::new());
    let subjects: Vec<_> = (1..=6).map(numbered).collect();
    ledger.reject_submissions_expiring_at(subjects[3].expiration_epoch());
    let (connector, orchestrator) = orchestrator(ledger.clone());

    let outcomes = orchestrator
        .anchor_batch(&subjects, &anchor_params(), CancelSignal::never())
        .await
        .unwrap();

    assert_eq!(outcomes.len(), 6);
    for (i, outcome) in outcomes.iter().enumerate() {
        if i == 3 {
            assert_eq!(outcome.state(), AnchorState::SubmissionFailed);
            assert!(matches!(
                outcome.error(),
                Some(AnchorError::Submission(LedgerError::Submission(_)))
            ));
            assert!(outcome.credential().unwrap().metadata.is_none());
        } else {
            assert_eq!(outcome.state(), AnchorState::MetadataAttached, "item {i}");
        }
    }
    assert_eq!(ledger.anchor_count(), 5);
    assert_eq!(connector.connect_count(), 1);
    assert_eq!(connector.close_count(), 1);
}

#[tokio::test]
async fn test_stalled_item_times_out_without_blocking_batch() {
    let ledger = Arc::new(MemoryLedger::new());
    let subjects: Vec<_> = (1..=3).map(numbered).collect();
    ledger.stall_transactions_expiring_at(subjects[1].expiration_epoch());
    let (_, orchestrator) = orchestrator(ledger);

    let started = Instant::now();
    let outcomes = orchestrator
        .anchor_batch(&subjects, &anchor_params(), CancelSignal::never())
        .await
        .unwrap();

    assert!(started.elapsed() < Duration::from_secs(3));
    let states: Vec<_> = outcomes.iter().map(|o| o.state()).collect();
    assert_eq!(
        states,
        vec![
            AnchorState::MetadataAttached,
            AnchorState::ConfirmationTimedOut,
            AnchorState::MetadataAttached,
        ]
    );
    assert!(matches!(
        outcomes[1].error(),
        Some(AnchorError::ConfirmationTimeout { .. })
    ));
}

#[tokio::test]
async fn test_invalid_subject_does_not_stop_batch() {
    let ledger = Arc::new(MemoryLedger::new());
    let mut bad = numbered(2);
    bad.recipient.email = "not-an-address".into();
    let subjects = vec![numbered(1), bad, numbered(3)];
    let (_, orchestrator) = orchestrator(ledger.clone());

    let outcomes = orchestrator
        .anchor_batch(&subjects, &anchor_params(), CancelSignal::never())
        .await
        .unwrap();
    assert_eq!(outcomes[1].state(), AnchorState::Rejected);
    assert!(outcomes[1].credential().is_none());
    assert!(outcomes[0].is_anchored() && outcomes[2].is_anchored());
    assert_eq!(ledger.anchor_count(), 2);
}

#[tokio::test]
async fn test_cancellation_releases_stalled_items() {
    let ledger = Arc::new(MemoryLedger::new());
    let subjects: Vec<_> = (1..=3).map(numbered).collect();
    for s in &subjects[1..] {
        ledger.stall_transactions_expiring_at(s.expiration_epoch());
    }
    let connector = Arc::new(MemoryConnector::new(ledger));
    let mut config = fast_config();
    config.poll.timeout_ms = 60_000;
    let orchestrator = BatchOrchestrator::new(connector, config);

    let (handle, signal) = cancel_pair();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        handle.cancel();
    });

    let started = Instant::now();
    let outcomes = orchestrator
        .anchor_batch(&subjects, &anchor_params(), signal)
        .await
        .unwrap();
    assert!(started.elapsed() < Duration::from_secs(5));

    assert_eq!(outcomes[0].state(), AnchorState::MetadataAttached);
    for outcome in &outcomes[1..] {
        assert_eq!(outcome.state(), AnchorState::ConfirmationTimedOut);
        assert!(matches!(outcome.error(), Some(AnchorError::Cancelled { .. })));
    }
}

#[tokio::test]
async fn test_cancelled_batch_submits_nothing() {
    let ledger = Arc::new(MemoryLedger::new());
    let (_, orchestrator) = orchestrator(ledger.clone());
    let subjects: Vec<_> = (1..=5).map(numbered).collect();

    let (handle, signal) = cancel_pair();
    handle.cancel();
    let outcomes = orchestrator
        .anchor_batch(&subjects, &anchor_params(), signal)
        .await
        .unwrap();

    assert_eq!(outcomes.len(), 5);
    for outcome in &outcomes {
        assert_eq!(outcome.state(), AnchorState::ConfirmationTimedOut);
        assert!(matches!(
            outcome.error(),
            Some(AnchorError::Cancelled { tx: None })
        ));
    }
    assert_eq!(ledger.submission_count(), 0);
    assert_eq!(ledger.anchor_count(), 0);
}

#[tokio::test]
async fn test_unreachable_ledger_aborts_batch() {
    let ledger = Arc::new(MemoryLedger::new());
    let (connector, orchestrator) = orchestrator(ledger);
    connector.set_reachable(false);

    let result = orchestrator
        .anchor_batch(&[numbered(1)], &anchor_params(), CancelSignal::never())
        .await;
    assert!(matches!(result, Err(BatchError::Connection(_))));
    assert_eq!(connector.connect_count(), 0);
}

// =========================================================================
// Notification
// =========================================================================

#[tokio::test]
async fn test_anchored_items_are_notified() {
    let ledger = Arc::new(MemoryLedger::new());
    let subjects: Vec<_> = (1..=3).map(numbered).collect();
    ledger.reject_submissions_expiring_at(subjects[0].expiration_epoch());
    let mailer = Arc::new(MemoryMailer::new());
    mailer.reject_recipient("holder3@example.org").await;
    let dispatcher = Arc::new(NotificationDispatcher::new(
        mailer.clone(),
        NotificationConfig::default(),
    ));
    let (_, orchestrator) = orchestrator(ledger);
    let orchestrator = orchestrator.with_notifier(dispatcher);

    let outcomes = orchestrator
        .anchor_batch(&subjects, &anchor_params(), CancelSignal::never())
        .await
        .unwrap();

    // A bounced notification leaves the credential anchored.
    assert!(outcomes[2].is_anchored());
    let sent = mailer.sent().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "holder2@example.org");
    assert_eq!(sent[0].attachments[0].filename, "credential.json");
}
