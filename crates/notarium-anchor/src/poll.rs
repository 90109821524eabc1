//! Bounded receipt polling with exponential backoff.

use notarium_ledger::{Ledger, LedgerError, Receipt, TxRef};
use std::time::Duration;
use tokio::time::Instant;

use crate::cancel::CancelSignal;
use crate::config::PollConfig;

/// Why polling ended without a receipt.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PollError {
    #[error("no receipt after {waited:?}")]
    TimedOut {
        waited: Duration,
        last_error: Option<String>,
    },

    #[error("polling cancelled")]
    Cancelled,
}

/// Query `tx` until a receipt appears, the timeout elapses, or `cancel`
/// fires. Pending and failed queries are both retried; the wait between
/// attempts grows per `config` and never outlives the deadline.
pub async fn wait_for_receipt(
    ledger: &dyn Ledger,
    tx: &TxRef,
    config: &PollConfig,
    mut cancel: CancelSignal,
) -> Result<Receipt, PollError> {
    let started = Instant::now();
    let deadline = started + config.timeout();
    let mut delay = config.initial_interval();
    let mut attempt: u32 = 0;
    let mut last_error: Option<String> = None;

    loop {
        attempt += 1;
        let query = tokio::time::timeout_at(deadline, ledger.receipt(tx));
        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(PollError::Cancelled),
            result = query => result,
        };

        match result {
            Ok(Ok(receipt)) => {
                tracing::debug!(%tx, attempt, block = receipt.block_number, "receipt observed");
                return Ok(receipt);
            }
            Ok(Err(LedgerError::NotYetMined(_))) => {
                tracing::debug!(%tx, attempt, "transaction not yet mined");
                last_error = None;
            }
            Ok(Err(e)) => {
                tracing::warn!(%tx, attempt, error = %e, "receipt query failed, retrying");
                last_error = Some(e.to_string());
            }
            Err(_elapsed) => {
                return Err(PollError::TimedOut {
                    waited: started.elapsed(),
                    last_error,
                });
            }
        }

        let now = Instant::now();
        if now >= deadline {
            return Err(PollError::TimedOut {
                waited: started.elapsed(),
                last_error,
            });
        }
        let pause = delay.min(deadline - now);
        tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(PollError::Cancelled),
            _ = tokio::time::sleep(pause) => {}
        }
        delay = config.next_interval(delay);
    }
}
