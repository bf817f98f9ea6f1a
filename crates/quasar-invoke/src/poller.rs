//! Transaction submission and confirmation polling.

use std::thread;
use std::time::{Duration, Instant};

use log::{debug, error};
use stellar_xdr::curr::TransactionEnvelope;

use crate::config::PollingConfig;
use crate::error::RpcError;
use crate::rpc::{RpcGateway, SendTransactionResponse};
use crate::types::SubmissionResult;

/// Source of time for the poller.
pub trait Clock {
    fn now(&self) -> Instant;
    fn sleep(&self, duration: Duration);
}

/// Wall clock, blocking the current thread on `sleep`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, duration: Duration) {
        thread::sleep(duration);
    }
}

/// Submits a signed transaction and waits for the ledger to record it.
pub struct ConfirmationPoller<'a> {
    rpc: &'a dyn RpcGateway,
    clock: &'a dyn Clock,
    config: PollingConfig,
}

impl<'a> ConfirmationPoller<'a> {
    pub fn new(rpc: &'a dyn RpcGateway, clock: &'a dyn Clock, config: PollingConfig) -> Self {
        ConfirmationPoller { rpc, clock, config }
    }

    /// Send `signed` once, then poll `getTransaction` for up to `seconds_to_wait`.
    ///
    /// The send response is returned as-is when its status is not `PENDING`
    /// or when `seconds_to_wait` is 0. Running out of time while the node
    /// still answers `NOT_FOUND` yields [`SubmissionResult::Pending`].
    pub fn submit_and_confirm(
        &self,
        signed: &TransactionEnvelope,
        seconds_to_wait: u64,
    ) -> Result<SubmissionResult, RpcError> {
        let sent = self.rpc.send_transaction(signed)?;
        debug!("sendTransaction {} -> {}", sent.hash, sent.status);

        if !sent.is_pending() || seconds_to_wait == 0 {
            return Ok(immediate(sent));
        }

        let hash = sent.hash;
        let mut response = self.rpc.get_transaction(&hash)?;
        let started = self.clock.now();
        let deadline = started + Duration::from_secs(seconds_to_wait);
        let mut interval = self.config.initial_interval_ms.max(1);
        let mut attempts: u32 = 1;

        while response.is_not_found() {
            let now = self.clock.now();
            if now >= deadline {
                break;
            }
            // Never sleep past the deadline
            let delay = Duration::from_millis(interval).min(deadline.duration_since(now));
            self.clock.sleep(delay);
            interval = self.config.next_interval(interval);

            response = self.rpc.get_transaction(&hash)?;
            attempts += 1;
            debug!(
                "Polling... (hash: {}, attempt: {}, status: {})",
                hash, attempts, response.status
            );
        }

        if response.is_not_found() {
            let waited = self.clock.now().saturating_duration_since(started);
            let info = serde_json::to_string_pretty(&response)
                .unwrap_or_else(|_| format!("{:?}", response));
            error!(
                "Waited {:.1}s ({} polls) for transaction {} to complete, but it did not. \
                 Returning anyway. Check the transaction status manually. Info: {}",
                waited.as_secs_f64(),
                attempts,
                hash,
                info
            );
            return Ok(SubmissionResult::Pending {
                hash,
                last: response,
            });
        }

        Ok(SubmissionResult::Completed { hash, response })
    }
}

fn immediate(sent: SendTransactionResponse) -> SubmissionResult {
    if sent.error_result_xdr.is_some() {
        SubmissionResult::Rejected(sent)
    } else {
        SubmissionResult::Sent(sent)
    }
}

/// Submit with the wall clock and default backoff.
pub fn send_tx(
    rpc: &dyn RpcGateway,
    signed: &TransactionEnvelope,
    seconds_to_wait: u64,
) -> Result<SubmissionResult, RpcError> {
    ConfirmationPoller::new(rpc, &SystemClock, PollingConfig::default())
        .submit_and_confirm(signed, seconds_to_wait)
}
