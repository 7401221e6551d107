use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use uuid::Uuid;

use super::bank::{BankClient, BankSignal};
use super::service::WithdrawalService;

/// A unit of work the pool dispatches to a bank client (spec §4.5).
#[derive(Debug, Clone)]
pub enum WorkerJob {
    Send { withdrawal_id: Uuid, iban: String, amount: i64 },
    Check { withdrawal_id: Uuid },
}

/// Tunables for the bounded worker pool: concurrency `C`, retry count `R`,
/// backoff `B` between attempts.
#[derive(Debug, Clone, Copy)]
pub struct WorkerConfig {
    pub concurrency: usize,
    pub retry_count: u32,
    pub backoff: Duration,
    pub queue_capacity: usize,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            concurrency: 5,
            retry_count: 3,
            backoff: Duration::from_secs(2),
            queue_capacity: 64,
        }
    }
}

/// A running pool of `C` workers consuming a bounded job channel. `submit`
/// is the only backpressure signal: when every worker is busy and the
/// channel is full, the caller's `submit` await blocks until a slot frees
/// or the pool is cancelled (spec §4.5/§5).
pub struct WorkerPool {
    sender: mpsc::Sender<WorkerJob>,
    handles: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    pub fn spawn(
        config: WorkerConfig,
        service: Arc<WithdrawalService>,
        bank_client: Arc<dyn BankClient>,
        cancel: CancellationToken,
    ) -> Self {
        let (sender, receiver) = mpsc::channel(config.queue_capacity);
        let receiver = Arc::new(tokio::sync::Mutex::new(receiver));

        let handles = (0..config.concurrency)
            .map(|worker_id| {
                let receiver = receiver.clone();
                let service = service.clone();
                let bank_client = bank_client.clone();
                let cancel = cancel.clone();
                tokio::spawn(async move {
                    run_worker(worker_id, receiver, service, bank_client, config, cancel).await
                })
            })
            .collect();

        Self { sender, handles }
    }

    /// Enqueues a job, waiting for a worker slot or cancellation, whichever
    /// comes first.
    pub async fn submit(&self, job: WorkerJob) -> Result<(), mpsc::error::SendError<WorkerJob>> {
        self.sender.send(job).await
    }

    /// Drops the sender (no more jobs accepted) and waits for every worker
    /// to drain its current job and exit.
    pub async fn stop(self) {
        drop(self.sender);
        for handle in self.handles {
            let _ = handle.await;
        }
    }
}

async fn run_worker(
    worker_id: usize,
    receiver: Arc<tokio::sync::Mutex<mpsc::Receiver<WorkerJob>>>,
    service: Arc<WithdrawalService>,
    bank_client: Arc<dyn BankClient>,
    config: WorkerConfig,
    cancel: CancellationToken,
) {
    loop {
        let job = {
            let mut receiver = receiver.lock().await;
            tokio::select! {
                job = receiver.recv() => job,
                _ = cancel.cancelled() => None,
            }
        };
        let Some(job) = job else {
            break;
        };

        if let Err(err) = handle_job(&service, &bank_client, &job, config, &cancel).await {
            warn!(worker_id, ?job, error = %err, "withdrawal worker job failed");
        }
    }
    info!(worker_id, "withdrawal worker exiting");
}

async fn handle_job(
    service: &WithdrawalService,
    bank_client: &Arc<dyn BankClient>,
    job: &WorkerJob,
    config: WorkerConfig,
    cancel: &CancellationToken,
) -> Result<(), crate::errors::CoreError> {
    match job {
        WorkerJob::Send {
            withdrawal_id,
            iban,
            amount,
        } => handle_send(service, bank_client, *withdrawal_id, iban, *amount, config, cancel).await,
        WorkerJob::Check { withdrawal_id } => {
            handle_check(service, bank_client, *withdrawal_id).await
        }
    }
}

/// Calls `client.send` under the retry wrapper, then dispatches per the
/// table in spec §4.5.
async fn handle_send(
    service: &WithdrawalService,
    bank_client: &Arc<dyn BankClient>,
    withdrawal_id: Uuid,
    iban: &str,
    amount: i64,
    config: WorkerConfig,
    cancel: &CancellationToken,
) -> Result<(), crate::errors::CoreError> {
    let track_id = withdrawal_id.to_string();
    let outcome = do_with_retry(config, cancel, || {
        let bank_client = bank_client.clone();
        let iban = iban.to_string();
        let track_id = track_id.clone();
        async move { bank_client.send(&iban, amount, &track_id).await }
    })
    .await;

    let signal = match outcome {
        Ok(signal) => signal,
        Err(crate::errors::CoreError::DuplicatePayout(_)) => {
            service.mark_as_sent(withdrawal_id).await?;
            return Ok(());
        }
        // Final error after all retries: no state change, the reconciler
        // will re-dispatch this withdrawal on its next sweep.
        Err(_) => return Ok(()),
    };

    match signal {
        BankSignal::Success => {
            service.complete(withdrawal_id).await?;
        }
        BankSignal::Failed => {
            service.reverse(withdrawal_id).await?;
        }
        BankSignal::Sent => {
            service.mark_as_sent(withdrawal_id).await?;
        }
        BankSignal::Unknown => {}
    }
    Ok(())
}

/// Calls `client.get_status` and dispatches: `SUCCESS -> Complete`,
/// `FAILED -> Reverse`, else no-op.
async fn handle_check(
    service: &WithdrawalService,
    bank_client: &Arc<dyn BankClient>,
    withdrawal_id: Uuid,
) -> Result<(), crate::errors::CoreError> {
    let track_id = withdrawal_id.to_string();
    match bank_client.get_status(&track_id).await? {
        BankSignal::Success => {
            service.complete(withdrawal_id).await?;
        }
        BankSignal::Failed => {
            service.reverse(withdrawal_id).await?;
        }
        BankSignal::Sent | BankSignal::Unknown => {}
    }
    Ok(())
}

/// Up to `R` attempts with a `B` sleep between failures. Cancellation
/// short-circuits the remaining retries immediately rather than sleeping
/// out the backoff.
async fn do_with_retry<F, Fut>(
    config: WorkerConfig,
    cancel: &CancellationToken,
    mut attempt: F,
) -> Result<BankSignal, crate::errors::CoreError>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<BankSignal, crate::errors::CoreError>>,
{
    let mut last_err = None;
    for attempt_number in 0..config.retry_count.max(1) {
        match attempt().await {
            Ok(signal) => return Ok(signal),
            Err(crate::errors::CoreError::DuplicatePayout(id)) => {
                return Err(crate::errors::CoreError::DuplicatePayout(id));
            }
            Err(err) => {
                last_err = Some(err);
            }
        }

        if attempt_number + 1 == config.retry_count {
            break;
        }

        tokio::select! {
            _ = tokio::time::sleep(config.backoff) => {}
            _ = cancel.cancelled() => break,
        }
    }
    Err(last_err.unwrap_or(crate::errors::CoreError::InvalidConfig))
}
