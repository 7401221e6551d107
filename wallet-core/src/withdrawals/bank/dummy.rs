use std::collections::HashSet;
use std::sync::RwLock;

use async_trait::async_trait;
use rand::Rng;

use crate::errors::CoreResult;

use super::{BankClient, BankSignal};

/// Reference bank implementation used for local/dev and the test suite
/// (`examples/original_source/lib/withdraws/integrations/internal/dummy/dummy.go`).
///
/// `track_id`s that have already been accepted are remembered in `track_ids`
/// behind a reader-writer lock shared across every worker pool task. `send`
/// rejects a replay of an already-accepted id with `DuplicatePayout`;
/// otherwise it flips a Bernoulli trial against `failure_rate` and only
/// records the id on success, so a `FAILED` attempt can still be retried (or
/// sent fresh) and succeed later.
pub struct DummyBankClient {
    failure_rate: f64,
    track_ids: RwLock<HashSet<String>>,
}

impl DummyBankClient {
    pub fn new(failure_rate: f64) -> Self {
        Self {
            failure_rate,
            track_ids: RwLock::new(HashSet::new()),
        }
    }
}

#[async_trait]
impl BankClient for DummyBankClient {
    async fn send(&self, _iban: &str, _amount: i64, track_id: &str) -> CoreResult<BankSignal> {
        {
            let seen = self.track_ids.read().expect("track_ids lock poisoned");
            if seen.contains(track_id) {
                return Err(crate::errors::CoreError::DuplicatePayout(
                    track_id.to_string(),
                ));
            }
        }

        let failed = rand::thread_rng().gen_bool(self.failure_rate);
        if failed {
            return Ok(BankSignal::Failed);
        }

        let mut seen = self.track_ids.write().expect("track_ids lock poisoned");
        seen.insert(track_id.to_string());
        Ok(BankSignal::Success)
    }

    async fn get_status(&self, _track_id: &str) -> CoreResult<BankSignal> {
        Ok(BankSignal::Success)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn never_fails_records_and_succeeds() {
        let client = DummyBankClient::new(0.0);
        let signal = client.send("IR000", 100, "track-1").await.unwrap();
        assert_eq!(signal, BankSignal::Success);
    }

    #[tokio::test]
    async fn always_fails_does_not_record_id() {
        let client = DummyBankClient::new(1.0);
        let signal = client.send("IR000", 100, "track-2").await.unwrap();
        assert_eq!(signal, BankSignal::Failed);
        // A second attempt with the same track id is still a fresh send,
        // not a duplicate, since the failed attempt was never recorded.
        let signal = client.send("IR000", 100, "track-2").await.unwrap();
        assert_eq!(signal, BankSignal::Failed);
    }

    #[tokio::test]
    async fn replaying_an_accepted_track_id_is_a_duplicate() {
        let client = DummyBankClient::new(0.0);
        client.send("IR000", 100, "track-3").await.unwrap();
        let err = client.send("IR000", 100, "track-3").await.unwrap_err();
        assert!(matches!(err, crate::errors::CoreError::DuplicatePayout(id) if id == "track-3"));
    }
}
