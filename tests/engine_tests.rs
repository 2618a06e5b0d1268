//! Concurrency and invariant tests for the point engine
//!
//! These tests drive `PointEngine` through its public API from many tokio
//! tasks at once. The in-memory store is configured with random latency so
//! that an unserialized read-modify-write would lose updates.

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use chrono::{DateTime, Utc};
    use point_ledger::core::{
        AccountStore, GateTable, MemoryStore, PerAccountGates, PointEngine, StoreLatency,
        StripedGates,
    };
    use point_ledger::types::{
        AccountId, Balance, HistoryEntry, PointError, Points, StoreError, TransactionKind,
        MAX_POINT,
    };
    use rstest::rstest;
    use tokio::sync::Notify;

    fn latent_engine(max_millis: u64) -> PointEngine {
        PointEngine::new(Arc::new(MemoryStore::with_latency(StoreLatency::new(
            max_millis,
        ))))
    }

    async fn charge_concurrently(
        engine: &PointEngine,
        account_id: AccountId,
        count: usize,
        amount: Points,
    ) -> Vec<Result<Balance, PointError>> {
        let tasks: Vec<_> = (0..count)
            .map(|_| {
                let engine = engine.clone();
                tokio::spawn(async move { engine.charge(account_id, amount).await })
            })
            .collect();

        let mut results = Vec::with_capacity(count);
        for task in tasks {
            results.push(task.await.expect("charge task panicked"));
        }
        results
    }

    /// Scenario A: ten concurrent charges of 100 on a fresh account
    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_charges_sum_exactly() {
        let engine = latent_engine(5);

        let results = charge_concurrently(&engine, 1, 10, 100).await;
        assert!(results.iter().all(Result::is_ok));

        assert_eq!(engine.get_balance(1).await.unwrap().point, 1000);

        let history = engine.get_history(1).await.unwrap();
        assert_eq!(history.len(), 10);
        assert!(history
            .iter()
            .all(|entry| entry.kind == TransactionKind::Charge && entry.amount == 100));
    }

    #[rstest]
    #[case::per_account(Arc::new(PerAccountGates::new()) as Arc<dyn GateTable>)]
    #[case::striped(Arc::new(StripedGates::new(3)) as Arc<dyn GateTable>)]
    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_serialization_holds_for_every_gate_table(#[case] gates: Arc<dyn GateTable>) {
        let store = Arc::new(MemoryStore::with_latency(StoreLatency::new(2)));
        let engine = PointEngine::with_gates(store, gates);

        let mut tasks = Vec::new();
        for account_id in 1..=5u64 {
            for _ in 0..20 {
                let engine = engine.clone();
                tasks.push(tokio::spawn(
                    async move { engine.charge(account_id, 7).await },
                ));
            }
        }
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        for account_id in 1..=5u64 {
            assert_eq!(engine.get_balance(account_id).await.unwrap().point, 140);
            assert_eq!(engine.get_history(account_id).await.unwrap().len(), 20);
        }
    }

    /// The ledger reflects the acceptance order: replaying it reproduces every
    /// intermediate balance without ever dipping below zero.
    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_mixed_operations_never_go_negative() {
        let engine = latent_engine(2);
        engine.charge(1, 100).await.unwrap();

        let mut tasks = Vec::new();
        for i in 0..40 {
            let engine = engine.clone();
            tasks.push(tokio::spawn(async move {
                if i % 2 == 0 {
                    engine.use_points(1, 30).await
                } else {
                    engine.charge(1, 10).await
                }
            }));
        }

        for task in tasks {
            match task.await.unwrap() {
                Ok(_) | Err(PointError::InsufficientBalance { .. }) => {}
                Err(e) => panic!("unexpected error: {}", e),
            }
        }

        let history = engine.get_history(1).await.unwrap();
        let mut running: Points = 0;
        for entry in &history {
            running += match entry.kind {
                TransactionKind::Charge => entry.amount,
                TransactionKind::Use => -entry.amount,
            };
            assert!(running >= 0, "ledger went negative at entry {}", entry.id);
        }

        assert_eq!(engine.get_balance(1).await.unwrap().point, running);
        assert!(history.windows(2).all(|pair| pair[0].id < pair[1].id));
    }

    /// Scenario B: a charge above the limit is rejected and nothing is written
    #[tokio::test]
    async fn test_charge_above_limit_is_rejected() {
        let engine = latent_engine(0);

        let result = engine.charge(2, 1_000_000_001).await;

        assert!(matches!(
            result,
            Err(PointError::CapacityExceeded { max, .. }) if max == MAX_POINT
        ));
        assert_eq!(engine.get_balance(2).await.unwrap().point, 0);
        assert!(engine.get_history(2).await.unwrap().is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_charges_never_exceed_limit() {
        let engine = latent_engine(1);

        let results = charge_concurrently(&engine, 1, 30, MAX_POINT / 20).await;

        let accepted = results.iter().filter(|r| r.is_ok()).count();
        let rejected = results
            .iter()
            .filter(|r| matches!(r, Err(PointError::CapacityExceeded { .. })))
            .count();
        assert_eq!(accepted, 20);
        assert_eq!(rejected, 10);
        assert_eq!(engine.get_balance(1).await.unwrap().point, MAX_POINT);
    }

    /// Scenario C: a use larger than the balance fails and leaves one entry
    #[tokio::test]
    async fn test_use_above_balance_is_rejected() {
        let engine = latent_engine(0);
        engine.charge(3, 100).await.unwrap();

        let result = engine.use_points(3, 101).await;

        assert_eq!(
            result,
            Err(PointError::InsufficientBalance {
                account_id: 3,
                balance: 100,
                requested: 101,
            })
        );
        assert_eq!(engine.get_balance(3).await.unwrap().point, 100);

        let history = engine.get_history(3).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].kind, TransactionKind::Charge);
    }

    /// Scenario D: querying an untouched account
    #[tokio::test]
    async fn test_untouched_account_reads_zero() {
        let engine = latent_engine(0);

        assert_eq!(engine.get_balance(4).await.unwrap().point, 0);
        assert!(engine.get_history(4).await.unwrap().is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_other_accounts_are_not_blocked() {
        let engine = latent_engine(0);
        let release = Arc::new(Notify::new());
        let entered = Arc::new(Notify::new());

        // Hold account 1's gate until told otherwise
        let holder = {
            let engine = engine.clone();
            let release = Arc::clone(&release);
            let entered = Arc::clone(&entered);
            tokio::spawn(async move {
                engine
                    .run_exclusive(1, || async move {
                        entered.notify_one();
                        release.notified().await;
                    })
                    .await
            })
        };
        entered.notified().await;

        // Queue more work behind the held gate
        let queued: Vec<_> = (0..5)
            .map(|_| {
                let engine = engine.clone();
                tokio::spawn(async move { engine.charge(1, 1).await })
            })
            .collect();

        let other = tokio::time::timeout(Duration::from_secs(2), engine.charge(2, 50)).await;
        assert_eq!(other.expect("account 2 was blocked").unwrap().point, 50);

        // Account 1 is still waiting
        let blocked = tokio::time::timeout(Duration::from_millis(50), engine.charge(1, 1)).await;
        assert!(blocked.is_err());

        release.notify_one();
        holder.await.unwrap();
        for task in queued {
            task.await.unwrap().unwrap();
        }
        assert_eq!(engine.get_balance(1).await.unwrap().point, 5);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_cancelled_mutation_releases_gate() {
        let engine = latent_engine(0);
        let never = Arc::new(Notify::new());

        // The operation never completes on its own; the timeout drops it
        let cancelled = tokio::time::timeout(
            Duration::from_millis(20),
            engine.run_exclusive(1, || {
                let never = Arc::clone(&never);
                async move { never.notified().await }
            }),
        )
        .await;
        assert!(cancelled.is_err());

        let next = tokio::time::timeout(Duration::from_secs(2), engine.charge(1, 10)).await;
        assert_eq!(next.expect("gate leaked").unwrap().point, 10);
    }

    /// Store that fails every write until switched off
    #[derive(Default)]
    struct FlakyStore {
        inner: MemoryStore,
        failing: AtomicBool,
    }

    #[async_trait]
    impl AccountStore for FlakyStore {
        async fn read_balance(&self, account_id: AccountId) -> Result<Balance, StoreError> {
            self.inner.read_balance(account_id).await
        }

        async fn write_balance(
            &self,
            account_id: AccountId,
            point: Points,
        ) -> Result<Balance, StoreError> {
            if self.failing.load(Ordering::SeqCst) {
                return Err(StoreError::Unavailable {
                    message: "write path down".to_string(),
                });
            }
            self.inner.write_balance(account_id, point).await
        }

        async fn append_history(
            &self,
            account_id: AccountId,
            amount: Points,
            kind: TransactionKind,
            at: DateTime<Utc>,
        ) -> Result<HistoryEntry, StoreError> {
            self.inner.append_history(account_id, amount, kind, at).await
        }

        async fn list_history(
            &self,
            account_id: AccountId,
        ) -> Result<Vec<HistoryEntry>, StoreError> {
            self.inner.list_history(account_id).await
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_store_faults_surface_as_system_errors_and_release_gate() {
        let store = Arc::new(FlakyStore::default());
        store.failing.store(true, Ordering::SeqCst);
        let engine = PointEngine::new(store.clone());

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let engine = engine.clone();
                tokio::spawn(async move { engine.charge(1, 10).await })
            })
            .collect();
        for task in tasks {
            let error = task.await.unwrap().unwrap_err();
            assert!(!error.is_rejected());
            assert!(matches!(error, PointError::Store(StoreError::Unavailable { .. })));
        }
        assert!(engine.get_history(1).await.unwrap().is_empty());

        store.failing.store(false, Ordering::SeqCst);
        let balance = tokio::time::timeout(Duration::from_secs(2), engine.charge(1, 10))
            .await
            .expect("gate leaked after store fault")
            .unwrap();
        assert_eq!(balance.point, 10);
    }
}
