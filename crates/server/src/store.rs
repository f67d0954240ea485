//! In-memory system of record for obligations.
//!
//! One `RwLock` over the whole map serializes writers, so commands on the
//! same aggregate never interleave. On top of that, every mutating command
//! carries the version the caller last read; a mismatch is rejected with
//! `StaleVersion` before the command runs, which catches the
//! read-modify-write race between two clients holding the same snapshot.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use engine::{EngineError, Obligation, Status};

type ResultStore<T> = Result<T, EngineError>;

#[derive(Debug, Default)]
pub struct ObligationStore {
    obligations: RwLock<HashMap<Uuid, Obligation>>,
}

/// Filter for `list`; `page` is 1-based.
#[derive(Debug, Clone, Default)]
pub struct ListFilter {
    pub counterparty_ref: Option<String>,
    pub status: Option<Status>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub page: u64,
    pub page_size: u64,
}

#[derive(Debug)]
pub struct PageResult {
    pub obligations: Vec<Obligation>,
    pub total: u64,
}

impl ObligationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, obligation: Obligation) -> Obligation {
        let mut map = self.obligations.write().await;
        map.insert(obligation.id, obligation.clone());
        obligation
    }

    pub async fn get(&self, id: Uuid) -> ResultStore<Obligation> {
        self.obligations
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| EngineError::KeyNotFound(id.to_string()))
    }

    /// Lists obligations newest-first with a stable id tiebreak.
    pub async fn list(&self, filter: &ListFilter) -> PageResult {
        let map = self.obligations.read().await;
        let mut matches: Vec<&Obligation> = map
            .values()
            .filter(|o| {
                filter
                    .counterparty_ref
                    .as_deref()
                    .is_none_or(|c| o.counterparty_ref == c)
                    && filter.status.is_none_or(|s| o.status == s)
                    && filter.from.is_none_or(|from| o.created_at >= from)
                    && filter.to.is_none_or(|to| o.created_at <= to)
            })
            .collect();
        matches.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));

        let total = matches.len() as u64;
        let page = filter.page.max(1);
        let start = (page - 1).saturating_mul(filter.page_size) as usize;
        let obligations = matches
            .into_iter()
            .skip(start)
            .take(filter.page_size as usize)
            .cloned()
            .collect();
        PageResult { obligations, total }
    }

    /// Applies a mutating command under the optimistic-concurrency check.
    ///
    /// The command runs against a copy; the stored obligation is only
    /// replaced when the command succeeds, so a failed command never leaves a
    /// half-applied aggregate behind.
    pub async fn mutate<F>(
        &self,
        id: Uuid,
        expected_version: u64,
        command: F,
    ) -> ResultStore<Obligation>
    where
        F: FnOnce(&mut Obligation) -> Result<(), EngineError>,
    {
        let mut map = self.obligations.write().await;
        let stored = map
            .get_mut(&id)
            .ok_or_else(|| EngineError::KeyNotFound(id.to_string()))?;
        if stored.version != expected_version {
            return Err(EngineError::StaleVersion {
                expected: expected_version,
                actual: stored.version,
            });
        }

        let mut updated = stored.clone();
        command(&mut updated)?;
        *stored = updated.clone();
        Ok(updated)
    }

    /// Hard delete, from any state. A missing id is an error, never a silent
    /// no-op.
    pub async fn remove(&self, id: Uuid) -> ResultStore<()> {
        self.obligations
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| EngineError::KeyNotFound(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine::{Currency, CurrencyAmount, Money, ObligationKind};

    fn obligation() -> Obligation {
        Obligation::new(
            ObligationKind::Advance,
            "emp-1".to_string(),
            vec![CurrencyAmount::new(Currency::Lak, Money::new(1000)).unwrap()],
            None,
            Utc::now(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn stale_version_is_rejected() {
        let store = ObligationStore::new();
        let stored = store.insert(obligation()).await;

        let err = store
            .mutate(stored.id, stored.version + 1, |o| o.activate())
            .await
            .unwrap_err();
        assert_eq!(
            err,
            EngineError::StaleVersion {
                expected: stored.version + 1,
                actual: stored.version,
            }
        );
    }

    #[tokio::test]
    async fn failed_command_leaves_state_unchanged() {
        let store = ObligationStore::new();
        let stored = store.insert(obligation()).await;

        // Closing a pending obligation is illegal; the store must still hold
        // the pending version afterwards.
        let err = store
            .mutate(stored.id, stored.version, |o| o.close(None, Utc::now()))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::IllegalTransition { .. }));

        let reloaded = store.get(stored.id).await.unwrap();
        assert_eq!(reloaded, stored);
    }

    #[tokio::test]
    async fn remove_missing_id_is_not_found() {
        let store = ObligationStore::new();
        assert!(matches!(
            store.remove(Uuid::new_v4()).await,
            Err(EngineError::KeyNotFound(_))
        ));
    }

    #[tokio::test]
    async fn list_filters_and_pages() {
        let store = ObligationStore::new();
        for _ in 0..3 {
            store.insert(obligation()).await;
        }
        let mut closed = obligation();
        closed.activate().unwrap();
        closed.close(None, Utc::now()).unwrap();
        store.insert(closed).await;

        let page = store
            .list(&ListFilter {
                status: Some(Status::Pending),
                page: 1,
                page_size: 2,
                ..Default::default()
            })
            .await;
        assert_eq!(page.total, 3);
        assert_eq!(page.obligations.len(), 2);

        let page = store
            .list(&ListFilter {
                status: Some(Status::Pending),
                page: 2,
                page_size: 2,
                ..Default::default()
            })
            .await;
        assert_eq!(page.obligations.len(), 1);
    }
}
