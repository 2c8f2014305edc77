// crates/accrue-ledger/src/handle.rs
//
// SharedLedger: a cloneable async handle for concurrent callers.
//
// Operations are serialized by a tokio `RwLock`; queries share the read
// side. With a store attached, every successful mutation is persisted
// while the write lock is still held, so the stored snapshot always
// matches a committed state.

use std::sync::Arc;

use tokio::sync::RwLock;

use accrue_core::{AccountId, AccrueError, U256};

use crate::events::LedgerEvent;
use crate::ledger::RebasingLedger;
use crate::rebase::RebasePlan;
use crate::store::StateStore;

#[derive(Clone)]
pub struct SharedLedger {
    inner: Arc<RwLock<RebasingLedger>>,
    store: Option<Arc<dyn StateStore>>,
}

impl SharedLedger {
    pub fn new(ledger: RebasingLedger) -> Self {
        Self {
            inner: Arc::new(RwLock::new(ledger)),
            store: None,
        }
    }

    /// Persist to `store` after every successful mutation.
    pub fn with_store(mut self, store: Arc<dyn StateStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Run a query under the read lock.
    pub async fn read<R>(&self, f: impl FnOnce(&RebasingLedger) -> R) -> R {
        let guard = self.inner.read().await;
        f(&guard)
    }

    /// Run a mutation under the write lock and persist on success.
    ///
    /// With a store attached the mutation runs on a copy that replaces the
    /// live ledger only once it has been saved, so a storage error leaves
    /// both memory and disk at the previous state.
    pub async fn write<R>(
        &self,
        f: impl FnOnce(&mut RebasingLedger) -> Result<R, AccrueError>,
    ) -> Result<R, AccrueError> {
        let mut guard = self.inner.write().await;
        let Some(store) = &self.store else {
            return f(&mut guard);
        };

        let mut staged = guard.clone();
        let result = f(&mut staged)?;
        if let Err(e) = store.save(&staged.snapshot()) {
            tracing::error!("Failed to persist ledger snapshot, mutation discarded: {}", e);
            return Err(e);
        }
        *guard = staged;
        Ok(result)
    }

    pub async fn balance_of(&self, account: AccountId) -> Result<U256, AccrueError> {
        self.read(|ledger| ledger.balance_of(&account)).await
    }

    pub async fn total_supply(&self) -> Result<U256, AccrueError> {
        self.read(|ledger| ledger.total_supply()).await
    }

    pub async fn rebase_index(&self) -> U256 {
        self.read(|ledger| ledger.rebase_index()).await
    }

    pub async fn mint(
        &self,
        caller: AccountId,
        to: AccountId,
        amount: U256,
    ) -> Result<(), AccrueError> {
        self.write(|ledger| ledger.mint(&caller, &to, amount)).await
    }

    pub async fn burn(
        &self,
        caller: AccountId,
        from: AccountId,
        amount: U256,
    ) -> Result<(), AccrueError> {
        self.write(|ledger| ledger.burn(&caller, &from, amount)).await
    }

    pub async fn transfer(
        &self,
        from: AccountId,
        to: AccountId,
        amount: U256,
    ) -> Result<(), AccrueError> {
        self.write(|ledger| ledger.transfer(&from, &to, amount)).await
    }

    pub async fn disable_rebase(
        &self,
        caller: AccountId,
        account: AccountId,
        disabled: bool,
    ) -> Result<(), AccrueError> {
        self.write(|ledger| ledger.disable_rebase(&caller, &account, disabled))
            .await
    }

    pub async fn set_rebase_index(
        &self,
        caller: AccountId,
        new_index: U256,
        min_index_delta: U256,
    ) -> Result<RebasePlan, AccrueError> {
        self.write(|ledger| ledger.set_rebase_index(&caller, new_index, min_index_delta))
            .await
    }

    pub async fn drain_events(&self) -> Vec<LedgerEvent> {
        self.inner.write().await.drain_events()
    }

    /// Save the current state to the attached store, if any.
    pub async fn persist(&self) -> Result<(), AccrueError> {
        match &self.store {
            Some(store) => store.save(&self.inner.read().await.snapshot()),
            None => Ok(()),
        }
    }
}
