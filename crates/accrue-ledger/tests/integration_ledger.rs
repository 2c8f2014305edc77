// crates/accrue-ledger/tests/integration_ledger.rs
//
// End-to-end ledger scenarios through the public API: fee-on-rebase,
// opt-out isolation, supply ceiling, chain roles, persistence, and the
// async shared handle.

use std::sync::Arc;

use uuid::Uuid;

use accrue_core::fixed::parse_units;
use accrue_core::{AccountId, AccrueError, U256};
use accrue_ledger::{
    tokens, Holding, JsonFileStore, LedgerConfig, LedgerEvent, LedgerSnapshot, MemoryStore,
    RebasingLedger, SharedLedger, StateStore, StaticRoles, INITIAL_INDEX, SCHEMA_VERSION,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Create a temporary file path using UUID to avoid conflicts.
fn temp_state_path(label: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!("accrue_test_{}_{}.json", label, Uuid::now_v7()))
}

fn dec(s: &str) -> U256 {
    parse_units(s).unwrap()
}

fn minter() -> AccountId {
    AccountId::repeat_byte(0xaa)
}

fn manager() -> AccountId {
    AccountId::repeat_byte(0xbb)
}

fn collector() -> AccountId {
    AccountId::repeat_byte(0xfe)
}

fn roles() -> Arc<StaticRoles> {
    Arc::new(
        StaticRoles::new()
            .with_minter(minter())
            .with_rebase_manager(manager()),
    )
}

fn ledger_with(config: LedgerConfig) -> RebasingLedger {
    RebasingLedger::new(config, roles()).unwrap()
}

// ---------------------------------------------------------------------------
// Rebase with fee
// ---------------------------------------------------------------------------

#[test]
fn test_rebase_with_fee_scenario() {
    let mut ledger = ledger_with(LedgerConfig::new(collector()).with_fee_rate(dec("0.1")));
    let holder = AccountId::repeat_byte(1);
    ledger.mint(&minter(), &holder, tokens(1_000)).unwrap();

    ledger.set_rebase_index(&manager(), dec("1.2"), U256::zero()).unwrap();

    let holder_balance = ledger.balance_of(&holder).unwrap();
    let fee_balance = ledger.balance_of(&collector()).unwrap();
    let supply = ledger.total_supply().unwrap();

    assert!(holder_balance > tokens(1_000));
    assert!(fee_balance > U256::zero());
    // 1000 * 1.2 within 1000 wei, never above.
    assert!(supply <= tokens(1_200));
    assert!(tokens(1_200) - supply <= U256::from(1_000));
    assert!(ledger.audit().unwrap().is_consistent());
}

#[test]
fn test_repeated_rebases_keep_aggregates_consistent() {
    let mut ledger = ledger_with(LedgerConfig::new(collector()).with_fee_rate(dec("0.2")));
    for (i, amount) in [3u64, 17, 250, 1].iter().enumerate() {
        ledger
            .mint(&minter(), &AccountId::repeat_byte(i as u8 + 1), tokens(*amount))
            .unwrap();
    }

    let mut index = INITIAL_INDEX;
    for step in ["1.013", "1.0271", "1.1", "1.100000000000000001", "1.5"] {
        let plan = ledger.set_rebase_index(&manager(), dec(step), U256::zero()).unwrap();
        assert!(plan.committed_index > index);
        index = plan.committed_index;
        assert!(ledger.audit().unwrap().is_consistent());
    }
}

// ---------------------------------------------------------------------------
// Opt-out
// ---------------------------------------------------------------------------

#[test]
fn test_opted_out_balance_is_isolated_from_rebase() {
    let mut ledger = ledger_with(LedgerConfig::new(collector()).with_fee_rate(dec("0.05")));
    let frozen = AccountId::repeat_byte(1);
    let rebasing = AccountId::repeat_byte(2);
    ledger.mint(&minter(), &frozen, tokens(100)).unwrap();
    ledger.mint(&minter(), &rebasing, tokens(100)).unwrap();
    ledger.disable_rebase(&frozen, &frozen, true).unwrap();

    ledger.set_rebase_index(&manager(), dec("1.5"), U256::zero()).unwrap();

    assert_eq!(ledger.balance_of(&frozen).unwrap(), tokens(100));
    assert!(ledger.balance_of(&rebasing).unwrap() > tokens(140));
    assert_eq!(ledger.total_frozen_balance(), tokens(100));
    // Fee only on the rebasing half: 100 * 0.5 * 5%.
    assert!(ledger.balance_of(&collector()).unwrap() <= dec("2.5"));
}

#[test]
fn test_toggle_is_idempotent() {
    let mut ledger = ledger_with(LedgerConfig::new(collector()));
    let account = AccountId::repeat_byte(1);
    ledger.mint(&minter(), &account, tokens(5)).unwrap();

    ledger.disable_rebase(&account, &account, true).unwrap();
    let after_first = ledger.holding(&account);
    ledger.disable_rebase(&account, &account, true).unwrap();
    assert_eq!(ledger.holding(&account), after_first);
    assert_eq!(after_first, Holding::Frozen { balance: tokens(5) });
}

#[test]
fn test_repeated_toggling_never_extracts_value() {
    let mut ledger = ledger_with(LedgerConfig::new(collector()));
    let account = AccountId::repeat_byte(1);
    ledger.mint(&minter(), &account, U256::from(123_456_789u64)).unwrap();
    ledger
        .set_rebase_index(&manager(), dec("1.777777777777777777"), U256::zero())
        .unwrap();
    let start = ledger.balance_of(&account).unwrap();

    for _ in 0..20 {
        ledger.disable_rebase(&account, &account, true).unwrap();
        ledger.disable_rebase(&account, &account, false).unwrap();
    }
    assert!(ledger.balance_of(&account).unwrap() <= start);
}

// ---------------------------------------------------------------------------
// Access control and limits
// ---------------------------------------------------------------------------

#[test]
fn test_unauthorized_and_zero_address_mint() {
    let mut ledger = ledger_with(LedgerConfig::new(collector()));
    let outsider = AccountId::repeat_byte(9);

    assert!(matches!(
        ledger.mint(&outsider, &outsider, tokens(1)),
        Err(AccrueError::Unauthorized(_))
    ));
    assert!(matches!(
        ledger.mint(&minter(), &AccountId::ZERO, tokens(1)),
        Err(AccrueError::ZeroAddress(_))
    ));
    assert_eq!(ledger.total_supply().unwrap(), U256::zero());
    assert_eq!(ledger.accounts().count(), 0);
}

#[test]
fn test_supply_ceiling_failure_changes_nothing() {
    let mut ledger = ledger_with(LedgerConfig::new(collector()).with_supply_limit(tokens(10)));
    let account = AccountId::repeat_byte(1);
    ledger.mint(&minter(), &account, tokens(10)).unwrap();
    let before = ledger.snapshot();
    ledger.drain_events();

    let err = ledger.mint(&minter(), &account, U256::one()).unwrap_err();
    assert_eq!(
        err,
        AccrueError::SupplyLimitExceeded {
            resulting: tokens(10) + U256::one(),
            limit: tokens(10),
        }
    );
    assert_eq!(ledger.snapshot(), before);
    assert!(ledger.drain_events().is_empty());
}

#[test]
fn test_index_only_moves_up_by_default() {
    let mut ledger = ledger_with(LedgerConfig::new(collector()));
    ledger.set_rebase_index(&manager(), dec("1.1"), U256::zero()).unwrap();
    assert!(matches!(
        ledger.set_rebase_index(&manager(), dec("1.05"), U256::zero()),
        Err(AccrueError::IndexDecrease { .. })
    ));
    assert_eq!(ledger.rebase_index(), dec("1.1"));
}

#[test]
fn test_index_decrease_when_allowed() {
    let mut ledger = ledger_with(LedgerConfig::new(collector()).with_index_decrease(true));
    let account = AccountId::repeat_byte(1);
    ledger.mint(&minter(), &account, tokens(10)).unwrap();
    ledger.set_rebase_index(&manager(), dec("0.9"), U256::zero()).unwrap();
    assert_eq!(ledger.balance_of(&account).unwrap(), tokens(9));
    assert_eq!(ledger.total_supply().unwrap(), tokens(9));
}

#[test]
fn test_min_delta_rejects_small_rebase() {
    let mut ledger = ledger_with(LedgerConfig::new(collector()));
    let err = ledger
        .set_rebase_index(&manager(), dec("1.00001"), dec("0.0001"))
        .unwrap_err();
    assert!(matches!(err, AccrueError::RebaseTooSmall(_)));
    assert_eq!(ledger.rebase_index(), INITIAL_INDEX);
}

#[test]
fn test_side_chain_mirrors_index_without_fee() {
    let mut ledger = ledger_with(
        LedgerConfig::new(collector())
            .with_fee_rate(dec("0.1"))
            .with_chains(137, 1),
    );
    let account = AccountId::repeat_byte(1);
    ledger.mint(&minter(), &account, tokens(100)).unwrap();
    assert!(!ledger.is_main_chain());

    let plan = ledger.set_rebase_index(&manager(), dec("1.25"), U256::zero()).unwrap();
    assert!(plan.fee_amount.is_zero());
    assert_eq!(ledger.rebase_index(), dec("1.25"));
    assert_eq!(ledger.balance_of(&account).unwrap(), tokens(125));
    assert_eq!(ledger.balance_of(&collector()).unwrap(), U256::zero());
}

#[test]
fn test_rebase_events() {
    let mut ledger = ledger_with(LedgerConfig::new(collector()).with_fee_rate(dec("0.1")));
    ledger.mint(&minter(), &AccountId::repeat_byte(1), tokens(1_000)).unwrap();
    ledger.drain_events();

    ledger.set_rebase_index(&manager(), dec("1.2"), U256::zero()).unwrap();
    let events = ledger.drain_events();
    assert_eq!(
        events[0],
        LedgerEvent::RebaseIndexUpdated {
            previous: INITIAL_INDEX,
            requested: dec("1.2"),
            committed: dec("1.18"),
        }
    );
    assert_eq!(
        events[1],
        LedgerEvent::RebaseFeeMinted {
            collector: collector(),
            amount: tokens(20),
        }
    );
}

// ---------------------------------------------------------------------------
// Persistence
// ---------------------------------------------------------------------------

#[test]
fn test_json_file_store_round_trip() {
    let path = temp_state_path("roundtrip");
    let store = JsonFileStore::new(&path);
    assert!(store.load().unwrap().is_none());

    let mut ledger = ledger_with(LedgerConfig::new(collector()).with_fee_rate(dec("0.1")));
    let holder = AccountId::repeat_byte(1);
    ledger.mint(&minter(), &holder, tokens(40)).unwrap();
    ledger.set_rebase_index(&manager(), dec("1.1"), U256::zero()).unwrap();
    ledger.disable_rebase(&holder, &holder, true).unwrap();
    store.save(&ledger.snapshot()).unwrap();

    let loaded = store.load().unwrap().unwrap();
    assert_eq!(loaded.schema_version, SCHEMA_VERSION);
    let restored = RebasingLedger::from_snapshot(loaded, roles()).unwrap();
    assert_eq!(restored.rebase_index(), ledger.rebase_index());
    assert_eq!(restored.balance_of(&holder).unwrap(), ledger.balance_of(&holder).unwrap());
    assert_eq!(restored.total_supply().unwrap(), ledger.total_supply().unwrap());

    let _ = std::fs::remove_file(&path);
}

#[test]
fn test_json_file_store_migrates_v1_file() {
    let path = temp_state_path("v1");
    let holder = AccountId::repeat_byte(1);
    let v1 = serde_json::json!({
        "schema_version": 1,
        "config": { "fee_collector": collector().to_string() },
        "rebase_index": dec("1.5"),
        "accounts": { (holder.to_string()): { "shares": tokens(2), "opted_out": false } },
    });
    std::fs::write(&path, serde_json::to_vec(&v1).unwrap()).unwrap();

    let snapshot = JsonFileStore::new(&path).load().unwrap().unwrap();
    let ledger = RebasingLedger::from_snapshot(snapshot, roles()).unwrap();
    assert_eq!(ledger.balance_of(&holder).unwrap(), tokens(3));

    let _ = std::fs::remove_file(&path);
}

#[test]
fn test_corrupt_file_is_serialization_error() {
    let path = temp_state_path("corrupt");
    std::fs::write(&path, b"{ not json").unwrap();
    let result = JsonFileStore::new(&path).load();
    assert!(matches!(result, Err(AccrueError::Serialization(_))));
    let _ = std::fs::remove_file(&path);
}

// ---------------------------------------------------------------------------
// Shared handle
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_shared_ledger_concurrent_transfers() {
    let ledger = SharedLedger::new(ledger_with(LedgerConfig::new(collector())));
    let source = AccountId::repeat_byte(1);
    ledger.mint(minter(), source, tokens(100)).await.unwrap();

    let mut handles = Vec::new();
    for i in 0..10u8 {
        let ledger = ledger.clone();
        handles.push(tokio::spawn(async move {
            ledger
                .transfer(source, AccountId::repeat_byte(10 + i), tokens(5))
                .await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert_eq!(ledger.balance_of(source).await.unwrap(), tokens(50));
    assert_eq!(ledger.total_supply().await.unwrap(), tokens(100));
    let transfers = ledger
        .drain_events()
        .await
        .into_iter()
        .filter(|e| matches!(e, LedgerEvent::Transfer { .. }))
        .count();
    assert_eq!(transfers, 11);
}

#[tokio::test]
async fn test_shared_ledger_persists_successful_mutations() {
    let store = Arc::new(MemoryStore::new());
    let ledger = SharedLedger::new(ledger_with(LedgerConfig::new(collector())))
        .with_store(store.clone());
    let holder = AccountId::repeat_byte(1);

    ledger.mint(minter(), holder, tokens(7)).await.unwrap();
    let saved = store.load().unwrap().unwrap();
    assert_eq!(saved.accounts[&holder], Holding::Rebasing { shares: tokens(7) });

    // A failed mutation leaves the stored snapshot alone.
    assert!(ledger.burn(minter(), holder, tokens(8)).await.is_err());
    assert_eq!(store.load().unwrap().unwrap(), saved);

    ledger
        .set_rebase_index(manager(), dec("1.1"), U256::zero())
        .await
        .unwrap();
    assert_eq!(store.load().unwrap().unwrap().rebase_index, dec("1.1"));
    assert_eq!(ledger.rebase_index().await, dec("1.1"));

    ledger.persist().await.unwrap();
    assert_eq!(store.load().unwrap().unwrap().rebase_index, dec("1.1"));
}

/// Store whose saves always fail.
struct FullDiskStore;

impl StateStore for FullDiskStore {
    fn load(&self) -> Result<Option<LedgerSnapshot>, AccrueError> {
        Ok(None)
    }

    fn save(&self, _snapshot: &LedgerSnapshot) -> Result<(), AccrueError> {
        Err(AccrueError::Storage("disk full".to_string()))
    }
}

#[tokio::test]
async fn test_shared_ledger_discards_mutation_when_save_fails() {
    let ledger = SharedLedger::new(ledger_with(LedgerConfig::new(collector())))
        .with_store(Arc::new(FullDiskStore));
    let holder = AccountId::repeat_byte(1);

    for _ in 0..2 {
        let result = ledger.mint(minter(), holder, tokens(5)).await;
        assert_eq!(result, Err(AccrueError::Storage("disk full".to_string())));
        assert_eq!(ledger.balance_of(holder).await.unwrap(), U256::zero());
        assert_eq!(ledger.total_supply().await.unwrap(), U256::zero());
    }

    let result = ledger
        .set_rebase_index(manager(), dec("1.1"), U256::zero())
        .await;
    assert!(matches!(result, Err(AccrueError::Storage(_))));
    assert_eq!(ledger.rebase_index().await, INITIAL_INDEX);
    assert!(ledger.drain_events().await.is_empty());
}
