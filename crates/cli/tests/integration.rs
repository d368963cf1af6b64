//! Integration tests for Accrue
//!
//! These tests drive the command layer end to end: ledger, vault,
//! journal and replay from disk.

use accrue_cli::{commands, AppConfig, AppContext, CommitError};
use accrue_core::{Address, Amount, ManualClock, Rate, Timestamp};
use accrue_events::{verify_chain, Event, EventReader};
use chrono::{Duration, Utc};
use rust_decimal_macros::dec;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

const T0: u64 = 1_700_000_000;
const DAY: u64 = 86_400;

fn addr(s: &str) -> Address {
    Address::new(s).unwrap()
}

fn rate() -> Rate {
    Rate::from_decimal(dec!(0.00000005)).unwrap()
}

fn open(path: &Path, clock: &Arc<ManualClock>) -> AppContext {
    AppContext::new(path, AppConfig::default(), clock.clone()).unwrap()
}

fn owner() -> Address {
    AppConfig::default().owner
}

/// Init → Deposit → Fund → wait → Redeem, then replay from disk
#[test]
fn test_full_workflow() {
    let temp_dir = TempDir::new().unwrap();
    let clock = Arc::new(ManualClock::new(Timestamp::from_secs(T0)));
    let alice = addr("alice");

    let mut ctx = open(temp_dir.path(), &clock);
    assert!(!ctx.is_initialized());

    commands::init(&mut ctx, Some(rate()), "init-1").unwrap();
    assert!(ctx.is_initialized());
    assert_eq!(ctx.last_sequence(), 1);
    assert_eq!(ctx.ledger.interest_rate(), rate());

    commands::deposit(&mut ctx, &alice, Amount::new(100_000), "dep-1").unwrap();
    // minted + deposit
    assert_eq!(ctx.last_sequence(), 3);

    commands::fund(&mut ctx, &addr("treasury"), Amount::new(1_000), "fund-1").unwrap();
    clock.advance(DAY);

    commands::redeem(&mut ctx, &alice, Amount::new(50_000), "red-1").unwrap();
    let alice_after = ctx.ledger.account(&alice);
    let pool_after = ctx.vault.pool_balance();
    assert_eq!(alice_after.principal, Amount::new(50_432));
    assert_eq!(pool_after, Amount::new(51_000));
    assert_eq!(ctx.rail.received(&alice), Amount::new(50_000));

    // Reopen: state is rebuilt from the journal alone
    drop(ctx);
    let ctx = open(temp_dir.path(), &clock);
    assert_eq!(ctx.ledger.account(&alice), alice_after);
    assert_eq!(ctx.ledger.interest_rate(), rate());
    assert_eq!(ctx.vault.pool_balance(), pool_after);
    assert!(commands::audit(&ctx).is_ok());
}

#[test]
fn test_commands_require_init() {
    let temp_dir = TempDir::new().unwrap();
    let clock = Arc::new(ManualClock::new(Timestamp::from_secs(T0)));
    let mut ctx = open(temp_dir.path(), &clock);

    let err = commands::deposit(&mut ctx, &addr("alice"), Amount::new(1), "dep-1").unwrap_err();
    assert!(matches!(
        err.downcast_ref::<CommitError>(),
        Some(CommitError::NotInitialized)
    ));
    assert_eq!(ctx.last_sequence(), 0);
}

#[test]
fn test_double_init_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let clock = Arc::new(ManualClock::new(Timestamp::from_secs(T0)));
    let mut ctx = open(temp_dir.path(), &clock);

    commands::init(&mut ctx, None, "init-1").unwrap();
    assert!(commands::init(&mut ctx, None, "init-2").is_err());
    assert_eq!(ctx.last_sequence(), 1);
}

#[test]
fn test_failed_command_journals_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let clock = Arc::new(ManualClock::new(Timestamp::from_secs(T0)));
    let mut ctx = open(temp_dir.path(), &clock);
    let alice = addr("alice");

    commands::init(&mut ctx, Some(rate()), "init-1").unwrap();
    commands::deposit(&mut ctx, &alice, Amount::new(10), "dep-1").unwrap();
    let before = ctx.last_sequence();

    // Not the owner
    assert!(commands::set_rate(&mut ctx, &alice, Rate::from_scaled(u128::MAX), "r-1").is_err());
    // Lower than current
    assert!(commands::set_rate(&mut ctx, &owner(), Rate::ZERO, "r-2").is_err());
    // More than held
    assert!(commands::transfer(&mut ctx, &alice, &addr("bob"), Amount::new(11), "t-1").is_err());

    assert_eq!(ctx.last_sequence(), before);
    assert_eq!(EventReader::from_directory(ctx.journal_path()).unwrap().count().unwrap() as u64, before);
}

#[test]
fn test_unwritable_journal_leaves_state_untouched() {
    let temp_dir = TempDir::new().unwrap();
    let clock = Arc::new(ManualClock::new(Timestamp::from_secs(T0)));
    let alice = addr("alice");

    let mut ctx = open(temp_dir.path(), &clock);
    commands::init(&mut ctx, Some(rate()), "init-1").unwrap();
    commands::deposit(&mut ctx, &alice, Amount::new(100), "dep-1").unwrap();
    let account_before = ctx.ledger.account(&alice);
    let sequence_before = ctx.last_sequence();

    // Park the written day file and put directories where today's and
    // tomorrow's files would go
    let journal = ctx.journal_path().to_path_buf();
    let written = EventReader::from_directory(&journal).unwrap().files()[0].clone();
    let parked = written.with_extension("parked");
    std::fs::rename(&written, &parked).unwrap();
    let today = Utc::now().date_naive();
    for day in [today, today + Duration::days(1)] {
        let path = journal.join(format!("{}.jsonl", day.format("%Y-%m-%d")));
        if !path.exists() {
            std::fs::create_dir(&path).unwrap();
        }
    }

    let err = commands::deposit(&mut ctx, &alice, Amount::new(500), "dep-2").unwrap_err();
    assert!(matches!(
        err.downcast_ref::<CommitError>(),
        Some(CommitError::Event(_))
    ));
    assert_eq!(ctx.ledger.account(&alice), account_before);
    assert_eq!(ctx.vault.pool_balance(), Amount::new(100));
    assert_eq!(ctx.last_sequence(), sequence_before);
    assert!(ctx.ledger.drain_events().is_empty());
    assert!(ctx.vault.drain_events().is_empty());

    // Once the journal is writable again the next command chains on cleanly
    for day in [today, today + Duration::days(1)] {
        let path = journal.join(format!("{}.jsonl", day.format("%Y-%m-%d")));
        if path.is_dir() {
            std::fs::remove_dir(&path).unwrap();
        }
    }
    std::fs::rename(&parked, &written).unwrap();
    commands::deposit(&mut ctx, &alice, Amount::new(500), "dep-3").unwrap();
    assert_eq!(ctx.ledger.principal_balance_of(&alice), Amount::new(600));
    assert!(commands::audit(&ctx).is_ok());

    drop(ctx);
    let ctx = open(temp_dir.path(), &clock);
    assert_eq!(ctx.vault.pool_balance(), Amount::new(600));
    assert_eq!(ctx.last_sequence(), sequence_before + 2);
}

#[test]
fn test_rejected_payee_keeps_balance() {
    let temp_dir = TempDir::new().unwrap();
    let clock = Arc::new(ManualClock::new(Timestamp::from_secs(T0)));
    let config = AppConfig {
        rejecting_payees: vec![addr("mallory")],
        ..AppConfig::default()
    };
    let mut ctx = AppContext::new(temp_dir.path(), config, clock.clone()).unwrap();
    let mallory = addr("mallory");

    commands::init(&mut ctx, Some(rate()), "init-1").unwrap();
    commands::deposit(&mut ctx, &mallory, Amount::new(500), "dep-1").unwrap();

    let err = commands::redeem(&mut ctx, &mallory, Amount::ENTIRE_BALANCE, "red-1").unwrap_err();
    assert!(err.to_string().contains("rejected"));
    assert_eq!(ctx.ledger.principal_balance_of(&mallory), Amount::new(500));
    assert_eq!(ctx.vault.pool_balance(), Amount::new(500));
}

#[test]
fn test_transfer_is_journaled_and_replayed() {
    let temp_dir = TempDir::new().unwrap();
    let clock = Arc::new(ManualClock::new(Timestamp::from_secs(T0)));
    let (alice, bob) = (addr("alice"), addr("bob"));

    let mut ctx = open(temp_dir.path(), &clock);
    commands::init(&mut ctx, Some(rate()), "init-1").unwrap();
    commands::deposit(&mut ctx, &alice, Amount::new(100_000), "dep-1").unwrap();
    clock.advance(DAY);
    commands::transfer(&mut ctx, &alice, &bob, Amount::ENTIRE_BALANCE, "t-1").unwrap();

    let bob_state = ctx.ledger.account(&bob);
    assert_eq!(bob_state.principal, Amount::new(100_432));
    assert_eq!(bob_state.interest_rate, rate());
    drop(ctx);

    let records = EventReader::from_directory(temp_dir.path().join("journal"))
        .unwrap()
        .read_all()
        .unwrap();
    assert!(verify_chain(&records).is_ok());
    let kinds: Vec<_> = records.iter().map(|r| r.event.kind()).collect();
    assert_eq!(
        kinds,
        vec!["rate_changed", "minted", "deposit", "interest_realized", "transferred"]
    );
    assert!(matches!(records[2].event, Event::Vault(_)));
    assert!(records[3..].iter().all(|r| r.correlation_id == "t-1"));

    // Replay at a much later clock still lands on the journaled state
    clock.advance(365 * DAY);
    let ctx = open(temp_dir.path(), &clock);
    assert_eq!(ctx.ledger.account(&bob), bob_state);
    assert_eq!(ctx.ledger.principal_balance_of(&alice), Amount::ZERO);
}

#[test]
fn test_tampered_journal_fails_audit() {
    let temp_dir = TempDir::new().unwrap();
    let clock = Arc::new(ManualClock::new(Timestamp::from_secs(T0)));

    let mut ctx = open(temp_dir.path(), &clock);
    commands::init(&mut ctx, Some(rate()), "init-1").unwrap();
    commands::deposit(&mut ctx, &addr("alice"), Amount::new(100), "dep-1").unwrap();

    let reader = EventReader::from_directory(ctx.journal_path()).unwrap();
    let path = reader.files()[0].clone();
    let content = std::fs::read_to_string(&path).unwrap();
    std::fs::write(&path, content.replace("\"100\"", "\"100000\"")).unwrap();

    assert!(commands::audit(&ctx).is_err());
}

#[test]
fn test_extra_minter_from_config() {
    let temp_dir = TempDir::new().unwrap();
    let clock = Arc::new(ManualClock::new(Timestamp::from_secs(T0)));
    let config = AppConfig {
        minters: vec![addr("desk")],
        ..AppConfig::default()
    };
    let ctx = AppContext::new(temp_dir.path(), config, clock).unwrap();

    let holders = ctx.roles.holders();
    assert!(holders.contains(&addr("desk")));
    assert!(holders.contains(&ctx.config.vault_address));
}
