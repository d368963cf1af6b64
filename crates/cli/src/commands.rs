//! CLI commands
//!
//! Each state-changing command is one ledger or vault call run through
//! `AppContext::execute`, which journals whatever it emitted as one batch.

use accrue_core::{Address, Amount, Rate, Timestamp};
use accrue_events::{verify_chain, EventReader, JournalRecord};
use chrono::DateTime;

use crate::context::AppContext;

/// Journal the first global rate
pub fn init(ctx: &mut AppContext, rate: Option<Rate>, correlation_id: &str) -> Result<(), anyhow::Error> {
    if ctx.is_initialized() {
        anyhow::bail!("System already initialized (sequence = {})", ctx.last_sequence());
    }

    let rate = rate.unwrap_or(ctx.config.initial_rate);
    let owner = ctx.config.owner.clone();
    ctx.execute(correlation_id, |ledger, _| Ok(ledger.set_rate(&owner, rate)?))?;

    println!("✅ Initialized with global rate {} ({})", rate, describe(rate));
    Ok(())
}

/// Raise the global rate
pub fn set_rate(
    ctx: &mut AppContext,
    caller: &Address,
    rate: Rate,
    correlation_id: &str,
) -> Result<(), anyhow::Error> {
    ctx.ensure_initialized()?;
    let ((), records) = ctx.execute(correlation_id, |ledger, _| Ok(ledger.set_rate(caller, rate)?))?;

    println!("✅ Global rate set to {} ({})", rate, describe(rate));
    print_sequences(&records);
    Ok(())
}

/// Deposit backing asset through the vault
pub fn deposit(
    ctx: &mut AppContext,
    caller: &Address,
    amount: Amount,
    correlation_id: &str,
) -> Result<(), anyhow::Error> {
    ctx.ensure_initialized()?;
    let ((), records) = ctx.execute(correlation_id, |ledger, vault| {
        Ok(vault.deposit(ledger, caller, amount)?)
    })?;

    println!(
        "✅ Deposited {} for {} at rate {}",
        amount,
        caller,
        ctx.ledger.user_interest_rate(caller)
    );
    print_sequences(&records);
    Ok(())
}

/// Redeem ledger balance for backing asset
pub fn redeem(
    ctx: &mut AppContext,
    caller: &Address,
    amount: Amount,
    correlation_id: &str,
) -> Result<(), anyhow::Error> {
    ctx.ensure_initialized()?;
    let (paid, records) = ctx.execute(correlation_id, |ledger, vault| {
        Ok(vault.redeem(ledger, caller, amount)?)
    })?;

    println!("✅ Redeemed {} to {}", paid, caller);
    print_sequences(&records);
    Ok(())
}

/// Move ledger balance between accounts
pub fn transfer(
    ctx: &mut AppContext,
    from: &Address,
    to: &Address,
    amount: Amount,
    correlation_id: &str,
) -> Result<(), anyhow::Error> {
    ctx.ensure_initialized()?;
    let (_, records) = ctx.execute(correlation_id, |ledger, _| Ok(ledger.transfer(from, to, amount)?))?;

    println!("✅ Transferred {} from {} to {}", amount_label(amount), from, to);
    print_sequences(&records);
    Ok(())
}

/// Send unattributed backing asset into the pool
pub fn fund(
    ctx: &mut AppContext,
    from: &Address,
    amount: Amount,
    correlation_id: &str,
) -> Result<(), anyhow::Error> {
    ctx.ensure_initialized()?;
    let ((), records) = ctx.execute(correlation_id, |_, vault| Ok(vault.fund_rewards(from, amount)?))?;

    println!("✅ Pool funded with {} from {} (pool: {})", amount, from, ctx.vault.pool_balance());
    print_sequences(&records);
    Ok(())
}

/// Effective and stored balance of one account
pub fn balance(ctx: &AppContext, user: &Address) -> Result<(), anyhow::Error> {
    let effective = ctx.ledger.balance_of(user)?;
    let principal = ctx.ledger.principal_balance_of(user);

    println!("Balance for {}: {}", user, effective);
    println!("  principal: {}", principal);
    Ok(())
}

/// Full account triple
pub fn account(ctx: &AppContext, user: &Address) -> Result<(), anyhow::Error> {
    let state = ctx.ledger.account(user);
    let effective = ctx.ledger.balance_of(user)?;
    let pending = ctx.ledger.pending_interest_of(user)?;

    println!("Account {}", user);
    println!("  principal:     {}", state.principal);
    println!("  pending:       {}", pending);
    println!("  effective:     {}", effective);
    println!("  interest rate: {} ({})", state.interest_rate, describe(state.interest_rate));
    println!("  last update:   {}", format_timestamp(state.last_update));
    Ok(())
}

/// Global rate, pool and supply summary
pub fn rate(ctx: &AppContext) -> Result<(), anyhow::Error> {
    let rate = ctx.ledger.interest_rate();

    println!("Global rate: {} ({})", rate, describe(rate));
    println!("Total principal: {}", ctx.ledger.total_principal());
    println!("Pool balance:    {}", ctx.vault.pool_balance());
    println!("Vault {} bound to ledger {}", ctx.vault.address(), ctx.vault.ledger_address());
    Ok(())
}

/// Verify the journal hash chain
pub fn audit(ctx: &AppContext) -> Result<(), anyhow::Error> {
    let reader = EventReader::from_directory(ctx.journal_path())?;
    let records = reader.read_all()?;

    match verify_chain(&records) {
        Ok(()) => {
            println!("✅ Hash chain verified ({} records)", records.len());
            Ok(())
        }
        Err(e) => {
            println!("❌ Hash chain broken: {}", e);
            Err(e.into())
        }
    }
}

fn describe(rate: Rate) -> String {
    match (rate.to_decimal(), rate.per_year()) {
        (Some(per_sec), Some(per_year)) => format!("{}/s, {} simple per year", per_sec, per_year),
        _ => "out of display range".to_string(),
    }
}

fn amount_label(amount: Amount) -> String {
    if amount.is_entire_balance() {
        "entire balance".to_string()
    } else {
        amount.to_string()
    }
}

fn format_timestamp(at: Timestamp) -> String {
    i64::try_from(at.as_secs())
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_else(|| at.to_string())
}

fn print_sequences(records: &[JournalRecord]) {
    if let (Some(first), Some(last)) = (records.first(), records.last()) {
        println!("   journal seq {}..={}", first.sequence, last.sequence);
    }
}
