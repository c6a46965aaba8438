//! Reference scenario: two accounts, two transfers, then a report

use anyhow::Context;
use bank_ledger::{
    audit, spawn_ledger_actor, Account, AccountId, Config, Ledger, LedgerMetrics,
};
use rust_decimal::Decimal;
use tracing_subscriber::EnvFilter;

fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.filter));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if config.logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = match std::env::args().nth(1) {
        Some(path) => Config::from_file(&path)
            .with_context(|| format!("loading config from {path}"))?,
        None => Config::from_env().context("loading config from environment")?,
    };

    init_tracing(&config);
    tracing::info!(
        service = %config.service_name,
        version = %config.service_version,
        "Starting bank ledger demo"
    );

    let metrics = LedgerMetrics::new()?;
    let ledger = Ledger::from_config(&config)?.with_metrics(metrics.clone());
    let handle = spawn_ledger_actor(ledger, config.actor.mailbox_capacity);

    let john = AccountId::new("123");
    let jane = AccountId::new("456");
    handle
        .add_account(Account::new(john.clone(), "John Doe", Decimal::new(100000, 2))?)
        .await?;
    handle
        .add_account(Account::new(jane.clone(), "Jane Smith", Decimal::new(500000, 2))?)
        .await?;

    for account in handle.list_accounts().await? {
        tracing::info!(
            bank = %config.bank_name,
            account = %account.id,
            owner = %account.owner_name,
            balance = %account.balance,
            "Account"
        );
    }

    for (source, destination, amount, reason) in [
        (&john, &jane, Decimal::from(100), "National Payment"),
        (&jane, &john, Decimal::from(50), "Pay Debt"),
    ] {
        match handle
            .transfer(source.clone(), destination.clone(), amount, reason)
            .await
        {
            Ok(record) => tracing::info!(
                transaction_id = %record.transaction_id(),
                hash = %audit::to_hex(record.hash()),
                "Transaction successful"
            ),
            // Business rejections are reported, not fatal
            Err(e) if e.is_recoverable() => tracing::warn!(error = %e, "Transaction failed"),
            Err(e) => return Err(e.into()),
        }
    }

    for record in handle.transactions_for_account(john.clone()).await? {
        tracing::info!(
            account = %john,
            amount = %record.amount(),
            reason = record.reason(),
            "John's transaction"
        );
    }

    let totals = handle.totals().await?;
    tracing::info!(
        fees_collected = %totals.fees_collected,
        amount_transferred = %totals.amount_transferred,
        transactions = totals.transaction_count,
        "Totals"
    );

    handle.verify_audit_trail().await?;
    let ledger = handle.shutdown().await?;

    let statement = ledger.statement(&jane)?;
    println!("{}", serde_json::to_string_pretty(&statement)?);
    tracing::info!(
        transfers = metrics.transfers_total.get(),
        "Shutting down bank ledger demo"
    );

    Ok(())
}
