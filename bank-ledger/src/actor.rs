//! Actor-based concurrency for the ledger
//!
//! A single Tokio task owns the [`Ledger`]; every caller goes through a
//! cloneable [`LedgerHandle`]. Messages are handled one at a time, so a
//! transfer's debit, credit, log append and aggregate update always run as
//! one unit with respect to every other operation.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │          Callers (CLI, HTTP handlers, jobs)           │
//! └─────────────────────┬────────────────────────────────┘
//!                       │
//!                       ▼
//! ┌──────────────────────────────────────────────────────┐
//! │               LedgerHandle (Clone)                    │
//! │         Sends messages to actor mailbox              │
//! └─────────────────────┬────────────────────────────────┘
//!                       │
//!                       │ mpsc::channel (bounded)
//!                       ▼
//! ┌──────────────────────────────────────────────────────┐
//! │              LedgerActor (Single Task)                │
//! │      owns Ledger, replies over oneshot channels      │
//! └───────────────────────────────────────────────────────┘
//! ```

use crate::types::{AccountSummary, Statement, TransactionRecord};
use crate::{Account, AccountId, Bank, Error, Ledger, Result};
use rust_decimal::Decimal;
use tokio::sync::{mpsc, oneshot};

/// Message sent to the ledger actor
#[derive(Debug)]
pub enum LedgerMessage {
    /// Register an account
    AddAccount {
        account: Account,
        response: oneshot::Sender<Result<()>>,
    },

    /// Execute a transfer
    Transfer {
        source: AccountId,
        destination: AccountId,
        amount: Decimal,
        reason: String,
        response: oneshot::Sender<Result<TransactionRecord>>,
    },

    /// Get account balance
    GetBalance {
        account_id: AccountId,
        response: oneshot::Sender<Result<Decimal>>,
    },

    /// Get records involving an account
    GetTransactions {
        account_id: AccountId,
        response: oneshot::Sender<Vec<TransactionRecord>>,
    },

    /// Get account statement
    GetStatement {
        account_id: AccountId,
        response: oneshot::Sender<Result<Statement>>,
    },

    /// Snapshot all accounts
    ListAccounts {
        response: oneshot::Sender<Vec<AccountSummary>>,
    },

    /// Get running aggregates
    GetTotals {
        response: oneshot::Sender<LedgerTotals>,
    },

    /// Verify the audit chain
    VerifyAuditTrail {
        response: oneshot::Sender<Result<()>>,
    },

    /// Stop the actor and hand the ledger back
    Shutdown {
        response: oneshot::Sender<Ledger>,
    },
}

/// Running aggregates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedgerTotals {
    /// Sum of fees over committed transfers
    pub fees_collected: Decimal,
    /// Sum of principal over committed transfers
    pub amount_transferred: Decimal,
    /// Number of committed transfers
    pub transaction_count: usize,
}

/// Actor that processes ledger messages
#[derive(Debug)]
pub struct LedgerActor {
    /// Owned ledger state
    ledger: Ledger,

    /// Mailbox for incoming messages
    mailbox: mpsc::Receiver<LedgerMessage>,
}

impl LedgerActor {
    /// Create new actor
    pub fn new(ledger: Ledger, mailbox: mpsc::Receiver<LedgerMessage>) -> Self {
        Self { ledger, mailbox }
    }

    /// Run the actor event loop
    pub async fn run(mut self) {
        tracing::debug!(bank = self.ledger.name(), "Ledger actor started");

        while let Some(msg) = self.mailbox.recv().await {
            if let LedgerMessage::Shutdown { response } = msg {
                tracing::debug!(bank = self.ledger.name(), "Ledger actor shutting down");
                let _ = response.send(self.ledger);
                return;
            }
            self.handle_message(msg);
        }

        tracing::debug!(bank = self.ledger.name(), "All handles dropped, ledger actor exiting");
    }

    /// Handle a single message
    fn handle_message(&mut self, msg: LedgerMessage) {
        let delivered = match msg {
            LedgerMessage::AddAccount { account, response } => {
                response.send(self.ledger.add_account(account)).is_ok()
            }

            LedgerMessage::Transfer {
                source,
                destination,
                amount,
                reason,
                response,
            } => {
                let result = self.ledger.transfer(&source, &destination, amount, &reason);
                response.send(result).is_ok()
            }

            LedgerMessage::GetBalance {
                account_id,
                response,
            } => response.send(self.ledger.balance(&account_id)).is_ok(),

            LedgerMessage::GetTransactions {
                account_id,
                response,
            } => response
                .send(self.ledger.transactions_for_account(&account_id))
                .is_ok(),

            LedgerMessage::GetStatement {
                account_id,
                response,
            } => response.send(self.ledger.statement(&account_id)).is_ok(),

            LedgerMessage::ListAccounts { response } => {
                response.send(self.ledger.list_accounts()).is_ok()
            }

            LedgerMessage::GetTotals { response } => response
                .send(LedgerTotals {
                    fees_collected: self.ledger.total_fees_collected(),
                    amount_transferred: self.ledger.total_amount_transferred(),
                    transaction_count: self.ledger.transactions().len(),
                })
                .is_ok(),

            LedgerMessage::VerifyAuditTrail { response } => {
                response.send(self.ledger.verify_audit_trail()).is_ok()
            }

            // Handled in run()
            LedgerMessage::Shutdown { .. } => true,
        };

        if !delivered {
            // The caller gave up waiting; any committed state stays committed.
            tracing::error!("Response channel closed before reply was delivered");
        }
    }
}

/// Handle for sending messages to the actor
#[derive(Debug, Clone)]
pub struct LedgerHandle {
    sender: mpsc::Sender<LedgerMessage>,
}

impl LedgerHandle {
    /// Create new handle
    pub fn new(sender: mpsc::Sender<LedgerMessage>) -> Self {
        Self { sender }
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> LedgerMessage,
    ) -> Result<T> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(build(tx))
            .await
            .map_err(|_| Error::Concurrency("Actor mailbox closed".to_string()))?;

        rx.await
            .map_err(|_| Error::Concurrency("Response channel closed".to_string()))
    }

    /// Register an account
    pub async fn add_account(&self, account: Account) -> Result<()> {
        self.request(|response| LedgerMessage::AddAccount { account, response })
            .await?
    }

    /// Execute a transfer
    pub async fn transfer(
        &self,
        source: AccountId,
        destination: AccountId,
        amount: Decimal,
        reason: impl Into<String>,
    ) -> Result<TransactionRecord> {
        let reason = reason.into();
        self.request(|response| LedgerMessage::Transfer {
            source,
            destination,
            amount,
            reason,
            response,
        })
        .await?
    }

    /// Get account balance
    pub async fn balance(&self, account_id: AccountId) -> Result<Decimal> {
        self.request(|response| LedgerMessage::GetBalance {
            account_id,
            response,
        })
        .await?
    }

    /// Get records involving an account
    pub async fn transactions_for_account(
        &self,
        account_id: AccountId,
    ) -> Result<Vec<TransactionRecord>> {
        self.request(|response| LedgerMessage::GetTransactions {
            account_id,
            response,
        })
        .await
    }

    /// Get account statement
    pub async fn statement(&self, account_id: AccountId) -> Result<Statement> {
        self.request(|response| LedgerMessage::GetStatement {
            account_id,
            response,
        })
        .await?
    }

    /// Snapshot all accounts
    pub async fn list_accounts(&self) -> Result<Vec<AccountSummary>> {
        self.request(|response| LedgerMessage::ListAccounts { response })
            .await
    }

    /// Get running aggregates
    pub async fn totals(&self) -> Result<LedgerTotals> {
        self.request(|response| LedgerMessage::GetTotals { response })
            .await
    }

    /// Verify the audit chain
    pub async fn verify_audit_trail(&self) -> Result<()> {
        self.request(|response| LedgerMessage::VerifyAuditTrail { response })
            .await?
    }

    /// Stop the actor and take the ledger back
    pub async fn shutdown(&self) -> Result<Ledger> {
        self.request(|response| LedgerMessage::Shutdown { response })
            .await
    }
}

/// Spawn the ledger actor
pub fn spawn_ledger_actor(ledger: Ledger, mailbox_capacity: usize) -> LedgerHandle {
    let (tx, rx) = mpsc::channel(mailbox_capacity); // Bounded channel for backpressure
    let actor = LedgerActor::new(ledger, rx);

    tokio::spawn(async move {
        actor.run().await;
    });

    LedgerHandle::new(tx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FeePolicy;

    fn reference_ledger() -> Ledger {
        let policy = FeePolicy::new(Decimal::from(10), Decimal::new(25, 1)).unwrap();
        Ledger::new("MyBank", policy)
    }

    async fn seeded_handle() -> LedgerHandle {
        let handle = spawn_ledger_actor(reference_ledger(), 16);
        handle
            .add_account(Account::new("123", "John Doe", Decimal::from(1000)).unwrap())
            .await
            .unwrap();
        handle
            .add_account(Account::new("456", "Jane Smith", Decimal::from(5000)).unwrap())
            .await
            .unwrap();
        handle
    }

    #[tokio::test]
    async fn test_actor_spawn_and_shutdown() {
        let handle = spawn_ledger_actor(reference_ledger(), 16);
        let ledger = handle.shutdown().await.unwrap();
        assert_eq!(ledger.name(), "MyBank");

        // Mailbox is gone after shutdown
        let result = handle.balance(AccountId::new("123")).await;
        assert!(matches!(result, Err(Error::Concurrency(_))));
    }

    #[tokio::test]
    async fn test_actor_transfer_and_queries() {
        let handle = seeded_handle().await;

        let record = handle
            .transfer(
                AccountId::new("123"),
                AccountId::new("456"),
                Decimal::from(100),
                "National Payment",
            )
            .await
            .unwrap();
        assert_eq!(record.fee(), Decimal::new(125, 1));

        assert_eq!(
            handle.balance(AccountId::new("123")).await.unwrap(),
            Decimal::new(8875, 1)
        );
        assert_eq!(
            handle
                .transactions_for_account(AccountId::new("456"))
                .await
                .unwrap()
                .len(),
            1
        );
        assert_eq!(handle.list_accounts().await.unwrap().len(), 2);

        let totals = handle.totals().await.unwrap();
        assert_eq!(totals.fees_collected, Decimal::new(125, 1));
        assert_eq!(totals.amount_transferred, Decimal::from(100));
        assert_eq!(totals.transaction_count, 1);

        let statement = handle.statement(AccountId::new("123")).await.unwrap();
        assert_eq!(statement.balance, Decimal::new(8875, 1));

        handle.verify_audit_trail().await.unwrap();
        handle.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_actor_propagates_errors() {
        let handle = seeded_handle().await;

        let result = handle
            .transfer(
                AccountId::new("123"),
                AccountId::new("456"),
                Decimal::from(5000),
                "Too much",
            )
            .await;
        assert!(matches!(result, Err(Error::InsufficientFunds { .. })));

        let result = handle.balance(AccountId::new("missing")).await;
        assert!(matches!(result, Err(Error::AccountNotFound(_))));

        handle.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_actor_survives_overflow() {
        let handle = seeded_handle().await;

        let result = handle
            .transfer(
                AccountId::new("123"),
                AccountId::new("456"),
                Decimal::MAX,
                "Overflow",
            )
            .await;
        assert!(matches!(result, Err(Error::Overflow(_))));

        let totals = handle.totals().await.unwrap();
        assert_eq!(totals.transaction_count, 0);
        assert_eq!(
            handle.balance(AccountId::new("123")).await.unwrap(),
            Decimal::from(1000)
        );

        handle
            .transfer(
                AccountId::new("123"),
                AccountId::new("456"),
                Decimal::from(100),
                "After overflow",
            )
            .await
            .unwrap();
        handle.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_concurrent_transfers_serialize() {
        let handle = seeded_handle().await;

        // 1000 can cover 8 transfers of 100 (112.50 each) but not a 9th
        let mut tasks = Vec::new();
        for i in 0..20 {
            let handle = handle.clone();
            tasks.push(tokio::spawn(async move {
                handle
                    .transfer(
                        AccountId::new("123"),
                        AccountId::new("456"),
                        Decimal::from(100),
                        format!("payment {i}"),
                    )
                    .await
            }));
        }

        let mut committed = 0;
        for task in tasks {
            if task.await.unwrap().is_ok() {
                committed += 1;
            }
        }
        assert_eq!(committed, 8);

        let ledger = handle.shutdown().await.unwrap();
        assert_eq!(
            ledger.balance(&AccountId::new("123")).unwrap(),
            Decimal::from(100)
        );
        assert_eq!(ledger.total_amount_transferred(), Decimal::from(800));
        assert_eq!(ledger.total_fees_collected(), Decimal::from(100));
        ledger.verify_audit_trail().unwrap();
    }
}
