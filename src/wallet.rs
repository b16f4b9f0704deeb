//! Wallet Ledger: simulated balance, transaction history and the coinflip.
//!
//! Every debit is checked against the balance before anything changes, so
//! the balance can never go negative. Apart from an unresolved coinflip
//! wager, the sum of all recorded amounts always equals the balance minus
//! the starting balance.

use rust_decimal::Decimal;

use crate::error::{Result, StorefrontError};
use crate::models::{
    CoinSide, FlipId, Transaction, TransactionId, TransactionKind, TransactionStatus,
};

/// A wager that has been debited but not yet resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingFlip {
    /// Generated identifier.
    pub id: FlipId,
    /// Amount staked.
    pub wager: Decimal,
    /// Side the player picked.
    pub selection: CoinSide,
}

/// Outcome of a resolved coinflip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlipResult {
    /// The resolved flip.
    pub id: FlipId,
    /// Side the player picked.
    pub selection: CoinSide,
    /// Side the coin landed on.
    pub outcome: CoinSide,
    /// Amount staked.
    pub wager: Decimal,
    /// Amount credited back, zero on a loss.
    pub payout: Decimal,
    /// Balance after settlement.
    pub balance: Decimal,
}

impl FlipResult {
    /// Returns `true` if the coin landed on the selected side.
    #[inline]
    #[must_use]
    pub fn won(&self) -> bool {
        self.selection == self.outcome
    }
}

/// The simulated wallet.
#[derive(Debug, Clone)]
pub struct Wallet {
    /// Current balance. Never negative.
    balance: Decimal,
    /// Ledger entries, oldest first.
    history: Vec<Transaction>,
    /// Wager awaiting resolution.
    pending_flip: Option<PendingFlip>,
}

impl Wallet {
    /// Creates a wallet with the given opening balance and no history.
    #[inline]
    #[must_use]
    pub const fn new(balance: Decimal) -> Self {
        Self {
            balance,
            history: Vec::new(),
            pending_flip: None,
        }
    }

    /// Current balance.
    #[inline]
    #[must_use]
    pub const fn balance(&self) -> Decimal {
        self.balance
    }

    /// Ledger entries, oldest first.
    #[inline]
    #[must_use]
    pub fn history(&self) -> &[Transaction] {
        &self.history
    }

    /// The unresolved coinflip, if any.
    #[inline]
    #[must_use]
    pub const fn pending_flip(&self) -> Option<&PendingFlip> {
        self.pending_flip.as_ref()
    }

    /// Credits a deposit.
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::InvalidAmount`] for a non-positive amount
    /// and [`StorefrontError::BalanceOverflow`] if the balance cannot hold
    /// it. The balance is unchanged on error.
    #[inline]
    pub fn deposit(&mut self, amount: Decimal) -> Result<Transaction> {
        ensure_positive(amount)?;
        self.balance = self
            .balance
            .checked_add(amount)
            .ok_or(StorefrontError::BalanceOverflow(amount))?;
        tracing::debug!(%amount, balance = %self.balance, "deposit credited");
        Ok(self.record(TransactionKind::Deposit, amount, TransactionStatus::Completed))
    }

    /// Debits a withdrawal and records it as pending until [`Wallet::complete`].
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::InvalidAmount`] for a non-positive amount
    /// and [`StorefrontError::InsufficientFunds`] if it exceeds the balance.
    #[inline]
    pub fn withdraw(&mut self, amount: Decimal) -> Result<TransactionId> {
        self.debit(amount)?;
        tracing::debug!(%amount, balance = %self.balance, "withdrawal requested");
        let tx = self.record(TransactionKind::Withdrawal, -amount, TransactionStatus::Pending);
        Ok(tx.id)
    }

    /// Marks a pending entry as completed.
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::TransactionNotFound`] for an unknown id and
    /// [`StorefrontError::TransactionCompleted`] if it was already settled.
    #[inline]
    pub fn complete(&mut self, id: &TransactionId) -> Result<&Transaction> {
        let tx = self
            .history
            .iter_mut()
            .find(|tx| tx.id == *id)
            .ok_or_else(|| StorefrontError::TransactionNotFound(id.clone()))?;
        if tx.status == TransactionStatus::Completed {
            return Err(StorefrontError::TransactionCompleted(id.clone()));
        }
        tx.status = TransactionStatus::Completed;
        tracing::debug!(tx = %tx.id, "transaction completed");
        Ok(&*tx)
    }

    /// Debits a purchase.
    ///
    /// # Errors
    ///
    /// Same as [`Wallet::withdraw`]. Nothing is debited on error.
    #[inline]
    pub fn purchase(&mut self, amount: Decimal) -> Result<Transaction> {
        self.debit(amount)?;
        tracing::debug!(%amount, balance = %self.balance, "purchase debited");
        Ok(self.record(TransactionKind::Purchase, -amount, TransactionStatus::Completed))
    }

    /// Stakes `wager` on `selection`, debiting it immediately.
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::FlipInProgress`] while another flip is
    /// unresolved, [`StorefrontError::InvalidAmount`] for a non-positive
    /// wager and [`StorefrontError::InsufficientFunds`] if it exceeds the
    /// balance. The balance is unchanged on error.
    #[inline]
    pub fn place_wager(&mut self, wager: Decimal, selection: CoinSide) -> Result<FlipId> {
        if self.pending_flip.is_some() {
            return Err(StorefrontError::FlipInProgress);
        }
        self.debit(wager)?;
        let id = FlipId::generate();
        tracing::debug!(flip = %id, %wager, %selection, "wager placed");
        self.pending_flip = Some(PendingFlip {
            id: id.clone(),
            wager,
            selection,
        });
        Ok(id)
    }

    /// Resolves the pending flip.
    ///
    /// A win credits `floor(wager * multiplier)` and records the net gain; a
    /// loss records the stake. A payout the balance cannot hold is capped at
    /// [`Decimal::MAX`]. Returns `None` if `id` is not the pending flip.
    #[inline]
    pub fn settle_flip(
        &mut self,
        id: &FlipId,
        outcome: CoinSide,
        multiplier: Decimal,
    ) -> Option<FlipResult> {
        let flip = self.take_flip(id)?;
        let won = flip.selection == outcome;
        let payout = if won {
            let full = flip.wager.saturating_mul(multiplier).floor();
            let room = Decimal::MAX - self.balance;
            if full > room {
                tracing::warn!(flip = %flip.id, %full, "coinflip payout capped at balance limit");
            }
            full.min(room)
        } else {
            Decimal::ZERO
        };
        self.balance += payout;
        let _entry = if won {
            self.record(TransactionKind::Win, payout - flip.wager, TransactionStatus::Completed)
        } else {
            self.record(TransactionKind::Loss, -flip.wager, TransactionStatus::Completed)
        };
        tracing::debug!(flip = %flip.id, %outcome, won, %payout, balance = %self.balance, "flip settled");
        Some(FlipResult {
            id: flip.id,
            selection: flip.selection,
            outcome,
            wager: flip.wager,
            payout,
            balance: self.balance,
        })
    }

    /// Returns the stake of an unresolved flip. Nothing is recorded.
    #[inline]
    pub fn refund_flip(&mut self, id: &FlipId) -> Option<Decimal> {
        let flip = self.take_flip(id)?;
        self.balance = self.balance.saturating_add(flip.wager);
        tracing::debug!(flip = %flip.id, wager = %flip.wager, "flip refunded");
        Some(flip.wager)
    }

    /// Removes the pending flip if it is the one named by `id`.
    fn take_flip(&mut self, id: &FlipId) -> Option<PendingFlip> {
        if self.pending_flip.as_ref().is_some_and(|flip| flip.id == *id) {
            self.pending_flip.take()
        } else {
            None
        }
    }

    /// Validates and subtracts a debit.
    fn debit(&mut self, amount: Decimal) -> Result<()> {
        ensure_positive(amount)?;
        if amount > self.balance {
            return Err(StorefrontError::InsufficientFunds {
                required: amount,
                available: self.balance,
            });
        }
        self.balance -= amount;
        Ok(())
    }

    /// Appends a ledger entry and returns a copy of it.
    fn record(
        &mut self,
        kind: TransactionKind,
        amount: Decimal,
        status: TransactionStatus,
    ) -> Transaction {
        let tx = Transaction::record(kind, amount, status);
        self.history.push(tx.clone());
        tx
    }
}

/// Rejects zero and negative amounts.
fn ensure_positive(amount: Decimal) -> Result<()> {
    if amount <= Decimal::ZERO {
        return Err(StorefrontError::InvalidAmount(amount));
    }
    Ok(())
}
