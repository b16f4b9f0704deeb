//! Daily raffle: one free entry per session, paid entries after that.

use chrono::{DateTime, Days, NaiveTime, TimeDelta, Utc};
use rust_decimal::Decimal;

use crate::error::Result;
use crate::random::RandomSource;
use crate::wallet::Wallet;

/// How an entry was paid for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RaffleEntry {
    /// The session's free entry.
    Free,
    /// A ticket bought from the wallet for the given price.
    Paid(Decimal),
}

/// State of the current raffle round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raffle {
    /// Prize pot.
    pot: Decimal,
    /// Tickets sold so far, including simulated activity.
    tickets_sold: u64,
    /// Price of a paid ticket.
    ticket_price: Decimal,
    /// Whether the free entry is still unused.
    free_entry: bool,
}

impl Raffle {
    /// Starts a round with an unused free entry.
    #[inline]
    #[must_use]
    pub const fn new(pot: Decimal, tickets_sold: u64, ticket_price: Decimal) -> Self {
        Self {
            pot,
            tickets_sold,
            ticket_price,
            free_entry: true,
        }
    }

    /// Current prize pot.
    #[inline]
    #[must_use]
    pub const fn pot(&self) -> Decimal {
        self.pot
    }

    /// Tickets sold so far.
    #[inline]
    #[must_use]
    pub const fn tickets_sold(&self) -> u64 {
        self.tickets_sold
    }

    /// Price of a paid ticket.
    #[inline]
    #[must_use]
    pub const fn ticket_price(&self) -> Decimal {
        self.ticket_price
    }

    /// Returns `true` while the free entry is unused.
    #[inline]
    #[must_use]
    pub const fn has_free_entry(&self) -> bool {
        self.free_entry
    }

    /// Enters the raffle.
    ///
    /// The first entry is free. Later entries debit the ticket price from
    /// `wallet` and add it to the pot.
    ///
    /// # Errors
    ///
    /// Propagates the wallet's rejection when a paid ticket is unaffordable;
    /// the raffle is unchanged in that case.
    #[inline]
    pub fn enter(&mut self, wallet: &mut Wallet) -> Result<RaffleEntry> {
        let entry = if self.free_entry {
            self.free_entry = false;
            RaffleEntry::Free
        } else {
            let _receipt = wallet.purchase(self.ticket_price)?;
            self.pot = self.pot.saturating_add(self.ticket_price);
            RaffleEntry::Paid(self.ticket_price)
        };
        self.tickets_sold = self.tickets_sold.saturating_add(1);
        tracing::debug!(?entry, tickets = self.tickets_sold, pot = %self.pot, "raffle entered");
        Ok(entry)
    }

    /// Simulates other players buying tickets.
    ///
    /// With probability 0.7 between zero and two tickets are added. Returns
    /// the number added.
    #[inline]
    pub fn simulate_activity<R: RandomSource + ?Sized>(&mut self, random: &mut R) -> u64 {
        if random.next_unit() <= 0.3 {
            return 0;
        }
        let added = if random.next_unit() < 1.0 / 3.0 {
            0
        } else if random.next_unit() < 0.5 {
            1
        } else {
            2
        };
        self.tickets_sold = self.tickets_sold.saturating_add(added);
        added
    }
}

/// Time left until the draw at the next UTC midnight.
#[inline]
#[must_use]
pub fn time_to_draw(now: DateTime<Utc>) -> TimeDelta {
    let next_midnight = now
        .date_naive()
        .checked_add_days(Days::new(1))
        .map(|day| day.and_time(NaiveTime::MIN).and_utc());
    next_midnight.map_or(TimeDelta::zero(), |midnight| midnight - now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StorefrontError;
    use crate::random::ScriptedRandom;
    use chrono::TimeZone as _;

    fn raffle() -> Raffle {
        Raffle::new(Decimal::from(5_000), 1_420, Decimal::from(5))
    }

    #[test]
    fn first_entry_is_free() {
        let mut raffle = raffle();
        let mut wallet = Wallet::new(Decimal::from(100));
        assert_eq!(raffle.enter(&mut wallet).unwrap(), RaffleEntry::Free);
        assert_eq!(wallet.balance(), Decimal::from(100));
        assert_eq!(raffle.tickets_sold(), 1_421);
        assert_eq!(raffle.pot(), Decimal::from(5_000));
        assert!(!raffle.has_free_entry());
    }

    #[test]
    fn later_entries_are_paid_and_grow_pot() {
        let mut raffle = raffle();
        let mut wallet = Wallet::new(Decimal::from(100));
        let _free = raffle.enter(&mut wallet).unwrap();
        let paid = raffle.enter(&mut wallet).unwrap();
        assert_eq!(paid, RaffleEntry::Paid(Decimal::from(5)));
        assert_eq!(wallet.balance(), Decimal::from(95));
        assert_eq!(raffle.pot(), Decimal::from(5_005));
        assert_eq!(raffle.tickets_sold(), 1_422);
    }

    #[test]
    fn unaffordable_ticket_changes_nothing() {
        let mut raffle = raffle();
        let mut wallet = Wallet::new(Decimal::from(4));
        let _free = raffle.enter(&mut wallet).unwrap();
        let err = raffle.enter(&mut wallet).unwrap_err();
        assert!(matches!(err, StorefrontError::InsufficientFunds { .. }));
        assert_eq!(raffle.tickets_sold(), 1_421);
        assert_eq!(raffle.pot(), Decimal::from(5_000));
        assert_eq!(wallet.balance(), Decimal::from(4));
    }

    #[test]
    fn activity_adds_scripted_tickets() {
        let mut raffle = raffle();
        let mut quiet = ScriptedRandom::new([0.1]);
        assert_eq!(raffle.simulate_activity(&mut quiet), 0);
        let mut busy = ScriptedRandom::new([0.9, 0.5, 0.9]);
        assert_eq!(raffle.simulate_activity(&mut busy), 2);
        assert_eq!(raffle.tickets_sold(), 1_422);
    }

    #[test]
    fn draw_is_at_next_midnight() {
        let now = Utc.with_ymd_and_hms(2024, 3, 10, 22, 30, 0).unwrap();
        assert_eq!(time_to_draw(now), TimeDelta::minutes(90));
    }
}
