//! Simulated checkout payment: `waiting -> detecting -> confirmed`.
//!
//! Nothing is verified. The phases exist to give checkout some latency:
//! reporting the payment as sent starts a detection timer, detection is
//! followed by a confirmation timer, and only then is the order created.
//! A session left waiting past the payment window expires.

use core::fmt::Debug;
use core::hash::Hash;
use core::time::Duration;

use crate::cart::CheckoutQuote;
use crate::error::{Result, StorefrontError};
use crate::models::{CartItem, PaymentPhase, SessionId};
use crate::scheduler::Scheduler;

/// How a checkout is paid for.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaymentMethod {
    /// Debited from the simulated wallet at settlement.
    Wallet,
    /// Sent from outside the storefront; the wallet is not touched.
    #[default]
    External,
}

/// Timings of the payment simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaymentDelays {
    /// From "payment sent" until the payment shows as confirmed.
    pub detect: Duration,
    /// From confirmation until the order is created.
    pub confirm: Duration,
    /// How long a session may wait for payment before expiring.
    pub window: Duration,
}

impl Default for PaymentDelays {
    #[inline]
    fn default() -> Self {
        Self {
            detect: Duration::from_secs(3),
            confirm: Duration::from_secs(2),
            window: Duration::from_secs(900),
        }
    }
}

/// Which payment timer fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaymentTimer {
    /// Detection finished.
    Detected,
    /// Confirmation delay elapsed; the order should be created.
    Settle,
    /// The payment window closed.
    Expire,
}

/// A payment timer firing for a specific session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentEvent {
    /// Session the timer belongs to.
    pub session: SessionId,
    /// Which timer fired.
    pub timer: PaymentTimer,
}

/// What applying a [`PaymentEvent`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentOutcome {
    /// The session moved to a new phase.
    Advanced(PaymentPhase),
    /// The session is confirmed and ready to become an order.
    Settle,
    /// The event no longer applies and was ignored.
    Stale,
}

/// An open checkout.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentSession {
    /// Generated identifier.
    pub id: SessionId,
    /// Current phase.
    pub phase: PaymentPhase,
    /// Price breakdown frozen when the session opened.
    pub quote: CheckoutQuote,
    /// Cart snapshot frozen when the session opened.
    pub items: Vec<CartItem>,
    /// Chosen payment method.
    pub method: PaymentMethod,
    /// Simulated on-chain transaction reference.
    pub tx_ref: String,
}

impl PaymentSession {
    /// Opens a session in the `Waiting` phase and starts the payment window.
    ///
    /// `scope_for` maps the new session id to the scheduler scope that owns
    /// its timers.
    #[inline]
    pub fn open<K, E, F>(
        quote: CheckoutQuote,
        items: Vec<CartItem>,
        method: PaymentMethod,
        scheduler: &mut Scheduler<K, E>,
        scope_for: F,
        delays: PaymentDelays,
    ) -> Self
    where
        K: Hash + Eq + Clone + Debug,
        E: From<PaymentEvent> + Send + 'static,
        F: FnOnce(&SessionId) -> K,
    {
        let id = SessionId::generate();
        let scope = scope_for(&id);
        let expire = PaymentEvent {
            session: id.clone(),
            timer: PaymentTimer::Expire,
        };
        scheduler.schedule(scope, delays.window, expire.into());
        tracing::debug!(session = %id, total = %quote.grand_total(), ?method, "checkout opened");
        Self {
            tx_ref: format!("0x{}", uuid::Uuid::new_v4().simple()),
            id,
            phase: PaymentPhase::Waiting,
            quote,
            items,
            method,
        }
    }

    /// Reports the payment as sent and starts detection.
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::PaymentNotWaiting`] unless the session is
    /// in the `Waiting` phase.
    #[inline]
    pub fn mark_sent<K, E>(
        &mut self,
        scheduler: &mut Scheduler<K, E>,
        scope: K,
        delays: PaymentDelays,
    ) -> Result<()>
    where
        K: Hash + Eq + Clone + Debug,
        E: From<PaymentEvent> + Send + 'static,
    {
        if self.phase != PaymentPhase::Waiting {
            return Err(StorefrontError::PaymentNotWaiting(self.phase));
        }
        self.phase = PaymentPhase::Detecting;
        let detected = PaymentEvent {
            session: self.id.clone(),
            timer: PaymentTimer::Detected,
        };
        scheduler.schedule(scope, delays.detect, detected.into());
        tracing::debug!(session = %self.id, "payment reported sent");
        Ok(())
    }

    /// Applies a fired timer to the session.
    ///
    /// Timers that belong to another session, or that no longer match the
    /// current phase, are reported as [`PaymentOutcome::Stale`].
    #[inline]
    pub fn on_timer<K, E>(
        &mut self,
        event: &PaymentEvent,
        scheduler: &mut Scheduler<K, E>,
        scope: K,
        delays: PaymentDelays,
    ) -> PaymentOutcome
    where
        K: Hash + Eq + Clone + Debug,
        E: From<PaymentEvent> + Send + 'static,
    {
        if event.session != self.id {
            return PaymentOutcome::Stale;
        }
        match (event.timer, self.phase) {
            (PaymentTimer::Detected, PaymentPhase::Detecting) => {
                self.phase = PaymentPhase::Confirmed;
                let settle = PaymentEvent {
                    session: self.id.clone(),
                    timer: PaymentTimer::Settle,
                };
                scheduler.schedule(scope, delays.confirm, settle.into());
                PaymentOutcome::Advanced(PaymentPhase::Confirmed)
            }
            (PaymentTimer::Settle, PaymentPhase::Confirmed) => PaymentOutcome::Settle,
            (PaymentTimer::Expire, PaymentPhase::Waiting) => {
                self.phase = PaymentPhase::Expired;
                tracing::info!(session = %self.id, "payment window expired");
                PaymentOutcome::Advanced(PaymentPhase::Expired)
            }
            (timer, phase) => {
                tracing::debug!(session = %self.id, ?timer, %phase, "payment timer no longer applies");
                PaymentOutcome::Stale
            }
        }
    }

    /// Returns `true` once the session can no longer lead to an order.
    #[inline]
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.phase == PaymentPhase::Expired
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use tokio::time::Instant;

    fn quote() -> CheckoutQuote {
        CheckoutQuote {
            subtotal: 500,
            base_total: Decimal::from(515),
            mixing_fee: Decimal::ZERO,
            network_fee: Decimal::new(350, 2),
        }
    }

    fn open(scheduler: &mut Scheduler<u8, PaymentEvent>) -> PaymentSession {
        PaymentSession::open(
            quote(),
            Vec::new(),
            PaymentMethod::External,
            scheduler,
            |_| 0,
            PaymentDelays::default(),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn sent_payment_confirms_then_settles() {
        let (mut scheduler, mut events) = Scheduler::new();
        let mut session = open(&mut scheduler);
        assert!(session.tx_ref.starts_with("0x"));
        let start = Instant::now();
        session.mark_sent(&mut scheduler, 0, PaymentDelays::default()).unwrap();
        assert_eq!(session.phase, PaymentPhase::Detecting);

        let detected = events.recv().await.unwrap();
        assert_eq!(start.elapsed(), Duration::from_secs(3));
        let outcome = session.on_timer(&detected, &mut scheduler, 0, PaymentDelays::default());
        assert_eq!(outcome, PaymentOutcome::Advanced(PaymentPhase::Confirmed));

        let settle = events.recv().await.unwrap();
        assert_eq!(start.elapsed(), Duration::from_secs(5));
        let outcome = session.on_timer(&settle, &mut scheduler, 0, PaymentDelays::default());
        assert_eq!(outcome, PaymentOutcome::Settle);
    }

    #[tokio::test(start_paused = true)]
    async fn unpaid_session_expires_after_window() {
        let (mut scheduler, mut events) = Scheduler::new();
        let mut session = open(&mut scheduler);
        let start = Instant::now();

        let expire = events.recv().await.unwrap();
        assert_eq!(start.elapsed(), Duration::from_secs(900));
        let outcome = session.on_timer(&expire, &mut scheduler, 0, PaymentDelays::default());
        assert_eq!(outcome, PaymentOutcome::Advanced(PaymentPhase::Expired));
        assert!(session.is_expired());
        assert!(matches!(
            session.mark_sent(&mut scheduler, 0, PaymentDelays::default()),
            Err(StorefrontError::PaymentNotWaiting(PaymentPhase::Expired))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn expiry_after_payment_sent_is_stale() {
        let (mut scheduler, _events) = Scheduler::new();
        let mut session = open(&mut scheduler);
        session.mark_sent(&mut scheduler, 0, PaymentDelays::default()).unwrap();
        let expire = PaymentEvent {
            session: session.id.clone(),
            timer: PaymentTimer::Expire,
        };
        let outcome = session.on_timer(&expire, &mut scheduler, 0, PaymentDelays::default());
        assert_eq!(outcome, PaymentOutcome::Stale);
        assert_eq!(session.phase, PaymentPhase::Detecting);
    }

    #[tokio::test(start_paused = true)]
    async fn foreign_session_timer_is_stale() {
        let (mut scheduler, _events) = Scheduler::new();
        let mut session = open(&mut scheduler);
        let foreign = PaymentEvent {
            session: SessionId::from("other"),
            timer: PaymentTimer::Expire,
        };
        let outcome = session.on_timer(&foreign, &mut scheduler, 0, PaymentDelays::default());
        assert_eq!(outcome, PaymentOutcome::Stale);
        assert_eq!(session.phase, PaymentPhase::Waiting);
    }

    #[tokio::test(start_paused = true)]
    async fn double_send_is_rejected() {
        let (mut scheduler, _events) = Scheduler::new();
        let mut session = open(&mut scheduler);
        session.mark_sent(&mut scheduler, 0, PaymentDelays::default()).unwrap();
        assert!(matches!(
            session.mark_sent(&mut scheduler, 0, PaymentDelays::default()),
            Err(StorefrontError::PaymentNotWaiting(PaymentPhase::Detecting))
        ));
    }
}
