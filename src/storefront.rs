//! The storefront coordinator.
//!
//! [`Storefront`] owns every store (catalog, cart, orders, wallet, raffle
//! and session) and is the only place they are mutated. Operations that
//! take time schedule timers on a shared [`Scheduler`]; the fired timers
//! come back through [`Storefront::next_event`] and are applied one at a
//! time, so every invariant is checked by a single writer.
//!
//! Timer-scheduling operations must be called from within a tokio runtime.

use std::collections::HashMap;

use rust_decimal::Decimal;
use tokio::sync::mpsc;

use crate::cart::{AddHook, Cart};
use crate::config::StorefrontConfig;
use crate::currency::DisplayCurrency;
use crate::error::{Result, StorefrontError};
use crate::filter::{ProductFilter, SortOrder, sort_listing};
use crate::lifecycle::{OrderBook, OrderTransition};
use crate::messaging::{Correspondent, Message, Thread};
use crate::models::{
    CartItem, CartLineId, CoinSide, FlipId, MessageId, Order, OrderId, OrderStatus, PaymentPhase,
    Product, ProductId, SessionId, TierId, Transaction, TransactionId, User,
};
use crate::payment::{PaymentEvent, PaymentMethod, PaymentOutcome, PaymentSession};
use crate::raffle::{Raffle, RaffleEntry};
use crate::random::{RandomSource, StdRandom};
use crate::scheduler::Scheduler;
use crate::store::{Catalog, SessionStore, seed_catalog};
use crate::wallet::{FlipResult, Wallet};

/// Owner of a group of timers, cancelled together.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TimerScope {
    /// The open checkout's payment timers.
    Checkout(SessionId),
    /// An order's lifecycle timers.
    Order(OrderId),
    /// A coinflip waiting to land.
    Flip(FlipId),
    /// The wallet's deposit scan.
    DepositScan,
    /// A withdrawal waiting to settle.
    Withdrawal(TransactionId),
    /// Replies owed in a message thread.
    Reply(Correspondent),
}

/// A fired timer, applied by the coordinator.
#[derive(Debug)]
enum TimerEvent {
    /// Order lifecycle step.
    Order(OrderTransition),
    /// Checkout payment step.
    Payment(PaymentEvent),
    /// The coin landed.
    FlipLanded(FlipId),
    /// The deposit scan finished.
    DepositFound,
    /// A withdrawal settled.
    WithdrawalSettled(TransactionId),
    /// A correspondent answered.
    Reply(Correspondent),
}

impl From<OrderTransition> for TimerEvent {
    #[inline]
    fn from(transition: OrderTransition) -> Self {
        Self::Order(transition)
    }
}

impl From<PaymentEvent> for TimerEvent {
    #[inline]
    fn from(event: PaymentEvent) -> Self {
        Self::Payment(event)
    }
}

/// Something that happened when a timer fired.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorefrontEvent {
    /// The checkout payment moved to a new phase.
    PaymentPhaseChanged {
        /// Checkout session.
        session: SessionId,
        /// New phase.
        phase: PaymentPhase,
    },
    /// A confirmed checkout became an order.
    OrderPlaced {
        /// New order.
        order: OrderId,
        /// Amount charged.
        total: Decimal,
    },
    /// A confirmed checkout could not be settled.
    CheckoutFailed {
        /// Checkout session.
        session: SessionId,
        /// Why settlement failed.
        reason: String,
    },
    /// An order moved to a new status.
    OrderStatusChanged {
        /// Order that moved.
        order: OrderId,
        /// New status.
        status: OrderStatus,
    },
    /// A coinflip landed.
    FlipResolved(FlipResult),
    /// The deposit scan credited the wallet.
    DepositFound(Transaction),
    /// A withdrawal settled.
    WithdrawalCompleted(TransactionId),
    /// A vendor or support answered a message.
    ReplyReceived {
        /// Thread the reply landed in.
        with: Correspondent,
        /// The reply.
        message: Message,
    },
}

/// A view whose timers are revoked when it closes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum View {
    /// The checkout. Closing abandons the payment session.
    Checkout,
    /// The coinflip. Closing refunds an unresolved wager.
    Coinflip,
    /// The wallet. Closing stops a deposit scan.
    Wallet,
    /// Message threads. Closing drops replies not yet received.
    Messages,
}

/// Choices made when starting a checkout.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CheckoutOptions {
    /// How the order is paid.
    pub method: PaymentMethod,
    /// Whether to add the mixing fee.
    pub mixing: bool,
}

/// Builder for constructing a [`Storefront`].
#[derive(Debug)]
pub struct StorefrontBuilder<R> {
    /// Fees, delays and starting state.
    config: StorefrontConfig,
    /// Initial listings; the built-in catalog if unset.
    catalog: Option<Vec<Product>>,
    /// Source for every random draw.
    random: R,
}

impl StorefrontBuilder<StdRandom> {
    /// Creates a builder with default configuration and OS-seeded randomness.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: StorefrontConfig::default(),
            catalog: None,
            random: StdRandom::new(),
        }
    }
}

impl Default for StorefrontBuilder<StdRandom> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<R: RandomSource> StorefrontBuilder<R> {
    /// Sets the configuration.
    #[inline]
    #[must_use]
    pub fn config(mut self, config: StorefrontConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the initial listings.
    #[inline]
    #[must_use]
    pub fn catalog(mut self, products: Vec<Product>) -> Self {
        self.catalog = Some(products);
        self
    }

    /// Replaces the random source.
    #[inline]
    #[must_use]
    pub fn random<S: RandomSource>(self, random: S) -> StorefrontBuilder<S> {
        StorefrontBuilder {
            config: self.config,
            catalog: self.catalog,
            random,
        }
    }

    /// Builds the storefront.
    #[inline]
    #[must_use]
    pub fn build(self) -> Storefront<R> {
        let config = self.config;
        let (scheduler, timers) = Scheduler::new();
        Storefront {
            catalog: Catalog::new(self.catalog.unwrap_or_else(seed_catalog)),
            cart: Cart::new(config.cart.merge_policy),
            orders: OrderBook::new(),
            wallet: Wallet::new(config.wallet.starting_balance),
            raffle: Raffle::new(
                config.raffle.pot,
                config.raffle.tickets_sold,
                config.raffle.ticket_price,
            ),
            session: SessionStore::new(config.session.admins.clone()),
            currency: config.session.currency,
            threads: HashMap::new(),
            checkout: None,
            deposit_scan: false,
            random: self.random,
            scheduler,
            timers,
            config,
        }
    }
}

/// The storefront application state.
///
/// # Examples
///
/// ```no_run
/// use storefront_sim::storefront::{CheckoutOptions, StorefrontBuilder};
/// use storefront_sim::models::{ProductId, TierId};
///
/// # async fn run() -> storefront_sim::Result<()> {
/// let mut store = StorefrontBuilder::new().build();
/// let _line = store.add_to_cart(&ProductId::from("p1"), &TierId::from("t1"))?;
/// let _session = store.begin_checkout(CheckoutOptions::default())?;
/// store.confirm_payment_sent()?;
/// while let Some(event) = store.next_event().await {
///     println!("{event:?}");
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Storefront<R: RandomSource = StdRandom> {
    /// Fees, delays and starting state.
    config: StorefrontConfig,
    /// Product listings.
    catalog: Catalog,
    /// Shopping cart.
    cart: Cart,
    /// Placed orders.
    orders: OrderBook,
    /// Simulated wallet.
    wallet: Wallet,
    /// Current raffle round.
    raffle: Raffle,
    /// Signed-in user.
    session: SessionStore,
    /// Currency prices are shown in.
    currency: DisplayCurrency,
    /// Message threads by correspondent.
    threads: HashMap<Correspondent, Thread>,
    /// Open checkout, if any.
    checkout: Option<PaymentSession>,
    /// Whether a deposit scan is running.
    deposit_scan: bool,
    /// Source for every random draw.
    random: R,
    /// Timer scheduler.
    scheduler: Scheduler<TimerScope, TimerEvent>,
    /// Fired timers waiting to be applied.
    timers: mpsc::UnboundedReceiver<TimerEvent>,
}

impl<R: RandomSource> Storefront<R> {
    // ── Read access ─────────────────────────────────────────────────

    /// The active configuration.
    #[inline]
    #[must_use]
    pub const fn config(&self) -> &StorefrontConfig {
        &self.config
    }

    /// Product listings and vendor views.
    #[inline]
    #[must_use]
    pub const fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// The shopping cart.
    #[inline]
    #[must_use]
    pub const fn cart(&self) -> &Cart {
        &self.cart
    }

    /// Placed orders.
    #[inline]
    #[must_use]
    pub const fn orders(&self) -> &OrderBook {
        &self.orders
    }

    /// The wallet.
    #[inline]
    #[must_use]
    pub const fn wallet(&self) -> &Wallet {
        &self.wallet
    }

    /// The current raffle round.
    #[inline]
    #[must_use]
    pub const fn raffle(&self) -> &Raffle {
        &self.raffle
    }

    /// The open checkout, if any.
    #[inline]
    #[must_use]
    pub const fn checkout(&self) -> Option<&PaymentSession> {
        self.checkout.as_ref()
    }

    /// The signed-in user, if any.
    #[inline]
    #[must_use]
    pub const fn current_user(&self) -> Option<&User> {
        self.session.current()
    }

    /// Returns `true` while a deposit scan is running.
    #[inline]
    #[must_use]
    pub const fn is_scanning_for_deposit(&self) -> bool {
        self.deposit_scan
    }

    /// Currency prices are shown in.
    #[inline]
    #[must_use]
    pub const fn display_currency(&self) -> DisplayCurrency {
        self.currency
    }

    /// Formats an AUD amount in the display currency.
    #[inline]
    #[must_use]
    pub fn price_label(&self, aud: Decimal) -> String {
        self.currency.format(aud)
    }

    /// The thread with `with`, if one was opened.
    #[inline]
    #[must_use]
    pub fn thread(&self, with: &Correspondent) -> Option<&Thread> {
        self.threads.get(with)
    }

    /// Listings passing `filter`, ordered by `sort`.
    #[inline]
    #[must_use]
    pub fn listings(&self, filter: &ProductFilter, sort: SortOrder) -> Vec<&Product> {
        let mut shown = filter.apply(self.catalog.products());
        sort_listing(&mut shown, sort);
        shown
    }

    // ── Catalog ─────────────────────────────────────────────────────

    /// Saves a listing from the editor.
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::Unauthorized`] unless an admin is signed
    /// in, and [`StorefrontError::InvalidListing`] for a blank name.
    #[inline]
    pub fn save_listing(&mut self, product: Product) -> Result<()> {
        if !self.session.is_admin() {
            return Err(StorefrontError::Unauthorized);
        }
        self.catalog.upsert(product)
    }

    /// Flips a listing's wishlist flag and returns its new value.
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::ProductNotFound`] for an unknown id.
    #[inline]
    pub fn toggle_wishlist(&mut self, id: &ProductId) -> Result<bool> {
        self.catalog.toggle_wishlist(id)
    }

    // ── Cart ────────────────────────────────────────────────────────

    /// Adds one unit of a product tier to the cart.
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::ProductNotFound`] or
    /// [`StorefrontError::TierNotFound`] for unknown ids.
    #[inline]
    pub fn add_to_cart(&mut self, product: &ProductId, tier: &TierId) -> Result<CartLineId> {
        let listing = self
            .catalog
            .get(product)
            .ok_or_else(|| StorefrontError::ProductNotFound(product.clone()))?;
        self.cart.add(listing, tier)
    }

    /// Removes a cart line. Returns it if it existed.
    #[inline]
    pub fn remove_from_cart(&mut self, line: &CartLineId) -> Option<CartItem> {
        self.cart.remove(line)
    }

    /// Sets a line's quantity; zero removes the line. Returns `false` if the
    /// line does not exist.
    #[inline]
    pub fn set_cart_quantity(&mut self, line: &CartLineId, quantity: u32) -> bool {
        self.cart.set_quantity(line, quantity)
    }

    /// Empties the cart.
    #[inline]
    pub fn clear_cart(&mut self) {
        self.cart.clear();
    }

    /// Installs the callback run after every successful add.
    #[inline]
    pub fn on_cart_add(&mut self, hook: AddHook) {
        self.cart.set_on_add(hook);
    }

    // ── Checkout ────────────────────────────────────────────────────

    /// Opens a checkout for the current cart.
    ///
    /// The quote is frozen here, including a random network fee. An
    /// expired checkout is replaced.
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::EmptyCart`] for an empty cart,
    /// [`StorefrontError::CheckoutInProgress`] if a live checkout is open,
    /// and [`StorefrontError::InsufficientFunds`] for a wallet payment the
    /// balance cannot cover.
    #[inline]
    pub fn begin_checkout(&mut self, options: CheckoutOptions) -> Result<&PaymentSession> {
        if self.cart.is_empty() {
            return Err(StorefrontError::EmptyCart);
        }
        if self.checkout.as_ref().is_some_and(|open| !open.is_expired()) {
            return Err(StorefrontError::CheckoutInProgress);
        }
        let fees = &self.config.fees;
        let network_fee = to_money(
            self.random
                .next_in_range(fees.network_fee_min, fees.network_fee_max),
        )
        .unwrap_or(Decimal::ZERO);
        let quote = self.cart.quote(&fees.schedule(), options.mixing, network_fee);
        let total = quote.grand_total();
        if options.method == PaymentMethod::Wallet && total > self.wallet.balance() {
            return Err(StorefrontError::InsufficientFunds {
                required: total,
                available: self.wallet.balance(),
            });
        }
        self.abandon_checkout();

        let session = PaymentSession::open(
            quote,
            self.cart.lines().to_vec(),
            options.method,
            &mut self.scheduler,
            |id| TimerScope::Checkout(id.clone()),
            self.config.delays.payment(),
        );
        Ok(&*self.checkout.insert(session))
    }

    /// Reports the checkout payment as sent.
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::NoCheckoutSession`] without an open
    /// checkout and [`StorefrontError::PaymentNotWaiting`] if it is past the
    /// waiting phase.
    #[inline]
    pub fn confirm_payment_sent(&mut self) -> Result<()> {
        let session = self
            .checkout
            .as_mut()
            .ok_or(StorefrontError::NoCheckoutSession)?;
        let scope = TimerScope::Checkout(session.id.clone());
        session.mark_sent(&mut self.scheduler, scope, self.config.delays.payment())
    }

    // ── Orders ──────────────────────────────────────────────────────

    /// Marks an order as received and stops its timers.
    ///
    /// # Errors
    ///
    /// See [`OrderBook::mark_delivered`].
    #[inline]
    pub fn mark_delivered(&mut self, id: &OrderId) -> Result<&Order> {
        let _stopped = self.scheduler.cancel(&TimerScope::Order(id.clone()));
        self.orders.mark_delivered(id)
    }

    /// Cancels a non-terminal order and stops its timers.
    ///
    /// # Errors
    ///
    /// See [`OrderBook::cancel`].
    #[inline]
    pub fn cancel_order(&mut self, id: &OrderId) -> Result<&Order> {
        let _stopped = self.scheduler.cancel(&TimerScope::Order(id.clone()));
        self.orders.cancel(id)
    }

    // ── Wallet ──────────────────────────────────────────────────────

    /// Credits a deposit.
    ///
    /// # Errors
    ///
    /// See [`Wallet::deposit`].
    #[inline]
    pub fn deposit(&mut self, amount: Decimal) -> Result<Transaction> {
        self.wallet.deposit(amount)
    }

    /// Starts a simulated deposit scan. Returns `false` if one is running.
    ///
    /// When the scan finishes a random amount is credited.
    #[inline]
    pub fn scan_for_deposit(&mut self) -> bool {
        if self.deposit_scan {
            return false;
        }
        self.deposit_scan = true;
        self.scheduler.schedule(
            TimerScope::DepositScan,
            self.config.delays.deposit_scan(),
            TimerEvent::DepositFound,
        );
        true
    }

    /// Debits a withdrawal, completed later by a timer.
    ///
    /// # Errors
    ///
    /// See [`Wallet::withdraw`].
    #[inline]
    pub fn withdraw(&mut self, amount: Decimal) -> Result<TransactionId> {
        let id = self.wallet.withdraw(amount)?;
        self.scheduler.schedule(
            TimerScope::Withdrawal(id.clone()),
            self.config.delays.withdrawal(),
            TimerEvent::WithdrawalSettled(id.clone()),
        );
        Ok(id)
    }

    /// Stakes `wager` on `selection`. The coin lands after the coinflip delay.
    ///
    /// # Errors
    ///
    /// See [`Wallet::place_wager`]. The balance is unchanged on error.
    #[inline]
    pub fn flip(&mut self, wager: Decimal, selection: CoinSide) -> Result<FlipId> {
        let id = self.wallet.place_wager(wager, selection)?;
        self.scheduler.schedule(
            TimerScope::Flip(id.clone()),
            self.config.delays.coinflip(),
            TimerEvent::FlipLanded(id.clone()),
        );
        Ok(id)
    }

    // ── Raffle ──────────────────────────────────────────────────────

    /// Enters the raffle, paying from the wallet after the free entry.
    ///
    /// # Errors
    ///
    /// See [`Raffle::enter`].
    #[inline]
    pub fn enter_raffle(&mut self) -> Result<RaffleEntry> {
        self.raffle.enter(&mut self.wallet)
    }

    /// Simulates other players buying tickets; returns how many were added.
    #[inline]
    pub fn simulate_raffle_activity(&mut self) -> u64 {
        self.raffle.simulate_activity(&mut self.random)
    }

    // ── Session ─────────────────────────────────────────────────────

    /// Signs in an existing user.
    ///
    /// # Errors
    ///
    /// See [`SessionStore::login`].
    #[inline]
    pub fn login(&mut self, username: &str) -> Result<&User> {
        self.session.login(username)
    }

    /// Registers and signs in a new user.
    ///
    /// # Errors
    ///
    /// See [`SessionStore::register`].
    #[inline]
    pub fn register(&mut self, username: &str) -> Result<&User> {
        self.session.register(username)
    }

    /// Signs out, returning the previous user.
    #[inline]
    pub fn logout(&mut self) -> Option<User> {
        self.session.logout()
    }

    /// Switches the currency prices are shown in.
    #[inline]
    pub fn set_display_currency(&mut self, currency: DisplayCurrency) {
        tracing::debug!(%currency, "display currency changed");
        self.currency = currency;
    }

    // ── Messages ────────────────────────────────────────────────────

    /// Opens the thread with `with`, starting it with a greeting if new.
    #[inline]
    pub fn open_thread(&mut self, with: Correspondent) -> &Thread {
        self.threads
            .entry(with)
            .or_insert_with_key(|key| Thread::new(key.clone()))
    }

    /// Sends a message; the correspondent replies after the reply delay.
    ///
    /// # Errors
    ///
    /// See [`Thread::post`].
    #[inline]
    pub fn send_message(&mut self, with: Correspondent, text: &str) -> Result<MessageId> {
        let delay = self.config.delays.reply(&with);
        let sent = self
            .threads
            .entry(with.clone())
            .or_insert_with_key(|key| Thread::new(key.clone()))
            .post(text)?;
        self.scheduler
            .schedule(TimerScope::Reply(with.clone()), delay, TimerEvent::Reply(with));
        Ok(sent.id)
    }

    // ── Views and timers ────────────────────────────────────────────

    /// Closes a view and revokes the timers it owns.
    #[inline]
    pub fn close(&mut self, view: View) {
        match view {
            View::Checkout => self.abandon_checkout(),
            View::Coinflip => {
                let Some(id) = self.wallet.pending_flip().map(|flip| flip.id.clone()) else {
                    return;
                };
                let _stopped = self.scheduler.cancel(&TimerScope::Flip(id.clone()));
                if let Some(wager) = self.wallet.refund_flip(&id) {
                    tracing::info!(flip = %id, %wager, "coinflip closed early, wager refunded");
                }
            }
            View::Wallet => {
                let _stopped = self.scheduler.cancel(&TimerScope::DepositScan);
                self.deposit_scan = false;
            }
            View::Messages => {
                for (with, thread) in &mut self.threads {
                    let _stopped = self.scheduler.cancel(&TimerScope::Reply(with.clone()));
                    let dropped = thread.cancel_replies();
                    if dropped > 0 {
                        tracing::debug!(?with, dropped, "pending replies dropped");
                    }
                }
            }
        }
    }

    /// Waits for the next timer that changes state and returns what happened.
    ///
    /// Returns `None` once no timers are pending.
    #[inline]
    pub async fn next_event(&mut self) -> Option<StorefrontEvent> {
        loop {
            // A timer sends before it finishes, so reading the count first
            // means an idle scheduler has nothing left in the channel.
            let idle = self.scheduler.pending_total() == 0;
            let timer = match self.timers.try_recv() {
                Ok(ready) => ready,
                Err(_) if idle => {
                    self.scheduler.prune();
                    return None;
                }
                Err(_) => self.timers.recv().await?,
            };
            if let Some(event) = self.apply_timer(timer) {
                return Some(event);
            }
        }
    }

    /// Applies every timer that has already fired, without waiting.
    #[inline]
    pub fn drain_ready_events(&mut self) -> Vec<StorefrontEvent> {
        let mut events = Vec::new();
        while let Ok(timer) = self.timers.try_recv() {
            events.extend(self.apply_timer(timer));
        }
        events
    }

    /// Applies one fired timer.
    fn apply_timer(&mut self, timer: TimerEvent) -> Option<StorefrontEvent> {
        match timer {
            TimerEvent::Order(transition) => {
                if transition.to == OrderStatus::Shipped {
                    let _done = self
                        .scheduler
                        .cancel(&TimerScope::Order(transition.order.clone()));
                }
                match self.orders.apply(&transition) {
                    Ok(true) => Some(StorefrontEvent::OrderStatusChanged {
                        order: transition.order,
                        status: transition.to,
                    }),
                    Ok(false) => None,
                    Err(err) => {
                        tracing::warn!(error = %err, "dropping timer for unknown order");
                        None
                    }
                }
            }
            TimerEvent::Payment(event) => self.apply_payment(&event),
            TimerEvent::FlipLanded(id) => {
                let _done = self.scheduler.cancel(&TimerScope::Flip(id.clone()));
                let outcome = self.random.flip();
                let multiplier = self.config.wallet.payout_multiplier;
                match self.wallet.settle_flip(&id, outcome, multiplier) {
                    Some(result) => Some(StorefrontEvent::FlipResolved(result)),
                    None => {
                        tracing::warn!(flip = %id, "ignoring stale coinflip");
                        None
                    }
                }
            }
            TimerEvent::DepositFound => self.apply_deposit_found(),
            TimerEvent::Reply(with) => {
                let Some(message) = self
                    .threads
                    .get_mut(&with)
                    .and_then(Thread::receive_reply)
                else {
                    tracing::warn!(?with, "ignoring reply timer with nothing awaiting");
                    return None;
                };
                Some(StorefrontEvent::ReplyReceived { with, message })
            }
            TimerEvent::WithdrawalSettled(id) => {
                let _done = self.scheduler.cancel(&TimerScope::Withdrawal(id.clone()));
                match self.wallet.complete(&id) {
                    Ok(_) => Some(StorefrontEvent::WithdrawalCompleted(id)),
                    Err(err) => {
                        tracing::warn!(tx = %id, error = %err, "ignoring stale withdrawal timer");
                        None
                    }
                }
            }
        }
    }

    /// Applies a checkout payment timer.
    fn apply_payment(&mut self, event: &PaymentEvent) -> Option<StorefrontEvent> {
        let Some(session) = self.checkout.as_mut() else {
            tracing::warn!(session = %event.session, "ignoring payment timer without checkout");
            return None;
        };
        let scope = TimerScope::Checkout(session.id.clone());
        match session.on_timer(event, &mut self.scheduler, scope, self.config.delays.payment()) {
            PaymentOutcome::Advanced(phase) => Some(StorefrontEvent::PaymentPhaseChanged {
                session: session.id.clone(),
                phase,
            }),
            PaymentOutcome::Settle => self.settle_checkout(),
            PaymentOutcome::Stale => {
                tracing::warn!(session = %event.session, timer = ?event.timer, "ignoring stale payment timer");
                None
            }
        }
    }

    /// Turns the confirmed checkout into an order.
    fn settle_checkout(&mut self) -> Option<StorefrontEvent> {
        let session = self.checkout.take()?;
        let _done = self
            .scheduler
            .cancel(&TimerScope::Checkout(session.id.clone()));
        let total = session.quote.grand_total();
        if session.method == PaymentMethod::Wallet {
            if let Err(err) = self.wallet.purchase(total) {
                tracing::info!(session = %session.id, error = %err, "checkout failed at settlement");
                return Some(StorefrontEvent::CheckoutFailed {
                    session: session.id,
                    reason: err.to_string(),
                });
            }
        }
        let order = self.orders.place(session.items, total, session.tx_ref);
        OrderBook::schedule_progress(
            &order,
            &mut self.scheduler,
            TimerScope::Order(order.clone()),
            self.config.delays.lifecycle(),
        );
        self.cart.clear();
        Some(StorefrontEvent::OrderPlaced { order, total })
    }

    /// Credits a random deposit if the scan is still running.
    fn apply_deposit_found(&mut self) -> Option<StorefrontEvent> {
        if !self.deposit_scan {
            tracing::warn!("ignoring deposit timer after scan stopped");
            return None;
        }
        self.deposit_scan = false;
        let _done = self.scheduler.cancel(&TimerScope::DepositScan);
        let limits = &self.config.wallet;
        let amount = to_money(
            self.random
                .next_in_range(limits.deposit_min, limits.deposit_max),
        )?;
        match self.wallet.deposit(amount) {
            Ok(tx) => Some(StorefrontEvent::DepositFound(tx)),
            Err(err) => {
                tracing::warn!(error = %err, "simulated deposit rejected");
                None
            }
        }
    }

    /// Drops the open checkout and its timers.
    fn abandon_checkout(&mut self) {
        if let Some(session) = self.checkout.take() {
            let _stopped = self
                .scheduler
                .cancel(&TimerScope::Checkout(session.id.clone()));
            tracing::debug!(session = %session.id, phase = %session.phase, "checkout closed");
        }
    }
}

/// Rounds a random draw to cents.
fn to_money(value: f64) -> Option<Decimal> {
    Decimal::from_f64_retain(value).map(|amount| amount.round_dp(2))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::test_support::sample_product;
    use crate::models::TransactionStatus;
    use crate::random::ScriptedRandom;
    use core::time::Duration;
    use tokio::time::Instant;

    fn storefront(random: ScriptedRandom) -> Storefront<ScriptedRandom> {
        StorefrontBuilder::new()
            .catalog(vec![sample_product("p1")])
            .random(random)
            .build()
    }

    fn p1() -> ProductId {
        ProductId::from("p1")
    }

    fn t1() -> TierId {
        TierId::from("t1")
    }

    fn starting_balance() -> Decimal {
        Decimal::new(250_050, 2)
    }

    #[tokio::test(start_paused = true)]
    async fn checkout_then_order_progresses_on_schedule() {
        let mut store = storefront(ScriptedRandom::new([0.5]));
        let _first = store.add_to_cart(&p1(), &t1()).unwrap();
        let _second = store.add_to_cart(&p1(), &t1()).unwrap();
        assert_eq!(store.cart().lines().len(), 1);
        assert_eq!(store.cart().subtotal(), 500);

        let session = store.begin_checkout(CheckoutOptions::default()).unwrap();
        assert_eq!(session.quote.base_total, Decimal::from(515));
        assert_eq!(session.quote.network_fee, Decimal::new(450, 2));
        store.confirm_payment_sent().unwrap();
        let start = Instant::now();

        let confirmed = store.next_event().await.unwrap();
        assert!(matches!(
            confirmed,
            StorefrontEvent::PaymentPhaseChanged {
                phase: PaymentPhase::Confirmed,
                ..
            }
        ));
        assert_eq!(start.elapsed(), Duration::from_secs(3));

        let Some(StorefrontEvent::OrderPlaced { order, total }) = store.next_event().await else {
            panic!("expected order placement");
        };
        let placed_at = Instant::now();
        assert_eq!(total, Decimal::new(51_950, 2));
        assert!(store.cart().is_empty());
        assert!(store.checkout().is_none());
        assert_eq!(store.wallet().balance(), starting_balance());

        let processing = store.next_event().await.unwrap();
        assert_eq!(
            processing,
            StorefrontEvent::OrderStatusChanged {
                order: order.clone(),
                status: OrderStatus::Processing,
            }
        );
        assert_eq!(placed_at.elapsed(), Duration::from_secs(5));

        let shipped = store.next_event().await.unwrap();
        assert_eq!(
            shipped,
            StorefrontEvent::OrderStatusChanged {
                order: order.clone(),
                status: OrderStatus::Shipped,
            }
        );
        assert_eq!(placed_at.elapsed(), Duration::from_secs(15));
        assert!(store.next_event().await.is_none());

        let delivered = store.mark_delivered(&order).unwrap();
        assert_eq!(delivered.status, OrderStatus::Delivered);
    }

    #[tokio::test(start_paused = true)]
    async fn wallet_checkout_debits_balance() {
        let mut store = storefront(ScriptedRandom::new([0.0]));
        let _line = store.add_to_cart(&p1(), &t1()).unwrap();
        let options = CheckoutOptions {
            method: PaymentMethod::Wallet,
            mixing: true,
        };
        let session = store.begin_checkout(options).unwrap();
        // floor(250 * 1.03) + 250 * 0.05 + 2.00
        let total = session.quote.grand_total();
        assert_eq!(total, Decimal::new(27_150, 2));
        store.confirm_payment_sent().unwrap();

        let _confirmed = store.next_event().await.unwrap();
        let placed = store.next_event().await.unwrap();
        assert!(matches!(placed, StorefrontEvent::OrderPlaced { .. }));
        assert_eq!(store.wallet().balance(), starting_balance() - total);
    }

    #[tokio::test(start_paused = true)]
    async fn wallet_checkout_rejected_when_short() {
        let mut store = storefront(ScriptedRandom::new([0.0]));
        let _line = store.add_to_cart(&p1(), &t1()).unwrap();
        let _withdrawal = store.withdraw(Decimal::new(240_000, 2)).unwrap();
        let options = CheckoutOptions {
            method: PaymentMethod::Wallet,
            mixing: false,
        };
        let err = store.begin_checkout(options).unwrap_err();
        assert!(matches!(err, StorefrontError::InsufficientFunds { .. }));
        assert!(store.checkout().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn wallet_rechecked_at_settlement() {
        let mut store = storefront(ScriptedRandom::new([0.0]));
        let _line = store.add_to_cart(&p1(), &t1()).unwrap();
        let options = CheckoutOptions {
            method: PaymentMethod::Wallet,
            mixing: false,
        };
        let _session = store.begin_checkout(options).unwrap();
        store.confirm_payment_sent().unwrap();
        let _spent = store.withdraw(Decimal::new(240_000, 2)).unwrap();

        let _confirmed = store.next_event().await.unwrap();
        let failed = store.next_event().await.unwrap();
        assert!(matches!(failed, StorefrontEvent::CheckoutFailed { .. }));
        assert!(store.orders().orders().is_empty());
        assert_eq!(store.cart().lines().len(), 1);
        assert_eq!(store.wallet().balance(), Decimal::new(10_050, 2));
    }

    #[tokio::test(start_paused = true)]
    async fn closing_checkout_revokes_timers() {
        let mut store = storefront(ScriptedRandom::new([0.0]));
        let _line = store.add_to_cart(&p1(), &t1()).unwrap();
        let _session = store.begin_checkout(CheckoutOptions::default()).unwrap();
        store.confirm_payment_sent().unwrap();
        store.close(View::Checkout);

        assert!(store.next_event().await.is_none());
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert!(store.drain_ready_events().is_empty());
        assert!(store.orders().orders().is_empty());
        assert!(matches!(
            store.confirm_payment_sent(),
            Err(StorefrontError::NoCheckoutSession)
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn unpaid_checkout_expires_and_can_restart() {
        let mut store = storefront(ScriptedRandom::new([0.0]));
        let _line = store.add_to_cart(&p1(), &t1()).unwrap();
        let _session = store.begin_checkout(CheckoutOptions::default()).unwrap();
        assert!(matches!(
            store.begin_checkout(CheckoutOptions::default()),
            Err(StorefrontError::CheckoutInProgress)
        ));
        let start = Instant::now();

        let expired = store.next_event().await.unwrap();
        assert!(matches!(
            expired,
            StorefrontEvent::PaymentPhaseChanged {
                phase: PaymentPhase::Expired,
                ..
            }
        ));
        assert_eq!(start.elapsed(), Duration::from_secs(900));
        assert!(store.begin_checkout(CheckoutOptions::default()).is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn empty_cart_cannot_check_out() {
        let mut store = storefront(ScriptedRandom::default());
        assert!(matches!(
            store.begin_checkout(CheckoutOptions::default()),
            Err(StorefrontError::EmptyCart)
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn winning_flip_pays_out() {
        let mut store = storefront(ScriptedRandom::coins([CoinSide::Heads]));
        let _id = store.flip(Decimal::from(100), CoinSide::Heads).unwrap();
        assert_eq!(store.wallet().balance(), starting_balance() - Decimal::from(100));
        let start = Instant::now();

        let Some(StorefrontEvent::FlipResolved(result)) = store.next_event().await else {
            panic!("expected a coinflip result");
        };
        assert_eq!(start.elapsed(), Duration::from_secs(2));
        assert!(result.won());
        assert_eq!(
            store.wallet().balance(),
            starting_balance() - Decimal::from(100) + Decimal::from(190)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn losing_flip_keeps_wager() {
        let mut store = storefront(ScriptedRandom::coins([CoinSide::Tails]));
        let _id = store.flip(Decimal::from(100), CoinSide::Heads).unwrap();
        let Some(StorefrontEvent::FlipResolved(result)) = store.next_event().await else {
            panic!("expected a coinflip result");
        };
        assert!(!result.won());
        assert_eq!(store.wallet().balance(), starting_balance() - Decimal::from(100));
    }

    #[tokio::test(start_paused = true)]
    async fn oversized_wager_leaves_balance_untouched() {
        let mut store = storefront(ScriptedRandom::default());
        let err = store.flip(Decimal::from(10_000), CoinSide::Tails).unwrap_err();
        assert!(matches!(err, StorefrontError::InsufficientFunds { .. }));
        assert_eq!(store.wallet().balance(), starting_balance());
        assert!(store.next_event().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn closing_coinflip_refunds_wager() {
        let mut store = storefront(ScriptedRandom::coins([CoinSide::Tails]));
        let _id = store.flip(Decimal::from(100), CoinSide::Heads).unwrap();
        store.close(View::Coinflip);
        assert_eq!(store.wallet().balance(), starting_balance());
        assert!(store.next_event().await.is_none());
        assert!(store.wallet().history().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn deposit_scan_credits_random_amount() {
        let mut store = storefront(ScriptedRandom::new([0.5]));
        assert!(store.scan_for_deposit());
        assert!(!store.scan_for_deposit());
        let Some(StorefrontEvent::DepositFound(tx)) = store.next_event().await else {
            panic!("expected a deposit");
        };
        assert_eq!(tx.amount, Decimal::from(300));
        assert!(!store.is_scanning_for_deposit());
        assert_eq!(store.wallet().balance(), starting_balance() + Decimal::from(300));
    }

    #[tokio::test(start_paused = true)]
    async fn closing_wallet_stops_scan() {
        let mut store = storefront(ScriptedRandom::new([0.5]));
        assert!(store.scan_for_deposit());
        store.close(View::Wallet);
        assert!(store.next_event().await.is_none());
        assert_eq!(store.wallet().balance(), starting_balance());
    }

    #[tokio::test(start_paused = true)]
    async fn withdrawal_completes_after_delay() {
        let mut store = storefront(ScriptedRandom::default());
        let id = store.withdraw(Decimal::from(500)).unwrap();
        assert_eq!(store.wallet().history()[0].status, TransactionStatus::Pending);
        let start = Instant::now();
        let event = store.next_event().await.unwrap();
        assert_eq!(event, StorefrontEvent::WithdrawalCompleted(id));
        assert_eq!(start.elapsed(), Duration::from_secs(10));
        assert_eq!(store.wallet().history()[0].status, TransactionStatus::Completed);
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_order_ignores_later_timers() {
        let mut store = storefront(ScriptedRandom::new([0.0]));
        let _line = store.add_to_cart(&p1(), &t1()).unwrap();
        let _session = store.begin_checkout(CheckoutOptions::default()).unwrap();
        store.confirm_payment_sent().unwrap();
        let _confirmed = store.next_event().await.unwrap();
        let Some(StorefrontEvent::OrderPlaced { order, .. }) = store.next_event().await else {
            panic!("expected order placement");
        };
        let cancelled = store.cancel_order(&order).unwrap();
        assert_eq!(cancelled.status, OrderStatus::Cancelled);
        assert!(store.next_event().await.is_none());
        assert_eq!(
            store.orders().get(&order).unwrap().status,
            OrderStatus::Cancelled
        );
    }

    #[test]
    fn only_admins_save_listings() {
        let mut store = storefront(ScriptedRandom::default());
        let mut edited = sample_product("p1");
        edited.name = "Renamed".to_owned();
        assert!(matches!(
            store.save_listing(edited.clone()),
            Err(StorefrontError::Unauthorized)
        ));
        let _admin = store.login("admin").unwrap();
        store.save_listing(edited).unwrap();
        assert_eq!(store.catalog().get(&p1()).unwrap().name, "Renamed");
        let _user = store.logout();
        assert!(store.current_user().is_none());
    }

    #[test]
    fn listings_apply_filter_and_sort() {
        let mut cheap = sample_product("cheap");
        cheap.tiers.truncate(1);
        cheap.tiers[0].price = 10;
        let store = StorefrontBuilder::new()
            .catalog(vec![sample_product("p1"), cheap])
            .random(ScriptedRandom::default())
            .build();
        let by_price = store.listings(&ProductFilter::new(), SortOrder::PriceLowToHigh);
        assert_eq!(by_price[0].id, ProductId::from("cheap"));
        let in_range =
            store.listings(&ProductFilter::new().price_range(300, 1_000), SortOrder::Catalog);
        assert_eq!(in_range.len(), 1);
    }

    #[test]
    fn raffle_entries_go_through_wallet() {
        let mut store = storefront(ScriptedRandom::default());
        assert_eq!(store.enter_raffle().unwrap(), RaffleEntry::Free);
        assert_eq!(
            store.enter_raffle().unwrap(),
            RaffleEntry::Paid(Decimal::from(5))
        );
        assert_eq!(store.wallet().balance(), starting_balance() - Decimal::from(5));
        assert_eq!(store.raffle().pot(), Decimal::from(5_005));
    }

    #[test]
    fn unknown_product_cannot_be_added() {
        let mut store = storefront(ScriptedRandom::default());
        assert!(matches!(
            store.add_to_cart(&ProductId::from("nope"), &t1()),
            Err(StorefrontError::ProductNotFound(_))
        ));
        assert!(store.toggle_wishlist(&p1()).unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn finished_orders_release_their_timer_scopes() {
        let mut store = storefront(ScriptedRandom::new([0.0]));
        for _ in 0..3 {
            let _line = store.add_to_cart(&p1(), &t1()).unwrap();
            let _session = store.begin_checkout(CheckoutOptions::default()).unwrap();
            store.confirm_payment_sent().unwrap();
            while store.next_event().await.is_some() {}
        }
        assert_eq!(store.orders().orders().len(), 3);
        assert!(
            store
                .orders()
                .orders()
                .iter()
                .all(|order| order.status == OrderStatus::Shipped)
        );
        assert_eq!(store.scheduler.pending_total(), 0);
        assert_eq!(store.scheduler.scope_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn timer_finished_before_polling_is_still_applied() {
        let mut config = StorefrontConfig::default();
        config.delays.coinflip_secs = 0;
        let mut store = StorefrontBuilder::new()
            .config(config)
            .catalog(vec![sample_product("p1")])
            .random(ScriptedRandom::new([0.0]))
            .build();
        let _flip = store.flip(Decimal::from(100), CoinSide::Heads).unwrap();
        while store.scheduler.pending_total() > 0 {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
        let Some(StorefrontEvent::FlipResolved(result)) = store.next_event().await else {
            panic!("expected the landed coin");
        };
        assert!(result.won());
        assert!(store.next_event().await.is_none());
    }

    #[test]
    fn overflowing_deposit_leaves_balance_untouched() {
        let mut store = storefront(ScriptedRandom::default());
        let err = store.deposit(Decimal::MAX).unwrap_err();
        assert!(matches!(err, StorefrontError::BalanceOverflow(_)));
        assert_eq!(store.wallet().balance(), starting_balance());
    }

    #[tokio::test(start_paused = true)]
    async fn vendor_replies_after_delay() {
        let mut store = storefront(ScriptedRandom::default());
        let vendor = Correspondent::Vendor("Alpha".to_owned());
        assert_eq!(store.open_thread(vendor.clone()).messages().len(), 1);
        let sent = store.send_message(vendor.clone(), "ship to Perth?").unwrap();
        let start = Instant::now();

        let Some(StorefrontEvent::ReplyReceived { with, message }) = store.next_event().await
        else {
            panic!("expected a reply");
        };
        assert_eq!(start.elapsed(), Duration::from_millis(1_500));
        assert_eq!(with, vendor);
        assert_eq!(message.text, crate::messaging::VENDOR_REPLY);
        let thread = store.thread(&vendor).unwrap();
        assert_eq!(thread.messages().len(), 3);
        assert_eq!(thread.messages()[1].id, sent);
        assert!(store.next_event().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn closing_messages_drops_pending_replies() {
        let mut store = storefront(ScriptedRandom::default());
        let _sent = store
            .send_message(Correspondent::Support, "lost parcel")
            .unwrap();
        store.close(View::Messages);
        assert!(store.next_event().await.is_none());
        let thread = store.thread(&Correspondent::Support).unwrap();
        assert_eq!(thread.messages().len(), 2);
        assert_eq!(thread.awaiting_replies(), 0);
        assert!(matches!(
            store.send_message(Correspondent::Support, ""),
            Err(StorefrontError::EmptyMessage)
        ));
    }

    #[test]
    fn display_currency_follows_config_and_setting() {
        let mut config = StorefrontConfig::default();
        config.session.currency = DisplayCurrency::Xmr;
        let mut store = StorefrontBuilder::new().config(config).build();
        assert_eq!(store.display_currency(), DisplayCurrency::Xmr);
        assert_eq!(store.price_label(Decimal::from(490)), "XMR 2.000");
        store.set_display_currency(DisplayCurrency::Aud);
        assert_eq!(store.price_label(Decimal::from(490)), "$490");
    }
}
