//! Order Lifecycle Simulator.
//!
//! Orders are created at [`OrderStatus::Pending`] and moved along
//! `Pending -> Processing -> Shipped` by two timers. `Delivered` is only
//! reached through [`OrderBook::mark_delivered`], and any non-terminal order
//! may be cancelled.

use core::fmt::Debug;
use core::hash::Hash;
use core::time::Duration;

use chrono::Utc;
use rust_decimal::Decimal;

use crate::error::{Result, StorefrontError};
use crate::models::{CartItem, Order, OrderId, OrderStatus};
use crate::scheduler::Scheduler;

/// Delays after order creation at which the automatic transitions fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LifecycleDelays {
    /// Delay until the order moves to `Processing`.
    pub processing: Duration,
    /// Delay until the order moves to `Shipped`.
    pub shipped: Duration,
}

impl Default for LifecycleDelays {
    #[inline]
    fn default() -> Self {
        Self {
            processing: Duration::from_secs(5),
            shipped: Duration::from_secs(15),
        }
    }
}

/// A timed request to move an order to a new status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderTransition {
    /// Order to move.
    pub order: OrderId,
    /// Target status.
    pub to: OrderStatus,
}

/// Placed orders, oldest first.
#[derive(Debug, Default, Clone)]
pub struct OrderBook {
    /// Orders in placement order.
    orders: Vec<Order>,
}

impl OrderBook {
    /// Creates an empty order book.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a new `Pending` order and returns its identifier.
    #[inline]
    pub fn place(&mut self, items: Vec<CartItem>, total: Decimal, tx_ref: String) -> OrderId {
        let order = Order {
            id: OrderId::generate(),
            created_at: Utc::now(),
            items,
            total,
            status: OrderStatus::Pending,
            tx_ref,
        };
        let id = order.id.clone();
        tracing::info!(order = %id, total = %order.total, units = order.unit_count(), "order placed");
        self.orders.push(order);
        id
    }

    /// Schedules the automatic `Processing` and `Shipped` transitions.
    #[inline]
    pub fn schedule_progress<K, E>(
        order: &OrderId,
        scheduler: &mut Scheduler<K, E>,
        scope: K,
        delays: LifecycleDelays,
    ) where
        K: Hash + Eq + Clone + Debug,
        E: From<OrderTransition> + Send + 'static,
    {
        let steps = [
            (delays.processing, OrderStatus::Processing),
            (delays.shipped, OrderStatus::Shipped),
        ];
        for (delay, to) in steps {
            let transition = OrderTransition {
                order: order.clone(),
                to,
            };
            scheduler.schedule(scope.clone(), delay, transition.into());
        }
    }

    /// Applies a timer-driven transition.
    ///
    /// Returns `Ok(false)` and leaves the order untouched when the order has
    /// already moved past the target status (a cancelled order, or one
    /// delivered early).
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::OrderNotFound`] for an unknown order.
    #[inline]
    pub fn apply(&mut self, transition: &OrderTransition) -> Result<bool> {
        let order = self.find_mut(&transition.order)?;
        if !order.status.can_become(transition.to) {
            tracing::warn!(
                order = %order.id,
                status = %order.status,
                target = %transition.to,
                "ignoring stale order transition"
            );
            return Ok(false);
        }
        Self::set_status(order, transition.to);
        Ok(true)
    }

    /// Moves an order forward to `to`.
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::OrderNotFound`] for an unknown order and
    /// [`StorefrontError::InvalidTransition`] if the move would regress or
    /// leave a terminal status.
    #[inline]
    pub fn advance(&mut self, id: &OrderId, to: OrderStatus) -> Result<&Order> {
        let order = self.find_mut(id)?;
        if !order.status.can_become(to) {
            return Err(StorefrontError::InvalidTransition {
                order: id.clone(),
                from: order.status,
                to,
            });
        }
        Self::set_status(order, to);
        Ok(&*order)
    }

    /// Marks an order as received by the buyer.
    ///
    /// # Errors
    ///
    /// See [`OrderBook::advance`].
    #[inline]
    pub fn mark_delivered(&mut self, id: &OrderId) -> Result<&Order> {
        self.advance(id, OrderStatus::Delivered)
    }

    /// Cancels a non-terminal order.
    ///
    /// # Errors
    ///
    /// See [`OrderBook::advance`].
    #[inline]
    pub fn cancel(&mut self, id: &OrderId) -> Result<&Order> {
        self.advance(id, OrderStatus::Cancelled)
    }

    /// Looks up an order.
    #[inline]
    #[must_use]
    pub fn get(&self, id: &OrderId) -> Option<&Order> {
        self.orders.iter().find(|order| order.id == *id)
    }

    /// All orders, oldest first.
    #[inline]
    #[must_use]
    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    /// Looks up an order for mutation.
    fn find_mut(&mut self, id: &OrderId) -> Result<&mut Order> {
        self.orders
            .iter_mut()
            .find(|order| order.id == *id)
            .ok_or_else(|| StorefrontError::OrderNotFound(id.clone()))
    }

    /// Writes the new status.
    fn set_status(order: &mut Order, to: OrderStatus) {
        tracing::debug!(order = %order.id, from = %order.status, to = %to, "order status changed");
        order.status = to;
    }
}
