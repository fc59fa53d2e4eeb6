//! # Order Registry
//!
//! Every open order on the terminal, with at most one being edited.
//!
//! ## State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │    new() ──────────► Editing(order 1)                                   │
//! │                                                                         │
//! │    Editing(a) ── create_order() ──────────► Editing(b)   a is held      │
//! │    Editing(a) ── select_held(b) ──────────► Editing(b)   a is held      │
//! │    Editing(a) ── hold_current() ──────────► NoCurrentOrder              │
//! │    NoCurrentOrder ── create_order() ──────► Editing(b)                  │
//! │    Editing(a) ── clear(a) ────────────────► Editing(replacement)        │
//! │    Editing(a) ── checkout_success(a) ─────► Editing(replacement)        │
//! │                                                                         │
//! │    Removing a held order leaves the current one alone.                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;

use crate::error::{CoreError, CoreResult};
use crate::order::{OrderId, OrderState};
use crate::validation::validate_reference;
use crate::WALK_IN_CUSTOMER;

/// Where the registry currently stands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "order_id")]
pub enum RegistryState {
    NoCurrentOrder,
    Editing(OrderId),
}

/// All open orders, in creation order.
#[derive(Debug, Clone)]
pub struct OrderRegistry {
    orders: Vec<OrderState>,
    current: Option<OrderId>,
    next_sequence: u64,
    default_customer: String,
}

impl Default for OrderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl OrderRegistry {
    /// Creates a registry holding one empty current order.
    pub fn new() -> Self {
        Self::start(WALK_IN_CUSTOMER.to_string())
    }

    /// Like [`OrderRegistry::new`], but every order opens for `customer_id`.
    pub fn with_default_customer(customer_id: &str) -> CoreResult<Self> {
        Ok(Self::start(validate_reference("customer", customer_id)?))
    }

    fn start(default_customer: String) -> Self {
        let mut registry = OrderRegistry {
            orders: Vec::new(),
            current: None,
            next_sequence: 1,
            default_customer,
        };
        registry.create_order();
        registry
    }

    /// Opens a fresh order and makes it current. The previous current order,
    /// if any, stays in the registry as a held order.
    pub fn create_order(&mut self) -> OrderId {
        let order = OrderState::for_customer(self.next_sequence, self.default_customer.clone());
        self.next_sequence += 1;

        let id = order.id().clone();
        self.orders.push(order);
        self.current = Some(id.clone());
        id
    }

    /// Resumes a held order.
    pub fn select_held(&mut self, id: &OrderId) -> CoreResult<()> {
        if self.current.as_ref() == Some(id) {
            return Err(CoreError::AlreadyCurrent(id.to_string()));
        }
        if self.get(id).is_none() {
            return Err(CoreError::OrderNotFound(id.to_string()));
        }

        self.current = Some(id.clone());
        Ok(())
    }

    /// Parks the current order, leaving no current order.
    pub fn hold_current(&mut self) -> CoreResult<OrderId> {
        let id = self.current.take().ok_or(CoreError::NoCurrentOrder)?;
        Ok(id)
    }

    /// Parks the current order and opens a new one in its place.
    ///
    /// Returns the id of the new current order.
    pub fn hold_and_start_new(&mut self) -> CoreResult<OrderId> {
        self.hold_current()?;
        Ok(self.create_order())
    }

    /// Discards an order. A replacement becomes current if the registry
    /// would otherwise have none.
    pub fn clear(&mut self, id: &OrderId) -> CoreResult<OrderState> {
        self.remove(id)
    }

    /// Drops an order once its invoice has been accepted by the backend.
    pub fn checkout_success(&mut self, id: &OrderId) -> CoreResult<OrderState> {
        self.remove(id)
    }

    fn remove(&mut self, id: &OrderId) -> CoreResult<OrderState> {
        let index = self
            .orders
            .iter()
            .position(|o| o.id() == id)
            .ok_or_else(|| CoreError::OrderNotFound(id.to_string()))?;

        let removed = self.orders.remove(index);
        if self.current.as_ref() == Some(id) {
            self.current = None;
        }
        if self.current.is_none() {
            self.create_order();
        }
        Ok(removed)
    }

    pub fn state(&self) -> RegistryState {
        match &self.current {
            Some(id) => RegistryState::Editing(id.clone()),
            None => RegistryState::NoCurrentOrder,
        }
    }

    pub fn current_id(&self) -> Option<&OrderId> {
        self.current.as_ref()
    }

    pub fn current(&self) -> CoreResult<&OrderState> {
        let id = self.current.as_ref().ok_or(CoreError::NoCurrentOrder)?;
        self.orders
            .iter()
            .find(|o| o.id() == id)
            .ok_or(CoreError::NoCurrentOrder)
    }

    pub fn current_mut(&mut self) -> CoreResult<&mut OrderState> {
        let id = self.current.as_ref().ok_or(CoreError::NoCurrentOrder)?;
        self.orders
            .iter_mut()
            .find(|o| o.id() == id)
            .ok_or(CoreError::NoCurrentOrder)
    }

    pub fn get(&self, id: &OrderId) -> Option<&OrderState> {
        self.orders.iter().find(|o| o.id() == id)
    }

    /// Looks an order up by the number in its display name.
    pub fn find_by_sequence(&self, sequence: u64) -> Option<&OrderState> {
        self.orders.iter().find(|o| o.sequence() == sequence)
    }

    /// Every order except the current one, in creation order.
    pub fn held_orders(&self) -> Vec<&OrderState> {
        self.orders
            .iter()
            .filter(|o| self.current.as_ref() != Some(o.id()))
            .collect()
    }

    pub fn orders(&self) -> &[OrderState] {
        &self.orders
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;
    use crate::types::{ProductVariant, StockBatch};

    fn add_tea(registry: &mut OrderRegistry, qty: i64) {
        let tea = ProductVariant::new("P1", "V1", "TEA-100", "Tea", Money::from_cents(1000));
        registry
            .current_mut()
            .unwrap()
            .add_item(&tea, qty, Money::zero(), &StockBatch::new("P1", "V1", "B-01", 10))
            .unwrap();
    }

    #[test]
    fn test_new_registry_has_one_current_order() {
        let registry = OrderRegistry::new();

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.current().unwrap().name(), "Order 1");
        assert!(registry.held_orders().is_empty());
        assert!(matches!(registry.state(), RegistryState::Editing(_)));
    }

    #[test]
    fn test_create_order_holds_previous() {
        let mut registry = OrderRegistry::new();
        let first = registry.current_id().unwrap().clone();
        add_tea(&mut registry, 2);

        let second = registry.create_order();

        assert_ne!(first, second);
        assert_eq!(registry.current().unwrap().name(), "Order 2");
        let held = registry.held_orders();
        assert_eq!(held.len(), 1);
        assert_eq!(held[0].id(), &first);
        assert_eq!(held[0].total_quantity(), 2);
    }

    #[test]
    fn test_hold_then_resume_round_trips_lines() {
        let mut registry = OrderRegistry::new();
        let first = registry.current_id().unwrap().clone();
        add_tea(&mut registry, 3);
        let snapshot = registry.current().unwrap().clone();

        registry.hold_and_start_new().unwrap();
        assert_ne!(registry.current_id(), Some(&first));

        registry.select_held(&first).unwrap();
        assert_eq!(registry.current().unwrap(), &snapshot);
    }

    #[test]
    fn test_hold_current_leaves_no_current_order() {
        let mut registry = OrderRegistry::new();
        registry.hold_current().unwrap();

        assert_eq!(registry.state(), RegistryState::NoCurrentOrder);
        assert!(matches!(registry.current(), Err(CoreError::NoCurrentOrder)));
        assert!(matches!(registry.current_mut(), Err(CoreError::NoCurrentOrder)));
        assert!(matches!(registry.hold_current(), Err(CoreError::NoCurrentOrder)));
        assert_eq!(registry.held_orders().len(), 1);
    }

    #[test]
    fn test_select_errors() {
        let mut registry = OrderRegistry::new();
        let current = registry.current_id().unwrap().clone();

        assert!(matches!(
            registry.select_held(&current),
            Err(CoreError::AlreadyCurrent(_))
        ));
        assert!(matches!(
            registry.select_held(&OrderId::from("missing")),
            Err(CoreError::OrderNotFound(_))
        ));
    }

    #[test]
    fn test_clear_current_creates_replacement() {
        let mut registry = OrderRegistry::new();
        let first = registry.current_id().unwrap().clone();
        add_tea(&mut registry, 1);

        let removed = registry.clear(&first).unwrap();

        assert_eq!(removed.id(), &first);
        assert_eq!(registry.len(), 1);
        let replacement = registry.current().unwrap();
        assert_ne!(replacement.id(), &first);
        assert!(replacement.is_empty());
        assert_eq!(replacement.name(), "Order 2");
    }

    #[test]
    fn test_clear_held_keeps_current() {
        let mut registry = OrderRegistry::new();
        let first = registry.current_id().unwrap().clone();
        let second = registry.create_order();

        registry.clear(&first).unwrap();

        assert_eq!(registry.current_id(), Some(&second));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_clear_while_parked_creates_current() {
        let mut registry = OrderRegistry::new();
        let first = registry.hold_current().unwrap();

        registry.clear(&first).unwrap();

        assert!(registry.current().is_ok());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_checkout_success_removes_order() {
        let mut registry = OrderRegistry::new();
        let first = registry.current_id().unwrap().clone();
        let second = registry.create_order();
        registry.select_held(&first).unwrap();

        registry.checkout_success(&first).unwrap();

        assert!(registry.get(&first).is_none());
        assert!(registry.get(&second).is_some());
        assert_eq!(registry.len(), 2);
        assert!(matches!(
            registry.checkout_success(&first),
            Err(CoreError::OrderNotFound(_))
        ));
    }

    #[test]
    fn test_default_customer_applies_to_every_order() {
        let mut registry = OrderRegistry::with_default_customer("C-100").unwrap();
        registry.create_order();

        assert!(registry.orders().iter().all(|o| o.customer_id() == "C-100"));
        assert!(OrderRegistry::with_default_customer(" ").is_err());
    }

    #[test]
    fn test_sequence_is_per_registry() {
        let mut a = OrderRegistry::new();
        a.create_order();
        let b = OrderRegistry::new();

        assert_eq!(a.current().unwrap().name(), "Order 2");
        assert_eq!(b.current().unwrap().name(), "Order 1");
        assert!(a.find_by_sequence(1).is_some());
        assert!(a.find_by_sequence(3).is_none());
    }
}
