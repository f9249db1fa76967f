//! The shopping bag.
//!
//! A bag is an ordered list of [`CartLine`]s keyed by `(product_id, size)`.
//! Adding a product that is already in the bag in the same size merges into
//! the existing line; a different size is a separate line.
//!
//! # Invariants
//!
//! - Every line has `quantity >= 1`. A mutation that would take a line to zero
//!   or below removes it instead.
//! - At most one line exists per `(product_id, size)`.
//! - Line order is insertion order and survives persistence.
//!
//! Sizes are not validated against the product's size set and there is no
//! upper bound on quantity; stock is checked by the backend at checkout.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::ProductId;

/// Product snapshot captured when it is put in the bag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BagItem {
    pub product_id: ProductId,
    pub size: String,
    pub unit_price: Decimal,
    pub display_name: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub style_code: Option<String>,
}

/// One line of the bag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub product_id: ProductId,
    pub size: String,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub display_name: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub style_code: Option<String>,
}

impl CartLine {
    fn from_item(item: BagItem, quantity: u32) -> Self {
        Self {
            product_id: item.product_id,
            size: item.size,
            quantity,
            unit_price: item.unit_price,
            display_name: item.display_name,
            image_url: item.image_url,
            style_code: item.style_code,
        }
    }

    /// Whether this line is identified by `(product_id, size)`.
    #[must_use]
    pub fn matches(&self, product_id: ProductId, size: &str) -> bool {
        self.product_id == product_id && self.size == size
    }

    /// `unit_price * quantity`.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// Mutations accepted by [`Bag::apply`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BagAction {
    Add { item: BagItem, quantity: u32 },
    Remove { product_id: ProductId, size: String },
    UpdateQuantity {
        product_id: ProductId,
        size: String,
        quantity: i64,
    },
    Clear,
}

/// The shopping bag.
///
/// Serializes as a bare JSON array of lines. Deserializing goes through
/// [`Bag::from_lines`], so a hand-edited or stale payload cannot break the
/// invariants.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<CartLine>", into = "Vec<CartLine>")]
pub struct Bag {
    lines: Vec<CartLine>,
}

impl From<Vec<CartLine>> for Bag {
    fn from(lines: Vec<CartLine>) -> Self {
        Self::from_lines(lines)
    }
}

impl From<Bag> for Vec<CartLine> {
    fn from(bag: Bag) -> Self {
        bag.lines
    }
}

impl Bag {
    /// An empty bag.
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// Build a bag from previously persisted lines.
    ///
    /// Lines with a zero quantity are dropped and duplicate keys are merged
    /// into the first occurrence, so the result always satisfies the bag
    /// invariants. A list that already satisfies them is kept as is.
    #[must_use]
    pub fn from_lines(lines: Vec<CartLine>) -> Self {
        let mut bag = Self::new();
        for line in lines {
            if line.quantity == 0 {
                continue;
            }
            match bag.position(line.product_id, &line.size) {
                Some(index) => {
                    if let Some(existing) = bag.lines.get_mut(index) {
                        existing.quantity = existing.quantity.saturating_add(line.quantity);
                    }
                }
                None => bag.lines.push(line),
            }
        }
        bag
    }

    /// Lines in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Whether the bag has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Look up the line for `(product_id, size)`.
    #[must_use]
    pub fn find(&self, product_id: ProductId, size: &str) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.matches(product_id, size))
    }

    fn position(&self, product_id: ProductId, size: &str) -> Option<usize> {
        self.lines
            .iter()
            .position(|line| line.matches(product_id, size))
    }

    /// Add `quantity` of `item`, merging into an existing line of the same
    /// product and size.
    ///
    /// A quantity of zero leaves the bag untouched.
    pub fn add_item(&mut self, item: BagItem, quantity: u32) {
        if quantity == 0 {
            return;
        }
        match self.lines.iter_mut().find(|line| line.matches(item.product_id, &item.size)) {
            Some(line) => line.quantity = line.quantity.saturating_add(quantity),
            None => self.lines.push(CartLine::from_item(item, quantity)),
        }
    }

    /// Remove the line for `(product_id, size)`. Missing lines are ignored.
    pub fn remove_item(&mut self, product_id: ProductId, size: &str) {
        self.lines.retain(|line| !line.matches(product_id, size));
    }

    /// Overwrite the quantity of a line.
    ///
    /// A quantity of zero or less removes the line. Missing lines are ignored.
    pub fn update_quantity(&mut self, product_id: ProductId, size: &str, quantity: i64) {
        let Ok(quantity) = u32::try_from(quantity.max(0)) else {
            // Larger than u32::MAX; clamp rather than drop the line.
            if let Some(line) = self.lines.iter_mut().find(|l| l.matches(product_id, size)) {
                line.quantity = u32::MAX;
            }
            return;
        };
        if quantity == 0 {
            self.remove_item(product_id, size);
            return;
        }
        if let Some(line) = self.lines.iter_mut().find(|l| l.matches(product_id, size)) {
            line.quantity = quantity;
        }
    }

    /// Remove every line.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Sum of all line quantities.
    #[must_use]
    pub fn total_items(&self) -> u64 {
        self.lines.iter().map(|line| u64::from(line.quantity)).sum()
    }

    /// Sum of `unit_price * quantity` over all lines, undiscounted.
    #[must_use]
    pub fn total_price(&self) -> Decimal {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    /// Apply a reducer action.
    pub fn apply(&mut self, action: BagAction) {
        match action {
            BagAction::Add { item, quantity } => self.add_item(item, quantity),
            BagAction::Remove { product_id, size } => self.remove_item(product_id, &size),
            BagAction::UpdateQuantity {
                product_id,
                size,
                quantity,
            } => self.update_quantity(product_id, &size, quantity),
            BagAction::Clear => self.clear(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn item(id: i64, size: &str, price: i64) -> BagItem {
        BagItem {
            product_id: ProductId::new(id),
            size: size.to_string(),
            unit_price: Decimal::from(price),
            display_name: format!("Product {id}"),
            image_url: None,
            style_code: Some(format!("STY-{id}")),
        }
    }

    #[test]
    fn test_repeated_adds_sum_quantities() {
        let mut bag = Bag::new();
        let quantities = [1, 4, 2, 7];
        for q in quantities {
            bag.add_item(item(1, "M", 100), q);
        }
        assert_eq!(bag.lines().len(), 1);
        assert_eq!(bag.lines()[0].quantity, quantities.iter().sum::<u32>());
    }

    #[test]
    fn test_same_product_different_size_is_distinct() {
        let mut bag = Bag::new();
        bag.add_item(item(1, "M", 100), 2);
        bag.add_item(item(1, "L", 100), 1);
        assert_eq!(bag.lines().len(), 2);
        assert_eq!(bag.find(ProductId::new(1), "M").unwrap().quantity, 2);
        assert_eq!(bag.find(ProductId::new(1), "L").unwrap().quantity, 1);
    }

    #[test]
    fn test_add_zero_is_noop() {
        let mut bag = Bag::new();
        bag.add_item(item(1, "M", 100), 0);
        assert!(bag.is_empty());
    }

    #[test]
    fn test_unknown_size_is_accepted() {
        let mut bag = Bag::new();
        bag.add_item(item(3, "XXXL-custom", 50), 1);
        assert_eq!(bag.lines()[0].size, "XXXL-custom");
    }

    #[test]
    fn test_update_quantity_zero_removes_line() {
        let mut bag = Bag::new();
        bag.add_item(item(1, "M", 100), 3);
        bag.add_item(item(2, "S", 40), 1);
        bag.update_quantity(ProductId::new(1), "M", 0);
        assert!(bag.find(ProductId::new(1), "M").is_none());
        assert_eq!(bag.total_items(), 1);
    }

    #[test]
    fn test_update_quantity_negative_removes_line() {
        let mut bag = Bag::new();
        bag.add_item(item(1, "M", 100), 3);
        bag.update_quantity(ProductId::new(1), "M", -2);
        assert!(bag.is_empty());
    }

    #[test]
    fn test_update_quantity_overwrites() {
        let mut bag = Bag::new();
        bag.add_item(item(1, "M", 100), 3);
        bag.update_quantity(ProductId::new(1), "M", 5);
        assert_eq!(bag.lines()[0].quantity, 5);
    }

    #[test]
    fn test_update_quantity_missing_line_is_noop() {
        let mut bag = Bag::new();
        bag.add_item(item(1, "M", 100), 1);
        let before = bag.clone();
        bag.update_quantity(ProductId::new(9), "M", 4);
        assert_eq!(bag, before);
    }

    #[test]
    fn test_remove_missing_line_is_idempotent() {
        let mut bag = Bag::new();
        bag.add_item(item(1, "M", 100), 1);
        bag.add_item(item(2, "L", 80), 2);
        let before = bag.clone();
        bag.remove_item(ProductId::new(1), "XS");
        bag.remove_item(ProductId::new(7), "M");
        assert_eq!(bag, before);
    }

    #[test]
    fn test_total_price_is_linear_in_quantity() {
        let mut bag = Bag::new();
        bag.add_item(item(1, "M", 100), 1);
        bag.add_item(item(2, "L", 35), 3);
        bag.add_item(item(3, "S", 12), 2);
        let base = bag.total_price();

        let k: u32 = 4;
        let mut scaled = bag.clone();
        let lines: Vec<_> = scaled.lines().to_vec();
        for line in lines {
            scaled.update_quantity(line.product_id, &line.size, i64::from(line.quantity * k));
        }
        assert_eq!(scaled.total_price(), base * Decimal::from(k));
    }

    #[test]
    fn test_example_scenario() {
        let mut bag = Bag::new();
        bag.add_item(item(1, "M", 100), 1);
        assert_eq!(bag.total_items(), 1);
        assert_eq!(bag.total_price(), Decimal::from(100));

        bag.add_item(item(1, "M", 100), 2);
        assert_eq!(bag.total_items(), 3);
        assert_eq!(bag.total_price(), Decimal::from(300));

        bag.update_quantity(ProductId::new(1), "M", 0);
        assert!(bag.is_empty());
        assert_eq!(bag.total_price(), Decimal::ZERO);
    }

    #[test]
    fn test_apply_matches_direct_calls() {
        let mut via_actions = Bag::new();
        via_actions.apply(BagAction::Add {
            item: item(1, "M", 100),
            quantity: 2,
        });
        via_actions.apply(BagAction::Add {
            item: item(2, "S", 20),
            quantity: 1,
        });
        via_actions.apply(BagAction::UpdateQuantity {
            product_id: ProductId::new(1),
            size: "M".to_string(),
            quantity: 6,
        });
        via_actions.apply(BagAction::Remove {
            product_id: ProductId::new(2),
            size: "S".to_string(),
        });

        let mut direct = Bag::new();
        direct.add_item(item(1, "M", 100), 2);
        direct.add_item(item(2, "S", 20), 1);
        direct.update_quantity(ProductId::new(1), "M", 6);
        direct.remove_item(ProductId::new(2), "S");

        assert_eq!(via_actions, direct);

        via_actions.apply(BagAction::Clear);
        assert!(via_actions.is_empty());
    }

    #[test]
    fn test_serde_round_trip_preserves_order_and_values() {
        let mut bag = Bag::new();
        bag.add_item(item(5, "L", 250), 1);
        bag.add_item(item(1, "M", 100), 2);
        bag.add_item(item(5, "S", 250), 3);

        let json = serde_json::to_string(&bag).unwrap();
        let restored: Bag = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, bag);
        assert_eq!(restored.lines()[0].product_id, ProductId::new(5));
        assert_eq!(restored.lines()[2].size, "S");
    }

    #[test]
    fn test_wire_format_is_camel_case() {
        let mut bag = Bag::new();
        bag.add_item(item(1, "M", 100), 1);
        let value = serde_json::to_value(&bag).unwrap();
        assert_eq!(value[0]["productId"], 1);
        assert_eq!(value[0]["unitPrice"], "100");
        assert_eq!(value[0]["styleCode"], "STY-1");
    }

    #[test]
    fn test_from_lines_repairs_invariants() {
        let line = |id: i64, size: &str, quantity: u32| CartLine {
            quantity,
            ..CartLine::from_item(item(id, size, 10), 1)
        };
        let bag = Bag::from_lines(vec![line(1, "M", 2), line(2, "S", 0), line(1, "M", 3)]);
        assert_eq!(bag.lines().len(), 1);
        assert_eq!(bag.lines()[0].quantity, 5);
    }
}
