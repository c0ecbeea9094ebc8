//! The selection basket: planned consumption pending commit. In-memory
//! only, single session, never persisted.

use crate::models::{NutrientTotals, Nutrients, Product, SelectionItem};
use crate::nutrients;
use crate::store::Store;

pub const DEFAULT_QUANTITY_G: f64 = 100.0;

#[derive(Debug, Default)]
pub struct Basket {
    pub(crate) items: Vec<SelectionItem>,
    custom_counter: u64,
}

/// Outcome of a free-text plan import: how many lines matched inventory and
/// which names did not.
#[derive(Debug, Clone, Default)]
pub struct PlanImportSummary {
    pub added: usize,
    pub not_found: Vec<(String, f64)>,
}

impl Basket {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an inventory-backed item. A second add of the same product id
    /// merges into the existing entry's quantity.
    pub fn add_or_merge(&mut self, product: &Product, quantity_g: f64) {
        if let Some(existing) = self.items.iter_mut().find(|i| i.product_id == product.id) {
            existing.quantity_g += quantity_g;
        } else {
            self.items.push(SelectionItem {
                product_id: product.id.clone(),
                display_name: product.name.clone(),
                quantity_g,
                custom: None,
            });
        }
    }

    /// Add an ad-hoc item with inline nutrient data. Always appends, even
    /// when an identical name is already present. Ids take the form
    /// `custom_<n>`; the counter is never reused within a session.
    pub fn add_custom(&mut self, name: &str, quantity_g: f64, nutrients: Nutrients) {
        let id = format!("custom_{}", self.custom_counter);
        self.custom_counter += 1;
        self.items.push(SelectionItem {
            product_id: id,
            display_name: name.to_string(),
            quantity_g,
            custom: Some(nutrients),
        });
    }

    /// Set an item's quantity from raw user input. The leading integer part
    /// is taken; anything unparseable coerces to 0. Never errors.
    pub fn update_quantity(&mut self, index: usize, raw: &str) {
        if let Some(item) = self.items.get_mut(index) {
            item.quantity_g = coerce_quantity(raw);
        }
    }

    /// Remove by position. Indices shift after any mutation.
    pub fn remove(&mut self, index: usize) {
        if index < self.items.len() {
            self.items.remove(index);
        }
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    #[must_use]
    pub fn items(&self) -> &[SelectionItem] {
        &self.items
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Nutrient totals for the current selection, resolved against `store`.
    /// Items whose product has vanished contribute nothing.
    #[must_use]
    pub fn preview(&self, store: &Store) -> NutrientTotals {
        nutrients::accumulate(&self.items, |item| resolve_snapshot(item, store))
    }

    /// Parse free-text lines of the form `"<name> - <quantity>"` (hyphen,
    /// en dash, or em dash) and add matches against the inventory, merging
    /// by product id. Unmatched lines are reported, not errors.
    pub fn import_plan(&mut self, text: &str, store: &Store) -> PlanImportSummary {
        let mut summary = PlanImportSummary::default();
        for line in text.lines() {
            let Some((name, quantity_g)) = parse_plan_line(line) else {
                continue;
            };
            if let Some(product) = store.match_product(&name) {
                let product = product.clone();
                self.add_or_merge(&product, quantity_g);
                summary.added += 1;
            } else {
                summary.not_found.push((name, quantity_g));
            }
        }
        summary
    }
}

/// Resolve a basket item's per-100g source: custom data verbatim, otherwise
/// the current product by id. `None` when the product no longer exists.
#[must_use]
pub fn resolve_snapshot(item: &SelectionItem, store: &Store) -> Option<(Nutrients, f64)> {
    let nutrients = match &item.custom {
        Some(n) => n.clone(),
        None => store.product_by_id(&item.product_id)?.nutrients.clone(),
    };
    Some((nutrients, item.quantity_g))
}

/// `"Brown Rice – 150"` -> `("Brown Rice", 150.0)`. The first dash followed
/// by digits splits the line; the quantity is the leading integer after it.
fn parse_plan_line(line: &str) -> Option<(String, f64)> {
    for (i, c) in line.char_indices() {
        if matches!(c, '-' | '–' | '—') {
            let name = line[..i].trim();
            let rest = line[i + c.len_utf8()..].trim_start();
            let digits: String = rest.chars().take_while(char::is_ascii_digit).collect();
            if name.is_empty() || digits.is_empty() {
                continue;
            }
            if let Ok(quantity) = digits.parse::<f64>() {
                return Some((name.to_string(), quantity));
            }
        }
    }
    None
}

/// Leading numeric prefix truncated toward zero; invalid input is 0.
fn coerce_quantity(raw: &str) -> f64 {
    let s = raw.trim();
    let mut end = 0;
    let mut seen_dot = false;
    for (i, c) in s.char_indices() {
        match c {
            '0'..='9' => end = i + 1,
            '.' if !seen_dot => {
                seen_dot = true;
                end = i + 1;
            }
            '-' | '+' if i == 0 => end = 1,
            _ => break,
        }
    }
    s[..end].parse::<f64>().map_or(0.0, f64::trunc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewProduct;

    fn store_with_rice() -> Store {
        let mut store = Store::open_in_memory().unwrap();
        store
            .add_product(&NewProduct {
                name: "Brown Rice".to_string(),
                quantity_g: 1000.0,
                nutrients: Nutrients {
                    calories: 130.0,
                    protein: 2.7,
                    fat: 0.3,
                    carbs: 28.0,
                    fiber: 0.4,
                },
            })
            .unwrap();
        store
    }

    #[test]
    fn test_add_or_merge_same_product() {
        let store = store_with_rice();
        let rice = store.products()[0].clone();
        let mut basket = Basket::new();
        basket.add_or_merge(&rice, 100.0);
        basket.add_or_merge(&rice, 50.0);
        assert_eq!(basket.len(), 1);
        assert!((basket.items()[0].quantity_g - 150.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_add_custom_never_merges() {
        let mut basket = Basket::new();
        basket.add_custom("Protein Bar", 60.0, Nutrients::default());
        basket.add_custom("Protein Bar", 60.0, Nutrients::default());
        assert_eq!(basket.len(), 2);
        assert_eq!(basket.items()[0].product_id, "custom_0");
        assert_eq!(basket.items()[1].product_id, "custom_1");

        // Each removable independently by position; counter not reused
        basket.remove(0);
        assert_eq!(basket.len(), 1);
        basket.add_custom("Another", 30.0, Nutrients::default());
        assert_eq!(basket.items()[1].product_id, "custom_2");
    }

    #[test]
    fn test_update_quantity_coercion() {
        let mut basket = Basket::new();
        basket.add_custom("X", 100.0, Nutrients::default());
        basket.update_quantity(0, "150");
        assert!((basket.items()[0].quantity_g - 150.0).abs() < f64::EPSILON);
        basket.update_quantity(0, "12.7");
        assert!((basket.items()[0].quantity_g - 12.0).abs() < f64::EPSILON);
        basket.update_quantity(0, "12abc");
        assert!((basket.items()[0].quantity_g - 12.0).abs() < f64::EPSILON);
        basket.update_quantity(0, "abc");
        assert!(basket.items()[0].quantity_g.abs() < f64::EPSILON);
        basket.update_quantity(0, "");
        assert!(basket.items()[0].quantity_g.abs() < f64::EPSILON);
        // Out-of-range index is a no-op
        basket.update_quantity(5, "100");
    }

    #[test]
    fn test_remove_and_clear() {
        let mut basket = Basket::new();
        basket.add_custom("A", 10.0, Nutrients::default());
        basket.add_custom("B", 20.0, Nutrients::default());
        basket.remove(0);
        assert_eq!(basket.len(), 1);
        assert_eq!(basket.items()[0].display_name, "B");
        basket.remove(9);
        assert_eq!(basket.len(), 1);
        basket.clear();
        assert!(basket.is_empty());
    }

    #[test]
    fn test_preview_skips_missing_products() {
        let store = store_with_rice();
        let rice = store.products()[0].clone();
        let mut basket = Basket::new();
        basket.add_or_merge(&rice, 150.0);
        // A reference to a product that no longer exists
        basket.items.push(SelectionItem {
            product_id: "gone".to_string(),
            display_name: "Gone".to_string(),
            quantity_g: 500.0,
            custom: None,
        });

        let totals = basket.preview(&store);
        assert!((totals.calories - 195.0).abs() < f64::EPSILON);
        assert!((totals.protein - 4.1).abs() < f64::EPSILON);
    }

    #[test]
    fn test_parse_plan_line_dash_variants() {
        assert_eq!(
            parse_plan_line("Brown Rice - 150"),
            Some(("Brown Rice".to_string(), 150.0))
        );
        assert_eq!(
            parse_plan_line("Brown Rice – 150g"),
            Some(("Brown Rice".to_string(), 150.0))
        );
        assert_eq!(
            parse_plan_line("Brown Rice—200"),
            Some(("Brown Rice".to_string(), 200.0))
        );
        assert_eq!(parse_plan_line("no quantity here"), None);
        assert_eq!(parse_plan_line("- 150"), None);
        assert_eq!(parse_plan_line(""), None);
    }

    #[test]
    fn test_parse_plan_line_hyphenated_name() {
        // First dash not followed by digits is part of the name
        assert_eq!(
            parse_plan_line("Semi-skimmed Milk - 250"),
            Some(("Semi-skimmed Milk".to_string(), 250.0))
        );
    }

    #[test]
    fn test_import_plan_matches_and_reports() {
        let store = store_with_rice();
        let mut basket = Basket::new();
        let summary = basket.import_plan("rice - 150\nUnknown Thing - 80\n\njunk line", &store);
        assert_eq!(summary.added, 1);
        assert_eq!(summary.not_found, vec![("Unknown Thing".to_string(), 80.0)]);
        assert_eq!(basket.len(), 1);
        assert_eq!(basket.items()[0].display_name, "Brown Rice");
    }

    #[test]
    fn test_import_plan_substring_both_directions() {
        let store = store_with_rice();
        let mut basket = Basket::new();
        // Plan name contains the product name
        let summary = basket.import_plan("organic brown rice bowl - 100", &store);
        assert_eq!(summary.added, 1);
        // Product name contains the plan name
        let summary = basket.import_plan("BROWN - 100", &store);
        assert_eq!(summary.added, 1);
        // Both merged into the single inventory product
        assert_eq!(basket.len(), 1);
        assert!((basket.items()[0].quantity_g - 200.0).abs() < f64::EPSILON);
    }
}
