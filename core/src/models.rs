use anyhow::{Result, bail};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Per-100g nutrient values. Field names in persisted JSON and CSV
/// interchange use the canonical `*_100g` headers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Nutrients {
    #[serde(rename = "Calories_100g", default)]
    pub calories: f64,
    #[serde(rename = "Protein_100g", default)]
    pub protein: f64,
    #[serde(rename = "Fat_100g", default)]
    pub fat: f64,
    #[serde(rename = "Carbs_100g", default)]
    pub carbs: f64,
    #[serde(rename = "Fiber_100g", default)]
    pub fiber: f64,
}

/// A pantry product: current stock in grams plus per-100g nutrient values.
///
/// The `id` is generated at creation, stable for the product's lifetime, and
/// never written to interchange files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "Product")]
    pub name: String,
    #[serde(rename = "Quantity_g", default)]
    pub quantity_g: f64,
    #[serde(flatten)]
    pub nutrients: Nutrients,
}

#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub quantity_g: f64,
    pub nutrients: Nutrients,
}

/// One consumed item on a given date, with a nutrient snapshot captured at
/// commit time. The snapshot is never recomputed from current inventory;
/// only `quantity_g` grows when a same-day duplicate is merged.
///
/// Entries written before snapshotting existed lack the nutrient fields
/// (`None` here); `Store::migrate_history` backfills them once on load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Product")]
    pub product: String,
    #[serde(rename = "Quantity_g", default)]
    pub quantity_g: f64,
    #[serde(
        rename = "Calories_100g",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub calories_100g: Option<f64>,
    #[serde(
        rename = "Protein_100g",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub protein_100g: Option<f64>,
    #[serde(rename = "Fat_100g", default, skip_serializing_if = "Option::is_none")]
    pub fat_100g: Option<f64>,
    #[serde(rename = "Carbs_100g", default, skip_serializing_if = "Option::is_none")]
    pub carbs_100g: Option<f64>,
    #[serde(rename = "Fiber_100g", default, skip_serializing_if = "Option::is_none")]
    pub fiber_100g: Option<f64>,
}

impl HistoryEntry {
    /// Whether this entry carries a nutrient snapshot. Keyed off the calorie
    /// field, matching the legacy-data check used by migration.
    #[must_use]
    pub fn has_snapshot(&self) -> bool {
        self.calories_100g.is_some()
    }

    pub fn set_snapshot(&mut self, n: &Nutrients) {
        self.calories_100g = Some(n.calories);
        self.protein_100g = Some(n.protein);
        self.fat_100g = Some(n.fat);
        self.carbs_100g = Some(n.carbs);
        self.fiber_100g = Some(n.fiber);
    }

    #[must_use]
    pub fn nutrients(&self) -> Option<Nutrients> {
        self.calories_100g.map(|calories| Nutrients {
            calories,
            protein: self.protein_100g.unwrap_or(0.0),
            fat: self.fat_100g.unwrap_or(0.0),
            carbs: self.carbs_100g.unwrap_or(0.0),
            fiber: self.fiber_100g.unwrap_or(0.0),
        })
    }

    /// Exact numeric equality on all five snapshot fields, no tolerance.
    /// This is the merge criterion for same-day duplicates.
    #[must_use]
    pub fn snapshot_matches(&self, n: &Nutrients) -> bool {
        self.calories_100g == Some(n.calories)
            && self.protein_100g == Some(n.protein)
            && self.fat_100g == Some(n.fat)
            && self.carbs_100g == Some(n.carbs)
            && self.fiber_100g == Some(n.fiber)
    }
}

/// A planned consumption item in the basket. Never persisted.
///
/// `custom` distinguishes the two kinds: `Some` carries inline nutrient data
/// for an item not backed by inventory, `None` references a `Product` by id,
/// resolved against the store at read time.
#[derive(Debug, Clone)]
pub struct SelectionItem {
    pub product_id: String,
    pub display_name: String,
    pub quantity_g: f64,
    pub custom: Option<Nutrients>,
}

impl SelectionItem {
    #[must_use]
    pub fn is_custom(&self) -> bool {
        self.custom.is_some()
    }
}

/// Aggregate nutrient totals for a selection or a day.
///
/// `calories` is a whole number: each item's calorie contribution is rounded
/// to the nearest integer before summing. The other four fields are summed at
/// full precision and rounded to one decimal at the aggregate only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct NutrientTotals {
    pub calories: f64,
    pub protein: f64,
    pub fat: f64,
    pub carbs: f64,
    pub fiber: f64,
}

pub fn validate_product_name(name: &str) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        bail!("Product name must not be empty");
    }
    Ok(trimmed.to_string())
}

pub fn validate_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| anyhow::anyhow!("Invalid date '{s}'. Must be YYYY-MM-DD"))
}
