//! Pure nutrient arithmetic: per-item contributions, aggregate totals,
//! macro percentages, and the canonical display string.

use serde::Serialize;

use crate::models::{NutrientTotals, Nutrients};

/// Contribution of `quantity_g` grams given a per-100g value.
#[must_use]
pub fn per_item_contribution(per_100g: f64, quantity_g: f64) -> f64 {
    per_100g * quantity_g / 100.0
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

/// Sum nutrient totals over `items`.
///
/// The resolver maps each item to its per-100g source and quantity; `None`
/// means the item is unresolvable and contributes nothing (no error).
///
/// Rounding is deliberately asymmetric and must stay that way for output
/// parity with stored history: each item's calorie contribution is rounded
/// to the nearest integer before summing, while protein/fat/carbs/fiber are
/// summed unrounded and the totals rounded to one decimal at the end.
pub fn accumulate<T>(
    items: &[T],
    mut resolve: impl FnMut(&T) -> Option<(Nutrients, f64)>,
) -> NutrientTotals {
    let mut totals = NutrientTotals::default();
    for item in items {
        let Some((n, quantity_g)) = resolve(item) else {
            continue;
        };
        totals.calories += per_item_contribution(n.calories, quantity_g).round();
        totals.protein += per_item_contribution(n.protein, quantity_g);
        totals.fat += per_item_contribution(n.fat, quantity_g);
        totals.carbs += per_item_contribution(n.carbs, quantity_g);
        totals.fiber += per_item_contribution(n.fiber, quantity_g);
    }
    totals.protein = round1(totals.protein);
    totals.fat = round1(totals.fat);
    totals.carbs = round1(totals.carbs);
    totals.fiber = round1(totals.fiber);
    totals
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MacroPercentages {
    pub protein: i64,
    pub fat: i64,
    pub carbs: i64,
}

/// Share of calories supplied by each macro (protein and carbs at 4 kcal/g,
/// fat at 9 kcal/g), rounded to integers. All zero when the macro-calorie
/// sum is zero, never NaN.
#[must_use]
pub fn macro_percentages(totals: &NutrientTotals) -> MacroPercentages {
    let protein_cal = totals.protein * 4.0;
    let fat_cal = totals.fat * 9.0;
    let carb_cal = totals.carbs * 4.0;
    let macro_cal = protein_cal + fat_cal + carb_cal;

    if macro_cal <= 0.0 {
        return MacroPercentages::default();
    }
    MacroPercentages {
        protein: (protein_cal / macro_cal * 100.0).round() as i64,
        fat: (fat_cal / macro_cal * 100.0).round() as i64,
        carbs: (carb_cal / macro_cal * 100.0).round() as i64,
    }
}

/// Canonical display string:
/// `"<cal> kcal | <p>g protein | <f>g fat | <c>g carbs | <fb>g fiber"`,
/// integer-rounded when `whole_numbers`, with a `" | P:x% F:y% C:z%"` tail
/// when `include_percentages` and at least one macro is nonzero.
#[must_use]
pub fn format_totals(
    totals: &NutrientTotals,
    whole_numbers: bool,
    include_percentages: bool,
) -> String {
    let (cal, p, f, c, fb) = if whole_numbers {
        (
            totals.calories.round(),
            totals.protein.round(),
            totals.fat.round(),
            totals.carbs.round(),
            totals.fiber.round(),
        )
    } else {
        (
            totals.calories,
            totals.protein,
            totals.fat,
            totals.carbs,
            totals.fiber,
        )
    };
    let mut result = format!("{cal} kcal | {p}g protein | {f}g fat | {c}g carbs | {fb}g fiber");

    if include_percentages && (totals.protein > 0.0 || totals.fat > 0.0 || totals.carbs > 0.0) {
        let pct = macro_percentages(totals);
        let (p, f, c) = (pct.protein, pct.fat, pct.carbs);
        result.push_str(&format!(" | P:{p}% F:{f}% C:{c}%"));
    }

    result
}
