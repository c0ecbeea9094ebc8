use anyhow::{Result, bail};
use serde::Serialize;

use larder_core::basket::Basket;
use larder_core::commit::{CommitSummary, commit};
use larder_core::models::{NutrientTotals, Nutrients, validate_product_name};
use larder_core::nutrients::format_totals;
use larder_core::store::Store;

use super::helpers::parse_date;

#[derive(Serialize)]
struct EatReport {
    date: String,
    summary: CommitSummary,
    totals: NutrientTotals,
    not_found: Vec<NotFound>,
}

#[derive(Serialize)]
struct NotFound {
    name: String,
    quantity_g: f64,
}

/// Log one or more `"name - quantity"` items against the inventory.
pub(crate) fn cmd_eat(
    store: &mut Store,
    items: &[String],
    date: Option<String>,
    json: bool,
) -> Result<()> {
    let date = parse_date(date)?.format("%Y-%m-%d").to_string();

    let mut basket = Basket::new();
    let text = items.join("\n");
    let plan = basket.import_plan(&text, store);

    for (name, quantity_g) in &plan.not_found {
        eprintln!("Not found in inventory: {name} ({quantity_g:.0}g)");
    }
    if basket.is_empty() {
        bail!("No items matched the inventory. Nothing logged");
    }

    let totals = basket.preview(store);
    let summary = commit(&mut basket, store, &date)?;

    if json {
        let report = EatReport {
            date,
            summary,
            totals,
            not_found: plan
                .not_found
                .into_iter()
                .map(|(name, quantity_g)| NotFound { name, quantity_g })
                .collect(),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let count = summary.total();
    println!("Logged {count} item(s) for {date}");
    println!("{}", format_totals(&totals, false, true));
    Ok(())
}

/// Log a single ad-hoc item with inline nutrient data.
#[allow(clippy::too_many_arguments)]
pub(crate) fn cmd_eat_custom(
    store: &mut Store,
    name: &str,
    quantity: f64,
    nutrients: Nutrients,
    date: Option<String>,
    json: bool,
) -> Result<()> {
    let name = validate_product_name(name)?;
    let date = parse_date(date)?.format("%Y-%m-%d").to_string();

    let mut basket = Basket::new();
    basket.add_custom(&name, quantity, nutrients);
    let totals = basket.preview(store);
    let summary = commit(&mut basket, store, &date)?;

    if json {
        let report = EatReport {
            date,
            summary,
            totals,
            not_found: Vec::new(),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Logged '{name} (Custom)' ({quantity:.0}g) for {date}");
    println!("{}", format_totals(&totals, false, true));
    Ok(())
}
