use anyhow::{Context, Result};
use std::process;

use larder_core::models::{NewProduct, Nutrients, validate_product_name};
use larder_core::store::Store;

use super::helpers::{print_product_table, resolve_id, short_id, sort_products};

pub(crate) fn cmd_food_add(
    store: &mut Store,
    name: &str,
    quantity: f64,
    nutrients: Nutrients,
    json: bool,
) -> Result<()> {
    let name = validate_product_name(name)?;
    let product = store.add_product(&NewProduct {
        name,
        quantity_g: quantity,
        nutrients,
    })?;

    if json {
        println!("{}", serde_json::to_string_pretty(&product)?);
        return Ok(());
    }

    let name = &product.name;
    let quantity = product.quantity_g;
    let calories = product.nutrients.calories;
    println!("Added '{name}': {quantity:.0}g in stock, {calories:.0} kcal/100g");
    Ok(())
}

pub(crate) fn cmd_food_list(store: &Store, search: Option<&str>, json: bool) -> Result<()> {
    let mut products = match search {
        Some(term) => store.search_products(term),
        None => store.products().iter().collect(),
    };
    sort_products(&mut products);

    if json {
        println!("{}", serde_json::to_string_pretty(&products)?);
        return Ok(());
    }

    if products.is_empty() {
        match search {
            Some(term) => eprintln!("No products matching '{term}'"),
            None => eprintln!("No products yet. Add one with 'larder food add'"),
        }
        process::exit(2);
    }

    print_product_table(&products);
    Ok(())
}

#[allow(clippy::too_many_arguments)]
pub(crate) fn cmd_food_update(
    store: &mut Store,
    id: &str,
    name: Option<String>,
    quantity: Option<f64>,
    calories: Option<f64>,
    protein: Option<f64>,
    fat: Option<f64>,
    carbs: Option<f64>,
    fiber: Option<f64>,
    json: bool,
) -> Result<()> {
    let id = resolve_id(store.products().iter().map(|p| p.id.as_str()), id)?;
    let current = store
        .product_by_id(&id)
        .context("Product disappeared during update")?;

    let updated = NewProduct {
        name: match name {
            Some(n) => validate_product_name(&n)?,
            None => current.name.clone(),
        },
        quantity_g: quantity.unwrap_or(current.quantity_g),
        nutrients: Nutrients {
            calories: calories.unwrap_or(current.nutrients.calories),
            protein: protein.unwrap_or(current.nutrients.protein),
            fat: fat.unwrap_or(current.nutrients.fat),
            carbs: carbs.unwrap_or(current.nutrients.carbs),
            fiber: fiber.unwrap_or(current.nutrients.fiber),
        },
    };
    store.update_product(&id, &updated)?;
    let product = store.product_by_id(&id).context("Product disappeared")?;

    if json {
        println!("{}", serde_json::to_string_pretty(product)?);
        return Ok(());
    }

    let name = &product.name;
    let quantity = product.quantity_g;
    println!("Updated '{name}': {quantity:.0}g in stock");
    Ok(())
}

pub(crate) fn cmd_food_delete(store: &mut Store, id: &str, json: bool) -> Result<()> {
    let id = resolve_id(store.products().iter().map(|p| p.id.as_str()), id)?;
    let name = store
        .product_by_id(&id)
        .map(|p| p.name.clone())
        .unwrap_or_default();
    store.delete_product(&id)?;

    if json {
        println!(
            "{}",
            serde_json::json!({ "deleted": id, "name": name })
        );
        return Ok(());
    }

    let short = short_id(&id);
    println!("Deleted '{name}' [{short}]");
    Ok(())
}
