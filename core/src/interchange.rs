//! CSV interchange: inventory and history import/export with the canonical
//! column headers shared with the persisted JSON.

use std::io::{Read, Write};

use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use csv::StringRecord;
use uuid::Uuid;

use crate::models::{HistoryEntry, Nutrients, Product};

pub const PRODUCT_COLUMNS: [&str; 7] = [
    "Product",
    "Quantity_g",
    "Calories_100g",
    "Protein_100g",
    "Fat_100g",
    "Carbs_100g",
    "Fiber_100g",
];

pub const HISTORY_COLUMNS: [&str; 8] = [
    "Date",
    "Product",
    "Quantity_g",
    "Calories_100g",
    "Protein_100g",
    "Fat_100g",
    "Carbs_100g",
    "Fiber_100g",
];

const REQUIRED_HISTORY_COLUMNS: [&str; 3] = ["Date", "Product", "Quantity_g"];

#[derive(Debug)]
pub struct HistoryImport {
    pub entries: Vec<HistoryEntry>,
    /// Whether the file carried nutrient columns. Informational only; the
    /// entries get zero snapshots when the columns are absent.
    pub has_nutrition: bool,
}

fn reader_from(input: impl Read) -> csv::Reader<impl Read> {
    csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(input)
}

fn column(headers: &StringRecord, name: &str) -> Option<usize> {
    headers.iter().position(|h| h == name)
}

fn text(record: &StringRecord, idx: Option<usize>) -> String {
    idx.and_then(|i| record.get(i)).unwrap_or_default().to_string()
}

/// Numeric cell with lenient parsing: blank or malformed values are 0.
fn number(record: &StringRecord, idx: Option<usize>) -> f64 {
    idx.and_then(|i| record.get(i))
        .and_then(|v| v.parse().ok())
        .unwrap_or(0.0)
}

/// Parse an inventory CSV. Unknown columns are ignored, missing nutrient
/// columns default to 0, and rows without a product name are dropped. Each
/// imported product gets a fresh id.
pub fn import_products(input: impl Read) -> Result<Vec<Product>> {
    let mut reader = reader_from(input);
    let headers = reader.headers().context("Failed to read CSV header")?.clone();

    let name_idx = column(&headers, "Product");
    let quantity_idx = column(&headers, "Quantity_g");
    let nutrient_idx: Vec<Option<usize>> = PRODUCT_COLUMNS[2..]
        .iter()
        .map(|c| column(&headers, c))
        .collect();

    let mut products = Vec::new();
    for record in reader.records() {
        let record = record.context("Failed to read CSV row")?;
        let name = text(&record, name_idx);
        if name.is_empty() {
            continue;
        }
        products.push(Product {
            id: Uuid::new_v4().to_string(),
            name,
            quantity_g: number(&record, quantity_idx),
            nutrients: Nutrients {
                calories: number(&record, nutrient_idx[0]),
                protein: number(&record, nutrient_idx[1]),
                fat: number(&record, nutrient_idx[2]),
                carbs: number(&record, nutrient_idx[3]),
                fiber: number(&record, nutrient_idx[4]),
            },
        });
    }
    Ok(products)
}

#[must_use]
pub fn missing_history_fields(headers: &StringRecord) -> Vec<String> {
    REQUIRED_HISTORY_COLUMNS
        .iter()
        .filter(|c| column(headers, c).is_none())
        .map(ToString::to_string)
        .collect()
}

/// Parse a history CSV. Date, Product, and Quantity_g are required; any
/// missing one fails the whole import, naming every absent column. Nutrient
/// columns are optional as a group.
pub fn import_history(input: impl Read) -> Result<HistoryImport> {
    let mut reader = reader_from(input);
    let headers = reader.headers().context("Failed to read CSV header")?.clone();

    let missing = missing_history_fields(&headers);
    if !missing.is_empty() {
        bail!("Missing required fields: {}", missing.join(", "));
    }

    let date_idx = column(&headers, "Date");
    let name_idx = column(&headers, "Product");
    let quantity_idx = column(&headers, "Quantity_g");
    let has_nutrition = column(&headers, "Calories_100g").is_some();
    let nutrient_idx: Vec<Option<usize>> = HISTORY_COLUMNS[3..]
        .iter()
        .map(|c| column(&headers, c))
        .collect();

    let mut entries = Vec::new();
    for record in reader.records() {
        let record = record.context("Failed to read CSV row")?;
        let product = text(&record, name_idx);
        if product.is_empty() {
            continue;
        }
        let mut entry = HistoryEntry {
            id: Uuid::new_v4().to_string(),
            date: text(&record, date_idx),
            product,
            quantity_g: number(&record, quantity_idx),
            calories_100g: None,
            protein_100g: None,
            fat_100g: None,
            carbs_100g: None,
            fiber_100g: None,
        };
        // Absent nutrient columns import as zeros; imported rows never go
        // through migration.
        entry.set_snapshot(&Nutrients {
            calories: number(&record, nutrient_idx[0]),
            protein: number(&record, nutrient_idx[1]),
            fat: number(&record, nutrient_idx[2]),
            carbs: number(&record, nutrient_idx[3]),
            fiber: number(&record, nutrient_idx[4]),
        });
        entries.push(entry);
    }
    Ok(HistoryImport {
        entries,
        has_nutrition,
    })
}

fn cell(v: f64) -> String {
    format!("{v}")
}

/// Write the inventory as CSV in canonical column order. Ids are internal
/// and never exported.
pub fn export_products(products: &[Product], output: impl Write) -> Result<()> {
    let mut writer = csv::Writer::from_writer(output);
    writer.write_record(PRODUCT_COLUMNS)?;
    for p in products {
        writer.write_record([
            p.name.clone(),
            cell(p.quantity_g),
            cell(p.nutrients.calories),
            cell(p.nutrients.protein),
            cell(p.nutrients.fat),
            cell(p.nutrients.carbs),
            cell(p.nutrients.fiber),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

/// Write the history as CSV. Missing snapshot fields export as 0.
pub fn export_history(entries: &[HistoryEntry], output: impl Write) -> Result<()> {
    let mut writer = csv::Writer::from_writer(output);
    writer.write_record(HISTORY_COLUMNS)?;
    for e in entries {
        writer.write_record([
            e.date.clone(),
            e.product.clone(),
            cell(e.quantity_g),
            cell(e.calories_100g.unwrap_or(0.0)),
            cell(e.protein_100g.unwrap_or(0.0)),
            cell(e.fat_100g.unwrap_or(0.0)),
            cell(e.carbs_100g.unwrap_or(0.0)),
            cell(e.fiber_100g.unwrap_or(0.0)),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

#[must_use]
pub fn history_export_filename(date: NaiveDate) -> String {
    format!("nutrition_history_{}.csv", date.format("%Y-%m-%d"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_import_products_basic() {
        let csv = "Product,Quantity_g,Calories_100g,Protein_100g,Fat_100g,Carbs_100g,Fiber_100g\n\
                   Brown Rice, 1000 ,130,2.7,0.3,28,0.4\n\
                   ,500,50,1,1,1,1\n\
                   Oats,400,389,16.9,6.9,66.3,10.6\n";
        let products = import_products(csv.as_bytes()).unwrap();
        assert_eq!(products.len(), 2);
        assert_eq!(products[0].name, "Brown Rice");
        assert!((products[0].quantity_g - 1000.0).abs() < f64::EPSILON);
        assert!((products[0].nutrients.protein - 2.7).abs() < f64::EPSILON);
        assert!(!products[0].id.is_empty());
        assert_ne!(products[0].id, products[1].id);
    }

    #[test]
    fn test_import_products_lenient_columns() {
        // Reordered, missing fiber, extra column, malformed number
        let csv = "Quantity_g,Product,Calories_100g,Notes\n\
                   abc,Milk,64,keep cold\n";
        let products = import_products(csv.as_bytes()).unwrap();
        assert_eq!(products.len(), 1);
        assert!(products[0].quantity_g.abs() < f64::EPSILON);
        assert!((products[0].nutrients.calories - 64.0).abs() < f64::EPSILON);
        assert!(products[0].nutrients.fiber.abs() < f64::EPSILON);
    }

    #[test]
    fn test_import_history_with_nutrition() {
        let csv = "Date,Product,Quantity_g,Calories_100g,Protein_100g,Fat_100g,Carbs_100g,Fiber_100g\n\
                   2024-06-15,Brown Rice,150,130,2.7,0.3,28,0.4\n";
        let import = import_history(csv.as_bytes()).unwrap();
        assert!(import.has_nutrition);
        assert_eq!(import.entries.len(), 1);
        let e = &import.entries[0];
        assert_eq!(e.date, "2024-06-15");
        assert_eq!(e.calories_100g, Some(130.0));
        assert_eq!(e.fiber_100g, Some(0.4));
    }

    #[test]
    fn test_import_history_without_nutrition_zero_fills() {
        let csv = "Date,Product,Quantity_g\n2024-06-15,Brown Rice,150\n";
        let import = import_history(csv.as_bytes()).unwrap();
        assert!(!import.has_nutrition);
        assert_eq!(import.entries[0].calories_100g, Some(0.0));
        assert_eq!(import.entries[0].fiber_100g, Some(0.0));
    }

    #[test]
    fn test_import_history_missing_required_fields() {
        let csv = "Date,Product\n2024-06-15,Brown Rice\n";
        let err = import_history(csv.as_bytes()).unwrap_err();
        assert_eq!(err.to_string(), "Missing required fields: Quantity_g");

        let csv = "Notes\nhello\n";
        let err = import_history(csv.as_bytes()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Missing required fields: Date, Product, Quantity_g"
        );
    }

    #[test]
    fn test_export_products_strips_id() {
        let products = vec![Product {
            id: "secret".to_string(),
            name: "Brown Rice".to_string(),
            quantity_g: 1000.0,
            nutrients: Nutrients {
                calories: 130.0,
                protein: 2.7,
                fat: 0.3,
                carbs: 28.0,
                fiber: 0.4,
            },
        }];
        let mut out = Vec::new();
        export_products(&products, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("Product,Quantity_g,Calories_100g"));
        assert!(text.contains("Brown Rice,1000,130,2.7,0.3,28,0.4"));
        assert!(!text.contains("secret"));
    }

    #[test]
    fn test_export_history_defaults_missing_snapshot() {
        let entries = vec![HistoryEntry {
            id: "x".to_string(),
            date: "2024-06-15".to_string(),
            product: "Mystery".to_string(),
            quantity_g: 80.0,
            calories_100g: None,
            protein_100g: None,
            fat_100g: None,
            carbs_100g: None,
            fiber_100g: None,
        }];
        let mut out = Vec::new();
        export_history(&entries, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("2024-06-15,Mystery,80,0,0,0,0,0"));
    }

    #[test]
    fn test_history_export_filename() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        assert_eq!(
            history_export_filename(date),
            "nutrition_history_2024-06-15.csv"
        );
    }
}
