use anyhow::{Context, Result, bail};
use chrono::{Local, NaiveDate};
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use larder_core::models::Product;

pub(crate) fn parse_date(date_str: Option<String>) -> Result<NaiveDate> {
    match date_str {
        None => Ok(Local::now().date_naive()),
        Some(s) => match s.as_str() {
            "today" => Ok(Local::now().date_naive()),
            "yesterday" => Ok(Local::now().date_naive() - chrono::Duration::days(1)),
            "tomorrow" => Ok(Local::now().date_naive() + chrono::Duration::days(1)),
            _ => NaiveDate::parse_from_str(&s, "%Y-%m-%d").with_context(|| {
                format!("Invalid date '{s}'. Use YYYY-MM-DD or today/yesterday/tomorrow")
            }),
        },
    }
}

/// Resolve a full id or unique prefix against a set of ids.
pub(crate) fn resolve_id<'a>(ids: impl Iterator<Item = &'a str>, query: &str) -> Result<String> {
    let ids: Vec<&str> = ids.collect();
    if let Some(exact) = ids.iter().find(|id| **id == query) {
        return Ok((*exact).to_string());
    }
    let matches: Vec<&&str> = ids.iter().filter(|id| id.starts_with(query)).collect();
    match matches.as_slice() {
        [] => bail!("No match for id '{query}'"),
        [only] => Ok((**only).to_string()),
        _ => bail!("Ambiguous id '{query}' ({} matches)", matches.len()),
    }
}

pub(crate) fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

/// In-stock products first, then alphabetical within each group.
pub(crate) fn sort_products(products: &mut [&Product]) {
    products.sort_by(|a, b| {
        let a_stocked = a.quantity_g > 0.0;
        let b_stocked = b.quantity_g > 0.0;
        b_stocked
            .cmp(&a_stocked)
            .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
    });
}

pub(crate) fn print_product_table(products: &[&Product]) {
    #[derive(Tabled)]
    struct ProductRow {
        #[tabled(rename = "ID")]
        id: String,
        #[tabled(rename = "Name")]
        name: String,
        #[tabled(rename = "Stock (g)")]
        quantity: String,
        #[tabled(rename = "Cal/100g")]
        calories: String,
        #[tabled(rename = "P/100g")]
        protein: String,
        #[tabled(rename = "F/100g")]
        fat: String,
        #[tabled(rename = "C/100g")]
        carbs: String,
        #[tabled(rename = "Fib/100g")]
        fiber: String,
    }

    let rows: Vec<ProductRow> = products
        .iter()
        .map(|p| {
            let quantity = p.quantity_g;
            let n = &p.nutrients;
            let (calories, protein, fat, carbs, fiber) =
                (n.calories, n.protein, n.fat, n.carbs, n.fiber);
            ProductRow {
                id: short_id(&p.id).to_string(),
                name: truncate(&p.name, 35),
                quantity: format!("{quantity:.0}"),
                calories: format!("{calories:.0}"),
                protein: format!("{protein:.1}"),
                fat: format!("{fat:.1}"),
                carbs: format!("{carbs:.1}"),
                fiber: format!("{fiber:.1}"),
            }
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(2..)).with(Alignment::right()))
        .to_string();
    println!("{table}");
}

pub(crate) fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let keep = max.saturating_sub(3);
        let end = s.char_indices().nth(keep).map_or(s.len(), |(i, _)| i);
        format!("{}...", &s[..end])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use larder_core::models::Nutrients;

    #[test]
    fn test_parse_date_none() {
        let today = Local::now().date_naive();
        assert_eq!(parse_date(None).unwrap(), today);
    }

    #[test]
    fn test_parse_date_keywords() {
        let today = Local::now().date_naive();
        assert_eq!(parse_date(Some("today".to_string())).unwrap(), today);
        assert_eq!(
            parse_date(Some("yesterday".to_string())).unwrap(),
            today - chrono::Duration::days(1)
        );
        assert_eq!(
            parse_date(Some("tomorrow".to_string())).unwrap(),
            today + chrono::Duration::days(1)
        );
    }

    #[test]
    fn test_parse_date_iso() {
        let date = parse_date(Some("2024-01-15".to_string())).unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
    }

    #[test]
    fn test_parse_date_invalid() {
        assert!(parse_date(Some("nope".to_string())).is_err());
    }

    #[test]
    fn test_resolve_id() {
        let ids = ["abcd-1234", "abxy-5678", "zzzz-0000"];
        assert_eq!(
            resolve_id(ids.iter().copied(), "zzzz").unwrap(),
            "zzzz-0000"
        );
        assert_eq!(
            resolve_id(ids.iter().copied(), "abcd-1234").unwrap(),
            "abcd-1234"
        );
        assert!(resolve_id(ids.iter().copied(), "ab").is_err());
        assert!(resolve_id(ids.iter().copied(), "missing").is_err());
    }

    #[test]
    fn test_sort_products_stocked_first() {
        let make = |name: &str, quantity_g: f64| Product {
            id: name.to_string(),
            name: name.to_string(),
            quantity_g,
            nutrients: Nutrients::default(),
        };
        let a = make("apple", 0.0);
        let b = make("Bread", 500.0);
        let c = make("carrot", 200.0);
        let mut refs: Vec<&Product> = vec![&a, &b, &c];
        sort_products(&mut refs);
        let names: Vec<&str> = refs.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["Bread", "carrot", "apple"]);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello world this is long", 10), "hello w...");
    }

    #[test]
    fn test_truncate_tiny_max() {
        // max below the ellipsis width must not underflow
        assert_eq!(truncate("hello", 2), "...");
        assert_eq!(truncate("hello", 0), "...");
        assert_eq!(truncate("hi", 2), "hi");
    }

    #[test]
    fn test_short_id() {
        assert_eq!(short_id("abcdefgh-rest"), "abcdefgh");
        assert_eq!(short_id("ab"), "ab");
    }
}
