//! The record store: owns the two persisted collections (inventory and
//! consumption history) and reconciles them with disk.
//!
//! Persistence is a SQLite key-value table holding two whole JSON arrays
//! under fixed keys. Both blobs are rewritten in one transaction after every
//! mutation, so the pair is always durable as a unit.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{Duration, Local, NaiveDate};
use rusqlite::{Connection, OptionalExtension, params};
use uuid::Uuid;

use crate::models::{HistoryEntry, NewProduct, Product, SelectionItem};

const INVENTORY_KEY: &str = "inventory";
const HISTORY_KEY: &str = "history";

/// History entries older than this many days are pruned.
pub const RETENTION_DAYS: i64 = 5;

pub struct Store {
    conn: Connection,
    inventory: Vec<Product>,
    history: Vec<HistoryEntry>,
}

impl Store {
    /// Open the store at `path`, creating it if absent. Runs the legacy
    /// snapshot migration and retention pruning before returning.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open store: {}", path.display()))?;
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS store (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );",
        )?;
        let mut store = Store {
            conn,
            inventory: Vec::new(),
            history: Vec::new(),
        };
        store.load()?;
        store.migrate_history()?;
        store.prune_history(Local::now().date_naive())?;
        Ok(store)
    }

    fn load(&mut self) -> Result<()> {
        if let Some(raw) = self.read_blob(INVENTORY_KEY)? {
            self.inventory = serde_json::from_str(&raw).context("Corrupt inventory data")?;
        }
        if let Some(raw) = self.read_blob(HISTORY_KEY)? {
            self.history = serde_json::from_str(&raw).context("Corrupt history data")?;
        }
        Ok(())
    }

    fn read_blob(&self, key: &str) -> Result<Option<String>> {
        self.conn
            .query_row("SELECT value FROM store WHERE key = ?1", params![key], |row| {
                row.get(0)
            })
            .optional()
            .map_err(Into::into)
    }

    /// Write both collections whole, in a single transaction.
    fn persist(&mut self) -> Result<()> {
        let inventory = serde_json::to_string(&self.inventory)?;
        let history = serde_json::to_string(&self.history)?;
        let tx = self.conn.transaction()?;
        for (key, value) in [(INVENTORY_KEY, &inventory), (HISTORY_KEY, &history)] {
            tx.execute(
                "INSERT INTO store (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                params![key, value],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    // --- Products ---

    pub fn add_product(&mut self, new: &NewProduct) -> Result<Product> {
        let product = Product {
            id: Uuid::new_v4().to_string(),
            name: new.name.clone(),
            quantity_g: new.quantity_g,
            nutrients: new.nutrients.clone(),
        };
        self.inventory.push(product.clone());
        self.persist()?;
        Ok(product)
    }

    /// Update in place, keeping the id and insertion position. Unknown id is
    /// a no-op returning false.
    pub fn update_product(&mut self, id: &str, updated: &NewProduct) -> Result<bool> {
        let Some(product) = self.inventory.iter_mut().find(|p| p.id == id) else {
            return Ok(false);
        };
        product.name = updated.name.clone();
        product.quantity_g = updated.quantity_g;
        product.nutrients = updated.nutrients.clone();
        self.persist()?;
        Ok(true)
    }

    /// Delete by id filter. Unknown id is tolerated as a no-op.
    pub fn delete_product(&mut self, id: &str) -> Result<bool> {
        let before = self.inventory.len();
        self.inventory.retain(|p| p.id != id);
        let removed = self.inventory.len() != before;
        if removed {
            self.persist()?;
        }
        Ok(removed)
    }

    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.inventory
    }

    #[must_use]
    pub fn product_by_id(&self, id: &str) -> Option<&Product> {
        self.inventory.iter().find(|p| p.id == id)
    }

    /// Case-insensitive substring search over product names.
    #[must_use]
    pub fn search_products(&self, term: &str) -> Vec<&Product> {
        let needle = term.to_lowercase();
        self.inventory
            .iter()
            .filter(|p| p.name.to_lowercase().contains(&needle))
            .collect()
    }

    /// Match a free-text name against the inventory: case-insensitive
    /// substring in either direction, first match wins.
    #[must_use]
    pub fn match_product(&self, name: &str) -> Option<&Product> {
        let needle = name.to_lowercase();
        self.inventory.iter().find(|p| {
            let hay = p.name.to_lowercase();
            hay.contains(&needle) || needle.contains(&hay)
        })
    }

    // --- History ---

    pub fn add_history_entry(&mut self, entry: HistoryEntry) -> Result<()> {
        self.history.push(entry);
        self.persist()
    }

    pub fn delete_history_entry(&mut self, id: &str) -> Result<bool> {
        let before = self.history.len();
        self.history.retain(|e| e.id != id);
        let removed = self.history.len() != before;
        if removed {
            self.persist()?;
        }
        Ok(removed)
    }

    /// Merge support: grow an entry's quantity without touching its
    /// nutrient snapshot.
    pub fn add_history_quantity(&mut self, id: &str, delta_g: f64) -> Result<bool> {
        let Some(entry) = self.history.iter_mut().find(|e| e.id == id) else {
            return Ok(false);
        };
        entry.quantity_g += delta_g;
        self.persist()?;
        Ok(true)
    }

    #[must_use]
    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    pub fn history_for_date<'a>(&'a self, date: &'a str) -> impl Iterator<Item = &'a HistoryEntry> {
        self.history.iter().filter(move |e| e.date == date)
    }

    // --- Bulk replacement (imports) ---

    pub fn append_inventory(&mut self, products: Vec<Product>) -> Result<usize> {
        let count = products.len();
        self.inventory.extend(products);
        self.persist()?;
        Ok(count)
    }

    pub fn replace_inventory(&mut self, products: Vec<Product>) -> Result<()> {
        self.inventory = products;
        self.persist()
    }

    pub fn replace_history(&mut self, entries: Vec<HistoryEntry>) -> Result<()> {
        self.history = entries;
        self.persist()
    }

    // --- Maintenance ---

    /// Backfill nutrient snapshots on legacy entries: first product with an
    /// exactly matching name wins, no match zero-fills. Persists only when
    /// something changed, so a second run is a no-op.
    pub fn migrate_history(&mut self) -> Result<bool> {
        let mut migrated = false;
        for i in 0..self.history.len() {
            if self.history[i].has_snapshot() {
                continue;
            }
            let name = self.history[i].product.clone();
            let snapshot = self
                .inventory
                .iter()
                .find(|p| p.name == name)
                .map(|p| p.nutrients.clone())
                .unwrap_or_default();
            self.history[i].set_snapshot(&snapshot);
            migrated = true;
        }
        if migrated {
            self.persist()?;
        }
        Ok(migrated)
    }

    /// Drop entries dated strictly before `today - RETENTION_DAYS`
    /// (calendar comparison; unparseable dates are dropped too). Returns
    /// the removed count; persists only when it is nonzero.
    pub fn prune_history(&mut self, today: NaiveDate) -> Result<usize> {
        let cutoff = today - Duration::days(RETENTION_DAYS);
        let before = self.history.len();
        self.history.retain(|e| {
            NaiveDate::parse_from_str(&e.date, "%Y-%m-%d").is_ok_and(|d| d >= cutoff)
        });
        let removed = before - self.history.len();
        if removed > 0 {
            self.persist()?;
        }
        Ok(removed)
    }

    /// Subtract committed quantities from stock, clamped at zero. Custom
    /// items and vanished product ids are skipped silently.
    pub fn decrement_quantities(&mut self, items: &[SelectionItem]) -> Result<()> {
        let mut changed = false;
        for item in items {
            if item.is_custom() {
                continue;
            }
            if let Some(product) = self.inventory.iter_mut().find(|p| p.id == item.product_id) {
                product.quantity_g = (product.quantity_g - item.quantity_g).max(0.0);
                changed = true;
            }
        }
        if changed {
            self.persist()?;
        }
        Ok(())
    }
}
