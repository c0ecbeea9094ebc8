//! Turning a basket into history: decrement stock, snapshot nutrients,
//! merge same-day duplicates, clear the selection.

use anyhow::Result;
use serde::Serialize;
use uuid::Uuid;

use crate::basket::{Basket, resolve_snapshot};
use crate::models::HistoryEntry;
use crate::store::Store;

const CUSTOM_SUFFIX: &str = " (Custom)";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CommitSummary {
    /// New history entries written.
    pub committed: usize,
    /// Items folded into an existing same-day entry.
    pub merged: usize,
    /// Items dropped because their product no longer exists.
    pub skipped: usize,
}

impl CommitSummary {
    #[must_use]
    pub fn total(&self) -> usize {
        self.committed + self.merged
    }
}

/// Commit the basket as consumed on `active_date` (YYYY-MM-DD).
///
/// Stock is decremented first, then each item is recorded with a nutrient
/// snapshot taken now. An item whose display name and full snapshot exactly
/// match an existing entry for the date merges into it instead of creating a
/// duplicate. Items whose product has vanished are skipped. The basket is
/// cleared unconditionally, even when everything was skipped.
///
/// The two store writes are sequential, not atomic: a failure after the
/// decrement leaves stock reduced with no matching history entry.
pub fn commit(basket: &mut Basket, store: &mut Store, active_date: &str) -> Result<CommitSummary> {
    store.decrement_quantities(basket.items())?;

    let mut summary = CommitSummary::default();
    for item in basket.items().to_vec() {
        let Some((nutrients, quantity_g)) = resolve_snapshot(&item, store) else {
            summary.skipped += 1;
            continue;
        };
        let display_name = if item.is_custom() {
            format!("{}{CUSTOM_SUFFIX}", item.display_name)
        } else {
            item.display_name.clone()
        };

        // Merge against live history so two identical basket items collapse
        // into one entry within a single commit.
        let existing = store
            .history_for_date(active_date)
            .find(|e| e.product == display_name && e.snapshot_matches(&nutrients))
            .map(|e| e.id.clone());
        if let Some(id) = existing {
            store.add_history_quantity(&id, quantity_g)?;
            summary.merged += 1;
            continue;
        }

        let mut entry = HistoryEntry {
            id: Uuid::new_v4().to_string(),
            date: active_date.to_string(),
            product: display_name,
            quantity_g,
            calories_100g: None,
            protein_100g: None,
            fat_100g: None,
            carbs_100g: None,
            fiber_100g: None,
        };
        entry.set_snapshot(&nutrients);
        store.add_history_entry(entry)?;
        summary.committed += 1;
    }

    basket.clear();
    Ok(summary)
}
