//! Core library for larder: pantry inventory, meal selection, consumption
//! history, and CSV interchange. The CLI crate layers presentation on top.

pub mod basket;
pub mod commit;
pub mod interchange;
pub mod models;
pub mod nutrients;
pub mod store;
