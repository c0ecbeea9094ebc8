mod day;
mod eat;
mod food;
mod helpers;
mod transfer;

pub(crate) use day::{cmd_day, cmd_delete_entry, cmd_prune};
pub(crate) use eat::{cmd_eat, cmd_eat_custom};
pub(crate) use food::{cmd_food_add, cmd_food_delete, cmd_food_list, cmd_food_update};
pub(crate) use transfer::{
    cmd_export_history, cmd_export_inventory, cmd_import_history, cmd_import_inventory,
};
