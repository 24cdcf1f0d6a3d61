pub mod api;
pub mod models;

/// File name Factorio uses for the enabled/disabled state of every mod.
pub const MOD_LIST_FILE: &str = "mod-list.json";
