use serde::{Deserialize, Serialize};

use crate::models::mods::ModEntry;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Hash, Eq, PartialOrd, Ord)]
#[serde(transparent)]
pub struct ModpackName(pub String);

impl std::fmt::Display for ModpackName {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(fmt, "{}", self.0)
    }
}

// Modpack list / create
pub type ModpackListResponse = Vec<String>;

#[derive(Serialize, Deserialize)]
pub struct ModpackCreateBody {
    pub name: String,
}

// Modpack delete
pub type ModpackDeleteResponse = String;

// Mods inside a modpack
pub type ModListResponse = Vec<ModEntry>;

#[derive(Serialize, Deserialize)]
pub struct ModToggleBody {
    #[serde(rename = "modName")]
    pub mod_name: String,
}

/// New `enabled` state of the toggled mod.
pub type ModToggleResponse = bool;
