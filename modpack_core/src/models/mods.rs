use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One entry of Factorio's `mod-list.json`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ModEntry {
    pub name: String,
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Keys Factorio writes that this service does not interpret.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ModEntry {
    pub fn enabled(name: impl Into<String>) -> Self {
        ModEntry {
            name: name.into(),
            enabled: true,
            version: None,
            extra: Map::new(),
        }
    }
}

/// On-disk layout of `mod-list.json`.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct ModListFile {
    #[serde(default)]
    pub mods: Vec<ModEntry>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
