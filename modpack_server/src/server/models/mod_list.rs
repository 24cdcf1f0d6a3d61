use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use modpack_core::{
    models::mods::{ModEntry, ModListFile},
    MOD_LIST_FILE,
};

use super::ModpackError;

/// The enabled/disabled state of every mod in a modpack, backed by its `mod-list.json`.
#[derive(Debug)]
pub struct ModSimpleList {
    path: PathBuf,
    file: ModListFile,
}

impl ModSimpleList {
    /// Reads `mod-list.json` from `modpack_dir`.
    ///
    /// Without one, every `<name>_<version>.zip` in the directory counts as an enabled mod.
    pub fn load(modpack_dir: &Path) -> Result<Self, ModpackError> {
        let path = modpack_dir.join(MOD_LIST_FILE);
        let file = match fs::read_to_string(&path) {
            Ok(text) => serde_json::from_str::<ModListFile>(&text)?,
            Err(err) if err.kind() == ErrorKind::NotFound => ModListFile {
                mods: mods_from_archives(modpack_dir)?,
                ..Default::default()
            },
            Err(err) => return Err(err.into()),
        };
        Ok(ModSimpleList { path, file })
    }

    pub fn list_installed_mods(&self) -> Vec<ModEntry> {
        self.file.mods.clone()
    }

    /// Flips the `enabled` flag of `name` and writes the list back, returning the new state.
    pub fn toggle_mod(&mut self, name: &str) -> Result<bool, ModpackError> {
        let enabled = {
            let entry = self
                .file
                .mods
                .iter_mut()
                .find(|x| x.name == name)
                .ok_or_else(|| ModpackError::ModNotFound(name.to_string()))?;
            entry.enabled = !entry.enabled;
            entry.enabled
        };
        self.save()?;
        Ok(enabled)
    }

    pub fn save(&self) -> Result<(), ModpackError> {
        fs::write(&self.path, serde_json::to_string_pretty(&self.file)?)?;
        Ok(())
    }
}

fn mods_from_archives(modpack_dir: &Path) -> Result<Vec<ModEntry>, ModpackError> {
    let mut mods = Vec::new();
    for entry in fs::read_dir(modpack_dir)? {
        let entry = entry?;
        if !entry.path().is_file() {
            continue;
        }
        let file_name = entry.file_name();
        let Some(stem) = file_name.to_str().and_then(|x| x.strip_suffix(".zip")) else {
            continue;
        };
        let name = stem.rsplit_once('_').map_or(stem, |(name, _)| name);
        mods.push(ModEntry::enabled(name));
    }
    mods.sort_by(|a, b| a.name.cmp(&b.name));
    mods.dedup_by(|a, b| a.name == b.name);
    Ok(mods)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const MOD_LIST: &str = r#"{
        "mods": [
            { "name": "base", "enabled": true },
            { "name": "Krastorio2", "enabled": false, "version": "1.3.24" }
        ]
    }"#;

    #[test]
    fn reads_mod_list_file() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(MOD_LIST_FILE), MOD_LIST).unwrap();

        let list = ModSimpleList::load(dir.path()).unwrap();
        assert_eq!(
            list.list_installed_mods(),
            vec![
                ModEntry::enabled("base"),
                ModEntry {
                    name: "Krastorio2".to_string(),
                    enabled: false,
                    version: Some("1.3.24".to_string()),
                    extra: Default::default(),
                },
            ]
        );
    }

    #[test]
    fn derives_mods_from_archives() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("even-distribution_2.0.2.zip"), "").unwrap();
        fs::write(dir.path().join("Bottleneck_0.11.7.zip"), "").unwrap();
        fs::write(dir.path().join("Bottleneck_0.11.8.zip"), "").unwrap();
        fs::write(dir.path().join("notes.txt"), "").unwrap();

        let names: Vec<_> = ModSimpleList::load(dir.path())
            .unwrap()
            .list_installed_mods()
            .into_iter()
            .map(|x| x.name)
            .collect();
        assert_eq!(names, vec!["Bottleneck", "even-distribution"]);
    }

    #[test]
    fn malformed_mod_list_is_an_error() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(MOD_LIST_FILE), "{ nope").unwrap();
        assert!(matches!(
            ModSimpleList::load(dir.path()),
            Err(ModpackError::ModList(_))
        ));
    }

    #[test]
    fn toggle_twice_restores_state_on_disk() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(MOD_LIST_FILE), MOD_LIST).unwrap();

        let mut list = ModSimpleList::load(dir.path()).unwrap();
        assert!(list.toggle_mod("Krastorio2").unwrap());
        let reloaded = ModSimpleList::load(dir.path()).unwrap();
        assert!(reloaded.list_installed_mods()[1].enabled);

        let mut list = reloaded;
        assert!(!list.toggle_mod("Krastorio2").unwrap());
        let reloaded = ModSimpleList::load(dir.path()).unwrap();
        assert!(!reloaded.list_installed_mods()[1].enabled);
        assert_eq!(
            reloaded.list_installed_mods()[1].version.as_deref(),
            Some("1.3.24")
        );
    }

    #[test]
    fn toggle_unknown_mod_leaves_file_alone() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(MOD_LIST_FILE), MOD_LIST).unwrap();

        let mut list = ModSimpleList::load(dir.path()).unwrap();
        assert!(matches!(
            list.toggle_mod("missing"),
            Err(ModpackError::ModNotFound(_))
        ));
        assert_eq!(
            fs::read_to_string(dir.path().join(MOD_LIST_FILE)).unwrap(),
            MOD_LIST
        );
    }

    #[test]
    fn toggle_keeps_keys_it_does_not_know() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join(MOD_LIST_FILE),
            r#"{
                "mods": [{ "name": "rail", "enabled": true, "pinned": 3 }],
                "format": "factorio-2"
            }"#,
        )
        .unwrap();

        ModSimpleList::load(dir.path())
            .unwrap()
            .toggle_mod("rail")
            .unwrap();

        let written: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(dir.path().join(MOD_LIST_FILE)).unwrap())
                .unwrap();
        assert_eq!(
            written,
            serde_json::json!({
                "mods": [{ "name": "rail", "enabled": false, "pinned": 3 }],
                "format": "factorio-2"
            })
        );
    }

    #[cfg(unix)]
    #[test]
    fn derives_mods_from_symlinked_archives() {
        use std::os::unix::fs::symlink;

        let dir = tempdir().unwrap();
        let store = tempdir().unwrap();
        fs::write(store.path().join("real_1.0.0.zip"), "").unwrap();
        symlink(
            store.path().join("real_1.0.0.zip"),
            dir.path().join("real_1.0.0.zip"),
        )
        .unwrap();

        let list = ModSimpleList::load(dir.path()).unwrap();
        assert_eq!(list.list_installed_mods(), vec![ModEntry::enabled("real")]);
    }
}
