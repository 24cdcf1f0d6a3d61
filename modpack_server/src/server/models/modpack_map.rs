use std::{
    collections::{BTreeMap, HashSet},
    ffi::OsString,
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use tracing::debug;
use walkdir::{DirEntry, WalkDir};

use super::{mod_list::ModSimpleList, ModpackError};

/// A modpack directory directly under the modpacks root.
#[derive(Debug, Clone)]
pub struct ModPack {
    pub name: String,
    pub path: PathBuf,
}

impl ModPack {
    pub fn mod_list(&self) -> Result<ModSimpleList, ModpackError> {
        ModSimpleList::load(&self.path)
    }

    /// Replaces the contents of the active mods directory with this modpack's files.
    ///
    /// Files are copied into a sibling staging directory first, so a failed load
    /// leaves the active mods untouched. The directory keeps its permissions if it
    /// already existed.
    pub fn load(&self, mods_directory: &Path) -> Result<ModSimpleList, ModpackError> {
        let files = modpack_files(&self.path)?;

        let staging = staging_directory(mods_directory);
        if staging.exists() {
            fs::remove_dir_all(&staging)?;
        }
        fs::create_dir_all(&staging)?;
        let copied = files.iter().try_for_each(|entry| {
            debug!("Copying {} into {}", entry.path().display(), staging.display());
            fs::copy(entry.path(), staging.join(entry.file_name())).map(|_| ())
        });
        if let Err(err) = copied {
            fs::remove_dir_all(&staging).ok();
            return Err(err.into());
        }

        let permissions = match fs::metadata(mods_directory) {
            Ok(meta) => Some(meta.permissions()),
            Err(err) if err.kind() == ErrorKind::NotFound => None,
            Err(err) => return Err(err.into()),
        };
        if permissions.is_some() {
            fs::remove_dir_all(mods_directory)?;
        }
        fs::rename(&staging, mods_directory)?;
        if let Some(permissions) = permissions {
            fs::set_permissions(mods_directory, permissions)?;
        }

        self.mod_list()
    }
}

fn staging_directory(mods_directory: &Path) -> PathBuf {
    let mut name = OsString::from(".");
    name.push(mods_directory.file_name().unwrap_or_default());
    name.push(".loading");
    mods_directory.with_file_name(name)
}

/// Every file below `dir`, recursively and through symlinks, sorted by file name.
///
/// Two files sharing a base name are rejected, since both the archive and the
/// mods directory flatten them into one namespace.
pub fn modpack_files(dir: &Path) -> Result<Vec<DirEntry>, ModpackError> {
    let mut names = HashSet::new();
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).follow_links(true).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        if !names.insert(entry.file_name().to_os_string()) {
            return Err(ModpackError::DuplicateEntry(
                entry.file_name().to_string_lossy().into_owned(),
            ));
        }
        files.push(entry);
    }
    Ok(files)
}

/// Whether `name` can be used as a modpack directory and in a download file name.
fn valid_modpack_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\', '"'])
        && !name.chars().any(char::is_control)
}

/// Snapshot of the modpacks root, rebuilt from disk for every request.
#[derive(Debug)]
pub struct ModPackMap {
    root: PathBuf,
    modpacks: BTreeMap<String, ModPack>,
}

impl ModPackMap {
    pub fn load(root: &Path) -> Result<Self, ModpackError> {
        let mut modpacks = BTreeMap::new();
        for entry in fs::read_dir(root)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            modpacks.insert(
                name.clone(),
                ModPack {
                    name,
                    path: entry.path(),
                },
            );
        }
        Ok(ModPackMap {
            root: root.to_path_buf(),
            modpacks,
        })
    }

    pub fn check_modpack_exists(&self, name: &str) -> bool {
        self.modpacks.contains_key(name)
    }

    pub fn list_modpacks(&self) -> Vec<String> {
        self.modpacks.keys().cloned().collect()
    }

    pub fn into_modpack(mut self, name: &str) -> Option<ModPack> {
        self.modpacks.remove(name)
    }

    /// Creates an empty modpack, or a copy of the files in `mods_directory` when one is given.
    pub fn create_modpack(
        &mut self,
        name: &str,
        mods_directory: Option<&Path>,
    ) -> Result<(), ModpackError> {
        if !valid_modpack_name(name) {
            return Err(ModpackError::InvalidName(name.to_string()));
        }
        if self.check_modpack_exists(name) {
            return Err(ModpackError::AlreadyExists(name.to_string()));
        }

        let path = self.root.join(name);
        fs::create_dir(&path)?;

        if let Some(mods_directory) = mods_directory.filter(|x| x.is_dir()) {
            for entry in fs::read_dir(mods_directory)? {
                let entry = entry?;
                if entry.path().is_file() {
                    fs::copy(entry.path(), path.join(entry.file_name()))?;
                }
            }
        }

        self.modpacks.insert(
            name.to_string(),
            ModPack {
                name: name.to_string(),
                path,
            },
        );
        Ok(())
    }

    pub fn delete_modpack(&mut self, name: &str) -> Result<(), ModpackError> {
        let modpack = self
            .modpacks
            .get(name)
            .ok_or_else(|| ModpackError::ModpackNotFound(name.to_string()))?;
        fs::remove_dir_all(&modpack.path)?;
        self.modpacks.remove(name);
        Ok(())
    }
}
