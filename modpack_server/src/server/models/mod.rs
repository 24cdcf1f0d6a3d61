pub mod archive;
pub mod mod_list;
pub mod modpack_map;

#[derive(thiserror::Error, Debug)]
pub enum ModpackError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("walk error: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("invalid mod list: {0}")]
    ModList(#[from] serde_json::Error),
    #[error("modpack {0} already exists, please choose a different name")]
    AlreadyExists(String),
    #[error("modpack {0} does not exist")]
    ModpackNotFound(String),
    #[error("invalid modpack name {0:?}")]
    InvalidName(String),
    #[error("mod {0} not found in mod list")]
    ModNotFound(String),
    #[error("file name {0} appears more than once in the modpack")]
    DuplicateEntry(String),
    #[error("no factorio mods directory configured")]
    NoModsDirectory,
}
