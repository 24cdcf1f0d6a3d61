use std::{path::PathBuf, time::Duration};

use anyhow::Context;
use serde::{Deserialize, Serialize};

pub const DEFAULT_CONFIG_PATH: &str = "modpack.server.toml";
pub const DEFAULT_PORT: u16 = 7050;
pub const DEFAULT_MODPACK_DIRECTORY: &str = "modpacks";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

#[derive(Serialize, Deserialize, Default)]
pub struct ServerConfigFile {
    pub port: Option<u16>,
    pub modpack_directory: Option<PathBuf>,
    pub mods_directory: Option<PathBuf>,
    pub request_timeout_secs: Option<u64>,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub port: u16,
    /// Root directory holding one subdirectory per modpack.
    pub modpack_directory: PathBuf,
    /// Factorio's active mods directory, target of modpack loads.
    pub mods_directory: Option<PathBuf>,
    /// Applies to every route except download and load.
    pub request_timeout: Duration,
}

impl ServerConfig {
    /// Environment variables win over the config file, which wins over defaults.
    pub fn from_sources(
        file: Option<&ServerConfigFile>,
        var: impl Fn(&str) -> Option<String>,
    ) -> anyhow::Result<Self> {
        let port = match var("MODPACK_PORT") {
            Some(port) => port
                .parse()
                .with_context(|| format!("Invalid MODPACK_PORT {port}"))?,
            None => file.and_then(|x| x.port).unwrap_or(DEFAULT_PORT),
        };
        let request_timeout_secs = match var("MODPACK_REQUEST_TIMEOUT_SECS") {
            Some(secs) => secs
                .parse()
                .with_context(|| format!("Invalid MODPACK_REQUEST_TIMEOUT_SECS {secs}"))?,
            None => file
                .and_then(|x| x.request_timeout_secs)
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
        };
        Ok(ServerConfig {
            port,
            request_timeout: Duration::from_secs(request_timeout_secs),
            modpack_directory: var("MODPACK_DIRECTORY")
                .map(PathBuf::from)
                .or(file.and_then(|x| x.modpack_directory.clone()))
                .unwrap_or(PathBuf::from(DEFAULT_MODPACK_DIRECTORY)),
            mods_directory: var("FACTORIO_MODS_DIRECTORY")
                .map(PathBuf::from)
                .or(file.and_then(|x| x.mods_directory.clone())),
        })
    }
}
