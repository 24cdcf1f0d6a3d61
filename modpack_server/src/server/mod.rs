use std::{env::var, sync::Arc};

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, HeaderValue},
    response::IntoResponse,
    routing::{delete, get, post},
    Router,
};
use clap::Parser;
use config::{ServerConfig, ServerConfigFile, DEFAULT_CONFIG_PATH};
use error::ApiError;
use models::{
    archive,
    modpack_map::{ModPack, ModPackMap},
    ModpackError,
};
use modpack_core::api::{
    ModListResponse, ModToggleBody, ModToggleResponse, ModpackCreateBody, ModpackDeleteResponse,
    ModpackListResponse, ModpackName,
};
use response::ApiJson;
use tower::ServiceBuilder;
use tower_http::{limit::RequestBodyLimitLayer, timeout::TimeoutLayer, trace::TraceLayer};
use tracing::info;

mod config;
mod error;
mod models;
mod response;

/// Factorio modpack server
#[derive(Parser, Debug)]
pub struct ServeCommand {
    /// Config file, overrides MODPACK_CONFIG_PATH
    #[arg(short, long)]
    config: Option<String>,
}

pub struct AppState {
    pub config: ServerConfig,
}

impl ServeCommand {
    pub async fn run(&mut self) -> anyhow::Result<()> {
        info!("Modpack Server v{}", env!("CARGO_PKG_VERSION"));

        let config_path = self
            .config
            .clone()
            .or(var("MODPACK_CONFIG_PATH").ok())
            .unwrap_or(DEFAULT_CONFIG_PATH.to_string());
        let server_config_file = if let Ok(text) = std::fs::read_to_string(&config_path) {
            Some(toml::from_str::<ServerConfigFile>(&text)?)
        } else {
            None
        };
        let config = ServerConfig::from_sources(server_config_file.as_ref(), |key| var(key).ok())?;

        std::fs::create_dir_all(&config.modpack_directory)?;
        info!("Modpacks directory: {}", config.modpack_directory.display());
        if let Some(mods_directory) = &config.mods_directory {
            info!("Factorio mods directory: {}", mods_directory.display());
        }

        let state = Arc::new(AppState {
            config: config.clone(),
        });

        let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?;
        info!("Serving on 0.0.0.0:{}", config.port);
        axum::serve(listener, router(state)).await?;

        Ok(())
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    let timed = Router::new()
        .route("/", get(|| async { "Factorio modpack server" }))
        .route("/modpack/list", get(modpack_list))
        .route("/modpack/create", post(modpack_create))
        .route("/modpack/:modpack/delete", delete(modpack_delete))
        .route("/modpack/:modpack/mods", get(modpack_mod_list))
        .route("/modpack/:modpack/mods/toggle", post(modpack_mod_toggle))
        .layer(TimeoutLayer::new(state.config.request_timeout));

    // Download and load run on blocking workers that cannot be cancelled,
    // so they are not subject to the request timeout.
    Router::new()
        .route("/modpack/:modpack/download", get(modpack_download))
        .route("/modpack/:modpack/load", post(modpack_load))
        .merge(timed)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(RequestBodyLimitLayer::new(64 * 1024)),
        )
        .with_state(state)
}

fn modpack_map(state: &AppState) -> Result<ModPackMap, ApiError> {
    ModPackMap::load(&state.config.modpack_directory).map_err(ApiError::ModpackMap)
}

/// Fresh modpack map, provided `modpack` is in it.
fn read_modpack_request(state: &AppState, modpack: &ModpackName) -> Result<ModPackMap, ApiError> {
    let map = modpack_map(state)?;
    if !map.check_modpack_exists(&modpack.0) {
        return Err(ApiError::NotFound(modpack.clone()));
    }
    Ok(map)
}

fn find_modpack(state: &AppState, modpack: &ModpackName) -> Result<ModPack, ApiError> {
    read_modpack_request(state, modpack)?
        .into_modpack(&modpack.0)
        .ok_or_else(|| ApiError::NotFound(modpack.clone()))
}

async fn modpack_list(
    State(state): State<Arc<AppState>>,
) -> Result<ApiJson<ModpackListResponse>, ApiError> {
    Ok(ApiJson(modpack_map(&state)?.list_modpacks()))
}

async fn modpack_create(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<ApiJson<ModpackListResponse>, ApiError> {
    let data: ModpackCreateBody =
        serde_json::from_slice(&body).map_err(ApiError::InvalidCreateBody)?;

    let mut map = modpack_map(&state)?;
    map.create_modpack(&data.name, state.config.mods_directory.as_deref())
        .map_err(ApiError::Create)?;
    info!("Created modpack {}", data.name);

    Ok(ApiJson(map.list_modpacks()))
}

async fn modpack_delete(
    State(state): State<Arc<AppState>>,
    Path(modpack): Path<ModpackName>,
) -> Result<ApiJson<ModpackDeleteResponse>, ApiError> {
    let mut map = read_modpack_request(&state, &modpack)?;
    map.delete_modpack(&modpack.0).map_err(ApiError::Delete)?;
    info!("Deleted modpack {}", modpack);

    Ok(ApiJson(modpack.0))
}

async fn modpack_download(
    State(state): State<Arc<AppState>>,
    Path(modpack): Path<ModpackName>,
) -> Result<impl IntoResponse, ApiError> {
    let modpack = find_modpack(&state, &modpack)?;
    let disposition = content_disposition(&modpack.name)?;
    let path = modpack.path.clone();
    let archive = tokio::task::spawn_blocking(move || archive::zip_modpack(&path))
        .await?
        .map_err(ApiError::Download)?;

    Ok((
        [
            (header::CONTENT_TYPE, HeaderValue::from_static("application/zip")),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        archive,
    ))
}

/// `attachment; filename="<name>.zip"`, with `"` and `\` escaped inside the quoted string.
fn content_disposition(name: &str) -> Result<HeaderValue, ApiError> {
    let escaped = name.replace('\\', "\\\\").replace('"', "\\\"");
    Ok(HeaderValue::try_from(format!(
        "attachment; filename=\"{escaped}.zip\""
    ))?)
}

async fn modpack_load(
    State(state): State<Arc<AppState>>,
    Path(modpack): Path<ModpackName>,
) -> Result<ApiJson<ModListResponse>, ApiError> {
    let found = find_modpack(&state, &modpack)?;
    let mods_directory = state.config.mods_directory.clone();
    let mods = tokio::task::spawn_blocking(move || match mods_directory {
        Some(mods_directory) => found.load(&mods_directory),
        None => Err(ModpackError::NoModsDirectory),
    })
    .await?
    .map_err(ApiError::Load)?;
    info!("Loaded modpack {} into the factorio mods directory", modpack);

    Ok(ApiJson(mods.list_installed_mods()))
}

async fn modpack_mod_list(
    State(state): State<Arc<AppState>>,
    Path(modpack): Path<ModpackName>,
) -> Result<ApiJson<ModListResponse>, ApiError> {
    let mods = find_modpack(&state, &modpack)?
        .mod_list()
        .map_err(ApiError::ModList)?;
    Ok(ApiJson(mods.list_installed_mods()))
}

async fn modpack_mod_toggle(
    State(state): State<Arc<AppState>>,
    Path(modpack): Path<ModpackName>,
    body: Bytes,
) -> Result<ApiJson<ModToggleResponse>, ApiError> {
    let found = find_modpack(&state, &modpack)?;
    let data: ModToggleBody =
        serde_json::from_slice(&body).map_err(ApiError::InvalidToggleBody)?;

    let mut mods = found.mod_list().map_err(ApiError::Toggle)?;
    let enabled = mods
        .toggle_mod(&data.mod_name)
        .map_err(ApiError::Toggle)?;
    info!(
        "Toggled mod {} in modpack {} (enabled: {})",
        data.mod_name, modpack, enabled
    );

    Ok(ApiJson(enabled))
}
