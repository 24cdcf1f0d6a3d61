use axum::{
    http::{header::InvalidHeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use modpack_core::api::ModpackName;
use tokio::task::JoinError;
use tracing::error;

use super::{models::ModpackError, response::ApiJson};

#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error("Error creating modpack map: {0}")]
    ModpackMap(#[source] ModpackError),
    #[error("requested modPack {{{0}}} does not exist")]
    NotFound(ModpackName),
    #[error("Error unmarshalling modPack request JSON: {0}")]
    InvalidCreateBody(#[source] serde_json::Error),
    #[error("Error unmarshalling modPack struct JSON: {0}")]
    InvalidToggleBody(#[source] serde_json::Error),
    #[error("Error creating modpack file: {0}")]
    Create(#[source] ModpackError),
    #[error("Error deleting modpack file: {0}")]
    Delete(#[source] ModpackError),
    #[error("error on walking over the modpack: {0}")]
    Download(#[source] ModpackError),
    #[error("Error building download headers: {0}")]
    DownloadHeader(#[from] InvalidHeaderValue),
    #[error("Error loading modpack file: {0}")]
    Load(#[source] ModpackError),
    #[error("Error reading mod list of modpack: {0}")]
    ModList(#[source] ModpackError),
    #[error("Error toggling mod inside modPack: {0}")]
    Toggle(#[source] ModpackError),
    #[error("background task failed: {0}")]
    Background(#[from] JoinError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidCreateBody(_) | ApiError::InvalidToggleBody(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::ModpackMap(_)
            | ApiError::Create(_)
            | ApiError::Delete(_)
            | ApiError::Download(_)
            | ApiError::DownloadHeader(_)
            | ApiError::Load(_)
            | ApiError::ModList(_)
            | ApiError::Toggle(_)
            | ApiError::Background(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        error!("{}", message);
        (self.status(), ApiJson(message)).into_response()
    }
}
