//! Inventory export command.
//!
//! # Usage
//!
//! ```bash
//! # Save today's inventory as CSV in the current directory
//! maison-cli inventory export
//!
//! # XLSX to a chosen path, replacing an existing file
//! maison-cli inventory export --format xlsx --output stock.xlsx --force
//! ```
//!
//! # Environment Variables
//!
//! - `MAISON_API_URL` - Origin of the Maison REST backend
//! - `MAISON_ADMIN_TOKEN` - Operator bearer token

use std::io::Write;
use std::path::{Path, PathBuf};

use maison_client::{ApiClient, ApiConfig, ApiError, Download};
use maison_core::AccessToken;
use maison_core::inventory::ExportFormat;
use secrecy::{ExposeSecret, SecretString};
use tempfile::NamedTempFile;
use thiserror::Error;
use url::Url;

/// Errors that can occur during an export.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Environment variable has an unusable value.
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(&'static str, String),

    /// Backend request failed.
    #[error("Backend error: {0}")]
    Api(#[from] ApiError),

    /// The backend answered with an empty file.
    #[error("The backend returned an empty export")]
    Empty,

    /// Target file exists and `--force` was not given.
    #[error("{0} already exists (use --force to replace it)")]
    Exists(PathBuf),

    /// Writing the file failed.
    #[error("Could not write {0}: {1}")]
    Io(PathBuf, std::io::Error),
}

/// Export settings resolved from flags.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    pub format: ExportFormat,
    /// File to write; defaults to the backend's file name in the current directory.
    pub output: Option<PathBuf>,
    pub force: bool,
}

/// Download the inventory export and save it.
///
/// # Errors
///
/// Returns an error if configuration is missing, the backend call fails, or
/// the file cannot be written.
pub async fn export(options: &ExportOptions) -> Result<PathBuf, ExportError> {
    dotenvy::dotenv().ok();

    let base_url = std::env::var("MAISON_API_URL")
        .map_err(|_| ExportError::MissingEnvVar("MAISON_API_URL"))?;
    let base_url = Url::parse(&base_url)
        .map_err(|e| ExportError::InvalidEnvVar("MAISON_API_URL", e.to_string()))?;
    let token = std::env::var("MAISON_ADMIN_TOKEN")
        .map(SecretString::from)
        .map_err(|_| ExportError::MissingEnvVar("MAISON_ADMIN_TOKEN"))?;

    let client = ApiClient::new(&ApiConfig::new(base_url))?;
    export_with(&client, &token, options, Path::new(".")).await
}

/// Download with an existing client and save under `dir` unless an explicit
/// output path is given.
///
/// # Errors
///
/// See [`export`].
pub async fn export_with(
    client: &ApiClient,
    token: &SecretString,
    options: &ExportOptions,
    dir: &Path,
) -> Result<PathBuf, ExportError> {
    let token = AccessToken::new(token.expose_secret());
    tracing::info!(format = options.format.as_str(), "Requesting inventory export...");
    let download = client.export_inventory(&token, options.format).await?;

    let target = options
        .output
        .clone()
        .unwrap_or_else(|| dir.join(file_name(&download, options.format)));
    save(&download, &target, options.force)?;

    tracing::info!(
        path = %target.display(),
        bytes = download.bytes.len(),
        "Inventory export saved"
    );
    Ok(target)
}

/// The backend's file name without any directory parts.
fn file_name(download: &Download, format: ExportFormat) -> String {
    Path::new(&download.filename)
        .file_name()
        .and_then(|name| name.to_str())
        .filter(|name| !name.is_empty())
        .map_or_else(
            || format!("inventory.{}", format.extension()),
            str::to_string,
        )
}

/// Write the file next to its final location, then move it into place.
///
/// A failed or interrupted write never leaves a truncated file at `target`.
fn save(download: &Download, target: &Path, force: bool) -> Result<(), ExportError> {
    if download.bytes.is_empty() {
        return Err(ExportError::Empty);
    }
    if target.exists() && !force {
        return Err(ExportError::Exists(target.to_path_buf()));
    }

    let io_err = |e: std::io::Error| ExportError::Io(target.to_path_buf(), e);
    let dir = target
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let mut file = NamedTempFile::new_in(dir).map_err(io_err)?;
    file.write_all(&download.bytes).map_err(io_err)?;
    persist(file, target, force)
}

/// Move the finished temp file into place. Without `force` the rename fails
/// if the target appeared after the existence check.
fn persist(file: NamedTempFile, target: &Path, force: bool) -> Result<(), ExportError> {
    let result = if force {
        file.persist(target)
    } else {
        file.persist_noclobber(target)
    };
    result.map(drop).map_err(|e| {
        if !force && e.error.kind() == std::io::ErrorKind::AlreadyExists {
            ExportError::Exists(target.to_path_buf())
        } else {
            ExportError::Io(target.to_path_buf(), e.error)
        }
    })
}
