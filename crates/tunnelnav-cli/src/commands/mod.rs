// Subcommand handlers. main.rs parses arguments and dispatches here.

pub mod buildings;
pub mod route;
pub mod search;

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use tunnelnav_lib::{load_campus, Campus};

/// Environment variable consulted when `--data` is not given.
pub const DATA_PATH_ENV: &str = "TUNNELNAV_DATA_PATH";

/// Pick the campus data file from the flag, falling back to the environment.
pub fn resolve_data_path(explicit: Option<PathBuf>) -> Result<PathBuf> {
    explicit
        .or_else(|| {
            std::env::var_os(DATA_PATH_ENV)
                .filter(|value| !value.is_empty())
                .map(PathBuf::from)
        })
        .ok_or_else(|| {
            anyhow!(
                "no campus data configured; pass --data <PATH> or set {}",
                DATA_PATH_ENV
            )
        })
}

pub fn open_campus(path: &Path) -> Result<Campus> {
    load_campus(path).with_context(|| format!("failed to load campus from {}", path.display()))
}
