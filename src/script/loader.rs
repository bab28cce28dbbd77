use std::path::Path;

use crate::error::{AppError, AppResult, ScriptError};

use super::types::PageScript;

/// Reads a page script from a `.toml` or `.json` file.
///
/// # Errors
///
/// Returns an error when the file cannot be read or parsed.
pub fn load_script(path: &Path) -> AppResult<PageScript> {
    let content = std::fs::read_to_string(path).map_err(|err| {
        AppError::script(ScriptError::ReadScript {
            path: path.to_path_buf(),
            source: err,
        })
    })?;
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("toml") => toml::from_str(&content).map_err(|err| {
            AppError::script(ScriptError::ParseToml {
                path: path.to_path_buf(),
                source: err,
            })
        }),
        Some("json") => serde_json::from_str(&content).map_err(|err| {
            AppError::script(ScriptError::ParseJson {
                path: path.to_path_buf(),
                source: err,
            })
        }),
        Some(ext) => Err(AppError::script(ScriptError::UnsupportedExtension {
            ext: ext.to_owned(),
        })),
        None => Err(AppError::script(ScriptError::MissingExtension)),
    }
}
