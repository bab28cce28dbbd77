use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("Failed to read script '{path}': {source}")]
    ReadScript {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse TOML script '{path}': {source}")]
    ParseToml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("Failed to parse JSON script '{path}': {source}")]
    ParseJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Unsupported script extension '{ext}'. Use .toml or .json.")]
    UnsupportedExtension { ext: String },
    #[error("Script file must have .toml or .json extension.")]
    MissingExtension,
    #[error("Invalid page url '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("Page url '{url}' has no host.")]
    MissingHost { url: String },
    #[error("Step {step}: unknown video '{name}'.")]
    UnknownVideo { step: usize, name: String },
    #[error("Step {step}: video '{name}' already exists.")]
    DuplicateVideo { step: usize, name: String },
    #[error("Step {step}: video '{name}' is already in the document.")]
    VideoAttached { step: usize, name: String },
}
