use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum EnrichError {
    #[error("condensed SDRF file {} doesn't exist", .0.display())]
    #[diagnostic(help("every experiment directory must contain <id>.condensed-sdrf.tsv"))]
    MissingSdrf(PathBuf),

    #[error("failed to parse XML: {0}")]
    XmlParse(String),

    #[error("failed to write XML: {0}")]
    XmlWrite(String),

    #[error("failed to read config file at {0}")]
    ConfigRead(PathBuf),

    #[error("failed to parse JSON config: {0}")]
    ConfigParse(String),

    #[error("invalid config value: {0}")]
    InvalidConfig(String),

    #[error("filesystem error: {0}")]
    Filesystem(String),
}
