//! Reading raw flow graphs and inventory documents from disk.
//!
//! Any JSON value is accepted as a flow graph; shape problems are the core's
//! business and come back as warnings. Only unreadable files and invalid JSON
//! are errors here.

use std::fs;
use std::io;
use std::path::Path;

use flowmap_core::NormalizeOptions;
use flowmap_core::error::ErrorCode;
use serde_json::Value;
use tracing::debug;

use crate::output::CliError;

fn read_file(path: &Path) -> Result<String, CliError> {
    fs::read_to_string(path).map_err(|err| {
        if err.kind() == io::ErrorKind::NotFound {
            CliError::from_code(ErrorCode::InputNotFound, path.display())
        } else {
            CliError::from_code(
                ErrorCode::InternalUnexpected,
                format!("failed to read {}: {err}", path.display()),
            )
        }
    })
}

/// Load a raw flow graph document.
pub fn read_flow_graph(path: &Path) -> Result<Value, CliError> {
    let content = read_file(path)?;
    let raw: Value = serde_json::from_str(&content).map_err(|err| {
        CliError::from_code(ErrorCode::InputParseError, format!("{}: {err}", path.display()))
    })?;
    debug!(path = %path.display(), bytes = content.len(), "loaded flow graph");
    Ok(raw)
}

/// Load optional inventory lookups. `None` yields empty options.
pub fn read_inventory(path: Option<&Path>) -> Result<NormalizeOptions, CliError> {
    let Some(path) = path else {
        return Ok(NormalizeOptions::default());
    };
    let content = read_file(path)?;
    serde_json::from_str(&content).map_err(|err| {
        CliError::from_code(
            ErrorCode::InventoryParseError,
            format!("{}: {err}", path.display()),
        )
    })
}
