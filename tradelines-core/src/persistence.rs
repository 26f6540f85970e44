//! Export/import of the order list and theme as flat JSON, with thin
//! file wrappers.
//!
//! Export is verbatim serde of the engine's sorted order list. Import
//! checks only structural shape (an array of objects); each entry then
//! goes through the normal insertion path, so per-entry validation and id
//! regeneration behave exactly like `add_order`.

use std::path::Path;

use serde_json::Value;
use thiserror::Error;

use crate::domain::OrderDraft;
use crate::engine::OrderEngine;
use crate::host::RenderSurface;
use crate::theme::Theme;

#[derive(Error, Debug)]
pub enum PersistError {
    #[error("expected a JSON array of order objects")]
    NotAnArray,

    #[error("expected a JSON theme object: {0}")]
    BadTheme(serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// How an import went: entries that failed draft parsing or store
/// validation are counted, not fatal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportOutcome {
    pub imported: usize,
    pub rejected: usize,
}

/// The order list as a flat JSON array, in display order.
pub fn export_orders<S: RenderSurface>(engine: &OrderEngine<S>) -> Value {
    serde_json::to_value(engine.orders()).expect("orders are always serializable")
}

/// Re-create orders from an exported array. Entries missing an id get a
/// fresh one from the engine; entries that fail parsing or validation are
/// skipped and counted.
pub fn import_orders<S: RenderSurface>(
    engine: &mut OrderEngine<S>,
    value: &Value,
) -> Result<ImportOutcome, PersistError> {
    let entries = value.as_array().ok_or(PersistError::NotAnArray)?;
    if !entries.iter().all(Value::is_object) {
        return Err(PersistError::NotAnArray);
    }

    let mut outcome = ImportOutcome::default();
    for entry in entries {
        let draft: OrderDraft = match serde_json::from_value(entry.clone()) {
            Ok(draft) => draft,
            Err(_) => {
                outcome.rejected += 1;
                continue;
            }
        };
        match engine.add_order(draft) {
            Ok(_) => outcome.imported += 1,
            Err(_) => outcome.rejected += 1,
        }
    }
    Ok(outcome)
}

/// The theme as a flat JSON object.
pub fn export_theme(theme: &Theme) -> Value {
    serde_json::to_value(theme).expect("theme is always serializable")
}

pub fn import_theme(value: &Value) -> Result<Theme, PersistError> {
    serde_json::from_value(value.clone()).map_err(PersistError::BadTheme)
}

/// Save the order list as pretty JSON, creating parent directories.
pub fn save_orders<S: RenderSurface>(
    path: &Path,
    engine: &OrderEngine<S>,
) -> Result<(), PersistError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(&engine.orders())?;
    std::fs::write(path, json)?;
    Ok(())
}

/// Load an order file and feed it through [`import_orders`].
pub fn load_orders<S: RenderSurface>(
    path: &Path,
    engine: &mut OrderEngine<S>,
) -> Result<ImportOutcome, PersistError> {
    let content = std::fs::read_to_string(path)?;
    let value: Value = serde_json::from_str(&content)?;
    import_orders(engine, &value)
}
