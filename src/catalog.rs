//! Opponent catalog: the list of opponents a level can draw from.
//!
//! The file-backed catalog re-reads its source on every call so edits take effect
//! for the next level without a restart.

use calamine::{open_workbook_auto, Reader};
use rocket::serde::{Deserialize, Serialize};
use rocket_okapi::JsonSchema;
use std::path::{Path, PathBuf};

use crate::error::{GameError, GameResult};
use crate::matchup::{TypeLabel, Typed};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub struct OpponentDef {
    pub name: String,
    pub primary_type: TypeLabel,
    pub secondary_type: TypeLabel,
}

impl OpponentDef {
    pub fn new(name: &str, primary_type: TypeLabel, secondary_type: TypeLabel) -> Self {
        OpponentDef {
            name: name.to_string(),
            primary_type,
            secondary_type,
        }
    }
}

impl Typed for OpponentDef {
    fn primary_type(&self) -> TypeLabel {
        self.primary_type
    }
    fn secondary_type(&self) -> TypeLabel {
        self.secondary_type
    }
}

pub trait OpponentCatalog: Send + Sync {
    /// Never returns an empty list; an empty source is a catalog error.
    fn load_opponents(&self) -> GameResult<Vec<OpponentDef>>;
}

/// Fixed in-memory catalog.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    pub opponents: Vec<OpponentDef>,
}

impl StaticCatalog {
    pub fn new(opponents: Vec<OpponentDef>) -> Self {
        StaticCatalog { opponents }
    }
}

impl OpponentCatalog for StaticCatalog {
    fn load_opponents(&self) -> GameResult<Vec<OpponentDef>> {
        if self.opponents.is_empty() {
            return Err(GameError::Catalog("No opponents found".to_string()));
        }
        Ok(self.opponents.clone())
    }
}

/// Catalog file on disk. Comma-delimited text, or the first sheet of a spreadsheet
/// (`.xlsx`, `.xlsm`, `.xlsb`, `.xls`, `.ods`). Either way a header row comes first,
/// then `name,primary_type,secondary_type` rows.
#[derive(Debug, Clone)]
pub struct FileCatalog {
    pub path: PathBuf,
}

impl FileCatalog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileCatalog { path: path.into() }
    }
}

impl OpponentCatalog for FileCatalog {
    fn load_opponents(&self) -> GameResult<Vec<OpponentDef>> {
        let opponents = if is_spreadsheet(&self.path) {
            read_spreadsheet(&self.path)?
        } else {
            let text = std::fs::read_to_string(&self.path).map_err(|e| {
                GameError::Catalog(format!("failed to read {}: {}", self.path.display(), e))
            })?;
            parse_opponents(&text)?
        };
        if opponents.is_empty() {
            return Err(GameError::Catalog(format!(
                "No opponents found in {}",
                self.path.display()
            )));
        }
        Ok(opponents)
    }
}

fn is_spreadsheet(path: &Path) -> bool {
    const SPREADSHEET_EXTENSIONS: [&str; 5] = ["xlsx", "xlsm", "xlsb", "xls", "ods"];
    let Some(ext) = path.extension().and_then(|ext| ext.to_str()) else {
        return false;
    };
    SPREADSHEET_EXTENSIONS.iter().any(|known| ext.eq_ignore_ascii_case(known))
}

fn read_spreadsheet(path: &Path) -> GameResult<Vec<OpponentDef>> {
    let open_err = |e: calamine::Error| {
        GameError::Catalog(format!("failed to read {}: {}", path.display(), e))
    };
    let mut workbook = open_workbook_auto(path).map_err(open_err)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| GameError::Catalog(format!("{} has no sheets", path.display())))?
        .map_err(open_err)?;

    let mut rows = range.rows();
    // Sheets pad every row to the widest one, so the header decides the column count.
    let width = rows.next().map_or(0, |header| {
        header
            .iter()
            .rposition(|cell| !cell.to_string().trim().is_empty())
            .map_or(0, |last| last + 1)
    });
    let mut opponents = Vec::new();
    for (idx, row) in rows.enumerate() {
        let cells: Vec<String> = row.iter().take(width).map(|cell| cell.to_string()).collect();
        if cells.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }
        let fields: Vec<&str> = cells.iter().map(|cell| cell.trim()).collect();
        if let Some(opponent) = parse_record(idx + 2, &fields)? {
            opponents.push(opponent);
        }
    }
    Ok(opponents)
}

/// Parse catalog text. The first line is a header and is ignored.
///
/// Rows with a blank required field are skipped. A two-column row (`name,type`)
/// fights with the same type in both slots.
pub fn parse_opponents(text: &str) -> GameResult<Vec<OpponentDef>> {
    let mut opponents = Vec::new();
    for (idx, line) in text.lines().enumerate().skip(1) {
        if line.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        if let Some(opponent) = parse_record(idx + 1, &fields)? {
            opponents.push(opponent);
        }
    }
    Ok(opponents)
}

/// One data row, already split and trimmed. `Ok(None)` means the row is skipped.
fn parse_record(line_no: usize, fields: &[&str]) -> GameResult<Option<OpponentDef>> {
    let (name, primary, secondary) = match fields {
        [name, primary] => (*name, *primary, *primary),
        [name, primary, secondary, ..] => (*name, *primary, *secondary),
        _ => {
            log::warn!("Skipping catalog line {}: expected at least two fields", line_no);
            return Ok(None);
        }
    };
    if name.is_empty() || primary.is_empty() || secondary.is_empty() {
        log::debug!("Skipping catalog line {}: blank field", line_no);
        return Ok(None);
    }
    let parse = |raw: &str| {
        raw.parse::<TypeLabel>()
            .map_err(|e| GameError::Catalog(format!("line {}: {}", line_no, e)))
    };
    Ok(Some(OpponentDef {
        name: name.to_string(),
        primary_type: parse(primary)?,
        secondary_type: parse(secondary)?,
    }))
}
