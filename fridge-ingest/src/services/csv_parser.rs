//! CSV upload parsing and row validation
//!
//! Expected layout (header row required, discarded after column lookup):
//! ```text
//! ingredient,description,pantry_days,fridge_days,freezer_days
//! Milk,Dairy,,7,90
//! ```
//! Recognised header names select columns by name; anything not recognised
//! falls back to the position shown above.

use csv::{ReaderBuilder, StringRecord, Trim};
use thiserror::Error;

use crate::models::IngredientRow;

/// Upload could not be decoded as CSV
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),
}

/// Row rejected before any external call
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Missing ingredient name")]
    MissingIngredientName,

    #[error("Invalid number in expiration days ({column} = '{value}', expected a whole number of days, 0 or more)")]
    InvalidNumber { column: &'static str, value: String },
}

/// Column of the ingredient upload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Column {
    Ingredient,
    Description,
    PantryDays,
    FridgeDays,
    FreezerDays,
}

impl Column {
    const ALL: [Column; 5] = [
        Column::Ingredient,
        Column::Description,
        Column::PantryDays,
        Column::FridgeDays,
        Column::FreezerDays,
    ];

    fn position(self) -> usize {
        self as usize
    }

    fn name(self) -> &'static str {
        match self {
            Column::Ingredient => "ingredient",
            Column::Description => "description",
            Column::PantryDays => "pantry_days",
            Column::FridgeDays => "fridge_days",
            Column::FreezerDays => "freezer_days",
        }
    }

    fn aliases(self) -> &'static [&'static str] {
        match self {
            Column::Ingredient => &["ingredient", "name", "ingredient_name"],
            Column::Description => &["description"],
            Column::PantryDays => &["pantry_days", "pantry_expire", "pantry"],
            Column::FridgeDays => &["fridge_days", "fridge_expire", "fridge"],
            Column::FreezerDays => &["freezer_days", "freezer_expire", "freezer"],
        }
    }
}

/// Cell index per column, derived from the header row
#[derive(Debug, Clone, PartialEq, Eq)]
struct ColumnMap {
    indices: [Option<usize>; 5],
}

impl ColumnMap {
    fn from_headers(headers: &StringRecord) -> Self {
        let normalized: Vec<String> = headers
            .iter()
            .map(|h| h.trim().to_ascii_lowercase().replace([' ', '-'], "_"))
            .collect();

        let mut indices = [None; 5];
        for column in Column::ALL {
            indices[column.position()] = normalized
                .iter()
                .position(|h| column.aliases().contains(&h.as_str()));
        }

        // Unrecognised columns keep their default position unless a named
        // column already claimed it.
        let claimed: Vec<usize> = indices.iter().flatten().copied().collect();
        for column in Column::ALL {
            let slot = &mut indices[column.position()];
            if slot.is_none() && !claimed.contains(&column.position()) {
                *slot = Some(column.position());
            }
        }

        Self { indices }
    }

    fn cell(&self, record: &StringRecord, column: Column) -> String {
        self.indices[column.position()]
            .and_then(|idx| record.get(idx))
            .map(|cell| cell.trim().to_string())
            .unwrap_or_default()
    }
}

/// Raw, trimmed cells of one data row
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CsvRow {
    pub ingredient: String,
    pub description: String,
    pub pantry_days: String,
    pub fridge_days: String,
    pub freezer_days: String,
}

impl CsvRow {
    /// Ingredient name, if the cell is non-empty
    pub fn name(&self) -> Option<&str> {
        Some(self.ingredient.as_str()).filter(|name| !name.is_empty())
    }

    /// Validate cells into an [`IngredientRow`]
    ///
    /// Expiration columns are checked before the name. Empty numeric cells
    /// become `None`.
    pub fn validate(&self) -> Result<IngredientRow, ValidationError> {
        let pantry_days = parse_days(Column::PantryDays, &self.pantry_days)?;
        let fridge_days = parse_days(Column::FridgeDays, &self.fridge_days)?;
        let freezer_days = parse_days(Column::FreezerDays, &self.freezer_days)?;

        let ingredient = self
            .name()
            .ok_or(ValidationError::MissingIngredientName)?
            .to_string();

        let description = Some(self.description.clone()).filter(|d| !d.is_empty());

        Ok(IngredientRow {
            ingredient,
            description,
            pantry_days,
            fridge_days,
            freezer_days,
        })
    }
}

fn parse_days(column: Column, value: &str) -> Result<Option<u32>, ValidationError> {
    if value.is_empty() {
        return Ok(None);
    }

    value
        .parse::<u32>()
        .map(Some)
        .map_err(|_| ValidationError::InvalidNumber {
            column: column.name(),
            value: value.to_string(),
        })
}

/// Decode an upload into data rows, in file order
///
/// The header row is consumed for column lookup. Lines holding nothing but
/// whitespace are dropped; any line with a delimiter is a data row, even if
/// every cell is blank.
pub fn parse_upload(content: &[u8]) -> Result<Vec<CsvRow>, ParseError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(content);

    let columns = ColumnMap::from_headers(reader.headers()?);
    tracing::debug!(?columns, "Resolved CSV column layout");

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        if is_whitespace_line(&record) {
            continue;
        }

        rows.push(CsvRow {
            ingredient: columns.cell(&record, Column::Ingredient),
            description: columns.cell(&record, Column::Description),
            pantry_days: columns.cell(&record, Column::PantryDays),
            fridge_days: columns.cell(&record, Column::FridgeDays),
            freezer_days: columns.cell(&record, Column::FreezerDays),
        });
    }

    Ok(rows)
}

/// Single empty field: the source line had no delimiter and only whitespace
fn is_whitespace_line(record: &StringRecord) -> bool {
    record.len() == 1 && record.get(0).is_some_and(|cell| cell.trim().is_empty())
}
