//! The cereal listing served by `/api/cereals`, loaded from a flat CSV.

use std::path::Path;

use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Cannot read cereal listing: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cereal listing is missing the {0} column")]
    MissingColumn(&'static str),
}

#[derive(Debug, Clone, Serialize)]
pub struct Cereal {
    pub brand: String,
    pub ingredients: String,
}

/// Parse `cereal.csv`. Requires `Brand_Name` and `Ingredients` headers;
/// ingredient fields are typically quoted since they contain commas. Rows
/// without a brand are skipped.
pub fn load_cereals(path: &Path) -> Result<Vec<Cereal>, CatalogError> {
    let text = std::fs::read_to_string(path)?;
    let mut lines = text.lines();

    let header = lines.next().unwrap_or_default();
    let columns = split_csv_line(header);
    let brand_col = column_index(&columns, "Brand_Name")
        .ok_or(CatalogError::MissingColumn("Brand_Name"))?;
    let ingredients_col = column_index(&columns, "Ingredients")
        .ok_or(CatalogError::MissingColumn("Ingredients"))?;

    let mut cereals = Vec::new();
    for line in lines {
        if line.trim().is_empty() {
            continue;
        }
        let fields = split_csv_line(line);
        let brand = fields.get(brand_col).map(|s| s.trim()).unwrap_or_default();
        if brand.is_empty() {
            continue;
        }
        let ingredients = fields
            .get(ingredients_col)
            .map(|s| s.trim())
            .unwrap_or_default();
        cereals.push(Cereal {
            brand: brand.to_string(),
            ingredients: ingredients.to_string(),
        });
    }

    tracing::info!(path = %path.display(), count = cereals.len(), "cereal listing loaded");
    Ok(cereals)
}

fn column_index(columns: &[String], name: &str) -> Option<usize> {
    columns.iter().position(|c| c.trim() == name)
}

/// Split one CSV line, honoring double-quoted fields with `""` escapes.
fn split_csv_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    current.push('"');
                } else {
                    in_quotes = false;
                }
            }
            '"' => in_quotes = true,
            ',' if !in_quotes => fields.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    fields.push(current);
    fields
}
