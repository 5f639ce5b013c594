//! CSV decoder
//!
//! Follows the usual dialect of spreadsheet exports: a field starting with
//! `"` is quoted and may then hold delimiters, line breaks and `""` for a
//! literal quote. Rows end on `\n`, `\r\n` or a lone `\r`.

use super::types::RecordDecoder;
use crate::error::{Error, Result};
use crate::types::{JsonObject, JsonValue};
use tracing::debug;

const BOM: char = '\u{feff}';
const DELIMITER: char = ',';

/// Comma separated decoder with a header row
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvDecoder;

impl CsvDecoder {
    /// Create a new CSV decoder
    pub fn new() -> Self {
        Self
    }
}

impl RecordDecoder for CsvDecoder {
    fn decode(&self, body: &str) -> Result<Vec<JsonObject>> {
        let body = body.strip_prefix(BOM).unwrap_or(body);
        let mut rows = parse_rows(body, DELIMITER)?.into_iter();

        let Some(headers) = rows.next() else {
            return Ok(Vec::new());
        };

        let records: Vec<JsonObject> = rows
            .map(|fields| {
                let mut fields = fields.into_iter();
                headers
                    .iter()
                    .map(|header| (header.clone(), to_value(fields.next())))
                    .collect()
            })
            .collect();

        debug!("decoded {} CSV records with {} columns", records.len(), headers.len());
        Ok(records)
    }
}

/// Missing and empty fields become `null`, everything else stays a string
fn to_value(field: Option<String>) -> JsonValue {
    match field {
        Some(s) if !s.is_empty() => JsonValue::String(s),
        _ => JsonValue::Null,
    }
}

/// Split CSV text into rows of fields, skipping blank lines
fn parse_rows(body: &str, delimiter: char) -> Result<Vec<Vec<String>>> {
    let mut rows = Vec::new();
    let mut row: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    // A quoted empty field makes the row non-blank
    let mut quoted = false;
    let mut line = 1usize;
    let mut quote_line = 1usize;
    let mut chars = body.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    field.push('"');
                    chars.next();
                }
                '"' => in_quotes = false,
                '\n' => {
                    line += 1;
                    field.push(c);
                }
                _ => field.push(c),
            }
            continue;
        }

        match c {
            '"' if field.is_empty() && !quoted => {
                in_quotes = true;
                quoted = true;
                quote_line = line;
            }
            c if c == delimiter => {
                row.push(std::mem::take(&mut field));
                quoted = false;
            }
            '\r' | '\n' => {
                if c == '\r' && chars.peek() == Some(&'\n') {
                    chars.next();
                }
                line += 1;
                end_row(&mut rows, &mut row, &mut field, quoted);
                quoted = false;
            }
            _ => field.push(c),
        }
    }

    if in_quotes {
        return Err(Error::csv(format!(
            "unterminated quoted field starting on line {quote_line}"
        )));
    }

    end_row(&mut rows, &mut row, &mut field, quoted);
    Ok(rows)
}

fn end_row(rows: &mut Vec<Vec<String>>, row: &mut Vec<String>, field: &mut String, quoted: bool) {
    if row.is_empty() && field.is_empty() && !quoted {
        return;
    }
    row.push(std::mem::take(field));
    rows.push(std::mem::take(row));
}
