// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! CSV preview and validation for bulk catalog import.
//!
//! This module parses and validates catalog rows without mutating state.
//! The caller decides what to do with the valid rows; nothing is imported
//! here.

use crate::ApiError;
use csv::StringRecord;
use libris::State;
use libris_domain::{Book, MediaKind, SerialNumber, validate_book_fields};
use std::collections::{HashMap, HashSet};
use std::str::FromStr;
use thiserror::Error;

/// Errors in the shape of the uploaded CSV as a whole.
///
/// Per-row problems are reported in [`CsvRowResult::errors`] instead, so
/// one bad row never sinks the rest of the file.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ImportError {
    /// The CSV header row is missing required columns.
    #[error("Missing required headers: {0}")]
    MissingHeaders(String),

    /// The CSV could not be parsed at all.
    #[error("Unreadable CSV: {0}")]
    Unreadable(String),
}

impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        Self::InvalidCsvFormat {
            reason: err.to_string(),
        }
    }
}

/// A single row result from CSV preview validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvRowResult {
    /// The row number (1-based, excluding header).
    pub row_number: usize,
    /// The parsed serial number (if present).
    pub serial: Option<String>,
    /// The parsed title (if present).
    pub title: Option<String>,
    /// The parsed author (if present).
    pub author: Option<String>,
    /// The parsed copy count (if valid).
    pub copies: Option<u32>,
    /// The row status.
    pub status: CsvRowStatus,
    /// Zero or more validation errors.
    pub errors: Vec<String>,
}

/// Status of a CSV row validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CsvRowStatus {
    /// Row is valid and can be imported.
    Valid,
    /// Row has validation errors and cannot be imported.
    Invalid,
}

/// Result of CSV preview validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvPreviewResult {
    /// Per-row validation results.
    pub rows: Vec<CsvRowResult>,
    /// Total number of rows.
    pub total_rows: usize,
    /// Number of valid rows.
    pub valid_count: usize,
    /// Number of invalid rows.
    pub invalid_count: usize,
}

/// Required CSV column headers (case-insensitive, normalized).
const REQUIRED_HEADERS: &[&str] = &["serial", "title", "author", "copies"];

/// Normalizes a CSV header string for case-insensitive, whitespace-tolerant
/// matching.
fn normalize_header(header: &str) -> String {
    header.trim().to_lowercase().replace(' ', "_")
}

/// Validates that all required headers are present in the CSV.
fn validate_headers(headers: &StringRecord) -> Result<HashMap<String, usize>, ImportError> {
    let mut header_map: HashMap<String, usize> = HashMap::new();
    for (idx, header) in headers.iter().enumerate() {
        header_map.insert(normalize_header(header), idx);
    }

    let missing: Vec<String> = REQUIRED_HEADERS
        .iter()
        .filter(|required| !header_map.contains_key(**required))
        .map(|required| String::from(*required))
        .collect();

    if !missing.is_empty() {
        return Err(ImportError::MissingHeaders(missing.join(", ")));
    }

    Ok(header_map)
}

/// Parses a CSV row into a `Book` if possible.
fn parse_csv_row(
    record: &StringRecord,
    header_map: &HashMap<String, usize>,
) -> Result<Book, Vec<String>> {
    let mut errors: Vec<String> = Vec::new();

    let get_field = |name: &str| -> Option<String> {
        header_map
            .get(name)
            .and_then(|&idx| record.get(idx))
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    };

    let mut required = |name: &str| -> String {
        get_field(name).unwrap_or_else(|| {
            errors.push(format!("{name}: required field is missing or empty"));
            String::new()
        })
    };

    let serial_str: String = required("serial");
    let title: String = required("title");
    let author: String = required("author");
    let copies_str: String = required("copies");

    let copies: Option<u32> = if copies_str.is_empty() {
        None
    } else {
        match copies_str.parse::<u32>() {
            Ok(n) => Some(n),
            Err(_) => {
                errors.push(format!("copies: invalid number '{copies_str}'"));
                None
            }
        }
    };

    let genre: Option<String> = get_field("genre");

    // Kind is optional and defaults to "book".
    let kind: MediaKind = match get_field("kind") {
        None => MediaKind::Book,
        Some(value) => match MediaKind::from_str(&value) {
            Ok(kind) => kind,
            Err(_) => {
                errors.push(format!(
                    "kind: invalid value '{value}' (must be 'book' or 'movie')"
                ));
                MediaKind::Book
            }
        },
    };

    if !errors.is_empty() {
        return Err(errors);
    }

    let book: Book = Book::new(
        SerialNumber::new(&serial_str),
        title,
        author,
        genre,
        kind,
        copies.unwrap_or_default(),
    );

    if let Err(e) = validate_book_fields(&book) {
        return Err(vec![e.to_string()]);
    }

    Ok(book)
}

/// Previews a CSV of catalog rows against the current state.
///
/// Each row is validated independently: field presence, copy count, media
/// kind, serial uniqueness against the existing catalog, and serial
/// uniqueness within the file itself. Nothing is imported.
///
/// # Arguments
///
/// * `csv_text` - The raw CSV text, header row first
/// * `state` - The current state, for duplicate-serial detection
///
/// # Errors
///
/// Returns `ImportError` if the header row is missing required columns or
/// the CSV is unreadable. Per-row problems never fail the whole preview.
pub fn preview_books_csv(csv_text: &str, state: &State) -> Result<CsvPreviewResult, ImportError> {
    let mut reader = csv::Reader::from_reader(csv_text.as_bytes());

    let headers: StringRecord = reader
        .headers()
        .map_err(|e| ImportError::Unreadable(e.to_string()))?
        .clone();
    let header_map: HashMap<String, usize> = validate_headers(&headers)?;

    let mut rows: Vec<CsvRowResult> = Vec::new();
    let mut seen_serials: HashSet<String> = HashSet::new();

    for (idx, record) in reader.records().enumerate() {
        let row_number: usize = idx + 1;
        let record: StringRecord = match record {
            Ok(record) => record,
            Err(e) => {
                rows.push(CsvRowResult {
                    row_number,
                    serial: None,
                    title: None,
                    author: None,
                    copies: None,
                    status: CsvRowStatus::Invalid,
                    errors: vec![format!("unreadable row: {e}")],
                });
                continue;
            }
        };

        match parse_csv_row(&record, &header_map) {
            Ok(book) => {
                let mut errors: Vec<String> = Vec::new();
                let serial: String = book.serial.value().to_string();

                if state.find_book(&book.serial).is_some() {
                    errors.push(format!(
                        "serial: '{serial}' already exists in the catalog"
                    ));
                }
                if !seen_serials.insert(serial.clone()) {
                    errors.push(format!("serial: '{serial}' appears twice in this file"));
                }

                let status: CsvRowStatus = if errors.is_empty() {
                    CsvRowStatus::Valid
                } else {
                    CsvRowStatus::Invalid
                };
                rows.push(CsvRowResult {
                    row_number,
                    serial: Some(serial),
                    title: Some(book.title),
                    author: Some(book.author),
                    copies: Some(book.copies),
                    status,
                    errors,
                });
            }
            Err(errors) => {
                let get_field = |name: &str| -> Option<String> {
                    header_map
                        .get(name)
                        .and_then(|&idx| record.get(idx))
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                };
                rows.push(CsvRowResult {
                    row_number,
                    serial: get_field("serial"),
                    title: get_field("title"),
                    author: get_field("author"),
                    copies: get_field("copies").and_then(|s| s.parse().ok()),
                    status: CsvRowStatus::Invalid,
                    errors,
                });
            }
        }
    }

    let total_rows: usize = rows.len();
    let valid_count: usize = rows
        .iter()
        .filter(|r| r.status == CsvRowStatus::Valid)
        .count();

    Ok(CsvPreviewResult {
        total_rows,
        valid_count,
        invalid_count: total_rows - valid_count,
        rows,
    })
}
