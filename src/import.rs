//! CSV contact import: header normalization, row validation and mapping.
//!
//! The first row is the header. Header names are normalized (trim,
//! lowercase, spaces to underscores) so `"Full Name"` and `"full_name"`
//! address the same field. A row is kept only if it carries a non-empty
//! email, full name or company name; rows failing that are dropped and
//! counted, not itemized. Record-level parse failures are collected as
//! row-error strings.

use csv::ReaderBuilder;
use std::collections::HashMap;

use crate::error::AppError;

pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

pub const SOURCE_ADMIN_UPLOAD: &str = "admin_upload";

pub const CONTACTS_TEMPLATE: &str = "\
Full Name,Email,Company Name,Title,LinkedIn URL,Location,Website,Firm Type
Jane Doe,jane@example.com,Example Capital,Partner,https://linkedin.com/in/janedoe,Berlin,https://example.com,vc
";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedContact {
    pub full_name: String,
    pub email: String,
    pub company_name: String,
    pub title: String,
    pub linkedin_url: String,
    pub location: String,
    pub website: String,
    pub firm_type: String,
}

#[derive(Debug, Default)]
pub struct ImportParse {
    pub rows: Vec<ParsedContact>,
    pub row_errors: Vec<String>,
    pub dropped: usize,
}

/// "Full Name " -> "full_name"
pub fn normalize_header(raw: &str) -> String {
    raw.trim().to_lowercase().replace(' ', "_")
}

/// Extension and size checks, run before any parsing.
pub fn validate_upload(file_name: &str, size: usize) -> Result<(), AppError> {
    if !file_name.to_lowercase().ends_with(".csv") {
        return Err(AppError::Validation(format!(
            "unsupported file type: {} (expected .csv)",
            file_name
        )));
    }
    if size == 0 {
        return Err(AppError::Validation("uploaded file is empty".to_string()));
    }
    if size > MAX_UPLOAD_BYTES {
        return Err(AppError::Validation(format!(
            "file exceeds the {} MiB upload limit",
            MAX_UPLOAD_BYTES / (1024 * 1024)
        )));
    }
    Ok(())
}

#[tracing::instrument(skip(data), fields(bytes = data.len()))]
pub fn parse_contacts_csv(data: &[u8]) -> Result<ImportParse, AppError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(data);

    let headers: HashMap<String, usize> = reader
        .headers()
        .map_err(|e| AppError::Validation(format!("could not read CSV header: {}", e)))?
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header(name), idx))
        .collect();

    let field = |record: &csv::StringRecord, name: &str| -> String {
        headers
            .get(name)
            .and_then(|&idx| record.get(idx))
            .unwrap_or("")
            .trim()
            .to_string()
    };

    let mut outcome = ImportParse::default();

    for (line, result) in reader.records().enumerate() {
        let record = match result {
            Ok(rec) => rec,
            Err(e) => {
                outcome.row_errors.push(format!("row {}: {}", line + 2, e));
                continue;
            }
        };

        let contact = ParsedContact {
            full_name: field(&record, "full_name"),
            email: field(&record, "email").to_lowercase(),
            company_name: field(&record, "company_name"),
            title: field(&record, "title"),
            linkedin_url: field(&record, "linkedin_url"),
            location: field(&record, "location"),
            website: field(&record, "website"),
            firm_type: field(&record, "firm_type"),
        };

        // A row must identify somebody or some firm to be worth keeping.
        if contact.email.is_empty()
            && contact.full_name.is_empty()
            && contact.company_name.is_empty()
        {
            outcome.dropped += 1;
            continue;
        }

        outcome.rows.push(contact);
    }

    tracing::info!(
        kept = outcome.rows.len(),
        dropped = outcome.dropped,
        errors = outcome.row_errors.len(),
        "parsed contacts CSV"
    );
    Ok(outcome)
}
