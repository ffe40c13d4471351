//! Structural validation of dataset files before upload.
//!
//! This is a cheap local check, not a parser: CSV lines are split naively on
//! the sniffed delimiter, so quoted delimiters are not handled. The backend
//! does the real parsing; the point here is to reject obviously broken files
//! without a round trip.

use crate::error::ClientError;
use automl_types::ValidationError;
use bytes::Bytes;
use serde_json::Value;
use std::path::Path;
use tracing::debug;

/// Largest file accepted for upload.
pub const MAX_UPLOAD_BYTES: u64 = 50 * 1024 * 1024;

/// Data rows kept for the local preview.
pub const PREVIEW_ROWS: usize = 10;

/// Delimiters tried, in tie-break order.
const CANDIDATE_DELIMITERS: [char; 4] = [',', ';', '\t', '|'];

/// Accepted dataset formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Csv,
    Json,
}

impl FileFormat {
    pub const fn mime_type(self) -> &'static str {
        match self {
            Self::Csv => "text/csv",
            Self::Json => "application/json",
        }
    }
}

/// Result of a successful local inspection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePreview {
    pub format: FileFormat,
    pub columns: Vec<String>,
    /// Up to [`PREVIEW_ROWS`] rows, cells in column order
    pub rows: Vec<Vec<String>>,
    /// Sniffed delimiter (CSV only)
    pub delimiter: Option<char>,
}

/// Format implied by the file name's extension.
pub fn detect_format(file_name: &str) -> Result<FileFormat, ValidationError> {
    let extension = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    match extension.as_str() {
        "csv" => Ok(FileFormat::Csv),
        "json" => Ok(FileFormat::Json),
        _ => Err(ValidationError::UnsupportedExtension { extension }),
    }
}

/// Validates an in-memory file.
pub fn inspect(file_name: &str, content: &[u8]) -> Result<FilePreview, ValidationError> {
    check_size(content.len() as u64)?;
    let format = detect_format(file_name)?;

    let text = std::str::from_utf8(content).map_err(|_| ValidationError::NotText)?;
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    if text.trim().is_empty() {
        return Err(ValidationError::EmptyFile);
    }

    let preview = match format {
        FileFormat::Csv => preview_csv(text)?,
        FileFormat::Json => preview_json(text)?,
    };
    debug!(
        "Inspected {}: {:?}, {} columns, {} preview rows",
        file_name,
        preview.format,
        preview.columns.len(),
        preview.rows.len()
    );
    Ok(preview)
}

/// Validates a file on disk and returns its preview and content.
///
/// The size limit is checked from metadata before the file is read.
pub async fn inspect_path(path: &Path) -> Result<(FilePreview, Bytes), ClientError> {
    let file_name = file_name_of(path);
    detect_format(&file_name)?;

    let metadata = tokio::fs::metadata(path).await?;
    check_size(metadata.len())?;

    let content = Bytes::from(tokio::fs::read(path).await?);
    let preview = inspect(&file_name, &content)?;
    Ok((preview, content))
}

pub(crate) fn file_name_of(path: &Path) -> String {
    path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default()
}

fn check_size(size: u64) -> Result<(), ValidationError> {
    if size == 0 {
        return Err(ValidationError::EmptyFile);
    }
    if size > MAX_UPLOAD_BYTES {
        return Err(ValidationError::TooLarge { size, limit: MAX_UPLOAD_BYTES });
    }
    Ok(())
}

/// Delimiter occurring most often in `line`; `,` when none occurs.
pub fn sniff_delimiter(line: &str) -> char {
    CANDIDATE_DELIMITERS
        .iter()
        .map(|&d| (d, line.matches(d).count()))
        .fold((',', 0), |best, cur| if cur.1 > best.1 { cur } else { best })
        .0
}

fn split_line(line: &str, delimiter: char) -> Vec<String> {
    line.split(delimiter)
        .map(|cell| cell.trim().trim_matches('"').trim().to_string())
        .collect()
}

fn preview_csv(text: &str) -> Result<FilePreview, ValidationError> {
    let mut lines = text.lines().map(|l| l.trim_end_matches('\r')).filter(|l| !l.trim().is_empty());

    let header = lines.next().ok_or(ValidationError::NoColumns)?;
    let delimiter = sniff_delimiter(header);
    let columns: Vec<String> =
        split_line(header, delimiter).into_iter().filter(|c| !c.is_empty()).collect();
    if columns.is_empty() {
        return Err(ValidationError::NoColumns);
    }

    let rows: Vec<Vec<String>> =
        lines.take(PREVIEW_ROWS).map(|line| split_line(line, delimiter)).collect();
    if rows.is_empty() {
        return Err(ValidationError::EmptyPreview);
    }

    Ok(FilePreview { format: FileFormat::Csv, columns, rows, delimiter: Some(delimiter) })
}

fn preview_json(text: &str) -> Result<FilePreview, ValidationError> {
    let value: Value = serde_json::from_str(text)
        .map_err(|e| ValidationError::InvalidJson { message: e.to_string() })?;

    let records = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("data") {
            Some(Value::Array(items)) => items,
            _ => {
                return Err(ValidationError::InvalidJson {
                    message: "expected an array of records or an object with a 'data' array"
                        .to_string(),
                })
            },
        },
        _ => {
            return Err(ValidationError::InvalidJson {
                message: "expected an array of records".to_string(),
            })
        },
    };

    let Some(first) = records.first() else {
        return Err(ValidationError::EmptyPreview);
    };
    let Value::Object(first) = first else {
        return Err(ValidationError::NoColumns);
    };
    let columns: Vec<String> = first.keys().filter(|k| !k.trim().is_empty()).cloned().collect();
    if columns.is_empty() {
        return Err(ValidationError::NoColumns);
    }

    let rows = records
        .iter()
        .take(PREVIEW_ROWS)
        .map(|record| {
            columns
                .iter()
                .map(|c| match record.get(c) {
                    None | Some(Value::Null) => String::new(),
                    Some(Value::String(s)) => s.clone(),
                    Some(other) => other.to_string(),
                })
                .collect()
        })
        .collect();

    Ok(FilePreview { format: FileFormat::Json, columns, rows, delimiter: None })
}
