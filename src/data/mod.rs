//! CSV primitives and dataset integrity checks.
//!
//! Parsing is hand-rolled over buffered lines. The country lookup tables
//! quote fields that contain commas ("Korea, Republic of"), so the line
//! splitter understands double quotes and doubled-quote escapes.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};

pub const EXPECTED_TX_COLUMNS: [&str; 7] = [
    "",
    "customer_country",
    "tx_date_proc",
    "hour",
    "category",
    "amount",
    "daytime",
];

/// Split one CSV line into fields, honoring double-quoted fields and `""`
/// escapes inside them.
pub fn split_csv_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    field.push('"');
                } else {
                    in_quotes = false;
                }
            }
            '"' => in_quotes = true,
            ',' if !in_quotes => {
                fields.push(std::mem::take(&mut field));
            }
            _ => field.push(c),
        }
    }
    fields.push(field);
    fields
}

/// A parsed CSV: trimmed header names plus raw field rows. Blank lines and
/// `#` comments are skipped; rows with a different arity than the header are
/// collected separately instead of aborting the load.
#[derive(Debug, Clone)]
pub struct Csv {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub bad_rows: u64,
}

impl Csv {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.header.iter().position(|c| c == name)
    }
}

pub fn read_csv(path: &Path) -> Result<Csv, String> {
    let file = File::open(path).map_err(|e| format!("{}: {}", path.display(), e))?;
    let reader = BufReader::new(file);

    let mut header: Vec<String> = Vec::new();
    let mut rows = Vec::new();
    let mut bad_rows = 0u64;
    for line in reader.lines() {
        let line = line.map_err(|e| format!("{}: {}", path.display(), e))?;
        let trimmed = line.trim_end_matches(['\r', '\n']);
        if trimmed.trim().is_empty() || trimmed.trim_start().starts_with('#') {
            continue;
        }
        let fields = split_csv_line(trimmed);
        if header.is_empty() {
            header = fields.iter().map(|f| f.trim().to_string()).collect();
            continue;
        }
        if fields.len() != header.len() {
            bad_rows += 1;
            continue;
        }
        rows.push(fields);
    }
    if header.is_empty() {
        return Err(format!("{}: no header row", path.display()));
    }
    Ok(Csv { header, rows, bad_rows })
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaReport {
    pub columns: Vec<String>,
    pub expected: Vec<String>,
    pub ok: bool,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetManifest {
    pub path: String,
    pub hash_sha256: String,
    pub row_count: u64,
    pub bad_rows: u64,
    pub distinct_countries: u64,
    pub distinct_categories: u64,
    pub amount_min: Option<f64>,
    pub amount_max: Option<f64>,
    pub columns: Vec<String>,
    pub warnings: Vec<String>,
    pub generated_at_epoch: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataQualityReport {
    pub rows: u64,
    pub bad_rows: u64,
    pub negative_amounts: u64,
    pub warnings: Vec<String>,
}

pub fn validate_tx_schema(path: &Path) -> Result<SchemaReport, String> {
    let csv = read_csv(path)?;
    let expected: Vec<String> = EXPECTED_TX_COLUMNS.iter().map(|s| s.to_string()).collect();
    let ok = csv.header == expected;
    let message = if ok {
        "schema ok".to_string()
    } else {
        format!("schema mismatch: got {:?} expected {:?}", csv.header, expected)
    };
    Ok(SchemaReport {
        columns: csv.header,
        expected,
        ok,
        message,
    })
}

/// Single-pass integrity scan of the transactions CSV.
pub fn analyze_transactions(
    path: &Path,
    now_ts: u64,
) -> Result<(DatasetManifest, DataQualityReport), String> {
    let hash = file_sha256(path)?;
    let csv = read_csv(path)?;

    let country_idx = csv.column_index("customer_country");
    let category_idx = csv.column_index("category");
    let amount_idx = csv.column_index("amount");

    let mut warnings = Vec::new();
    let mut countries = std::collections::HashSet::new();
    let mut categories = std::collections::HashSet::new();
    let mut bad_rows = csv.bad_rows;
    let mut negative_amounts = 0u64;
    let mut amount_min: Option<f64> = None;
    let mut amount_max: Option<f64> = None;

    for (row_no, row) in csv.rows.iter().enumerate() {
        if let Some(i) = country_idx {
            countries.insert(row[i].trim().to_uppercase());
        }
        if let Some(i) = category_idx {
            categories.insert(row[i].trim().to_string());
        }
        if let Some(i) = amount_idx {
            match row[i].trim().parse::<f64>() {
                Ok(v) => {
                    if v < 0.0 {
                        negative_amounts += 1;
                        warnings.push(format!("negative_amount: row={} value={}", row_no, v));
                    }
                    amount_min = Some(amount_min.map(|m: f64| m.min(v)).unwrap_or(v));
                    amount_max = Some(amount_max.map(|m: f64| m.max(v)).unwrap_or(v));
                }
                Err(err) => {
                    bad_rows += 1;
                    warnings.push(format!("bad_amount: row={} err={}", row_no, err));
                }
            }
        }
    }
    if country_idx.is_none() {
        warnings.push("missing_column: customer_country".to_string());
    }
    if amount_idx.is_none() {
        warnings.push("missing_column: amount".to_string());
    }

    let manifest = DatasetManifest {
        path: path.display().to_string(),
        hash_sha256: hash,
        row_count: csv.rows.len() as u64,
        bad_rows,
        distinct_countries: countries.len() as u64,
        distinct_categories: categories.len() as u64,
        amount_min,
        amount_max,
        columns: csv.header.clone(),
        warnings: warnings.clone(),
        generated_at_epoch: now_ts,
    };
    let report = DataQualityReport {
        rows: csv.rows.len() as u64,
        bad_rows,
        negative_amounts,
        warnings,
    };
    Ok((manifest, report))
}

pub fn file_sha256(path: &Path) -> Result<String, String> {
    let mut file = File::open(path).map_err(|e| e.to_string())?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 8192];
    loop {
        let n = file.read(&mut buf).map_err(|e| e.to_string())?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

pub fn default_manifest_path(dataset_path: &Path) -> PathBuf {
    let mut p = dataset_path.to_path_buf();
    let fname = dataset_path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("dataset.csv");
    p.set_file_name(format!("{}.manifest.json", fname));
    p
}
