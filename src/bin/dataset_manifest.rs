//! Schema check and integrity manifest for the transactions CSV.
//! Usage: dataset_manifest [path/to/transactions.csv]

use cardintel::data::{analyze_transactions, default_manifest_path, validate_tx_schema, EXPECTED_TX_COLUMNS};
use serde_json::json;
use std::env;
use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

fn main() {
    let path = env::args()
        .nth(1)
        .unwrap_or_else(|| "data/madrid_transactions.csv".to_string());

    let now_ts = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);

    let schema = match validate_tx_schema(PathBuf::from(&path).as_path()) {
        Ok(s) => s,
        Err(err) => {
            eprintln!("schema check failed: {}", err);
            std::process::exit(1);
        }
    };

    if !schema.ok {
        eprintln!("schema mismatch: {:?}", schema.message);
        eprintln!("expected columns: {:?}", EXPECTED_TX_COLUMNS);
        std::process::exit(2);
    }

    let (manifest, report) = match analyze_transactions(PathBuf::from(&path).as_path(), now_ts) {
        Ok(m) => m,
        Err(err) => {
            eprintln!("analysis failed: {}", err);
            std::process::exit(3);
        }
    };

    let out_path = default_manifest_path(PathBuf::from(&path).as_path());
    let payload = json!({
        "manifest": manifest,
        "report": report
    });
    match serde_json::to_string_pretty(&payload) {
        Ok(body) => {
            if let Err(err) = fs::write(&out_path, body) {
                eprintln!("failed to write {}: {}", out_path.display(), err);
                std::process::exit(4);
            }
        }
        Err(err) => {
            eprintln!("failed to encode manifest: {}", err);
            std::process::exit(4);
        }
    }
    println!("wrote manifest {}", out_path.display());
}
