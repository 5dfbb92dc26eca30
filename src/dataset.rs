//! The joined, enriched transaction dataset.
//!
//! Loaded once at startup from three CSVs and then passed immutably to every
//! query. A transaction only survives the load if its country code resolves
//! in both lookup tables; everything else is counted in the report.

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;

use crate::config::Config;
use crate::data::read_csv;
use crate::logging::{json_log, obj, v_num, v_str, Domain};

#[derive(Debug, Clone)]
pub struct TxRecord {
    /// ISO alpha-2 customer country code, uppercased.
    pub country_code: String,
    pub country_name: String,
    pub alpha3: String,
    pub continent: String,
    pub category: String,
    pub amount: f64,
    pub hour: u8,
    pub daytime: String,
    pub ts: NaiveDateTime,
}

#[derive(Debug, Clone)]
pub struct Dataset {
    pub records: Vec<TxRecord>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoadReport {
    pub rows_read: u64,
    pub loaded: u64,
    pub bad_rows: u64,
    pub dropped_unmatched_country: u64,
    pub distinct_countries: u64,
    pub distinct_categories: u64,
    pub warnings: Vec<String>,
}

/// Long-form country names carry qualifiers after a comma; the dashboard
/// wants the short head ("Iran, Islamic Republic of" -> "Iran").
pub fn clean_country_name(raw: &str) -> String {
    let head = raw.split(',').next().unwrap_or(raw).trim();
    if head == "United Kingdom of Great Britain & Northern Ireland" {
        "United Kingdom".to_string()
    } else {
        head.to_string()
    }
}

/// The source data labels a few categories in Spanish.
pub fn translate_category(raw: &str) -> String {
    match raw {
        "Agencias de viajes" => "Travel Agency".to_string(),
        "Hogar y reformas" => "Home and reforms".to_string(),
        "Automoción" => "Automotive".to_string(),
        other => other.to_string(),
    }
}

fn parse_ts(raw: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S"))
        .ok()
}

struct CountryLookup {
    /// alpha-2 -> (cleaned name, continent)
    continents: HashMap<String, (String, String)>,
    /// alpha-2 -> alpha-3
    alpha3: HashMap<String, String>,
}

fn load_lookups(continents_path: &Path, iso_path: &Path) -> Result<CountryLookup> {
    let continents_csv = read_csv(continents_path)
        .map_err(|e| anyhow::anyhow!(e))
        .context("reading continent lookup")?;
    let name_idx = continents_csv
        .column_index("Country_Name")
        .context("continent lookup: missing Country_Name")?;
    let code_idx = continents_csv
        .column_index("Two_Letter_Country_Code")
        .context("continent lookup: missing Two_Letter_Country_Code")?;
    let cont_idx = continents_csv
        .column_index("Continent_Name")
        .context("continent lookup: missing Continent_Name")?;

    // A few countries span two continents and appear twice; the first entry
    // wins so each transaction joins to exactly one row.
    let mut continents = HashMap::new();
    for row in &continents_csv.rows {
        let code = row[code_idx].trim().to_uppercase();
        if code.is_empty() {
            continue;
        }
        continents
            .entry(code)
            .or_insert_with(|| (clean_country_name(&row[name_idx]), row[cont_idx].trim().to_string()));
    }

    let iso_csv = read_csv(iso_path)
        .map_err(|e| anyhow::anyhow!(e))
        .context("reading ISO code lookup")?;
    let a2_idx = iso_csv
        .column_index("alpha-2")
        .context("ISO lookup: missing alpha-2")?;
    let a3_idx = iso_csv
        .column_index("alpha-3")
        .context("ISO lookup: missing alpha-3")?;
    let mut alpha3 = HashMap::new();
    for row in &iso_csv.rows {
        let a2 = row[a2_idx].trim().to_uppercase();
        if !a2.is_empty() {
            alpha3.entry(a2).or_insert_with(|| row[a3_idx].trim().to_uppercase());
        }
    }

    Ok(CountryLookup { continents, alpha3 })
}

impl Dataset {
    pub fn from_records(records: Vec<TxRecord>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Read, join and enrich the three CSVs named by the config.
    pub fn load(cfg: &Config) -> Result<(Dataset, LoadReport)> {
        let lookup = load_lookups(
            Path::new(&cfg.continents_path),
            Path::new(&cfg.iso_codes_path),
        )?;

        let tx_csv = read_csv(Path::new(&cfg.transactions_path))
            .map_err(|e| anyhow::anyhow!(e))
            .context("reading transactions")?;
        let country_idx = tx_csv
            .column_index("customer_country")
            .context("transactions: missing customer_country")?;
        let ts_idx = tx_csv
            .column_index("tx_date_proc")
            .context("transactions: missing tx_date_proc")?;
        let hour_idx = tx_csv.column_index("hour").context("transactions: missing hour")?;
        let category_idx = tx_csv
            .column_index("category")
            .context("transactions: missing category")?;
        let amount_idx = tx_csv
            .column_index("amount")
            .context("transactions: missing amount")?;
        let daytime_idx = tx_csv
            .column_index("daytime")
            .context("transactions: missing daytime")?;

        let mut report = LoadReport {
            rows_read: tx_csv.rows.len() as u64,
            bad_rows: tx_csv.bad_rows,
            ..Default::default()
        };
        let mut records = Vec::with_capacity(tx_csv.rows.len());
        let mut countries = HashSet::new();
        let mut categories = HashSet::new();

        for (row_no, row) in tx_csv.rows.iter().enumerate() {
            let amount = match row[amount_idx].trim().parse::<f64>() {
                Ok(v) => v,
                Err(_) => {
                    report.bad_rows += 1;
                    continue;
                }
            };
            let hour = match row[hour_idx].trim().parse::<u8>() {
                Ok(h) if h < 24 => h,
                _ => {
                    report.bad_rows += 1;
                    continue;
                }
            };
            let ts = match parse_ts(row[ts_idx].trim()) {
                Some(ts) => ts,
                None => {
                    report.bad_rows += 1;
                    continue;
                }
            };
            if amount < 0.0 {
                report
                    .warnings
                    .push(format!("negative_amount: row={} value={}", row_no, amount));
            }

            let code = row[country_idx].trim().to_uppercase();
            let (name, continent) = match lookup.continents.get(&code) {
                Some(v) => v.clone(),
                None => {
                    report.dropped_unmatched_country += 1;
                    continue;
                }
            };
            let alpha3 = match lookup.alpha3.get(&code) {
                Some(v) => v.clone(),
                None => {
                    report.dropped_unmatched_country += 1;
                    continue;
                }
            };

            let category = translate_category(row[category_idx].trim());
            countries.insert(code.clone());
            categories.insert(category.clone());
            records.push(TxRecord {
                country_code: code,
                country_name: name,
                alpha3,
                continent,
                category,
                amount,
                hour,
                daytime: row[daytime_idx].trim().to_string(),
                ts,
            });
        }

        report.loaded = records.len() as u64;
        report.distinct_countries = countries.len() as u64;
        report.distinct_categories = categories.len() as u64;
        json_log(
            Domain::Data,
            "dataset_loaded",
            obj(&[
                ("path", v_str(&cfg.transactions_path)),
                ("rows_read", v_num(report.rows_read as f64)),
                ("loaded", v_num(report.loaded as f64)),
                ("bad_rows", v_num(report.bad_rows as f64)),
                ("dropped_unmatched", v_num(report.dropped_unmatched_country as f64)),
                ("countries", v_num(report.distinct_countries as f64)),
                ("categories", v_num(report.distinct_categories as f64)),
            ]),
        );

        Ok((Dataset { records }, report))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_country_name_splits_at_comma() {
        assert_eq!(clean_country_name("Iran, Islamic Republic of"), "Iran");
        assert_eq!(clean_country_name("France"), "France");
    }

    #[test]
    fn test_clean_country_name_uk_rename() {
        assert_eq!(
            clean_country_name("United Kingdom of Great Britain & Northern Ireland"),
            "United Kingdom"
        );
    }

    #[test]
    fn test_translate_category() {
        assert_eq!(translate_category("Agencias de viajes"), "Travel Agency");
        assert_eq!(translate_category("Hogar y reformas"), "Home and reforms");
        assert_eq!(translate_category("Automoción"), "Automotive");
        assert_eq!(translate_category("Fashion & Shoes"), "Fashion & Shoes");
    }

    #[test]
    fn test_parse_ts_both_formats() {
        assert!(parse_ts("2017-02-02 21:52:52").is_some());
        assert!(parse_ts("2017-02-02T21:52:52").is_some());
        assert!(parse_ts("02/02/2017").is_none());
    }
}
