//! On-disk loading path: CSV fixtures written to a temp dir, pushed through
//! Dataset::load and the manifest analysis.

use std::fs;
use std::path::Path;

use cardintel::config::Config;
use cardintel::data::{analyze_transactions, file_sha256, validate_tx_schema};
use cardintel::dataset::Dataset;

const TX_HEADER: &str = ",customer_country,tx_date_proc,hour,category,amount,daytime";

fn write_fixtures(dir: &Path) -> Config {
    let tx_path = dir.join("transactions.csv");
    let continents_path = dir.join("continents.csv");
    let iso_path = dir.join("all.csv");

    fs::write(
        &tx_path,
        format!(
            "{}\n\
             0,DE,2017-02-02 09:15:00,9,Fashion & Shoes,120.50,morning\n\
             1,kr,2017-02-02 21:05:00,21,Agencias de viajes,80.00,evening\n\
             2,DE,2017-02-02 10:00:00,10,Bars & restaurants,not-a-number,morning\n\
             3,ZZ,2017-02-02 11:00:00,11,Food,10.00,morning\n\
             4,GB,2017-02-02 12:30:00,12,Hogar y reformas,45.25,afternoon\n",
            TX_HEADER
        ),
    )
    .unwrap();

    fs::write(
        &continents_path,
        "Continent_Name,Continent_Code,Country_Name,Two_Letter_Country_Code,Three_Letter_Country_Code,Country_Number\n\
         Europe,EU,Germany,DE,DEU,276\n\
         Asia,AS,\"Korea, Republic of\",KR,KOR,410\n\
         Europe,EU,United Kingdom of Great Britain & Northern Ireland,GB,GBR,826\n",
    )
    .unwrap();

    fs::write(
        &iso_path,
        "name,alpha-2,alpha-3\n\
         Germany,DE,DEU\n\
         \"Korea, Republic of\",KR,KOR\n\
         United Kingdom,GB,GBR\n",
    )
    .unwrap();

    Config {
        transactions_path: tx_path.display().to_string(),
        continents_path: continents_path.display().to_string(),
        iso_codes_path: iso_path.display().to_string(),
        server_port: 0,
        default_top: 10,
        out_dir: String::new(),
    }
}

#[test]
fn load_joins_cleans_and_reports() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = write_fixtures(dir.path());
    let (ds, report) = Dataset::load(&cfg).unwrap();

    assert_eq!(report.rows_read, 5);
    // bad amount row dropped, ZZ has no lookup entry
    assert_eq!(report.bad_rows, 1);
    assert_eq!(report.dropped_unmatched_country, 1);
    assert_eq!(report.loaded, 3);
    assert_eq!(ds.len(), 3);

    // quoted country name joins on the lowercased code and gets cleaned
    let kr = ds.records.iter().find(|r| r.country_code == "KR").unwrap();
    assert_eq!(kr.country_name, "Korea");
    assert_eq!(kr.alpha3, "KOR");
    assert_eq!(kr.continent, "Asia");
    assert_eq!(kr.category, "Travel Agency");

    let gb = ds.records.iter().find(|r| r.country_code == "GB").unwrap();
    assert_eq!(gb.country_name, "United Kingdom");
    assert_eq!(gb.category, "Home and reforms");

    let de = ds.records.iter().find(|r| r.country_code == "DE").unwrap();
    assert_eq!(de.hour, 9);
    assert_eq!(de.daytime, "morning");
    assert_eq!(de.amount, 120.50);
}

#[test]
fn schema_validation_accepts_and_rejects() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = write_fixtures(dir.path());
    let report = validate_tx_schema(Path::new(&cfg.transactions_path)).unwrap();
    assert!(report.ok, "{}", report.message);

    let other = dir.path().join("wrong.csv");
    fs::write(&other, "a,b,c\n1,2,3\n").unwrap();
    let report = validate_tx_schema(&other).unwrap();
    assert!(!report.ok);
    assert!(report.message.contains("schema mismatch"));
}

#[test]
fn manifest_counts_and_hash_are_stable() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = write_fixtures(dir.path());
    let path = Path::new(&cfg.transactions_path);

    let (manifest, report) = analyze_transactions(path, 1700000000).unwrap();
    assert_eq!(manifest.row_count, 5);
    assert_eq!(report.rows, 5);
    // one unparseable amount
    assert_eq!(manifest.bad_rows, 1);
    assert_eq!(report.negative_amounts, 0);
    assert_eq!(manifest.distinct_countries, 4);
    assert_eq!(manifest.amount_min, Some(10.0));
    assert_eq!(manifest.amount_max, Some(120.50));

    let h1 = file_sha256(path).unwrap();
    let h2 = file_sha256(path).unwrap();
    assert_eq!(h1, h2);
    assert_eq!(manifest.hash_sha256, h1);
}

#[test]
fn missing_file_is_an_error_not_a_panic() {
    let dir = tempfile::tempdir().unwrap();
    let mut cfg = write_fixtures(dir.path());
    cfg.transactions_path = dir.path().join("absent.csv").display().to_string();
    assert!(Dataset::load(&cfg).is_err());
}
