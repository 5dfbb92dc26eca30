//! Synthetic dataset generator.
//!
//! Writes a transactions CSV plus the two country lookup CSVs to the
//! configured paths so the server and export bins run without the real
//! data drop. Deterministic for a given SEED; row count via ROWS.

use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fs;
use std::io::Write;
use std::path::Path;

use cardintel::config::Config;

// (alpha-2, alpha-3, long name, continent)
const COUNTRIES: &[(&str, &str, &str, &str)] = &[
    ("DE", "DEU", "Germany", "Europe"),
    ("FR", "FRA", "France", "Europe"),
    ("GB", "GBR", "United Kingdom of Great Britain & Northern Ireland", "Europe"),
    ("US", "USA", "United States of America", "North America"),
    ("IT", "ITA", "Italy", "Europe"),
    ("ES", "ESP", "Spain", "Europe"),
    ("NL", "NLD", "Netherlands", "Europe"),
    ("PT", "PRT", "Portugal", "Europe"),
    ("CN", "CHN", "China", "Asia"),
    ("JP", "JPN", "Japan", "Asia"),
    ("KR", "KOR", "Korea, Republic of", "Asia"),
    ("RU", "RUS", "Russian Federation", "Europe"),
    ("BR", "BRA", "Brazil", "South America"),
    ("AR", "ARG", "Argentina", "South America"),
    ("MX", "MEX", "Mexico", "North America"),
    ("MA", "MAR", "Morocco", "Africa"),
    ("EG", "EGY", "Egypt", "Africa"),
    ("AU", "AUS", "Australia", "Oceania"),
    ("IR", "IRN", "Iran, Islamic Republic of", "Asia"),
    ("SE", "SWE", "Sweden", "Europe"),
    ("CH", "CHE", "Switzerland", "Europe"),
    ("BE", "BEL", "Belgium", "Europe"),
    ("IE", "IRL", "Ireland", "Europe"),
    ("VE", "VEN", "Venezuela, Bolivarian Republic of", "South America"),
];

const CATEGORIES: &[&str] = &[
    "Fashion & Shoes",
    "Bars & restaurants",
    "Accommodation",
    "Food",
    "Health",
    "Culture & Leisure",
    "Transportation",
    "Agencias de viajes",
    "Hogar y reformas",
    "Automoción",
    "Books & Music",
    "Sports & Toys",
];

fn daytime_of(hour: u8) -> &'static str {
    match hour {
        0..=5 => "night",
        6..=11 => "morning",
        12..=17 => "afternoon",
        _ => "evening",
    }
}

fn quote(field: &str) -> String {
    if field.contains(',') || field.contains('"') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn write_lookups(cfg: &Config) -> Result<()> {
    let mut continents = String::from(
        "Continent_Name,Continent_Code,Country_Name,Two_Letter_Country_Code,Three_Letter_Country_Code,Country_Number\n",
    );
    let mut iso = String::from("name,alpha-2,alpha-3\n");
    for (i, (a2, a3, name, continent)) in COUNTRIES.iter().enumerate() {
        continents.push_str(&format!(
            "{},{},{},{},{},{}\n",
            continent,
            &continent[..2].to_uppercase(),
            quote(name),
            a2,
            a3,
            i + 1
        ));
        iso.push_str(&format!("{},{},{}\n", quote(name), a2, a3));
    }
    fs::write(&cfg.continents_path, continents)
        .with_context(|| format!("writing {}", cfg.continents_path))?;
    fs::write(&cfg.iso_codes_path, iso)
        .with_context(|| format!("writing {}", cfg.iso_codes_path))?;
    Ok(())
}

fn main() -> Result<()> {
    let cfg = Config::from_env();
    let seed: u64 = std::env::var("SEED").ok().and_then(|v| v.parse().ok()).unwrap_or(7);
    let rows: usize = std::env::var("ROWS").ok().and_then(|v| v.parse().ok()).unwrap_or(5000);
    let mut rng = StdRng::seed_from_u64(seed);

    for path in [&cfg.transactions_path, &cfg.continents_path, &cfg.iso_codes_path] {
        if let Some(parent) = Path::new(path).parent() {
            fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
        }
    }
    write_lookups(&cfg)?;

    let mut out = fs::File::create(&cfg.transactions_path)
        .with_context(|| format!("writing {}", cfg.transactions_path))?;
    writeln!(out, ",customer_country,tx_date_proc,hour,category,amount,daytime")?;
    for i in 0..rows {
        // squaring the draw skews volume toward the head of the lists
        let country = COUNTRIES[(rng.gen::<f64>().powi(2) * COUNTRIES.len() as f64) as usize % COUNTRIES.len()].0;
        let category = CATEGORIES[(rng.gen::<f64>().powi(2) * CATEGORIES.len() as f64) as usize % CATEGORIES.len()];
        let hour: u8 = rng.gen_range(0..24);
        let minute: u8 = rng.gen_range(0..60);
        let second: u8 = rng.gen_range(0..60);
        let amount = ((rng.gen::<f64>() * rng.gen::<f64>() * 300.0 + 1.0) * 100.0).round() / 100.0;
        writeln!(
            out,
            "{},{},2017-02-02 {:02}:{:02}:{:02},{},{},{:.2},{}",
            i,
            country,
            hour,
            minute,
            second,
            hour,
            quote(category),
            amount,
            daytime_of(hour)
        )?;
    }
    println!(
        "wrote {} rows to {} (seed {})",
        rows, cfg.transactions_path, seed
    );
    Ok(())
}
