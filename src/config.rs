#[derive(Clone)]
pub struct Config {
    pub transactions_path: String,
    pub continents_path: String,
    pub iso_codes_path: String,
    pub server_port: u16,
    pub default_top: usize,
    pub out_dir: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            transactions_path: std::env::var("TX_CSV")
                .unwrap_or_else(|_| "data/madrid_transactions.csv".to_string()),
            continents_path: std::env::var("CONTINENTS_CSV")
                .unwrap_or_else(|_| "data/country-and-continent-codes-list.csv".to_string()),
            iso_codes_path: std::env::var("ISO_CSV").unwrap_or_else(|_| "data/all.csv".to_string()),
            server_port: std::env::var("PORT").ok().and_then(|v| v.parse().ok()).unwrap_or(8051),
            default_top: std::env::var("DEFAULT_TOP").ok().and_then(|v| v.parse().ok()).unwrap_or(10),
            out_dir: std::env::var("OUT_DIR").unwrap_or_else(|_| "out/figures".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_env() {
        let cfg = Config::from_env();
        assert!(cfg.default_top >= 1);
        assert!(cfg.transactions_path.ends_with(".csv"));
    }
}
