//! Dashboard API server.
//!
//! Loads the transaction dataset once, then serves figure JSON for the
//! front-end. Run with: cargo run --bin dashboard_server

use anyhow::Result;
use cardintel::config::Config;
use cardintel::dataset::Dataset;
use cardintel::server;

fn main() -> Result<()> {
    let cfg = Config::from_env();
    let (dataset, report) = Dataset::load(&cfg)?;
    if dataset.is_empty() {
        eprintln!(
            "warning: no usable transactions in {} ({} rows read, {} bad)",
            cfg.transactions_path, report.rows_read, report.bad_rows
        );
    }

    println!("Dashboard API running at http://localhost:{}", cfg.server_port);
    println!();
    println!("Endpoints:");
    println!("  GET /api/health");
    println!("  GET /api/summary?top=N");
    println!("  GET /api/figure/<name>?metric=M&top=N");
    println!("      names: map pareto violin heatmap points hourly flow");
    println!("             targeting_volume targeting_tiers");
    println!();

    server::serve(&dataset, &cfg)
}
