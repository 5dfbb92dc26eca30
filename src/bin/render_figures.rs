//! Batch figure export: builds every dashboard figure for one metric and
//! top-N selection and writes pretty-printed JSON under the output
//! directory. Usage: render_figures [metric_key] [top_n]

use anyhow::{Context, Result};
use std::env;
use std::fs;
use std::path::Path;

use cardintel::config::Config;
use cardintel::dataset::Dataset;
use cardintel::metric::Metric;
use cardintel::server;

fn main() -> Result<()> {
    let cfg = Config::from_env();
    let metric_key = env::args().nth(1).unwrap_or_else(|| "Total_Expenditure".to_string());
    let metric = Metric::parse(&metric_key)
        .with_context(|| format!("unknown metric '{}'", metric_key))?;
    let top: usize = env::args()
        .nth(2)
        .and_then(|v| v.parse().ok())
        .unwrap_or(cfg.default_top);

    let (dataset, _report) = Dataset::load(&cfg)?;
    fs::create_dir_all(&cfg.out_dir)
        .with_context(|| format!("creating {}", cfg.out_dir))?;

    let names = [
        "map",
        "pareto",
        "violin",
        "heatmap",
        "points",
        "hourly",
        "flow",
        "targeting_volume",
        "targeting_tiers",
    ];
    for name in names {
        let target = format!("/api/figure/{}?metric={}&top={}", name, metric.key(), top);
        let response = server::handle(&dataset, &cfg, &target);
        if response.status != "200 OK" {
            anyhow::bail!("figure {} failed: {} {}", name, response.status, response.body);
        }
        let value: serde_json::Value = serde_json::from_str(&response.body)?;
        let out_path = Path::new(&cfg.out_dir).join(format!("{}.json", name));
        fs::write(&out_path, serde_json::to_string_pretty(&value)?)
            .with_context(|| format!("writing {}", out_path.display()))?;
        println!("wrote {}", out_path.display());
    }
    Ok(())
}
