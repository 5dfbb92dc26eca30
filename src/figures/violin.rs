//! Horizontal one-sided violins: distribution of per-hour aggregates for
//! each of the top countries.

use serde_json::{json, Value};

use super::PLASMA;
use crate::metric::Metric;
use crate::query::HourStat;

pub fn violin_figure(stats: &[HourStat], country_order: &[String], metric: Metric) -> Value {
    let traces: Vec<Value> = country_order
        .iter()
        .enumerate()
        .map(|(i, country)| {
            let values: Vec<f64> = stats
                .iter()
                .filter(|s| &s.country == country)
                .map(|s| s.value)
                .collect();
            json!({
                "type": "violin",
                "name": country,
                "x": values,
                "y0": country,
                "orientation": "h",
                "side": "positive",
                "width": 2,
                "points": false,
                "line": { "color": PLASMA[PLASMA.len() - 1 - (i % PLASMA.len())] },
            })
        })
        .collect();
    let n = country_order.len();
    json!({
        "data": traces,
        "layout": {
            "title": format!(
                "Top {} Countries based on {}: Total Expenses Distribution",
                n,
                metric.label()
            ),
            "xaxis": { "title": "Total Expenses", "showgrid": false, "zeroline": false },
            "yaxis": {
                "title": format!("Top {} Countries based on Total Expenditure", n),
                "tickmode": "linear",
                "categoryorder": "array",
                "categoryarray": country_order,
            },
            "showlegend": false,
            "width": 600,
            "height": 500,
            "violinmode": "group",
        },
    })
}
