//! Country x hour heatmap of the selected metric.

use serde_json::{json, Value};

use super::plasma_scale;
use crate::metric::Metric;
use crate::query::HourStat;

/// Matrix rows follow `country_order`; columns are the distinct hours in
/// ascending order. Cells with no transactions stay null so the renderer
/// leaves them blank instead of painting zero.
pub fn heatmap_figure(stats: &[HourStat], country_order: &[String], metric: Metric) -> Value {
    let mut hours: Vec<u8> = stats.iter().map(|s| s.hour).collect();
    hours.sort_unstable();
    hours.dedup();

    let z: Vec<Vec<Value>> = country_order
        .iter()
        .map(|country| {
            hours
                .iter()
                .map(|&hour| {
                    stats
                        .iter()
                        .find(|s| &s.country == country && s.hour == hour)
                        .map(|s| json!(s.value))
                        .unwrap_or(Value::Null)
                })
                .collect()
        })
        .collect();

    json!({
        "data": [{
            "type": "heatmap",
            "x": hours,
            "y": country_order,
            "z": z,
            "colorscale": plasma_scale(),
            "colorbar": { "title": metric.label() },
        }],
        "layout": {
            "title": format!(
                "{} per hour and Top {} countries",
                metric.label(),
                country_order.len()
            ),
            "xaxis": { "title": "Hour" },
            "yaxis": { "title": "Country", "autorange": "reversed" },
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matrix_dimensions_and_nulls() {
        let stats = vec![
            HourStat { country: "DE".into(), hour: 9, value: 10.0 },
            HourStat { country: "FR".into(), hour: 12, value: 5.0 },
        ];
        let order = vec!["DE".to_string(), "FR".to_string()];
        let fig = heatmap_figure(&stats, &order, Metric::TotalTransactions);
        assert_eq!(fig["data"][0]["x"], json!([9, 12]));
        let z = fig["data"][0]["z"].as_array().unwrap();
        assert_eq!(z.len(), 2);
        assert_eq!(z[0], json!([10.0, null]));
        assert_eq!(z[1], json!([null, 5.0]));
    }

    #[test]
    fn test_empty_input() {
        let fig = heatmap_figure(&[], &[], Metric::AvgTicket);
        assert_eq!(fig["data"][0]["z"], json!([]));
    }
}
