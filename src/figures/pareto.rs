//! Pareto analysis: metric bars plus cumulative-percentage line on a
//! secondary axis.

use serde_json::{json, Value};

use crate::metric::Metric;
use crate::query::ParetoRow;

pub fn pareto_figure(rows: &[ParetoRow], metric: Metric) -> Value {
    // AvgTicket is remapped upstream; the title reflects what was plotted.
    let metric = match metric {
        Metric::AvgTicket => Metric::TotalExpenditure,
        other => other,
    };
    let names: Vec<&str> = rows.iter().map(|r| r.name.as_str()).collect();
    let values: Vec<f64> = rows.iter().map(|r| r.value).collect();
    let cumulative: Vec<f64> = rows.iter().map(|r| r.cumulative_pct).collect();
    json!({
        "data": [
            {
                "type": "bar",
                "x": names,
                "y": values,
                "text": values,
                "textposition": "outside",
                "texttemplate": "%{text:.3s}",
                "marker": { "color": values, "coloraxis": "coloraxis" },
            },
            {
                "type": "scatter",
                "x": names,
                "y": cumulative,
                "mode": "markers+lines",
                "yaxis": "y2",
            },
        ],
        "layout": {
            "title": format!("Pareto Analysis: {} by Country of Origin", metric.label()),
            "showlegend": false,
            "coloraxis": { "showscale": false },
            "height": 500,
            "yaxis": { "title": metric.key() },
            "yaxis2": {
                "title": format!("Cumulative % {}", metric.key()),
                "overlaying": "y",
                "side": "right",
            },
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_traces_and_secondary_axis() {
        let rows = vec![
            ParetoRow { name: "Germany".into(), value: 60.0, cumulative: 60.0, cumulative_pct: 60.0 },
            ParetoRow { name: "France".into(), value: 40.0, cumulative: 100.0, cumulative_pct: 100.0 },
        ];
        let fig = pareto_figure(&rows, Metric::TotalExpenditure);
        let data = fig["data"].as_array().unwrap();
        assert_eq!(data.len(), 2);
        assert_eq!(data[0]["type"], "bar");
        assert_eq!(data[1]["yaxis"], "y2");
        assert_eq!(data[1]["y"], json!([60.0, 100.0]));
    }

    #[test]
    fn test_avg_ticket_title_shows_expenditure() {
        let fig = pareto_figure(&[], Metric::AvgTicket);
        assert!(fig["layout"]["title"].as_str().unwrap().contains("Total Expenditure"));
    }
}
