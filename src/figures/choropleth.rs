//! World map of the selected metric by country of origin.

use serde_json::{json, Value};

use super::plasma_scale;
use crate::metric::Metric;
use crate::query::CountryStat;

pub fn choropleth_figure(top: &[CountryStat], metric: Metric) -> Value {
    let locations: Vec<&str> = top.iter().map(|s| s.alpha3.as_str()).collect();
    let values: Vec<f64> = top.iter().map(|s| s.metric(metric)).collect();
    let names: Vec<&str> = top.iter().map(|s| s.name.as_str()).collect();
    json!({
        "data": [{
            "type": "choropleth",
            "locations": locations,
            "z": values,
            "text": names,
            "colorscale": plasma_scale(),
            "colorbar": { "title": metric.label() },
        }],
        "layout": {
            "title": format!("{} by Country of Origin", metric.label()),
            "width": 1100,
            "height": 600,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stat(code: &str, alpha3: &str, exp: f64) -> CountryStat {
        CountryStat {
            code: code.to_string(),
            alpha3: alpha3.to_string(),
            name: code.to_string(),
            total_expenditure: exp,
            total_transactions: 1,
            avg_ticket: exp,
        }
    }

    #[test]
    fn test_locations_are_alpha3() {
        let top = vec![stat("DE", "DEU", 10.0), stat("FR", "FRA", 5.0)];
        let fig = choropleth_figure(&top, Metric::TotalExpenditure);
        assert_eq!(fig["data"][0]["locations"], json!(["DEU", "FRA"]));
        assert_eq!(fig["data"][0]["z"], json!([10.0, 5.0]));
    }

    #[test]
    fn test_empty_input_is_well_formed() {
        let fig = choropleth_figure(&[], Metric::AvgTicket);
        assert_eq!(fig["data"][0]["locations"], json!([]));
        assert!(fig["layout"]["title"].as_str().unwrap().contains("Avg Ticket"));
    }
}
