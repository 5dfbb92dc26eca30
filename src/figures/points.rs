//! Category x country bubble plot, sized by the square root of the value.

use serde_json::{json, Value};

use super::plasma_scale;
use crate::metric::Metric;
use crate::query::CategoryCountryView;

const SIZE_MAX: f64 = 15.0;

pub fn points_figure(view: &CategoryCountryView, metric: Metric) -> Value {
    let x: Vec<&str> = view.stats.iter().map(|s| s.country.as_str()).collect();
    let y: Vec<&str> = view.stats.iter().map(|s| s.category.as_str()).collect();
    let values: Vec<f64> = view.stats.iter().map(|s| s.value).collect();

    // px sizes markers so the largest sqrt(value) hits size_max.
    let sqrts: Vec<f64> = values.iter().map(|v| v.max(0.0).sqrt()).collect();
    let max_sqrt = sqrts.iter().cloned().fold(0.0_f64, f64::max);
    let sizes: Vec<f64> = sqrts
        .iter()
        .map(|s| if max_sqrt > 0.0 { s / max_sqrt * SIZE_MAX } else { 0.0 })
        .collect();

    json!({
        "data": [{
            "type": "scatter",
            "mode": "markers",
            "x": x,
            "y": y,
            "marker": {
                "size": sizes,
                "color": values,
                "colorscale": plasma_scale(),
                "colorbar": { "title": metric.label() },
                "opacity": 1,
            },
        }],
        "layout": {
            "title": format!(
                "{} per Category and Top {} Countries",
                metric.label(),
                view.country_order.len()
            ),
            "xaxis": {
                "title": "Country",
                "categoryorder": "array",
                "categoryarray": view.country_order,
            },
            "yaxis": {
                "title": "Category",
                "categoryorder": "array",
                "categoryarray": view.category_order,
            },
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::CategoryCountryStat;

    #[test]
    fn test_sizes_scale_to_max() {
        let view = CategoryCountryView {
            stats: vec![
                CategoryCountryStat { category: "Fashion".into(), country: "DE".into(), value: 100.0 },
                CategoryCountryStat { category: "Food".into(), country: "FR".into(), value: 25.0 },
            ],
            category_order: vec!["Fashion".into(), "Food".into()],
            country_order: vec!["DE".into(), "FR".into()],
        };
        let fig = points_figure(&view, Metric::TotalExpenditure);
        let sizes = fig["data"][0]["marker"]["size"].as_array().unwrap();
        assert_eq!(sizes[0], 15.0);
        assert_eq!(sizes[1], 7.5);
        assert_eq!(
            fig["layout"]["yaxis"]["categoryarray"],
            json!(["Fashion", "Food"])
        );
    }

    #[test]
    fn test_empty_view() {
        let view = CategoryCountryView {
            stats: vec![],
            category_order: vec![],
            country_order: vec![],
        };
        let fig = points_figure(&view, Metric::AvgTicket);
        assert_eq!(fig["data"][0]["x"], json!([]));
    }
}
