//! Animated scatter of expenditure vs transaction count, one frame per hour.

use serde_json::{json, Value};

use crate::query::HourlyPoint;

fn hour_trace(points: &[HourlyPoint], hour: u8) -> Value {
    let at_hour: Vec<&HourlyPoint> = points.iter().filter(|p| p.hour == hour).collect();
    let x: Vec<u64> = at_hour.iter().map(|p| p.transactions).collect();
    let y: Vec<f64> = at_hour.iter().map(|p| p.total_amount).collect();
    let text: Vec<&str> = at_hour.iter().map(|p| p.country.as_str()).collect();
    json!({
        "type": "scatter",
        "mode": "markers+text",
        "x": x,
        "y": y,
        "text": text,
        "textposition": "top center",
        "hovertext": text,
    })
}

pub fn hourly_figure(points: &[HourlyPoint], hours: &[u8], top_n: usize) -> Value {
    let first = hours.first().copied();
    let data = match first {
        Some(hour) => vec![hour_trace(points, hour)],
        None => Vec::new(),
    };
    let frames: Vec<Value> = hours
        .iter()
        .map(|&hour| {
            json!({
                "name": hour.to_string(),
                "data": [hour_trace(points, hour)],
            })
        })
        .collect();
    let steps: Vec<Value> = hours
        .iter()
        .map(|&hour| {
            json!({
                "label": hour.to_string(),
                "method": "animate",
                "args": [[hour.to_string()], { "mode": "immediate" }],
            })
        })
        .collect();
    json!({
        "data": data,
        "frames": frames,
        "layout": {
            "title": format!("Total Expenditure by Hour and Top {} countries", top_n),
            "template": "plotly_white",
            "height": 600,
            "xaxis": { "title": "Total_Transactions", "type": "log" },
            "yaxis": { "title": "Total_amount", "type": "log" },
            "updatemenus": [{
                "type": "buttons",
                "buttons": [
                    { "label": "Play", "method": "animate", "args": [null] },
                    {
                        "label": "Pause",
                        "method": "animate",
                        "args": [[null], { "mode": "immediate" }],
                    },
                ],
            }],
            "sliders": [{ "steps": steps, "currentvalue": { "prefix": "hour=" } }],
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(country: &str, hour: u8, amount: f64, tx: u64) -> HourlyPoint {
        HourlyPoint {
            country: country.to_string(),
            hour,
            total_amount: amount,
            transactions: tx,
        }
    }

    #[test]
    fn test_one_frame_per_hour() {
        let points = vec![point("DE", 9, 10.0, 2), point("FR", 9, 5.0, 1), point("DE", 10, 7.0, 1)];
        let fig = hourly_figure(&points, &[9, 10], 2);
        let frames = fig["frames"].as_array().unwrap();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0]["name"], "9");
        assert_eq!(frames[0]["data"][0]["x"], json!([2, 1]));
        assert_eq!(fig["layout"]["sliders"][0]["steps"].as_array().unwrap().len(), 2);
        // Initial data shows the first hour.
        assert_eq!(fig["data"][0]["y"], json!([10.0, 5.0]));
    }

    #[test]
    fn test_no_hours_no_frames() {
        let fig = hourly_figure(&[], &[], 0);
        assert!(fig["data"].as_array().unwrap().is_empty());
        assert!(fig["frames"].as_array().unwrap().is_empty());
    }
}
