//! Targeting scatters: country positioning by volume and by tier.

use serde_json::{json, Value};

use crate::query::{tier_of, CountryStat, Tier, TIER_EXP_THRESHOLD, TIER_TX_THRESHOLD};

/// Upper guide line for the transaction axis, from the original analysis.
const TX_UPPER_GUIDE: f64 = 82.25;
/// Lower guide line for the expenditure axis.
const EXP_LOWER_GUIDE: f64 = 630.0;

#[derive(Debug, Clone, Copy)]
pub struct Range {
    pub min: f64,
    pub max: f64,
}

impl Range {
    pub fn contains(&self, v: f64) -> bool {
        v >= self.min && v <= self.max
    }
}

/// Transactions vs average ticket, range-filtered by both axes.
pub fn volume_figure(stats: &[CountryStat], tx_range: Range, ticket_range: Range) -> Value {
    let kept: Vec<&CountryStat> = stats
        .iter()
        .filter(|s| {
            tx_range.contains(s.total_transactions as f64) && ticket_range.contains(s.avg_ticket)
        })
        .collect();
    let x: Vec<u64> = kept.iter().map(|s| s.total_transactions).collect();
    let y: Vec<f64> = kept.iter().map(|s| s.avg_ticket).collect();
    let text: Vec<&str> = kept.iter().map(|s| s.code.as_str()).collect();
    let hover: Vec<&str> = kept.iter().map(|s| s.name.as_str()).collect();
    json!({
        "data": [{
            "type": "scatter",
            "mode": "markers+text",
            "x": x,
            "y": y,
            "text": text,
            "textposition": "top center",
            "hovertext": hover,
        }],
        "layout": {
            "title": "Total Transactions vs Average Ticket",
            "template": "plotly_white",
            "height": 600,
            "xaxis": { "title": "Total Transactions", "range": [tx_range.min, tx_range.max + 1.0] },
            "yaxis": { "title": "Avg Ticket", "range": [ticket_range.min, ticket_range.max + 1.0] },
        },
    })
}

fn dashed_line(x0: f64, y0: f64, x1: f64, y1: f64, color: &str) -> Value {
    json!({
        "type": "line",
        "x0": x0, "y0": y0, "x1": x1, "y1": y1,
        "xref": "x", "yref": "y",
        "line": { "width": 1, "dash": "dash", "color": color },
    })
}

/// Transactions vs expenditure on log-log axes, colored by targeting tier,
/// with the fixed tier guide lines.
pub fn tiers_figure(stats: &[CountryStat], tx_range: Range, exp_range: Range) -> Value {
    let kept: Vec<&CountryStat> = stats
        .iter()
        .filter(|s| {
            tx_range.contains(s.total_transactions as f64)
                && exp_range.contains(s.total_expenditure)
        })
        .collect();

    let traces: Vec<Value> = [Tier::One, Tier::Two, Tier::Three]
        .iter()
        .map(|tier| {
            let members: Vec<&&CountryStat> = kept
                .iter()
                .filter(|s| tier_of(s.total_transactions as f64, s.total_expenditure) == *tier)
                .collect();
            let x: Vec<u64> = members.iter().map(|s| s.total_transactions).collect();
            let y: Vec<f64> = members.iter().map(|s| s.total_expenditure).collect();
            let text: Vec<&str> = members.iter().map(|s| s.code.as_str()).collect();
            let hover: Vec<&str> = members.iter().map(|s| s.name.as_str()).collect();
            json!({
                "type": "scatter",
                "mode": "markers+text",
                "name": tier.label(),
                "x": x,
                "y": y,
                "text": text,
                "textposition": "top center",
                "hovertext": hover,
            })
        })
        .collect();

    let y_span = (EXP_LOWER_GUIDE.min(exp_range.min), TIER_EXP_THRESHOLD.max(exp_range.max));
    let x_span = (TIER_TX_THRESHOLD.min(tx_range.min), TX_UPPER_GUIDE.max(tx_range.max));
    json!({
        "data": traces,
        "layout": {
            "title": "Total Transactions vs Total Expenditure",
            "template": "plotly_white",
            "height": 600,
            "xaxis": { "title": "Total Transactions", "type": "log" },
            "yaxis": { "title": "Total Expenditure", "type": "log" },
            "shapes": [
                dashed_line(TX_UPPER_GUIDE, y_span.0, TX_UPPER_GUIDE, y_span.1, "red"),
                dashed_line(TIER_TX_THRESHOLD, y_span.0, TIER_TX_THRESHOLD, y_span.1, "red"),
                dashed_line(x_span.0, TIER_EXP_THRESHOLD, x_span.1, TIER_EXP_THRESHOLD, "blue"),
                dashed_line(x_span.0, EXP_LOWER_GUIDE, x_span.1, EXP_LOWER_GUIDE, "blue"),
            ],
        },
    })
}
