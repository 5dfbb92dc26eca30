//! Flow-diagram (Sankey) builder.
//!
//! Turns a flat (stage-1, stage-2, ..., value) table into the node and link
//! arrays a Sankey renderer wants. Labels are deduplicated across all stage
//! columns in first-seen order; each label keeps the color of the stage it
//! first appeared in; link weights are group-summed over (source, target).
//!
//! Adjacent stage pairs all accumulate into one table, so the same literal
//! (source, target) pair arising from different adjacencies merges into a
//! single link. That matches the source analysis this was lifted from.

use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};

use super::FigureError;
use crate::frame::Frame;

/// One color per stage column; more stages than colors is a caller error.
pub const FLOW_PALETTE: [&str; 5] = ["#4B8BBE", "#306998", "#FFE873", "#FFD43B", "#646464"];

const NODE_PAD: u32 = 15;
const NODE_THICKNESS: u32 = 20;
const NODE_LINE_WIDTH: f64 = 0.5;
const TITLE_FONT_SIZE: u32 = 10;

/// Build a Sankey figure from `frame`, flowing through `stage_cols` in
/// order, weighted by the numeric `value_col`.
pub fn sankey_figure(
    frame: &Frame,
    stage_cols: &[&str],
    value_col: &str,
    title: &str,
) -> Result<Value, FigureError> {
    if stage_cols.len() < 2 {
        return Err(FigureError::NotEnoughStages(stage_cols.len()));
    }
    if stage_cols.len() > FLOW_PALETTE.len() {
        return Err(FigureError::PaletteExhausted {
            stages: stage_cols.len(),
            palette: FLOW_PALETTE.len(),
        });
    }

    // Unified label list: per-stage distinct values in first-seen order,
    // concatenated, then deduplicated globally keeping the first occurrence.
    // A label's color is the palette entry of the stage it first appeared in.
    let mut labels: Vec<String> = Vec::new();
    let mut colors: Vec<&str> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    for (stage_idx, col) in stage_cols.iter().enumerate() {
        let mut stage_seen: HashSet<String> = HashSet::new();
        for cell in frame.column(col)? {
            let label = cell.label();
            if !stage_seen.insert(label.clone()) {
                continue;
            }
            if seen.insert(label.clone()) {
                labels.push(label);
                colors.push(FLOW_PALETTE[stage_idx]);
            }
        }
    }

    // Project every adjacent stage pair to (source, target, count) and fold
    // it into one running table, group-summing as we go.
    let mut combined = Frame::new(&["source", "target", "count"]);
    for pair in stage_cols.windows(2) {
        let projected = frame.select_renamed(&[
            (pair[0], "source"),
            (pair[1], "target"),
            (value_col, "count"),
        ])?;
        combined.append(&projected)?;
        combined = combined.group_sum(&["source", "target"], "count")?;
    }

    let index_of: HashMap<&str, usize> = labels
        .iter()
        .enumerate()
        .map(|(i, l)| (l.as_str(), i))
        .collect();
    let mut sources: Vec<usize> = Vec::with_capacity(combined.len());
    let mut targets: Vec<usize> = Vec::with_capacity(combined.len());
    let mut values: Vec<f64> = Vec::with_capacity(combined.len());
    for row in combined.rows() {
        let source = row[0].label();
        let target = row[1].label();
        sources.push(
            *index_of
                .get(source.as_str())
                .ok_or_else(|| FigureError::UnknownLabel(source.clone()))?,
        );
        targets.push(
            *index_of
                .get(target.as_str())
                .ok_or_else(|| FigureError::UnknownLabel(target.clone()))?,
        );
        values.push(row[2].as_num().unwrap_or(0.0));
    }

    Ok(json!({
        "data": [{
            "type": "sankey",
            "node": {
                "pad": NODE_PAD,
                "thickness": NODE_THICKNESS,
                "line": { "color": "black", "width": NODE_LINE_WIDTH },
                "label": labels,
                "color": colors,
            },
            "link": {
                "source": sources,
                "target": targets,
                "value": values,
            },
        }],
        "layout": {
            "title": title,
            "font": { "size": TITLE_FONT_SIZE },
        },
    }))
}

/// The dashboard's flow figure: the full category -> daytime Sankey plus an
/// updatemenu that narrows the diagram to a single category.
pub fn flow_figure(
    frame: &Frame,
    category_order: &[String],
    title: &str,
) -> Result<Value, FigureError> {
    let mut figure = sankey_figure(frame, &["category", "daytime"], "value", title)?;

    let mut buttons = vec![json!({
        "args": [sankey_figure(frame, &["category", "daytime"], "value", title)?],
        "label": "All",
        "method": "animate",
    })];
    for category in category_order {
        let subset = frame.filter_str_eq("category", category)?;
        buttons.push(json!({
            "args": [sankey_figure(&subset, &["category", "daytime"], "value", title)?],
            "label": category,
            "method": "animate",
        }));
    }
    figure["layout"]["updatemenus"] = json!([{ "buttons": buttons }]);
    Ok(figure)
}
