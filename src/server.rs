//! JSON API for the dashboard front-end.
//!
//! Blocking single-threaded listener; every request re-runs the aggregation
//! against the immutable dataset and rebuilds the figure, so there is no
//! cache to invalidate and no state to share. Slider and dropdown controls
//! map to query parameters.

use anyhow::Result;
use serde_json::json;
use std::collections::HashMap;
use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;

use crate::config::Config;
use crate::dataset::Dataset;
use crate::figures::choropleth::choropleth_figure;
use crate::figures::heatmap::heatmap_figure;
use crate::figures::hourly::hourly_figure;
use crate::figures::pareto::pareto_figure;
use crate::figures::points::points_figure;
use crate::figures::sankey::flow_figure;
use crate::figures::targeting::{tiers_figure, volume_figure, Range};
use crate::figures::violin::violin_figure;
use crate::logging::{json_log, obj, v_num, v_str, Domain};
use crate::metric::Metric;
use crate::query;

#[derive(Debug, Clone)]
pub struct Response {
    pub status: &'static str,
    pub content_type: &'static str,
    pub body: String,
}

impl Response {
    fn ok(body: String) -> Self {
        Self { status: "200 OK", content_type: "application/json", body }
    }

    fn error(status: &'static str, message: &str) -> Self {
        Self {
            status,
            content_type: "application/json",
            body: json!({ "error": message }).to_string(),
        }
    }
}

/// Split a request target into its path and query parameters.
pub fn parse_target(target: &str) -> (&str, HashMap<String, String>) {
    let mut params = HashMap::new();
    let (path, query) = match target.split_once('?') {
        Some((p, q)) => (p, q),
        None => (target, ""),
    };
    for pair in query.split('&').filter(|p| !p.is_empty()) {
        let (k, v) = pair.split_once('=').unwrap_or((pair, ""));
        params.insert(k.to_string(), v.to_string());
    }
    (path, params)
}

fn param_f64(params: &HashMap<String, String>, key: &str, default: f64) -> f64 {
    params.get(key).and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn param_usize(params: &HashMap<String, String>, key: &str, default: usize) -> usize {
    params.get(key).and_then(|v| v.parse().ok()).unwrap_or(default).max(1)
}

/// Route one request target to a JSON response. Pure with respect to the
/// dataset, which makes it directly testable without sockets.
pub fn handle(ds: &Dataset, cfg: &Config, target: &str) -> Response {
    let (path, params) = parse_target(target);

    if path == "/api/health" {
        return Response::ok(r#"{"status":"ok"}"#.to_string());
    }

    if path == "/api/summary" {
        let top = param_usize(&params, "top", cfg.default_top);
        let summary = query::kpi_summary(ds, top);
        return match serde_json::to_string(&summary) {
            Ok(body) => Response::ok(body),
            Err(e) => Response::error("500 INTERNAL SERVER ERROR", &e.to_string()),
        };
    }

    let figure = match path.strip_prefix("/api/figure/") {
        Some(name) => name,
        None => return Response::error("404 NOT FOUND", "no such route"),
    };

    let metric = match params.get("metric") {
        Some(raw) => match Metric::parse(raw) {
            Some(m) => m,
            None => return Response::error("400 BAD REQUEST", "unknown metric"),
        },
        None => Metric::TotalExpenditure,
    };
    let top = param_usize(&params, "top", cfg.default_top);

    let value = match figure {
        "map" => {
            let stats: Vec<_> = query::ranked_rollup(ds, metric).into_iter().take(top).collect();
            choropleth_figure(&stats, metric)
        }
        "pareto" => pareto_figure(&query::pareto_rows(ds, metric, top), metric),
        "violin" => {
            let (stats, order) = query::by_country_hour(ds, metric, top);
            violin_figure(&stats, &order, metric)
        }
        "heatmap" => {
            let (stats, order) = query::by_country_hour(ds, metric, top);
            heatmap_figure(&stats, &order, metric)
        }
        "points" => points_figure(&query::by_category_country(ds, metric, top), metric),
        "hourly" => {
            let (points, hours) = query::hourly_points(ds, top);
            hourly_figure(&points, &hours, top)
        }
        "flow" => {
            let frame = query::category_daytime_frame(ds, metric, top);
            let categories = query::categories(ds);
            match flow_figure(&frame, &categories, "Merchant Transactions") {
                Ok(v) => v,
                Err(e) => return Response::error("422 UNPROCESSABLE ENTITY", &e.to_string()),
            }
        }
        "targeting_volume" => {
            let stats = query::country_rollup(ds);
            let max_tx = stats.iter().map(|s| s.total_transactions as f64).fold(0.0, f64::max);
            let max_ticket = stats.iter().map(|s| s.avg_ticket).fold(0.0, f64::max);
            let tx = Range {
                min: param_f64(&params, "tx_min", 0.0),
                max: param_f64(&params, "tx_max", max_tx + 10.0),
            };
            let ticket = Range {
                min: param_f64(&params, "ticket_min", 0.0),
                max: param_f64(&params, "ticket_max", max_ticket + 10.0),
            };
            volume_figure(&stats, tx, ticket)
        }
        "targeting_tiers" => {
            let stats = query::country_rollup(ds);
            let max_tx = stats.iter().map(|s| s.total_transactions as f64).fold(0.0, f64::max);
            let max_exp = stats.iter().map(|s| s.total_expenditure).fold(0.0, f64::max);
            let tx = Range {
                min: param_f64(&params, "tx_min", 0.0),
                max: param_f64(&params, "tx_max", max_tx + 10.0),
            };
            let exp = Range {
                min: param_f64(&params, "exp_min", 0.0),
                max: param_f64(&params, "exp_max", max_exp + 100.0),
            };
            tiers_figure(&stats, tx, exp)
        }
        _ => return Response::error("404 NOT FOUND", "no such figure"),
    };
    Response::ok(value.to_string())
}

/// Accept loop. Connections are handled one at a time; a bad socket is
/// dropped and the loop moves on.
pub fn serve(ds: &Dataset, cfg: &Config) -> Result<()> {
    let listener = TcpListener::bind(format!("127.0.0.1:{}", cfg.server_port))?;
    json_log(
        Domain::System,
        "server_started",
        obj(&[("port", v_num(cfg.server_port as f64))]),
    );

    for stream in listener.incoming() {
        let mut stream = match stream {
            Ok(s) => s,
            Err(_) => continue,
        };
        let buf_reader = BufReader::new(&stream);
        let request_line = match buf_reader.lines().next() {
            Some(Ok(line)) => line,
            _ => continue,
        };
        let target = match request_line.split_whitespace().nth(1) {
            Some(t) if request_line.starts_with("GET ") => t.to_string(),
            _ => continue,
        };

        let response = handle(ds, cfg, &target);
        json_log(
            Domain::Server,
            "request",
            obj(&[("target", v_str(&target)), ("status", v_str(response.status))]),
        );
        let payload = format!(
            "HTTP/1.1 {}\r\n\
             Content-Type: {}\r\n\
             Access-Control-Allow-Origin: *\r\n\
             Content-Length: {}\r\n\r\n{}",
            response.status,
            response.content_type,
            response.body.len(),
            response.body
        );
        let _ = stream.write_all(payload.as_bytes());
    }
    Ok(())
}
