//! Aggregation queries over the loaded dataset.
//!
//! Every function here is pure: it takes the immutable dataset plus the
//! active metric / top-N selection and returns plain rows for a figure
//! builder. Group orderings are deterministic (ties broken by key).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::dataset::Dataset;
use crate::frame::{Cell, Frame};
use crate::metric::{Acc, Metric};

/// Targeting tier thresholds, carried over from the original analysis.
pub const TIER_TX_THRESHOLD: f64 = 6.5;
pub const TIER_EXP_THRESHOLD: f64 = 9400.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountryStat {
    pub code: String,
    pub alpha3: String,
    pub name: String,
    pub total_expenditure: f64,
    pub total_transactions: u64,
    pub avg_ticket: f64,
}

impl CountryStat {
    pub fn metric(&self, metric: Metric) -> f64 {
        match metric {
            Metric::TotalExpenditure => self.total_expenditure,
            Metric::TotalTransactions => self.total_transactions as f64,
            Metric::AvgTicket => self.avg_ticket,
        }
    }
}

/// Per-country aggregate over all transactions, ordered by country code.
pub fn country_rollup(ds: &Dataset) -> Vec<CountryStat> {
    let mut groups: BTreeMap<String, (String, String, Acc)> = BTreeMap::new();
    for r in &ds.records {
        let entry = groups
            .entry(r.country_code.clone())
            .or_insert_with(|| (r.alpha3.clone(), r.country_name.clone(), Acc::default()));
        entry.2.add(r.amount);
    }
    groups
        .into_iter()
        .map(|(code, (alpha3, name, acc))| CountryStat {
            code,
            alpha3,
            name,
            total_expenditure: acc.sum,
            total_transactions: acc.count,
            avg_ticket: Metric::AvgTicket.value(acc.sum, acc.count),
        })
        .collect()
}

/// Rollup sorted descending by the metric, ties broken by country code.
pub fn ranked_rollup(ds: &Dataset, metric: Metric) -> Vec<CountryStat> {
    let mut stats = country_rollup(ds);
    stats.sort_by(|a, b| {
        b.metric(metric)
            .partial_cmp(&a.metric(metric))
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.code.cmp(&b.code))
    });
    stats
}

/// Alpha-2 codes of the top `n` countries by the metric.
pub fn top_countries(ds: &Dataset, metric: Metric, n: usize) -> Vec<String> {
    ranked_rollup(ds, metric)
        .into_iter()
        .take(n)
        .map(|s| s.code)
        .collect()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KpiSummary {
    pub total_expenditure: f64,
    pub total_transactions: u64,
    pub avg_ticket: f64,
}

/// The three dashboard cards. Each ranks countries by its own metric before
/// totaling the top `n`.
pub fn kpi_summary(ds: &Dataset, n: usize) -> KpiSummary {
    let by_exp = ranked_rollup(ds, Metric::TotalExpenditure);
    let by_tx = ranked_rollup(ds, Metric::TotalTransactions);
    let by_ticket = ranked_rollup(ds, Metric::AvgTicket);

    let total_expenditure = by_exp.iter().take(n).map(|s| s.total_expenditure).sum();
    let total_transactions = by_tx.iter().take(n).map(|s| s.total_transactions).sum();
    let top_tickets: Vec<f64> = by_ticket.iter().take(n).map(|s| s.avg_ticket).collect();
    let avg_ticket = if top_tickets.is_empty() {
        0.0
    } else {
        top_tickets.iter().sum::<f64>() / top_tickets.len() as f64
    };
    KpiSummary {
        total_expenditure,
        total_transactions,
        avg_ticket,
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HourStat {
    pub country: String,
    pub hour: u8,
    pub value: f64,
}

/// (country, hour) aggregate restricted to the top `n` countries by the same
/// metric. Also returns the country ranking order for axis layout.
pub fn by_country_hour(ds: &Dataset, metric: Metric, n: usize) -> (Vec<HourStat>, Vec<String>) {
    let order = top_countries(ds, metric, n);
    let keep: std::collections::HashSet<&String> = order.iter().collect();
    let mut groups: BTreeMap<(String, u8), Acc> = BTreeMap::new();
    for r in &ds.records {
        if !keep.contains(&r.country_code) {
            continue;
        }
        groups
            .entry((r.country_code.clone(), r.hour))
            .or_default()
            .add(r.amount);
    }
    let stats = groups
        .into_iter()
        .map(|((country, hour), acc)| HourStat {
            country,
            hour,
            value: metric.value(acc.sum, acc.count),
        })
        .collect();
    (stats, order)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryCountryStat {
    pub category: String,
    pub country: String,
    pub value: f64,
}

#[derive(Debug, Clone)]
pub struct CategoryCountryView {
    pub stats: Vec<CategoryCountryStat>,
    /// Categories by descending metric over the whole dataset.
    pub category_order: Vec<String>,
    /// Top-n countries by descending metric.
    pub country_order: Vec<String>,
}

/// (category, country) aggregate for the bubble plot.
pub fn by_category_country(ds: &Dataset, metric: Metric, n: usize) -> CategoryCountryView {
    let country_order = top_countries(ds, metric, n);
    let keep: std::collections::HashSet<&String> = country_order.iter().collect();

    let mut category_groups: BTreeMap<String, Acc> = BTreeMap::new();
    for r in &ds.records {
        category_groups.entry(r.category.clone()).or_default().add(r.amount);
    }
    let mut category_order: Vec<(String, f64)> = category_groups
        .into_iter()
        .map(|(cat, acc)| (cat, metric.value(acc.sum, acc.count)))
        .collect();
    category_order.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
    });

    let mut groups: BTreeMap<(String, String), Acc> = BTreeMap::new();
    for r in &ds.records {
        if !keep.contains(&r.country_code) {
            continue;
        }
        groups
            .entry((r.category.clone(), r.country_code.clone()))
            .or_default()
            .add(r.amount);
    }
    let stats = groups
        .into_iter()
        .map(|((category, country), acc)| CategoryCountryStat {
            category,
            country,
            value: metric.value(acc.sum, acc.count),
        })
        .collect();
    CategoryCountryView {
        stats,
        category_order: category_order.into_iter().map(|(c, _)| c).collect(),
        country_order,
    }
}

/// The (category, daytime, value) table feeding the flow diagram, restricted
/// to the top `n` countries and sorted descending by value.
pub fn category_daytime_frame(ds: &Dataset, metric: Metric, n: usize) -> Frame {
    let keep: std::collections::HashSet<String> = top_countries(ds, metric, n).into_iter().collect();
    let mut groups: BTreeMap<(String, String), Acc> = BTreeMap::new();
    for r in &ds.records {
        if !keep.contains(&r.country_code) {
            continue;
        }
        groups
            .entry((r.category.clone(), r.daytime.clone()))
            .or_default()
            .add(r.amount);
    }
    let mut frame = Frame::new(&["category", "daytime", "value"]);
    for ((category, daytime), acc) in groups {
        let row = vec![
            Cell::Str(category),
            Cell::Str(daytime),
            Cell::Num(metric.value(acc.sum, acc.count)),
        ];
        // arity is fixed here; push cannot fail
        let _ = frame.push_row(row);
    }
    let _ = frame.sort_desc_by("value");
    frame
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParetoRow {
    pub name: String,
    pub value: f64,
    pub cumulative: f64,
    pub cumulative_pct: f64,
}

/// Top-n countries with running cumulative share of the metric. A Pareto
/// over a mean is meaningless, so AvgTicket falls back to expenditure.
pub fn pareto_rows(ds: &Dataset, metric: Metric, n: usize) -> Vec<ParetoRow> {
    let metric = match metric {
        Metric::AvgTicket => Metric::TotalExpenditure,
        other => other,
    };
    let top: Vec<CountryStat> = ranked_rollup(ds, metric).into_iter().take(n).collect();
    let total: f64 = top.iter().map(|s| s.metric(metric)).sum();
    let mut cumulative = 0.0;
    top.into_iter()
        .map(|s| {
            let value = s.metric(metric);
            cumulative += value;
            ParetoRow {
                name: s.name,
                value,
                cumulative,
                cumulative_pct: if total > 0.0 { 100.0 * cumulative / total } else { 0.0 },
            }
        })
        .collect()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HourlyPoint {
    pub country: String,
    pub hour: u8,
    pub total_amount: f64,
    pub transactions: u64,
}

/// Per (country, hour) expenditure and transaction count for the animated
/// scatter, restricted to the top `n` countries by expenditure. Returns the
/// distinct hours in ascending order alongside.
pub fn hourly_points(ds: &Dataset, n: usize) -> (Vec<HourlyPoint>, Vec<u8>) {
    let keep: std::collections::HashSet<String> =
        top_countries(ds, Metric::TotalExpenditure, n).into_iter().collect();
    let mut groups: BTreeMap<(u8, String), Acc> = BTreeMap::new();
    for r in &ds.records {
        if !keep.contains(&r.country_code) {
            continue;
        }
        groups
            .entry((r.hour, r.country_code.clone()))
            .or_default()
            .add(r.amount);
    }
    let mut hours: Vec<u8> = Vec::new();
    let points: Vec<HourlyPoint> = groups
        .into_iter()
        .map(|((hour, country), acc)| {
            if hours.last() != Some(&hour) {
                hours.push(hour);
            }
            HourlyPoint {
                country,
                hour,
                total_amount: acc.sum,
                transactions: acc.count,
            }
        })
        .collect();
    (points, hours)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tier {
    One,
    Two,
    Three,
}

impl Tier {
    pub fn label(&self) -> &'static str {
        match self {
            Tier::One => "Tier 1",
            Tier::Two => "Tier 2",
            Tier::Three => "Tier 3",
        }
    }
}

/// Targeting tier of a country from its transaction count and expenditure.
pub fn tier_of(total_transactions: f64, total_expenditure: f64) -> Tier {
    if total_transactions < TIER_TX_THRESHOLD {
        Tier::One
    } else if total_expenditure >= TIER_EXP_THRESHOLD {
        Tier::Three
    } else {
        Tier::Two
    }
}

/// Distinct categories in first-seen record order.
pub fn categories(ds: &Dataset) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut out = Vec::new();
    for r in &ds.records {
        if seen.insert(r.category.clone()) {
            out.push(r.category.clone());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::TxRecord;
    use chrono::NaiveDate;

    fn tx(code: &str, category: &str, amount: f64, hour: u8, daytime: &str) -> TxRecord {
        TxRecord {
            country_code: code.to_string(),
            country_name: format!("Name-{}", code),
            alpha3: format!("{}X", code),
            continent: "Europe".to_string(),
            category: category.to_string(),
            amount,
            hour,
            daytime: daytime.to_string(),
            ts: NaiveDate::from_ymd_opt(2017, 2, 2)
                .unwrap()
                .and_hms_opt(hour as u32, 0, 0)
                .unwrap(),
        }
    }

    fn sample() -> Dataset {
        Dataset::from_records(vec![
            tx("DE", "Fashion & Shoes", 100.0, 10, "morning"),
            tx("DE", "Fashion & Shoes", 50.0, 20, "evening"),
            tx("FR", "Bars & restaurants", 30.0, 10, "morning"),
            tx("FR", "Fashion & Shoes", 10.0, 21, "evening"),
            tx("US", "Accommodation", 200.0, 9, "morning"),
        ])
    }

    #[test]
    fn test_rollup_totals() {
        let ds = sample();
        let stats = country_rollup(&ds);
        assert_eq!(stats.len(), 3);
        let de = stats.iter().find(|s| s.code == "DE").unwrap();
        assert_eq!(de.total_expenditure, 150.0);
        assert_eq!(de.total_transactions, 2);
        assert_eq!(de.avg_ticket, 75.0);
    }

    #[test]
    fn test_ranked_rollup_order() {
        let ds = sample();
        let by_exp = ranked_rollup(&ds, Metric::TotalExpenditure);
        assert_eq!(by_exp[0].code, "US");
        assert_eq!(by_exp[1].code, "DE");
        let by_tx = ranked_rollup(&ds, Metric::TotalTransactions);
        assert_eq!(by_tx[0].code, "DE");
        assert_eq!(by_tx[1].code, "FR");
    }

    #[test]
    fn test_top_countries_cutoff() {
        let ds = sample();
        assert_eq!(top_countries(&ds, Metric::TotalExpenditure, 2), vec!["US", "DE"]);
    }

    #[test]
    fn test_kpi_summary_per_card_ranking() {
        let ds = sample();
        let kpi = kpi_summary(&ds, 2);
        // expenditure: US 200 + DE 150
        assert_eq!(kpi.total_expenditure, 350.0);
        // transactions: DE 2 + FR 2
        assert_eq!(kpi.total_transactions, 4);
        // avg tickets ranked: US 200, DE 75 -> mean 137.5
        assert_eq!(kpi.avg_ticket, 137.5);
    }

    #[test]
    fn test_by_country_hour_restricts_and_orders() {
        let ds = sample();
        let (stats, order) = by_country_hour(&ds, Metric::TotalExpenditure, 2);
        assert_eq!(order, vec!["US", "DE"]);
        assert!(stats.iter().all(|s| s.country != "FR"));
        let de10 = stats
            .iter()
            .find(|s| s.country == "DE" && s.hour == 10)
            .unwrap();
        assert_eq!(de10.value, 100.0);
    }

    #[test]
    fn test_pareto_cumulative_monotone_ends_at_100() {
        let ds = sample();
        let rows = pareto_rows(&ds, Metric::TotalExpenditure, 3);
        assert_eq!(rows.len(), 3);
        for pair in rows.windows(2) {
            assert!(pair[1].cumulative_pct >= pair[0].cumulative_pct);
        }
        assert!((rows.last().unwrap().cumulative_pct - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_pareto_avg_ticket_falls_back_to_expenditure() {
        let ds = sample();
        let a = pareto_rows(&ds, Metric::AvgTicket, 3);
        let b = pareto_rows(&ds, Metric::TotalExpenditure, 3);
        assert_eq!(a[0].name, b[0].name);
        assert_eq!(a[0].value, b[0].value);
    }

    #[test]
    fn test_category_daytime_frame_sorted_desc() {
        let ds = sample();
        let frame = category_daytime_frame(&ds, Metric::TotalExpenditure, 3);
        assert_eq!(frame.columns(), &["category", "daytime", "value"]);
        let values: Vec<f64> = frame.rows().iter().filter_map(|r| r[2].as_num()).collect();
        for pair in values.windows(2) {
            assert!(pair[0] >= pair[1]);
        }
    }

    #[test]
    fn test_tier_boundaries() {
        assert_eq!(tier_of(6.4, 50_000.0), Tier::One);
        assert_eq!(tier_of(6.5, 9_399.0), Tier::Two);
        assert_eq!(tier_of(6.5, 9_400.0), Tier::Three);
    }

    #[test]
    fn test_hourly_points_counts() {
        let ds = sample();
        let (points, hours) = hourly_points(&ds, 3);
        assert!(hours.windows(2).all(|w| w[0] < w[1]));
        let de20 = points
            .iter()
            .find(|p| p.country == "DE" && p.hour == 20)
            .unwrap();
        assert_eq!(de20.transactions, 1);
        assert_eq!(de20.total_amount, 50.0);
    }

    #[test]
    fn test_categories_first_seen_order() {
        let ds = sample();
        assert_eq!(
            categories(&ds),
            vec!["Fashion & Shoes", "Bars & restaurants", "Accommodation"]
        );
    }

    #[test]
    fn test_empty_dataset_everywhere() {
        let ds = Dataset::from_records(Vec::new());
        assert!(country_rollup(&ds).is_empty());
        assert!(pareto_rows(&ds, Metric::TotalExpenditure, 10).is_empty());
        let kpi = kpi_summary(&ds, 10);
        assert_eq!(kpi.total_transactions, 0);
        assert!(category_daytime_frame(&ds, Metric::AvgTicket, 10).is_empty());
    }
}
