//! Metric selector for the dashboard queries.
//!
//! Replaces per-call-site string comparisons with one enum chosen at the
//! edge (query parameter or CLI argument) and passed down.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Metric {
    /// Sum of transaction amounts.
    TotalExpenditure,
    /// Number of transactions.
    TotalTransactions,
    /// Mean transaction amount.
    AvgTicket,
}

impl Metric {
    pub const ALL: [Metric; 3] = [
        Metric::TotalExpenditure,
        Metric::TotalTransactions,
        Metric::AvgTicket,
    ];

    /// Wire/CLI identifier, matching the original dashboard's option values.
    pub fn key(&self) -> &'static str {
        match self {
            Metric::TotalExpenditure => "Total_Expenditure",
            Metric::TotalTransactions => "Total_Transactions",
            Metric::AvgTicket => "Avg_Ticket",
        }
    }

    /// Human-readable title fragment.
    pub fn label(&self) -> &'static str {
        match self {
            Metric::TotalExpenditure => "Total Expenditure",
            Metric::TotalTransactions => "Total Transactions",
            Metric::AvgTicket => "Avg Ticket",
        }
    }

    pub fn parse(s: &str) -> Option<Metric> {
        match s {
            "Total_Expenditure" | "expenditure" => Some(Metric::TotalExpenditure),
            "Total_Transactions" | "transactions" => Some(Metric::TotalTransactions),
            "Avg_Ticket" | "avg_ticket" => Some(Metric::AvgTicket),
            _ => None,
        }
    }

    /// Collapse an accumulated (sum, count) pair into this metric's value.
    pub fn value(&self, sum: f64, count: u64) -> f64 {
        match self {
            Metric::TotalExpenditure => sum,
            Metric::TotalTransactions => count as f64,
            Metric::AvgTicket => {
                if count == 0 {
                    0.0
                } else {
                    sum / count as f64
                }
            }
        }
    }
}

/// Running (sum, count) accumulator shared by every grouped aggregation.
#[derive(Debug, Clone, Copy, Default)]
pub struct Acc {
    pub sum: f64,
    pub count: u64,
}

impl Acc {
    pub fn add(&mut self, amount: f64) {
        self.sum += amount;
        self.count += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_roundtrip() {
        for m in Metric::ALL {
            assert_eq!(Metric::parse(m.key()), Some(m));
        }
        assert_eq!(Metric::parse("bogus"), None);
    }

    #[test]
    fn test_value_per_variant() {
        let mut acc = Acc::default();
        acc.add(10.0);
        acc.add(20.0);
        assert_eq!(Metric::TotalExpenditure.value(acc.sum, acc.count), 30.0);
        assert_eq!(Metric::TotalTransactions.value(acc.sum, acc.count), 2.0);
        assert_eq!(Metric::AvgTicket.value(acc.sum, acc.count), 15.0);
    }

    #[test]
    fn test_mean_of_empty_is_zero() {
        assert_eq!(Metric::AvgTicket.value(0.0, 0), 0.0);
    }
}
