//! Daily sort-count history served by `GET /api/sort_log`.
//!
//! The console only derives a small summary from it: per-lane totals over the
//! most recent days and the total for today.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Date string (`YYYY-MM-DD`) → lane name → count.
pub type SortLog = BTreeMap<String, BTreeMap<String, u64>>;

/// Count for one lane across the summarised window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaneTotal {
    pub lane: String,
    /// One entry per day in `SortLogSummary::days`, in the same order.
    pub per_day: Vec<u64>,
    pub total: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortLogSummary {
    pub days: Vec<String>,
    pub lanes: Vec<LaneTotal>,
    pub today: String,
    pub today_total: u64,
}

impl SortLogSummary {
    /// Summarise the last `window` days present in `log`.
    ///
    /// Lane order follows `lane_names` (the current topology); lanes absent
    /// from a day count as zero.
    pub fn build(log: &SortLog, lane_names: &[String], window: usize, today: NaiveDate) -> Self {
        // keys sort lexicographically, which is chronological for ISO dates
        let days: Vec<String> = log
            .keys()
            .rev()
            .take(window)
            .cloned()
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect();

        let lanes = lane_names
            .iter()
            .map(|name| {
                let per_day: Vec<u64> = days
                    .iter()
                    .map(|day| {
                        log.get(day)
                            .and_then(|counts| counts.get(name))
                            .copied()
                            .unwrap_or(0)
                    })
                    .collect();
                LaneTotal {
                    lane: name.clone(),
                    total: per_day.iter().sum(),
                    per_day,
                }
            })
            .collect();

        let today = today.format("%Y-%m-%d").to_string();
        let today_total = lane_names
            .iter()
            .filter_map(|name| log.get(&today).and_then(|counts| counts.get(name)))
            .sum();

        Self {
            days,
            lanes,
            today,
            today_total,
        }
    }
}
