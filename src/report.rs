//! Text rendering of degradation results
//!
//! One line per result plus compact `++--` markers per checked minor version:
//! a `+` for every optimization and a `-` for every degradation.

use crate::change::{ConfidenceType, DegradationInfo, DegradationRecord, HistoryEntry, PerformanceChange};
use std::collections::BTreeMap;

/// Number of records per classification
pub fn count_changes<'a, I>(infos: I) -> BTreeMap<PerformanceChange, usize>
where
    I: IntoIterator<Item = &'a DegradationInfo>,
{
    let mut counts = BTreeMap::new();
    for info in infos {
        *counts.entry(info.classification).or_insert(0) += 1;
    }
    counts
}

fn totals(counts: &BTreeMap<PerformanceChange, usize>) -> (usize, usize) {
    counts.iter().fold((0, 0), |(opt, deg), (change, n)| {
        if change.is_optimization() {
            (opt + n, deg)
        } else if change.is_degradation() {
            (opt, deg + n)
        } else {
            (opt, deg)
        }
    })
}

/// `+` per optimization followed by `-` per degradation
pub fn change_markers(counts: &BTreeMap<PerformanceChange, usize>) -> String {
    let (optimizations, degradations) = totals(counts);
    format!("{}{}", "+".repeat(optimizations), "-".repeat(degradations))
}

/// One-line rendering of a single result
pub fn format_info(info: &DegradationInfo) -> String {
    let mut line = format!("{}: {} at {}", info.strategy, info.classification, info.location);
    if let Some(rate) = info.rate {
        line.push_str(&format!(" (rate: {:+.2}%)", rate * 100.0));
    }
    match (info.confidence_type, info.confidence_rate) {
        (ConfidenceType::None, _) | (_, None) => {}
        (kind, Some(confidence)) => {
            line.push_str(&format!(" with confidence {} = {:.2}", kind, confidence));
        }
    }
    if let (Some(from), Some(to)) = (&info.from_baseline, &info.to_target) {
        line.push_str(&format!(" [{} -> {}]", from, to));
    }
    line
}

/// One-line rendering of a persisted record, with its baseline
pub fn format_record(record: &DegradationRecord) -> String {
    format!(
        "{} (baseline {}, profile {})",
        format_info(&record.info),
        short_checksum(&record.baseline),
        record.profile
    )
}

/// Markers and totals, or "no changes"
pub fn short_summary<'a, I>(infos: I) -> String
where
    I: IntoIterator<Item = &'a DegradationInfo>,
{
    let counts = count_changes(infos);
    let (optimizations, degradations) = totals(&counts);
    if optimizations + degradations == 0 {
        return "no changes".to_string();
    }
    format!(
        "{} {} optimization{}, {} degradation{}",
        change_markers(&counts),
        optimizations,
        plural(optimizations),
        degradations,
        plural(degradations)
    )
}

/// Counts per checked minor version, in traversal order
pub fn group_by_target(entries: &[HistoryEntry]) -> Vec<(&str, BTreeMap<PerformanceChange, usize>)> {
    let mut groups: Vec<(&str, BTreeMap<PerformanceChange, usize>)> = Vec::new();
    for entry in entries {
        let position = match groups.iter().position(|(target, _)| *target == entry.target) {
            Some(position) => position,
            None => {
                groups.push((entry.target.as_str(), BTreeMap::new()));
                groups.len() - 1
            }
        };
        *groups[position]
            .1
            .entry(entry.record.info.classification)
            .or_insert(0) += 1;
    }
    groups
}

fn plural(n: usize) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}

fn short_checksum(checksum: &str) -> &str {
    checksum.get(..7).unwrap_or(checksum)
}
