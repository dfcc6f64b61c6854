use crate::azure::models::Thread;
use std::collections::{BTreeMap, HashSet};

const PREFERRED_STATUS_ORDER: [&str; 6] = ["active", "pending", "fixed", "wontFix", "byDesign", "closed"];

/// Keeps threads whose status is in `statuses`, in order. An empty set keeps
/// everything.
pub fn filter_by_status(threads: Vec<Thread>, statuses: &[String]) -> Vec<Thread> {
    if statuses.is_empty() {
        return threads;
    }
    threads
        .into_iter()
        .filter(|thread| statuses.iter().any(|s| *s == thread.status))
        .collect()
}

pub fn count_by_status(threads: &[Thread]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for thread in threads {
        *counts.entry(thread.status.clone()).or_insert(0) += 1;
    }
    counts
}

/// Explains an empty result when a status filter was requested but other
/// threads exist. Returns an empty string in every other case.
pub fn empty_status_filter_summary(
    statuses: &[String],
    all_counts: &BTreeMap<String, usize>,
    filtered_count: usize,
) -> String {
    if statuses.is_empty() || filtered_count != 0 || all_counts.values().sum::<usize>() == 0 {
        return String::new();
    }

    let requested = dedupe_preserving_order(statuses);
    let requested_set: HashSet<&str> = requested.iter().copied().collect();

    let others: BTreeMap<&str, usize> = all_counts
        .iter()
        .filter(|(status, n)| **n > 0 && !requested_set.contains(status.as_str()))
        .map(|(status, n)| (status.as_str(), *n))
        .collect();
    let other_total: usize = others.values().sum();
    if other_total == 0 {
        return String::new();
    }

    let breakdown: Vec<String> = ordered_statuses(&others)
        .into_iter()
        .map(|status| format!("{}={}", status, others[status]))
        .collect();

    let (noun, verb) = if other_total == 1 {
        ("comment thread", "has")
    } else {
        ("comment threads", "have")
    };

    format!(
        "0 comment threads matched status filter ({}); {} {} {} other statuses: {}",
        requested.join(","),
        other_total,
        noun,
        verb,
        breakdown.join(", ")
    )
}

/// Preferred statuses first, then the rest alphabetically.
fn ordered_statuses<'a>(counts: &BTreeMap<&'a str, usize>) -> Vec<&'a str> {
    let mut ordered: Vec<&str> = PREFERRED_STATUS_ORDER
        .iter()
        .copied()
        .filter(|status| counts.contains_key(status))
        .collect();
    // BTreeMap iteration is already sorted.
    ordered.extend(
        counts
            .keys()
            .copied()
            .filter(|status| !PREFERRED_STATUS_ORDER.contains(status)),
    );
    ordered
}

fn dedupe_preserving_order(values: &[String]) -> Vec<&str> {
    let mut seen = HashSet::new();
    values
        .iter()
        .map(String::as_str)
        .filter(|value| seen.insert(*value))
        .collect()
}
