//! Business-hour alignment of posting times under whole-hour UTC offsets.
//!
//! This is a constant-shift heuristic: no timezone database and no DST.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Duration, Timelike, Utc};

use crate::domain::{GroupOffsetScore, VictimRecord};

pub const MIN_OFFSET: i32 = -12;
pub const MAX_OFFSET: i32 = 12;

/// Local business hours, `[START, END)`.
pub const BUSINESS_START_HOUR: u32 = 9;
pub const BUSINESS_END_HOUR: u32 = 17;

/// Every candidate offset, most negative first.
pub fn candidate_offsets() -> impl Iterator<Item = i32> {
    MIN_OFFSET..=MAX_OFFSET
}

pub fn is_business_hour(hour: u32) -> bool {
    (BUSINESS_START_HOUR..BUSINESS_END_HOUR).contains(&hour)
}

/// Hour of day after shifting `hour` by `offset` hours.
pub fn shift_hour(hour: u32, offset: i32) -> u32 {
    (hour as i32 + offset).rem_euclid(24) as u32
}

/// The instant as it reads on a wall clock `offset` hours from UTC.
pub fn shift_instant(timestamp: &DateTime<Utc>, offset: i32) -> DateTime<Utc> {
    *timestamp + Duration::hours(offset as i64)
}

/// Posting times of one group bucketed by UTC hour and UTC weekday.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HourHistogram {
    hours: [u64; 24],
    /// Bucketed by (weekday, hour) so weekdays can be re-read in any local time.
    slots: BTreeMap<(u32, u32), u64>,
}

impl HourHistogram {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, timestamp: &DateTime<Utc>) {
        let hour = timestamp.hour();
        let weekday = timestamp.weekday().num_days_from_monday();
        self.hours[hour as usize] += 1;
        *self.slots.entry((weekday, hour)).or_insert(0) += 1;
    }

    pub fn total(&self) -> u64 {
        self.hours.iter().sum()
    }

    /// Counts by hour of day after shifting every post by `offset`.
    pub fn local_hours(&self, offset: i32) -> [u64; 24] {
        let mut local = [0u64; 24];
        for (utc_hour, count) in self.hours.iter().enumerate() {
            local[shift_hour(utc_hour as u32, offset) as usize] += count;
        }
        local
    }

    /// Counts by weekday (Monday first) after shifting every post by `offset`.
    pub fn local_weekdays(&self, offset: i32) -> [u64; 7] {
        let mut local = [0u64; 7];
        for (&(weekday, hour), count) in &self.slots {
            let shifted = hour as i32 + offset;
            let day_carry = shifted.div_euclid(24);
            let day = (weekday as i32 + day_carry).rem_euclid(7);
            local[day as usize] += count;
        }
        local
    }

    /// Number of posts landing in local business hours under `offset`.
    pub fn business_posts(&self, offset: i32) -> u64 {
        self.hours
            .iter()
            .enumerate()
            .filter(|(utc_hour, _)| is_business_hour(shift_hour(*utc_hour as u32, offset)))
            .map(|(_, count)| count)
            .sum()
    }

    /// Fraction of posts in local business hours; 0.0 for an empty histogram.
    pub fn match_fraction(&self, offset: i32) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        self.business_posts(offset) as f64 / total as f64
    }

    pub fn score(&self, group: &str, offset: i32) -> GroupOffsetScore {
        GroupOffsetScore {
            group: group.to_string(),
            offset,
            matched: self.business_posts(offset),
            total: self.total(),
            match_fraction: self.match_fraction(offset),
        }
    }
}

/// Buckets records per group, groups in name order.
pub fn build_histograms(records: &[VictimRecord]) -> BTreeMap<String, HourHistogram> {
    let mut histograms: BTreeMap<String, HourHistogram> = BTreeMap::new();
    for record in records {
        histograms
            .entry(record.group.clone())
            .or_default()
            .record(&record.timestamp);
    }
    histograms
}

/// Per-group business-hour fraction for one fixed offset.
pub fn score(records: &[VictimRecord], offset: i32) -> Vec<GroupOffsetScore> {
    build_histograms(records)
        .iter()
        .map(|(group, histogram)| histogram.score(group, offset))
        .collect()
}

/// Scores of every group under every candidate offset.
pub fn score_all_offsets(histograms: &BTreeMap<String, HourHistogram>) -> Vec<GroupOffsetScore> {
    histograms
        .iter()
        .flat_map(|(group, histogram)| candidate_offsets().map(move |o| histogram.score(group, o)))
        .collect()
}
