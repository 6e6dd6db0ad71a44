//! Picks each group's best-fit offset and assembles report rows.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::countries::top_countries;
use crate::domain::{GroupOffsetScore, GroupReport};
use crate::pattern::guess_weekday_pattern;
use crate::scoring::{candidate_offsets, HourHistogram};

pub const DEFAULT_TOP_COUNTRIES: usize = 5;

/// Orders two scores by fit, best first.
///
/// Higher fraction wins; equal fractions prefer the offset closest to UTC,
/// then the most negative offset. Fractions are compared as exact ratios.
pub fn compare_fit(a: &GroupOffsetScore, b: &GroupOffsetScore) -> Ordering {
    let lhs = a.matched as u128 * b.total as u128;
    let rhs = b.matched as u128 * a.total as u128;
    rhs.cmp(&lhs)
        .then_with(|| a.offset.abs().cmp(&b.offset.abs()))
        .then_with(|| a.offset.cmp(&b.offset))
}

/// Best entry of a set of scores, or `None` when there is nothing to rank.
pub fn best_score<'a, I>(scores: I) -> Option<GroupOffsetScore>
where
    I: IntoIterator<Item = &'a GroupOffsetScore>,
{
    scores
        .into_iter()
        .filter(|s| s.total > 0)
        .min_by(|a, b| compare_fit(a, b))
        .cloned()
}

/// Best-fit offset for every non-empty group, in group name order.
pub fn rank_groups(histograms: &BTreeMap<String, HourHistogram>) -> Vec<GroupOffsetScore> {
    histograms
        .iter()
        .filter_map(|(group, histogram)| {
            let scores: Vec<GroupOffsetScore> = candidate_offsets()
                .map(|offset| histogram.score(group, offset))
                .collect();
            best_score(&scores)
        })
        .collect()
}

/// Report rows for groups with at least `min_posts` posts,
/// busiest groups first and then by name.
pub fn build_reports(
    histograms: &BTreeMap<String, HourHistogram>,
    min_posts: u64,
    top_n: usize,
) -> Vec<GroupReport> {
    let mut reports: Vec<GroupReport> = rank_groups(histograms)
        .into_iter()
        .filter(|best| best.total >= min_posts.max(1))
        .filter_map(|best| {
            let histogram = histograms.get(&best.group)?;
            Some(report_for(best, histogram, top_n))
        })
        .collect();

    reports.sort_by(|a, b| {
        b.total_posts
            .cmp(&a.total_posts)
            .then_with(|| a.group.cmp(&b.group))
    });
    reports
}

fn report_for(best: GroupOffsetScore, histogram: &HourHistogram, top_n: usize) -> GroupReport {
    let weekday_counts = histogram.local_weekdays(best.offset);
    let weekday_posts = weekday_counts[..5].iter().sum();
    let weekend_posts = weekday_counts[5..].iter().sum();

    GroupReport {
        best_offset: best.offset,
        match_fraction: best.match_fraction,
        total_posts: best.total,
        weekday_posts,
        weekend_posts,
        weekday_counts,
        local_hour_counts: histogram.local_hours(best.offset),
        candidate_countries: top_countries(best.offset, top_n),
        weekday_pattern: guess_weekday_pattern(&weekday_counts),
        group: best.group,
    }
}
