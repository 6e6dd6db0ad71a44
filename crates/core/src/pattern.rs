//! Coarse guess at a group's rest day from its weekday posting distribution.

const SUNDAY: usize = 6;
const FRIDAY: usize = 4;
const LOW_USAGE_RATIO: f64 = 0.5;

pub const NO_DATA: &str = "No data";
pub const NO_PATTERN: &str = "No strong religious pattern detected";
pub const LOW_SUNDAY: &str = "Possible Judeo-Christian (low Sunday usage)";
pub const LOW_FRIDAY: &str = "Possible Islamic (low Friday usage)";

/// `weekday_counts` is Monday first.
pub fn guess_weekday_pattern(weekday_counts: &[u64; 7]) -> String {
    let total: u64 = weekday_counts.iter().sum();
    if total == 0 {
        return NO_DATA.to_string();
    }

    let avg_per_day = total as f64 / 7.0;
    let ratio = |day: usize| weekday_counts[day] as f64 / avg_per_day;

    let mut patterns = Vec::new();
    if ratio(SUNDAY) < LOW_USAGE_RATIO {
        patterns.push(LOW_SUNDAY);
    }
    if ratio(FRIDAY) < LOW_USAGE_RATIO {
        patterns.push(LOW_FRIDAY);
    }

    if patterns.is_empty() {
        NO_PATTERN.to_string()
    } else {
        patterns.join(" | ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_data() {
        assert_eq!(guess_weekday_pattern(&[0; 7]), NO_DATA);
    }

    #[test]
    fn test_even_week_has_no_pattern() {
        assert_eq!(guess_weekday_pattern(&[10; 7]), NO_PATTERN);
    }

    #[test]
    fn test_quiet_sunday() {
        assert_eq!(guess_weekday_pattern(&[10, 10, 10, 10, 10, 10, 1]), LOW_SUNDAY);
    }

    #[test]
    fn test_quiet_friday() {
        assert_eq!(guess_weekday_pattern(&[10, 10, 10, 10, 0, 10, 10]), LOW_FRIDAY);
    }

    #[test]
    fn test_both_quiet() {
        let guess = guess_weekday_pattern(&[10, 10, 10, 10, 0, 10, 0]);
        assert_eq!(guess, format!("{LOW_SUNDAY} | {LOW_FRIDAY}"));
    }

    #[test]
    fn test_threshold_is_strict() {
        // total 14, avg 2, Sunday at exactly half the average is not flagged
        assert_eq!(guess_weekday_pattern(&[2, 3, 2, 2, 2, 2, 1]), NO_PATTERN);
    }
}
