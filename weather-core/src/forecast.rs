//! Collapses the upstream's 3-hour-resolution forecast series into
//! per-day summaries.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::model::{Condition, DaySummary, WeatherSample};

/// Bucket `samples` by their UTC calendar date and derive one [`DaySummary`]
/// per day, ordered by ascending date and truncated to `max_days` entries.
///
/// An empty input yields an empty result. Fewer distinct days than
/// `max_days` yield fewer summaries; callers must not assume exact-length
/// results.
pub fn aggregate(samples: &[WeatherSample], max_days: usize) -> Vec<DaySummary> {
    let mut buckets: BTreeMap<NaiveDate, Vec<WeatherSample>> = BTreeMap::new();
    for sample in samples {
        buckets
            .entry(sample.time.date_naive())
            .or_default()
            .push(sample.clone());
    }

    buckets
        .into_iter()
        .take(max_days)
        .filter_map(|(date, hourly)| summarize(date, hourly))
        .collect()
}

/// Derive the day's statistics. Returns `None` only for an empty bucket,
/// which `aggregate` never produces.
fn summarize(date: NaiveDate, hourly: Vec<WeatherSample>) -> Option<DaySummary> {
    let condition = representative_condition(&hourly)?;

    let n = hourly.len() as f64;
    let avg_temperature = hourly.iter().map(|s| s.temperature).sum::<f64>() / n;
    let avg_humidity = hourly.iter().map(|s| s.humidity).sum::<f64>() / n;

    Some(DaySummary {
        date,
        avg_temperature,
        avg_humidity,
        condition,
        hourly,
    })
}

/// Pick the day's headline condition: the `condition.main` value with the
/// highest occurrence count, ties broken by whichever value appeared first.
/// The returned payload is the first sample carrying the winning `main`.
fn representative_condition(hourly: &[WeatherSample]) -> Option<Condition> {
    // Tally in first-seen order so that ties resolve deterministically.
    let mut tally: Vec<(&str, usize)> = Vec::new();
    for sample in hourly {
        match tally
            .iter_mut()
            .find(|(main, _)| *main == sample.condition.main)
        {
            Some((_, count)) => *count += 1,
            None => tally.push((sample.condition.main.as_str(), 1)),
        }
    }

    let (winner, _) = tally
        .into_iter()
        .fold(None::<(&str, usize)>, |best, (main, count)| match best {
            Some((_, top)) if count <= top => best,
            _ => Some((main, count)),
        })?;

    hourly
        .iter()
        .find(|s| s.condition.main == winner)
        .map(|s| s.condition.clone())
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Utc};

    use super::*;

    fn sample(time: &str, temperature: f64, humidity: f64, main: &str) -> WeatherSample {
        WeatherSample {
            time: time.parse::<DateTime<Utc>>().expect("valid timestamp"),
            temperature,
            feels_like: temperature,
            humidity,
            pressure: 1013.0,
            wind_speed: 3.0,
            wind_direction: 180.0,
            condition: Condition {
                main: main.to_string(),
                description: format!("{} skies", main.to_lowercase()),
                icon: "01d".to_string(),
            },
        }
    }

    #[test]
    fn empty_input_yields_empty_output() {
        assert!(aggregate(&[], 5).is_empty());
    }

    #[test]
    fn buckets_by_utc_date_in_ascending_order() {
        let samples = vec![
            sample("2025-03-02T09:00:00Z", 12.0, 60.0, "Clouds"),
            sample("2025-03-01T09:00:00Z", 10.0, 70.0, "Rain"),
            sample("2025-03-01T12:00:00Z", 14.0, 50.0, "Rain"),
            sample("2025-03-03T09:00:00Z", 8.0, 80.0, "Snow"),
        ];

        let summaries = aggregate(&samples, 5);
        let dates: Vec<String> = summaries.iter().map(|s| s.date.to_string()).collect();
        assert_eq!(dates, vec!["2025-03-01", "2025-03-02", "2025-03-03"]);
        assert_eq!(summaries[0].hourly.len(), 2);
    }

    #[test]
    fn truncates_to_max_days() {
        let samples = vec![
            sample("2025-03-01T09:00:00Z", 10.0, 70.0, "Rain"),
            sample("2025-03-02T09:00:00Z", 12.0, 60.0, "Clouds"),
            sample("2025-03-03T09:00:00Z", 8.0, 80.0, "Snow"),
        ];

        assert_eq!(aggregate(&samples, 2).len(), 2);
    }

    #[test]
    fn fewer_distinct_days_than_requested_is_not_an_error() {
        let samples = vec![
            sample("2025-03-01T09:00:00Z", 10.0, 70.0, "Rain"),
            sample("2025-03-01T12:00:00Z", 12.0, 60.0, "Rain"),
        ];

        assert_eq!(aggregate(&samples, 5).len(), 1);
    }

    #[test]
    fn averages_are_arithmetic_means() {
        let samples = vec![
            sample("2025-03-01T09:00:00Z", 10.0, 40.0, "Clear"),
            sample("2025-03-01T12:00:00Z", 20.0, 60.0, "Clear"),
        ];

        let summaries = aggregate(&samples, 1);
        assert_eq!(summaries[0].avg_temperature, 15.0);
        assert_eq!(summaries[0].avg_humidity, 50.0);
    }

    #[test]
    fn representative_condition_is_the_mode() {
        let samples = vec![
            sample("2025-03-01T09:00:00Z", 10.0, 50.0, "Clouds"),
            sample("2025-03-01T12:00:00Z", 11.0, 50.0, "Clouds"),
            sample("2025-03-01T15:00:00Z", 12.0, 50.0, "Rain"),
        ];

        let summaries = aggregate(&samples, 1);
        assert_eq!(summaries[0].condition.main, "Clouds");
    }

    #[test]
    fn representative_condition_tie_goes_to_first_seen() {
        let samples = vec![
            sample("2025-03-01T09:00:00Z", 10.0, 50.0, "Rain"),
            sample("2025-03-01T12:00:00Z", 11.0, 50.0, "Clouds"),
        ];

        let summaries = aggregate(&samples, 1);
        assert_eq!(summaries[0].condition.main, "Rain");
    }

    #[test]
    fn representative_payload_comes_from_first_matching_sample() {
        let mut first = sample("2025-03-01T09:00:00Z", 10.0, 50.0, "Clouds");
        first.condition.description = "scattered clouds".to_string();
        let mut second = sample("2025-03-01T12:00:00Z", 11.0, 50.0, "Clouds");
        second.condition.description = "broken clouds".to_string();

        let summaries = aggregate(&[first, second], 1);
        assert_eq!(summaries[0].condition.description, "scattered clouds");
    }

    #[test]
    fn hourly_detail_preserves_chronological_order() {
        let samples = vec![
            sample("2025-03-01T09:00:00Z", 10.0, 50.0, "Clear"),
            sample("2025-03-01T12:00:00Z", 11.0, 50.0, "Clear"),
            sample("2025-03-01T15:00:00Z", 12.0, 50.0, "Clear"),
        ];

        let summaries = aggregate(&samples, 1);
        let temps: Vec<f64> = summaries[0].hourly.iter().map(|s| s.temperature).collect();
        assert_eq!(temps, vec![10.0, 11.0, 12.0]);
    }
}
