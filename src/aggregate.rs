//! Summary statistics over session records
//!
//! Views are recomputed from scratch on every request:
//! - equal-width histogram of elapsed times
//! - mean elapsed time per dataset
//! - mean elapsed time per participant
//!
//! Grouped views keep keys in order of first occurrence, so repeated
//! analyses of the same log lay out their bars identically.

use crate::result_store::SessionRecord;
use serde::Serialize;
use thiserror::Error;

/// Default number of histogram bins
pub const DEFAULT_BIN_COUNT: usize = 10;

/// Errors from aggregate computations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AggregateError {
    #[error("No session records to aggregate")]
    EmptyInput,

    #[error("Histogram needs at least one bin")]
    InvalidBinCount,
}

/// Result type for aggregate operations
pub type Result<T> = std::result::Result<T, AggregateError>;

/// One histogram bin
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramBin {
    /// Inclusive lower edge, in seconds
    pub lower_bound: f64,
    /// Number of records in this bin
    pub count: usize,
}

/// Mean elapsed time of one group of records
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupMean {
    pub key: String,
    pub mean_seconds: f64,
    pub count: usize,
}

/// All derived views of one record set
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateView {
    pub histogram: Vec<HistogramBin>,
    pub mean_by_dataset: Vec<GroupMean>,
    pub mean_by_participant: Vec<GroupMean>,
}

impl AggregateView {
    /// Compute every view for `records`
    pub fn compute(records: &[SessionRecord], bin_count: usize) -> Result<Self> {
        if records.is_empty() {
            return Err(AggregateError::EmptyInput);
        }
        Ok(Self {
            histogram: histogram(records, bin_count)?,
            mean_by_dataset: mean_by_dataset(records)?,
            mean_by_participant: mean_by_participant(records)?,
        })
    }
}

/// Equal-width histogram of elapsed times
///
/// `[min, max]` is split into `bin_count` bins. Each bin is `[lo, hi)`
/// except the last, which also holds `max`. When every time is equal the
/// result is one bin holding all records. No records, no bins.
pub fn histogram(records: &[SessionRecord], bin_count: usize) -> Result<Vec<HistogramBin>> {
    if bin_count == 0 {
        return Err(AggregateError::InvalidBinCount);
    }
    let Some((min, max)) = min_max(records.iter().map(|r| r.elapsed_seconds)) else {
        return Ok(Vec::new());
    };

    if max <= min {
        return Ok(vec![HistogramBin {
            lower_bound: min,
            count: records.len(),
        }]);
    }

    // Work on halved values when the span itself overflows f64
    let scale = if (max - min).is_finite() { 1.0 } else { 0.5 };
    let (lo, hi) = (min * scale, max * scale);
    let width = (hi - lo) / bin_count as f64;
    let mut bins: Vec<HistogramBin> = (0..bin_count)
        .map(|i| HistogramBin {
            lower_bound: (lo + width * i as f64) / scale,
            count: 0,
        })
        .collect();

    for record in records {
        let offset = (record.elapsed_seconds * scale - lo) / width;
        // max (and rounding just below it) lands in the last bin
        let index = (offset.floor() as usize).min(bin_count - 1);
        bins[index].count += 1;
    }

    Ok(bins)
}

fn min_max(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    values.fold(None, |acc, v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}

/// Group records by `key_fn` and average elapsed time per group
///
/// Groups appear in order of first occurrence.
pub fn mean_by_key<F>(records: &[SessionRecord], key_fn: F) -> Result<Vec<GroupMean>>
where
    F: Fn(&SessionRecord) -> &str,
{
    if records.is_empty() {
        return Err(AggregateError::EmptyInput);
    }

    // (key, sum, count)
    let mut groups: Vec<(String, f64, usize)> = Vec::new();
    for record in records {
        let key = key_fn(record);
        match groups.iter_mut().find(|(k, _, _)| k == key) {
            Some((_, sum, count)) => {
                *sum += record.elapsed_seconds;
                *count += 1;
            }
            None => groups.push((key.to_string(), record.elapsed_seconds, 1)),
        }
    }

    Ok(groups
        .into_iter()
        .map(|(key, sum, count)| GroupMean {
            key,
            mean_seconds: sum / count as f64,
            count,
        })
        .collect())
}

/// Mean elapsed time per dataset
pub fn mean_by_dataset(records: &[SessionRecord]) -> Result<Vec<GroupMean>> {
    mean_by_key(records, |r| r.dataset_id.as_str())
}

/// Mean elapsed time per participant
pub fn mean_by_participant(records: &[SessionRecord]) -> Result<Vec<GroupMean>> {
    mean_by_key(records, |r| r.participant.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(participant: &str, dataset: &str, seconds: f64) -> SessionRecord {
        SessionRecord {
            participant: participant.to_string(),
            elapsed_seconds: seconds,
            dataset_id: dataset.to_string(),
            target_label: "x".to_string(),
        }
    }

    fn times(values: &[f64]) -> Vec<SessionRecord> {
        values.iter().map(|&v| rec("p", "d", v)).collect()
    }

    #[test]
    fn test_histogram_two_bins() {
        let bins = histogram(&times(&[1.0, 5.0, 9.0]), 2).unwrap();
        assert_eq!(
            bins,
            vec![
                HistogramBin {
                    lower_bound: 1.0,
                    count: 1
                },
                HistogramBin {
                    lower_bound: 5.0,
                    count: 2
                },
            ]
        );
    }

    #[test]
    fn test_histogram_max_stays_in_last_bin() {
        let bins = histogram(&times(&[0.0, 10.0]), 10).unwrap();
        assert_eq!(bins.len(), 10);
        assert_eq!(bins[0].count, 1);
        assert_eq!(bins[9].count, 1);
        assert!((bins[9].lower_bound - 9.0).abs() < 1e-9);
    }

    #[test]
    fn test_histogram_span_beyond_f64_range() {
        let bins = histogram(&times(&[-1.7e308, 1.7e308]), 2).unwrap();
        assert_eq!(
            bins,
            vec![
                HistogramBin {
                    lower_bound: -1.7e308,
                    count: 1
                },
                HistogramBin {
                    lower_bound: 0.0,
                    count: 1
                },
            ]
        );

        let bins = histogram(&times(&[-f64::MAX, 0.0, f64::MAX]), 4).unwrap();
        assert!(bins.iter().all(|b| b.lower_bound.is_finite()));
        assert_eq!(bins.iter().map(|b| b.count).collect::<Vec<_>>(), vec![1, 0, 1, 1]);
    }

    #[test]
    fn test_histogram_all_equal_is_single_bin() {
        let bins = histogram(&times(&[4.2, 4.2, 4.2]), 10).unwrap();
        assert_eq!(
            bins,
            vec![HistogramBin {
                lower_bound: 4.2,
                count: 3
            }]
        );
    }

    #[test]
    fn test_histogram_empty_and_zero_bins() {
        assert!(histogram(&[], 10).unwrap().is_empty());
        assert_eq!(
            histogram(&times(&[1.0]), 0).unwrap_err(),
            AggregateError::InvalidBinCount
        );
    }

    #[test]
    fn test_mean_by_key_insertion_order() {
        let records = vec![
            rec("zoe", "tax.json", 4.0),
            rec("adam", "fs.json", 10.0),
            rec("zoe", "fs.json", 2.0),
            rec("adam", "tax.json", 6.0),
        ];

        let by_participant = mean_by_participant(&records).unwrap();
        let keys: Vec<&str> = by_participant.iter().map(|g| g.key.as_str()).collect();
        assert_eq!(keys, vec!["zoe", "adam"]);
        assert_eq!(by_participant[0].mean_seconds, 3.0);
        assert_eq!(by_participant[1].mean_seconds, 8.0);

        let by_dataset = mean_by_dataset(&records).unwrap();
        assert_eq!(by_dataset[0].key, "tax.json");
        assert_eq!(by_dataset[0].mean_seconds, 5.0);
        assert_eq!(by_dataset[1].key, "fs.json");
        assert_eq!(by_dataset[1].mean_seconds, 6.0);
        assert_eq!(by_dataset[1].count, 2);
    }

    #[test]
    fn test_mean_by_key_empty_input() {
        assert_eq!(
            mean_by_dataset(&[]).unwrap_err(),
            AggregateError::EmptyInput
        );
    }

    #[test]
    fn test_aggregate_view_compute() {
        let records = vec![rec("a", "d1", 1.0), rec("b", "d2", 3.0)];
        let view = AggregateView::compute(&records, DEFAULT_BIN_COUNT).unwrap();
        assert_eq!(view.histogram.len(), DEFAULT_BIN_COUNT);
        assert_eq!(view.mean_by_dataset[1].key, "d2");
        assert_eq!(view.mean_by_dataset[1].mean_seconds, 3.0);
        assert_eq!(view.mean_by_participant[0].key, "a");
        assert_eq!(view.mean_by_participant[0].mean_seconds, 1.0);

        assert_eq!(
            AggregateView::compute(&[], DEFAULT_BIN_COUNT).unwrap_err(),
            AggregateError::EmptyInput
        );
    }
}
