//! Marker peak search over a sampled spectrum.
//!
//! Every function here is pure: it receives the frequency axis, the power
//! array of the marker's trace and the visible window, and returns the index
//! the marker should move to. The caller owns the marker and writes the index
//! back. A search that cannot produce a position returns
//! [`SearchUnavailable`], which the UI treats as "leave the marker where it is".
//!
//! Non-finite samples (missing values load as NaN) never become a peak and
//! are left out of the noise floor.

use std::ops::Range;

use thiserror::Error;

use super::model::ViewWindow;

/// Sorted position where the top 20% used for the noise floor begins.
const NOISE_FLOOR_QUANTILE: f64 = 0.8;

/// Why a peak search left the marker unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SearchUnavailable {
    #[error("view window does not overlap the searched data")]
    OutsideData,
    #[error("no samples left to search")]
    EmptyRange,
    #[error("no sample clears the noise floor threshold")]
    NoCandidates,
}

pub type SearchResult = Result<usize, SearchUnavailable>;

// ---------------------------------------------------------------------------
// Public operations
// ---------------------------------------------------------------------------

/// Index of the highest sample visible in `window`.
///
/// Ties resolve to the lowest index.
pub fn find_global_peak(freqs: &[f64], power: &[f64], window: ViewWindow) -> SearchResult {
    let visible = clip_to_window(freqs, 0..aligned_len(freqs, power), window)?;

    let mut best: Option<usize> = None;
    for i in visible.filter(|&i| power[i].is_finite()) {
        if best.map_or(true, |b| power[i] > power[b]) {
            best = Some(i);
        }
    }
    best.ok_or(SearchUnavailable::NoCandidates)
}

/// Next peak to the right of the marker.
///
/// Searches `(marker, N-1]` inside the window and picks the second sample
/// that clears `noise floor + threshold`, or the only one if just one does.
pub fn find_peak_right(
    freqs: &[f64],
    power: &[f64],
    window: ViewWindow,
    marker: Option<usize>,
    threshold: f64,
) -> SearchResult {
    let n = aligned_len(freqs, power);
    let m = marker.unwrap_or(n / 2);
    let restricted = (m + 1).min(n)..n;
    let candidates = candidates_above_floor(freqs, power, restricted.clone(), window, threshold)?;

    let pick = if candidates.len() > 1 { candidates[1] } else { candidates[0] };
    Ok(first_match(power, restricted, pick))
}

/// Next peak to the left of the marker.
///
/// Searches `[0, marker)` inside the window and picks the second-to-last
/// qualifying sample, or the only one if just one qualifies.
pub fn find_peak_left(
    freqs: &[f64],
    power: &[f64],
    window: ViewWindow,
    marker: Option<usize>,
    threshold: f64,
) -> SearchResult {
    let n = aligned_len(freqs, power);
    let m = marker.unwrap_or(n / 2).min(n);
    let restricted = 0..m;
    let candidates = candidates_above_floor(freqs, power, restricted.clone(), window, threshold)?;

    let pick = if candidates.len() > 1 {
        candidates[candidates.len() - 2]
    } else {
        candidates[0]
    };
    Ok(first_match(power, restricted, pick))
}

/// Estimated noise level of `values`: the mean of the top 20% once sorted.
///
/// Non-finite values are skipped. Returns `None` when nothing finite is left.
pub fn noise_floor(values: &[f64]) -> Option<f64> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(|a, b| a.total_cmp(b));
    let start = (sorted.len() as f64 * NOISE_FLOOR_QUANTILE) as usize;
    let top = &sorted[start..];
    Some(top.iter().sum::<f64>() / top.len() as f64)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn aligned_len(freqs: &[f64], power: &[f64]) -> usize {
    freqs.len().min(power.len())
}

/// Narrow `range` to the indices whose frequency lies inside `window`.
fn clip_to_window(
    freqs: &[f64],
    range: Range<usize>,
    window: ViewWindow,
) -> Result<Range<usize>, SearchUnavailable> {
    if range.is_empty() {
        return Err(SearchUnavailable::EmptyRange);
    }
    let axis = &freqs[range.clone()];
    let (first, last) = (axis[0], axis[axis.len() - 1]);
    if window.f_hi < first || window.f_lo > last {
        return Err(SearchUnavailable::OutsideData);
    }

    let lo = axis.partition_point(|&f| f < window.f_lo);
    let hi = axis.partition_point(|&f| f <= window.f_hi);
    if lo >= hi {
        return Err(SearchUnavailable::EmptyRange);
    }
    Ok(range.start + lo..range.start + hi)
}

/// Values of the visible part of `range` that reach `noise floor + threshold`,
/// in positional order.
fn candidates_above_floor(
    freqs: &[f64],
    power: &[f64],
    range: Range<usize>,
    window: ViewWindow,
    threshold: f64,
) -> Result<Vec<f64>, SearchUnavailable> {
    let visible = clip_to_window(freqs, range, window)?;
    let values = &power[visible];
    let floor = noise_floor(values).ok_or(SearchUnavailable::NoCandidates)?;
    let level = floor + threshold;

    let candidates: Vec<f64> = values
        .iter()
        .copied()
        .filter(|&p| p.is_finite() && p >= level)
        .collect();
    if candidates.is_empty() {
        return Err(SearchUnavailable::NoCandidates);
    }
    Ok(candidates)
}

/// First index in `range` holding exactly `value`.
fn first_match(power: &[f64], range: Range<usize>, value: f64) -> usize {
    let start = range.start;
    power[range]
        .iter()
        .position(|&p| p == value)
        .map_or(start, |offset| start + offset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::linspace;

    fn full(freqs: &[f64]) -> ViewWindow {
        ViewWindow::new(freqs[0], freqs[freqs.len() - 1])
    }

    /// Flat noise at -100 dB with a few tones.
    fn tones(n: usize, at: &[(usize, f64)]) -> (Vec<f64>, Vec<f64>) {
        let freqs = linspace(0.0, (n - 1) as f64, n);
        let mut power = vec![-100.0; n];
        for &(i, p) in at {
            power[i] = p;
        }
        (freqs, power)
    }

    #[test]
    fn global_peak_is_max_of_window() {
        let freqs = linspace(0.0, 10.0, 11);
        let power = vec![0.0, 1.0, 2.0, 9.0, 2.0, 1.0, 0.0, 1.0, 12.0, 1.0, 0.0];

        assert_eq!(find_global_peak(&freqs, &power, full(&freqs)), Ok(8));
        // Window hides the larger peak at 8 Hz.
        assert_eq!(
            find_global_peak(&freqs, &power, ViewWindow::new(0.0, 6.5)),
            Ok(3)
        );
    }

    #[test]
    fn global_peak_tie_picks_first() {
        let freqs = linspace(0.0, 4.0, 5);
        let power = vec![1.0, 5.0, 0.0, 5.0, 1.0];
        assert_eq!(find_global_peak(&freqs, &power, full(&freqs)), Ok(1));
    }

    #[test]
    fn window_outside_data_is_unavailable_for_all_searches() {
        let (freqs, power) = tones(32, &[(5, -20.0), (25, -20.0)]);
        let window = ViewWindow::new(100.0, 200.0);

        assert_eq!(
            find_global_peak(&freqs, &power, window),
            Err(SearchUnavailable::OutsideData)
        );
        assert_eq!(
            find_peak_right(&freqs, &power, window, Some(10), 6.0),
            Err(SearchUnavailable::OutsideData)
        );
        assert_eq!(
            find_peak_left(&freqs, &power, window, Some(10), 6.0),
            Err(SearchUnavailable::OutsideData)
        );
    }

    #[test]
    fn window_between_samples_is_empty() {
        let freqs = linspace(0.0, 10.0, 11);
        let power = vec![0.0; 11];
        assert_eq!(
            find_global_peak(&freqs, &power, ViewWindow::new(3.2, 3.8)),
            Err(SearchUnavailable::EmptyRange)
        );
    }

    #[test]
    fn right_search_picks_second_candidate() {
        let (freqs, power) = tones(64, &[(20, -30.0), (30, -25.0), (40, -35.0)]);
        let found = find_peak_right(&freqs, &power, full(&freqs), Some(10), 10.0);
        assert_eq!(found, Ok(30));
    }

    #[test]
    fn right_search_single_candidate() {
        let (freqs, power) = tones(64, &[(50, -30.0)]);
        let found = find_peak_right(&freqs, &power, full(&freqs), Some(10), 10.0);
        assert_eq!(found, Ok(50));
    }

    #[test]
    fn left_search_picks_second_to_last_candidate() {
        let (freqs, power) = tones(64, &[(10, -30.0), (20, -25.0), (30, -35.0)]);
        let found = find_peak_left(&freqs, &power, full(&freqs), Some(50), 10.0);
        assert_eq!(found, Ok(20));
    }

    #[test]
    fn left_search_single_candidate() {
        let (freqs, power) = tones(64, &[(12, -30.0)]);
        let found = find_peak_left(&freqs, &power, full(&freqs), Some(50), 10.0);
        assert_eq!(found, Ok(12));
    }

    #[test]
    fn unset_marker_starts_from_center() {
        let (freqs, power) = tones(64, &[(10, -30.0), (50, -30.0)]);
        assert_eq!(
            find_peak_right(&freqs, &power, full(&freqs), None, 10.0),
            Ok(50)
        );
        assert_eq!(
            find_peak_left(&freqs, &power, full(&freqs), None, 10.0),
            Ok(10)
        );
    }

    #[test]
    fn right_search_at_last_index_is_unavailable() {
        let (freqs, power) = tones(16, &[(3, -30.0)]);
        assert_eq!(
            find_peak_right(&freqs, &power, full(&freqs), Some(15), 6.0),
            Err(SearchUnavailable::EmptyRange)
        );
    }

    #[test]
    fn left_search_at_first_index_is_unavailable() {
        let (freqs, power) = tones(16, &[(9, -30.0)]);
        assert_eq!(
            find_peak_left(&freqs, &power, full(&freqs), Some(0), 6.0),
            Err(SearchUnavailable::EmptyRange)
        );
    }

    #[test]
    fn small_example_has_no_candidates() {
        let freqs = linspace(0.0, 10.0, 11);
        let power = vec![0.0, 1.0, 2.0, 9.0, 2.0, 1.0, 0.0, 1.0, 2.0, 1.0, 0.0];
        assert_eq!(
            find_peak_right(&freqs, &power, full(&freqs), None, 3.0),
            Err(SearchUnavailable::NoCandidates)
        );
    }

    #[test]
    fn results_stay_on_their_side_of_the_marker() {
        // Every sample is a candidate when the threshold is very negative.
        let n = 40;
        let freqs = linspace(0.0, 39.0, n);
        let power: Vec<f64> = (0..n).map(|i| ((i * 7) % 13) as f64).collect();
        for m in 0..n {
            if let Ok(i) = find_peak_right(&freqs, &power, full(&freqs), Some(m), -1000.0) {
                assert!(i > m && i < n, "right search from {m} returned {i}");
            }
            if let Ok(i) = find_peak_left(&freqs, &power, full(&freqs), Some(m), -1000.0) {
                assert!(i < m, "left search from {m} returned {i}");
            }
        }
    }

    #[test]
    fn duplicate_values_resolve_inside_searched_range() {
        // -30 also appears left of the marker; the right search must not jump there.
        let (freqs, power) = tones(32, &[(2, -30.0), (20, -30.0)]);
        assert_eq!(
            find_peak_right(&freqs, &power, full(&freqs), Some(10), 10.0),
            Ok(20)
        );
    }

    #[test]
    fn offset_power_keeps_selection() {
        let (freqs, power) = tones(64, &[(20, -30.0), (30, -25.0), (40, -35.0)]);
        let shifted: Vec<f64> = power.iter().map(|p| p + 42.0).collect();
        let window = full(&freqs);
        assert_eq!(
            find_peak_right(&freqs, &power, window, Some(5), 10.0),
            find_peak_right(&freqs, &shifted, window, Some(5), 10.0)
        );
        assert_eq!(
            find_peak_left(&freqs, &power, window, Some(60), 10.0),
            find_peak_left(&freqs, &shifted, window, Some(60), 10.0)
        );
    }

    #[test]
    fn missing_samples_are_skipped_by_global_peak() {
        let freqs = linspace(0.0, 4.0, 5);
        let power = vec![f64::NAN, -90.0, -20.0, -90.0, -90.0];
        assert_eq!(find_global_peak(&freqs, &power, full(&freqs)), Ok(2));

        let all_missing = vec![f64::NAN; 5];
        assert_eq!(
            find_global_peak(&freqs, &all_missing, full(&freqs)),
            Err(SearchUnavailable::NoCandidates)
        );
    }

    #[test]
    fn missing_samples_do_not_hide_neighbour_peaks() {
        let (freqs, mut power) = tones(64, &[(20, -30.0), (40, -20.0)]);
        power[63] = f64::NAN;
        assert_eq!(
            find_peak_right(&freqs, &power, full(&freqs), Some(0), 6.0),
            Ok(40)
        );

        let (freqs, mut power) = tones(64, &[(10, -30.0), (30, -25.0)]);
        power[0] = f64::NAN;
        assert_eq!(
            find_peak_left(&freqs, &power, full(&freqs), Some(63), 6.0),
            Ok(10)
        );
    }

    #[test]
    fn noise_floor_skips_missing_samples() {
        let mut values: Vec<f64> = (1..=10).map(f64::from).collect();
        values.push(f64::NAN);
        assert_eq!(noise_floor(&values), Some(9.5));
        assert_eq!(noise_floor(&[f64::NAN, f64::INFINITY]), None);
    }

    #[test]
    fn noise_floor_uses_top_fifth() {
        let values: Vec<f64> = (1..=10).map(f64::from).collect();
        // Sorted top 20% of 1..=10 is [9, 10].
        assert_eq!(noise_floor(&values), Some(9.5));
        assert_eq!(noise_floor(&[4.0]), Some(4.0));
        assert_eq!(noise_floor(&[]), None);
    }
}
