use std::collections::HashMap;
use std::hash::Hash;

use crate::models::ValueCount;

// ── Frequency counting ────────────────────────────────────────────────────────

/// Occurrence count of one distinct value plus where it first appeared.
struct Tally {
    count: usize,
    first_seen: usize,
}

/// Count every distinct value, remembering first-occurrence order.
fn tally<T, I>(values: I) -> HashMap<T, Tally>
where
    T: Eq + Hash,
    I: IntoIterator<Item = T>,
{
    let mut counts: HashMap<T, Tally> = HashMap::new();
    for (idx, value) in values.into_iter().enumerate() {
        counts
            .entry(value)
            .or_insert(Tally {
                count: 0,
                first_seen: idx,
            })
            .count += 1;
    }
    counts
}

/// Every distinct value with its count, most frequent first.
///
/// Values with equal counts keep the order in which they first appeared.
pub fn frequency_table<T, I>(values: I) -> Vec<(T, usize)>
where
    T: Eq + Hash,
    I: IntoIterator<Item = T>,
{
    let mut rows: Vec<(T, Tally)> = tally(values).into_iter().collect();
    rows.sort_by(|(_, a), (_, b)| {
        b.count
            .cmp(&a.count)
            .then_with(|| a.first_seen.cmp(&b.first_seen))
    });
    rows.into_iter().map(|(v, t)| (v, t.count)).collect()
}

/// Most frequent value; ties go to the value that occurs first.
///
/// Returns `None` for an empty input.
///
/// # Examples
///
/// ```
/// use bikeshare_core::calculations::mode;
///
/// assert_eq!(mode(["A", "B", "A", "B"]), Some("A"));
/// assert_eq!(mode(["B", "A", "A"]), Some("A"));
/// assert_eq!(mode(Vec::<u32>::new()), None);
/// ```
pub fn mode<T, I>(values: I) -> Option<T>
where
    T: Eq + Hash,
    I: IntoIterator<Item = T>,
{
    tally(values)
        .into_iter()
        .min_by(|(_, a), (_, b)| {
            b.count
                .cmp(&a.count)
                .then_with(|| a.first_seen.cmp(&b.first_seen))
        })
        .map(|(v, _)| v)
}

/// [`frequency_table`] over string values, as report rows.
pub fn value_counts<'a, I>(values: I) -> Vec<ValueCount>
where
    I: IntoIterator<Item = &'a str>,
{
    frequency_table(values)
        .into_iter()
        .map(|(value, count)| ValueCount {
            value: value.to_string(),
            count,
        })
        .collect()
}

// ── Numeric reductions ────────────────────────────────────────────────────────

/// Sum and arithmetic mean of `values`, or `None` when there are none.
pub fn sum_and_mean<I>(values: I) -> Option<(f64, f64)>
where
    I: IntoIterator<Item = f64>,
{
    let (sum, n) = values
        .into_iter()
        .fold((0.0_f64, 0usize), |(sum, n), v| (sum + v, n + 1));
    if n == 0 {
        return None;
    }
    Some((sum, sum / n as f64))
}

/// Smallest and largest of `values`, or `None` when there are none.
pub fn min_max<T, I>(values: I) -> Option<(T, T)>
where
    T: Ord + Copy,
    I: IntoIterator<Item = T>,
{
    values.into_iter().fold(None, |acc, v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
