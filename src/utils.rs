//! Utility functions shared across modules.

use std::cmp::Ordering;

/// Compare two strings in natural order.
///
/// Runs of ASCII digits are compared by numeric value, everything else
/// character by character. Ties (e.g. `"a01"` vs `"a1"`) fall back to plain
/// string order so the result is total.
///
/// # Example
/// ```
/// use batchmon::utils::natural_cmp;
/// use std::cmp::Ordering;
/// assert_eq!(natural_cmp("job:2", "job:10"), Ordering::Less);
/// ```
#[must_use]
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut left = a.as_bytes();
    let mut right = b.as_bytes();

    loop {
        match (left.first(), right.first()) {
            (None, None) => return a.cmp(b),
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(l), Some(r)) if l.is_ascii_digit() && r.is_ascii_digit() => {
                let (l_run, l_rest) = split_digits(left);
                let (r_run, r_rest) = split_digits(right);
                match compare_digit_runs(l_run, r_run) {
                    Ordering::Equal => {
                        left = l_rest;
                        right = r_rest;
                    }
                    other => return other,
                }
            }
            (Some(l), Some(r)) => match l.cmp(r) {
                Ordering::Equal => {
                    left = &left[1..];
                    right = &right[1..];
                }
                other => return other,
            },
        }
    }
}

/// Sort a slice in natural order of the key returned by `key`
pub fn natural_sort_by_key<T>(items: &mut [T], key: impl Fn(&T) -> &str) {
    items.sort_by(|a, b| natural_cmp(key(a), key(b)));
}

fn split_digits(s: &[u8]) -> (&[u8], &[u8]) {
    let end = s.iter().position(|c| !c.is_ascii_digit()).unwrap_or(s.len());
    s.split_at(end)
}

/// Compare two digit runs by value without parsing (runs may exceed u64)
fn compare_digit_runs(a: &[u8], b: &[u8]) -> Ordering {
    let a = trim_leading_zeros(a);
    let b = trim_leading_zeros(b);
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

fn trim_leading_zeros(s: &[u8]) -> &[u8] {
    let start = s.iter().position(|&c| c != b'0').unwrap_or(s.len());
    &s[start..]
}

/// Case-insensitive substring match used for type-to-narrow pickers
#[must_use]
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    needle.is_empty() || haystack.to_lowercase().contains(&needle.to_lowercase())
}
