//! Helper utilities

use std::cmp::Ordering;

/// Compare two dot-separated numeric version strings.
///
/// Components are compared left-to-right as unsigned integers; the shorter
/// version is treated as zero-padded, so `"1.2"` equals `"1.2.0"`.
/// Non-numeric components compare as zero.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let left = components(a);
    let right = components(b);
    let len = left.len().max(right.len());

    for i in 0..len {
        let x = left.get(i).copied().unwrap_or(0);
        let y = right.get(i).copied().unwrap_or(0);
        match x.cmp(&y) {
            Ordering::Equal => continue,
            other => return other,
        }
    }

    Ordering::Equal
}

fn components(version: &str) -> Vec<u64> {
    version
        .split('.')
        .map(|part| part.trim().parse().unwrap_or(0))
        .collect()
}
