//! Static asymptotic labels for the reference algorithms.
//!
//! The alias table is wider than the registry: `bubblesort`, `linear search`,
//! `nested`, `exponential` and `nested-exponential` have labels here but no registered
//! implementation, so they never come back from `/analyze`.

pub const UNKNOWN_COMPLEXITY: &str = "O(unknown)";

const COMPLEXITY_LABELS: &[(&str, &str)] = &[
    ("bubble", "O(n²)"),
    ("bubblesort", "O(n²)"),
    ("linear", "O(n)"),
    ("linear search", "O(n)"),
    ("binary", "O(log n)"),
    ("nested", "O(2^n)"),
    ("exponential", "O(2^n)"),
    ("nested/exponential", "O(2^n)"),
    ("nested-exponential", "O(2^n)"),
];

/// Look up the label for an algorithm alias, ignoring ASCII case.
pub fn label_for(name: &str) -> &'static str {
    COMPLEXITY_LABELS
        .iter()
        .find(|(alias, _)| alias.eq_ignore_ascii_case(name))
        .map(|(_, label)| *label)
        .unwrap_or(UNKNOWN_COMPLEXITY)
}
