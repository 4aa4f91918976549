//! Pair-slug derivation and collision resolution.
//!
//! Slugs are trimmed, non-empty identifiers composed of lowercase ASCII
//! letters, digits, and hyphens. The base candidate for a pair of accounts
//! joins both display names in lexicographic order with a `-travels` suffix;
//! collisions resolve deterministically by appending `-2`, `-3`, and so on.
//!
//! Adapters probe taken slugs and evaluate the resolution inside the same
//! transaction that commits the merge row, so an assigned slug is final.

use std::collections::HashSet;

/// Maximum length of the base candidate before a collision suffix.
pub const BASE_SLUG_MAX: usize = 80;

const PAIR_SUFFIX: &str = "-travels";

/// Return `true` when `value` is a valid public slug.
pub fn is_valid_slug(value: &str) -> bool {
    !value.is_empty()
        && value
            .chars()
            .all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '-')
}

fn sanitise(value: &str) -> String {
    value
        .to_lowercase()
        .chars()
        .filter(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || *ch == '-')
        .collect()
}

/// Derive the base slug candidate for a pair of display names.
///
/// Names are lowercased and sorted so either ordering of the pair yields
/// the same candidate.
///
/// # Examples
/// ```
/// use backend::domain::slug::base_slug;
///
/// assert_eq!(base_slug("Noor", "Alva"), "alva-noor-travels");
/// ```
pub fn base_slug(name_a: &str, name_b: &str) -> String {
    let mut first = name_a.to_lowercase();
    let mut second = name_b.to_lowercase();
    if first > second {
        std::mem::swap(&mut first, &mut second);
    }

    let candidate = sanitise(&format!("{first}-{second}{PAIR_SUFFIX}"));
    candidate.chars().take(BASE_SLUG_MAX).collect()
}

/// Pick the first free slug for `base` given the set of taken slugs.
///
/// Returns `base` itself when free, otherwise `base-2`, `base-3`, … . The
/// probe is bounded by `taken.len() + 1` candidates, so it terminates for
/// any finite taken set.
pub fn resolve_collision(base: &str, taken: &HashSet<String>) -> String {
    if !taken.contains(base) {
        return base.to_owned();
    }

    let mut counter: u64 = 2;
    loop {
        let candidate = format!("{base}-{counter}");
        if !taken.contains(&candidate) {
            return candidate;
        }
        counter += 1;
    }
}
