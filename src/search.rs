//! Relevance ranking for index-name searches.

use std::cmp::Ordering;

/// Return every candidate containing `term` as a case-insensitive substring,
/// ordered by how much of the candidate name the term makes up.
///
/// The score is `term.len() / candidate.len()` (in characters), sorted
/// descending; the sort is stable so equal scores keep their input order.
/// An empty candidate list yields an empty result. Callers must not invoke
/// this with an empty or whitespace-only term; the UI treats that case as a
/// no-op before ranking.
#[must_use]
pub fn rank(term: &str, candidates: &[String]) -> Vec<String> {
    let needle = term.to_lowercase();
    let term_len = term.chars().count() as f64;

    let mut matches: Vec<&String> = candidates
        .iter()
        .filter(|name| name.to_lowercase().contains(&needle))
        .collect();
    matches.sort_by(|a, b| {
        let score_a = term_len / a.chars().count() as f64;
        let score_b = term_len / b.chars().count() as f64;
        score_b.partial_cmp(&score_a).unwrap_or(Ordering::Equal)
    });
    matches.into_iter().cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::rank;

    fn names(v: &[&str]) -> Vec<String> {
        v.iter().map(ToString::to_string).collect()
    }

    /// What: Exact-length matches outrank longer names
    ///
    /// - Input: term "foo" over ["foobar", "foo", "barfoo"]
    /// - Output: "foo" first; "foobar"/"barfoo" tie-broken by input order
    #[test]
    fn rank_orders_by_term_fraction_with_stable_ties() {
        let out = rank("foo", &names(&["foobar", "foo", "barfoo"]));
        assert_eq!(out, names(&["foo", "foobar", "barfoo"]));
    }

    /// What: Matching is a case-insensitive substring test
    ///
    /// - Input: term "Num" over mixed-case candidates
    /// - Output: "NumPy" and "numba" match, "pandas" does not
    #[test]
    fn rank_matches_case_insensitively() {
        let out = rank("Num", &names(&["pandas", "NumPy", "numba"]));
        assert_eq!(out, names(&["NumPy", "numba"]));
    }

    /// What: Empty candidate list is not an error
    ///
    /// - Input: any term over `[]`
    /// - Output: `[]`
    #[test]
    fn rank_on_empty_candidates_yields_empty() {
        assert!(rank("requests", &[]).is_empty());
    }

    /// What: Non-matching candidates are dropped entirely
    ///
    /// - Input: term with no substring hits
    /// - Output: `[]`
    #[test]
    fn rank_drops_non_matches() {
        assert!(rank("zzz", &names(&["alpha", "beta"])).is_empty());
    }
}
