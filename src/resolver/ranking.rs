//! Ranking of viable overloads.
//!
//! Candidates are ordered by, in turn:
//!
//! 1. more declared parameters
//! 2. higher value score (non-string parameters after the first matched by
//!    an argument)
//! 3. more non-string parameters matched exactly
//! 4. lower total coercion cost (int widened to float costs 1)
//! 5. more exact coercions
//! 6. earlier registration

use std::cmp::Ordering;

use super::OverloadMatch;

/// Select the best of the viable candidates, or `None` if there are none.
pub fn find_best_match(viable: Vec<OverloadMatch>) -> Option<OverloadMatch> {
    viable
        .into_iter()
        .reduce(|best, next| match rank(&next, &best) {
            Ordering::Greater => next,
            _ => best,
        })
}

/// Compare two candidates; `Greater` means `a` should be preferred.
fn rank(a: &OverloadMatch, b: &OverloadMatch) -> Ordering {
    a.param_count
        .cmp(&b.param_count)
        .then(a.value_score.cmp(&b.value_score))
        .then(a.exact_values.cmp(&b.exact_values))
        .then(b.total_cost.cmp(&a.total_cost))
        .then_with(|| break_tie(a, b))
}

/// Tie-breaking between candidates of equal shape and cost.
fn break_tie(a: &OverloadMatch, b: &OverloadMatch) -> Ordering {
    count_exact_matches(a)
        .cmp(&count_exact_matches(b))
        .then(b.index.cmp(&a.index))
}

/// Count exact coercions. Parameters filled from defaults count as exact.
fn count_exact_matches(m: &OverloadMatch) -> usize {
    m.conversions
        .iter()
        .filter(|c| c.as_ref().is_none_or(|conv| conv.is_exact()))
        .count()
}
