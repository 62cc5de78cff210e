//! A tiny generic fixed-point search driver, used by both the FPS WCRT
//! iteration (§4.3) and the FPS/RM core-level response-time test (§4.4).
//! Convergence is guaranteed only if `fun` is monotone non-decreasing; a
//! `limit` bounds the search so a divergent task set returns promptly
//! instead of looping forever.

use crate::model::Seconds;

/// Repeatedly apply `fun` starting from `init` until either a fixed point
/// is reached (`fun(x) == x`, within `EPSILON`) or the value exceeds
/// `limit`, in which case `limit` is returned and the caller is expected
/// to treat that as divergence.
pub fn fixpoint_search_with_limit<F>(init: Seconds, limit: Seconds, mut fun: F) -> Seconds
where
    F: FnMut(Seconds) -> Seconds,
{
    let mut value = init;
    loop {
        let next = fun(value);
        if next.0 > limit.0 {
            return limit;
        }
        if (next.0 - value.0).abs() < 1e-6 {
            return next;
        }
        value = next;
    }
}

/// Same iteration, but distinguishes "converged exactly at the limit" from
/// "exceeded the limit and diverged" by returning `None` in the latter
/// case. Used wherever divergence must become `R = ∞` rather than a
/// silently-clamped value (the per-task WCRT search, §4.3, and the
/// FPS/RM core-level response-time test, §4.4).
pub fn bounded_fixpoint_search<F>(init: Seconds, limit: Seconds, mut fun: F) -> Option<Seconds>
where
    F: FnMut(Seconds) -> Seconds,
{
    let mut value = init;
    loop {
        let next = fun(value);
        if next.0 > limit.0 {
            return None;
        }
        if (next.0 - value.0).abs() < 1e-6 {
            return Some(next);
        }
        value = next;
    }
}
