//! The Half-Half interface mapper (§4.2): a bidirectional, lossy-in-one-
//! direction mapping between the BDR pair (α, Δ) and the PRM pair (Q, P).
//!
//! The mapping is only exact going BDR → PRM → BDR when `Δ` happens to be
//! the particular value the half-half construction would have chosen; in
//! general `(α, Δ) → (Q, P) → (α, Δ')` yields `Δ' ≠ Δ` (see §9, scenario 4
//! in §8, and the Open Questions in §9 — this asymmetry is inherited from
//! the source and intentionally preserved, not a bug in this crate).

use crate::error::ModelError;
use crate::model::Seconds;

/// BDR (α, Δ) → PRM (Q, P). Requires `0 < α < 1`; `Δ ≥ 0` is otherwise
/// unconstrained.
pub fn bdr_to_prm(alpha: f64, delta: Seconds) -> Result<(Seconds, Seconds), ModelError> {
    if !(alpha > 0.0 && alpha < 1.0) {
        return Err(ModelError::InvalidBandwidth { alpha });
    }
    let period = delta / (1.0 - alpha);
    let budget = period * alpha / 2.0;
    Ok((budget, period))
}

/// PRM (Q, P) → BDR (α, Δ).
pub fn prm_to_bdr(budget: Seconds, period: Seconds) -> (f64, Seconds) {
    let alpha = budget / period;
    let delta = (period - budget) * 2.0;
    (alpha, delta)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn round_trip_within_tolerance_when_alpha_in_unit_interval() {
        // Pick (alpha, delta) such that delta is exactly what half-half would
        // have produced for the resulting (Q, P), so the round trip is exact.
        let (budget, period) = bdr_to_prm(0.5, Seconds(1.0)).unwrap();
        let (alpha2, delta2) = prm_to_bdr(budget, period);
        assert_approx_eq!(alpha2, 0.5, 1e-9);
        assert_approx_eq!(delta2.0, 1.0, 1e-9);
    }

    #[test]
    fn scenario_4_documents_the_asymmetry() {
        let (budget, period) = bdr_to_prm(0.6, Seconds(2.0)).unwrap();
        assert_approx_eq!(period.0, 5.0);
        assert_approx_eq!(budget.0, 1.5);
        let (alpha2, delta2) = prm_to_bdr(budget, period);
        assert_approx_eq!(alpha2, 0.3);
        assert_approx_eq!(delta2.0, 7.0);
    }

    #[test]
    fn alpha_outside_unit_interval_is_rejected() {
        assert!(bdr_to_prm(0.0, Seconds(1.0)).is_err());
        assert!(bdr_to_prm(1.0, Seconds(1.0)).is_err());
        assert!(bdr_to_prm(-0.1, Seconds(1.0)).is_err());
    }
}
