//! Supply-bound functions (§4.1).

use crate::model::Seconds;

/// SBF-BDR(α, Δ, t) = 0 for `t ≤ Δ`, else `α·(t − Δ)`.
pub fn sbf_bdr(alpha: f64, delta: Seconds, t: Seconds) -> Seconds {
    if t.0 <= delta.0 {
        Seconds::ZERO
    } else {
        (t - delta) * alpha
    }
}

/// SBF-PRM(Q, P, t) = ⌊t/P⌋·Q, the conservative PRM lower bound used by the
/// independent PRM schedulability test (§4.3).
pub fn sbf_prm(budget: Seconds, period: Seconds, t: Seconds) -> Seconds {
    let n = t.div_floor(period);
    if n <= 0 {
        Seconds::ZERO
    } else {
        budget * n
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn sbf_bdr_is_zero_up_to_delta_then_linear() {
        let delta = Seconds(1.0);
        assert_approx_eq!(sbf_bdr(0.5, delta, Seconds(0.0)).0, 0.0);
        assert_approx_eq!(sbf_bdr(0.5, delta, Seconds(1.0)).0, 0.0);
        assert_approx_eq!(sbf_bdr(0.5, delta, Seconds(3.0)).0, 1.0);
    }

    #[test]
    fn sbf_bdr_monotone() {
        let delta = Seconds(2.0);
        let mut prev = Seconds::ZERO;
        for t in (0..50).map(|x| Seconds(x as f64 * 0.5)) {
            let s = sbf_bdr(0.3, delta, t);
            assert!(s.0 + 1e-9 >= prev.0);
            prev = s;
        }
    }

    #[test]
    fn sbf_prm_matches_floor_formula() {
        assert_approx_eq!(sbf_prm(Seconds(2.0), Seconds(5.0), Seconds(9.0)).0, 2.0);
        assert_approx_eq!(sbf_prm(Seconds(2.0), Seconds(5.0), Seconds(10.0)).0, 4.0);
    }
}
