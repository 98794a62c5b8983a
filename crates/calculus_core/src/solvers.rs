use crate::error::EvaluationError;
use crate::traits::Integrand;
use anyhow::{bail, Result};
use log::trace;
use num_complex::Complex64;
use serde::{Deserialize, Serialize};

/// Kronrod abscissae on [-1, 1], largest first; the last node is the center.
/// The Gauss 7-point nodes are the odd-indexed entries plus the center.
const XGK: [f64; 8] = [
    0.991455371120812639206854697526329,
    0.949107912342758524526189684047851,
    0.864864423359769072789712788640926,
    0.741531185599394439863864773280788,
    0.586087235467691130294144845693013,
    0.405845151377397166906606412076961,
    0.207784955007898467600689403773245,
    0.000000000000000000000000000000000,
];

const WGK: [f64; 8] = [
    0.022935322010529224963732008058970,
    0.063092092629978553290700663189204,
    0.104790010322250183839876322541518,
    0.140653259715525918745189590510238,
    0.169004726639267902826583426598550,
    0.190350578064785409913256402421014,
    0.204432940075298892414161999234649,
    0.209482141084727828012999174891714,
];

/// Gauss weights for XGK[1], XGK[3], XGK[5] and the center.
const WG: [f64; 4] = [
    0.129484966168869693270611432679082,
    0.279705391489276667901467771423780,
    0.381830050505118944950369775488975,
    0.417959183673469387755102040816327,
];

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct IntegrationSettings {
    /// Target for the summed error estimate. The integral is accepted once
    /// the estimate is below `tolerance` or `tolerance · |I|`.
    pub tolerance: f64,
    /// Upper bound on the number of subintervals before giving up.
    pub max_subintervals: usize,
}

impl Default for IntegrationSettings {
    fn default() -> Self {
        Self {
            tolerance: 1e-3,
            max_subintervals: 2000,
        }
    }
}

impl IntegrationSettings {
    pub fn with_tolerance(tolerance: f64) -> Self {
        Self {
            tolerance,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            bail!(
                "Integration tolerance must be positive and finite, got {}",
                self.tolerance
            );
        }
        if self.max_subintervals == 0 {
            bail!("Integration needs at least one subinterval");
        }
        Ok(())
    }
}

/// Why the adaptive loop stopped.
#[derive(Debug, Clone, PartialEq)]
pub enum Termination {
    Converged,
    /// The subinterval budget ran out, or the worst segment became too short
    /// to bisect in floating point.
    Exhausted,
    /// The integrand failed or returned a non-finite value at `parameter`.
    NonFinite {
        parameter: f64,
        cause: Option<EvaluationError>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Quadrature {
    pub value: Complex64,
    pub error_estimate: f64,
    pub subintervals: usize,
    pub evaluations: usize,
    pub termination: Termination,
}

#[derive(Debug, Clone, Copy)]
struct Segment {
    a: f64,
    b: f64,
    estimate: Complex64,
    error: f64,
}

struct Sampler<'a, I: Integrand + ?Sized> {
    integrand: &'a I,
    evaluations: usize,
}

impl<I: Integrand + ?Sized> Sampler<'_, I> {
    fn sample(&mut self, t: f64) -> Result<Complex64, Termination> {
        self.evaluations += 1;
        match self.integrand.sample(t) {
            Ok(value) if value.is_finite() => Ok(value),
            Ok(_) => Err(Termination::NonFinite {
                parameter: t,
                cause: None,
            }),
            Err(err) => Err(Termination::NonFinite {
                parameter: t,
                cause: Some(err),
            }),
        }
    }

    /// One 15-point Kronrod rule with its embedded 7-point Gauss rule.
    /// The difference of the two is the segment's error estimate.
    fn kronrod(&mut self, a: f64, b: f64) -> Result<Segment, Termination> {
        let center = 0.5 * (a + b);
        let half = 0.5 * (b - a);

        let f_center = self.sample(center)?;
        let mut kronrod = f_center * WGK[7];
        let mut gauss = f_center * WG[3];

        for (j, (&x, &w)) in XGK.iter().zip(WGK.iter()).take(7).enumerate() {
            let offset = half * x;
            let pair = self.sample(center - offset)? + self.sample(center + offset)?;
            kronrod += pair * w;
            if j % 2 == 1 {
                gauss += pair * WG[j / 2];
            }
        }

        Ok(Segment {
            a,
            b,
            estimate: kronrod * half,
            error: ((kronrod - gauss) * half).norm(),
        })
    }
}

/// Globally adaptive Gauss–Kronrod 7/15 quadrature of `integrand` over
/// [a, b]. The segment with the largest error estimate is bisected until
/// the summed estimate meets the tolerance or the budget runs out.
///
/// `b < a` integrates in the reverse orientation; `a == b` is zero.
pub fn gauss_kronrod<I: Integrand + ?Sized>(
    integrand: &I,
    a: f64,
    b: f64,
    settings: &IntegrationSettings,
) -> Result<Quadrature> {
    settings.validate()?;
    if !(a.is_finite() && b.is_finite()) {
        bail!("Integration bounds must be finite, got [{a}, {b}]");
    }

    let mut sampler = Sampler {
        integrand,
        evaluations: 0,
    };

    if a == b {
        return Ok(Quadrature {
            value: Complex64::new(0.0, 0.0),
            error_estimate: 0.0,
            subintervals: 0,
            evaluations: 0,
            termination: Termination::Converged,
        });
    }

    let first = match sampler.kronrod(a, b) {
        Ok(segment) => segment,
        Err(termination) => return Ok(failed(termination, 1, sampler.evaluations)),
    };
    let mut segments = vec![first];

    loop {
        let value: Complex64 = segments.iter().map(|s| s.estimate).sum();
        let error: f64 = segments.iter().map(|s| s.error).sum();
        let target = settings.tolerance.max(settings.tolerance * value.norm());

        let finished = |termination| Quadrature {
            value,
            error_estimate: error,
            subintervals: segments.len(),
            evaluations: sampler.evaluations,
            termination,
        };

        if error <= target {
            return Ok(finished(Termination::Converged));
        }
        if segments.len() >= settings.max_subintervals {
            return Ok(finished(Termination::Exhausted));
        }

        let worst = segments
            .iter()
            .enumerate()
            .max_by(|(_, x), (_, y)| x.error.total_cmp(&y.error))
            .map(|(i, _)| i)
            .unwrap_or(0);
        let Segment { a: lo, b: hi, .. } = segments[worst];
        let mid = 0.5 * (lo + hi);
        if mid == lo || mid == hi {
            return Ok(finished(Termination::Exhausted));
        }

        trace!(
            "Bisecting [{lo}, {hi}] (error {:.3e}, total {error:.3e}, {} segments)",
            segments[worst].error,
            segments.len()
        );

        let halves = sampler
            .kronrod(lo, mid)
            .and_then(|left| sampler.kronrod(mid, hi).map(|right| (left, right)));
        match halves {
            Ok((left, right)) => {
                segments[worst] = left;
                segments.push(right);
            }
            Err(termination) => {
                return Ok(failed(termination, segments.len() + 1, sampler.evaluations))
            }
        }
    }
}

fn failed(termination: Termination, subintervals: usize, evaluations: usize) -> Quadrature {
    Quadrature {
        value: Complex64::new(f64::NAN, f64::NAN),
        error_estimate: f64::NAN,
        subintervals,
        evaluations,
        termination,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Kind;

    fn quintic(t: f64) -> Result<Complex64, EvaluationError> {
        Ok(Complex64::new(t.powi(5) - 2.0 * t, t * t))
    }

    fn oscillating(t: f64) -> Result<Complex64, EvaluationError> {
        Ok(Complex64::new((50.0 * t).sin(), 0.0))
    }

    fn peaked(t: f64) -> Result<Complex64, EvaluationError> {
        Ok(Complex64::new(1.0 / (1e-4 + t * t), 0.0))
    }

    fn pole(t: f64) -> Result<Complex64, EvaluationError> {
        if t == 0.0 {
            Err(EvaluationError::DivisionByZero {
                kind: Kind::Div,
                at: Complex64::new(t, 0.0),
            })
        } else {
            Ok(Complex64::new(1.0 / t, 0.0))
        }
    }

    fn assert_err_contains<T: std::fmt::Debug>(result: Result<T>, needle: &str) {
        let err = result.expect_err("expected an error");
        let message = err.to_string();
        assert!(
            message.contains(needle),
            "expected error containing '{needle}', got '{message}'"
        );
    }

    #[test]
    fn polynomials_are_exact_on_one_segment() {
        let result = gauss_kronrod(&quintic, -1.0, 2.0, &IntegrationSettings::default())
            .expect("quadrature should run");
        // ∫ t^5 - 2t = [t^6/6 - t^2] and ∫ t^2 = [t^3/3].
        let expected = Complex64::new((64.0 / 6.0 - 4.0) - (1.0 / 6.0 - 1.0), 3.0);
        assert!((result.value - expected).norm() < 1e-12);
        assert_eq!(result.subintervals, 1);
        assert_eq!(result.evaluations, 15);
        assert_eq!(result.termination, Termination::Converged);
    }

    #[test]
    fn reversed_bounds_flip_the_sign() {
        let settings = IntegrationSettings::default();
        let forward = gauss_kronrod(&quintic, 0.0, 1.5, &settings).unwrap();
        let backward = gauss_kronrod(&quintic, 1.5, 0.0, &settings).unwrap();
        assert!((forward.value + backward.value).norm() < 1e-12);
    }

    #[test]
    fn empty_interval_is_zero_without_sampling() {
        let result = gauss_kronrod(&pole, 0.0, 0.0, &IntegrationSettings::default()).unwrap();
        assert_eq!(result.value, Complex64::new(0.0, 0.0));
        assert_eq!(result.evaluations, 0);
        assert_eq!(result.termination, Termination::Converged);
    }

    #[test]
    fn adaptive_refinement_resolves_a_sharp_peak() {
        let settings = IntegrationSettings::with_tolerance(1e-8);
        let result = gauss_kronrod(&peaked, -1.0, 1.0, &settings).unwrap();
        let expected = 2.0 * (1.0_f64 / 1e-2).atan() / 1e-2;
        assert_eq!(result.termination, Termination::Converged);
        assert!(result.subintervals > 1);
        assert!((result.value.re - expected).abs() < 1e-6 * expected);
    }

    #[test]
    fn budget_exhaustion_is_reported() {
        let settings = IntegrationSettings {
            tolerance: 1e-6,
            max_subintervals: 1,
        };
        let result = gauss_kronrod(&oscillating, 0.0, 10.0, &settings).unwrap();
        assert_eq!(result.termination, Termination::Exhausted);
        assert_eq!(result.subintervals, 1);
        assert!(result.value.is_finite());
    }

    #[test]
    fn failing_sample_stops_with_its_parameter() {
        let result = gauss_kronrod(&pole, -1.0, 1.0, &IntegrationSettings::default()).unwrap();
        match result.termination {
            Termination::NonFinite { parameter, cause } => {
                assert_eq!(parameter, 0.0);
                assert!(matches!(cause, Some(EvaluationError::DivisionByZero { .. })));
            }
            other => panic!("expected a non-finite stop, got {other:?}"),
        }
        assert!(result.value.re.is_nan());
    }

    #[test]
    fn infinite_sample_without_error_is_non_finite() {
        let blows_up = |t: f64| -> Result<Complex64, EvaluationError> {
            Ok(Complex64::new(if t > 0.9 { f64::INFINITY } else { t }, 0.0))
        };
        let result = gauss_kronrod(&blows_up, 0.0, 1.0, &IntegrationSettings::default()).unwrap();
        assert!(matches!(
            result.termination,
            Termination::NonFinite { cause: None, .. }
        ));
    }

    #[test]
    fn invalid_settings_are_rejected() {
        let zero = IntegrationSettings::with_tolerance(0.0);
        assert_err_contains(gauss_kronrod(&quintic, 0.0, 1.0, &zero), "tolerance");
        let nan = IntegrationSettings::with_tolerance(f64::NAN);
        assert_err_contains(gauss_kronrod(&quintic, 0.0, 1.0, &nan), "tolerance");
        let no_budget = IntegrationSettings {
            tolerance: 1e-3,
            max_subintervals: 0,
        };
        assert_err_contains(gauss_kronrod(&quintic, 0.0, 1.0, &no_budget), "subinterval");
        assert_err_contains(
            gauss_kronrod(&quintic, 0.0, f64::INFINITY, &IntegrationSettings::default()),
            "bounds",
        );
    }
}
