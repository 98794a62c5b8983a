//! Contour and real-line integration.
//!
//! The contour integral ∫ f(γ(t))·γ′(t) dt is reduced to a complex integrand
//! of the real parameter and handed to the adaptive quadrature in
//! `solvers`. Soft failures (an exhausted budget, a non-finite sample) are
//! reported in the result and logged; only invalid settings are errors.

use crate::contour::Contour;
use crate::error::EvaluationError;
use crate::function::{ComplexFunction, RealFunction};
use crate::solvers::{gauss_kronrod, IntegrationSettings, Quadrature, Termination};
use crate::traits::Integrand;
use anyhow::Result;
use log::{debug, warn};
use num_complex::Complex64;
use serde::Serialize;

pub const DEFAULT_TOLERANCE: f64 = 1e-3;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum IntegrationDiagnostic {
    /// The subinterval budget ran out before the error estimate met the
    /// tolerance. The value is the best estimate found.
    NotConverged {
        subintervals: usize,
        error_estimate: f64,
    },
    /// The integrand could not be sampled at `parameter`. The value is NaN.
    NonFinite {
        parameter: f64,
        cause: Option<EvaluationError>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Integral {
    pub value: Complex64,
    pub error_estimate: f64,
    pub subintervals: usize,
    pub evaluations: usize,
    pub diagnostic: Option<IntegrationDiagnostic>,
}

impl Integral {
    pub fn is_converged(&self) -> bool {
        self.diagnostic.is_none()
    }
}

impl From<Quadrature> for Integral {
    fn from(q: Quadrature) -> Self {
        let diagnostic = match q.termination {
            Termination::Converged => None,
            Termination::Exhausted => Some(IntegrationDiagnostic::NotConverged {
                subintervals: q.subintervals,
                error_estimate: q.error_estimate,
            }),
            Termination::NonFinite { parameter, cause } => {
                Some(IntegrationDiagnostic::NonFinite { parameter, cause })
            }
        };
        Self {
            value: q.value,
            error_estimate: q.error_estimate,
            subintervals: q.subintervals,
            evaluations: q.evaluations,
            diagnostic,
        }
    }
}

struct AlongContour<'a> {
    f: &'a ComplexFunction,
    contour: &'a Contour,
}

impl Integrand for AlongContour<'_> {
    fn sample(&self, t: f64) -> Result<Complex64, EvaluationError> {
        let (z, dz) = self.contour.value_and_derivative(t)?;
        Ok(self.f.evaluate(z)? * dz)
    }
}

struct OnRealLine<'a> {
    f: &'a RealFunction,
}

impl Integrand for OnRealLine<'_> {
    fn sample(&self, t: f64) -> Result<Complex64, EvaluationError> {
        self.f.evaluate(t).map(|value| Complex64::new(value, 0.0))
    }
}

/// ∫ f dz along `contour`. Missing bounds default to the contour's own
/// `start` and `end`. Returns NaN if the integrand cannot be sampled
/// somewhere on the path; see [`integrate_with`] for the full report.
pub fn integrate(
    f: &ComplexFunction,
    contour: &Contour,
    start: Option<f64>,
    end: Option<f64>,
    tolerance: f64,
) -> Result<Complex64> {
    let settings = IntegrationSettings::with_tolerance(tolerance);
    integrate_with(f, contour, start, end, &settings).map(|integral| integral.value)
}

pub fn integrate_with(
    f: &ComplexFunction,
    contour: &Contour,
    start: Option<f64>,
    end: Option<f64>,
    settings: &IntegrationSettings,
) -> Result<Integral> {
    let a = start.unwrap_or(contour.start);
    let b = end.unwrap_or(contour.end);
    let integrand = AlongContour { f, contour };
    let integral = Integral::from(gauss_kronrod(&integrand, a, b, settings)?);
    report(&integral, a, b);
    Ok(integral)
}

/// ∫ f dx over [a, b] for a real function.
pub fn integrate_real(f: &RealFunction, a: f64, b: f64, tolerance: f64) -> Result<f64> {
    let settings = IntegrationSettings::with_tolerance(tolerance);
    integrate_real_with(f, a, b, &settings).map(|integral| integral.value.re)
}

pub fn integrate_real_with(
    f: &RealFunction,
    a: f64,
    b: f64,
    settings: &IntegrationSettings,
) -> Result<Integral> {
    let integral = Integral::from(gauss_kronrod(&OnRealLine { f }, a, b, settings)?);
    report(&integral, a, b);
    Ok(integral)
}

fn report(integral: &Integral, a: f64, b: f64) {
    match &integral.diagnostic {
        None => debug!(
            "Integrated over [{a}, {b}]: {} ({} subintervals, {} evaluations, error {:.3e})",
            integral.value, integral.subintervals, integral.evaluations, integral.error_estimate
        ),
        Some(IntegrationDiagnostic::NotConverged {
            subintervals,
            error_estimate,
        }) => warn!(
            "Integral over [{a}, {b}] did not converge after {subintervals} subintervals \
             (error estimate {error_estimate:.3e})"
        ),
        Some(IntegrationDiagnostic::NonFinite { parameter, cause }) => match cause {
            Some(err) => warn!("Integrand over [{a}, {b}] failed at t = {parameter}: {err}"),
            None => warn!("Integrand over [{a}, {b}] is not finite at t = {parameter}"),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algebra::Compose;
    use std::f64::consts::{PI, TAU};

    fn cplx(re: f64, im: f64) -> Complex64 {
        Complex64::new(re, im)
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
    fn analytic_functions_vanish_on_closed_contours() {
        let circle = Contour::circular(1.5, cplx(0.5, -0.5));
        let square = ComplexFunction::identity().pow(2.0);
        for f in [ComplexFunction::exp(), square, ComplexFunction::cosh()] {
            let value = integrate(&f, &circle, None, None, 1e-8).expect("integral should run");
            assert!(value.norm() < 1e-6, "{f}: got {value}");
        }
    }

    #[test]
    fn simple_pole_inside_gives_two_pi_i() {
        let two_pi_i = cplx(0.0, TAU);
        let center = cplx(1.0, 2.0);
        let around = (ComplexFunction::identity() - center).reciprocal();
        let circle = Contour::circular(0.75, center);
        let value = integrate(&around, &circle, None, None, 1e-8).unwrap();
        assert!((value - two_pi_i).norm() < 1e-6);

        let off_center = (ComplexFunction::identity() - cplx(0.5, 0.5)).reciprocal();
        let big = Contour::circular(2.0, cplx(0.0, 0.0));
        let value = integrate(&off_center, &big, None, None, 1e-8).unwrap();
        assert!((value - two_pi_i).norm() < 1e-6);

        let outside = (ComplexFunction::identity() - cplx(3.0, 0.0)).reciprocal();
        let value = integrate(&outside, &big, None, None, 1e-8).unwrap();
        assert!(value.norm() < 1e-6);
    }

    #[test]
    fn sine_of_scaled_exponential_matches_trapezoid_reference() {
        let f = ComplexFunction::sin().compose(5.0 * ComplexFunction::exp());
        let circle = Contour::unit_circle();
        let value = integrate(&f, &circle, None, None, DEFAULT_TOLERANCE).unwrap();

        // The trapezoid rule is spectrally accurate for periodic integrands.
        let n = 20_000;
        let h = TAU / n as f64;
        let reference: Complex64 = (0..n)
            .map(|k| {
                let t = k as f64 * h;
                let (z, dz) = circle.value_and_derivative(t).unwrap();
                (5.0 * z.exp()).sin() * dz * h
            })
            .sum();
        assert!((value - reference).norm() < 1e-3);
    }

    #[test]
    fn bounds_default_to_the_contour_and_can_be_overridden() {
        let mut gamma = Contour::identity();
        let f = ComplexFunction::identity();
        let value = integrate(&f, &gamma, None, None, 1e-10).unwrap();
        assert!((value - cplx(0.5, 0.0)).norm() < 1e-12);

        gamma.end = 2.0;
        let value = integrate(&f, &gamma, None, None, 1e-10).unwrap();
        assert!((value - cplx(2.0, 0.0)).norm() < 1e-12);

        let value = integrate(&f, &gamma, Some(1.0), None, 1e-10).unwrap();
        assert!((value - cplx(1.5, 0.0)).norm() < 1e-12);

        let value = integrate(&f, &gamma, Some(2.0), Some(0.0), 1e-10).unwrap();
        assert!((value + cplx(2.0, 0.0)).norm() < 1e-12);
    }

    #[test]
    fn pole_on_the_path_yields_nan_and_a_diagnostic() {
        let f = ComplexFunction::identity().reciprocal();
        let segment = Contour::line(cplx(-1.0, 0.0), cplx(1.0, 0.0));
        let settings = IntegrationSettings::default();
        let integral = integrate_with(&f, &segment, None, None, &settings)
            .expect("a failing sample should not be an error");
        assert!(integral.value.re.is_nan());
        match integral.diagnostic {
            Some(IntegrationDiagnostic::NonFinite { parameter, cause }) => {
                assert_eq!(parameter, 0.5);
                assert!(matches!(cause, Some(EvaluationError::DivisionByZero { .. })));
            }
            other => panic!("expected a non-finite diagnostic, got {other:?}"),
        }
        let value = integrate(&f, &segment, None, None, DEFAULT_TOLERANCE).unwrap();
        assert!(value.re.is_nan() && value.im.is_nan());
    }

    #[test]
    fn exhausted_budget_is_reported_not_raised() {
        let f = ComplexFunction::sin().compose(60.0 * ComplexFunction::identity());
        let gamma = Contour::identity().with_interval(0.0, 10.0);
        let settings = IntegrationSettings {
            tolerance: 1e-9,
            max_subintervals: 1,
        };
        let integral = integrate_with(&f, &gamma, None, None, &settings).unwrap();
        assert!(!integral.is_converged());
        assert!(matches!(
            integral.diagnostic,
            Some(IntegrationDiagnostic::NotConverged { subintervals: 1, .. })
        ));
        assert!(integral.value.is_finite());
    }

    #[test]
    fn converged_report_counts_work() {
        let f = ComplexFunction::exp();
        let integral = integrate_with(
            &f,
            &Contour::unit_circle(),
            None,
            None,
            &IntegrationSettings::with_tolerance(1e-10),
        )
        .unwrap();
        assert!(integral.is_converged());
        assert!(integral.subintervals >= 1);
        assert_eq!(integral.evaluations % 15, 0);
        assert!(integral.error_estimate <= 1e-10_f64.max(1e-10 * integral.value.norm()));
    }

    #[test]
    fn real_integrals_use_the_same_engine() {
        let value = integrate_real(&RealFunction::sin(), 0.0, PI, 1e-10).unwrap();
        assert!((value - 2.0).abs() < 1e-10);

        let gaussian = RealFunction::exp().compose(-(RealFunction::identity().pow(2.0)));
        let value = integrate_real(&gaussian, -8.0, 8.0, 1e-10).unwrap();
        assert!((value - PI.sqrt()).abs() < 1e-8);

        let pole = RealFunction::identity().reciprocal();
        let integral =
            integrate_real_with(&pole, -1.0, 1.0, &IntegrationSettings::default()).unwrap();
        assert!(matches!(
            integral.diagnostic,
            Some(IntegrationDiagnostic::NonFinite { parameter, .. }) if parameter == 0.0
        ));
    }

    #[test]
    fn invalid_settings_are_errors() {
        let f = ComplexFunction::exp();
        let circle = Contour::unit_circle();
        assert_err_contains(integrate(&f, &circle, None, None, -1.0), "tolerance");
        assert_err_contains(
            integrate(&f, &circle, Some(f64::NAN), None, DEFAULT_TOLERANCE),
            "bounds",
        );
        assert_err_contains(integrate_real(&RealFunction::sin(), 0.0, 1.0, 0.0), "tolerance");
    }

    #[test]
    fn diagnostics_serialize() {
        fn assert_serialize<T: Serialize>() {}
        assert_serialize::<Integral>();
        assert_serialize::<IntegrationDiagnostic>();
    }
}
