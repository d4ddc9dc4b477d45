//! Membership function shapes and their evaluators.
//!
//! The free functions are the raw curve math; [`MembershipFunction`] is the
//! validated, closed set of shapes a [`Variable`](crate::Variable) can hold.

use indexmap::IndexMap;
use num::Float;

use crate::error::{EvaluationError, ValidationError};
use crate::inputs::Inputs;

/// Triangular curve with feet at `a` and `c` and its peak at `b`
pub fn trimf<F: Float>(x: F, a: F, b: F, c: F) -> F {
    if x < a || x > c {
        F::zero()
    } else if x == b {
        F::one()
    } else if x < b {
        (x - a) / (b - a)
    } else {
        (c - x) / (c - b)
    }
}

/// Trapezoidal curve with feet at `a` and `d` and a plateau on `[b, c]`
pub fn trapmf<F: Float>(x: F, a: F, b: F, c: F, d: F) -> F {
    if x < a || x > d {
        F::zero()
    } else if b <= x && x <= c {
        F::one()
    } else if x < b {
        (x - a) / (b - a)
    } else {
        (d - x) / (d - c)
    }
}

pub fn gaussmf<F: Float>(x: F, mean: F, sigma: F) -> F {
    let two = F::one() + F::one();
    let dx = x - mean;

    F::exp(-(dx * dx) / (two * sigma * sigma))
}

/// Left Gaussian shoulder below `mean1`, right shoulder above `mean2`
pub fn gauss2mf<F: Float>(x: F, mean1: F, sigma1: F, mean2: F, sigma2: F) -> F {
    let left = if x < mean1 {
        gaussmf(x, mean1, sigma1)
    } else {
        F::one()
    };
    let right = if x > mean2 {
        gaussmf(x, mean2, sigma2)
    } else {
        F::one()
    };

    left * right
}

#[derive(Clone, Debug, PartialEq)]
pub enum MembershipFunction {
    Triangular {
        a: f64,
        b: f64,
        c: f64,
    },
    Trapezoidal {
        a: f64,
        b: f64,
        c: f64,
        d: f64,
    },
    Gaussian {
        mean: f64,
        sigma: f64,
    },
    DoubleGaussian {
        mean1: f64,
        sigma1: f64,
        mean2: f64,
        sigma2: f64,
    },
    /// Sugeno consequent `constant + Σ coefficients[name] * inputs[name]`
    Linear {
        coefficients: IndexMap<String, f64>,
        constant: f64,
    },
}

impl MembershipFunction {
    pub fn triangular(a: f64, b: f64, c: f64) -> Result<Self, ValidationError> {
        ascending("triangular", &[a, b, c])?;

        Ok(Self::Triangular { a, b, c })
    }

    pub fn trapezoidal(a: f64, b: f64, c: f64, d: f64) -> Result<Self, ValidationError> {
        ascending("trapezoidal", &[a, b, c, d])?;

        Ok(Self::Trapezoidal { a, b, c, d })
    }

    pub fn gaussian(mean: f64, sigma: f64) -> Result<Self, ValidationError> {
        positive("gaussian", sigma)?;

        Ok(Self::Gaussian { mean, sigma })
    }

    pub fn double_gaussian(mean1: f64, sigma1: f64, mean2: f64, sigma2: f64) -> Result<Self, ValidationError> {
        positive("double gaussian", sigma1)?;
        positive("double gaussian", sigma2)?;

        Ok(Self::DoubleGaussian {
            mean1,
            sigma1,
            mean2,
            sigma2,
        })
    }

    /// Builds a linear consequent against the system's declared input names.
    ///
    /// The coefficient keys must be exactly the declared inputs.
    pub fn linear<S: AsRef<str>>(
        coefficients: IndexMap<String, f64>,
        constant: f64,
        declared_inputs: &[S],
    ) -> Result<Self, ValidationError> {
        if coefficients.len() != declared_inputs.len() {
            return Err(ValidationError::CoefficientMismatch {
                expected: declared_inputs.len(),
                found: coefficients.len(),
            });
        }

        if let Some(name) = coefficients
            .keys()
            .find(|name| !declared_inputs.iter().any(|input| input.as_ref() == name.as_str()))
        {
            return Err(ValidationError::UnknownCoefficient(name.clone()));
        }

        Ok(Self::Linear {
            coefficients,
            constant,
        })
    }

    /// A linear consequent with a zero coefficient for every declared input
    pub fn constant<S: AsRef<str>>(value: f64, declared_inputs: &[S]) -> Self {
        Self::Linear {
            coefficients: declared_inputs
                .iter()
                .map(|name| (name.as_ref().to_owned(), 0.))
                .collect(),
            constant: value,
        }
    }

    pub fn shape_name(&self) -> &'static str {
        match self {
            Self::Triangular { .. } => "triangular",
            Self::Trapezoidal { .. } => "trapezoidal",
            Self::Gaussian { .. } => "gaussian",
            Self::DoubleGaussian { .. } => "double gaussian",
            Self::Linear { .. } => "linear",
        }
    }

    pub fn is_linear(&self) -> bool {
        matches!(self, Self::Linear { .. })
    }

    /// Degree of membership of `x`, or `None` for a linear consequent,
    /// which has no curve.
    pub fn degree(&self, x: f64) -> Option<f64> {
        let degree = match *self {
            Self::Triangular { a, b, c } => trimf(x, a, b, c),
            Self::Trapezoidal { a, b, c, d } => trapmf(x, a, b, c, d),
            Self::Gaussian { mean, sigma } => gaussmf(x, mean, sigma),
            Self::DoubleGaussian {
                mean1,
                sigma1,
                mean2,
                sigma2,
            } => gauss2mf(x, mean1, sigma1, mean2, sigma2),
            Self::Linear { .. } => return None,
        };

        Some(degree)
    }

    /// Value of a linear consequent over `inputs`, or `None` for a curve.
    pub fn linear_value(&self, inputs: &Inputs) -> Option<Result<f64, EvaluationError>> {
        let Self::Linear {
            coefficients,
            constant,
        } = self
        else {
            return None;
        };

        let value = coefficients
            .iter()
            .try_fold(*constant, |acc, (name, coefficient)| -> Result<_, EvaluationError> {
                Ok(acc + coefficient * inputs.finite(name)?)
            });

        Some(value)
    }
}

fn ascending(shape: &'static str, params: &[f64]) -> Result<(), ValidationError> {
    // NaN fails the comparison and is rejected along with descending params
    if params.windows(2).all(|w| w[0] <= w[1]) {
        Ok(())
    } else {
        Err(ValidationError::NonAscending {
            shape,
            params: params.to_vec(),
        })
    }
}

fn positive(shape: &'static str, sigma: f64) -> Result<(), ValidationError> {
    if sigma > 0. {
        Ok(())
    } else {
        Err(ValidationError::NonPositiveSigma { shape, sigma })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use proptest::prelude::*;

    #[test]
    fn test_trimf() {
        assert_eq!(trimf(0.5, 0., 1., 2.), 0.5);
        assert_eq!(trimf(1.5, 0., 1., 2.), 0.5);
        assert_eq!(trimf(0., 0., 1., 2.), 0.);
        assert_eq!(trimf(2., 0., 1., 2.), 0.);
        assert_eq!(trimf(-0.1, 0., 1., 2.), 0.);
        assert_eq!(trimf(2.1, 0., 1., 2.), 0.);
        // Shoulders
        assert_eq!(trimf(0., 0., 0., 2.), 1.);
        assert_eq!(trimf(2., 0., 2., 2.), 1.);
        assert_eq!(trimf(3., 3., 3., 3.), 1.);
    }

    #[test]
    fn test_trapmf() {
        assert_eq!(trapmf(1., 0., 2., 4., 6.), 0.5);
        assert_eq!(trapmf(5., 0., 2., 4., 6.), 0.5);
        assert_eq!(trapmf(6., 0., 2., 4., 6.), 0.);
        assert_eq!(trapmf(-1., 0., 2., 4., 6.), 0.);
        assert_eq!(trapmf(7., 7., 7., 7., 7.), 1.);
    }

    #[test]
    fn test_gauss2mf() {
        assert_eq!(gauss2mf(3., 2., 1., 4., 1.), 1.);
        assert_eq!(gauss2mf(1., 2., 1., 4., 1.), gaussmf(1., 2., 1.));
        assert_eq!(gauss2mf(6., 2., 1., 4., 0.5), gaussmf(6., 4., 0.5));
        // Overlapping shoulders multiply
        let y = gauss2mf(3., 4., 1., 2., 1.);
        assert!((y - gaussmf(3., 4., 1.) * gaussmf(3., 2., 1.)).abs() < 1e-12);
    }

    #[test]
    fn test_constructors_validate() {
        assert!(MembershipFunction::triangular(0., 1., 2.).is_ok());
        assert_eq!(
            MembershipFunction::triangular(0., 3., 2.),
            Err(ValidationError::NonAscending {
                shape: "triangular",
                params: vec![0., 3., 2.]
            })
        );
        assert!(MembershipFunction::trapezoidal(0., 2., 1., 3.).is_err());
        assert!(MembershipFunction::trapezoidal(1., 1., 1., 1.).is_ok());
        assert_eq!(
            MembershipFunction::gaussian(0., 0.),
            Err(ValidationError::NonPositiveSigma {
                shape: "gaussian",
                sigma: 0.
            })
        );
        assert!(MembershipFunction::double_gaussian(0., 1., 1., -1.).is_err());
    }

    #[test]
    fn test_linear() {
        let declared = ["depth", "slope"];
        let coefficients: IndexMap<_, _> = [("depth".to_owned(), 2.), ("slope".to_owned(), -1.)].into();
        let mf = MembershipFunction::linear(coefficients, 0.5, &declared).unwrap();
        let inputs = Inputs::from_iter([("depth", 3.), ("slope", 1.)]);

        assert_eq!(mf.linear_value(&inputs), Some(Ok(5.5)));
        assert_eq!(mf.degree(1.), None);

        let partial = Inputs::from_iter([("depth", 3.)]);
        assert_eq!(
            mf.linear_value(&partial),
            Some(Err(EvaluationError::MissingInput("slope".into())))
        );

        let infinite = Inputs::from_iter([("depth", 3.), ("slope", f64::INFINITY)]);
        assert_eq!(
            mf.linear_value(&infinite),
            Some(Err(EvaluationError::NonFiniteInput("slope".into())))
        );
    }

    #[test]
    fn test_linear_coefficients_must_match_inputs() {
        let declared = ["depth", "slope"];
        let short: IndexMap<_, _> = [("depth".to_owned(), 2.)].into();
        let wrong: IndexMap<_, _> = [("depth".to_owned(), 2.), ("dip".to_owned(), 1.)].into();

        assert_eq!(
            MembershipFunction::linear(short, 0., &declared),
            Err(ValidationError::CoefficientMismatch { expected: 2, found: 1 })
        );
        assert_eq!(
            MembershipFunction::linear(wrong, 0., &declared),
            Err(ValidationError::UnknownCoefficient("dip".into()))
        );
    }

    #[test]
    fn test_constant() {
        let mf = MembershipFunction::constant(7., &["depth"]);
        let inputs = Inputs::from_iter([("depth", 100.)]);

        assert_eq!(mf.linear_value(&inputs), Some(Ok(7.)));
        assert!(mf.is_linear());
    }

    proptest! {
        #[test]
        fn test_trimf_peak_is_one(a in -100.0f64..100., db in 0.0f64..50., dc in 0.0f64..50.) {
            let b = a + db;
            let c = b + dc;

            prop_assert_eq!(trimf(b, a, b, c), 1.);
        }

        #[test]
        fn test_trapmf_plateau_is_one(a in -100.0f64..100., db in 0.0f64..50., dc in 0.0f64..50., dd in 0.0f64..50., t in 0.0f64..=1.) {
            let b = a + db;
            let c = b + dc;
            let d = c + dd;
            let x = (b + t * (c - b)).clamp(b, c);

            prop_assert_eq!(trapmf(x, a, b, c, d), 1.);
        }

        #[test]
        fn test_gaussmf_is_symmetric(mean in -800i32..800, d in 0i32..800, sigma in 0.01f64..50.) {
            // Eighths keep mean ± d exact
            let mean = f64::from(mean) / 8.;
            let d = f64::from(d) / 8.;

            prop_assert_eq!(gaussmf(mean - d, mean, sigma), gaussmf(mean + d, mean, sigma));
        }

        #[test]
        fn test_gauss2mf_plateau_is_one(mean1 in -100.0f64..100., width in 0.0f64..50., t in 0.0f64..=1., s1 in 0.01f64..10., s2 in 0.01f64..10.) {
            let mean2 = mean1 + width;
            let x = (mean1 + t * width).clamp(mean1, mean2);

            prop_assert_eq!(gauss2mf(x, mean1, s1, mean2, s2), 1.);
        }
    }
}
