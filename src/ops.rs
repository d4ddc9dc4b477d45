use std::fmt;

use num::Float;

/// And operator method for combining the compositions of propositions
/// in a fuzzy rule premise.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AndOp {
    #[default]
    Min,
    Prod,
}

impl AndOp {
    /// Parses the `AndMethod` value of a system header
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "min" => Some(Self::Min),
            "prod" => Some(Self::Prod),
            _ => None,
        }
    }

    pub fn call<F: Float>(self, u: F, v: F) -> F {
        match self {
            Self::Min => F::min(u, v),
            Self::Prod => u * v,
        }
    }

    /// Left fold in iteration order. `None` when there are no degrees.
    pub fn fold<F: Float>(self, degrees: impl IntoIterator<Item = F>) -> Option<F> {
        degrees.into_iter().reduce(|acc, d| self.call(acc, d))
    }
}

/// Or operator method for combining the compositions of propositions
/// in a fuzzy rule premise.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OrOp {
    #[default]
    Max,
    ProbOr,
}

impl OrOp {
    /// Parses the `OrMethod` value of a system header
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "max" => Some(Self::Max),
            "probor" => Some(Self::ProbOr),
            _ => None,
        }
    }

    pub fn call<F: Float>(self, u: F, v: F) -> F {
        match self {
            Self::Max => F::max(u, v),
            Self::ProbOr => u + v - u * v,
        }
    }

    /// Left fold in iteration order, starting from the first degree.
    ///
    /// ProbOr is only associative in exact arithmetic, so callers pass
    /// degrees in term declaration order to keep results reproducible.
    pub fn fold<F: Float>(self, degrees: impl IntoIterator<Item = F>) -> Option<F> {
        degrees.into_iter().reduce(|acc, d| self.call(acc, d))
    }
}

/// Fuzzy complement
#[inline]
pub fn not<F: Float>(degree: F) -> F {
    F::one() - degree
}

/// Method for defuzzifcating the resulting membership function.
///
/// Sugeno systems carry the declared method but aggregate by weighted
/// average regardless.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DefuzzMethod {
    /// Center of Gravity
    Centroid,
    /// Bisector of Area
    Bisector,
    /// Mean of the values for which the membership function is maximum
    Mom,
    /// Largest value for which the membership function is maximum
    Lom,
    /// Smallest value for which the membership function is maximum
    Som,
    /// Weighted average of rule outputs
    #[default]
    WtAver,
    /// Weighted sum of rule outputs
    WtSum,
}

impl DefuzzMethod {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "centroid" => Some(Self::Centroid),
            "bisector" => Some(Self::Bisector),
            "mom" => Some(Self::Mom),
            "lom" => Some(Self::Lom),
            "som" => Some(Self::Som),
            "wtaver" => Some(Self::WtAver),
            "wtsum" => Some(Self::WtSum),
            _ => None,
        }
    }
}

/// Which executor a system is meant for
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SystemType {
    Mamdani,
    Sugeno,
}

impl SystemType {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "mamdani" => Some(Self::Mamdani),
            "sugeno" => Some(Self::Sugeno),
            _ => None,
        }
    }
}

impl fmt::Display for SystemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mamdani => f.write_str("mamdani"),
            Self::Sugeno => f.write_str("sugeno"),
        }
    }
}
