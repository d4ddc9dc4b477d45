use thiserror::Error;

/// A document section could not be read as a FIS description.
///
/// Every variant names the 1-based document line it was raised for.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FormatError {
    #[error("line {line}: {reason}")]
    Malformed { line: usize, reason: String },

    #[error("line {line}: missing required key `{key}`")]
    MissingKey { line: usize, key: &'static str },

    #[error("line {line}: expected {expected} {what}, found {found}")]
    CountMismatch {
        line: usize,
        what: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("line {line}: unrecognized membership function shape `{shape}`")]
    UnknownShape { line: usize, shape: String },

    #[error("line {line}: shape `{shape}` takes {expected} parameters, found {found}")]
    Arity {
        line: usize,
        shape: String,
        expected: usize,
        found: usize,
    },

    #[error("line {line}: unrecognized {key} `{value}`")]
    UnknownMethod {
        line: usize,
        key: &'static str,
        value: String,
    },

    #[error("line {line}: unrecognized system type `{value}`")]
    UnknownSystemType { line: usize, value: String },

    #[error("line {line}: index {index} for `{variable}` exceeds its {num_mfs} membership functions")]
    IndexOutOfRange {
        line: usize,
        variable: String,
        index: i64,
        num_mfs: usize,
    },

    #[error("line {line}: connective must be 1 (and) or 2 (or), found `{found}`")]
    Connective { line: usize, found: String },

    #[error("line {line}: rule weight {weight} is outside (0, 1]")]
    Weight { line: usize, weight: f64 },

    #[error("line {line}: consequent for `{variable}` cannot be negated")]
    NegatedConsequent { line: usize, variable: String },

    #[error("line {line}: rule has no consequent")]
    NoConsequent { line: usize },
}

impl FormatError {
    pub(crate) fn malformed(line: usize, reason: impl Into<String>) -> Self {
        FormatError::Malformed {
            line,
            reason: reason.into(),
        }
    }

    /// The document line this error was raised for
    pub fn line(&self) -> usize {
        match self {
            Self::Malformed { line, .. }
            | Self::MissingKey { line, .. }
            | Self::CountMismatch { line, .. }
            | Self::UnknownShape { line, .. }
            | Self::Arity { line, .. }
            | Self::UnknownMethod { line, .. }
            | Self::UnknownSystemType { line, .. }
            | Self::IndexOutOfRange { line, .. }
            | Self::Connective { line, .. }
            | Self::Weight { line, .. }
            | Self::NegatedConsequent { line, .. }
            | Self::NoConsequent { line } => *line,
        }
    }
}

/// Well-formed parameters that violate a shape or system invariant.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("{shape} parameters must be non-decreasing, found {params:?}")]
    NonAscending { shape: &'static str, params: Vec<f64> },

    #[error("{shape} sigma must be strictly positive, found {sigma}")]
    NonPositiveSigma { shape: &'static str, sigma: f64 },

    #[error("linear function has {found} coefficients but the system declares {expected} inputs")]
    CoefficientMismatch { expected: usize, found: usize },

    #[error("linear coefficient refers to undeclared input `{0}`")]
    UnknownCoefficient(String),

    #[error("range [{min} {max}] has min greater than max")]
    InvertedRange { min: f64, max: f64 },

    #[error("shape `{shape}` is not allowed on {role}")]
    MisplacedShape { shape: String, role: &'static str },

    #[error("duplicate {what} name `{name}`")]
    DuplicateName { what: &'static str, name: String },
}

/// Failure to construct a [`System`](crate::System) from a document.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BuildError {
    #[error(transparent)]
    Format(#[from] FormatError),

    #[error("line {line}: {source}")]
    Validation { line: usize, source: ValidationError },
}

impl BuildError {
    pub fn line(&self) -> usize {
        match self {
            Self::Format(err) => err.line(),
            Self::Validation { line, .. } => *line,
        }
    }
}

/// Failure to turn one set of inputs into a crisp output.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvaluationError {
    #[error("system has no output variable named `{0}`")]
    UnknownOutput(String),

    #[error("missing input value for `{0}`")]
    MissingInput(String),

    #[error("input value for `{0}` is not finite")]
    NonFiniteInput(String),

    #[error("rule {rule} has no active antecedent terms")]
    EmptyAntecedent { rule: usize },

    #[error("no rule fired for output `{output}`")]
    NoRuleFired { output: String },

    #[error("variable `{variable}` has no membership function `{mf}`")]
    NotFound { variable: String, mf: String },

    #[error("membership function `{mf}` of `{variable}` is not a {expected}")]
    ShapeMismatch {
        variable: String,
        mf: String,
        expected: &'static str,
    },

    #[error("system has no variable named `{0}`")]
    UnknownVariable(String),

    #[error("{0} systems are evaluated by an external executor")]
    UnsupportedSystemType(crate::ops::SystemType),
}

/// Failure of a whole batch run.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BatchError {
    #[error("cell ({row}, {column}): {source}")]
    Cell {
        row: usize,
        column: usize,
        source: EvaluationError,
    },

    #[error("could not start worker pool: {0}")]
    ThreadPool(String),
}
