use std::collections::HashMap;

use crate::error::EvaluationError;

/// Crisp input values keyed by input variable name
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Inputs(pub(crate) HashMap<String, f64>);

impl Inputs {
    pub fn new() -> Self {
        Inputs(HashMap::new())
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Inputs(HashMap::with_capacity(capacity))
    }

    pub fn add(&mut self, name: impl Into<String>, val: f64) {
        self.0.insert(name.into(), val);
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.0.get(name).copied()
    }

    /// The value for `name`, which must be present and finite
    pub(crate) fn finite(&self, name: &str) -> Result<f64, EvaluationError> {
        match self.get(name) {
            Some(x) if x.is_finite() => Ok(x),
            Some(_) => Err(EvaluationError::NonFiniteInput(name.to_owned())),
            None => Err(EvaluationError::MissingInput(name.to_owned())),
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for Inputs {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        Inputs(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

impl From<HashMap<String, f64>> for Inputs {
    fn from(map: HashMap<String, f64>) -> Self {
        Inputs(map)
    }
}
