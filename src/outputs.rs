use indexmap::IndexMap;

/// Crisp values inferred for each output variable, in declaration order
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Outputs {
    values: IndexMap<String, f64>,
}

impl Outputs {
    pub(crate) fn new(values: IndexMap<String, f64>) -> Self {
        Self { values }
    }

    pub fn get(&self, output: &str) -> Option<f64> {
        self.values.get(output).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(name, value)| (name.as_str(), *value))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
