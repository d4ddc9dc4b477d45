use std::ops::RangeInclusive;

use indexmap::IndexMap;

use crate::error::ValidationError;
use crate::membership::MembershipFunction;

/// An input or output variable and its membership functions.
///
/// Membership function order is declaration order, and defines the 1-based
/// indices used by compact rule lines.
#[derive(Clone, Debug, PartialEq)]
pub struct Variable {
    name: String,
    range: RangeInclusive<f64>,
    num_mfs: usize,
    mfs: IndexMap<String, MembershipFunction>,
}

impl Variable {
    pub(crate) fn new(name: String, range: RangeInclusive<f64>, num_mfs: usize) -> Result<Self, ValidationError> {
        // Negated so NaN bounds are rejected too
        if !(range.start() <= range.end()) {
            return Err(ValidationError::InvertedRange {
                min: *range.start(),
                max: *range.end(),
            });
        }

        Ok(Self {
            name,
            range,
            num_mfs,
            mfs: IndexMap::with_capacity(num_mfs),
        })
    }

    pub(crate) fn add_mf(&mut self, name: String, mf: MembershipFunction) -> Result<(), ValidationError> {
        if self.mfs.contains_key(&name) {
            return Err(ValidationError::DuplicateName {
                what: "membership function",
                name,
            });
        }

        self.mfs.insert(name, mf);

        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn range(&self) -> &RangeInclusive<f64> {
        &self.range
    }

    pub fn num_mfs(&self) -> usize {
        self.num_mfs
    }

    pub fn mf(&self, name: &str) -> Option<&MembershipFunction> {
        self.mfs.get(name)
    }

    /// Looks up a membership function by its 1-based declaration index
    pub fn mf_by_index(&self, index: usize) -> Option<(&str, &MembershipFunction)> {
        let i = index.checked_sub(1)?;

        self.mfs.get_index(i).map(|(name, mf)| (name.as_str(), mf))
    }

    pub fn mfs(&self) -> impl Iterator<Item = (&str, &MembershipFunction)> {
        self.mfs.iter().map(|(name, mf)| (name.as_str(), mf))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mf_lookup_by_index() {
        let mut var = Variable::new("depth".into(), 0. ..=100., 2).unwrap();

        var.add_mf("shallow".into(), MembershipFunction::triangular(0., 0., 50.).unwrap())
            .unwrap();
        var.add_mf("deep".into(), MembershipFunction::triangular(50., 100., 100.).unwrap())
            .unwrap();

        assert_eq!(var.mf_by_index(0), None);
        assert_eq!(var.mf_by_index(2).map(|(name, _)| name), Some("deep"));
        assert_eq!(var.mf_by_index(3), None);
        assert!(var.mf("shallow").is_some());
        assert_eq!(var.mfs().count(), var.num_mfs());
    }

    #[test]
    fn test_rejects_duplicates_and_inverted_range() {
        let mut var = Variable::new("depth".into(), 0. ..=1., 2).unwrap();
        let mf = MembershipFunction::gaussian(0.5, 0.1).unwrap();

        var.add_mf("mid".into(), mf.clone()).unwrap();

        assert_eq!(
            var.add_mf("mid".into(), mf),
            Err(ValidationError::DuplicateName {
                what: "membership function",
                name: "mid".into()
            })
        );
        assert_eq!(
            Variable::new("slope".into(), 2. ..=1., 1),
            Err(ValidationError::InvertedRange { min: 2., max: 1. })
        );
    }
}
