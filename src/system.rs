use std::str::FromStr;

use indexmap::IndexMap;
use tracing::{debug, trace};

use crate::document::{Document, Line, Section};
use crate::error::{BuildError, FormatError, ValidationError};
use crate::membership::MembershipFunction;
use crate::ops::{AndOp, DefuzzMethod, OrOp, SystemType};
use crate::rules::Rule;
use crate::variable::Variable;

/// A parsed, validated fuzzy inference system.
///
/// Built once from a [`Document`] and read-only afterwards, so a single
/// `System` can be shared across any number of concurrent evaluations.
/// Variable order is declaration order; a variable's 1-based position is
/// its index.
#[derive(Clone, Debug, PartialEq)]
pub struct System {
    name: String,
    system_type: SystemType,
    and_op: AndOp,
    or_op: OrOp,
    defuzz_method: DefuzzMethod,
    inputs: IndexMap<String, Variable>,
    outputs: IndexMap<String, Variable>,
    rules: Vec<Rule>,
}

impl System {
    pub fn from_document(doc: &Document) -> Result<Self, BuildError> {
        let header = Header::new(&doc.system)?;
        let name = header.string("Name")?;
        let system_type = {
            let (value, line) = header.required("Type")?;
            SystemType::from_name(unquote(value)).ok_or_else(|| FormatError::UnknownSystemType {
                line,
                value: value.to_owned(),
            })?
        };
        let and_op = header.method("AndMethod", AndOp::from_name)?.unwrap_or_default();
        let or_op = header.method("OrMethod", OrOp::from_name)?.unwrap_or_default();
        let defuzz_method = header
            .method("DefuzzMethod", DefuzzMethod::from_name)?
            .unwrap_or_default();

        header.count("NumInputs", "input sections", doc.inputs.len())?;
        header.count("NumOutputs", "output sections", doc.outputs.len())?;
        header.count("NumRules", "rules", doc.rules.lines.len())?;

        let mut inputs = IndexMap::with_capacity(doc.inputs.len());

        for section in &doc.inputs {
            let var = build_variable(section, Role::Input, &[])?;
            insert_unique(&mut inputs, var, section.line)?;
        }

        let input_names: Vec<&str> = inputs.keys().map(String::as_str).collect();
        let output_role = match system_type {
            SystemType::Sugeno => Role::SugenoOutput,
            SystemType::Mamdani => Role::MamdaniOutput,
        };
        let mut outputs = IndexMap::with_capacity(doc.outputs.len());

        for section in &doc.outputs {
            let var = build_variable(section, output_role, &input_names)?;
            insert_unique(&mut outputs, var, section.line)?;
        }

        let input_vars: Vec<&Variable> = inputs.values().collect();
        let output_vars: Vec<&Variable> = outputs.values().collect();
        let rules = doc
            .rules
            .lines
            .iter()
            .map(|line| Rule::parse(line, &input_vars, &output_vars))
            .collect::<Result<Vec<_>, _>>()?;

        debug!(
            system = %name,
            kind = %system_type,
            inputs = inputs.len(),
            outputs = outputs.len(),
            rules = rules.len(),
            "built fuzzy inference system"
        );

        Ok(System {
            name,
            system_type,
            and_op,
            or_op,
            defuzz_method,
            inputs,
            outputs,
            rules,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn system_type(&self) -> SystemType {
        self.system_type
    }

    pub fn and_op(&self) -> AndOp {
        self.and_op
    }

    pub fn or_op(&self) -> OrOp {
        self.or_op
    }

    pub fn defuzz_method(&self) -> DefuzzMethod {
        self.defuzz_method
    }

    pub fn input(&self, name: &str) -> Option<&Variable> {
        self.inputs.get(name)
    }

    pub fn output(&self, name: &str) -> Option<&Variable> {
        self.outputs.get(name)
    }

    /// Input or output variable by name, inputs first
    pub fn variable(&self, name: &str) -> Option<&Variable> {
        self.input(name).or_else(|| self.output(name))
    }

    /// Input variable by 1-based index
    pub fn input_by_index(&self, index: usize) -> Option<&Variable> {
        self.inputs.get_index(index.checked_sub(1)?).map(|(_, var)| var)
    }

    /// Output variable by 1-based index
    pub fn output_by_index(&self, index: usize) -> Option<&Variable> {
        self.outputs.get_index(index.checked_sub(1)?).map(|(_, var)| var)
    }

    pub fn inputs(&self) -> impl Iterator<Item = &Variable> {
        self.inputs.values()
    }

    pub fn outputs(&self) -> impl Iterator<Item = &Variable> {
        self.outputs.values()
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }
}

impl FromStr for System {
    type Err = BuildError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        System::from_document(&Document::parse(text)?)
    }
}

/// `key=value` lines of one section; each key appears at most once
struct Header<'d> {
    line: usize,
    values: IndexMap<&'d str, (&'d str, usize)>,
}

impl<'d> Header<'d> {
    fn new(section: &'d Section) -> Result<Self, FormatError> {
        let pairs = section
            .lines
            .iter()
            .map(|line| {
                line.key_value()
                    .map(|(key, value)| (key, value, line.number))
                    .ok_or_else(|| FormatError::malformed(line.number, "expected `key=value`"))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Self::from_pairs(section.line, pairs)
    }

    fn from_pairs(
        line: usize,
        pairs: impl IntoIterator<Item = (&'d str, &'d str, usize)>,
    ) -> Result<Self, FormatError> {
        let mut values = IndexMap::new();

        for (key, value, number) in pairs {
            if let Some(&(_, first)) = values.get(key) {
                return Err(FormatError::malformed(
                    number,
                    format!("duplicate key `{key}`, already set on line {first}"),
                ));
            }

            values.insert(key, (value, number));
        }

        Ok(Self { line, values })
    }

    fn required(&self, key: &'static str) -> Result<(&'d str, usize), FormatError> {
        self.values
            .get(key)
            .copied()
            .ok_or(FormatError::MissingKey { line: self.line, key })
    }

    fn string(&self, key: &'static str) -> Result<String, FormatError> {
        self.required(key).map(|(value, _)| unquote(value).to_owned())
    }

    fn parse_count(&self, key: &'static str) -> Result<(usize, usize), FormatError> {
        let (value, line) = self.required(key)?;
        let parsed = value
            .parse()
            .map_err(|_| FormatError::malformed(line, format!("{key} `{value}` is not a count")))?;

        Ok((parsed, line))
    }

    fn count(&self, key: &'static str, what: &'static str, found: usize) -> Result<(), FormatError> {
        let (expected, line) = self.parse_count(key)?;

        if expected != found {
            return Err(FormatError::CountMismatch {
                line,
                what,
                expected,
                found,
            });
        }

        Ok(())
    }

    fn method<M>(&self, key: &'static str, from_name: fn(&str) -> Option<M>) -> Result<Option<M>, FormatError> {
        let Some(&(value, line)) = self.values.get(key) else {
            return Ok(None);
        };

        from_name(unquote(value)).map(Some).ok_or_else(|| FormatError::UnknownMethod {
            line,
            key,
            value: value.to_owned(),
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Role {
    Input,
    SugenoOutput,
    MamdaniOutput,
}

fn build_variable(section: &Section, role: Role, input_names: &[&str]) -> Result<Variable, BuildError> {
    let mut props = Vec::with_capacity(3);
    let mut mf_lines = Vec::new();

    for line in &section.lines {
        let (key, value) = line
            .key_value()
            .ok_or_else(|| FormatError::malformed(line.number, "expected `key=value`"))?;

        match key.strip_prefix("MF") {
            Some(idx) if !idx.is_empty() && idx.bytes().all(|b| b.is_ascii_digit()) => {
                mf_lines.push((idx, value, line));
            },
            _ => props.push((key, value, line.number)),
        }
    }

    let header = Header::from_pairs(section.line, props)?;
    let name = header.string("Name")?;
    let (range_text, range_line) = header.required("Range")?;
    let (min, max) = parse_range(range_line, range_text)?;
    let (num_mfs, num_mfs_line) = header.parse_count("NumMFs")?;

    if mf_lines.len() != num_mfs {
        return Err(FormatError::CountMismatch {
            line: num_mfs_line,
            what: "membership functions",
            expected: num_mfs,
            found: mf_lines.len(),
        }
        .into());
    }

    let mut var = Variable::new(name, min..=max, num_mfs).map_err(|source| BuildError::Validation {
        line: range_line,
        source,
    })?;

    for (position, (idx, value, line)) in (1..).zip(mf_lines) {
        if idx.parse::<usize>().ok() != Some(position) {
            return Err(FormatError::malformed(
                line.number,
                format!("expected MF{position}, found MF{idx}"),
            )
            .into());
        }

        let (label, mf) = parse_mf(line, value, role, input_names)?;

        trace!(variable = var.name(), mf = %label, shape = mf.shape_name(), "membership function");

        var.add_mf(label, mf).map_err(|source| BuildError::Validation {
            line: line.number,
            source,
        })?;
    }

    Ok(var)
}

fn insert_unique(vars: &mut IndexMap<String, Variable>, var: Variable, line: usize) -> Result<(), BuildError> {
    if vars.contains_key(var.name()) {
        return Err(BuildError::Validation {
            line,
            source: ValidationError::DuplicateName {
                what: "variable",
                name: var.name().to_owned(),
            },
        });
    }

    vars.insert(var.name().to_owned(), var);

    Ok(())
}

fn unquote(value: &str) -> &str {
    let value = value.trim();

    value
        .strip_prefix('\'')
        .and_then(|v| v.strip_suffix('\''))
        .unwrap_or(value)
}

fn parse_numbers(line: usize, text: &str) -> Result<Vec<f64>, FormatError> {
    let inner = text
        .trim()
        .strip_prefix('[')
        .and_then(|t| t.strip_suffix(']'))
        .ok_or_else(|| FormatError::malformed(line, format!("expected `[...]`, found `{text}`")))?;

    inner
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|token| !token.is_empty())
        .map(|token| {
            token
                .parse()
                .map_err(|_| FormatError::malformed(line, format!("`{token}` is not a number")))
        })
        .collect()
}

fn parse_range(line: usize, text: &str) -> Result<(f64, f64), FormatError> {
    let numbers = parse_numbers(line, text)?;

    match numbers.as_slice() {
        &[min, max] => Ok((min, max)),
        other => Err(FormatError::CountMismatch {
            line,
            what: "range bounds",
            expected: 2,
            found: other.len(),
        }),
    }
}

/// Parses `'label':'shape',[params...]`
fn parse_mf(
    line: &Line,
    value: &str,
    role: Role,
    input_names: &[&str],
) -> Result<(String, MembershipFunction), BuildError> {
    let n = line.number;
    let (label, rest) = value
        .split_once(':')
        .ok_or_else(|| FormatError::malformed(n, "expected `'label':'shape',[params]`"))?;
    let (shape, params) = rest
        .split_once(',')
        .ok_or_else(|| FormatError::malformed(n, "expected `'shape',[params]`"))?;
    let label = unquote(label).to_owned();
    let shape = unquote(shape);
    let params = parse_numbers(n, params)?;

    let arity = match shape {
        "trimf" => 3,
        "trapmf" | "gauss2mf" => 4,
        "gaussmf" => 2,
        "linear" => input_names.len() + 1,
        "constant" => 1,
        _ => {
            return Err(FormatError::UnknownShape {
                line: n,
                shape: shape.to_owned(),
            }
            .into())
        },
    };

    let consequent = matches!(shape, "linear" | "constant");
    let allowed = match role {
        Role::Input | Role::MamdaniOutput => !consequent,
        Role::SugenoOutput => consequent,
    };

    if !allowed {
        let role = match role {
            Role::Input => "input variables",
            Role::SugenoOutput => "sugeno outputs",
            Role::MamdaniOutput => "mamdani outputs",
        };

        return Err(BuildError::Validation {
            line: n,
            source: ValidationError::MisplacedShape {
                shape: shape.to_owned(),
                role,
            },
        });
    }

    if params.len() != arity {
        return Err(FormatError::Arity {
            line: n,
            shape: shape.to_owned(),
            expected: arity,
            found: params.len(),
        }
        .into());
    }

    let mf = match (shape, &params[..]) {
        ("trimf", &[a, b, c]) => MembershipFunction::triangular(a, b, c),
        ("trapmf", &[a, b, c, d]) => MembershipFunction::trapezoidal(a, b, c, d),
        ("gaussmf", &[sigma, mean]) => MembershipFunction::gaussian(mean, sigma),
        ("gauss2mf", &[sigma1, mean1, sigma2, mean2]) => {
            MembershipFunction::double_gaussian(mean1, sigma1, mean2, sigma2)
        },
        ("constant", &[value]) => Ok(MembershipFunction::constant(value, input_names)),
        ("linear", [coefficients @ .., constant]) => {
            let coefficients = input_names
                .iter()
                .map(|name| (*name).to_owned())
                .zip(coefficients.iter().copied())
                .collect();

            MembershipFunction::linear(coefficients, *constant, input_names)
        },
        _ => {
            return Err(FormatError::Arity {
                line: n,
                shape: shape.to_owned(),
                expected: arity,
                found: params.len(),
            }
            .into())
        },
    };

    let mf = mf.map_err(|source| BuildError::Validation { line: n, source })?;

    Ok((label, mf))
}

#[cfg(test)]
mod tests {
    use super::*;

    const FACIES: &str = "\
[System]
Name='facies'
Type='sugeno'
NumInputs=2
NumOutputs=1
NumRules=2
AndMethod='prod'
OrMethod='probor'
DefuzzMethod='wtaver'

[Input1]
Name='depth'
Range=[0 100]
NumMFs=2
MF1='shallow':'trapmf',[0 0 20 60]
MF2='deep':'gaussmf',[15 80]

[Input2]
Name='slope'
Range=[0 1]
NumMFs=1
MF1='steep':'gauss2mf',[0.1 0.6 0.1 0.8]

[Output1]
Name='score'
Range=[0 10]
NumMFs=2
MF1='sand':'linear',[0.05 2 1]
MF2='shale':'constant',[8]

[Rules]
1 0, 1 (1) : 1
2 -1, 2 (0.5) : 2
";

    fn replace(from: &str, to: &str) -> String {
        assert!(FACIES.contains(from));
        FACIES.replace(from, to)
    }

    #[test]
    fn test_build_system() {
        let system: System = FACIES.parse().unwrap();

        assert_eq!(system.name(), "facies");
        assert_eq!(system.system_type(), SystemType::Sugeno);
        assert_eq!(system.and_op(), AndOp::Prod);
        assert_eq!(system.or_op(), OrOp::ProbOr);
        assert_eq!(system.defuzz_method(), DefuzzMethod::WtAver);
        assert_eq!(system.input_by_index(2).map(Variable::name), Some("slope"));
        assert_eq!(system.output_by_index(1).map(Variable::name), Some("score"));
        assert_eq!(system.input_by_index(0), None);
        assert_eq!(system.rules().len(), 2);

        let depth = system.input("depth").unwrap();
        assert_eq!(depth.range(), &(0. ..=100.));
        assert_eq!(
            depth.mf("deep"),
            Some(&MembershipFunction::Gaussian { mean: 80., sigma: 15. })
        );
        assert_eq!(
            system.input("slope").unwrap().mf("steep"),
            Some(&MembershipFunction::DoubleGaussian {
                mean1: 0.6,
                sigma1: 0.1,
                mean2: 0.8,
                sigma2: 0.1
            })
        );

        let score = system.variable("score").unwrap();
        let MembershipFunction::Linear {
            coefficients,
            constant,
        } = score.mf("sand").unwrap()
        else {
            panic!("expected linear consequent");
        };
        assert_eq!(coefficients.get("depth"), Some(&0.05));
        assert_eq!(coefficients.get("slope"), Some(&2.));
        assert_eq!(*constant, 1.);
    }

    #[test]
    fn test_header_defaults() {
        let text = replace("AndMethod='prod'\nOrMethod='probor'\nDefuzzMethod='wtaver'\n", "");
        let system: System = text.parse().unwrap();

        assert_eq!(system.and_op(), AndOp::Min);
        assert_eq!(system.or_op(), OrOp::Max);
        assert_eq!(system.defuzz_method(), DefuzzMethod::WtAver);
    }

    #[test]
    fn test_rejects_mf_count_mismatch() {
        let text = replace("NumMFs=1\n", "NumMFs=1\nMF2='gentle':'trimf',[0 0 0.5]\n");
        let err = text.parse::<System>().unwrap_err();

        assert_eq!(
            err,
            BuildError::Format(FormatError::CountMismatch {
                line: 21,
                what: "membership functions",
                expected: 1,
                found: 2
            })
        );
    }

    #[test]
    fn test_rejects_header_count_mismatch() {
        let err = replace("NumRules=2", "NumRules=3").parse::<System>().unwrap_err();
        assert_eq!(
            err,
            BuildError::Format(FormatError::CountMismatch {
                line: 6,
                what: "rules",
                expected: 3,
                found: 2
            })
        );

        let err = replace("NumInputs=2", "NumInputs=1").parse::<System>().unwrap_err();
        assert!(matches!(
            err,
            BuildError::Format(FormatError::CountMismatch {
                what: "input sections",
                ..
            })
        ));
    }

    #[test]
    fn test_rejects_bad_shapes() {
        let err = replace("'trapmf',[0 0 20 60]", "'sigmf',[1 2]")
            .parse::<System>()
            .unwrap_err();
        assert_eq!(
            err,
            BuildError::Format(FormatError::UnknownShape {
                line: 15,
                shape: "sigmf".into()
            })
        );

        let err = replace("'trapmf',[0 0 20 60]", "'trapmf',[0 20 60]")
            .parse::<System>()
            .unwrap_err();
        assert!(matches!(
            err,
            BuildError::Format(FormatError::Arity {
                expected: 4,
                found: 3,
                ..
            })
        ));

        let err = replace("'linear',[0.05 2 1]", "'linear',[0.05 1]")
            .parse::<System>()
            .unwrap_err();
        assert!(matches!(
            err,
            BuildError::Format(FormatError::Arity {
                expected: 3,
                found: 2,
                ..
            })
        ));
    }

    #[test]
    fn test_rejects_invalid_parameters() {
        let err = replace("[0 0 20 60]", "[0 30 20 60]").parse::<System>().unwrap_err();
        assert_eq!(err.line(), 15);
        assert!(matches!(
            err,
            BuildError::Validation {
                source: ValidationError::NonAscending { .. },
                ..
            }
        ));

        let err = replace("[15 80]", "[0 80]").parse::<System>().unwrap_err();
        assert!(matches!(
            err,
            BuildError::Validation {
                source: ValidationError::NonPositiveSigma { .. },
                ..
            }
        ));

        let err = replace("'trapmf',[0 0 20 60]", "'constant',[3]")
            .parse::<System>()
            .unwrap_err();
        assert!(matches!(
            err,
            BuildError::Validation {
                source: ValidationError::MisplacedShape { .. },
                ..
            }
        ));

        // Placement is checked before arity
        let err = replace("'trapmf',[0 0 20 60]", "'linear',[1 2 3]")
            .parse::<System>()
            .unwrap_err();
        assert_eq!(
            err,
            BuildError::Validation {
                line: 15,
                source: ValidationError::MisplacedShape {
                    shape: "linear".into(),
                    role: "input variables"
                }
            }
        );

        let err = replace("Name='slope'", "Name='depth'").parse::<System>().unwrap_err();
        assert!(matches!(
            err,
            BuildError::Validation {
                source: ValidationError::DuplicateName { what: "variable", .. },
                ..
            }
        ));
    }

    #[test]
    fn test_rejects_repeated_keys() {
        let err = replace("NumRules=2\n", "NumRules=2\nNumRules=7\n")
            .parse::<System>()
            .unwrap_err();
        assert!(matches!(err, BuildError::Format(FormatError::Malformed { line: 7, .. })));

        let err = replace("Range=[0 100]\n", "Range=[0 100]\nRange=[0 50]\n")
            .parse::<System>()
            .unwrap_err();
        assert!(matches!(err, BuildError::Format(FormatError::Malformed { line: 14, .. })));
    }

    #[test]
    fn test_rejects_bad_header_values() {
        let err = replace("Type='sugeno'", "Type='tsukamoto'").parse::<System>().unwrap_err();
        assert!(matches!(err, BuildError::Format(FormatError::UnknownSystemType { line: 3, .. })));

        let err = replace("OrMethod='probor'", "OrMethod='sum'").parse::<System>().unwrap_err();
        assert!(matches!(
            err,
            BuildError::Format(FormatError::UnknownMethod { key: "OrMethod", .. })
        ));

        let err = replace("Name='facies'\n", "").parse::<System>().unwrap_err();
        assert_eq!(
            err,
            BuildError::Format(FormatError::MissingKey {
                line: 1,
                key: "Name"
            })
        );
    }

    #[test]
    fn test_rule_errors_abort_build() {
        let err = replace("2 -1, 2 (0.5) : 2", "3 -1, 2 (0.5) : 2")
            .parse::<System>()
            .unwrap_err();

        assert!(matches!(
            err,
            BuildError::Format(FormatError::IndexOutOfRange { line: 33, index: 3, .. })
        ));
    }
}
