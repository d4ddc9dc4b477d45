use crate::document::Line;
use crate::dsl::Expr;
use crate::error::FormatError;
use crate::variable::Variable;

/// How the antecedent terms of a rule are combined
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Connective {
    And,
    Or,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RuleInput {
    pub variable: String,
    pub mf: String,
    pub negated: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RuleOutput {
    pub variable: String,
    pub mf: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Rule {
    connective: Connective,
    weight: f64,
    inputs: Vec<RuleInput>,
    outputs: Vec<RuleOutput>,
    premise: Option<Expr>,
}

impl Rule {
    pub fn connective(&self) -> Connective {
        self.connective
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn inputs(&self) -> &[RuleInput] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[RuleOutput] {
        &self.outputs
    }

    /// The antecedent tree, `None` if every antecedent index was zero
    pub fn premise(&self) -> Option<&Expr> {
        self.premise.as_ref()
    }

    /// The consequent this rule gives `output`, if it has one
    pub fn output_for(&self, output: &str) -> Option<&RuleOutput> {
        self.outputs.iter().find(|o| o.variable == output)
    }

    /// Decodes one compact rule line, `a1 .. aN, c1 .. cM (weight) : connective`.
    ///
    /// Each `ai` selects the i-th input's membership function by 1-based
    /// index, 0 meaning absent and a negative index meaning NOT. Each `ci`
    /// selects an output membership function, 0 meaning the rule does not
    /// contribute to that output. The connective is 1 for AND and 2 for OR.
    pub fn parse(line: &Line, inputs: &[&Variable], outputs: &[&Variable]) -> Result<Self, FormatError> {
        let n = line.number;
        let (body, connective) = line
            .text
            .rsplit_once(':')
            .ok_or_else(|| FormatError::malformed(n, "rule is missing `: connective`"))?;
        let connective = match connective.trim() {
            "1" => Connective::And,
            "2" => Connective::Or,
            other => {
                return Err(FormatError::Connective {
                    line: n,
                    found: other.to_owned(),
                })
            },
        };

        let (indices, weight) = body
            .split_once('(')
            .ok_or_else(|| FormatError::malformed(n, "rule is missing `(weight)`"))?;
        let weight = weight
            .trim()
            .strip_suffix(')')
            .ok_or_else(|| FormatError::malformed(n, "unterminated rule weight"))?;
        let weight: f64 = weight
            .trim()
            .parse()
            .map_err(|_| FormatError::malformed(n, format!("rule weight `{}` is not a number", weight.trim())))?;

        if !(weight > 0. && weight <= 1.) {
            return Err(FormatError::Weight { line: n, weight });
        }

        let (antecedents, consequents) = indices
            .split_once(',')
            .ok_or_else(|| FormatError::malformed(n, "rule is missing `,` between antecedents and consequents"))?;
        let antecedents = parse_indices(n, antecedents)?;
        let consequents = parse_indices(n, consequents)?;

        if antecedents.len() != inputs.len() {
            return Err(FormatError::CountMismatch {
                line: n,
                what: "antecedent indices",
                expected: inputs.len(),
                found: antecedents.len(),
            });
        }

        if consequents.len() != outputs.len() {
            return Err(FormatError::CountMismatch {
                line: n,
                what: "consequent indices",
                expected: outputs.len(),
                found: consequents.len(),
            });
        }

        let mut rule_inputs = Vec::with_capacity(inputs.len());

        for (&index, var) in antecedents.iter().zip(inputs) {
            if index == 0 {
                continue;
            }

            rule_inputs.push(RuleInput {
                variable: var.name().to_owned(),
                mf: resolve(n, var, index)?.to_owned(),
                negated: index < 0,
            });
        }

        let mut rule_outputs = Vec::with_capacity(outputs.len());

        for (&index, var) in consequents.iter().zip(outputs) {
            if index == 0 {
                continue;
            }

            if index < 0 {
                return Err(FormatError::NegatedConsequent {
                    line: n,
                    variable: var.name().to_owned(),
                });
            }

            rule_outputs.push(RuleOutput {
                variable: var.name().to_owned(),
                mf: resolve(n, var, index)?.to_owned(),
            });
        }

        if rule_outputs.is_empty() {
            return Err(FormatError::NoConsequent { line: n });
        }

        let premise = Expr::from_rule_inputs(connective, &rule_inputs);

        Ok(Rule {
            connective,
            weight,
            inputs: rule_inputs,
            outputs: rule_outputs,
            premise,
        })
    }
}

fn parse_indices(line: usize, text: &str) -> Result<Vec<i64>, FormatError> {
    text.split_whitespace()
        .map(|token| {
            token
                .parse()
                .map_err(|_| FormatError::malformed(line, format!("rule index `{token}` is not an integer")))
        })
        .collect()
}

fn resolve(line: usize, var: &Variable, index: i64) -> Result<&str, FormatError> {
    let out_of_range = || FormatError::IndexOutOfRange {
        line,
        variable: var.name().to_owned(),
        index,
        num_mfs: var.num_mfs(),
    };
    let magnitude = usize::try_from(index.unsigned_abs()).map_err(|_| out_of_range())?;

    if magnitude > var.num_mfs() {
        return Err(out_of_range());
    }

    var.mf_by_index(magnitude)
        .map(|(name, _)| name)
        .ok_or_else(out_of_range)
}
