use indexmap::IndexMap;
use tracing::{debug, trace};

use crate::error::EvaluationError;
use crate::inputs::Inputs;
use crate::ops::SystemType;
use crate::outputs::Outputs;
use crate::system::System;

/// An executor turning one set of crisp inputs into a crisp output value.
///
/// Executors share the [`System`] model and are selected by its type tag.
pub trait Inference {
    fn evaluate(&self, system: &System, inputs: &Inputs, output: &str) -> Result<f64, EvaluationError>;
}

/// Zero-order and first-order Sugeno inference: the weighted average of
/// each rule's linear consequent, weighted by firing strength times rule
/// weight.
#[derive(Clone, Copy, Debug, Default)]
pub struct SugenoInference;

impl SugenoInference {
    /// Firing strength of every rule that contributes to `output`, paired
    /// with its position in the rule list.
    pub fn firing_strengths(
        &self,
        system: &System,
        inputs: &Inputs,
        output: &str,
    ) -> Result<Vec<(usize, f64)>, EvaluationError> {
        system
            .rules()
            .iter()
            .enumerate()
            .filter(|(_, rule)| rule.output_for(output).is_some())
            .map(|(i, rule)| -> Result<_, EvaluationError> {
                let premise = rule.premise().ok_or(EvaluationError::EmptyAntecedent { rule: i + 1 })?;
                let w = premise.eval(system.and_op(), system.or_op(), &mut |var: &str, mf: &str| {
                    antecedent_degree(system, inputs, var, mf)
                })?;

                trace!(rule = i + 1, terms = ?premise.propositions(), w, "premise evaluated");

                Ok((i, w))
            })
            .collect()
    }
}

impl Inference for SugenoInference {
    fn evaluate(&self, system: &System, inputs: &Inputs, output: &str) -> Result<f64, EvaluationError> {
        let output_var = system
            .output(output)
            .ok_or_else(|| EvaluationError::UnknownOutput(output.to_owned()))?;
        let rules = system.rules();
        let mut num = 0.;
        let mut den = 0.;

        for (i, w) in self.firing_strengths(system, inputs, output)? {
            let rule = &rules[i];
            let Some(consequent) = rule.output_for(output) else {
                continue;
            };
            let mf = output_var.mf(&consequent.mf).ok_or_else(|| EvaluationError::NotFound {
                variable: output.to_owned(),
                mf: consequent.mf.clone(),
            })?;
            let z = mf.linear_value(inputs).ok_or_else(|| EvaluationError::ShapeMismatch {
                variable: output.to_owned(),
                mf: consequent.mf.clone(),
                expected: "linear consequent",
            })??;
            let weighted = w * rule.weight();

            trace!(rule = i + 1, w, weight = rule.weight(), z, "rule evaluated");

            // Rules that did not fire stay out of both sums
            if weighted > 0. {
                num += weighted * z;
                den += weighted;
            }
        }

        if den == 0. {
            debug!(system = system.name(), output, "no rule fired");

            return Err(EvaluationError::NoRuleFired {
                output: output.to_owned(),
            });
        }

        Ok(num / den)
    }
}

fn antecedent_degree(system: &System, inputs: &Inputs, var: &str, mf: &str) -> Result<f64, EvaluationError> {
    let variable = system
        .input(var)
        .ok_or_else(|| EvaluationError::UnknownVariable(var.to_owned()))?;
    let function = variable.mf(mf).ok_or_else(|| EvaluationError::NotFound {
        variable: var.to_owned(),
        mf: mf.to_owned(),
    })?;
    let x = inputs.finite(var)?;

    function.degree(x).ok_or_else(|| EvaluationError::ShapeMismatch {
        variable: var.to_owned(),
        mf: mf.to_owned(),
        expected: "membership curve",
    })
}

/// Evaluates `output` with the executor matching the system's type.
///
/// Mamdani systems belong to an external executor and are rejected here.
pub fn evaluate(system: &System, inputs: &Inputs, output: &str) -> Result<f64, EvaluationError> {
    match system.system_type() {
        SystemType::Sugeno => SugenoInference.evaluate(system, inputs, output),
        other => Err(EvaluationError::UnsupportedSystemType(other)),
    }
}

/// Evaluates every output variable in declaration order
pub fn evaluate_all(system: &System, inputs: &Inputs) -> Result<Outputs, EvaluationError> {
    let mut values = IndexMap::new();

    for var in system.outputs() {
        values.insert(var.name().to_owned(), evaluate(system, inputs, var.name())?);
    }

    Ok(Outputs::new(values))
}
