use crate::ops::{not, AndOp, OrOp};
use crate::rules::{Connective, RuleInput};

/// Antecedent expression tree of a rule, evaluated by direct recursion.
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Is { variable: String, mf: String },
    Not(Box<Expr>),
    And(Vec<Expr>),
    Or(Vec<Expr>),
}

impl Expr {
    pub fn is(variable: impl Into<String>, mf: impl Into<String>) -> Self {
        Expr::Is {
            variable: variable.into(),
            mf: mf.into(),
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> Self {
        Expr::Not(Box::new(self))
    }

    pub fn or(self, rhs: Expr) -> Self {
        Expr::Or(vec![self, rhs])
    }

    pub fn and(self, rhs: Expr) -> Self {
        Expr::And(vec![self, rhs])
    }

    /// Builds the premise of a compact rule: every present term, negated
    /// where flagged, joined by the rule's connective in declaration order.
    /// `None` when the rule has no terms.
    pub fn from_rule_inputs(connective: Connective, inputs: &[RuleInput]) -> Option<Self> {
        if inputs.is_empty() {
            return None;
        }

        let terms = inputs
            .iter()
            .map(|input| {
                let term = Expr::is(&input.variable, &input.mf);

                if input.negated {
                    term.not()
                } else {
                    term
                }
            })
            .collect();

        Some(match connective {
            Connective::And => Expr::And(terms),
            Connective::Or => Expr::Or(terms),
        })
    }

    /// Evaluates the tree, scoring leaves with `degree_of(variable, mf)`.
    ///
    /// Children are folded left to right. An empty `And` is 1 and an empty
    /// `Or` is 0, the identities of their operators.
    pub fn eval<E>(
        &self,
        and_op: AndOp,
        or_op: OrOp,
        degree_of: &mut impl FnMut(&str, &str) -> Result<f64, E>,
    ) -> Result<f64, E> {
        match self {
            Expr::Is { variable, mf } => degree_of(variable.as_str(), mf.as_str()),
            Expr::Not(expr) => Ok(not(expr.eval(and_op, or_op, degree_of)?)),
            Expr::And(exprs) => {
                let degrees = exprs
                    .iter()
                    .map(|expr| expr.eval(and_op, or_op, degree_of))
                    .collect::<Result<Vec<_>, _>>()?;

                Ok(and_op.fold(degrees).unwrap_or(1.))
            },
            Expr::Or(exprs) => {
                let degrees = exprs
                    .iter()
                    .map(|expr| expr.eval(and_op, or_op, degree_of))
                    .collect::<Result<Vec<_>, _>>()?;

                Ok(or_op.fold(degrees).unwrap_or(0.))
            },
        }
    }

    pub fn propositions(&self) -> Vec<(&str, &str)> {
        let mut props = Vec::new();

        fn parse<'p>(expr: &'p Expr, out: &mut Vec<(&'p str, &'p str)>) {
            match expr {
                Expr::Is { variable, mf } => out.push((variable.as_str(), mf.as_str())),
                Expr::Not(expr) => parse(expr, out),
                Expr::And(exprs) | Expr::Or(exprs) => {
                    for expr in exprs {
                        parse(expr, out);
                    }
                },
            }
        }

        parse(self, &mut props);

        props
    }
}
