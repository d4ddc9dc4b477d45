//! Evaluation over a 2-D grid of input sets.
//!
//! Rows are spread over a rayon pool. Every worker reads the same `System`
//! and writes only its own rows, so cells are independent of each other.

use rayon::prelude::*;
use tracing::{debug, warn};

use crate::config::{BatchOptions, CellFailure};
use crate::error::{BatchError, EvaluationError};
use crate::inference::evaluate;
use crate::inputs::Inputs;
use crate::system::System;

pub type Cell = Result<f64, EvaluationError>;

/// Evaluates `output` for every cell of `grid`, returning a grid of the
/// same shape.
///
/// With [`CellFailure::Mark`] a failed cell keeps its error and the rest of
/// the grid is still evaluated. With [`CellFailure::Propagate`] the first
/// failed cell in row-major order fails the whole batch.
pub fn evaluate_grid(
    system: &System,
    grid: &[Vec<Inputs>],
    output: &str,
    options: &BatchOptions,
) -> Result<Vec<Vec<Cell>>, BatchError> {
    debug!(
        system = system.name(),
        output,
        rows = grid.len(),
        threads = ?options.threads,
        "evaluating grid"
    );

    let run = || -> Vec<Vec<Cell>> {
        grid.par_iter()
            .map(|row| row.iter().map(|inputs| evaluate(system, inputs, output)).collect())
            .collect()
    };

    let cells = match options.threads {
        Some(threads) => rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .map_err(|e| BatchError::ThreadPool(e.to_string()))?
            .install(run),
        None => run(),
    };

    for (row, values) in cells.iter().enumerate() {
        for (column, cell) in values.iter().enumerate() {
            let Err(source) = cell else {
                continue;
            };

            match options.on_error {
                CellFailure::Propagate => {
                    return Err(BatchError::Cell {
                        row,
                        column,
                        source: source.clone(),
                    })
                },
                CellFailure::Mark => warn!(row, column, error = %source, "cell evaluation failed"),
            }
        }
    }

    Ok(cells)
}
