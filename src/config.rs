use serde::de::{Error as _, Unexpected};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::warn;

/// What a batch run does with a cell whose evaluation fails
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellFailure {
    /// Keep the cell's error in the output grid and evaluate the rest
    #[default]
    Mark,
    /// Fail the whole batch with the first error in row-major order
    Propagate,
}

impl CellFailure {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "mark" => Some(Self::Mark),
            "propagate" => Some(Self::Propagate),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchOptions {
    /// Worker threads, at least one; `None` uses the global rayon pool
    #[serde(deserialize_with = "thread_count")]
    pub threads: Option<usize>,
    pub on_error: CellFailure,
}

impl BatchOptions {
    pub const THREADS_VAR: &'static str = "FIS_BATCH_THREADS";
    pub const ON_ERROR_VAR: &'static str = "FIS_BATCH_ON_ERROR";

    /// Defaults overlaid with `FIS_BATCH_THREADS` and `FIS_BATCH_ON_ERROR`
    pub fn from_env() -> Self {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    fn with_overrides(mut self, var: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(threads) = var(Self::THREADS_VAR) {
            match threads.trim().parse::<usize>() {
                Ok(n) if n > 0 => self.threads = Some(n),
                _ => warn!(var = Self::THREADS_VAR, value = %threads, "ignoring invalid thread count"),
            }
        }

        if let Some(on_error) = var(Self::ON_ERROR_VAR) {
            match CellFailure::from_name(on_error.trim()) {
                Some(policy) => self.on_error = policy,
                None => warn!(var = Self::ON_ERROR_VAR, value = %on_error, "ignoring unknown failure policy"),
            }
        }

        self
    }
}

fn thread_count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<usize>, D::Error> {
    match Option::<usize>::deserialize(deserializer)? {
        Some(0) => Err(D::Error::invalid_value(Unexpected::Unsigned(0), &"a positive thread count")),
        threads => Ok(threads),
    }
}
