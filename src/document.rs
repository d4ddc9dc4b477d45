//! Line-groups a FIS document is made of.
//!
//! A loader hands the builder a [`Document`]: the header section, one
//! section per input and output variable in index order, and the rule lines.
//! [`Document::parse`] produces one from MATLAB-style `.fis` text.

use std::collections::BTreeMap;

use crate::error::FormatError;

/// One meaningful document line and its 1-based line number
#[derive(Clone, Debug, PartialEq)]
pub struct Line {
    pub number: usize,
    pub text: String,
}

impl Line {
    pub fn new(number: usize, text: impl Into<String>) -> Self {
        Self {
            number,
            text: text.into(),
        }
    }

    /// Splits a `key=value` line, trimming both sides
    pub fn key_value(&self) -> Option<(&str, &str)> {
        self.text
            .split_once('=')
            .map(|(key, value)| (key.trim(), value.trim()))
    }
}

/// A bracketed section and the lines under it
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Section {
    /// Line of the `[Header]` itself
    pub line: usize,
    pub lines: Vec<Line>,
}

impl Section {
    pub fn new(line: usize, lines: Vec<Line>) -> Self {
        Self { line, lines }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Document {
    pub system: Section,
    pub inputs: Vec<Section>,
    pub outputs: Vec<Section>,
    pub rules: Section,
}

enum Target {
    System,
    Input(usize),
    Output(usize),
    Rules,
}

impl Document {
    /// Splits `.fis` text into sections. Blank lines and lines starting with
    /// `%` or `#` are skipped.
    pub fn parse(text: &str) -> Result<Self, FormatError> {
        let mut system: Option<Section> = None;
        let mut inputs = BTreeMap::new();
        let mut outputs = BTreeMap::new();
        let mut rules: Option<Section> = None;
        let mut current: Option<Target> = None;

        for (i, raw) in text.lines().enumerate() {
            let number = i + 1;
            let trimmed = raw.trim();

            if trimmed.is_empty() || trimmed.starts_with('%') || trimmed.starts_with('#') {
                continue;
            }

            if let Some(header) = trimmed.strip_prefix('[').and_then(|t| t.strip_suffix(']')) {
                let target = parse_header(number, header.trim())?;
                let duplicate = match target {
                    Target::System => system.replace(Section::new(number, Vec::new())).is_some(),
                    Target::Rules => rules.replace(Section::new(number, Vec::new())).is_some(),
                    Target::Input(idx) => inputs.insert(idx, Section::new(number, Vec::new())).is_some(),
                    Target::Output(idx) => outputs.insert(idx, Section::new(number, Vec::new())).is_some(),
                };

                if duplicate {
                    return Err(FormatError::malformed(number, format!("duplicate section [{}]", header.trim())));
                }

                current = Some(target);
                continue;
            }

            let line = Line::new(number, trimmed);
            let section = match current {
                Some(Target::System) => system.as_mut(),
                Some(Target::Rules) => rules.as_mut(),
                Some(Target::Input(idx)) => inputs.get_mut(&idx),
                Some(Target::Output(idx)) => outputs.get_mut(&idx),
                None => None,
            };

            match section {
                Some(section) => section.lines.push(line),
                None => return Err(FormatError::malformed(number, "line appears before any section header")),
            }
        }

        let system = system.ok_or(FormatError::MissingKey {
            line: 1,
            key: "[System]",
        })?;

        Ok(Document {
            system,
            inputs: contiguous("Input", inputs)?,
            outputs: contiguous("Output", outputs)?,
            rules: rules.unwrap_or_default(),
        })
    }
}

fn parse_header(line: usize, header: &str) -> Result<Target, FormatError> {
    let indexed = |prefix: &str| {
        header
            .strip_prefix(prefix)
            .and_then(|idx| idx.parse::<usize>().ok())
            .filter(|idx| *idx > 0)
    };

    match header {
        "System" => Ok(Target::System),
        "Rules" => Ok(Target::Rules),
        _ => {
            if let Some(idx) = indexed("Input") {
                Ok(Target::Input(idx))
            } else if let Some(idx) = indexed("Output") {
                Ok(Target::Output(idx))
            } else {
                Err(FormatError::malformed(line, format!("unrecognized section [{header}]")))
            }
        },
    }
}

/// Checks that section indices run 1..=N without gaps
fn contiguous(kind: &str, sections: BTreeMap<usize, Section>) -> Result<Vec<Section>, FormatError> {
    for (expected, (idx, section)) in (1..).zip(&sections) {
        if *idx != expected {
            return Err(FormatError::malformed(
                section.line,
                format!("[{kind}{idx}] found but [{kind}{expected}] is missing"),
            ));
        }
    }

    Ok(sections.into_values().collect())
}
