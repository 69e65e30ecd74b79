//! Labeled training data loaded from CSV.

use std::path::Path;

use tracing::info;

use crate::error::{TrainError, TrainResult};

/// Score columns, in the order they land in `Example::scores`.
pub const SCORE_COLUMNS: [&str; 5] = ["English", "Math", "Science", "History", "Geography"];
/// Column holding the categorical interest feature.
pub const INTEREST_COLUMN: &str = "Interest";
/// Column holding the career label to learn.
pub const TARGET_COLUMN: &str = "career_path";

/// One labeled training example.
#[derive(Debug, Clone, PartialEq)]
pub struct Example {
    /// Subject scores in `SCORE_COLUMNS` order.
    pub scores: [f64; 5],
    pub interest: String,
    pub career: String,
}

/// A parsed training set.
#[derive(Debug, Clone)]
pub struct Dataset {
    examples: Vec<Example>,
}

impl Dataset {
    /// Read and parse a CSV file.
    pub fn load(path: &Path) -> TrainResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let dataset = Self::parse(&contents)?;
        info!("Loaded {} examples from {}", dataset.len(), path.display());
        Ok(dataset)
    }

    /// Parse CSV text.
    ///
    /// The header row names the columns; expected columns may appear in any
    /// order and surplus columns are ignored. Blank lines are skipped.
    /// Error line numbers are 1-based file lines, counting the header.
    pub fn parse(contents: &str) -> TrainResult<Self> {
        let mut lines = contents.lines().enumerate();

        let header = loop {
            match lines.next() {
                Some((_, line)) if !line.trim().is_empty() => break line,
                Some(_) => continue,
                None => return Err(TrainError::Invalid("dataset is empty".to_string())),
            }
        };
        let columns: Vec<&str> = header.split(',').map(str::trim).collect();

        let missing: Vec<&str> = SCORE_COLUMNS
            .iter()
            .copied()
            .chain([INTEREST_COLUMN, TARGET_COLUMN])
            .filter(|name| !columns.contains(name))
            .collect();
        if !missing.is_empty() {
            return Err(TrainError::Invalid(format!(
                "CSV missing expected columns: {}",
                missing.join(", ")
            )));
        }

        let position = |name: &str| -> TrainResult<usize> {
            columns
                .iter()
                .position(|c| *c == name)
                .ok_or_else(|| TrainError::Invalid(format!("CSV missing expected column {name:?}")))
        };
        let mut score_positions = [0usize; 5];
        for (slot, name) in score_positions.iter_mut().zip(SCORE_COLUMNS) {
            *slot = position(name)?;
        }
        let interest_position = position(INTEREST_COLUMN)?;
        let target_position = position(TARGET_COLUMN)?;

        let mut examples = Vec::new();
        for (idx, line) in lines {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let line_no = idx + 1;

            let cells: Vec<&str> = line.split(',').map(str::trim).collect();
            if cells.len() != columns.len() {
                return Err(TrainError::Dataset {
                    line: line_no,
                    message: format!("expected {} fields, got {}", columns.len(), cells.len()),
                });
            }

            let mut scores = [0.0f64; 5];
            for (slot, (name, pos)) in scores
                .iter_mut()
                .zip(SCORE_COLUMNS.iter().zip(score_positions))
            {
                let cell = cells[pos];
                let value: f64 = cell.parse().map_err(|_| TrainError::Dataset {
                    line: line_no,
                    message: format!("column {name:?} is not numeric: {cell:?}"),
                })?;
                if !value.is_finite() {
                    return Err(TrainError::Dataset {
                        line: line_no,
                        message: format!("column {name:?} is not numeric: {cell:?}"),
                    });
                }
                *slot = value;
            }

            let interest = cells[interest_position];
            if interest.is_empty() {
                return Err(TrainError::Dataset {
                    line: line_no,
                    message: format!("column {INTEREST_COLUMN:?} is empty"),
                });
            }
            let career = cells[target_position];
            if career.is_empty() {
                return Err(TrainError::Dataset {
                    line: line_no,
                    message: format!("column {TARGET_COLUMN:?} is empty"),
                });
            }

            examples.push(Example {
                scores,
                interest: interest.to_string(),
                career: career.to_string(),
            });
        }

        if examples.is_empty() {
            return Err(TrainError::Invalid("dataset has no data rows".to_string()));
        }

        Ok(Self { examples })
    }

    pub fn examples(&self) -> &[Example] {
        &self.examples
    }

    pub fn len(&self) -> usize {
        self.examples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.examples.is_empty()
    }
}
