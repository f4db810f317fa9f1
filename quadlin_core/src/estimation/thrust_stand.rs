// quadlin_core/src/estimation/thrust_stand.rs

use crate::error::EstimationError;
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

/// The on-disk shape of a thrust-stand recording.
///
/// `thrusts[i]` is a command level as a fraction of maximum rotor speed and
/// `grams[i]` holds the masses measured for it, one entry per repeated trial.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ThrustStandRecord {
    pub thrusts: Vec<f64>,
    pub grams: Vec<Vec<f64>>,
}

/// Command levels and measured masses, validated to be rectangular.
#[derive(Debug, Clone, PartialEq)]
pub struct ThrustStandData {
    /// M command fractions in [0, 1].
    pub thrusts: DVector<f64>,
    /// M x T measured total masses in grams, one column per trial.
    pub grams: DMatrix<f64>,
}

impl ThrustStandData {
    pub fn new(thrusts: DVector<f64>, grams: DMatrix<f64>) -> Self {
        Self { thrusts, grams }
    }

    pub fn len(&self) -> usize {
        self.thrusts.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.thrusts.is_empty()
    }

    pub fn trials(&self) -> usize {
        self.grams.ncols()
    }
}

impl TryFrom<ThrustStandRecord> for ThrustStandData {
    type Error = EstimationError;

    fn try_from(record: ThrustStandRecord) -> Result<Self, Self::Error> {
        let trials = record.grams.first().map_or(0, Vec::len);
        for (row, values) in record.grams.iter().enumerate() {
            if values.len() != trials {
                return Err(EstimationError::RaggedRow {
                    row,
                    expected: trials,
                    found: values.len(),
                });
            }
        }

        let rows = record.grams.len();
        let grams = DMatrix::from_fn(rows, trials, |i, j| record.grams[i][j]);
        Ok(Self {
            thrusts: DVector::from_vec(record.thrusts),
            grams,
        })
    }
}

impl From<&ThrustStandData> for ThrustStandRecord {
    fn from(data: &ThrustStandData) -> Self {
        Self {
            thrusts: data.thrusts.iter().copied().collect(),
            grams: data
                .grams
                .row_iter()
                .map(|row| row.iter().copied().collect())
                .collect(),
        }
    }
}
