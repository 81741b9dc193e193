//! Numeric value consensus across replicate groups.
//!
//! Replicate values never agree exactly; the question is whether they
//! agree within the measurement noise of the dataset. The noise scale is
//! estimated once from all uncensored replicate pairs, then each group is
//! judged against it: pairs must fall within a quarter of the noise scale,
//! larger groups keep the replicate closest to the group's
//! maximum-likelihood mean.

use crate::error::Result;
use crate::relation::{Relation, relation_column, split_measurement_column};
use crate::stats::{Measurement, fit_group_mean};
use crate::table::DataTable;

use super::{GroupResolver, ReplicateGroup, group_by_key};

/// Fraction of the noise scale two replicates may differ by and still
/// count as the same measurement.
const PAIR_AGREEMENT_FRACTION: f64 = 0.25;

/// Tolerance policy for two-replicate groups.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PairTolerance {
    /// Agreement within `0.25 * sigma` of the fitted noise scale.
    NoiseScaled,
    /// Flat tolerance on the absolute difference. Predates the
    /// noise-scaled policy; kept selectable for reproducing old runs, the
    /// two are never combined.
    Fixed(f64),
}

impl Default for PairTolerance {
    fn default() -> Self {
        PairTolerance::NoiseScaled
    }
}

/// Estimate the dataset noise scale from uncensored replicates.
///
/// For every group with at least two exact values, each value's deviation
/// from its group mean is pooled; the estimate is the root-mean-square of
/// the pooled deviations. `None` when no group has two exact values,
/// since then there is no replication to measure noise from.
pub fn estimate_noise<I, G>(groups: I) -> Option<f64>
where
    I: IntoIterator<Item = G>,
    G: AsRef<[f64]>,
{
    let mut pooled_squares = 0.0;
    let mut pooled_count = 0usize;

    for group in groups {
        let values = group.as_ref();
        if values.len() < 2 {
            continue;
        }
        let mean = values.iter().sum::<f64>() / values.len() as f64;
        for v in values {
            let dev = v - mean;
            pooled_squares += dev * dev;
        }
        pooled_count += values.len();
    }

    if pooled_count == 0 {
        None
    } else {
        Some((pooled_squares / pooled_count as f64).sqrt())
    }
}

/// Per-group numeric value resolver.
///
/// Built once per table: the noise scale is fitted at construction and
/// threaded by value into every group decision, never recomputed mid-pass.
pub struct ValueResolver {
    values: Vec<Option<f64>>,
    relations: Vec<Relation>,
    sigma: Option<f64>,
    tolerance: PairTolerance,
}

impl ValueResolver {
    /// Build a resolver over the given value column, estimating the noise
    /// scale from uncensored replicates grouped by `key_col`.
    ///
    /// Without a dedicated relation column, censoring is read from the
    /// value cells themselves (`"<5"`); bare numbers are exact.
    pub fn new(
        table: &DataTable,
        key_col: &str,
        value_col: &str,
        relation_col: Option<&str>,
        tolerance: PairTolerance,
    ) -> Result<Self> {
        let (values, relations) = match relation_col {
            Some(col) => (table.numeric_column(value_col)?, relation_column(table, col)?),
            None => split_measurement_column(table, value_col)?,
        };

        let exact_groups: Vec<Vec<f64>> = group_by_key(table, key_col)?
            .iter()
            .map(|group| {
                group
                    .positions()
                    .iter()
                    .filter(|&&pos| relations[pos] == Relation::Equal)
                    .filter_map(|&pos| values[pos])
                    .collect()
            })
            .collect();
        let sigma = estimate_noise(&exact_groups);

        Ok(Self {
            values,
            relations,
            sigma,
            tolerance,
        })
    }

    /// The fitted noise scale, if the table had replicate pairs to fit it.
    pub fn noise(&self) -> Option<f64> {
        self.sigma
    }

    /// Tolerance applied to two-replicate groups.
    fn pair_tolerance(&self) -> f64 {
        match self.tolerance {
            // Without a noise estimate only exactly-equal pairs agree.
            PairTolerance::NoiseScaled => self
                .sigma
                .map(|s| PAIR_AGREEMENT_FRACTION * s)
                .unwrap_or(0.0),
            PairTolerance::Fixed(t) => t,
        }
    }
}

impl GroupResolver for ValueResolver {
    fn resolve(&self, group: &ReplicateGroup) -> Option<usize> {
        // Rows without a usable numeric value do not vote.
        let valid: Vec<(usize, f64, Relation)> = group
            .positions()
            .iter()
            .zip(group.indices())
            .filter_map(|(&pos, index)| {
                self.values[pos].map(|v| (index, v, self.relations[pos]))
            })
            .collect();

        match valid.as_slice() {
            [] => None,
            [(index, _, _)] => Some(*index),
            [(first, a, _), (_, b, _)] => {
                if (a - b).abs() <= self.pair_tolerance() {
                    Some(*first)
                } else {
                    None
                }
            }
            _ => {
                let measurements: Vec<Measurement> = valid
                    .iter()
                    .map(|&(_, value, relation)| Measurement {
                        value,
                        censoring: relation.censoring(),
                    })
                    .collect();
                let mu = fit_group_mean(&measurements, self.sigma)?;

                valid
                    .iter()
                    .min_by(|(_, a, _), (_, b, _)| {
                        (a - mu)
                            .abs()
                            .partial_cmp(&(b - mu).abs())
                            .unwrap_or(std::cmp::Ordering::Equal)
                    })
                    .map(|&(index, _, _)| index)
            }
        }
    }
}
