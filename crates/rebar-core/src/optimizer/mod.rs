use crate::types::*;
use std::collections::BTreeMap;
use tracing::debug;

mod grouping;
mod packing;
mod summary;

use grouping::{sort_descending, PieceGroup};

/// Cuts required pieces from stock bars using a best-fit decreasing heuristic.
///
/// Every group key is solved on its own set of bars. Packing a group of `n`
/// pieces scans all open bars for each piece, so the cost grows as `O(n²)`;
/// callers exposing this to untrusted input should bound the piece count.
pub struct Optimizer {
    request: OptimizationRequest,
}

impl Optimizer {
    /// Validates requests and builds a new optimizer instance.
    pub fn new(request: OptimizationRequest) -> Result<Self> {
        let stock_length = request.stock_length;
        let tolerance = request.tolerance;

        if !stock_length.is_finite() || stock_length <= 0.0 {
            return Err(OptimizerError::InvalidConfiguration(format!(
                "Stock length must be positive, got {stock_length}"
            )));
        }

        if !(0.0..=MAX_TOLERANCE).contains(&tolerance) {
            return Err(OptimizerError::InvalidConfiguration(format!(
                "Tolerance must be between 0 and {MAX_TOLERANCE}, got {tolerance}"
            )));
        }

        // Bar and group counts are reported as u32 and never exceed the piece count.
        let total_pieces = request.total_pieces();
        if total_pieces > u64::from(u32::MAX) {
            return Err(OptimizerError::InvalidConfiguration(format!(
                "Request expands to {total_pieces} pieces, at most {} are supported",
                u32::MAX
            )));
        }

        for piece in &request.pieces {
            if !piece.length.is_finite() || piece.length <= 0.0 {
                return Err(OptimizerError::InvalidConfiguration(format!(
                    "Piece in group '{}' has non-positive length {}",
                    piece.group_key, piece.length
                )));
            }

            if piece.quantity == 0 {
                return Err(OptimizerError::InvalidConfiguration(format!(
                    "Piece of {}m in group '{}' has zero quantity",
                    piece.length, piece.group_key
                )));
            }

            if piece.length > stock_length + tolerance {
                return Err(OptimizerError::PieceTooLong {
                    group_key: piece.group_key.clone(),
                    length: piece.length,
                    stock_length,
                });
            }
        }

        Ok(Self { request })
    }

    /// Executes the full optimization flow and returns one plan per group.
    pub fn optimize(&self) -> Result<OptimizationResult> {
        let groups = self.solve_groups(self.group_pieces());
        let summary = self.calculate_summary(&groups);

        Ok(OptimizationResult {
            stock_length: self.request.stock_length,
            groups,
            summary,
        })
    }

    #[cfg(not(feature = "parallel"))]
    fn solve_groups(&self, groups: Vec<PieceGroup>) -> BTreeMap<String, GroupResult> {
        groups
            .into_iter()
            .map(|group| self.solve_group(group))
            .map(|result| (result.group_key.clone(), result))
            .collect()
    }

    #[cfg(feature = "parallel")]
    fn solve_groups(&self, groups: Vec<PieceGroup>) -> BTreeMap<String, GroupResult> {
        use rayon::prelude::*;

        groups
            .into_par_iter()
            .map(|group| self.solve_group(group))
            .map(|result| (result.group_key.clone(), result))
            .collect()
    }

    fn solve_group(&self, group: PieceGroup) -> GroupResult {
        let PieceGroup { key, mut lengths } = group;
        sort_descending(&mut lengths);

        let bars = self.best_fit_decreasing(&lengths);
        debug!(
            group = %key,
            pieces = lengths.len(),
            bars = bars.len(),
            "packed group"
        );

        self.group_result(key, bars)
    }
}

/// Packs `pieces` onto bars of `stock_length`, one independent plan per group key.
///
/// Runs in `O(n²)` per group for `n` expanded pieces. Uses
/// [`DEFAULT_TOLERANCE`] for length comparisons.
pub fn optimize(
    pieces: &[RequiredPiece],
    stock_length: f64,
) -> Result<BTreeMap<String, GroupResult>> {
    let request = OptimizationRequest::new(pieces.to_vec(), stock_length);
    let result = Optimizer::new(request)?.optimize()?;
    Ok(result.groups)
}
