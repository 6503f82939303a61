use super::*;
use std::collections::HashMap;
use std::iter;

/// Expanded piece lengths of one group key.
#[derive(Debug, Clone)]
pub(super) struct PieceGroup {
    pub key: String,
    pub lengths: Vec<f64>,
}

impl Optimizer {
    /// Splits requested pieces by group key and duplicates them according to
    /// their quantity. Groups and lengths keep their input order.
    pub(super) fn group_pieces(&self) -> Vec<PieceGroup> {
        let mut groups: Vec<PieceGroup> = Vec::new();
        let mut index: HashMap<&str, usize> = HashMap::new();

        for piece in &self.request.pieces {
            let idx = *index.entry(piece.group_key.as_str()).or_insert_with(|| {
                groups.push(PieceGroup {
                    key: piece.group_key.clone(),
                    lengths: Vec::new(),
                });
                groups.len() - 1
            });

            groups[idx]
                .lengths
                .extend(iter::repeat_n(piece.length, piece.quantity as usize));
        }

        groups
    }
}

/// Stable sort, longest first.
pub(super) fn sort_descending(lengths: &mut [f64]) {
    lengths.sort_by(|a, b| b.total_cmp(a));
}
