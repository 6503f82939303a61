use super::*;

/// A stock bar being cut during a single optimization run.
#[derive(Debug, Clone)]
pub(super) struct Bar {
    pub remaining: f64,
    pub cuts: Vec<f64>,
}

impl Bar {
    fn open(stock_length: f64, piece: f64, tolerance: f64) -> Self {
        let mut bar = Bar {
            remaining: stock_length,
            cuts: Vec::new(),
        };
        bar.cut(piece, tolerance);
        bar
    }

    fn fits(&self, piece: f64, tolerance: f64) -> bool {
        self.remaining + tolerance >= piece
    }

    fn cut(&mut self, piece: f64, tolerance: f64) {
        let remaining = self.remaining - piece;
        debug_assert!(remaining >= -tolerance, "bar over-filled: {remaining}");
        // Round-off below the tolerance is not real material.
        self.remaining = if remaining < 0.0 { 0.0 } else { remaining };
        self.cuts.push(piece);
    }
}

impl Optimizer {
    /// Places pieces (longest first) on the bar leaving the smallest offcut,
    /// opening a new bar when none can take the piece.
    pub(super) fn best_fit_decreasing(&self, pieces: &[f64]) -> Vec<Bar> {
        let tolerance = self.request.tolerance;
        let mut bars: Vec<Bar> = Vec::new();

        for &piece in pieces {
            match self.find_best_bar(&bars, piece) {
                Some(idx) => bars[idx].cut(piece, tolerance),
                None => bars.push(Bar::open(self.request.stock_length, piece, tolerance)),
            }
        }

        debug_assert_eq!(
            bars.iter().map(|bar| bar.cuts.len()).sum::<usize>(),
            pieces.len(),
            "every piece must land on exactly one bar"
        );

        bars
    }

    /// Returns the index of the tightest fitting bar, the earliest opened one on
    /// equal residuals. The tolerance only decides whether a bar fits.
    pub(super) fn find_best_bar(&self, bars: &[Bar], piece: f64) -> Option<usize> {
        let tolerance = self.request.tolerance;
        let mut best: Option<(usize, f64)> = None;

        for (idx, bar) in bars.iter().enumerate() {
            if !bar.fits(piece, tolerance) {
                continue;
            }

            let residual = bar.remaining - piece;
            match best {
                None => best = Some((idx, residual)),
                Some((_, best_residual)) if residual < best_residual => {
                    best = Some((idx, residual));
                }
                _ => {}
            }
        }

        best.map(|(idx, _)| idx)
    }
}
