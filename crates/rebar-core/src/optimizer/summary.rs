use super::packing::Bar;
use super::*;
use std::collections::HashMap;

impl Optimizer {
    /// Builds the reportable plan of a group from its finished bars.
    pub(super) fn group_result(&self, group_key: String, bars: Vec<Bar>) -> GroupResult {
        // Fits: Optimizer::new caps the expanded piece count at u32::MAX.
        let total_bars = bars.len() as u32;
        let total_waste: f64 = bars.iter().map(|bar| bar.remaining).sum();
        let stock_total = f64::from(total_bars) * self.request.stock_length;
        let patterns = compress_patterns(bars);

        debug_assert_eq!(
            patterns.iter().map(|p| p.count).sum::<u32>(),
            total_bars,
            "pattern counts must add up to the bar count"
        );

        GroupResult {
            group_key,
            total_bars,
            patterns,
            total_waste,
            waste_percentage: percentage(total_waste, stock_total),
        }
    }

    /// Aggregates bar usage and waste over every group.
    pub(super) fn calculate_summary(&self, groups: &BTreeMap<String, GroupResult>) -> Summary {
        let total_bars: u32 = groups.values().map(|g| g.total_bars).sum();
        let total_waste: f64 = groups.values().map(|g| g.total_waste).sum();
        let total_stock_length = f64::from(total_bars) * self.request.stock_length;

        let patterns = groups.values().flat_map(|g| &g.patterns);
        let total_pieces: u64 = patterns
            .clone()
            .map(|p| p.cuts.len() as u64 * u64::from(p.count))
            .sum();
        let total_used_length: f64 = patterns
            .map(|p| p.used_length() * f64::from(p.count))
            .sum();

        Summary {
            total_groups: groups.len() as u32,
            total_pieces,
            total_bars,
            total_stock_length,
            total_used_length,
            total_waste,
            waste_percentage: percentage(total_waste, total_stock_length),
        }
    }
}

/// Merges bars whose sorted cut sequences are identical, keeping the order in
/// which each pattern first appears.
pub(super) fn compress_patterns(bars: Vec<Bar>) -> Vec<Pattern> {
    let mut patterns: Vec<Pattern> = Vec::new();
    let mut index: HashMap<Vec<u64>, usize> = HashMap::new();

    for mut bar in bars {
        sort_descending(&mut bar.cuts);
        let key: Vec<u64> = bar.cuts.iter().map(|cut| cut.to_bits()).collect();

        match index.get(&key) {
            Some(&idx) => patterns[idx].count += 1,
            None => {
                index.insert(key, patterns.len());
                patterns.push(Pattern {
                    cuts: bar.cuts,
                    count: 1,
                    remaining: bar.remaining,
                });
            }
        }
    }

    patterns
}

fn percentage(part: f64, total: f64) -> f64 {
    if total > 0.0 {
        (part / total) * 100.0
    } else {
        0.0
    }
}
