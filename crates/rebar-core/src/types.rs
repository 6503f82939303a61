use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Length of a raw rebar bar in meters
pub const DEFAULT_STOCK_LENGTH: f64 = 12.0;

/// Absolute slack used when comparing lengths
pub const DEFAULT_TOLERANCE: f64 = 1e-6;

/// Largest slack a request may set
pub const MAX_TOLERANCE: f64 = 1e-3;

fn default_stock_length() -> f64 {
    DEFAULT_STOCK_LENGTH
}

fn default_tolerance() -> f64 {
    DEFAULT_TOLERANCE
}

/// A demand line, e.g. 20 pieces of 5.5m in diameter 10
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequiredPiece {
    /// Material group the piece belongs to (usually the bar diameter)
    #[serde(alias = "diameter")]
    pub group_key: String,
    pub length: f64,
    pub quantity: u32,
}

impl RequiredPiece {
    pub fn new(group_key: impl Into<String>, length: f64, quantity: u32) -> Self {
        Self {
            group_key: group_key.into(),
            length,
            quantity,
        }
    }
}

/// Input: What user provides
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizationRequest {
    /// Length of every stock bar, shared by all groups
    #[serde(default = "default_stock_length")]
    pub stock_length: f64,
    pub pieces: Vec<RequiredPiece>,
    /// Slack allowed when checking whether a piece fits a bar
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
}

impl OptimizationRequest {
    pub fn new(pieces: Vec<RequiredPiece>, stock_length: f64) -> Self {
        Self {
            stock_length,
            pieces,
            tolerance: DEFAULT_TOLERANCE,
        }
    }

    /// Number of individual pieces once quantities are expanded.
    pub fn total_pieces(&self) -> u64 {
        self.pieces.iter().map(|p| u64::from(p.quantity)).sum()
    }
}

/// One or more bars sharing an identical cut sequence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pattern {
    /// Cut lengths, longest first
    pub cuts: Vec<f64>,
    /// How many bars are cut this way
    pub count: u32,
    /// Offcut left on each bar of this pattern
    pub remaining: f64,
}

impl Pattern {
    pub fn used_length(&self) -> f64 {
        self.cuts.iter().sum()
    }
}

/// Cutting plan for a single group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupResult {
    pub group_key: String,
    pub total_bars: u32,
    pub patterns: Vec<Pattern>,
    pub total_waste: f64,
    pub waste_percentage: f64,
}

/// Summary statistics across all groups
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub total_groups: u32,
    pub total_pieces: u64,
    pub total_bars: u32,
    pub total_stock_length: f64,
    pub total_used_length: f64,
    pub total_waste: f64,
    pub waste_percentage: f64,
}

/// Output: What optimizer returns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationResult {
    pub stock_length: f64,
    /// Cutting plan per group key
    pub groups: BTreeMap<String, GroupResult>,
    /// Overall statistics
    pub summary: Summary,
}

/// Error type for optimization
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum OptimizerError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Piece of {length}m in group '{group_key}' exceeds stock length {stock_length}m")]
    PieceTooLong {
        group_key: String,
        length: f64,
        stock_length: f64,
    },
}

pub type Result<T> = std::result::Result<T, OptimizerError>;
