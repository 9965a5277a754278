//! The six board features of the linear evaluator.
//!
//! | Feature | Meaning |
//! |---|---|
//! | [`BoardFeature::LandingHeight`] | How high the piece came to rest, measured at the middle of its bounding box |
//! | [`BoardFeature::MeltedLines`] | Rows cleared by the placement |
//! | [`BoardFeature::RowTransitions`] | Horizontal fragmentation |
//! | [`BoardFeature::ColumnTransitions`] | Vertical fragmentation |
//! | [`BoardFeature::NumHoles`] | Covered empty cells |
//! | [`BoardFeature::WellSums`] | Triangular sum of well depths |
//!
//! All features except the landing height are measured on the board after
//! the line clear.

use std::{fmt, ops::Index};

use serde::{Deserialize, Serialize};

use crate::placement_analysis::PlacementAnalysis;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoardFeature {
    LandingHeight,
    MeltedLines,
    RowTransitions,
    ColumnTransitions,
    #[serde(rename = "number_of_holes")]
    NumHoles,
    WellSums,
}

impl fmt::Display for BoardFeature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl BoardFeature {
    pub const LEN: usize = 6;

    /// Every feature, in the order used by weight and value vectors.
    pub const ALL: [Self; Self::LEN] = [
        Self::LandingHeight,
        Self::MeltedLines,
        Self::RowTransitions,
        Self::ColumnTransitions,
        Self::NumHoles,
        Self::WellSums,
    ];

    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::LandingHeight => "Landing Height",
            Self::MeltedLines => "Melted Lines",
            Self::RowTransitions => "Row Transitions",
            Self::ColumnTransitions => "Column Transitions",
            Self::NumHoles => "Number of Holes",
            Self::WellSums => "Well Sums",
        }
    }

    #[must_use]
    #[expect(clippy::cast_precision_loss)]
    pub fn extract(self, analysis: &PlacementAnalysis<'_>) -> f32 {
        let board = analysis.board_analysis();
        match self {
            Self::LandingHeight => analysis.landing_height(),
            Self::MeltedLines => analysis.cleared_lines() as f32,
            Self::RowTransitions => board.row_transitions() as f32,
            Self::ColumnTransitions => board.column_transitions() as f32,
            Self::NumHoles => board.num_holes() as f32,
            Self::WellSums => board.well_sums() as f32,
        }
    }
}

/// Raw feature values of one placement, indexed by [`BoardFeature`].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FeatureValues([f32; BoardFeature::LEN]);

impl FeatureValues {
    #[must_use]
    pub const fn new(values: [f32; BoardFeature::LEN]) -> Self {
        Self(values)
    }

    #[must_use]
    pub fn from_analysis(analysis: &PlacementAnalysis<'_>) -> Self {
        Self(BoardFeature::ALL.map(|feature| feature.extract(analysis)))
    }

    #[must_use]
    pub const fn as_array(&self) -> &[f32; BoardFeature::LEN] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = (BoardFeature, f32)> + '_ {
        BoardFeature::ALL.into_iter().zip(self.0.iter().copied())
    }
}

impl Index<BoardFeature> for FeatureValues {
    type Output = f32;

    fn index(&self, feature: BoardFeature) -> &Self::Output {
        &self.0[feature.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_order_matches_index() {
        for (i, feature) in BoardFeature::ALL.iter().enumerate() {
            assert_eq!(feature.index(), i);
        }
    }

    #[test]
    fn test_feature_serde_names() {
        let names = serde_json::to_value(BoardFeature::ALL).unwrap();
        assert_eq!(
            names,
            serde_json::json!([
                "landing_height",
                "melted_lines",
                "row_transitions",
                "column_transitions",
                "number_of_holes",
                "well_sums"
            ])
        );
        let parsed: BoardFeature = serde_json::from_str("\"number_of_holes\"").unwrap();
        assert_eq!(parsed, BoardFeature::NumHoles);
    }

    #[test]
    fn test_feature_values_index() {
        let values = FeatureValues::new([1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert!((values[BoardFeature::NumHoles] - 5.0).abs() < f32::EPSILON);
        let collected: Vec<_> = values.iter().map(|(f, _)| f).collect();
        assert_eq!(collected, BoardFeature::ALL);
    }
}
