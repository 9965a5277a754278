//! Placement evaluation: scoring individual piece placements.
//!
//! A placement is scored by a linear combination of the six raw board
//! features (see [`board_feature`](crate::board_feature)):
//!
//! ```text
//! score = w₁·landing_height + w₂·melted_lines + w₃·row_transitions
//!       + w₄·column_transitions + w₅·number_of_holes + w₆·well_sums
//! ```
//!
//! The weights are a [`FeatureWeights`] value: either a built-in preset or a
//! vector evolved by the genetic optimizer in `blockfall-training`.
//!
//! # Usage
//!
//! ```
//! use blockfall_evaluator::{
//!     board_feature::FeatureValues,
//!     placement_evaluator::{FeatureWeights, PlacementEvaluator, WeightedPlacementEvaluator},
//! };
//!
//! let evaluator = WeightedPlacementEvaluator::new(FeatureWeights::EL_TETRIS);
//! let features = FeatureValues::new([0.5, 0.0, 40.0, 10.0, 0.0, 0.0]);
//! let score = evaluator.evaluate_features(&features);
//! assert!(score < 0.0);
//! ```

use std::{fmt, iter, ops::Index};

use serde::{Deserialize, Serialize};

use crate::{
    board_feature::{BoardFeature, FeatureValues},
    placement_analysis::PlacementAnalysis,
};

/// Evaluates piece placements by assigning scores.
pub trait PlacementEvaluator: fmt::Debug + Send + Sync {
    /// Scores a feature vector (higher is better).
    fn evaluate_features(&self, features: &FeatureValues) -> f32;

    /// Extracts the features of a placement and scores them.
    fn evaluate_placement(&self, analysis: &PlacementAnalysis<'_>) -> PlacementEvaluation {
        let features = analysis.feature_values();
        PlacementEvaluation {
            score: self.evaluate_features(&features),
            features,
        }
    }
}

/// Score of a placement along with the features it was computed from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacementEvaluation {
    pub score: f32,
    pub features: FeatureValues,
}

/// Weight vector of the linear evaluator, in [`BoardFeature::ALL`] order.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureWeights([f32; BoardFeature::LEN]);

#[allow(clippy::excessive_precision, clippy::unreadable_literal)]
impl FeatureWeights {
    /// Pierre Dellacherie's hand-tuned weights, as published by El-Tetris.
    pub const EL_TETRIS: Self = Self([
        -4.500158825082766,
        3.4181268101392694,
        -3.2178882868487753,
        -9.348695305445199,
        -7.899265427351652,
        -3.3855972247263626,
    ]);

    /// Weights evolved by an earlier training run on a 10×20 board.
    pub const TRAINED: Self = Self([
        -0.8229968113792483,
        0.3816371409567763,
        -0.3822535695191802,
        -1.6210899838124477,
        -0.7829249929709147,
        -0.524241666771028,
    ]);
}

impl FeatureWeights {
    #[must_use]
    pub const fn new(weights: [f32; BoardFeature::LEN]) -> Self {
        Self(weights)
    }

    #[must_use]
    pub const fn as_array(&self) -> &[f32; BoardFeature::LEN] {
        &self.0
    }

    pub fn as_mut_array(&mut self) -> &mut [f32; BoardFeature::LEN] {
        &mut self.0
    }

    #[must_use]
    pub fn dot(&self, features: &FeatureValues) -> f32 {
        iter::zip(&self.0, features.as_array())
            .map(|(w, f)| w * f)
            .sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (BoardFeature, f32)> + '_ {
        BoardFeature::ALL.into_iter().zip(self.0.iter().copied())
    }
}

impl Index<BoardFeature> for FeatureWeights {
    type Output = f32;

    fn index(&self, feature: BoardFeature) -> &Self::Output {
        &self.0[feature.index()]
    }
}

impl fmt::Display for FeatureWeights {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, w) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{w:.6}")?;
        }
        write!(f, "]")
    }
}

/// Scores placements by the dot product of features and weights.
#[derive(Debug, Clone)]
pub struct WeightedPlacementEvaluator {
    weights: FeatureWeights,
}

impl WeightedPlacementEvaluator {
    #[must_use]
    pub fn new(weights: FeatureWeights) -> Self {
        Self { weights }
    }

    #[must_use]
    pub fn weights(&self) -> &FeatureWeights {
        &self.weights
    }
}

impl PlacementEvaluator for WeightedPlacementEvaluator {
    #[inline]
    fn evaluate_features(&self, features: &FeatureValues) -> f32 {
        self.weights.dot(features)
    }
}
