use std::path::Path;

use blockfall_engine::BoardSize;
use blockfall_evaluator::placement_evaluator::FeatureWeights;
use blockfall_training::genetic::GeneticParams;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::util;

/// Weights produced by a training run, as saved by `blockfall train --output`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TrainedModel {
    pub name: String,
    pub trained_at: DateTime<Utc>,
    pub final_fitness: f32,
    pub weights: FeatureWeights,
    pub board_size: BoardSize,
    pub params: GeneticParams,
}

impl TrainedModel {
    pub fn open<P>(path: P) -> anyhow::Result<Self>
    where
        P: AsRef<Path>,
    {
        util::read_json_file("model", path)
    }

    pub fn save<P>(&self, path: P) -> anyhow::Result<()>
    where
        P: AsRef<Path>,
    {
        util::write_json_file("model", path, self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_and_open() {
        let model = TrainedModel {
            name: "test".to_owned(),
            trained_at: Utc::now(),
            final_fitness: 12.5,
            weights: FeatureWeights::TRAINED,
            board_size: BoardSize::new(12, 24).unwrap(),
            params: GeneticParams::default(),
        };
        let path = std::env::temp_dir().join(format!("blockfall-model-{}.json", std::process::id()));
        model.save(&path).unwrap();
        let loaded = TrainedModel::open(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(loaded, model);
    }

    #[test]
    fn test_open_missing_file_fails() {
        let err = TrainedModel::open("/nonexistent/blockfall/model.json").unwrap_err();
        assert!(err.to_string().contains("model"));
    }
}
