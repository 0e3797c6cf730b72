// src/detection/model.rs
//
// Trained model artifacts stored as JSON: a standardized logistic
// regression or a gradient-boosted tree ensemble.

use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::core::{FeatureSchema, FeatureVector, SchemaVersion};
use crate::error::{DetectionError, Result};

use super::classifier::{check_probability, Classifier};

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

/// Logistic regression over standardized features
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticModel {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
    pub weights: Vec<f64>,
    pub intercept: f64,
}

impl LogisticModel {
    fn validate(&self, feature_count: usize) -> std::result::Result<(), String> {
        for (name, len) in [
            ("mean", self.mean.len()),
            ("scale", self.scale.len()),
            ("weights", self.weights.len()),
        ] {
            if len != feature_count {
                return Err(format!("{} has {} entries, expected {}", name, len, feature_count));
            }
        }
        if let Some(i) = self.scale.iter().position(|&s| !(s.is_finite() && s != 0.0)) {
            return Err(format!("scale[{}] must be finite and non-zero", i));
        }
        Ok(())
    }

    pub fn margin(&self, x: &[f64]) -> f64 {
        self.intercept
            + x.iter()
                .zip(&self.mean)
                .zip(&self.scale)
                .zip(&self.weights)
                .map(|(((x, m), s), w)| w * (x - m) / s)
                .sum::<f64>()
    }
}

/// One node of a binary regression tree. Node 0 is the root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TreeNode {
    /// Go left when `x[feature] < threshold`
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: f64,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tree {
    pub nodes: Vec<TreeNode>,
}

impl Tree {
    fn validate(&self, feature_count: usize) -> std::result::Result<(), String> {
        if self.nodes.is_empty() {
            return Err("empty tree".to_string());
        }
        for (i, node) in self.nodes.iter().enumerate() {
            if let TreeNode::Split { feature, left, right, .. } = *node {
                if feature >= feature_count {
                    return Err(format!("node {} splits on feature {} of {}", i, feature, feature_count));
                }
                // Children after parents rules out cycles
                if left <= i || right <= i || left >= self.nodes.len() || right >= self.nodes.len() {
                    return Err(format!("node {} has invalid children ({}, {})", i, left, right));
                }
            }
        }
        Ok(())
    }

    pub fn leaf_value(&self, x: &[f64]) -> f64 {
        let mut i = 0;
        loop {
            match self.nodes[i] {
                TreeNode::Leaf { value } => return value,
                TreeNode::Split { feature, threshold, left, right } => {
                    i = if x[feature] < threshold { left } else { right };
                }
            }
        }
    }
}

/// Sum of tree outputs plus a base margin, passed through a sigmoid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeEnsemble {
    pub base_margin: f64,
    pub trees: Vec<Tree>,
}

impl TreeEnsemble {
    pub fn margin(&self, x: &[f64]) -> f64 {
        self.base_margin + self.trees.iter().map(|t| t.leaf_value(x)).sum::<f64>()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ModelKind {
    Logistic(LogisticModel),
    TreeEnsemble(TreeEnsemble),
}

impl ModelKind {
    pub fn kind_name(&self) -> &'static str {
        match self {
            ModelKind::Logistic(_) => "logistic",
            ModelKind::TreeEnsemble(_) => "tree_ensemble",
        }
    }

    fn validate(&self, feature_count: usize) -> std::result::Result<(), String> {
        match self {
            ModelKind::Logistic(m) => m.validate(feature_count),
            ModelKind::TreeEnsemble(e) => e
                .trees
                .iter()
                .enumerate()
                .try_for_each(|(i, t)| t.validate(feature_count).map_err(|e| format!("tree {}: {}", i, e))),
        }
    }

    fn probability(&self, x: &[f64]) -> f64 {
        let margin = match self {
            ModelKind::Logistic(m) => m.margin(x),
            ModelKind::TreeEnsemble(e) => e.margin(x),
        };
        sigmoid(margin)
    }
}

/// Serialized model plus the layout it was trained on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub schema: SchemaVersion,
    pub schema_fingerprint: String,
    pub feature_count: usize,
    pub model: ModelKind,
}

impl ModelArtifact {
    pub fn new(schema: &FeatureSchema, model: ModelKind) -> Self {
        Self {
            schema: schema.version(),
            schema_fingerprint: schema.fingerprint(),
            feature_count: schema.len(),
            model,
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| DetectionError::InvalidConfig(format!("cannot serialize model: {}", e)))?;
        std::fs::write(path, json).map_err(|e| {
            DetectionError::InvalidConfig(format!("cannot write {}: {}", path.display(), e))
        })
    }
}

/// [`Classifier`] backed by a loaded [`ModelArtifact`]
#[derive(Debug, Clone)]
pub struct ModelClassifier {
    name: String,
    artifact: ModelArtifact,
}

impl ModelClassifier {
    /// Check the artifact against `schema` and wrap it
    pub fn from_artifact(name: impl Into<String>, artifact: ModelArtifact, schema: &FeatureSchema) -> Result<Self> {
        if artifact.schema != schema.version() {
            return Err(DetectionError::SchemaMismatch(format!(
                "model trained on {} schema, extractor uses {}",
                artifact.schema,
                schema.version()
            )));
        }
        schema.verify(&artifact.schema_fingerprint, artifact.feature_count)?;
        artifact
            .model
            .validate(artifact.feature_count)
            .map_err(|e| DetectionError::ModelUnavailable(format!("malformed model: {}", e)))?;

        Ok(Self {
            name: name.into(),
            artifact,
        })
    }

    /// Load a JSON artifact from disk
    pub fn load(path: &Path, schema: &FeatureSchema) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            DetectionError::ModelUnavailable(format!("cannot read {}: {}", path.display(), e))
        })?;
        let artifact: ModelArtifact = serde_json::from_str(&text).map_err(|e| {
            DetectionError::ModelUnavailable(format!("cannot parse {}: {}", path.display(), e))
        })?;

        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "model".to_string());
        let classifier = Self::from_artifact(name, artifact, schema)?;
        info!(
            "loaded {} model '{}' ({} features, {} schema)",
            classifier.artifact.model.kind_name(),
            classifier.name,
            classifier.artifact.feature_count,
            classifier.artifact.schema
        );
        Ok(classifier)
    }

    pub fn artifact(&self) -> &ModelArtifact {
        &self.artifact
    }
}

impl Classifier for ModelClassifier {
    fn name(&self) -> &str {
        &self.name
    }

    fn schema(&self) -> SchemaVersion {
        self.artifact.schema
    }

    fn score_ai(&self, features: &FeatureVector) -> Result<f64> {
        if features.schema() != self.artifact.schema || features.len() != self.artifact.feature_count {
            return Err(DetectionError::SchemaMismatch(format!(
                "model '{}' expects {} {} features, got {} {}",
                self.name,
                self.artifact.feature_count,
                self.artifact.schema,
                features.len(),
                features.schema()
            )));
        }
        let p = self.artifact.model.probability(features.values());
        debug!("model '{}' scored {:.4}", self.name, p);
        check_probability(&self.name, p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> FeatureSchema {
        FeatureSchema::new(SchemaVersion::Basic)
    }

    fn logistic(weight_on: usize, weight: f64) -> ModelKind {
        let n = schema().len();
        let mut weights = vec![0.0; n];
        weights[weight_on] = weight;
        ModelKind::Logistic(LogisticModel {
            mean: vec![0.0; n],
            scale: vec![1.0; n],
            weights,
            intercept: 0.0,
        })
    }

    fn vector(value_at: usize, value: f64) -> FeatureVector {
        let s = schema();
        let mut values = vec![0.0; s.len()];
        values[value_at] = value;
        FeatureVector::new(&s, values).unwrap()
    }

    #[test]
    fn test_logistic_scoring() {
        let s = schema();
        let clf = ModelClassifier::from_artifact("lr", ModelArtifact::new(&s, logistic(3, 2.0)), &s).unwrap();
        assert!((clf.score_ai(&vector(3, 0.0)).unwrap() - 0.5).abs() < 1e-12);
        assert!(clf.score_ai(&vector(3, 1.0)).unwrap() > 0.85);
        assert!(clf.score_ai(&vector(3, -1.0)).unwrap() < 0.15);
    }

    #[test]
    fn test_tree_ensemble_scoring() {
        let s = schema();
        let tree = Tree {
            nodes: vec![
                TreeNode::Split { feature: 0, threshold: 0.5, left: 1, right: 2 },
                TreeNode::Leaf { value: -2.0 },
                TreeNode::Leaf { value: 2.0 },
            ],
        };
        let model = ModelKind::TreeEnsemble(TreeEnsemble { base_margin: 0.0, trees: vec![tree] });
        let clf = ModelClassifier::from_artifact("gbt", ModelArtifact::new(&s, model), &s).unwrap();

        assert!((clf.score_ai(&vector(0, 1.0)).unwrap() - sigmoid(2.0)).abs() < 1e-12);
        assert!((clf.score_ai(&vector(0, 0.0)).unwrap() - sigmoid(-2.0)).abs() < 1e-12);
    }

    #[test]
    fn test_cyclic_tree_rejected() {
        let s = schema();
        let tree = Tree {
            nodes: vec![
                TreeNode::Split { feature: 0, threshold: 0.5, left: 1, right: 1 },
                TreeNode::Split { feature: 0, threshold: 0.5, left: 0, right: 0 },
            ],
        };
        let model = ModelKind::TreeEnsemble(TreeEnsemble { base_margin: 0.0, trees: vec![tree] });
        assert!(matches!(
            ModelClassifier::from_artifact("bad", ModelArtifact::new(&s, model), &s),
            Err(DetectionError::ModelUnavailable(_))
        ));
    }

    #[test]
    fn test_schema_mismatch_on_load() {
        let basic = schema();
        let extended = FeatureSchema::new(SchemaVersion::Extended);
        let artifact = ModelArtifact::new(&basic, logistic(0, 1.0));
        assert!(matches!(
            ModelClassifier::from_artifact("lr", artifact.clone(), &extended),
            Err(DetectionError::SchemaMismatch(_))
        ));

        let mut tampered = artifact;
        tampered.schema_fingerprint = "0".repeat(32);
        assert!(matches!(
            ModelClassifier::from_artifact("lr", tampered, &basic),
            Err(DetectionError::SchemaMismatch(_))
        ));
    }

    #[test]
    fn test_json_round_trip_and_missing_file() {
        let s = schema();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("voice.json");
        ModelArtifact::new(&s, logistic(1, 0.5)).save(&path).unwrap();

        let clf = ModelClassifier::load(&path, &s).unwrap();
        assert_eq!(clf.name(), "voice");
        assert!(matches!(
            ModelClassifier::load(&dir.path().join("nope.json"), &s),
            Err(DetectionError::ModelUnavailable(_))
        ));
    }
}
