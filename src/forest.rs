//! Random-forest classifier loaded from a serialized, versioned artifact.
//!
//! The model is an external collaborator: this module only knows how to
//! load the artifact, check it against the frozen schema, and expose the
//! two capabilities the service needs (`predict`, `predict_proba`). The
//! load happens once at startup and is atomic: any problem with the
//! artifact is fatal and the process refuses to serve.

use anyhow::{bail, Context};
use serde::Deserialize;
use std::path::Path;

use crate::encoder::FeatureRow;
use crate::errors::AppError;
use crate::schema;

/// Artifact format versions this build understands.
const SUPPORTED_FORMAT_VERSIONS: &[u32] = &[1];

// ============ Raw artifact layout (serde) ============

#[derive(Debug, Deserialize)]
struct RawArtifact {
    format_version: u32,
    feature_names: Vec<String>,
    classes: Vec<u8>,
    trees: Vec<RawTree>,
}

#[derive(Debug, Deserialize)]
struct RawTree {
    nodes: Vec<RawNode>,
}

/// One node of a decision tree. A node is a leaf iff `value` is present;
/// otherwise `feature`, `threshold`, `left` and `right` are all required.
#[derive(Debug, Deserialize)]
struct RawNode {
    #[serde(default)]
    feature: Option<usize>,
    #[serde(default)]
    threshold: Option<f64>,
    #[serde(default)]
    left: Option<usize>,
    #[serde(default)]
    right: Option<usize>,
    #[serde(default)]
    value: Option<[f64; 2]>,
}

// ============ Validated model ============

#[derive(Debug, Clone)]
enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        proba: [f64; 2],
    },
}

#[derive(Debug, Clone)]
struct Tree {
    nodes: Vec<TreeNode>,
}

impl Tree {
    /// Walk the tree for one feature vector and return the leaf's class
    /// distribution. Split convention is sklearn's: `x <= threshold` goes
    /// left. The walk is bounded by the node count, so it terminates even
    /// if the artifact encoded a cycle the load-time check missed.
    fn proba(&self, x: &[f64]) -> Result<[f64; 2], AppError> {
        let mut idx = 0usize;
        for _ in 0..self.nodes.len() {
            match &self.nodes[idx] {
                TreeNode::Leaf { proba } => return Ok(*proba),
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    idx = if x[*feature] <= *threshold { *left } else { *right };
                }
            }
        }
        Err(AppError::ModelError(
            "decision tree walk did not reach a leaf".to_string(),
        ))
    }
}

/// The pre-trained binary classifier, ready to serve.
#[derive(Debug, Clone)]
pub struct RandomForest {
    format_version: u32,
    trees: Vec<Tree>,
}

impl RandomForest {
    /// Load and validate the model artifact from disk.
    ///
    /// Called once at startup, synchronously, before the listener binds.
    /// Every failure here is fatal by design: serving without a model (or
    /// with a model trained against a different schema) would silently
    /// produce wrong predictions.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read model artifact {}", path.display()))?;
        Self::from_json_str(&raw)
            .with_context(|| format!("invalid model artifact {}", path.display()))
    }

    /// Parse and validate an artifact from its JSON text.
    pub fn from_json_str(raw: &str) -> anyhow::Result<Self> {
        let artifact: RawArtifact =
            serde_json::from_str(raw).context("artifact is not valid JSON")?;

        if !SUPPORTED_FORMAT_VERSIONS.contains(&artifact.format_version) {
            bail!(
                "unsupported artifact format_version {} (supported: {:?})",
                artifact.format_version,
                SUPPORTED_FORMAT_VERSIONS
            );
        }
        if artifact.classes != [0, 1] {
            bail!("expected binary classes [0, 1], got {:?}", artifact.classes);
        }

        // The artifact must carry the exact schema this build encodes
        // against. A mismatch here means the model was trained against a
        // different preprocessing pipeline.
        if artifact.feature_names.len() != schema::EXPECTED_COLUMNS.len() {
            bail!(
                "artifact has {} feature names, schema has {}",
                artifact.feature_names.len(),
                schema::EXPECTED_COLUMNS.len()
            );
        }
        for (got, want) in artifact.feature_names.iter().zip(schema::EXPECTED_COLUMNS) {
            if got != want {
                bail!("artifact feature '{}' does not match schema column '{}'", got, want);
            }
        }

        if artifact.trees.is_empty() {
            bail!("artifact contains no trees");
        }

        let n_features = artifact.feature_names.len();
        let mut trees = Vec::with_capacity(artifact.trees.len());
        for (tree_idx, raw_tree) in artifact.trees.iter().enumerate() {
            trees.push(
                validate_tree(raw_tree, n_features)
                    .with_context(|| format!("tree {} is malformed", tree_idx))?,
            );
        }

        Ok(Self {
            format_version: artifact.format_version,
            trees,
        })
    }

    /// Artifact format version of the loaded model.
    pub fn format_version(&self) -> u32 {
        self.format_version
    }

    /// Number of trees in the ensemble.
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Probability pair (not-subscribe, subscribe); always sums to 1.0.
    ///
    /// Averages the leaf class distributions across the ensemble, the same
    /// way sklearn's `RandomForestClassifier.predict_proba` does.
    pub fn predict_proba(&self, row: &FeatureRow) -> Result<(f64, f64), AppError> {
        let x = row.to_vector();
        if x.len() != schema::EXPECTED_COLUMNS.len() {
            return Err(AppError::ModelError(format!(
                "feature vector has {} values, model expects {}",
                x.len(),
                schema::EXPECTED_COLUMNS.len()
            )));
        }

        let mut p0 = 0.0;
        let mut p1 = 0.0;
        for tree in &self.trees {
            let leaf = tree.proba(&x)?;
            p0 += leaf[0];
            p1 += leaf[1];
        }
        let total = p0 + p1;
        if total <= 0.0 {
            return Err(AppError::ModelError(
                "ensemble produced a zero probability mass".to_string(),
            ));
        }
        Ok((p0 / total, p1 / total))
    }

    /// Predicted class: 1 iff the subscribe probability is at least 0.5.
    pub fn predict(&self, row: &FeatureRow) -> Result<u8, AppError> {
        let (_, p1) = self.predict_proba(row)?;
        Ok(u8::from(p1 >= 0.5))
    }
}

/// Structural validation of one tree: every split references in-bounds
/// children and features, every leaf carries a usable distribution, and
/// the node graph reachable from the root terminates.
fn validate_tree(raw: &RawTree, n_features: usize) -> anyhow::Result<Tree> {
    if raw.nodes.is_empty() {
        bail!("tree has no nodes");
    }
    let n_nodes = raw.nodes.len();

    let mut nodes = Vec::with_capacity(n_nodes);
    for (idx, node) in raw.nodes.iter().enumerate() {
        if let Some(value) = node.value {
            if value.iter().any(|p| !p.is_finite() || *p < 0.0) {
                bail!("node {} leaf distribution {:?} is not usable", idx, value);
            }
            if value.iter().sum::<f64>() <= 0.0 {
                bail!("node {} leaf distribution sums to zero", idx);
            }
            let sum: f64 = value.iter().sum();
            nodes.push(TreeNode::Leaf {
                proba: [value[0] / sum, value[1] / sum],
            });
            continue;
        }

        let (feature, threshold, left, right) =
            match (node.feature, node.threshold, node.left, node.right) {
                (Some(f), Some(t), Some(l), Some(r)) => (f, t, l, r),
                _ => bail!("node {} is neither a complete split nor a leaf", idx),
            };
        if feature >= n_features {
            bail!("node {} references feature {} (only {} exist)", idx, feature, n_features);
        }
        if left >= n_nodes || right >= n_nodes {
            bail!("node {} references children out of bounds", idx);
        }
        // Children must come after their parent; this also rules out
        // cycles without a full graph traversal.
        if left <= idx || right <= idx {
            bail!("node {} references a non-descendant child", idx);
        }
        if !threshold.is_finite() {
            bail!("node {} has a non-finite threshold", idx);
        }
        nodes.push(TreeNode::Split {
            feature,
            threshold,
            left,
            right,
        });
    }

    Ok(Tree { nodes })
}

#[cfg(test)]
mod tests {
    use super::*;

    // A single stump: duration <= 210 -> mostly class 0, else class 1.
    const STUMP: &str = r#"{
        "format_version": 1,
        "feature_names": ["age", "age_categories_about to retire",
            "age_categories_old age", "age_categories_stable",
            "age_categories_struggling", "balance", "campaign",
            "contact_cellular", "contact_telephone", "day", "default",
            "duration", "education_primary", "education_secondary",
            "education_tertiary", "housing", "job_categories_cat1",
            "job_categories_cat2", "job_categories_cat4", "loan",
            "marital_married", "marital_single", "month_apr", "month_aug",
            "month_feb", "month_jan", "month_jul", "month_jun", "month_mar",
            "month_may", "month_nov", "month_oct", "month_sep", "pdays",
            "poutcome_failure", "poutcome_success", "poutcome_unknown",
            "previous"],
        "classes": [0, 1],
        "trees": [{"nodes": [
            {"feature": 11, "threshold": 210.0, "left": 1, "right": 2},
            {"value": [0.9, 0.1]},
            {"value": [0.3, 0.7]}
        ]}]
    }"#;

    #[test]
    fn stump_loads_and_reports_version() {
        let forest = RandomForest::from_json_str(STUMP).unwrap();
        assert_eq!(forest.format_version(), 1);
        assert_eq!(forest.n_trees(), 1);
    }

    #[test]
    fn unsupported_version_rejected() {
        let bad = STUMP.replace("\"format_version\": 1", "\"format_version\": 99");
        assert!(RandomForest::from_json_str(&bad).is_err());
    }

    #[test]
    fn wrong_feature_names_rejected() {
        let bad = STUMP.replace("\"age\"", "\"edad\"");
        assert!(RandomForest::from_json_str(&bad).is_err());
    }

    #[test]
    fn out_of_bounds_child_rejected() {
        let bad = STUMP.replace("\"left\": 1, \"right\": 2", "\"left\": 1, \"right\": 7");
        assert!(RandomForest::from_json_str(&bad).is_err());
    }

    #[test]
    fn backward_child_reference_rejected() {
        let bad = STUMP.replace("\"left\": 1, \"right\": 2", "\"left\": 0, \"right\": 2");
        assert!(RandomForest::from_json_str(&bad).is_err());
    }
}
