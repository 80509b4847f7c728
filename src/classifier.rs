//! Fitted binary classifiers.
//!
//! Both families produce a raw margin which is mapped to the probability of
//! the positive (churn) class through the logistic function.

use serde::{Deserialize, Serialize};

use crate::artifact::ArtifactError;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Classifier {
    /// Logistic regression: `sigmoid(w · x + b)`.
    Logistic {
        coefficients: Vec<f64>,
        intercept: f64,
    },
    /// Gradient-boosted regression trees: `sigmoid(base_score + Σ tree(x))`.
    TreeEnsemble {
        base_score: f64,
        trees: Vec<RegressionTree>,
    },
}

/// A single regression tree. Node 0 is the root.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegressionTree {
    nodes: Vec<TreeNode>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TreeNode {
    /// `x[feature] <= threshold` goes left; NaN follows `default_left`.
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
        #[serde(default = "default_left")]
        default_left: bool,
    },
    Leaf { value: f64 },
}

fn default_left() -> bool {
    true
}

impl RegressionTree {
    pub fn new(nodes: Vec<TreeNode>) -> Self {
        Self { nodes }
    }

    /// Structural checks: non-empty, children in bounds and strictly after
    /// their parent (which rules out cycles), split features within `width`.
    fn validate(&self, index: usize, width: usize) -> Result<(), ArtifactError> {
        if self.nodes.is_empty() {
            return Err(ArtifactError::Invalid(format!("tree {} has no nodes", index)));
        }

        let n_nodes = self.nodes.len();
        for (node, entry) in self.nodes.iter().enumerate() {
            match entry {
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                    ..
                } => {
                    if *feature >= width {
                        return Err(ArtifactError::Invalid(format!(
                            "tree {} node {} splits on feature {} but the input has {} columns",
                            index, node, feature, width
                        )));
                    }
                    if threshold.is_nan() {
                        return Err(ArtifactError::Invalid(format!(
                            "tree {} node {} has a NaN threshold",
                            index, node
                        )));
                    }
                    for (side, child) in [("left", *left), ("right", *right)] {
                        if child <= node || child >= n_nodes {
                            return Err(ArtifactError::Invalid(format!(
                                "tree {} node {} has invalid {} child {} ({} nodes)",
                                index, node, side, child, n_nodes
                            )));
                        }
                    }
                }
                TreeNode::Leaf { value } => {
                    if !value.is_finite() {
                        return Err(ArtifactError::Invalid(format!(
                            "tree {} leaf {} is not finite",
                            index, node
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    /// Leaf value reached by `x`. Only called on validated trees.
    pub fn predict(&self, x: &[f64]) -> f64 {
        let mut node = 0;
        loop {
            match &self.nodes[node] {
                TreeNode::Leaf { value } => return *value,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                    default_left,
                } => {
                    let value = x[*feature];
                    let go_left = if value.is_nan() {
                        *default_left
                    } else {
                        value <= *threshold
                    };
                    node = if go_left { *left } else { *right };
                }
            }
        }
    }
}

impl Classifier {
    pub fn kind(&self) -> &'static str {
        match self {
            Classifier::Logistic { .. } => "logistic",
            Classifier::TreeEnsemble { .. } => "tree_ensemble",
        }
    }

    /// Check the classifier can score vectors of length `width`.
    pub fn validate(&self, width: usize) -> Result<(), ArtifactError> {
        match self {
            Classifier::Logistic {
                coefficients,
                intercept,
            } => {
                if coefficients.len() != width {
                    return Err(ArtifactError::Invalid(format!(
                        "logistic model has {} coefficients but the preprocessor produces {} columns",
                        coefficients.len(),
                        width
                    )));
                }
                if !intercept.is_finite() || coefficients.iter().any(|c| !c.is_finite()) {
                    return Err(ArtifactError::Invalid(
                        "logistic model parameters must be finite".to_string(),
                    ));
                }
            }
            Classifier::TreeEnsemble { base_score, trees } => {
                if trees.is_empty() {
                    return Err(ArtifactError::Invalid(
                        "tree ensemble has no trees".to_string(),
                    ));
                }
                if !base_score.is_finite() {
                    return Err(ArtifactError::Invalid(
                        "tree ensemble base_score must be finite".to_string(),
                    ));
                }
                for (index, tree) in trees.iter().enumerate() {
                    tree.validate(index, width)?;
                }
            }
        }
        Ok(())
    }

    /// Raw margin before the logistic link.
    pub fn decision_function(&self, x: &[f64]) -> f64 {
        match self {
            Classifier::Logistic {
                coefficients,
                intercept,
            } => coefficients
                .iter()
                .zip(x)
                .fold(*intercept, |acc, (w, v)| acc + w * v),
            Classifier::TreeEnsemble { base_score, trees } => trees
                .iter()
                .fold(*base_score, |acc, tree| acc + tree.predict(x)),
        }
    }

    /// Probability of the positive class.
    pub fn predict_proba(&self, x: &[f64]) -> f64 {
        sigmoid(self.decision_function(x))
    }
}

/// Logistic function, split on sign to avoid overflow in `exp`.
pub fn sigmoid(margin: f64) -> f64 {
    if margin >= 0.0 {
        1.0 / (1.0 + (-margin).exp())
    } else {
        let e = margin.exp();
        e / (1.0 + e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stump(feature: usize, threshold: f64, left: f64, right: f64) -> RegressionTree {
        RegressionTree::new(vec![
            TreeNode::Split {
                feature,
                threshold,
                left: 1,
                right: 2,
                default_left: false,
            },
            TreeNode::Leaf { value: left },
            TreeNode::Leaf { value: right },
        ])
    }

    #[test]
    fn test_sigmoid() {
        assert_eq!(sigmoid(0.0), 0.5);
        assert!((sigmoid(2.0) + sigmoid(-2.0) - 1.0).abs() < 1e-15);
        assert_eq!(sigmoid(-1000.0), 0.0);
        assert_eq!(sigmoid(1000.0), 1.0);
    }

    #[test]
    fn test_logistic_margin() {
        let model = Classifier::Logistic {
            coefficients: vec![0.5, -1.0],
            intercept: 0.25,
        };
        model.validate(2).unwrap();

        assert_eq!(model.decision_function(&[2.0, 1.0]), 0.25);
        assert!(model.validate(3).is_err());
    }

    #[test]
    fn test_tree_split_is_inclusive_on_the_left() {
        let tree = stump(0, 1.0, -1.0, 1.0);

        assert_eq!(tree.predict(&[1.0]), -1.0);
        assert_eq!(tree.predict(&[1.0001]), 1.0);
        assert_eq!(tree.predict(&[f64::NAN]), 1.0);
    }

    #[test]
    fn test_ensemble_sums_trees() {
        let model = Classifier::TreeEnsemble {
            base_score: -0.5,
            trees: vec![stump(0, 0.0, -1.0, 1.0), stump(1, 0.0, 0.25, 0.75)],
        };
        model.validate(2).unwrap();

        assert_eq!(model.decision_function(&[1.0, -1.0]), 0.75);
        assert_eq!(model.predict_proba(&[-1.0, 1.0]), sigmoid(-0.75));
    }

    #[test]
    fn test_validate_rejects_broken_trees() {
        let cyclic = RegressionTree::new(vec![
            TreeNode::Split {
                feature: 0,
                threshold: 0.0,
                left: 0,
                right: 1,
                default_left: true,
            },
            TreeNode::Leaf { value: 1.0 },
        ]);
        let model = Classifier::TreeEnsemble {
            base_score: 0.0,
            trees: vec![cyclic],
        };
        assert!(model.validate(1).is_err());

        let model = Classifier::TreeEnsemble {
            base_score: 0.0,
            trees: vec![stump(4, 0.0, 0.0, 0.0)],
        };
        assert!(model.validate(4).is_err());

        let model = Classifier::TreeEnsemble {
            base_score: 0.0,
            trees: vec![RegressionTree::new(vec![])],
        };
        assert!(model.validate(1).is_err());
    }

    #[test]
    fn test_split_default_direction_is_left() {
        let json = serde_json::json!({
            "kind": "split", "feature": 0, "threshold": 0.5, "left": 1, "right": 2
        });
        let node: TreeNode = serde_json::from_value(json).unwrap();
        assert!(matches!(node, TreeNode::Split { default_left: true, .. }));
    }
}
