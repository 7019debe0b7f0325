//! Gradient-geboostete Entscheidungsbäume mit logistischer Verknüpfung.
//!
//! Jeder Baum ist eine flache Knotenliste, Knoten 0 ist die Wurzel. Ein
//! Split schickt den Wert nach links, wenn `x < threshold`. Kinder stehen
//! immer hinter ihrem Elternknoten; dadurch terminiert jede Auswertung.

use airrec_core::OracleError;
use serde::{Deserialize, Serialize};

use crate::error::{ModelLoadError, Result};
use crate::FEATURE_COUNT;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Node {
    #[serde(rename = "split")]
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    #[serde(rename = "leaf")]
    Leaf { value: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tree {
    pub nodes: Vec<Node>,
}

impl Tree {
    fn validate(&self, tree: usize) -> Result<()> {
        if self.nodes.is_empty() {
            return Err(invalid(format!("tree {tree} has no nodes")));
        }
        let n = self.nodes.len();
        for (idx, node) in self.nodes.iter().enumerate() {
            match *node {
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if feature >= FEATURE_COUNT {
                        return Err(invalid(format!(
                            "tree {tree} node {idx}: feature index {feature} out of range"
                        )));
                    }
                    if !threshold.is_finite() {
                        return Err(invalid(format!(
                            "tree {tree} node {idx}: threshold is not finite"
                        )));
                    }
                    for child in [left, right] {
                        if child <= idx || child >= n {
                            return Err(invalid(format!(
                                "tree {tree} node {idx}: child {child} must lie in {}..{n}",
                                idx + 1
                            )));
                        }
                    }
                }
                Node::Leaf { value } => {
                    if !value.is_finite() {
                        return Err(invalid(format!(
                            "tree {tree} node {idx}: leaf value is not finite"
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    /// Wert des erreichten Blatts.
    fn leaf_value(&self, x: &[f64; FEATURE_COUNT]) -> std::result::Result<f64, OracleError> {
        let mut idx = 0;
        loop {
            match self.nodes.get(idx) {
                Some(Node::Leaf { value }) => return Ok(*value),
                Some(Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                }) => {
                    let v = x.get(*feature).copied().ok_or_else(|| {
                        OracleError::new(format!("feature index {feature} out of range"))
                    })?;
                    let next = if v < *threshold { *left } else { *right };
                    if next <= idx {
                        return Err(OracleError::new(format!("tree loops back at node {idx}")));
                    }
                    idx = next;
                }
                None => return Err(OracleError::new(format!("node {idx} does not exist"))),
            }
        }
    }

    fn uses_feature(&self, feature: usize) -> bool {
        self.nodes
            .iter()
            .any(|n| matches!(n, Node::Split { feature: f, .. } if *f == feature))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeEnsemble {
    /// Startwert des Margins vor den Bäumen.
    #[serde(default)]
    pub base_score: f64,
    pub trees: Vec<Tree>,
}

impl TreeEnsemble {
    pub(crate) fn validate(&self) -> Result<()> {
        if self.trees.is_empty() {
            return Err(invalid("tree ensemble has no trees".to_string()));
        }
        if !self.base_score.is_finite() {
            return Err(invalid("base_score is not finite".to_string()));
        }
        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate(i)?;
        }
        Ok(())
    }

    pub(crate) fn margin(&self, x: &[f64; FEATURE_COUNT]) -> std::result::Result<f64, OracleError> {
        self.trees
            .iter()
            .try_fold(self.base_score, |acc, t| Ok(acc + t.leaf_value(x)?))
    }

    /// Merkmale, auf die kein Baum je splittet.
    pub(crate) fn unused_features(&self) -> Vec<usize> {
        (0..FEATURE_COUNT)
            .filter(|&f| !self.trees.iter().any(|t| t.uses_feature(f)))
            .collect()
    }
}

fn invalid(msg: String) -> ModelLoadError {
    ModelLoadError::InvalidModel(msg)
}
