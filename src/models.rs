use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::normalize::classifier::{clamp_score, classify};

/// Canonical, fully-defaulted assessment consumed by every report renderer.
///
/// Built once per completed request by [`crate::normalize::builder::build`] and
/// never mutated afterwards; a new request produces a new value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    #[serde(flatten)]
    pub overall: OverallRisk,
    pub category_scores: BTreeMap<String, f64>,
    pub risk_items: Vec<RiskItem>,
    pub entities: EntityCollection,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network: Option<NetworkGraph>,
    pub text_metrics: TextMetrics,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_preview: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<SourceInfo>,
}

impl AnalysisResult {
    pub fn overall_risk_score(&self) -> f64 {
        self.overall.score()
    }

    pub fn overall_risk_level(&self) -> RiskLevel {
        self.overall.level()
    }
}

/// Overall score paired with the level derived from it.
///
/// The fields are private so the level can only ever come from [`classify`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverallRisk {
    overall_risk_score: f64,
    overall_risk_level: RiskLevel,
}

impl OverallRisk {
    /// Clamp `score` into `[0, 100]` and derive its level.
    pub fn new(score: f64) -> Self {
        let score = clamp_score(score);
        Self {
            overall_risk_score: score,
            overall_risk_level: classify(score).level,
        }
    }

    pub fn score(&self) -> f64 {
        self.overall_risk_score
    }

    pub fn level(&self) -> RiskLevel {
        self.overall_risk_level
    }
}

impl Default for OverallRisk {
    fn default() -> Self {
        Self::new(0.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskLevel::Low => write!(f, "Low"),
            RiskLevel::Medium => write!(f, "Medium"),
            RiskLevel::High => write!(f, "High"),
        }
    }
}

/// One normalized risk finding, merged from a bare label or a structured object.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskItem {
    /// Never empty. Casing and underscores are left for the renderer.
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    pub keywords_found: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub instance_count: u64,
    pub instances: Vec<RiskInstance>,
}

impl RiskItem {
    /// A bare label with no score, keywords or instances.
    pub fn from_label(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            score: None,
            color: None,
            keywords_found: Vec::new(),
            description: None,
            instance_count: 0,
            instances: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskInstance {
    pub sentence: String,
    pub financial_impact: Vec<String>,
}

/// Deduplicated named-entity lists. Every list is present, possibly empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityCollection {
    pub companies: Vec<String>,
    pub financial_amounts: Vec<String>,
    pub regulatory_bodies: Vec<String>,
    pub percentages: Vec<String>,
    pub dates: Vec<String>,
    pub people: Vec<String>,
}

impl EntityCollection {
    /// All lists paired with a display title, in a fixed order.
    pub fn lists(&self) -> [(&'static str, &[String]); 6] {
        [
            ("Companies", self.companies.as_slice()),
            ("Financial amounts", self.financial_amounts.as_slice()),
            ("Regulatory bodies", self.regulatory_bodies.as_slice()),
            ("Percentages", self.percentages.as_slice()),
            ("Dates", self.dates.as_slice()),
            ("People", self.people.as_slice()),
        ]
    }

    pub fn total(&self) -> usize {
        self.lists().iter().map(|(_, list)| list.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

/// Entity relationship graph. `nodes` and `links` are always present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NetworkGraph {
    pub nodes: Vec<NetworkNode>,
    pub links: Vec<NetworkLink>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NetworkNode {
    pub id: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub node_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NetworkLink {
    pub source: String,
    pub target: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relationship: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextMetrics {
    pub word_count: u64,
    pub sentence_count: u64,
    pub risk_keyword_total: u64,
}

/// Where the analysed content came from, for URL analyses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceInfo {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overall_risk_clamps_and_classifies() {
        let overall = OverallRisk::new(140.0);
        assert_eq!(overall.score(), 100.0);
        assert_eq!(overall.level(), RiskLevel::High);

        let overall = OverallRisk::new(-5.0);
        assert_eq!(overall.score(), 0.0);
        assert_eq!(overall.level(), RiskLevel::Low);
    }

    #[test]
    fn test_risk_level_ordering() {
        assert!(RiskLevel::Low < RiskLevel::Medium);
        assert!(RiskLevel::Medium < RiskLevel::High);
    }

    #[test]
    fn test_entity_collection_total() {
        let entities = EntityCollection {
            companies: vec!["Apple Inc.".to_string()],
            dates: vec!["2024".to_string(), "Q3".to_string()],
            ..Default::default()
        };
        assert_eq!(entities.total(), 3);
        assert!(!entities.is_empty());
        assert!(EntityCollection::default().is_empty());
    }
}
