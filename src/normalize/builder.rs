use std::collections::BTreeMap;

use serde_json::{Map, Value};
use tracing::debug;

use crate::models::{
    AnalysisResult, EntityCollection, NetworkGraph, NetworkLink, NetworkNode, OverallRisk,
    SourceInfo, TextMetrics,
};
use crate::normalize::classifier::clamp_score;
use crate::normalize::entities::dedupe;
use crate::normalize::payload::{non_blank, RawPayload, Scoped};
use crate::normalize::risk_items::merge_lists;

// Every field name the service has been seen to use lives here and nowhere else.

/// Section newer service versions wrap their results in; searched before the top level.
const NESTED_SECTION: &str = "analysis";

const SCORE_SECTION: &str = "risk_scores";
const LEGACY_SCORE_SECTION: &str = "risk_tags";
const CATEGORY_SCORES: &str = "category_scores";
const OVERALL_KEYS: [&str; 2] = ["overall_risk_score", "overall_risk"];
const LEGACY_OVERALL_KEY: &str = "overall";
const RISK_SUMMARY: &str = "risk_summary";

const STRUCTURED_RISKS: &str = "risk_categories";
const FALLBACK_RISKS: &str = "detected_risks";

const ENTITY_SECTIONS: [&str; 2] = ["entities_extracted", "entities"];

/// `(parent, child)` pairs holding a `{nodes, links}` graph, in priority order.
const NETWORK_SECTIONS: [(&str, &str); 2] = [
    ("visualization_data", "network_data"),
    ("relationships", "risk_networks"),
];

const PREVIEW_KEYS: [&str; 2] = ["content_preview", "text_preview"];

/// Which score container the payload carries.
#[derive(Debug, Clone, Copy)]
enum ScoreSection<'a> {
    /// `{overall_risk_score|overall_risk, category_scores{}, risk_summary{}}`.
    Structured(&'a Map<String, Value>),
    /// Flat `{category: fraction, ..., overall: fraction}` with fractions in `[0, 1]`.
    LegacyTags(&'a Map<String, Value>),
}

impl<'a> ScoreSection<'a> {
    fn fields(&self) -> &'a Map<String, Value> {
        match *self {
            ScoreSection::Structured(map) | ScoreSection::LegacyTags(map) => map,
        }
    }
}

/// Build the canonical [`AnalysisResult`] from a raw service payload.
///
/// Never fails: every field that is missing or has an unexpected shape
/// resolves to its documented default. The overall risk level is derived from
/// the resolved score; any level string supplied by the service is ignored.
pub fn build(raw: &RawPayload) -> AnalysisResult {
    let raw = &raw.scoped(NESTED_SECTION);
    let scores = score_section(raw);

    let (overall_score, origin) = resolve_overall_score(raw, scores);
    debug!(origin, score = overall_score, "resolved overall risk score");

    let risk_items = merge_lists(
        raw.non_empty_array(STRUCTURED_RISKS).map(Vec::as_slice),
        raw.array(FALLBACK_RISKS).map(Vec::as_slice),
    );

    let result = AnalysisResult {
        category_scores: category_scores(scores),
        risk_items,
        entities: entities(raw),
        network: network(raw),
        text_metrics: text_metrics(raw),
        content_preview: PREVIEW_KEYS
            .iter()
            .find_map(|key| raw.text(key))
            .map(str::to_string),
        recommendation: recommendation(scores),
        source: source(raw),
        overall: OverallRisk::new(overall_score),
    };

    debug!(
        level = %result.overall_risk_level(),
        categories = result.category_scores.len(),
        risk_items = result.risk_items.len(),
        entities = result.entities.total(),
        network = result.network.is_some(),
        "built analysis result"
    );

    result
}

fn score_section<'a>(raw: &Scoped<'a>) -> Option<ScoreSection<'a>> {
    if let Some(section) = raw.object(SCORE_SECTION) {
        return Some(ScoreSection::Structured(section));
    }

    let tags = raw.object(LEGACY_SCORE_SECTION)?;
    let structured = tags.contains_key(CATEGORY_SCORES)
        || OVERALL_KEYS.iter().any(|key| tags.contains_key(*key));

    if structured {
        Some(ScoreSection::Structured(tags))
    } else {
        Some(ScoreSection::LegacyTags(tags))
    }
}

/// First present source wins: score section, then a top-level field, then the
/// legacy `overall` fraction, then 0.
fn resolve_overall_score(raw: &Scoped<'_>, scores: Option<ScoreSection<'_>>) -> (f64, &'static str) {
    if let Some(ScoreSection::Structured(section)) = scores {
        for key in OVERALL_KEYS {
            if let Some(score) = section.get(key).and_then(Value::as_f64) {
                return (score, key);
            }
        }
    }

    for key in OVERALL_KEYS {
        if let Some(score) = raw.number(key) {
            return (score, "top-level");
        }
    }

    if let Some(ScoreSection::LegacyTags(tags)) = scores {
        if let Some(fraction) = tags.get(LEGACY_OVERALL_KEY).and_then(Value::as_f64) {
            return (fraction * 100.0, LEGACY_OVERALL_KEY);
        }
    }

    (0.0, "default")
}

fn category_scores(scores: Option<ScoreSection<'_>>) -> BTreeMap<String, f64> {
    let mut out = BTreeMap::new();

    let (entries, scale, skip) = match scores {
        Some(ScoreSection::Structured(section)) => {
            match section.get(CATEGORY_SCORES).and_then(Value::as_object) {
                Some(entries) => (entries, 1.0, None),
                None => return out,
            }
        }
        Some(ScoreSection::LegacyTags(tags)) => (tags, 100.0, Some(LEGACY_OVERALL_KEY)),
        None => return out,
    };

    for (name, value) in entries {
        if skip == Some(name.as_str()) {
            continue;
        }
        let Some(score) = value.as_f64() else {
            continue;
        };
        let key = category_key(name);
        if key.is_empty() {
            continue;
        }
        out.entry(key).or_insert(clamp_score(score * scale));
    }

    out
}

/// `"Credit Risk"` → `credit_risk`; runs of non-alphanumerics collapse to one `_`.
fn category_key(name: &str) -> String {
    let mut key = String::with_capacity(name.len());
    for ch in name.trim().chars() {
        if ch.is_alphanumeric() {
            key.extend(ch.to_lowercase());
        } else if !key.is_empty() && !key.ends_with('_') {
            key.push('_');
        }
    }
    while key.ends_with('_') {
        key.pop();
    }
    key
}

fn recommendation(scores: Option<ScoreSection<'_>>) -> Option<String> {
    scores?
        .fields()
        .get(RISK_SUMMARY)
        .and_then(Value::as_object)
        .and_then(|summary| summary.get("recommendation"))
        .and_then(non_blank)
        .map(|text| text.trim().to_string())
}

fn entities(raw: &Scoped<'_>) -> EntityCollection {
    let sections: Vec<&Map<String, Value>> = ENTITY_SECTIONS
        .iter()
        .filter_map(|key| raw.object(key))
        .collect();

    // The first section that carries the list (under any alias) wins.
    let list = |aliases: &[&str]| -> Vec<String> {
        sections
            .iter()
            .find_map(|section| {
                aliases
                    .iter()
                    .find_map(|alias| section.get(*alias).and_then(Value::as_array))
            })
            .map(|values| dedupe(values.iter().map(Value::as_str)))
            .unwrap_or_default()
    };

    EntityCollection {
        companies: list(&["companies"]),
        financial_amounts: list(&["financial_amounts", "amounts"]),
        regulatory_bodies: list(&["regulatory_bodies", "regulators"]),
        percentages: list(&["percentages"]),
        dates: list(&["dates"]),
        people: list(&["people"]),
    }
}

/// `None` when no graph section exists; a present section always yields
/// `nodes` and `links`, empty if missing.
fn network(raw: &Scoped<'_>) -> Option<NetworkGraph> {
    let graph = NETWORK_SECTIONS.iter().find_map(|(parent, child)| {
        raw.object(parent)
            .and_then(|section| section.get(*child))
            .and_then(Value::as_object)
    })?;

    let nodes = graph
        .get("nodes")
        .and_then(Value::as_array)
        .map(|list| list.iter().filter_map(parse_node).collect())
        .unwrap_or_default();

    let links = graph
        .get("links")
        .and_then(Value::as_array)
        .map(|list| list.iter().filter_map(parse_link).collect())
        .unwrap_or_default();

    Some(NetworkGraph { nodes, links })
}

fn parse_node(value: &Value) -> Option<NetworkNode> {
    match value {
        Value::Object(fields) => Some(NetworkNode {
            id: fields.get("id").and_then(node_id)?,
            node_type: fields.get("type").and_then(non_blank).map(str::to_string),
        }),
        other => Some(NetworkNode {
            id: node_id(other)?,
            node_type: None,
        }),
    }
}

fn parse_link(value: &Value) -> Option<NetworkLink> {
    let fields = value.as_object()?;
    let relationship = ["relationship", "type"]
        .iter()
        .find_map(|key| fields.get(*key).and_then(non_blank))
        .map(str::to_string);

    Some(NetworkLink {
        source: fields.get("source").and_then(node_id)?,
        target: fields.get("target").and_then(node_id)?,
        relationship,
    })
}

/// Node ids are non-blank strings or numbers.
fn node_id(value: &Value) -> Option<String> {
    match value {
        Value::String(id) if !id.trim().is_empty() => Some(id.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn text_metrics(raw: &Scoped<'_>) -> TextMetrics {
    let metrics = raw.object("text_metrics");
    let document = raw.object("document_info");

    let count = |section: Option<&Map<String, Value>>, key: &str| {
        section.and_then(|s| s.get(key)).and_then(as_count)
    };

    TextMetrics {
        word_count: count(metrics, "word_count")
            .or_else(|| count(document, "word_count"))
            .unwrap_or(0),
        sentence_count: count(metrics, "sentence_count").unwrap_or(0),
        risk_keyword_total: count(metrics, "risk_keywords_total")
            .or_else(|| count(metrics, "risk_keyword_total"))
            .unwrap_or(0),
    }
}

fn as_count(value: &Value) -> Option<u64> {
    value
        .as_u64()
        .or_else(|| value.as_f64().map(|n| n.max(0.0).round() as u64))
}

fn source(raw: &Scoped<'_>) -> Option<SourceInfo> {
    let info = raw.object("url_info")?;
    Some(SourceInfo {
        url: info.get("url").and_then(non_blank)?.trim().to_string(),
        title: info
            .get("title")
            .and_then(non_blank)
            .map(|title| title.trim().to_string()),
    })
}
