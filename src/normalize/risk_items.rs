use serde_json::{Map, Value};
use tracing::debug;

use crate::models::{RiskInstance, RiskItem};
use crate::normalize::entities::dedupe;
use crate::normalize::payload::non_blank;

/// One entry of a risk list, classified once when it leaves the payload.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawRiskEntry<'a> {
    /// A bare category or headline string.
    Label(&'a str),
    /// A structured risk object carrying a string `type`.
    Object(RiskObject<'a>),
    /// Anything else: numbers, nulls, objects without a `type`.
    Unrecognized,
}

/// A structured risk entry: its `type` plus the remaining fields.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskObject<'a> {
    pub kind: &'a str,
    pub fields: &'a Map<String, Value>,
}

impl<'a> RawRiskEntry<'a> {
    pub fn from_value(value: &'a Value) -> Self {
        match value {
            Value::String(label) => RawRiskEntry::Label(label),
            Value::Object(fields) => match fields.get("type").and_then(Value::as_str) {
                Some(kind) => RawRiskEntry::Object(RiskObject { kind, fields }),
                None => RawRiskEntry::Unrecognized,
            },
            _ => RawRiskEntry::Unrecognized,
        }
    }
}

/// Merge one risk entry into a [`RiskItem`], or `None` when no label can be derived.
pub fn merge(entry: RawRiskEntry<'_>) -> Option<RiskItem> {
    match entry {
        RawRiskEntry::Label(label) => {
            let label = label.trim();
            if label.is_empty() {
                return None;
            }
            Some(RiskItem::from_label(label))
        }
        RawRiskEntry::Object(object) => merge_object(object),
        RawRiskEntry::Unrecognized => None,
    }
}

fn merge_object(object: RiskObject<'_>) -> Option<RiskItem> {
    let label = object.kind.trim();
    if label.is_empty() {
        return None;
    }

    let fields = object.fields;
    let instances = fields.get("instances").and_then(Value::as_array).map(|list| {
        list.iter()
            .filter_map(parse_instance)
            .collect::<Vec<_>>()
    });

    // An explicit count wins over the list length; the list may be a sample.
    let instance_count = fields
        .get("sentence_count")
        .and_then(Value::as_f64)
        .map(|n| n.max(0.0).round() as u64)
        .or_else(|| instances.as_ref().map(|list| list.len() as u64))
        .unwrap_or(0);

    let keywords_found = fields
        .get("keywords_found")
        .and_then(Value::as_array)
        .map(|list| dedupe(list.iter().map(Value::as_str)))
        .unwrap_or_default();

    Some(RiskItem {
        label: label.to_string(),
        score: fields.get("score").and_then(Value::as_f64),
        color: fields.get("color").and_then(non_blank).map(str::to_string),
        keywords_found,
        description: fields
            .get("description")
            .and_then(non_blank)
            .map(str::to_string),
        instance_count,
        instances: instances.unwrap_or_default(),
    })
}

/// An instance is either `{sentence, financial_impact[]}` or a bare sentence.
fn parse_instance(value: &Value) -> Option<RiskInstance> {
    match value {
        Value::String(sentence) => Some(RiskInstance {
            sentence: sentence.clone(),
            financial_impact: Vec::new(),
        }),
        Value::Object(fields) => Some(RiskInstance {
            sentence: fields
                .get("sentence")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            financial_impact: fields
                .get("financial_impact")
                .and_then(Value::as_array)
                .map(|list| {
                    list.iter()
                        .filter_map(Value::as_str)
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default(),
        }),
        _ => None,
    }
}

/// Merge whichever risk list is authoritative.
///
/// A non-empty `structured` list is used on its own; `fallback` is only read
/// when `structured` is absent or empty, so one risk is never reported twice.
/// Entries without a derivable label are dropped.
pub fn merge_lists(structured: Option<&[Value]>, fallback: Option<&[Value]>) -> Vec<RiskItem> {
    let source = match structured {
        Some(list) if !list.is_empty() => list,
        _ => fallback.unwrap_or_default(),
    };

    let items: Vec<RiskItem> = source
        .iter()
        .map(RawRiskEntry::from_value)
        .filter_map(merge)
        .collect();

    let dropped = source.len() - items.len();
    if dropped > 0 {
        debug!(dropped, "dropped risk entries without a label");
    }

    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn merge_value(value: &Value) -> Option<RiskItem> {
        merge(RawRiskEntry::from_value(value))
    }

    #[test]
    fn test_merge_plain_label() {
        let item = merge_value(&json!("Liquidity risk")).unwrap();
        assert_eq!(item, RiskItem::from_label("Liquidity risk"));
        assert_eq!(item.score, None);
        assert_eq!(item.instance_count, 0);
        assert!(item.keywords_found.is_empty());
    }

    #[test]
    fn test_merge_structured_object() {
        let item = merge_value(&json!({
            "type": "credit_risk",
            "score": 72,
            "keywords_found": ["default", "covenant"]
        }))
        .unwrap();

        assert_eq!(item.label, "credit_risk");
        assert_eq!(item.score, Some(72.0));
        assert_eq!(item.instance_count, 0);
        assert_eq!(item.keywords_found, vec!["default", "covenant"]);
        assert!(item.instances.is_empty());
    }

    #[test]
    fn test_merge_full_object() {
        let item = merge_value(&json!({
            "type": "regulatory_risk",
            "score": 55.5,
            "color": "#96CEB4",
            "description": "Detected 2 risk instances",
            "keywords_found": ["investigation", "fine", "investigation", " "],
            "instances": [
                { "sentence": "The SEC opened an investigation.", "financial_impact": [] },
                { "sentence": "Fines could reach $10 billion.", "financial_impact": ["$10 billion"] }
            ]
        }))
        .unwrap();

        assert_eq!(item.color.as_deref(), Some("#96CEB4"));
        assert_eq!(item.description.as_deref(), Some("Detected 2 risk instances"));
        assert_eq!(item.keywords_found, vec!["investigation", "fine"]);
        assert_eq!(item.instance_count, 2);
        assert_eq!(item.instances[1].financial_impact, vec!["$10 billion"]);
    }

    #[test]
    fn test_explicit_sentence_count_wins() {
        let item = merge_value(&json!({
            "type": "market_risk",
            "sentence_count": 7,
            "instances": [{ "sentence": "Rates rose.", "financial_impact": [] }]
        }))
        .unwrap();
        assert_eq!(item.instance_count, 7);
        assert_eq!(item.instances.len(), 1);
    }

    #[test]
    fn test_non_numeric_score_is_absent() {
        let item = merge_value(&json!({ "type": "fraud_risk", "score": "high" })).unwrap();
        assert_eq!(item.score, None);
    }

    #[test]
    fn test_unlabelled_entries_are_dropped() {
        assert_eq!(merge_value(&json!("   ")), None);
        assert_eq!(merge_value(&json!({ "type": "" })), None);
        assert_eq!(merge_value(&json!({ "score": 80 })), None);
        assert_eq!(merge_value(&json!({ "type": 3 })), None);
        assert_eq!(merge_value(&json!(42)), None);
        assert_eq!(merge_value(&Value::Null), None);
    }

    #[test]
    fn test_structured_list_is_authoritative() {
        let structured = vec![json!({ "type": "fraud_risk", "score": 80 })];
        let fallback = vec![json!("Fraud")];

        let items = merge_lists(Some(structured.as_slice()), Some(fallback.as_slice()));
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].label, "fraud_risk");
    }

    #[test]
    fn test_fallback_used_when_structured_empty() {
        let fallback = vec![json!("Fraud"), json!({ "type": "credit_risk" }), json!(null)];

        let items = merge_lists(Some(&[][..]), Some(fallback.as_slice()));
        let labels: Vec<&str> = items.iter().map(|i| i.label.as_str()).collect();
        assert_eq!(labels, vec!["Fraud", "credit_risk"]);

        assert!(merge_lists(None, None).is_empty());
    }
}
