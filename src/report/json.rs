use anyhow::Result;

use crate::models::AnalysisResult;

/// Print the canonical model as pretty JSON on stdout.
pub fn render(result: &AnalysisResult) -> Result<()> {
    println!("{}", to_json(result)?);
    Ok(())
}

fn to_json(result: &AnalysisResult) -> Result<String> {
    Ok(serde_json::to_string_pretty(result)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::builder::build;
    use crate::normalize::payload::RawPayload;
    use serde_json::{json, Value};

    fn render_value(payload: Value) -> Value {
        let result = build(&RawPayload::from_value(payload).unwrap());
        serde_json::from_str(&to_json(&result).unwrap()).unwrap()
    }

    #[test]
    fn test_empty_payload_shape() {
        let out = render_value(json!({}));

        assert_eq!(out["overallRiskScore"], json!(0.0));
        assert_eq!(out["overallRiskLevel"], json!("low"));
        assert_eq!(out["categoryScores"], json!({}));
        assert_eq!(out["riskItems"], json!([]));
        assert_eq!(out["entities"]["financialAmounts"], json!([]));
        assert_eq!(
            out["textMetrics"],
            json!({ "wordCount": 0, "sentenceCount": 0, "riskKeywordTotal": 0 })
        );
        // Absent optionals are omitted rather than null.
        assert!(out.get("network").is_none());
        assert!(out.get("contentPreview").is_none());
    }

    #[test]
    fn test_risk_item_and_network_shape() {
        let out = render_value(json!({
            "risk_scores": { "overall_risk_score": 81 },
            "risk_categories": [{ "type": "credit_risk", "score": 81, "keywords_found": ["default"] }],
            "visualization_data": { "network_data": { "nodes": [{ "id": "Acme", "type": "company" }] } }
        }));

        assert_eq!(out["overallRiskLevel"], json!("high"));
        assert_eq!(
            out["riskItems"][0],
            json!({
                "label": "credit_risk",
                "score": 81.0,
                "keywordsFound": ["default"],
                "instanceCount": 0,
                "instances": []
            })
        );
        assert_eq!(
            out["network"],
            json!({ "nodes": [{ "id": "Acme", "type": "company" }], "links": [] })
        );
    }
}
