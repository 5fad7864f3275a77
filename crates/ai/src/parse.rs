//! Model reply parsing.
//!
//! The model is asked for a bare JSON object mapping item name to quantity,
//! but replies are free text. Code fences are stripped, the top level must be
//! an object, and each value is coerced to an integer where possible.

use serde_json::Value;

use crate::result::{AiError, Detection};

fn strip_code_fence(reply: &str) -> &str {
    let trimmed = reply.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop an optional language tag on the opening fence line.
    let body = match rest.find('\n') {
        Some(pos) => &rest[pos + 1..],
        None => rest,
    };
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

fn coerce_quantity(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.round() as i64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().filter(|f| f.is_finite()).map(|f| f.round() as i64))
        }
        _ => None,
    }
}

/// Parse a model reply into detections (reply order preserved).
///
/// Fails when the reply is not a JSON object. Entries with a blank name or a
/// non-numeric quantity are dropped with a warning.
pub fn parse_scan_reply(reply: &str) -> Result<Vec<Detection>, AiError> {
    let body = strip_code_fence(reply);
    let value: Value =
        serde_json::from_str(body).map_err(|e| AiError::UnparseableReply(e.to_string()))?;

    let Value::Object(map) = value else {
        return Err(AiError::UnparseableReply("expected a JSON object of item -> quantity".to_string()));
    };

    let mut detections = Vec::with_capacity(map.len());
    for (name, raw) in map {
        if name.trim().is_empty() {
            tracing::warn!("dropping detection with blank name");
            continue;
        }
        match coerce_quantity(&raw) {
            Some(quantity) => detections.push(Detection { name, quantity }),
            None => tracing::warn!(item = %name, value = %raw, "dropping detection with non-numeric quantity"),
        }
    }
    Ok(detections)
}
