use serde::{de::Error, Deserialize, Deserializer};
use serde_json::Value;

pub fn number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(0.0),
        Some(Value::Number(n)) => n
            .as_f64()
            .filter(|v| v.is_finite())
            .ok_or_else(|| D::Error::custom(format!("number out of range: {}", n))),
        Some(Value::String(s)) => parse_amount(&s)
            .ok_or_else(|| D::Error::custom(format!("not a numeric amount: {:?}", s))),
        Some(other) => Err(D::Error::custom(format!("expected a number, got {}", other))),
    }
}

pub fn company<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let name = Option::<String>::deserialize(deserializer)?
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());
    Ok(name.unwrap_or_else(super::unknown_company))
}

/// Reads amounts the way statements print them: "$1,234.50", "(300)" for
/// negatives, a dash or em dash for nil.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "-" || trimmed == "\u{2014}" {
        return Some(0.0);
    }

    let (negative, inner) = match trimmed.strip_prefix('(').and_then(|s| s.strip_suffix(')')) {
        Some(inner) => (true, inner),
        None => (false, trimmed),
    };

    let cleaned: String = inner
        .chars()
        .filter(|c| !matches!(c, '$' | ',' | ' '))
        .collect();
    let value = cleaned.parse::<f64>().ok().filter(|v| v.is_finite())?;
    Some(if negative { -value } else { value })
}
