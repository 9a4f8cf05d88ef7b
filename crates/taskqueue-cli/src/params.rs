//! `--params` parsing: a JSON object, or a comma-separated `k=v` list where
//! each value is parsed as JSON if possible, else kept as a string.

use serde_json::{Map, Value};

pub fn parse_params(input: &str) -> anyhow::Result<Value> {
    let trimmed = input.trim();
    if trimmed.starts_with('{') {
        let value: Value = serde_json::from_str(trimmed)?;
        return Ok(value);
    }

    let mut map = Map::new();
    for pair in trimmed.split(',').filter(|p| !p.trim().is_empty()) {
        let (key, value) = pair
            .split_once('=')
            .ok_or_else(|| anyhow::anyhow!("malformed --params entry '{pair}', expected k=v"))?;
        let key = key.trim().to_string();
        let value = value.trim();
        let parsed = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
        map.insert(key, parsed);
    }
    Ok(Value::Object(map))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_json_object_directly() {
        let value = parse_params(r#"{"a": 1, "b": "x"}"#).unwrap();
        assert_eq!(value, serde_json::json!({"a": 1, "b": "x"}));
    }

    #[test]
    fn parses_key_value_list_with_typed_values() {
        let value = parse_params("count=3, name=bob, active=true").unwrap();
        assert_eq!(
            value,
            serde_json::json!({"count": 3, "name": "bob", "active": true})
        );
    }

    #[test]
    fn keeps_unparsable_values_as_strings() {
        let value = parse_params("note=not json here").unwrap();
        assert_eq!(value, serde_json::json!({"note": "not json here"}));
    }

    #[test]
    fn rejects_malformed_pair() {
        assert!(parse_params("novalue").is_err());
    }
}
