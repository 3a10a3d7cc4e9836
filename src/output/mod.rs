//! Output formatting for CLI results

pub mod table;

/// Pretty-print a JSON value with 2-space indentation.
///
/// `serde_json` is built with `preserve_order`, so the keys come out exactly
/// as the service sent them and the same body always renders the same bytes.
pub fn format_json(value: &serde_json::Value) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_json_indents() {
        let value: serde_json::Value =
            serde_json::from_str(r#"{"items":[{"severity":"high"}]}"#).unwrap();
        let out = format_json(&value).unwrap();

        assert_eq!(
            out,
            "{\n  \"items\": [\n    {\n      \"severity\": \"high\"\n    }\n  ]\n}"
        );
    }

    #[test]
    fn test_format_json_preserves_server_key_order() {
        let value: serde_json::Value =
            serde_json::from_str(r#"{"zeta":1,"alpha":2,"mid":3}"#).unwrap();
        let out = format_json(&value).unwrap();

        let zeta = out.find("zeta").unwrap();
        let alpha = out.find("alpha").unwrap();
        let mid = out.find("mid").unwrap();
        assert!(zeta < alpha && alpha < mid);
    }

    #[test]
    fn test_format_json_is_reproducible() {
        let raw = r#"{"b":[1,2],"a":{"y":true,"x":null}}"#;
        let v1: serde_json::Value = serde_json::from_str(raw).unwrap();
        let v2: serde_json::Value = serde_json::from_str(raw).unwrap();
        assert_eq!(format_json(&v1).unwrap(), format_json(&v2).unwrap());
    }
}
