use serde_json::Value;

/// Token synonyms seen across provider accounts, probed in order.
const TOKEN_KEYS: &[&str] = &["access_token", "accessToken", "token"];
/// `None` probes the payload root.
const TOKEN_CONTAINERS: &[Option<&str>] = &[None, Some("result"), Some("data")];

pub(crate) fn extract_token(payload: &Value) -> Option<String> {
    TOKEN_CONTAINERS.iter().find_map(|container| {
        let scope = match container {
            Some(key) => payload.get(key)?,
            None => payload,
        };
        TOKEN_KEYS.iter().find_map(|key| match scope.get(key)? {
            Value::String(token) if !token.trim().is_empty() => Some(token.trim().to_string()),
            Value::Number(number) => Some(number.to_string()),
            _ => None,
        })
    })
}
