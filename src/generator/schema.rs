use crate::spec::Operation;
use serde_json::Value;

/// Last segment of a `$ref` string
///
/// `#/definitions/Pet` → `Pet`, `#/components/schemas/Pet` → `Pet`.
pub fn ref_name(reference: &str) -> &str {
    reference.rsplit('/').next().unwrap_or(reference)
}

/// Map a parameter declaration or schema fragment to a documentation type
///
/// A declaration without a direct `type` is looked at through its `schema`.
/// References are named, never expanded. Unknown or absent types fall back to
/// `string`.
///
/// # Example
///
/// ```rust,ignore
/// assert_eq!(resolve_type(&json!({"type": "integer"})), "number");
/// assert_eq!(resolve_type(&json!({"type": "array", "items": {"type": "string"}})), "string[]");
/// assert_eq!(resolve_type(&json!({"schema": {"$ref": "#/definitions/Pet"}})), "Pet");
/// ```
pub fn resolve_type(value: &Value) -> String {
    let node = match (value.get("type"), value.get("schema")) {
        (None, Some(schema)) => schema,
        _ => value,
    };

    if let Some(reference) = node.get("$ref").and_then(Value::as_str) {
        return ref_name(reference).to_string();
    }

    match node.get("type").and_then(Value::as_str) {
        Some("integer") | Some("number") => "number".to_string(),
        Some("boolean") => "boolean".to_string(),
        Some("object") | Some("file") => "object".to_string(),
        Some("array") => match node.get("items") {
            Some(items) if items.is_object() => format!("{}[]", resolve_type(items)),
            _ => "any[]".to_string(),
        },
        _ => "string".to_string(),
    }
}

/// `true` when the declaration's type comes from a `$ref`
pub fn is_reference(value: &Value) -> bool {
    value.get("$ref").is_some() || value.pointer("/schema/$ref").is_some()
}

/// Documented return type: `Promise<T>` of the first success response
/// (`200`, `201`, `default`), or `Promise<any>`.
pub fn response_type(operation: &Operation) -> String {
    match operation
        .success_response()
        .and_then(|r| r.schema.as_ref())
    {
        Some(schema) => format!("Promise<{}>", resolve_type(schema)),
        None => "Promise<any>".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::Response;
    use http::Method;
    use indexmap::IndexMap;
    use serde_json::json;

    #[test]
    fn test_primitives() {
        assert_eq!(resolve_type(&json!({"type": "integer"})), "number");
        assert_eq!(resolve_type(&json!({"type": "number", "format": "double"})), "number");
        assert_eq!(resolve_type(&json!({"type": "boolean"})), "boolean");
        assert_eq!(resolve_type(&json!({"type": "string"})), "string");
        assert_eq!(resolve_type(&json!({"type": "file"})), "object");
        assert_eq!(resolve_type(&json!({"type": "object"})), "object");
        assert_eq!(resolve_type(&json!({"type": "uuid"})), "string");
        assert_eq!(resolve_type(&json!({})), "string");
        assert_eq!(resolve_type(&json!(null)), "string");
    }

    #[test]
    fn test_references_are_named() {
        assert_eq!(resolve_type(&json!({"schema": {"$ref": "#/definitions/Pet"}})), "Pet");
        assert_eq!(resolve_type(&json!({"$ref": "#/components/schemas/Owner"})), "Owner");
        assert_eq!(resolve_type(&json!({"$ref": "Plain"})), "Plain");
    }

    #[test]
    fn test_arrays() {
        assert_eq!(
            resolve_type(&json!({"type": "array", "items": {"type": "string"}})),
            "string[]"
        );
        assert_eq!(
            resolve_type(&json!({"type": "array", "items": {"$ref": "#/definitions/Pet"}})),
            "Pet[]"
        );
        assert_eq!(
            resolve_type(&json!({"type": "array", "items": {"type": "array", "items": {"type": "integer"}}})),
            "number[][]"
        );
        assert_eq!(resolve_type(&json!({"type": "array"})), "any[]");
        assert_eq!(
            resolve_type(&json!({"schema": {"type": "array", "items": {"$ref": "#/definitions/Tag"}}})),
            "Tag[]"
        );
    }

    #[test]
    fn test_direct_type_wins_over_schema() {
        assert_eq!(
            resolve_type(&json!({"type": "integer", "schema": {"$ref": "#/definitions/Pet"}})),
            "number"
        );
    }

    #[test]
    fn test_response_type() {
        let mut responses = IndexMap::new();
        responses.insert(
            "404".to_string(),
            Response { description: None, schema: Some(json!({"type": "string"})) },
        );
        let mut operation = Operation {
            method: Method::GET,
            operation_id: None,
            summary: None,
            description: None,
            tags: vec![],
            parameters: vec![],
            responses,
            deprecated: false,
        };
        assert_eq!(response_type(&operation), "Promise<any>");

        operation.responses.insert(
            "200".to_string(),
            Response {
                description: Some("OK".to_string()),
                schema: Some(json!({"type": "array", "items": {"$ref": "#/definitions/Pet"}})),
            },
        );
        assert_eq!(response_type(&operation), "Promise<Pet[]>");
    }
}
