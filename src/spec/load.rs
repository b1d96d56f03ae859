use super::types::{
    Document, Operation, Parameter, ParameterLocation, PathItem, Response, METHODS,
};
use crate::error::GenerateError;
use http::Method;
use indexmap::IndexMap;
use serde_json::{json, Map, Value};
use std::collections::HashSet;
use tracing::{debug, warn};

/// Prefixes under which a `$ref` names a schema definition
const DEFINITION_PREFIXES: [&str; 2] = ["#/definitions/", "#/components/schemas/"];

/// Build a [`Document`] from a parsed JSON value.
///
/// Only the outer shape is enforced: the root must be an object. A document
/// lacking `swagger`, `openapi` and `paths` is loaded anyway with a warning.
/// Everything below the path map degrades silently (unknown parameter
/// locations, non-method keys and unparseable entries are skipped).
///
/// # Errors
///
/// Returns [`GenerateError::DocumentMalformed`] if `root` is not an object.
pub fn load_document(root: &Value) -> Result<Document, GenerateError> {
    let obj = root.as_object().ok_or_else(|| {
        GenerateError::malformed(format!(
            "expected a JSON object at the document root, found {}",
            value_kind(root)
        ))
    })?;

    if !obj.contains_key("swagger") && !obj.contains_key("openapi") && !obj.contains_key("paths") {
        warn!("Document has no 'swagger', 'openapi' or 'paths' key; it may not be an API description");
    }

    let mut definitions = IndexMap::new();
    let sections = [
        obj.get("definitions"),
        root.pointer("/components/schemas"),
    ];
    for section in sections.into_iter().flatten() {
        if let Some(map) = section.as_object() {
            for (name, schema) in map {
                definitions.insert(name.clone(), schema.clone());
            }
        }
    }

    let mut paths = Vec::new();
    if let Some(path_map) = obj.get("paths").and_then(Value::as_object) {
        for (path, item) in path_map {
            let Some(item) = item.as_object() else {
                debug!(path = %path, "Skipping path item that is not an object");
                continue;
            };
            paths.push(PathItem {
                path: path.clone(),
                operations: load_path_item(root, path, item),
            });
        }
    }

    let document = Document {
        base_path: obj
            .get("basePath")
            .and_then(Value::as_str)
            .map(str::to_string),
        definitions,
        paths,
    };

    for name in dangling_refs(&document) {
        warn!(definition = %name, "Reference names a definition that does not exist");
    }

    Ok(document)
}

fn load_path_item(root: &Value, path: &str, item: &Map<String, Value>) -> Vec<Operation> {
    let shared = item
        .get("parameters")
        .map(|p| load_parameters(root, path, p))
        .unwrap_or_default();

    let mut operations = Vec::new();
    for (key, raw) in item {
        let lower = key.to_ascii_lowercase();
        if !METHODS.contains(&lower.as_str()) {
            continue;
        }
        let Some(raw) = raw.as_object() else {
            debug!(path = %path, method = %lower, "Skipping operation that is not an object");
            continue;
        };
        let Ok(method) = Method::from_bytes(lower.to_ascii_uppercase().as_bytes()) else {
            continue;
        };
        operations.push(load_operation(root, path, method, raw, &shared));
    }
    operations
}

fn load_operation(
    root: &Value,
    path: &str,
    method: Method,
    raw: &Map<String, Value>,
    shared: &[Parameter],
) -> Operation {
    let own = raw
        .get("parameters")
        .map(|p| load_parameters(root, path, p))
        .unwrap_or_default();

    // Operation-level declarations override path-level ones with the same (name, in).
    let overridden: HashSet<(&str, ParameterLocation)> =
        own.iter().map(|p| (p.name.as_str(), p.location)).collect();
    let mut parameters: Vec<Parameter> = shared
        .iter()
        .filter(|p| !overridden.contains(&(p.name.as_str(), p.location)))
        .cloned()
        .collect();
    parameters.extend(own);

    if let Some(body) = raw.get("requestBody") {
        if let Some(param) = load_request_body(root, body) {
            parameters.push(param);
        }
    }

    let mut responses = IndexMap::new();
    if let Some(map) = raw.get("responses").and_then(Value::as_object) {
        for (code, response) in map {
            let response = resolve_local(root, response);
            responses.insert(
                code.clone(),
                Response {
                    description: string_field(response.get("description")),
                    schema: response
                        .get("schema")
                        .or_else(|| media_schema(response))
                        .cloned(),
                },
            );
        }
    }

    Operation {
        method,
        operation_id: string_field(raw.get("operationId")),
        summary: string_field(raw.get("summary")),
        description: string_field(raw.get("description")),
        tags: raw
            .get("tags")
            .and_then(Value::as_array)
            .map(|tags| {
                tags.iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default(),
        parameters,
        responses,
        deprecated: raw
            .get("deprecated")
            .and_then(Value::as_bool)
            .unwrap_or(false),
    }
}

fn load_parameters(root: &Value, path: &str, raw: &Value) -> Vec<Parameter> {
    let Some(list) = raw.as_array() else {
        return Vec::new();
    };
    list.iter()
        .filter_map(|param| {
            let param = resolve_local(root, param);
            let name = param.get("name").and_then(Value::as_str)?;
            let location = param.get("in").and_then(Value::as_str).unwrap_or_default();
            let Some(location) = ParameterLocation::parse(location) else {
                debug!(path = %path, parameter = %name, location = %location, "Ignoring parameter location");
                return None;
            };
            Some(Parameter {
                name: name.to_string(),
                location,
                description: string_field(param.get("description")),
                declaration: param.clone(),
            })
        })
        .collect()
}

/// An OpenAPI 3 `requestBody` becomes a body parameter named `body`.
fn load_request_body(root: &Value, raw: &Value) -> Option<Parameter> {
    let body = resolve_local(root, raw);
    if !body.is_object() {
        return None;
    }
    let declaration = match media_schema(body) {
        Some(schema) => json!({ "schema": schema }),
        None => json!({}),
    };
    Some(Parameter {
        name: "body".to_string(),
        location: ParameterLocation::Body,
        description: string_field(body.get("description")),
        declaration,
    })
}

/// Schema of the first media type under `content`
fn media_schema(value: &Value) -> Option<&Value> {
    value
        .get("content")?
        .as_object()?
        .values()
        .find_map(|media| media.get("schema"))
}

/// Follow one local `$ref` hop (`#/parameters/...`, `#/components/...`).
///
/// Definitions are deliberately left alone; they are only ever named.
fn resolve_local<'a>(root: &'a Value, value: &'a Value) -> &'a Value {
    let Some(reference) = value.get("$ref").and_then(Value::as_str) else {
        return value;
    };
    if DEFINITION_PREFIXES.iter().any(|p| reference.starts_with(p)) {
        return value;
    }
    match reference.strip_prefix('#').and_then(|pointer| root.pointer(pointer)) {
        Some(target) => target,
        None => {
            warn!(reference = %reference, "Cannot resolve local reference");
            value
        }
    }
}

fn string_field(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Definition names referenced by operations but absent from the document,
/// in first-seen order
pub fn dangling_refs(document: &Document) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut missing = Vec::new();
    let mut check = |value: &Value| {
        collect_refs(value, &mut |reference| {
            let Some(name) = DEFINITION_PREFIXES
                .iter()
                .find_map(|prefix| reference.strip_prefix(prefix))
            else {
                return;
            };
            if !document.has_definition(name) && seen.insert(name.to_string()) {
                missing.push(name.to_string());
            }
        });
    };
    for item in &document.paths {
        for op in &item.operations {
            for param in &op.parameters {
                check(&param.declaration);
            }
            for response in op.responses.values() {
                if let Some(schema) = &response.schema {
                    check(schema);
                }
            }
        }
    }
    missing
}

fn collect_refs(value: &Value, visit: &mut dyn FnMut(&str)) {
    match value {
        Value::Object(map) => {
            if let Some(reference) = map.get("$ref").and_then(Value::as_str) {
                visit(reference);
            }
            for child in map.values() {
                collect_refs(child, visit);
            }
        }
        Value::Array(items) => {
            for child in items {
                collect_refs(child, visit);
            }
        }
        _ => {}
    }
}
