//! Parameter planning: call signature and documentation entries for one
//! operation.
//!
//! Signature order is fixed regardless of declaration order: path parameters
//! (one positional argument each), then `params` when any query parameter
//! exists, then `data` when a body or form parameter exists or the method is
//! POST, PUT or PATCH.

use super::classify::ClassifiedOperation;
use super::naming::{format_parameter_name, safe_identifier, scope, FUNCTION_SCOPE_NAMES};
use super::schema::{is_reference, resolve_type};
use crate::config::GenerationConfig;
use crate::spec::{Parameter, ParameterLocation};
use serde_json::Value;

/// One `@param` line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamDoc {
    /// Argument name, or dotted member (`params.limit`, `data.name`)
    pub name: String,
    pub ty: String,
    pub description: Option<String>,
}

/// A path parameter bound to its generated argument name
#[derive(Debug, Clone)]
pub struct PathArgument<'a> {
    pub parameter: &'a Parameter,
    /// Identifier used in the signature and URL template
    pub ident: String,
}

/// Everything the emitter needs about an operation's inputs
#[derive(Debug, Clone)]
pub struct ParameterPlan<'a> {
    /// Argument names, left to right
    pub call_signature: Vec<String>,
    /// Documentation entries in the same left-to-right order
    pub docs: Vec<ParamDoc>,
    pub path_params: Vec<PathArgument<'a>>,
    pub query_params: Vec<&'a Parameter>,
    /// First declared body parameter
    pub body_param: Option<&'a Parameter>,
    pub form_params: Vec<&'a Parameter>,
}

impl ParameterPlan<'_> {
    pub fn has_query(&self) -> bool {
        !self.query_params.is_empty()
    }

    /// Whether the call carries a `data` argument
    pub fn has_data(&self) -> bool {
        self.call_signature.iter().any(|arg| arg == "data")
    }
}

/// Methods whose request always carries `data`
pub fn sends_data(method: &str) -> bool {
    matches!(method, "post" | "put" | "patch")
}

/// Plan the inputs of one classified operation.
pub fn plan<'a>(entry: &ClassifiedOperation<'a>, config: &GenerationConfig) -> ParameterPlan<'a> {
    let operation = entry.operation;
    let rule = &config.naming.parameter_naming;

    let mut used = scope(FUNCTION_SCOPE_NAMES);
    let path_params: Vec<PathArgument<'a>> = operation
        .parameters_in(ParameterLocation::Path)
        .map(|parameter| {
            let formatted = format_parameter_name(rule, &parameter.name, entry.method, entry.path);
            PathArgument {
                parameter,
                ident: safe_identifier(&formatted, &mut used),
            }
        })
        .collect();
    let query_params: Vec<&Parameter> = operation.parameters_in(ParameterLocation::Query).collect();
    let body_param = operation.parameters_in(ParameterLocation::Body).next();
    let form_params: Vec<&Parameter> = operation
        .parameters_in(ParameterLocation::FormData)
        .collect();

    let mut call_signature: Vec<String> = path_params.iter().map(|p| p.ident.clone()).collect();
    let mut docs: Vec<ParamDoc> = path_params
        .iter()
        .map(|p| ParamDoc {
            name: p.ident.clone(),
            ty: resolve_type(&p.parameter.declaration),
            description: Some(
                p.parameter
                    .description
                    .clone()
                    .unwrap_or_else(|| format!("Path parameter: {}", p.parameter.name)),
            ),
        })
        .collect();

    if !query_params.is_empty() {
        call_signature.push("params".to_string());
        docs.push(ParamDoc {
            name: "params".to_string(),
            ty: "object".to_string(),
            description: Some("Query parameters".to_string()),
        });
        docs.extend(query_params.iter().map(|p| member_doc("params", p)));
    }

    let has_payload = body_param.is_some() || !form_params.is_empty();
    if has_payload || sends_data(entry.method) {
        call_signature.push("data".to_string());
        match body_param {
            Some(body) => {
                docs.push(ParamDoc {
                    name: "data".to_string(),
                    ty: resolve_type(&body.declaration),
                    description: Some(
                        body.description
                            .clone()
                            .unwrap_or_else(|| "Request body".to_string()),
                    ),
                });
                if !is_reference(&body.declaration) {
                    docs.extend(inline_body_fields(&body.declaration));
                }
            }
            None => docs.push(ParamDoc {
                name: "data".to_string(),
                ty: "object".to_string(),
                description: Some(
                    if form_params.is_empty() {
                        "Request body"
                    } else {
                        "Form data"
                    }
                    .to_string(),
                ),
            }),
        }
        docs.extend(form_params.iter().map(|p| member_doc("data", p)));
    }

    ParameterPlan {
        call_signature,
        docs,
        path_params,
        query_params,
        body_param,
        form_params,
    }
}

/// Members are documented under the key actually sent, not a reformatted name.
fn member_doc(prefix: &str, parameter: &Parameter) -> ParamDoc {
    ParamDoc {
        name: format!("{prefix}.{}", parameter.name),
        ty: resolve_type(&parameter.declaration),
        description: parameter.description.clone(),
    }
}

fn inline_body_fields(declaration: &Value) -> Vec<ParamDoc> {
    let schema = declaration.get("schema").unwrap_or(declaration);
    let Some(properties) = schema.get("properties").and_then(Value::as_object) else {
        return Vec::new();
    };
    properties
        .iter()
        .map(|(name, property)| ParamDoc {
            name: format!("data.{name}"),
            ty: resolve_type(property),
            description: property
                .get("description")
                .and_then(Value::as_str)
                .map(str::to_string),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::load_document;
    use serde_json::json;

    fn with_plan(operation: Value, method: &str, check: impl FnOnce(&ParameterPlan<'_>)) {
        let doc = load_document(&json!({
            "paths": { "/pets/{id}": { method: operation } }
        }))
        .unwrap();
        let item = &doc.paths[0];
        let entry = ClassifiedOperation {
            path: &item.path,
            method,
            operation: &item.operations[0],
        };
        let plan = plan(&entry, &GenerationConfig::default());
        check(&plan);
    }

    #[test]
    fn test_signature_order_ignores_declaration_order() {
        with_plan(
            json!({ "parameters": [
                { "name": "body", "in": "body", "schema": { "$ref": "#/definitions/Pet" } },
                { "name": "verbose", "in": "query", "type": "boolean" },
                { "name": "id", "in": "path", "type": "integer", "required": true }
            ]}),
            "put",
            |plan| {
                assert_eq!(plan.call_signature, vec!["id", "params", "data"]);
                let names: Vec<_> = plan.docs.iter().map(|d| d.name.as_str()).collect();
                assert_eq!(names, vec!["id", "params", "params.verbose", "data"]);
                assert_eq!(plan.docs[0].ty, "number");
                assert_eq!(plan.docs[3].ty, "Pet");
                assert!(plan.has_data());
            },
        );
    }

    #[test]
    fn test_path_params_are_formatted_and_shielded() {
        with_plan(
            json!({ "parameters": [
                { "name": "pet_id", "in": "path", "type": "string" },
                { "name": "url", "in": "path", "type": "string" },
                { "name": "default", "in": "path", "type": "string" }
            ]}),
            "get",
            |plan| {
                assert_eq!(plan.call_signature, vec!["petId", "url1", "defaultApi"]);
                assert_eq!(
                    plan.docs[0].description.as_deref(),
                    Some("Path parameter: pet_id")
                );
                assert!(!plan.has_query());
                assert!(!plan.has_data());
            },
        );
    }

    #[test]
    fn test_inline_body_fields_are_documented() {
        with_plan(
            json!({ "parameters": [
                { "name": "body", "in": "body", "description": "New pet", "schema": {
                    "type": "object",
                    "properties": {
                        "name": { "type": "string", "description": "Pet name" },
                        "age": { "type": "integer" }
                    }
                }}
            ]}),
            "post",
            |plan| {
                assert_eq!(plan.call_signature, vec!["data"]);
                assert_eq!(
                    plan.docs,
                    vec![
                        ParamDoc {
                            name: "data".to_string(),
                            ty: "object".to_string(),
                            description: Some("New pet".to_string()),
                        },
                        ParamDoc {
                            name: "data.name".to_string(),
                            ty: "string".to_string(),
                            description: Some("Pet name".to_string()),
                        },
                        ParamDoc {
                            name: "data.age".to_string(),
                            ty: "number".to_string(),
                            description: None,
                        },
                    ]
                );
            },
        );
    }

    #[test]
    fn test_form_fields_and_post_without_body() {
        with_plan(
            json!({ "parameters": [
                { "name": "file", "in": "formData", "type": "file" },
                { "name": "note", "in": "formData", "type": "string" }
            ]}),
            "post",
            |plan| {
                let names: Vec<_> = plan.docs.iter().map(|d| d.name.as_str()).collect();
                assert_eq!(names, vec!["data", "data.file", "data.note"]);
                assert_eq!(plan.docs[0].description.as_deref(), Some("Form data"));
                assert_eq!(plan.docs[1].ty, "object");
                assert!(plan.body_param.is_none());
                assert_eq!(plan.form_params.len(), 2);
            },
        );

        with_plan(json!({}), "post", |plan| {
            assert_eq!(plan.call_signature, vec!["data"]);
            assert_eq!(plan.docs[0].ty, "object");
        });

        with_plan(json!({}), "delete", |plan| {
            assert!(plan.call_signature.is_empty());
            assert!(plan.docs.is_empty());
        });
    }
}
