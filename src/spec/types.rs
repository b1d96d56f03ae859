use http::Method;
use indexmap::IndexMap;
use serde_json::Value;

/// Operation keys recognised under a path item, lower-case
pub const METHODS: [&str; 8] = ["get", "post", "put", "delete", "patch", "options", "head", "trace"];

/// Where a Swagger parameter travels in the request
///
/// Only the four locations the generator understands are modelled; header and
/// cookie parameters are dropped while loading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterLocation {
    Path,
    Query,
    Body,
    FormData,
}

impl ParameterLocation {
    /// Parse the `in` field of a parameter declaration.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "path" => Some(ParameterLocation::Path),
            "query" => Some(ParameterLocation::Query),
            "body" => Some(ParameterLocation::Body),
            "formData" => Some(ParameterLocation::FormData),
            _ => None,
        }
    }
}

impl std::fmt::Display for ParameterLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParameterLocation::Path => write!(f, "path"),
            ParameterLocation::Query => write!(f, "query"),
            ParameterLocation::Body => write!(f, "body"),
            ParameterLocation::FormData => write!(f, "formData"),
        }
    }
}

/// One declared parameter of an operation
#[derive(Debug, Clone)]
pub struct Parameter {
    pub name: String,
    pub location: ParameterLocation,
    pub description: Option<String>,
    /// The declaration as written (`type`, `items`, `schema`, ...), used for
    /// type mapping
    pub declaration: Value,
}

/// A documented response
#[derive(Debug, Clone, Default)]
pub struct Response {
    pub description: Option<String>,
    pub schema: Option<Value>,
}

/// One method at one path
#[derive(Debug, Clone)]
pub struct Operation {
    pub method: Method,
    pub operation_id: Option<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub tags: Vec<String>,
    /// Declaration order, path-level parameters merged in
    pub parameters: Vec<Parameter>,
    /// Keyed by status code (`"200"`, `"default"`, ...) in document order
    pub responses: IndexMap<String, Response>,
    pub deprecated: bool,
}

impl Operation {
    /// First tag wins; untagged operations are not generated.
    pub fn primary_tag(&self) -> Option<&str> {
        self.tags.first().map(String::as_str)
    }

    /// Lower-case method name (`get`, `post`, ...), `None` for a method
    /// outside [`METHODS`]
    pub fn method_name(&self) -> Option<&'static str> {
        METHODS
            .iter()
            .copied()
            .find(|m| m.eq_ignore_ascii_case(self.method.as_str()))
    }

    /// First present success response: `200`, then `201`, then `default`
    pub fn success_response(&self) -> Option<&Response> {
        ["200", "201", "default"]
            .iter()
            .find_map(|code| self.responses.get(*code))
    }

    pub fn parameters_in(&self, location: ParameterLocation) -> impl Iterator<Item = &Parameter> {
        self.parameters
            .iter()
            .filter(move |p| p.location == location)
    }
}

/// All operations declared under one URL path, in document order
#[derive(Debug, Clone)]
pub struct PathItem {
    pub path: String,
    pub operations: Vec<Operation>,
}

/// A loaded API description
///
/// Immutable once loaded. Definitions are kept only so references can be
/// checked by name; they are never expanded into generated code.
#[derive(Debug, Clone, Default)]
pub struct Document {
    pub base_path: Option<String>,
    pub definitions: IndexMap<String, Value>,
    pub paths: Vec<PathItem>,
}

impl Document {
    /// Base path without a trailing slash; empty when absent
    pub fn normalized_base_path(&self) -> String {
        self.base_path
            .as_deref()
            .unwrap_or_default()
            .trim_end_matches('/')
            .to_string()
    }

    pub fn has_definition(&self, name: &str) -> bool {
        self.definitions.contains_key(name)
    }

    pub fn operation_count(&self) -> usize {
        self.paths.iter().map(|p| p.operations.len()).sum()
    }
}
