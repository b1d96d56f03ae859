//! Function emitter: one operation to one exported request function.

use super::classify::ClassifiedOperation;
use super::naming::{format_function_name, is_identifier, safe_identifier};
use super::params::{plan, ParamDoc, ParameterPlan};
use super::schema::{resolve_type, response_type};
use crate::config::{CodeStyle, GenerationConfig, IndentType, TrailingComma};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};
use std::collections::HashSet;

static PATH_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{(?<name>[^{}]+)}").expect("path token regex should be valid"));

/// Resolved code-style tokens
#[derive(Debug, Clone)]
pub struct CodeFormat {
    quote: char,
    pub semi: &'static str,
    pub indent: String,
    trailing_comma: TrailingComma,
}

impl CodeFormat {
    pub fn from_style(style: &CodeStyle) -> Self {
        let unit = match style.indent_type {
            IndentType::Space => " ",
            IndentType::Tab => "\t",
        };
        CodeFormat {
            quote: if style.use_single_quotes { '\'' } else { '"' },
            semi: if style.use_semicolons { ";" } else { "" },
            indent: unit.repeat(style.indent_size.max(1)),
            trailing_comma: style.trailing_comma,
        }
    }

    /// String literal in the configured quote style
    pub fn quoted(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len() + 2);
        out.push(self.quote);
        for c in text.chars() {
            match c {
                '\\' => out.push_str("\\\\"),
                '\n' => out.push_str("\\n"),
                '\r' => out.push_str("\\r"),
                c if c == self.quote => {
                    out.push('\\');
                    out.push(c);
                }
                c => out.push(c),
            }
        }
        out.push(self.quote);
        out
    }

    fn trailing_comma(&self) -> &'static str {
        match self.trailing_comma {
            TrailingComma::None => "",
            TrailingComma::Es5 | TrailingComma::All => ",",
        }
    }
}

/// A rendered function and the name it was given
#[derive(Debug, Clone)]
pub struct EmittedFunction {
    pub name: String,
    pub signature: Vec<String>,
    pub source: String,
}

/// Render one operation.
///
/// `used` is the file-wide set of taken names; the chosen function name is
/// registered in it.
pub fn emit_function(
    entry: &ClassifiedOperation<'_>,
    config: &GenerationConfig,
    format: &CodeFormat,
    used: &mut HashSet<String>,
) -> EmittedFunction {
    let operation = entry.operation;
    let raw_name = format_function_name(
        &config.naming.api_function_naming,
        operation,
        entry.method,
        entry.path,
    );
    let name = safe_identifier(&raw_name, used);
    let plan = plan(entry, config);

    let mut source = String::new();
    if config.comments.generate_js_doc {
        source.push_str(&doc_block(entry, &plan, config));
    }

    let indent = &format.indent;
    source.push_str(&format!(
        "export function {name}({}) {{\n",
        signature(&plan, config).join(", ")
    ));
    source.push_str(&format!(
        "{indent}const url = `{}`{}\n",
        url_template(entry.path, &plan),
        format.semi
    ));
    source.push_str(&format!("{indent}return request({{\n"));
    let options = request_options(entry, &plan, &config.request.default_request_options, format);
    let last = options.len().saturating_sub(1);
    for (i, option) in options.iter().enumerate() {
        let comma = if i == last { format.trailing_comma() } else { "," };
        source.push_str(&format!("{indent}{indent}{option}{comma}\n"));
    }
    source.push_str(&format!("{indent}}}){}\n}}", format.semi));

    EmittedFunction {
        name,
        signature: plan.call_signature,
        source,
    }
}

/// Call parameters, with type annotations when emitting TypeScript
fn signature(plan: &ParameterPlan<'_>, config: &GenerationConfig) -> Vec<String> {
    if !config.output.use_type_script {
        return plan.call_signature.clone();
    }
    let mut args: Vec<String> = plan
        .path_params
        .iter()
        .map(|p| {
            let ty = match resolve_type(&p.parameter.declaration).as_str() {
                "number" => "number",
                "boolean" => "boolean",
                "string" => "string",
                _ => "any",
            };
            format!("{}: {ty}", p.ident)
        })
        .collect();
    if plan.has_query() {
        args.push("params: Record<string, any>".to_string());
    }
    if plan.has_data() {
        args.push("data: any".to_string());
    }
    args
}

/// `${path}` followed by the operation path with `{name}` tokens bound to the
/// generated argument names. Undeclared tokens are left as written.
fn url_template(path: &str, plan: &ParameterPlan<'_>) -> String {
    let escaped = path.replace('\\', "\\\\").replace('`', "\\`");
    let url = PATH_TOKEN.replace_all(&escaped, |caps: &regex::Captures<'_>| {
        let token = &caps["name"];
        match plan.path_params.iter().find(|p| p.parameter.name == token) {
            Some(arg) => format!("${{{}}}", arg.ident),
            None => caps[0].to_string(),
        }
    });
    format!("${{path}}{url}")
}

fn request_options(
    entry: &ClassifiedOperation<'_>,
    plan: &ParameterPlan<'_>,
    defaults: &Map<String, Value>,
    format: &CodeFormat,
) -> Vec<String> {
    let mut options = vec![
        "url".to_string(),
        format!("method: {}", format.quoted(&entry.method.to_ascii_uppercase())),
    ];
    if plan.has_query() {
        options.push("params".to_string());
    }
    if plan.has_data() {
        options.push("data".to_string());
    }
    for (key, value) in defaults {
        let key = if is_identifier(key) {
            key.clone()
        } else {
            format.quoted(key)
        };
        let value = match value {
            Value::String(s) => format.quoted(s),
            Value::Object(_) | Value::Array(_) | Value::Null => value.to_string(),
            other => other.to_string(),
        };
        options.push(format!("{key}: {value}"));
    }
    options
}

fn doc_block(
    entry: &ClassifiedOperation<'_>,
    plan: &ParameterPlan<'_>,
    config: &GenerationConfig,
) -> String {
    let operation = entry.operation;
    let comments = &config.comments;
    let mut lines: Vec<String> = Vec::new();

    if let Some(summary) = &operation.summary {
        lines.extend(text_lines(summary));
    }
    if let Some(description) = &operation.description {
        if operation.summary.as_ref() != Some(description) {
            lines.extend(text_lines(description));
        }
    }
    if operation.deprecated && comments.include_deprecation_warnings {
        lines.push("@deprecated".to_string());
    }
    if comments.include_param_descriptions {
        lines.extend(plan.docs.iter().map(param_line));
    }
    if comments.include_response_type {
        let description = operation
            .success_response()
            .and_then(|r| r.description.as_deref())
            .map(|d| format!(" {}", single_line(d)))
            .unwrap_or_default();
        lines.push(format!("@returns {{{}}}{description}", response_type(operation)));
    }

    if lines.is_empty() {
        return String::new();
    }
    let mut block = String::from("/**\n");
    for line in lines {
        if line.is_empty() {
            block.push_str(" *\n");
        } else {
            block.push_str(&format!(" * {line}\n"));
        }
    }
    block.push_str(" */\n");
    block
}

fn param_line(doc: &ParamDoc) -> String {
    match doc.description.as_deref().map(single_line) {
        Some(description) if !description.is_empty() => {
            format!("@param {{{}}} {} - {description}", doc.ty, doc.name)
        }
        _ => format!("@param {{{}}} {}", doc.ty, doc.name),
    }
}

/// Comment-safe lines of free text
fn text_lines(text: &str) -> Vec<String> {
    text.trim()
        .lines()
        .map(|line| line.trim_end().replace("*/", "*\\/"))
        .collect()
}

fn single_line(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .replace("*/", "*\\/")
}
