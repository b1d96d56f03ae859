//! Generation settings
//!
//! [`GenerationConfig`] is the fully-populated settings object the engine reads.
//! Users describe only the keys they care about in a TOML, YAML or JSON file,
//! which deserializes into [`ConfigOverrides`] (every field optional) and is
//! merged onto the defaults with [`GenerationConfig::apply`].
//!
//! Merge rules: nested sections merge key-by-key, scalar and list values
//! overwrite, and the free-form `request.defaultRequestOptions` object merges
//! recursively.
//!
//! ```toml
//! [output]
//! useTypeScript = true
//! cleanOutputDir = true
//!
//! [codeStyle]
//! useSemicolons = false
//!
//! [request.defaultRequestOptions]
//! timeout = 5000
//! headers = { "X-Client" = "web" }
//! ```

use anyhow::Context;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::warn;

/// Identifier casing applied to function and parameter names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CaseStyle {
    /// `listPets`
    #[default]
    #[serde(rename = "camelCase")]
    Camel,
    /// `ListPets`
    #[serde(rename = "PascalCase")]
    Pascal,
    /// `list_pets`
    #[serde(rename = "snake_case")]
    Snake,
    /// `list-pets`
    #[serde(rename = "kebab-case")]
    Kebab,
    /// Name is used as declared
    #[serde(rename = "preserve")]
    Preserve,
}

/// Caller-supplied naming function.
///
/// For functions it receives `(operationId, method, path)`; for parameters it
/// receives `(parameterName, method, path)`. The method is lower-case.
pub type NameFormatter = Arc<dyn Fn(&str, &str, &str) -> String + Send + Sync>;

/// Naming strategy: a built-in casing or a custom formatter
#[derive(Clone)]
pub enum NamingRule {
    /// Built-in case conversion
    Style(CaseStyle),
    /// Custom formatter, set programmatically
    Custom(NameFormatter),
}

impl Default for NamingRule {
    fn default() -> Self {
        NamingRule::Style(CaseStyle::Camel)
    }
}

impl From<CaseStyle> for NamingRule {
    fn from(style: CaseStyle) -> Self {
        NamingRule::Style(style)
    }
}

impl fmt::Debug for NamingRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NamingRule::Style(style) => write!(f, "Style({style:?})"),
            NamingRule::Custom(_) => write!(f, "Custom(<fn>)"),
        }
    }
}

/// Indentation character
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndentType {
    #[default]
    Space,
    Tab,
}

/// Trailing comma after the last entry of a multi-line object literal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrailingComma {
    None,
    #[default]
    Es5,
    All,
}

/// `output` section
#[derive(Debug, Clone)]
pub struct OutputOptions {
    /// Emit `.ts` files instead of `file_extension`
    pub use_type_script: bool,
    /// Extension for generated files when not using TypeScript
    pub file_extension: String,
    /// Directory that receives the file pairs
    pub output_dir: PathBuf,
    /// Delete previously generated files (never custom files) before writing
    pub clean_output_dir: bool,
    /// Generated file name pattern with a `{{name}}` placeholder
    pub file_naming: String,
    /// Custom file name pattern with a `{{name}}` placeholder
    pub custom_file_naming: String,
}

impl Default for OutputOptions {
    fn default() -> Self {
        OutputOptions {
            use_type_script: false,
            file_extension: ".js".to_string(),
            output_dir: PathBuf::from("api"),
            clean_output_dir: false,
            file_naming: "{{name}}.generated".to_string(),
            custom_file_naming: "{{name}}.custom".to_string(),
        }
    }
}

impl OutputOptions {
    /// Extension appended to file names, always with a leading dot
    pub fn extension(&self) -> String {
        if self.use_type_script {
            return ".ts".to_string();
        }
        let ext = self.file_extension.trim();
        if ext.is_empty() {
            ".js".to_string()
        } else if ext.starts_with('.') {
            ext.to_string()
        } else {
            format!(".{ext}")
        }
    }
}

/// `codeStyle` section
#[derive(Debug, Clone)]
pub struct CodeStyle {
    pub indent_type: IndentType,
    pub indent_size: usize,
    pub use_semicolons: bool,
    pub use_single_quotes: bool,
    pub trailing_comma: TrailingComma,
}

impl Default for CodeStyle {
    fn default() -> Self {
        CodeStyle {
            indent_type: IndentType::Space,
            indent_size: 2,
            use_semicolons: true,
            use_single_quotes: true,
            trailing_comma: TrailingComma::Es5,
        }
    }
}

/// `naming` section
#[derive(Debug, Clone, Default)]
pub struct NamingOptions {
    pub api_function_naming: NamingRule,
    pub parameter_naming: NamingRule,
}

/// `imports` section
#[derive(Debug, Clone)]
pub struct ImportOptions {
    /// Import statement for the request helper; `None` renders the default
    /// `import request from '@/utils/request'` in the configured code style
    pub request_library: Option<String>,
    /// Extra import statements, emitted verbatim
    pub additional_imports: Vec<String>,
    /// Module segment appended to the base path in the shared `path` constant
    pub module_normal: String,
    /// Base path override; empty falls back to the document's `basePath`
    pub base_path: String,
    /// Reserved
    pub import_types: bool,
}

impl Default for ImportOptions {
    fn default() -> Self {
        ImportOptions {
            request_library: None,
            additional_imports: Vec::new(),
            module_normal: "api".to_string(),
            base_path: String::new(),
            import_types: false,
        }
    }
}

/// `comments` section
#[derive(Debug, Clone)]
pub struct CommentOptions {
    pub generate_js_doc: bool,
    pub include_param_descriptions: bool,
    pub include_response_type: bool,
    pub include_deprecation_warnings: bool,
}

impl Default for CommentOptions {
    fn default() -> Self {
        CommentOptions {
            generate_js_doc: true,
            include_param_descriptions: true,
            include_response_type: true,
            include_deprecation_warnings: true,
        }
    }
}

/// `request` section
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Extra entries injected verbatim into every generated request call
    pub default_request_options: Map<String, Value>,
}

/// Complete settings for one generation run
#[derive(Debug, Clone, Default)]
pub struct GenerationConfig {
    pub output: OutputOptions,
    pub code_style: CodeStyle,
    pub naming: NamingOptions,
    pub imports: ImportOptions,
    pub comments: CommentOptions,
    pub request: RequestOptions,
}

impl GenerationConfig {
    /// Defaults with `overrides` merged on top
    pub fn from_overrides(overrides: ConfigOverrides) -> Self {
        let mut config = GenerationConfig::default();
        config.apply(overrides);
        config
    }

    /// Merge `overrides` into this configuration in place.
    pub fn apply(&mut self, overrides: ConfigOverrides) {
        for (name, value) in [("advanced", &overrides.advanced), ("types", &overrides.types)] {
            if value.as_ref().is_some_and(is_populated) {
                warn!(section = name, "Configuration section is reserved and has no effect");
            }
        }
        if let Some(o) = overrides.output {
            set(&mut self.output.use_type_script, o.use_type_script);
            set(&mut self.output.file_extension, o.file_extension);
            set(&mut self.output.output_dir, o.output_dir);
            set(&mut self.output.clean_output_dir, o.clean_output_dir);
            set(&mut self.output.file_naming, o.file_naming);
            set(&mut self.output.custom_file_naming, o.custom_file_naming);
        }
        if let Some(o) = overrides.code_style {
            set(&mut self.code_style.indent_type, o.indent_type);
            set(&mut self.code_style.indent_size, o.indent_size);
            set(&mut self.code_style.use_semicolons, o.use_semicolons);
            set(&mut self.code_style.use_single_quotes, o.use_single_quotes);
            set(&mut self.code_style.trailing_comma, o.trailing_comma);
        }
        if let Some(o) = overrides.naming {
            if let Some(style) = o.api_function_naming {
                self.naming.api_function_naming = style.into();
            }
            if let Some(style) = o.parameter_naming {
                self.naming.parameter_naming = style.into();
            }
        }
        if let Some(o) = overrides.imports {
            if o.request_library.is_some() {
                self.imports.request_library = o.request_library;
            }
            set(&mut self.imports.additional_imports, o.additional_imports);
            set(&mut self.imports.module_normal, o.module_normal);
            set(&mut self.imports.base_path, o.base_path);
            set(&mut self.imports.import_types, o.import_types);
        }
        if let Some(o) = overrides.comments {
            set(&mut self.comments.generate_js_doc, o.generate_js_doc);
            set(
                &mut self.comments.include_param_descriptions,
                o.include_param_descriptions,
            );
            set(&mut self.comments.include_response_type, o.include_response_type);
            set(
                &mut self.comments.include_deprecation_warnings,
                o.include_deprecation_warnings,
            );
        }
        if let Some(o) = overrides.request {
            if let Some(options) = o.default_request_options {
                merge_object(&mut self.request.default_request_options, options);
            }
        }
    }
}

fn set<T>(slot: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *slot = value;
    }
}

fn is_populated(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Object(map) => map.values().any(is_populated),
        Value::Array(items) => !items.is_empty(),
        _ => true,
    }
}

/// Recursive JSON merge: objects merge key-by-key, anything else overwrites.
pub fn merge_json(base: &mut Value, over: Value) {
    match (base, over) {
        (Value::Object(base), Value::Object(over)) => merge_object(base, over),
        (slot, value) => *slot = value,
    }
}

fn merge_object(base: &mut Map<String, Value>, over: Map<String, Value>) {
    for (key, value) in over {
        match base.get_mut(&key) {
            Some(existing) => merge_json(existing, value),
            None => {
                base.insert(key, value);
            }
        }
    }
}

/// Partial settings as written in a config file or assembled from CLI flags
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigOverrides {
    pub output: Option<OutputOverrides>,
    pub code_style: Option<CodeStyleOverrides>,
    pub naming: Option<NamingOverrides>,
    pub imports: Option<ImportOverrides>,
    pub comments: Option<CommentOverrides>,
    pub request: Option<RequestOverrides>,
    /// Reserved: custom templates and request hooks
    pub advanced: Option<Value>,
    /// Reserved: interface generation
    pub types: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputOverrides {
    pub use_type_script: Option<bool>,
    pub file_extension: Option<String>,
    pub output_dir: Option<PathBuf>,
    pub clean_output_dir: Option<bool>,
    pub file_naming: Option<String>,
    pub custom_file_naming: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeStyleOverrides {
    pub indent_type: Option<IndentType>,
    pub indent_size: Option<usize>,
    pub use_semicolons: Option<bool>,
    pub use_single_quotes: Option<bool>,
    pub trailing_comma: Option<TrailingComma>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NamingOverrides {
    pub api_function_naming: Option<CaseStyle>,
    pub parameter_naming: Option<CaseStyle>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportOverrides {
    pub request_library: Option<String>,
    pub additional_imports: Option<Vec<String>>,
    pub module_normal: Option<String>,
    pub base_path: Option<String>,
    pub import_types: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentOverrides {
    #[serde(rename = "generateJSDoc")]
    pub generate_js_doc: Option<bool>,
    pub include_param_descriptions: Option<bool>,
    pub include_response_type: Option<bool>,
    pub include_deprecation_warnings: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestOverrides {
    pub default_request_options: Option<Map<String, Value>>,
}

fn layer<T>(base: Option<T>, over: Option<T>, merge: impl FnOnce(T, T) -> T) -> Option<T> {
    match (base, over) {
        (Some(base), Some(over)) => Some(merge(base, over)),
        (base, over) => over.or(base),
    }
}

impl ConfigOverrides {
    /// Compose two patches; values in `over` win with the same rules as
    /// [`GenerationConfig::apply`].
    pub fn layer(self, over: ConfigOverrides) -> ConfigOverrides {
        ConfigOverrides {
            output: layer(self.output, over.output, |b, o| OutputOverrides {
                use_type_script: o.use_type_script.or(b.use_type_script),
                file_extension: o.file_extension.or(b.file_extension),
                output_dir: o.output_dir.or(b.output_dir),
                clean_output_dir: o.clean_output_dir.or(b.clean_output_dir),
                file_naming: o.file_naming.or(b.file_naming),
                custom_file_naming: o.custom_file_naming.or(b.custom_file_naming),
            }),
            code_style: layer(self.code_style, over.code_style, |b, o| CodeStyleOverrides {
                indent_type: o.indent_type.or(b.indent_type),
                indent_size: o.indent_size.or(b.indent_size),
                use_semicolons: o.use_semicolons.or(b.use_semicolons),
                use_single_quotes: o.use_single_quotes.or(b.use_single_quotes),
                trailing_comma: o.trailing_comma.or(b.trailing_comma),
            }),
            naming: layer(self.naming, over.naming, |b, o| NamingOverrides {
                api_function_naming: o.api_function_naming.or(b.api_function_naming),
                parameter_naming: o.parameter_naming.or(b.parameter_naming),
            }),
            imports: layer(self.imports, over.imports, |b, o| ImportOverrides {
                request_library: o.request_library.or(b.request_library),
                additional_imports: o.additional_imports.or(b.additional_imports),
                module_normal: o.module_normal.or(b.module_normal),
                base_path: o.base_path.or(b.base_path),
                import_types: o.import_types.or(b.import_types),
            }),
            comments: layer(self.comments, over.comments, |b, o| CommentOverrides {
                generate_js_doc: o.generate_js_doc.or(b.generate_js_doc),
                include_param_descriptions: o
                    .include_param_descriptions
                    .or(b.include_param_descriptions),
                include_response_type: o.include_response_type.or(b.include_response_type),
                include_deprecation_warnings: o
                    .include_deprecation_warnings
                    .or(b.include_deprecation_warnings),
            }),
            request: layer(self.request, over.request, |b, o| RequestOverrides {
                default_request_options: layer(
                    b.default_request_options,
                    o.default_request_options,
                    |mut base, over| {
                        merge_object(&mut base, over);
                        base
                    },
                ),
            }),
            advanced: layer(self.advanced, over.advanced, |mut base, over| {
                merge_json(&mut base, over);
                base
            }),
            types: layer(self.types, over.types, |mut base, over| {
                merge_json(&mut base, over);
                base
            }),
        }
    }
}

/// Load a settings file.
///
/// The format follows the extension: `.toml`, `.yaml`/`.yml`, anything else is
/// read as JSON.
///
/// # Errors
///
/// Returns an error if the file cannot be read or does not parse.
pub fn load_overrides(config_path: &Path) -> anyhow::Result<ConfigOverrides> {
    let contents = std::fs::read_to_string(config_path)
        .with_context(|| format!("Failed to read config: {}", config_path.display()))?;
    let ext = config_path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    let overrides: ConfigOverrides = match ext.as_deref() {
        Some("toml") => toml::from_str(&contents).map_err(anyhow::Error::from),
        Some("yaml") | Some("yml") => serde_yaml::from_str(&contents).map_err(anyhow::Error::from),
        _ => serde_json::from_str(&contents).map_err(anyhow::Error::from),
    }
    .with_context(|| format!("Failed to parse config: {}", config_path.display()))?;
    Ok(overrides)
}
