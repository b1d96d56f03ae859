//! File assembly: one generated module per tag plus its write-once custom
//! companion.

use askama::Template;
use std::collections::HashSet;
use tracing::warn;

use super::classify::TagGroup;
use super::function::{emit_function, CodeFormat, EmittedFunction};
use super::naming::{scope, FILE_SCOPE_NAMES};
use crate::config::{GenerationConfig, ImportOptions, OutputOptions};
use crate::error::GenerateError;

/// Placeholder substituted with the sanitized tag in file naming patterns
pub const NAME_PLACEHOLDER: &str = "{{name}}";

const DEFAULT_REQUEST_MODULE: &str = "@/utils/request";

#[derive(Template)]
#[template(path = "generated_file.txt", escape = "none")]
struct GeneratedFileTemplate<'a> {
    tag: &'a str,
    custom_file: &'a str,
    imports: &'a str,
    path_literal: &'a str,
    semi: &'a str,
    functions: &'a str,
}

#[derive(Template)]
#[template(path = "custom_file.txt", escape = "none")]
struct CustomFileTemplate<'a> {
    tag: &'a str,
    generated_file: &'a str,
    module: &'a str,
    semi: &'a str,
}

/// Output for one tag, ready to be written
#[derive(Debug, Clone)]
pub struct AssembledTag {
    pub tag: String,
    /// Sanitized, collision-free file stem
    pub stem: String,
    pub generated_name: String,
    pub custom_name: String,
    pub generated_text: String,
    pub functions: Vec<EmittedFunction>,
}

impl AssembledTag {
    /// Body of the custom override file for this tag
    pub fn render_custom(&self, config: &GenerationConfig) -> Result<String, GenerateError> {
        render_custom_file(&self.tag, &self.generated_name, config)
    }
}

/// File name for `stem` under `pattern`.
///
/// The extension is appended unless the pattern already ends in `.js` or
/// `.ts`. A pattern without [`NAME_PLACEHOLDER`] is treated as a suffix.
pub fn file_name(pattern: &str, stem: &str, extension: &str) -> String {
    let name = if pattern.contains(NAME_PLACEHOLDER) {
        pattern.replace(NAME_PLACEHOLDER, stem)
    } else {
        format!("{stem}{pattern}")
    };
    if name.ends_with(".js") || name.ends_with(".ts") {
        name
    } else {
        format!("{name}{extension}")
    }
}

/// Generated and custom file names for `stem`
pub fn file_names(output: &OutputOptions, stem: &str) -> (String, String) {
    let extension = output.extension();
    (
        file_name(&output.file_naming, stem, &extension),
        file_name(&output.custom_file_naming, stem, &extension),
    )
}

/// Warn once per run about naming patterns that cannot distinguish tags.
pub fn check_patterns(output: &OutputOptions) {
    for (key, pattern) in [
        ("fileNaming", &output.file_naming),
        ("customFileNaming", &output.custom_file_naming),
    ] {
        if !pattern.contains(NAME_PLACEHOLDER) {
            warn!(
                option = key,
                pattern = %pattern,
                "File naming pattern has no {} placeholder; treating it as a suffix",
                NAME_PLACEHOLDER
            );
        }
    }
}

/// Value of the shared `path` constant: base path joined with the module
/// segment. `imports.basePath` wins over the document's own base path.
pub fn shared_path(document_base_path: &str, imports: &ImportOptions) -> String {
    let configured = imports.base_path.trim();
    let base = if configured.is_empty() {
        document_base_path
    } else {
        configured
    }
    .trim_end_matches('/');
    let module = imports.module_normal.trim().trim_matches('/');
    if module.is_empty() {
        base.to_string()
    } else {
        format!("{base}/{module}")
    }
}

/// Import statements heading every generated file
pub fn import_lines(imports: &ImportOptions, format: &CodeFormat) -> Vec<String> {
    let request = match imports.request_library.as_deref().map(str::trim) {
        Some(line) if !line.is_empty() => line.to_string(),
        _ => format!(
            "import request from {}{}",
            format.quoted(DEFAULT_REQUEST_MODULE),
            format.semi
        ),
    };
    std::iter::once(request)
        .chain(
            imports
                .additional_imports
                .iter()
                .map(|line| line.trim().to_string())
                .filter(|line| !line.is_empty()),
        )
        .collect()
}

/// Render the generated module for one tag group.
///
/// Function names are unique within the file; `path` and `request` are
/// reserved for the module scope.
pub fn assemble(
    group: &TagGroup<'_>,
    stem: &str,
    document_base_path: &str,
    config: &GenerationConfig,
) -> Result<AssembledTag, GenerateError> {
    let format = CodeFormat::from_style(&config.code_style);
    let (generated_name, custom_name) = file_names(&config.output, stem);

    let mut used: HashSet<String> = scope(FILE_SCOPE_NAMES);
    let functions: Vec<EmittedFunction> = group
        .operations
        .iter()
        .map(|entry| emit_function(entry, config, &format, &mut used))
        .collect();

    let imports = import_lines(&config.imports, &format).join("\n");
    let path_literal = format.quoted(&shared_path(document_base_path, &config.imports));
    let bodies = functions
        .iter()
        .map(|f| f.source.as_str())
        .collect::<Vec<_>>()
        .join("\n\n");
    let tag = comment_safe(&group.tag);

    let text = GeneratedFileTemplate {
        tag: &tag,
        custom_file: &custom_name,
        imports: &imports,
        path_literal: &path_literal,
        semi: format.semi,
        functions: &bodies,
    }
    .render()?;

    Ok(AssembledTag {
        tag: group.tag.clone(),
        stem: stem.to_string(),
        generated_name,
        custom_name,
        generated_text: finish(text),
        functions,
    })
}

/// Render the write-once override file re-exporting `generated_name`.
pub fn render_custom_file(
    tag: &str,
    generated_name: &str,
    config: &GenerationConfig,
) -> Result<String, GenerateError> {
    let format = CodeFormat::from_style(&config.code_style);
    let module = generated_name
        .strip_suffix(".js")
        .or_else(|| generated_name.strip_suffix(".ts"))
        .unwrap_or(generated_name);
    let module = format.quoted(&format!("./{module}"));
    let text = CustomFileTemplate {
        tag: &comment_safe(tag),
        generated_file: generated_name,
        module: &module,
        semi: format.semi,
    }
    .render()?;
    Ok(finish(text))
}

fn comment_safe(text: &str) -> String {
    text.replace(['\n', '\r'], " ").replace("*/", "*\\/")
}

/// Exactly one trailing newline
fn finish(text: String) -> String {
    let mut text = text.trim_end().to_string();
    text.push('\n');
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_name_patterns() {
        assert_eq!(file_name("{{name}}.generated", "pets", ".js"), "pets.generated.js");
        assert_eq!(file_name("{{name}}.custom", "pets", ".ts"), "pets.custom.ts");
        assert_eq!(file_name("api/{{name}}.js", "pets", ".ts"), "api/pets.js");
        assert_eq!(file_name(".gen", "pets", ".js"), "pets.gen.js");
    }

    #[test]
    fn test_shared_path_prefers_configured_base() {
        let mut imports = ImportOptions::default();
        assert_eq!(shared_path("/v1", &imports), "/v1/api");
        assert_eq!(shared_path("", &imports), "/api");
        imports.base_path = "/gateway/".to_string();
        assert_eq!(shared_path("/v1", &imports), "/gateway/api");
        imports.module_normal = String::new();
        assert_eq!(shared_path("/v1", &imports), "/gateway");
    }

    #[test]
    fn test_import_lines_follow_code_style() {
        let config = GenerationConfig::default();
        let format = CodeFormat::from_style(&config.code_style);
        assert_eq!(
            import_lines(&config.imports, &format),
            vec!["import request from '@/utils/request';".to_string()]
        );

        let mut config = GenerationConfig::default();
        config.code_style.use_semicolons = false;
        config.code_style.use_single_quotes = false;
        config.imports.additional_imports = vec!["import qs from \"qs\"".to_string()];
        let format = CodeFormat::from_style(&config.code_style);
        assert_eq!(
            import_lines(&config.imports, &format),
            vec![
                "import request from \"@/utils/request\"".to_string(),
                "import qs from \"qs\"".to_string(),
            ]
        );

        config.imports.request_library = Some("import { http as request } from '~/http'".to_string());
        assert_eq!(
            import_lines(&config.imports, &format)[0],
            "import { http as request } from '~/http'"
        );
    }

    #[test]
    fn test_custom_file_reexports_generated_module() {
        let config = GenerationConfig::default();
        let text = render_custom_file("pets", "pets.generated.js", &config).unwrap();
        assert!(text.contains("export * from './pets.generated';"));
        assert!(text.contains("pets.generated.js is regenerated on every run"));
        assert!(text.ends_with("// }\n"));

        let text = render_custom_file("pets", "pets.generated.mjs", &config).unwrap();
        assert!(text.contains("export * from './pets.generated.mjs';"));
    }
}
