//! Generation orchestrator.
//!
//! Drives one run through
//! `Idle → DocumentLoaded → Classified → OutputReady → Writing → Done`, with
//! `Failed` reachable from every non-terminal state. Custom files are only
//! ever created, never rewritten or purged.

use std::collections::HashSet;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

use super::classify::{classify, TagGroup};
use super::file::{assemble, check_patterns, file_names, AssembledTag, NAME_PLACEHOLDER};
use super::naming::sanitize_tag_name;
use crate::config::{GenerationConfig, OutputOptions};
use crate::error::GenerateError;
use crate::spec::{load_document, Document, DocumentSource};

/// Lifecycle of a generation run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationState {
    Idle,
    DocumentLoaded,
    Classified,
    OutputReady,
    Writing,
    Done,
    Failed,
}

/// Outcome for one tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagReport {
    pub tag: String,
    pub generated_file: PathBuf,
    pub custom_file: PathBuf,
    /// `true` if the custom file was created by this run
    pub custom_created: bool,
    /// Exported function names in file order
    pub functions: Vec<String>,
}

/// Summary of a completed run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationReport {
    pub tags: Vec<TagReport>,
    /// Previously generated files removed by `cleanOutputDir`
    pub purged: Vec<PathBuf>,
}

impl GenerationReport {
    pub fn generated_files(&self) -> impl Iterator<Item = &Path> {
        self.tags.iter().map(|t| t.generated_file.as_path())
    }

    pub fn created_custom_files(&self) -> impl Iterator<Item = &Path> {
        self.tags
            .iter()
            .filter(|t| t.custom_created)
            .map(|t| t.custom_file.as_path())
    }

    pub fn preserved_custom_files(&self) -> impl Iterator<Item = &Path> {
        self.tags
            .iter()
            .filter(|t| !t.custom_created)
            .map(|t| t.custom_file.as_path())
    }

    pub fn function_count(&self) -> usize {
        self.tags.iter().map(|t| t.functions.len()).sum()
    }
}

/// One generation run over an injected document source
pub struct Generator {
    config: GenerationConfig,
    source: Box<dyn DocumentSource>,
    state: GenerationState,
}

impl Generator {
    pub fn new(config: GenerationConfig, source: Box<dyn DocumentSource>) -> Self {
        Generator {
            config,
            source,
            state: GenerationState::Idle,
        }
    }

    pub fn state(&self) -> GenerationState {
        self.state
    }

    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    /// Run the pipeline to completion.
    ///
    /// Any failure is fatal to the whole run; files written before the
    /// failure are left in place.
    pub fn run(&mut self) -> Result<GenerationReport, GenerateError> {
        self.state = GenerationState::Idle;
        match self.run_stages() {
            Ok(report) => {
                self.transition(GenerationState::Done);
                info!(
                    tags = report.tags.len(),
                    functions = report.function_count(),
                    "Generation complete"
                );
                Ok(report)
            }
            Err(err) => {
                error!(state = ?self.state, error = %err, "Generation failed");
                self.transition(GenerationState::Failed);
                Err(err)
            }
        }
    }

    fn transition(&mut self, next: GenerationState) {
        debug!(from = ?self.state, to = ?next, "Generation state changed");
        self.state = next;
    }

    fn run_stages(&mut self) -> Result<GenerationReport, GenerateError> {
        info!(source = %self.source.describe(), "Loading API document");
        let raw = self.source.fetch()?;
        let document = load_document(&raw)?;
        self.transition(GenerationState::DocumentLoaded);

        let groups = classify(&document);
        info!(
            paths = document.paths.len(),
            operations = document.operation_count(),
            tags = groups.len(),
            "Classified operations"
        );
        self.transition(GenerationState::Classified);

        let output_dir = self.config.output.output_dir.clone();
        let purged = prepare_output_dir(&output_dir, &self.config.output)?;
        self.transition(GenerationState::OutputReady);

        self.transition(GenerationState::Writing);
        let assembled = assemble_all(&document, &groups, &self.config)?;
        let mut tags = Vec::with_capacity(assembled.len());
        for tag in &assembled {
            tags.push(write_tag(&output_dir, tag, &self.config)?);
        }

        Ok(GenerationReport { tags, purged })
    }
}

/// Fetch, load and generate in one call.
pub fn generate(
    config: GenerationConfig,
    source: Box<dyn DocumentSource>,
) -> Result<GenerationReport, GenerateError> {
    Generator::new(config, source).run()
}

/// Render every tag group without touching the filesystem.
///
/// File names are claimed case-insensitively across both patterns, so no
/// generated file can land on another tag's custom file.
pub fn assemble_all(
    document: &Document,
    groups: &[TagGroup<'_>],
    config: &GenerationConfig,
) -> Result<Vec<AssembledTag>, GenerateError> {
    check_patterns(&config.output);
    let base_path = document.normalized_base_path();
    let mut claimed: HashSet<String> = HashSet::new();
    groups
        .iter()
        .map(|group| {
            let stem = unique_stem(&group.tag, &config.output, &mut claimed);
            assemble(group, &stem, &base_path, config)
        })
        .collect()
}

/// Pick the first of `stem`, `stem1`, `stem2`, ... whose generated and
/// custom file names are both unclaimed, then claim them.
fn unique_stem(tag: &str, output: &OutputOptions, claimed: &mut HashSet<String>) -> String {
    let stem = sanitize_tag_name(tag);
    let mut candidate = stem.clone();
    let mut counter = 0;
    loop {
        let (generated, custom) = file_names(output, &candidate);
        let (generated, custom) = (generated.to_lowercase(), custom.to_lowercase());
        if !claimed.contains(&generated) && !claimed.contains(&custom) {
            claimed.insert(generated);
            claimed.insert(custom);
            if counter > 0 {
                warn!(tag = %tag, stem = %candidate, "Tag file name collides with another tag's files; using a numeric suffix");
            }
            return candidate;
        }
        counter += 1;
        candidate = format!("{stem}{counter}");
    }
}

/// Create the output directory and, if configured, purge generated files.
fn prepare_output_dir(dir: &Path, output: &OutputOptions) -> Result<Vec<PathBuf>, GenerateError> {
    fs::create_dir_all(dir).map_err(|e| GenerateError::output_dir(dir, e))?;
    if !output.clean_output_dir {
        return Ok(Vec::new());
    }

    let entries = fs::read_dir(dir).map_err(|e| GenerateError::output_dir(dir, e))?;
    let mut purged = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| GenerateError::output_dir(dir, e))?;
        let is_file = entry.file_type().map(|t| t.is_file()).unwrap_or(false);
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if is_file && is_generated_file(name, output) {
            let path = entry.path();
            fs::remove_file(&path).map_err(|e| GenerateError::output_dir(dir, e))?;
            debug!(path = %path.display(), "Removed previously generated file");
            purged.push(path);
        }
    }
    if !purged.is_empty() {
        info!(count = purged.len(), dir = %dir.display(), "Cleaned previously generated files");
    }
    Ok(purged)
}

/// Whether `name` was produced by the generated-file pattern.
///
/// Files produced by the custom-file pattern never match, even when the two
/// patterns overlap.
pub fn is_generated_file(name: &str, output: &OutputOptions) -> bool {
    matches_pattern(name, &output.file_naming, output)
        && !matches_pattern(name, &output.custom_file_naming, output)
}

fn matches_pattern(name: &str, pattern: &str, output: &OutputOptions) -> bool {
    let pattern = if pattern.contains(NAME_PLACEHOLDER) {
        pattern.to_string()
    } else {
        format!("{NAME_PLACEHOLDER}{pattern}")
    };
    let Some((prefix, suffix)) = pattern.split_once(NAME_PLACEHOLDER) else {
        return false;
    };
    let extension = output.extension();
    let candidates: Vec<String> = if suffix.ends_with(".js") || suffix.ends_with(".ts") {
        vec![suffix.to_string()]
    } else {
        [extension.as_str(), ".js", ".ts"]
            .iter()
            .map(|ext| format!("{suffix}{ext}"))
            .collect()
    };
    candidates.iter().any(|suffix| {
        name.len() > prefix.len() + suffix.len()
            && name.starts_with(prefix)
            && name.ends_with(suffix.as_str())
    })
}

fn write_tag(
    dir: &Path,
    tag: &AssembledTag,
    config: &GenerationConfig,
) -> Result<TagReport, GenerateError> {
    let generated_file = dir.join(&tag.generated_name);
    let custom_file = dir.join(&tag.custom_name);

    fs::write(&generated_file, &tag.generated_text)
        .map_err(|e| GenerateError::write(&generated_file, e))?;
    info!(tag = %tag.tag, path = %generated_file.display(), functions = tag.functions.len(), "Wrote generated file");

    let custom_created = write_once(&custom_file, || tag.render_custom(config))?;
    if custom_created {
        info!(tag = %tag.tag, path = %custom_file.display(), "Created custom file");
    } else {
        debug!(tag = %tag.tag, path = %custom_file.display(), "Custom file exists; leaving it untouched");
    }

    Ok(TagReport {
        tag: tag.tag.clone(),
        generated_file,
        custom_file,
        custom_created,
        functions: tag.functions.iter().map(|f| f.name.clone()).collect(),
    })
}

/// Create `path` with rendered contents unless it already exists.
///
/// Returns `true` if the file was created.
fn write_once(
    path: &Path,
    render: impl FnOnce() -> Result<String, GenerateError>,
) -> Result<bool, GenerateError> {
    if path.exists() {
        return Ok(false);
    }
    let contents = render()?;
    let mut file = match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::AlreadyExists => return Ok(false),
        Err(e) => return Err(GenerateError::write(path, e)),
    };
    file.write_all(contents.as_bytes())
        .map_err(|e| GenerateError::write(path, e))?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_file_detection() {
        let output = OutputOptions::default();
        assert!(is_generated_file("pets.generated.js", &output));
        assert!(is_generated_file("pets.generated.ts", &output));
        assert!(!is_generated_file("pets.custom.js", &output));
        assert!(!is_generated_file(".generated.js", &output));
        assert!(!is_generated_file("README.md", &output));
    }

    #[test]
    fn test_overlapping_patterns_never_match_custom_files() {
        let output = OutputOptions {
            file_naming: "{{name}}".to_string(),
            custom_file_naming: "{{name}}.custom".to_string(),
            ..OutputOptions::default()
        };
        assert!(is_generated_file("pets.js", &output));
        assert!(!is_generated_file("pets.custom.js", &output));
    }

    #[test]
    fn test_unique_stem_is_case_insensitive() {
        let output = OutputOptions::default();
        let mut claimed = HashSet::new();
        assert_eq!(unique_stem("Pets", &output, &mut claimed), "Pets");
        assert_eq!(unique_stem("pets", &output, &mut claimed), "pets1");
        assert_eq!(unique_stem("pets ", &output, &mut claimed), "pets2");
        assert_eq!(unique_stem("store", &output, &mut claimed), "store");
    }

    #[test]
    fn test_unique_stem_avoids_other_tags_custom_file() {
        let output = OutputOptions {
            file_naming: "{{name}}".to_string(),
            custom_file_naming: "{{name}}.custom".to_string(),
            ..OutputOptions::default()
        };
        let mut claimed = HashSet::new();
        assert_eq!(unique_stem("pets", &output, &mut claimed), "pets");
        assert_eq!(unique_stem("pets.custom", &output, &mut claimed), "pets.custom1");

        let mut claimed = HashSet::new();
        assert_eq!(unique_stem("Pets.Custom", &output, &mut claimed), "Pets.Custom");
        assert_eq!(unique_stem("pets", &output, &mut claimed), "pets1");
    }

    #[test]
    fn test_write_once_keeps_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pets.custom.js");
        assert!(write_once(&path, || Ok("first\n".to_string())).unwrap());
        assert!(!write_once(&path, || Ok("second\n".to_string())).unwrap());
        assert_eq!(fs::read_to_string(&path).unwrap(), "first\n");
    }
}
