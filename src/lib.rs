//! # swagger-axios-gen
//!
//! Generates HTTP client modules from a Swagger 2 / OpenAPI 3 document: one
//! module per API tag, each exporting one request function per operation,
//! plus a companion custom file per tag that is created once and never
//! overwritten.
//!
//! ## Overview
//!
//! - **[`spec`]** - Document retrieval (file or URL, with authentication) and
//!   loading into a typed model
//! - **[`generator`]** - Classification, naming, type mapping, parameter
//!   planning and code emission
//! - **[`config`]** - Generation settings with layered overrides
//! - **[`cli`]** - The `swagger-axios-gen` command line
//! - **[`logging`]** - `tracing` subscriber setup
//!
//! ## Generation Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant CLI as CLI<br/>(swagger-axios-gen)
//!     participant Source as spec::DocumentSource
//!     participant Load as spec::load_document
//!     participant Gen as generator::Generator
//!     participant FS as File System
//!
//!     CLI->>Source: fetch()
//!     Source-->>CLI: serde_json::Value
//!     CLI->>Gen: run()
//!     Gen->>Load: load_document(&value)
//!     Load-->>Gen: Document
//!     Gen->>Gen: classify → assemble (per tag)
//!     Gen->>FS: write <tag>.generated.js
//!     Gen->>FS: create <tag>.custom.js (if missing)
//!     Gen-->>CLI: GenerationReport
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use swagger_axios_gen::{generate, GenerationConfig, FileSource};
//!
//! let mut config = GenerationConfig::default();
//! config.output.output_dir = "src/api".into();
//! let report = generate(config, Box::new(FileSource::new("swagger.json")))?;
//! for tag in &report.tags {
//!     println!("{} -> {}", tag.tag, tag.generated_file.display());
//! }
//! ```
//!
//! ## Generated Code
//!
//! For `GET /pets/{id}` tagged `pets` with `operationId: getPetUsingGET`:
//!
//! ```javascript
//! export function getPet(id) {
//!   const url = `${path}/pets/${id}`;
//!   return request({
//!     url,
//!     method: 'GET',
//!   });
//! }
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod generator;
pub mod logging;
pub mod spec;

pub use config::{ConfigOverrides, GenerationConfig};
pub use error::GenerateError;
pub use generator::{generate, GenerationReport, Generator};
pub use spec::{AuthConfig, DocumentSource, FileSource, HttpSource, InlineSource};
