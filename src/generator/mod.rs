//! # Generator Module
//!
//! Turns a loaded API document into per-tag HTTP client modules.
//!
//! ## Pipeline
//!
//! ```text
//! Document → classify → (per tag) assemble → (per operation) emit_function
//!                                               └─ plan / resolve_type / naming
//! ```
//!
//! 1. **Classifier** ([`classify`]) groups operations by their first tag,
//!    preserving discovery order. Untagged operations are skipped.
//! 2. **Assembler** ([`assemble`]) renders one module per tag with the
//!    Askama templates under `templates/`: imports, a shared `path`
//!    constant, then one function per operation.
//! 3. **Emitter** ([`emit_function`]) renders a single function: doc block,
//!    signature, URL template and `request({...})` call.
//! 4. **Planner** ([`plan`]) fixes the call signature: path parameters, then
//!    `params`, then `data`.
//!
//! ## Output
//!
//! For every tag two files are produced in the output directory:
//!
//! ```text
//! api/
//! ├── pets.generated.js   # rewritten on every run
//! └── pets.custom.js      # created once, then never touched
//! ```
//!
//! The custom file re-exports the generated module; exporting a function with
//! the same name from it shadows the generated one.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use swagger_axios_gen::config::GenerationConfig;
//! use swagger_axios_gen::generator::Generator;
//! use swagger_axios_gen::spec::FileSource;
//!
//! let mut generator = Generator::new(
//!     GenerationConfig::default(),
//!     Box::new(FileSource::new("swagger.json")),
//! );
//! let report = generator.run()?;
//! println!("{} files", report.tags.len() * 2);
//! ```

mod classify;
mod file;
mod function;
mod naming;
mod params;
mod project;
mod schema;

pub use classify::*;
pub use file::*;
pub use function::*;
pub use naming::*;
pub use params::*;
pub use project::*;
pub use schema::*;
