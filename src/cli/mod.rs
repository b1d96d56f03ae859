//! # CLI Module
//!
//! Command-line surface of the generator.
//!
//! ## Commands
//!
//! ### `generate`
//!
//! Fetch a document and write one generated module per tag, plus a custom
//! override file for tags that do not have one yet:
//!
//! ```bash
//! swagger-axios-gen generate --source swagger.json --output src/api
//! ```
//!
//! Options:
//! - `--source <PATH|URL>` - Document location (required)
//! - `--output <DIR>` - Output directory (default: `api`)
//! - `--config <FILE>` - Settings file in JSON, YAML or TOML
//! - `--clean` - Remove previously generated files first
//! - `--typescript` - Emit `.ts` files
//!
//! ### `inspect`
//!
//! Print the tags and the functions that would be generated:
//!
//! ```bash
//! swagger-axios-gen inspect --source https://petstore.swagger.io/v2/swagger.json
//! ```
//!
//! ## Authentication
//!
//! URL sources accept `--auth-type basic|bearer|token|apikey|custom`:
//!
//! ```bash
//! swagger-axios-gen generate \
//!     --source https://internal.example.com/v2/api-docs \
//!     --auth-type apikey --api-key-name X-API-Key --api-key-value "$KEY" \
//!     --output src/api
//!
//! swagger-axios-gen generate \
//!     --source https://internal.example.com/v2/api-docs \
//!     --header "X-Tenant=acme" --header "X-Env=staging"
//! ```
//!
//! Settings are layered: built-in defaults, then `--config`, then flags.

mod commands;


pub use commands::{
    flag_overrides, parse_header, resolve_config, run_cli, AuthKind, Cli, Commands, KeyIn,
    SourceArgs,
};
