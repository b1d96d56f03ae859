//! Document retrieval.
//!
//! A [`DocumentSource`] hands the orchestrator a parsed JSON value. Local files
//! are read from disk; `http(s)://` sources are fetched with a blocking
//! `reqwest` client that applies the optional [`AuthConfig`] and follows
//! redirects hop by hop so authentication is re-applied on every request.

use crate::error::GenerateError;
use base64::Engine as _;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, LOCATION, USER_AGENT};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use url::Url;

/// Default overall retrieval timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Redirect hops followed before giving up
pub const MAX_REDIRECTS: usize = 10;

const AGENT: &str = concat!("swagger-axios-gen/", env!("CARGO_PKG_VERSION"));
const ACCEPT_VALUE: &str = "application/json, */*";

/// Something that can produce the raw API document
pub trait DocumentSource {
    /// Human-readable origin for logs and error messages
    fn describe(&self) -> String;

    /// Retrieve and parse the document.
    ///
    /// # Errors
    ///
    /// [`GenerateError::DocumentUnavailable`] or
    /// [`GenerateError::RetrievalTimeout`] when the payload cannot be
    /// obtained; [`GenerateError::DocumentMalformed`] when it does not parse.
    fn fetch(&self) -> Result<Value, GenerateError>;
}

/// Where an API key credential is sent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiKeyLocation {
    #[default]
    Header,
    Query,
}

/// Credentials applied to HTTP retrieval
///
/// Deserializes from `{"type": "...", "credentials": {...}}`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", content = "credentials", rename_all = "lowercase")]
pub enum AuthConfig {
    /// `Authorization: Basic base64(username:password)`
    Basic { username: String, password: String },
    /// `Authorization: Bearer <token>`
    #[serde(alias = "token")]
    Bearer { token: String },
    /// Named key sent as a header or a query parameter
    #[serde(rename = "apikey")]
    ApiKey {
        name: String,
        value: String,
        #[serde(default, rename = "in")]
        location: ApiKeyLocation,
    },
    /// Every pair sent verbatim as a header
    Custom(BTreeMap<String, String>),
}

impl AuthConfig {
    /// Header pairs this credential contributes
    pub fn headers(&self) -> Vec<(String, String)> {
        match self {
            AuthConfig::Basic { username, password } => {
                let encoded = base64::engine::general_purpose::STANDARD
                    .encode(format!("{username}:{password}"));
                vec![(AUTHORIZATION.to_string(), format!("Basic {encoded}"))]
            }
            AuthConfig::Bearer { token } => {
                vec![(AUTHORIZATION.to_string(), format!("Bearer {token}"))]
            }
            AuthConfig::ApiKey {
                name,
                value,
                location: ApiKeyLocation::Header,
            } => vec![(name.clone(), value.clone())],
            AuthConfig::ApiKey { .. } => Vec::new(),
            AuthConfig::Custom(pairs) => pairs
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        }
    }

    /// Add a query-string API key to `url` unless it already carries one.
    pub fn apply_query(&self, url: &mut Url) {
        if let AuthConfig::ApiKey {
            name,
            value,
            location: ApiKeyLocation::Query,
        } = self
        {
            if !url.query_pairs().any(|(k, _)| k == name.as_str()) {
                url.query_pairs_mut().append_pair(name, value);
            }
        }
    }

    /// Short label for logs; never includes secrets
    pub fn kind(&self) -> &'static str {
        match self {
            AuthConfig::Basic { .. } => "basic",
            AuthConfig::Bearer { .. } => "bearer",
            AuthConfig::ApiKey { .. } => "apikey",
            AuthConfig::Custom(_) => "custom",
        }
    }
}

/// Already-parsed document held in memory
#[derive(Debug, Clone)]
pub struct InlineSource {
    value: Value,
}

impl InlineSource {
    pub fn new(value: Value) -> Self {
        InlineSource { value }
    }
}

impl DocumentSource for InlineSource {
    fn describe(&self) -> String {
        "<inline document>".to_string()
    }

    fn fetch(&self) -> Result<Value, GenerateError> {
        Ok(self.value.clone())
    }
}

/// Document read from the local filesystem
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileSource { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DocumentSource for FileSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn fetch(&self) -> Result<Value, GenerateError> {
        debug!(path = %self.path.display(), "Reading API document");
        let text = std::fs::read_to_string(&self.path)
            .map_err(|e| GenerateError::unavailable(&self.describe(), e))?;
        let is_yaml = self
            .path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"));
        if is_yaml {
            parse_yaml(&text).map_err(GenerateError::malformed)
        } else {
            parse_payload(&text)
        }
    }
}

/// Document fetched over HTTP(S)
#[derive(Debug, Clone)]
pub struct HttpSource {
    url: String,
    auth: Option<AuthConfig>,
    timeout: Duration,
}

impl HttpSource {
    pub fn new(url: impl Into<String>) -> Self {
        HttpSource {
            url: url.into(),
            auth: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_auth(mut self, auth: Option<AuthConfig>) -> Self {
        self.auth = auth;
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn timed_out(&self) -> GenerateError {
        GenerateError::RetrievalTimeout {
            source: self.url.clone(),
            seconds: self.timeout.as_secs(),
        }
    }

    fn transport_error(&self, err: reqwest::Error) -> GenerateError {
        if err.is_timeout() {
            self.timed_out()
        } else {
            GenerateError::unavailable(&self.url, err)
        }
    }
}

impl DocumentSource for HttpSource {
    fn describe(&self) -> String {
        self.url.clone()
    }

    fn fetch(&self) -> Result<Value, GenerateError> {
        let client = reqwest::blocking::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .timeout(self.timeout)
            .build()
            .map_err(|e| GenerateError::unavailable(&self.url, e))?;

        let mut current =
            Url::parse(&self.url).map_err(|e| GenerateError::unavailable(&self.url, e))?;
        let started = Instant::now();

        for hop in 0..=MAX_REDIRECTS {
            let remaining = self
                .timeout
                .checked_sub(started.elapsed())
                .filter(|d| !d.is_zero())
                .ok_or_else(|| self.timed_out())?;

            let mut target = current.clone();
            if let Some(auth) = &self.auth {
                auth.apply_query(&mut target);
            }
            let mut request = client
                .get(target.as_str())
                .timeout(remaining)
                .header(USER_AGENT, AGENT)
                .header(ACCEPT, ACCEPT_VALUE);
            for (name, value) in self.auth.iter().flat_map(AuthConfig::headers) {
                request = request.header(name, value);
            }
            info!(url = %current, hop, auth = self.auth.as_ref().map(AuthConfig::kind), "Fetching API document");

            let response = request.send().map_err(|e| self.transport_error(e))?;
            let status = response.status();

            if matches!(status.as_u16(), 301 | 302 | 307 | 308) {
                let location = response
                    .headers()
                    .get(LOCATION)
                    .and_then(|v| v.to_str().ok())
                    .ok_or_else(|| {
                        GenerateError::unavailable(
                            &self.url,
                            format!("redirect ({status}) without a Location header"),
                        )
                    })?;
                let next = current
                    .join(location)
                    .map_err(|e| GenerateError::unavailable(&self.url, e))?;
                debug!(from = %current, to = %next, "Following redirect");
                current = next;
                continue;
            }

            if !status.is_success() {
                return Err(GenerateError::unavailable(
                    &self.url,
                    format!("HTTP request failed with status {status}"),
                ));
            }

            let content_type = response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
                .to_ascii_lowercase();
            if !["json", "text/plain", "yaml"]
                .iter()
                .any(|t| content_type.contains(t))
            {
                warn!(content_type = %content_type, "Unexpected content type for API document, parsing anyway");
            }

            let body = response.text().map_err(|e| self.transport_error(e))?;
            return parse_payload(&body);
        }

        Err(GenerateError::unavailable(
            &self.url,
            format!("too many redirects (more than {MAX_REDIRECTS})"),
        ))
    }
}

/// Pick a source for `source`: `http(s)://` URLs are fetched, anything else is
/// a file path.
pub fn source_for(
    source: &str,
    auth: Option<AuthConfig>,
    timeout: Duration,
) -> Box<dyn DocumentSource> {
    if is_url(source) {
        Box::new(HttpSource::new(source).with_auth(auth).with_timeout(timeout))
    } else {
        if auth.is_some() {
            debug!(source = %source, "Ignoring authentication for a local file");
        }
        Box::new(FileSource::new(source))
    }
}

pub fn is_url(source: &str) -> bool {
    let lower = source.trim_start().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Parse a retrieved payload: JSON first, then YAML.
///
/// # Errors
///
/// [`GenerateError::DocumentMalformed`] for an empty body, an HTML page, or
/// text that is neither JSON nor YAML.
pub fn parse_payload(body: &str) -> Result<Value, GenerateError> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return Err(GenerateError::malformed("the document is empty"));
    }
    match serde_json::from_str::<Value>(trimmed) {
        Ok(value) => Ok(value),
        Err(json_err) => {
            if looks_like_html(trimmed) {
                return Err(GenerateError::malformed(
                    "received an HTML page instead of an API document; the URL may be wrong or require authentication",
                ));
            }
            parse_yaml(trimmed).map_err(|yaml_err| {
                GenerateError::malformed(format!(
                    "not valid JSON ({json_err}) or YAML ({yaml_err})"
                ))
            })
        }
    }
}

fn looks_like_html(text: &str) -> bool {
    let head: String = text.chars().take(512).collect::<String>().to_ascii_lowercase();
    head.starts_with("<!doctype") || head.contains("<html")
}

/// YAML to JSON, stringifying non-string keys (`200:` is an integer in YAML).
fn parse_yaml(text: &str) -> Result<Value, String> {
    let yaml: serde_yaml::Value = serde_yaml::from_str(text).map_err(|e| e.to_string())?;
    Ok(yaml_to_json(yaml))
}

fn yaml_to_json(value: serde_yaml::Value) -> Value {
    match value {
        serde_yaml::Value::Null => Value::Null,
        serde_yaml::Value::Bool(b) => Value::Bool(b),
        serde_yaml::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::from(i)
            } else if let Some(u) = n.as_u64() {
                Value::from(u)
            } else {
                n.as_f64()
                    .and_then(serde_json::Number::from_f64)
                    .map_or(Value::Null, Value::Number)
            }
        }
        serde_yaml::Value::String(s) => Value::String(s),
        serde_yaml::Value::Sequence(items) => {
            Value::Array(items.into_iter().map(yaml_to_json).collect())
        }
        serde_yaml::Value::Mapping(map) => {
            let mut out = Map::new();
            for (key, value) in map {
                out.insert(yaml_key(key), yaml_to_json(value));
            }
            Value::Object(out)
        }
        serde_yaml::Value::Tagged(tagged) => yaml_to_json(tagged.value),
    }
}

fn yaml_key(key: serde_yaml::Value) -> String {
    match key {
        serde_yaml::Value::String(s) => s,
        serde_yaml::Value::Bool(b) => b.to_string(),
        serde_yaml::Value::Number(n) => n.to_string(),
        serde_yaml::Value::Null => "null".to_string(),
        other => serde_yaml::to_string(&other)
            .map(|s| s.trim().to_string())
            .unwrap_or_default(),
    }
}
