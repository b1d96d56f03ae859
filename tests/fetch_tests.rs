#![allow(clippy::unwrap_used, clippy::expect_used)]

use serde_json::json;
use std::thread;
use std::time::Duration;
use swagger_axios_gen::spec::{
    source_for, ApiKeyLocation, AuthConfig, DocumentSource, HttpSource,
};
use swagger_axios_gen::GenerateError;
use tiny_http::{Header, Request, Response, Server};

const PET_DOC: &str = r#"{
  "swagger": "2.0",
  "paths": {
    "/pets/{id}": {
      "get": {
        "tags": ["pets"],
        "operationId": "getPetUsingGET",
        "parameters": [{ "name": "id", "in": "path", "type": "integer" }]
      }
    }
  }
}"#;

struct Reply {
    status: u16,
    headers: Vec<(&'static str, String)>,
    body: String,
}

impl Reply {
    fn json(body: &str) -> Self {
        Reply {
            status: 200,
            headers: vec![("Content-Type", "application/json".to_string())],
            body: body.to_string(),
        }
    }

    fn status(status: u16) -> Self {
        Reply {
            status,
            headers: Vec::new(),
            body: String::new(),
        }
    }

    fn redirect(status: u16, location: &str) -> Self {
        Reply {
            status,
            headers: vec![("Location", location.to_string())],
            body: String::new(),
        }
    }
}

fn header(request: &Request, name: &str) -> Option<String> {
    request
        .headers()
        .iter()
        .find(|h| h.field.as_str().as_str().eq_ignore_ascii_case(name))
        .map(|h| h.value.as_str().to_string())
}

/// Serve `handler` on an ephemeral port; returns the base URL.
fn serve<F>(handler: F) -> String
where
    F: Fn(&Request) -> Reply + Send + 'static,
{
    let server = Server::http("127.0.0.1:0").unwrap();
    let addr = server.server_addr().to_ip().unwrap();
    thread::spawn(move || {
        for request in server.incoming_requests() {
            let reply = handler(&request);
            let mut response = Response::from_string(reply.body).with_status_code(reply.status);
            for (name, value) in reply.headers {
                response = response
                    .with_header(Header::from_bytes(name.as_bytes(), value.as_bytes()).unwrap());
            }
            let _ = request.respond(response);
        }
    });
    format!("http://{addr}")
}

fn fetch(url: &str, auth: Option<AuthConfig>) -> Result<serde_json::Value, GenerateError> {
    HttpSource::new(url)
        .with_auth(auth)
        .with_timeout(Duration::from_secs(5))
        .fetch()
}

#[test]
fn test_fetch_sends_accept_and_user_agent() {
    let base = serve(|req| {
        let accept = header(req, "Accept").unwrap_or_default();
        let agent = header(req, "User-Agent").unwrap_or_default();
        if accept.contains("application/json") && !agent.is_empty() {
            Reply::json(PET_DOC)
        } else {
            Reply::status(400)
        }
    });
    let doc = fetch(&format!("{base}/v2/api-docs"), None).unwrap();
    assert_eq!(doc["swagger"], "2.0");
}

#[test]
fn test_basic_auth_header() {
    let base = serve(|req| match header(req, "Authorization").as_deref() {
        Some("Basic YWRhOnMzY3JldA==") => Reply::json(PET_DOC),
        _ => Reply::status(401),
    });
    let url = format!("{base}/v2/api-docs");

    let err = fetch(&url, None).unwrap_err();
    assert!(matches!(err, GenerateError::DocumentUnavailable { .. }));
    assert!(err.to_string().contains("401"));

    let auth = AuthConfig::Basic {
        username: "ada".to_string(),
        password: "s3cret".to_string(),
    };
    assert!(fetch(&url, Some(auth)).is_ok());
}

#[test]
fn test_bearer_and_custom_headers() {
    let base = serve(|req| {
        let bearer = header(req, "Authorization").as_deref() == Some("Bearer t0ken");
        let tenant = header(req, "X-Tenant").as_deref() == Some("acme");
        if bearer || tenant {
            Reply::json(PET_DOC)
        } else {
            Reply::status(403)
        }
    });
    let url = format!("{base}/docs");

    let auth = AuthConfig::Bearer {
        token: "t0ken".to_string(),
    };
    assert!(fetch(&url, Some(auth)).is_ok());

    let auth = AuthConfig::Custom([("X-Tenant".to_string(), "acme".to_string())].into());
    assert!(fetch(&url, Some(auth)).is_ok());
}

#[test]
fn test_api_key_in_header_or_query() {
    let base = serve(|req| {
        let in_header = header(req, "X-API-Key").as_deref() == Some("k1");
        let in_query = req.url().contains("api_key=k1");
        if in_header || in_query {
            Reply::json(PET_DOC)
        } else {
            Reply::status(401)
        }
    });
    let url = format!("{base}/docs?format=json");

    let auth = AuthConfig::ApiKey {
        name: "X-API-Key".to_string(),
        value: "k1".to_string(),
        location: ApiKeyLocation::Header,
    };
    assert!(fetch(&url, Some(auth)).is_ok());

    let auth = AuthConfig::ApiKey {
        name: "api_key".to_string(),
        value: "k1".to_string(),
        location: ApiKeyLocation::Query,
    };
    assert!(fetch(&url, Some(auth)).is_ok());
}

#[test]
fn test_redirects_keep_credentials() {
    let base = serve(|req| match req.url() {
        "/old" => Reply::redirect(301, "/moved"),
        "/moved" => Reply::redirect(307, "v2/api-docs"),
        "/v2/api-docs" => match header(req, "Authorization").as_deref() {
            Some("Bearer abc") => Reply::json(PET_DOC),
            _ => Reply::status(401),
        },
        _ => Reply::status(404),
    });
    let auth = AuthConfig::Bearer {
        token: "abc".to_string(),
    };
    let doc = fetch(&format!("{base}/old"), Some(auth)).unwrap();
    assert!(doc["paths"]["/pets/{id}"].is_object());
}

#[test]
fn test_redirect_without_location_fails() {
    let base = serve(|_| Reply::status(302));
    let err = fetch(&format!("{base}/docs"), None).unwrap_err();
    assert!(matches!(err, GenerateError::DocumentUnavailable { .. }));
    assert!(err.to_string().contains("Location"));
}

#[test]
fn test_redirect_loop_is_bounded() {
    let base = serve(|_| Reply::redirect(302, "/again"));
    let err = fetch(&format!("{base}/start"), None).unwrap_err();
    assert!(err.to_string().contains("too many redirects"));
}

#[test]
fn test_not_found_is_unavailable() {
    let base = serve(|_| Reply::status(404));
    let err = fetch(&format!("{base}/missing"), None).unwrap_err();
    assert!(matches!(err, GenerateError::DocumentUnavailable { .. }));
    assert!(err.to_string().contains("404"));
}

#[test]
fn test_html_login_page_is_malformed() {
    let base = serve(|_| Reply {
        status: 200,
        headers: vec![("Content-Type", "text/html".to_string())],
        body: "<!DOCTYPE html><html><body>Sign in</body></html>".to_string(),
    });
    let err = fetch(&format!("{base}/docs"), None).unwrap_err();
    assert!(matches!(err, GenerateError::DocumentMalformed { .. }));
    assert!(err.to_string().contains("HTML"));
}

#[test]
fn test_yaml_payload_is_accepted() {
    let base = serve(|_| Reply {
        status: 200,
        headers: vec![("Content-Type", "application/yaml".to_string())],
        body: "openapi: 3.0.0\npaths:\n  /ping:\n    get:\n      tags: [health]\n      responses:\n        200:\n          description: ok\n"
            .to_string(),
    });
    let doc = fetch(&format!("{base}/openapi.yaml"), None).unwrap();
    assert_eq!(
        doc["paths"]["/ping"]["get"]["responses"]["200"],
        json!({ "description": "ok" })
    );
}

#[test]
fn test_slow_server_times_out() {
    let base = serve(|_| {
        thread::sleep(Duration::from_secs(3));
        Reply::json(PET_DOC)
    });
    let err = HttpSource::new(format!("{base}/docs"))
        .with_timeout(Duration::from_secs(1))
        .fetch()
        .unwrap_err();
    assert_eq!(
        err,
        GenerateError::RetrievalTimeout {
            source: format!("{base}/docs"),
            seconds: 1,
        }
    );
}

#[test]
fn test_connection_refused_is_unavailable() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let err = fetch(&format!("http://127.0.0.1:{port}/docs"), None).unwrap_err();
    assert!(matches!(err, GenerateError::DocumentUnavailable { .. }));
}

#[test]
fn test_source_for_picks_http_for_urls() {
    let base = serve(|_| Reply::json(PET_DOC));
    let source = source_for(&format!("{base}/docs"), None, Duration::from_secs(5));
    assert_eq!(source.describe(), format!("{base}/docs"));
    assert_eq!(source.fetch().unwrap()["swagger"], "2.0");

    let source = source_for("swagger.json", None, Duration::from_secs(5));
    assert_eq!(source.describe(), "swagger.json");
}
