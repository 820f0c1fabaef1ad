use crate::config::PreprocessOptions;
use crate::document::{Info, OpenApiDocument, Server, ServerEntry};
use serde_yaml::{Mapping, Value};
use tracing::debug;

/// URL of the synthetic server entry; the web UI lets readers edit the variable.
pub const PLACEHOLDER_SERVER_URL: &str = "{platformEndpoint}";
pub const PLACEHOLDER_SERVER_DESCRIPTION: &str =
    "Example OpenTDF platform URL, such as https://platform.localhost";
pub const DEFAULT_VERSION: &str = "v1";

/// Applies the fixed sequence of edits the docs plugin relies on.
///
/// Re-running on its own output changes nothing unless `add_timestamp` is set.
pub fn normalize(mut doc: OpenApiDocument, id: &str, options: &PreprocessOptions) -> OpenApiDocument {
    let info = doc.info.get_or_insert_with(Info::default);

    let description = info.description.take().unwrap_or_default();
    info.description = Some(if options.add_timestamp {
        format!(
            "[Preprocessed on {}] {description}",
            chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
        )
    } else {
        description
    });

    if !info.has_version() {
        debug!(id, "Defaulting info.version");
        info.version = Some(Value::from(DEFAULT_VERSION));
    }

    let servers = doc.servers.get_or_insert_with(Vec::new);
    if !servers.iter().any(ServerEntry::has_url) {
        debug!(id, "Appending placeholder server");
        servers.push(ServerEntry::Server(placeholder_server()));
    }

    let tags = Value::Sequence(vec![Value::from(id)]);
    for operation in doc.operations_mut() {
        operation.insert(Value::from("tags"), tags.clone());
    }

    doc
}

fn placeholder_server() -> Server {
    let mut endpoint = Mapping::new();
    endpoint.insert("default".into(), "platformEndpoint".into());
    let mut variables = Mapping::new();
    variables.insert("platformEndpoint".into(), Value::Mapping(endpoint));

    let mut rest = Mapping::new();
    rest.insert("description".into(), PLACEHOLDER_SERVER_DESCRIPTION.into());
    rest.insert("variables".into(), Value::Mapping(variables));

    Server {
        url: Some(PLACEHOLDER_SERVER_URL.to_string()),
        rest,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts() -> PreprocessOptions {
        PreprocessOptions::default()
    }

    fn parse(text: &str) -> OpenApiDocument {
        OpenApiDocument::from_yaml(text).unwrap()
    }

    #[test]
    fn document_without_info_gets_defaults() {
        let doc = normalize(parse("openapi: 3.0.0\n"), "kas", &opts());
        let info = doc.info.unwrap();
        assert_eq!(info.description.as_deref(), Some(""));
        assert_eq!(info.version, Some(Value::from("v1")));

        let servers = doc.servers.unwrap();
        assert_eq!(servers.len(), 1);
        let placeholder = servers[0].as_server().unwrap();
        assert_eq!(placeholder.url.as_deref(), Some(PLACEHOLDER_SERVER_URL));
        assert!(placeholder.rest.contains_key("variables"));
    }

    #[test]
    fn existing_version_and_description_are_kept() {
        let doc = normalize(
            parse("info:\n  description: Key access\n  version: 2.1.0\n"),
            "kas",
            &opts(),
        );
        let info = doc.info.unwrap();
        assert_eq!(info.description.as_deref(), Some("Key access"));
        assert_eq!(info.version, Some(Value::from("2.1.0")));
    }

    #[test]
    fn url_less_servers_get_a_placeholder_appended() {
        let doc = normalize(
            parse("servers:\n  - description: no url here\n"),
            "kas",
            &opts(),
        );
        let servers = doc.servers.unwrap();
        assert_eq!(servers.len(), 2);
        assert!(!servers[0].has_url());
        assert!(servers[1].has_url());
    }

    #[test]
    fn bare_string_servers_are_kept_and_a_placeholder_appended() {
        let doc = normalize(parse("servers:\n  - https://x\n"), "kas", &opts());
        let servers = doc.servers.unwrap();
        assert_eq!(servers.len(), 2);
        assert_eq!(servers[0], ServerEntry::Other(Value::from("https://x")));
        assert_eq!(
            servers[1].as_server().and_then(|s| s.url.as_deref()),
            Some(PLACEHOLDER_SERVER_URL)
        );
    }

    #[test]
    fn servers_with_a_url_are_left_alone() {
        let doc = normalize(
            parse("servers:\n  - url: https://platform.example\n"),
            "kas",
            &opts(),
        );
        assert_eq!(doc.servers.unwrap().len(), 1);
    }

    #[test]
    fn every_operation_is_retagged_with_the_id() {
        let doc = normalize(
            parse(
                r#"
paths:
  /a:
    get: { tags: [one, two] }
    post: { operationId: create }
    parameters: []
  /b:
    delete: {}
    patch: { tags: [] }
    put: { tags: [x] }
"#,
            ),
            "Policy Objects",
            &opts(),
        );
        let expected = Value::Sequence(vec![Value::from("Policy Objects")]);
        let tags = doc.operation_tags();
        assert_eq!(tags.len(), 5);
        assert!(tags.iter().all(|t| *t == Some(&expected)));
    }

    #[test]
    fn normalization_is_idempotent() {
        let source = r#"
openapi: 3.1.0
servers: []
paths:
  /x:
    get:
      tags: [upstream]
      responses: {}
"#;
        let once = normalize(parse(source), "kas", &opts());
        let twice = normalize(parse(&once.to_yaml().unwrap()), "kas", &opts());
        assert_eq!(once, twice);
    }

    #[test]
    fn timestamp_prefix_when_enabled() {
        let options = PreprocessOptions {
            add_timestamp: true,
            ..PreprocessOptions::default()
        };
        let doc = normalize(parse("info:\n  description: hello\n"), "kas", &options);
        let description = doc.info.unwrap().description.unwrap();
        assert!(description.starts_with("[Preprocessed on "));
        assert!(description.ends_with("] hello"));
    }
}
