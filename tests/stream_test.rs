use futures::StreamExt;
use jsonld_streaming::jsonld::{
    parse_async, parse_async_with, quad_stream, JsonLdError, JsonLdParser, KeyResolver,
    ParserOptions,
};
use std::io::Write;
use tokio::sync::mpsc;

fn document(subjects: usize) -> String {
    let nodes: Vec<String> = (0..subjects)
        .map(|i| {
            format!(
                r#"{{"http://ex.org/value": {}, "@id": "http://ex.org/n{}"}}"#,
                i, i
            )
        })
        .collect();
    format!("[{}]", nodes.join(",\n"))
}

#[tokio::test]
async fn test_stream_matches_document_order() {
    let mut options = ParserOptions::default();
    options.read_buffer_size = 7;
    options.channel_capacity = 2;

    let input = document(50);
    let quads: Vec<_> = quad_stream(std::io::Cursor::new(input.into_bytes()), options)
        .collect()
        .await;

    assert_eq!(quads.len(), 50);
    for (i, quad) in quads.into_iter().enumerate() {
        let quad = quad.unwrap();
        assert_eq!(
            quad.to_string(),
            format!(
                r#"<http://ex.org/n{}> <http://ex.org/value> "{}"^^<http://www.w3.org/2001/XMLSchema#integer> ."#,
                i, i
            )
        );
    }
}

#[tokio::test]
async fn test_dropped_receiver_cancels_conversion() {
    let mut options = ParserOptions::default();
    options.channel_capacity = 1;
    let input = document(100).into_bytes();

    let (tx, mut rx) = mpsc::channel(options.channel_capacity);
    let handle = tokio::spawn(async move {
        parse_async(std::io::Cursor::new(input), options, tx).await
    });

    assert!(rx.recv().await.is_some());
    drop(rx);

    let result = handle.await.unwrap();
    assert!(matches!(result, Err(JsonLdError::Cancelled)), "{:?}", result);
}

#[tokio::test]
async fn test_syntax_error_ends_stream() {
    let input: &[u8] = br#"{"@id": "http://ex.org/s", "http://ex.org/p": "o" "http://ex.org/q": 1}"#;
    let results: Vec<_> = quad_stream(input, ParserOptions::default()).collect().await;
    assert_eq!(results.len(), 2);
    assert!(results[0].is_ok());
    assert!(matches!(results[1], Err(JsonLdError::Syntax { .. })));
}

#[tokio::test]
async fn test_options_from_yaml_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "blank_node_prefix: node").unwrap();
    writeln!(file, "prefixes:").unwrap();
    writeln!(file, "  ex: http://example.org/").unwrap();

    let options = ParserOptions::from_yaml_file(file.path()).unwrap();
    let input: &[u8] = br#"{"ex:name": "Alice"}"#;
    let quads: Vec<_> = quad_stream(input, options).collect().await;
    assert_eq!(quads.len(), 1);
    assert_eq!(
        quads[0].as_ref().unwrap().to_string(),
        r#"_:node0 <http://example.org/name> "Alice" ."#
    );
}

#[test]
fn test_missing_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let result = ParserOptions::from_yaml_file(dir.path().join("missing.yaml"));
    assert!(matches!(result, Err(JsonLdError::Config(_))));
}

/// Resolves every key, including plain terms, under one base IRI
struct BaseResolver(&'static str);

impl KeyResolver for BaseResolver {
    fn expand(&self, key: &str) -> Option<String> {
        Some(format!("{}{}", self.0, key))
    }
}

#[tokio::test]
async fn test_parse_async_with_configured_parser() {
    let parser = JsonLdParser::default().with_resolver(Box::new(BaseResolver("http://base.org/")));
    let input: &[u8] = br#"{"@id": "alice", "name": "Alice"}"#;

    let (tx, mut rx) = mpsc::channel(4);
    let sent = parse_async_with(input, parser, tx).await.unwrap();
    assert_eq!(sent, 1);

    let quad = rx.recv().await.unwrap();
    assert_eq!(
        quad.to_string(),
        r#"<http://base.org/alice> <http://base.org/name> "Alice" ."#
    );
    assert!(rx.recv().await.is_none());
}
