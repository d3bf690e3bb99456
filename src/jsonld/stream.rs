//! Async driver
//!
//! Reads a document from an [`AsyncRead`] and forwards quads over a bounded
//! tokio channel. A full channel suspends reading; a dropped receiver stops
//! the conversion with [`JsonLdError::Cancelled`].

use super::error::{JsonLdError, JsonLdResult};
use super::options::ParserOptions;
use super::parser::JsonLdParser;
use crate::rdf::Quad;
use bytes::BytesMut;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, info};

/// Convert `reader` and send each quad to `tx`; returns the number sent
pub async fn parse_async<R>(
    reader: R,
    options: ParserOptions,
    tx: mpsc::Sender<Quad>,
) -> JsonLdResult<usize>
where
    R: AsyncRead + Unpin,
{
    let parser = JsonLdParser::new(options)?;
    drive(reader, parser, &tx, |quad| quad).await
}

/// Like [`parse_async`], with a caller-configured parser
pub async fn parse_async_with<R>(
    reader: R,
    parser: JsonLdParser,
    tx: mpsc::Sender<Quad>,
) -> JsonLdResult<usize>
where
    R: AsyncRead + Unpin,
{
    drive(reader, parser, &tx, |quad| quad).await
}

/// Convert `reader` on a background task
///
/// The stream yields quads in emission order and, if the conversion fails,
/// one final `Err`.
pub fn quad_stream<R>(reader: R, options: ParserOptions) -> ReceiverStream<JsonLdResult<Quad>>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    let (tx, rx) = mpsc::channel(options.channel_capacity.max(1));
    tokio::spawn(async move {
        let result = match JsonLdParser::new(options) {
            Ok(parser) => drive(reader, parser, &tx, Ok).await,
            Err(e) => Err(e),
        };
        match result {
            Ok(_) | Err(JsonLdError::Cancelled) => {}
            Err(e) => {
                let _ = tx.send(Err(e)).await;
            }
        }
    });
    ReceiverStream::new(rx)
}

async fn drive<R, T>(
    mut reader: R,
    mut parser: JsonLdParser,
    tx: &mpsc::Sender<T>,
    wrap: fn(Quad) -> T,
) -> JsonLdResult<usize>
where
    R: AsyncRead + Unpin,
{
    let mut buffer = BytesMut::with_capacity(parser.options().read_buffer_size.max(1));
    let mut batch: Vec<Quad> = Vec::new();
    let mut sent = 0;

    info!("JSON-LD conversion started");
    loop {
        buffer.clear();
        let n = reader.read_buf(&mut buffer).await?;
        let result = if n == 0 {
            parser.finish(&mut batch)
        } else {
            parser.push(&buffer, &mut batch)
        };

        for quad in batch.drain(..) {
            if tx.send(wrap(quad)).await.is_err() {
                debug!(sent, "quad receiver dropped");
                return Err(JsonLdError::Cancelled);
            }
            sent += 1;
        }
        result?;

        if n == 0 {
            break;
        }
    }
    info!(quads = sent, "JSON-LD conversion finished");
    Ok(sent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    #[tokio::test]
    async fn test_parse_async_counts_quads() {
        let input: &[u8] = br#"{"@id": "http://ex.org/s", "http://ex.org/p": [1, 2, 3]}"#;
        let (tx, mut rx) = mpsc::channel(8);
        let sent = parse_async(input, ParserOptions::default(), tx).await.unwrap();
        assert_eq!(sent, 3);

        let mut received = 0;
        while rx.recv().await.is_some() {
            received += 1;
        }
        assert_eq!(received, 3);
    }

    #[tokio::test]
    async fn test_quad_stream_reports_error_last() {
        let input: &[u8] = br#"{"@id": "http://ex.org/s", "http://ex.org/p": "o", "@id": "http://ex.org/t"}"#;
        let results: Vec<_> = quad_stream(input, ParserOptions::default()).collect().await;
        assert_eq!(results.len(), 2);
        assert!(results[0].is_ok());
        assert!(matches!(results[1], Err(JsonLdError::DuplicateIdentity { .. })));
    }
}
