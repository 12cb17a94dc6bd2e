//! Async API for non-blocking loading and export.
//!
//! Enable the `async` feature to use these APIs:
//!
//! ```toml
//! [dependencies]
//! aifixer = { version = "0.1", features = ["async"] }
//! ```

use crate::error::{Error, Result};
use crate::host::Exporter;
use crate::model::{FeatureVector, MarkupNode};
use crate::ParseOptions;
use bytes::Bytes;
use std::path::Path;
use tokio::fs;
use tokio::io::{AsyncRead, AsyncReadExt};

fn join_error(e: tokio::task::JoinError) -> Error {
    Error::Io(std::io::Error::other(e.to_string()))
}

/// Asynchronously parses an HTML file into a tree.
///
/// # Example
///
/// ```no_run
/// # async fn example() -> aifixer::Result<()> {
/// let tree = aifixer::async_api::parse_file("pasted.html").await?;
/// println!("{}", aifixer::plain_text(&tree));
/// # Ok(())
/// # }
/// ```
pub async fn parse_file(path: impl AsRef<Path>) -> Result<MarkupNode> {
    let html = fs::read_to_string(path).await?;
    parse_string(html, ParseOptions::default()).await
}

/// Asynchronously parses markup with custom options.
pub async fn parse_string(html: String, options: ParseOptions) -> Result<MarkupNode> {
    // Parsing is CPU-bound, so it runs on the blocking pool
    tokio::task::spawn_blocking(move || crate::parse_html(&html, &options))
        .await
        .map_err(join_error)?
}

/// Asynchronously parses markup from an async reader.
pub async fn parse_reader<R: AsyncRead + Unpin>(mut reader: R) -> Result<MarkupNode> {
    let mut html = String::new();
    reader.read_to_string(&mut html).await?;
    parse_string(html, ParseOptions::default()).await
}

/// Asynchronously classifies an HTML file.
pub async fn detect_features(path: impl AsRef<Path>) -> Result<FeatureVector> {
    let tree = parse_file(path).await?;
    tokio::task::spawn_blocking(move || crate::classify(&tree))
        .await
        .map_err(join_error)
}

/// Runs an exporter on the blocking pool against a snapshot of `tree`.
///
/// # Example
///
/// ```no_run
/// # async fn example(tree: aifixer::MarkupNode) -> aifixer::Result<()> {
/// use aifixer::HtmlDocumentExporter;
///
/// let bytes = aifixer::async_api::export(&tree, HtmlDocumentExporter::new()).await?;
/// tokio::fs::write("cleaned.html", &bytes).await?;
/// # Ok(())
/// # }
/// ```
pub async fn export<E>(tree: &MarkupNode, mut exporter: E) -> Result<Bytes>
where
    E: Exporter + Send + 'static,
{
    let snapshot = tree.clone();
    tokio::task::spawn_blocking(move || exporter.export(&snapshot))
        .await
        .map_err(join_error)?
}

/// Exports `tree` and writes the result to `path`.
pub async fn export_to_file<E>(tree: &MarkupNode, exporter: E, path: impl AsRef<Path>) -> Result<()>
where
    E: Exporter + Send + 'static,
{
    let bytes = export(tree, exporter).await?;
    fs::write(path, &bytes).await?;
    Ok(())
}
