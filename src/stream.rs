//! Streaming merge API: emit each merged handout as soon as it is ready.
//!
//! [`crate::convert::merge_batch`] returns only after every deck is merged
//! and zipped. [`merge_stream`] instead yields one
//! `Result<MergedDocument, _>` per input, in input order, so callers can
//! write handouts to disk incrementally or report per-file errors without
//! aborting the rest. Each deck is still processed on its own, one at a
//! time, on tokio's blocking pool.

use crate::config::MergeConfig;
use crate::convert::merge_document;
use crate::error::Slides2A4Error;
use crate::output::MergedDocument;
use crate::pipeline::archive;
use crate::pipeline::input::{self, NamedInput};
use futures::stream::{self, StreamExt};
use std::collections::HashSet;
use std::pin::Pin;
use tokio_stream::Stream;
use tracing::info;

/// A boxed stream of per-file merge results.
pub type DocumentStream = Pin<Box<dyn Stream<Item = Result<MergedDocument, Slides2A4Error>> + Send>>;

/// Merge paths or URLs, yielding one result per input in input order.
///
/// Errors are wrapped in [`Slides2A4Error::FileFailed`] with the input name.
/// Output names are made unique across the stream the same way
/// [`crate::convert::merge_batch`] does (`_2`, `_3`, …).
///
/// # Example
/// ```rust,no_run
/// use edgequake_slides2a4::{merge_stream, MergeConfig};
/// use futures::StreamExt;
///
/// # #[tokio::main]
/// # async fn main() {
/// let inputs = vec!["week1.pdf".to_string(), "week2.pdf".to_string()];
/// let mut docs = merge_stream(inputs, &MergeConfig::default());
/// while let Some(doc) = docs.next().await {
///     match doc {
///         Ok(d) => println!("{}: {} pages", d.name, d.page_count),
///         Err(e) => eprintln!("{e}"),
///     }
/// }
/// # }
/// ```
pub fn merge_stream(inputs: Vec<String>, config: &MergeConfig) -> DocumentStream {
    info!("Starting streaming merge of {} input(s)", inputs.len());
    let config = config.clone();

    let s = stream::iter(inputs).then(move |raw| {
        let cfg = config.clone();
        async move {
            let named = input::resolve_input(&raw, cfg.download_timeout_secs)
                .await
                .map_err(|e| Slides2A4Error::for_file(raw.as_str(), e))?;
            merge_named(named, cfg).await
        }
    });

    Box::pin(unique_names(s))
}

/// Merge in-memory inputs, yielding one result per input in input order.
pub fn merge_stream_from_bytes(inputs: Vec<NamedInput>, config: &MergeConfig) -> DocumentStream {
    let config = config.clone();
    let s = stream::iter(inputs).then(move |named| merge_named(named, config.clone()));
    Box::pin(unique_names(s))
}

fn unique_names<S>(s: S) -> impl Stream<Item = Result<MergedDocument, Slides2A4Error>> + Send
where
    S: Stream<Item = Result<MergedDocument, Slides2A4Error>> + Send,
{
    let mut taken = HashSet::new();
    s.map(move |result| {
        result.map(|mut doc| {
            doc.name = archive::disambiguate(doc.name, &mut taken);
            doc
        })
    })
}

async fn merge_named(
    named: NamedInput,
    config: MergeConfig,
) -> Result<MergedDocument, Slides2A4Error> {
    let name = named.name.clone();
    tokio::task::spawn_blocking(move || merge_document(&named, &config))
        .await
        .map_err(|e| Slides2A4Error::Internal(format!("Merge task panicked: {}", e)))?
        .map_err(|e| Slides2A4Error::for_file(name, e))
}
