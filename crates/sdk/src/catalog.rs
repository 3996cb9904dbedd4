//! SDK catalog client.
//!
//! The remote site answers a GET with an S3-style bucket listing:
//! a `ListBucketResult` document holding repeated `Contents/Key`
//! entries, one per published archive. Fetching, parsing, and entry
//! matching are separate steps so the latter two stay testable
//! without a socket.

use crate::{Error, Result};
use quick_xml::Reader;
use quick_xml::events::Event;
use serde::Deserialize;
use tracing::{debug, error, info, warn};

/// Parsed bucket listing.
#[derive(Debug, Deserialize)]
pub struct BucketListing {
    /// Listed entries, in document order.
    #[serde(rename = "Contents", default)]
    pub contents: Vec<BucketEntry>,
}

/// One listed archive.
#[derive(Debug, Deserialize)]
pub struct BucketEntry {
    /// Object key, i.e. the archive filename.
    #[serde(rename = "Key")]
    pub key: String,
}

/// Fetch the raw catalog document from the remote site.
pub async fn fetch_catalog(client: &reqwest::Client, site_url: &str) -> Result<String> {
    warn!(%site_url, "loading list of available Go SDKs");
    let response = client
        .get(site_url)
        .header(reqwest::header::ACCEPT, "application/xml")
        .send()
        .await?;
    let status = response.status();
    if status != reqwest::StatusCode::OK {
        return Err(Error::network(site_url, status.as_u16()));
    }
    let text = response.text().await?;
    info!("SDK catalog loaded");
    debug!(content_length = text.len(), "catalog content received");
    Ok(text)
}

/// Parse a catalog document, insisting on a `ListBucketResult` root.
pub fn parse_catalog(text: &str) -> Result<BucketListing> {
    let root = root_element_name(text)?;
    if root != "ListBucketResult" {
        return Err(Error::format(format!(
            "expected ListBucketResult root element, found '{root}'"
        )));
    }
    quick_xml::de::from_str(text).map_err(|e| Error::format(e.to_string()))
}

/// Scan the listing in document order for the first entry matching
/// `<base_name>.<ext>` for any allowed extension.
///
/// On a miss, every scanned key is logged so naming mismatches can be
/// diagnosed from the build output.
pub fn find_matching_entry(
    listing: &BucketListing,
    base_name: &str,
    allowed_extensions: &[&str],
) -> Result<String> {
    debug!(%base_name, "looking for an SDK with the synthesized base name");
    let candidates: Vec<String> = allowed_extensions
        .iter()
        .map(|ext| format!("{base_name}.{ext}"))
        .collect();

    let mut scanned = Vec::new();
    for entry in &listing.contents {
        if candidates.iter().any(|c| c == &entry.key) {
            debug!(key = %entry.key, "found compatible SDK in the catalog");
            return Ok(entry.key.clone());
        }
        scanned.push(entry.key.as_str());
    }

    error!(%base_name, "no catalog entry matches; the catalog listed:");
    for key in &scanned {
        error!("  {key}");
    }
    Err(Error::not_found(base_name))
}

fn root_element_name(text: &str) -> Result<String> {
    let mut reader = Reader::from_str(text);
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                return Ok(String::from_utf8_lossy(e.name().as_ref()).into_owned());
            }
            Ok(Event::Empty(e)) => {
                return Ok(String::from_utf8_lossy(e.name().as_ref()).into_owned());
            }
            Ok(Event::Eof) => return Err(Error::format("document has no root element")),
            Err(e) => return Err(Error::format(e.to_string())),
            Ok(_) => {}
        }
    }
}
