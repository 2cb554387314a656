//! Remote index access: the simple-listing scrape and the JSON metadata API.

use std::sync::LazyLock;
use std::time::Duration;

use reqwest::Client;
use scraper::{Html, Selector};
use serde_json::Value;
use tracing::{info, warn};

use crate::error::{RegistryError, Result};
use crate::pip::UNKNOWN_SENTINEL;
use crate::state::RemoteDetail;

/// Default package index when neither the CLI nor settings override it.
pub const DEFAULT_INDEX_URL: &str = "https://pypi.org";

/// Shared HTTP client with connection pooling for all index requests.
static HTTP_CLIENT: LazyLock<Client> = LazyLock::new(|| {
    Client::builder()
        .connect_timeout(Duration::from_secs(15))
        .timeout(Duration::from_secs(120))
        .user_agent(format!("piptui/{}", env!("CARGO_PKG_VERSION")))
        .build()
        .expect("failed to build HTTP client")
});

/// Process-wide HTTP client handle.
#[must_use]
pub fn client() -> Client {
    HTTP_CLIENT.clone()
}

/// Fetch the index's simple listing page once and return every package name
/// in document order.
///
/// The listing is one HTML document whose anchors carry package names as
/// their text content. A fetch failure is `Network`; a document without any
/// anchors is `Parse`.
pub async fn fetch_index_names(client: &Client, index_url: &str) -> Result<Vec<String>> {
    let url = format!("{}/simple/", index_url.trim_end_matches('/'));
    let resp = client
        .get(&url)
        .send()
        .await
        .map_err(|e| RegistryError::Network(format!("{url}: {e}")))?;
    let status = resp.status();
    if !status.is_success() {
        return Err(RegistryError::Network(format!("{url}: status {status}")));
    }
    let body = resp
        .text()
        .await
        .map_err(|e| RegistryError::Network(format!("{url}: {e}")))?;
    let names = parse_index_names(&body)?;
    info!(count = names.len(), url, "fetched index listing");
    Ok(names)
}

/// Extract package names from the listing page's anchor elements.
pub fn parse_index_names(body: &str) -> Result<Vec<String>> {
    let document = Html::parse_document(body);
    let anchors =
        Selector::parse("a").map_err(|e| RegistryError::Parse(format!("anchor selector: {e}")))?;
    let names: Vec<String> = document
        .select(&anchors)
        .map(|a| a.text().collect::<String>().trim().to_string())
        .filter(|name| !name.is_empty())
        .collect();
    if names.is_empty() {
        return Err(RegistryError::Parse(
            "no package anchors in index listing".into(),
        ));
    }
    Ok(names)
}

/// Fetch metadata for one package from `<index>/pypi/<name>/json`.
///
/// A non-2xx response or a body without an `info` object is `NotFound`; a
/// body that is not JSON at all is `Parse`.
pub async fn fetch_remote_detail(
    client: &Client,
    index_url: &str,
    name: &str,
) -> Result<RemoteDetail> {
    let url = format!("{}/pypi/{}/json", index_url.trim_end_matches('/'), name);
    let resp = client
        .get(&url)
        .send()
        .await
        .map_err(|e| RegistryError::Network(format!("{url}: {e}")))?;
    let status = resp.status();
    if !status.is_success() {
        warn!(status = status.as_u16(), name, "index lookup miss");
        return Err(RegistryError::NotFound(name.to_string()));
    }
    let body: Value = resp
        .json()
        .await
        .map_err(|e| RegistryError::Parse(format!("{url}: {e}")))?;
    detail_from_json(name, &body)
}

/// Extract the fixed field set from the API response's `info` object.
pub fn detail_from_json(name: &str, body: &Value) -> Result<RemoteDetail> {
    let Some(info) = body.get("info").filter(|v| v.is_object()) else {
        return Err(RegistryError::NotFound(name.to_string()));
    };
    Ok(RemoteDetail {
        name: info
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or(name)
            .to_string(),
        version: info
            .get("version")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        author: field(info, "author"),
        author_email: field(info, "author_email"),
        home_page: field(info, "home_page"),
        license: field(info, "license"),
        summary: field(info, "summary"),
        package_url: field(info, "package_url"),
        platform: field(info, "platform"),
        requires_python: field(info, "requires_python"),
        // requires_dist is null (not a missing key) for packages without
        // declared dependencies; both map to an empty list.
        requirements: info
            .get("requires_dist")
            .and_then(Value::as_array)
            .map(|arr| {
                arr.iter()
                    .filter_map(|v| v.as_str().map(ToString::to_string))
                    .collect()
            })
            .unwrap_or_default(),
    })
}

/// Read an optional string field, mapping the `UNKNOWN` sentinel, empty
/// strings, and JSON null to absent.
fn field(info: &Value, key: &str) -> Option<String> {
    info.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty() && *s != UNKNOWN_SENTINEL)
        .map(ToString::to_string)
}
