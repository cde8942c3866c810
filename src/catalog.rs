use futures::FutureExt;
use futures::future::BoxFuture;
use reqwest::Client;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::Arc;

use crate::constants::constants;
use crate::error::FetchError;

// --- Entry ids ---

/// Catalog entry identifier.
///
/// The service hands out numeric primary keys, but stored favorites may carry either numbers or
/// strings, so the id is kept as text. Ids that look like plain integers serialize back as JSON
/// numbers.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntryId(String);

impl EntryId {
  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl From<&str> for EntryId {
  fn from(s: &str) -> Self {
    Self(s.to_string())
  }
}

impl From<String> for EntryId {
  fn from(s: String) -> Self {
    Self(s)
  }
}

impl fmt::Display for EntryId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

impl Serialize for EntryId {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    if let Ok(n) = self.0.parse::<u64>()
      && n.to_string() == self.0
    {
      return serializer.serialize_u64(n);
    }
    if let Ok(n) = self.0.parse::<i64>()
      && n.to_string() == self.0
    {
      return serializer.serialize_i64(n);
    }
    serializer.serialize_str(&self.0)
  }
}

impl<'de> Deserialize<'de> for EntryId {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
      Number(serde_json::Number),
      Text(String),
    }

    Ok(match RawId::deserialize(deserializer)? {
      RawId::Number(n) => Self(number_text(&n)),
      RawId::Text(s) => Self(s),
    })
  }
}

/// Integral numbers in canonical integer form, so `1.0` and `1` name the same entry.
fn number_text(n: &serde_json::Number) -> String {
  if n.is_u64() || n.is_i64() {
    return n.to_string();
  }
  match n.as_f64() {
    Some(f) if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 => (f as i64).to_string(),
    _ => n.to_string(),
  }
}

// --- Entries ---

/// One playable item of the remote catalog.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CatalogEntry {
  pub id: EntryId,
  #[serde(default, deserialize_with = "nullable_string")]
  pub title: String,
  /// Opaque identifier handed to the player (a YouTube video id upstream).
  #[serde(rename = "videoId", default, deserialize_with = "nullable_string")]
  pub media_ref: String,
  #[serde(rename = "imageUrl", default, deserialize_with = "nullable_string")]
  pub thumbnail_url: String,
}

/// The service stores unset columns as `null`.
fn nullable_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
  Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Parse a `/music` response body.
pub fn parse_catalog(body: &[u8]) -> Result<Vec<CatalogEntry>, FetchError> {
  Ok(serde_json::from_slice(body)?)
}

// --- Load state ---

/// Where the catalog load stands. A `Ready` snapshot is shared and never mutated; a refresh
/// replaces it as a whole.
#[derive(Debug, Clone, Default)]
pub enum CatalogState {
  #[default]
  Loading,
  Ready(Arc<[CatalogEntry]>),
  Failed(String),
}

impl CatalogState {
  /// Entries of a ready catalog; empty while loading or after a failure.
  pub fn entries(&self) -> &[CatalogEntry] {
    match self {
      CatalogState::Ready(entries) => entries,
      _ => &[],
    }
  }

  pub fn is_loading(&self) -> bool {
    matches!(self, CatalogState::Loading)
  }

  pub fn error(&self) -> Option<&str> {
    match self {
      CatalogState::Failed(reason) => Some(reason.as_str()),
      _ => None,
    }
  }

  pub fn find(&self, id: &EntryId) -> Option<&CatalogEntry> {
    self.entries().iter().find(|e| &e.id == id)
  }
}

// --- Sources ---

/// Something that can produce the full catalog. The returned future owns everything it needs so
/// it can run on a spawned task.
pub trait CatalogSource: Send + Sync {
  fn fetch(&self) -> BoxFuture<'static, Result<Vec<CatalogEntry>, FetchError>>;
}

/// The catalog service over HTTP: `GET {base_url}/music`.
#[derive(Debug, Clone)]
pub struct HttpCatalog {
  client: Client,
  url: String,
}

impl HttpCatalog {
  pub fn new(base_url: &str) -> Self {
    let url = format!("{}{}", base_url.trim_end_matches('/'), constants().catalog_path);
    Self { client: Client::new(), url }
  }

  pub fn url(&self) -> &str {
    &self.url
  }
}

impl CatalogSource for HttpCatalog {
  fn fetch(&self) -> BoxFuture<'static, Result<Vec<CatalogEntry>, FetchError>> {
    fetch_catalog(self.client.clone(), self.url.clone()).boxed()
  }
}

async fn fetch_catalog(client: Client, url: String) -> Result<Vec<CatalogEntry>, FetchError> {
  let response = client.get(&url).send().await?;
  let status = response.status();
  if !status.is_success() {
    return Err(FetchError::Status(status));
  }
  let body = response.bytes().await?;
  parse_catalog(&body)
}

#[cfg(test)]
mod tests {
  use super::*;

  // --- parse_catalog ---

  #[test]
  fn parses_service_payload() {
    let body = br#"[
      {"id": 1, "title": "Alpha", "url": "https://youtu.be/a1", "imageUrl": "https://img/a1.jpg", "videoId": "a1"},
      {"id": 2, "title": "Beta", "url": null, "imageUrl": null, "videoId": "b2"}
    ]"#;
    let entries = parse_catalog(body).unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].id, EntryId::from("1"));
    assert_eq!(entries[0].media_ref, "a1");
    assert_eq!(entries[0].thumbnail_url, "https://img/a1.jpg");
    assert_eq!(entries[1].title, "Beta");
    assert_eq!(entries[1].thumbnail_url, "");
  }

  #[test]
  fn parses_string_ids() {
    let entries = parse_catalog(br#"[{"id": "x-1", "title": "T", "videoId": "v"}]"#).unwrap();
    assert_eq!(entries[0].id.as_str(), "x-1");
  }

  #[test]
  fn rejects_non_array_body() {
    assert!(matches!(parse_catalog(br#"{"error": "nope"}"#), Err(FetchError::Decode(_))));
    assert!(matches!(parse_catalog(b"<html>"), Err(FetchError::Decode(_))));
  }

  #[test]
  fn entry_id_serializes_integers_as_numbers() {
    let ids = vec![EntryId::from("12"), EntryId::from("007"), EntryId::from("abc")];
    assert_eq!(serde_json::to_string(&ids).unwrap(), r#"[12,"007","abc"]"#);
  }

  #[test]
  fn entry_id_keeps_negative_numbers_numeric() {
    let ids: Vec<EntryId> = serde_json::from_str("[-3, 4]").unwrap();
    assert_eq!(ids, vec![EntryId::from("-3"), EntryId::from("4")]);
    assert_eq!(serde_json::to_string(&ids).unwrap(), "[-3,4]");
    assert_eq!(serde_json::to_string(&EntryId::from("-03")).unwrap(), r#""-03""#);
  }

  #[test]
  fn entry_id_normalizes_integral_floats() {
    let ids: Vec<EntryId> = serde_json::from_str("[1.0, -2.0, 1.5]").unwrap();
    assert_eq!(ids, vec![EntryId::from("1"), EntryId::from("-2"), EntryId::from("1.5")]);

    let catalog = CatalogState::Ready(Arc::from(parse_catalog(br#"[{"id":1,"title":"A","videoId":"a"}]"#).unwrap()));
    assert!(catalog.find(&ids[0]).is_some());
  }

  // --- CatalogState ---

  #[test]
  fn entries_empty_unless_ready() {
    assert!(CatalogState::Loading.entries().is_empty());
    assert!(CatalogState::Failed("boom".into()).entries().is_empty());
    assert_eq!(CatalogState::Failed("boom".into()).error(), Some("boom"));

    let ready = CatalogState::Ready(Arc::from(parse_catalog(br#"[{"id":1,"title":"A","videoId":"a"}]"#).unwrap()));
    assert_eq!(ready.entries().len(), 1);
    assert!(ready.find(&EntryId::from("1")).is_some());
    assert!(ready.find(&EntryId::from("99")).is_none());
  }

  // --- HttpCatalog ---

  /// Serve a single request on a random local port and report the requested path.
  fn serve_once(status: u16, body: &'static str) -> (String, std::thread::JoinHandle<String>) {
    let server = tiny_http::Server::http("127.0.0.1:0").unwrap();
    let addr = server.server_addr().to_ip().unwrap();
    let handle = std::thread::spawn(move || {
      let request = server.recv().unwrap();
      let path = request.url().to_string();
      request.respond(tiny_http::Response::from_string(body).with_status_code(status)).unwrap();
      path
    });
    (format!("http://{}/", addr), handle)
  }

  #[test]
  fn url_joins_base_and_path() {
    assert_eq!(HttpCatalog::new("http://localhost:8080").url(), "http://localhost:8080/music");
    assert_eq!(HttpCatalog::new("http://localhost:8080/").url(), "http://localhost:8080/music");
  }

  #[tokio::test]
  async fn fetches_over_http() {
    let (base, server) = serve_once(200, r#"[{"id":1,"title":"Alpha","videoId":"a1","imageUrl":"i"}]"#);
    let entries = HttpCatalog::new(&base).fetch().await.unwrap();
    assert_eq!(server.join().unwrap(), "/music");
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].title, "Alpha");
  }

  #[tokio::test]
  async fn non_success_status_is_an_error() {
    let (base, server) = serve_once(500, "internal error");
    let err = HttpCatalog::new(&base).fetch().await.unwrap_err();
    server.join().unwrap();
    assert!(matches!(err, FetchError::Status(s) if s.as_u16() == 500));
  }

  #[tokio::test]
  async fn malformed_json_is_an_error() {
    let (base, server) = serve_once(200, "[{\"id\": 1,");
    let err = HttpCatalog::new(&base).fetch().await.unwrap_err();
    server.join().unwrap();
    assert!(matches!(err, FetchError::Decode(_)));
  }

  #[tokio::test]
  async fn unreachable_service_is_an_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let err = HttpCatalog::new(&format!("http://{}", addr)).fetch().await.unwrap_err();
    assert!(matches!(err, FetchError::Http(_)));
  }
}
