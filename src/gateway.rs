//! Cache-first request gateway behind the offline service worker.
//!
//! The gateway owns one cache *generation* (a versioned cache name). Its
//! lifecycle mirrors the worker's:
//!
//! - **install**: fetch every manifest entry and store them all, or none
//! - **activate**: delete every generation other than the current one
//! - **fetch**: cache hit, else network, else (images only) a placeholder
//!
//! Browser specifics live behind [`CacheStore`] and [`Network`] so the
//! state machine can be driven by plain futures in tests.

use async_trait::async_trait;
use futures::future::try_join_all;
use log::{debug, info, warn};
use thiserror::Error;
use url::Url;

use crate::config::{
    PLACEHOLDER_FILL, PLACEHOLDER_HEIGHT, PLACEHOLDER_TEXT, PLACEHOLDER_WIDTH,
};

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("invalid request url '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("network request for {url} failed: {message}")]
    Network { url: String, message: String },

    #[error("{url} answered with status {status}")]
    BadStatus { url: String, status: u16 },

    #[error("cache operation failed: {0}")]
    Cache(String),
}

/// What kind of resource a request is for. Only `Image` changes behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    Document,
    Script,
    Style,
    Image,
    Font,
    Other,
}

/// Normalized request identity: absolute URL without fragment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestKey(String);

impl RequestKey {
    /// Resolve `raw` (absolute or scope-relative) against `base`.
    pub fn resolve(base: &Url, raw: &str) -> Result<Self, GatewayError> {
        let mut url = base.join(raw).map_err(|source| GatewayError::InvalidUrl {
            url: raw.to_string(),
            source,
        })?;
        url.set_fragment(None);
        Ok(Self(url.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RequestKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// An intercepted request. `original` is the host's own request object,
/// handed back to the cache and network untouched so mode, credentials
/// and redirect handling survive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayRequest<O = ()> {
    pub key: RequestKey,
    pub destination: Destination,
    pub original: O,
}

impl GatewayRequest {
    pub fn new(key: RequestKey, destination: Destination) -> Self {
        Self::with_original(key, destination, ())
    }
}

impl<O> GatewayRequest<O> {
    pub fn with_original(key: RequestKey, destination: Destination, original: O) -> Self {
        Self {
            key,
            destination,
            original,
        }
    }
}

/// A response as far as the gateway cares about it.
pub trait Resource {
    fn status(&self) -> u16;

    fn is_ok(&self) -> bool {
        (200..300).contains(&self.status())
    }
}

/// Named cache generations holding request → response entries.
#[async_trait(?Send)]
pub trait CacheStore {
    type Response: Resource;
    type Request;

    /// Open the generation, creating it empty if it does not exist.
    async fn open(&self, generation: &str) -> Result<(), GatewayError>;

    /// Names of every existing generation.
    async fn keys(&self) -> Result<Vec<String>, GatewayError>;

    /// Drop a whole generation. Returns whether it existed.
    async fn delete(&self, generation: &str) -> Result<bool, GatewayError>;

    async fn put_all(
        &self,
        generation: &str,
        entries: Vec<(RequestKey, Self::Response)>,
    ) -> Result<(), GatewayError>;

    /// Exact match across all generations.
    async fn lookup(
        &self,
        request: &GatewayRequest<Self::Request>,
    ) -> Result<Option<Self::Response>, GatewayError>;
}

/// Both methods reject only when no response could be obtained at all;
/// HTTP error statuses still resolve.
#[async_trait(?Send)]
pub trait Network {
    type Response: Resource;
    type Request;

    /// Plain GET of a manifest entry.
    async fn fetch(&self, key: &RequestKey) -> Result<Self::Response, GatewayError>;

    /// Send an intercepted request on exactly as the page issued it.
    async fn forward(
        &self,
        request: &GatewayRequest<Self::Request>,
    ) -> Result<Self::Response, GatewayError>;
}

/// Where an intercepted request was answered from.
#[derive(Debug)]
pub enum FetchOutcome<R> {
    Cached(R),
    Network(R),
    /// Image request that missed the cache and failed on the network.
    Placeholder,
    /// Non-image request that missed the cache and failed on the network.
    Failed(GatewayError),
}

/// Inline SVG served in place of unreachable images.
pub fn placeholder_svg() -> String {
    format!(
        concat!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}">"#,
            r#"<rect width="100%" height="100%" fill="{fill}"/>"#,
            r##"<text x="50%" y="50%" font-size="20" text-anchor="middle" fill="#333" dy=".3em">"##,
            "{text}</text>",
            "</svg>"
        ),
        w = PLACEHOLDER_WIDTH,
        h = PLACEHOLDER_HEIGHT,
        fill = PLACEHOLDER_FILL,
        text = PLACEHOLDER_TEXT,
    )
}

pub struct CacheGateway<C, N> {
    generation: String,
    manifest: Vec<RequestKey>,
    caches: C,
    network: N,
}

impl<C, N> CacheGateway<C, N>
where
    C: CacheStore,
    N: Network<Response = C::Response, Request = C::Request>,
{
    /// Build a gateway for `generation`, resolving manifest paths against `base`.
    pub fn new(
        generation: &str,
        base: &Url,
        manifest: &[&str],
        caches: C,
        network: N,
    ) -> Result<Self, GatewayError> {
        let manifest = manifest
            .iter()
            .map(|path| RequestKey::resolve(base, path))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            generation: generation.to_string(),
            manifest,
            caches,
            network,
        })
    }

    pub fn generation(&self) -> &str {
        &self.generation
    }

    pub fn manifest(&self) -> &[RequestKey] {
        &self.manifest
    }

    async fn fetch_manifest_entry(
        &self,
        key: &RequestKey,
    ) -> Result<(RequestKey, C::Response), GatewayError> {
        let response = self.network.fetch(key).await?;
        if !response.is_ok() {
            return Err(GatewayError::BadStatus {
                url: key.to_string(),
                status: response.status(),
            });
        }
        Ok((key.clone(), response))
    }

    /// Pre-cache the manifest. Any failed entry fails the whole step and
    /// nothing is stored; the (empty) generation still exists afterwards.
    /// A store that fails part-way is emptied again.
    pub async fn install(&self) -> Result<usize, GatewayError> {
        self.caches.open(&self.generation).await?;

        let entries = match try_join_all(
            self.manifest.iter().map(|key| self.fetch_manifest_entry(key)),
        )
        .await
        {
            Ok(entries) => entries,
            Err(err) => {
                warn!("Install of cache {} aborted: {}", self.generation, err);
                return Err(err);
            }
        };

        let count = entries.len();
        if let Err(err) = self.caches.put_all(&self.generation, entries).await {
            warn!("Storing cache {} failed: {}", self.generation, err);
            self.reset_generation().await;
            return Err(err);
        }
        info!("Cache {} installed with {} entries", self.generation, count);
        Ok(count)
    }

    /// Drop whatever a failed store left behind and recreate the
    /// generation empty.
    async fn reset_generation(&self) {
        if let Err(e) = self.caches.delete(&self.generation).await {
            warn!("Failed to discard partial cache {}: {}", self.generation, e);
        }
        if let Err(e) = self.caches.open(&self.generation).await {
            warn!("Failed to reopen cache {}: {}", self.generation, e);
        }
    }

    /// Remove every generation except the current one. Returns the names deleted.
    pub async fn activate(&self) -> Result<Vec<String>, GatewayError> {
        let stale: Vec<String> = self
            .caches
            .keys()
            .await?
            .into_iter()
            .filter(|name| *name != self.generation)
            .collect();

        try_join_all(stale.iter().map(|name| self.caches.delete(name))).await?;

        if !stale.is_empty() {
            info!("Deleted stale caches: {}", stale.join(", "));
        }
        Ok(stale)
    }

    /// Answer one intercepted request. Never writes to the cache.
    pub async fn handle_fetch(
        &self,
        request: &GatewayRequest<C::Request>,
    ) -> FetchOutcome<C::Response> {
        match self.caches.lookup(request).await {
            Ok(Some(hit)) => {
                debug!("cache hit: {}", request.key);
                return FetchOutcome::Cached(hit);
            }
            Ok(None) => {}
            Err(err) => warn!(
                "Cache lookup for {} failed, trying network: {}",
                request.key, err
            ),
        }

        match self.network.forward(request).await {
            Ok(response) => FetchOutcome::Network(response),
            Err(err) if request.destination == Destination::Image => {
                debug!("serving placeholder for {}: {}", request.key, err);
                FetchOutcome::Placeholder
            }
            Err(err) => {
                debug!("fetch failed for {}: {}", request.key, err);
                FetchOutcome::Failed(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use std::cell::{Cell, RefCell};
    use std::collections::{BTreeMap, HashMap};

    const BASE: &str = "https://portfolio.test/";

    /// Stands in for the browser request; carries its fetch mode.
    type Mode = &'static str;

    #[derive(Debug, Clone, PartialEq)]
    struct StubResponse {
        status: u16,
        body: String,
    }

    impl StubResponse {
        fn ok(body: &str) -> Self {
            Self {
                status: 200,
                body: body.to_string(),
            }
        }
    }

    impl Resource for StubResponse {
        fn status(&self) -> u16 {
            self.status
        }
    }

    #[derive(Default)]
    struct MemoryCaches {
        generations: RefCell<BTreeMap<String, HashMap<RequestKey, StubResponse>>>,
        /// Entries stored before `put_all` starts failing.
        put_budget: Cell<Option<usize>>,
    }

    impl MemoryCaches {
        fn with_generations(names: &[&str]) -> Self {
            let caches = Self::default();
            for name in names {
                caches
                    .generations
                    .borrow_mut()
                    .insert(name.to_string(), HashMap::new());
            }
            caches
        }

        fn failing_after(stored: usize) -> Self {
            let caches = Self::default();
            caches.put_budget.set(Some(stored));
            caches
        }

        fn entry_count(&self, generation: &str) -> Option<usize> {
            self.generations.borrow().get(generation).map(|g| g.len())
        }
    }

    #[async_trait(?Send)]
    impl CacheStore for MemoryCaches {
        type Response = StubResponse;
        type Request = Mode;

        async fn open(&self, generation: &str) -> Result<(), GatewayError> {
            self.generations
                .borrow_mut()
                .entry(generation.to_string())
                .or_default();
            Ok(())
        }

        async fn keys(&self) -> Result<Vec<String>, GatewayError> {
            Ok(self.generations.borrow().keys().cloned().collect())
        }

        async fn delete(&self, generation: &str) -> Result<bool, GatewayError> {
            Ok(self.generations.borrow_mut().remove(generation).is_some())
        }

        async fn put_all(
            &self,
            generation: &str,
            entries: Vec<(RequestKey, StubResponse)>,
        ) -> Result<(), GatewayError> {
            let mut generations = self.generations.borrow_mut();
            let cache = generations
                .get_mut(generation)
                .ok_or_else(|| GatewayError::Cache(format!("{} not open", generation)))?;
            // One put at a time, like the browser store.
            for (stored, (key, response)) in entries.into_iter().enumerate() {
                if self.put_budget.get() == Some(stored) {
                    return Err(GatewayError::Cache("quota exceeded".into()));
                }
                cache.insert(key, response);
            }
            Ok(())
        }

        async fn lookup(
            &self,
            request: &GatewayRequest<Mode>,
        ) -> Result<Option<StubResponse>, GatewayError> {
            Ok(self
                .generations
                .borrow()
                .values()
                .find_map(|cache| cache.get(&request.key).cloned()))
        }
    }

    /// Network answering from a fixed table; unknown URLs reject.
    #[derive(Default)]
    struct StubNetwork {
        routes: HashMap<String, StubResponse>,
        calls: RefCell<Vec<String>>,
        forwarded_modes: RefCell<Vec<Mode>>,
    }

    impl StubNetwork {
        fn route(mut self, path: &str, response: StubResponse) -> Self {
            self.routes
                .insert(format!("{}{}", BASE, path.trim_start_matches('/')), response);
            self
        }

        fn calls(&self) -> Vec<String> {
            self.calls.borrow().clone()
        }

        fn answer(&self, key: &RequestKey) -> Result<StubResponse, GatewayError> {
            self.calls.borrow_mut().push(key.to_string());
            self.routes
                .get(key.as_str())
                .cloned()
                .ok_or_else(|| GatewayError::Network {
                    url: key.to_string(),
                    message: "offline".into(),
                })
        }
    }

    #[async_trait(?Send)]
    impl Network for StubNetwork {
        type Response = StubResponse;
        type Request = Mode;

        async fn fetch(&self, key: &RequestKey) -> Result<StubResponse, GatewayError> {
            self.answer(key)
        }

        async fn forward(
            &self,
            request: &GatewayRequest<Mode>,
        ) -> Result<StubResponse, GatewayError> {
            self.forwarded_modes.borrow_mut().push(request.original);
            self.answer(&request.key)
        }
    }

    fn base() -> Url {
        Url::parse(BASE).unwrap()
    }

    fn gateway(
        generation: &str,
        manifest: &[&str],
        caches: MemoryCaches,
        network: StubNetwork,
    ) -> CacheGateway<MemoryCaches, StubNetwork> {
        CacheGateway::new(generation, &base(), manifest, caches, network).unwrap()
    }

    fn request(path: &str, destination: Destination) -> GatewayRequest<Mode> {
        let key = RequestKey::resolve(&base(), path).unwrap();
        GatewayRequest::with_original(key, destination, "same-origin")
    }

    #[test]
    fn request_keys_are_normalized() {
        let a = RequestKey::resolve(&base(), "/a.js").unwrap();
        let b = RequestKey::resolve(&base(), "https://portfolio.test/a.js#top").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "https://portfolio.test/a.js");
    }

    #[test]
    fn scope_relative_manifest_entries_resolve() {
        let scoped = Url::parse("https://portfolio.test/site/").unwrap();
        let key = RequestKey::resolve(&scoped, "./portfolio.js").unwrap();
        assert_eq!(key.as_str(), "https://portfolio.test/site/portfolio.js");
    }

    #[test]
    fn installed_entry_is_served_without_network() {
        let network = StubNetwork::default().route("/a.js", StubResponse::ok("console.log(1)"));
        let gw = gateway("v1", &["/a.js"], MemoryCaches::default(), network);

        assert_eq!(block_on(gw.install()).unwrap(), 1);
        let calls_after_install = gw.network.calls().len();

        let outcome = block_on(gw.handle_fetch(&request("/a.js", Destination::Script)));
        match outcome {
            FetchOutcome::Cached(r) => assert_eq!(r.body, "console.log(1)"),
            other => panic!("expected cache hit, got {:?}", other),
        }
        assert_eq!(gw.network.calls().len(), calls_after_install);
    }

    #[test]
    fn install_is_all_or_nothing() {
        let network = StubNetwork::default()
            .route("/", StubResponse::ok("<html>"))
            .route("/style.css", StubResponse::ok("body{}"));
        let gw = gateway(
            "v1",
            &["/", "/style.css", "/missing.js"],
            MemoryCaches::default(),
            network,
        );

        let err = block_on(gw.install()).unwrap_err();
        assert!(matches!(err, GatewayError::Network { .. }));
        // Generation exists but holds nothing.
        assert_eq!(gw.caches.entry_count("v1"), Some(0));
    }

    #[test]
    fn install_rejects_error_status() {
        let network = StubNetwork::default()
            .route("/", StubResponse::ok("<html>"))
            .route(
                "/app.js",
                StubResponse {
                    status: 404,
                    body: String::new(),
                },
            );
        let gw = gateway("v1", &["/", "/app.js"], MemoryCaches::default(), network);

        match block_on(gw.install()) {
            Err(GatewayError::BadStatus { status, url }) => {
                assert_eq!(status, 404);
                assert_eq!(url, "https://portfolio.test/app.js");
            }
            other => panic!("expected bad status, got {:?}", other),
        }
        assert_eq!(gw.caches.entry_count("v1"), Some(0));
    }

    #[test]
    fn failed_store_discards_partial_entries() {
        let network = StubNetwork::default()
            .route("/", StubResponse::ok("<html>"))
            .route("/index.html", StubResponse::ok("<html>"))
            .route("/style.css", StubResponse::ok("body{}"));
        let gw = gateway(
            "v1",
            &["/", "/index.html", "/style.css"],
            MemoryCaches::failing_after(2),
            network,
        );

        let err = block_on(gw.install()).unwrap_err();
        assert!(matches!(err, GatewayError::Cache(_)));
        assert_eq!(gw.caches.entry_count("v1"), Some(0));
    }

    #[test]
    fn activate_keeps_only_current_generation() {
        let caches = MemoryCaches::with_generations(&["v0", "v1"]);
        let gw = gateway("v1", &[], caches, StubNetwork::default());

        let deleted = block_on(gw.activate()).unwrap();
        assert_eq!(deleted, vec!["v0".to_string()]);
        assert_eq!(block_on(gw.caches.keys()).unwrap(), vec!["v1".to_string()]);
    }

    #[test]
    fn activate_without_stale_generations_is_noop() {
        let caches = MemoryCaches::with_generations(&["v1"]);
        let gw = gateway("v1", &[], caches, StubNetwork::default());
        assert!(block_on(gw.activate()).unwrap().is_empty());
        assert_eq!(block_on(gw.caches.keys()).unwrap(), vec!["v1".to_string()]);
    }

    #[test]
    fn miss_goes_to_network_without_caching() {
        let network = StubNetwork::default().route("/data.json", StubResponse::ok("{}"));
        let gw = gateway("v1", &[], MemoryCaches::default(), network);
        block_on(gw.install()).unwrap();

        let req = request("/data.json", Destination::Other);
        assert!(matches!(block_on(gw.handle_fetch(&req)), FetchOutcome::Network(_)));
        assert!(matches!(block_on(gw.handle_fetch(&req)), FetchOutcome::Network(_)));
        assert_eq!(gw.network.calls().len(), 2);
        assert_eq!(gw.caches.entry_count("v1"), Some(0));
    }

    #[test]
    fn intercepted_request_is_forwarded_as_issued() {
        let network = StubNetwork::default().route("/static/logo.png", StubResponse::ok("png"));
        let gw = gateway("v1", &[], MemoryCaches::default(), network);

        let key = RequestKey::resolve(&base(), "/static/logo.png").unwrap();
        let req = GatewayRequest::with_original(key, Destination::Image, "no-cors");
        assert!(matches!(block_on(gw.handle_fetch(&req)), FetchOutcome::Network(_)));
        assert_eq!(*gw.network.forwarded_modes.borrow(), vec!["no-cors"]);
    }

    #[test]
    fn manifest_fetches_are_not_forwards() {
        let network = StubNetwork::default().route("/", StubResponse::ok("<html>"));
        let gw = gateway("v1", &["/"], MemoryCaches::default(), network);
        block_on(gw.install()).unwrap();
        assert!(gw.network.forwarded_modes.borrow().is_empty());
        assert_eq!(gw.network.calls(), vec![BASE.to_string()]);
    }

    #[test]
    fn network_error_status_passes_through() {
        let network = StubNetwork::default().route(
            "/gone.html",
            StubResponse {
                status: 404,
                body: "not found".into(),
            },
        );
        let gw = gateway("v1", &[], MemoryCaches::default(), network);
        match block_on(gw.handle_fetch(&request("/gone.html", Destination::Document))) {
            FetchOutcome::Network(r) => assert_eq!(r.status, 404),
            other => panic!("expected network response, got {:?}", other),
        }
    }

    #[test]
    fn offline_image_gets_placeholder() {
        let gw = gateway("v1", &[], MemoryCaches::default(), StubNetwork::default());
        let outcome = block_on(gw.handle_fetch(&request("/static/shot.png", Destination::Image)));
        assert!(matches!(outcome, FetchOutcome::Placeholder));

        let svg = placeholder_svg();
        assert!(svg.contains("Image unavailable"));
        assert!(svg.contains(r#"width="400""#));
        assert!(svg.contains(r#"height="300""#));
        assert!(svg.contains(r##"fill="#ddd""##));
    }

    #[test]
    fn offline_non_image_fails() {
        let gw = gateway("v1", &[], MemoryCaches::default(), StubNetwork::default());
        let outcome = block_on(gw.handle_fetch(&request("/about.html", Destination::Document)));
        assert!(matches!(outcome, FetchOutcome::Failed(GatewayError::Network { .. })));
    }

    #[test]
    fn invalid_manifest_entry_is_rejected() {
        let result = CacheGateway::new(
            "v1",
            &base(),
            &["http://[::1"],
            MemoryCaches::default(),
            StubNetwork::default(),
        );
        assert!(matches!(result, Err(GatewayError::InvalidUrl { .. })));
    }
}
