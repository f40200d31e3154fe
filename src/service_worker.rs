//! Browser binding of the cache gateway for the `sw_gateway` binary.
//!
//! `static/sw.js` attaches the `install`, `activate` and `fetch`
//! listeners synchronously, waits for the wasm module inside each event
//! and then calls [`install`], [`activate`] or [`respond`]. This module
//! maps the Cache Storage API and `fetch` onto [`CacheStore`] and
//! [`Network`], and turns gateway outcomes into promises.

use async_trait::async_trait;
use futures::future::try_join_all;
use js_sys::Promise;
use log::{debug, info, warn};
use once_cell::unsync::OnceCell;
use std::rc::Rc;
use url::Url;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{future_to_promise, JsFuture};
use web_sys::{
    Cache, CacheStorage, Headers, Request, RequestDestination, Response, ResponseInit,
    ServiceWorkerGlobalScope,
};

use crate::config::{CACHE_NAME, PLACEHOLDER_CONTENT_TYPE, PRECACHE_MANIFEST};
use crate::gateway::{
    placeholder_svg, CacheGateway, CacheStore, Destination, FetchOutcome, GatewayError,
    GatewayRequest, Network, RequestKey, Resource,
};

/// A `Response` object held on the Rust side.
pub struct WebResponse(Response);

impl Resource for WebResponse {
    fn status(&self) -> u16 {
        self.0.status()
    }
}

fn cache_error(context: &str, err: JsValue) -> GatewayError {
    GatewayError::Cache(format!("{}: {:?}", context, err))
}

pub struct WebCacheStore {
    storage: CacheStorage,
}

impl WebCacheStore {
    async fn cache(&self, generation: &str) -> Result<Cache, GatewayError> {
        JsFuture::from(self.storage.open(generation))
            .await
            .map_err(|e| cache_error("open", e))?
            .dyn_into::<Cache>()
            .map_err(|e| cache_error("open returned a non-cache", e))
    }
}

#[async_trait(?Send)]
impl CacheStore for WebCacheStore {
    type Response = WebResponse;
    type Request = Request;

    async fn open(&self, generation: &str) -> Result<(), GatewayError> {
        self.cache(generation).await.map(|_| ())
    }

    async fn keys(&self) -> Result<Vec<String>, GatewayError> {
        let names: js_sys::Array = JsFuture::from(self.storage.keys())
            .await
            .map_err(|e| cache_error("keys", e))?
            .into();
        Ok(names.iter().filter_map(|name| name.as_string()).collect())
    }

    async fn delete(&self, generation: &str) -> Result<bool, GatewayError> {
        let existed = JsFuture::from(self.storage.delete(generation))
            .await
            .map_err(|e| cache_error("delete", e))?;
        Ok(existed.as_bool().unwrap_or(false))
    }

    async fn put_all(
        &self,
        generation: &str,
        entries: Vec<(RequestKey, WebResponse)>,
    ) -> Result<(), GatewayError> {
        let cache = self.cache(generation).await?;
        let puts = entries
            .iter()
            .map(|(key, response)| JsFuture::from(cache.put_with_str(key.as_str(), &response.0)));
        try_join_all(puts)
            .await
            .map_err(|e| cache_error("put", e))?;
        Ok(())
    }

    async fn lookup(
        &self,
        request: &GatewayRequest<Request>,
    ) -> Result<Option<WebResponse>, GatewayError> {
        let found = JsFuture::from(self.storage.match_with_request(&request.original))
            .await
            .map_err(|e| cache_error("match", e))?;
        if found.is_undefined() {
            return Ok(None);
        }
        found
            .dyn_into::<Response>()
            .map(|r| Some(WebResponse(r)))
            .map_err(|e| cache_error("match returned a non-response", e))
    }
}

pub struct WebNetwork {
    scope: ServiceWorkerGlobalScope,
}

impl WebNetwork {
    async fn send(&self, url: &str, pending: Promise) -> Result<WebResponse, GatewayError> {
        let network_error = |err: JsValue| GatewayError::Network {
            url: url.to_string(),
            message: format!("{:?}", err),
        };
        JsFuture::from(pending)
            .await
            .map_err(network_error)?
            .dyn_into::<Response>()
            .map(WebResponse)
            .map_err(network_error)
    }
}

#[async_trait(?Send)]
impl Network for WebNetwork {
    type Response = WebResponse;
    type Request = Request;

    async fn fetch(&self, key: &RequestKey) -> Result<WebResponse, GatewayError> {
        self.send(key.as_str(), self.scope.fetch_with_str(key.as_str())).await
    }

    async fn forward(
        &self,
        request: &GatewayRequest<Request>,
    ) -> Result<WebResponse, GatewayError> {
        self.send(
            request.key.as_str(),
            self.scope.fetch_with_request(&request.original),
        )
        .await
    }
}

/// The Cache API only stores GET; anything else is left to the browser.
pub fn should_intercept(method: &str) -> bool {
    method.eq_ignore_ascii_case("GET")
}

pub fn destination_of(destination: RequestDestination) -> Destination {
    match destination {
        RequestDestination::Document => Destination::Document,
        RequestDestination::Script => Destination::Script,
        RequestDestination::Style => Destination::Style,
        RequestDestination::Image => Destination::Image,
        RequestDestination::Font => Destination::Font,
        _ => Destination::Other,
    }
}

/// How an outcome is handed back to `respondWith`.
#[derive(Debug, PartialEq)]
pub enum ResponsePlan<R> {
    /// Resolve with the stored or network response.
    Pass(R),
    /// Resolve with a freshly built response.
    Synthesize {
        body: String,
        content_type: &'static str,
    },
    /// Reject, so the page sees a network error.
    Reject(String),
}

pub fn response_plan<R>(outcome: FetchOutcome<R>) -> ResponsePlan<R> {
    match outcome {
        FetchOutcome::Cached(r) | FetchOutcome::Network(r) => ResponsePlan::Pass(r),
        FetchOutcome::Placeholder => ResponsePlan::Synthesize {
            body: placeholder_svg(),
            content_type: PLACEHOLDER_CONTENT_TYPE,
        },
        FetchOutcome::Failed(err) => ResponsePlan::Reject(err.to_string()),
    }
}

fn synthesize(body: &str, content_type: &str) -> Result<Response, JsValue> {
    let headers = Headers::new()?;
    headers.set("Content-Type", content_type)?;
    let init = ResponseInit::new();
    init.set_headers(&headers);
    Response::new_with_opt_str_and_init(Some(body), &init)
}

fn to_js(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

type WebGateway = CacheGateway<WebCacheStore, WebNetwork>;

struct Worker {
    scope: ServiceWorkerGlobalScope,
    base: Url,
    gateway: Rc<WebGateway>,
}

thread_local! {
    static WORKER: OnceCell<Rc<Worker>> = OnceCell::new();
}

fn build_worker() -> Result<Rc<Worker>, JsValue> {
    let scope: ServiceWorkerGlobalScope = js_sys::global().dyn_into()?;
    let base = Url::parse(&scope.registration().scope()).map_err(to_js)?;

    let caches = WebCacheStore {
        storage: scope.caches()?,
    };
    let network = WebNetwork {
        scope: scope.clone(),
    };
    let gateway = CacheGateway::new(CACHE_NAME, &base, PRECACHE_MANIFEST, caches, network)
        .map_err(to_js)?;

    info!(
        "Service worker ready: cache {} with {} manifest entries",
        gateway.generation(),
        gateway.manifest().len()
    );
    Ok(Rc::new(Worker {
        scope,
        base,
        gateway: Rc::new(gateway),
    }))
}

/// The worker state, built on first use.
fn worker() -> Result<Rc<Worker>, JsValue> {
    WORKER.with(|cell| cell.get_or_try_init(build_worker).cloned())
}

/// Promise for the `install` event's `waitUntil`.
pub fn install() -> Promise {
    future_to_promise(async move {
        let gateway = worker()?.gateway.clone();
        let stored = gateway.install().await.map_err(to_js)?;
        Ok(JsValue::from(stored as u32))
    })
}

/// Promise for the `activate` event's `waitUntil`.
pub fn activate() -> Promise {
    future_to_promise(async move {
        let gateway = worker()?.gateway.clone();
        let deleted = gateway.activate().await.map_err(to_js)?;
        Ok(JsValue::from(deleted.len() as u32))
    })
}

/// Promise for the `fetch` event's `respondWith`.
pub fn respond(request: Request) -> Promise {
    future_to_promise(async move {
        let worker = worker()?;
        if !should_intercept(&request.method()) {
            return JsFuture::from(worker.scope.fetch_with_request(&request)).await;
        }

        let key = match RequestKey::resolve(&worker.base, &request.url()) {
            Ok(key) => key,
            Err(e) => {
                debug!("passing through {}: {}", request.url(), e);
                return JsFuture::from(worker.scope.fetch_with_request(&request)).await;
            }
        };
        let destination = destination_of(request.destination());
        let gateway_request = GatewayRequest::with_original(key, destination, request);

        match response_plan(worker.gateway.handle_fetch(&gateway_request).await) {
            ResponsePlan::Pass(WebResponse(r)) => Ok(r.into()),
            ResponsePlan::Synthesize { body, content_type } => {
                synthesize(&body, content_type).map(JsValue::from)
            }
            ResponsePlan::Reject(message) => {
                warn!("{}", message);
                Err(JsValue::from_str(&message))
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_get_is_intercepted() {
        assert!(should_intercept("GET"));
        assert!(should_intercept("get"));
        assert!(!should_intercept("POST"));
        assert!(!should_intercept("HEAD"));
    }

    #[test]
    fn destinations_map_to_gateway_kinds() {
        assert_eq!(destination_of(RequestDestination::Image), Destination::Image);
        assert_eq!(destination_of(RequestDestination::Document), Destination::Document);
        assert_eq!(destination_of(RequestDestination::Style), Destination::Style);
        assert_eq!(destination_of(RequestDestination::None), Destination::Other);
        assert_eq!(destination_of(RequestDestination::Video), Destination::Other);
    }

    #[test]
    fn hits_and_network_responses_pass_through() {
        assert_eq!(response_plan(FetchOutcome::Cached(7)), ResponsePlan::Pass(7));
        assert_eq!(response_plan(FetchOutcome::Network(9)), ResponsePlan::Pass(9));
    }

    #[test]
    fn placeholder_is_an_svg_response() {
        match response_plan::<()>(FetchOutcome::Placeholder) {
            ResponsePlan::Synthesize { body, content_type } => {
                assert_eq!(content_type, "image/svg+xml");
                assert!(body.starts_with("<svg"));
                assert!(body.contains("Image unavailable"));
            }
            other => panic!("expected a synthesized response, got {:?}", other),
        }
    }

    #[test]
    fn failures_reject() {
        let outcome = FetchOutcome::<()>::Failed(GatewayError::Network {
            url: "https://portfolio.test/about".into(),
            message: "offline".into(),
        });
        match response_plan(outcome) {
            ResponsePlan::Reject(message) => {
                assert!(message.contains("https://portfolio.test/about"))
            }
            other => panic!("expected rejection, got {:?}", other),
        }
    }
}
