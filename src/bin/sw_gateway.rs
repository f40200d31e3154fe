//! Wasm half of the offline service worker.
//!
//! `static/sw.js` loads this module with `importScripts` and forwards each
//! lifecycle event to the exports below once the module is ready.

use js_sys::Promise;
use portfolio::{logging, service_worker};
use wasm_bindgen::prelude::*;
use web_sys::Request;

fn main() {
    // Set the panic hook to log detailed errors to the console
    logging::init(log::LevelFilter::Info);
}

#[wasm_bindgen]
pub fn install() -> Promise {
    service_worker::install()
}

#[wasm_bindgen]
pub fn activate() -> Promise {
    service_worker::activate()
}

#[wasm_bindgen]
pub fn respond(request: Request) -> Promise {
    service_worker::respond(request)
}
