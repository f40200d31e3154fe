//! Application-level configuration constants.

// UI Behavior
pub const DEBOUNCE_MS: u32 = 300;
pub const ANNOUNCEMENT_CLEAR_MS: u32 = 1_000;
pub const SCROLL_THROTTLE_MS: u32 = 100;
pub const SERVICE_WORKER_SCRIPT: &str = "sw.js";
pub const SERVICE_WORKER_SCOPE: &str = "./";
pub const SUCCESS_MESSAGE_HIDE_MS: u32 = 5_000;

// Section navigation (pixels)
pub const SCROLL_MARGIN: f64 = 20.0;
pub const SECTION_JUMP_SLACK: f64 = 100.0;

// Offline cache
pub const CACHE_NAME: &str = "portfolio-v1";
// Scope-relative; Trunk.toml turns file hashing off so these names are stable.
pub const PRECACHE_MANIFEST: &[&str] = &[
    "./",
    "./index.html",
    "./style.css",
    "./portfolio.js",
    "./portfolio_bg.wasm",
];

// Placeholder served for images that are neither cached nor reachable
pub const PLACEHOLDER_WIDTH: u32 = 400;
pub const PLACEHOLDER_HEIGHT: u32 = 300;
pub const PLACEHOLDER_FILL: &str = "#ddd";
pub const PLACEHOLDER_TEXT: &str = "Image unavailable";
pub const PLACEHOLDER_CONTENT_TYPE: &str = "image/svg+xml";

// Local storage keys
pub const THEME_KEY: &str = "theme";
pub const DATA_KEY: &str = "portfolioData";

// Filter
pub const ALL_CATEGORIES: &str = "all";

// Contact form
pub const MIN_NAME_LEN: usize = 2;
pub const MIN_SUBJECT_LEN: usize = 5;
pub const MIN_MESSAGE_LEN: usize = 10;
pub const SUBMIT_DELAY_MS: u32 = 2_000;
pub const SUBMIT_SUCCESS_RATE: f64 = 0.9;
pub const CONTACT_EMAIL: &str = "hello@yashodhan.co";
pub const FALLBACK_EMAIL: &str = "yashodhan@yashodhan.co";

/// Label, shown text and link target of each direct contact channel.
pub const CONTACT_OPTIONS: &[(&str, &str, &str)] = &[
    ("Email", "hello@yashodhan.co", "mailto:hello@yashodhan.co"),
    ("LinkedIn", "linkedin.com/in/yashodhanpagar", "https://linkedin.com/in/yashodhanpagar"),
    ("Phone", "+91 8888723386", "tel:+918888723386"),
];
