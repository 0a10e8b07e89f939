//! Deploy version token and the fixed manifest of core assets.
//!
//! The version token changes on every deployment and is the sole
//! cache-invalidation key: it names the cache generation, so a deploy
//! without a bump leaves returning visitors on stale assets.

/// Version token for the current deployment.
pub const DEPLOY_VERSION: &str = "v29";

/// Prefix for cache generation names.
pub const CACHE_PREFIX: &str = "resilience";

/// Page substituted for navigations that fail offline.
pub const ENTRY_POINT: &str = "./index.html";

/// Core assets fetched eagerly at install time, relative to the site
/// root. Install succeeds only if every one of these is stored.
pub const CORE_ASSETS: &[&str] = &[
    "./",
    "./index.html",
    "./survival-kit.html",
    "./navigation.html",
    "./egypt.html",
    "./styles.css",
    "./assets/js/accessibility.js",
    "./assets/js/cache-buster.js",
    "./assets/js/hamburger-menu.js",
    "./assets/js/slideshow.js",
    "./assets/js/vendor/html2pdf.bundle.min.js",
    "./assets/favicon.svg",
    "./manifest.webmanifest",
    "./assets/docs/survival-handbook.pdf",
    "./assets/kit-images/navigation.svg",
    "./assets/kit-images/water.svg",
    "./assets/kit-images/shelter.svg",
    "./assets/kit-images/first-aid.svg",
    "./assets/kit-images/documents.svg",
    "./assets/kit-images/map-wheel.svg",
    "./assets/icons/snake.svg",
    "./assets/icons/scorpion.svg",
    "./assets/icons/insect.svg",
];

/// Cache generation name for a version token.
pub fn cache_name(version: &str) -> String {
    format!("{CACHE_PREFIX}-{version}")
}
