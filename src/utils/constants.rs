//! Shared configuration constants for bitscrape
//!
//! This module contains default values and configuration constants used
//! throughout the codebase to ensure consistency and avoid magic numbers.

/// Base URL of the component gallery being scraped
pub const GALLERY_BASE_URL: &str = "https://www.reactbits.dev";

/// Chrome user agent string presented by the headless browser
///
/// Matches a current stable desktop Chrome so the gallery serves the same
/// markup it serves real visitors.
pub const CHROME_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/132.0.6834.160 Safari/537.36";

/// Base inter-item throttle delay in milliseconds
///
/// The scraper is strictly sequential and sleeps between items as a
/// politeness policy toward the origin site. Jitter is added on top so the
/// request rhythm is not perfectly periodic.
pub const THROTTLE_BASE_MS: u64 = 1500;

/// Maximum random jitter added to the throttle delay, in milliseconds
pub const THROTTLE_JITTER_MS: u64 = 1000;

/// Timeout in seconds for `page.goto()` during extraction
///
/// A hung navigation is bounded only by this timeout, which turns into a
/// per-item failure rather than aborting the run.
pub const PAGE_LOAD_TIMEOUT_SECS: u64 = 30;

/// Settle delay in milliseconds after clicking the code-reveal tab
///
/// The gallery renders the code panel client-side with no completion signal,
/// so a fixed settle window stands in for a real "ready" event.
pub const CODE_REVEAL_SETTLE_MS: u64 = 1000;

/// Settle window in milliseconds for the network-interception code fallback
///
/// Longer than [`CODE_REVEAL_SETTLE_MS`] because the intercepted response has
/// to round-trip through the network rather than just the DOM.
pub const INTERCEPT_SETTLE_MS: u64 = 2000;

/// Maximum rows returned by any search/list query
pub const SEARCH_RESULT_LIMIT: i64 = 20;

/// Selectors that commonly wrap code blocks on the gallery's item pages
///
/// Tried in order and unioned; the gallery has changed its highlighter at
/// least twice, hence the breadth.
pub const CODE_BLOCK_SELECTORS: &str = "pre code, code.language-jsx, code.language-tsx, .language-tsx, .language-jsx, div[data-language=\"jsx\"], div[data-language=\"tsx\"], .prism-code, [class*=\"codeBlock\"], [class*=\"CodeBlock\"], [class*=\"code-block\"]";

/// Curated item paths known to exist on the gallery
///
/// The root page renders its navigation client-side, so a plain HTTP fetch of
/// the root cannot discover these. The curated list is intersected with the
/// category prefixes; anchors that do appear in the fetched root markup are
/// merged in as well.
pub const CURATED_ITEM_PATHS: &[&str] = &[
    "/components/stepper",
    "/components/counter",
    "/components/dock",
    "/components/carousel",
    "/components/stack",
    "/components/lanyard",
    "/components/folder",
    "/components/masonry",
    "/backgrounds/ballpit",
    "/backgrounds/dither",
    "/backgrounds/balatro",
    "/backgrounds/particles",
    "/backgrounds/aurora",
    "/backgrounds/iridescence",
    "/backgrounds/waves",
    "/backgrounds/hyperspeed",
    "/backgrounds/orb",
    "/backgrounds/lightning",
    "/backgrounds/threads",
    "/backgrounds/squares",
    "/backgrounds/grid-motion",
    "/animations/magnet",
    "/animations/ribbons",
    "/animations/noise",
    "/animations/crosshair",
    "/animations/splash-cursor",
    "/animations/pixel-transition",
    "/animations/animated-content",
];
