use std::time::Duration;

const DEFAULT_CONTACT_ENDPOINT: &str = "/api/contact/";
const DEFAULT_CSRF_COOKIE: &str = "csrftoken";
const DEFAULT_TYPING_PHRASES: [&str; 5] = [
    "Full-Stack Developer",
    "Django Specialist",
    "UI/UX Enthusiast",
    "Problem Solver",
    "Tech Innovator",
];
const DEFAULT_TYPING_TICK_MS: u64 = 120;
const DEFAULT_TYPING_PAUSE_FULL_MS: u64 = 2_000;
const DEFAULT_TYPING_PAUSE_EMPTY_MS: u64 = 500;
const DEFAULT_TOAST_DURATION_MS: u64 = 5_000;
const DEFAULT_TOAST_EXIT_MS: u64 = 300;
const DEFAULT_REVEAL_THRESHOLD: f64 = 0.3;
const DEFAULT_COUNTER_DURATION_MS: u64 = 1_500;
const DEFAULT_COUNTER_FRAME_MS: u64 = 16;
const DEFAULT_SKILL_BAR_DELAY_MS: u64 = 100;
const DEFAULT_NAVBAR_SCROLLED_OFFSET: f64 = 100.0;
const DEFAULT_SCROLL_TOP_VISIBLE_OFFSET: f64 = 300.0;
const DEFAULT_SECTION_LOOKAHEAD: f64 = 150.0;
const DEFAULT_ANCHOR_OFFSET: f64 = 80.0;
const DEFAULT_LOADING_SCREEN_DELAY_MS: u64 = 800;
const DEFAULT_PARTICLES_DELAY_MS: u64 = 500;
const DEFAULT_SCROLL_ANIMATIONS_DELAY_MS: u64 = 300;

const TYPING_PAUSE_FULL_MS_BOUNDS: (u64, u64) = (500, 10_000);
const TOAST_DURATION_MS_BOUNDS: (u64, u64) = (1_000, 60_000);

const PHRASE_SEPARATOR: char = '|';
const DEBUG_HOSTS: [&str; 2] = ["localhost", "127.0.0.1"];

/// Timings, thresholds and names used by the page behaviors.
///
/// Every value has a default; a handful can be overridden per page through
/// `data-*` attributes on `<body>` (see [`SiteConfig::from_lookup`]).
#[derive(Clone, Debug, PartialEq)]
pub struct SiteConfig {
    pub contact_endpoint: String,
    pub csrf_cookie: String,
    pub typing_phrases: Vec<String>,
    pub typing_tick: Duration,
    pub typing_pause_full: Duration,
    pub typing_pause_empty: Duration,
    pub toast_duration: Duration,
    pub toast_exit: Duration,
    pub reveal_threshold: f64,
    pub counter_duration: Duration,
    pub counter_frame: Duration,
    pub skill_bar_delay: Duration,
    pub navbar_scrolled_offset: f64,
    pub scroll_top_visible_offset: f64,
    pub section_lookahead: f64,
    pub anchor_offset: f64,
    pub loading_screen_delay: Duration,
    pub particles_delay: Duration,
    pub scroll_animations_delay: Duration,
    pub log_level: log::Level,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            contact_endpoint: DEFAULT_CONTACT_ENDPOINT.to_string(),
            csrf_cookie: DEFAULT_CSRF_COOKIE.to_string(),
            typing_phrases: DEFAULT_TYPING_PHRASES.iter().map(ToString::to_string).collect(),
            typing_tick: Duration::from_millis(DEFAULT_TYPING_TICK_MS),
            typing_pause_full: Duration::from_millis(DEFAULT_TYPING_PAUSE_FULL_MS),
            typing_pause_empty: Duration::from_millis(DEFAULT_TYPING_PAUSE_EMPTY_MS),
            toast_duration: Duration::from_millis(DEFAULT_TOAST_DURATION_MS),
            toast_exit: Duration::from_millis(DEFAULT_TOAST_EXIT_MS),
            reveal_threshold: DEFAULT_REVEAL_THRESHOLD,
            counter_duration: Duration::from_millis(DEFAULT_COUNTER_DURATION_MS),
            counter_frame: Duration::from_millis(DEFAULT_COUNTER_FRAME_MS),
            skill_bar_delay: Duration::from_millis(DEFAULT_SKILL_BAR_DELAY_MS),
            navbar_scrolled_offset: DEFAULT_NAVBAR_SCROLLED_OFFSET,
            scroll_top_visible_offset: DEFAULT_SCROLL_TOP_VISIBLE_OFFSET,
            section_lookahead: DEFAULT_SECTION_LOOKAHEAD,
            anchor_offset: DEFAULT_ANCHOR_OFFSET,
            loading_screen_delay: Duration::from_millis(DEFAULT_LOADING_SCREEN_DELAY_MS),
            particles_delay: Duration::from_millis(DEFAULT_PARTICLES_DELAY_MS),
            scroll_animations_delay: Duration::from_millis(DEFAULT_SCROLL_ANIMATIONS_DELAY_MS),
            log_level: log::Level::Info,
        }
    }
}

impl SiteConfig {
    /// Builds the config from attribute lookups (`lookup("typing-pause-ms")`
    /// reads `data-typing-pause-ms`). Missing or out-of-bounds values keep the
    /// default.
    pub fn from_lookup<F>(hostname: &str, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let typing_phrases = parse_non_empty_string(lookup("typing-phrases"))
            .map(|raw| parse_phrases(&raw))
            .filter(|phrases| !phrases.is_empty())
            .unwrap_or(defaults.typing_phrases);
        let typing_pause_full_ms = parse_u64_with_bounds(
            lookup("typing-pause-ms"),
            DEFAULT_TYPING_PAUSE_FULL_MS,
            TYPING_PAUSE_FULL_MS_BOUNDS,
        );
        let toast_duration_ms = parse_u64_with_bounds(
            lookup("toast-duration-ms"),
            DEFAULT_TOAST_DURATION_MS,
            TOAST_DURATION_MS_BOUNDS,
        );
        let contact_endpoint =
            parse_non_empty_string(lookup("contact-endpoint")).unwrap_or(defaults.contact_endpoint);
        let csrf_cookie =
            parse_non_empty_string(lookup("csrf-cookie")).unwrap_or(defaults.csrf_cookie);
        let log_level = parse_log_level(lookup("log-level"), default_log_level(hostname));

        Self {
            contact_endpoint,
            csrf_cookie,
            typing_phrases,
            typing_pause_full: Duration::from_millis(typing_pause_full_ms),
            toast_duration: Duration::from_millis(toast_duration_ms),
            log_level,
            ..defaults
        }
    }
}

fn default_log_level(hostname: &str) -> log::Level {
    if DEBUG_HOSTS.contains(&hostname) {
        log::Level::Debug
    } else {
        log::Level::Info
    }
}

fn parse_u64_with_bounds(value: Option<String>, default: u64, bounds: (u64, u64)) -> u64 {
    value
        .and_then(|value| value.trim().parse::<u64>().ok())
        .filter(|value| (bounds.0..=bounds.1).contains(value))
        .unwrap_or(default)
}

fn parse_non_empty_string(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_phrases(raw: &str) -> Vec<String> {
    raw.split(PHRASE_SEPARATOR)
        .map(str::trim)
        .filter(|phrase| !phrase.is_empty())
        .map(ToString::to_string)
        .collect()
}

fn parse_log_level(value: Option<String>, default: log::Level) -> log::Level {
    match parse_non_empty_string(value)
        .map(|value| value.to_ascii_lowercase())
        .as_deref()
    {
        Some("debug") => log::Level::Debug,
        Some("info") => log::Level::Info,
        _ => default,
    }
}
