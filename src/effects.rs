//! Settings for the one-off page effects: the particle background, the
//! scroll-animation library and in-page anchor scrolling.

use serde_json::{json, Value};

const WIDE_VIEWPORT: f64 = 768.0;
const WIDE_PARTICLE_COUNT: u32 = 40;
const NARROW_PARTICLE_COUNT: u32 = 20;
const PARTICLE_COLOR: &str = "#00d9ff";

pub fn particle_count(viewport_width: f64) -> u32 {
    if viewport_width > WIDE_VIEWPORT {
        WIDE_PARTICLE_COUNT
    } else {
        NARROW_PARTICLE_COUNT
    }
}

/// Options passed to `particlesJS("particles-js", ..)`.
pub fn particles_config(count: u32) -> Value {
    json!({
        "particles": {
            "number": { "value": count, "density": { "enable": true, "value_area": 1000 } },
            "color": { "value": PARTICLE_COLOR },
            "shape": { "type": "circle" },
            "opacity": {
                "value": 0.4,
                "random": true,
                "anim": { "enable": true, "speed": 0.8, "opacity_min": 0.1, "sync": false }
            },
            "size": {
                "value": 2,
                "random": true,
                "anim": { "enable": true, "speed": 1.5, "size_min": 0.1, "sync": false }
            },
            "line_linked": {
                "enable": true,
                "distance": 120,
                "color": PARTICLE_COLOR,
                "opacity": 0.2,
                "width": 1
            },
            "move": {
                "enable": true,
                "speed": 1.5,
                "direction": "none",
                "random": true,
                "straight": false,
                "out_mode": "out",
                "bounce": false
            }
        },
        "interactivity": {
            "detect_on": "canvas",
            "events": {
                "onhover": { "enable": true, "mode": "grab" },
                "onclick": { "enable": false },
                "resize": true
            },
            "modes": { "grab": { "distance": 120, "line_linked": { "opacity": 0.4 } } }
        },
        "retina_detect": true
    })
}

/// Options passed to `AOS.init(..)`. Animations are disabled on narrow screens.
pub fn scroll_animations_options(viewport_width: f64) -> Value {
    json!({
        "duration": 800,
        "once": true,
        "offset": 100,
        "easing": "ease-out-cubic",
        "disable": viewport_width < WIDE_VIEWPORT,
    })
}

/// Selector for an in-page anchor, or `None` for a bare `#` / external link.
pub fn anchor_selector(href: &str) -> Option<&str> {
    (href.starts_with('#') && href.len() > 1).then_some(href)
}

pub fn anchor_scroll_top(target_offset_top: f64, anchor_offset: f64) -> f64 {
    target_offset_top - anchor_offset
}
