use crate::{
    config::SiteConfig,
    contact::ContactSubmitter,
    dom::{
        listen, offset_top, query_all, read_cookie, scroll_offset, smooth_scroll_to,
        viewport_width, DomContactForm, DomRevealObserver, ElementText, FetchTransport,
        WindowScheduler,
    },
    effects::{
        anchor_scroll_top, anchor_selector, particle_count, particles_config,
        scroll_animations_options,
    },
    error::{SiteError, SiteResult},
    notification::{NotificationCenter, Notify},
    reveal::{parse_count, reveal_skill_bar, run_counter, skill_bar_width, CounterAnimation},
    scheduler::Scheduler,
    scroll_gate::{active_link_href, active_section, gate, is_past},
    toast_layer::YewToastView,
    typing::{TypingAnimator, TypingTimings},
};
use js_sys::{Function, Reflect, JSON};
use std::rc::Rc;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::spawn_local;
use web_sys::{window, Document, Element, HtmlElement, HtmlFormElement, Window};

fn prefers_reduced_motion() -> bool {
    window()
        .and_then(|w| {
            w.match_media("(prefers-reduced-motion: reduce)")
                .ok()
                .flatten()
        })
        .map(|mq| mq.matches())
        .unwrap_or(false)
}

fn read_config(win: &Window, document: &Document) -> SiteConfig {
    let hostname = win.location().hostname().unwrap_or_default();
    let body = document.body();

    SiteConfig::from_lookup(&hostname, |key| {
        body.as_ref()?.get_attribute(&format!("data-{key}"))
    })
}

fn report(effect: &str, result: SiteResult<()>) {
    if let Err(error) = result {
        log::warn!("{effect} skipped: {error}");
    }
}

fn global_function(target: &JsValue, name: &str) -> Option<Function> {
    Reflect::get(target, &JsValue::from_str(name))
        .ok()?
        .dyn_into::<Function>()
        .ok()
}

fn to_js(value: &serde_json::Value) -> SiteResult<JsValue> {
    Ok(JSON::parse(&value.to_string())?)
}

/// Runs `task` once the document has been parsed.
fn when_ready(document: &Document, task: impl FnOnce() + 'static) -> SiteResult<()> {
    if document.ready_state() != "loading" {
        task();
        return Ok(());
    }

    let mut task = Some(task);
    listen(document, "DOMContentLoaded", false, move |_| {
        if let Some(task) = task.take() {
            task();
        }
    })
}

/// Runs `task` once the page and its resources have loaded.
fn when_loaded(
    win: &Window,
    document: &Document,
    task: impl FnOnce() + 'static,
) -> SiteResult<()> {
    if document.ready_state() == "complete" {
        task();
        return Ok(());
    }

    let mut task = Some(task);
    listen(win, "load", false, move |_| {
        if let Some(task) = task.take() {
            task();
        }
    })
}

fn init_loading_screen(
    win: &Window,
    document: &Document,
    scheduler: Rc<dyn Scheduler>,
    config: &SiteConfig,
) -> SiteResult<()> {
    let Some(loading_screen) = document.get_element_by_id("loadingScreen") else {
        return Ok(());
    };

    let delay = config.loading_screen_delay;
    when_loaded(win, document, move || {
        let _ = scheduler.set_timeout(
            delay,
            Box::new(move || {
                let _ = loading_screen.class_list().add_1("hidden");
            }),
        );
    })
}

fn init_particles(
    win: &Window,
    document: &Document,
    scheduler: &dyn Scheduler,
    config: &SiteConfig,
) -> SiteResult<()> {
    let Some(particles_js) = global_function(win, "particlesJS") else {
        return Ok(());
    };
    if document.get_element_by_id("particles-js").is_none() {
        return Ok(());
    }

    let options = to_js(&particles_config(particle_count(viewport_width())))?;
    let _ = scheduler.set_timeout(
        config.particles_delay,
        Box::new(move || {
            if prefers_reduced_motion() {
                log::debug!("particles disabled: reduced motion preferred");
                return;
            }
            if let Err(error) =
                particles_js.call2(&JsValue::NULL, &JsValue::from_str("particles-js"), &options)
            {
                log::warn!("particlesJS failed: {}", SiteError::from(error));
            }
        }),
    );
    Ok(())
}

fn init_scroll_animations(win: &Window, scheduler: &dyn Scheduler, config: &SiteConfig) {
    let win = win.clone();
    let _ = scheduler.set_timeout(
        config.scroll_animations_delay,
        Box::new(move || {
            let Ok(aos) = Reflect::get(&win, &JsValue::from_str("AOS")) else {
                return;
            };
            if aos.is_undefined() || aos.is_null() {
                return;
            }
            let Some(init) = global_function(&aos, "init") else {
                return;
            };

            let result = to_js(&scroll_animations_options(viewport_width())).and_then(|options| {
                init.call1(&aos, &options)
                    .map(|_| ())
                    .map_err(SiteError::from)
            });
            report("scroll animations", result);
        }),
    );
}

fn init_typing(
    document: &Document,
    scheduler: Rc<dyn Scheduler>,
    config: &SiteConfig,
) -> SiteResult<()> {
    let Some(element) = document.get_element_by_id("typingText") else {
        return Ok(());
    };

    TypingAnimator::new(
        config.typing_phrases.clone(),
        TypingTimings::from_config(config),
        ElementText(element),
    )?
    .start(scheduler);
    Ok(())
}

fn init_scroll_gates(
    win: &Window,
    document: &Document,
    scheduler: Rc<dyn Scheduler>,
    config: &SiteConfig,
) -> SiteResult<()> {
    if let Some(navbar) = document.query_selector(".navbar")? {
        let threshold = config.navbar_scrolled_offset;
        let handler = gate(Rc::clone(&scheduler), move || {
            let _ = navbar
                .class_list()
                .toggle_with_force("scrolled", is_past(scroll_offset(), threshold));
        });
        listen(win, "scroll", true, move |_| handler())?;
    }

    let sections = query_all(document, "section[id]");
    let nav_links = query_all(document, ".nav-link");
    let lookahead = config.section_lookahead;
    let highlight = Rc::new(gate(Rc::clone(&scheduler), move || {
        highlight_active_link(&sections, &nav_links, lookahead)
    }));
    for event in ["scroll", "resize"] {
        let highlight = Rc::clone(&highlight);
        listen(win, event, true, move |_| highlight())?;
    }

    if let Some(scroll_top) = document.get_element_by_id("scrollTop") {
        let threshold = config.scroll_top_visible_offset;
        let button = scroll_top.clone();
        let handler = gate(scheduler, move || {
            let _ = button
                .class_list()
                .toggle_with_force("visible", is_past(scroll_offset(), threshold));
        });
        listen(win, "scroll", true, move |_| handler())?;
        listen(&scroll_top, "click", false, |_| smooth_scroll_to(0.0))?;
    }

    Ok(())
}

fn highlight_active_link(sections: &[Element], nav_links: &[Element], lookahead: f64) {
    let ids = sections
        .iter()
        .map(|section| (section.id(), offset_top(section)))
        .collect::<Vec<_>>();
    let current = active_section(
        scroll_offset(),
        lookahead,
        ids.iter().map(|(id, top)| (id.as_str(), *top)),
    );
    let active_href = active_link_href(current);

    for link in nav_links {
        let is_active = link.get_attribute("href").as_deref() == Some(active_href.as_str());
        let _ = link.class_list().toggle_with_force("active", is_active);
    }
}

fn init_reveals(
    document: &Document,
    scheduler: Rc<dyn Scheduler>,
    config: &SiteConfig,
) -> SiteResult<()> {
    let counters = DomRevealObserver::new(config.reveal_threshold)?;
    for counter in query_all(document, ".stat-number[data-count]") {
        let raw = counter.get_attribute("data-count").unwrap_or_default();
        let Some(target) = parse_count(&raw) else {
            log::warn!("counter skipped: data-count {raw:?} is not an integer");
            continue;
        };

        let scheduler = Rc::clone(&scheduler);
        let (duration, frame) = (config.counter_duration, config.counter_frame);
        counters.observe(counter, move |element| {
            let element = element.clone();
            let render: Rc<dyn Fn(&str)> =
                Rc::new(move |text: &str| element.set_text_content(Some(text)));
            run_counter(scheduler, CounterAnimation::new(target, duration, frame), render);
        });
    }

    let skill_bars = DomRevealObserver::new(config.reveal_threshold)?;
    for bar in query_all(document, ".skill-progress[data-progress]") {
        let raw = bar.get_attribute("data-progress").unwrap_or_default();
        let Some(width) = skill_bar_width(&raw) else {
            log::warn!("skill bar skipped: data-progress {raw:?} is not a number");
            continue;
        };
        let Some(bar_style) = bar.dyn_ref::<HtmlElement>().map(HtmlElement::style) else {
            continue;
        };

        bar_style.set_property("width", "0%")?;
        let scheduler = Rc::clone(&scheduler);
        let delay = config.skill_bar_delay;
        skill_bars.observe(bar, move |_| {
            reveal_skill_bar(scheduler.as_ref(), delay, width, move |width| {
                let _ = bar_style.set_property("width", width);
            });
        });
    }

    Ok(())
}

fn init_smooth_anchors(document: &Document, config: &SiteConfig) -> SiteResult<()> {
    let anchor_offset = config.anchor_offset;

    for anchor in query_all(document, "a[href^=\"#\"]") {
        let document = document.clone();
        let clicked = anchor.clone();
        listen(&anchor, "click", false, move |event| {
            let href = clicked.get_attribute("href").unwrap_or_default();
            let Some(selector) = anchor_selector(&href) else {
                return;
            };
            let Ok(Some(target)) = document.query_selector(selector) else {
                return;
            };

            event.prevent_default();
            smooth_scroll_to(anchor_scroll_top(offset_top(&target), anchor_offset));

            for link in query_all(&document, ".nav-link") {
                let _ = link.class_list().remove_1("active");
            }
            let _ = clicked.class_list().add_1("active");

            if let Ok(Some(collapse)) = document.query_selector(".navbar-collapse.show") {
                let _ = collapse.class_list().remove_1("show");
            }
        })?;
    }

    Ok(())
}

fn init_contact_form(
    document: &Document,
    config: &SiteConfig,
    notifier: Rc<dyn Notify>,
) -> SiteResult<()> {
    let Some(form) = document.get_element_by_id("contactForm") else {
        return Ok(());
    };
    let form = form
        .dyn_into::<HtmlFormElement>()
        .map_err(|_| SiteError::MissingElement("form#contactForm"))?;

    let view = Rc::new(DomContactForm::new(document, form.clone()));
    let submitter = Rc::new(ContactSubmitter::new(
        config.contact_endpoint.clone(),
        FetchTransport,
        notifier,
    ));
    let document = document.clone();
    let csrf_cookie = config.csrf_cookie.clone();

    listen(&form, "submit", false, move |event| {
        event.prevent_default();

        let view = Rc::clone(&view);
        let submitter = Rc::clone(&submitter);
        let csrf_token = read_cookie(&document, &csrf_cookie);
        spawn_local(async move {
            let outcome = submitter.submit(view.as_ref(), csrf_token.as_deref()).await;
            log::debug!("contact submission finished: {outcome:?}");
        });
    })
}

pub fn run() {
    console_error_panic_hook::set_once();

    let Some(win) = window() else {
        return;
    };
    let Some(document) = win.document() else {
        return;
    };

    let config = read_config(&win, &document);
    wasm_logger::init(wasm_logger::Config::new(config.log_level));
    log::info!("portfolio behaviors starting");

    let scheduler: Rc<dyn Scheduler> = Rc::new(WindowScheduler);

    report(
        "loading screen",
        init_loading_screen(&win, &document, Rc::clone(&scheduler), &config),
    );
    init_scroll_animations(&win, scheduler.as_ref(), &config);

    let ready_document = document.clone();
    let result = when_ready(&document, move || {
        boot_page(&win, &ready_document, scheduler, &config);
    });
    report("page boot", result);
}

fn boot_page(
    win: &Window,
    document: &Document,
    scheduler: Rc<dyn Scheduler>,
    config: &SiteConfig,
) {
    report("particles", init_particles(win, document, scheduler.as_ref(), config));
    report("typing", init_typing(document, Rc::clone(&scheduler), config));
    report(
        "scroll effects",
        init_scroll_gates(win, document, Rc::clone(&scheduler), config),
    );
    report("reveals", init_reveals(document, Rc::clone(&scheduler), config));
    report("anchors", init_smooth_anchors(document, config));

    match YewToastView::mount(document) {
        Ok(view) => {
            let notifications = NotificationCenter::from_config(scheduler, view, config);
            report(
                "contact form",
                init_contact_form(document, config, Rc::new(notifications)),
            );
        }
        Err(error) => log::warn!("notifications unavailable, contact form skipped: {error}"),
    }

    log::info!("portfolio behaviors ready");
}
