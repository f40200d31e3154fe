//! Portfolio front end: the root `App` component.
//! Wires the state reducer to the components and owns every side effect
//! (storage, service worker registration, window listeners, timers).

use gloo_timers::callback::Timeout;
use log::{debug, info, warn};
use portfolio::{
    config::{
        ANNOUNCEMENT_CLEAR_MS, CONTACT_EMAIL, DEBOUNCE_MS, SCROLL_THROTTLE_MS,
        SERVICE_WORKER_SCOPE, SERVICE_WORKER_SCRIPT, SUCCESS_MESSAGE_HIDE_MS,
    },
    contact::{is_mobile_user_agent, FormMessage},
    filter::categories,
    logging,
    nav::{scroll_target, section_jump, Direction, FocusMove},
    state::{AppEvent, AppState},
    storage::{self, BrowserStorage, KeyValueStore, MemoryStore},
    timing::{Debouncer, GlooScheduler, Throttle},
    PortfolioData,
};
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{
    HtmlElement, HtmlInputElement, KeyboardEvent, RegistrationOptions, ScrollBehavior,
    ScrollToOptions,
};
use yew::prelude::*;

mod components;

use components::{
    Announcer, BackToTop, ContactOptions, ContactSection, ExperienceTimeline, FilterBar, Header,
    OfflineBanner, ProjectGrid, ProjectModal, SearchInput, SkillsSection,
};

// ──────────────────────────────────────────────────────────────────────────────
// Helper functions

/// Local storage, or an in-memory stand-in when the browser blocks it.
fn open_store() -> Rc<dyn KeyValueStore> {
    match BrowserStorage::open() {
        Ok(store) => Rc::new(store),
        Err(e) => {
            warn!("{}; preferences will not persist", e);
            Rc::new(MemoryStore::default())
        }
    }
}

fn register_service_worker() {
    let navigator = gloo_utils::window().navigator();
    // Missing on insecure origins and in some private modes.
    let supported =
        js_sys::Reflect::has(&navigator, &JsValue::from_str("serviceWorker")).unwrap_or(false);
    if !supported {
        warn!("Service workers are unavailable; offline support is off");
        return;
    }

    let container = navigator.service_worker();
    let options = RegistrationOptions::new();
    options.set_scope(SERVICE_WORKER_SCOPE);
    let promise = container.register_with_options(SERVICE_WORKER_SCRIPT, &options);

    wasm_bindgen_futures::spawn_local(async move {
        match JsFuture::from(promise).await {
            Ok(_) => info!("Service worker registered: {}", SERVICE_WORKER_SCRIPT),
            Err(e) => warn!("Service worker registration failed: {:?}", e),
        }
    });
}

/// Window listener removed again when dropped.
struct WindowListener {
    event: &'static str,
    closure: Closure<dyn Fn(web_sys::Event)>,
}

impl WindowListener {
    fn new(event: &'static str, f: impl Fn(web_sys::Event) + 'static) -> Self {
        let closure = Closure::<dyn Fn(web_sys::Event)>::new(f);
        if let Err(e) = gloo_utils::window()
            .add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())
        {
            warn!("Failed to listen for {}: {:?}", event, e);
        }
        Self { event, closure }
    }
}

impl Drop for WindowListener {
    fn drop(&mut self) {
        let _ = gloo_utils::window()
            .remove_event_listener_with_callback(self.event, self.closure.as_ref().unchecked_ref());
    }
}

/// Ctrl/Cmd+K and Ctrl/Cmd+/ jump to the project search.
fn is_search_shortcut(e: &KeyboardEvent) -> bool {
    (e.ctrl_key() || e.meta_key()) && (e.key() == "k" || e.key() == "/")
}

fn alt_direction(e: &KeyboardEvent) -> Option<Direction> {
    Direction::from_key(&e.key()).filter(|_| e.alt_key())
}

fn header_height() -> f64 {
    gloo_utils::document()
        .query_selector(".header")
        .ok()
        .flatten()
        .and_then(|el| el.dyn_into::<HtmlElement>().ok())
        .map_or(0.0, |header| f64::from(header.offset_height()))
}

/// Smooth-scrolls `section` below the sticky header and returns the text
/// to announce for it.
fn scroll_to(section: &HtmlElement) -> String {
    let options = ScrollToOptions::new();
    options.set_top(scroll_target(f64::from(section.offset_top()), header_height()));
    options.set_behavior(ScrollBehavior::Smooth);
    gloo_utils::window().scroll_to_with_scroll_to_options(&options);

    section
        .query_selector("h2")
        .ok()
        .flatten()
        .and_then(|heading| heading.text_content())
        .unwrap_or_else(|| "section".to_string())
}

fn scroll_to_section(id: &str) -> Option<String> {
    let section = gloo_utils::document()
        .get_element_by_id(id)?
        .dyn_into::<HtmlElement>()
        .ok()?;
    Some(scroll_to(&section))
}

/// Alt+ArrowDown/Up: scroll to the next or previous `.section`.
fn jump_section(direction: Direction) -> Option<String> {
    let nodes = gloo_utils::document().query_selector_all(".section").ok()?;
    let sections: Vec<HtmlElement> = (0..nodes.length())
        .filter_map(|i| nodes.item(i))
        .filter_map(|node| node.dyn_into::<HtmlElement>().ok())
        .collect();
    let tops: Vec<f64> = sections.iter().map(|s| f64::from(s.offset_top())).collect();
    let scroll_top = gloo_utils::window().scroll_y().unwrap_or(0.0);
    let index = section_jump(&tops, scroll_top, header_height(), direction)?;
    Some(scroll_to(&sections[index]))
}

// ──────────────────────────────────────────────────────────────────────────────

#[function_component(App)]
fn app() -> Html {
    let store: Rc<dyn KeyValueStore> = (*use_memo((), |_| open_store())).clone();
    let state = {
        let store = store.clone();
        use_reducer(move || {
            let theme = storage::load_theme(&*store);
            let online = gloo_utils::window().navigator().on_line();
            AppState::new(PortfolioData::default(), theme, online)
        })
    };
    let search_ref = use_node_ref();

    // Load data and register the service worker on mount
    {
        let dispatcher = state.dispatcher();
        let store = store.clone();
        use_effect_with((), move |_| {
            let (data, source) = storage::load_data(PortfolioData::embedded(), &*store);
            info!(
                "Loaded {} projects, {} positions, {} skills ({:?})",
                data.projects.len(),
                data.experience.len(),
                data.skills.len(),
                source
            );
            dispatcher.dispatch(AppEvent::DataLoaded(data));
            register_service_worker();
        });
    }

    // Apply and persist the theme
    {
        let store = store.clone();
        use_effect_with(state.theme, move |theme| {
            let root = gloo_utils::document_element();
            if let Err(e) = root.set_attribute("data-theme", theme.as_str()) {
                warn!("Failed to apply theme: {:?}", e);
            }
            if let Err(e) = storage::save_theme(&*store, *theme) {
                warn!("Failed to save theme: {}", e);
            }
            || ()
        });
    }

    // Clear the live region shortly after each announcement
    {
        let dispatcher = state.dispatcher();
        let has_announcement = state.announcement.is_some();
        use_effect_with(state.announcement_seq, move |_| {
            let timer = has_announcement.then(|| {
                Timeout::new(ANNOUNCEMENT_CLEAR_MS, move || {
                    dispatcher.dispatch(AppEvent::AnnouncementCleared)
                })
            });
            move || drop(timer)
        });
    }

    // Success banners hide themselves after a while
    {
        let dispatcher = state.dispatcher();
        let auto_hides = state.form_message.as_ref().is_some_and(FormMessage::auto_hides);
        use_effect_with(state.form_message_seq, move |seq| {
            let seq = *seq;
            let timer = auto_hides.then(|| {
                Timeout::new(SUCCESS_MESSAGE_HIDE_MS, move || {
                    dispatcher.dispatch(AppEvent::FormMessageExpired(seq))
                })
            });
            move || drop(timer)
        });
    }

    // Window listeners: connectivity, scroll position, keyboard shortcuts
    {
        let dispatcher = state.dispatcher();
        let search_ref = search_ref.clone();
        use_effect_with((), move |_| {
            let online = {
                let dispatcher = dispatcher.clone();
                WindowListener::new("online", move |_| {
                    dispatcher.dispatch(AppEvent::ConnectivityChanged(true))
                })
            };
            let offline = {
                let dispatcher = dispatcher.clone();
                WindowListener::new("offline", move |_| {
                    dispatcher.dispatch(AppEvent::ConnectivityChanged(false))
                })
            };
            let scroll = {
                let dispatcher = dispatcher.clone();
                let throttle: Throttle = Throttle::new(GlooScheduler, SCROLL_THROTTLE_MS);
                WindowListener::new("scroll", move |_| {
                    throttle.call(|| {
                        let window = gloo_utils::window();
                        let offset = window.scroll_y().unwrap_or(0.0);
                        let viewport_height = window
                            .inner_height()
                            .ok()
                            .and_then(|h| h.as_f64())
                            .unwrap_or(0.0);
                        dispatcher.dispatch(AppEvent::Scrolled {
                            offset,
                            viewport_height,
                        });
                    });
                })
            };
            let keydown = WindowListener::new("keydown", move |event| {
                let Some(e) = event.dyn_ref::<KeyboardEvent>() else {
                    return;
                };
                if e.key() == "Escape" {
                    dispatcher.dispatch(AppEvent::ModalClosed);
                    dispatcher.dispatch(AppEvent::ContactOptionsClosed);
                } else if is_search_shortcut(e) {
                    e.prevent_default();
                    if let Some(input) = search_ref.cast::<HtmlInputElement>() {
                        let _ = input.focus();
                    }
                } else if let Some(direction) = alt_direction(e) {
                    e.prevent_default();
                    if let Some(heading) = jump_section(direction) {
                        dispatcher.dispatch(AppEvent::Navigated(heading));
                    }
                }
            });
            move || drop((online, offline, scroll, keydown))
        });
    }

    // Search input is debounced; the latest term wins
    let search_debouncer = {
        let dispatcher = state.dispatcher();
        use_memo((), move |_| {
            Debouncer::new(GlooScheduler, DEBOUNCE_MS, move |term: String| {
                dispatcher.dispatch(AppEvent::SearchChanged(term))
            })
        })
    };
    let on_search = Callback::from(move |term: String| search_debouncer.call(term));

    let on_toggle_theme = {
        let dispatcher = state.dispatcher();
        Callback::from(move |_: ()| dispatcher.dispatch(AppEvent::ThemeToggled))
    };
    let on_filter = {
        let dispatcher = state.dispatcher();
        Callback::from(move |category: String| {
            dispatcher.dispatch(AppEvent::FilterSelected(category))
        })
    };
    let on_open = {
        let dispatcher = state.dispatcher();
        Callback::from(move |id: u32| dispatcher.dispatch(AppEvent::ProjectOpened(id)))
    };
    let on_close = {
        let dispatcher = state.dispatcher();
        Callback::from(move |_: ()| dispatcher.dispatch(AppEvent::ModalClosed))
    };
    let on_announce = {
        let dispatcher = state.dispatcher();
        Callback::from(move |msg: String| dispatcher.dispatch(AppEvent::Announced(msg)))
    };
    let on_navigate = {
        let dispatcher = state.dispatcher();
        Callback::from(move |id: String| match scroll_to_section(&id) {
            Some(heading) => dispatcher.dispatch(AppEvent::Navigated(heading)),
            None => debug!("no section #{}", id),
        })
    };
    let on_card_focus = {
        let dispatcher = state.dispatcher();
        Callback::from(move |index: usize| dispatcher.dispatch(AppEvent::CardFocused(index)))
    };
    let on_focus_move = {
        let dispatcher = state.dispatcher();
        Callback::from(move |step: FocusMove| dispatcher.dispatch(AppEvent::CardFocusMoved(step)))
    };
    let on_contact = {
        let dispatcher = state.dispatcher();
        Callback::from(move |_: MouseEvent| {
            let window = gloo_utils::window();
            let user_agent = window.navigator().user_agent().unwrap_or_default();
            let mobile = is_mobile_user_agent(&user_agent);
            if mobile {
                let mailto = format!("mailto:{}", CONTACT_EMAIL);
                if let Err(e) = window.location().set_href(&mailto) {
                    warn!("Failed to open the mail app: {:?}", e);
                }
            }
            dispatcher.dispatch(AppEvent::ContactRequested { mobile });
        })
    };
    let on_contact_close = {
        let dispatcher = state.dispatcher();
        Callback::from(move |_: ()| dispatcher.dispatch(AppEvent::ContactOptionsClosed))
    };
    let on_form_result = {
        let dispatcher = state.dispatcher();
        Callback::from(move |msg: FormMessage| dispatcher.dispatch(AppEvent::FormMessageShown(msg)))
    };
    let on_back_to_top =
        Callback::from(|_: ()| gloo_utils::window().scroll_to_with_x_and_y(0.0, 0.0));

    let today = chrono::Local::now().date_naive();

    html! {
        <>
            <a class="skip-link" href="#main">{ "Skip to main content" }</a>
            <Header theme={state.theme} {on_toggle_theme} {on_navigate} />
            <OfflineBanner online={state.online} />

            <main id="main">
                <section id="about" class="section hero">
                    <h1>{ "Yashodhan" }</h1>
                    <p class="hero-subtitle">{ "Software engineer building for the web" }</p>
                    <button class="btn btn-primary" type="button" onclick={on_contact}>
                        { "Get in touch" }
                    </button>
                </section>

                <section id="projects" class="section" aria-labelledby="projects-title">
                    <h2 id="projects-title">{ "Projects" }</h2>
                    <div class="project-controls">
                        <FilterBar categories={categories(&state.data.projects)}
                            active={state.filter.category.clone()}
                            on_select={on_filter} />
                        <SearchInput input_ref={search_ref.clone()} {on_search} />
                    </div>
                    <ProjectGrid projects={state.visible.clone()}
                        focused={state.focused_card}
                        {on_open}
                        on_focus={on_card_focus}
                        {on_focus_move} />
                </section>

                <section id="experience" class="section" aria-labelledby="experience-title">
                    <h2 id="experience-title">{ "Experience" }</h2>
                    <ExperienceTimeline experience={state.data.experience.clone()} {today} />
                </section>

                <section id="skills" class="section" aria-labelledby="skills-title">
                    <h2 id="skills-title">{ "Skills" }</h2>
                    <SkillsSection skills={state.data.skills.clone()} />
                </section>

                <section id="contact" class="section" aria-labelledby="contact-title">
                    <h2 id="contact-title">{ "Contact" }</h2>
                    <ContactSection message={state.form_message.clone()}
                        on_result={on_form_result}
                        {on_announce} />
                </section>
            </main>

            <ProjectModal project={state.modal_project().cloned()} {on_close} />
            <ContactOptions open={state.contact_options_open} on_close={on_contact_close} />
            <BackToTop visible={state.back_to_top_visible} on_click={on_back_to_top} />
            <Announcer message={state.announcement.clone()} />
        </>
    }
}

/// Entry point: installs logging, then renders the App component.
fn main() {
    logging::init(log::LevelFilter::Info);
    yew::Renderer::<App>::new().render();
}
