//! Yew view components for the portfolio page.
//!
//! Everything here renders from props. Page-wide state lives in
//! `AppState` and reaches these components through the root `App`; the
//! contact form keeps its field values and errors locally.

use chrono::NaiveDate;
use log::debug;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::{EventTarget, HtmlElement, HtmlInputElement, HtmlTextAreaElement};
use yew::prelude::*;

use portfolio::config::{ALL_CATEGORIES, CONTACT_EMAIL, CONTACT_OPTIONS};
use portfolio::contact::{
    self, validate_field, validate_form, ContactForm, Field, FieldErrors, FormMessage, MessageKind,
};
use portfolio::format::{
    calculate_duration, date_range, group_skills, status_class, status_label, SkillLevel,
};
use portfolio::nav::FocusMove;
use portfolio::state::Theme;
use portfolio::{Experience, Project, Skill};

const SECTIONS: [(&str, &str); 5] = [
    ("about", "About"),
    ("projects", "Projects"),
    ("experience", "Experience"),
    ("skills", "Skills"),
    ("contact", "Contact"),
];

#[derive(Properties, PartialEq)]
pub struct HeaderProps {
    pub theme: Theme,
    pub on_toggle_theme: Callback<()>,
    /// Receives the id of the section a nav link points at.
    pub on_navigate: Callback<String>,
}

#[function_component(Header)]
pub fn header(props: &HeaderProps) -> Html {
    let onclick = props.on_toggle_theme.reform(|_: MouseEvent| ());
    let (icon, label) = match props.theme {
        Theme::Light => ("🌙", "Switch to dark theme"),
        Theme::Dark => ("☀️", "Switch to light theme"),
    };
    let link_to = |id: &'static str| {
        let on_navigate = props.on_navigate.clone();
        Callback::from(move |e: MouseEvent| {
            e.prevent_default();
            on_navigate.emit(id.to_string());
        })
    };

    html! {
        <header class="header">
            <nav class="nav" aria-label="Main navigation">
                <a class="nav-logo" href="#about" onclick={link_to("about")}>{ "Yashodhan" }</a>
                <ul class="nav-links">
                    { SECTIONS.iter().map(|&(id, title)| html! {
                        <li>
                            <a class="nav-link" href={format!("#{}", id)} onclick={link_to(id)}>
                                { title }
                            </a>
                        </li>
                    }).collect::<Html>() }
                </ul>
                <button class="theme-toggle" type="button" aria-label={label} {onclick}>
                    <span aria-hidden="true">{ icon }</span>
                </button>
            </nav>
        </header>
    }
}

#[derive(Properties, PartialEq)]
pub struct FilterBarProps {
    pub categories: Vec<String>,
    pub active: String,
    pub on_select: Callback<String>,
}

/// Category buttons. "all" always comes first.
#[function_component(FilterBar)]
pub fn filter_bar(props: &FilterBarProps) -> Html {
    let button = |category: &str, text: &str| {
        let active = props.active == category;
        let onclick = {
            let on_select = props.on_select.clone();
            let category = category.to_string();
            Callback::from(move |_: MouseEvent| on_select.emit(category.clone()))
        };
        html! {
            <button type="button"
                class={classes!("filter-btn", active.then_some("active"))}
                aria-pressed={active.to_string()}
                data-filter={category.to_string()}
                {onclick}>
                { text.to_string() }
            </button>
        }
    };

    html! {
        <div class="project-filters" role="group" aria-label="Filter projects by category">
            { button(ALL_CATEGORIES, "All") }
            { props.categories.iter().map(|c| button(c, c)).collect::<Html>() }
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct SearchInputProps {
    pub input_ref: NodeRef,
    pub on_search: Callback<String>,
}

#[function_component(SearchInput)]
pub fn search_input(props: &SearchInputProps) -> Html {
    let oninput = {
        let on_search = props.on_search.clone();
        Callback::from(move |e: InputEvent| {
            let input: HtmlInputElement = e.target_unchecked_into();
            on_search.emit(input.value());
        })
    };

    html! {
        <div class="project-search">
            <label for="project-search" class="sr-only">{ "Search projects" }</label>
            <input type="search"
                id="project-search"
                placeholder="Search projects... (Ctrl+K)"
                autocomplete="off"
                ref={props.input_ref.clone()}
                {oninput}
            />
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct ProjectCardProps {
    pub project: Project,
    /// Position in the grid.
    pub index: usize,
    /// Whether this card holds the grid's tab stop.
    pub focused: bool,
    pub on_open: Callback<u32>,
    pub on_focus: Callback<usize>,
}

#[function_component(ProjectCard)]
pub fn project_card(props: &ProjectCardProps) -> Html {
    let project = &props.project;
    let id = project.id;

    let index = props.index;
    let onclick = props.on_open.reform(move |_: MouseEvent| id);
    let onfocus = props.on_focus.reform(move |_: FocusEvent| index);
    let onkeydown = {
        let on_open = props.on_open.clone();
        Callback::from(move |e: KeyboardEvent| {
            if e.key() == "Enter" || e.key() == " " {
                e.prevent_default();
                on_open.emit(id);
            }
        })
    };
    // Links inside the card must not also open the modal.
    let stop = Callback::from(|e: MouseEvent| e.stop_propagation());

    html! {
        <article class="project-card"
            tabindex={if props.focused { "0" } else { "-1" }}
            role="button"
            aria-label={format!("View details for {}", project.title)}
            {onclick}
            {onkeydown}
            {onfocus}>
            if let Some(image) = &project.image {
                <div class="project-image">
                    <img src={image.clone()} alt={project.title.clone()} loading="lazy" />
                </div>
            }
            <div class="project-content">
                <div class="project-header">
                    <h3 class="project-title">{ &project.title }</h3>
                    <span class={classes!("project-status", status_class(project.status))}>
                        { status_label(project.status) }
                    </span>
                </div>
                <p class="project-description">{ &project.description }</p>
                { render_tech_list(&project.technologies) }
                <div class="project-links">
                    <a href={project.live_url.clone()} target="_blank" rel="noopener noreferrer"
                        onclick={stop.clone()}>{ "Live Demo" }</a>
                    <a href={project.github_url.clone()} target="_blank" rel="noopener noreferrer"
                        onclick={stop}>{ "GitHub" }</a>
                </div>
            </div>
        </article>
    }
}

fn render_tech_list(technologies: &[String]) -> Html {
    html! {
        <ul class="project-tech">
            { technologies.iter().map(|t| html! {
                <li class="tech-tag">{ t }</li>
            }).collect::<Html>() }
        </ul>
    }
}

#[derive(Properties, PartialEq)]
pub struct ProjectGridProps {
    pub projects: Vec<Project>,
    /// Index of the card that takes Tab focus.
    pub focused: usize,
    pub on_open: Callback<u32>,
    pub on_focus: Callback<usize>,
    pub on_focus_move: Callback<FocusMove>,
}

/// Renders the visible projects, or the no-results state when empty.
///
/// Only one card is in the tab order; arrows, Home and End move focus
/// between cards.
#[function_component(ProjectGrid)]
pub fn project_grid(props: &ProjectGridProps) -> Html {
    let grid_ref = use_node_ref();

    let onkeydown = {
        let grid_ref = grid_ref.clone();
        let focused = props.focused;
        let len = props.projects.len();
        let on_focus_move = props.on_focus_move.clone();
        Callback::from(move |e: KeyboardEvent| {
            let Some(step) = FocusMove::from_key(&e.key()) else {
                return;
            };
            let Some(index) = step.apply(focused, len) else {
                return;
            };
            e.prevent_default();
            let card = grid_ref
                .cast::<HtmlElement>()
                .and_then(|grid| grid.query_selector_all(".project-card").ok())
                .and_then(|cards| cards.item(index as u32))
                .and_then(|node| node.dyn_into::<HtmlElement>().ok());
            if let Some(card) = card {
                let _ = card.focus();
            }
            on_focus_move.emit(step);
        })
    };

    if props.projects.is_empty() {
        return html! {
            <div class="projects-grid">
                <p class="no-results">{ "No projects found matching your criteria." }</p>
            </div>
        };
    }

    html! {
        <div class="projects-grid" ref={grid_ref} {onkeydown}>
            { props.projects.iter().enumerate().map(|(index, project)| html! {
                <ProjectCard key={project.id}
                    project={project.clone()}
                    {index}
                    focused={index == props.focused}
                    on_open={props.on_open.clone()}
                    on_focus={props.on_focus.clone()} />
            }).collect::<Html>() }
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct ProjectModalProps {
    pub project: Option<Project>,
    pub on_close: Callback<()>,
}

/// Detail dialog. Closes on the close button or a click on the backdrop;
/// Escape is handled at the page level.
#[function_component(ProjectModal)]
pub fn project_modal(props: &ProjectModalProps) -> Html {
    let close_ref = use_node_ref();

    {
        let close_ref = close_ref.clone();
        let open_id = props.project.as_ref().map(|p| p.id);
        use_effect_with(open_id, move |id| {
            if id.is_some() {
                if let Some(button) = close_ref.cast::<HtmlElement>() {
                    let _ = button.focus();
                }
            }
            || ()
        });
    }

    let Some(project) = &props.project else {
        return html! {};
    };

    let on_backdrop = {
        let on_close = props.on_close.clone();
        Callback::from(move |e: MouseEvent| {
            let on_backdrop = match (e.target(), e.current_target()) {
                (Some(target), Some(current)) => target == current,
                _ => false,
            };
            if on_backdrop {
                on_close.emit(());
            }
        })
    };
    let on_close = props.on_close.reform(|_: MouseEvent| ());

    html! {
        <div class="modal active" role="dialog" aria-modal="true"
            aria-labelledby="modal-title" onclick={on_backdrop}>
            <div class="modal-content">
                <button class="modal-close" type="button" aria-label="Close project details"
                    ref={close_ref} onclick={on_close}>{ "×" }</button>
                if let Some(image) = &project.image {
                    <img class="modal-image" src={image.clone()} alt={project.title.clone()} />
                }
                <h2 id="modal-title">{ &project.title }</h2>
                <span class={classes!("project-status", status_class(project.status))}>
                    { status_label(project.status) }
                </span>
                if let Some(dates) = date_range(project.start_date, project.end_date) {
                    <p class="modal-dates">{ dates }</p>
                }
                <p class="modal-description">{ &project.description }</p>
                <h3>{ "Technologies" }</h3>
                { render_tech_list(&project.technologies) }
                <div class="modal-links">
                    <a class="btn btn-primary" href={project.live_url.clone()}
                        target="_blank" rel="noopener noreferrer">{ "View Live" }</a>
                    <a class="btn btn-secondary" href={project.github_url.clone()}
                        target="_blank" rel="noopener noreferrer">{ "View Code" }</a>
                </div>
            </div>
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct ExperienceTimelineProps {
    pub experience: Vec<Experience>,
    /// End date used for current positions.
    pub today: NaiveDate,
}

#[function_component(ExperienceTimeline)]
pub fn experience_timeline(props: &ExperienceTimelineProps) -> Html {
    html! {
        <div class="timeline">
            {
                props
                    .experience
                    .iter()
                    .map(|exp| render_experience(exp, props.today))
                    .collect::<Html>()
            }
        </div>
    }
}

fn render_experience(exp: &Experience, today: NaiveDate) -> Html {
    let end = exp.end_date.unwrap_or(today);
    let duration = calculate_duration(exp.start_date, end, exp.current);

    html! {
        <div class="timeline-item" key={exp.id}>
            <div class="timeline-marker" aria-hidden="true"></div>
            <div class="timeline-content">
                <div class="experience-header">
                    <img class="company-logo" src={exp.logo.clone()}
                        alt={format!("{} logo", exp.company)} loading="lazy" />
                    <div>
                        <h3 class="position">{ &exp.position }</h3>
                        <p class="company">{ &exp.company }</p>
                        <p class="experience-meta">
                            { format!("{} · {} · {}", exp.location, exp.kind, duration) }
                        </p>
                    </div>
                </div>
                <p class="experience-description">{ &exp.description }</p>
                <ul class="achievements">
                    { exp.achievements.iter().map(|a| html! { <li>{ a }</li> }).collect::<Html>() }
                </ul>
                { render_tech_list(&exp.technologies) }
            </div>
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct SkillsSectionProps {
    pub skills: Vec<Skill>,
}

#[function_component(SkillsSection)]
pub fn skills_section(props: &SkillsSectionProps) -> Html {
    html! {
        <div class="skills-grid">
            { group_skills(&props.skills).into_iter().map(|(category, skills)| html! {
                <div class="skill-category" key={category.clone()}>
                    <h3>{ &category }</h3>
                    <div class="skill-chips">
                        { skills.iter().map(|skill| {
                            let level = SkillLevel::from_level(skill.level);
                            html! {
                                <span class={classes!("skill-chip", level.chip_class())}
                                    title={format!("{}%", skill.level)}>
                                    { &skill.name }
                                </span>
                            }
                        }).collect::<Html>() }
                    </div>
                </div>
            }).collect::<Html>() }
        </div>
    }
}

fn field_value(target: Option<EventTarget>) -> String {
    let Some(target) = target else {
        return String::new();
    };
    if let Some(input) = target.dyn_ref::<HtmlInputElement>() {
        input.value()
    } else if let Some(area) = target.dyn_ref::<HtmlTextAreaElement>() {
        area.value()
    } else {
        String::new()
    }
}

#[derive(Properties, PartialEq)]
pub struct ContactSectionProps {
    /// Banner from the latest submission, if still shown.
    pub message: Option<FormMessage>,
    pub on_result: Callback<FormMessage>,
    pub on_announce: Callback<String>,
}

/// Contact form with per-field validation and the simulated send.
#[function_component(ContactSection)]
pub fn contact_section(props: &ContactSectionProps) -> Html {
    let form = use_state(ContactForm::default);
    let errors = use_state(FieldErrors::new);
    let submitting = use_state(|| false);

    // Typing into a field clears its error; leaving it re-validates.
    let oninput_for = |field: Field| {
        let form = form.clone();
        let errors = errors.clone();
        Callback::from(move |e: InputEvent| {
            let mut next = (*form).clone();
            next.set(field, field_value(e.target()));
            form.set(next);
            if errors.contains_key(&field) {
                let mut remaining = (*errors).clone();
                remaining.remove(&field);
                errors.set(remaining);
            }
        })
    };
    let onblur_for = |field: Field| {
        let errors = errors.clone();
        Callback::from(move |e: FocusEvent| {
            let mut next = (*errors).clone();
            match validate_field(field, &field_value(e.target())) {
                Ok(()) => next.remove(&field),
                Err(msg) => next.insert(field, msg),
            };
            errors.set(next);
        })
    };

    let onsubmit = {
        let form = form.clone();
        let errors = errors.clone();
        let submitting = submitting.clone();
        let on_result = props.on_result.clone();
        let on_announce = props.on_announce.clone();
        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();
            if *submitting {
                return;
            }

            let found = validate_form(&form);
            if !found.is_empty() {
                debug!("Contact form rejected with {} error(s)", found.len());
                errors.set(found);
                on_announce.emit("Please fix the errors in the form".to_string());
                return;
            }

            errors.set(FieldErrors::new());
            submitting.set(true);

            let snapshot = (*form).clone();
            let form = form.clone();
            let submitting = submitting.clone();
            let on_result = on_result.clone();
            spawn_local(async move {
                let result = contact::submit(&snapshot).await;
                if result.is_ok() {
                    form.set(ContactForm::default());
                }
                on_result.emit(FormMessage::for_result(&result));
                submitting.set(false);
            });
        })
    };

    let render_field = |field: Field| {
        let error = errors.get(&field);
        let error_id = format!("{}-error", field.id());
        let class = classes!("form-input", error.map(|_| "error"));
        let value = form.value(field).to_string();
        let control = if field == Field::Message {
            html! {
                <textarea id={field.id()} name={field.id()} rows="5" {class} {value}
                    aria-invalid={error.is_some().to_string()}
                    aria-describedby={error_id.clone()}
                    oninput={oninput_for(field)}
                    onblur={onblur_for(field)} />
            }
        } else {
            let kind = if field == Field::Email { "email" } else { "text" };
            html! {
                <input type={kind} id={field.id()} name={field.id()} {class} {value}
                    aria-invalid={error.is_some().to_string()}
                    aria-describedby={error_id.clone()}
                    oninput={oninput_for(field)}
                    onblur={onblur_for(field)} />
            }
        };
        html! {
            <div class="form-group">
                <label for={field.id()}>{ field.label() }</label>
                { control }
                <span class="field-error" id={error_id} role="alert">
                    { error.cloned().unwrap_or_default() }
                </span>
            </div>
        }
    };

    html! {
        <div class="contact-content">
            <p class="contact-intro">
                { "Have a project in mind? Send a message or write to " }
                <a href={format!("mailto:{}", CONTACT_EMAIL)}>{ CONTACT_EMAIL }</a>
            </p>
            <form class="contact-form" novalidate={true} {onsubmit}>
                { Field::ALL.iter().map(|&f| render_field(f)).collect::<Html>() }
                <button type="submit"
                    class={classes!("btn", "btn-primary", submitting.then_some("loading"))}
                    disabled={*submitting}>
                    { if *submitting { "Sending..." } else { "Send Message" } }
                </button>
            </form>
            if let Some(msg) = &props.message {
                <div class={classes!("form-message", match msg.kind {
                    MessageKind::Success => "success",
                    MessageKind::Error => "error",
                })} role="status">
                    <h4>{ &msg.title }</h4>
                    <p>{ &msg.body }</p>
                </div>
            }
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct ContactOptionsProps {
    pub open: bool,
    pub on_close: Callback<()>,
}

/// Direct contact channels, offered from the hero's call to action.
#[function_component(ContactOptions)]
pub fn contact_options(props: &ContactOptionsProps) -> Html {
    let close_ref = use_node_ref();

    {
        let close_ref = close_ref.clone();
        use_effect_with(props.open, move |open| {
            if *open {
                if let Some(button) = close_ref.cast::<HtmlElement>() {
                    let _ = button.focus();
                }
            }
            || ()
        });
    }

    if !props.open {
        return html! {};
    }

    let on_close = props.on_close.reform(|_: MouseEvent| ());
    html! {
        <div class="modal active" role="dialog" aria-modal="true"
            aria-labelledby="contact-options-title">
            <div class="modal-content">
                <button class="modal-close" type="button" aria-label="Close contact options"
                    ref={close_ref} onclick={on_close}>{ "×" }</button>
                <h2 id="contact-options-title">{ "Contact Yashodhan" }</h2>
                <ul class="contact-options-list">
                    { CONTACT_OPTIONS.iter().map(|&(label, text, href)| html! {
                        <li>{ format!("{}: ", label) }<a {href}>{ text }</a></li>
                    }).collect::<Html>() }
                </ul>
            </div>
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct OfflineBannerProps {
    pub online: bool,
}

#[function_component(OfflineBanner)]
pub fn offline_banner(props: &OfflineBannerProps) -> Html {
    if props.online {
        return html! {};
    }
    html! {
        <div class="offline-banner" role="alert">
            { "You are offline. Some content may be unavailable." }
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct AnnouncerProps {
    pub message: Option<String>,
}

/// Screen-reader live region; always in the DOM so updates are spoken.
#[function_component(Announcer)]
pub fn announcer(props: &AnnouncerProps) -> Html {
    html! {
        <div id="status-announcements" class="sr-only" aria-live="polite" aria-atomic="true">
            { props.message.clone().unwrap_or_default() }
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct BackToTopProps {
    pub visible: bool,
    pub on_click: Callback<()>,
}

#[function_component(BackToTop)]
pub fn back_to_top(props: &BackToTopProps) -> Html {
    let onclick = props.on_click.reform(|_: MouseEvent| ());
    html! {
        <button type="button"
            class={classes!("back-to-top", props.visible.then_some("visible"))}
            aria-label="Back to top"
            hidden={!props.visible}
            {onclick}>
            { "↑" }
        </button>
    }
}
