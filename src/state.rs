//! Page-wide application state and its event dispatch.
//!
//! [`transition`] is a pure function from the current state and one UI
//! event to the next state. The Yew side only translates DOM events into
//! [`AppEvent`]s and renders whatever state comes back.

use std::fmt;
use std::rc::Rc;
use yew::Reducible;

use crate::contact::FormMessage;
use crate::filter::{compute_visible, results_announcement, FilterState};
use crate::nav::FocusMove;
use crate::{PortfolioData, Project};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    /// Unknown stored values fall back to light.
    pub fn from_stored(value: &str) -> Self {
        match value {
            "dark" => Theme::Dark,
            _ => Theme::Light,
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    DataLoaded(PortfolioData),
    FilterSelected(String),
    /// Raw search input; folded by the filter state.
    SearchChanged(String),
    ThemeToggled,
    ProjectOpened(u32),
    ModalClosed,
    ConnectivityChanged(bool),
    Scrolled { offset: f64, viewport_height: f64 },
    Announced(String),
    AnnouncementCleared,
    /// Arrow, Home or End pressed inside the project grid.
    CardFocusMoved(FocusMove),
    /// A card received focus by click or Tab.
    CardFocused(usize),
    /// A nav link scrolled to the section with this heading.
    Navigated(String),
    /// Hero call to action. Mobile visitors are handed to their mail app
    /// instead of the options dialog.
    ContactRequested { mobile: bool },
    ContactOptionsClosed,
    FormMessageShown(FormMessage),
    /// Timer for the banner shown with this sequence number ran out.
    FormMessageExpired(u64),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppState {
    pub data: PortfolioData,
    pub filter: FilterState,
    /// Derived from `data.projects` and `filter`; never edited directly.
    pub visible: Vec<Project>,
    pub theme: Theme,
    /// Id of the project shown in the detail modal.
    pub modal: Option<u32>,
    pub online: bool,
    pub announcement: Option<String>,
    /// Bumped on every announcement so repeated texts are re-announced.
    pub announcement_seq: u64,
    pub back_to_top_visible: bool,
    /// Index of the card holding the grid's single tab stop.
    pub focused_card: usize,
    pub contact_options_open: bool,
    pub form_message: Option<FormMessage>,
    /// Bumped on every banner so a stale hide timer can be ignored.
    pub form_message_seq: u64,
}

impl AppState {
    pub fn new(data: PortfolioData, theme: Theme, online: bool) -> Self {
        let filter = FilterState::default();
        let visible = compute_visible(&data.projects, &filter);
        Self {
            data,
            filter,
            visible,
            theme,
            online,
            ..Default::default()
        }
    }

    pub fn modal_project(&self) -> Option<&Project> {
        self.modal.and_then(|id| self.data.project(id))
    }

    fn refiltered(mut self, filter: FilterState) -> Self {
        self.visible = compute_visible(&self.data.projects, &filter);
        self.filter = filter;
        self.focused_card = 0;
        self
    }

    fn announce(mut self, message: impl Into<String>) -> Self {
        self.announcement = Some(message.into());
        self.announcement_seq += 1;
        self
    }
}

pub fn transition(state: &AppState, event: AppEvent) -> AppState {
    let next = state.clone();
    match event {
        AppEvent::DataLoaded(data) => {
            let filter = next.filter.clone();
            let mut next = AppState { data, ..next }.refiltered(filter);
            // A modal pointing at a project that no longer exists is closed.
            if next.modal_project().is_none() {
                next.modal = None;
            }
            next
        }
        AppEvent::FilterSelected(category) => {
            let filter = next.filter.with_category(&category);
            let next = next.refiltered(filter);
            let count = next.visible.len();
            next.announce(format!(
                "Filtered projects by {}: {}",
                category,
                results_announcement(count)
            ))
        }
        AppEvent::SearchChanged(term) => {
            let filter = next.filter.with_search(&term);
            if filter == next.filter {
                return next;
            }
            let next = next.refiltered(filter);
            let count = next.visible.len();
            next.announce(results_announcement(count))
        }
        AppEvent::ThemeToggled => {
            let theme = next.theme.toggle();
            AppState { theme, ..next }.announce(format!("Switched to {} theme", theme))
        }
        AppEvent::ProjectOpened(id) => {
            let title = next.data.project(id).map(|p| p.title.clone());
            match title {
                Some(title) => AppState {
                    modal: Some(id),
                    ..next
                }
                .announce(format!("Opened project details for {}", title)),
                None => next,
            }
        }
        AppEvent::ModalClosed => {
            if next.modal.is_none() {
                return next;
            }
            AppState {
                modal: None,
                ..next
            }
            .announce("Closed project details")
        }
        AppEvent::ConnectivityChanged(online) => {
            if online == next.online {
                return next;
            }
            let message = if online {
                "Connection restored"
            } else {
                "You are now offline"
            };
            AppState { online, ..next }.announce(message)
        }
        AppEvent::Scrolled {
            offset,
            viewport_height,
        } => AppState {
            back_to_top_visible: offset > viewport_height / 2.0,
            ..next
        },
        AppEvent::Announced(message) => next.announce(message),
        AppEvent::AnnouncementCleared => AppState {
            announcement: None,
            ..next
        },
        AppEvent::CardFocusMoved(step) => match step.apply(next.focused_card, next.visible.len()) {
            Some(focused_card) => AppState {
                focused_card,
                ..next
            },
            None => next,
        },
        AppEvent::CardFocused(index) if index < next.visible.len() => AppState {
            focused_card: index,
            ..next
        },
        AppEvent::CardFocused(_) => next,
        AppEvent::Navigated(heading) => next.announce(format!("Navigated to {}", heading)),
        AppEvent::ContactRequested { mobile } => AppState {
            contact_options_open: !mobile,
            ..next
        }
        .announce("Contact options opened"),
        AppEvent::ContactOptionsClosed => AppState {
            contact_options_open: false,
            ..next
        },
        AppEvent::FormMessageShown(message) => {
            let announcement = message.announcement();
            AppState {
                form_message: Some(message),
                form_message_seq: next.form_message_seq + 1,
                ..next
            }
            .announce(announcement)
        }
        AppEvent::FormMessageExpired(seq) => {
            let expired = next
                .form_message
                .as_ref()
                .is_some_and(|m| m.auto_hides() && seq == next.form_message_seq);
            if !expired {
                return next;
            }
            AppState {
                form_message: None,
                ..next
            }
        }
    }
}

impl Reducible for AppState {
    type Action = AppEvent;

    fn reduce(self: Rc<Self>, action: AppEvent) -> Rc<Self> {
        Rc::new(transition(&self, action))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{project, shop_and_bot};

    fn loaded() -> AppState {
        let data = PortfolioData {
            projects: shop_and_bot(),
            ..Default::default()
        };
        AppState::new(data, Theme::Light, true)
    }

    fn visible_ids(state: &AppState) -> Vec<u32> {
        state.visible.iter().map(|p| p.id).collect()
    }

    #[test]
    fn new_state_shows_everything() {
        let state = loaded();
        assert_eq!(visible_ids(&state), vec![1, 2]);
        assert!(state.filter.is_unfiltered());
        assert!(state.announcement.is_none());
    }

    #[test]
    fn theme_round_trips_through_strings() {
        assert_eq!(Theme::from_stored("dark"), Theme::Dark);
        assert_eq!(Theme::from_stored("light"), Theme::Light);
        assert_eq!(Theme::from_stored(""), Theme::Light);
        assert_eq!(Theme::Light.toggle().as_str(), "dark");
    }

    #[test]
    fn filter_then_search_combine() {
        let state = transition(&loaded(), AppEvent::FilterSelected("cli".into()));
        assert_eq!(visible_ids(&state), vec![2]);
        assert_eq!(
            state.announcement.as_deref(),
            Some("Filtered projects by cli: 1 project found")
        );

        let state = transition(&state, AppEvent::SearchChanged("JAVA".into()));
        assert!(state.visible.is_empty());
        assert_eq!(state.filter.search_term, "java");
        assert_eq!(state.announcement.as_deref(), Some("0 projects found"));

        let state = transition(&state, AppEvent::FilterSelected("all".into()));
        assert_eq!(visible_ids(&state), vec![1]);
    }

    #[test]
    fn latest_search_wins() {
        let state = loaded();
        let state = transition(&state, AppEvent::SearchChanged("bot".into()));
        let state = transition(&state, AppEvent::SearchChanged("shop".into()));
        assert_eq!(visible_ids(&state), vec![1]);
    }

    #[test]
    fn unchanged_search_does_not_reannounce() {
        let state = transition(&loaded(), AppEvent::SearchChanged("bot".into()));
        let seq = state.announcement_seq;
        let again = transition(&state, AppEvent::SearchChanged("BOT".into()));
        assert_eq!(again.announcement_seq, seq);
    }

    #[test]
    fn reloading_data_reapplies_filter() {
        let state = transition(&loaded(), AppEvent::FilterSelected("web".into()));
        let data = PortfolioData {
            projects: vec![
                project(3, "Blog", "web", &["Go"]),
                project(4, "Cli", "cli", &["Go"]),
            ],
            ..Default::default()
        };
        let state = transition(&state, AppEvent::DataLoaded(data));
        assert_eq!(visible_ids(&state), vec![3]);
    }

    #[test]
    fn theme_toggle_announces() {
        let state = transition(&loaded(), AppEvent::ThemeToggled);
        assert_eq!(state.theme, Theme::Dark);
        assert_eq!(state.announcement.as_deref(), Some("Switched to dark theme"));
        assert_eq!(transition(&state, AppEvent::ThemeToggled).theme, Theme::Light);
    }

    #[test]
    fn modal_opens_known_projects_only() {
        let state = transition(&loaded(), AppEvent::ProjectOpened(2));
        assert_eq!(state.modal_project().map(|p| p.title.as_str()), Some("Bot"));
        assert_eq!(
            state.announcement.as_deref(),
            Some("Opened project details for Bot")
        );

        let closed = transition(&state, AppEvent::ModalClosed);
        assert!(closed.modal.is_none());
        assert_eq!(closed.announcement.as_deref(), Some("Closed project details"));

        let unknown = transition(&closed, AppEvent::ProjectOpened(42));
        assert_eq!(unknown, closed);
    }

    #[test]
    fn modal_closes_when_project_disappears() {
        let state = transition(&loaded(), AppEvent::ProjectOpened(1));
        let state = transition(&state, AppEvent::DataLoaded(PortfolioData::default()));
        assert!(state.modal.is_none());
        assert!(state.visible.is_empty());
    }

    #[test]
    fn connectivity_changes_are_announced_once() {
        let offline = transition(&loaded(), AppEvent::ConnectivityChanged(false));
        assert!(!offline.online);
        assert_eq!(offline.announcement.as_deref(), Some("You are now offline"));

        let same = transition(&offline, AppEvent::ConnectivityChanged(false));
        assert_eq!(same.announcement_seq, offline.announcement_seq);

        let back = transition(&offline, AppEvent::ConnectivityChanged(true));
        assert_eq!(back.announcement.as_deref(), Some("Connection restored"));
    }

    #[test]
    fn back_to_top_after_half_viewport() {
        let scrolled = |offset| {
            transition(
                &loaded(),
                AppEvent::Scrolled {
                    offset,
                    viewport_height: 800.0,
                },
            )
            .back_to_top_visible
        };
        assert!(!scrolled(400.0));
        assert!(scrolled(401.0));
    }

    #[test]
    fn card_focus_roves_within_the_grid() {
        let state = transition(&loaded(), AppEvent::CardFocusMoved(FocusMove::Next));
        assert_eq!(state.focused_card, 1);
        let state = transition(&state, AppEvent::CardFocusMoved(FocusMove::Next));
        assert_eq!(state.focused_card, 1);
        let state = transition(&state, AppEvent::CardFocusMoved(FocusMove::First));
        assert_eq!(state.focused_card, 0);

        let clicked = transition(&state, AppEvent::CardFocused(1));
        assert_eq!(clicked.focused_card, 1);
        assert_eq!(transition(&clicked, AppEvent::CardFocused(9)), clicked);
    }

    #[test]
    fn refiltering_resets_the_tab_stop() {
        let state = transition(&loaded(), AppEvent::CardFocusMoved(FocusMove::Last));
        assert_eq!(state.focused_card, 1);
        let state = transition(&state, AppEvent::FilterSelected("web".into()));
        assert_eq!(state.focused_card, 0);
    }

    #[test]
    fn card_moves_on_an_empty_grid_are_ignored() {
        let empty = AppState::new(PortfolioData::default(), Theme::Light, true);
        assert_eq!(transition(&empty, AppEvent::CardFocusMoved(FocusMove::Last)), empty);
    }

    #[test]
    fn navigation_is_announced() {
        let state = transition(&loaded(), AppEvent::Navigated("Skills".into()));
        assert_eq!(state.announcement.as_deref(), Some("Navigated to Skills"));
    }

    #[test]
    fn contact_options_open_on_desktop_only() {
        let desktop = transition(&loaded(), AppEvent::ContactRequested { mobile: false });
        assert!(desktop.contact_options_open);
        assert_eq!(desktop.announcement.as_deref(), Some("Contact options opened"));
        assert!(!transition(&desktop, AppEvent::ContactOptionsClosed).contact_options_open);

        let mobile = transition(&loaded(), AppEvent::ContactRequested { mobile: true });
        assert!(!mobile.contact_options_open);
        assert_eq!(mobile.announcement.as_deref(), Some("Contact options opened"));
    }

    #[test]
    fn success_banner_expires_after_its_own_timer() {
        let state = transition(&loaded(), AppEvent::FormMessageShown(FormMessage::success()));
        let first = state.form_message_seq;
        assert_eq!(
            state.announcement.as_deref(),
            Some(FormMessage::success().announcement().as_str())
        );

        // A second submission restarts the timer; the first one is stale.
        let state = transition(&state, AppEvent::FormMessageShown(FormMessage::success()));
        let stale = transition(&state, AppEvent::FormMessageExpired(first));
        assert!(stale.form_message.is_some());

        let current = state.form_message_seq;
        assert!(transition(&state, AppEvent::FormMessageExpired(current))
            .form_message
            .is_none());
    }

    #[test]
    fn error_banner_stays() {
        let state = transition(&loaded(), AppEvent::FormMessageShown(FormMessage::failure()));
        let seq = state.form_message_seq;
        let state = transition(&state, AppEvent::FormMessageExpired(seq));
        assert_eq!(state.form_message, Some(FormMessage::failure()));
    }

    #[test]
    fn announcement_clears() {
        let state = transition(&loaded(), AppEvent::Announced("Contact options opened".into()));
        assert_eq!(state.announcement.as_deref(), Some("Contact options opened"));
        assert!(transition(&state, AppEvent::AnnouncementCleared)
            .announcement
            .is_none());
    }
}
