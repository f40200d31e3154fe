//! Category filter and free-text search over the project list.
//!
//! The visible list is never edited in place: it is always recomputed in
//! full from the source records and the latest [`FilterState`].

use crate::config::ALL_CATEGORIES;
use crate::Project;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterState {
    /// `"all"` or an exact, case-sensitive category name.
    pub category: String,
    /// Always stored lower-cased.
    pub search_term: String,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            category: ALL_CATEGORIES.to_string(),
            search_term: String::new(),
        }
    }
}

impl FilterState {
    pub fn with_category(&self, category: &str) -> Self {
        Self {
            category: category.to_string(),
            search_term: self.search_term.clone(),
        }
    }

    /// Replace the search term, case-folding it on the way in.
    pub fn with_search(&self, term: &str) -> Self {
        Self {
            category: self.category.clone(),
            search_term: term.to_lowercase(),
        }
    }

    pub fn is_unfiltered(&self) -> bool {
        self.category == ALL_CATEGORIES && self.search_term.is_empty()
    }
}

/// True when the (already lower-cased) term occurs in the title, the
/// description or any technology of the project.
fn matches_term(project: &Project, term: &str) -> bool {
    project.title.to_lowercase().contains(term)
        || project.description.to_lowercase().contains(term)
        || project
            .technologies
            .iter()
            .any(|tech| tech.to_lowercase().contains(term))
}

/// Compute the visible projects for `state`, keeping source order.
///
/// Total: an empty result means "no results", which callers must render
/// as its own state.
pub fn compute_visible(records: &[Project], state: &FilterState) -> Vec<Project> {
    // Terms set without `with_search` must still compare case-insensitively.
    let term = state.search_term.to_lowercase();

    records
        .iter()
        .filter(|p| state.category == ALL_CATEGORIES || p.category == state.category)
        .filter(|p| term.is_empty() || matches_term(p, &term))
        .cloned()
        .collect()
}

/// Distinct categories in first-seen order, for building the filter bar.
pub fn categories(records: &[Project]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for project in records {
        if !out.iter().any(|c| *c == project.category) {
            out.push(project.category.clone());
        }
    }
    out
}

/// Screen-reader text announced after each recomputation.
pub fn results_announcement(count: usize) -> String {
    format!("{} project{} found", count, if count == 1 { "" } else { "s" })
}
