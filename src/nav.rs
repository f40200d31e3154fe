//! Keyboard navigation: roving focus across the project cards and
//! jumping between page sections.

use crate::config::{SCROLL_MARGIN, SECTION_JUMP_SLACK};

/// Where an arrow, Home or End press moves focus inside the project grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusMove {
    Next,
    Previous,
    First,
    Last,
}

impl FocusMove {
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "ArrowRight" | "ArrowDown" => Some(FocusMove::Next),
            "ArrowLeft" | "ArrowUp" => Some(FocusMove::Previous),
            "Home" => Some(FocusMove::First),
            "End" => Some(FocusMove::Last),
            _ => None,
        }
    }

    /// New focus index among `len` cards. Clamps at both ends; `None` when
    /// there is nothing to focus.
    pub fn apply(self, current: usize, len: usize) -> Option<usize> {
        let last = len.checked_sub(1)?;
        let next = match self {
            FocusMove::Next => current.saturating_add(1).min(last),
            FocusMove::Previous => current.min(last).saturating_sub(1),
            FocusMove::First => 0,
            FocusMove::Last => last,
        };
        Some(next)
    }
}

/// Alt+ArrowDown / Alt+ArrowUp section jumps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Down,
    Up,
}

impl Direction {
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "ArrowDown" => Some(Direction::Down),
            "ArrowUp" => Some(Direction::Up),
            _ => None,
        }
    }
}

/// Scroll offset that puts a section just below the sticky header.
pub fn scroll_target(section_top: f64, header_height: f64) -> f64 {
    (section_top - header_height - SCROLL_MARGIN).max(0.0)
}

/// Index of the section to jump to from `scroll_top`, given each
/// section's document offset in page order.
///
/// Going down picks the first section starting well below the current
/// position; going up picks the last one starting well above it.
pub fn section_jump(
    section_tops: &[f64],
    scroll_top: f64,
    header_height: f64,
    direction: Direction,
) -> Option<usize> {
    let starts = section_tops.iter().map(|top| top - header_height);
    match direction {
        Direction::Down => starts
            .enumerate()
            .find(|(_, start)| *start > scroll_top + SECTION_JUMP_SLACK)
            .map(|(i, _)| i),
        Direction::Up => starts
            .enumerate()
            .filter(|(_, start)| *start < scroll_top - SECTION_JUMP_SLACK)
            .last()
            .map(|(i, _)| i),
    }
}
