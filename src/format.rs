//! Text and class helpers used when rendering experience, skills and
//! project status.

use chrono::NaiveDate;

use crate::{ProjectStatus, Skill};

fn plural(n: i64, unit: &str) -> String {
    format!("{} {}{}", n, unit, if n > 1 { "s" } else { "" })
}

/// Human-readable tenure, counting 30-day months.
pub fn calculate_duration(start: NaiveDate, end: NaiveDate, current: bool) -> String {
    let months = (end - start).num_days().max(0) / 30;
    let years = months / 12;
    let remaining = months % 12;

    let mut duration = if years > 0 {
        let mut s = plural(years, "year");
        if remaining > 0 {
            s.push(' ');
            s.push_str(&plural(remaining, "month"));
        }
        s
    } else {
        plural(months, "month")
    };

    if current {
        duration.push_str(" (Current)");
    }
    duration
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkillLevel {
    Beginner,
    Intermediate,
    Advanced,
    Expert,
}

impl SkillLevel {
    pub fn from_level(level: u8) -> Self {
        match level {
            90..=u8::MAX => SkillLevel::Expert,
            80..=89 => SkillLevel::Advanced,
            70..=79 => SkillLevel::Intermediate,
            _ => SkillLevel::Beginner,
        }
    }

    pub fn chip_class(self) -> &'static str {
        match self {
            SkillLevel::Expert => "chip-expert",
            SkillLevel::Advanced => "chip-advanced",
            SkillLevel::Intermediate => "chip-intermediate",
            SkillLevel::Beginner => "chip-beginner",
        }
    }
}

/// Skills grouped by category, categories in first-seen order.
pub fn group_skills(skills: &[Skill]) -> Vec<(String, Vec<Skill>)> {
    let mut groups: Vec<(String, Vec<Skill>)> = Vec::new();
    for skill in skills {
        match groups.iter_mut().find(|(cat, _)| *cat == skill.category) {
            Some((_, members)) => members.push(skill.clone()),
            None => groups.push((skill.category.clone(), vec![skill.clone()])),
        }
    }
    groups
}

pub fn status_label(status: ProjectStatus) -> &'static str {
    match status {
        ProjectStatus::Completed => "Completed",
        ProjectStatus::InProgress => "In Progress",
    }
}

pub fn status_class(status: ProjectStatus) -> &'static str {
    match status {
        ProjectStatus::Completed => "completed",
        ProjectStatus::InProgress => "in-progress",
    }
}

/// Date range shown in the project modal; an open end reads "Present".
pub fn date_range(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Option<String> {
    let start = start?;
    let end = end
        .map(|d| d.format("%b %-d, %Y").to_string())
        .unwrap_or_else(|| "Present".to_string());
    Some(format!("{} - {}", start.format("%b %-d, %Y"), end))
}
