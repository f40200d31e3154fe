//! Portfolio site: the data model plus the pure logic shared by the Yew
//! front end (`main.rs`) and the offline service worker (`bin/sw_gateway.rs`).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub mod config;
pub mod contact;
pub mod filter;
pub mod format;
pub mod gateway;
pub mod logging;
pub mod nav;
pub mod service_worker;
pub mod state;
pub mod storage;
pub mod timing;

/// Data set compiled into the bundle. Treated as the "fresh" source on load.
const EMBEDDED_DATA: &str = include_str!("portfolio.json");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProjectStatus {
    Completed,
    InProgress,
}

/// A single portfolio entry. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: u32,
    pub title: String,
    pub description: String,
    pub category: String,
    pub technologies: Vec<String>,
    pub status: ProjectStatus,
    #[serde(default)]
    pub image: Option<String>,
    pub live_url: String,
    pub github_url: String,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Experience {
    pub id: u32,
    pub company: String,
    pub position: String,
    pub location: String,
    /// Employment type, e.g. "Full-time".
    #[serde(rename = "type")]
    pub kind: String,
    pub start_date: NaiveDate,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    pub current: bool,
    pub description: String,
    pub achievements: Vec<String>,
    pub technologies: Vec<String>,
    pub logo: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Skill {
    pub name: String,
    /// Proficiency, 0-100.
    pub level: u8,
    pub category: String,
}

/// Everything the page renders. `Default` is the empty fallback data set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortfolioData {
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub experience: Vec<Experience>,
    #[serde(default)]
    pub skills: Vec<Skill>,
}

impl PortfolioData {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Parse the data set shipped with the bundle.
    pub fn embedded() -> Result<Self, serde_json::Error> {
        Self::from_json(EMBEDDED_DATA)
    }

    pub fn project(&self, id: u32) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == id)
    }
}
