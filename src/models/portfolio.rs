// src/models/portfolio.rs
use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const MIN_SKILL_LEVEL: i32 = 0;
pub const MAX_SKILL_LEVEL: i32 = 100;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Project {
    pub id: String,
    pub title: String,
    pub description: String,
    pub image: String,
    pub category: String,
    pub technologies: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Service {
    pub id: String,
    pub title: String,
    pub description: String,
    /// URL or a single glyph
    pub icon: String,
    pub features: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Education {
    pub id: String,
    pub institution: String,
    pub degree: String,
    /// Free text, e.g. "2018 - 2022"
    pub period: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Experience {
    pub id: String,
    pub company: String,
    pub position: String,
    pub period: String,
    pub description: String,
    pub achievements: Vec<String>,
}

/// Skills have no id of their own; they are identified by position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Skill {
    pub name: String,
    pub level: i32,
}

impl Skill {
    pub fn clamp_level(&mut self) {
        self.level = self.level.clamp(MIN_SKILL_LEVEL, MAX_SKILL_LEVEL);
    }
}

/// One professional profile with all of its sub-collections.
///
/// The whole aggregate is the unit of persistence: saving replaces the
/// stored record wholesale, there is no field-level merge.
///
/// Every field defaults when absent, so older or partial records still load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Portfolio {
    pub id: String,
    pub name: String,
    pub title: String,
    pub bio: String,
    pub email: String,
    pub phone: String,
    pub whatsapp: String,
    pub instagram: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub github: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linkedin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    /// Stored as entered. See DESIGN.md on the credential format.
    pub password: String,
    pub projects: Vec<Project>,
    pub services: Vec<Service>,
    pub education: Vec<Education>,
    pub experience: Vec<Experience>,
    pub skills: Vec<Skill>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Portfolio {
    /// Empty portfolio with the given id and edit password.
    pub fn new(id: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            password: password.into(),
            ..Self::default()
        }
    }

    /// Gives every nested entity an id that is unique within its
    /// collection: missing ids are filled and repeated ones reassigned, the
    /// first holder keeping it. Skill levels are clamped.
    pub fn normalize(&mut self, mut next_id: impl FnMut(&str) -> String) {
        assign_ids(
            self.projects.iter_mut().map(|p| &mut p.id),
            "project",
            &mut next_id,
        );
        assign_ids(
            self.services.iter_mut().map(|s| &mut s.id),
            "service",
            &mut next_id,
        );
        assign_ids(
            self.education.iter_mut().map(|e| &mut e.id),
            "education",
            &mut next_id,
        );
        assign_ids(
            self.experience.iter_mut().map(|e| &mut e.id),
            "experience",
            &mut next_id,
        );
        for project in &mut self.projects {
            dedup_in_order(&mut project.technologies);
        }
        for skill in &mut self.skills {
            skill.clamp_level();
        }
    }
}

fn assign_ids<'a>(
    ids: impl Iterator<Item = &'a mut String>,
    kind: &str,
    next_id: &mut impl FnMut(&str) -> String,
) {
    let mut seen = HashSet::new();
    for id in ids {
        while id.is_empty() || seen.contains(id.as_str()) {
            *id = next_id(kind);
        }
        seen.insert(id.clone());
    }
}

fn dedup_in_order(items: &mut Vec<String>) {
    let mut seen = HashSet::new();
    items.retain(|item| seen.insert(item.clone()));
}
