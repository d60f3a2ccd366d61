// src/dtos/portfolio_dtos.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::portfolio::{Education, Experience, Portfolio, Project, Service, Skill};

/// Editable fields shared by create and update bodies.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioFields {
    pub name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub whatsapp: String,
    #[serde(default)]
    pub instagram: String,
    #[serde(default)]
    pub github: Option<String>,
    #[serde(default)]
    pub linkedin: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub services: Vec<Service>,
    #[serde(default)]
    pub education: Vec<Education>,
    #[serde(default)]
    pub experience: Vec<Experience>,
    #[serde(default)]
    pub skills: Vec<Skill>,
}

impl PortfolioFields {
    /// Builds the aggregate; blank optional links are dropped.
    pub fn into_portfolio(self, id: String, password: String) -> Portfolio {
        Portfolio {
            id,
            name: self.name.trim().to_string(),
            title: self.title,
            bio: self.bio,
            email: self.email.trim().to_string(),
            phone: self.phone,
            whatsapp: self.whatsapp,
            instagram: self.instagram,
            github: non_blank(self.github),
            linkedin: non_blank(self.linkedin),
            avatar: non_blank(self.avatar),
            password,
            projects: self.projects,
            services: self.services,
            education: self.education,
            experience: self.experience,
            skills: self.skills,
            created_at: None,
            updated_at: None,
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[derive(Debug, Deserialize)]
pub struct CreatePortfolioRequest {
    #[serde(flatten)]
    pub fields: PortfolioFields,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePortfolioRequest {
    #[serde(flatten)]
    pub fields: PortfolioFields,
    /// Replaces the edit password when present and non-empty.
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct VerifyPasswordRequest {
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct VerifyPasswordResponse {
    pub valid: bool,
}

/// A portfolio as served over HTTP. The password never leaves the server.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioOut {
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
    pub projects: Vec<Project>,
    pub services: Vec<Service>,
    pub education: Vec<Education>,
    pub experience: Vec<Experience>,
    pub skills: Vec<Skill>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<Portfolio> for PortfolioOut {
    fn from(p: Portfolio) -> Self {
        Self {
            id: p.id,
            name: p.name,
            title: p.title,
            bio: p.bio,
            email: p.email,
            phone: p.phone,
            whatsapp: p.whatsapp,
            instagram: p.instagram,
            github: p.github,
            linkedin: p.linkedin,
            avatar: p.avatar,
            projects: p.projects,
            services: p.services,
            education: p.education,
            experience: p.experience,
            skills: p.skills,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}
