//! Deterministic keyword classifier that decides which specialists a user
//! request is routed to. The same message always yields the same plan.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// What the agency can produce. `all()` is the delegation precedence: a
/// domain is settled before a website is drafted, and the logo comes last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    Domain,
    Website,
    Marketing,
    Logo,
}

impl Capability {
    pub fn all() -> [Capability; 4] {
        [
            Capability::Domain,
            Capability::Website,
            Capability::Marketing,
            Capability::Logo,
        ]
    }

    /// Short lowercase label used in progress and failure lines.
    pub fn label(&self) -> &'static str {
        match self {
            Capability::Domain => "domain name",
            Capability::Website => "website",
            Capability::Marketing => "marketing strategy",
            Capability::Logo => "logo",
        }
    }

    /// Section heading used when merging specialist outputs.
    pub fn title(&self) -> &'static str {
        match self {
            Capability::Domain => "Domain Name",
            Capability::Website => "Website",
            Capability::Marketing => "Marketing Strategy",
            Capability::Logo => "Logo",
        }
    }
}

static DOMAIN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bdomain( name)?s?\b").unwrap());
static WEBSITE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(web\s?site|webpage|web page|landing page)\b").unwrap());
static MARKETING_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bmarketing\b|\bcampaign\b|\bpromot(e|ion)\b|\badvertis").unwrap());
static LOGO_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\blogo\b").unwrap());

/// Classify a user message into the capabilities it asks for, in precedence
/// order. An empty result means no specialist matched and the coordinator
/// answers directly.
pub fn classify(message: &str) -> Vec<Capability> {
    let mut plan = Vec::new();
    for capability in Capability::all() {
        let matched = match capability {
            Capability::Domain => DOMAIN_RE.is_match(message),
            Capability::Website => WEBSITE_RE.is_match(message),
            Capability::Marketing => MARKETING_RE.is_match(message),
            Capability::Logo => LOGO_RE.is_match(message),
        };
        if matched {
            plan.push(capability);
        }
    }
    plan
}
