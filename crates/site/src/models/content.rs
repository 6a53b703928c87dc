//! Site content singleton.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Text blocks on the home page hero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HomeContent {
    pub hero_eyebrow: String,
    pub hero_title: String,
    pub hero_subtitle: String,
    pub hero_cta: String,
}

/// Text blocks on the about section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AboutContent {
    pub eyebrow: String,
    pub title: String,
    pub summary: String,
}

/// The editable text of the site (row id 1).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteContent {
    pub home: HomeContent,
    pub about: AboutContent,
    pub updated_at: DateTime<Utc>,
}

/// Partial update of [`HomeContent`]; absent fields keep their value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HomeContentPatch {
    pub hero_eyebrow: Option<String>,
    pub hero_title: Option<String>,
    pub hero_subtitle: Option<String>,
    pub hero_cta: Option<String>,
}

/// Partial update of [`AboutContent`]; absent fields keep their value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AboutContentPatch {
    pub eyebrow: Option<String>,
    pub title: Option<String>,
    pub summary: Option<String>,
}

/// Body of `PUT /admin/content`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SiteContentPatch {
    #[serde(default)]
    pub home: HomeContentPatch,
    #[serde(default)]
    pub about: AboutContentPatch,
}

impl Default for HomeContent {
    fn default() -> Self {
        Self {
            hero_eyebrow: "WELCOME TO LAKESIDE FARMS".to_owned(),
            hero_title: "Cultivating Excellence in Sustainable Agriculture".to_owned(),
            hero_subtitle: "Nourishing Ghana's agricultural future with integrity and innovation. \
                We cultivate the land, care for livestock, and craft quality feed to support \
                thriving farms across the nation."
                .to_owned(),
            hero_cta: "Discover More".to_owned(),
        }
    }
}

impl Default for AboutContent {
    fn default() -> Self {
        Self {
            eyebrow: "WHY CHOOSE US".to_owned(),
            title: "Agri-business across crops, livestock, and poultry".to_owned(),
            summary: "We grow crops, rear livestock and poultry, and produce animal feed, \
                while supporting local supply through agricultural trade from our Accra base."
                .to_owned(),
        }
    }
}

impl HomeContent {
    /// Apply a patch, keeping fields the patch leaves out.
    #[must_use]
    pub fn merged(self, patch: HomeContentPatch) -> Self {
        Self {
            hero_eyebrow: patch.hero_eyebrow.unwrap_or(self.hero_eyebrow),
            hero_title: patch.hero_title.unwrap_or(self.hero_title),
            hero_subtitle: patch.hero_subtitle.unwrap_or(self.hero_subtitle),
            hero_cta: patch.hero_cta.unwrap_or(self.hero_cta),
        }
    }
}

impl AboutContent {
    /// Apply a patch, keeping fields the patch leaves out.
    #[must_use]
    pub fn merged(self, patch: AboutContentPatch) -> Self {
        Self {
            eyebrow: patch.eyebrow.unwrap_or(self.eyebrow),
            title: patch.title.unwrap_or(self.title),
            summary: patch.summary.unwrap_or(self.summary),
        }
    }
}
