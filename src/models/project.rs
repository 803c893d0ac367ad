use log::warn;
use serde::{Deserialize, Serialize};
use url::Url;

use super::records::{non_empty, Record};

/// A portfolio project. The model repository link is accepted under both
/// `huggingface` and `hugging_face`; the first non-empty one is kept.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(from = "RawProject")]
pub struct Project {
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub github: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub huggingface: Option<String>,
}

#[derive(Deserialize)]
struct RawProject {
    title: String,
    description: String,
    #[serde(default)]
    image: Option<String>,
    #[serde(default)]
    github: Option<String>,
    #[serde(default)]
    huggingface: Option<String>,
    #[serde(default)]
    hugging_face: Option<String>,
}

impl From<RawProject> for Project {
    fn from(raw: RawProject) -> Self {
        Project {
            title: raw.title,
            description: raw.description,
            image: raw.image,
            github: raw.github,
            huggingface: non_empty(raw.huggingface).or_else(|| non_empty(raw.hugging_face)),
        }
    }
}

/// The single outbound action a project card offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectLink {
    Source,
    Model,
}

impl Project {
    pub fn new(title: &str, description: &str) -> Self {
        Project {
            title: title.to_string(),
            description: description.to_string(),
            image: None,
            github: None,
            huggingface: None,
        }
    }

    /// Source repository wins over model repository; neither means no button.
    pub fn primary_link(&self) -> Option<(ProjectLink, &str)> {
        if let Some(url) = self.github.as_deref() {
            return Some((ProjectLink::Source, url));
        }
        self.huggingface.as_deref().map(|url| (ProjectLink::Model, url))
    }
}

fn outbound_url(field: &str, title: &str, value: Option<String>) -> Option<String> {
    let value = non_empty(value)?;
    match Url::parse(&value) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => Some(value),
        _ => {
            warn!("Dropping invalid {} link '{}' on project '{}'", field, value, title);
            None
        }
    }
}

impl Record for Project {
    const KIND: &'static str = "project";

    fn validate(&mut self) -> Result<(), String> {
        self.title = self.title.trim().to_string();
        if self.title.is_empty() {
            return Err("project title is empty".to_string());
        }
        self.image = non_empty(self.image.take());
        self.github = outbound_url("github", &self.title, self.github.take());
        self.huggingface = outbound_url("huggingface", &self.title, self.huggingface.take());
        Ok(())
    }
}
