use serde::{Deserialize, Serialize};

use super::records::{non_empty, Record};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Certificate {
    pub name: String,
    pub issuer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Certificate {
    pub fn new(name: &str, issuer: &str) -> Self {
        Certificate {
            name: name.to_string(),
            issuer: issuer.to_string(),
            image: None,
            description: None,
        }
    }
}

impl Record for Certificate {
    const KIND: &'static str = "certificate";

    fn validate(&mut self) -> Result<(), String> {
        self.name = self.name.trim().to_string();
        if self.name.is_empty() {
            return Err("certificate name is empty".to_string());
        }
        self.issuer = self.issuer.trim().to_string();
        self.image = non_empty(self.image.take());
        self.description = non_empty(self.description.take());
        Ok(())
    }
}
