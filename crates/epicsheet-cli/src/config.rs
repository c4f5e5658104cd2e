//! Profile configuration.
//!
//! One YAML file describes the Jira instance and any number of search
//! profiles. A profile bundles the JQL query with the component sections the
//! report should be grouped into:
//!
//! ```yaml
//! instance:
//!   url: https://issues.example.com
//! profiles:
//!   - id: platform
//!     jql: 'project = ABC AND type = Epic ORDER BY key ASC'
//!     components:
//!       include: [Installer, Docs]
//!       exclude: [Sandbox]
//! ```

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub instance: Instance,
    #[serde(default)]
    pub profiles: Vec<Profile>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Instance {
    pub url: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Profile {
    pub id: String,
    pub jql: String,
    #[serde(default)]
    pub components: ComponentSelection,
}

/// Components to report on. `include` orders the sections; `exclude` drops
/// whole sections at render time.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ComponentSelection {
    #[serde(default)]
    pub include: Vec<String>,
    #[serde(default)]
    pub exclude: Vec<String>,
}

impl Config {
    pub fn load(path: &Path) -> Result<Config> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read configuration file {}", path.display()))?;
        serde_yaml::from_str(&raw)
            .with_context(|| format!("failed to parse configuration file {}", path.display()))
    }

    pub fn find_profile(&self, id: &str) -> Option<&Profile> {
        self.profiles.iter().find(|p| p.id == id)
    }
}
