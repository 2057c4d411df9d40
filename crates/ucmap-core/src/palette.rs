//! Network registry and the static network → marker color mapping.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

pub const DEFAULT_COLOR: &str = "#2ca02c";

const BUILTIN_COLORS: [(&str, &str); 3] = [
    ("Novo Mix", "#1f77b4"),
    ("Hiperideal", "#ff7f0e"),
    ("Rede Mix", "#9467bd"),
];

/// Distinct network names as returned by `GET /unidades/redes`.
///
/// Order is the backend's and is what the legend and checkbox list show.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NetworkRegistry {
    names: Vec<String>,
}

impl NetworkRegistry {
    /// Builds the registry, dropping repeated names but otherwise keeping
    /// the given order. Blank names are kept: units carrying them must stay
    /// selectable.
    #[must_use]
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = HashSet::new();
        let names = names
            .into_iter()
            .map(Into::into)
            .filter(|n: &String| seen.insert(n.clone()))
            .collect();
        Self { names }
    }

    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Maps a network name to its marker color.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    colors: HashMap<String, String>,
    default_color: String,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            colors: BUILTIN_COLORS
                .iter()
                .map(|(name, color)| ((*name).to_string(), (*color).to_string()))
                .collect(),
            default_color: DEFAULT_COLOR.to_string(),
        }
    }
}

impl Palette {
    /// Color for `network`, falling back to the default for unknown or
    /// absent networks.
    #[must_use]
    pub fn color_for(&self, network: Option<&str>) -> &str {
        network
            .and_then(|n| self.colors.get(n))
            .map_or(self.default_color.as_str(), String::as_str)
    }

    #[must_use]
    pub fn default_color(&self) -> &str {
        &self.default_color
    }

    /// Legend rows in registry order.
    #[must_use]
    pub fn legend<'a>(&'a self, registry: &'a NetworkRegistry) -> Vec<(&'a str, &'a str)> {
        registry
            .names()
            .iter()
            .map(|name| (name.as_str(), self.color_for(Some(name))))
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaletteEntry {
    pub name: String,
    pub color: String,
}

#[derive(Debug, Deserialize)]
pub struct PaletteFile {
    #[serde(default = "default_color_string")]
    pub default: String,
    #[serde(default)]
    pub networks: Vec<PaletteEntry>,
}

fn default_color_string() -> String {
    DEFAULT_COLOR.to_string()
}

/// Load and validate a palette override from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_palette(path: &Path) -> Result<Palette, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::PaletteFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let file: PaletteFile = serde_yaml::from_str(&content)?;
    validate_palette(&file)?;

    Ok(Palette {
        colors: file
            .networks
            .into_iter()
            .map(|entry| (entry.name, entry.color))
            .collect(),
        default_color: file.default,
    })
}

fn validate_palette(file: &PaletteFile) -> Result<(), ConfigError> {
    if !is_hex_color(&file.default) {
        return Err(ConfigError::Validation(format!(
            "default color '{}' is not a #rrggbb value",
            file.default
        )));
    }

    let mut seen_names = HashSet::new();
    for entry in &file.networks {
        if entry.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "network name must be non-empty".to_string(),
            ));
        }
        if !is_hex_color(&entry.color) {
            return Err(ConfigError::Validation(format!(
                "network '{}' has invalid color '{}'; expected #rrggbb",
                entry.name, entry.color
            )));
        }
        if !seen_names.insert(entry.name.as_str()) {
            return Err(ConfigError::Validation(format!(
                "duplicate network name: '{}'",
                entry.name
            )));
        }
    }

    Ok(())
}

fn is_hex_color(s: &str) -> bool {
    s.len() == 7
        && s.starts_with('#')
        && s[1..].chars().all(|c| c.is_ascii_hexdigit())
}
