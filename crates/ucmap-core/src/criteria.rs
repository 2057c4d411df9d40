use std::collections::HashSet;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::palette::NetworkRegistry;
use crate::CoreError;

/// State selector value meaning "no state filter".
pub const ALL_STATES: &str = "Todos";

/// Sort key and direction for the visible list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortMode {
    #[default]
    #[serde(rename = "nome_az")]
    NameAsc,
    #[serde(rename = "nome_za")]
    NameDesc,
    #[serde(rename = "rede_az")]
    NetworkAsc,
    #[serde(rename = "rede_za")]
    NetworkDesc,
}

impl SortMode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SortMode::NameAsc => "nome_az",
            SortMode::NameDesc => "nome_za",
            SortMode::NetworkAsc => "rede_az",
            SortMode::NetworkDesc => "rede_za",
        }
    }
}

impl std::fmt::Display for SortMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortMode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "nome_az" => Ok(SortMode::NameAsc),
            "nome_za" => Ok(SortMode::NameDesc),
            "rede_az" => Ok(SortMode::NetworkAsc),
            "rede_za" => Ok(SortMode::NetworkDesc),
            other => Err(CoreError::UnknownSortMode(other.to_string())),
        }
    }
}

/// The user's current filter, sort and display selections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterCriteria {
    pub selected_networks: HashSet<String>,
    pub state: String,
    pub tax_id_substring: String,
    pub name_substring: String,
    pub sort_mode: SortMode,
    pub clustering_enabled: bool,
}

impl FilterCriteria {
    /// Defaults: every registry network checked, all states, no text
    /// filters, name ascending, clustering on.
    #[must_use]
    pub fn defaults_for(registry: &NetworkRegistry) -> Self {
        Self {
            selected_networks: registry.names().iter().cloned().collect(),
            state: ALL_STATES.to_string(),
            tax_id_substring: String::new(),
            name_substring: String::new(),
            sort_mode: SortMode::default(),
            clustering_enabled: true,
        }
    }

    pub fn reset(&mut self, registry: &NetworkRegistry) {
        *self = Self::defaults_for(registry);
    }

    pub fn set_network(&mut self, network: &str, checked: bool) {
        if checked {
            self.selected_networks.insert(network.to_string());
        } else {
            self.selected_networks.remove(network);
        }
    }

    /// The state to filter on, or `None` when every state is shown.
    #[must_use]
    pub fn state_filter(&self) -> Option<&str> {
        let state = self.state.trim();
        (!state.is_empty() && state != ALL_STATES).then_some(state)
    }

    #[must_use]
    pub fn tax_id_filter(&self) -> Option<&str> {
        let value = self.tax_id_substring.trim();
        (!value.is_empty()).then_some(value)
    }

    #[must_use]
    pub fn name_filter(&self) -> Option<&str> {
        let value = self.name_substring.trim();
        (!value.is_empty()).then_some(value)
    }
}
