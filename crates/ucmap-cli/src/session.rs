//! The map session: owns the loaded data, the user's criteria and the
//! surface, and re-runs filter → sync whenever a control changes.

use ucmap_client::{BackendClient, ClientError};
use ucmap_core::view::{attach_overlay, MapSurface};
use ucmap_core::{
    filter_units, BoundaryOverlay, FilterCriteria, NetworkRegistry, SortMode, SurfaceOutcome,
    SyncReport, Unit, UnitCatalog, ViewSynchronizer,
};

pub const STATUS_LOADING: &str = "Carregando dados...";
pub const STATUS_FILTERING: &str = "Filtrando...";
pub const STATUS_UPDATED: &str = "Dados atualizados.";
pub const STATUS_LOADED: &str = "Dados carregados.";
pub const STATUS_LOAD_FAILED: &str = "Erro ao carregar dados.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Uninitialized,
    Loading,
    Ready,
    Filtering,
    Error,
}

/// A single user interaction with the filter panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Control {
    SetNetwork { name: String, checked: bool },
    SelectAllNetworks,
    SetState(String),
    SetTaxId(String),
    SetName(String),
    SetSort(SortMode),
    SetClustering(bool),
    ClearFilters,
}

pub struct SessionController<S> {
    state: SessionState,
    status: Option<&'static str>,
    catalog: UnitCatalog,
    registry: NetworkRegistry,
    criteria: FilterCriteria,
    synchronizer: ViewSynchronizer,
    surface: S,
    last_report: Option<SyncReport>,
}

impl<S: MapSurface> SessionController<S> {
    pub fn new(synchronizer: ViewSynchronizer, surface: S) -> Self {
        let registry = NetworkRegistry::default();
        Self {
            state: SessionState::Uninitialized,
            status: None,
            catalog: UnitCatalog::default(),
            criteria: FilterCriteria::defaults_for(&registry),
            registry,
            synchronizer,
            surface,
            last_report: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn status(&self) -> Option<&'static str> {
        self.status
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn registry(&self) -> &NetworkRegistry {
        &self.registry
    }

    pub fn catalog(&self) -> &UnitCatalog {
        &self.catalog
    }

    pub fn synchronizer(&self) -> &ViewSynchronizer {
        &self.synchronizer
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn last_report(&self) -> Option<&SyncReport> {
        self.last_report.as_ref()
    }

    /// The visible units for the current criteria, in display order.
    pub fn visible(&self) -> Vec<&Unit> {
        filter_units(&self.catalog, &self.criteria)
    }

    /// Fetches the catalog and the boundary overlay concurrently and applies
    /// both. Overlay failures are logged and do not affect the session state.
    pub async fn load(&mut self, client: &BackendClient, overlay_url: Option<&str>) {
        self.begin_load();
        let overlay = async {
            match overlay_url {
                Some(url) => Some(client.fetch_overlay(url).await),
                None => None,
            }
        };
        let (catalog, overlay) = tokio::join!(client.fetch_catalog(), overlay);

        self.finish_load(catalog);
        if let Some(overlay) = overlay {
            self.apply_overlay(overlay);
        }
    }

    pub fn begin_load(&mut self) {
        self.state = SessionState::Loading;
        self.status = Some(STATUS_LOADING);
    }

    /// Installs fetched data and renders the initial view, or moves to the
    /// error state with an empty surface.
    pub fn finish_load(
        &mut self,
        result: Result<(NetworkRegistry, UnitCatalog), ClientError>,
    ) -> Option<&SyncReport> {
        match result {
            Ok((registry, catalog)) => {
                self.criteria = FilterCriteria::defaults_for(&registry);
                self.registry = registry;
                self.catalog = catalog;
                self.render();
                self.state = SessionState::Ready;
                self.status = Some(STATUS_LOADED);
                tracing::info!(
                    units = self.catalog.len(),
                    networks = self.registry.len(),
                    "session ready"
                );
                self.last_report.as_ref()
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to load unit data");
                self.surface.clear_markers();
                self.last_report = None;
                self.state = SessionState::Error;
                self.status = Some(STATUS_LOAD_FAILED);
                None
            }
        }
    }

    pub fn apply_overlay(
        &mut self,
        overlay: Result<BoundaryOverlay, ClientError>,
    ) -> SurfaceOutcome {
        match overlay {
            Ok(overlay) => attach_overlay(&mut self.surface, overlay),
            Err(err) => {
                tracing::warn!(error = %err, "boundary overlay unavailable");
                SurfaceOutcome::Failed(err.to_string())
            }
        }
    }

    /// Applies one control and re-renders. Controls are ignored unless the
    /// session is ready.
    pub fn apply(&mut self, control: Control) -> Option<&SyncReport> {
        if self.state != SessionState::Ready {
            tracing::warn!(state = ?self.state, ?control, "ignoring control; session not ready");
            return None;
        }

        self.state = SessionState::Filtering;
        self.status = Some(STATUS_FILTERING);
        tracing::debug!(?control, "applying control");

        match control {
            Control::SetNetwork { name, checked } => self.criteria.set_network(&name, checked),
            Control::SelectAllNetworks => {
                self.criteria.selected_networks = self.registry.names().iter().cloned().collect();
            }
            Control::SetState(state) => self.criteria.state = state,
            Control::SetTaxId(tax_id) => self.criteria.tax_id_substring = tax_id,
            Control::SetName(name) => self.criteria.name_substring = name,
            Control::SetSort(mode) => self.criteria.sort_mode = mode,
            Control::SetClustering(enabled) => self.criteria.clustering_enabled = enabled,
            Control::ClearFilters => self.criteria.reset(&self.registry),
        }

        self.render();
        self.state = SessionState::Ready;
        self.status = Some(STATUS_UPDATED);
        self.last_report.as_ref()
    }

    fn render(&mut self) {
        let visible = filter_units(&self.catalog, &self.criteria);
        let report =
            self.synchronizer
                .sync(&mut self.surface, &visible, self.criteria.clustering_enabled);
        self.last_report = Some(report);
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
