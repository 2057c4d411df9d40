//! Domain model and client-side pipeline for the unit map.
//!
//! The crate is split leaf-first: [`normalize`] and [`unit`] hold the record
//! shapes, [`criteria`] and [`filter`] derive the visible subset, and
//! [`view`] reconciles that subset against a [`view::MapSurface`].

pub mod app_config;
pub mod catalog;
pub mod config;
pub mod criteria;
pub mod error;
pub mod filter;
pub mod normalize;
pub mod overlay;
pub mod palette;
pub mod shell;
pub mod unit;
pub mod view;

pub use app_config::{AppConfig, Environment};
pub use catalog::UnitCatalog;
pub use config::{load_app_config, load_app_config_from_env};
pub use criteria::{FilterCriteria, SortMode, ALL_STATES};
pub use error::{ConfigError, CoreError};
pub use filter::{filter_units, filter_units_owned};
pub use normalize::{collate, normalize};
pub use overlay::{BoundaryOverlay, OverlayFeature, OverlayStyle};
pub use palette::{load_palette, NetworkRegistry, Palette};
pub use unit::Unit;
pub use view::{
    Bounds, LayerMode, MapSurface, Marker, MarkerLayer, SurfaceError, SurfaceOutcome, SyncReport,
    ViewSynchronizer,
};
