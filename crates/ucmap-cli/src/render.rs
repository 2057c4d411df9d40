//! Output formats for the session snapshot.

use clap::ValueEnum;
use serde::Serialize;
use geojson::{Feature, FeatureCollection, Geometry, JsonObject};
use serde_json::json;
use ucmap_core::view::{Cluster, LayerMode, Marker, Viewport};
use ucmap_core::{NetworkRegistry, Palette, SyncReport, Unit};

use crate::session::SessionController;
use crate::surface::SnapshotSurface;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Geojson,
}

/// Serializable view of the session after a sync.
#[derive(Debug, Serialize)]
pub struct Snapshot<'a> {
    pub status: Option<&'static str>,
    pub report: Option<&'a SyncReport>,
    pub viewport: Viewport,
    pub legend: Vec<LegendEntry<'a>>,
    pub units: Vec<&'a Unit>,
    pub markers: &'a [Marker],
    pub clusters: Vec<Cluster>,
    pub overlay_features: usize,
}

#[derive(Debug, Serialize)]
pub struct LegendEntry<'a> {
    pub network: &'a str,
    pub color: &'a str,
}

pub fn legend<'a>(palette: &'a Palette, registry: &'a NetworkRegistry) -> Vec<LegendEntry<'a>> {
    palette
        .legend(registry)
        .into_iter()
        .map(|(network, color)| LegendEntry { network, color })
        .collect()
}

pub fn snapshot(session: &SessionController<SnapshotSurface>) -> Snapshot<'_> {
    let surface = session.surface();
    Snapshot {
        status: session.status(),
        report: session.last_report(),
        viewport: surface.viewport(),
        legend: legend(session.synchronizer().palette(), session.registry()),
        units: session.visible(),
        markers: &surface.layer().markers,
        clusters: surface.clusters(),
        overlay_features: surface.overlay().map_or(0, |o| o.len()),
    }
}

pub fn render(
    session: &SessionController<SnapshotSurface>,
    format: OutputFormat,
) -> anyhow::Result<String> {
    match format {
        OutputFormat::Text => Ok(render_text(session)),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&snapshot(session))?),
        OutputFormat::Geojson => Ok(serde_json::to_string_pretty(&render_geojson(
            session.surface(),
        ))?),
    }
}

/// One line per visible unit, preceded by the status line and the sync
/// summary.
pub fn render_text(session: &SessionController<SnapshotSurface>) -> String {
    let mut lines: Vec<String> = Vec::new();
    lines.extend(session.status().map(str::to_string));
    lines.extend(session.last_report().map(summary_line));

    let visible = session.visible();
    if !visible.is_empty() {
        lines.push(String::new());
        lines.push(format!(
            "{:<36}{:<14}{:<8}{:<20}ADDRESS",
            "NAME", "NETWORK", "UF", "CNPJ"
        ));
        lines.extend(visible.into_iter().map(unit_row));
    }

    let mut out = lines.join("\n");
    if !out.is_empty() {
        out.push('\n');
    }
    out
}

fn unit_row(unit: &Unit) -> String {
    format!(
        "{:<36}{:<14}{:<8}{:<20}{}{}",
        truncate(unit.name.as_deref().unwrap_or("\u{2014}"), 34),
        unit.network.as_deref().unwrap_or("\u{2014}"),
        unit.state.as_deref().unwrap_or("\u{2014}"),
        unit.tax_id.as_deref().unwrap_or("\u{2014}"),
        unit.original_address.as_deref().unwrap_or("\u{2014}"),
        if unit.is_mappable() { "" } else { "  (sem coordenadas)" },
    )
}

pub fn summary_line(report: &SyncReport) -> String {
    let mode = match report.mode {
        LayerMode::Clustered => "clustered",
        LayerMode::Individual => "individual",
    };
    let mut line = format!(
        "{} visible, {} on map ({mode}), {} without coordinates",
        report.visible, report.rendered, report.skipped_unmappable
    );
    if report.layer.is_failed() {
        line.push_str(&format!("; marker layer failed: {:?}", report.layer));
    }
    if report.viewport.is_failed() {
        line.push_str(&format!("; viewport unchanged: {:?}", report.viewport));
    }
    line
}

/// The markers as a GeoJSON `FeatureCollection`, popup fields and color in
/// `properties`.
pub fn render_geojson(surface: &SnapshotSurface) -> FeatureCollection {
    FeatureCollection {
        bbox: None,
        features: surface.layer().markers.iter().map(marker_feature).collect(),
        foreign_members: None,
    }
}

fn marker_feature(marker: &Marker) -> Feature {
    let mut properties = JsonObject::new();
    properties.insert("nome".to_string(), json!(marker.popup.title));
    properties.insert("rede".to_string(), json!(marker.popup.network));
    properties.insert("endereco".to_string(), json!(marker.popup.address));
    properties.insert("cnpj".to_string(), json!(marker.popup.tax_id));
    properties.insert("marker-color".to_string(), json!(marker.color));

    Feature {
        bbox: None,
        geometry: Some(Geometry::new(geojson::Value::Point(vec![
            marker.longitude,
            marker.latitude,
        ]))),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}

fn truncate(value: &str, max_chars: usize) -> String {
    if value.chars().count() > max_chars {
        format!("{}...", value.chars().take(max_chars - 3).collect::<String>())
    } else {
        value.to_string()
    }
}
