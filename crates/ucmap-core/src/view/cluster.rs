//! Grid clustering for surfaces that render the clustered layer themselves.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use super::marker::Marker;

/// Cluster radius in screen pixels, matching the usual marker-cluster default.
const CLUSTER_RADIUS_PX: f64 = 80.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cluster {
    pub center: (f64, f64),
    /// Indices into the marker slice, in input order.
    pub members: Vec<usize>,
}

impl Cluster {
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Groups markers into square cells roughly `CLUSTER_RADIUS_PX` wide at
/// `zoom`, then folds each cell into an adjacent cluster whose centroid lies
/// within one cell width, so neighbours straddling a cell edge still merge.
/// Clusters come out in (row, column) order of their first cell.
#[must_use]
pub fn cluster_markers(markers: &[Marker], zoom: u8) -> Vec<Cluster> {
    let cell_deg = CLUSTER_RADIUS_PX * 360.0 / (256.0 * f64::from(1u32 << zoom.min(24)));

    let mut cells: BTreeMap<(i64, i64), Vec<usize>> = BTreeMap::new();
    for (idx, marker) in markers.iter().enumerate() {
        #[allow(clippy::cast_possible_truncation)]
        let key = (
            (marker.latitude / cell_deg).floor() as i64,
            (marker.longitude / cell_deg).floor() as i64,
        );
        cells.entry(key).or_default().push(idx);
    }

    let mut groups: Vec<Group> = Vec::new();
    let mut owner: HashMap<(i64, i64), usize> = HashMap::new();
    for (key, members) in cells {
        let cell = Group::from_members(markers, members);
        let (lat, lon) = cell.center();
        let target = neighbours(key)
            .filter_map(|k| owner.get(&k).copied())
            .find(|&g| {
                let (glat, glon) = groups[g].center();
                (glat - lat).hypot(glon - lon) < cell_deg
            });
        match target {
            Some(g) => {
                groups[g].absorb(cell);
                owner.insert(key, g);
            }
            None => {
                owner.insert(key, groups.len());
                groups.push(cell);
            }
        }
    }

    groups
        .into_iter()
        .map(|mut g| {
            g.members.sort_unstable();
            Cluster {
                center: g.center(),
                members: g.members,
            }
        })
        .collect()
}

struct Group {
    members: Vec<usize>,
    lat_sum: f64,
    lon_sum: f64,
}

impl Group {
    fn from_members(markers: &[Marker], members: Vec<usize>) -> Self {
        let (lat_sum, lon_sum) = members.iter().fold((0.0, 0.0), |(la, lo), &i| {
            (la + markers[i].latitude, lo + markers[i].longitude)
        });
        Self {
            members,
            lat_sum,
            lon_sum,
        }
    }

    fn center(&self) -> (f64, f64) {
        #[allow(clippy::cast_precision_loss)]
        let n = self.members.len() as f64;
        (self.lat_sum / n, self.lon_sum / n)
    }

    fn absorb(&mut self, other: Group) {
        self.members.extend(other.members);
        self.lat_sum += other.lat_sum;
        self.lon_sum += other.lon_sum;
    }
}

fn neighbours((row, col): (i64, i64)) -> impl Iterator<Item = (i64, i64)> {
    (-1..=1).flat_map(move |dr| (-1..=1).map(move |dc| (row + dr, col + dc)))
}
