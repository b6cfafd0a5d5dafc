pub mod errors;
pub mod project;

pub use errors::{TableError, TableErrorCategory, TableResult};
pub use project::{
    GroupDescription, LayerDescription, ProjectDescription, ProjectLoadError,
    load_project_description,
};

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{Display, Formatter};

/// Conductivity class that forces every channel on for a layer.
pub const OVERRIDE_CONDUCTIVITY_CLASS: i32 = 6;

#[derive(Debug, Clone, PartialEq)]
pub struct MaterialKey {
    pub name: String,
    pub density: f64,
}

impl MaterialKey {
    pub fn new(name: impl Into<String>, density: f64) -> Self {
        Self {
            name: name.into(),
            density,
        }
    }
}

impl Display for MaterialKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (density {})", self.name, self.density)
    }
}

/// Layers sharing one (material, density) pair. Output tables depend only on
/// the key, so every layer in the group receives identical files.
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialGroup {
    pub key: MaterialKey,
    layers: Vec<u32>,
}

impl MaterialGroup {
    pub fn new(key: MaterialKey, layers: impl IntoIterator<Item = u32>) -> Self {
        let mut ordered = Vec::new();
        for layer in layers {
            if !ordered.contains(&layer) {
                ordered.push(layer);
            }
        }
        Self {
            key,
            layers: ordered,
        }
    }

    pub fn layers(&self) -> &[u32] {
        &self.layers
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LayerAttributes {
    pub index: u32,
    pub conductivity: i32,
    pub activity: BTreeMap<String, bool>,
}

impl LayerAttributes {
    pub fn new(index: u32, conductivity: i32) -> Self {
        Self {
            index,
            conductivity,
            activity: BTreeMap::new(),
        }
    }

    pub fn with_active(mut self, stem: impl Into<String>) -> Self {
        self.activity.insert(stem.into(), true);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ActivityMap {
    needed: BTreeSet<String>,
    conductivity_override: bool,
}

impl ActivityMap {
    pub fn new(needed: impl IntoIterator<Item = String>, conductivity_override: bool) -> Self {
        Self {
            needed: needed.into_iter().collect(),
            conductivity_override,
        }
    }

    /// Union of the activity of every layer in `group`. Layers without
    /// attributes contribute nothing.
    pub fn for_group(group: &MaterialGroup, layers: &[LayerAttributes]) -> Self {
        let mut needed = BTreeSet::new();
        let mut conductivity_override = false;

        for attributes in layers
            .iter()
            .filter(|attributes| group.layers().contains(&attributes.index))
        {
            if attributes.conductivity == OVERRIDE_CONDUCTIVITY_CLASS {
                conductivity_override = true;
            }
            needed.extend(
                attributes
                    .activity
                    .iter()
                    .filter(|(_, active)| **active)
                    .map(|(stem, _)| stem.clone()),
            );
        }

        Self {
            needed,
            conductivity_override,
        }
    }

    pub fn conductivity_override(&self) -> bool {
        self.conductivity_override
    }

    pub fn is_active(&self, stem: &str) -> bool {
        self.conductivity_override || self.needed.contains(stem)
    }
}

/// One output row: the leading scalar fields and, for 2-D channels, the
/// distribution resampled on the target grid.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelRow {
    pub fields: Vec<f64>,
    pub distribution: Option<Vec<f64>>,
    /// Leading rows synthesised for the simulator rather than computed.
    pub synthetic: bool,
}

impl ChannelRow {
    pub fn scalar(fields: impl Into<Vec<f64>>) -> Self {
        Self {
            fields: fields.into(),
            distribution: None,
            synthetic: false,
        }
    }

    pub fn with_distribution(fields: impl Into<Vec<f64>>, distribution: Vec<f64>) -> Self {
        Self {
            fields: fields.into(),
            distribution: Some(distribution),
            synthetic: false,
        }
    }

    pub fn bootstrap(fields: impl Into<Vec<f64>>, distribution: Vec<f64>) -> Self {
        Self {
            fields: fields.into(),
            distribution: Some(distribution),
            synthetic: true,
        }
    }

    pub fn energy(&self) -> f64 {
        self.fields.first().copied().unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChannelTable {
    pub header: String,
    pub rows: Vec<ChannelRow>,
}
