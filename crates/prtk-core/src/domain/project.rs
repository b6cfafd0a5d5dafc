//! Pre-parsed project description consumed by the material pipeline.
//!
//! The layer/material/part-list readers of the transport project live
//! outside this crate; they hand over their result as a JSON document with
//! the shape below.

use super::{LayerAttributes, MaterialGroup, MaterialKey};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_GRID_POINTS: usize = 201;
pub const DEFAULT_HEADER_LINES: usize = 10;

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ProjectDescription {
    #[serde(rename = "tablesRoot")]
    pub tables_root: PathBuf,
    #[serde(rename = "outputDir")]
    pub output_dir: PathBuf,
    #[serde(rename = "referenceDir", default)]
    pub reference_dir: Option<PathBuf>,
    #[serde(rename = "protonDir", default)]
    pub proton_dir: Option<PathBuf>,
    #[serde(rename = "gridPoints", default = "default_grid_points")]
    pub grid_points: usize,
    #[serde(rename = "headerLines", default = "default_header_lines")]
    pub header_lines: usize,
    #[serde(default)]
    pub groups: Vec<GroupDescription>,
    #[serde(default)]
    pub layers: Vec<LayerDescription>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct GroupDescription {
    pub material: String,
    pub density: f64,
    #[serde(default)]
    pub layers: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LayerDescription {
    pub index: u32,
    #[serde(default)]
    pub conductivity: i32,
    #[serde(default)]
    pub activity: BTreeMap<String, bool>,
}

fn default_grid_points() -> usize {
    DEFAULT_GRID_POINTS
}

fn default_header_lines() -> usize {
    DEFAULT_HEADER_LINES
}

impl ProjectDescription {
    pub fn new(tables_root: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            tables_root: tables_root.into(),
            output_dir: output_dir.into(),
            reference_dir: None,
            proton_dir: None,
            grid_points: DEFAULT_GRID_POINTS,
            header_lines: DEFAULT_HEADER_LINES,
            groups: Vec::new(),
            layers: Vec::new(),
        }
    }

    pub fn material_groups(&self) -> Vec<MaterialGroup> {
        self.groups
            .iter()
            .map(|group| {
                MaterialGroup::new(
                    MaterialKey::new(group.material.clone(), group.density),
                    group.layers.iter().copied(),
                )
            })
            .collect()
    }

    pub fn layer_attributes(&self) -> Vec<LayerAttributes> {
        self.layers
            .iter()
            .map(|layer| LayerAttributes {
                index: layer.index,
                conductivity: layer.conductivity,
                activity: layer.activity.clone(),
            })
            .collect()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ProjectLoadError {
    #[error("failed to read project description '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse project description '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

pub fn load_project_description(
    path: impl AsRef<Path>,
) -> Result<ProjectDescription, ProjectLoadError> {
    let path = path.as_ref();
    let source = fs::read_to_string(path).map_err(|source| ProjectLoadError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&source).map_err(|source| ProjectLoadError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
