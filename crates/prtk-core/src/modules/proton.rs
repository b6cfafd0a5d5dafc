use super::{Channel, ChannelProcessor, MaterialContext};
use crate::domain::{ChannelRow, TableResult};
use crate::numerics::TargetGrid;
use crate::tables::{TableSource, TextTableReader};
use std::path::{Path, PathBuf};

pub const PROTON_TABLE_EXTENSION: &str = "stp";

/// Energy (MeV) and mass stopping power pairs for one material.
pub trait ProtonStoppingProvider {
    fn stopping_pairs(&self, material: &str) -> TableResult<Vec<(f64, f64)>>;
}

/// Reads `<dir>/<material>.stp`: two whitespace-separated columns, no header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileProtonStopping {
    dir: PathBuf,
}

impl FileProtonStopping {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn table_path(&self, material: &str) -> PathBuf {
        self.dir
            .join(format!("{}.{}", material, PROTON_TABLE_EXTENSION))
    }
}

impl ProtonStoppingProvider for FileProtonStopping {
    fn stopping_pairs(&self, material: &str) -> TableResult<Vec<(f64, f64)>> {
        let table = TextTableReader::new(0).read(&self.table_path(material))?;
        if table.column_count() != 2 {
            return Err(table.malformed(format!(
                "expected energy and stopping columns, found {}",
                table.column_count()
            )));
        }
        Ok(table.rows.iter().map(|row| (row[0], row[1])).collect())
    }
}

/// Proton stopping power scaled by the material density.
pub struct ProtonStopping<'a> {
    provider: &'a dyn ProtonStoppingProvider,
}

impl<'a> ProtonStopping<'a> {
    pub fn new(provider: &'a dyn ProtonStoppingProvider) -> Self {
        Self { provider }
    }
}

impl ChannelProcessor for ProtonStopping<'_> {
    type Prepared = Vec<(f64, f64)>;

    fn channel(&self) -> Channel {
        Channel::ProtonStopping
    }

    fn prepare(&self, ctx: &MaterialContext<'_>) -> TableResult<Vec<(f64, f64)>> {
        self.provider.stopping_pairs(ctx.material())
    }

    fn sample_count(&self, _ctx: &MaterialContext<'_>, prepared: &Vec<(f64, f64)>) -> usize {
        prepared.len()
    }

    fn transform_row(
        &self,
        ctx: &MaterialContext<'_>,
        prepared: &Vec<(f64, f64)>,
        index: usize,
        _grid: &TargetGrid,
    ) -> TableResult<Option<ChannelRow>> {
        let (energy, stopping) = prepared[index];
        Ok(Some(ChannelRow::scalar([energy, stopping * ctx.density()])))
    }

    fn header(
        &self,
        ctx: &MaterialContext<'_>,
        _prepared: &Vec<(f64, f64)>,
        _grid: &TargetGrid,
        row_count: usize,
    ) -> String {
        format!(
            "{material} ТОРМОЗНАЯ СПОСОБНОСТЬ ПРОТОНОВ(МЭВ/СМ)\n {row_count}\n",
            material = ctx.material(),
        )
    }
}
