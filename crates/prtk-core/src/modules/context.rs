use crate::domain::{MaterialKey, TableError, TableResult};
use crate::numerics::{ev_to_mev, pow10};
use crate::pipelines::RunLog;
use crate::tables::{ParticleDomain, RawTable, TableLayout, TableSource};

/// Electron cross-section table of one material.
pub const CROSS_SECTION_SUFFIX: &str = "23p";
/// Photon cross-section table of one material.
pub const PHOTON_CROSS_SECTION_SUFFIX: &str = "23";
const ATOMIC_MASS_LINE: usize = 7;
const ATOMIC_MASS_TOKEN: usize = 1;

/// Per-material state shared read-only by every channel of one group.
pub struct MaterialContext<'a> {
    pub key: MaterialKey,
    layout: &'a TableLayout,
    source: &'a dyn TableSource,
    run_log: &'a RunLog,
    energies_ev: Vec<f64>,
    energies_mev: Vec<f64>,
    /// `density * 10^x` per process, energy column stripped.
    electron_cross_sections: Vec<Vec<f64>>,
    atomic_mass: f64,
}

impl<'a> MaterialContext<'a> {
    /// Reads `electron/xtbl.23p` and derives the primary energy grid.
    pub fn load(
        key: MaterialKey,
        layout: &'a TableLayout,
        source: &'a dyn TableSource,
        run_log: &'a RunLog,
    ) -> TableResult<Self> {
        let path = layout.table_path(&key.name, ParticleDomain::Electron, CROSS_SECTION_SUFFIX);
        let table = source.read(&path)?;
        if table.column_count() < 2 {
            return Err(table.malformed("cross-section table needs an energy and a process column"));
        }
        let atomic_mass = table.header_f64(ATOMIC_MASS_LINE, ATOMIC_MASS_TOKEN)?;

        let energies_ev: Vec<f64> = table.rows.iter().map(|row| pow10(row[0])).collect();
        let energies_mev = energies_ev.iter().copied().map(ev_to_mev).collect();
        let electron_cross_sections = scaled_cross_sections(&table, key.density);

        Ok(Self {
            key,
            layout,
            source,
            run_log,
            energies_ev,
            energies_mev,
            electron_cross_sections,
            atomic_mass,
        })
    }

    pub fn material(&self) -> &str {
        &self.key.name
    }

    pub fn density(&self) -> f64 {
        self.key.density
    }

    pub fn atomic_mass(&self) -> f64 {
        self.atomic_mass
    }

    pub fn energies_ev(&self) -> &[f64] {
        &self.energies_ev
    }

    pub fn energies_mev(&self) -> &[f64] {
        &self.energies_mev
    }

    pub fn sample_count(&self) -> usize {
        self.energies_mev.len()
    }

    /// Lowest primary energy in MeV.
    pub fn min_energy(&self) -> f64 {
        self.energies_mev.first().copied().unwrap_or(0.0)
    }

    pub fn run_log(&self) -> &RunLog {
        self.run_log
    }

    pub fn read_table(&self, domain: ParticleDomain, suffix: &str) -> TableResult<RawTable> {
        let path = self.layout.table_path(&self.key.name, domain, suffix);
        self.source.read(&path)
    }

    /// Electron cross section of process `column` (0 = elastic,
    /// 1 = bremsstrahlung, 2 = excitation, 3 = ionization).
    pub fn electron_cross_section(&self, column: usize) -> TableResult<Vec<f64>> {
        select_column(&self.electron_cross_sections, column, || {
            self.layout
                .table_path(&self.key.name, ParticleDomain::Electron, CROSS_SECTION_SUFFIX)
        })
    }

    pub fn electron_last_cross_section(&self) -> TableResult<Vec<f64>> {
        let last = self
            .electron_cross_sections
            .first()
            .map_or(0, Vec::len)
            .saturating_sub(1);
        self.electron_cross_section(last)
    }

    /// `density * 10^x` of `photon/xtbl.23`, energy column stripped.
    pub fn photon_cross_sections(&self) -> TableResult<Vec<Vec<f64>>> {
        let table = self.read_table(ParticleDomain::Photon, PHOTON_CROSS_SECTION_SUFFIX)?;
        if table.column_count() < 2 {
            return Err(table.malformed("cross-section table needs an energy and a process column"));
        }
        Ok(scaled_cross_sections(&table, self.key.density))
    }

    /// Photon cross section of process `column` (2 = Compton, 3 = pair
    /// production); `None` selects the last (photoelectric) column.
    pub fn photon_cross_section(&self, column: Option<usize>) -> TableResult<Vec<f64>> {
        let sections = self.photon_cross_sections()?;
        let column =
            column.unwrap_or_else(|| sections.first().map_or(0, Vec::len).saturating_sub(1));
        select_column(&sections, column, || {
            self.layout
                .table_path(&self.key.name, ParticleDomain::Photon, PHOTON_CROSS_SECTION_SUFFIX)
        })
    }
}

fn scaled_cross_sections(table: &RawTable, density: f64) -> Vec<Vec<f64>> {
    table
        .rows
        .iter()
        .map(|row| row[1..].iter().map(|value| density * pow10(*value)).collect())
        .collect()
}

fn select_column(
    sections: &[Vec<f64>],
    column: usize,
    path: impl FnOnce() -> std::path::PathBuf,
) -> TableResult<Vec<f64>> {
    let available = sections.first().map_or(0, Vec::len);
    if column >= available {
        return Err(TableError::malformed_input_table(
            &path(),
            format!(
                "process column {} requested but only {} are present",
                column, available
            ),
        ));
    }
    Ok(sections.iter().map(|row| row[column]).collect())
}
