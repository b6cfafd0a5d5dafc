//! Electron impact ionization.
//!
//! The raw energy-transfer table is stored as `log10` eV on a log-spaced
//! variate grid. Rows are resampled linearly on the target grid, the last
//! point zeroed, and the first point replaced by `(E - E_bind) / 2` before
//! the row is written in reverse grid order.

use super::helpers::{
    primary_rows, require_samples, resample, secondary_grid_spec, zero_bootstrap_rows,
};
use super::{Channel, ChannelProcessor, MaterialContext};
use crate::common::constants::EV_TO_MEV;
use crate::domain::{ChannelRow, TableResult};
use crate::modules::serialization::format_plain_float;
use crate::numerics::{TargetGrid, log_spaced, pow10};
use crate::tables::{ParticleDomain, RawTable};

const IONIZATION_COLUMN: usize = 3;
pub const BINDING_ENERGY_SUFFIX: &str = "eb";
pub const MEAN_ENERGY_SUFFIX: &str = "awe";

#[derive(Debug, Clone, Copy, Default)]
pub struct Ionization;

pub struct IonizationTable {
    raw: RawTable,
    axis: Vec<f64>,
    /// Transfer energies in eV, one row per primary energy.
    rows: Vec<Vec<f64>>,
    cross_section: Vec<f64>,
    binding_energy: Vec<f64>,
    mean_energy: Vec<f64>,
}

/// Symmetric transfer `(E - E_bind) / 2` written at the top of the grid.
pub fn symmetric_transfer(energy: f64, binding_energy: f64) -> f64 {
    (energy - binding_energy) / 2.0
}

impl ChannelProcessor for Ionization {
    type Prepared = IonizationTable;

    fn channel(&self) -> Channel {
        Channel::Ionization
    }

    fn prepare(&self, ctx: &MaterialContext<'_>) -> TableResult<IonizationTable> {
        let binding = ctx.read_table(ParticleDomain::Electron, BINDING_ENERGY_SUFFIX)?;
        let binding_energy: Vec<f64> = binding
            .last_column()?
            .into_iter()
            .map(|value| value * EV_TO_MEV)
            .collect();

        let mean = ctx.read_table(ParticleDomain::Electron, MEAN_ENERGY_SUFFIX)?;
        let mean_energy: Vec<f64> = mean
            .column(1)?
            .into_iter()
            .map(|value| pow10(value) * EV_TO_MEV)
            .collect();

        let raw = ctx.read_table(ParticleDomain::Electron, Channel::Ionization.key())?;
        let (bound, count) = secondary_grid_spec(&raw)?;
        let axis = log_spaced(bound, 0.0, count - 1)
            .ok_or_else(|| raw.malformed("secondary grid has too few points"))?;
        let rows: Vec<Vec<f64>> = primary_rows(&raw, 0)?
            .into_iter()
            .map(|row| row.into_iter().map(pow10).collect())
            .collect();

        let samples = rows.len().min(ctx.sample_count());
        require_samples(&binding, &binding_energy, samples)?;
        require_samples(&mean, &mean_energy, samples)?;

        Ok(IonizationTable {
            cross_section: ctx.electron_cross_section(IONIZATION_COLUMN)?,
            raw,
            axis,
            rows,
            binding_energy,
            mean_energy,
        })
    }

    fn bootstrap_rows(
        &self,
        ctx: &MaterialContext<'_>,
        _prepared: &IonizationTable,
        grid: &TargetGrid,
    ) -> Vec<ChannelRow> {
        zero_bootstrap_rows(3, ctx.min_energy(), grid)
    }

    /// One row per primary energy of the raw transfer table.
    fn sample_count(&self, ctx: &MaterialContext<'_>, prepared: &IonizationTable) -> usize {
        prepared.rows.len().min(ctx.sample_count())
    }

    fn transform_row(
        &self,
        ctx: &MaterialContext<'_>,
        prepared: &IonizationTable,
        index: usize,
        grid: &TargetGrid,
    ) -> TableResult<Option<ChannelRow>> {
        let energy = ctx.energies_mev()[index];
        let row = &prepared.rows[index];
        let resampled = resample(&prepared.raw, grid.interior(), &prepared.axis, &row[1..])?;

        let mut transfers = Vec::with_capacity(grid.len());
        transfers.push(symmetric_transfer(energy, prepared.binding_energy[index]));
        transfers.extend(resampled.into_iter().map(|value| value * EV_TO_MEV));
        if let Some(last) = transfers.last_mut() {
            *last = 0.0;
        }
        transfers.reverse();

        Ok(Some(ChannelRow::with_distribution(
            [
                energy,
                prepared.cross_section[index],
                prepared.mean_energy[index],
            ],
            transfers,
        )))
    }

    fn header(
        &self,
        ctx: &MaterialContext<'_>,
        _prepared: &IonizationTable,
        grid: &TargetGrid,
        row_count: usize,
    ) -> String {
        format!(
            "{material} ИОНИЗАЦИЯ\n\
             ТАБЛИЦА ПОЛНЫХ СЕЧЕНИЙ(1/СМ), ЭНЕРГИЙ ВЫЛЕТАЮЩЕГО ЭЛЕКТРОНА(МЭВ)\n\
             1\n\
             ЧИСЛО УРОВНЕЙ ЭНЕРГИИ ЭЛЕКТРОНА\n\
             1\n\
             РАЗМЕРНОСТЬ ПО ВТОРОМУ АРГУМЕНТУ\n \
             {points}\n\
             \n\
             НОМЕР УРОВНЯ ЭНЕРГИИ\n\
             1\n\
             ПЕРЕДАВАЕМАЯ ЭНЕРГИЯ\n\
             {min_energy}\n\
             ЧИСЛО ЗНАЧЕНИЙ ЭНЕРГИИ ЭЛЕКТРОНА\n \
             {row_count}\n\
             ЭНЕРГИЯ(МэВ) ПОЛНОЕ СЕЧЕНИЕ(1/СМ)  СРЕДНЯЯ ЭНЕРГИЯ(МэВ)  ЭНЕРГИЯ(МэВ) ЭЛЕКТРОНА - ФУНКЦИЯ РАВНОМЕРНО РАСПРЕДЕЛЕННОЙ НА [0,1] СЛУЧ ВЕЛИЧИНЫ\n",
            material = ctx.material(),
            points = grid.len(),
            min_energy = format_plain_float(ctx.min_energy()),
        )
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::with_ionization_tables;
    use super::{Ionization, symmetric_transfer};
    use crate::domain::MaterialKey;
    use crate::modules::context::fixtures::source_with_cross_sections;
    use crate::modules::{Channel, MaterialContext, build_table};
    use crate::numerics::TargetGrid;
    use crate::pipelines::RunLog;
    use crate::tables::TableLayout;
    use std::path::Path;

    fn staged() -> crate::modules::context::fixtures::MemorySource {
        let root = Path::new("/t");
        with_ionization_tables(source_with_cross_sections(root, "air"), root, "air")
    }

    #[test]
    fn header_counts_raw_samples_plus_two() {
        let layout = TableLayout::new("/t");
        let source = staged();
        let log = RunLog::detached();
        let ctx = MaterialContext::load(MaterialKey::new("air", 0.00123), &layout, &source, &log)
            .expect("context");
        let grid = TargetGrid::new(5).expect("grid");

        let table = build_table(&Ionization, &ctx, &grid).expect("table");
        assert_eq!(table.rows.len(), 4);
        assert!(table.header.contains("ЭЛЕКТРОНА\n 4\nЭНЕРГИЯ(МэВ)"));
        assert!(table.header.contains("РАЗМЕРНОСТЬ ПО ВТОРОМУ АРГУМЕНТУ\n 5\n\n"));

        for row in &table.rows[..2] {
            assert_eq!(row.fields.len(), 3);
            assert_eq!(row.fields[1..], [0.0, 0.0]);
            assert!(row.distribution.iter().flatten().all(|value| *value == 0.0));
        }
        assert_eq!(table.rows[0].fields[0], 0.0);
    }

    #[test]
    fn transfers_are_reversed_with_symmetric_end() {
        let layout = TableLayout::new("/t");
        let source = staged();
        let log = RunLog::detached();
        let ctx = MaterialContext::load(MaterialKey::new("air", 0.00123), &layout, &source, &log)
            .expect("context");
        let grid = TargetGrid::new(5).expect("grid");

        let table = build_table(&Ionization, &ctx, &grid).expect("table");
        let row = &table.rows[3];
        let energy = ctx.energies_mev()[1];
        assert!((row.fields[2] - 1.0e-2).abs() < 1.0e-12);

        let transfers = row.distribution.as_ref().expect("distribution");
        assert_eq!(transfers.len(), 5);
        assert_eq!(transfers[0], 0.0);
        assert_eq!(transfers[4], symmetric_transfer(energy, 20.0e-6));
        // Grid point 0.75 lies between the axis points 0.01 and 1 (10^2, 10^4 eV).
        let expected_ev = 100.0 + (0.75 - 0.01) / 0.99 * (1.0e4 - 100.0);
        assert!((transfers[1] - expected_ev * 1.0e-6).abs() < 1.0e-9);

        let rendered = Channel::Ionization.layout().render_row(row);
        assert!(rendered.starts_with(" 1.000000E+00       "));
        assert!(rendered.ends_with(" 4.99990E-01\n"));
    }
}
