use super::helpers::{primary_rows, resample, zero_bootstrap_rows};
use super::{Channel, ChannelProcessor, MaterialContext};
use crate::common::constants::EV_TO_MEV;
use crate::domain::{ChannelRow, TableResult};
use crate::numerics::{TargetGrid, linear_grid, pow10};
use crate::tables::{ParticleDomain, RawTable};

const BREMSSTRAHLUNG_COLUMN: usize = 1;

/// Bremsstrahlung photon spectrum: `log10` photon energies on a uniform
/// variate grid, resampled linearly and emitted in reverse grid order.
#[derive(Debug, Clone, Copy, Default)]
pub struct Bremsstrahlung;

pub struct BremsstrahlungTable {
    raw: RawTable,
    axis: Vec<f64>,
    rows: Vec<Vec<f64>>,
    cross_section: Vec<f64>,
}

impl ChannelProcessor for Bremsstrahlung {
    type Prepared = BremsstrahlungTable;

    fn channel(&self) -> Channel {
        Channel::Bremsstrahlung
    }

    fn prepare(&self, ctx: &MaterialContext<'_>) -> TableResult<BremsstrahlungTable> {
        let raw = ctx.read_table(ParticleDomain::Electron, Channel::Bremsstrahlung.key())?;
        let axis = linear_grid(0.0, 1.0, raw.row_count())
            .ok_or_else(|| raw.malformed("photon energy grid needs at least 2 points"))?;
        let rows = primary_rows(&raw, ctx.sample_count())?;

        Ok(BremsstrahlungTable {
            cross_section: ctx.electron_cross_section(BREMSSTRAHLUNG_COLUMN)?,
            raw,
            axis,
            rows,
        })
    }

    fn bootstrap_rows(
        &self,
        ctx: &MaterialContext<'_>,
        _prepared: &BremsstrahlungTable,
        grid: &TargetGrid,
    ) -> Vec<ChannelRow> {
        zero_bootstrap_rows(2, ctx.min_energy(), grid)
    }

    fn transform_row(
        &self,
        ctx: &MaterialContext<'_>,
        prepared: &BremsstrahlungTable,
        index: usize,
        grid: &TargetGrid,
    ) -> TableResult<Option<ChannelRow>> {
        let resampled = resample(
            &prepared.raw,
            grid.points(),
            &prepared.axis,
            &prepared.rows[index],
        )?;
        let mut energies: Vec<f64> = resampled
            .into_iter()
            .rev()
            .map(|value| pow10(value) * EV_TO_MEV)
            .collect();
        if let Some(first) = energies.first_mut() {
            *first = 0.0;
        }

        Ok(Some(ChannelRow::with_distribution(
            [ctx.energies_mev()[index], prepared.cross_section[index]],
            energies,
        )))
    }

    fn header(
        &self,
        ctx: &MaterialContext<'_>,
        _prepared: &BremsstrahlungTable,
        grid: &TargetGrid,
        row_count: usize,
    ) -> String {
        format!(
            "{material} РАДИАЦИОННОЕ РАССЕЯНИЕ\n\
             ТАБЛИЦА ПОЛНЫХ СЕЧЕНИЙ(1/СМ), ЭНЕРГИЙ ВЫЛЕТАЮЩЕГО КВАНТА(МЭВ)\n\
             ЧИСЛО ЗНАЧЕНИЙ ЭНЕРГИИ ЭЛЕКТРОНА\n \
             {row_count}\n\
             РАЗМЕРНОСТЬ ПО ВТОРОМУ АРГУМЕНТУ\n \
             {points}\n\
             \n\
             ЭНЕРГИЯ(МэВ) ПОЛНОЕ СЕЧЕНИЕ(1/СМ) ЭНЕРГИЯ(МЭВ) КВАНТА - ФУНКЦИЯ РАВНОМЕРНО РАСПРЕДЕЛЕННОЙ НА [0,1] СЛУЧ ВЕЛИЧИНЫ\n",
            material = ctx.material(),
            points = grid.len(),
        )
    }
}
