use super::helpers::{primary_rows, resample, zero_bootstrap_rows};
use super::{Channel, ChannelProcessor, MaterialContext};
use crate::common::constants::EV_TO_MEV;
use crate::domain::{ChannelRow, TableResult};
use crate::numerics::{TargetGrid, linear_grid};
use crate::tables::{ParticleDomain, RawTable};

const COMPTON_COLUMN: usize = 2;

/// Compton scattering: scattered photon energy (eV) on a uniform variate
/// grid, resampled linearly in grid order.
#[derive(Debug, Clone, Copy, Default)]
pub struct Compton;

pub struct ComptonTable {
    raw: RawTable,
    axis: Vec<f64>,
    rows: Vec<Vec<f64>>,
    cross_section: Vec<f64>,
}

impl ChannelProcessor for Compton {
    type Prepared = ComptonTable;

    fn channel(&self) -> Channel {
        Channel::Compton
    }

    fn prepare(&self, ctx: &MaterialContext<'_>) -> TableResult<ComptonTable> {
        let raw = ctx.read_table(ParticleDomain::Photon, Channel::Compton.key())?;
        let axis = linear_grid(0.0, 1.0, raw.row_count())
            .ok_or_else(|| raw.malformed("photon energy grid needs at least 2 points"))?;
        let rows = primary_rows(&raw, ctx.sample_count())?;
        let cross_section = ctx.photon_cross_section(Some(COMPTON_COLUMN))?;
        if cross_section.len() < ctx.sample_count() {
            return Err(raw.malformed(format!(
                "photon cross sections cover {} of {} primary samples",
                cross_section.len(),
                ctx.sample_count()
            )));
        }

        Ok(ComptonTable {
            raw,
            axis,
            rows,
            cross_section,
        })
    }

    fn bootstrap_rows(
        &self,
        ctx: &MaterialContext<'_>,
        _prepared: &ComptonTable,
        grid: &TargetGrid,
    ) -> Vec<ChannelRow> {
        zero_bootstrap_rows(2, ctx.min_energy(), grid)
    }

    fn transform_row(
        &self,
        ctx: &MaterialContext<'_>,
        prepared: &ComptonTable,
        index: usize,
        grid: &TargetGrid,
    ) -> TableResult<Option<ChannelRow>> {
        let energies = resample(
            &prepared.raw,
            grid.points(),
            &prepared.axis,
            &prepared.rows[index],
        )?
        .into_iter()
        .map(|value| value * EV_TO_MEV)
        .collect();

        Ok(Some(ChannelRow::with_distribution(
            [ctx.energies_mev()[index], prepared.cross_section[index]],
            energies,
        )))
    }

    fn header(
        &self,
        ctx: &MaterialContext<'_>,
        _prepared: &ComptonTable,
        grid: &TargetGrid,
        row_count: usize,
    ) -> String {
        format!(
            "{material} КОМПТОН ЭФФЕКТ\n\
             ТАБЛИЦА ПОЛНЫХ СЕЧЕНИЙ(1/СМ), ЭНЕРГИЙ ВЫЛЕТАЮЩЕГО КВАНТА(МЭВ)\n\
             ЧИСЛО ЗНАЧЕНИЙ ЭНЕРГИИ КВАНТА\n \
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
