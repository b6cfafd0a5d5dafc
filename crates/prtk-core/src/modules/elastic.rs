//! Elastic electron scattering.
//!
//! The raw table holds `log10(1 + cos)` on a log-spaced grid of the
//! uniform variate. Rows are resampled on the target grid in log-log space,
//! converted back to cosines and written as scattering angles in [0, pi].

use super::helpers::{primary_rows, resample, secondary_grid_spec, zero_bootstrap_rows};
use super::{Channel, ChannelProcessor, MaterialContext};
use crate::common::constants::ELECTRON_MOLAR_MASS;
use crate::domain::{ChannelRow, TableResult};
use crate::modules::serialization::format_plain_float;
use crate::numerics::{TargetGrid, linear_grid, pow10};
use crate::tables::{ParticleDomain, RawTable};

const ELASTIC_COLUMN: usize = 0;
/// Cosine assigned to the raw column that is not resampled.
const FORWARD_COSINE: f64 = -1.0;

#[derive(Debug, Clone, Copy, Default)]
pub struct Elastic;

pub struct ElasticTable {
    raw: RawTable,
    axis: Vec<f64>,
    rows: Vec<Vec<f64>>,
    cross_section: Vec<f64>,
}

/// Fraction of the electron energy transferred to the nucleus, `2 m_e / A`.
pub fn transferred_fraction(atomic_mass: f64) -> f64 {
    2.0 * ELECTRON_MOLAR_MASS / atomic_mass
}

/// Turns a resampled cosine row (grid order) into emitted angles: reversed,
/// the last point extrapolated from the two before it and floored at -1,
/// the first forced to cosine 1, everything clamped to [-1, 1].
pub fn cosines_to_angles(mut cosines: Vec<f64>) -> Vec<f64> {
    cosines.reverse();
    let len = cosines.len();
    if len >= 3 {
        let extrapolated = cosines[len - 2] + (cosines[len - 2] - cosines[len - 3]);
        cosines[len - 1] = extrapolated.max(-1.0);
    }
    if let Some(first) = cosines.first_mut() {
        *first = 1.0;
    }
    cosines
        .into_iter()
        .map(|cosine| cosine.clamp(-1.0, 1.0).acos())
        .collect()
}

impl ChannelProcessor for Elastic {
    type Prepared = ElasticTable;

    fn channel(&self) -> Channel {
        Channel::Elastic
    }

    fn prepare(&self, ctx: &MaterialContext<'_>) -> TableResult<ElasticTable> {
        let raw = ctx.read_table(ParticleDomain::Electron, Channel::Elastic.key())?;
        let (bound, count) = secondary_grid_spec(&raw)?;
        let axis = linear_grid(bound, 0.0, count - 1)
            .ok_or_else(|| raw.malformed("secondary grid has too few points"))?;
        let rows = primary_rows(&raw, ctx.sample_count())?;

        Ok(ElasticTable {
            cross_section: ctx.electron_cross_section(ELASTIC_COLUMN)?,
            raw,
            axis,
            rows,
        })
    }

    fn bootstrap_rows(
        &self,
        ctx: &MaterialContext<'_>,
        _prepared: &ElasticTable,
        grid: &TargetGrid,
    ) -> Vec<ChannelRow> {
        zero_bootstrap_rows(2, ctx.min_energy(), grid)
    }

    fn transform_row(
        &self,
        ctx: &MaterialContext<'_>,
        prepared: &ElasticTable,
        index: usize,
        grid: &TargetGrid,
    ) -> TableResult<Option<ChannelRow>> {
        let row = &prepared.rows[index];
        let resampled = resample(&prepared.raw, &grid.log10_interior(), &prepared.axis, &row[1..])?;

        let mut cosines = Vec::with_capacity(grid.len());
        cosines.push(FORWARD_COSINE);
        cosines.extend(resampled.into_iter().map(|value| pow10(value) - 1.0));

        Ok(Some(ChannelRow::with_distribution(
            [ctx.energies_mev()[index], prepared.cross_section[index]],
            cosines_to_angles(cosines),
        )))
    }

    fn header(
        &self,
        ctx: &MaterialContext<'_>,
        _prepared: &ElasticTable,
        grid: &TargetGrid,
        row_count: usize,
    ) -> String {
        format!(
            "{material} УПРУГОЕ РАССЕЯНИЕ\n\
             ТАБЛИЦА ПОЛНЫХ СЕЧЕНИЙ(1/СМ), УГОЛ ВЫЛЕТПЮЩНГО ЭЛЕКТРОНА\n\
             ЧИСЛО ЗНАЧЕНИЙ ЭНЕРГИИ ЭЛЕКТРОНА\n \
             {row_count}\n\
             РАЗМЕРНОСТЬ ПО ВТОРОМУ АРГУМЕНТУ\n \
             {points}\n\
             ПЕРЕДАВАЕМАЯ ДОЛЯ ЭНЕРГИИ ЭЛЕКТРОНА\n\
             {fraction}\n\
             \n\
             ЭНЕРГИЯ(МэВ) ПОЛНОЕ СЕЧЕНИЕ(1/СМ) ЭНЕРГИЯ(МЭВ) КВАНТА - ФУНКЦИЯ РАВНОМЕРНО РАСПРЕДЕЛЕННОЙ НА [0,1] СЛУЧ ВЕЛИЧИНЫ\n",
            material = ctx.material(),
            points = grid.len(),
            fraction = format_plain_float(transferred_fraction(ctx.atomic_mass())),
        )
    }
}
