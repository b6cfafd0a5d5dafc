//! Electron-positron pair production.
//!
//! Only photon energies at or above the `2 m_e c^2` threshold produce rows.
//! A single boundary row at the threshold itself opens the table. The last
//! grid point of every row must not exceed the kinetic energy available,
//! `E - threshold`; a row that does is clamped and the correction is
//! recorded in the run log.

use super::helpers::{primary_rows, resample, secondary_grid_spec};
use super::{Channel, ChannelProcessor, MaterialContext};
use crate::common::constants::{EV_TO_MEV, pair_threshold_mev};
use crate::domain::{ChannelRow, TableResult};
use crate::modules::serialization::format_plain_float;
use crate::numerics::{TargetGrid, linear_grid, pow10};
use crate::tables::{ParticleDomain, RawTable};

const PAIR_COLUMN: usize = 3;
/// Resampled energies below this are written as zero.
pub const NEGLIGIBLE_ENERGY_MEV: f64 = 1.0e-16;

#[derive(Debug, Clone, Copy, Default)]
pub struct PairProduction;

pub struct PairTable {
    raw: RawTable,
    axis: Vec<f64>,
    rows: Vec<Vec<f64>>,
    cross_section: Vec<f64>,
    threshold: f64,
}

/// Outcome of the end-point check of one row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EndPointCheck {
    pub margin: f64,
    pub original: f64,
    pub corrected: Option<f64>,
}

/// Clamps the last cell to `energy - threshold` when it overshoots.
pub fn enforce_end_point(distribution: &mut [f64], energy: f64, threshold: f64) -> EndPointCheck {
    let available = energy - threshold;
    let original = distribution.last().copied().unwrap_or(0.0);
    let margin = available - original;
    let corrected = if margin < 0.0 {
        if let Some(last) = distribution.last_mut() {
            *last = available;
        }
        Some(available)
    } else {
        None
    };
    EndPointCheck {
        margin,
        original,
        corrected,
    }
}

impl ChannelProcessor for PairProduction {
    type Prepared = PairTable;

    fn channel(&self) -> Channel {
        Channel::PairProduction
    }

    fn prepare(&self, ctx: &MaterialContext<'_>) -> TableResult<PairTable> {
        let raw = ctx.read_table(ParticleDomain::Photon, Channel::PairProduction.key())?;
        let (bound, count) = secondary_grid_spec(&raw)?;
        let axis = linear_grid(bound, 0.0, count - 1)
            .ok_or_else(|| raw.malformed("secondary grid has too few points"))?;
        let rows = primary_rows(&raw, ctx.sample_count())?;
        let cross_section = ctx.photon_cross_section(Some(PAIR_COLUMN))?;
        if cross_section.len() < ctx.sample_count() {
            return Err(raw.malformed(format!(
                "photon cross sections cover {} of {} primary samples",
                cross_section.len(),
                ctx.sample_count()
            )));
        }

        Ok(PairTable {
            raw,
            axis,
            rows,
            cross_section,
            threshold: pair_threshold_mev(),
        })
    }

    fn bootstrap_rows(
        &self,
        _ctx: &MaterialContext<'_>,
        prepared: &PairTable,
        grid: &TargetGrid,
    ) -> Vec<ChannelRow> {
        vec![ChannelRow::bootstrap([prepared.threshold, 0.0], grid.zeros())]
    }

    fn transform_row(
        &self,
        ctx: &MaterialContext<'_>,
        prepared: &PairTable,
        index: usize,
        grid: &TargetGrid,
    ) -> TableResult<Option<ChannelRow>> {
        let energy = ctx.energies_mev()[index];
        if energy < prepared.threshold {
            tracing::debug!(
                material = ctx.material(),
                channel = Channel::PairProduction.stem(),
                energy_mev = energy,
                "below pair threshold; sample skipped"
            );
            return Ok(None);
        }

        let row = &prepared.rows[index];
        let resampled = resample(&prepared.raw, &grid.log10_interior(), &prepared.axis, &row[1..])?;
        let mut distribution = Vec::with_capacity(grid.len());
        distribution.push(0.0);
        distribution.extend(resampled.into_iter().map(|value| pow10(value) * EV_TO_MEV));
        for value in &mut distribution {
            if *value < NEGLIGIBLE_ENERGY_MEV {
                *value = 0.0;
            }
        }

        let check = enforce_end_point(&mut distribution, energy, prepared.threshold);
        let log = ctx.run_log();
        log.line(format!(
            "E = {}: Delta ={}\n",
            format_plain_float(energy),
            format_plain_float(check.margin)
        ));
        if let Some(corrected) = check.corrected {
            log.correction(format!("Vend = {} ", format_plain_float(check.original)));
            log.correction(format!("Change on Vend = {}\n", format_plain_float(corrected)));
        }

        Ok(Some(ChannelRow::with_distribution(
            [energy, prepared.cross_section[index]],
            distribution,
        )))
    }

    fn header(
        &self,
        ctx: &MaterialContext<'_>,
        _prepared: &PairTable,
        grid: &TargetGrid,
        row_count: usize,
    ) -> String {
        format!(
            "{material}  ОБРАЗОВАНИЕ ПАР\n\
             ТАБЛИЦА ПОЛНЫХ СЕЧЕНИЙ(1/СМ), ЭНЕРГИЙ ВЫЛЕТАЮЩЕГО ЭЛЕКТРОНА(МЭВ)\n\
             ЧИСЛО ЗНАЧЕНИЙ ЭНЕРГИИ КВАНТА\n \
             {row_count}\n\
             РАЗМЕРНОСТЬ ПО ВТОРОМУ АРГУМЕНТУ\n \
             {points}\n\
             \n\
             ЭНЕРГИЯ(МэВ) ПОЛНОЕ СЕЧЕНИЕ(1/СМ) ЭНЕРГИЯ(МЭВ) ЭЛЕКТРОНА - ФУНКЦИЯ РАВНОМЕРНО РАСПРЕДЕЛЕННОЙ НА [0,1] СЛУЧ ВЕЛИЧИНЫ\n",
            material = ctx.material(),
            points = grid.len(),
        )
    }
}
