use super::{Channel, ChannelProcessor, MaterialContext};
use crate::domain::{ChannelRow, TableResult};
use crate::numerics::{TargetGrid, positron_velocity};

/// Positron annihilation: inverse mean free time `sigma * v`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Annihilation;

/// `sigma * v(E)` per sample, `sigma` in 1/cm and energies in eV.
pub fn inverse_free_time(cross_sections: &[f64], energies_ev: &[f64]) -> Vec<f64> {
    cross_sections
        .iter()
        .zip(energies_ev)
        .map(|(section, energy)| section * positron_velocity(*energy))
        .collect()
}

impl ChannelProcessor for Annihilation {
    type Prepared = Vec<f64>;

    fn channel(&self) -> Channel {
        Channel::Annihilation
    }

    fn prepare(&self, ctx: &MaterialContext<'_>) -> TableResult<Vec<f64>> {
        let sections = ctx.electron_last_cross_section()?;
        Ok(inverse_free_time(&sections, ctx.energies_ev()))
    }

    fn transform_row(
        &self,
        ctx: &MaterialContext<'_>,
        prepared: &Vec<f64>,
        index: usize,
        _grid: &TargetGrid,
    ) -> TableResult<Option<ChannelRow>> {
        Ok(Some(ChannelRow::scalar([
            ctx.energies_mev()[index],
            prepared[index],
        ])))
    }

    fn header(
        &self,
        ctx: &MaterialContext<'_>,
        _prepared: &Vec<f64>,
        _grid: &TargetGrid,
        row_count: usize,
    ) -> String {
        format!(
            "{material} АННИГИЛЯЦИЯ\n\
             ТАБЛИЦА ОБРАТНОГО ВРЕМЕНИ ПРОБЕГА(1/С)\n\
             ЧИСЛО ЗНАЧЕНИЙ ЭНЕРГИИ ПОЗИТРОНА\n \
             {row_count}\n\
             \n\
             Энергия(МэВ) ОБРАТНОЕ ВРЕМЯ ПРОБЕГА(1/С) \n",
            material = ctx.material(),
        )
    }
}
