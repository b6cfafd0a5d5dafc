use super::helpers::require_samples;
use super::{Channel, ChannelProcessor, MaterialContext};
use crate::common::constants::EV_TO_MEV;
use crate::domain::{ChannelRow, TableResult};
use crate::modules::serialization::format_plain_float;
use crate::numerics::{TargetGrid, pow10};
use crate::tables::ParticleDomain;

const EXCITATION_COLUMN: usize = 2;

/// Single-level electron excitation: total section and energy loss.
#[derive(Debug, Clone, Copy, Default)]
pub struct Excitation;

pub struct ExcitationColumns {
    cross_section: Vec<f64>,
    energy_loss: Vec<f64>,
}

impl ChannelProcessor for Excitation {
    type Prepared = ExcitationColumns;

    fn channel(&self) -> Channel {
        Channel::Excitation
    }

    fn prepare(&self, ctx: &MaterialContext<'_>) -> TableResult<ExcitationColumns> {
        let table = ctx.read_table(ParticleDomain::Electron, Channel::Excitation.key())?;
        let energy_loss: Vec<f64> = table
            .column(1)?
            .into_iter()
            .map(|value| pow10(value) * EV_TO_MEV)
            .collect();
        require_samples(&table, &energy_loss, ctx.sample_count())?;

        Ok(ExcitationColumns {
            cross_section: ctx.electron_cross_section(EXCITATION_COLUMN)?,
            energy_loss,
        })
    }

    fn transform_row(
        &self,
        ctx: &MaterialContext<'_>,
        prepared: &ExcitationColumns,
        index: usize,
        _grid: &TargetGrid,
    ) -> TableResult<Option<ChannelRow>> {
        Ok(Some(ChannelRow::scalar([
            ctx.energies_mev()[index],
            prepared.cross_section[index],
            prepared.energy_loss[index],
        ])))
    }

    fn header(
        &self,
        ctx: &MaterialContext<'_>,
        _prepared: &ExcitationColumns,
        _grid: &TargetGrid,
        row_count: usize,
    ) -> String {
        format!(
            "Возбуждение электронов в {material}\n\
             ТАБЛИЦА ПОЛНЫХ СЕЧЕНИЙ(1/СМ)\n\
             1\n\
             ЧИСЛО УРОВНЕЙ ЭНЕРГИИ ЭЛЕКТРОНА\n \
             1\n\
             \n\
             НОМЕР УРОВНЯ ЭНЕРГИИ\n \
             1\n\
             ЭНЕРГИЯ ВОЗБУЖДЕНИЯ(МэВ)\n\
             {min_energy}\n\
             Число строк данных\n \
             {row_count}\n\
             Энергия(МэВ) ПОЛНОЕ СЕЧЕНИЕ(1/СМ) Потеря энергии(МэВ) \n",
            material = ctx.material(),
            min_energy = format_plain_float(ctx.min_energy()),
        )
    }
}
