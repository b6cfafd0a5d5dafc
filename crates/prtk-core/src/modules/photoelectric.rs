use super::helpers::require_samples;
use super::{Channel, ChannelProcessor, MaterialContext};
use crate::common::constants::EV_TO_MEV;
use crate::domain::{ChannelRow, TableResult};
use crate::numerics::TargetGrid;
use crate::tables::ParticleDomain;

pub const BINDING_ENERGY_SUFFIX: &str = "eb";

/// Photoelectric effect: total section and binding energy, no resampling.
#[derive(Debug, Clone, Copy, Default)]
pub struct Photoelectric;

pub struct PhotoelectricColumns {
    cross_section: Vec<f64>,
    binding_energy: Vec<f64>,
}

impl ChannelProcessor for Photoelectric {
    type Prepared = PhotoelectricColumns;

    fn channel(&self) -> Channel {
        Channel::Photoelectric
    }

    fn prepare(&self, ctx: &MaterialContext<'_>) -> TableResult<PhotoelectricColumns> {
        let binding = ctx.read_table(ParticleDomain::Photon, BINDING_ENERGY_SUFFIX)?;
        let binding_energy: Vec<f64> = binding
            .last_column()?
            .into_iter()
            .map(|value| value * EV_TO_MEV)
            .collect();
        require_samples(&binding, &binding_energy, ctx.sample_count())?;

        let cross_section = ctx.photon_cross_section(None)?;
        if cross_section.len() < ctx.sample_count() {
            return Err(binding.malformed(format!(
                "photon cross sections cover {} of {} primary samples",
                cross_section.len(),
                ctx.sample_count()
            )));
        }

        Ok(PhotoelectricColumns {
            cross_section,
            binding_energy,
        })
    }

    fn transform_row(
        &self,
        ctx: &MaterialContext<'_>,
        prepared: &PhotoelectricColumns,
        index: usize,
        _grid: &TargetGrid,
    ) -> TableResult<Option<ChannelRow>> {
        Ok(Some(ChannelRow::scalar([
            ctx.energies_mev()[index],
            prepared.cross_section[index],
            prepared.binding_energy[index],
        ])))
    }

    fn header(
        &self,
        ctx: &MaterialContext<'_>,
        _prepared: &PhotoelectricColumns,
        _grid: &TargetGrid,
        row_count: usize,
    ) -> String {
        format!(
            "{material} ФОТО ЭФФЕКТ\n\
             ТАБЛИЦА ПОЛНЫХ СЕЧЕНИЙ(1/СМ)\n\
             ЧИСЛО ЗНАЧЕНИЙ ЭНЕРГИИ КВАНТА\n \
             {row_count}\n\
             \n\
             ЭНЕРГИЯ(МЭВ) ПОЛНОЕ СЕЧЕНИЕ(1/СМ) Энергия связи(MeV)\n",
            material = ctx.material(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::Photoelectric;
    use crate::domain::MaterialKey;
    use crate::domain::errors::MISSING_INPUT_TABLE;
    use crate::modules::context::fixtures::source_with_cross_sections;
    use crate::modules::{Channel, MaterialContext, build_table};
    use crate::numerics::TargetGrid;
    use crate::pipelines::RunLog;
    use crate::tables::TableLayout;
    use std::path::Path;

    #[test]
    fn photoelectric_rows_pass_through_last_columns() {
        let layout = TableLayout::new("/t");
        let source = source_with_cross_sections(Path::new("/t"), "iron")
            .with(
                "/t/mat-iron/photon/xtbl.23",
                vec![String::new(); 10],
                vec![vec![5.0, 0.0, 0.0, 0.0, 1.0], vec![6.0, 0.0, 0.0, 0.0, 2.0]],
            )
            .with(
                "/t/mat-iron/photon/xtbl.eb",
                vec![String::new(); 10],
                vec![vec![1.0, 7112.0], vec![2.0, 7112.0]],
            );
        let log = RunLog::detached();
        let ctx = MaterialContext::load(MaterialKey::new("iron", 7.8), &layout, &source, &log)
            .expect("context");

        let table = build_table(&Photoelectric, &ctx, &TargetGrid::default()).expect("table");
        assert_eq!(table.rows.len(), 2);
        assert!((table.rows[1].fields[1] - 780.0).abs() < 1.0e-9);
        assert!((table.rows[1].fields[2] - 7.112e-3).abs() < 1.0e-15);
        assert!(table.header.contains("КВАНТА\n 2\n\nЭНЕРГИЯ(МЭВ)"));
        assert_eq!(
            Channel::Photoelectric.layout().render_row(&table.rows[1]),
            " 1.0000E+00     7.8000E+02     7.1120E-03  \n"
        );
    }

    #[test]
    fn missing_binding_energy_table_fails_the_channel() {
        let layout = TableLayout::new("/t");
        let source = source_with_cross_sections(Path::new("/t"), "iron");
        let log = RunLog::detached();
        let ctx = MaterialContext::load(MaterialKey::new("iron", 7.8), &layout, &source, &log)
            .expect("context");

        let error = build_table(&Photoelectric, &ctx, &TargetGrid::default())
            .expect_err("binding energies are missing");
        assert_eq!(error.placeholder(), MISSING_INPUT_TABLE);
    }
}
