use super::helpers::require_samples;
use super::{Channel, ChannelProcessor, MaterialContext};
use crate::common::constants::EV_TO_MEV;
use crate::domain::{ChannelRow, TableResult};
use crate::modules::serialization::format_plain_float;
use crate::numerics::{TargetGrid, pow10};
use crate::tables::{ParticleDomain, ReferenceDataProvider};

/// Electron stopping power (`xtbl.xer`): total over every process column and
/// either the total without the last column or a reference curve.
pub struct StoppingPower<'a> {
    reference: &'a dyn ReferenceDataProvider,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoppingColumns {
    pub total: Vec<f64>,
    pub secondary: Vec<f64>,
}

impl<'a> StoppingPower<'a> {
    pub fn new(reference: &'a dyn ReferenceDataProvider) -> Self {
        Self { reference }
    }
}

impl ChannelProcessor for StoppingPower<'_> {
    type Prepared = StoppingColumns;

    fn channel(&self) -> Channel {
        Channel::StoppingPower
    }

    fn prepare(&self, ctx: &MaterialContext<'_>) -> TableResult<StoppingColumns> {
        let table = ctx.read_table(ParticleDomain::Electron, Channel::StoppingPower.key())?;
        if table.column_count() < 2 {
            return Err(table.malformed("stopping table needs an energy and a process column"));
        }

        let mut total = Vec::with_capacity(table.row_count());
        let mut without_last = Vec::with_capacity(table.row_count());
        for row in &table.rows {
            let powers: Vec<f64> = row[1..]
                .iter()
                .map(|value| ctx.density() * pow10(*value) * EV_TO_MEV)
                .collect();
            let sum: f64 = powers.iter().sum();
            let last = powers.last().copied().unwrap_or(0.0);
            total.push(sum);
            without_last.push(sum - last);
        }
        require_samples(&table, &total, ctx.sample_count())?;

        match self.reference.stopping_reference(&ctx.key)? {
            Some(curve) => {
                tracing::info!(
                    material = ctx.material(),
                    points = curve.len(),
                    "stopping power uses reference curve"
                );
                Ok(StoppingColumns {
                    total,
                    secondary: curve,
                })
            }
            None => Ok(StoppingColumns {
                total,
                secondary: without_last,
            }),
        }
    }

    fn sample_count(&self, ctx: &MaterialContext<'_>, prepared: &StoppingColumns) -> usize {
        ctx.sample_count().min(prepared.secondary.len())
    }

    fn transform_row(
        &self,
        ctx: &MaterialContext<'_>,
        prepared: &StoppingColumns,
        index: usize,
        _grid: &TargetGrid,
    ) -> TableResult<Option<ChannelRow>> {
        Ok(Some(ChannelRow::scalar([
            ctx.energies_mev()[index],
            prepared.total[index],
            prepared.secondary[index],
        ])))
    }

    fn header(
        &self,
        ctx: &MaterialContext<'_>,
        _prepared: &StoppingColumns,
        _grid: &TargetGrid,
        row_count: usize,
    ) -> String {
        format!(
            "Сила торможения электронов в {material} ro = {density}\n\
             Число строк данных\n \
             {row_count}\n\
             \n\
             Энергия(МэВ) Торм полн(МэВ/см) Торм в ионизированном воздухе(МэВ/см)\n",
            material = ctx.material(),
            density = format_plain_float(ctx.density()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::StoppingPower;
    use crate::domain::{MaterialKey, TableResult};
    use crate::modules::context::fixtures::source_with_cross_sections;
    use crate::modules::{Channel, MaterialContext, build_table};
    use crate::numerics::TargetGrid;
    use crate::pipelines::RunLog;
    use crate::tables::{CompanionFile, NoReferenceData, ReferenceDataProvider, TableLayout};
    use std::path::Path;

    struct FixedReference;

    impl ReferenceDataProvider for FixedReference {
        fn stopping_reference(&self, _material: &MaterialKey) -> TableResult<Option<Vec<f64>>> {
            Ok(Some(vec![7.0, 8.0]))
        }

        fn companion_files(&self, _material: &str, _channel: Channel) -> Vec<CompanionFile> {
            Vec::new()
        }
    }

    fn staged_source() -> crate::modules::context::fixtures::MemorySource {
        source_with_cross_sections(Path::new("/t"), "air").with(
            "/t/mat-air/electron/xtbl.xer",
            vec![String::new(); 10],
            vec![vec![5.0, 6.0, 7.0], vec![6.0, 7.0, 6.0]],
        )
    }

    #[test]
    fn total_and_reduced_stopping_are_density_scaled() {
        let layout = TableLayout::new("/t");
        let source = staged_source();
        let log = RunLog::detached();
        let ctx = MaterialContext::load(MaterialKey::new("air", 2.0), &layout, &source, &log)
            .expect("context");

        let table = build_table(&StoppingPower::new(&NoReferenceData), &ctx, &TargetGrid::default())
            .expect("table");
        assert_eq!(table.rows.len(), 2);
        let first = &table.rows[0].fields;
        assert!((first[1] - 22.0).abs() < 1.0e-9);
        assert!((first[2] - 2.0).abs() < 1.0e-9);
        let second = &table.rows[1].fields;
        assert!((second[1] - 22.0).abs() < 1.0e-9);
        assert!((second[2] - 20.0).abs() < 1.0e-9);
        assert!(
            table
                .header
                .starts_with("Сила торможения электронов в air ro = 2.0\nЧисло строк данных\n 2\n\n")
        );
    }

    #[test]
    fn reference_curve_replaces_reduced_column() {
        let layout = TableLayout::new("/t");
        let source = staged_source();
        let log = RunLog::detached();
        let ctx = MaterialContext::load(MaterialKey::new("air", 2.0), &layout, &source, &log)
            .expect("context");

        let table = build_table(&StoppingPower::new(&FixedReference), &ctx, &TargetGrid::default())
            .expect("table");
        assert_eq!(table.rows[0].fields[2], 7.0);
        assert_eq!(table.rows[1].fields[2], 8.0);
    }
}
