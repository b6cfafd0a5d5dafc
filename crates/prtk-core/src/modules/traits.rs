use super::{Channel, MaterialContext};
use crate::domain::{ChannelRow, ChannelTable, TableResult};
use crate::numerics::TargetGrid;

pub trait ChannelProcessor {
    /// Raw tables and derived columns loaded once per material.
    type Prepared;

    fn channel(&self) -> Channel;

    fn prepare(&self, ctx: &MaterialContext<'_>) -> TableResult<Self::Prepared>;

    /// Synthetic rows emitted ahead of the computed ones.
    fn bootstrap_rows(
        &self,
        _ctx: &MaterialContext<'_>,
        _prepared: &Self::Prepared,
        _grid: &TargetGrid,
    ) -> Vec<ChannelRow> {
        Vec::new()
    }

    /// Number of primary samples `transform_row` is called for.
    fn sample_count(&self, ctx: &MaterialContext<'_>, _prepared: &Self::Prepared) -> usize {
        ctx.sample_count()
    }

    /// Row for primary sample `index`, or `None` when the sample is skipped.
    fn transform_row(
        &self,
        ctx: &MaterialContext<'_>,
        prepared: &Self::Prepared,
        index: usize,
        grid: &TargetGrid,
    ) -> TableResult<Option<ChannelRow>>;

    fn header(
        &self,
        ctx: &MaterialContext<'_>,
        prepared: &Self::Prepared,
        grid: &TargetGrid,
        row_count: usize,
    ) -> String;
}

/// Runs a processor over every primary sample. The header is rendered last
/// so its row count always matches the rows actually emitted.
pub fn build_table<P>(
    processor: &P,
    ctx: &MaterialContext<'_>,
    grid: &TargetGrid,
) -> TableResult<ChannelTable>
where
    P: ChannelProcessor + ?Sized,
{
    let prepared = processor.prepare(ctx)?;
    let mut rows = processor.bootstrap_rows(ctx, &prepared, grid);
    for index in 0..processor.sample_count(ctx, &prepared) {
        if let Some(row) = processor.transform_row(ctx, &prepared, index, grid)? {
            rows.push(row);
        }
    }

    let header = processor.header(ctx, &prepared, grid, rows.len());
    tracing::debug!(
        channel = processor.channel().stem(),
        material = ctx.material(),
        rows = rows.len(),
        "channel table built"
    );
    Ok(ChannelTable { header, rows })
}
