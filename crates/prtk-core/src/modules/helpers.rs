use crate::common::constants::BOOTSTRAP_ENERGY_FACTOR;
use crate::domain::{ChannelRow, TableResult};
use crate::numerics::{TargetGrid, interpolate_many};
use crate::tables::RawTable;

/// Header line describing the raw secondary grid: lower bound, point count.
pub(crate) const SECONDARY_GRID_LINE: usize = 7;

/// Lower bound and raw point count of a 2-D table's secondary grid.
pub(crate) fn secondary_grid_spec(table: &RawTable) -> TableResult<(f64, usize)> {
    let bound = table.header_f64(SECONDARY_GRID_LINE, 0)?;
    let count = table.header_usize(SECONDARY_GRID_LINE, 1)?;
    if count < 3 {
        return Err(table.malformed(format!(
            "secondary grid needs at least 3 points, header declares {}",
            count
        )));
    }
    if count != table.row_count() {
        return Err(table.malformed(format!(
            "header declares {} secondary points but table has {} rows",
            count,
            table.row_count()
        )));
    }
    Ok((bound, count))
}

/// Transposes a secondary-major raw table into one row per primary energy
/// and checks that every primary sample is covered.
pub(crate) fn primary_rows(table: &RawTable, samples: usize) -> TableResult<Vec<Vec<f64>>> {
    let rows = table.transpose();
    if rows.len() < samples {
        return Err(table.malformed(format!(
            "{} primary samples expected but table has {} columns",
            samples,
            rows.len()
        )));
    }
    Ok(rows)
}

pub(crate) fn resample(
    table: &RawTable,
    queries: &[f64],
    axis: &[f64],
    values: &[f64],
) -> TableResult<Vec<f64>> {
    interpolate_many(queries, axis, values).ok_or_else(|| {
        table.malformed(format!(
            "cannot resample {} values on a {}-point secondary axis",
            values.len(),
            axis.len()
        ))
    })
}

pub(crate) fn require_samples(table: &RawTable, column: &[f64], samples: usize) -> TableResult<()> {
    if column.len() < samples {
        return Err(table.malformed(format!(
            "{} primary samples expected but table has {} rows",
            samples,
            column.len()
        )));
    }
    Ok(())
}

/// Rows at energy 0 and `0.99 * min_energy` with zero sections and zero
/// distributions.
pub(crate) fn zero_bootstrap_rows(
    field_count: usize,
    min_energy: f64,
    grid: &TargetGrid,
) -> Vec<ChannelRow> {
    let start = vec![0.0; field_count];
    let mut below = vec![0.0; field_count];
    if let Some(energy) = below.first_mut() {
        *energy = min_energy * BOOTSTRAP_ENERGY_FACTOR;
    }
    vec![
        ChannelRow::bootstrap(start, grid.zeros()),
        ChannelRow::bootstrap(below, grid.zeros()),
    ]
}
