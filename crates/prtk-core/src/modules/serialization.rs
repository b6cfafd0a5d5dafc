//! Fixed-width text rendering for the transport program's table files.
//!
//! The simulator reads these tables positionally, so every number is emitted
//! in the same exponent notation the legacy converter produced: upper-case
//! `E`, explicit exponent sign and at least two exponent digits.

use crate::domain::ChannelRow;
use std::fs;
use std::path::Path;

/// `value` as `d.dddE±XX` with `precision` fractional digits.
pub fn format_exp(value: f64, precision: usize) -> String {
    if value.is_nan() {
        return "NAN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "INF" } else { "-INF" }.to_string();
    }

    let raw = format!("{value:.precision$E}", precision = precision);
    pad_exponent(&raw, 'E')
}

/// `value` as `d.dddddde±XX`, the default lower-case scientific form.
pub fn format_exp_lower(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    let raw = format!("{value:.6e}");
    pad_exponent(&raw, 'e')
}

fn pad_exponent(raw: &str, marker: char) -> String {
    let Some((mantissa, exponent)) = raw.split_once(marker) else {
        return raw.to_string();
    };
    let (sign, digits) = match exponent.strip_prefix('-') {
        Some(digits) => ('-', digits),
        None => ('+', exponent),
    };
    format!("{mantissa}{marker}{sign}{digits:0>2}")
}

pub fn format_exp_left(value: f64, width: usize, precision: usize) -> String {
    format!("{:<width$}", format_exp(value, precision), width = width)
}

pub fn format_exp_right(value: f64, width: usize, precision: usize) -> String {
    format!("{:>width$}", format_exp(value, precision), width = width)
}

/// Shortest round-trip rendering of `value`, switching to exponent form
/// outside `1e-4 <= |value| < 1e16` and always keeping a decimal point.
pub fn format_plain_float(value: f64) -> String {
    if !value.is_finite() {
        return format_exp_lower(value);
    }
    if value == 0.0 {
        return if value.is_sign_negative() { "-0.0" } else { "0.0" }.to_string();
    }

    let shortest = format!("{value:e}");
    let Some((mantissa, exponent)) = shortest.split_once('e') else {
        return shortest;
    };
    let exponent: i32 = exponent.parse().unwrap_or(0);

    if (-4..16).contains(&exponent) {
        let positional = format!("{value}");
        if positional.contains('.') {
            positional
        } else {
            format!("{positional}.0")
        }
    } else {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{mantissa}e{sign}{:02}", exponent.abs())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberFormat {
    /// Left-aligned exponent notation in a field of `width`.
    Left { width: usize, precision: usize },
    /// Right-aligned exponent notation in a field of `width`.
    Right { width: usize, precision: usize },
    /// Unpadded lower-case scientific notation.
    Scientific,
}

impl NumberFormat {
    pub fn render(self, value: f64) -> String {
        match self {
            Self::Left { width, precision } => format_exp_left(value, width, precision),
            Self::Right { width, precision } => format_exp_right(value, width, precision),
            Self::Scientific => format_exp_lower(value),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub format: NumberFormat,
    pub trailing: &'static str,
}

impl FieldSpec {
    pub const fn left(width: usize, precision: usize, trailing: &'static str) -> Self {
        Self {
            format: NumberFormat::Left { width, precision },
            trailing,
        }
    }

    pub const fn right(width: usize, precision: usize, trailing: &'static str) -> Self {
        Self {
            format: NumberFormat::Right { width, precision },
            trailing,
        }
    }

    pub const fn scientific(trailing: &'static str) -> Self {
        Self {
            format: NumberFormat::Scientific,
            trailing,
        }
    }
}

/// Distribution cell used by every 2-D table.
pub const DISTRIBUTION_CELL: FieldSpec = FieldSpec::right(12, 5, "");

/// Positional layout of one table row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowLayout {
    pub leading: &'static str,
    pub fields: &'static [FieldSpec],
    pub data_cell: Option<FieldSpec>,
    pub bootstrap_cell: Option<FieldSpec>,
}

impl RowLayout {
    pub fn render_row(&self, row: &ChannelRow) -> String {
        let mut line = String::from(self.leading);
        for (spec, value) in self.fields.iter().zip(&row.fields) {
            line.push_str(&spec.format.render(*value));
            line.push_str(spec.trailing);
        }

        let cell = if row.synthetic {
            self.bootstrap_cell
        } else {
            self.data_cell
        };
        if let (Some(cell), Some(distribution)) = (cell, row.distribution.as_ref()) {
            for value in distribution {
                line.push_str(&cell.format.render(*value));
                line.push_str(cell.trailing);
            }
        }

        line.push('\n');
        line
    }

    pub fn render_rows(&self, rows: &[ChannelRow]) -> String {
        rows.iter().map(|row| self.render_row(row)).collect()
    }
}

pub fn normalize_text_artifact(content: &str) -> String {
    let mut normalized = content.replace("\r\n", "\n").replace('\r', "\n");
    if !normalized.is_empty() && !normalized.ends_with('\n') {
        normalized.push('\n');
    }
    normalized
}

pub fn write_text_artifact(path: &Path, content: &str) -> std::io::Result<()> {
    fs::write(path, normalize_text_artifact(content))
}

pub fn copy_artifact(source: &Path, destination: &Path) -> std::io::Result<()> {
    fs::copy(source, destination).map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::{
        DISTRIBUTION_CELL, FieldSpec, RowLayout, format_exp, format_exp_left, format_exp_lower,
        format_exp_right, format_plain_float, normalize_text_artifact, write_text_artifact,
    };
    use crate::domain::ChannelRow;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn exponent_has_sign_and_two_digits() {
        assert_eq!(format_exp(1.0, 4), "1.0000E+00");
        assert_eq!(format_exp(0.0, 5), "0.00000E+00");
        assert_eq!(format_exp(-1.5e-7, 4), "-1.5000E-07");
        assert_eq!(format_exp(2.5e123, 3), "2.500E+123");
        assert_eq!(format_exp(f64::NAN, 5), "NAN");
        assert_eq!(format_exp(f64::NEG_INFINITY, 5), "-INF");
    }

    #[test]
    fn aligned_fields_pad_to_width() {
        assert_eq!(format_exp_left(1.0, 12, 4), "1.0000E+00  ");
        assert_eq!(format_exp_right(1.0, 12, 5), " 1.00000E+00");
        assert_eq!(format_exp_right(-1.0, 12, 5), "-1.00000E+00");
        assert_eq!(format_exp_left(1.0, 14, 6), "1.000000E+00  ");
    }

    #[test]
    fn lower_case_scientific_uses_six_digits() {
        assert_eq!(format_exp_lower(1.0), "1.000000e+00");
        assert_eq!(format_exp_lower(123.456e-9), "1.234560e-07");
    }

    #[test]
    fn plain_float_keeps_decimal_point_and_switches_to_exponent() {
        assert_eq!(format_plain_float(0.00123), "0.00123");
        assert_eq!(format_plain_float(7.8), "7.8");
        assert_eq!(format_plain_float(1.0), "1.0");
        assert_eq!(format_plain_float(1.0e-5), "1e-05");
        assert_eq!(format_plain_float(2.5e16), "2.5e+16");
        assert_eq!(format_plain_float(0.0), "0.0");
    }

    #[test]
    fn row_layout_renders_fields_then_distribution() {
        const FIELDS: [FieldSpec; 2] = [
            FieldSpec::left(12, 5, "  "),
            FieldSpec::left(12, 4, "      "),
        ];
        let layout = RowLayout {
            leading: " ",
            fields: &FIELDS,
            data_cell: Some(FieldSpec::right(12, 5, " ")),
            bootstrap_cell: Some(DISTRIBUTION_CELL),
        };

        let data = ChannelRow::with_distribution([1.0, 2.0], vec![0.0, 1.0]);
        assert_eq!(
            layout.render_row(&data),
            " 1.00000E+00   2.0000E+00         0.00000E+00  1.00000E+00 \n"
        );

        let bootstrap = ChannelRow::bootstrap([0.0, 0.0], vec![0.0, 0.0]);
        assert_eq!(
            layout.render_row(&bootstrap),
            " 0.00000E+00   0.0000E+00         0.00000E+00 0.00000E+00\n"
        );
    }

    #[test]
    fn text_artifact_writes_are_normalized() {
        let temp = TempDir::new().expect("tempdir should be created");
        let path = temp.path().join("artifact");
        write_text_artifact(&path, "line 1\r\nline 2").expect("write should succeed");
        assert_eq!(fs::read(&path).expect("readable"), b"line 1\nline 2\n");
        assert_eq!(normalize_text_artifact(""), "");
    }
}
