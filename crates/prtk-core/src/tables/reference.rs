//! Hand-curated calibration data that overrides computed tables for
//! selected materials.

use super::{TableWriter, TextTableReader};
use crate::domain::{MaterialKey, TableError, TableResult};
use crate::modules::Channel;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

pub const AIR_MATERIAL_NAMES: [&str; 2] = ["air", "vozduch"];
pub const STOPPING_REFERENCE_FILE: &str = "FBB_example";
const STOPPING_REFERENCE_HEADER_LINES: usize = 5;
const STOPPING_REFERENCE_COLUMN: usize = 2;

/// A file copied verbatim into the table directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompanionFile {
    pub source: PathBuf,
    pub file_name: String,
}

pub trait ReferenceDataProvider {
    /// Stopping-power curve (MeV/cm) replacing the computed "ionized air"
    /// column, already rescaled to the material density.
    fn stopping_reference(&self, material: &MaterialKey) -> TableResult<Option<Vec<f64>>>;

    /// Files installed next to the computed table of `channel`.
    fn companion_files(&self, material: &str, channel: Channel) -> Vec<CompanionFile>;

    fn install_companions(
        &self,
        writer: &TableWriter,
        material: &str,
        channel: Channel,
    ) -> TableResult<Vec<PathBuf>> {
        self.companion_files(material, channel)
            .iter()
            .map(|companion| writer.install(&companion.source, &companion.file_name))
            .collect()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoReferenceData;

impl ReferenceDataProvider for NoReferenceData {
    fn stopping_reference(&self, _material: &MaterialKey) -> TableResult<Option<Vec<f64>>> {
        Ok(None)
    }

    fn companion_files(&self, _material: &str, _channel: Channel) -> Vec<CompanionFile> {
        Vec::new()
    }
}

/// Reference set shipped with the converter under `<root>/AIR`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundledAirReference {
    root: PathBuf,
}

impl BundledAirReference {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn is_air(material: &str) -> bool {
        AIR_MATERIAL_NAMES.contains(&material)
    }

    fn air_dir(&self) -> PathBuf {
        self.root.join("AIR")
    }
}

impl ReferenceDataProvider for BundledAirReference {
    fn stopping_reference(&self, material: &MaterialKey) -> TableResult<Option<Vec<f64>>> {
        if !Self::is_air(&material.name) {
            return Ok(None);
        }

        let path = self.air_dir().join(STOPPING_REFERENCE_FILE);
        let (reference_density, curve) = read_stopping_reference(&path)?;
        let scale = material.density / reference_density;
        Ok(Some(curve.into_iter().map(|value| value * scale).collect()))
    }

    fn companion_files(&self, material: &str, channel: Channel) -> Vec<CompanionFile> {
        if !Self::is_air(material) || channel != Channel::Ionization {
            return Vec::new();
        }

        let file_name = format!("{}999", channel.stem());
        vec![CompanionFile {
            source: self.air_dir().join(&file_name),
            file_name,
        }]
    }
}

/// Reads the reference density from the first line (`... = <density>`) and
/// the stopping column from the numeric body.
pub fn read_stopping_reference(path: &Path) -> TableResult<(f64, Vec<f64>)> {
    let bytes = fs::read(path).map_err(|source| {
        if source.kind() == ErrorKind::PermissionDenied {
            TableError::reference_permission(path, source)
        } else {
            TableError::missing_input_table(path, source)
        }
    })?;
    // The header is cp1251 text; only the ASCII number after '=' matters.
    let text = String::from_utf8_lossy(&bytes);

    let density = text
        .lines()
        .next()
        .and_then(|line| line.trim().rsplit('=').next())
        .and_then(|value| value.trim().parse::<f64>().ok())
        .filter(|density| *density > 0.0)
        .ok_or_else(|| {
            TableError::malformed_input_table(path, "first line does not end with '= <density>'")
        })?;

    let table = TextTableReader::new(STOPPING_REFERENCE_HEADER_LINES).parse(path, &text)?;
    let curve = table.column(STOPPING_REFERENCE_COLUMN)?;
    Ok((density, curve))
}

#[cfg(test)]
mod tests {
    use super::{
        BundledAirReference, NoReferenceData, ReferenceDataProvider, read_stopping_reference,
    };
    use crate::domain::MaterialKey;
    use crate::modules::Channel;
    use crate::tables::TableWriter;
    use std::fs;
    use tempfile::TempDir;

    const FBB_EXAMPLE: &str = "Stopping power in air ro = 0.00123\nrows\n 2\n\nE S S2\n\
        \x201.0E-02 2.0E+01 4.0E+01\n 1.0E-01 3.0E+00 6.0E+00\n";

    fn stage_reference(root: &std::path::Path) {
        let air = root.join("AIR");
        fs::create_dir_all(&air).expect("reference dir should be created");
        fs::write(air.join("FBB_example"), FBB_EXAMPLE).expect("reference should be written");
        fs::write(air.join("_ION_999"), "ionization reference\n")
            .expect("companion should be written");
    }

    #[test]
    fn stopping_reference_is_rescaled_by_density_ratio() {
        let temp = TempDir::new().expect("tempdir should be created");
        stage_reference(temp.path());
        let provider = BundledAirReference::new(temp.path());

        let curve = provider
            .stopping_reference(&MaterialKey::new("air", 0.00246))
            .expect("reference should load")
            .expect("air should have a reference");
        assert_eq!(curve.len(), 2);
        assert!((curve[0] - 80.0).abs() < 1.0e-9);
        assert!((curve[1] - 12.0).abs() < 1.0e-9);
    }

    #[test]
    fn non_air_materials_have_no_reference() {
        let temp = TempDir::new().expect("tempdir should be created");
        let provider = BundledAirReference::new(temp.path());
        assert!(provider
            .stopping_reference(&MaterialKey::new("iron", 7.8))
            .expect("lookup")
            .is_none());
        assert!(provider.companion_files("iron", Channel::Ionization).is_empty());
        assert!(provider.companion_files("air", Channel::Compton).is_empty());
    }

    #[test]
    fn air_synonym_gets_ionization_companion() {
        let provider = BundledAirReference::new("/opt/prtk");
        let files = provider.companion_files("vozduch", Channel::Ionization);
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].file_name, "_ION_999");
        assert!(files[0].source.ends_with("AIR/_ION_999"));
    }

    #[test]
    fn reference_density_is_parsed_from_first_line() {
        let temp = TempDir::new().expect("tempdir should be created");
        stage_reference(temp.path());
        let (density, curve) =
            read_stopping_reference(&temp.path().join("AIR/FBB_example")).expect("reference");
        assert_eq!(density, 0.00123);
        assert_eq!(curve, vec![40.0, 6.0]);
    }

    #[test]
    fn companions_are_installed_byte_for_byte() {
        let temp = TempDir::new().expect("tempdir should be created");
        stage_reference(temp.path());
        let provider = BundledAirReference::new(temp.path());
        let writer = TableWriter::new(temp.path().join("out"));

        let installed = provider
            .install_companions(&writer, "air", Channel::Ionization)
            .expect("companion should install");
        assert_eq!(installed, vec![temp.path().join("out/_ION_999")]);
        assert_eq!(
            fs::read(&installed[0]).expect("installed companion"),
            fs::read(temp.path().join("AIR/_ION_999")).expect("reference companion")
        );
    }

    #[test]
    fn null_provider_never_overrides() {
        let provider = NoReferenceData;
        assert!(provider
            .stopping_reference(&MaterialKey::new("air", 0.00123))
            .expect("lookup")
            .is_none());
        assert!(provider.companion_files("air", Channel::Ionization).is_empty());
    }
}
