use crate::domain::{ChannelTable, TableError, TableResult};
use crate::modules::serialization::{RowLayout, copy_artifact, write_text_artifact};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Writes channel tables into the project's table directory as
/// `<stem><3-digit layer index>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableWriter {
    output_dir: PathBuf,
}

impl TableWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn layer_file_name(stem: &str, layer: u32) -> String {
        format!("{}{:03}", stem, layer)
    }

    pub fn layer_path(&self, stem: &str, layer: u32) -> PathBuf {
        self.output_dir.join(Self::layer_file_name(stem, layer))
    }

    pub fn render(table: &ChannelTable, layout: &RowLayout) -> String {
        let mut contents = table.header.clone();
        contents.push_str(&layout.render_rows(&table.rows));
        contents
    }

    pub fn write(
        &self,
        stem: &str,
        layer: u32,
        table: &ChannelTable,
        layout: &RowLayout,
    ) -> TableResult<PathBuf> {
        self.ensure_output_dir()?;
        let path = self.layer_path(stem, layer);
        write_text_artifact(&path, &Self::render(table, layout)).map_err(|source| {
            TableError::io_system(
                "IO.TABLE_WRITE",
                format!("failed to write table '{}': {}", path.display(), source),
            )
        })?;
        tracing::debug!(
            path = %path.display(),
            rows = table.rows.len(),
            "wrote channel table"
        );
        Ok(path)
    }

    /// Byte-copies the first layer's file to every other layer in `layers`.
    pub fn replicate(&self, stem: &str, layers: &[u32]) -> TableResult<Vec<PathBuf>> {
        let Some((first, rest)) = layers.split_first() else {
            return Ok(Vec::new());
        };

        let source = self.layer_path(stem, *first);
        let mut copies = Vec::with_capacity(rest.len());
        for layer in rest {
            let destination = self.layer_path(stem, *layer);
            copy_artifact(&source, &destination).map_err(|error| {
                TableError::io_system(
                    "IO.TABLE_REPLICATE",
                    format!(
                        "failed to copy '{}' to '{}': {}",
                        source.display(),
                        destination.display(),
                        error
                    ),
                )
            })?;
            copies.push(destination);
        }
        Ok(copies)
    }

    /// Writes the table once for the first layer and replicates it to the rest.
    pub fn write_group(
        &self,
        stem: &str,
        layers: &[u32],
        table: &ChannelTable,
        layout: &RowLayout,
    ) -> TableResult<Vec<PathBuf>> {
        let Some(first) = layers.first() else {
            return Ok(Vec::new());
        };

        let mut written = vec![self.write(stem, *first, table, layout)?];
        written.extend(self.replicate(stem, layers)?);
        Ok(written)
    }

    /// Copies an externally supplied file into the output directory verbatim.
    pub fn install(&self, source: &Path, file_name: &str) -> TableResult<PathBuf> {
        self.ensure_output_dir()?;
        let destination = self.output_dir.join(file_name);
        fs::File::open(source)
            .map_err(|error| companion_error(source, &destination, error, true))?;
        copy_artifact(source, &destination)
            .map_err(|error| companion_error(source, &destination, error, false))?;
        Ok(destination)
    }

    fn ensure_output_dir(&self) -> TableResult<()> {
        fs::create_dir_all(&self.output_dir).map_err(|source| {
            TableError::io_system(
                "IO.TABLE_OUTPUT_DIRECTORY",
                format!(
                    "failed to create table directory '{}': {}",
                    self.output_dir.display(),
                    source
                ),
            )
        })
    }
}

/// Only an unreadable reference source is run-fatal; a destination that
/// cannot be written fails the group like any other table write.
fn companion_error(
    source: &Path,
    destination: &Path,
    error: std::io::Error,
    reading_source: bool,
) -> TableError {
    if reading_source && error.kind() == ErrorKind::PermissionDenied {
        return TableError::reference_permission(source, error);
    }
    TableError::io_system(
        "IO.COMPANION_COPY",
        format!(
            "failed to copy '{}' to '{}': {}",
            source.display(),
            destination.display(),
            error
        ),
    )
}

#[cfg(test)]
mod tests {
    use super::{TableWriter, companion_error};
    use crate::domain::{ChannelRow, ChannelTable};
    use crate::modules::serialization::{FieldSpec, RowLayout};
    use std::fs;
    use std::io::{Error, ErrorKind};
    use std::path::Path;
    use tempfile::TempDir;

    const FIELDS: [FieldSpec; 2] = [FieldSpec::left(12, 5, "   "), FieldSpec::left(12, 5, "")];
    const LAYOUT: RowLayout = RowLayout {
        leading: " ",
        fields: &FIELDS,
        data_cell: None,
        bootstrap_cell: None,
    };

    fn table() -> ChannelTable {
        ChannelTable {
            header: "header\n".to_string(),
            rows: vec![ChannelRow::scalar([0.1, 2.0])],
        }
    }

    #[test]
    fn layer_file_names_use_three_digit_suffix() {
        assert_eq!(TableWriter::layer_file_name("_ION_", 5), "_ION_005");
        assert_eq!(TableWriter::layer_file_name("FBB_E_", 123), "FBB_E_123");
    }

    #[test]
    fn write_group_produces_identical_files_for_every_layer() {
        let temp = TempDir::new().expect("tempdir should be created");
        let writer = TableWriter::new(temp.path().join("out"));

        let written = writer
            .write_group("_ANN_", &[10, 11, 12], &table(), &LAYOUT)
            .expect("group should be written");
        assert_eq!(written.len(), 3);

        let first = fs::read(writer.layer_path("_ANN_", 10)).expect("first file");
        assert_eq!(first, b"header\n 1.00000E-01    2.00000E+00 \n");
        for layer in [11, 12] {
            let copy = fs::read(writer.layer_path("_ANN_", layer)).expect("copy");
            assert_eq!(copy, first);
        }
    }

    #[test]
    fn empty_layer_list_writes_nothing() {
        let temp = TempDir::new().expect("tempdir should be created");
        let writer = TableWriter::new(temp.path());
        let written = writer
            .write_group("_ANN_", &[], &table(), &LAYOUT)
            .expect("empty group should be a no-op");
        assert!(written.is_empty());
        assert_eq!(fs::read_dir(temp.path()).expect("dir").count(), 0);
    }

    #[test]
    fn install_copies_companion_files_verbatim() {
        let temp = TempDir::new().expect("tempdir should be created");
        let source = temp.path().join("_ION_999");
        fs::write(&source, [0xC0_u8, 0x0A, 0x31]).expect("source should be written");

        let writer = TableWriter::new(temp.path().join("out"));
        let installed = writer.install(&source, "_ION_999").expect("install");
        assert_eq!(fs::read(installed).expect("copy"), vec![0xC0_u8, 0x0A, 0x31]);
    }

    #[test]
    fn unwritable_destination_is_not_a_reference_permission_error() {
        let source = Path::new("prtk_files/AIR/_ION_999");
        let destination = Path::new("out/_ION_999");

        let unreadable = companion_error(
            source,
            destination,
            Error::from(ErrorKind::PermissionDenied),
            true,
        );
        assert!(unreadable.aborts_run());

        let unwritable = companion_error(
            source,
            destination,
            Error::from(ErrorKind::PermissionDenied),
            false,
        );
        assert!(!unwritable.aborts_run());
        assert_eq!(unwritable.placeholder(), "IO.COMPANION_COPY");
    }

    #[test]
    fn missing_companion_source_fails_without_aborting() {
        let temp = TempDir::new().expect("tempdir should be created");
        let writer = TableWriter::new(temp.path().join("out"));
        let error = writer
            .install(&temp.path().join("absent"), "_ION_999")
            .expect_err("missing source should fail");
        assert_eq!(error.placeholder(), "IO.COMPANION_COPY");
        assert!(!temp.path().join("out/_ION_999").exists());
    }
}
