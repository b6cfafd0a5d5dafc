//! Per-material driver: loads the shared cross sections of each group once,
//! builds every active channel and replicates the tables to all layers of
//! the group.

use super::PipelineExecutor;
use super::run_log::RunLog;
use crate::domain::{
    ActivityMap, LayerAttributes, MaterialGroup, ProjectDescription, TableError, TableResult,
};
use crate::modules::serialization::format_plain_float;
use crate::modules::{Channel, ChannelRegistry, FileProtonStopping, MaterialContext};
use crate::numerics::TargetGrid;
use crate::tables::{
    BundledAirReference, NoReferenceData, ReferenceDataProvider, TableLayout, TableSource,
    TableWriter, TextTableReader,
};
use std::path::PathBuf;

/// A group that stopped early. `channel` is `None` when the shared
/// cross-section load failed before any channel ran.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupFailure {
    pub material: String,
    pub channel: Option<Channel>,
    pub error: TableError,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    pub groups_processed: usize,
    pub files_written: Vec<PathBuf>,
    pub failures: Vec<GroupFailure>,
}

impl RunSummary {
    pub fn succeeded(&self) -> bool {
        self.failures.is_empty()
    }
}

pub struct MaterialPipeline {
    registry: ChannelRegistry,
    source: Box<dyn TableSource>,
}

impl MaterialPipeline {
    pub fn new(registry: ChannelRegistry, source: Box<dyn TableSource>) -> Self {
        Self { registry, source }
    }

    /// Wires the file-backed reader and providers named by the project.
    pub fn from_project(description: &ProjectDescription) -> TableResult<Self> {
        let grid = TargetGrid::new(description.grid_points).ok_or_else(|| {
            TableError::input_validation(
                "INPUT.GRID_POINTS",
                format!(
                    "target grid needs at least {} points, got {}",
                    TargetGrid::MIN_POINTS,
                    description.grid_points
                ),
            )
        })?;

        let reference: Box<dyn ReferenceDataProvider> = match &description.reference_dir {
            Some(dir) => Box::new(BundledAirReference::new(dir)),
            None => Box::new(NoReferenceData),
        };
        let mut registry = ChannelRegistry::new(grid, reference);
        if let Some(dir) = &description.proton_dir {
            registry = registry.with_proton_provider(Box::new(FileProtonStopping::new(dir)));
        }

        Ok(Self::new(
            registry,
            Box::new(TextTableReader::new(description.header_lines)),
        ))
    }

    pub fn registry(&self) -> &ChannelRegistry {
        &self.registry
    }

    pub fn run(&self, description: &ProjectDescription) -> TableResult<RunSummary> {
        let run_log = RunLog::create(&description.output_dir)?;
        let writer = TableWriter::new(&description.output_dir);
        let layout = TableLayout::new(&description.tables_root);
        let layers = description.layer_attributes();
        let mut summary = RunSummary::default();

        for group in description.material_groups() {
            if group.is_empty() {
                tracing::debug!(material = %group.key, "material group has no layers");
                continue;
            }

            summary.groups_processed += 1;
            let outcome = self.run_group(
                &group,
                &layers,
                &layout,
                &writer,
                &run_log,
                &mut summary.files_written,
            );
            if let Err(failure) = outcome {
                run_log.error(&failure.error);
                if failure.error.aborts_run() {
                    run_log.flush()?;
                    return Err(failure.error);
                }
                summary.failures.push(failure);
            }
        }

        run_log.flush()?;
        tracing::info!(
            groups = summary.groups_processed,
            files = summary.files_written.len(),
            failures = summary.failures.len(),
            "table run finished"
        );
        Ok(summary)
    }

    fn run_group(
        &self,
        group: &MaterialGroup,
        layers: &[LayerAttributes],
        layout: &TableLayout,
        writer: &TableWriter,
        run_log: &RunLog,
        written: &mut Vec<PathBuf>,
    ) -> Result<(), GroupFailure> {
        let material = group.key.name.clone();
        let failure = |channel: Option<Channel>, error: TableError| GroupFailure {
            material: material.clone(),
            channel,
            error,
        };

        let ctx = MaterialContext::load(group.key.clone(), layout, self.source.as_ref(), run_log)
            .map_err(|error| failure(None, error))?;
        run_log.line(format!(
            "In {} Density = {}",
            ctx.material(),
            format_plain_float(ctx.density())
        ));

        let activity = ActivityMap::for_group(group, layers);
        if activity.conductivity_override() {
            tracing::debug!(material = %group.key, "conductivity override enables every channel");
        }

        for channel in self.registry.channels() {
            let companions = self
                .registry
                .reference()
                .install_companions(writer, ctx.material(), channel)
                .map_err(|error| failure(Some(channel), error))?;
            written.extend(companions);

            if !activity.is_active(channel.stem()) {
                tracing::debug!(
                    material = %group.key,
                    channel = channel.stem(),
                    "channel inactive in every layer; skipped"
                );
                continue;
            }

            let table = self
                .registry
                .build(channel, &ctx)
                .map_err(|error| failure(Some(channel), error))?;
            let paths = writer
                .write_group(channel.stem(), group.layers(), &table, &channel.layout())
                .map_err(|error| failure(Some(channel), error))?;
            tracing::debug!(
                material = %group.key,
                channel = channel.stem(),
                files = paths.len(),
                "channel tables written"
            );
            written.extend(paths);
        }
        Ok(())
    }
}

impl PipelineExecutor for MaterialPipeline {
    fn execute(&self, description: &ProjectDescription) -> TableResult<RunSummary> {
        self.run(description)
    }
}

#[cfg(test)]
mod tests {
    use super::MaterialPipeline;
    use crate::domain::errors::{MISSING_INPUT_TABLE, REFERENCE_PERMISSION};
    use crate::domain::{
        GroupDescription, LayerDescription, MaterialKey, ProjectDescription, TableError,
        TableResult,
    };
    use crate::modules::fixtures::{capture_events, header_with, source_with_cross_sections};
    use crate::modules::{Channel, ChannelRegistry};
    use crate::numerics::TargetGrid;
    use crate::pipelines::RUN_LOG_FILE_NAME;
    use crate::tables::{CompanionFile, ReferenceDataProvider};
    use std::collections::BTreeMap;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn group(material: &str, density: f64, layers: &[u32]) -> GroupDescription {
        GroupDescription {
            material: material.to_string(),
            density,
            layers: layers.to_vec(),
        }
    }

    fn layer(index: u32, conductivity: i32, active: &[&str]) -> LayerDescription {
        LayerDescription {
            index,
            conductivity,
            activity: active
                .iter()
                .map(|stem| (stem.to_string(), true))
                .collect::<BTreeMap<_, _>>(),
        }
    }

    fn pipeline() -> MaterialPipeline {
        let root = Path::new("/t");
        let source = source_with_cross_sections(root, "air");
        MaterialPipeline::new(ChannelRegistry::default(), Box::new(source))
    }

    #[test]
    fn active_channels_are_written_to_every_layer_of_the_group() {
        let temp = TempDir::new().expect("tempdir should be created");
        let mut description = ProjectDescription::new("/t", temp.path());
        description.groups = vec![group("air", 0.00123, &[1, 2]), group("air", 0.5, &[])];
        description.layers = vec![layer(1, 0, &["_ANN_"]), layer(2, 0, &[])];

        let summary = pipeline().run(&description).expect("run should succeed");
        assert!(summary.succeeded());
        assert_eq!(summary.groups_processed, 1);
        assert_eq!(summary.files_written.len(), 2);

        let first = fs::read(temp.path().join("_ANN_001")).expect("layer 1 table");
        let second = fs::read(temp.path().join("_ANN_002")).expect("layer 2 table");
        assert_eq!(first, second);
        assert!(!temp.path().join("_EXC_001").exists());

        let log = fs::read_to_string(temp.path().join(RUN_LOG_FILE_NAME)).expect("run log");
        assert_eq!(log, "In air Density = 0.00123\n");
    }

    #[test]
    fn inactive_channels_leave_a_debug_event() {
        let temp = TempDir::new().expect("tempdir should be created");
        let mut description = ProjectDescription::new("/t", temp.path());
        description.groups = vec![group("air", 0.00123, &[1])];
        description.layers = vec![layer(1, 0, &["_ANN_"])];

        let (summary, events) = capture_events(|| pipeline().run(&description));
        assert!(summary.expect("run should succeed").succeeded());
        assert!(events.contains("channel inactive in every layer; skipped"));
        assert!(events.contains("_EXC_"));
        assert!(!temp.path().join("_EXC_001").exists());
    }

    #[test]
    fn failed_material_is_recorded_and_run_continues() {
        let temp = TempDir::new().expect("tempdir should be created");
        let mut description = ProjectDescription::new("/t", temp.path());
        description.groups = vec![group("ghost", 1.0, &[3]), group("air", 0.00123, &[4])];
        description.layers = vec![layer(3, 0, &["_ANN_"]), layer(4, 0, &["_ANN_"])];

        let summary = pipeline().run(&description).expect("run should complete");
        assert_eq!(summary.groups_processed, 2);
        assert_eq!(summary.failures.len(), 1);
        assert_eq!(summary.failures[0].material, "ghost");
        assert_eq!(summary.failures[0].channel, None);
        assert_eq!(summary.failures[0].error.placeholder(), MISSING_INPUT_TABLE);
        assert!(temp.path().join("_ANN_004").is_file());

        let log = fs::read_to_string(temp.path().join(RUN_LOG_FILE_NAME)).expect("run log");
        let lines: Vec<&str> = log.lines().collect();
        assert!(lines[0].starts_with("ERROR: [IO.MISSING_INPUT_TABLE]"));
        assert_eq!(lines[1], "In air Density = 0.00123");
    }

    #[test]
    fn conductivity_override_stops_group_at_first_failing_channel() {
        let temp = TempDir::new().expect("tempdir should be created");
        let mut description = ProjectDescription::new("/t", temp.path());
        description.groups = vec![group("air", 0.00123, &[5])];
        description.layers = vec![layer(5, 6, &[])];

        let summary = pipeline().run(&description).expect("run should complete");
        assert_eq!(summary.failures.len(), 1);
        assert_eq!(summary.failures[0].channel, Some(Channel::StoppingPower));
        assert!(summary.files_written.is_empty());
        assert!(!temp.path().join("_ANN_005").exists());
    }

    struct LockedReference;

    impl ReferenceDataProvider for LockedReference {
        fn stopping_reference(&self, _material: &MaterialKey) -> TableResult<Option<Vec<f64>>> {
            Err(TableError::reference_permission(
                Path::new("prtk_files/AIR/FBB_example"),
                "permission denied",
            ))
        }

        fn companion_files(&self, _material: &str, _channel: Channel) -> Vec<CompanionFile> {
            Vec::new()
        }
    }

    #[test]
    fn unreadable_reference_data_aborts_the_whole_run() {
        let temp = TempDir::new().expect("tempdir should be created");
        let source = source_with_cross_sections(Path::new("/t"), "air").with(
            "/t/mat-air/electron/xtbl.xer",
            header_with(""),
            vec![vec![5.0, 1.0, 0.0], vec![6.0, 1.0, 0.0]],
        );
        let registry = ChannelRegistry::new(TargetGrid::default(), Box::new(LockedReference));
        let pipeline = MaterialPipeline::new(registry, Box::new(source));

        let mut description = ProjectDescription::new("/t", temp.path());
        description.groups = vec![group("air", 0.00123, &[1]), group("air", 0.5, &[2])];
        description.layers = vec![layer(1, 0, &["FBB_E_", "_ANN_"]), layer(2, 0, &["_ANN_"])];

        let error = pipeline
            .run(&description)
            .expect_err("reference permission failure should abort the run");
        assert_eq!(error.placeholder(), REFERENCE_PERMISSION);
        for file in ["FBB_E_001", "_ANN_001", "_ANN_002"] {
            assert!(!temp.path().join(file).exists(), "{} should not be written", file);
        }

        let log = fs::read_to_string(temp.path().join(RUN_LOG_FILE_NAME)).expect("run log");
        assert!(log.contains("ERROR: [IO.REFERENCE_PERMISSION]"));
        assert!(!log.contains("Density = 0.5"));
    }

    #[test]
    fn from_project_rejects_tiny_grids() {
        let mut description = ProjectDescription::new("/t", "/out");
        description.grid_points = 2;
        let error = match MaterialPipeline::from_project(&description) {
            Ok(_) => panic!("two grid points should be rejected"),
            Err(error) => error,
        };
        assert_eq!(error.placeholder(), "INPUT.GRID_POINTS");

        description.grid_points = 11;
        description.proton_dir = Some("/protons".into());
        let pipeline = MaterialPipeline::from_project(&description).expect("pipeline");
        assert_eq!(pipeline.registry().grid().len(), 11);
        assert!(pipeline.registry().is_available(Channel::ProtonStopping));
    }
}
