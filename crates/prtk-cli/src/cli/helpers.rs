use prtk_core::domain::ProjectDescription;
use prtk_core::pipelines::RunSummary;
use std::fmt::Write;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

pub(super) const REFERENCE_DIR_NAME: &str = "prtk_files";

/// `RUST_LOG` wins over `--log-level`; an unparsable level falls back to warn.
pub(super) fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// `prtk_files` next to the running executable, when present.
pub(super) fn default_reference_dir() -> Option<PathBuf> {
    let executable = std::env::current_exe().ok()?;
    let candidate = executable.parent()?.join(REFERENCE_DIR_NAME);
    candidate.is_dir().then_some(candidate)
}

pub(super) fn resolve_cli_path(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

/// Relative paths inside a project file are relative to that file.
pub(super) fn resolve_project_paths(description: &mut ProjectDescription, project_path: &Path) {
    let base = project_path.parent().unwrap_or_else(|| Path::new(""));
    description.tables_root = resolve_cli_path(base, &description.tables_root);
    description.output_dir = resolve_cli_path(base, &description.output_dir);
    if let Some(dir) = description.reference_dir.take() {
        description.reference_dir = Some(resolve_cli_path(base, &dir));
    }
    if let Some(dir) = description.proton_dir.take() {
        description.proton_dir = Some(resolve_cli_path(base, &dir));
    }
}

pub(super) fn render_run_summary(summary: &RunSummary) -> String {
    let mut rendered = String::new();
    let _ = writeln!(rendered, "Groups processed: {}", summary.groups_processed);
    let _ = writeln!(rendered, "Files written: {}", summary.files_written.len());
    let _ = writeln!(rendered, "Failures: {}", summary.failures.len());
    for failure in &summary.failures {
        let channel = failure
            .channel
            .map_or_else(|| "-".to_string(), |channel| channel.stem().to_string());
        let _ = writeln!(
            rendered,
            "  {} {}: {}",
            failure.material,
            channel,
            failure.error.diagnostic_line()
        );
    }
    rendered
}

#[cfg(test)]
mod tests {
    use super::{render_run_summary, resolve_project_paths};
    use prtk_core::domain::{ProjectDescription, TableError};
    use prtk_core::modules::Channel;
    use prtk_core::pipelines::{GroupFailure, RunSummary};
    use std::path::{Path, PathBuf};

    #[test]
    fn project_paths_resolve_against_project_directory() {
        let mut description = ProjectDescription::new("tables", "/abs/out");
        description.proton_dir = Some("protons".into());
        resolve_project_paths(&mut description, Path::new("/work/project.json"));

        assert_eq!(description.tables_root, PathBuf::from("/work/tables"));
        assert_eq!(description.output_dir, PathBuf::from("/abs/out"));
        assert_eq!(description.proton_dir, Some(PathBuf::from("/work/protons")));
        assert_eq!(description.reference_dir, None);
    }

    #[test]
    fn summary_lists_failures_with_channel_stems() {
        let summary = RunSummary {
            groups_processed: 2,
            files_written: vec![PathBuf::from("_ANN_001")],
            failures: vec![GroupFailure {
                material: "iron".to_string(),
                channel: Some(Channel::Elastic),
                error: TableError::computation("RUN.CHANNEL", "failed"),
            }],
        };

        let rendered = render_run_summary(&summary);
        assert_eq!(
            rendered,
            "Groups processed: 2\nFiles written: 1\nFailures: 1\n  iron _ELA_: ERROR: [RUN.CHANNEL] failed\n"
        );
    }
}
