//! Analysis of files and directory trees.
//!
//! Every analysis is independent, so directories are processed in parallel
//! with rayon. A failing file is recorded in the result map and never stops
//! the batch.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::analyzer::Analyzer;
use crate::config::Configuration;
use crate::document::AnalysisReport;
use crate::frontend::Frontend;

/// Result of analyzing one file inside a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FileOutcome {
    Report(AnalysisReport),
    /// Read, decode, parse or annotation failure.
    Failed(String),
}

impl FileOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, FileOutcome::Report(report) if !report.is_error())
    }
}

/// Per-file outcomes keyed by path, in path order.
pub type BatchResult = BTreeMap<String, FileOutcome>;

/// Read, decode and analyze a single file.
pub fn analyze_file(
    path: &Path,
    configuration: &Configuration,
    analyzer: &Analyzer,
    frontend: &dyn Frontend,
) -> anyhow::Result<AnalysisReport> {
    let bytes = fs::read(path)
        .map_err(|e| anyhow::anyhow!("Error reading file {}: {}", path.display(), e))?;
    let source = configuration.decode(&bytes)?;
    let report = analyzer.analyze_source(frontend, &source)?;
    Ok(report)
}

/// Collect the files under `root` the front-end can parse.
///
/// Hidden directories and `excluded_paths` matches are skipped.
pub fn collect_files(
    root: &Path,
    configuration: &Configuration,
    frontend: &dyn Frontend,
) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_entry(|e| {
            let name = e.file_name().to_string_lossy();
            let hidden = e.depth() > 0 && name.starts_with('.');
            !(e.file_type().is_dir() && (hidden || name == "__pycache__"))
        })
    {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        if !frontend.handles_extension(ext) {
            continue;
        }
        if configuration.is_path_excluded(path) {
            debug!(path = %path.display(), "excluded by configuration");
            continue;
        }
        files.push(path.to_path_buf());
    }

    files.sort();
    Ok(files)
}

/// Analyze every matching file under `root` in parallel.
pub fn analyze_directory(
    root: &Path,
    configuration: &Configuration,
    frontend: &dyn Frontend,
) -> anyhow::Result<BatchResult> {
    let files = collect_files(root, configuration, frontend)?;
    let analyzer = Analyzer::new(configuration.resolve());
    debug!(files = files.len(), root = %root.display(), "analyzing directory");

    let outcomes: Vec<(String, FileOutcome)> = files
        .par_iter()
        .map(|path| {
            let key = path.to_string_lossy().to_string();
            let outcome = match analyze_file(path, configuration, &analyzer, frontend) {
                Ok(report) => FileOutcome::Report(report),
                Err(e) => {
                    warn!(path = %key, error = %e, "analysis failed");
                    FileOutcome::Failed(format!("Error during analysis: {}", e))
                }
            };
            (key, outcome)
        })
        .collect();

    Ok(outcomes.into_iter().collect())
}

#[cfg(all(test, feature = "tree-sitter"))]
mod tests {
    use super::*;
    use crate::frontend::PythonFrontend;
    use tempfile::TempDir;

    fn write(dir: &Path, rel: &str, content: &str) -> PathBuf {
        let path = dir.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_collect_files_skips_hidden_and_excluded() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "app.py", "import os\n");
        write(temp.path(), "pkg/util.py", "def f(): pass\n");
        write(temp.path(), ".venv/lib.py", "import sys\n");
        write(temp.path(), "build/gen.py", "import gen\n");
        write(temp.path(), "README.md", "# readme\n");

        let configuration = Configuration {
            excluded_paths: vec!["**/build/**".to_string()],
            ..Configuration::default()
        };
        let files = collect_files(temp.path(), &configuration, &PythonFrontend::new()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.strip_prefix(temp.path()).unwrap().to_string_lossy().replace('\\', "/"))
            .collect();
        assert_eq!(names, vec!["app.py", "pkg/util.py"]);
    }

    #[test]
    fn test_analyze_directory_records_failures() {
        let temp = TempDir::new().unwrap();
        let good = write(temp.path(), "good.py", "import os\n\ndef f(a: int) -> str:\n    pass\n");
        let bad = write(temp.path(), "bad.py", "def f(a: lambda: 1):\n    pass\n");
        let newer = write(temp.path(), "newer.py", "match x:\n    case 1:\n        pass\n");

        let result =
            analyze_directory(temp.path(), &Configuration::default(), &PythonFrontend::new())
                .unwrap();
        assert_eq!(result.len(), 3);

        let good = &result[&good.to_string_lossy().to_string()];
        assert!(good.is_success());

        match &result[&bad.to_string_lossy().to_string()] {
            FileOutcome::Failed(message) => assert!(message.starts_with("Error during analysis")),
            other => panic!("expected failure, got {:?}", other),
        }

        match &result[&newer.to_string_lossy().to_string()] {
            FileOutcome::Report(report) => assert!(report.is_error()),
            other => panic!("expected error report, got {:?}", other),
        }
    }

    #[test]
    fn test_analyze_file_missing() {
        let analyzer = Analyzer::default();
        let err = analyze_file(
            Path::new("/nonexistent/file.py"),
            &Configuration::default(),
            &analyzer,
            &PythonFrontend::new(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("Error reading file"));
    }
}
