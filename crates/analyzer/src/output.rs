use crate::analyzer::Analysis;
use crate::config::{OutputConfig, OutputFormat};
use crate::error::{AnalyzerError, Result};
use calltrail_extract::SnippetMap;
use calltrail_resolver::CallGraph;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEPENDENCIES_STEM: &str = "dependencies";
pub const SNIPPETS_FILE: &str = "code.json";
pub const ENDPOINTS_FILE: &str = "api_endpoints.json";

/// Write the enabled outputs into `out_dir`, returning the written paths
pub fn write_analysis(analysis: &Analysis, out_dir: &Path, output: &OutputConfig) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();

    if output.dependencies {
        let path = out_dir.join(format!("{DEPENDENCIES_STEM}.{}", output.format.extension()));
        write_graph(&analysis.graph, &path, output.format)?;
        written.push(path);
    }

    if output.snippets {
        let path = out_dir.join(SNIPPETS_FILE);
        write_json(&analysis.snippets, &path)?;
        written.push(path);
    }

    if output.endpoints {
        let path = out_dir.join(ENDPOINTS_FILE);
        write_json(&analysis.endpoints, &path)?;
        written.push(path);
    }

    Ok(written)
}

pub fn write_graph(graph: &CallGraph, path: &Path, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => write_json(graph, path),
        OutputFormat::Yaml => write_yaml(graph, path),
    }
}

/// Pretty JSON, parent directories created as needed
pub fn write_json<T: Serialize + ?Sized>(value: &T, path: &Path) -> Result<()> {
    let mut text = serde_json::to_string_pretty(value)?;
    text.push('\n');
    write_text(path, &text)
}

pub fn write_yaml<T: Serialize + ?Sized>(value: &T, path: &Path) -> Result<()> {
    let text = serde_yaml::to_string(value)?;
    write_text(path, &text)
}

fn write_text(path: &Path, text: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| AnalyzerError::io(parent, e))?;
    }
    fs::write(path, text).map_err(|e| AnalyzerError::io(path, e))?;
    log::debug!("Wrote {}", path.display());
    Ok(())
}

/// Load a call graph written by [`write_graph`]; the format follows the
/// file extension, JSON when unknown
pub fn read_graph(path: &Path) -> Result<CallGraph> {
    let text = fs::read_to_string(path).map_err(|e| AnalyzerError::io(path, e))?;
    match OutputFormat::from_path(path).unwrap_or_default() {
        OutputFormat::Json => Ok(serde_json::from_str(&text)?),
        OutputFormat::Yaml => Ok(serde_yaml::from_str(&text)?),
    }
}

/// The call graph file `write_analysis` left in `out_dir`, JSON first
pub fn graph_path(out_dir: &Path) -> PathBuf {
    [OutputFormat::Json, OutputFormat::Yaml]
        .iter()
        .map(|format| out_dir.join(format!("{DEPENDENCIES_STEM}.{}", format.extension())))
        .find(|path| path.is_file())
        .unwrap_or_else(|| out_dir.join(format!("{DEPENDENCIES_STEM}.json")))
}

pub fn read_snippets(path: &Path) -> Result<SnippetMap> {
    let text = fs::read_to_string(path).map_err(|e| AnalyzerError::io(path, e))?;
    Ok(serde_json::from_str(&text)?)
}
