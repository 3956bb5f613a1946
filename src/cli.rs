//! CLI command implementations.
//!
//! Each `run_*` function reads its input, runs the analysis and writes the
//! response to the writer it is given:
//! - `run_analyze` - classify the identifiers of one code unit
//! - `run_notebook` - analyze every cell of one or more Pluto notebooks
//! - `run_tree` - dump the parse tree
//!
//! `main.rs` owns argument parsing, logging setup and the error envelope.
//! All functions return `Result<(), CellscopeError>` so failures map onto
//! stable exit codes.

use std::collections::BTreeSet;
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use cellscope_core::document::SourceText;
use cellscope_core::error::CellscopeError;
use cellscope_core::output::{
    emit_response, AnalysisInfo, AnalyzeResponse, CellInfo, NotebookInfo, NotebookResponse,
    TreeResponse,
};
use cellscope_julia::{analyze_cell, analyze_notebook, is_notebook, AnalyzeError, AnalyzeOptions, Notebook};
use cellscope_julia_syntax::{parse, prettify_error};

/// Label used for input read from stdin.
pub const STDIN_LABEL: &str = "<stdin>";

/// Output format shared by all commands.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Full JSON response (default).
    #[default]
    Json,
    /// Compact text summary.
    Text,
}

/// Options shared by the analysis commands.
#[derive(Debug, Clone)]
pub struct CliOptions {
    pub format: OutputFormat,
    pub include_locals: bool,
    /// Analyze the input as the body of a quotation.
    pub quoted: bool,
}

impl Default for CliOptions {
    fn default() -> Self {
        CliOptions {
            format: OutputFormat::Json,
            include_locals: true,
            quoted: false,
        }
    }
}

impl CliOptions {
    fn analyze_options(&self) -> AnalyzeOptions {
        AnalyzeOptions {
            quoted: self.quoted,
            include_locals: self.include_locals,
            enclosing: None,
        }
    }
}

// ============================================================================
// Input
// ============================================================================

/// Source text together with the label used in messages.
#[derive(Debug, Clone)]
pub struct Input {
    pub label: String,
    pub source: SourceText,
}

impl Input {
    pub fn new(label: impl Into<String>, text: impl Into<String>) -> Self {
        Input {
            label: label.into(),
            source: SourceText::new(text),
        }
    }

    pub fn text(&self) -> &str {
        self.source.as_str()
    }
}

/// Read a file, or stdin when `path` is absent or `-`.
pub fn read_input(path: Option<&Path>) -> Result<Input, CellscopeError> {
    match path {
        Some(path) if path != Path::new("-") => {
            let label = path.display().to_string();
            let text = fs::read_to_string(path).map_err(|e| CellscopeError::from_io(&label, &e))?;
            Ok(Input::new(label, text))
        }
        _ => {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .map_err(|e| CellscopeError::from_io(STDIN_LABEL, &e))?;
            Ok(Input::new(STDIN_LABEL, text))
        }
    }
}

fn write_error(err: io::Error) -> CellscopeError {
    CellscopeError::internal(format!("failed to write output: {}", err))
}

fn analyze_error(input: &Input, err: AnalyzeError) -> CellscopeError {
    match err.offset() {
        Some(offset) => CellscopeError::parse(
            &input.label,
            format!("{} at {}", err, input.source.location(offset)),
        ),
        None => CellscopeError::internal(err.to_string()),
    }
}

// ============================================================================
// Commands
// ============================================================================

/// Classify the identifiers of a single code unit.
pub fn run_analyze(
    input: &Input,
    options: &CliOptions,
    out: &mut impl Write,
) -> Result<(), CellscopeError> {
    info!("analyzing {}", input.label);
    let result = analyze_cell(input.text(), &options.analyze_options())
        .map_err(|err| analyze_error(input, err))?;
    let analysis = AnalysisInfo::from_result(&result, &input.source, 0, options.include_locals);

    match options.format {
        OutputFormat::Json => {
            emit_response(&AnalyzeResponse::new(&input.label, analysis), out).map_err(write_error)
        }
        OutputFormat::Text => {
            writeln!(out, "{}", input.label).map_err(write_error)?;
            write_summary(&analysis, "  ", out).map_err(write_error)
        }
    }
}

/// Analyze a notebook file, or every notebook under a directory.
pub fn run_notebook(
    path: &Path,
    options: &CliOptions,
    out: &mut impl Write,
) -> Result<(), CellscopeError> {
    let files = collect_notebooks(path)?;
    if files.is_empty() {
        warn!("no Pluto notebooks found under {}", path.display());
    }

    let mut notebooks = Vec::with_capacity(files.len());
    for file in &files {
        notebooks.push(analyze_notebook_file(file, options)?);
    }

    match options.format {
        OutputFormat::Json => {
            emit_response(&NotebookResponse::new(notebooks), out).map_err(write_error)
        }
        OutputFormat::Text => write_notebooks(&notebooks, out).map_err(write_error),
    }
}

/// Print the parse tree of a code unit.
pub fn run_tree(
    input: &Input,
    format: OutputFormat,
    out: &mut impl Write,
) -> Result<(), CellscopeError> {
    let tree = parse(input.text()).map_err(|err| {
        let message = format!("{} at {}", err, input.source.location(err.location().start));
        warn!("{}", prettify_error(err, &input.label));
        CellscopeError::parse(&input.label, message)
    })?;
    let dump = tree.dump(input.text());

    match format {
        OutputFormat::Json => {
            emit_response(&TreeResponse::new(&input.label, dump), out).map_err(write_error)
        }
        OutputFormat::Text => write!(out, "{}", dump).map_err(write_error),
    }
}

// ============================================================================
// Notebooks
// ============================================================================

/// Resolve `path` to notebook files.
///
/// A file is taken as-is. A directory is walked for `*.jl` files whose first
/// line is the Pluto header, in file name order.
pub fn collect_notebooks(path: &Path) -> Result<Vec<PathBuf>, CellscopeError> {
    if !path.exists() {
        return Err(CellscopeError::file_not_found(path.display().to_string()));
    }
    if !path.is_dir() {
        return Ok(vec![path.to_path_buf()]);
    }

    let mut found = Vec::new();
    for entry in WalkDir::new(path).sort_by_file_name() {
        let entry = entry.map_err(|e| CellscopeError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let file = entry.path();
        if !entry.file_type().is_file() || file.extension().and_then(|e| e.to_str()) != Some("jl") {
            continue;
        }
        let label = file.display().to_string();
        let content = fs::read_to_string(file).map_err(|e| CellscopeError::from_io(&label, &e))?;
        if is_notebook(&content) {
            found.push(file.to_path_buf());
        } else {
            debug!("skipping {}: not a Pluto notebook", label);
        }
    }
    Ok(found)
}

fn analyze_notebook_file(file: &Path, options: &CliOptions) -> Result<NotebookInfo, CellscopeError> {
    let label = file.display().to_string();
    let content = fs::read_to_string(file).map_err(|e| CellscopeError::from_io(&label, &e))?;
    let notebook =
        Notebook::parse(&content).map_err(|e| CellscopeError::parse(&label, e.to_string()))?;
    let source = SourceText::new(content);

    let cells: Vec<CellInfo> = analyze_notebook(&notebook, &options.analyze_options())
        .into_iter()
        .map(|cell| CellInfo {
            line: source.location(cell.offset).line,
            analysis: cell.result.as_ref().map(|result| {
                AnalysisInfo::from_result(result, &source, cell.offset, options.include_locals)
            }),
            id: cell.cell_id,
            offset: cell.offset,
            error: cell.error,
        })
        .collect();

    info!("analyzed {} ({} cells)", label, cells.len());
    Ok(NotebookInfo { file: label, cells })
}

// ============================================================================
// Text Output
// ============================================================================

fn write_notebooks(notebooks: &[NotebookInfo], out: &mut impl Write) -> io::Result<()> {
    for notebook in notebooks {
        writeln!(out, "{}", notebook.file)?;
        for cell in &notebook.cells {
            match (&cell.analysis, &cell.error) {
                (_, Some(error)) => writeln!(out, "  {} (line {}): error: {}", cell.id, cell.line, error)?,
                (Some(analysis), None) => {
                    writeln!(out, "  {} (line {})", cell.id, cell.line)?;
                    write_summary(analysis, "    ", out)?;
                }
                (None, None) => writeln!(out, "  {} (line {})", cell.id, cell.line)?,
            }
        }
    }
    Ok(())
}

fn write_summary(analysis: &AnalysisInfo, indent: &str, out: &mut impl Write) -> io::Result<()> {
    write_names(out, indent, "definitions", analysis.definitions.iter().map(|d| d.name.as_str()))?;
    write_names(out, indent, "usages", analysis.usages.iter().map(|o| o.name.as_str()))?;
    if let Some(locals) = &analysis.locals {
        write_names(out, indent, "locals", locals.iter().map(|o| o.name.as_str()))?;
    }
    Ok(())
}

fn write_names<'a>(
    out: &mut impl Write,
    indent: &str,
    heading: &str,
    names: impl Iterator<Item = &'a str>,
) -> io::Result<()> {
    let names: BTreeSet<&str> = names.collect();
    let names: Vec<&str> = names.into_iter().collect();
    writeln!(out, "{}{}: {}", indent, heading, names.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(input: &Input, options: &CliOptions) -> String {
        let mut out = Vec::new();
        run_analyze(input, options, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn text_summary_lists_sorted_unique_names() {
        let input = Input::new("cell.jl", "z = f(b, a, a)\ng(x) = x");
        let options = CliOptions {
            format: OutputFormat::Text,
            ..CliOptions::default()
        };
        assert_eq!(
            render(&input, &options),
            "cell.jl\n  definitions: g, z\n  usages: a, b, f, x\n  locals: x\n"
        );
    }

    #[test]
    fn text_summary_without_locals() {
        let input = Input::new("cell.jl", "g(x) = x");
        let options = CliOptions {
            format: OutputFormat::Text,
            include_locals: false,
            ..CliOptions::default()
        };
        assert_eq!(render(&input, &options), "cell.jl\n  definitions: g\n  usages: x\n");
    }

    #[test]
    fn unterminated_string_still_reports_earlier_names() {
        let input = Input::new("cell.jl", "x = a\ny = \"open");
        let options = CliOptions {
            format: OutputFormat::Text,
            include_locals: false,
            ..CliOptions::default()
        };
        assert_eq!(render(&input, &options), "cell.jl\n  definitions: x\n  usages: a\n");
    }

    #[test]
    fn parse_failure_carries_position() {
        let input = Input::new("cell.jl", "x = 1\ny = \"open");
        let err = AnalyzeError::Parse {
            message: "expected end".to_string(),
            offset: 10,
        };
        let err = analyze_error(&input, err);
        assert_eq!(err.error_code().code(), 4);
        assert!(err.to_string().ends_with("at 2:5"), "{}", err);
    }

    #[test]
    fn missing_path_is_file_not_found() {
        let err = collect_notebooks(Path::new("/nonexistent/cellscope/nb.jl")).unwrap_err();
        assert_eq!(err.error_code().code(), 3);
    }
}
