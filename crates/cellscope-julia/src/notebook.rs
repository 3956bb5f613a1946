//! Pluto notebook files.
//!
//! A Pluto notebook is a plain Julia file. Each cell starts with a
//! `# ╔═╡ <uuid>` header line and runs until the next header. Cell metadata
//! sits in `# ╠═╡ key = value` lines right after the header, and disabled
//! cells wrap their code in a `#=╠═╡ ... ╠═╡ =#` block comment. The file ends
//! with a `Cell order:` section listing the display order.

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

/// First line of every notebook file.
pub const NOTEBOOK_HEADER: &str = "### A Pluto.jl notebook ###";

const CELL_DELIMITER: &str = "# ╔═╡ ";
const METADATA_PREFIX: &str = "# ╠═╡ ";
const CELL_ORDER: &str = "Cell order:";
const DISABLED_OPEN: &str = "#=╠═╡";
const DISABLED_CLOSE: &str = "╠═╡ =#";

/// Cells holding the embedded package environment.
const PACKAGE_CELLS: [&str; 2] = [
    "00000000-0000-0000-0000-000000000001",
    "00000000-0000-0000-0000-000000000002",
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NotebookError {
    #[error("not a Pluto notebook: first line must be `{NOTEBOOK_HEADER}`")]
    MissingHeader,

    #[error("line {line}: invalid cell id `{id}`")]
    InvalidCellId { line: usize, id: String },
}

/// One code cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cell {
    pub id: String,
    /// Cell code without metadata lines or trailing whitespace.
    pub code: String,
    /// Byte offset of `code` within the notebook file.
    pub offset: usize,
    pub disabled: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Notebook {
    pub cells: Vec<Cell>,
}

/// True if `content` starts with the Pluto notebook header.
pub fn is_notebook(content: &str) -> bool {
    content
        .trim_start_matches('\u{feff}')
        .lines()
        .next()
        .is_some_and(|line| line.trim_end() == NOTEBOOK_HEADER)
}

fn is_cell_id(id: &str) -> bool {
    id.len() == 36
        && id.char_indices().all(|(i, c)| match i {
            8 | 13 | 18 | 23 => c == '-',
            _ => c.is_ascii_hexdigit(),
        })
}

impl Notebook {
    /// Split a notebook file into its code cells, in file order.
    ///
    /// Package environment cells are left out.
    pub fn parse(content: &str) -> Result<Notebook, NotebookError> {
        if !is_notebook(content) {
            return Err(NotebookError::MissingHeader);
        }

        let mut cells = Vec::new();
        let mut open: Option<(&str, usize)> = None;
        let mut offset = 0;

        for (index, line) in content.split_inclusive('\n').enumerate() {
            let line_start = offset;
            offset += line.len();

            let Some(rest) = line.strip_prefix(CELL_DELIMITER) else {
                continue;
            };
            if let Some((id, start)) = open.take() {
                cells.push(Cell::from_body(id, &content[start..line_start], start));
            }

            let id = rest.trim();
            if id == CELL_ORDER {
                break;
            }
            if !is_cell_id(id) {
                return Err(NotebookError::InvalidCellId {
                    line: index + 1,
                    id: id.to_string(),
                });
            }
            open = Some((id, offset));
        }
        if let Some((id, start)) = open {
            cells.push(Cell::from_body(id, &content[start..], start));
        }

        cells.retain(|cell| !PACKAGE_CELLS.contains(&cell.id.as_str()));
        debug!("split notebook into {} cells", cells.len());
        Ok(Notebook { cells })
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cell(&self, id: &str) -> Option<&Cell> {
        self.cells.iter().find(|cell| cell.id == id)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Cell> {
        self.cells.iter()
    }
}

impl<'a> IntoIterator for &'a Notebook {
    type Item = &'a Cell;
    type IntoIter = std::slice::Iter<'a, Cell>;

    fn into_iter(self) -> Self::IntoIter {
        self.cells.iter()
    }
}

impl Cell {
    /// Build a cell from the text between its header and the next one.
    /// `base` is the byte offset of `body` in the file.
    fn from_body(id: &str, body: &str, base: usize) -> Cell {
        let mut disabled = false;
        let mut start = 0;
        for line in body.split_inclusive('\n') {
            if let Some(meta) = line.strip_prefix(METADATA_PREFIX) {
                if meta.trim() == "disabled = true" {
                    disabled = true;
                }
            } else if line.trim_end() != DISABLED_OPEN {
                break;
            }
            start += line.len();
        }

        let mut code = body[start..].trim_end();
        if let Some(inner) = code.strip_suffix(DISABLED_CLOSE) {
            code = inner.trim_end();
        }

        Cell {
            id: id.to_string(),
            code: code.to_string(),
            offset: base + start,
            disabled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ID_A: &str = "3a1b5a3e-6c8e-11ec-0e0e-3b3c1b5a3e6c";
    const ID_B: &str = "4b2c6b4f-6c8e-11ec-1f1f-4c4d2c6b4f7d";

    #[test]
    fn detects_header() {
        assert!(is_notebook("### A Pluto.jl notebook ###\n# v0.19.0\n"));
        assert!(!is_notebook("x = 1\n"));
        assert!(!is_notebook(""));
    }

    #[test]
    fn missing_header() {
        assert_eq!(Notebook::parse("x = 1"), Err(NotebookError::MissingHeader));
    }

    #[test]
    fn cell_ids() {
        assert!(is_cell_id(ID_A));
        assert!(!is_cell_id("3a1b5a3e"));
        assert!(!is_cell_id("3a1b5a3e-6c8e-11ec-0e0e-3b3c1b5a3e6g"));
        assert!(!is_cell_id("3a1b5a3e_6c8e-11ec-0e0e-3b3c1b5a3e6c"));
    }

    #[test]
    fn invalid_cell_id_reports_line() {
        let content = "### A Pluto.jl notebook ###\n\n# ╔═╡ nope\nx = 1\n";
        assert_eq!(
            Notebook::parse(content),
            Err(NotebookError::InvalidCellId {
                line: 3,
                id: "nope".to_string()
            })
        );
    }

    #[test]
    fn splits_cells_with_offsets() {
        let content = format!(
            "### A Pluto.jl notebook ###\n# v0.19.0\n\n# ╔═╡ {ID_A}\nx = 1\n\n# ╔═╡ {ID_B}\ny = x + 1\n\n# ╔═╡ Cell order:\n# ╠═{ID_A}\n# ╠═{ID_B}\n"
        );
        let notebook = Notebook::parse(&content).unwrap();
        assert_eq!(notebook.len(), 2);
        let a = &notebook.cells[0];
        assert_eq!(a.id, ID_A);
        assert_eq!(a.code, "x = 1");
        assert_eq!(&content[a.offset..a.offset + a.code.len()], "x = 1");
        let b = notebook.cell(ID_B).unwrap();
        assert_eq!(b.code, "y = x + 1");
        assert_eq!(&content[b.offset..b.offset + b.code.len()], "y = x + 1");
        assert!(!b.disabled);
    }

    #[test]
    fn strips_metadata_and_disabled_wrapper() {
        let content = format!(
            "### A Pluto.jl notebook ###\n\n# ╔═╡ {ID_A}\n# ╠═╡ disabled = true\n# ╠═╡ show_logs = false\n#=╠═╡\nz = 3\n  ╠═╡ =#\n\n# ╔═╡ Cell order:\n"
        );
        let notebook = Notebook::parse(&content).unwrap();
        let cell = &notebook.cells[0];
        assert!(cell.disabled);
        assert_eq!(cell.code, "z = 3");
        assert_eq!(&content[cell.offset..cell.offset + 5], "z = 3");
    }

    #[test]
    fn skips_package_cells() {
        let content = format!(
            "### A Pluto.jl notebook ###\n\n# ╔═╡ {ID_A}\nusing Plots\n\n# ╔═╡ 00000000-0000-0000-0000-000000000001\nPLUTO_PROJECT_TOML_CONTENTS = \"\"\n\n# ╔═╡ 00000000-0000-0000-0000-000000000002\nPLUTO_MANIFEST_TOML_CONTENTS = \"\"\n\n# ╔═╡ Cell order:\n"
        );
        let notebook = Notebook::parse(&content).unwrap();
        let ids: Vec<_> = notebook.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec![ID_A]);
    }

    #[test]
    fn notebook_without_cell_order() {
        let content = format!("### A Pluto.jl notebook ###\n# ╔═╡ {ID_A}\nf(x) = x");
        let notebook = Notebook::parse(&content).unwrap();
        assert_eq!(notebook.cells[0].code, "f(x) = x");
    }
}
