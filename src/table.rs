//! Reading and writing the multiplicity table.
//!
//! The table has one line per root, `c_0,...,c_{r-1},mult`, grouped by ascending height and sorted
//! lexicographically within a height. There is no header. The Cartan subalgebra is not part of
//! the table.
use std::fmt;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use itertools::Itertools;
use lie::{Algebra, RootVector};

use crate::root_system::RootSystem;

/// A row of the multiplicity table.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct TableRow {
    pub vector: RootVector,
    pub mult: u64,
}

impl TableRow {
    /// The first component, which the visualization uses to group roots.
    pub fn level(&self) -> i64 {
        self.vector.components().first().copied().unwrap_or(0)
    }

    pub fn height(&self) -> i64 {
        self.vector.height()
    }

    pub fn norm(&self, algebra: &Algebra) -> i64 {
        algebra.norm_of(&self.vector)
    }
}

impl fmt::Display for TableRow {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{},{}",
            self.vector.components().iter().join(","),
            self.mult
        )
    }
}

impl RootSystem {
    /// The rows of the table, for every height that has been constructed.
    pub fn table_rows(&self) -> impl Iterator<Item = TableRow> + '_ {
        (1..=self.constructed_height()).flat_map(move |h| {
            self.roots(h).map(|root| TableRow {
                vector: root.vector().clone(),
                mult: root.mult(),
            })
        })
    }

    pub fn write_table(&self, buffer: &mut impl Write) -> io::Result<()> {
        for row in self.table_rows() {
            writeln!(buffer, "{row}")?;
        }
        Ok(())
    }

    pub fn table_string(&self) -> String {
        self.table_rows().map(|row| format!("{row}\n")).collect()
    }

    /// Writes the table to `path`, creating the parent directory if necessary. The rows are first
    /// written to a temporary file next to `path` which then replaces `path`, so that an existing
    /// table is never left half written.
    #[tracing::instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn export_table(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let tmp_path = temporary_path(path);
        let result = self.write_table_file(&tmp_path).and_then(|()| {
            std::fs::rename(&tmp_path, path).with_context(|| {
                format!(
                    "Failed to move {} to {}",
                    tmp_path.display(),
                    path.display()
                )
            })
        });
        if result.is_err() {
            // The temporary file may not exist, in which case there is nothing to clean up.
            let _ = std::fs::remove_file(&tmp_path);
        }
        result?;

        tracing::info!(
            "Wrote {} roots up to height {} to {}",
            self.num_roots(),
            self.constructed_height(),
            path.display()
        );
        Ok(())
    }

    fn write_table_file(&self, path: &Path) -> anyhow::Result<()> {
        let f = File::create(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        let mut f = BufWriter::new(f);
        self.write_table(&mut f)
            .and_then(|()| f.flush())
            .with_context(|| format!("Failed to write {}", path.display()))
    }
}

fn temporary_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Reads a table written by [`RootSystem::export_table`].
pub fn read_table(path: impl AsRef<Path>) -> anyhow::Result<Vec<TableRow>> {
    let path = path.as_ref();
    let f = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    parse_table(BufReader::new(f)).with_context(|| format!("Failed to read {}", path.display()))
}

/// Parses the rows of a table. Blank lines are skipped.
pub fn parse_table(reader: impl BufRead) -> anyhow::Result<Vec<TableRow>> {
    let mut rows = Vec::new();
    for (n, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let row = parse_row(line).with_context(|| format!("Invalid row on line {}", n + 1))?;
        rows.push(row);
    }
    Ok(rows)
}

fn parse_row(line: &str) -> anyhow::Result<TableRow> {
    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    let (mult, components) = match fields.split_last() {
        Some((mult, components)) if !components.is_empty() => (mult, components),
        _ => bail!("expected at least one component and a multiplicity, found '{line}'"),
    };
    let components = components
        .iter()
        .map(|c| c.parse::<i64>())
        .collect::<Result<Vec<_>, _>>()?;
    Ok(TableRow {
        vector: RootVector::new(components),
        mult: mult.parse()?,
    })
}
