use crate::Result;
use core::fmt::Write;

const PADDING: usize = 2;

/// Write `header` and `rows` as space-aligned columns.
///
/// Every column except the last is padded to its widest cell plus two spaces.
/// Rows shorter than the header are completed with empty cells.
pub fn generate<W: Write>(header: &[&str], rows: &[Vec<String>], writer: &mut W) -> Result<()> {
    let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            let len = cell.chars().count();
            match widths.get_mut(i) {
                Some(w) => *w = (*w).max(len),
                None => widths.push(len),
            }
        }
    }

    write_row(writer, header.iter().copied(), &widths)?;
    for row in rows {
        write_row(writer, row.iter().map(String::as_str), &widths)?;
    }

    Ok(())
}

fn write_row<'a, W: Write>(writer: &mut W, cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> Result<()> {
    let mut cells = cells.fuse();
    let mut line = String::new();

    for (i, width) in widths.iter().enumerate() {
        let cell = cells.next().unwrap_or("");
        if i + 1 == widths.len() {
            line.push_str(cell);
        } else {
            write!(line, "{cell:<w$}", w = width + PADDING)?;
        }
    }

    writeln!(writer, "{}", line.trim_end())?;
    Ok(())
}
