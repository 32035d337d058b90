//! Text assembly helpers shared by every emitter.

use std::fs;
use std::io;
use std::path::Path;

pub const INL_HEADER: &str = "\
/* WARNING: This is auto-generated file. Do not modify, since changes will
 * be lost! Modify the generating script instead.
 * This file was generated by gen-framework
 */
";

const TAB_SIZE: usize = 4;

/// Smallest multiple of `m` strictly greater than `v`.
fn next_multiple(v: usize, m: usize) -> usize {
    v + m - v % m
}

/// Aligns tab separated columns.
///
/// Every column but the last is padded with tabs up to the widest cell of
/// that column, rounded to the next tab stop.
pub fn indent_lines<I, S>(lines: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let rows: Vec<Vec<String>> = lines
        .into_iter()
        .map(|l| l.as_ref().split('\t').map(str::to_string).collect())
        .collect();
    let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
    let widths: Vec<usize> = (0..columns)
        .map(|i| {
            let widest = rows
                .iter()
                .filter_map(|r| r.get(i))
                .map(|c| c.len())
                .max()
                .unwrap_or(0);
            next_multiple(widest, TAB_SIZE)
        })
        .collect();

    rows.iter()
        .map(|row| {
            let mut out = String::new();
            if let Some((last, head)) = row.split_last() {
                for (i, cell) in head.iter().enumerate() {
                    out.push_str(cell);
                    let mut len = cell.len();
                    while len < widths[i] {
                        out.push('\t');
                        len = next_multiple(len, TAB_SIZE);
                    }
                }
                out.push_str(last);
            }
            out
        })
        .collect()
}

/// Output file under construction. Starts with [`INL_HEADER`].
#[derive(Debug, Clone)]
pub struct Inl {
    text: String,
}

impl Default for Inl {
    fn default() -> Self {
        Inl::new()
    }
}

impl Inl {
    pub fn new() -> Self {
        Inl {
            text: String::from(INL_HEADER),
        }
    }

    pub fn line<S: AsRef<str>>(&mut self, line: S) {
        self.text.push_str(line.as_ref());
        self.text.push('\n');
    }

    pub fn lines<I, S>(&mut self, lines: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for line in lines {
            self.line(line);
        }
    }

    /// Writes `lines` through [`indent_lines`].
    pub fn aligned<I, S>(&mut self, lines: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for line in indent_lines(lines) {
            self.line(line);
        }
    }

    pub fn finish(self) -> String {
        self.text
    }
}

/// Writes `text` to `path` unless the file already holds exactly that text.
/// Returns whether the file was written.
pub fn write_if_changed(path: &Path, text: &str) -> io::Result<bool> {
    match fs::read_to_string(path) {
        Ok(existing) if existing == text => return Ok(false),
        Ok(_) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(e),
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, text)?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_multiple_is_strictly_greater() {
        assert_eq!(next_multiple(0, 4), 4);
        assert_eq!(next_multiple(3, 4), 4);
        assert_eq!(next_multiple(4, 4), 8);
    }

    #[test]
    fn columns_are_aligned_to_tab_stops() {
        let lines = indent_lines(["\tA\t= 0,", "\tLONGER_NAME\t= 1,"]);
        assert_eq!(lines[0], "\tA\t\t\t= 0,");
        assert_eq!(lines[1], "\tLONGER_NAME\t= 1,");
    }

    #[test]
    fn single_column_is_untouched() {
        assert_eq!(indent_lines(["};"]), ["};"]);
        assert!(indent_lines(Vec::<String>::new()).is_empty());
    }

    #[test]
    fn inl_starts_with_header() {
        let mut inl = Inl::new();
        inl.line("x");
        let text = inl.finish();
        assert!(text.starts_with("/* WARNING: This is auto-generated file."));
        assert!(text.ends_with("*/\nx\n"));
    }
}
