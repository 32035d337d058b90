//! Newline-delimited case lists and filter files.

use std::fs;
use std::path::Path;

use crate::error::{Error, IoContext};

/// Non-empty, non-comment lines in file order.
pub fn parse_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .map(String::from)
        .collect()
}

pub fn read_lines(path: &Path) -> Result<Vec<String>, Error> {
    let text = fs::read_to_string(path).at(path)?;
    Ok(parse_lines(&text))
}

pub fn write_lines(path: &Path, lines: &[String]) -> Result<(), Error> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).at(parent)?;
    }
    let mut text = String::new();
    for line in lines {
        text.push_str(line);
        text.push('\n');
    }
    fs::write(path, text).at(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comments_and_blank_lines_are_skipped() {
        let lines = parse_lines("# header\n\ndEQP-VK.a.b\n  dEQP-VK.a.c  \r\n#dEQP-VK.a.d\n");
        assert_eq!(lines, ["dEQP-VK.a.b", "dEQP-VK.a.c"]);
    }
}
