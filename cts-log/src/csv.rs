//! `case,status,details` export.

use std::io::{self, Write};

use crate::qpa::TestCaseResult;

/// Quotes `field` when it contains a separator, quote or line break.
pub fn quote(field: &str) -> String {
    if field.contains(|c| matches!(c, ',' | '"' | '\n' | '\r')) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

pub fn write_csv<'a>(
    w: &mut impl Write,
    results: impl IntoIterator<Item = &'a TestCaseResult>,
    only_failures: bool,
) -> io::Result<usize> {
    writeln!(w, "case,status,details")?;
    let mut rows = 0;
    for result in results {
        if only_failures && result.is_allowed() {
            continue;
        }
        writeln!(
            w,
            "{},{},{}",
            quote(&result.name),
            quote(&result.status),
            quote(&result.details)
        )?;
        rows += 1;
    }
    Ok(rows)
}
