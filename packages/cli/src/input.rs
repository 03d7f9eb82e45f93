//! Reading report text from files, pipes and the terminal.

use std::io::{self, BufRead, Read as _};
use std::path::Path;

/// Line that ends a report typed or pasted at the terminal.
pub const END_MARKER: &str = ".";

/// Reads a whole report from `file`, or from stdin when `None`.
///
/// # Errors
///
/// Returns an I/O error if the file or stdin cannot be read.
pub fn read_report(file: Option<&Path>) -> io::Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(path),
        None => {
            let mut text = String::new();
            io::stdin().lock().read_to_string(&mut text)?;
            Ok(text)
        }
    }
}

/// Reads lines until one that is exactly [`END_MARKER`] (ignoring
/// surrounding whitespace) or end of input.
///
/// # Errors
///
/// Returns an I/O error if reading fails.
pub fn read_until_marker(reader: impl BufRead) -> io::Result<String> {
    let mut text = String::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim() == END_MARKER {
            break;
        }
        text.push_str(&line);
        text.push('\n');
    }
    Ok(text)
}
