//! Delimiter splitting for single CSV lines.

const QUOTE: char = '"';

/// Split `line` on `delimiter`, treating a double-quoted span as part of a
/// single field even when it contains the delimiter.
///
/// Quote characters are dropped from the output and a doubled quote inside a
/// quoted span yields one literal quote. An unterminated quote runs to the end
/// of the line. Empty fields are preserved so positions stay aligned with the
/// header.
pub fn split_quoted(line: &str, delimiter: char) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            QUOTE if in_quotes && chars.peek() == Some(&QUOTE) => {
                current.push(QUOTE);
                chars.next();
            }
            QUOTE => in_quotes = !in_quotes,
            c if c == delimiter && !in_quotes => {
                fields.push(std::mem::take(&mut current));
            }
            c => current.push(c),
        }
    }
    fields.push(current);

    fields
}

/// Drop a leading UTF-8 byte order mark, which spreadsheet tools often add.
pub fn strip_bom(text: &str) -> &str {
    text.strip_prefix('\u{feff}').unwrap_or(text)
}

/// Plain split with per-field trimming; no quote handling.
pub fn split_plain(line: &str, delimiter: char) -> Vec<&str> {
    line.split(delimiter).map(str::trim).collect()
}
