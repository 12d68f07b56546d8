//! A hand-rolled scanner for the INI-like config format: flat key/value
//! pairs grouped under `[section]` or `[section "subsection"]` headers, one
//! physical file, no includes.

use bstr::{BString, ByteVec};

use crate::error::ConfigError;

const UTF8_BOM: &[u8] = b"\xef\xbb\xbf";

/// One parsed unit of the file, carrying its exact source bytes so the
/// writer can round-trip comments and formatting untouched.
#[derive(Debug, Clone)]
pub enum ConfigEvent {
    SectionHeader {
        raw: BString,
        section: BString,
        subsection: Option<BString>,
    },
    Entry {
        raw: BString,
        key: BString,
        value: Option<BString>,
        line_number: usize,
    },
    Comment(BString),
    Blank(BString),
}

/// A cursor over the input bytes that tracks the current line number as it
/// advances, so error sites don't need to thread line deltas back up
/// through every helper's return value.
struct Scanner<'a> {
    input: &'a [u8],
    pos: usize,
    line: usize,
    filename: &'a str,
}

impl<'a> Scanner<'a> {
    fn new(input: &'a [u8], filename: &'a str) -> Self {
        let pos = if input.starts_with(UTF8_BOM) { UTF8_BOM.len() } else { 0 };
        Scanner { input, pos, line: 1, filename }
    }

    fn is_eof(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn bump_raw(&mut self) -> Option<u8> {
        let b = self.peek()?;
        self.pos += 1;
        Some(b)
    }

    fn skip_horizontal_space(&mut self) {
        while matches!(self.peek(), Some(b' ') | Some(b'\t')) {
            self.pos += 1;
        }
    }

    fn skip_to_line_end(&mut self) {
        while !matches!(self.peek(), None | Some(b'\n') | Some(b'\r')) {
            self.pos += 1;
        }
    }

    /// Consume a `\n`, `\r\n`, or bare `\r` at the cursor, if present, and
    /// bump the line counter. Returns whether anything was consumed.
    fn consume_newline(&mut self) -> bool {
        match self.peek() {
            Some(b'\r') => {
                self.pos += 1;
                if self.peek() == Some(b'\n') {
                    self.pos += 1;
                }
                self.line += 1;
                true
            }
            Some(b'\n') => {
                self.pos += 1;
                self.line += 1;
                true
            }
            _ => false,
        }
    }

    fn error(&self, message: impl Into<String>) -> ConfigError {
        ConfigError::Parse { file: self.filename.to_string(), line: self.line, message: message.into() }
    }
}

fn is_section_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'-' || b == b'.'
}

fn is_key_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'-'
}

fn lowercase_ascii(bytes: &[u8]) -> BString {
    BString::from(bytes.iter().map(u8::to_ascii_lowercase).collect::<Vec<u8>>())
}

/// Parse a config file's bytes into its sequence of events.
pub fn parse_config(input: &[u8], filename: &str) -> Result<Vec<ConfigEvent>, ConfigError> {
    let mut scanner = Scanner::new(input, filename);
    let mut events = Vec::new();

    while !scanner.is_eof() {
        let line_start = scanner.pos;
        scanner.skip_horizontal_space();

        match scanner.peek() {
            None => {
                let raw = BString::from(&input[line_start..scanner.pos]);
                if !raw.is_empty() {
                    events.push(ConfigEvent::Blank(raw));
                }
                break;
            }
            Some(b'\n') | Some(b'\r') => {
                scanner.consume_newline();
                events.push(ConfigEvent::Blank(BString::from(&input[line_start..scanner.pos])));
            }
            Some(b'#') | Some(b';') => {
                scanner.skip_to_line_end();
                scanner.consume_newline();
                events.push(ConfigEvent::Comment(BString::from(&input[line_start..scanner.pos])));
            }
            Some(b'[') => {
                let (section, subsection) = parse_section_header(&mut scanner)?;
                finish_header_tail(&mut scanner)?;
                scanner.consume_newline();
                events.push(ConfigEvent::SectionHeader {
                    raw: BString::from(&input[line_start..scanner.pos]),
                    section,
                    subsection,
                });
            }
            Some(_) => {
                let entry_line = scanner.line;
                let (key, value) = parse_key_value(&mut scanner)?;
                events.push(ConfigEvent::Entry {
                    raw: BString::from(&input[line_start..scanner.pos]),
                    key,
                    value,
                    line_number: entry_line,
                });
            }
        }
    }

    Ok(events)
}

fn parse_section_header(scanner: &mut Scanner) -> Result<(BString, Option<BString>), ConfigError> {
    scanner.bump_raw(); // '['

    let name_start = scanner.pos;
    while matches!(scanner.peek(), Some(b) if is_section_name_byte(b)) {
        scanner.pos += 1;
    }
    if scanner.pos == name_start {
        return Err(scanner.error("empty section name"));
    }
    let section = lowercase_ascii(&scanner.input[name_start..scanner.pos]);

    let subsection = if matches!(scanner.peek(), Some(b' ') | Some(b'\t')) {
        scanner.skip_horizontal_space();
        Some(parse_subsection_name(scanner)?)
    } else {
        None
    };

    if scanner.bump_raw() != Some(b']') {
        return Err(scanner.error("expected ']' to close section header"));
    }

    Ok((section, subsection))
}

fn parse_subsection_name(scanner: &mut Scanner) -> Result<BString, ConfigError> {
    if scanner.peek() != Some(b'"') {
        return Err(scanner.error("expected '\"' for subsection"));
    }
    scanner.pos += 1;

    let mut name = BString::new(Vec::new());
    loop {
        match scanner.peek() {
            None => return Err(scanner.error("unterminated subsection quote")),
            Some(b'"') => {
                scanner.pos += 1;
                return Ok(name);
            }
            Some(b'\n') => return Err(scanner.error("newline in subsection name")),
            Some(b'\\') => {
                scanner.pos += 1;
                match scanner.bump_raw() {
                    Some(b) => name.push_byte(b),
                    None => return Err(scanner.error("unterminated escape in subsection")),
                }
            }
            Some(b) => {
                name.push_byte(b);
                scanner.pos += 1;
            }
        }
    }
}

/// After the closing `]`, only whitespace and a trailing comment are legal
/// before the line ends.
fn finish_header_tail(scanner: &mut Scanner) -> Result<(), ConfigError> {
    loop {
        match scanner.peek() {
            None | Some(b'\n') | Some(b'\r') => return Ok(()),
            Some(b'#') | Some(b';') => {
                scanner.skip_to_line_end();
                return Ok(());
            }
            Some(b' ') | Some(b'\t') => scanner.pos += 1,
            Some(other) => {
                return Err(scanner.error(format!("unexpected character after section header: {:?}", other as char)));
            }
        }
    }
}

fn parse_key_value(scanner: &mut Scanner) -> Result<(BString, Option<BString>), ConfigError> {
    scanner.skip_horizontal_space();

    let key_start = scanner.pos;
    while matches!(scanner.peek(), Some(b) if is_key_name_byte(b)) {
        scanner.pos += 1;
    }
    if scanner.pos == key_start {
        return Err(scanner.error("empty key name"));
    }
    let key = lowercase_ascii(&scanner.input[key_start..scanner.pos]);

    scanner.skip_horizontal_space();

    match scanner.peek() {
        None | Some(b'\n') | Some(b'\r') | Some(b'#') | Some(b';') => {
            // A key with no `=` is shorthand for a boolean `true`.
            scanner.skip_to_line_end();
            scanner.consume_newline();
            Ok((key, None))
        }
        Some(b'=') => {
            scanner.pos += 1;
            scanner.skip_horizontal_space();
            Ok((key, Some(parse_value(scanner)?)))
        }
        Some(other) => Err(scanner.error(format!("expected '=' after key, got {:?}", other as char))),
    }
}

fn parse_value(scanner: &mut Scanner) -> Result<BString, ConfigError> {
    let mut value = BString::new(Vec::new());
    let mut in_quote = false;

    loop {
        match scanner.peek() {
            None => break,
            Some(b'\n') | Some(b'\r') => {
                if in_quote {
                    return Err(scanner.error("newline inside quoted string"));
                }
                scanner.consume_newline();
                break;
            }
            Some(b'\\') => {
                scanner.pos += 1;
                match scanner.peek() {
                    None => return Err(scanner.error("backslash at end of file")),
                    Some(b'\n') | Some(b'\r') => {
                        scanner.consume_newline();
                    }
                    Some(b'n') => {
                        value.push_byte(b'\n');
                        scanner.pos += 1;
                    }
                    Some(b't') => {
                        value.push_byte(b'\t');
                        scanner.pos += 1;
                    }
                    Some(b'b') => {
                        value.push_byte(0x08);
                        scanner.pos += 1;
                    }
                    Some(b'\\') => {
                        value.push_byte(b'\\');
                        scanner.pos += 1;
                    }
                    Some(b'"') => {
                        value.push_byte(b'"');
                        scanner.pos += 1;
                    }
                    Some(other) => return Err(scanner.error(format!("invalid escape sequence: \\{}", other as char))),
                }
            }
            Some(b'"') => {
                in_quote = !in_quote;
                scanner.pos += 1;
            }
            Some(b'#') | Some(b';') if !in_quote => {
                scanner.skip_to_line_end();
                scanner.consume_newline();
                break;
            }
            Some(b) => {
                value.push_byte(b);
                scanner.pos += 1;
            }
        }
    }

    Ok(trim_trailing_blanks(value))
}

fn trim_trailing_blanks(value: BString) -> BString {
    let bytes: &[u8] = value.as_ref();
    match bytes.iter().rposition(|b| *b != b' ' && *b != b'\t') {
        Some(end) => BString::from(&bytes[..=end]),
        None => BString::new(Vec::new()),
    }
}
