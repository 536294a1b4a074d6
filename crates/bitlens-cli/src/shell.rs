//! Command interpreter for the interactive prompt.
//!
//! The shell owns the session state the engine deliberately does not: the current input
//! mode, display options, field map and the last parsed value.

use std::{fmt, path::Path};

use bitlens::{
    Alignment, DisplayOptions, ExtractError, FieldMap, FieldMapError, InputMode, OutputFormat,
    ParseError, ParsedValue, compare, extract_range, parse_with_mode, render, render_breakdown,
};
use log::{debug, info, warn};

use crate::jsonc::{self, LoadError};

/// Words the shell interprets before looking up field names.
pub const RESERVED_WORDS: &[&str] = &[
    "hex", "dec", "bin", "auto", "to_hex", "to_dec", "to_bin", "byte_align", "dw_align", "list",
    "status", "help", "cmp", "fields", "q", "quit", "exit",
];

/// Errors a single command can report. None of them change the session.
#[derive(Debug)]
pub enum CommandError {
    Engine(bitlens::Error),
    Load(LoadError),
    /// Extraction or single-literal `cmp` before any value was parsed.
    NoValue,
    Usage(&'static str),
}

impl From<bitlens::Error> for CommandError {
    fn from(err: bitlens::Error) -> Self {
        CommandError::Engine(err)
    }
}

impl From<ParseError> for CommandError {
    fn from(err: ParseError) -> Self {
        CommandError::Engine(err.into())
    }
}

impl From<FieldMapError> for CommandError {
    fn from(err: FieldMapError) -> Self {
        CommandError::Engine(err.into())
    }
}

impl From<ExtractError> for CommandError {
    fn from(err: ExtractError) -> Self {
        CommandError::Engine(err.into())
    }
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::Engine(err) => err.fmt(f),
            CommandError::Load(err) => err.fmt(f),
            CommandError::NoValue => write!(f, "no parsed value yet"),
            CommandError::Usage(usage) => write!(f, "usage: {usage}"),
        }
    }
}

impl std::error::Error for CommandError {}

/// What the caller should do after a command.
#[derive(Debug, PartialEq, Eq)]
pub enum Step {
    Print(String),
    Quit,
}

#[derive(Debug, PartialEq, Eq)]
enum Command<'a> {
    Quit,
    Help,
    Status,
    Input(InputMode),
    Output(OutputFormat),
    Align(Alignment),
    List,
    Range { low: usize, high: usize },
    Compare(&'a str, Option<&'a str>),
    LoadFields(&'a str),
    Field(&'a str),
    Literal(&'a str),
}

pub struct Shell {
    input_mode: InputMode,
    options: DisplayOptions,
    fields: FieldMap,
    last: Option<ParsedValue>,
}

impl Shell {
    pub fn new(input_mode: InputMode, options: DisplayOptions) -> Self {
        Shell {
            input_mode,
            options,
            fields: FieldMap::default(),
            last: None,
        }
    }

    #[cfg(test)]
    fn last_value(&self) -> Option<&ParsedValue> {
        self.last.as_ref()
    }

    /// Replaces the field map from a JSONC file; the current map stays on any error.
    pub fn load_fields(&mut self, path: &Path) -> Result<String, CommandError> {
        let sources = jsonc::read_field_sources(path).map_err(CommandError::Load)?;
        self.fields.replace(&sources)?;

        for field in self.fields.iter() {
            if RESERVED_WORDS.contains(&field.name.as_str()) {
                warn!(
                    "field '{}' is shadowed by a shell command of the same name",
                    field.name
                );
            }
        }

        let count = self.fields.len();
        info!("loaded {count} fields from {}", path.display());
        Ok(format!("Loaded {count} fields from {}", path.display()))
    }

    pub fn status(&self) -> String {
        format!(
            "Current settings: input = {}, output = {}, alignment = {}",
            self.input_mode, self.options.output_format, self.options.alignment
        )
    }

    /// Runs one line of input.
    pub fn execute(&mut self, line: &str) -> Result<Step, CommandError> {
        let command = self.classify(line.trim());
        debug!("dispatching {command:?}");

        let text = match command {
            Command::Quit => return Ok(Step::Quit),
            Command::Help => help_text(),
            Command::Status => self.status(),
            Command::Input(mode) => {
                self.input_mode = mode;
                format!("Input mode changed to: {mode}")
            }
            Command::Output(format) => {
                self.options.output_format = format;
                format!("Output format changed to: {format}")
            }
            Command::Align(alignment) => {
                self.options.alignment = alignment;
                format!("Alignment mode changed to: {alignment}")
            }
            Command::List => self.list(),
            Command::Range { low, high } => self.extract(low, high, None)?,
            Command::Field(name) => {
                let field = self.fields.resolve(name)?;
                let (low, high) = (field.low, field.high);
                self.extract(low, high, Some(name))?
            }
            Command::Compare(first, second) => self.compare(first, second)?,
            Command::LoadFields(path) => self.load_fields(Path::new(path))?,
            Command::Literal(text) => self.analyze(text)?,
        };

        Ok(Step::Print(text))
    }

    fn classify<'a>(&self, line: &'a str) -> Command<'a> {
        match line.to_ascii_lowercase().as_str() {
            "q" | "quit" | "exit" => return Command::Quit,
            "help" => return Command::Help,
            "status" => return Command::Status,
            "list" => return Command::List,
            "byte_align" => return Command::Align(Alignment::Byte),
            "dw_align" => return Command::Align(Alignment::DWord),
            _ => {}
        }

        let lower = line.to_ascii_lowercase();
        if let Some(format) = lower.strip_prefix("to_") {
            if let Ok(format) = format.parse::<OutputFormat>() {
                return Command::Output(format);
            }
        }
        if let Ok(mode) = lower.parse::<InputMode>() {
            return Command::Input(mode);
        }
        if let Some((low, high)) = parse_range(line) {
            return Command::Range { low, high };
        }
        if let Some(args) = strip_word(line, "cmp") {
            let mut parts = args.split_whitespace();
            return match (parts.next(), parts.next(), parts.next()) {
                (Some(first), second, None) => Command::Compare(first, second),
                _ => Command::Compare("", None),
            };
        }
        if let Some(path) = strip_word(line, "fields") {
            return Command::LoadFields(path.trim());
        }
        if self.fields.contains(line) {
            return Command::Field(line);
        }

        Command::Literal(line)
    }

    fn analyze(&mut self, text: &str) -> Result<String, CommandError> {
        let value = parse_with_mode(text, self.input_mode)?;

        let mut out = format!(
            "[Result] Input mode = {}, Output = {}, Alignment = {}\n",
            self.input_mode, self.options.output_format, self.options.alignment
        );
        out.push_str(&render(&value, &self.options));
        out.push('\n');
        out.push_str(&render_breakdown(&value, &self.options));

        self.last = Some(value);
        Ok(out)
    }

    fn extract(
        &self,
        low: usize,
        high: usize,
        field: Option<&str>,
    ) -> Result<String, CommandError> {
        let value = self.last.as_ref().ok_or(CommandError::NoValue)?;
        let extracted = extract_range(value, low, high)?;

        let mut label = format!("bit {low}-{high}");
        if let Some(field) = field {
            label.push_str(&format!(" [{field}]"));
        }
        Ok(format!("{label} = {}", describe(&extracted)))
    }

    fn list(&self) -> String {
        let mut lines = Vec::with_capacity(self.fields.len() + 1);

        match &self.last {
            Some(value) => {
                lines.push("Last parsed value per field:".to_string());
                let width = value.bit_width();
                for field in &self.fields {
                    let (low, high) = (field.low, field.high);
                    let text = match extract_range(value, low, high) {
                        Ok(extracted) => describe(&extracted),
                        Err(_) => format!("n/a (bits {low}-{high} exceed {width}-bit value)"),
                    };
                    lines.push(format!("  {}: {text}", field.name));
                }
            }
            None => {
                lines.push("Predefined bit fields:".to_string());
                for field in &self.fields {
                    lines.push(format!("  {field}"));
                }
            }
        }

        lines.join("\n")
    }

    fn compare(&self, first: &str, second: Option<&str>) -> Result<String, CommandError> {
        if first.is_empty() {
            return Err(CommandError::Usage("cmp <literal> [<literal>]"));
        }

        let (value1, value2) = match second {
            Some(second) => (
                parse_with_mode(first, self.input_mode)?,
                parse_with_mode(second, self.input_mode)?,
            ),
            None => (
                self.last.clone().ok_or(CommandError::NoValue)?,
                parse_with_mode(first, self.input_mode)?,
            ),
        };

        let diff = compare(&value1, &value2, &self.fields);
        Ok(diff.report(&self.options))
    }
}

/// `0b<bits> (dec = <n>)`, as printed for extractions.
fn describe(value: &ParsedValue) -> String {
    format!(
        "0b{} (dec = {})",
        render::binary_digits(value),
        value.magnitude().to_decimal_string()
    )
}

/// Parses `r<a>-<b>`; the endpoints may come in either order.
fn parse_range(line: &str) -> Option<(usize, usize)> {
    let rest = line.strip_prefix('r').or_else(|| line.strip_prefix('R'))?;
    let (a, b) = rest.split_once('-')?;
    if a.is_empty()
        || b.is_empty()
        || !a.bytes().all(|c| c.is_ascii_digit())
        || !b.bytes().all(|c| c.is_ascii_digit())
    {
        return None;
    }

    let (a, b): (usize, usize) = (a.parse().ok()?, b.parse().ok()?);
    Some((a.min(b), a.max(b)))
}

/// Returns the text after `word` when the line starts with it as a whole word.
fn strip_word<'a>(line: &'a str, word: &str) -> Option<&'a str> {
    let head = line.get(..word.len())?;
    if !head.eq_ignore_ascii_case(word) {
        return None;
    }
    let rest = &line[word.len()..];
    if rest.is_empty() || rest.starts_with(char::is_whitespace) {
        Some(rest)
    } else {
        None
    }
}

pub fn help_text() -> String {
    [
        "Commands:",
        "  hex / dec / bin / auto    - Switch input mode",
        "  to_hex / to_dec / to_bin  - Switch output format",
        "  byte_align / dw_align     - Switch alignment mode",
        "  r<low>-<high>             - Extract bit range from last value",
        "  <field_name>              - Extract field from last value",
        "  list                      - Show field names (or their values)",
        "  cmp <lit> [<lit>]         - Compare two values (or last value with one)",
        "  fields <path>             - Load a JSONC field map",
        "  status / help / q         - Settings, this text, quit",
    ]
    .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shell() -> Shell {
        Shell::new(InputMode::Hex, DisplayOptions::default())
    }

    fn run(shell: &mut Shell, line: &str) -> String {
        match shell.execute(line).unwrap() {
            Step::Print(text) => text,
            Step::Quit => panic!("unexpected quit"),
        }
    }

    #[test]
    fn test_literal_in_hex_mode() {
        let mut shell = shell();
        let out = run(&mut shell, "1234");
        assert_eq!(
            out,
            "[Result] Input mode = hex, Output = hex, Alignment = byte_align\n\
             16'h12_34\n\
             byte1 [15:8]: 8'h12\n\
             byte0 [7:0]: 8'h34\n\
             --- Total 2 bytes ---"
        );
        let last = shell.last_value().and_then(ParsedValue::to_u64);
        assert_eq!(last, Some(0x1234));
    }

    #[test]
    fn test_range_and_field_extraction() {
        let mut shell = shell();
        run(&mut shell, "8'hA3");
        assert_eq!(run(&mut shell, "r4-7"), "bit 4-7 = 0b1010 (dec = 10)");
        assert_eq!(run(&mut shell, "r7-4"), "bit 4-7 = 0b1010 (dec = 10)");
        assert_eq!(
            run(&mut shell, "valid"),
            "bit 0-3 [valid] = 0b0011 (dec = 3)"
        );
    }

    #[test]
    fn test_failed_parse_keeps_last_value() {
        let mut shell = shell();
        run(&mut shell, "8'hA3");
        assert!(shell.execute("8'hZZ").is_err());
        let last = shell.last_value().and_then(ParsedValue::to_u64);
        assert_eq!(last, Some(0xA3));
    }

    #[test]
    fn test_extract_without_value() {
        let mut shell = shell();
        assert!(matches!(shell.execute("r0-3"), Err(CommandError::NoValue)));
    }

    #[test]
    fn test_extract_out_of_bounds() {
        let mut shell = shell();
        run(&mut shell, "8'hA3");
        let err = shell.execute("address").unwrap_err();
        assert_eq!(
            err.to_string(),
            "range out of bounds: bits 16-23 exceed a 8-bit value"
        );
    }

    #[test]
    fn test_mode_switches() {
        let mut shell = shell();
        assert_eq!(run(&mut shell, "dec"), "Input mode changed to: dec");
        assert_eq!(run(&mut shell, "to_bin"), "Output format changed to: bin");
        assert_eq!(
            run(&mut shell, "dw_align"),
            "Alignment mode changed to: dw_align"
        );
        assert_eq!(
            shell.status(),
            "Current settings: input = dec, output = bin, alignment = dw_align"
        );

        let out = run(&mut shell, "26");
        assert!(out.contains("8'b00011010"));
        assert!(out.ends_with("--- Total 1 bytes, 1 x 32-bit words ---"));
    }

    #[test]
    fn test_list_without_and_with_value() {
        let mut shell = shell();
        let out = run(&mut shell, "list");
        let expected = "Predefined bit fields:\n  opcode: bit 8-12";
        assert!(out.starts_with(expected));

        run(&mut shell, "1234");
        let out = run(&mut shell, "list");
        assert_eq!(
            out,
            "Last parsed value per field:\n\
             \x20 opcode: 0b10010 (dec = 18)\n\
             \x20 valid: 0b0100 (dec = 4)\n\
             \x20 flag: 0b0011 (dec = 3)\n\
             \x20 address: n/a (bits 16-23 exceed 16-bit value)\n\
             \x20 immediate: n/a (bits 24-31 exceed 16-bit value)"
        );
    }

    #[test]
    fn test_compare_two_literals() {
        let mut shell = shell();
        let out = run(&mut shell, "cmp 0x1234 0x1274");
        let expected = "Value 1: 16'h12_34\nValue 2: 16'h12_74\nValues differ";
        assert!(out.starts_with(expected));
        assert!(out.contains("flag [7:4]: 4'h03 -> 4'h07"));
        assert!(shell.last_value().is_none());
    }

    #[test]
    fn test_compare_against_last_value() {
        let mut shell = shell();
        run(&mut shell, "1234");
        let out = run(&mut shell, "cmp 1234");
        assert!(out.ends_with("Values are identical"));
    }

    #[test]
    fn test_compare_usage() {
        let mut shell = shell();
        assert!(matches!(shell.execute("cmp"), Err(CommandError::Usage(_))));

        let err = shell.execute("cmp 1 2 3").unwrap_err();
        assert!(matches!(err, CommandError::Usage(_)));
    }

    #[test]
    fn test_quit() {
        let mut shell = shell();
        assert_eq!(shell.execute("q").unwrap(), Step::Quit);
    }

    #[test]
    fn test_parse_range() {
        assert_eq!(parse_range("r12-8"), Some((8, 12)));
        assert_eq!(parse_range("r0-0"), Some((0, 0)));
        assert_eq!(parse_range("r-1"), None);
        assert_eq!(parse_range("ra-b"), None);
    }

    #[test]
    fn test_strip_word() {
        assert_eq!(strip_word("cmp 1 2", "cmp"), Some(" 1 2"));
        assert_eq!(strip_word("cmpx", "cmp"), None);
        assert_eq!(strip_word("fields", "fields"), Some(""));
    }
}
