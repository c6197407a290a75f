// src/lib.rs

pub mod scanner {
use clap::Parser;
use log::{debug, info, warn, LevelFilter};
use serde::Deserialize;
use simplelog::{ConfigBuilder, WriteLogger};
use std::{
    error::Error,
    fmt,
    fs::{File, OpenOptions},
    io::{self, BufRead, BufReader, Read},
    path::{Path, PathBuf},
    str::FromStr,
};

pub const USAGE: &str = "Usage: headermax <filename>";

/// Marker that opens a FASTA description line.
pub const DEFAULT_MARKER: char = '>';

const DEFAULT_CONFIG_FILE: &str = "headermax.json";

// -------------- Error type --------------

#[derive(Debug)]
pub enum HeaderMaxError {
    FileNotFound(PathBuf),
    Io(String),
    Decode { line: usize, reason: String },
    InvalidConfiguration(String),
    Logging(String),
}

impl fmt::Display for HeaderMaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeaderMaxError::FileNotFound(p) => write!(f, "File not found: {}", p.display()),
            HeaderMaxError::Io(e) => write!(f, "I/O error: {}", e),
            HeaderMaxError::Decode { line, reason } => {
                write!(f, "invalid UTF-8 on line {}: {}", line, reason)
            }
            HeaderMaxError::InvalidConfiguration(e) => write!(f, "Invalid configuration: {}", e),
            HeaderMaxError::Logging(e) => write!(f, "Logging setup failed: {}", e),
        }
    }
}

impl Error for HeaderMaxError {}

// -------------- Scanner --------------

/// Result of a completed scan.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ScanReport {
    /// Highest code point seen on any header line, `None` when there were no headers.
    pub max_code_point: Option<u32>,
    /// 1-based line number where the maximum was first reached.
    pub max_line: Option<usize>,
    pub lines_read: usize,
    pub header_lines: usize,
}

/// Whitespace stripped from both ends of a line: Unicode whitespace plus the
/// ASCII file, group, record and unit separators (U+001C..=U+001F).
pub fn is_strip_char(c: char) -> bool {
    c.is_whitespace() || ('\u{1c}'..='\u{1f}').contains(&c)
}

pub fn strip_line(line: &str) -> &str {
    line.trim_matches(is_strip_char)
}

/// Per-line step: the highest code point of `line` once stripped, if it is a header.
pub fn header_max(line: &str, marker: char) -> Option<u32> {
    let stripped = strip_line(line);
    if !stripped.starts_with(marker) {
        return None;
    }
    stripped.chars().map(u32::from).max()
}

fn fill<R: BufRead>(reader: &mut R) -> io::Result<&[u8]> {
    loop {
        match reader.fill_buf() {
            Ok(_) => break,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    // already buffered, so this returns without another read
    reader.fill_buf()
}

/// Reads one line into `buf`, terminator included. `\n`, `\r\n` and a lone
/// `\r` each end a line. Returns the number of bytes consumed, 0 at EOF.
pub fn read_line_any<R: BufRead>(reader: &mut R, buf: &mut Vec<u8>) -> io::Result<usize> {
    let mut read = 0;
    loop {
        let (end, used) = {
            let available = fill(reader)?;
            if available.is_empty() {
                return Ok(read);
            }
            match available.iter().position(|&b| b == b'\n' || b == b'\r') {
                Some(i) => {
                    buf.extend_from_slice(&available[..=i]);
                    (Some(available[i]), i + 1)
                }
                None => {
                    buf.extend_from_slice(available);
                    (None, available.len())
                }
            }
        };
        reader.consume(used);
        read += used;

        match end {
            Some(b'\r') => {
                if fill(reader)?.first() == Some(&b'\n') {
                    reader.consume(1);
                    buf.push(b'\n');
                    read += 1;
                }
                return Ok(read);
            }
            Some(_) => return Ok(read),
            None => {}
        }
    }
}

pub fn scan_reader<R: BufRead>(mut reader: R, marker: char) -> Result<ScanReport, HeaderMaxError> {
    let mut report = ScanReport::default();
    let mut buf = Vec::new();

    loop {
        buf.clear();
        let n = read_line_any(&mut reader, &mut buf)
            .map_err(|e| HeaderMaxError::Io(e.to_string()))?;
        if n == 0 {
            break;
        }
        report.lines_read += 1;

        let line = std::str::from_utf8(&buf).map_err(|e| HeaderMaxError::Decode {
            line: report.lines_read,
            reason: e.to_string(),
        })?;

        let Some(line_max) = header_max(line, marker) else {
            continue;
        };
        report.header_lines += 1;
        debug!("Header on line {}: max code point {}", report.lines_read, line_max);

        let raised = match report.max_code_point {
            Some(current) => line_max > current,
            None => true,
        };
        if raised {
            report.max_code_point = Some(line_max);
            report.max_line = Some(report.lines_read);
        }
    }

    Ok(report)
}

/// Maps a failed open of the input. Missing and unreadable files are both "not found".
pub fn open_error(path: &Path, e: io::Error) -> HeaderMaxError {
    match e.kind() {
        io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied => {
            HeaderMaxError::FileNotFound(path.to_path_buf())
        }
        _ => HeaderMaxError::Io(e.to_string()),
    }
}

/// Opens `path` and scans it. The handle is dropped before returning.
pub fn scan_file(path: &Path, marker: char) -> Result<ScanReport, HeaderMaxError> {
    let file = File::open(path).map_err(|e| open_error(path, e))?;
    scan_reader(BufReader::new(file), marker)
}

/// The single stdout line for a scan outcome.
pub fn render_outcome(outcome: &Result<ScanReport, HeaderMaxError>) -> String {
    match outcome {
        Ok(ScanReport { max_code_point: Some(n), .. }) => {
            format!("Max ASCII value across all lines: {}", n)
        }
        Ok(_) => "No valid lines found.".to_string(),
        Err(HeaderMaxError::FileNotFound(_)) => "Error: File not found.".to_string(),
        Err(e) => format!("An error occurred: {}", e),
    }
}

// -------------- Config structures --------------

#[derive(Deserialize)]
struct RawConfig {
    schema_version: Option<String>,
    marker: Option<String>,

    log_enabled: Option<bool>,
    log_level: Option<String>,
    log_file: Option<String>,
    log_append: Option<bool>,
}

impl Default for RawConfig {
    fn default() -> Self {
        RawConfig {
            schema_version: Some("1.0".into()),
            marker: Some(DEFAULT_MARKER.to_string()),

            log_enabled: Some(false),
            log_level: Some("info".into()),
            log_file: Some("headermax.log".into()),
            log_append: Some(true),
        }
    }
}

fn load_raw_config(path: &Path) -> Result<RawConfig, HeaderMaxError> {
    let f = File::open(path).map_err(|e| {
        HeaderMaxError::InvalidConfiguration(format!("cannot open {}: {}", path.display(), e))
    })?;
    let mut s = String::new();
    BufReader::new(f)
        .read_to_string(&mut s)
        .map_err(|e| HeaderMaxError::Io(e.to_string()))?;
    serde_json::from_str(&s).map_err(|e| {
        HeaderMaxError::InvalidConfiguration(format!("{}: {}", path.display(), e))
    })
}

#[derive(Parser)]
#[command(name = "headermax", version, about = "Report the highest code point found on header lines")]
pub struct Cli {
    /// Path to config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Character that opens a header line
    #[arg(long)]
    marker: Option<String>,

    #[arg(long)] log_enabled: Option<bool>,
    #[arg(long)] log_level: Option<String>,
    #[arg(long)] log_file: Option<String>,
    #[arg(long)] log_append: Option<bool>,

    /// File to scan
    pub files: Vec<PathBuf>,
}

#[derive(Debug)]
pub struct Config {
    input: PathBuf,
    marker: char,

    log_enabled: bool,
    log_level: LevelFilter,
    log_file: String,
    log_append: bool,
}

impl Config {
    pub fn from(cli: Cli) -> Result<Self, HeaderMaxError> {
        // 1) Locate config file; only --config is required to load
        let (path, explicit) = if let Some(cfg) = cli.config {
            (Some(cfg), true)
        } else if let Ok(env) = std::env::var("HEADERMAX_CONFIG") {
            (Some(PathBuf::from(env)), false)
        } else if Path::new(DEFAULT_CONFIG_FILE).exists() {
            (Some(PathBuf::from(DEFAULT_CONFIG_FILE)), false)
        } else {
            (None, false)
        };

        // 2) Load JSON and merge over defaults
        let mut raw = RawConfig::default();
        let file_cfg = match path {
            Some(path) => match load_raw_config(&path) {
                Ok(file_cfg) => Some(file_cfg),
                Err(e) if !explicit => {
                    eprintln!("warning: ignoring config {}: {}", path.display(), e);
                    None
                }
                Err(e) => return Err(e),
            },
            None => None,
        };
        if let Some(file_cfg) = file_cfg {
            raw = RawConfig {
                schema_version: file_cfg.schema_version.or(raw.schema_version),
                marker: file_cfg.marker.or(raw.marker),
                log_enabled: file_cfg.log_enabled.or(raw.log_enabled),
                log_level: file_cfg.log_level.or(raw.log_level),
                log_file: file_cfg.log_file.or(raw.log_file),
                log_append: file_cfg.log_append.or(raw.log_append),
            };
        }
        if raw.schema_version.as_deref() != Some("1.0") {
            return Err(HeaderMaxError::InvalidConfiguration(format!(
                "unsupported schema_version {:?}",
                raw.schema_version
            )));
        }

        // 3) Override with CLI
        let override_str = |cli: Option<String>, raw: Option<String>, default: String| {
            cli.or(raw).unwrap_or(default)
        };
        let override_bool = |cli: Option<bool>, raw: Option<bool>, default: bool| {
            cli.or(raw).unwrap_or(default)
        };

        let marker = override_str(cli.marker, raw.marker, DEFAULT_MARKER.to_string());
        let log_enabled = override_bool(cli.log_enabled, raw.log_enabled, false);
        let log_level = override_str(cli.log_level, raw.log_level, "info".into());
        let log_file = override_str(cli.log_file, raw.log_file, "headermax.log".into());
        let log_append = override_bool(cli.log_append, raw.log_append, true);

        // 4) Validate
        let mut files = cli.files;
        if files.len() != 1 {
            return Err(HeaderMaxError::InvalidConfiguration(format!(
                "expected exactly one input file, got {}",
                files.len()
            )));
        }
        let input = files.remove(0);

        let mut chars = marker.chars();
        let marker = match (chars.next(), chars.next()) {
            (Some(c), None) if !c.is_whitespace() => c,
            _ => {
                return Err(HeaderMaxError::InvalidConfiguration(format!(
                    "marker must be a single non-whitespace character, got {:?}",
                    marker
                )));
            }
        };

        let log_level = LevelFilter::from_str(&log_level).map_err(|_| {
            HeaderMaxError::InvalidConfiguration(format!("unknown log_level {:?}", log_level))
        })?;

        Ok(Config {
            input,
            marker,
            log_enabled,
            log_level,
            log_file,
            log_append,
        })
    }

    pub fn input(&self) -> &Path {
        &self.input
    }

    pub fn marker(&self) -> char {
        self.marker
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }
}

// -------------- Main --------------

fn init_logging(cfg: &Config) -> Result<(), HeaderMaxError> {
    let file = OpenOptions::new()
        .append(cfg.log_append)
        .write(true)
        .truncate(!cfg.log_append)
        .create(true)
        .open(&cfg.log_file)
        .map_err(|e| HeaderMaxError::Logging(format!("{}: {}", cfg.log_file, e)))?;
    let log_cfg = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .build();
    WriteLogger::init(cfg.log_level, log_cfg, file)
        .map_err(|e| HeaderMaxError::Logging(e.to_string()))
}

pub(crate) fn main_internal(cfg: Config) -> Result<(), Box<dyn Error>> {
    if cfg.log_enabled {
        init_logging(&cfg)?;
    }

    info!("Scanning {} for '{}' header lines", cfg.input.display(), cfg.marker);
    let outcome = scan_file(&cfg.input, cfg.marker);
    match &outcome {
        Ok(report) => info!(
            "Read {} lines, {} headers, max {:?} on line {:?}",
            report.lines_read, report.header_lines, report.max_code_point, report.max_line
        ),
        Err(e) => warn!("Scan of {} failed: {}", cfg.input.display(), e),
    }

    println!("{}", render_outcome(&outcome));
    Ok(())
}


}

use clap::Parser;

/// A convenient entrypoint for the binary:
pub fn run_app() -> Result<(), Box<dyn std::error::Error>> {
    let cli = crate::scanner::Cli::parse();
    if cli.files.len() != 1 {
        println!("{}", crate::scanner::USAGE);
        return Ok(());
    }
    let cfg = crate::scanner::Config::from(cli)?;

    crate::scanner::main_internal(cfg)?;
    Ok(())
}
