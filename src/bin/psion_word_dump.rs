use anyhow::{Context, Result, bail, format_err};
use clap::{Arg, ArgAction, ArgMatches, Command};
use dialoguer::Confirm;
use indoc::indoc;

use log::{Level, LevelFilter, info, warn};
use psion_word::{ParserSettings, ProcessError, WordParser};
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};
use std::collections::{HashSet, VecDeque};
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::exit;

#[cfg(feature = "multithreading")]
use rayon::prelude::*;

/// Extension of Psion Word documents, used when walking directories.
const WORD_EXTENSION: &str = "wrd";

struct PsionWordDump {
    parser_settings: ParserSettings,
    inputs: Vec<String>,
    halt_on_error: bool,
    num_threads: usize,
    output: Box<dyn Write>,
    verbosity_level: Option<Level>,
}

impl PsionWordDump {
    pub fn from_cli_matches(matches: &ArgMatches) -> Result<Self> {
        let inputs: Vec<String> = matches
            .get_many::<String>("INPUT")
            .map(|values| values.cloned().collect())
            .unwrap_or_default();

        let num_threads = *matches.get_one::<usize>("num-threads").unwrap_or(&0);
        let num_threads = match (cfg!(feature = "multithreading"), num_threads) {
            (true, number) => number,
            (false, 0 | 1) => 1,
            (false, _) => {
                eprintln!(
                    "turned on threads, but binary was compiled without `multithreading` feature! converting files one by one"
                );
                1
            }
        };

        let verbosity_level = match matches.get_count("verbose") {
            0 => None,
            1 => Some(Level::Info),
            2 => Some(Level::Debug),
            3 => Some(Level::Trace),
            _ => {
                eprintln!("using more than -vvv does not affect verbosity level");
                Some(Level::Trace)
            }
        };

        let output: Box<dyn Write> = match matches.get_one::<String>("output-target") {
            Some(path) => {
                let file = Self::create_output_file(path, !matches.get_flag("no-confirm-overwrite"))
                    .with_context(|| {
                        format!("An error occurred while creating output file at `{path}`")
                    })?;
                Box::new(file)
            }
            None => Box::new(io::stdout()),
        };

        Ok(PsionWordDump {
            parser_settings: ParserSettings::new()
                .show_diagnostics(verbosity_level.is_some())
                .include_outer_text(matches.get_flag("outer"))
                .markdown(matches.get_flag("markdown")),
            inputs,
            halt_on_error: matches.get_flag("stop"),
            num_threads,
            output,
            verbosity_level,
        })
    }

    /// Main entry point for `PsionWordDump`
    pub fn run(&mut self) -> Result<()> {
        self.try_to_initialize_logging();

        let files = collect_input_paths(&self.inputs)?;
        if files.is_empty() {
            bail!("No input files found.");
        }

        let results = convert_all(&files, &self.parser_settings, self.num_threads)?;

        for (path, result) in files.iter().zip(results) {
            match result {
                Ok(text) => {
                    writeln!(self.output, "{text}").context("Failed to write output")?;
                    info!("File {} processed", path.display());
                }
                Err(e) => {
                    if self.halt_on_error {
                        self.output.flush().context("Failed to flush output")?;
                        eprintln!("{}", e);
                        exit(e.code());
                    }
                    warn!("{}", e);
                }
            }
        }

        self.output.flush().context("Failed to flush output")?;
        Ok(())
    }

    /// If `prompt` is passed, will display a confirmation prompt before overwriting files.
    fn create_output_file(path: impl AsRef<Path>, prompt: bool) -> Result<File> {
        let p = path.as_ref();

        if p.is_dir() {
            bail!(
                "There is a directory at {}, refusing to overwrite",
                p.display()
            );
        }

        if p.exists() {
            if prompt {
                match Confirm::new()
                    .with_prompt(format!(
                        "Are you sure you want to override output file at {}",
                        p.display()
                    ))
                    .default(false)
                    .interact()
                {
                    Ok(true) => Ok(File::create(p)?),
                    Ok(false) => bail!("Cancelled"),
                    Err(e) => Err(format_err!(
                        "Failed to write confirmation prompt to term caused by\n{}",
                        e
                    )),
                }
            } else {
                Ok(File::create(p)?)
            }
        } else {
            // Ok to assume p is not an existing directory
            match p.parent() {
                Some(parent) => {
                    if !parent.as_os_str().is_empty() && !parent.exists() {
                        fs::create_dir_all(parent)?;
                    }
                    Ok(File::create(p)?)
                }
                None => bail!("Output file cannot be root."),
            }
        }
    }

    fn try_to_initialize_logging(&self) {
        let level = match self.verbosity_level {
            Some(level) => level.to_level_filter(),
            None => LevelFilter::Warn,
        };

        if let Err(e) = TermLogger::init(
            level,
            Config::default(),
            TerminalMode::Stderr,
            ColorChoice::Auto,
        ) {
            eprintln!("Failed to initialize logging: {:?}", e);
        }
    }
}

fn convert(path: &Path, settings: &ParserSettings) -> Result<String, ProcessError> {
    WordParser::from_path(path)?
        .with_configuration(settings.clone())
        .to_text()
}

/// Converts every file, returning the results in the order of `files`.
#[cfg(feature = "multithreading")]
fn convert_all(
    files: &[PathBuf],
    settings: &ParserSettings,
    num_threads: usize,
) -> Result<Vec<psion_word::Result<String>>> {
    if num_threads == 1 || files.len() == 1 {
        return Ok(files.iter().map(|f| convert(f, settings)).collect());
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build()
        .context("Failed to initialize thread pool")?;

    // `collect` on an indexed parallel iterator keeps the input order.
    Ok(pool.install(|| files.par_iter().map(|f| convert(f, settings)).collect()))
}

#[cfg(not(feature = "multithreading"))]
fn convert_all(
    files: &[PathBuf],
    settings: &ParserSettings,
    _num_threads: usize,
) -> Result<Vec<psion_word::Result<String>>> {
    Ok(files.iter().map(|f| convert(f, settings)).collect())
}

fn is_glob_pattern(input: &str) -> bool {
    input.contains(['*', '?', '['])
}

/// Expands the positional inputs into the list of files to convert.
///
/// Explicit files are kept whatever their extension, and so are paths that do not exist so
/// that their failure is reported. Directories are walked recursively for `.wrd` files; glob
/// patterns are expanded first and their matches treated the same way.
fn collect_input_paths(inputs: &[String]) -> Result<Vec<PathBuf>> {
    let mut expanded = vec![];

    for input in inputs {
        if is_glob_pattern(input) && !Path::new(input).exists() {
            for entry in
                glob::glob(input).with_context(|| format!("invalid glob pattern `{input}`"))?
            {
                match entry {
                    Ok(p) => expanded.push(p),
                    Err(e) => warn!("glob entry error: {e}"),
                }
            }
        } else {
            expanded.push(PathBuf::from(input));
        }
    }

    let mut seen = HashSet::new();
    let mut files = vec![];

    for input in expanded {
        if !input.is_dir() {
            if seen.insert(input.clone()) {
                files.push(input);
            }
            continue;
        }

        let mut dir_files = vec![];
        let mut queue = VecDeque::new();
        queue.push_back(input);

        while let Some(dir) = queue.pop_front() {
            let entries = match fs::read_dir(&dir) {
                Ok(e) => e,
                Err(e) => {
                    warn!("Failed to read directory {}: {}", dir.display(), e);
                    continue;
                }
            };

            for entry in entries.flatten() {
                let p = entry.path();
                if p.is_dir() {
                    queue.push_back(p);
                } else if p.is_file() && is_word_file(&p) {
                    dir_files.push(p);
                }
            }
        }

        // Directory listing order is platform dependent.
        dir_files.sort();
        for p in dir_files {
            if seen.insert(p.clone()) {
                files.push(p);
            }
        }
    }

    Ok(files)
}

fn is_word_file(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(WORD_EXTENSION))
}

fn command() -> Command {
    Command::new("psion_word_dump")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Utility to convert Psion Series 3 Word documents to text or Markdown")
        .arg(
            Arg::new("INPUT")
                .required(true)
                .action(ArgAction::Append)
                .help("Word files, directories or glob patterns to convert."),
        )
        .arg(
            Arg::new("outer")
                .short('o')
                .long("outer")
                .action(ArgAction::SetTrue)
                .help("Include the document's header and footer text."),
        )
        .arg(
            Arg::new("markdown")
                .short('m')
                .long("markdown")
                .action(ArgAction::SetTrue)
                .help("Output Markdown instead of plain text."),
        )
        .arg(
            Arg::new("stop")
                .short('s')
                .long("stop")
                .action(ArgAction::SetTrue)
                .help("Stop at the first file that fails to convert, exiting with its error code."),
        )
        .arg(
            Arg::new("num-threads")
                .short('t')
                .long("threads")
                .default_value("0")
                .value_parser(clap::value_parser!(usize))
                .help("Sets the number of worker threads, defaults to number of CPU cores."),
        )
        .arg(
            Arg::new("output-target")
                .long("output")
                .short('f')
                .value_name("PATH")
                .help(indoc!("
                    Writes output to the file specified instead of stdout, errors will still be printed to stderr.
                    Will ask for confirmation before overwriting files, to allow overwriting, pass `--no-confirm-overwrite`
                    Will create parent directories if needed.")),
        )
        .arg(
            Arg::new("no-confirm-overwrite")
                .long("no-confirm-overwrite")
                .action(ArgAction::SetTrue)
                .help(indoc!("
                    When set, will not ask for confirmation before overwriting files, useful for automation")),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .action(ArgAction::Count)
                .help(indoc!("
                    Sets debug prints level for the application:
                        -v   - info, also turns on record diagnostics
                        -vv  - debug
                        -vvv - trace
                    NOTE: trace output is only available in debug builds, as it is extremely verbose.")),
        )
}

fn main() -> Result<()> {
    let matches = command().get_matches();

    let mut app = PsionWordDump::from_cli_matches(&matches)?;
    app.run()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_is_well_formed() {
        command().debug_assert();
    }

    fn word_file(dir: &Path, name: &str, text: &[u8]) -> PathBuf {
        let mut data = b"PSIONWPDATAFILE".to_vec();
        data.resize(40, 0);

        let mut style = vec![0_u8; 80];
        style[..2].copy_from_slice(b"BT");
        let mut emphasis = vec![0_u8; 28];
        emphasis[..2].copy_from_slice(b"NN");
        emphasis[18] = 0x01;
        let mut blocks = (text.len() as u16).to_le_bytes().to_vec();
        blocks.extend_from_slice(b"BTNN");

        let records: [(u16, &[u8]); 9] = [
            (1, &[0; 10]),
            (2, &[0; 58]),
            (3, &[]),
            (4, b"\0"),
            (5, b"\0"),
            (6, &style),
            (7, &emphasis),
            (8, text),
            (9, &blocks),
        ];
        for (type_value, payload) in records {
            data.extend_from_slice(&type_value.to_le_bytes());
            data.extend_from_slice(&(payload.len() as u16).to_le_bytes());
            data.extend_from_slice(payload);
        }

        let path = dir.join(name);
        fs::write(&path, data).unwrap();
        path
    }

    #[test]
    fn test_parallel_conversion_keeps_input_order() {
        let d = tempfile::tempdir().unwrap();
        let files = vec![
            word_file(d.path(), "c.wrd", b"third\0"),
            word_file(d.path(), "a.wrd", b"first\0"),
            d.path().join("missing.wrd"),
            word_file(d.path(), "b.wrd", b"second\0"),
        ];

        let results = convert_all(&files, &ParserSettings::new(), 3).unwrap();
        let texts: Vec<Option<String>> = results.into_iter().map(|r| r.ok()).collect();
        assert_eq!(
            texts,
            vec![
                Some("third\n".to_string()),
                Some("first\n".to_string()),
                None,
                Some("second\n".to_string()),
            ]
        );
    }

    #[test]
    fn test_glob_detection() {
        assert!(is_glob_pattern("docs/*.wrd"));
        assert!(is_glob_pattern("letter?.WRD"));
        assert!(!is_glob_pattern("plain.wrd"));
    }

    #[test]
    fn test_word_extension_is_case_insensitive() {
        assert!(is_word_file(Path::new("a/LETTER.WRD")));
        assert!(is_word_file(Path::new("letter.wrd")));
        assert!(!is_word_file(Path::new("letter.txt")));
        assert!(!is_word_file(Path::new("letter")));
    }
}
