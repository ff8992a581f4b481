//! stemma - Lyric batch editing for choir scores
//!
//! Reads a JSON score, runs one lyric operation over it and writes the
//! result back (or to `--output`).

mod config;
mod error;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use stemma_core::{
    apply_words, copy_lyrics_from_top, export_tsv, import_tsv, render_words, search_and_replace, CancelToken,
    MatchMode, Score, Selection, Tick,
};

use crate::config::Config;

#[derive(Parser, Debug)]
#[command(name = "stemma")]
#[command(author, version, about = "Lyric search/replace and cross-staff lyric transfer", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path (default: ~/.config/stemma/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

/// Where a command reads its score and writes the result.
#[derive(clap::Args, Debug)]
struct ScoreArgs {
    /// Score file (JSON)
    #[arg(value_name = "SCORE")]
    score: PathBuf,

    /// Write the changed score here instead of overwriting SCORE
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,
}

/// Staff and tick range of a selection. Staves are numbered from 0.
#[derive(clap::Args, Debug)]
struct RangeArgs {
    /// First tick of the range
    #[arg(long, default_value = "0")]
    start: Tick,

    /// Tick after the range (0 = end of score)
    #[arg(long, default_value = "0")]
    end: Tick,
}

/// Lyric line for the word text commands.
#[derive(clap::Args, Debug)]
struct LineArgs {
    /// Staff number (from 0)
    #[arg(long, default_value = "0")]
    staff: usize,

    /// Voice number (0-3)
    #[arg(long, default_value = "0")]
    voice: usize,

    /// Verse number (from 1)
    #[arg(long, default_value = "1", value_parser = clap::value_parser!(u32).range(1..))]
    verse: u32,
}

impl LineArgs {
    fn verse(&self) -> usize {
        self.verse as usize - 1
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Replace a hyphenated syllable sequence everywhere in the score
    Replace {
        #[command(flatten)]
        io: ScoreArgs,

        /// Syllables to find, e.g. "mi-ti"
        search: String,

        /// Syllables to write, e.g. "mi-tä"
        replace: String,

        /// Match the search text only, never the replacement text
        #[arg(long)]
        strict: bool,
    },

    /// Copy lyrics from the top staff onto the staves below it
    CopyLyrics {
        #[command(flatten)]
        io: ScoreArgs,

        /// Reference staff
        #[arg(long, default_value = "0")]
        from: usize,

        /// Last target staff (default: the last staff)
        #[arg(long)]
        to: Option<usize>,

        #[command(flatten)]
        range: RangeArgs,
    },

    /// Write every syllable as TSV
    ExportTsv {
        /// Score file (JSON)
        score: PathBuf,

        /// TSV file to write (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Apply an edited TSV file to existing syllables
    ImportTsv {
        #[command(flatten)]
        io: ScoreArgs,

        /// TSV file to read
        tsv: PathBuf,

        /// Do not color changed syllables
        #[arg(long)]
        no_highlight: bool,
    },

    /// Print one lyric line as words
    Words {
        /// Score file (JSON)
        score: PathBuf,

        #[command(flatten)]
        line: LineArgs,

        #[command(flatten)]
        range: RangeArgs,

        /// Ticks per measure for line breaks (overrides config)
        #[arg(long)]
        measure_ticks: Option<Tick>,
    },

    /// Distribute words from a text file onto the chords of one staff
    ApplyWords {
        #[command(flatten)]
        io: ScoreArgs,

        /// Text file with the words
        text: PathBuf,

        #[command(flatten)]
        line: LineArgs,

        #[command(flatten)]
        range: RangeArgs,
    },

    /// Create a default configuration file
    Init,

    /// Show the configuration file path
    ConfigPath,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let user_error = e
                .downcast_ref::<stemma_core::Error>()
                .is_some_and(stemma_core::Error::is_user_input);
            if user_error {
                eprintln!("{}", e);
                ExitCode::from(2)
            } else {
                eprintln!("Error: {:#}", e);
                ExitCode::FAILURE
            }
        }
    }
}

fn init_logger(level: &str) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

/// Cancellation token tripped by Ctrl-C.
fn cancel_on_interrupt() -> Result<CancelToken> {
    let cancel = CancelToken::new();
    signal_hook::flag::register(signal_hook::consts::SIGINT, cancel.flag())
        .context("Failed to install Ctrl-C handler")?;
    Ok(cancel)
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("Failed to read config file: {}", path.display())),
        None => Ok(Config::load_or_default()),
    }
}

fn load_score(path: &Path) -> Result<Score> {
    Score::load(path).with_context(|| format!("Failed to read score: {}", path.display()))
}

fn save_score(score: &Score, io: &ScoreArgs) -> Result<()> {
    let path = io.output.as_deref().unwrap_or(&io.score);
    score
        .save(path)
        .with_context(|| format!("Failed to write score: {}", path.display()))?;
    log::info!("Wrote {}", path.display());
    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Init => {
            let path = Config::create_default_config_file()?;
            println!("Created default config at: {}", path.display());
            return Ok(());
        }
        Commands::ConfigPath => {
            let path = Config::config_path()?;
            println!("{}", path.display());
            return Ok(());
        }
        _ => {}
    }

    let config = load_config(cli.config.as_deref())?;
    init_logger(&config.log.level);
    let cancel = cancel_on_interrupt()?;

    match cli.command {
        Commands::Replace {
            io,
            search,
            replace,
            strict,
        } => {
            let mut score = load_score(&io.score)?;
            let mut options = config.replace_options();
            if strict {
                options.mode = MatchMode::Strict;
            }
            let report = search_and_replace(&mut score, &search, &replace, options, &cancel)?;
            save_score(&score, &io)?;
            println!(
                "{} replacements on {} staves ({} syllables rewritten, {} removed)",
                report.windows, report.staves, report.rewritten, report.removed
            );
        }
        Commands::CopyLyrics { io, from, to, range } => {
            let mut score = load_score(&io.score)?;
            let last = to.unwrap_or_else(|| score.staves.len().saturating_sub(1));
            let selection = Selection::new(from, last, range.start, range.end);
            let report = copy_lyrics_from_top(&mut score, &selection, &cancel)?;
            save_score(&score, &io)?;
            println!(
                "Copied lyrics to {} staves: {} exact matches, {} gap fills",
                report.staves, report.exact, report.gap_fills
            );
        }
        Commands::ExportTsv { score, output } => {
            let score = load_score(&score)?;
            let tsv = export_tsv(&score);
            match output {
                Some(path) => {
                    fs::write(&path, &tsv).with_context(|| format!("Failed to write TSV: {}", path.display()))?;
                    eprintln!("Exported {} syllables to {}", tsv.lines().count(), path.display());
                }
                None => print!("{}", tsv),
            }
        }
        Commands::ImportTsv { io, tsv, no_highlight } => {
            let mut score = load_score(&io.score)?;
            let input = fs::read_to_string(&tsv).with_context(|| format!("Failed to read TSV: {}", tsv.display()))?;
            let mut options = config.import_options();
            if no_highlight {
                options.highlight = None;
            }
            let report = import_tsv(&mut score, &input, options, &cancel)?;
            save_score(&score, &io)?;
            println!(
                "{} records read, {} updates, {} skipped",
                report.records, report.updates, report.skipped
            );
        }
        Commands::Words {
            score,
            line,
            range,
            measure_ticks,
        } => {
            let score = load_score(&score)?;
            let mut options = config.words_options(line.voice, line.verse());
            if let Some(ticks) = measure_ticks {
                options.measure_ticks = Some(ticks).filter(|&m| m > 0);
            }
            let selection = Selection::staff(line.staff).with_range(range.start, range.end);
            println!("{}", render_words(&score, &selection, &options)?);
        }
        Commands::ApplyWords { io, text, line, range } => {
            let mut score = load_score(&io.score)?;
            let words = fs::read_to_string(&text).with_context(|| format!("Failed to read words: {}", text.display()))?;
            let options = config.words_options(line.voice, line.verse());
            let selection = Selection::staff(line.staff).with_range(range.start, range.end);
            let report = apply_words(&mut score, &selection, &options, &words, &cancel)?;
            save_score(&score, &io)?;
            println!(
                "{} syllables assigned, {} cleared, {} left over",
                report.assigned, report.cleared, report.surplus
            );
        }
        Commands::Init | Commands::ConfigPath => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_replace() {
        let cli = Cli::parse_from(["stemma", "replace", "mass.json", "mi-ti", "mi-tä", "--strict", "-o", "out.json"]);
        match cli.command {
            Commands::Replace {
                io,
                search,
                replace,
                strict,
            } => {
                assert_eq!(io.score, PathBuf::from("mass.json"));
                assert_eq!(io.output, Some(PathBuf::from("out.json")));
                assert_eq!(search, "mi-ti");
                assert_eq!(replace, "mi-tä");
                assert!(strict);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_verse_numbers_start_at_one() {
        assert!(Cli::try_parse_from(["stemma", "words", "mass.json", "--verse", "0"]).is_err());
        let cli = Cli::parse_from(["stemma", "words", "mass.json", "--verse", "2"]);
        match cli.command {
            Commands::Words { line, .. } => assert_eq!(line.verse(), 1),
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_replace_writes_output_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.json");
        let output = dir.path().join("out.json");
        let score = Score::new().with_staff(stemma_core::Staff::new("S").with_voice(
            0,
            vec![stemma_core::NoteEvent::chord(0).with_lyric(stemma_core::Syllable::single("la"))],
        ));
        score.save(&input).unwrap();

        let cli = Cli::parse_from([
            "stemma",
            "replace",
            input.to_str().unwrap(),
            "la",
            "lu",
            "-o",
            output.to_str().unwrap(),
        ]);
        let Commands::Replace { io, search, replace, .. } = cli.command else {
            panic!("expected replace");
        };
        let mut score = load_score(&io.score).unwrap();
        search_and_replace(&mut score, &search, &replace, Default::default(), &CancelToken::new()).unwrap();
        save_score(&score, &io).unwrap();

        let written = Score::load(&output).unwrap();
        assert_eq!(written.staves[0].voice(0)[0].lyrics()[0].text, "lu");
        assert_eq!(Score::load(&input).unwrap().staves[0].voice(0)[0].lyrics()[0].text, "la");
    }
}
