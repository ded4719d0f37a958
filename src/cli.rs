use std::str::FromStr;

use clap::{App, Arg, ArgMatches};
use log::LevelFilter;
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};

use crate::{diagnostics::config::TracingConfig, io::Format, result::Result};

// Exit code for every kind of failure
pub const ERR_FAILURE: i32 = 1;

/// The phase after which the compiler stops.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Stage {
    Scan,
    Parse,
    Print,
    Resolve,
    TypeCheck,
    Codegen,
}

impl FromStr for Stage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "scan" => Ok(Stage::Scan),
            "parse" => Ok(Stage::Parse),
            "print" => Ok(Stage::Print),
            "resolve" => Ok(Stage::Resolve),
            "typecheck" => Ok(Stage::TypeCheck),
            "codegen" => Ok(Stage::Codegen),
            _ => Err(format!("Unknown stage: {}", s)),
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Scan => f.write_str("scan"),
            Stage::Parse => f.write_str("parse"),
            Stage::Print => f.write_str("print"),
            Stage::Resolve => f.write_str("resolve"),
            Stage::TypeCheck => f.write_str("typecheck"),
            Stage::Codegen => f.write_str("codegen"),
        }
    }
}

/// Writes every error of a failed phase to stderr, followed by a summary
/// line naming the phase.
pub fn print_errs(stage: Stage, errs: &[String]) {
    for e in errs {
        eprintln!("{} error: {}", stage, e);
    }
    eprintln!("{} failed with {} error(s)", stage, errs.len());
}

pub fn configure_cli() -> clap::App<'static, 'static> {
    App::new("B-minor Compiler")
        .version("0.1.0")
        .about("Compiles B-minor source files into x86-64 assembly for the GNU assembler")
        .arg(
            Arg::with_name("input")
                .short("i")
                .long("input")
                .takes_value(true)
                .required(true)
                .help("Source code file to compile.  Files ending in .json, .yaml or .yml are read as an already parsed declaration tree."),
        )
        .arg(
            Arg::with_name("output")
                .short("o")
                .long("output")
                .takes_value(true)
                .help("Name the output file that the assembly will be written to.  Required by the codegen stage."),
        )
        .arg(
            Arg::with_name("stage")
                .long("stage")
                .possible_values(&["scan", "parse", "print", "resolve", "typecheck", "codegen"])
                .default_value("codegen")
                .takes_value(true)
                .help("The compiler will stop after this stage"),
        )
        .arg(
            Arg::with_name("format")
                .long("format")
                .possible_values(&["source", "json", "yaml"])
                .default_value("source")
                .takes_value(true)
                .help("How the print stage writes the declaration tree"),
        )
        .arg(
            Arg::with_name("log")
                .long("log")
                .possible_values(&["off", "error", "warn", "info", "debug", "trace"])
                .takes_value(true)
                .help("Enables logging to stderr at the given level"),
        )
        .arg(
            Arg::with_name("trace-lexer")
                .long("trace-lexer")
                .takes_value(true)
                .help("Prints out a trace of all the steps the lexer follows as it converts the source text into tokens.  Takes `all`, `off`, a line `N` or a range `N-M`, `-N`, `N-`.")
        )
        .arg(
            Arg::with_name("trace-parser")
                .long("trace-parser")
                .takes_value(true)
                .help("Prints out a trace of all the steps the parser follows as it converts the token vector into a declaration tree.  The current token is printed next to the step.")
        )
}

pub fn get_stage(args: &ArgMatches) -> Result<Stage> {
    args.value_of("stage").map_or(Ok(Stage::Codegen), Stage::from_str)
}

pub fn get_format(args: &ArgMatches) -> Result<Format> {
    args.value_of("format").map_or(Ok(Format::Source), Format::from_str)
}

pub fn get_log_level(args: &ArgMatches) -> Option<LevelFilter> {
    args.value_of("log")
        .and_then(|level| LevelFilter::from_str(level).ok())
}

pub fn configure_logging(level: LevelFilter) -> Result<()> {
    TermLogger::init(
        level,
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )
    .map_err(|e| format!("Failed to configure logger: {}", e))
}

pub fn get_lexer_tracing(args: &ArgMatches) -> Result<TracingConfig> {
    get_tracing(args, "trace-lexer")
}

pub fn get_parser_tracing(args: &ArgMatches) -> Result<TracingConfig> {
    get_tracing(args, "trace-parser")
}

fn get_tracing(args: &ArgMatches, arg: &str) -> Result<TracingConfig> {
    args.value_of(arg)
        .map_or(Ok(TracingConfig::Off), TracingConfig::from_str)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(argv: &[&str]) -> ArgMatches<'static> {
        let mut full = vec!["bminorc"];
        full.extend_from_slice(argv);
        configure_cli().get_matches_from(full)
    }

    #[test]
    fn defaults() {
        let config = args(&["-i", "prog.bminor"]);
        assert_eq!(get_stage(&config), Ok(Stage::Codegen));
        assert_eq!(get_format(&config), Ok(Format::Source));
        assert_eq!(get_log_level(&config), None);
        assert_eq!(get_lexer_tracing(&config), Ok(TracingConfig::Off));
        assert_eq!(config.value_of("output"), None);
    }

    #[test]
    fn every_option() {
        let config = args(&[
            "-i",
            "prog.bminor",
            "-o",
            "prog.s",
            "--stage",
            "resolve",
            "--format",
            "yaml",
            "--log",
            "debug",
            "--trace-parser",
            "2-4",
        ]);
        assert_eq!(get_stage(&config), Ok(Stage::Resolve));
        assert_eq!(get_format(&config), Ok(Format::Yaml));
        assert_eq!(get_log_level(&config), Some(LevelFilter::Debug));
        assert_eq!(get_parser_tracing(&config), Ok(TracingConfig::Between(2, 4)));
        assert_eq!(config.value_of("output"), Some("prog.s"));
    }

    #[test]
    fn bad_trace_range() {
        let config = args(&["-i", "prog.bminor", "--trace-lexer", "x-y"]);
        assert!(get_lexer_tracing(&config).is_err());
    }

    #[test]
    fn stage_names() {
        for stage in &[
            Stage::Scan,
            Stage::Parse,
            Stage::Print,
            Stage::Resolve,
            Stage::TypeCheck,
            Stage::Codegen,
        ] {
            assert_eq!(stage.to_string().parse::<Stage>(), Ok(*stage));
        }
    }
}
