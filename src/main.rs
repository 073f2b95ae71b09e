//! syntaxcolor - print source files with syntax coloring
//!
//! The command line front end of the controller: loads a file, colors it
//! with a built-in or user-supplied syntax definition and writes it to
//! stdout as ANSI-styled text.

use std::env;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::process;

use syntaxcolor::error::{Error, Result};
use syntaxcolor::render::{self, RenderOptions};
use syntaxcolor::syntax::builtin;
use syntaxcolor::{Config, SyntaxColoredTextController, SyntaxDefinition};

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Parsed command line
#[derive(Debug, Default)]
struct Options {
    syntax: Option<String>,
    definition: Option<PathBuf>,
    prefs: Option<PathBuf>,
    line_numbers: bool,
    tab_width: Option<usize>,
    list: bool,
    file: Option<PathBuf>,
}

enum Command {
    Help,
    Version,
    Run(Options),
}

fn parse_args(args: &[String]) -> Result<Command> {
    let mut opts = Options::default();
    let mut iter = args.iter();

    fn value<'a>(iter: &mut std::slice::Iter<'a, String>, flag: &str) -> Result<&'a String> {
        iter.next()
            .ok_or_else(|| Error::Usage(format!("{} needs a value", flag)))
    }

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--help" | "-h" => return Ok(Command::Help),
            "--version" | "-V" => return Ok(Command::Version),
            "--list" | "-l" => opts.list = true,
            "--line-numbers" | "-n" => opts.line_numbers = true,
            "--syntax" | "-s" => opts.syntax = Some(value(&mut iter, arg)?.clone()),
            "--definition" | "-d" => opts.definition = Some(PathBuf::from(value(&mut iter, arg)?)),
            "--prefs" | "-p" => opts.prefs = Some(PathBuf::from(value(&mut iter, arg)?)),
            "--tab-width" | "-t" => {
                let width = value(&mut iter, arg)?;
                let width = width
                    .parse()
                    .map_err(|_| Error::Usage(format!("invalid tab width '{}'", width)))?;
                opts.tab_width = Some(width);
            }
            other if other.starts_with('-') && other != "-" => {
                return Err(Error::Usage(format!("unknown option '{}'", other)));
            }
            file => {
                if opts.file.is_some() {
                    return Err(Error::Usage("only one file can be given".to_string()));
                }
                opts.file = Some(PathBuf::from(file));
            }
        }
    }
    Ok(Command::Run(opts))
}

fn run() -> Result<()> {
    // Parse command line arguments
    let args: Vec<String> = env::args().skip(1).collect();
    let opts = match parse_args(&args)? {
        Command::Help => {
            print_usage();
            return Ok(());
        }
        Command::Version => {
            print_version();
            return Ok(());
        }
        Command::Run(opts) => opts,
    };

    if opts.list {
        for def in builtin::all_definitions() {
            println!("{:<8} {}", def.name, def.extensions.join(", "));
        }
        return Ok(());
    }

    let Some(path) = opts.file else {
        print_usage();
        return Err(Error::Usage("no file given".to_string()));
    };

    let config = match &opts.prefs {
        Some(prefs) => Config::load_from(prefs)?,
        None => Config::load(),
    };

    // Explicit choices first, then the file extension
    let definition: Option<SyntaxDefinition> = if let Some(file) = &opts.definition {
        Some(SyntaxDefinition::from_file(file)?)
    } else if let Some(name) = &opts.syntax {
        Some(builtin::by_name(name)?)
    } else {
        builtin::for_path(&path)
    };

    let text = if path.as_os_str() == "-" {
        io::read_to_string(io::stdin())?
    } else {
        fs::read_to_string(&path)?
    };

    let mut controller = SyntaxColoredTextController::new(config);
    if let Some(definition) = definition {
        controller.set_syntax_definition(definition);
    }
    controller.set_text(&text);
    log::info!(
        "coloring {} with '{}'",
        path.display(),
        controller.syntax_definition().name
    );

    let options = RenderOptions {
        tab_width: opts.tab_width.unwrap_or(RenderOptions::default().tab_width),
        line_numbers: opts.line_numbers,
    };
    let mut stdout = io::stdout().lock();
    render::render(&mut stdout, &controller, &options)?;
    println!();

    Ok(())
}

fn print_usage() {
    println!("syntaxcolor {} - print files with syntax coloring", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Usage: syntaxcolor [OPTIONS] FILE");
    println!();
    println!("Options:");
    println!("  -s, --syntax NAME      Use a built-in syntax definition");
    println!("  -d, --definition FILE  Use a syntax definition file");
    println!("  -p, --prefs FILE       Read preferences from FILE");
    println!("  -n, --line-numbers     Show line numbers");
    println!("  -t, --tab-width N      Columns per tab stop (default 8)");
    println!("  -l, --list             List built-in syntax definitions");
    println!("  -h, --help             Show this help message");
    println!("  -V, --version          Show version information");
    println!();
    println!("FILE may be '-' to read standard input.");
    println!("Set RUST_LOG=debug to see how the definition was chosen.");
}

fn print_version() {
    println!("syntaxcolor {}", env!("CARGO_PKG_VERSION"));
}
