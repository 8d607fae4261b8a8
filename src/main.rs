use anyhow::{bail, Context, Result};
use clap::{Parser as ClapParser, Subcommand};
use fin_lang::diagnostics::{Diagnostic, Severity};
use fin_lang::keywords::load_keywords;
use fin_lang::{parser, BuildError, KeywordTable};
use std::fs;
use std::path::{Path, PathBuf};
use std::process;

#[derive(ClapParser)]
#[command(name = "fin")]
#[command(about = "Transpiler from the Fin automation language to Windows Batch")]
struct Cli {
    /// Path to a keywords JSON file
    #[arg(short, long, global = true)]
    keywords: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compile a .fin file into a .bat script
    Build {
        input: PathBuf,
        /// Output batch file (defaults to the input name with .bat)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Report diagnostics without writing output
    Check { input: PathBuf },
    /// Print a debug dump of the parsed AST
    Ast { input: PathBuf },
    /// Print the canonical formatting of a source file
    Fmt {
        input: PathBuf,
        /// Overwrite the file instead of printing to stdout
        #[arg(short, long)]
        write: bool,
    },
    /// Print the version string
    Version,
}

fn main() {
    let cli = Cli::parse();
    let code = match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {:#}", err);
            1
        }
    };
    process::exit(code);
}

fn run(cli: Cli) -> Result<i32> {
    let keywords = load_keywords(cli.keywords.as_deref())?;

    match cli.command {
        Command::Build { input, output } => build(&input, output, &keywords),
        Command::Check { input } => check(&input, &keywords),
        Command::Ast { input } => ast(&input, &keywords),
        Command::Fmt { input, write } => fmt(&input, write, &keywords),
        Command::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(0)
        }
    }
}

fn read_source(path: &Path) -> Result<String> {
    if path.extension().and_then(|e| e.to_str()) != Some("fin") {
        bail!("input must have .fin extension: {}", path.display());
    }
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn report(path: &Path, diagnostics: &[Diagnostic]) -> i32 {
    let file = path.display().to_string();
    for diag in diagnostics {
        eprintln!("{}", diag.render_line(&file));
    }
    if diagnostics.iter().any(|d| d.severity == Severity::Error) {
        1
    } else {
        0
    }
}

fn build(input: &Path, output: Option<PathBuf>, keywords: &KeywordTable) -> Result<i32> {
    let source = read_source(input)?;

    let batch = match fin_lang::build(&source, keywords) {
        Ok(batch) => batch,
        Err(BuildError::Diagnostics(diagnostics)) => return Ok(report(input, &diagnostics)),
        Err(BuildError::Generator(err)) => bail!("{}", err),
    };

    let out_path = output.unwrap_or_else(|| input.with_extension("bat"));
    fs::write(&out_path, batch).with_context(|| format!("failed to write {}", out_path.display()))?;
    Ok(0)
}

fn check(input: &Path, keywords: &KeywordTable) -> Result<i32> {
    let source = read_source(input)?;
    let diagnostics = fin_lang::check(&source, keywords);
    Ok(report(input, &diagnostics))
}

fn ast(input: &Path, keywords: &KeywordTable) -> Result<i32> {
    let source = read_source(input)?;

    let (program, mut diagnostics) = fin_lang::parse(&source, keywords);
    diagnostics.extend(fin_lang::analyze(&program, keywords).diagnostics);
    if !diagnostics.is_empty() {
        fin_lang::diagnostics::sort_by_position(&mut diagnostics);
        return Ok(report(input, &diagnostics));
    }

    print!("{}", parser::print::pretty(&program));
    Ok(0)
}

fn fmt(input: &Path, write: bool, keywords: &KeywordTable) -> Result<i32> {
    let source = read_source(input)?;

    let formatted = match fin_lang::format_source(&source, keywords) {
        Ok(formatted) => formatted,
        Err(BuildError::Diagnostics(diagnostics)) => return Ok(report(input, &diagnostics)),
        Err(BuildError::Generator(err)) => bail!("{}", err),
    };

    if write {
        fs::write(input, formatted)
            .with_context(|| format!("failed to write {}", input.display()))?;
    } else {
        print!("{}", formatted);
    }
    Ok(0)
}
