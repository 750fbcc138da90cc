use abbrev_config::Config;
use abbrev_engine::{AbbreviationService, Document, ExpandArgs, WrapArgs, detect_context};
use anyhow::{Context, Result, anyhow, bail};
use log::debug;
use std::{
    env,
    io::{self, Read},
    path::{Path, PathBuf},
    process,
};

const USAGE: &str = "Usage:
  abbrev expand [--lang <language>] <abbreviation>
  abbrev wrap [--lang <language>] <abbreviation>       (wraps stdin)
  abbrev file [--lang <language>] [--write] <path> <line:column>...
  abbrev init                                          (writes the default config)";

struct Options {
    language: Option<String>,
    write: bool,
    positional: Vec<String>,
}

fn parse_options(args: &[String]) -> Result<Options> {
    let mut options = Options {
        language: None,
        write: false,
        positional: Vec::new(),
    };

    let mut args = args.iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--lang" | "-l" => {
                let language = args.next().ok_or_else(|| anyhow!("--lang needs a value"))?;
                options.language = Some(language.clone());
            }
            "--write" | "-w" => options.write = true,
            _ => options.positional.push(arg.clone()),
        }
    }
    Ok(options)
}

fn load_config() -> Result<Config> {
    let config = Config::load()
        .with_context(|| format!("Failed to load {}", Config::config_path().display()))?;
    Ok(config.unwrap_or_default())
}

/// Expand a standalone abbreviation and print the result.
fn run_expand(service: &AbbreviationService, options: &Options) -> Result<()> {
    let [abbreviation] = options.positional.as_slice() else {
        bail!("expand takes exactly one abbreviation");
    };
    let language = options.language.as_deref().unwrap_or("html");
    let context = detect_context("", 0, language, service.config())
        .ok_or_else(|| anyhow!("Abbreviations are disabled for {language}"))?;

    println!("{}", service.expand(abbreviation, &context, "", "\t", None));
    Ok(())
}

/// Wrap stdin with an abbreviation.
fn run_wrap(service: &AbbreviationService, options: &Options) -> Result<()> {
    let [abbreviation] = options.positional.as_slice() else {
        bail!("wrap takes exactly one abbreviation");
    };
    let mut input = String::new();
    io::stdin().read_to_string(&mut input)?;
    let content = input.trim_end_matches('\n');

    let language = options.language.as_deref().unwrap_or("html");
    let mut doc = Document::from_bytes(content.as_bytes(), language)?;
    doc.set_selections(vec![0..content.len()]);

    let args = WrapArgs {
        abbreviation: Some(abbreviation.clone()),
    };
    if !service.wrap_with_abbreviation(&mut doc, &args, &None::<String>) {
        bail!("Could not wrap with {abbreviation}");
    }
    println!("{}", doc.text());
    Ok(())
}

/// Expand at `line:column` positions (1-based) in a file.
fn run_file(service: &AbbreviationService, options: &Options) -> Result<()> {
    let [path, positions @ ..] = options.positional.as_slice() else {
        bail!("file needs a path");
    };
    if positions.is_empty() {
        bail!("file needs at least one line:column position");
    }
    let path = PathBuf::from(path);
    let bytes = std::fs::read(&path).with_context(|| format!("Failed to read {}", path.display()))?;

    let language = options
        .language
        .clone()
        .unwrap_or_else(|| language_from_extension(&path));
    debug!("Expanding {} as {language}", path.display());
    let mut doc = Document::from_bytes(&bytes, language)?;

    let cursors = positions
        .iter()
        .map(|position| {
            let (line, column) = parse_position(position)?;
            let offset = doc
                .offset_at(line - 1, column - 1)
                .ok_or_else(|| anyhow!("{position} is outside {}", path.display()))?;
            Ok(offset..offset)
        })
        .collect::<Result<Vec<_>>>()?;
    doc.set_selections(cursors);

    match service.expand_abbreviation(&mut doc, &ExpandArgs::default()) {
        Some(true) => {}
        Some(false) => bail!("Nothing to expand"),
        None => bail!("No expandable abbreviation at the given positions"),
    }

    if options.write {
        std::fs::write(&path, doc.to_bytes())
            .with_context(|| format!("Failed to write {}", path.display()))?;
    } else {
        print!("{}", doc.text());
    }
    Ok(())
}

/// Write the default configuration to `path` unless a file is there.
fn run_init(path: &Path) -> Result<()> {
    if path.exists() {
        bail!("{} already exists", path.display());
    }
    Config::default()
        .save_to_path(path)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    println!("Wrote {}", path.display());
    Ok(())
}

fn parse_position(position: &str) -> Result<(usize, usize)> {
    let (line, column) = position
        .split_once(':')
        .ok_or_else(|| anyhow!("Expected line:column, got {position}"))?;
    let line: usize = line.parse().with_context(|| format!("Bad line in {position}"))?;
    let column: usize = column.parse().with_context(|| format!("Bad column in {position}"))?;
    if line == 0 || column == 0 {
        bail!("Positions are 1-based: {position}");
    }
    Ok((line, column))
}

fn language_from_extension(path: &Path) -> String {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    match extension {
        "htm" | "html" => "html",
        "xhtml" => "xhtml",
        "xml" => "xml",
        "xsl" | "xslt" => "xsl",
        "css" => "css",
        "scss" => "scss",
        "sass" => "sass",
        "less" => "less",
        "styl" => "stylus",
        "jsx" => "jsx",
        "tsx" => "tsx",
        "md" | "markdown" => "markdown",
        other => other,
    }
    .to_string()
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("{USAGE}");
        process::exit(1);
    }

    if args[1] == "init" {
        return run_init(&Config::config_path());
    }

    let options = parse_options(&args[2..])?;
    let service = AbbreviationService::new(load_config()?);

    match args[1].as_str() {
        "expand" => run_expand(&service, &options),
        "wrap" => run_wrap(&service, &options),
        "file" => run_file(&service, &options),
        "-h" | "--help" => {
            println!("{USAGE}");
            Ok(())
        }
        other => {
            eprintln!("Unknown command: {other}");
            eprintln!("{USAGE}");
            process::exit(1);
        }
    }
}
