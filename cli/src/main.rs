mod config;
mod present;
mod render;

use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use codespan_reporting::files::SimpleFiles;
use codespan_reporting::term;
use codespan_reporting::term::termcolor::{ColorChoice, StandardStream};

use deck::{ParseError, Presentation};
use runner::ExecutorRegistry;

use crate::config::Config;
use crate::present::Session;
use crate::render::{DEFAULT_WIDTH, render_slide};

const SUBCOMMANDS: &[&str] = &["present", "check", "list", "show", "run", "languages", "help"];

#[derive(Parser)]
#[command(name = "deck", version, about = "Present markdown slides in the terminal")]
struct Cli {
    /// Disable colored error output
    #[arg(long, global = true)]
    no_color: bool,

    /// Config file (defaults to deck.toml next to the document)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Step through a deck interactively
    Present(PresentArgs),

    /// Parse only (exit 0 if valid)
    Check(FileArgs),

    /// List slide titles and their code blocks
    List(FileArgs),

    /// Print one slide
    Show(SlideArgs),

    /// Run the first code block of a slide
    Run(RunArgs),

    /// List languages that have an executor
    Languages,
}

#[derive(clap::Args)]
struct FileArgs {
    /// Markdown document
    file: PathBuf,
}

#[derive(clap::Args)]
struct PresentArgs {
    /// Markdown document
    file: PathBuf,

    /// Render width in columns (defaults to $COLUMNS, then 80)
    #[arg(short, long)]
    width: Option<usize>,
}

#[derive(clap::Args)]
struct SlideArgs {
    /// Markdown document
    file: PathBuf,

    /// Slide number, 1-based
    #[arg(short, long, default_value_t = 1)]
    slide: usize,

    /// Render width in columns (defaults to $COLUMNS, then 80)
    #[arg(short, long)]
    width: Option<usize>,
}

#[derive(clap::Args)]
struct RunArgs {
    /// Markdown document
    file: PathBuf,

    /// Slide number, 1-based
    #[arg(short, long, default_value_t = 1)]
    slide: usize,
}

/// A document read from disk, registered with the diagnostics file database.
struct Document {
    path: PathBuf,
    source: String,
    files: SimpleFiles<String, String>,
    file_id: usize,
}

impl Document {
    fn title(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

fn main() {
    init_logging();

    // `deck talk.md` is shorthand for `deck present talk.md`.
    let args = inject_default_subcommand(std::env::args().collect());
    let cli = Cli::parse_from(&args);

    let color_choice = if cli.no_color {
        ColorChoice::Never
    } else {
        ColorChoice::Auto
    };

    match cli.command {
        Command::Present(args) => do_present(args, cli.config.as_deref(), color_choice),
        Command::Check(args) => {
            let (document, presentation) = open(&args.file, cli.config.as_deref(), color_choice);
            eprintln!(
                "ok: {} parsed successfully ({} slides)",
                document.path.display(),
                presentation.slide_count()
            );
        }
        Command::List(args) => {
            let (_, presentation) = open(&args.file, cli.config.as_deref(), color_choice);
            for (index, slide) in presentation.slides().iter().enumerate() {
                let languages: Vec<&str> = slide
                    .blocks
                    .iter()
                    .map(|block| match block.language.as_str() {
                        "" => "text",
                        language => language,
                    })
                    .collect();
                if languages.is_empty() {
                    println!("{:>3}  {}", index + 1, slide.title);
                } else {
                    println!("{:>3}  {} [{}]", index + 1, slide.title, languages.join(", "));
                }
            }
        }
        Command::Show(args) => {
            let (_, mut presentation) = open(&args.file, cli.config.as_deref(), color_choice);
            select(&mut presentation, args.slide);
            for line in render_slide(&presentation, width(args.width)) {
                println!("{line}");
            }
        }
        Command::Run(args) => {
            let config = load_config(cli.config.as_deref(), Some(&args.file));
            let (_, mut presentation) = open_with(&args.file, &config, color_choice);
            select(&mut presentation, args.slide);
            let registry = config.registry();
            match registry.execute_slide(&presentation, presentation.current_index()) {
                Ok(lines) => {
                    for line in lines {
                        println!("{line}");
                    }
                }
                Err(err) => {
                    eprintln!("error: {err}");
                    process::exit(1);
                }
            }
        }
        Command::Languages => {
            let registry = load_config(cli.config.as_deref(), None).registry();
            for language in registry.languages() {
                println!("{language}");
            }
        }
    }
}

fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Insert `present` before the first positional argument when it is not a
/// subcommand. Values of `--config` are not positionals.
fn inject_default_subcommand(mut args: Vec<String>) -> Vec<String> {
    let mut skip_value = false;
    let mut insert_at = None;
    for (index, arg) in args.iter().enumerate().skip(1) {
        if skip_value {
            skip_value = false;
            continue;
        }
        if arg == "--config" {
            skip_value = true;
            continue;
        }
        if arg.starts_with('-') {
            continue;
        }
        if !SUBCOMMANDS.contains(&arg.as_str()) {
            insert_at = Some(index);
        }
        break;
    }
    if let Some(index) = insert_at {
        args.insert(index, "present".to_string());
    }
    args
}

fn width(requested: Option<usize>) -> usize {
    requested
        .or_else(|| std::env::var("COLUMNS").ok()?.parse().ok())
        .filter(|width| *width > 0)
        .unwrap_or(DEFAULT_WIDTH)
}

fn select(presentation: &mut Presentation, slide: usize) {
    let count = presentation.slide_count();
    if slide == 0 || slide > count {
        eprintln!("error: slide {slide} out of range (1..={count})");
        process::exit(1);
    }
    presentation.go_to(slide - 1);
}

fn load_config(explicit: Option<&Path>, document: Option<&Path>) -> Config {
    match config::load(explicit, document) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("error: {err}");
            process::exit(1);
        }
    }
}

fn open(path: &Path, explicit: Option<&Path>, color_choice: ColorChoice) -> (Document, Presentation) {
    let config = load_config(explicit, Some(path));
    open_with(path, &config, color_choice)
}

fn open_with(path: &Path, config: &Config, color_choice: ColorChoice) -> (Document, Presentation) {
    let source = match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: cannot read '{}': {}", path.display(), e);
            process::exit(1);
        }
    };
    let syntax = match config.syntax() {
        Ok(syntax) => syntax,
        Err(err) => {
            eprintln!("error: {err}");
            process::exit(1);
        }
    };

    let mut files = SimpleFiles::new();
    let file_id = files.add(path.display().to_string(), source.clone());
    let document = Document {
        path: path.to_path_buf(),
        source,
        files,
        file_id,
    };

    match Presentation::load(&document.source, file_id, document.title(), syntax) {
        Ok(presentation) => {
            tracing::info!(slides = presentation.slide_count(), "loaded {}", path.display());
            (document, presentation)
        }
        Err(errors) => {
            emit_parse_errors(&document.files, &errors, color_choice);
            process::exit(1);
        }
    }
}

fn emit_parse_errors(
    files: &SimpleFiles<String, String>,
    errors: &[ParseError],
    color_choice: ColorChoice,
) {
    let writer = StandardStream::stderr(color_choice);
    let config = term::Config::default();
    for error in errors {
        let diagnostic = error.to_diagnostic();
        let _ = term::emit_to_write_style(&mut writer.lock(), &config, files, &diagnostic);
    }
}

fn do_present(args: PresentArgs, explicit: Option<&Path>, color_choice: ColorChoice) {
    let config = load_config(explicit, Some(&args.file));
    let (document, presentation) = open_with(&args.file, &config, color_choice);
    let registry: ExecutorRegistry = config.registry();
    tracing::debug!(?registry, "executors ready");

    let stdout = io::stdout();
    let mut session = Session::new(presentation, &registry, width(args.width))
        .with_source(document.path.clone(), document.file_id)
        .with_clear_screen(stdout.is_terminal());

    let result = session.run(io::stdin().lock(), &mut stdout.lock());
    if let Err(err) = result {
        eprintln!("error: {err}");
        process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_file_defaults_to_present() {
        assert_eq!(
            inject_default_subcommand(args(&["deck", "talk.md"])),
            args(&["deck", "present", "talk.md"])
        );
        assert_eq!(
            inject_default_subcommand(args(&["deck", "--config", "c.toml", "talk.md"])),
            args(&["deck", "--config", "c.toml", "present", "talk.md"])
        );
    }

    #[test]
    fn explicit_subcommands_are_kept() {
        let list = args(&["deck", "--no-color", "show", "talk.md", "--slide", "2"]);
        assert_eq!(inject_default_subcommand(list.clone()), list);
        let list = args(&["deck", "languages"]);
        assert_eq!(inject_default_subcommand(list.clone()), list);
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
