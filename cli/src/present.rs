use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use deck::Presentation;
use runner::ExecutorRegistry;

use crate::render::{render_output, render_slide};

const HELP: &str = "\
commands:
  n, next, <enter>   next slide
  p, prev            previous slide
  f, first           first slide
  l, last            last slide
  <number>           jump to slide (1-based)
  x, run             run the first code block on this slide
  r, reload          re-read the document
  h, help            show this help
  q, quit            leave";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Next,
    Previous,
    First,
    Last,
    GoTo(usize),
    Run,
    Reload,
    Help,
    Quit,
}

impl Command {
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        let command = match input {
            "" | "n" | "next" => Command::Next,
            "p" | "prev" => Command::Previous,
            "f" | "first" => Command::First,
            "l" | "last" => Command::Last,
            "x" | "run" => Command::Run,
            "r" | "reload" => Command::Reload,
            "h" | "help" | "?" => Command::Help,
            "q" | "quit" => Command::Quit,
            number => {
                let n: usize = number.parse().ok()?;
                Command::GoTo(n.saturating_sub(1))
            }
        };
        Some(command)
    }
}

/// State of an interactive presentation.
pub struct Session<'a> {
    presentation: Presentation,
    registry: &'a ExecutorRegistry,
    width: usize,
    /// Document to re-read on `reload`, with the file id its errors use.
    source: Option<(PathBuf, usize)>,
    clear_screen: bool,
}

impl<'a> Session<'a> {
    pub fn new(presentation: Presentation, registry: &'a ExecutorRegistry, width: usize) -> Self {
        Session {
            presentation,
            registry,
            width,
            source: None,
            clear_screen: false,
        }
    }

    pub fn with_source(mut self, path: PathBuf, file_id: usize) -> Self {
        self.source = Some((path, file_id));
        self
    }

    pub fn with_clear_screen(mut self, clear: bool) -> Self {
        self.clear_screen = clear;
        self
    }

    pub fn presentation(&self) -> &Presentation {
        &self.presentation
    }

    /// Read commands from `input` until it ends or `quit` is entered.
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, output: &mut W) -> io::Result<()> {
        self.draw(output)?;
        for line in input.lines() {
            let line = line?;
            match Command::parse(&line) {
                Some(Command::Quit) => break,
                Some(command) => self.apply(command, output)?,
                None => writeln!(output, "unknown command `{}` (h for help)", line.trim())?,
            }
            output.flush()?;
        }
        Ok(())
    }

    pub fn apply<W: Write>(&mut self, command: Command, output: &mut W) -> io::Result<()> {
        tracing::trace!(?command, "applying command");
        match command {
            Command::Next => {
                self.presentation.next();
                self.draw(output)
            }
            Command::Previous => {
                self.presentation.previous();
                self.draw(output)
            }
            Command::First => {
                self.presentation.first();
                self.draw(output)
            }
            Command::Last => {
                self.presentation.last();
                self.draw(output)
            }
            Command::GoTo(index) => {
                self.presentation.go_to(index);
                self.draw(output)
            }
            Command::Run => self.run_current(output),
            Command::Reload => self.reload(output),
            Command::Help => writeln!(output, "{HELP}"),
            Command::Quit => Ok(()),
        }
    }

    fn draw<W: Write>(&self, output: &mut W) -> io::Result<()> {
        if self.clear_screen {
            write!(output, "\x1b[2J\x1b[H")?;
        }
        for line in render_slide(&self.presentation, self.width) {
            writeln!(output, "{line}")?;
        }
        Ok(())
    }

    fn run_current<W: Write>(&self, output: &mut W) -> io::Result<()> {
        let index = self.presentation.current_index();
        match self.registry.execute_slide(&self.presentation, index) {
            Ok(lines) => {
                for line in render_output(&lines, self.width) {
                    writeln!(output, "{line}")?;
                }
                Ok(())
            }
            Err(err) => writeln!(output, "{err}"),
        }
    }

    fn reload<W: Write>(&mut self, output: &mut W) -> io::Result<()> {
        let Some((path, file_id)) = &self.source else {
            return writeln!(output, "nothing to reload");
        };
        let source = match std::fs::read_to_string(path) {
            Ok(source) => source,
            Err(err) => {
                return writeln!(output, "error: cannot read '{}': {err}", path.display());
            }
        };
        match self.presentation.reparse(&source, *file_id) {
            Ok(()) => self.draw(output),
            Err(errors) => {
                for error in errors {
                    writeln!(output, "error: {error}")?;
                }
                Ok(())
            }
        }
    }
}
