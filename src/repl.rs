use std::borrow::Cow::{self, Borrowed, Owned};

use colored::Colorize;
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};

use crate::error::Result;
use crate::models::ImageSize;
use crate::session::{LineSource, ReadOutcome};

const COMMANDS: [&str; 2] = ["/size ", "/count "];

/// Completion and highlighting for the slash commands.
#[derive(Clone, Default)]
pub struct CommandHelper;

impl CommandHelper {
    fn candidates(line: &str) -> (usize, Vec<Pair>) {
        if let Some(arg) = line.strip_prefix("/size ") {
            let start = line.len() - arg.len();
            let pairs = ImageSize::ALL
                .iter()
                .map(ImageSize::as_str)
                .filter(|token| token.starts_with(arg))
                .map(|token| Pair {
                    display: token.to_string(),
                    replacement: token.to_string(),
                })
                .collect();
            return (start, pairs);
        }

        if line.starts_with('/') && !line.contains(' ') {
            let pairs = COMMANDS
                .iter()
                .filter(|cmd| cmd.starts_with(line))
                .map(|cmd| Pair {
                    display: cmd.trim_end().to_string(),
                    replacement: cmd.to_string(),
                })
                .collect();
            return (0, pairs);
        }

        (0, Vec::new())
    }
}

impl Helper for CommandHelper {}

impl Completer for CommandHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        Ok(Self::candidates(&line[..pos]))
    }
}

impl Highlighter for CommandHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if COMMANDS.iter().any(|cmd| line.starts_with(cmd)) {
            Owned(line.bright_cyan().to_string())
        } else {
            Borrowed(line)
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Hinter for CommandHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        let line = &line[..pos];
        if line.starts_with('/') && !line.contains(' ') {
            COMMANDS
                .iter()
                .find(|cmd| cmd.starts_with(line) && cmd.len() > line.len())
                .map(|cmd| cmd[line.len()..].trim_end().to_string())
        } else {
            None
        }
    }
}

impl Validator for CommandHelper {}

/// Terminal line editor backing the interactive session.
pub struct Terminal {
    editor: Editor<CommandHelper, DefaultHistory>,
}

impl Terminal {
    pub fn new() -> Result<Self> {
        let mut editor = Editor::<CommandHelper, DefaultHistory>::new()?;
        editor.set_helper(Some(CommandHelper));
        Ok(Self { editor })
    }
}

impl LineSource for Terminal {
    fn read_line(&mut self, prompt: &str) -> Result<ReadOutcome> {
        let outcome = read_outcome(self.editor.readline(prompt))?;
        if let ReadOutcome::Line(line) = &outcome {
            if !line.trim().is_empty() {
                let _ = self.editor.add_history_entry(line.as_str());
            }
        }
        Ok(outcome)
    }
}

/// Ctrl-C in raw mode arrives as `Interrupted` rather than a signal.
fn read_outcome(read: std::result::Result<String, ReadlineError>) -> Result<ReadOutcome> {
    match read {
        Ok(line) => Ok(ReadOutcome::Line(line)),
        Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => Ok(ReadOutcome::Stop),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn replacements(line: &str) -> (usize, Vec<String>) {
        let (start, pairs) = CommandHelper::candidates(line);
        (start, pairs.into_iter().map(|p| p.replacement).collect())
    }

    #[test]
    fn test_command_completion() {
        assert_eq!(replacements("/s"), (0, vec!["/size ".to_string()]));
        assert_eq!(
            replacements("/"),
            (0, vec!["/size ".to_string(), "/count ".to_string()])
        );
        assert_eq!(replacements("a red"), (0, vec![]));
    }

    #[test]
    fn test_size_token_completion() {
        assert_eq!(
            replacements("/size 1024x"),
            (6, vec!["1024x1024".to_string(), "1024x1792".to_string()])
        );
        assert_eq!(replacements("/size 17"), (6, vec!["1792x1024".to_string()]));
        assert_eq!(replacements("/size 9").1.len(), 0);
    }

    #[test]
    fn test_read_outcome_mapping() {
        assert_eq!(
            read_outcome(Ok("a red bicycle".to_string())).unwrap(),
            ReadOutcome::Line("a red bicycle".to_string())
        );
        assert_eq!(
            read_outcome(Err(ReadlineError::Interrupted)).unwrap(),
            ReadOutcome::Stop
        );
        assert_eq!(read_outcome(Err(ReadlineError::Eof)).unwrap(), ReadOutcome::Stop);

        let broken = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "tty gone");
        assert!(matches!(
            read_outcome(Err(ReadlineError::Io(broken))),
            Err(crate::error::ImageGenError::Input(_))
        ));
    }

    #[test]
    fn test_highlight_only_commands() {
        let helper = CommandHelper;
        assert!(matches!(helper.highlight("/size 1024x1024", 0), Owned(_)));
        assert!(matches!(helper.highlight("a red bicycle", 0), Borrowed(_)));
    }
}
