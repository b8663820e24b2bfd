//! The interactive read-dispatch loop and the size/count state it owns.

use std::io::Write;
use std::sync::mpsc as std_mpsc;
use std::thread;

use colored::Colorize;
use tokio::sync::mpsc;

use crate::{
    error::{ImageGenError, Result},
    models::{CountError, GenerationRequest, ImageCount, ImageSize},
    openai::ImageGenerator,
    signal::InterruptSource,
    storage::ImageStore,
};

pub const PROMPT: &str = "Enter image prompt: ";
const SIZE_PREFIX: &str = "/size ";
const COUNT_PREFIX: &str = "/count ";
const MAX_CONSECUTIVE_INPUT_ERRORS: usize = 3;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionConfig {
    pub size: ImageSize,
    pub count: ImageCount,
}

/// One line of input, classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Quit,
    SetSize(Option<ImageSize>),
    SetCount(std::result::Result<ImageCount, CountError>),
    Empty,
    Generate(String),
}

impl Command {
    pub fn parse(line: &str) -> Command {
        let trimmed = line.trim();
        if trimmed.eq_ignore_ascii_case("quit") || trimmed.eq_ignore_ascii_case("exit") {
            return Command::Quit;
        }
        if let Some(rest) = line.strip_prefix(SIZE_PREFIX) {
            return Command::SetSize(rest.trim().parse().ok());
        }
        if let Some(rest) = line.strip_prefix(COUNT_PREFIX) {
            return Command::SetCount(rest.parse());
        }
        if trimmed.is_empty() {
            return Command::Empty;
        }
        Command::Generate(line.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Stop,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    Line(String),
    /// Ctrl-C at the prompt or end of input.
    Stop,
}

/// Where input lines come from. The terminal editor lives in `repl`.
pub trait LineSource {
    fn read_line(&mut self, prompt: &str) -> Result<ReadOutcome>;
}

/// Runs a blocking [`LineSource`] on its own thread so a read can be raced
/// against Ctrl-C.
///
/// The thread is detached: when the session stops while a read is still
/// blocked, process exit takes it down.
pub struct LineReader {
    prompts: std_mpsc::Sender<String>,
    lines: mpsc::UnboundedReceiver<Result<ReadOutcome>>,
}

impl LineReader {
    /// `open` runs on the reader thread, so the source itself need not be `Send`.
    pub fn spawn<I, F>(open: F) -> Self
    where
        I: LineSource,
        F: FnOnce() -> Result<I> + Send + 'static,
    {
        let (prompt_tx, prompt_rx) = std_mpsc::channel::<String>();
        let (line_tx, line_rx) = mpsc::unbounded_channel();

        thread::spawn(move || {
            let mut source = match open() {
                Ok(source) => source,
                Err(e) => {
                    let _ = line_tx.send(Err(e));
                    return;
                }
            };
            for prompt in prompt_rx {
                if line_tx.send(source.read_line(&prompt)).is_err() {
                    break;
                }
            }
        });

        Self {
            prompts: prompt_tx,
            lines: line_rx,
        }
    }

    pub async fn read_line(&mut self, prompt: &str) -> Result<ReadOutcome> {
        // a dead thread may still have queued its startup error
        let _ = self.prompts.send(prompt.to_string());
        self.lines
            .recv()
            .await
            .unwrap_or_else(|| Err(ImageGenError::Input("input reader stopped".into())))
    }
}

pub struct Session<G, W> {
    generator: G,
    store: ImageStore,
    config: SessionConfig,
    out: W,
}

impl<G, W> Session<G, W>
where
    G: ImageGenerator,
    W: Write,
{
    pub fn new(generator: G, store: ImageStore, out: W) -> Self {
        Self {
            generator,
            store,
            config: SessionConfig::default(),
            out,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }

    pub fn output(&self) -> &W {
        &self.out
    }

    pub fn print_banner(&mut self) -> Result<()> {
        writeln!(self.out, "{}", "Simple Image Generation".bold())?;
        writeln!(self.out, "Type 'quit' or 'exit' to end the program.")?;
        writeln!(
            self.out,
            "Enter '/size <size>' to change image size ({}).",
            size_list(", ")
        )?;
        writeln!(
            self.out,
            "Enter '/count <number>' to set number of images to generate ({}).",
            ImageCount::MAX
        )?;
        writeln!(self.out, "{}", "-".repeat(50))?;
        Ok(())
    }

    /// Runs until quit, Ctrl-C at the prompt, or end of input.
    ///
    /// The same interrupt source is watched while reading and while a
    /// request is in flight: at the prompt it stops the session, during a
    /// request it only abandons that request.
    pub async fn run<S: InterruptSource>(
        &mut self,
        input: &mut LineReader,
        interrupts: &mut S,
    ) -> Result<()> {
        self.print_banner()?;
        let mut input_errors = 0;

        loop {
            self.out.flush()?;
            let read = tokio::select! {
                read = input.read_line(PROMPT) => read,
                _ = interrupts.interrupted() => Ok(ReadOutcome::Stop),
            };

            let line = match read {
                Ok(ReadOutcome::Line(line)) => {
                    input_errors = 0;
                    line
                }
                Ok(ReadOutcome::Stop) => {
                    writeln!(self.out, "\nExiting program.")?;
                    break;
                }
                Err(e) => {
                    input_errors += 1;
                    self.report_unexpected(&e);
                    if input_errors >= MAX_CONSECUTIVE_INPUT_ERRORS {
                        log::error!("Giving up after {} input failures", input_errors);
                        return Err(e);
                    }
                    continue;
                }
            };

            let outcome = tokio::select! {
                result = self.handle_line(&line) => result,
                _ = interrupts.interrupted() => Err(ImageGenError::Interrupted),
            };

            match outcome {
                Ok(Flow::Continue) => {}
                Ok(Flow::Stop) => break,
                Err(e) => self.report_unexpected(&e),
            }
        }

        self.out.flush()?;
        Ok(())
    }

    /// Handles one input line. An `Err` only means this iteration failed.
    pub async fn handle_line(&mut self, line: &str) -> Result<Flow> {
        match Command::parse(line) {
            Command::Quit => {
                writeln!(self.out, "Exiting program.")?;
                return Ok(Flow::Stop);
            }
            Command::SetSize(Some(size)) => {
                self.config.size = size;
                writeln!(self.out, "Image size set to: {}", size)?;
            }
            Command::SetSize(None) => {
                writeln!(
                    self.out,
                    "{}",
                    format!("Invalid size. Use {}.", size_list_or()).yellow()
                )?;
            }
            Command::SetCount(Ok(count)) => {
                self.config.count = count;
                writeln!(self.out, "Number of images to generate: {}", count)?;
            }
            Command::SetCount(Err(CountError::Unsupported(n))) => {
                log::debug!("Rejected image count {}", n);
                writeln!(
                    self.out,
                    "{}",
                    "Invalid count. DALL-E 3 supports only 1 image.".yellow()
                )?;
            }
            Command::SetCount(Err(CountError::NotANumber)) => {
                writeln!(
                    self.out,
                    "{}",
                    "Invalid count. Please enter a number.".yellow()
                )?;
            }
            Command::Empty => {}
            Command::Generate(prompt) => self.generate_and_save(prompt).await?,
        }
        Ok(Flow::Continue)
    }

    async fn generate_and_save(&mut self, prompt: String) -> Result<()> {
        writeln!(self.out, "Generating image with prompt: '{}' ...", prompt)?;
        self.out.flush()?;

        let request = GenerationRequest::new(prompt, self.config.size, self.config.count);
        let payloads = match self.generator.generate(&request).await {
            Ok(payloads) => payloads,
            Err(e) => {
                log::warn!("Image generation failed: {}", e);
                writeln!(self.out, "{}", format!("Error generating image: {}", e).red())?;
                Vec::new()
            }
        };

        if payloads.is_empty() {
            writeln!(
                self.out,
                "{}",
                "Failed to generate images. Please try again with a different prompt.".red()
            )?;
            return Ok(());
        }

        writeln!(
            self.out,
            "{}",
            format!("Generated {} image(s) successfully!", payloads.len()).green()
        )?;

        let saved = match self.store.persist(&payloads) {
            Ok(saved) => saved,
            Err(e) => {
                log::warn!("Saving batch failed: {}", e);
                writeln!(self.out, "{}", format!("Error saving images: {}", e).red())?;
                Vec::new()
            }
        };

        if saved.is_empty() {
            writeln!(self.out, "{}", "Failed to save the images.".red())?;
        } else {
            writeln!(self.out, "Images saved at:")?;
            for path in &saved {
                writeln!(self.out, "- {}", path.display())?;
            }
        }
        Ok(())
    }

    fn report_unexpected(&mut self, err: &ImageGenError) {
        log::error!("Iteration failed: {}", err);
        let _ = writeln!(
            self.out,
            "{}",
            format!("An unexpected error occurred: {}", err).red()
        );
    }
}

fn size_list(sep: &str) -> String {
    ImageSize::ALL
        .iter()
        .map(ImageSize::as_str)
        .collect::<Vec<_>>()
        .join(sep)
}

fn size_list_or() -> String {
    let names: Vec<&str> = ImageSize::ALL.iter().map(ImageSize::as_str).collect();
    match names.split_last() {
        Some((last, rest)) if !rest.is_empty() => format!("{}, or {}", rest.join(", "), last),
        _ => names.join(""),
    }
}
