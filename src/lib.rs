pub mod block;
pub mod clang;
pub mod cli;
pub mod messages;
pub mod names;
pub mod project;
pub mod validate;

use anyhow::{Context, Result};
use clang::{Generator, GeneratorConfig};
use std::path::{Path, PathBuf};

pub fn run_cli(args: &cli::Args) -> Result<()> {
    if args.extract_messages {
        let progress = CliProgress::new("Messages", 3);
        progress.emit(1, "Resolving input path");
        let input = canonicalize_file(&args.input)?;

        progress.emit(2, "Scanning message definitions");
        let source = std::fs::read_to_string(&input)
            .with_context(|| format!("Failed to read '{}'.", input.display()))?;
        let (extracted, skipped) = messages::extract_messages(&source);
        for line in &skipped {
            eprintln!("warning: skipped malformed message definition ({})", line);
        }

        progress.emit(3, "Writing JSON catalog");
        let json = messages::messages_to_json(&extracted)?;
        let output = output_path(&input, args.output.as_deref(), "json");
        std::fs::write(&output, json.as_bytes())
            .with_context(|| format!("Failed to write '{}'.", output.display()))?;
        return Ok(());
    }

    let progress = CliProgress::new("Compile", 3);
    progress.emit(1, "Resolving input path");
    let input = canonicalize_file(&args.input)?;

    progress.emit(2, "Loading project and generating C source");
    let code = compile_file(&input)?;

    if args.emit_stdout {
        progress.emit(3, "Printing generated source");
        print!("{}", code);
        return Ok(());
    }

    progress.emit(3, "Writing generated source");
    let output = output_path(&input, args.output.as_deref(), "c");
    std::fs::write(&output, code.as_bytes())
        .with_context(|| format!("Failed to write '{}'.", output.display()))?;
    Ok(())
}

pub fn compile_file(input: &Path) -> Result<String> {
    let project = project::load_project(input)?;
    Generator::new().generate(&project)
}

pub fn compile_source(source: &str) -> Result<String> {
    let project = project::parse_project_source(source)?;
    Generator::new().generate(&project)
}

pub fn compile_source_with_config(source: &str, config: GeneratorConfig) -> Result<String> {
    let project = project::parse_project_source(source)?;
    Generator::with_config(config).generate(&project)
}

pub fn canonicalize_file(path: &Path) -> Result<PathBuf> {
    if !path.exists() || !path.is_file() {
        return Err(anyhow::anyhow!(
            "Input file not found: '{}'.",
            path.display()
        ));
    }
    Ok(path.canonicalize()?)
}

fn output_path(input: &Path, output: Option<&Path>, extension: &str) -> PathBuf {
    match output {
        Some(path) => path.to_path_buf(),
        None => input.with_extension(extension),
    }
}

struct CliProgress {
    prefix: &'static str,
    total: usize,
}

impl CliProgress {
    fn new(prefix: &'static str, total: usize) -> Self {
        Self {
            prefix,
            total: total.max(1),
        }
    }

    fn emit(&self, step: usize, label: &str) {
        let total = self.total;
        let step = step.clamp(1, total);
        let bar = render_progress_bar(step, total, 14);
        eprintln!(
            "[{}] {}... ({}/{}) {}",
            self.prefix, label, step, total, bar
        );
    }
}

fn render_progress_bar(step: usize, total: usize, width: usize) -> String {
    let width = width.max(1);
    let filled = ((step * width) + (total / 2)) / total;
    let mut s = String::with_capacity(width + 2);
    s.push('[');
    for i in 0..width {
        s.push(if i < filled { '=' } else { '-' });
    }
    s.push(']');
    s
}
