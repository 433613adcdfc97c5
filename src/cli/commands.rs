//! Command dispatch: each subcommand builds a tree and prints it.

use std::io;
use std::path::Path;

use clap::CommandFactory;
use clap_complete::generate;
use tracing::{debug, instrument};

use crate::application::{
    ApplicationError, IoResultExt, Outcome, Renderer, Script, ScriptRunner, ScriptTree,
    ScriptValue,
};
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{global_config_path, RenderStyle, Settings};
use crate::domain::{ordered_factory, DependencyTree, Direction, ToTermTree};

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let settings = effective_settings(cli)?;
    if !settings.color {
        output::disable_colors();
    }

    match &cli.command {
        Some(Commands::Build { values, pop }) => _build(&settings, values, pop),
        Some(Commands::Leaves { values }) => _leaves(&settings, values),
        Some(Commands::Run { script }) => _run(&settings, script),
        Some(Commands::Config { command }) => _config(&settings, command),
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
        None => Err(CliError::Usage(
            "no command given, see `deptree --help`".to_string(),
        )),
    }
}

/// Layered settings with command-line flags applied last.
fn effective_settings(cli: &Cli) -> CliResult<Settings> {
    let mut settings = Settings::load(cli.config.as_deref())?;
    if cli.descending {
        settings.ordering = Direction::Descending;
    }
    if let Some(style) = cli.style {
        settings.style = style;
    }
    debug!(?settings, "effective settings");
    Ok(settings)
}

/// Renders `tree` in `style`; an empty tree renders as an empty string.
pub fn render_tree(tree: &ScriptTree, style: RenderStyle) -> String {
    renderer(style)(tree)
}

fn renderer(style: RenderStyle) -> Renderer {
    match style {
        RenderStyle::Indent => |tree| tree.to_string(),
        RenderStyle::Tree => |tree| {
            tree.to_term_tree()
                .map(|term| term.to_string().trim_end().to_string())
                .unwrap_or_default()
        },
    }
}

fn parse_values(values: &[String]) -> CliResult<Vec<ScriptValue>> {
    values
        .iter()
        .map(|v| match v.trim() {
            "" => Err(CliError::InvalidArgs("empty value".to_string())),
            _ => Ok(ScriptValue::from(v.as_str())),
        })
        .collect()
}

fn runner(settings: &Settings) -> ScriptRunner {
    ScriptRunner::new(settings.ordering).with_renderer(renderer(settings.style))
}

/// Pushes `values` in order into a fresh tree.
fn build_tree(settings: &Settings, values: &[String]) -> CliResult<ScriptTree> {
    let mut tree = DependencyTree::with_factory(ordered_factory(settings.ordering));
    for value in parse_values(values)? {
        if tree.push(value.clone()).is_none() {
            debug!(%value, "redundant value dropped");
        }
    }
    Ok(tree)
}

#[instrument(skip(settings))]
fn _build(settings: &Settings, values: &[String], pop: &[String]) -> CliResult<()> {
    let mut tree = build_tree(settings, values)?;
    for value in parse_values(pop)? {
        tree.pop(&value).map_err(ApplicationError::from)?;
    }
    output::info(&render_tree(&tree, settings.style));
    Ok(())
}

#[instrument(skip(settings))]
fn _leaves(settings: &Settings, values: &[String]) -> CliResult<()> {
    let tree = build_tree(settings, values)?;
    for value in tree.leaves_values() {
        output::info(value);
    }
    Ok(())
}

#[instrument(skip(settings))]
fn _run(settings: &Settings, script_path: &Path) -> CliResult<()> {
    let source =
        std::fs::read_to_string(script_path).with_path_context("read script", script_path)?;
    let script = Script::parse(&source)?;
    let mut runner = runner(settings);
    let outcomes = runner.run(&script)?;
    for outcome in &outcomes {
        print_outcome(outcome);
    }
    Ok(())
}

fn print_outcome(outcome: &Outcome) {
    match outcome {
        Outcome::Pushed { value, leaf: true } => output::action("push", value),
        Outcome::Pushed { value, leaf: false } => {
            output::skipped("push", &format!("{} (redundant, dropped)", value))
        }
        Outcome::Popped { value } => output::action("pop", value),
        Outcome::Rendered(text) if text.is_empty() => output::detail("(empty)"),
        Outcome::Rendered(text) => {
            for line in text.lines() {
                output::detail(line);
            }
        }
        Outcome::Leaves(values) => {
            let joined = values
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(" ");
            output::action("leaves", &joined);
        }
        Outcome::Reset => output::header("reset"),
    }
}

#[instrument(skip(settings))]
fn _config(settings: &Settings, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => output::info(&settings.to_toml()?),
        ConfigCommands::Template => output::info(&Settings::template()),
        ConfigCommands::Path => match global_config_path() {
            Some(path) => output::info(&path.display()),
            None => output::warning("no home directory, global config disabled"),
        },
    }
    Ok(())
}
