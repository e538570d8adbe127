//! Subcommand execution

use std::fs;
use std::io::{self, Read, Write};

use anyhow::{bail, Context, Result};
use clap::ArgMatches;
use formkit_schema::{clean_schema, ordering_hints, title_from_name, Direction, FieldPatch, FieldPath, FieldType};
use formkit_store::{EditCommand, SchemaStore, Theme};
use serde::Serialize;
use serde_json::Value as JsonValue;
use tracing::info;

/// Run the selected subcommand against `store`, writing results to `out`
pub(crate) fn dispatch(store: &mut SchemaStore, matches: &ArgMatches, out: &mut dyn Write) -> Result<()> {
    match matches.subcommand() {
        Some(("show", _)) => write_json(out, store.schema()),
        Some(("export", args)) => {
            let value = if args.get_flag("ui") {
                ordering_hints(store.schema()).to_ui_schema()
            } else if args.get_flag("view") {
                serde_json::to_value(store.render_view()?)?
            } else {
                clean_schema(store.schema())?
            };
            write_json(out, &value)
        }
        Some(("add", args)) => {
            let path = path_arg(args)?;
            let name = string_arg(args, "name")?;
            let template = add_template(args, name)?;
            let changed = store.add_field(&path, name, &template)?;
            report(out, "add", changed)
        }
        Some(("remove", args)) => {
            let path = path_arg(args)?;
            let changed = store.remove_field(&path, string_arg(args, "name")?)?;
            report(out, "remove", changed)
        }
        Some(("rename", args)) => {
            let path = path_arg(args)?;
            let changed = store.rename_field(&path, string_arg(args, "old")?, string_arg(args, "new")?)?;
            report(out, "rename", changed)
        }
        Some(("update", args)) => {
            let path = path_arg(args)?;
            let patch = FieldPatch::from_json(parse_json(string_arg(args, "patch")?, "--patch")?)?;
            let changed = store.update_field(&path, string_arg(args, "name")?, &patch)?;
            report(out, "update", changed)
        }
        Some(("move", args)) => {
            let path = path_arg(args)?;
            let direction: Direction = string_arg(args, "direction")?.parse()?;
            let changed = store.reorder_field(&path, string_arg(args, "name")?, direction)?;
            report(out, "move", changed)
        }
        Some(("import", args)) => {
            let text = read_input(string_arg(args, "source")?)?;
            let changed = store.import_schema(&text)?;
            report(out, "import", changed)
        }
        Some(("theme", args)) => {
            let theme: Theme = string_arg(args, "theme")?.parse()?;
            store.set_theme(theme);
            writeln!(out, "theme: {theme}")?;
            Ok(())
        }
        Some(("clear", _)) => {
            store.clear_all();
            writeln!(out, "cleared")?;
            Ok(())
        }
        Some(("batch", args)) => {
            let text = read_input(string_arg(args, "file")?)?;
            run_batch(store, &text, args.get_flag("keep-going"), out)
        }
        Some((other, _)) => bail!("unknown command '{other}'"),
        None => bail!("no command given, see --help"),
    }
}

/// Execute a JSON array of commands in one session
///
/// Stops at the first failure unless `keep_going`. Commands that ran
/// before a failure stay applied.
fn run_batch(store: &mut SchemaStore, text: &str, keep_going: bool, out: &mut dyn Write) -> Result<()> {
    let commands: Vec<EditCommand> =
        serde_json::from_str(text).context("batch input must be a JSON array of commands")?;
    info!(commands = commands.len(), keep_going, "running batch");

    let mut failed = 0usize;
    for (index, command) in commands.iter().enumerate() {
        match store.execute(command) {
            Ok(changed) => writeln!(out, "{index}: {} {}", command.op(), outcome(changed))?,
            Err(e) => {
                failed += 1;
                writeln!(out, "{index}: {} error: {e}", command.op())?;
                if !keep_going {
                    bail!("batch stopped at command {index} ({}): {e}", command.op());
                }
            }
        }
    }

    if failed > 0 {
        bail!("{failed} of {} commands failed", commands.len());
    }
    Ok(())
}

fn add_template(args: &ArgMatches, name: &str) -> Result<FieldPatch> {
    let mut template = match args.get_one::<String>("attrs") {
        Some(text) => FieldPatch::from_json(parse_json(text, "--attrs")?)?,
        None => FieldPatch::new(),
    };
    if let Some(field_type) = args.get_one::<String>("type") {
        template = template.field_type(field_type.parse::<FieldType>()?);
    }
    match args.get_one::<String>("title") {
        Some(title) => template = template.title(title.as_str()),
        None if !template.attributes().contains_key("title") => template = template.title(title_from_name(name)),
        None => {}
    }
    if args.get_flag("required") {
        template = template.required(true);
    }
    Ok(template)
}

fn path_arg(args: &ArgMatches) -> Result<FieldPath> {
    match args.get_one::<String>("path") {
        Some(text) => text.parse().with_context(|| format!("invalid --path '{text}'")),
        None => Ok(FieldPath::root()),
    }
}

fn string_arg<'a>(args: &'a ArgMatches, id: &str) -> Result<&'a str> {
    args.get_one::<String>(id)
        .map(String::as_str)
        .with_context(|| format!("missing argument <{id}>"))
}

fn parse_json(text: &str, flag: &str) -> Result<JsonValue> {
    serde_json::from_str(text).with_context(|| format!("{flag} is not valid JSON"))
}

/// File contents, or stdin for `-`
fn read_input(source: &str) -> Result<String> {
    if source == "-" {
        let mut text = String::new();
        io::stdin()
            .read_to_string(&mut text)
            .context("failed to read stdin")?;
        Ok(text)
    } else {
        fs::read_to_string(source).with_context(|| format!("failed to read {source}"))
    }
}

fn write_json<T: Serialize + ?Sized>(out: &mut dyn Write, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

fn report(out: &mut dyn Write, action: &str, changed: bool) -> Result<()> {
    writeln!(out, "{action}: {}", outcome(changed))?;
    Ok(())
}

fn outcome(changed: bool) -> &'static str {
    if changed {
        "ok"
    } else {
        "unchanged"
    }
}
