use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use formkit_schema::FieldType;
use formkit_store::{FileBlobStore, SchemaStore};
use tracing_subscriber::EnvFilter;

mod commands;
mod config;

use config::{CliConfig, LoggingConfig};

fn path_arg() -> Arg {
    Arg::new("path")
        .long("path")
        .short('p')
        .help("Dotted path of the object level, root if omitted")
}

fn build_cli() -> Command {
    Command::new("formkit")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Edit a JSON-Schema form definition")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("Config file (default: <data-dir>/formkit.toml)"),
        )
        .arg(
            Arg::new("data-dir")
                .long("data-dir")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("Directory holding the persisted store"),
        )
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .global(true)
                .help("Log filter used when RUST_LOG is unset"),
        )
        .arg(
            Arg::new("log-json")
                .long("log-json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Emit logs as JSON lines"),
        )
        .subcommand(Command::new("show").about("Print the schema including editor metadata"))
        .subcommand(
            Command::new("export")
                .about("Print the cleaned JSON Schema")
                .arg(
                    Arg::new("ui")
                        .long("ui")
                        .action(ArgAction::SetTrue)
                        .conflicts_with("view")
                        .help("Print the UI schema with field order instead"),
                )
                .arg(
                    Arg::new("view")
                        .long("view")
                        .action(ArgAction::SetTrue)
                        .help("Print schema, UI schema and form data together"),
                ),
        )
        .subcommand(
            Command::new("add")
                .about("Add a field")
                .arg(Arg::new("name").required(true).help("Field name"))
                .arg(path_arg())
                .arg(
                    Arg::new("type")
                        .long("type")
                        .short('t')
                        .value_parser(FieldType::ALL.map(FieldType::as_str))
                        .help("Field type (default: string)"),
                )
                .arg(
                    Arg::new("title")
                        .long("title")
                        .help("Display title (default: derived from the name)"),
                )
                .arg(
                    Arg::new("attrs")
                        .long("attrs")
                        .help("Extra attributes as a JSON object"),
                )
                .arg(
                    Arg::new("required")
                        .long("required")
                        .action(ArgAction::SetTrue)
                        .help("Mark the field as required"),
                ),
        )
        .subcommand(
            Command::new("remove")
                .about("Remove a field")
                .arg(Arg::new("name").required(true))
                .arg(path_arg()),
        )
        .subcommand(
            Command::new("rename")
                .about("Rename a field")
                .arg(Arg::new("old").required(true))
                .arg(Arg::new("new").required(true))
                .arg(path_arg()),
        )
        .subcommand(
            Command::new("update")
                .about("Patch a field's attributes")
                .arg(Arg::new("name").required(true))
                .arg(
                    Arg::new("patch")
                        .long("patch")
                        .required(true)
                        .help("JSON object; \"type\" resets constraints, \"required\" toggles membership"),
                )
                .arg(path_arg()),
        )
        .subcommand(
            Command::new("move")
                .about("Move a field one step up or down")
                .arg(Arg::new("name").required(true))
                .arg(Arg::new("direction").required(true).value_parser(["up", "down"]))
                .arg(path_arg()),
        )
        .subcommand(
            Command::new("import")
                .about("Import and normalize a JSON Schema")
                .arg(Arg::new("source").required(true).help("File path, or - for stdin")),
        )
        .subcommand(
            Command::new("theme")
                .about("Set the editor theme")
                .arg(Arg::new("theme").required(true).value_parser(["light", "dark"])),
        )
        .subcommand(Command::new("clear").about("Reset the schema, keeping only the theme"))
        .subcommand(
            Command::new("batch")
                .about("Run a JSON array of commands in one session")
                .arg(Arg::new("file").required(true).help("File path, or - for stdin"))
                .arg(
                    Arg::new("keep-going")
                        .long("keep-going")
                        .action(ArgAction::SetTrue)
                        .help("Continue after a failed command"),
                ),
        )
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    if logging.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .init();
    }
}

fn load_config(matches: &ArgMatches) -> Result<(CliConfig, PathBuf)> {
    let data_dir_flag = matches.get_one::<PathBuf>("data-dir");
    let config = CliConfig::resolve(
        matches.get_one::<PathBuf>("config").map(PathBuf::as_path),
        data_dir_flag.map(PathBuf::as_path),
    )?
    .with_log_level(matches.get_one::<String>("log-level").map(String::as_str))
    .with_log_json(matches.get_flag("log-json"));

    let data_dir = config.data_dir(data_dir_flag.map(PathBuf::as_path));
    Ok((config, data_dir))
}

fn main() -> Result<()> {
    let matches = build_cli().get_matches();
    let (config, data_dir) = load_config(&matches)?;
    init_tracing(&config.logging);

    let mut store = SchemaStore::open(config.store.clone(), FileBlobStore::new(&data_dir))
        .with_context(|| format!("failed to open store in {}", data_dir.display()))?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    commands::dispatch(&mut store, &matches, &mut out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn cli_definition_is_consistent() {
        build_cli().debug_assert();
    }

    #[test]
    fn rejects_unknown_type_and_direction() {
        assert!(build_cli()
            .try_get_matches_from(["formkit", "add", "x", "--type", "date"])
            .is_err());
        assert!(build_cli()
            .try_get_matches_from(["formkit", "move", "x", "left"])
            .is_err());
        assert!(build_cli().try_get_matches_from(["formkit", "export", "--ui", "--view"]).is_err());
    }

    #[test]
    fn global_flags_after_subcommand() {
        let matches = build_cli()
            .try_get_matches_from(["formkit", "show", "--data-dir", "forms", "--log-level", "debug"])
            .unwrap();
        let (config, data_dir) = load_config(&matches).unwrap();
        assert_eq!(data_dir, PathBuf::from("forms"));
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn config_file_in_data_dir_is_used() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("formkit.toml"), "[store]\nstorage_key = \"draft\"\n").unwrap();

        let data_dir = dir.path().to_str().unwrap();
        let matches = build_cli()
            .try_get_matches_from(["formkit", "--data-dir", data_dir, "show"])
            .unwrap();
        let (config, resolved) = load_config(&matches).unwrap();
        assert_eq!(config.store.storage_key, "draft");
        assert_eq!(resolved, dir.path());
    }
}
