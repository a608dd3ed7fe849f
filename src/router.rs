//! Command dispatch: wires parsed CLI arguments to the library.
//!
//! Handlers expand path arguments (directories walk to their spec files),
//! fan parsing out across a rayon pool where several files are involved,
//! and stream results through one [`Formatter`] over locked stdout. All
//! fallible paths surface as [`SpexError`] so `main` can format them
//! uniformly.

use std::fs;
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::cli::{Cli, Command, DefsArgs, LensArgs, MapArgs, OutlineArgs, ReportArgs, ResolveArgs};
use crate::color;
use crate::config::Config;
use crate::defs::{self, SpecDefinition};
use crate::discovery;
use crate::errors::{DiscoveryError, ResolveError, SpexError};
use crate::lens::{self, LensAction};
use crate::outline;
use crate::output::{
    self, CommandOutput, DefOutput, Formatter, ItemOutput, LensOutput, OutlineOutput,
    ReportSummary,
};
use crate::reporter;
use crate::resolver::{self, SelectionItem};
use crate::runner;
use crate::walker;

/// Execute a parsed command line.
pub fn dispatch(cli: Cli) -> Result<(), SpexError> {
    let root = workspace_root(cli.root.as_deref())?;
    let config = Config::load(Some(&root))?;
    let json = cli.json || config.output.format == "json";
    let use_color = color::resolve_color(&config.output.color);
    let mut fmt = Formatter::new(io::stdout().lock(), json, use_color);

    match cli.command {
        Command::Map(args) => run_map(&args, &root, json, &mut fmt),
        Command::Outline(args) => run_outline(&args, &root, json, &mut fmt),
        Command::Lens(args) => run_lens(&args, &root, &config, json, &mut fmt),
        Command::Resolve(args) => run_resolve(&args, &root, &config, &mut fmt),
        Command::Defs(args) => run_defs(&args, &root, json, &mut fmt),
        Command::Report(args) => run_report(&args, &mut fmt),
    }
}

// ---------------------------------------------------------------------------
// Path resolution
// ---------------------------------------------------------------------------

/// Resolve the workspace root: `--root` when given, the current directory
/// otherwise. Canonicalized so id prefixes strip cleanly.
fn workspace_root(arg: Option<&str>) -> Result<PathBuf, SpexError> {
    let root = match arg {
        Some(r) => PathBuf::from(r),
        None => std::env::current_dir()?,
    };
    fs::canonicalize(&root)
        .map_err(|e| SpexError::Usage(format!("workspace root {}: {e}", root.display())))
}

fn absolutize(raw: &str) -> Result<PathBuf, SpexError> {
    fs::canonicalize(raw).map_err(|source| {
        DiscoveryError::Read {
            path: PathBuf::from(raw),
            source,
        }
        .into()
    })
}

/// Expand path arguments: directories walk to their spec files, explicit
/// files pass through untouched.
fn spec_files(paths: &[String]) -> Result<Vec<PathBuf>, SpexError> {
    let mut files = Vec::new();
    for raw in paths {
        let path = absolutize(raw)?;
        if path.is_dir() {
            files.extend(walker::spec_files_under(&path));
        } else {
            files.push(path);
        }
    }
    Ok(files)
}

/// Runner priority: `--runner` flag, then config, then binstub probe.
fn runner_for(flag: Option<&str>, config: &Config, root: &Path) -> String {
    let configured = flag.or(config.runner.command.as_deref());
    runner::runner_command(root, configured)
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

fn run_map<W: io::Write>(
    args: &MapArgs,
    root: &Path,
    json: bool,
    fmt: &mut Formatter<W>,
) -> Result<(), SpexError> {
    let files = spec_files(&args.paths)?;
    if files.is_empty() {
        output::print_hint("no spec files found", json);
        return Ok(());
    }

    // Parse in parallel, print in input order.
    let discovered: Vec<Result<_, DiscoveryError>> = files
        .par_iter()
        .map(|file| discovery::discover_file(file, root))
        .collect();

    for result in discovered {
        for item in result? {
            fmt.format_item(&ItemOutput::from_item(&item, root))?;
        }
    }
    Ok(())
}

fn run_outline<W: io::Write>(
    args: &OutlineArgs,
    root: &Path,
    json: bool,
    fmt: &mut Formatter<W>,
) -> Result<(), SpexError> {
    let files = spec_files(&args.paths)?;
    if files.is_empty() {
        output::print_hint("no spec files found", json);
        return Ok(());
    }

    for file in &files {
        let symbols = outline::outline_file(file)?;
        let display = output::display_path(file, root);
        for symbol in &symbols {
            fmt.format_outline(&OutlineOutput::from_symbol(symbol, &display))?;
        }
    }
    Ok(())
}

fn run_lens<W: io::Write>(
    args: &LensArgs,
    root: &Path,
    config: &Config,
    json: bool,
    fmt: &mut Formatter<W>,
) -> Result<(), SpexError> {
    let files = spec_files(&args.paths)?;
    if files.is_empty() {
        output::print_hint("no spec files found", json);
        return Ok(());
    }

    let runner = runner_for(args.runner.as_deref(), config, root);
    let debug = args.debug || config.runner.debug;
    for file in &files {
        let affordances = lens::lenses_for_file(file, root, &runner)?;
        for affordance in &affordances {
            // Three affordances share one command; log it once per item.
            if debug && affordance.action == LensAction::Run {
                eprintln!("debug: full command: {}", affordance.command);
            }
            fmt.format_lens(&LensOutput::from_affordance(affordance, root))?;
        }
    }
    Ok(())
}

fn run_resolve<W: io::Write>(
    args: &ResolveArgs,
    root: &Path,
    config: &Config,
    fmt: &mut Formatter<W>,
) -> Result<(), SpexError> {
    let text = read_input(args.input.as_deref())?;
    let selection = parse_selection(&text)?;
    let runner = runner_for(args.runner.as_deref(), config, root);
    for command in resolver::resolve(&selection, &runner) {
        fmt.format_command(&CommandOutput { command })?;
    }
    Ok(())
}

fn run_defs<W: io::Write>(
    args: &DefsArgs,
    root: &Path,
    json: bool,
    fmt: &mut Formatter<W>,
) -> Result<(), SpexError> {
    let files = spec_files(&args.paths)?;
    if files.is_empty() {
        output::print_hint("no spec files found", json);
        return Ok(());
    }

    for file in &files {
        let declarations = defs::definitions_in_file(file)?;
        let display = output::display_path(file, root);
        let shown: Vec<&SpecDefinition> = match args.name.as_deref() {
            Some(name) => defs::find_definition(&declarations, name),
            None => declarations.iter().collect(),
        };
        for def in shown {
            fmt.format_definition(&DefOutput::from_definition(def, &display))?;
        }
    }
    Ok(())
}

fn run_report<W: io::Write>(args: &ReportArgs, fmt: &mut Formatter<W>) -> Result<(), SpexError> {
    let mut sink = reporter::from_env();
    let forwarded = match args.input.as_deref() {
        None | Some("-") => reporter::bridge_events(io::stdin().lock(), sink.as_mut())?,
        Some(path) => {
            let file = fs::File::open(path).map_err(|source| DiscoveryError::Read {
                path: PathBuf::from(path),
                source,
            })?;
            reporter::bridge_events(BufReader::new(file), sink.as_mut())?
        }
    };
    sink.shutdown();
    fmt.format_report_summary(&ReportSummary { forwarded })?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Selection input
// ---------------------------------------------------------------------------

fn read_input(source: Option<&str>) -> Result<String, SpexError> {
    let mut text = String::new();
    match source {
        None | Some("-") => {
            io::stdin()
                .lock()
                .read_to_string(&mut text)
                .map_err(ResolveError::Read)?;
        }
        Some(path) => {
            text = fs::read_to_string(path).map_err(ResolveError::Read)?;
        }
    }
    Ok(text)
}

/// Parse a selection in any of the shapes callers produce: a JSON array,
/// a single JSON object (possibly pretty-printed), or JSON Lines as
/// printed by `map --json`.
fn parse_selection(text: &str) -> Result<Vec<SelectionItem>, SpexError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }
    if trimmed.starts_with('[') {
        let items: Vec<SelectionItem> =
            serde_json::from_str(trimmed).map_err(ResolveError::InvalidSelection)?;
        return Ok(items);
    }
    if let Ok(item) = serde_json::from_str::<SelectionItem>(trimmed) {
        return Ok(vec![item]);
    }
    let mut items = Vec::new();
    for line in trimmed.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let item: SelectionItem =
            serde_json::from_str(line).map_err(ResolveError::InvalidSelection)?;
        items.push(item);
    }
    Ok(items)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // -- parse_selection -----------------------------------------------------

    #[test]
    fn selection_from_array() {
        let items = parse_selection(r#"[{"id":"a","uri":"file:///s.rb"},{"id":"b"}]"#).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].id, "a");
        assert_eq!(items[1].id, "b");
    }

    #[test]
    fn selection_from_json_lines() {
        let text = "{\"id\":\"a\"}\n\n{\"id\":\"b\"}\n";
        let items = parse_selection(text).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].id, "b");
    }

    #[test]
    fn selection_from_pretty_printed_object() {
        let text = "{\n  \"id\": \"a\",\n  \"tags\": [\"framework:rspec\"]\n}";
        let items = parse_selection(text).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, "a");
        assert_eq!(items[0].tags, vec!["framework:rspec"]);
    }

    #[test]
    fn selection_empty_input() {
        assert!(parse_selection("").unwrap().is_empty());
        assert!(parse_selection("  \n ").unwrap().is_empty());
    }

    #[test]
    fn selection_garbage_is_invalid() {
        let err = parse_selection("not json").unwrap_err();
        assert!(matches!(
            err,
            SpexError::Resolve(ResolveError::InvalidSelection(_))
        ));
    }

    // -- workspace_root ------------------------------------------------------

    #[test]
    fn workspace_root_canonicalizes_argument() {
        let tmp = tempfile::tempdir().unwrap();
        let root = workspace_root(Some(tmp.path().to_str().unwrap())).unwrap();
        assert!(root.is_absolute());
    }

    #[test]
    fn workspace_root_missing_is_usage_error() {
        let err = workspace_root(Some("/definitely/not/a/real/dir")).unwrap_err();
        assert!(matches!(err, SpexError::Usage(_)));
        assert_eq!(err.exit_code(), crate::errors::EXIT_USAGE);
    }

    // -- spec_files ----------------------------------------------------------

    #[test]
    fn spec_files_expands_directories() {
        let tmp = tempfile::tempdir().unwrap();
        let spec_dir = tmp.path().join("spec");
        fs::create_dir(&spec_dir).unwrap();
        fs::write(spec_dir.join("a_spec.rb"), "describe 'A' do\nend\n").unwrap();
        fs::write(spec_dir.join("helper.rb"), "module Helper\nend\n").unwrap();

        let files = spec_files(&[tmp.path().display().to_string()]).unwrap();
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("a_spec.rb"));
    }

    #[test]
    fn spec_files_keeps_explicit_files() {
        let tmp = tempfile::tempdir().unwrap();
        let helper = tmp.path().join("helper.rb");
        fs::write(&helper, "module Helper\nend\n").unwrap();

        let files = spec_files(&[helper.display().to_string()]).unwrap();
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("helper.rb"));
    }

    #[test]
    fn spec_files_missing_path_errors() {
        let err = spec_files(&["/no/such/spec_dir".to_string()]).unwrap_err();
        assert!(matches!(
            err,
            SpexError::Discovery(DiscoveryError::Read { .. })
        ));
    }

    // -- runner_for ----------------------------------------------------------

    #[test]
    fn runner_flag_beats_config() {
        let tmp = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.runner.command = Some("bin/rspec".to_string());
        assert_eq!(
            runner_for(Some("docker compose run rspec"), &config, tmp.path()),
            "docker compose run rspec"
        );
    }

    #[test]
    fn runner_config_beats_probe() {
        let tmp = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.runner.command = Some("bin/rspec".to_string());
        assert_eq!(runner_for(None, &config, tmp.path()), "bin/rspec");
    }

    #[test]
    fn runner_defaults_without_flag_or_config() {
        let tmp = tempfile::tempdir().unwrap();
        let config = Config::default();
        assert_eq!(runner_for(None, &config, tmp.path()), "bundle exec rspec");
    }
}
