//! Command implementations for snapdiff CLI

use crate::archive::{archive_name, list_archives};
use crate::cli::{Commands, OutputFormat};
use crate::config::{ConfigOverrides, PipelineConfig};
use crate::error::{Result, SnapdiffError};
use crate::output::{JsonFormatter, PrettyPrinter};
use crate::parser::{parse_diff_output, DEFAULT_DETAIL_SEPARATOR};
use crate::pipeline::{Pipeline, RunManifest};
use crate::sequencer::{plan_pairs, PairingMode};
use crate::workspace::SnapdiffWorkspace;
use std::path::{Path, PathBuf};

/// Execute a command
pub fn execute_command(command: Commands, workspace_path: Option<&Path>) -> Result<()> {
    match command {
        Commands::Init { force } => init_command(workspace_path, force),
        Commands::Run {
            input,
            output,
            config,
            tool,
            tool_args,
            pairing,
            jobs,
            timeout,
            extensions,
            case_insensitive,
            no_skip_identical,
            no_progress,
            format,
        } => {
            let overrides = ConfigOverrides {
                tool,
                tool_args,
                extensions,
                case_insensitive,
                pairing: pairing.as_deref().map(parse_pairing).transpose()?,
                jobs,
                timeout_secs: timeout,
                no_skip_identical,
                no_progress,
            };
            run_command(workspace_path, &input, output.as_deref(), config.as_deref(), overrides, &format)
        }
        Commands::Pairs { input, pairing, format } => {
            pairs_command(workspace_path, &input, pairing.as_deref(), &format)
        }
        Commands::Parse {
            diff_file,
            file,
            snapshot,
            separator,
        } => parse_command(&diff_file, &file, &snapshot, separator.as_deref()),
        Commands::Runs { format } => runs_command(workspace_path, &format),
    }
}

fn parse_pairing(s: &str) -> Result<PairingMode> {
    PairingMode::parse(s).map_err(SnapdiffError::invalid_input)
}

fn parse_format(s: &str) -> Result<OutputFormat> {
    OutputFormat::parse(s).map_err(SnapdiffError::invalid_input)
}

/// Initialize snapdiff workspace
fn init_command(workspace_path: Option<&Path>, force: bool) -> Result<()> {
    let current_dir = std::env::current_dir()?;
    let root = workspace_path.unwrap_or(&current_dir);

    // Always create in the given directory, never in a parent workspace
    let workspace = SnapdiffWorkspace::create_new(root.to_path_buf())?;
    if force {
        workspace.create_config_with_force(true)?;
    }

    println!("✅ Initialized snapdiff workspace at: {}", workspace.root.display());
    println!("📁 Workspace directory: {}", workspace.snapdiff_dir.display());
    println!("📝 Records will be written to: {}", workspace.output_path().display());

    Ok(())
}

/// Load the effective config: file, then command-line overrides
fn load_config(
    workspace: &SnapdiffWorkspace,
    config_path: Option<&Path>,
    overrides: ConfigOverrides,
) -> Result<PipelineConfig> {
    let base = match config_path {
        Some(path) => PipelineConfig::load(&workspace.resolve(path))?,
        None => workspace.load_config()?,
    };
    base.apply(overrides)
}

/// Run the snapshot diff pipeline
fn run_command(
    workspace_path: Option<&Path>,
    input: &Path,
    output: Option<&Path>,
    config_path: Option<&Path>,
    overrides: ConfigOverrides,
    format: &str,
) -> Result<()> {
    let workspace = SnapdiffWorkspace::find_or_create(workspace_path)?;
    let output_format = parse_format(format)?;
    let config = load_config(&workspace, config_path, overrides)?;

    let input = workspace.resolve(input);
    let output: PathBuf = match output {
        Some(path) => workspace.resolve(path),
        None => workspace.output_path(),
    };

    let run = workspace.new_run()?;
    let manifest = Pipeline::from_config(config).run(&input, &run, &output)?;

    match output_format {
        OutputFormat::Pretty => PrettyPrinter::print_run_summary(&manifest),
        OutputFormat::Json => println!("{}", JsonFormatter::format(&manifest)?),
    }

    manifest.report.into_result().map(|_| ())
}

/// Show the comparison plan for a directory of archives
fn pairs_command(
    workspace_path: Option<&Path>,
    input: &Path,
    pairing: Option<&str>,
    format: &str,
) -> Result<()> {
    let workspace = SnapdiffWorkspace::find_or_create(workspace_path)?;
    let output_format = parse_format(format)?;
    let pairing = match pairing {
        Some(p) => parse_pairing(p)?,
        None => workspace.load_config()?.pairing,
    };

    let archives = list_archives(&workspace.resolve(input))?
        .iter()
        .map(|p| archive_name(p))
        .collect::<Result<Vec<_>>>()?;
    let pairs = plan_pairs(archives.iter().cloned(), pairing);

    match output_format {
        OutputFormat::Pretty => PrettyPrinter::print_pair_plan(&archives, &pairs),
        OutputFormat::Json => println!("{}", JsonFormatter::format_pair_plan(&archives, &pairs)?),
    }

    Ok(())
}

/// Parse saved diff output and print the records as JSON lines
fn parse_command(diff_file: &Path, file: &str, snapshot: &str, separator: Option<&str>) -> Result<()> {
    let content = std::fs::read(diff_file)?;
    let text = String::from_utf8(content).map_err(|e| {
        SnapdiffError::invalid_input(format!("{} is not valid UTF-8: {}", diff_file.display(), e))
    })?;

    let separator = separator.unwrap_or(DEFAULT_DETAIL_SEPARATOR);
    for record in parse_diff_output(&text, file, snapshot, separator) {
        println!("{}", serde_json::to_string(&record)?);
    }

    Ok(())
}

/// List previous runs
fn runs_command(workspace_path: Option<&Path>, format: &str) -> Result<()> {
    let workspace = SnapdiffWorkspace::find_or_create(workspace_path)?;
    let output_format = parse_format(format)?;

    let mut manifests = Vec::new();
    for run_id in workspace.list_runs()? {
        let path = workspace.manifest_path(&run_id);
        if !path.exists() {
            log::debug!("Run {} has no manifest, skipping", run_id);
            continue;
        }
        manifests.push(RunManifest::load(&path)?);
    }

    match output_format {
        OutputFormat::Pretty => PrettyPrinter::print_run_list(&manifests),
        OutputFormat::Json => println!("{}", JsonFormatter::format(&manifests)?),
    }

    Ok(())
}
