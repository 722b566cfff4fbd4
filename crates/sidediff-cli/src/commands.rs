use anyhow::Context;
use colored::Colorize;
use sidediff_server::{DiffResponse, ServerConfig, SideDiffServer};
use sidediff_types::{DiffOutcome, DiffReport};

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Serve(args) => cmd_serve(args),
        Command::Compare(args) => cmd_compare(args, cli.format),
        Command::Config(args) => cmd_config(args),
    }
}

/// Load the config file, if any, then apply command-line overrides.
fn resolve_config(settings: &SettingsArgs) -> anyhow::Result<ServerConfig> {
    let mut config = match &settings.config {
        Some(path) => ServerConfig::load(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => ServerConfig::default(),
    };
    if let Some(bind) = settings.bind {
        config.bind_addr = bind;
    }
    if let Some(dir) = &settings.staging_dir {
        config.staging_dir = dir.clone();
    }
    if let Some(ttl) = settings.ttl_secs {
        config.ttl_secs = ttl;
    }
    config.validate()?;
    Ok(config)
}

fn cmd_serve(args: ServeArgs) -> anyhow::Result<()> {
    let config = resolve_config(&args.settings)?;
    println!(
        "{} sidediff on {} (staging: {}, ttl: {}s)",
        "▶".green().bold(),
        config.bind_addr.to_string().bold(),
        config.staging_dir.display(),
        config.ttl_secs,
    );
    let server = SideDiffServer::new(config)?;
    let runtime = tokio::runtime::Runtime::new().context("starting async runtime")?;
    runtime.block_on(server.serve())?;
    println!("{} Stopped.", "✓".green());
    Ok(())
}

fn cmd_compare(args: CompareArgs, format: OutputFormat) -> anyhow::Result<()> {
    let report = sidediff_diff::diff_parts(&args.left, &args.right)
        .with_context(|| format!("comparing {} with {}", args.left.display(), args.right.display()))?;
    print!("{}", render_report(&report, format)?);
    Ok(())
}

fn render_report(report: &DiffReport, format: OutputFormat) -> anyhow::Result<String> {
    if format == OutputFormat::Json {
        let response = DiffResponse::from(report.clone());
        return Ok(format!("{}\n", serde_json::to_string_pretty(&response)?));
    }

    let mut out = match report.outcome {
        DiffOutcome::Identical => format!("{} {}\n", "✓".green().bold(), report.message()),
        DiffOutcome::SizeMismatch => format!("{} {}\n", "✗".red().bold(), report.message()),
        DiffOutcome::Calculated => format!(
            "{} {} ({} runs on {} lines)\n",
            "~".yellow().bold(),
            report.message(),
            report.runs.len(),
            report.lines_affected(),
        ),
    };
    for run in &report.runs {
        out.push_str(&format!(
            "  line {} offset {} length {}\n",
            run.line.to_string().cyan(),
            run.offset,
            run.length,
        ));
    }
    Ok(out)
}

fn cmd_config(args: ConfigArgs) -> anyhow::Result<()> {
    let config = resolve_config(&args.settings)?;
    print!("{}", config.to_toml_string()?);
    Ok(())
}
