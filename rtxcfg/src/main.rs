use std::fs;

use anyhow::{bail, Context, Result};
use clap::Parser;
use rtxcfg::domain::Parsed;
use rtxcfg::models::load_models_with_source;
use rtxcfg::registry::{default_registry, Registry, RegistryError, DOMAINS};
use rtxcfg::report::{render_commands, render_domain_summary, render_verify_colored};
use rtxcfg::verify::build_verify_report_with_models;

mod cli;

use cli::{Cli, Command, CommandsArgs, ModelsArgs, OutputFormat, ParseArgs, VerifyArgs};

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Parse(args) => run_parse(args),
        Command::Commands(args) => run_commands(args),
        Command::Verify(args) => run_verify(args),
        Command::Models(args) => run_models(args),
    }
}

fn build_registry() -> Result<Registry> {
    let (table, _) =
        load_models_with_source(None).context("embedded model table failed to load")?;
    let supported: Vec<&str> = table.supported.iter().map(String::as_str).collect();
    default_registry(&supported).context("failed to build parser registry")
}

/// Parses the dump for the requested domains, skipping domains without a
/// registered parser unless one was asked for by name.
fn parse_domains(
    registry: &Registry,
    model: &str,
    raw: &str,
    only: Option<&str>,
) -> Result<Vec<Parsed>> {
    let mut results = Vec::new();
    for domain in DOMAINS {
        // Live routing-table output never appears in a config dump.
        if *domain == "routes" && only != Some("routes") {
            continue;
        }
        if let Some(only) = only {
            if only != *domain {
                continue;
            }
        }
        match registry.parse(domain, model, raw) {
            Ok(parsed) => results.push(parsed),
            Err(RegistryError::NotFound { .. }) if only.is_none() => {}
            Err(e) => return Err(e).with_context(|| format!("domain '{domain}'")),
        }
    }
    if let Some(only) = only {
        if results.is_empty() {
            bail!("unknown domain '{only}' (known: {})", DOMAINS.join(", "));
        }
    }
    Ok(results)
}

fn run_parse(args: ParseArgs) -> Result<()> {
    let raw = fs::read_to_string(&args.file)
        .with_context(|| format!("failed to read {}", args.file.display()))?;
    let registry = build_registry()?;
    let results = parse_domains(&registry, &args.model, &raw, args.domain.as_deref())?;

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&results)?),
        OutputFormat::Text => {
            for parsed in &results {
                println!("{}", render_domain_summary(parsed.domain(), parsed.record_count()));
            }
        }
    }
    Ok(())
}

fn run_commands(args: CommandsArgs) -> Result<()> {
    let raw = fs::read_to_string(&args.file)
        .with_context(|| format!("failed to read {}", args.file.display()))?;
    let registry = build_registry()?;
    let results = parse_domains(&registry, &args.model, &raw, args.domain.as_deref())?;

    let commands: Vec<String> = results
        .iter()
        .flat_map(Parsed::create_commands)
        .collect();
    if !commands.is_empty() {
        println!("{}", render_commands(&commands));
    }
    Ok(())
}

fn run_verify(args: VerifyArgs) -> Result<()> {
    let raw = fs::read_to_string(&args.file)
        .with_context(|| format!("failed to read {}", args.file.display()))?;
    let registry = build_registry()?;
    let report = build_verify_report_with_models(
        &registry,
        &args.model,
        &raw,
        args.models_dir.as_deref(),
    );

    match args.format {
        OutputFormat::Text => println!("{}", render_verify_colored(&report, args.verbose)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }

    if report.errors > 0 {
        bail!("verify failed: {} errors", report.errors);
    }
    if args.strict && report.warnings > 0 {
        bail!("verify failed in strict mode: {} warnings", report.warnings);
    }
    Ok(())
}

fn run_models(args: ModelsArgs) -> Result<()> {
    let (table, source) = load_models_with_source(args.models_dir.as_deref())
        .context("failed to load model table")?;

    if let Some(domain) = &args.domain {
        if !DOMAINS.contains(&domain.as_str()) {
            bail!("unknown domain '{domain}' (known: {})", DOMAINS.join(", "));
        }
        let supported: Vec<&str> = table
            .all_known()
            .into_iter()
            .filter(|model| table.supports(domain, model))
            .collect();
        let unsupported = table.unsupported_for(domain);
        match args.format {
            OutputFormat::Json => {
                let payload = serde_json::json!({
                    "domain": domain,
                    "supported": supported,
                    "unsupported": unsupported,
                    "source": source,
                });
                println!("{}", serde_json::to_string_pretty(&payload)?);
            }
            OutputFormat::Text => {
                if args.verbose {
                    println!("Using models: {source}");
                }
                println!("domain {domain}");
                println!("supported: {}", supported.join(" "));
                println!("unsupported: {}", unsupported.join(" "));
            }
        }
        return Ok(());
    }

    match args.format {
        OutputFormat::Json => {
            let payload = serde_json::json!({
                "supported": table.supported,
                "known": table.known,
                "source": source,
            });
            println!("{}", serde_json::to_string_pretty(&payload)?);
        }
        OutputFormat::Text => {
            if args.verbose {
                println!("Using models: {source}");
            }
            println!("supported");
            for model in &table.supported {
                println!("- {model}");
            }
            if !table.known.is_empty() {
                println!("known (identify only)");
                for model in &table.known {
                    println!("- {model}");
                }
            }
        }
    }
    Ok(())
}
