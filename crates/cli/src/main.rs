//! CLI tool for planning slide decks from narration scripts.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use slideplan_anthropic::{AnthropicConfig, AnthropicOracle};
use slideplan_core::{
    evaluate, CandidateMap, FieldExtractor, PlanDocument, Planner, PlannerConfig,
    SectionsDocument, TuneReport, Tuner,
};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Plan a slide deck from a heading-delimited narration script.
#[derive(Parser, Debug)]
#[command(name = "slideplan")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Split a script into classified sections
    Sections {
        /// Input script (markdown with `## ` headings)
        input: PathBuf,

        #[command(flatten)]
        output: OutputArgs,

        /// Character cap for section summaries
        #[arg(long, default_value = "30")]
        summary_chars: usize,
    },

    /// Plan one slide per section
    Plan {
        /// Input script (markdown with `## ` headings)
        input: PathBuf,

        #[command(flatten)]
        output: OutputArgs,

        /// Intent→template mapping file (JSON)
        #[arg(short, long)]
        mapping: Option<PathBuf>,

        /// Never call the generation service, even if a key is set
        #[arg(long)]
        no_oracle: bool,

        /// Model used by the generation service
        #[arg(long)]
        model: Option<String>,

        /// Per-call timeout for the generation service, in milliseconds
        #[arg(long, default_value = "30000")]
        timeout_ms: u64,

        /// Sections with at most this many sentences count as short
        #[arg(long, default_value = "2")]
        short_content: usize,

        /// Character cap for section summaries
        #[arg(long, default_value = "30")]
        summary_chars: usize,

        /// Also run the tuner and include its report
        #[arg(short, long)]
        tune: bool,

        /// Minimum items on a list slide (with --tune)
        #[arg(long, default_value = "3")]
        min_items: usize,
    },

    /// Check a plan for thin lists and overflowing slides
    Tune {
        /// Plan file written by `plan`
        plan: PathBuf,

        /// Write the plan with the tuning report attached
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Minimum items on a list slide
        #[arg(long, default_value = "3")]
        min_items: usize,
    },

    /// Score a plan against a reference plan
    Eval {
        /// Predicted plan file
        #[arg(long)]
        pred: PathBuf,

        /// Reference (gold) plan file
        #[arg(long)]
        gold: PathBuf,
    },
}

#[derive(Args, Debug)]
struct OutputArgs {
    /// Output file (default: next to the input, with a .json suffix)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print output to stdout instead of writing to file
    #[arg(short, long)]
    print: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    if cli.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    }

    match cli.command {
        Command::Sections {
            input,
            output,
            summary_chars,
        } => {
            let document = read_script(&input)?;
            let config = PlannerConfig::new().with_summary_max_chars(summary_chars);
            let sections = Planner::new(config).segment(&document);
            if sections.is_empty() {
                log::warn!("No sections found in {}", input.display());
            }
            eprintln!("Found {} sections", sections.len());
            emit(&SectionsDocument { sections }, &input, "sections", &output)?;
        }
        Command::Plan {
            input,
            output,
            mapping,
            no_oracle,
            model,
            timeout_ms,
            short_content,
            summary_chars,
            tune,
            min_items,
        } => {
            let candidates = match &mapping {
                Some(path) => CandidateMap::load(path)
                    .with_context(|| format!("Failed to load mapping {}", path.display()))?,
                None => CandidateMap::default(),
            };
            let config = PlannerConfig::new()
                .with_candidates(candidates)
                .with_short_content_max_sentences(short_content)
                .with_summary_max_chars(summary_chars)
                .with_min_list_items(min_items);

            let document = read_script(&input)?;
            let extractor = build_extractor(no_oracle, model, Duration::from_millis(timeout_ms))?;
            let planner = Planner::new(config).with_extractor(extractor);

            let mut plan = planner
                .plan(&document)
                .with_context(|| format!("Failed to plan {}", input.display()))?;

            for diagnostic in &plan.diagnostics {
                eprintln!(
                    "[FALLBACK] {} {}: {} ({})",
                    diagnostic.section_id, diagnostic.template, diagnostic.message, diagnostic.code
                );
            }
            eprintln!("Planned {} slides", plan.slides.len());

            if tune {
                let report = planner.tuner().validate(&plan.slides);
                print!("{}", format_report(&report));
                plan = plan.with_tuning(report);
            }

            emit(&plan, &input, "plan", &output)?;
        }
        Command::Tune {
            plan,
            output,
            min_items,
        } => {
            let document = PlanDocument::load(&plan)
                .with_context(|| format!("Failed to load plan {}", plan.display()))?;
            let report = Tuner::new()
                .with_min_list_items(min_items)
                .validate(&document.slides);
            print!("{}", format_report(&report));

            if let Some(path) = output {
                write_json(&path, &document.with_tuning(report))?;
                if cli.verbose {
                    eprintln!("Written to: {}", path.display());
                }
            }
        }
        Command::Eval { pred, gold } => {
            let pred_plan = PlanDocument::load(&pred)
                .with_context(|| format!("Failed to load plan {}", pred.display()))?;
            let gold_plan = PlanDocument::load(&gold)
                .with_context(|| format!("Failed to load plan {}", gold.display()))?;

            let report = evaluate(&pred_plan.slides, &gold_plan.slides);
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}

/// Read the narration script, failing on missing or unreadable input.
fn read_script(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

/// Oracle-backed extractor when a key is available, deterministic otherwise.
fn build_extractor(
    no_oracle: bool,
    model: Option<String>,
    timeout: Duration,
) -> Result<FieldExtractor> {
    if no_oracle {
        log::info!("Generation service disabled; using deterministic extraction");
        return Ok(FieldExtractor::new());
    }

    let config = match AnthropicConfig::from_env() {
        Ok(config) => config.with_timeout(timeout),
        Err(e) => {
            log::info!("{}; using deterministic extraction", e);
            return Ok(FieldExtractor::new());
        }
    };
    let config = match model {
        Some(model) => config.with_model(model),
        None => config,
    };

    let oracle = AnthropicOracle::new(config).context("Failed to set up generation service")?;
    log::info!("Generation service enabled ({})", oracle.config().model);
    Ok(FieldExtractor::new().with_oracle(Box::new(oracle)))
}

/// One line per warned slide, then the summary counts.
fn format_report(report: &TuneReport) -> String {
    let mut out = String::new();
    for result in report.warnings() {
        out.push_str(&format!(
            "[WARN] {} {}: {}\n",
            result.section_id,
            result.template,
            result.issues.join(" / ")
        ));
    }
    out.push_str(&format!(
        "OK {}, WARN {}\n",
        report.summary.ok, report.summary.warn
    ));
    out
}

/// Print or write an artifact.
fn emit<T: serde::Serialize>(
    value: &T,
    input: &Path,
    kind: &str,
    output: &OutputArgs,
) -> Result<()> {
    if output.print {
        println!("{}", serde_json::to_string_pretty(value)?);
        return Ok(());
    }

    let path = match &output.output {
        Some(path) => path.clone(),
        None => default_output_path(input, kind),
    };
    write_json(&path, value)?;
    eprintln!("Written to: {}", path.display());
    Ok(())
}

/// `<stem>.<kind>.json` next to the input file.
fn default_output_path(input: &Path, kind: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");

    let output_filename = format!("{}.{}.json", stem, kind);

    match input.parent() {
        Some(parent) => parent.join(output_filename),
        None => PathBuf::from(output_filename),
    }
}

/// Write a JSON artifact, creating parent directories.
fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;
    }

    let json = serde_json::to_string_pretty(value)?;
    let mut file =
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;

    file.write_all(json.as_bytes())
        .with_context(|| format!("Failed to write to {}", path.display()))?;
    file.write_all(b"\n")?;

    Ok(())
}
