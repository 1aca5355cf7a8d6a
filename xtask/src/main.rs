use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use hetero_atomic::report::{capabilities, CapabilityReport};
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "hetero-atomic workspace automation", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the criterion benches and summarise them
    Bench {
        /// Run quickly (lower sample size/time)
        #[arg(long, default_value_t = false)]
        quick: bool,

        /// Generate the summary only (skip running benchmarks)
        #[arg(long, default_value_t = false)]
        report_only: bool,
    },
    /// Write the capability table of the proxy tables and backend
    Report {
        /// Output file
        #[arg(long, default_value = "benchmark_results/capabilities.md")]
        output: PathBuf,

        /// Emit JSON instead of markdown
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

const BENCHES: &[&str] = &["dispatch_benchmark", "contention_benchmark"];

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Bench { quick, report_only } => {
            if !report_only {
                run_benchmarks(quick)?;
            }
            summarise_benchmarks()?;
        }
        Commands::Report { output, json } => write_capabilities(&output, json)?,
    }

    Ok(())
}

fn run_benchmarks(quick: bool) -> Result<()> {
    for bench in BENCHES {
        println!("\n>>> Running {bench}");
        let start = Instant::now();

        let mut cmd = Command::new("cargo");
        cmd.env("CARGO_INCREMENTAL", "0")
            .args(["bench", "-p", "hetero-atomic", "--bench", bench]);

        // Args for the test runner (Criterion) go after --
        cmd.arg("--");
        if quick {
            cmd.args(["--measurement-time", "0.1", "--noplot", "--sample-size", "10"]);
        }

        let status = cmd.status().with_context(|| format!("failed to run bench {bench}"))?;
        if status.success() {
            println!("Finished {bench} in {:.2?}", start.elapsed());
        } else {
            anyhow::bail!("bench {bench} failed");
        }
    }

    Ok(())
}

fn summarise_benchmarks() -> Result<()> {
    let criterion_dir = Path::new("target/criterion");
    if !criterion_dir.exists() {
        eprintln!("No criterion output found at {}", criterion_dir.display());
        return Ok(());
    }

    let mut results = BTreeMap::new();
    collect_results(criterion_dir, &mut results);

    let mut out = String::from("# Dispatch Benchmark Summary\n\n| Benchmark | Mean (ns) | Ops/s |\n|---|---|---|\n");
    for (name, mean_ns) in &results {
        writeln!(out, "| {name} | {mean_ns:.2} | {} |", format_rate(1e9 / mean_ns))?;
    }

    let report_path = Path::new("benchmark_results/report.md");
    write_file(report_path, &out)?;
    println!("Report written to {}", report_path.display());
    Ok(())
}

fn format_rate(ops: f64) -> String {
    if ops > 1_000_000.0 {
        format!("{:.2}M", ops / 1_000_000.0)
    } else if ops > 1_000.0 {
        format!("{:.2}K", ops / 1_000.0)
    } else {
        format!("{ops:.0}")
    }
}

/// Collects `new/estimates.json` means keyed by the benchmark path under
/// `target/criterion`.
fn collect_results(dir: &Path, results: &mut BTreeMap<String, f64>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            if path.file_name().and_then(|s| s.to_str()) != Some("report") {
                collect_results(&path, results);
            }
            continue;
        }
        if path.file_name().and_then(|s| s.to_str()) != Some("estimates.json") {
            continue;
        }
        // Structure: target/criterion/<group>/<bench>/new/estimates.json
        let Some(baseline_dir) = path.parent() else { continue };
        if baseline_dir.file_name().and_then(|s| s.to_str()) != Some("new") {
            continue;
        }
        let Some(bench_dir) = baseline_dir.parent() else { continue };
        let Ok(name) = bench_dir.strip_prefix("target/criterion") else { continue };

        let mean = fs::read_to_string(&path)
            .ok()
            .and_then(|content| serde_json::from_str::<serde_json::Value>(&content).ok())
            .and_then(|json| json.get("mean")?.get("point_estimate")?.as_f64());
        if let Some(mean_ns) = mean.filter(|ns| *ns > 0.0) {
            results.insert(name.display().to_string(), mean_ns);
        }
    }
}

fn write_capabilities(output: &Path, json: bool) -> Result<()> {
    let report = capabilities();
    let body = if json {
        serde_json::to_string_pretty(&report).context("failed to serialise report")?
    } else {
        render_markdown(&report)?
    };
    write_file(output, &body)?;
    println!("Capabilities written to {}", output.display());
    Ok(())
}

fn render_markdown(report: &CapabilityReport) -> Result<String> {
    let mut out = String::new();
    writeln!(out, "# hetero-atomic {} capabilities\n", report.version)?;
    writeln!(out, "Backend: `{}`\n", serde_json::to_value(report.backend)?.as_str().unwrap_or("?"))?;

    writeln!(out, "| Scope | Id |\n|---|---|")?;
    for mapping in &report.scopes {
        writeln!(out, "| {} | {} |", mapping.scope, mapping.id)?;
    }

    writeln!(out, "\n| Type | Size | Bitwise proxy | Numeric proxy | Operations |\n|---|---|---|---|---|")?;
    for ty in &report.types {
        let numeric = ty
            .numeric
            .map_or_else(|| "-".to_owned(), |tag| format!("{:?} {}", tag.kind, tag.bits));
        let ops: Vec<String> = ty.ops.iter().map(ToString::to_string).collect();
        writeln!(
            out,
            "| `{}` | {} | {:?} {} | {} | {} |",
            ty.name,
            ty.size,
            ty.bitwise.kind,
            ty.bitwise.bits,
            numeric,
            ops.join(", ")
        )?;
    }
    Ok(out)
}

fn write_file(path: &Path, body: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("failed to create {}", parent.display()))?;
    }
    fs::write(path, body).with_context(|| format!("failed to write {}", path.display()))
}
