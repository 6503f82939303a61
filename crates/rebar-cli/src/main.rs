use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use rebar_core::render::{format_length, render_svg};
use rebar_core::{OptimizationRequest, OptimizationResult, Optimizer};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "rebar")]
#[command(about = "Rebar Cutting Optimizer - Plan how to cut stock bars with minimal waste", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Optimize cutting plan
    Optimize {
        /// Input file (YAML or JSON)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file for result (JSON)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Override the stock bar length from the input file (meters)
        #[arg(short, long)]
        stock_length: Option<f64>,
    },

    /// Generate SVG visualization from result
    Generate {
        /// Input result file (JSON)
        #[arg(short, long)]
        input: PathBuf,

        /// Output SVG file
        #[arg(short, long)]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Optimize {
            input,
            output,
            stock_length,
        } => {
            optimize_command(input, output, stock_length)?;
        }
        Commands::Generate { input, output } => {
            generate_command(input, output)?;
        }
    }

    Ok(())
}

fn read_request(input: &Path) -> Result<OptimizationRequest> {
    let content = std::fs::read_to_string(input)
        .with_context(|| format!("Failed to read {}", input.display()))?;

    let request: OptimizationRequest = match input.extension().and_then(|s| s.to_str()) {
        Some("yaml") | Some("yml") => serde_yaml::from_str(&content)?,
        _ => serde_json::from_str(&content)?,
    };

    Ok(request)
}

fn optimize_command(
    input: PathBuf,
    output: Option<PathBuf>,
    stock_length: Option<f64>,
) -> Result<()> {
    println!("{}", "🔍 Loading input...".bright_blue());

    let mut request = read_request(&input)?;
    if let Some(stock_length) = stock_length {
        request.stock_length = stock_length;
    }

    println!(
        "  {} pieces to cut",
        request.total_pieces().to_string().bright_white().bold()
    );
    println!(
        "  Stock bar length: {}m",
        format_length(request.stock_length).bright_white().bold()
    );
    println!();

    println!("{}", "🚀 Running optimization...".bright_blue());

    let optimizer = Optimizer::new(request)?;
    let result = optimizer.optimize()?;

    println!();
    println!("{}", "✅ Optimization complete!".bright_green().bold());
    println!();

    print_result(&result);

    let json = serde_json::to_string_pretty(&result)?;
    if let Some(output_path) = output {
        std::fs::write(&output_path, json)?;
        println!(
            "💾 Saved result to {}",
            output_path.display().to_string().bright_white()
        );
    } else {
        println!("{}", json);
    }

    Ok(())
}

fn print_result(result: &OptimizationResult) {
    println!("{}", "📊 Results:".bright_yellow().bold());

    for group in result.groups.values() {
        println!(
            "  {} {} bars, waste {}% ({}m)",
            format!("Φ{}:", group.group_key).bright_cyan().bold(),
            group.total_bars.to_string().bright_white().bold(),
            format!("{:.1}", group.waste_percentage).bright_white(),
            format_length(group.total_waste)
        );

        for (idx, pattern) in group.patterns.iter().enumerate() {
            let cuts: Vec<String> = pattern
                .cuts
                .iter()
                .map(|cut| format!("{}m", format_length(*cut)))
                .collect();
            println!(
                "    • Pattern #{} x{}: {} | offcut {}m",
                idx + 1,
                pattern.count.to_string().bright_white().bold(),
                cuts.join(" + "),
                format_length(pattern.remaining)
            );
        }
    }

    println!();
    println!(
        "  Total bars: {}",
        result.summary.total_bars.to_string().bright_white().bold()
    );
    println!(
        "  Total waste: {}% ({}m)",
        format!("{:.1}", result.summary.waste_percentage).bright_white(),
        format_length(result.summary.total_waste)
    );
    println!();
}

fn generate_command(input: PathBuf, output: PathBuf) -> Result<()> {
    println!("{}", "🔍 Loading result...".bright_blue());

    let content = std::fs::read_to_string(&input)
        .with_context(|| format!("Failed to read {}", input.display()))?;
    let result: OptimizationResult = serde_json::from_str(&content)?;

    println!("{}", "🎨 Generating SVG...".bright_blue());

    let svg = render_svg(&result)?;
    std::fs::write(&output, svg)?;

    println!();
    println!(
        "{} Saved SVG to {}",
        "✅".bright_green(),
        output.display().to_string().bright_white()
    );

    Ok(())
}
