mod cli;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use tf_core::config::Config;
use tf_pipeline::{Orchestrator, PipelineRun, RunInput, RunRequest};

/// Maximum characters of output echoed to the terminal.
const OUTPUT_DISPLAY_CHARS: usize = 1000;

/// Options of the `run` subcommand.
struct RunOptions {
    request: String,
    input: RunInput,
    output_file: Option<PathBuf>,
    parallel: bool,
    plan: Option<Vec<String>>,
    json: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "textflow=trace,tf_core=debug,tf_exec=debug,tf_planner=debug,tf_pipeline=debug,tf_server=debug,tower_http=debug".to_string()
        } else {
            "textflow=info,tf_pipeline=info,tf_planner=info,tower_http=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Serve { host, port } => {
            let mut config = Config::load_or_default(cli.config.as_deref());
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(tf_server::start(config))?;
            Ok(())
        }
        Commands::Run {
            request,
            input_file,
            input_text,
            output_file,
            parallel,
            plan,
            json,
        } => {
            let input = match (input_file, input_text) {
                (Some(path), _) => RunInput::File(path),
                (None, Some(text)) => RunInput::Text(text),
                (None, None) => anyhow::bail!("Either --input-file or --input-text is required"),
            };
            let options = RunOptions {
                request,
                input,
                output_file,
                parallel,
                plan,
                json,
            };
            run_request(options, cli.config.as_deref())
        }
        Commands::Steps => list_steps(cli.config.as_deref()),
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("textflow {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn run_request(options: RunOptions, config_path: Option<&Path>) -> Result<()> {
    let config = Config::load_or_default(config_path);
    for warning in config.validate() {
        tracing::warn!("Config warning: {warning}");
    }

    let request = if options.parallel {
        format!("{} (run in parallel)", options.request)
    } else {
        options.request
    };

    let mut req = RunRequest::new(request.clone(), options.input);
    if let Some(plan) = options.plan {
        req = req.with_plan(plan);
    }

    let orchestrator = Orchestrator::from_config(&config);
    let rt = tokio::runtime::Runtime::new()?;
    let run = rt.block_on(orchestrator.process(req))?;

    if let Some(path) = &options.output_file {
        std::fs::write(path, &run.output)
            .with_context(|| format!("Failed to write output file {}", path.display()))?;
    }

    if options.json {
        let mut value = serde_json::to_value(&run)?;
        if let Some(map) = value.as_object_mut() {
            map.insert("request".into(), serde_json::Value::String(request));
        }
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        print_run(&request, &run, options.output_file.as_deref())?;
    }

    Ok(())
}

fn print_run(request: &str, run: &PipelineRun, output_file: Option<&Path>) -> Result<()> {
    println!("Request: {request}");
    println!("Execution plan: {}", run.execution_plan);
    println!("Execution time: {:.2} seconds", run.execution_time);
    println!("Parallel: {}", if run.parallel { "yes" } else { "no" });
    if !run.parameters.is_empty() {
        println!("Parameters: {}", serde_json::to_string(&run.parameters)?);
    }

    println!("\nResults:");
    for result in &run.results {
        if result.is_success() {
            println!("  ✓ {}", result.step);
        } else {
            println!(
                "  ✗ {}: {}",
                result.step,
                result.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    println!("\nOutput:");
    let mut chars = run.output.chars();
    let shown: String = chars.by_ref().take(OUTPUT_DISPLAY_CHARS).collect();
    println!("{shown}");
    if chars.next().is_some() {
        println!("... (output truncated)");
    }

    if let Some(path) = output_file {
        println!("\nOutput saved to: {}", path.display());
    }

    Ok(())
}

fn list_steps(config_path: Option<&Path>) -> Result<()> {
    let config = Config::load_or_default(config_path);
    let orchestrator = Orchestrator::from_config(&config);
    let registry = orchestrator.registry();
    let launcher = orchestrator.launcher();

    println!("Launcher: {:?}", launcher.mode());
    println!("Selection: {}\n", orchestrator.selector().kind());

    let mut all_ok = true;
    for (spec, info) in registry.steps().iter().zip(launcher.check_all(registry)) {
        let status = if info.available {
            "✓"
        } else {
            all_ok = false;
            "✗"
        };

        print!("{} {}", status, spec.name);
        if let Some(ref location) = info.location {
            print!(" - {location}");
        }
        println!();
        println!("    {}", spec.description);
    }

    println!();
    if all_ok {
        println!("All steps are available!");
    } else {
        println!("Some steps are missing. Build the tf-steps binaries or set steps.bin_dir.");
    }

    Ok(())
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    let config = match path {
        Some(p) => {
            println!("Validating config: {}", p.display());
            let config = Config::load(p)?;
            println!("✓ Configuration is valid");
            config
        }
        None => {
            println!("No config file specified, using defaults");
            Config::default()
        }
    };

    println!("  Server: {}:{}", config.server.host, config.server.port);
    println!("  Launcher: {:?}", config.steps.launcher);
    println!("  Classifier enabled: {}", config.classifier.enabled);
    println!("  Max parallel steps: {}", config.executor.max_parallel);

    let warnings = config.validate();
    if !warnings.is_empty() {
        println!("\nWarnings:");
        for warning in warnings {
            println!("  - {warning}");
        }
    }

    Ok(())
}
