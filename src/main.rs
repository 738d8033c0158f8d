mod cli;

use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use rf_av::tools::{FFMPEG, FFPROBE};
use rf_av::{FfmpegTranscoder, FfprobeProber, ToolRegistry, Transcoder};
use rf_catalog::{AssetCatalog, CatalogLayout, NormalizeTarget};
use rf_core::config::Config;
use rf_engine::{EngineContext, OperationEngine, StdinStop};
use rf_rules::{Preprocessing, RuleDocument};

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Respect RUST_LOG if set, otherwise pick defaults from the verbose flag.
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "remixforge=trace,rf_engine=trace,rf_catalog=debug,rf_av=debug,rf_rules=debug,rf_core=debug"
                .to_string()
        } else {
            "remixforge=info,rf_engine=info,rf_catalog=info,rf_av=warn,rf_rules=info,rf_core=info"
                .to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    match dispatch(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e:#}");
            eprintln!("Error: {e:#}");
            exit_code(&e)
        }
    }
}

fn dispatch(cli: Cli) -> Result<()> {
    let mut config = Config::load_or_default(cli.config.as_deref());
    for warning in config.validate() {
        tracing::warn!("{warning}");
    }

    match cli.command {
        Commands::Run {
            rules,
            ffmpeg,
            dry_run,
            seed,
            skip_normalize,
        } => {
            if let Some(path) = ffmpeg {
                if !path.exists() {
                    return Err(rf_core::Error::MissingInput(format!(
                        "ffmpeg not found at {}",
                        path.display()
                    ))
                    .into());
                }
                config.tools.ffmpeg_path = Some(path);
            }
            run_rules(&config, &rules, dry_run, seed, skip_normalize)
        }
        Commands::Scan {
            dir,
            workdir,
            normalize,
            json,
        } => scan_assets(&config, &dir, workdir.as_deref(), normalize, json),
        Commands::Probe { file, json } => probe_file(&config, &file, json),
        Commands::CheckTools => check_tools(&config),
        Commands::Validate { rules } => validate_rules(&config, &rules),
        Commands::Version => {
            println!("remixforge {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

/// Map an error to the process exit status. Statuses outside `1..=255`
/// collapse to 1.
fn exit_code(err: &anyhow::Error) -> ExitCode {
    let code = err
        .downcast_ref::<rf_core::Error>()
        .map_or(1, rf_core::Error::exit_code);
    ExitCode::from(u8::try_from(code).ok().filter(|c| *c != 0).unwrap_or(1))
}

fn build_transcoder(config: &Config, runtime: &tokio::runtime::Runtime) -> Arc<FfmpegTranscoder> {
    let tools = ToolRegistry::discover(&config.tools);
    Arc::new(FfmpegTranscoder::new(
        tools,
        config.encoding.clone(),
        runtime.handle().clone(),
    ))
}

fn run_rules(
    config: &Config,
    rules: &Path,
    dry_run: bool,
    seed: Option<u64>,
    skip_normalize: bool,
) -> Result<()> {
    let doc = RuleDocument::load(rules)?;
    let runtime = tokio::runtime::Runtime::new()?;
    let transcoder = build_transcoder(config, &runtime);

    if !dry_run && !transcoder.tools().has(FFMPEG) {
        return Err(rf_core::Error::MissingInput(
            "ffmpeg not found; pass --ffmpeg or set tools.ffmpeg_path".into(),
        )
        .into());
    }

    let workdir = doc.workdir_or(&config.paths.workdir);
    let mut ctx = EngineContext::new(transcoder.clone(), &config.paths.workdir)
        .with_dry_run(dry_run)
        .with_stop(Arc::new(StdinStop::new()));
    if let Some(seed) = seed {
        ctx = ctx.with_seed(seed);
    }

    if dry_run {
        println!("[DRY RUN] Skipping asset scan and normalization");
    } else {
        let assets = doc.assets_dir_or(&config.paths.assets_dir);
        let catalog = Arc::new(AssetCatalog::open(
            transcoder.clone(),
            CatalogLayout::from_config(&workdir, &config.paths),
        ));
        let count = catalog.scan(&assets);
        println!("Scanned {count} assets in {}", assets.display());

        match &doc.preprocessing {
            Some(pre) if pre.normalize_all && !skip_normalize => {
                let workers = pre.effective_workers(num_cpus::get());
                let report = catalog.normalize_all(workers, target(pre));
                println!(
                    "Normalized {} of {} assets ({} already current, {} failed)",
                    report.succeeded, report.scheduled, report.skipped, report.failed
                );
            }
            _ => tracing::debug!("Normalization pass not requested"),
        }
        ctx = ctx.with_catalog(catalog);
    }

    let summary = OperationEngine::new(ctx).run(&doc)?;

    println!(
        "\n{}Completed {} operations ({} skipped)",
        if dry_run { "[DRY RUN] " } else { "" },
        summary.executed,
        summary.skipped
    );
    for output in &summary.outputs {
        println!("  {}", output.display());
    }
    Ok(())
}

fn target(pre: &Preprocessing) -> NormalizeTarget {
    NormalizeTarget {
        width: pre.target_width,
        height: pre.target_height,
        fps: pre.target_fps,
    }
}

fn scan_assets(
    config: &Config,
    dir: &Path,
    workdir: Option<&Path>,
    normalize: bool,
    json: bool,
) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;
    let transcoder = build_transcoder(config, &runtime);
    transcoder.tools().require(FFPROBE)?;
    if normalize {
        transcoder.tools().require(FFMPEG)?;
    }

    let workdir = workdir.unwrap_or(config.paths.workdir.as_path());
    let catalog = Arc::new(AssetCatalog::open(
        transcoder,
        CatalogLayout::from_config(workdir, &config.paths),
    ));
    catalog.scan(dir);

    if normalize {
        let pre = Preprocessing::from_config(&config.preprocessing);
        let report = catalog.normalize_all(pre.effective_workers(num_cpus::get()), target(&pre));
        tracing::info!(
            scheduled = report.scheduled,
            skipped = report.skipped,
            succeeded = report.succeeded,
            failed = report.failed,
            "Normalization finished"
        );
    }
    let entries = catalog.entries();

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    println!("Assets in {}: {}", dir.display(), entries.len());
    for e in &entries {
        print!("  [{}] {}", e.kind, e.path.display());
        if e.width > 0 {
            print!(" {}x{}", e.width, e.height);
        }
        if e.fps > 0.0 {
            print!(" @ {:.2} fps", e.fps);
        }
        if e.duration > 0.0 {
            print!(", {:.2}s", e.duration);
        }
        if let Some(norm) = e.valid_normalized() {
            print!(" -> {}", norm.display());
        }
        println!();
    }
    Ok(())
}

fn probe_file(config: &Config, file: &Path, json: bool) -> Result<()> {
    if !file.exists() {
        anyhow::bail!("File does not exist: {}", file.display());
    }

    let tools = ToolRegistry::discover(&config.tools);
    let ffprobe = tools.require(FFPROBE)?.path.clone();
    let runtime = tokio::runtime::Runtime::new()?;
    let meta = runtime
        .block_on(FfprobeProber::new(ffprobe).probe(file))
        .with_context(|| format!("probing {}", file.display()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&meta.raw)?);
        return Ok(());
    }

    println!("File: {}", file.display());
    if let Some(d) = meta.duration {
        println!("Duration: {d:.3}s");
    }
    println!("\nStreams: {}", meta.streams.len());
    for (i, s) in meta.streams.iter().enumerate() {
        print!("  [{i}] {}", s.kind);
        if let Some(ref codec) = s.codec {
            print!(" {codec}");
        }
        if s.width > 0 {
            print!(" {}x{}", s.width, s.height);
        }
        if s.fps > 0.0 {
            print!(" {:.3} fps", s.fps);
        }
        println!();
    }
    Ok(())
}

fn check_tools(config: &Config) -> Result<()> {
    println!("Checking external tools...\n");

    let tools = ToolRegistry::discover(&config.tools).check_all();
    let mut all_ok = true;

    for tool in &tools {
        let status = if tool.available {
            "✓"
        } else {
            all_ok = false;
            "✗"
        };

        print!("{} {}", status, tool.name);
        if let Some(ref version) = tool.version {
            print!(" ({version})");
        }
        if let Some(ref path) = tool.path {
            print!(" - {}", path.display());
        }
        println!();
    }

    println!();
    if all_ok {
        println!("All tools are available!");
    } else {
        println!("Some tools are missing. Install ffmpeg to enable all features.");
    }
    Ok(())
}

fn validate_rules(config: &Config, rules: &Path) -> Result<()> {
    println!("Validating rules: {}", rules.display());
    let doc = RuleDocument::load(rules)?;
    doc.validate()?;

    let runtime = tokio::runtime::Runtime::new()?;
    let transcoder: Arc<dyn Transcoder> = build_transcoder(config, &runtime);
    let ctx = EngineContext::new(transcoder, &config.paths.workdir).with_dry_run(true);
    let summary = OperationEngine::new(ctx).run(&doc)?;

    println!("✓ Rules are valid");
    println!("  Operations: {}", doc.operations.len());
    println!("    Runnable: {}", summary.executed);
    println!("    Skipped: {}", summary.skipped);
    println!(
        "  Workdir: {}",
        doc.workdir_or(&config.paths.workdir).display()
    );
    if let Some(pre) = &doc.preprocessing {
        println!(
            "  Normalize: {}x{} @ {} fps ({} workers)",
            pre.target_width,
            pre.target_height,
            pre.target_fps,
            pre.effective_workers(num_cpus::get())
        );
    }
    Ok(())
}
