use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use imgix_rewrite::ImageOptimizer;
use imgix_rewrite::infrastructure::config::{ImageArgs, RewriteArgs};
use imgix_rewrite::infrastructure::{
    AppConfig, CliArgs, Command, LogLevel, StorageManager, optimizer_from_config,
};
use imgix_rewrite::presentation::{PageImageProcessor, PageOptions, PerformanceReport};

fn init_logging(config: &AppConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.to_string()));

    if let Some(log_path) = &config.log_path {
        if let Some(parent) = log_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_path)?;

        let file_layer = fmt::layer()
            .with_writer(file)
            .with_ansi(false)
            .with_target(true)
            .with_thread_ids(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(file_layer)
            .init();

        info!(path = %log_path.display(), "Logging initialized");
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
            .init();
    }

    Ok(())
}

/// Loads the configuration with a stderr subscriber in scope, so storage
/// warnings are visible before the configured logger exists.
///
/// `init-config` refuses a malformed file instead of replacing it.
fn load_config(args: &CliArgs) -> Result<(StorageManager, AppConfig)> {
    let level = args.log_level.unwrap_or(LogLevel::Warn).to_tracing_level();
    let bootstrap = fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .with_target(false)
        .finish();

    tracing::subscriber::with_default(bootstrap, || {
        let storage = StorageManager::new()?;
        let path = args.config.as_deref();
        let mut config = if matches!(args.command, Command::InitConfig) {
            storage.read_config(path)?
        } else {
            storage.load_config(path)?
        };
        config.merge_with_args(args);
        config.validate()?;
        Ok((storage, config))
    })
}

async fn run_probe(optimizer: &ImageOptimizer) {
    let state = optimizer.probe_availability().await;
    match optimizer.outcome().and_then(|o| o.reason()) {
        Some(reason) => println!("{state}: {reason}"),
        None => println!("{state}"),
    }
}

async fn run_url(optimizer: &ImageOptimizer, image: &ImageArgs) {
    optimizer.probe_availability().await;
    let overrides = image.overrides();
    let url = match image.role {
        Some(role) => optimizer.build_url_for_role(&image.image, role, &overrides),
        None => optimizer.build_url(&image.image, &overrides),
    };
    println!("{url}");
}

async fn run_srcset(optimizer: &ImageOptimizer, image: &ImageArgs) {
    optimizer.probe_availability().await;
    let overrides = image.overrides();
    let set = match image.role {
        Some(role) => optimizer.build_responsive_set_for_role(&image.image, role, &overrides),
        None => optimizer.build_responsive_set(&image.image, &overrides),
    };
    println!("{}", set.to_srcset());
}

async fn run_rewrite(
    optimizer: &ImageOptimizer,
    config: &AppConfig,
    rewrite: &RewriteArgs,
) -> Result<()> {
    let html = tokio::fs::read_to_string(&rewrite.input)
        .await
        .wrap_err_with(|| format!("failed to read {}", rewrite.input.display()))?;

    optimizer.probe_availability().await;

    let options = PageOptions {
        lazy_loading: config.page.lazy_loading,
        art_direction: config.page.art_direction,
        sizes: config.responsive.sizes.clone(),
    };
    let page = PageImageProcessor::new(optimizer, options).process(&html);

    let report = PerformanceReport::from_html(&page.html, &config.cdn.domain);
    report.log();
    if page.summary.invalid_overrides > 0 {
        warn!(
            count = page.summary.invalid_overrides,
            "Some data-imgix-params attributes were discarded"
        );
    }

    let output = if rewrite.debug_widget || config.page.debug_widget {
        report.inject_widget(&page.html)
    } else {
        page.html
    };

    match &rewrite.output {
        Some(path) => {
            tokio::fs::write(path, output)
                .await
                .wrap_err_with(|| format!("failed to write {}", path.display()))?;
            info!(path = %path.display(), "Wrote rewritten page");
        }
        None => print!("{output}"),
    }

    if let Some(path) = &rewrite.report_json {
        let json = serde_json::to_string_pretty(&report)?;
        tokio::fs::write(path, json)
            .await
            .wrap_err_with(|| format!("failed to write {}", path.display()))?;
    }

    info!("{}", optimizer.cache_stats());
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let args = CliArgs::parse();
    let (storage, config) = load_config(&args)?;

    init_logging(&config)?;

    info!(
        version = imgix_rewrite::VERSION,
        domain = %config.cdn.domain,
        "Starting {}",
        imgix_rewrite::NAME
    );

    if matches!(args.command, Command::InitConfig) {
        let path = storage.save_config(&config, args.config.as_deref())?;
        println!("{}", path.display());
        return Ok(());
    }

    let optimizer = optimizer_from_config(&config)?;

    match &args.command {
        Command::Probe => run_probe(&optimizer).await,
        Command::Url(image) => run_url(&optimizer, image).await,
        Command::Srcset(image) => run_srcset(&optimizer, image).await,
        Command::Rewrite(rewrite) => run_rewrite(&optimizer, &config, rewrite).await?,
        Command::InitConfig => {}
    }

    Ok(())
}
