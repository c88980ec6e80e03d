use super::app_config::LogLevel;
use crate::domain::entities::{ImageRole, ParameterSet};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing::warn;

#[derive(Debug, Parser)]
#[command(
    name = "imgix-rewrite",
    version,
    about = "Route static site images through an imgix CDN with local fallback",
    long_about = None
)]
pub struct CliArgs {
    /// Configuration file path.
    #[arg(short, long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Log file path.
    #[arg(long, value_name = "PATH", global = true)]
    pub log_path: Option<PathBuf>,

    /// Log verbosity level.
    #[arg(long, value_enum, global = true)]
    pub log_level: Option<LogLevel>,

    /// imgix source domain.
    #[arg(long, env = "IMGIX_DOMAIN", global = true)]
    pub domain: Option<String>,

    /// Deadline for the availability probe in milliseconds.
    #[arg(long, value_name = "MS", global = true)]
    pub probe_timeout_ms: Option<u64>,

    /// Skip the probe and serve original images.
    #[arg(long, global = true)]
    pub offline: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Probe the CDN and print its availability.
    Probe,
    /// Print the URL for one image.
    Url(ImageArgs),
    /// Print the srcset for one image.
    Srcset(ImageArgs),
    /// Rewrite the images of an HTML page.
    Rewrite(RewriteArgs),
    /// Write the default configuration file.
    InitConfig,
}

#[derive(Debug, Args)]
pub struct ImageArgs {
    /// Image identifier, e.g. `logo.png`.
    #[arg(value_name = "IMAGE")]
    pub image: String,

    /// Catalog role; inferred from the identifier when omitted.
    #[arg(long, value_enum)]
    pub role: Option<ImageRole>,

    /// Parameter override, repeatable.
    #[arg(short, long = "param", value_name = "KEY=VALUE")]
    pub params: Vec<String>,

    /// Parameter overrides as a JSON object.
    #[arg(long = "params", value_name = "JSON")]
    pub params_json: Option<String>,
}

impl ImageArgs {
    /// Overrides from `--params` with `--param` pairs laid on top.
    /// Malformed input is logged and dropped.
    #[must_use]
    pub fn overrides(&self) -> ParameterSet {
        let mut overrides = match self.params_json.as_deref().map(ParameterSet::from_json) {
            Some(Ok(params)) => params,
            Some(Err(e)) => {
                warn!(error = %e, "Ignoring --params");
                ParameterSet::new()
            }
            None => ParameterSet::new(),
        };

        for raw in &self.params {
            match ParameterSet::parse_pair(raw) {
                Ok((key, value)) => overrides.insert(key, value),
                Err(e) => warn!(error = %e, "Ignoring --param"),
            }
        }

        overrides
    }
}

#[derive(Debug, Args)]
pub struct RewriteArgs {
    /// HTML file to rewrite.
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Output file; stdout when omitted.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Inject the performance overlay.
    #[arg(long)]
    pub debug_widget: bool,

    /// Write the performance report as JSON.
    #[arg(long, value_name = "PATH")]
    pub report_json: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_url_command() {
        let args = CliArgs::try_parse_from([
            "imgix-rewrite",
            "--offline",
            "url",
            "hero.jpg",
            "--role",
            "hero",
            "-p",
            "w=1920",
            "--param",
            "q=70",
        ])
        .unwrap();

        assert!(args.offline);
        let Command::Url(image) = args.command else {
            panic!("expected url command");
        };
        assert_eq!(image.image, "hero.jpg");
        assert_eq!(image.role, Some(ImageRole::Hero));
        assert_eq!(image.params, vec!["w=1920", "q=70"]);
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let args = CliArgs::try_parse_from([
            "imgix-rewrite",
            "rewrite",
            "index.html",
            "-o",
            "out.html",
            "--probe-timeout-ms",
            "500",
        ])
        .unwrap();

        assert_eq!(args.probe_timeout_ms, Some(500));
        assert!(matches!(args.command, Command::Rewrite(ref r) if r.output.is_some()));
    }

    #[test]
    fn test_image_overrides_merge_json_and_pairs() {
        let args = CliArgs::try_parse_from([
            "imgix-rewrite",
            "srcset",
            "team.jpg",
            "--params",
            r#"{"q": 60, "fit": "max"}"#,
            "-p",
            "q=90",
            "-p",
            "broken",
        ])
        .unwrap();
        let Command::Srcset(image) = args.command else {
            panic!("expected srcset command");
        };

        let overrides = image.overrides();
        assert_eq!(overrides.canonical_key(), "fit=max&q=90");
    }

    #[test]
    fn test_image_overrides_drop_bad_json() {
        let args =
            CliArgs::try_parse_from(["imgix-rewrite", "url", "a.jpg", "--params", "[1,2]", "-p", "w=10"])
                .unwrap();
        let Command::Url(image) = args.command else {
            panic!("expected url command");
        };

        assert_eq!(image.overrides().canonical_key(), "w=10");
    }
}
