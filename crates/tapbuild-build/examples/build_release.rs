//! Build a release binary from a tapbuild configuration file
//!
//! Usage: `cargo run --example build_release -- path/to/tapbuild.yaml`

use std::sync::Arc;

use tapbuild_build::{
    BuildConfig, ExecutorConfig, OutputMode, ProgressFactory, ProjectBuilder, ShellExecutor,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();

    let config_path = std::env::args().nth(1).unwrap_or_else(|| "tapbuild.yaml".to_string());
    let config = BuildConfig::from_file(&config_path)?;

    let executor =
        ShellExecutor::new(ExecutorConfig { output: OutputMode::Log, ..Default::default() });
    let builder = ProjectBuilder::new(executor)
        .with_progress(Arc::from(ProgressFactory::create(true)))
        .with_clean_command("swift package clean --package-path {package_path}");

    info!("Building {} ({})", config.project_name(), config.build_mode());
    let artifact = builder.build(&config).await?;

    println!("{}", artifact.to_json()?);
    Ok(())
}
