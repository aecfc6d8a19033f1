//! Command implementations

use crate::cli::{Cli, Command, MergeArgs};
use crate::settings::SettingsManager;
use crate::sources;
use anyhow::{Context, Result};
use chrono::Utc;
use doc_merge::{merge_sources, MergeOptions};
use std::path::Path;

pub fn run_command(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Merge(args) => cmd_merge(&args),
    }
}

fn cmd_merge(args: &MergeArgs) -> Result<()> {
    let settings = SettingsManager::new(args.config.as_deref())
        .load_sync()
        .context("Failed to read settings")?;
    let settings = args.apply(settings);

    let paths = sources::collect_inputs(&args.files, args.input_dir.as_deref(), settings.order)?;
    let revision = match &args.revision {
        Some(revision) => revision.clone(),
        None => sources::current_revision(Path::new(".")),
    };
    let tokens = settings
        .tokens
        .token_set(Utc::now(), &revision)
        .context("Invalid token configuration")?;

    let options = MergeOptions::default()
        .with_seed_policy(settings.seed_policy)
        .with_page_breaks(settings.page_breaks);
    tracing::info!(
        "Merging {} documents (seed: {:?}, page breaks: {}, revision: {})",
        paths.len(),
        options.seed_policy,
        options.page_breaks,
        revision
    );

    let sources = sources::load_sources(&paths)?;
    let (bytes, summary) = merge_sources(sources, options, &tokens).context("Merge failed")?;

    std::fs::write(&settings.output, bytes)
        .with_context(|| format!("Failed to write {}", settings.output.display()))?;

    tracing::debug!(
        "Summary: {}",
        serde_json::to_string(&summary).unwrap_or_default()
    );
    println!(
        "Merged {} documents into {} ({} styles renamed, {} paragraphs substituted)",
        summary.sources_merged,
        settings.output.display(),
        summary.styles_renamed,
        summary.paragraphs_substituted
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use tempfile::TempDir;

    #[test]
    fn test_merge_without_inputs_fails() {
        let dir = TempDir::new().unwrap();
        let input_dir = dir.path().to_string_lossy().into_owned();
        let cli = Cli::try_parse_from(["book-of-status", "merge", "--input-dir", &input_dir]).unwrap();
        let err = run_command(cli).unwrap_err();
        assert!(err.to_string().contains("No input documents"));
    }

    #[test]
    fn test_merge_reports_unreadable_source() {
        let dir = TempDir::new().unwrap();
        let broken = dir.path().join("broken.odt");
        std::fs::write(&broken, b"not a package").unwrap();
        let output = dir.path().join("out.odt");

        let cli = Cli::try_parse_from([
            "book-of-status",
            "merge",
            broken.to_str().unwrap(),
            "--revision",
            "abc",
            "-o",
            output.to_str().unwrap(),
        ])
        .unwrap();

        let err = run_command(cli).unwrap_err();
        assert!(format!("{:#}", err).contains("broken.odt"));
        assert!(!output.exists());
    }
}
