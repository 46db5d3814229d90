// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Command-line interface.

use std::path::PathBuf;

use clap::builder::RangedU64ValueParser;
use clap::{ArgMatches, CommandFactory, FromArgMatches, Parser, ValueEnum};
use ocrpro_core::{AppConfig, ExportFormat};

#[derive(Parser, Debug)]
#[command(name = "ocrpro", version)]
#[command(about = "Batch OCR for image collections, exported as TXT and PDF", long_about = None)]
pub struct Cli {
    /// Image files to process, in order
    pub images: Vec<PathBuf>,

    /// Choose more images with a file dialog
    #[arg(long)]
    pub pick: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Both)]
    pub format: OutputFormat,

    /// Recognition languages, comma-separated (e.g. es,en)
    #[arg(short, long, value_delimiter = ',')]
    pub languages: Option<Vec<String>>,

    /// Do not request hardware acceleration
    #[arg(long)]
    pub cpu: bool,

    /// Directory holding the recognition models
    #[arg(long)]
    pub model_dir: Option<PathBuf>,

    /// Save the effective settings as the new defaults
    #[arg(long)]
    pub save_config: bool,

    /// Print each image's text and thumbnail size after processing
    #[arg(long)]
    pub preview: bool,

    /// Move image N (1-based) one place up
    #[arg(long, value_name = "N", value_parser = RangedU64ValueParser::<usize>::new().range(1..))]
    pub move_up: Vec<usize>,

    /// Move image N (1-based) one place down
    #[arg(long, value_name = "N", value_parser = RangedU64ValueParser::<usize>::new().range(1..))]
    pub move_down: Vec<usize>,

    /// Remove image N (1-based)
    #[arg(long, value_name = "N", value_parser = RangedU64ValueParser::<usize>::new().range(1..))]
    pub remove: Vec<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Txt,
    Pdf,
    Both,
}

/// A list edit, with a 1-based position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionEdit {
    MoveUp(usize),
    MoveDown(usize),
    Remove(usize),
}

impl Cli {
    /// Parse `std::env::args`, also returning the list edits in the order
    /// they were given.
    pub fn parse_with_edits() -> (Self, Vec<CollectionEdit>) {
        let matches = Self::command().get_matches();
        let edits = collection_edits(&matches);
        let cli = Self::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());
        (cli, edits)
    }

    /// Fold the command-line settings into `config`.
    pub fn apply_overrides(&self, config: &mut AppConfig) {
        if let Some(languages) = &self.languages {
            config.languages = languages.iter().map(|l| l.trim().to_string()).collect();
        }
        if self.cpu {
            config.use_accelerator = false;
        }
        if let Some(dir) = &self.model_dir {
            config.model_dir = Some(dir.clone());
        }
    }

    pub fn export_formats(&self) -> Vec<ExportFormat> {
        match self.format {
            OutputFormat::Txt => vec![ExportFormat::Text],
            OutputFormat::Pdf => vec![ExportFormat::Pdf],
            OutputFormat::Both => vec![ExportFormat::Text, ExportFormat::Pdf],
        }
    }
}

/// Collect `--move-up`, `--move-down` and `--remove` in command-line order.
pub fn collection_edits(matches: &ArgMatches) -> Vec<CollectionEdit> {
    let kinds: [(&str, fn(usize) -> CollectionEdit); 3] = [
        ("move_up", CollectionEdit::MoveUp),
        ("move_down", CollectionEdit::MoveDown),
        ("remove", CollectionEdit::Remove),
    ];

    let mut ordered: Vec<(usize, CollectionEdit)> = Vec::new();
    for (id, make) in kinds {
        if let (Some(values), Some(indices)) =
            (matches.get_many::<usize>(id), matches.indices_of(id))
        {
            ordered.extend(indices.zip(values.copied().map(make)));
        }
    }
    ordered.sort_by_key(|(arg_index, _)| *arg_index);
    ordered.into_iter().map(|(_, edit)| edit).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> (Cli, Vec<CollectionEdit>) {
        let matches = Cli::command()
            .try_get_matches_from(args)
            .expect("valid arguments");
        let edits = collection_edits(&matches);
        (Cli::from_arg_matches(&matches).expect("from matches"), edits)
    }

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn defaults_export_both_formats() {
        let (cli, edits) = parse(&["ocrpro", "a.png", "b.png"]);
        assert_eq!(cli.images, vec![PathBuf::from("a.png"), PathBuf::from("b.png")]);
        assert_eq!(cli.export_formats(), vec![ExportFormat::Text, ExportFormat::Pdf]);
        assert!(edits.is_empty());
    }

    #[test]
    fn edits_keep_command_line_order() {
        let (_, edits) = parse(&[
            "ocrpro",
            "--remove",
            "3",
            "a.png",
            "--move-up",
            "2",
            "--remove",
            "1",
            "--move-down",
            "1",
        ]);
        assert_eq!(
            edits,
            vec![
                CollectionEdit::Remove(3),
                CollectionEdit::MoveUp(2),
                CollectionEdit::Remove(1),
                CollectionEdit::MoveDown(1),
            ]
        );
    }

    #[test]
    fn zero_position_is_rejected() {
        assert!(
            Cli::command()
                .try_get_matches_from(["ocrpro", "--remove", "0"])
                .is_err()
        );
    }

    #[test]
    fn overrides_replace_config_fields() {
        let (cli, _) = parse(&[
            "ocrpro",
            "--languages",
            "en, fr",
            "--cpu",
            "--model-dir",
            "/models",
            "--format",
            "pdf",
        ]);
        let mut config = AppConfig::default();
        cli.apply_overrides(&mut config);

        assert_eq!(config.languages, vec!["en", "fr"]);
        assert!(!config.use_accelerator);
        assert_eq!(config.model_dir, Some(PathBuf::from("/models")));
        assert_eq!(cli.export_formats(), vec![ExportFormat::Pdf]);
    }

    #[test]
    fn no_overrides_keep_defaults() {
        let (cli, _) = parse(&["ocrpro"]);
        let mut config = AppConfig::default();
        cli.apply_overrides(&mut config);
        assert_eq!(config, AppConfig::default());
    }
}
