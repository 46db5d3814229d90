// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// OCR Pro — batch text extraction from image collections.
//
// Entry point. Loads the configuration, initialises logging and services,
// builds the image list, runs OCR in the background, and writes the exports.

mod cli;
mod services;

use std::process::ExitCode;

use ocrpro_core::error::{OcrProError, Result};
use ocrpro_core::{MoveDirection, StatusEvent, StatusUpdate};
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::{JoinError, JoinHandle};
use tracing::{error, info, warn};

use cli::{Cli, CollectionEdit};
use services::app_services::{AppServices, load_config};
use services::{data_dir, input};

#[tokio::main]
async fn main() -> ExitCode {
    let (cli, edits) = Cli::parse_with_edits();

    let data_dir = data_dir::data_dir();
    let config = load_config(&data_dir).unwrap_or_default();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    info!("OCR Pro starting");

    let output_dir = match std::env::current_dir() {
        Ok(dir) => dir,
        Err(e) => {
            error!(error = %e, "cannot determine the output directory");
            return ExitCode::FAILURE;
        }
    };

    let services = AppServices::with_config(data_dir, output_dir, config);
    if let Err(e) = services.update_config(|config| cli.apply_overrides(config)) {
        error!(error = %e, "invalid configuration");
        return ExitCode::FAILURE;
    }
    let printer = spawn_status_printer(services.status().subscribe());

    let code = match run(&cli, &edits, &services).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "OCR Pro finished with errors");
            ExitCode::FAILURE
        }
    };

    // The printer stops once the last status sender is gone.
    drop(services);
    if let Err(e) = printer.await {
        warn!(error = %e, "status printer stopped abnormally");
    }
    code
}

async fn run(cli: &Cli, edits: &[CollectionEdit], services: &AppServices) -> Result<()> {
    if cli.save_config {
        services.save_config()?;
    }

    let mut paths = cli.images.clone();
    if cli.pick {
        paths.extend(input::pick_images());
    }
    services.add_images(paths);

    for edit in edits {
        apply_edit(services, *edit)?;
    }

    if services.entries().is_empty() {
        if cli.save_config {
            return Ok(());
        }
        services.status().publish(StatusEvent::NothingToProcess);
        return Err(OcrProError::EmptyCollection);
    }

    services.initialize_engine()?.await.map_err(worker_error)??;
    let report = services.process()?.await.map_err(worker_error)??;
    info!(
        output = %services.output_dir().display(),
        processed = report.processed(),
        failed = report.failed(),
        "run finished, exporting"
    );

    let mut written = 0;
    for format in cli.export_formats() {
        if services.export(format).is_some() {
            written += 1;
        }
    }

    if cli.preview {
        print_previews(services);
    }

    if written == 0 {
        return Err(OcrProError::NothingToExport);
    }
    Ok(())
}

fn apply_edit(services: &AppServices, edit: CollectionEdit) -> Result<()> {
    match edit {
        CollectionEdit::MoveUp(position) => move_edit(services, position, MoveDirection::Up),
        CollectionEdit::MoveDown(position) => move_edit(services, position, MoveDirection::Down),
        CollectionEdit::Remove(position) => {
            services.remove_image(position - 1)?;
        }
    }
    Ok(())
}

fn move_edit(services: &AppServices, position: usize, direction: MoveDirection) {
    if !services.move_image(position - 1, direction) {
        warn!(position, ?direction, "image cannot move further; ignored");
    }
}

fn print_previews(services: &AppServices) {
    for index in 0..services.entries().len() {
        match services.preview(index) {
            Ok(preview) => {
                let (width, height) = preview.thumbnail_size;
                println!(
                    "[{}] {} (thumbnail {width}x{height})\n{}\n",
                    index + 1,
                    preview.name,
                    preview.text
                );
            }
            Err(e) => println!("[{}] preview unavailable: {e}\n", index + 1),
        }
    }
}

/// Print every status update to stderr until the channel closes.
fn spawn_status_printer(mut rx: broadcast::Receiver<StatusUpdate>) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(update) => eprintln!("{update}"),
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "status updates dropped"),
                Err(RecvError::Closed) => break,
            }
        }
    })
}

fn worker_error(e: JoinError) -> OcrProError {
    OcrProError::Worker(format!("background task failed: {e}"))
}
