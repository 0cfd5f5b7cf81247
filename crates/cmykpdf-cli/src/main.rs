// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// cmykpdf — convert image batches into print-ready CMYK PDFs.
//
// Entry point. Initialises logging, parses the command line and runs one
// subcommand: `convert`, `inspect` or `list`.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use cmykpdf_core::human_errors::humanize_error;
use cmykpdf_core::{ConversionRequest, ConversionResult, ConvertConfig, ConvertError};
use cmykpdf_document::{Converter, ImageSource, PdfReader};
use serde::Serialize;

/// cmykpdf - images to CMYK PDF
#[derive(Parser, Debug)]
#[command(name = "cmykpdf")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Convert images into one CMYK PDF, one page per image
    Convert {
        /// Images in page order
        images: Vec<PathBuf>,

        /// Append every image in this folder (sorted by name)
        #[arg(long, value_name = "DIR")]
        folder: Option<PathBuf>,

        /// Page width in points (0 = first image's width)
        #[arg(long, default_value = "0")]
        width: f32,

        /// Page height in points (0 = first image's height)
        #[arg(long, default_value = "0")]
        height: f32,

        /// Output directory (defaults to the downloads folder)
        #[arg(long, value_name = "DIR")]
        out_dir: Option<PathBuf>,

        /// Output file name without `.pdf`
        #[arg(long)]
        name: Option<String>,

        /// JSON settings file
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show pages and embedded images of a PDF
    Inspect {
        pdf: PathBuf,

        /// Print the page summaries as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the images a folder would contribute
    List { dir: PathBuf },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let json = matches!(
        cli.command,
        Commands::Convert { json: true, .. } | Commands::Inspect { json: true, .. }
    );

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if json {
                let result = ConversionResult::failed(&err);
                if let Ok(text) = to_json(&result) {
                    println!("{}", text);
                }
            }
            let human = humanize_error(&err);
            eprintln!("Error: {}", human.message);
            eprintln!("  {}", human.suggestion);
            tracing::debug!(%err, "Command failed");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), ConvertError> {
    match cli.command {
        Commands::Convert {
            mut images,
            folder,
            width,
            height,
            out_dir,
            name,
            config,
            json,
        } => {
            let config = match config {
                Some(path) => ConvertConfig::load(path)?,
                None => ConvertConfig::default(),
            };
            if let Some(folder) = folder {
                images.extend(ImageSource::list_folder(folder)?);
            }

            let mut request = ConversionRequest::new(images).with_page_size(width, height);
            request.output_dir = out_dir;
            request.base_name = name;

            let path = Converter::new(config).try_convert(&request)?;
            if json {
                println!("{}", to_json(&ConversionResult::succeeded(path))?);
            } else {
                println!("{}", path.display());
            }
        }

        Commands::Inspect { pdf, json } => {
            let reader = PdfReader::open(&pdf)?;
            let pages = reader.pages()?;
            if json {
                println!("{}", to_json(&pages)?);
                return Ok(());
            }

            println!("{}: PDF {}, {} page(s)", pdf.display(), reader.version(), pages.len());
            for page in &pages {
                let [x0, y0, x1, y1] = page.media_box;
                println!(
                    "  page {}: {}x{}pt, rotate {}",
                    page.number,
                    x1 - x0,
                    y1 - y0,
                    page.rotation
                );
                for image in &page.images {
                    println!(
                        "    /{}: {}x{} {} {}-bit /{}{}",
                        image.name,
                        image.width,
                        image.height,
                        image.color_space,
                        image.bits_per_component,
                        image.filter,
                        if image.inverted_decode { " (inverted)" } else { "" }
                    );
                }
            }
        }

        Commands::List { dir } => {
            for path in ImageSource::list_folder(&dir)? {
                let info = ImageSource::describe(&path)?;
                println!("{:>10}  {}", info.size, info.name);
            }
        }
    }

    Ok(())
}

/// Pretty JSON for stdout.
fn to_json<T: Serialize>(value: &T) -> Result<String, ConvertError> {
    serde_json::to_string_pretty(value).map_err(|err| ConvertError::Report(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    struct Unprintable;

    impl Serialize for Unprintable {
        fn serialize<S: serde::Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
            Err(serde::ser::Error::custom("cannot be printed"))
        }
    }

    #[test]
    fn json_output_failure_is_report_error() {
        let err = to_json(&Unprintable).unwrap_err();
        assert!(matches!(err, ConvertError::Report(_)));
        let human = humanize_error(&err);
        assert!(!human.message.contains("settings"));
    }

    #[test]
    fn convert_arguments_parse() {
        let cli = Cli::try_parse_from([
            "cmykpdf", "convert", "a.png", "b.jpg", "--width", "595", "--name", "proof", "--json",
        ])
        .unwrap();
        match cli.command {
            Commands::Convert {
                images,
                width,
                height,
                name,
                json,
                ..
            } => {
                assert_eq!(images, vec![PathBuf::from("a.png"), PathBuf::from("b.jpg")]);
                assert_eq!(width, 595.0);
                assert_eq!(height, 0.0);
                assert_eq!(name.as_deref(), Some("proof"));
                assert!(json);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }
}
