use clap::{ArgAction, Parser};
use dialoguer::Confirm;
use pdfmeta::bibtex;
use pdfmeta::clipboard::{ClipboardSource, StaticClipboard};
use pdfmeta::dialog::{FillOutcome, MetadataDialog, fill_in_from_bibtex};
use pdfmeta::{Controller, MetadataFields, build_model, fields_from_model, read_fields, write_fields};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::{fs, process};

/// Edit the author, title and BibTeX reference stored in PDF files.
#[derive(Debug, Parser)]
#[command(name = "pdfmeta", about, version)]
struct Cli {
    /// PDF files to edit
    #[arg(value_name = "FILE", required = true)]
    files: Vec<PathBuf>,

    /// Fill in metadata from the BibTeX entry in PATH ('-' for stdin) and
    /// save without prompting
    #[arg(long, value_name = "PATH")]
    bibtex: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let cli = Cli::parse();

    let default_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let entry = match cli.bibtex.as_deref().map(read_bibtex_input).transpose() {
        Ok(entry) => entry,
        Err(e) => {
            eprintln!("❌ Error reading BibTeX input: {}", e);
            process::exit(1);
        }
    };
    if let Some(entry) = &entry {
        if !bibtex::is_likely_bibtex(entry) {
            eprintln!("❌ Input does not contain a bibtex entry.");
            process::exit(1);
        }
    }

    let interactive = atty::is(atty::Stream::Stdin);
    let mut failures = 0;

    for path in &cli.files {
        loop {
            match process_file(path, entry.as_deref(), interactive) {
                Ok(()) => break,
                Err(e) => {
                    log::error!("{}: {}", path.display(), e);
                    eprintln!("❌ {}: {}", path.display(), e);
                    let retry = interactive
                        && Confirm::new()
                            .with_prompt("Try again?")
                            .default(false)
                            .interact()
                            .unwrap_or(false);
                    if !retry {
                        failures += 1;
                        break;
                    }
                }
            }
        }
    }

    if failures > 0 {
        process::exit(1);
    }
}

fn process_file(path: &Path, entry: Option<&str>, interactive: bool) -> pdfmeta::Result<()> {
    if !path.exists() {
        return Err(io::Error::new(io::ErrorKind::NotFound, "file not found").into());
    }

    let fields = read_fields(path)?;
    let model = build_model(&fields);

    if let Some(entry) = entry {
        let controller = Controller::new(&model);
        if let FillOutcome::Filled { authors, title } = fill_in_from_bibtex(&controller, entry)? {
            if !authors {
                println!("ℹ️  {}: no author field found", path.display());
            }
            if !title {
                println!("ℹ️  {}: no title field found", path.display());
            }
            write_fields(path, &fields_from_model(&model)?)?;
            println!("✅ {}: metadata updated", path.display());
        }
        return Ok(());
    }

    if !interactive {
        list_fields(path, &fields);
        return Ok(());
    }

    let saved = {
        let mut dialog = MetadataDialog::new(
            path.display().to_string(),
            Controller::new(&model),
            open_clipboard(),
        )?;
        dialog.run()?
    };
    if saved {
        write_fields(path, &fields_from_model(&model)?)?;
    }
    Ok(())
}

fn list_fields(path: &Path, fields: &MetadataFields) {
    println!("\n📋 {}", path.display());
    println!("{}", "─".repeat(50));
    println!("{:<8}: {}", "Title", fields.title);
    println!("{:<8}: {}", "Authors", fields.author);
    println!("{:<8}: {}", "BibTeX", fields.bibtex);
}

fn read_bibtex_input(path: &Path) -> io::Result<String> {
    if path.as_os_str() == "-" {
        let mut entry = String::new();
        io::stdin().read_to_string(&mut entry)?;
        Ok(entry)
    } else {
        fs::read_to_string(path)
    }
}

#[cfg(feature = "clipboard")]
fn open_clipboard() -> Box<dyn ClipboardSource> {
    match pdfmeta::clipboard::SystemClipboard::new() {
        Ok(clipboard) => Box::new(clipboard),
        Err(e) => {
            log::warn!("{}", e);
            Box::new(StaticClipboard(None))
        }
    }
}

#[cfg(not(feature = "clipboard"))]
fn open_clipboard() -> Box<dyn ClipboardSource> {
    Box::new(StaticClipboard(None))
}
