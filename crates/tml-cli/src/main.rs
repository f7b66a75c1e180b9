//! `tml-dump` — CLI principal de tml-cli
//!
//! Ici on fait uniquement : parsing d'arguments, initialisation (logger), et
//! délégation à `tml-codec` pour le décodage.

#![forbid(unsafe_code)]

use std::io::Read as _;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;

use tml_codec::reader::Token;
use tml_codec::{Cell, Reader};

#[derive(Debug, Parser)]
#[command(name = "tml-dump", version, about = "Inspecteur de flux Tagged Marker Language", long_about = None)]
struct Opt {
    /// Fichier `.bml`/`.tml` à inspecter (`-` ou omis pour stdin)
    input: Option<PathBuf>,

    /// Supprime la trace par jeton ; n'affiche qu'un résumé final
    #[arg(short, long)]
    quiet: bool,

    /// Matérialise le document de premier niveau via `Record` et l'imprime en JSON
    #[arg(long)]
    json: bool,

    /// Augmente la verbosité (-v, -vv)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    verbose: u8,
}

fn read_input(input: &Option<PathBuf>) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    match input {
        Some(path) if path.as_os_str() != "-" => {
            std::fs::File::open(path)
                .with_context(|| format!("opening {}", path.display()))?
                .read_to_end(&mut bytes)
                .with_context(|| format!("reading {}", path.display()))?;
        }
        _ => {
            std::io::stdin().read_to_end(&mut bytes).context("reading stdin")?;
        }
    }
    Ok(bytes)
}

fn init_logging(verbose: u8, quiet: bool) {
    #[cfg(feature = "trace")]
    {
        let level = if quiet {
            "error"
        } else {
            match verbose {
                0 => "warn",
                1 => "info",
                _ => "debug",
            }
        };
        std::env::set_var("RUST_LOG", std::env::var("RUST_LOG").unwrap_or_else(|_| level.to_string()));
        env_logger::init();
    }
    #[cfg(not(feature = "trace"))]
    {
        let _ = (verbose, quiet);
    }
}

fn main() -> ExitCode {
    match real_main() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn real_main() -> Result<()> {
    let opt = Opt::parse();
    init_logging(opt.verbose, opt.quiet);

    let bytes = read_input(&opt.input)?;

    if opt.json {
        return dump_json(&bytes);
    }

    dump_tokens(&bytes, opt.quiet)
}

fn dump_tokens(bytes: &[u8], quiet: bool) -> Result<()> {
    let mut reader = Reader::new(bytes);
    let mut frames = 0u64;
    let mut slots = 0u64;

    loop {
        let token = reader.next_token(false).context("decoding token")?;
        match token {
            Token::BeginFrame => {
                frames += 1;
                if !quiet {
                    println!("BeginFrame name={:?}", reader.name());
                }
            }
            Token::EndFrame => {
                if !quiet {
                    println!("EndFrame");
                }
            }
            Token::Slot => {
                slots += 1;
                if !quiet {
                    println!("Slot name={:?} value={:?}", reader.name(), reader.value());
                }
            }
            Token::Pending => break,
        }
    }

    if reader.level() != 0 {
        anyhow::bail!("truncated stream: {} frame(s) still open at end of input", reader.level());
    }

    if quiet {
        println!("frames={frames} slots={slots} bytes={}", bytes.len());
    }
    Ok(())
}

#[cfg(feature = "json")]
fn dump_json(bytes: &[u8]) -> Result<()> {
    let record = tml_codec::Record::read_from(bytes).context("materializing record")?;
    let value = record_to_json(&record)?;
    println!("{}", serde_json::to_string_pretty(&value).context("serializing JSON")?);
    Ok(())
}

#[cfg(not(feature = "json"))]
fn dump_json(_bytes: &[u8]) -> Result<()> {
    anyhow::bail!("--json requires tml-cli to be built with the \"json\" feature")
}

#[cfg(feature = "json")]
fn record_to_json(record: &tml_codec::Record) -> Result<serde_json::Value> {
    use serde_json::{json, Map, Value};

    let array = record
        .array
        .iter()
        .map(cell_to_json)
        .collect::<Result<Vec<_>>>()?;

    let mut atoms = Map::new();
    for (id, cell) in &record.atoms {
        atoms.insert(id.to_string(), cell_to_json(cell)?);
    }

    let mut tags = Map::new();
    for (tag, cell) in &record.tags {
        tags.insert(tag.to_string(), cell_to_json(cell)?);
    }

    let mut strings = Map::new();
    for (name, cell) in &record.strings {
        strings.insert(String::from_utf8_lossy(name).into_owned(), cell_to_json(cell)?);
    }

    Ok(json!({
        "array": array,
        "atoms": atoms,
        "tags": tags,
        "strings": strings,
    }))
}

#[cfg(feature = "json")]
fn cell_to_json(cell: &Cell) -> Result<serde_json::Value> {
    Ok(match cell {
        Cell::Null => serde_json::Value::Null,
        Cell::True => serde_json::Value::Bool(true),
        Cell::False => serde_json::Value::Bool(false),
        Cell::Int32(_)
        | Cell::UInt32(_)
        | Cell::UInt8(_)
        | Cell::UInt16(_)
        | Cell::Int64(_)
        | Cell::UInt64(_)
        | Cell::Double(_)
        | Cell::Float(_)
        | Cell::Atom(_)
        | Cell::Id32(_)
        | Cell::Sid(_)
        | Cell::Oid(_)
        | Cell::Id64(_)
        | Cell::Rid(_) => serde_json::Value::String(cell.to_pretty_string(false)?),
        _ => serde_json::Value::String(cell.to_pretty_string(true)?),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dump_tokens_reports_truncation() {
        let err = dump_tokens(&[tml_codec::Kind::FrameStart.to_type_byte(false)], true).unwrap_err();
        assert!(err.to_string().contains("truncated"));
    }
}
