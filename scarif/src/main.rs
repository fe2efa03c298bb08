//! `scarif` command line over SCRF and schematic files.
//!
//! There is no diff-producing verb: that needs a world reader, so callers embed
//! [`scarif_diff::DiffEngine`] with their own `WorldSource` instead.

mod files;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;

use scarif_diff::ChunkBounds;
use scarif_format::{Compression, Envelope, ScarifStructure};
use scarif_schematic::Schematic;

#[derive(Parser)]
#[command(
    name = "scarif",
    about = "SCRF world diff files and legacy schematic id translation",
    long_about = "SCRF world diff files and legacy schematic id translation.\n\n\
                  Diffs are produced by embedding scarif_diff::DiffEngine over a world \
                  reader; this tool works on the files it writes."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Translate the block ids of a schematic from one id mapping to another
    Translate {
        /// Input schematic
        input: PathBuf,
        /// Id mapping of the world the schematic was made in (JSON)
        input_map: PathBuf,
        /// Id mapping of the target world (JSON)
        output_map: PathBuf,
        /// Output schematic
        output: PathBuf,
    },

    /// Rename the entries of a SCRF id table with an `old,new` lookup table
    Convert {
        /// Input diff file
        input: PathBuf,
        /// Lookup table used to transform block names
        transformer: PathBuf,
        /// Output diff file
        output: PathBuf,
        /// Compression level of the written file (Brotli 0-11, zlib 0-9)
        #[arg(short, long, env = "SCARIF_COMPRESSION_LEVEL", default_value_t = scarif_format::DEFAULT_COMPRESSION_LEVEL)]
        level: u32,
        /// Compressor wrapped around the written file
        #[arg(short, long, env = "SCARIF_ENVELOPE", value_enum, default_value_t = EnvelopeArg::Brotli)]
        envelope: EnvelopeArg,
    },

    /// Print the contents of a SCRF file
    Inspect {
        input: PathBuf,
        /// Only list chunks touching these bounds ("minX:minY:minZ:maxX:maxY:maxZ")
        #[arg(short, long, env = "SCARIF_BOUNDS")]
        bounds: Option<String>,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
pub enum EnvelopeArg {
    Brotli,
    Zlib,
}

impl From<EnvelopeArg> for Envelope {
    fn from(arg: EnvelopeArg) -> Self {
        match arg {
            EnvelopeArg::Brotli => Envelope::Brotli,
            EnvelopeArg::Zlib => Envelope::Zlib,
        }
    }
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let result = match args.command {
        Command::Translate {
            input,
            input_map,
            output_map,
            output,
        } => translate(&input, &input_map, &output_map, &output),
        Command::Convert {
            input,
            transformer,
            output,
            level,
            envelope,
        } => convert(&input, &transformer, &output, Compression::new(envelope.into(), level)),
        Command::Inspect { input, bounds, json } => inspect(&input, bounds.as_deref(), json),
    };

    if let Err(e) = result {
        eprintln!("Error: {:?}", e);
        std::process::exit(1);
    }
}

fn translate(input: &Path, input_map: &Path, output_map: &Path, output: &Path) -> Result<()> {
    let source = files::load_id_map(input_map)?;
    let target = files::load_id_map(output_map)?;
    let mut schematic = Schematic::load(input)?;

    let report = scarif_schematic::translate_schematic(&mut schematic, &source, &target, |done, total| {
        log::info!("Translated {}/{} blocks", done, total);
    })?;

    println!("Saving...");
    schematic.save(output)?;

    print!("{}", report.generate_report());
    Ok(())
}

fn convert(input: &Path, transformer: &Path, output: &Path, compression: Compression) -> Result<()> {
    let mut scrf = ScarifStructure::load(input).with_context(|| format!("loading {}", input.display()))?;
    let transformer = files::load_transformer(transformer)?;

    let mut id_map = scrf.id_map().clone();
    let renamed = id_map.remap_names(&transformer);
    scrf.set_id_map(id_map);
    log::info!("Renamed {} of {} id table entries", renamed, scrf.id_map().len());

    scrf.save(output, compression)
        .with_context(|| format!("writing {}", output.display()))?;
    println!("Converted {} -> {} ({} names changed)", input.display(), output.display(), renamed);
    Ok(())
}

#[derive(Serialize)]
struct ChunkSummary {
    x: i32,
    z: i32,
    blocks: usize,
    tile_entities: usize,
}

#[derive(Serialize)]
struct InspectReport {
    version: i32,
    id_table: usize,
    chunks: usize,
    blocks: usize,
    listed: Vec<ChunkSummary>,
}

fn inspect(input: &Path, bounds: Option<&str>, json: bool) -> Result<()> {
    let bounds = ChunkBounds::parse(bounds)?;
    let scrf = ScarifStructure::load(input).with_context(|| format!("loading {}", input.display()))?;

    let listed = scrf
        .chunks()
        .filter(|chunk| bounds.coarse_contains(chunk.pos))
        .map(|chunk| ChunkSummary {
            x: chunk.pos.x,
            z: chunk.pos.z,
            blocks: chunk.blocks.len(),
            tile_entities: chunk.blocks.iter().filter(|(_, b)| b.tile().is_some()).count(),
        })
        .collect();

    let report = InspectReport {
        version: scrf.version(),
        id_table: scrf.id_map().len(),
        chunks: scrf.chunk_count(),
        blocks: scrf.block_count(),
        listed,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("SCRF v{} ({} id table entries)", report.version, report.id_table);
    println!("Chunks: {}  Blocks: {}", report.chunks, report.blocks);
    for chunk in &report.listed {
        println!(
            "  chunk ({}, {}): {} blocks, {} tile entities",
            chunk.x, chunk.z, chunk.blocks, chunk.tile_entities
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_help_points_at_diff_engine() {
        let command = Args::command();
        let long_about = command.get_long_about().map(|s| s.to_string()).unwrap_or_default();
        assert!(long_about.contains("scarif_diff::DiffEngine"));
        assert!(command.get_subcommands().all(|sub| sub.get_name() != "generate"));
    }

    #[test]
    fn test_convert_envelope_flag() {
        let args = Args::try_parse_from(["scarif", "convert", "in.scrf", "t.csv", "out.scrf", "-e", "zlib", "-l", "6"]).unwrap();
        match args.command {
            Command::Convert { level, envelope, .. } => {
                assert_eq!(Compression::new(envelope.into(), level), Compression::new(Envelope::Zlib, 6));
            }
            _ => panic!("expected convert"),
        }

        let args = Args::try_parse_from(["scarif", "convert", "in.scrf", "t.csv", "out.scrf"]).unwrap();
        match args.command {
            Command::Convert { level, envelope, .. } => {
                assert_eq!(Compression::new(envelope.into(), level), Compression::default());
            }
            _ => panic!("expected convert"),
        }
    }
}
