// crates/scl-rdf-cli/src/main.rs
//! `scl-rdf`: converts SCL documents to N-Triples and back.
//!
//! Examples:
//!   scl-rdf encode station.scd station.nt
//!   scl-rdf decode station.nt station_validated.scd
//!   scl-rdf --config codec.toml validate station.scd --dataset scl_file_4

use clap::{Parser, Subcommand};
use log::info;
use scl_rdf::{
    CodecConfig, ConversionStatus, MemoryStore, UnknownTypePolicy, convert_and_validate,
    dataset_name, decode, encode, parse_document, parse_ntriples, write_document, write_ntriples,
};
use std::error::Error;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "scl-rdf", version, about = "Lossless SCL <-> RDF converter")]
struct Cli {
    /// TOML file with codec settings.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Indentation of written SCL, 0 for a single line.
    #[arg(long, global = true)]
    indent: Option<usize>,

    /// Drop child entities without an element type instead of failing.
    #[arg(long, global = true)]
    skip_unknown: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert an SCL document into N-Triples.
    Encode {
        /// SCL file (.scd, .icd, .cid, ...).
        input: PathBuf,
        /// N-Triples file to write.
        output: PathBuf,
    },

    /// Rebuild an SCL document from N-Triples.
    Decode {
        input: PathBuf,
        output: PathBuf,
    },

    /// Run the full store round trip and report the verdict.
    Validate {
        input: PathBuf,

        /// Dataset name in the in-memory store.
        #[arg(long)]
        dataset: Option<String>,

        /// Also write the regenerated document here.
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn load_config(cli: &Cli) -> Result<CodecConfig, Box<dyn Error>> {
    let mut config = match &cli.config {
        Some(path) => toml::from_str(&fs::read_to_string(path)?)?,
        None => CodecConfig::default(),
    };
    if let Some(indent) = cli.indent {
        config.indent = indent;
    }
    if cli.skip_unknown {
        config.unknown_type_policy = UnknownTypePolicy::Skip;
    }
    Ok(config)
}

fn run_encode(input: &Path, output: &Path, config: &CodecConfig) -> Result<(), Box<dyn Error>> {
    let xml = fs::read_to_string(input)?;
    let doc = parse_document(&xml, &config.parse_options())?;
    let encoded = encode(&doc, config)?;

    let mut out = BufWriter::new(File::create(output)?);
    write_ntriples(&encoded.graph, &mut out)?;
    out.flush()?;

    info!(
        "Wrote {} triples ({} elements, {} opaque blocks) to {}",
        encoded.graph.len(),
        encoded.element_count,
        encoded.opaque_count,
        output.display()
    );
    Ok(())
}

fn run_decode(input: &Path, output: &Path, config: &CodecConfig) -> Result<(), Box<dyn Error>> {
    let graph = parse_ntriples(&fs::read_to_string(input)?)?;
    let decoded = decode(&graph, config)?;
    fs::write(output, write_document(&decoded.document, &config.write_options())?)?;
    info!(
        "Wrote {} with {} warnings",
        output.display(),
        decoded.warnings.len()
    );
    Ok(())
}

fn run_validate(
    input: &Path,
    dataset: Option<String>,
    output: Option<&Path>,
    config: &CodecConfig,
) -> Result<(), Box<dyn Error>> {
    let xml = fs::read_to_string(input)?;
    let dataset = dataset.unwrap_or_else(|| dataset_name(1));
    let mut store = MemoryStore::new()?;
    let report = convert_and_validate(&mut store, &dataset, &xml, config)?;

    println!("dataset:   {}", report.dataset);
    println!("triples:   {}", report.triple_count);
    println!("elements:  {}", report.element_count);
    println!("opaque:    {}", report.opaque_count);
    println!("warnings:  {}", report.warnings.len());
    println!("status:    {}", report.status);
    println!("{}", report.verdict);

    if let Some(path) = output {
        fs::write(path, &report.regenerated)?;
    }
    if report.status != ConversionStatus::Validated {
        return Err(format!("{} did not survive the round trip", input.display()).into());
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;

    match cli.command {
        Commands::Encode { input, output } => run_encode(&input, &output, &config),
        Commands::Decode { input, output } => run_decode(&input, &output, &config),
        Commands::Validate {
            input,
            dataset,
            output,
        } => run_validate(&input, dataset, output.as_deref(), &config),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_config_from_toml() {
        let config: CodecConfig = toml::from_str(
            r#"
            unknown_type_policy = "skip"
            indent = 0
            opaque_tags = ["Private", "VendorData"]
            "#,
        )
        .unwrap();
        assert_eq!(config.unknown_type_policy, UnknownTypePolicy::Skip);
        assert_eq!(config.indent, 0);
        assert_eq!(config.opaque_tags.len(), 2);
        assert_eq!(config.element_namespace, "http://iec61850.com/SCL#");
    }

    #[test]
    fn test_flags_override_config() {
        let cli = Cli::parse_from(["scl-rdf", "--indent", "4", "--skip-unknown", "encode", "a.scd", "a.nt"]);
        let config = load_config(&cli).unwrap();
        assert_eq!(config.indent, 4);
        assert_eq!(config.unknown_type_policy, UnknownTypePolicy::Skip);
    }
}
