use std::path::PathBuf;

use clap::{Args, Parser};

#[derive(Parser, Debug)]
#[command(name = "asn1gen")]
#[command(about = "Generate Rust type definitions from ASN.1 modules", long_about = None)]
#[command(version)]
pub struct Cli {
    /// ASN.1 file to compile.
    pub file: PathBuf,
    /// Write one Rust file per module into this directory instead of stdout.
    #[arg(long)]
    pub outdir: Option<PathBuf>,
    /// Embed the source ASN.1 definitions as comments in generated code.
    #[arg(long)]
    pub include_asn1: bool,
    #[command(flatten)]
    pub action: ActionFlags,
}

#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
pub struct ActionFlags {
    /// Only parse.
    #[arg(long)]
    pub parse: bool,
    /// Parse and build the semantic model.
    #[arg(long)]
    pub sema: bool,
    /// Parse, build the semantic model and generate Rust code.
    #[arg(long)]
    pub r#gen: bool,
}
