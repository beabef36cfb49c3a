use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
pub struct Cli {
    /// Host directory holding the files to pack
    #[arg(long, short)]
    pub source: PathBuf,

    /// Output directory for the disk image
    #[arg(long, short = 'O')]
    pub out_dir: PathBuf,

    /// Image size in sectors
    #[arg(long, default_value_t = 1024)]
    pub sectors: u32,
}
