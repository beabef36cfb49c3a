mod cli;

use std::fs;
use std::fs::File;
use std::io;
use std::io::Read;
use std::sync::Arc;

use clap::Parser;
use cli::Cli;
use nach_fs::FileSystem;
use nach_fs::{NUM_DIRECT, SECTOR_SIZE};
use nach_fs_fuse::DiskFile;

fn main() -> io::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    println!("source={:?}\nout_dir={:?}", cli.source, cli.out_dir);

    let disk = Arc::new(DiskFile::create(&cli.out_dir.join("disk.img"), cli.sectors)?);
    let fs = FileSystem::format(disk);

    for entry in fs::read_dir(&cli.source)? {
        let entry = entry?;
        let name = entry
            .file_name()
            .into_string()
            .expect("source file name is not valid unicode");

        let mut data = Vec::new();
        File::open(entry.path())?.read_to_end(&mut data)?;
        if data.len() > NUM_DIRECT * SECTOR_SIZE {
            log::warn!("skipping {name:?}: larger than the maximum file size");
            continue;
        }

        println!("packing: {name:?} ({} bytes)", data.len());
        fs.create(&format!("/{name}"), data.len())
            .expect("cannot create file in image");
        let file = fs.open(&format!("/{name}")).unwrap();
        assert_eq!(file.write_at(&fs, &data, 0), data.len());
    }

    assert!(fs.check(), "freshly packed image is inconsistent");
    Ok(())
}
