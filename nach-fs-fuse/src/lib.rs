//! 宿主机侧的磁盘设备：把一个普通文件当作扇区阵列使用，
//! 供打包工具与测试在宿主机上操作磁盘镜像。

use std::fs::File;
use std::fs::OpenOptions;
use std::io;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;
use std::sync::Mutex;

use nach_fs::SynchDisk;
use nach_fs::SECTOR_SIZE;

pub struct DiskFile(pub Mutex<File>);

impl DiskFile {
    /// 新建指定扇区数的空镜像，已存在则清空
    pub fn create(path: &Path, num_sectors: u32) -> io::Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;
        file.set_len(num_sectors as u64 * SECTOR_SIZE as u64)?;
        Ok(Self(Mutex::new(file)))
    }

    pub fn open(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().read(true).write(true).open(path)?;
        Ok(Self(Mutex::new(file)))
    }
}

impl SynchDisk for DiskFile {
    fn read_sector(&self, sector: u32, buf: &mut [u8]) {
        let mut file = self.0.lock().unwrap();
        file.seek(SeekFrom::Start(sector as u64 * SECTOR_SIZE as u64))
            .expect("seeking error");
        assert_eq!(file.read(buf).unwrap(), SECTOR_SIZE, "not a complete sector!");
    }

    fn write_sector(&self, sector: u32, buf: &[u8]) {
        let mut file = self.0.lock().unwrap();
        file.seek(SeekFrom::Start(sector as u64 * SECTOR_SIZE as u64))
            .expect("seeking error");
        assert_eq!(
            file.write(buf).unwrap(),
            SECTOR_SIZE,
            "not a complete sector!"
        );
    }

    fn num_sectors(&self) -> u32 {
        let file = self.0.lock().unwrap();
        (file.metadata().unwrap().len() / SECTOR_SIZE as u64) as u32
    }
}
