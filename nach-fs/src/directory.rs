//! # 目录视图层
//!
//! 驻留内存的目录，包装磁盘上的原始目录表。目录本身也是文件，
//! 其内容存放在某个文件头指向的数据扇区中。
//!
//! ## 不变式
//!
//! - 同一目录内，任意两个在用项的名字互不相同
//! - 每个在用项的 `sector` 都指向一个合法的文件头

use alloc::string::String;
use alloc::string::ToString;
use alloc::sync::Arc;
use alloc::vec::Vec;

use crate::Bitmap;
use crate::FileHeader;
use crate::OpenFile;
use crate::RawDirectory;
use crate::SynchDisk;
use crate::layout::DirEntry;

pub struct Directory {
    raw: RawDirectory,
}

/// 枚举目录时输出的单个文件系统项
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirInfo {
    pub name: String,
    pub sector: u32,
    pub is_dir: bool,
}

impl Directory {
    pub fn empty() -> Self {
        Self {
            raw: RawDirectory::empty(),
        }
    }

    /// 从目录文件读入整张目录表
    pub fn fetch_from(file: &OpenFile) -> Self {
        let mut raw = RawDirectory::empty();
        assert_eq!(file.read_at(raw.as_bytes_mut(), 0), RawDirectory::SIZE);
        Self { raw }
    }

    /// 将整张目录表写回目录文件
    pub fn write_back(&self, file: &OpenFile) {
        assert_eq!(file.write_at_raw(self.raw.as_bytes(), 0), RawDirectory::SIZE);
    }

    /// 按名字查找目录项，返回其文件头所在扇区。
    ///
    /// `dirs` 选择匹配哪一类项：为 true 时只有目录项可命中，
    /// 为 false 时只有非目录项可命中。
    pub fn find(&self, name: &str, dirs: bool) -> Option<u32> {
        self.raw
            .table
            .iter()
            .find(|e| e.in_use() && e.is_dir() == dirs && e.name() == name)
            .map(|e| e.sector())
    }

    /// 添加一项。名字已存在(无论哪类)或无空槽位时返回 false。
    pub fn add(&mut self, name: &str, sector: u32, is_dir: bool) -> bool {
        if self.index_of(name).is_some() {
            return false;
        }

        match self.raw.table.iter_mut().find(|e| !e.in_use()) {
            Some(slot) => {
                *slot = DirEntry::new(name, sector, is_dir);
                true
            }
            None => false,
        }
    }

    /// 按名字摘除一项，返回其文件头所在扇区
    pub fn remove(&mut self, name: &str) -> Option<u32> {
        let index = self.index_of(name)?;
        let sector = self.raw.table[index].sector();
        self.raw.table[index].vacate();
        Some(sector)
    }

    /// 递归释放目录引用的所有内容：
    /// 每个文件的数据扇区与文件头扇区，子目录则先深入清理。
    /// 目录自身的扇区由调用者释放。
    pub fn clean(&mut self, disk: &Arc<dyn SynchDisk>, free_map: &mut Bitmap) {
        for entry in self.raw.table.iter_mut().filter(|e| e.in_use()) {
            let sector = entry.sector();
            if entry.is_dir() {
                let file = OpenFile::new(disk.clone(), sector);
                Directory::fetch_from(&file).clean(disk, free_map);
            }

            let mut header = FileHeader::fetch_from(&**disk, sector);
            header.deallocate(free_map);
            free_map.clear(sector);
            entry.vacate();
        }
    }

    /// 枚举在用项
    pub fn entries(&self) -> Vec<DirInfo> {
        self.raw
            .table
            .iter()
            .filter(|e| e.in_use())
            .map(|e| DirInfo {
                name: e.name().to_string(),
                sector: e.sector(),
                is_dir: e.is_dir(),
            })
            .collect()
    }

    pub fn print(&self) {
        for entry in self.raw.table.iter().filter(|e| e.in_use()) {
            log::info!(
                "{}{} at sector {}",
                entry.name(),
                if entry.is_dir() { "/" } else { "" },
                entry.sector()
            );
        }
    }
}

impl Directory {
    /// 只按名字定位槽位，不区分文件与目录
    fn index_of(&self, name: &str) -> Option<usize> {
        self.raw
            .table
            .iter()
            .position(|e| e.in_use() && e.name() == name)
    }
}
