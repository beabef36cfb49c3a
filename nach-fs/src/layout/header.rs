//! 文件头(inode)：恰好占据一个扇区的定长记录，
//! 按文件内偏移的顺序列出文件的所有数据扇区。
//!
//! ## 不变式
//!
//! - `num_sectors == ceil(num_bytes / SECTOR_SIZE)` 且 `num_sectors <= NUM_DIRECT`
//! - `data_sectors[..num_sectors]` 互不相同、在盘内，且在空闲位图中置位

use core::mem;
use core::ptr;

use crate::Bitmap;
use crate::SynchDisk;
use crate::{NUM_DIRECT, SECTOR_SIZE};

#[repr(C)]
#[derive(Debug, Default, Clone)]
pub struct FileHeader {
    /// 文件的逻辑大小(字节)
    num_bytes: u32,
    /// 数据扇区个数
    num_sectors: u32,
    /// 直接索引表，依文件内偏移的顺序记录扇区编号
    data_sectors: [u32; NUM_DIRECT],
}

impl FileHeader {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// 为一个大小为 `size` 字节的新文件分配数据扇区。
    /// 直接索引不足或空闲位不足时返回 false，且不产生任何状态变化。
    pub fn allocate(&mut self, free_map: &mut Bitmap, size: usize) -> bool {
        let sectors = size.div_ceil(SECTOR_SIZE);
        if sectors > NUM_DIRECT || free_map.count_clear() < sectors {
            return false;
        }

        self.num_bytes = size as u32;
        self.num_sectors = sectors as u32;
        for slot in &mut self.data_sectors[..sectors] {
            // 上面已确认空闲位足够
            *slot = free_map.find().unwrap();
        }
        true
    }

    /// 把文件的逻辑大小增加 `additional` 字节，按需追加数据扇区。
    /// 失败时返回 false，且不产生任何状态变化。
    pub fn extend(&mut self, free_map: &mut Bitmap, additional: usize) -> bool {
        let new_bytes = self.num_bytes as usize + additional;
        let new_sectors = new_bytes.div_ceil(SECTOR_SIZE);
        let old_sectors = self.num_sectors as usize;
        if new_sectors > NUM_DIRECT || free_map.count_clear() < new_sectors - old_sectors {
            return false;
        }

        log::debug!(
            "extending header by {additional} bytes, {} new sectors",
            new_sectors - old_sectors
        );

        self.num_bytes = new_bytes as u32;
        self.num_sectors = new_sectors as u32;
        for slot in &mut self.data_sectors[old_sectors..new_sectors] {
            *slot = free_map.find().unwrap();
        }
        true
    }

    /// 释放文件的所有数据扇区。文件头自身所在扇区由调用者清除。
    pub fn deallocate(&mut self, free_map: &mut Bitmap) {
        for &sector in self.data_sectors() {
            free_map.clear(sector);
        }
    }

    /// 逻辑偏移 `offset` 处的字节所在的物理扇区
    #[inline]
    pub fn byte_to_sector(&self, offset: usize) -> u32 {
        self.data_sectors[offset / SECTOR_SIZE]
    }

    /// 文件的逻辑大小(字节)
    #[inline]
    pub fn length(&self) -> usize {
        self.num_bytes as usize
    }

    /// 文件实际占用的数据扇区
    #[inline]
    pub fn data_sectors(&self) -> &[u32] {
        &self.data_sectors[..self.num_sectors as usize]
    }

    /// 从指定扇区读入文件头
    pub fn fetch_from(disk: &dyn SynchDisk, sector: u32) -> Self {
        let mut buf = [0u8; SECTOR_SIZE];
        disk.read_sector(sector, &mut buf);
        unsafe { ptr::read_unaligned(buf.as_ptr().cast()) }
    }

    /// 将文件头写回指定扇区
    pub fn write_back(&self, disk: &dyn SynchDisk, sector: u32) {
        const _: () = assert!(mem::size_of::<FileHeader>() == SECTOR_SIZE);

        let mut buf = [0u8; SECTOR_SIZE];
        unsafe { ptr::write_unaligned(buf.as_mut_ptr().cast(), self.clone()) };
        disk.write_sector(sector, &buf);
    }
}
