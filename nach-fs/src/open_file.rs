//! # 打开文件层
//!
//! 一次打开对应一个 [`OpenFile`]：记录文件头所在扇区与读写游标。
//! 同一文件可以同时存在多个句柄。
//!
//! 读写请求不必对齐扇区边界，而磁盘只认整个扇区，因此：
//!
//! - 读取时，把涉及的扇区逐个读入，只拷出请求的部分；
//! - 写入时，头尾不对齐的扇区先读后改，避免覆盖未修改的部分。
//!
//! 每次操作都重新读入文件头，保证经其它句柄扩展后的
//! 文件大小在本句柄上可见。

use alloc::sync::Arc;

use crate::FileHeader;
use crate::FileSystem;
use crate::SECTOR_SIZE;
use crate::SectorData;
use crate::SynchDisk;

pub struct OpenFile {
    disk: Arc<dyn SynchDisk>,
    /// 文件头所在扇区
    sector: u32,
    /// 下一次 `read`/`write` 的起始位置
    pos: usize,
}

impl OpenFile {
    pub fn new(disk: Arc<dyn SynchDisk>, sector: u32) -> Self {
        log::trace!("opening file at sector {sector}");
        Self {
            disk,
            sector,
            pos: 0,
        }
    }

    #[inline]
    pub fn sector(&self) -> u32 {
        self.sector
    }

    /// 移动读写游标
    #[inline]
    pub fn seek(&mut self, position: usize) {
        self.pos = position;
    }

    #[inline]
    pub fn tell(&self) -> usize {
        self.pos
    }

    /// 文件的逻辑大小。重新读取文件头，以观察到其它句柄所做的扩展。
    pub fn length(&self) -> usize {
        FileHeader::fetch_from(&*self.disk, self.sector).length()
    }

    /// 从游标处读取，并把游标推进实际读到的字节数
    pub fn read(&mut self, buf: &mut [u8]) -> usize {
        assert!(!buf.is_empty());
        let read = self.read_at(buf, self.pos);
        self.pos += read;
        read
    }

    /// 从游标处写入，并把游标推进实际写入的字节数
    pub fn write(&mut self, fs: &FileSystem, buf: &[u8]) -> usize {
        assert!(!buf.is_empty());
        let written = self.write_at(fs, buf, self.pos);
        self.pos += written;
        written
    }

    /// 从 `position` 处读取至多 `buf.len()` 字节，返回实际读到的字节数。
    /// 超出文件末尾的部分被截断。
    pub fn read_at(&self, buf: &mut [u8], position: usize) -> usize {
        let header = FileHeader::fetch_from(&*self.disk, self.sector);
        let file_len = header.length();

        let mut start = position;
        let end = (position + buf.len()).min(file_len);
        if start >= end {
            return 0;
        }

        log::trace!(
            "reading {} bytes at {position}, from file of length {file_len}",
            end - start
        );

        let mut read = 0;
        loop {
            // 当前扇区的读取终点(文件内偏移)
            let sector_end = (start / SECTOR_SIZE + 1) * SECTOR_SIZE;
            let sector_end = sector_end.min(end);
            let len = sector_end - start;

            let mut data: SectorData = [0; SECTOR_SIZE];
            self.disk.read_sector(header.byte_to_sector(start), &mut data);
            let offset = start % SECTOR_SIZE;
            buf[read..read + len].copy_from_slice(&data[offset..offset + len]);

            read += len;
            if sector_end == end {
                break;
            }
            start = sector_end;
        }

        read
    }

    /// 向 `position` 处写入 `buf`，返回实际写入的字节数。
    ///
    /// 若写入范围超出文件末尾，先经门面扩展文件；
    /// 扩展失败则截短写入量，返回不足数而非错误。
    pub fn write_at(&self, fs: &FileSystem, buf: &[u8], position: usize) -> usize {
        let length = self.length();
        if position + buf.len() > length && fs.expand(self.sector, position + buf.len() - length).is_err() {
            log::debug!(
                "no room to grow file at sector {}, write will be truncated",
                self.sector
            );
        }
        self.write_at_raw(buf, position)
    }

    /// 不扩展文件的写入路径，写入范围截断至当前文件大小。
    /// 门面内部对位图文件与目录文件的写回走此路径。
    pub(crate) fn write_at_raw(&self, buf: &[u8], position: usize) -> usize {
        let header = FileHeader::fetch_from(&*self.disk, self.sector);
        let file_len = header.length();

        let mut start = position;
        let end = (position + buf.len()).min(file_len);
        if start >= end {
            return 0;
        }

        log::trace!(
            "writing {} bytes at {position}, to file of length {file_len}",
            end - start
        );

        let mut written = 0;
        loop {
            let sector_end = (start / SECTOR_SIZE + 1) * SECTOR_SIZE;
            let sector_end = sector_end.min(end);
            let len = sector_end - start;
            let sector = header.byte_to_sector(start);
            let offset = start % SECTOR_SIZE;

            let mut data: SectorData = [0; SECTOR_SIZE];
            if len < SECTOR_SIZE {
                // 部分写，先读入原扇区再拼接
                self.disk.read_sector(sector, &mut data);
            }
            data[offset..offset + len].copy_from_slice(&buf[written..written + len]);
            self.disk.write_sector(sector, &data);

            written += len;
            if sector_end == end {
                break;
            }
            start = sector_end;
        }

        written
    }
}
