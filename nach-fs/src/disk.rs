//! # 磁盘设备接口层
//!
//! 磁盘是以**扇区**为单位存储数据的设备；[`SynchDisk`] 是对同步磁盘的抽象：
//! 调用以整个扇区为单位，请求完成前可能阻塞当前线程。
//!
//! `nach-fs` 通过该特质读写底层设备，设备驱动由使用者提供。

use core::any::Any;

/// 同步磁盘设备特质
pub trait SynchDisk: Send + Sync + Any {
    fn read_sector(&self, sector: u32, buf: &mut [u8]);
    fn write_sector(&self, sector: u32, buf: &[u8]);

    /// 将整个扇区清零
    fn clear_sector(&self, sector: u32) {
        self.write_sector(sector, &[0; crate::SECTOR_SIZE]);
    }

    /// 设备的扇区总数
    fn num_sectors(&self) -> u32;
}
