#![no_std]

extern crate alloc;

pub mod config;
pub mod fs;
pub mod machine;
pub mod path;
pub mod sync;
pub mod syscall;
pub mod task;

use alloc::sync::Arc;

use nach_fs::SynchDisk;

/// 按固定顺序初始化各子系统：磁盘 → 文件表与文件系统 → 调度器
pub fn init(disk: Arc<dyn SynchDisk>, format: bool) {
    fs::init(disk, format);
    task::init();
    log::info!("kernel initialized");
}
