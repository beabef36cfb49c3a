//! # 内核文件子系统
//!
//! ## 分层（自上而下）
//!
//! 1. 系统调用层
//! 2. 线程文件ID表
//! 3. 内核打开文件层：读写协调、引用计数与延迟删除
//! 4. 文件系统层(`nach-fs`)
//! 5. 磁盘设备驱动层

mod file_table;
mod inode;
pub mod stdio;

pub use self::file_table::{FileNode, FileTable};
pub use self::inode::{
    check_path, create, file_table, fs, init, list, mkdir, open, remove, rmdir, OsFile,
};
