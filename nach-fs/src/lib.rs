#![no_std]

extern crate alloc;

/* nach-fs 的整体架构，自上而下 */

// 文件系统门面层：路径解析与 创建/打开/删除/扩展 等操作
mod fs;
pub use fs::Entry;
pub use fs::FileSystem;

// 打开文件层：持有寻址游标，按扇区粒度读写文件内容
mod open_file;
pub use open_file::OpenFile;

// 目录视图层：驻留内存的目录，包装磁盘上的原始目录表
mod directory;
pub use directory::{DirInfo, Directory};

// 空闲扇区位图
mod bitmap;
pub use bitmap::Bitmap;

// 磁盘数据结构层：文件头与原始目录表
mod layout;
pub use layout::{DirEntry, FileHeader, RawDirectory};

// 磁盘设备接口层
mod disk;
pub use disk::SynchDisk;

mod error;
pub use error::FsError;

/// 扇区大小(字节)，磁盘 I/O 的最小单位
pub const SECTOR_SIZE: usize = 128;
/// 文件头内直接索引的扇区数，恰好使文件头占满一个扇区
pub const NUM_DIRECT: usize = 30;
/// 单个文件系统项名字的最大长度
pub const FILE_NAME_MAX_LEN: usize = 27;
/// 一个目录可容纳的项数，目录大小在创建时固定
pub const NUM_DIR_ENTRIES: usize = 10;
/// 全路径的最大长度
pub const PATH_MAX_LEN: usize = 255;

/// 空闲扇区位图文件的文件头所在扇区
pub const FREE_MAP_SECTOR: u32 = 0;
/// 根目录文件的文件头所在扇区
pub const DIRECTORY_SECTOR: u32 = 1;

/// 目录文件的内容大小(字节)
pub const DIRECTORY_FILE_SIZE: usize = core::mem::size_of::<RawDirectory>();

type SectorData = [u8; SECTOR_SIZE];
