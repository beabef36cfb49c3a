//! # 内核打开文件层
//!
//! [`OsFile`] 表示线程打开的文件：包装下层的打开文件句柄，
//! 并在每次读写时经打开文件表取得读写协调。
//!
//! 路径在这一层完成规范化：相对路径按当前线程的工作路径解析，
//! 下层文件系统只接受规范化的绝对路径。

use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;

use nach_fs::DirInfo;
use nach_fs::FileSystem;
use nach_fs::FsError;
use nach_fs::OpenFile;
use nach_fs::SynchDisk;
use nach_fs::DIRECTORY_SECTOR;
use spin::Once;

use super::file_table::{FileNode, FileTable};
use crate::config::PATH_MAX_LEN;
use crate::path::Path;
use crate::sync::UpCell;
use crate::task::processor;

static FS: Once<Arc<FileSystem>> = Once::new();
static FILE_TABLE: FileTable = FileTable::new();

/// 初始化文件子系统。`format` 为真时格式化磁盘，否则直接挂载。
pub fn init(disk: Arc<dyn SynchDisk>, format: bool) {
    FS.call_once(|| {
        Arc::new(if format {
            FileSystem::format(disk)
        } else {
            FileSystem::mount(disk)
        })
    });
}

pub fn fs() -> &'static Arc<FileSystem> {
    FS.get().expect("file system is not initialized")
}

pub fn file_table() -> &'static FileTable {
    &FILE_TABLE
}

/// 线程打开的文件
pub struct OsFile {
    node: Arc<FileNode>,
    file: UpCell<OpenFile>,
}

/// 打开普通文件供读写。目录与保留扇区不可打开；
/// 已标记删除的文件拒绝新的打开。
pub fn open(path: &str) -> Result<Arc<OsFile>, FsError> {
    let path = resolve(path)?;
    let fs = fs();

    let entry = fs.lookup(&path)?;
    if entry.is_dir {
        return Err(FsError::IsADirectory);
    }
    if entry.sector <= DIRECTORY_SECTOR {
        return Err(FsError::BadPath);
    }

    let node = FILE_TABLE.add_file(&path, entry.sector);
    if node.is_removing() {
        return Err(FsError::Busy);
    }
    node.inc_users();

    Ok(Arc::new(OsFile {
        node,
        file: UpCell::new(OpenFile::new(fs.disk().clone(), entry.sector)),
    }))
}

pub fn create(path: &str, initial_size: usize) -> Result<(), FsError> {
    let path = resolve(path)?;
    fs().create(&path, initial_size)
}

/// 删除路径指向的项。目录交给 [`rmdir`]；
/// 还有句柄在用的文件只做标记，回收推迟到最后一个句柄关闭。
pub fn remove(path: &str) -> Result<(), FsError> {
    let path = resolve(path)?;
    let fs = fs();

    let entry = fs.lookup(&path)?;
    if entry.is_dir {
        return fs.rmdir(&path);
    }

    if let Some(node) = FILE_TABLE.find(entry.sector) {
        if node.users() > 0 {
            node.set_remove();
            log::debug!("removal of {path} deferred until last close");
            return Ok(());
        }
    }

    fs.remove(&path)?;
    FILE_TABLE.remove(entry.sector);
    Ok(())
}

pub fn mkdir(path: &str) -> Result<(), FsError> {
    let path = resolve(path)?;
    fs().mkdir(&path)
}

pub fn rmdir(path: &str) -> Result<(), FsError> {
    let path = resolve(path)?;
    let entry = fs().lookup(&path)?;
    if !entry.is_dir {
        return Err(FsError::NotADirectory);
    }
    fs().rmdir(&path)
}

pub fn list(path: &str) -> Result<Vec<DirInfo>, FsError> {
    let path = resolve(path)?;
    fs().list(&path)
}

pub fn check_path(path: &str) -> bool {
    match resolve(path) {
        Ok(path) => fs().check_path(&path),
        Err(_) => false,
    }
}

/// 把路径规范化成绝对路径，相对路径按当前线程的工作路径解析
fn resolve(path: &str) -> Result<String, FsError> {
    let cwd = match processor::current_thread() {
        Some(thread) => thread.path(),
        None => String::from("/"),
    };
    let path = path.canonicalize(&cwd).ok_or(FsError::BadPath)?;
    if path.len() > PATH_MAX_LEN {
        return Err(FsError::BadPath);
    }
    Ok(path)
}

impl OsFile {
    #[inline]
    pub fn sector(&self) -> u32 {
        self.node.sector()
    }

    #[inline]
    pub fn name(&self) -> &str {
        self.node.name()
    }

    pub fn seek(&self, position: usize) {
        self.file.exclusive_access().seek(position);
    }

    pub fn length(&self) -> usize {
        self.file.exclusive_access().length()
    }

    /// 从游标处读取。与同一文件上的其它读者并发，与写者互斥。
    pub fn read(&self, buf: &mut [u8]) -> usize {
        self.node.acquire_read();
        let read = self.file.exclusive_session(|file| file.read(buf));
        self.node.release_read();
        read
    }

    pub fn read_at(&self, buf: &mut [u8], position: usize) -> usize {
        self.node.acquire_read();
        let read = self.file.exclusive_session(|file| file.read_at(buf, position));
        self.node.release_read();
        read
    }

    /// 从游标处写入，独占整个文件。
    /// 超出文件末尾的写入先尝试扩展文件，扩展失败则截短。
    pub fn write(&self, buf: &[u8]) -> usize {
        let position = self.file.exclusive_access().tell();
        self.expand_at(position, buf.len());

        self.node.acquire_write();
        let written = self.file.exclusive_session(|file| file.write(fs(), buf));
        self.node.release_write();
        written
    }

    pub fn write_at(&self, buf: &[u8], position: usize) -> usize {
        self.expand_at(position, buf.len());

        self.node.acquire_write();
        let written = self
            .file
            .exclusive_session(|file| file.write_at(fs(), buf, position));
        self.node.release_write();
        written
    }

    /// 写者互斥之前先把文件扩展到位
    fn expand_at(&self, position: usize, len: usize) {
        let (length, sector) = self
            .file
            .exclusive_session(|file| (file.length(), file.sector()));
        if position + len > length {
            // 空间不足时写入路径自会截短
            let _ = fs().expand(sector, position + len - length);
        }
    }
}

impl Drop for OsFile {
    fn drop(&mut self) {
        let users = self.node.dec_users();
        if users == 0 && self.node.is_removing() {
            log::debug!("last handle closed, removing file {}", self.node.name());
            if let Err(err) = remove(self.node.name()) {
                log::error!("deferred removal of {} failed: {err:?}", self.node.name());
            }
        }
    }
}
