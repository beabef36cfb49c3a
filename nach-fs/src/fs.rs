//! # 文件系统门面层
//!
//! 把文本路径映射到文件，构建磁盘的整体布局并使用。
//!
//! 磁盘上的每个文件都有：
//! - 一个文件头，占据一个扇区；
//! - 若干数据扇区；
//! - 父目录中的一个目录项。
//!
//! 空闲扇区位图与目录本身也按普通文件存放，两者的文件头分别位于
//! 0 号与 1 号扇区，启动时据此定位。门面在其整个生命周期内
//! 持有这两个文件的常开句柄。
//!
//! 修改位图或目录的操作若成功，变更立即写回磁盘；
//! 若失败，直接丢弃内存中改动过的副本，不写回。
//! 所有会修改文件系统的操作都在一把门面级互斥锁内串行执行。
//!
//! 路径必须是规范化的绝对路径，相对路径的解析在上层完成。

use alloc::sync::Arc;
use alloc::vec::Vec;

use spin::Mutex;

use crate::Bitmap;
use crate::Directory;
use crate::FileHeader;
use crate::FsError;
use crate::OpenFile;
use crate::SynchDisk;
use crate::directory::DirInfo;
use crate::{DIRECTORY_FILE_SIZE, DIRECTORY_SECTOR, FREE_MAP_SECTOR};
use crate::{FILE_NAME_MAX_LEN, PATH_MAX_LEN};

pub struct FileSystem {
    disk: Arc<dyn SynchDisk>,
    /// 两个常开文件，兼作门面级互斥锁
    files: Mutex<FsFiles>,
}

struct FsFiles {
    free_map: OpenFile,
    directory: OpenFile,
}

/// 路径查找的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Entry {
    /// 文件头所在扇区
    pub sector: u32,
    pub is_dir: bool,
}

impl FileSystem {
    /// 格式化磁盘：建立空目录与空闲扇区位图(绝大部分扇区空闲)，
    /// 然后挂载。
    pub fn format(disk: Arc<dyn SynchDisk>) -> Self {
        log::info!("formatting the file system");

        let mut free_map = Bitmap::new(disk.num_sectors() as usize);
        let directory = Directory::empty();
        let mut map_header = FileHeader::new();
        let mut dir_header = FileHeader::new();

        // 先占住两个文件头的保留扇区
        free_map.mark(FREE_MAP_SECTOR);
        free_map.mark(DIRECTORY_SECTOR);

        // 为位图文件与根目录文件的内容分配数据扇区，空间必须充足
        let free_map_size = free_map.serialized_len();
        assert!(map_header.allocate(&mut free_map, free_map_size));
        assert!(dir_header.allocate(&mut free_map, DIRECTORY_FILE_SIZE));

        // 文件头先落盘：打开文件要从磁盘读回文件头，
        // 而此时磁盘上还是垃圾数据
        map_header.write_back(&*disk, FREE_MAP_SECTOR);
        dir_header.write_back(&*disk, DIRECTORY_SECTOR);

        let fs = Self::mount(disk);

        // 两个文件常开之后，写入各自的初始内容
        {
            let files = fs.files.lock();
            free_map.write_back(&files.free_map);
            directory.write_back(&files.directory);
        }
        fs
    }

    /// 挂载已格式化的磁盘，即打开位图文件与根目录文件
    pub fn mount(disk: Arc<dyn SynchDisk>) -> Self {
        Self {
            files: Mutex::new(FsFiles {
                free_map: OpenFile::new(disk.clone(), FREE_MAP_SECTOR),
                directory: OpenFile::new(disk.clone(), DIRECTORY_SECTOR),
            }),
            disk,
        }
    }

    #[inline]
    pub fn disk(&self) -> &Arc<dyn SynchDisk> {
        &self.disk
    }

    /// 创建初始大小为 `initial_size` 字节的普通文件。
    ///
    /// 依次：确认重名不存在、为文件头找一个空闲扇区、把名字挂进父目录、
    /// 为数据分配扇区；全部成功后才把文件头、位图与父目录写回磁盘。
    pub fn create(&self, path: &str, initial_size: usize) -> Result<(), FsError> {
        log::debug!("creating file {path}, size {initial_size}");
        let files = self.files.lock();
        let (mut directory, dir_sector, name) = self.open_path(&files, path)?;

        if directory.find(name, true).is_some() || directory.find(name, false).is_some() {
            return Err(FsError::AlreadyExists);
        }

        let mut free_map = self.load_free_map(&files);
        let sector = free_map.find().ok_or(FsError::NoSpace)?;
        if !directory.add(name, sector, false) {
            // 父目录无空槽位
            return Err(FsError::NoSpace);
        }

        let mut header = FileHeader::new();
        if !header.allocate(&mut free_map, initial_size) {
            // 数据扇区不足。内存中位图与目录的改动就地丢弃
            return Err(FsError::NoSpace);
        }

        header.write_back(&*self.disk, sector);
        free_map.write_back(&files.free_map);
        self.flush_directory(&files, &directory, dir_sector);
        Ok(())
    }

    /// 查找路径指向的文件系统项
    pub fn lookup(&self, path: &str) -> Result<Entry, FsError> {
        if path == "/" {
            return Ok(Entry {
                sector: DIRECTORY_SECTOR,
                is_dir: true,
            });
        }

        let files = self.files.lock();
        let (directory, _, name) = self.open_path(&files, path)?;
        if let Some(sector) = directory.find(name, false) {
            Ok(Entry {
                sector,
                is_dir: false,
            })
        } else if let Some(sector) = directory.find(name, true) {
            Ok(Entry {
                sector,
                is_dir: true,
            })
        } else {
            Err(FsError::NotFound)
        }
    }

    /// 打开普通文件。目录与保留扇区上的项不可按文件打开。
    pub fn open(&self, path: &str) -> Result<OpenFile, FsError> {
        log::debug!("opening file {path}");
        let entry = self.lookup(path)?;
        if entry.is_dir {
            return Err(FsError::IsADirectory);
        }
        if entry.sector <= DIRECTORY_SECTOR {
            return Err(FsError::BadPath);
        }
        Ok(OpenFile::new(self.disk.clone(), entry.sector))
    }

    /// 删除路径指向的项。普通文件立即回收其文件头与数据扇区；
    /// 目录则连同子树一并回收。
    pub fn remove(&self, path: &str) -> Result<(), FsError> {
        let files = self.files.lock();
        let (directory, _, name) = self.open_path(&files, path)?;

        if directory.find(name, false).is_some() {
            self.remove_file_locked(&files, path)
        } else if directory.find(name, true).is_some() {
            self.rmdir_locked(&files, path)
        } else {
            Err(FsError::NotFound)
        }
    }

    /// 把 `sector` 处文件头对应的文件扩大 `additional` 字节
    pub fn expand(&self, sector: u32, additional: usize) -> Result<(), FsError> {
        let files = self.files.lock();
        let mut header = FileHeader::fetch_from(&*self.disk, sector);
        let mut free_map = self.load_free_map(&files);

        if !header.extend(&mut free_map, additional) {
            return Err(FsError::NoSpace);
        }
        free_map.write_back(&files.free_map);
        header.write_back(&*self.disk, sector);
        Ok(())
    }

    /// 创建空目录。目录文件的大小固定为 [`DIRECTORY_FILE_SIZE`]。
    pub fn mkdir(&self, path: &str) -> Result<(), FsError> {
        log::debug!("creating directory {path}");
        let files = self.files.lock();
        let (mut directory, dir_sector, name) = self.open_path(&files, path)?;

        if directory.find(name, true).is_some() || directory.find(name, false).is_some() {
            return Err(FsError::AlreadyExists);
        }

        let mut free_map = self.load_free_map(&files);
        let sector = free_map.find().ok_or(FsError::NoSpace)?;
        if !directory.add(name, sector, true) {
            return Err(FsError::NoSpace);
        }

        let mut header = FileHeader::new();
        if !header.allocate(&mut free_map, DIRECTORY_FILE_SIZE) {
            return Err(FsError::NoSpace);
        }

        // 新目录的内容必须是全空槽位，数据扇区先行清零
        for &data_sector in header.data_sectors() {
            self.disk.clear_sector(data_sector);
        }
        self.disk.clear_sector(sector);
        header.write_back(&*self.disk, sector);
        free_map.write_back(&files.free_map);
        self.flush_directory(&files, &directory, dir_sector);
        Ok(())
    }

    /// 删除目录，递归回收其中所有内容
    pub fn rmdir(&self, path: &str) -> Result<(), FsError> {
        let files = self.files.lock();
        self.rmdir_locked(&files, path)
    }

    /// 枚举路径指向目录中的项
    pub fn list(&self, path: &str) -> Result<Vec<DirInfo>, FsError> {
        let files = self.files.lock();
        if path == "/" {
            return Ok(Directory::fetch_from(&files.directory).entries());
        }

        let (directory, _, name) = self.open_path(&files, path)?;
        let sector = match directory.find(name, true) {
            Some(sector) => sector,
            None if directory.find(name, false).is_some() => return Err(FsError::NotADirectory),
            None => return Err(FsError::NotFound),
        };
        let file = OpenFile::new(self.disk.clone(), sector);
        Ok(Directory::fetch_from(&file).entries())
    }

    /// 路径是否可以解析到某个存在的项
    pub fn check_path(&self, path: &str) -> bool {
        path == "/" || self.lookup(path).is_ok()
    }
}

impl FileSystem {
    /// 从根目录出发逐项深入，返回叶子所在的父目录视图、
    /// 父目录的文件头扇区以及叶子名。中间项必须全部是目录。
    fn open_path<'p>(
        &self,
        files: &FsFiles,
        path: &'p str,
    ) -> Result<(Directory, u32, &'p str), FsError> {
        if !path.starts_with('/') || path.len() > PATH_MAX_LEN {
            return Err(FsError::BadPath);
        }

        let mut components: Vec<&str> = path[1..].split('/').collect();
        let name = components.pop().unwrap();
        if name.is_empty() {
            return Err(FsError::BadPath);
        }
        for component in components.iter().chain([&name]) {
            if component.is_empty() {
                return Err(FsError::BadPath);
            }
            if component.len() > FILE_NAME_MAX_LEN {
                return Err(FsError::NameTooLong);
            }
        }

        let mut sector = DIRECTORY_SECTOR;
        let mut directory = Directory::fetch_from(&files.directory);
        for component in components {
            sector = directory.find(component, true).ok_or_else(|| {
                log::debug!("no directory {component} along {path}");
                FsError::NotFound
            })?;
            let file = OpenFile::new(self.disk.clone(), sector);
            directory = Directory::fetch_from(&file);
        }
        Ok((directory, sector, name))
    }

    fn load_free_map(&self, files: &FsFiles) -> Bitmap {
        Bitmap::fetch_from(&files.free_map, self.disk.num_sectors() as usize)
    }

    /// 根目录写回常开句柄，其余目录临时开一个句柄写回
    fn flush_directory(&self, files: &FsFiles, directory: &Directory, dir_sector: u32) {
        if dir_sector == DIRECTORY_SECTOR {
            directory.write_back(&files.directory);
        } else {
            let file = OpenFile::new(self.disk.clone(), dir_sector);
            directory.write_back(&file);
        }
    }

    fn remove_file_locked(&self, files: &FsFiles, path: &str) -> Result<(), FsError> {
        let (mut directory, dir_sector, name) = self.open_path(files, path)?;
        let sector = directory.find(name, false).ok_or(FsError::NotFound)?;

        directory.remove(name);
        let mut free_map = self.load_free_map(files);
        let mut header = FileHeader::fetch_from(&*self.disk, sector);
        header.deallocate(&mut free_map);
        free_map.clear(sector);

        free_map.write_back(&files.free_map);
        self.flush_directory(files, &directory, dir_sector);
        log::debug!("removed file {path}");
        Ok(())
    }

    fn rmdir_locked(&self, files: &FsFiles, path: &str) -> Result<(), FsError> {
        if path == "/" {
            return Err(FsError::BadPath);
        }
        log::debug!("removing directory {path} and its contents");

        let (mut directory, dir_sector, name) = self.open_path(files, path)?;
        if directory.find(name, false).is_some() {
            return Err(FsError::NotADirectory);
        }
        let sector = directory.find(name, true).ok_or(FsError::NotFound)?;

        directory.remove(name);
        let mut free_map = self.load_free_map(files);

        // 先清理子树，再回收目录自身
        let folder_file = OpenFile::new(self.disk.clone(), sector);
        let mut folder = Directory::fetch_from(&folder_file);
        folder.clean(&self.disk, &mut free_map);
        let mut header = FileHeader::fetch_from(&*self.disk, sector);
        header.deallocate(&mut free_map);
        free_map.clear(sector);

        self.flush_directory(files, &directory, dir_sector);
        free_map.write_back(&files.free_map);
        Ok(())
    }
}

impl FileSystem {
    /// 一致性检查：从根目录可达的每个文件头、数据扇区都应在
    /// 位图中恰好登记一次，保留扇区恒为占用。
    pub fn check(&self) -> bool {
        let files = self.files.lock();
        let num_sectors = self.disk.num_sectors();
        let mut shadow = Bitmap::new(num_sectors as usize);
        let mut ok = true;

        shadow.mark(FREE_MAP_SECTOR);
        shadow.mark(DIRECTORY_SECTOR);
        for sector in [FREE_MAP_SECTOR, DIRECTORY_SECTOR] {
            let header = FileHeader::fetch_from(&*self.disk, sector);
            for &data_sector in header.data_sectors() {
                self.shadow_mark(&mut shadow, data_sector, &mut ok);
            }
        }

        let root = Directory::fetch_from(&files.directory);
        self.check_directory(&root, &mut shadow, &mut ok);

        let stored = self.load_free_map(&files);
        for bit in 0..num_sectors {
            if stored.test(bit) != shadow.test(bit) {
                log::error!(
                    "inconsistent bitmap at sector {bit}: stored {}, reachable {}",
                    stored.test(bit),
                    shadow.test(bit)
                );
                ok = false;
            }
        }
        ok
    }

    /// 某扇区当前是否登记为已分配
    pub fn is_allocated(&self, sector: u32) -> bool {
        let files = self.files.lock();
        self.load_free_map(&files).test(sector)
    }

    /// 空闲扇区个数
    pub fn count_clear(&self) -> usize {
        let files = self.files.lock();
        self.load_free_map(&files).count_clear()
    }

    /// 打印文件系统的全貌，用于调试
    pub fn print(&self) {
        let files = self.files.lock();
        log::info!(
            "free map: {} of {} sectors clear",
            self.load_free_map(&files).count_clear(),
            self.disk.num_sectors()
        );
        Directory::fetch_from(&files.directory).print();
    }

    fn check_directory(&self, directory: &Directory, shadow: &mut Bitmap, ok: &mut bool) {
        for info in directory.entries() {
            self.shadow_mark(shadow, info.sector, ok);

            let header = FileHeader::fetch_from(&*self.disk, info.sector);
            if header.data_sectors().len() != header.length().div_ceil(crate::SECTOR_SIZE) {
                log::error!("sector count of header {} does not match its size", info.sector);
                *ok = false;
            }
            for &data_sector in header.data_sectors() {
                self.shadow_mark(shadow, data_sector, ok);
            }

            if info.is_dir {
                let file = OpenFile::new(self.disk.clone(), info.sector);
                self.check_directory(&Directory::fetch_from(&file), shadow, ok);
            }
        }
    }

    fn shadow_mark(&self, shadow: &mut Bitmap, sector: u32, ok: &mut bool) {
        if sector >= self.disk.num_sectors() {
            log::error!("sector {sector} is out of range");
            *ok = false;
        } else if shadow.test(sector) {
            log::error!("sector {sector} is referenced twice");
            *ok = false;
        } else {
            shadow.mark(sector);
        }
    }
}
