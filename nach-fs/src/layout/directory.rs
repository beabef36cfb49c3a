use core::mem;
use core::ptr;
use core::slice;

use crate::{FILE_NAME_MAX_LEN, NUM_DIR_ENTRIES};

/// 目录项：目录文件内容中的定长记录
#[repr(C)]
#[derive(Debug, Default, Clone)]
pub struct DirEntry {
    /// 槽位是否在用
    in_use: bool,
    /// 指向的是否为目录
    is_dir: bool,
    // 最后一字节留给 \0
    name: [u8; FILE_NAME_MAX_LEN + 1],
    /// 该项的文件头所在扇区
    sector: u32,
}

/// 目录文件的原始内容：定长的目录项表
#[repr(C)]
#[derive(Debug, Clone)]
pub struct RawDirectory {
    pub(crate) table: [DirEntry; NUM_DIR_ENTRIES],
}

impl DirEntry {
    /// 目录项大小恒为36字节
    pub const SIZE: usize = mem::size_of::<Self>();

    pub fn new(name: &str, sector: u32, is_dir: bool) -> Self {
        let bytes = name.as_bytes();
        assert!(bytes.len() <= FILE_NAME_MAX_LEN);
        let mut name = [0; FILE_NAME_MAX_LEN + 1];
        name[..bytes.len()].copy_from_slice(bytes);

        Self {
            in_use: true,
            is_dir,
            name,
            sector,
        }
    }

    pub fn name(&self) -> &str {
        let len = self.name.iter().position(|&c| c == 0).unwrap();
        core::str::from_utf8(&self.name[..len]).unwrap()
    }

    #[inline]
    pub fn sector(&self) -> u32 {
        self.sector
    }

    #[inline]
    pub fn is_dir(&self) -> bool {
        self.is_dir
    }

    #[inline]
    pub fn in_use(&self) -> bool {
        self.in_use
    }

    pub(crate) fn vacate(&mut self) {
        self.in_use = false;
    }
}

impl RawDirectory {
    pub const SIZE: usize = mem::size_of::<Self>();

    pub fn empty() -> Self {
        Self {
            table: Default::default(),
        }
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        unsafe { slice::from_raw_parts(ptr::from_ref(self).cast(), Self::SIZE) }
    }

    #[inline]
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        unsafe { slice::from_raw_parts_mut(ptr::from_mut(self).cast(), Self::SIZE) }
    }
}
