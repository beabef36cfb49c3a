use std::mem;

use nach_fs::{DirEntry, FileHeader, RawDirectory};
use nach_fs::{DIRECTORY_FILE_SIZE, NUM_DIR_ENTRIES, SECTOR_SIZE};

#[test]
fn layout() {
    // 文件头必须恰好占满一个扇区
    assert_eq!(SECTOR_SIZE, mem::size_of::<FileHeader>());
    assert_eq!(36, mem::size_of::<DirEntry>());
    assert_eq!(36 * NUM_DIR_ENTRIES, mem::size_of::<RawDirectory>());
    assert_eq!(DIRECTORY_FILE_SIZE, mem::size_of::<RawDirectory>());
}
