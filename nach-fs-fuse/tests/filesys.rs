use std::sync::Arc;

use nach_fs::FileSystem;
use nach_fs::FsError;
use nach_fs::{NUM_DIRECT, SECTOR_SIZE};
use nach_fs_fuse::DiskFile;

/// 基于匿名临时文件的全新磁盘
fn fresh_disk(num_sectors: u32) -> Arc<DiskFile> {
    let file = tempfile::tempfile().unwrap();
    file.set_len(num_sectors as u64 * SECTOR_SIZE as u64).unwrap();
    Arc::new(DiskFile(std::sync::Mutex::new(file)))
}

fn fresh_fs(num_sectors: u32) -> FileSystem {
    FileSystem::format(fresh_disk(num_sectors))
}

#[test]
fn write_then_read_back_roundtrip() {
    let fs = fresh_fs(1024);
    let payload = b"And now for something completely different";

    fs.create("/a", 0).unwrap();
    {
        let mut file = fs.open("/a").unwrap();
        assert_eq!(file.write(&fs, payload), payload.len());
    }

    let file = fs.open("/a").unwrap();
    let mut read_back = vec![0u8; payload.len()];
    assert_eq!(file.read_at(&mut read_back, 0), payload.len());
    assert_eq!(read_back, payload);
    assert!(file.length() >= payload.len());
    assert!(fs.check());
}

#[test]
fn remove_is_not_idempotent() {
    let fs = fresh_fs(1024);
    fs.create("/a", 64).unwrap();

    assert_eq!(fs.remove("/a"), Ok(()));
    assert_eq!(fs.remove("/a"), Err(FsError::NotFound));
}

#[test]
fn removing_a_file_frees_its_sectors() {
    let fs = fresh_fs(1024);
    let clear_before = fs.count_clear();

    fs.create("/a", 3 * SECTOR_SIZE).unwrap();
    let sector = fs.lookup("/a").unwrap().sector;
    // 文件头一个扇区加三个数据扇区
    assert_eq!(fs.count_clear(), clear_before - 4);
    assert!(fs.is_allocated(sector));

    fs.remove("/a").unwrap();
    assert_eq!(fs.count_clear(), clear_before);
    assert!(!fs.is_allocated(sector));
    assert!(fs.check());
}

#[test]
fn duplicate_create_is_rejected() {
    let fs = fresh_fs(1024);
    fs.create("/a", 0).unwrap();
    assert_eq!(fs.create("/a", 0), Err(FsError::AlreadyExists));

    // 与目录同名也算重名
    fs.mkdir("/d").unwrap();
    assert_eq!(fs.create("/d", 0), Err(FsError::AlreadyExists));
    assert_eq!(fs.mkdir("/a"), Err(FsError::AlreadyExists));
}

#[test]
fn growing_write_allocates_just_enough_sectors() {
    let fs = fresh_fs(1024);
    fs.create("/big", 0).unwrap();
    let clear_after_create = fs.count_clear();

    let payload = vec![0xa5u8; 3000];
    let file = fs.open("/big").unwrap();
    assert_eq!(file.write_at(&fs, &payload, 0), payload.len());

    assert_eq!(file.length(), 3000);
    // ceil(3000 / 128) == 24 个数据扇区
    assert_eq!(fs.count_clear(), clear_after_create - 24);

    // 扩展对其它句柄立即可见
    let other = fs.open("/big").unwrap();
    assert_eq!(other.length(), 3000);
    assert!(fs.check());
}

#[test]
fn append_at_length_extends_the_file() {
    let fs = fresh_fs(1024);
    fs.create("/log", SECTOR_SIZE).unwrap();

    let file = fs.open("/log").unwrap();
    assert_eq!(file.length(), SECTOR_SIZE);
    assert_eq!(file.write_at(&fs, &[7u8; 100], SECTOR_SIZE), 100);
    assert_eq!(file.length(), SECTOR_SIZE + 100);

    let mut tail = [0u8; 100];
    assert_eq!(file.read_at(&mut tail, SECTOR_SIZE), 100);
    assert_eq!(tail, [7u8; 100]);
}

#[test]
fn unaligned_writes_preserve_surrounding_bytes() {
    let fs = fresh_fs(1024);
    fs.create("/a", 3 * SECTOR_SIZE).unwrap();

    let file = fs.open("/a").unwrap();
    let base = vec![0x11u8; 3 * SECTOR_SIZE];
    assert_eq!(file.write_at(&fs, &base, 0), base.len());

    // 跨越扇区边界、两端都不对齐的写入
    let patch = vec![0x22u8; SECTOR_SIZE];
    assert_eq!(file.write_at(&fs, &patch, 70), patch.len());

    let mut readback = vec![0u8; 3 * SECTOR_SIZE];
    assert_eq!(file.read_at(&mut readback, 0), readback.len());
    assert!(readback[..70].iter().all(|&b| b == 0x11));
    assert!(readback[70..70 + SECTOR_SIZE].iter().all(|&b| b == 0x22));
    assert!(readback[70 + SECTOR_SIZE..].iter().all(|&b| b == 0x11));
}

#[test]
fn read_past_the_end_is_truncated() {
    let fs = fresh_fs(1024);
    fs.create("/short", 10).unwrap();

    let file = fs.open("/short").unwrap();
    let mut buf = [0u8; 64];
    assert_eq!(file.read_at(&mut buf, 0), 10);
    assert_eq!(file.read_at(&mut buf, 10), 0);
    assert_eq!(file.read_at(&mut buf, 1000), 0);
}

#[test]
fn nested_directories_hold_files() {
    let fs = fresh_fs(1024);
    fs.mkdir("/d").unwrap();
    fs.create("/d/f", 0).unwrap();

    let mut file = fs.open("/d/f").unwrap();
    assert_eq!(file.write(&fs, b"hello"), 5);
    file.seek(0);
    let mut buf = [0u8; 5];
    assert_eq!(file.read(&mut buf), 5);
    assert_eq!(&buf, b"hello");
}

#[test]
fn deep_paths_resolve_component_by_component() {
    let fs = fresh_fs(1024);
    fs.mkdir("/a").unwrap();
    fs.mkdir("/a/b").unwrap();
    fs.create("/a/b/c", 16).unwrap();

    assert!(fs.check_path("/a/b/c"));
    assert!(!fs.check_path("/a/x/c"));
    assert!(!fs.lookup("/a/b/c").unwrap().is_dir);

    let listed = fs.list("/a").unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].name, "b");
    assert!(listed[0].is_dir);

    // 中间项缺失时整个操作失败
    assert_eq!(fs.create("/a/x/c", 0), Err(FsError::NotFound));
}

#[test]
fn rmdir_reclaims_the_whole_subtree() {
    let fs = fresh_fs(1024);
    let clear_before = fs.count_clear();

    fs.mkdir("/d").unwrap();
    fs.create("/d/f", 2 * SECTOR_SIZE).unwrap();
    fs.mkdir("/d/sub").unwrap();
    fs.create("/d/sub/x", SECTOR_SIZE).unwrap();
    assert!(fs.count_clear() < clear_before);

    fs.rmdir("/d").unwrap();
    assert_eq!(fs.count_clear(), clear_before);
    assert_eq!(fs.lookup("/d"), Err(FsError::NotFound));
    assert!(fs.check());
}

#[test]
fn rmdir_rejects_the_root_and_plain_files() {
    let fs = fresh_fs(1024);
    fs.create("/f", 0).unwrap();

    assert_eq!(fs.rmdir("/"), Err(FsError::BadPath));
    assert_eq!(fs.rmdir("/f"), Err(FsError::NotADirectory));
    assert_eq!(fs.rmdir("/missing"), Err(FsError::NotFound));
}

#[test]
fn remove_dispatches_directories_to_rmdir() {
    let fs = fresh_fs(1024);
    let clear_before = fs.count_clear();

    fs.mkdir("/d").unwrap();
    fs.create("/d/f", SECTOR_SIZE).unwrap();
    fs.remove("/d").unwrap();

    assert_eq!(fs.count_clear(), clear_before);
    assert_eq!(fs.lookup("/d"), Err(FsError::NotFound));
}

#[test]
fn open_rejects_directories_and_missing_files() {
    let fs = fresh_fs(1024);
    fs.mkdir("/d").unwrap();

    assert!(matches!(fs.open("/d"), Err(FsError::IsADirectory)));
    assert!(matches!(fs.open("/"), Err(FsError::IsADirectory)));
    assert!(matches!(fs.open("/nope"), Err(FsError::NotFound)));
}

#[test]
fn paths_must_be_canonical_and_bounded() {
    let fs = fresh_fs(1024);

    assert_eq!(fs.create("relative", 0), Err(FsError::BadPath));
    assert_eq!(fs.create("/a//b", 0), Err(FsError::BadPath));
    let long_name = "x".repeat(nach_fs::FILE_NAME_MAX_LEN + 1);
    assert_eq!(fs.create(&format!("/{long_name}"), 0), Err(FsError::NameTooLong));
}

#[test]
fn failed_create_leaves_the_bitmap_untouched() {
    // 64 扇区的小盘：格式化后再装下两个文件，恰好占满
    let fs = fresh_fs(64);
    fs.create("/fill", NUM_DIRECT * SECTOR_SIZE).unwrap();
    fs.create("/fill2", 26 * SECTOR_SIZE).unwrap();
    assert_eq!(fs.count_clear(), 0);

    let before: Vec<bool> = (0..64).map(|s| fs.is_allocated(s)).collect();
    assert_eq!(fs.create("/x", SECTOR_SIZE), Err(FsError::NoSpace));

    // 失败的操作不产生任何磁盘写回
    let after: Vec<bool> = (0..64).map(|s| fs.is_allocated(s)).collect();
    assert_eq!(before, after);
    assert!(fs.check());
}

#[test]
fn write_on_a_full_disk_is_truncated() {
    let fs = fresh_fs(64);
    fs.create("/a", 2 * SECTOR_SIZE).unwrap();
    // 吃掉剩余空间
    fs.create("/hog", 26 * SECTOR_SIZE).unwrap();
    fs.create("/pad1", 26 * SECTOR_SIZE).unwrap();
    fs.create("/pad2", 0).unwrap();
    assert_eq!(fs.count_clear(), 0);

    let file = fs.open("/a").unwrap();
    // 长度以内的部分写入，其余截断
    assert_eq!(
        file.write_at(&fs, &[1u8; 3 * SECTOR_SIZE], 0),
        2 * SECTOR_SIZE
    );
    // 完全落在末尾之后的写入一个字节也进不去
    assert_eq!(file.write_at(&fs, &[1u8; 8], 2 * SECTOR_SIZE), 0);
}

#[test]
fn allocation_beyond_direct_blocks_is_rejected() {
    let fs = fresh_fs(1024);
    assert_eq!(
        fs.create("/huge", NUM_DIRECT * SECTOR_SIZE + 1),
        Err(FsError::NoSpace)
    );
    // 失败后同名文件还能正常创建
    fs.create("/huge", NUM_DIRECT * SECTOR_SIZE).unwrap();
}

#[test]
fn directory_runs_out_of_slots() {
    let fs = fresh_fs(1024);
    for i in 0..nach_fs::NUM_DIR_ENTRIES {
        fs.create(&format!("/f{i}"), 0).unwrap();
    }
    assert_eq!(fs.create("/overflow", 0), Err(FsError::NoSpace));
}

#[test]
fn mounting_reopens_persisted_state() {
    let disk = fresh_disk(1024);
    let payload = b"survives a remount";

    {
        let fs = FileSystem::format(disk.clone());
        fs.mkdir("/keep").unwrap();
        fs.create("/keep/data", 0).unwrap();
        let file = fs.open("/keep/data").unwrap();
        assert_eq!(file.write_at(&fs, payload, 0), payload.len());
    }

    let fs = FileSystem::mount(disk);
    let file = fs.open("/keep/data").unwrap();
    let mut read_back = vec![0u8; payload.len()];
    assert_eq!(file.read_at(&mut read_back, 0), payload.len());
    assert_eq!(read_back, payload);
    assert!(fs.check());
}

#[test]
fn fresh_format_is_consistent() {
    let fs = fresh_fs(1024);
    assert!(fs.check());
    assert!(fs.list("/").unwrap().is_empty());

    let small = fresh_fs(64);
    assert!(small.check());
}
