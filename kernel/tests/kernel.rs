//! 在宿主机上引导整个内核并走完文件系统调用的主要路径。
//!
//! 内核单例只初始化一次，所有步骤按顺序放在同一个测试里。

use std::sync::Arc;
use std::sync::Mutex;

use kernel::config::{CONSOLE_INPUT, CONSOLE_OUTPUT, FIRST_FILE_FID};
use kernel::fs;
use kernel::fs::stdio::{self, Console};
use kernel::syscall::*;
use kernel::task::processor;
use nach_fs::FsError;
use nach_fs::{SynchDisk, SECTOR_SIZE};

/// 驻留内存的扇区阵列
struct MemDisk {
    data: Mutex<Vec<u8>>,
    sectors: u32,
}

impl MemDisk {
    fn new(sectors: u32) -> Self {
        Self {
            data: Mutex::new(vec![0; sectors as usize * SECTOR_SIZE]),
            sectors,
        }
    }
}

impl SynchDisk for MemDisk {
    fn read_sector(&self, sector: u32, buf: &mut [u8]) {
        let data = self.data.lock().unwrap();
        let start = sector as usize * SECTOR_SIZE;
        buf[..SECTOR_SIZE].copy_from_slice(&data[start..start + SECTOR_SIZE]);
    }

    fn write_sector(&self, sector: u32, buf: &[u8]) {
        let mut data = self.data.lock().unwrap();
        let start = sector as usize * SECTOR_SIZE;
        data[start..start + SECTOR_SIZE].copy_from_slice(&buf[..SECTOR_SIZE]);
    }

    fn num_sectors(&self) -> u32 {
        self.sectors
    }
}

/// 脚本化的控制台：输入预先写好，输出全部留存
struct TestConsole {
    input: Mutex<Vec<u8>>,
    output: Mutex<Vec<u8>>,
}

impl Console for TestConsole {
    fn get_bytes(&self, buf: &mut [u8]) -> usize {
        let mut input = self.input.lock().unwrap();
        let n = buf.len().min(input.len());
        buf[..n].copy_from_slice(&input[..n]);
        input.drain(..n);
        n
    }

    fn put_bytes(&self, buf: &[u8]) -> usize {
        self.output.lock().unwrap().extend_from_slice(buf);
        buf.len()
    }
}

#[test]
fn boot_and_exercise_the_kernel() {
    kernel::init(Arc::new(MemDisk::new(1024)), true);
    let console = Arc::new(TestConsole {
        input: Mutex::new(b"typed".to_vec()),
        output: Mutex::new(Vec::new()),
    });
    stdio::install_console(console.clone());

    // 建目录、建文件、写入后定位读回
    assert_eq!(fs::mkdir("/d"), Ok(()));
    assert_eq!(sys_create("/d/f"), 0);
    let fid = sys_open("/d/f");
    assert!(fid >= FIRST_FILE_FID as isize);
    assert_eq!(sys_write(fid as usize, b"hello"), 5);

    let thread = processor::current_thread().unwrap();
    thread.get_file(fid as usize).unwrap().seek(0);
    let mut buf = [0u8; 5];
    assert_eq!(sys_read(fid as usize, &mut buf), 5);
    assert_eq!(&buf, b"hello");
    assert_eq!(sys_close(fid as usize), 0);
    assert_eq!(sys_close(fid as usize), -1);

    // 相对路径按线程的工作路径解析
    thread.set_path("/d".into());
    assert_eq!(sys_create("other"), 0);
    assert!(fs::check_path("/d/other"));
    assert_eq!(fs::remove("other"), Ok(()));
    thread.set_path("/".into());

    // 延迟删除：句柄未关闭时删除只做标记
    assert_eq!(fs::create("/x", 2 * SECTOR_SIZE), Ok(()));
    let h1 = fs::open("/x").unwrap();
    let h2 = fs::open("/x").unwrap();
    let sector = h1.sector();
    assert!(fs::fs().is_allocated(sector));

    assert_eq!(fs::remove("/x"), Ok(()));
    assert!(matches!(fs::open("/x"), Err(FsError::Busy)));

    drop(h1);
    assert!(fs::fs().is_allocated(sector), "early reclaim with a live handle");
    drop(h2);
    // 最后一个句柄关闭后，名字与扇区都已回收
    assert!(!fs::fs().is_allocated(sector));
    assert_eq!(fs::fs().lookup("/x"), Err(FsError::NotFound));
    assert!(fs::file_table().find(sector).is_none());
    assert!(fs::fs().check());

    // 删除后可以重新创建同名文件
    assert_eq!(fs::create("/x", 0), Ok(()));
    assert_eq!(fs::remove("/x"), Ok(()));

    // 控制台文件ID从不触及文件系统
    assert_eq!(sys_write(CONSOLE_OUTPUT, b"hi"), 2);
    assert_eq!(console.output.lock().unwrap().as_slice(), b"hi");
    let mut typed = [0u8; 5];
    assert_eq!(sys_read(CONSOLE_INPUT, &mut typed), 5);
    assert_eq!(&typed, b"typed");
    assert_eq!(sys_write(CONSOLE_INPUT, b"hi"), -1);
    assert_eq!(sys_read(CONSOLE_OUTPUT, &mut typed), -1);

    // 进程类调用的失败路径
    assert_eq!(sys_join(4096), -1);
    assert_eq!(sys_exec("/missing", &[], false), -1);

    // 启动一个用户线程：登记进程表并进入就绪队列
    assert_eq!(sys_create("/prog"), 0);
    let pid = sys_exec("/prog", &["arg0"], true);
    assert!(pid >= 0);
    let queued = kernel::task::scheduler::find_next_to_run().unwrap();
    assert_eq!(queued.pid(), pid as usize);
    assert!(queued.is_user());
    assert_eq!(queued.args().len(), 1);
    assert_eq!(queued.args()[0], "arg0");
}
