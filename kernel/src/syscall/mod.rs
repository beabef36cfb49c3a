//! # 系统调用层
//!
//! 用户程序经陷入进入内核后由此分发。陷入机制、用户内存的
//! 参数搬运都在机器侧完成，这里只提供内核侧的各个入口：
//! 字符串与缓冲区参数已经搬运成内核数据。
//!
//! 约定：失败一律返回 -1；`sys_open` 成功返回文件ID，
//! `sys_read`/`sys_write` 成功返回完成的字节数，
//! `sys_exec` 成功返回新线程的进程ID，其余成功返回 0。

mod fs;
mod process;

pub use self::fs::*;
pub use self::process::*;

pub const SYSCALL_HALT: usize = 0;
pub const SYSCALL_EXIT: usize = 1;
pub const SYSCALL_EXEC: usize = 2;
pub const SYSCALL_JOIN: usize = 3;
pub const SYSCALL_CREATE: usize = 4;
pub const SYSCALL_OPEN: usize = 5;
pub const SYSCALL_READ: usize = 6;
pub const SYSCALL_WRITE: usize = 7;
pub const SYSCALL_CLOSE: usize = 8;
pub const SYSCALL_REMOVE: usize = 9;
