use alloc::string::String;
use alloc::string::ToString;
use alloc::sync::Arc;
use alloc::vec::Vec;

use super::pid::{self, PidHandle};
use crate::config::{FIRST_FILE_FID, NUM_USER_REGS};
use crate::fs::OsFile;
use crate::sync::{Semaphore, UpCell};

pub struct Thread {
    // immutable
    name: String,
    pid: PidHandle,
    priority: u32,
    /// 是否承载用户程序
    user: bool,
    /// 用户程序的启动参数，由机器端搬运进用户栈
    args: Vec<String>,
    /// 可被汇合的线程持有一个初值为零的信号量
    join_sem: Option<Semaphore>,
    // mutable
    inner: UpCell<ThreadInner>,
}

struct ThreadInner {
    status: ThreadStatus,
    /// 工作路径，解析相对路径时使用
    path: String,
    files: FdTable,
    exit_code: Option<i32>,
    /// 让出处理器期间保存的用户寄存器组
    user_state: Option<[u32; NUM_USER_REGS]>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThreadStatus {
    JustCreated,
    Ready,
    Running,
    Blocked,
}

/// 线程的打开文件表：文件ID到打开文件的映射。
/// 0 与 1 留给控制台，文件从 [`FIRST_FILE_FID`] 起编号。
pub struct FdTable {
    files: Vec<Option<Arc<OsFile>>>,
}

impl Thread {
    /// 创建内核线程
    pub fn new(name: &str, priority: u32) -> Self {
        Self::build(name, priority, false, false, Vec::new())
    }

    /// 创建承载用户程序的线程
    pub fn new_user(name: &str, priority: u32, joinable: bool, args: Vec<String>) -> Self {
        Self::build(name, priority, true, joinable, args)
    }

    fn build(name: &str, priority: u32, user: bool, joinable: bool, args: Vec<String>) -> Self {
        Self {
            name: name.to_string(),
            pid: pid::alloc(),
            priority,
            user,
            args,
            join_sem: joinable.then(|| Semaphore::new(0)),
            inner: UpCell::new(ThreadInner {
                status: ThreadStatus::JustCreated,
                path: String::from("/"),
                files: FdTable::new(),
                exit_code: None,
                user_state: None,
            }),
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn pid(&self) -> usize {
        self.pid.0
    }

    #[inline]
    pub fn priority(&self) -> u32 {
        self.priority
    }

    #[inline]
    pub fn is_user(&self) -> bool {
        self.user
    }

    #[inline]
    pub fn is_joinable(&self) -> bool {
        self.join_sem.is_some()
    }

    #[inline]
    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn status(&self) -> ThreadStatus {
        self.inner.exclusive_access().status
    }

    pub fn set_status(&self, status: ThreadStatus) {
        self.inner.exclusive_access().status = status;
    }

    /// 工作路径
    pub fn path(&self) -> String {
        self.inner.exclusive_access().path.clone()
    }

    pub fn set_path(&self, path: String) {
        self.inner.exclusive_access().path = path;
    }

    pub fn add_file(&self, file: Arc<OsFile>) -> usize {
        self.inner.exclusive_access().files.insert(file)
    }

    pub fn get_file(&self, fid: usize) -> Option<Arc<OsFile>> {
        self.inner.exclusive_access().files.get(fid)
    }

    pub fn remove_file(&self, fid: usize) -> Option<Arc<OsFile>> {
        self.inner.exclusive_access().files.remove(fid)
    }

    /// 等待线程结束，返回其退出码。不可汇合的线程返回空。
    pub fn join(&self) -> Option<i32> {
        let sem = self.join_sem.as_ref()?;
        sem.down();
        self.inner.exclusive_access().exit_code
    }

    /// 记录退出码，并放行所有汇合者
    pub fn finish(&self, exit_code: i32) {
        self.inner.exclusive_access().exit_code = Some(exit_code);
        if let Some(sem) = &self.join_sem {
            sem.up();
        }
    }

    pub fn user_state(&self) -> Option<[u32; NUM_USER_REGS]> {
        self.inner.exclusive_access().user_state
    }

    pub fn set_user_state(&self, state: Option<[u32; NUM_USER_REGS]>) {
        self.inner.exclusive_access().user_state = state;
    }
}

impl FdTable {
    pub const fn new() -> Self {
        Self { files: Vec::new() }
    }

    /// 登记打开文件，返回其文件ID
    pub fn insert(&mut self, file: Arc<OsFile>) -> usize {
        let slot = match self.files.iter().position(|f| f.is_none()) {
            Some(slot) => {
                self.files[slot] = Some(file);
                slot
            }
            None => {
                self.files.push(Some(file));
                self.files.len() - 1
            }
        };
        slot + FIRST_FILE_FID
    }

    pub fn get(&self, fid: usize) -> Option<Arc<OsFile>> {
        let slot = fid.checked_sub(FIRST_FILE_FID)?;
        self.files.get(slot)?.clone()
    }

    pub fn remove(&mut self, fid: usize) -> Option<Arc<OsFile>> {
        let slot = fid.checked_sub(FIRST_FILE_FID)?;
        self.files.get_mut(slot)?.take()
    }
}

impl Default for FdTable {
    fn default() -> Self {
        Self::new()
    }
}
