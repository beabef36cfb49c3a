//! # 打开文件表
//!
//! 全局唯一，按文件头扇区为键登记每个正被打开的文件。
//! 表项承担两件事：
//!
//! - 引用计数与延迟删除：`users` 记录存活句柄数；带 `remove`
//!   标记的文件拒绝新的打开，等最后一个句柄关闭时才回收；
//! - 读写协调：同一文件允许多个读者并发，写者独占。
//!   公平性不作保证，持续到来的读者可以饿死写者。

use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::string::ToString;
use alloc::sync::Arc;

use spin::Mutex;

use crate::sync::{Semaphore, UpCell};

pub struct FileTable {
    nodes: Mutex<BTreeMap<u32, Arc<FileNode>>>,
}

/// 打开文件表的表项
pub struct FileNode {
    /// 规范化的绝对路径，延迟删除时凭它定位文件
    name: String,
    /// 文件头所在扇区，即表键
    sector: u32,
    state: UpCell<NodeState>,
    /// 保护 `readers` 计数的互斥信号量
    can_read: Semaphore,
    /// 写者互斥。只要还有读者，该信号量就被持有
    can_write: Semaphore,
}

struct NodeState {
    /// 存活句柄数
    users: usize,
    /// 延迟删除标记
    remove: bool,
    /// 活跃读者数
    readers: usize,
}

impl FileTable {
    pub const fn new() -> Self {
        Self {
            nodes: Mutex::new(BTreeMap::new()),
        }
    }

    pub fn find(&self, sector: u32) -> Option<Arc<FileNode>> {
        self.nodes.lock().get(&sector).cloned()
    }

    /// 登记文件；已登记时返回现有表项
    pub fn add_file(&self, name: &str, sector: u32) -> Arc<FileNode> {
        self.nodes
            .lock()
            .entry(sector)
            .or_insert_with(|| Arc::new(FileNode::new(name, sector)))
            .clone()
    }

    pub fn remove(&self, sector: u32) {
        self.nodes.lock().remove(&sector);
    }
}

impl FileNode {
    fn new(name: &str, sector: u32) -> Self {
        Self {
            name: name.to_string(),
            sector,
            state: UpCell::new(NodeState {
                users: 0,
                remove: false,
                readers: 0,
            }),
            can_read: Semaphore::new(1),
            can_write: Semaphore::new(1),
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn sector(&self) -> u32 {
        self.sector
    }

    pub fn users(&self) -> usize {
        self.state.exclusive_access().users
    }

    pub fn inc_users(&self) {
        self.state.exclusive_access().users += 1;
    }

    /// 减少一个存活句柄，返回剩余句柄数
    pub fn dec_users(&self) -> usize {
        let mut state = self.state.exclusive_access();
        state.users -= 1;
        state.users
    }

    pub fn is_removing(&self) -> bool {
        self.state.exclusive_access().remove
    }

    pub fn set_remove(&self) {
        self.state.exclusive_access().remove = true;
    }

    /// 占据一个读者席位。首个读者代表所有读者挡住写者。
    pub fn acquire_read(&self) {
        self.can_read.down();
        let first = self.state.exclusive_session(|state| {
            state.readers += 1;
            state.readers == 1
        });
        if first {
            self.can_write.down();
        }
        self.can_read.up();
    }

    /// 释放读者席位。末位读者放行写者。
    pub fn release_read(&self) {
        self.can_read.down();
        let last = self.state.exclusive_session(|state| {
            state.readers -= 1;
            state.readers == 0
        });
        if last {
            self.can_write.up();
        }
        self.can_read.up();
    }

    pub fn acquire_write(&self) {
        self.can_write.down();
    }

    pub fn release_write(&self) {
        self.can_write.up();
    }
}
