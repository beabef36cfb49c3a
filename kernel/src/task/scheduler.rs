//! # 预备线程调度器
//!
//! 按优先级分成三档就绪队列：低于 [`BASE_PRIORITY`] 为低档，
//! 等于为中档，高于为高档。取线程时从高档往低档扫描；
//! 档内按优先级稳定排序插入，同优先级保持到达次序，先进先出。
//!
//! 没有老化，也没有优先级继承，优先级反转是可能的。

use alloc::collections::{BTreeMap, VecDeque};
use alloc::sync::Arc;

use spin::Mutex;

use super::{Thread, ThreadStatus};
use crate::config::BASE_PRIORITY;
use crate::sync::UpCell;

pub const NUM_TIERS: usize = 3;

static SCHEDULER: UpCell<Scheduler> = UpCell::new(Scheduler::new());
static PID2THREAD: Mutex<BTreeMap<usize, Arc<Thread>>> = Mutex::new(BTreeMap::new());

/// 把线程置为就绪并挂入对应档的就绪队列
pub fn ready_to_run(thread: Arc<Thread>) {
    SCHEDULER.exclusive_access().ready_to_run(thread);
}

/// 取出下一个应当运行的线程；就绪队列全空时返回空
#[inline]
pub fn find_next_to_run() -> Option<Arc<Thread>> {
    SCHEDULER.exclusive_access().find_next_to_run()
}

pub fn insert_process(pid: usize, thread: Arc<Thread>) {
    PID2THREAD.lock().insert(pid, thread);
}

pub fn get_process(pid: usize) -> Option<Arc<Thread>> {
    PID2THREAD.lock().get(&pid).cloned()
}

pub fn remove_process(pid: usize) {
    PID2THREAD.lock().remove(&pid);
}

/// 三档就绪队列
pub struct Scheduler {
    ready: [VecDeque<Arc<Thread>>; NUM_TIERS],
}

impl Scheduler {
    pub const fn new() -> Self {
        Self {
            ready: [VecDeque::new(), VecDeque::new(), VecDeque::new()],
        }
    }

    pub fn ready_to_run(&mut self, thread: Arc<Thread>) {
        let priority = thread.priority();
        log::debug!(
            "putting thread {:?} with priority {priority} on ready list",
            thread.name()
        );
        thread.set_status(ThreadStatus::Ready);

        // 稳定排序插入：找到第一个优先级更高的位置，
        // 同优先级落在已有线程之后
        let tier = &mut self.ready[Self::tier(priority)];
        let at = tier
            .iter()
            .position(|queued| queued.priority() > priority)
            .unwrap_or(tier.len());
        tier.insert(at, thread);
    }

    pub fn find_next_to_run(&mut self) -> Option<Arc<Thread>> {
        self.ready.iter_mut().rev().find_map(|tier| tier.pop_front())
    }

    #[inline]
    fn tier(priority: u32) -> usize {
        if priority < BASE_PRIORITY {
            0
        } else if priority == BASE_PRIORITY {
            1
        } else {
            2
        }
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}
