//! 处理器状态管理：当前线程与线程切换

use alloc::sync::Arc;

use super::{Thread, ThreadStatus};
use crate::machine;
use crate::sync::UpCell;

static PROCESSOR: UpCell<Processor> = UpCell::new(Processor::new());

struct Processor {
    current: Option<Arc<Thread>>,
    /// 已终结、等待收尸的线程
    to_destroy: Option<Arc<Thread>>,
}

impl Processor {
    const fn new() -> Self {
        Self {
            current: None,
            to_destroy: None,
        }
    }
}

pub fn current_thread() -> Option<Arc<Thread>> {
    PROCESSOR.exclusive_access().current.clone()
}

pub(crate) fn set_current(thread: Arc<Thread>) {
    PROCESSOR.exclusive_access().current = Some(thread);
}

pub(crate) fn mark_to_destroy(thread: Arc<Thread>) {
    PROCESSOR.exclusive_access().to_destroy = Some(thread);
}

/// 把处理器交给 `next`。
///
/// 调用者需保证互斥；本函数不获取也不释放任何锁。
/// 出让方的状态(就绪、阻塞或待销毁)已由调用者安排好。
pub fn run(next: Arc<Thread>) {
    let prev = PROCESSOR
        .exclusive_session(|processor| processor.current.replace(next.clone()))
        .expect("no running thread");

    // 用户程序先保存处理器状态
    if prev.is_user() {
        machine::save_user_state(&prev);
    }

    next.set_status(ThreadStatus::Running);
    machine::switch(&prev, &next);

    // 执行至此表示本线程重新获得处理器。先前让出处理器的线程
    // 若已终结，在这里清理残骸：线程不能在自己的栈上销毁自己
    if let Some(dead) = PROCESSOR.exclusive_access().to_destroy.take() {
        log::trace!("reaping thread {:?}", dead.name());
        drop(dead);
    }

    let current = current_thread().expect("no running thread");
    if current.is_user() {
        machine::restore_user_state(&current);
    }
}
