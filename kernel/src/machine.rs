//! # 机器接口层
//!
//! 处理器模拟、上下文切换例程与用户寄存器组都属于外部协作者；
//! 内核只依赖此处声明的契约。调度器的正确性只取决于
//! 优先级与先进先出纪律，不取决于交换上下文的具体机制。

use alloc::sync::Arc;

use spin::Once;

use crate::task::Thread;

static MACHINE: Once<Arc<dyn Machine>> = Once::new();

/// 机器端口特质，由嵌入方在启动时安装
pub trait Machine: Send + Sync {
    /// 交换执行流。返回时表示 `from` 再次获得处理器。
    fn switch(&self, from: &Arc<Thread>, to: &Arc<Thread>) {
        let _ = (from, to);
    }

    /// 把用户程序的处理器状态存入线程
    fn save_user_state(&self, thread: &Arc<Thread>) {
        let _ = thread;
    }

    /// 从线程恢复用户程序的处理器状态
    fn restore_user_state(&self, thread: &Arc<Thread>) {
        let _ = thread;
    }

    /// 停机
    fn halt(&self) -> ! {
        panic!("machine halted");
    }
}

pub fn install(machine: Arc<dyn Machine>) {
    MACHINE.call_once(|| machine);
}

pub(crate) fn switch(from: &Arc<Thread>, to: &Arc<Thread>) {
    log::debug!("switching from thread {:?} to thread {:?}", from.name(), to.name());
    match MACHINE.get() {
        Some(machine) => machine.switch(from, to),
        None => log::trace!("no machine port, context switch elided"),
    }
}

pub(crate) fn save_user_state(thread: &Arc<Thread>) {
    if let Some(machine) = MACHINE.get() {
        machine.save_user_state(thread);
    }
}

pub(crate) fn restore_user_state(thread: &Arc<Thread>) {
    if let Some(machine) = MACHINE.get() {
        machine.restore_user_state(thread);
    }
}

pub fn halt() -> ! {
    match MACHINE.get() {
        Some(machine) => machine.halt(),
        None => panic!("machine halted"),
    }
}
