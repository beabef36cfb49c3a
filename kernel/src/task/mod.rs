//! 线程与调度

pub mod pid;
pub mod processor;
pub mod scheduler;
mod thread;

pub use self::thread::{FdTable, Thread, ThreadStatus};

use alloc::sync::Arc;

use crate::config::BASE_PRIORITY;

/// 建立主线程并成为当前线程
pub fn init() {
    let main = Arc::new(Thread::new("main", BASE_PRIORITY));
    main.set_status(ThreadStatus::Running);
    processor::set_current(main);
}

/// 主动让出处理器。有更该运行的线程时切换过去，否则继续执行。
pub fn yield_now() {
    if let Some(next) = scheduler::find_next_to_run() {
        let current = processor::current_thread().expect("no running thread");
        scheduler::ready_to_run(current);
        processor::run(next);
    }
}

/// 阻塞当前线程并调度下一个就绪线程
pub fn block_current_and_run_next() {
    let current = processor::current_thread().expect("no running thread");
    current.set_status(ThreadStatus::Blocked);

    let next = scheduler::find_next_to_run()
        .expect("no ready thread: the kernel would deadlock");
    processor::run(next);
}

/// 结束当前线程。残骸由下一个获得处理器的线程清理。
pub fn exit_current_and_run_next(exit_code: i32) {
    let current = processor::current_thread().expect("no running thread");
    log::info!(
        "thread {:?} pid={} exits with code {exit_code}",
        current.name(),
        current.pid()
    );

    current.finish(exit_code);
    if !current.is_joinable() {
        // 可汇合的线程等汇合者取走退出码后再摘除
        scheduler::remove_process(current.pid());
    }
    processor::mark_to_destroy(current);

    let next = scheduler::find_next_to_run().expect("no ready thread to run");
    processor::run(next);
}

/// 唤醒阻塞中的线程，重新挂入就绪队列
pub fn wakeup_thread(thread: Arc<Thread>) {
    scheduler::ready_to_run(thread);
}
