use alloc::collections::VecDeque;
use alloc::sync::Arc;
use core::sync::atomic;
use core::sync::atomic::AtomicUsize;

use super::UpCell;
use crate::task;
use crate::task::processor;
use crate::task::Thread;

/// 计数信号量。许可耗尽时 `down` 会把当前线程挂入等待队列，
/// 并经由调度器让出处理器。
pub struct Semaphore {
    permits: AtomicUsize,
    wait_queue: UpCell<VecDeque<Arc<Thread>>>,
}

impl Semaphore {
    pub const fn new(permits: usize) -> Self {
        Self {
            permits: AtomicUsize::new(permits),
            wait_queue: UpCell::new(VecDeque::new()),
        }
    }

    /// Verhogen 增加
    pub fn up(&self) {
        if let Some(thread) = self.wait_queue.exclusive_access().pop_front() {
            // 许可直接转让给队首线程
            task::wakeup_thread(thread);
        } else {
            self.permits.fetch_add(1, atomic::Ordering::Release);
        }
    }

    /// Proberen 尝试
    pub fn down(&self) {
        let mut permits = self.permits.load(atomic::Ordering::Acquire);

        // 许可派发完则去排队
        if permits == 0 {
            self.wait_current();
            return;
        }

        // 尝试取得一个许可，直到成功为止；
        // 若中途发现许可用光，则去排队。
        while let Err(current) = self.permits.compare_exchange(
            permits,
            permits - 1,
            atomic::Ordering::AcqRel,
            atomic::Ordering::Acquire,
        ) {
            if current == 0 {
                self.wait_current();
                break;
            }
            permits = current;
        }
    }
}

impl Semaphore {
    fn wait_current(&self) {
        self.wait_queue
            .exclusive_access()
            .push_back(processor::current_thread().unwrap());
        task::block_current_and_run_next();
    }
}
