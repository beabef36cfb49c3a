use alloc::vec::Vec;

use spin::Mutex;

static PID_ALLOCATOR: Mutex<PidAllocator> = Mutex::new(PidAllocator::new());

/// 进程ID句柄，释放时归还编号
#[derive(Debug)]
pub struct PidHandle(pub usize);

struct PidAllocator {
    current: usize,
    recycled: Vec<usize>,
}

pub fn alloc() -> PidHandle {
    PID_ALLOCATOR.lock().alloc()
}

impl PidAllocator {
    const fn new() -> Self {
        Self {
            current: 0,
            recycled: Vec::new(),
        }
    }

    fn alloc(&mut self) -> PidHandle {
        match self.recycled.pop() {
            Some(pid) => PidHandle(pid),
            None => {
                self.current += 1;
                PidHandle(self.current - 1)
            }
        }
    }

    fn dealloc(&mut self, pid: usize) {
        debug_assert!(!self.recycled.contains(&pid));
        self.recycled.push(pid);
    }
}

impl Drop for PidHandle {
    fn drop(&mut self) {
        PID_ALLOCATOR.lock().dealloc(self.0);
    }
}
