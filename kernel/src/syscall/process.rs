//! Process-related syscalls

use alloc::string::ToString;
use alloc::sync::Arc;
use alloc::vec::Vec;

use crate::config::BASE_PRIORITY;
use crate::fs;
use crate::machine;
use crate::path::Path;
use crate::task;
use crate::task::processor;
use crate::task::scheduler;
use crate::task::Thread;

/// 运行一个用户程序，返回新线程的进程ID。
/// `join` 为真时，之后可以用 [`sys_join`] 等待它结束。
pub fn sys_exec(path: &str, args: &[&str], join: bool) -> isize {
    // 可执行文件必须存在且可按普通文件打开；
    // 地址空间的建立与首次投入运行由机器端完成
    let Ok(executable) = fs::open(path) else {
        log::debug!("exec: no executable {path}");
        return -1;
    };
    drop(executable);

    let name = path.file_name().unwrap_or(path);
    let args = args.iter().map(|arg| arg.to_string()).collect::<Vec<_>>();
    let thread = Arc::new(Thread::new_user(name, BASE_PRIORITY, join, args));

    // 子线程继承父线程的工作路径
    if let Some(parent) = processor::current_thread() {
        thread.set_path(parent.path());
    }

    let pid = thread.pid();
    log::debug!("exec {path} as pid={pid}, join={join}");
    scheduler::insert_process(pid, thread.clone());
    scheduler::ready_to_run(thread);
    pid as isize
}

/// 等待目标线程结束，返回其退出码
pub fn sys_join(pid: usize) -> isize {
    let Some(thread) = scheduler::get_process(pid) else {
        log::debug!("join: invalid pid {pid}");
        return -1;
    };
    let Some(exit_code) = thread.join() else {
        // 目标没有以可汇合方式启动
        return -1;
    };
    scheduler::remove_process(pid);
    exit_code as isize
}

pub fn sys_exit(exit_code: i32) -> ! {
    task::exit_current_and_run_next(exit_code);
    unreachable!("a finished thread was scheduled again")
}

pub fn sys_halt() -> ! {
    log::info!("shutdown, initiated by user program");
    machine::halt()
}
