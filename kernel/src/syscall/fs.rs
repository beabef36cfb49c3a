//! File and filesystem-related syscalls

use crate::config::{CONSOLE_INPUT, CONSOLE_OUTPUT};
use crate::fs;
use crate::fs::stdio;
use crate::task::processor;

pub fn sys_create(path: &str) -> isize {
    match fs::create(path, 0) {
        Ok(_) => 0,
        Err(err) => {
            log::debug!("create of {path} failed: {err:?}");
            -1
        }
    }
}

pub fn sys_remove(path: &str) -> isize {
    match fs::remove(path) {
        Ok(_) => 0,
        Err(err) => {
            log::debug!("removal of {path} failed: {err:?}");
            -1
        }
    }
}

pub fn sys_open(path: &str) -> isize {
    let thread = processor::current_thread().expect("no running thread");

    match fs::open(path) {
        Ok(file) => thread.add_file(file) as isize,
        Err(err) => {
            log::debug!("open of {path} failed: {err:?}");
            -1
        }
    }
}

pub fn sys_close(fid: usize) -> isize {
    let thread = processor::current_thread().expect("no running thread");

    // 摘下的句柄在此处销毁
    match thread.remove_file(fid) {
        Some(_) => 0,
        None => -1,
    }
}

/// try to read bytes with length `buf.len()` from the file with `fid` to `buf`
pub fn sys_read(fid: usize, buf: &mut [u8]) -> isize {
    if buf.is_empty() {
        return -1;
    }

    match fid {
        CONSOLE_INPUT => match stdio::console() {
            Some(console) => console.get_bytes(buf) as isize,
            None => -1,
        },
        CONSOLE_OUTPUT => -1,
        _ => {
            let thread = processor::current_thread().expect("no running thread");
            match thread.get_file(fid) {
                Some(file) => file.read(buf) as isize,
                None => -1,
            }
        }
    }
}

/// try to write `buf` to the file with `fid`
pub fn sys_write(fid: usize, buf: &[u8]) -> isize {
    if buf.is_empty() {
        return -1;
    }

    match fid {
        CONSOLE_OUTPUT => match stdio::console() {
            Some(console) => console.put_bytes(buf) as isize,
            None => -1,
        },
        CONSOLE_INPUT => -1,
        _ => {
            let thread = processor::current_thread().expect("no running thread");
            match thread.get_file(fid) {
                Some(file) => file.write(buf) as isize,
                None => -1,
            }
        }
    }
}
