//! 控制台接口。控制台设备是外部协作者，
//! 文件系统永远不会见到控制台的文件ID。

use alloc::sync::Arc;

use spin::Once;

static CONSOLE: Once<Arc<dyn Console>> = Once::new();

/// 同步控制台特质，由嵌入方在启动时安装
pub trait Console: Send + Sync {
    /// 读取一串字节，返回实际读到的字节数。可能阻塞。
    fn get_bytes(&self, buf: &mut [u8]) -> usize;

    /// 输出一串字节，返回实际写出的字节数
    fn put_bytes(&self, buf: &[u8]) -> usize;
}

pub fn install_console(console: Arc<dyn Console>) {
    CONSOLE.call_once(|| console);
}

pub fn console() -> Option<&'static Arc<dyn Console>> {
    CONSOLE.get()
}
