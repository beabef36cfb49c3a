//! Constants used in the kernel

pub use nach_fs::{FILE_NAME_MAX_LEN, PATH_MAX_LEN};

/// 默认优先级，也是中优先级档的唯一取值
pub const BASE_PRIORITY: u32 = 20;

/// 控制台输入的文件ID，由外部控制台协作者承接
pub const CONSOLE_INPUT: usize = 0;
/// 控制台输出的文件ID
pub const CONSOLE_OUTPUT: usize = 1;
/// 分配给打开文件的最小文件ID，0 与 1 被控制台占用
pub const FIRST_FILE_FID: usize = 2;

/// 用户态寄存器个数，保存/恢复用户程序状态时使用
pub const NUM_USER_REGS: usize = 40;
