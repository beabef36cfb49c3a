#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsError {
    NotFound,
    AlreadyExists,
    /// 位图耗尽，或目录槽位、直接索引耗尽
    NoSpace,
    NotADirectory,
    IsADirectory,
    NameTooLong,
    /// 路径不合法：非绝对路径、空项或超长
    BadPath,
    /// 文件已被标记删除，拒绝新的打开
    Busy,
}
