//! 路径工具：绝对/相对判定、规范化与父子拆分

use alloc::borrow::ToOwned;
use alloc::string::String;
use alloc::vec::Vec;

pub trait Path: ToOwned {
    fn is_absolute(&self) -> bool;

    /// 返回不以`/`结束、不含`.`与`..`的绝对路径。
    ///
    /// # 参数
    ///
    /// `cwd`: 当前线程的工作路径，为绝对路径，且非根时不以`/`结束。
    ///
    /// 路径含空项、或`..`越过根目录时返回空。
    fn canonicalize(&self, cwd: &Self) -> Option<Self::Owned>;

    /// 路径的最后一项。路径终止于根目录或为相对单项时返回空。
    fn file_name(&self) -> Option<&Self>;

    /// 拆出路径的`(父目录, 最后一项)`
    fn parent_file(&self) -> Option<(&Self, &Self)>;

    fn is_relative(&self) -> bool {
        !self.is_absolute()
    }
}

impl Path for str {
    fn is_absolute(&self) -> bool {
        self.starts_with('/')
    }

    fn canonicalize(&self, cwd: &Self) -> Option<String> {
        if self == "/" {
            return Some(String::from("/"));
        }

        let mut parts = Vec::new();
        if self.is_relative() {
            // 工作路径打底；过滤掉根目录带来的空串
            parts.extend(cwd.split('/').filter(|p| !p.is_empty()));
        }

        for part in self.trim_start_matches('/').split('/') {
            match part {
                ".." => {
                    parts.pop()?;
                }
                "." => (),
                "" => return None,
                p => parts.push(p),
            }
        }
        if parts.is_empty() {
            return Some(String::from("/"));
        }

        // 开头补一个空串，拼接后即以`/`起始
        parts.insert(0, "");
        Some(parts.join("/"))
    }

    fn file_name(&self) -> Option<&Self> {
        match self.rsplit_once('/') {
            Some((_, "")) => None,
            Some((_, name)) => Some(name),
            None => None,
        }
    }

    fn parent_file(&self) -> Option<(&Self, &Self)> {
        if self == "/" {
            return None;
        }

        let (parent, name) = self.rsplit_once('/')?;
        Some(if parent.is_empty() {
            ("/", name)
        } else {
            (parent, name)
        })
    }
}
