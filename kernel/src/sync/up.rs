use core::cell::{RefCell, RefMut};

/// 单处理器独占访问单元。
///
/// 内核数据结构只会在单处理器上被串行访问，
/// 用运行期借用检查守住这一纪律。
#[derive(Debug)]
pub struct UpCell<T> {
    inner: RefCell<T>,
}

unsafe impl<T> Sync for UpCell<T> {}

impl<T> UpCell<T> {
    pub const fn new(value: T) -> Self {
        Self {
            inner: RefCell::new(value),
        }
    }

    /// Panic if the data has been borrowed.
    pub fn exclusive_access(&self) -> RefMut<'_, T> {
        self.inner.borrow_mut()
    }

    pub fn exclusive_session<F, V>(&self, f: F) -> V
    where
        F: FnOnce(&mut T) -> V,
    {
        let mut inner = self.exclusive_access();
        f(&mut inner)
    }
}
