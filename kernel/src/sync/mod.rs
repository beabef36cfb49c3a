mod semaphore;
mod up;

pub use self::{semaphore::Semaphore, up::UpCell};
