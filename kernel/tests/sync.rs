use kernel::sync::Semaphore;

#[test]
fn permits_are_consumed_and_returned() {
    let sem = Semaphore::new(2);
    sem.down();
    sem.down();
    // 许可耗尽后归还，又能继续取得
    sem.up();
    sem.down();
    sem.up();
    sem.up();
    sem.down();
    sem.down();
}

#[test]
fn up_banks_permits_without_waiters() {
    let sem = Semaphore::new(0);
    sem.up();
    sem.up();
    sem.down();
    sem.down();
}
