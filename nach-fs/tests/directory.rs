use nach_fs::Directory;
use nach_fs::NUM_DIR_ENTRIES;

#[test]
fn find_filters_by_entry_kind() {
    let mut directory = Directory::empty();
    assert!(directory.add("data", 7, false));
    assert!(directory.add("sub", 9, true));

    // 不带目录过滤时只有普通文件可命中，反之亦然
    assert_eq!(directory.find("data", false), Some(7));
    assert_eq!(directory.find("data", true), None);
    assert_eq!(directory.find("sub", true), Some(9));
    assert_eq!(directory.find("sub", false), None);
}

#[test]
fn duplicate_names_are_rejected_across_kinds() {
    let mut directory = Directory::empty();
    assert!(directory.add("name", 5, false));
    // 同名即拒绝，与项的种类无关
    assert!(!directory.add("name", 6, false));
    assert!(!directory.add("name", 6, true));
}

#[test]
fn capacity_is_bounded() {
    let mut directory = Directory::empty();
    for i in 0..NUM_DIR_ENTRIES {
        assert!(directory.add(&format!("f{i}"), 10 + i as u32, false));
    }
    assert!(!directory.add("straw", 99, false));

    // 腾出一个槽位后又能添加
    assert_eq!(directory.remove("f3"), Some(13));
    assert!(directory.add("straw", 99, false));
}

#[test]
fn remove_reports_the_vacated_sector() {
    let mut directory = Directory::empty();
    assert!(directory.add("gone", 21, false));
    assert_eq!(directory.remove("gone"), Some(21));
    assert_eq!(directory.remove("gone"), None);
    assert_eq!(directory.find("gone", false), None);
}

#[test]
fn entries_lists_live_items_only() {
    let mut directory = Directory::empty();
    directory.add("a", 3, false);
    directory.add("b", 4, true);
    directory.add("c", 5, false);
    directory.remove("a");

    let names: Vec<_> = directory.entries().into_iter().map(|e| e.name).collect();
    assert_eq!(names, ["b", "c"]);
}
