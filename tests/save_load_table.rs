use std::sync::Arc;

use lie::Algebra;
use roots::root_system::RootSystem;
use roots::table::{read_table, TableRow};

fn construct(max_height: usize) -> RootSystem {
    let mut root_system = RootSystem::new(Arc::new(Algebra::feingold_frenkel()));
    root_system.construct(max_height);
    root_system
}

#[test]
fn test_save_load() {
    let tempdir = tempfile::TempDir::new().unwrap();
    let path = tempdir.path().join("data").join("roots.txt");

    let root_system = construct(12);
    root_system.export_table(&path).unwrap();

    let rows = read_table(&path).unwrap();
    assert_eq!(rows, root_system.table_rows().collect::<Vec<TableRow>>());
    assert_eq!(rows.len(), root_system.num_roots());
    assert_eq!(
        std::fs::read_to_string(&path).unwrap(),
        root_system.table_string()
    );

    // No temporary file is left behind
    let files: Vec<_> = std::fs::read_dir(path.parent().unwrap())
        .unwrap()
        .map(|entry| entry.unwrap().file_name())
        .collect();
    assert_eq!(files, vec!["roots.txt"]);
}

#[test]
fn test_overwrite() {
    let tempdir = tempfile::TempDir::new().unwrap();
    let path = tempdir.path().join("roots.txt");

    construct(10).export_table(&path).unwrap();
    let lower = construct(4);
    lower.export_table(&path).unwrap();

    assert_eq!(
        std::fs::read_to_string(&path).unwrap(),
        lower.table_string()
    );
}

#[test]
fn test_read_missing() {
    let tempdir = tempfile::TempDir::new().unwrap();
    let path = tempdir.path().join("missing.txt");
    let err = read_table(&path).unwrap_err();
    assert!(err.to_string().starts_with("Failed to open"));
}

#[test]
fn test_export_into_file_fails() {
    let tempdir = tempfile::TempDir::new().unwrap();
    let blocker = tempdir.path().join("blocker");
    std::fs::write(&blocker, "").unwrap();

    // The parent of the destination is a file, so the directory cannot be created
    let result = construct(2).export_table(blocker.join("roots.txt"));
    assert!(result.is_err());
    assert_eq!(std::fs::read_to_string(&blocker).unwrap(), "");
}
