mod common;

use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use classlift::{transform_file, transform_tree, Config};

use common::{incrementing_initializer, interface_class, plain_class, static_field, static_initializer};

fn scratch_dir(tag: &str) -> PathBuf {
    let nanos = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_nanos();
    let dir = std::env::temp_dir().join(format!("classlift-{}-{}-{}", tag, std::process::id(), nanos));
    fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn transform_file_writes_interface_and_companion() {
    let input_dir = scratch_dir("file-in");
    let output_dir = scratch_dir("file-out");

    let bytes = interface_class(
        "com/x/I",
        vec![static_field("a", "I")],
        vec![static_initializer(incrementing_initializer("com/x/I", "a"))],
        vec![],
    );
    let input = input_dir.join("I.class");
    fs::write(&input, bytes).unwrap();

    transform_file(
        &input.to_string_lossy(),
        &output_dir.to_string_lossy(),
        &Config::default(),
    )
    .expect("transformation should succeed");

    assert!(output_dir.join("com/x/I.class").is_file());
    assert!(output_dir.join("com/x/I$FIELDS.class").is_file());

    let companion = common::read_class(&fs::read(output_dir.join("com/x/I$FIELDS.class")).unwrap());
    assert_eq!(companion.header().name, "com/x/I$FIELDS");

    fs::remove_dir_all(&input_dir).ok();
    fs::remove_dir_all(&output_dir).ok();
}

#[test]
fn transform_tree_walks_nested_directories() {
    let input_dir = scratch_dir("tree-in");
    let output_dir = scratch_dir("tree-out");

    let interface = interface_class("com/x/I", vec![static_field("a", "I")], vec![], vec![]);
    let plain = plain_class("com/x/C", vec![static_field("b", "I")], vec![]);
    fs::create_dir_all(input_dir.join("com/x")).unwrap();
    fs::write(input_dir.join("com/x/I.class"), interface).unwrap();
    fs::write(input_dir.join("com/x/C.class"), plain).unwrap();
    fs::write(input_dir.join("notes.txt"), b"not a class file").unwrap();

    let written = transform_tree(
        &input_dir.to_string_lossy(),
        &output_dir.to_string_lossy(),
        &Config::default(),
    )
    .expect("transformation should succeed");

    // Two rewritten classes plus one companion.
    assert_eq!(written, 3);
    assert!(output_dir.join("com/x/I.class").is_file());
    assert!(output_dir.join("com/x/C.class").is_file());
    assert!(output_dir.join("com/x/I$FIELDS.class").is_file());

    fs::remove_dir_all(&input_dir).ok();
    fs::remove_dir_all(&output_dir).ok();
}

#[test]
fn transform_file_rejects_garbage() {
    let input_dir = scratch_dir("garbage-in");
    let output_dir = scratch_dir("garbage-out");
    let input = input_dir.join("X.class");
    fs::write(&input, b"not a class file at all").unwrap();

    let result = transform_file(
        &input.to_string_lossy(),
        &output_dir.to_string_lossy(),
        &Config::default(),
    );
    assert!(result.is_err());

    fs::remove_dir_all(&input_dir).ok();
    fs::remove_dir_all(&output_dir).ok();
}
