//! Write trees to disk and read them back.

use lablog_h5::{AttrValue, Dataset, FileWriter, Group, H5Error, H5File};
use lablog_test_utils::assert_bits_eq;
use proptest::prelude::*;

#[test]
fn write_then_open() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("roundtrip.h5");
    let mut root = Group::new();
    root.set_attr("created_by", "lablog").unwrap();
    let runs = root.create_group("runs").unwrap();
    for (i, name) in ["r0", "r1", "r2"].into_iter().enumerate() {
        let values: Vec<f64> = (0..4).map(|k| (i * 4 + k) as f64 * 0.25).collect();
        runs.insert_dataset(name, Dataset::from_f64(&[4], &values).unwrap())
            .unwrap()
            .set_attr("index", i as i32)
            .unwrap();
    }

    FileWriter::new(&root).write_to(&path).unwrap();
    let file = H5File::open(&path).unwrap();

    assert_eq!(file.root(), &root);
    let r2 = file.dataset("/runs/r2").unwrap();
    assert_eq!(r2.read_f64().unwrap(), vec![2.0, 2.25, 2.5, 2.75]);
    assert_eq!(r2.attr("index"), Some(&AttrValue::I32(2)));
    assert_eq!(
        file.root().attr("created_by").and_then(AttrValue::as_str),
        Some("lablog")
    );
}

#[test]
fn write_truncates_existing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("truncate.h5");
    std::fs::write(&path, vec![0xffu8; 4096]).unwrap();
    let root = Group::new();
    FileWriter::new(&root).write_to(&path).unwrap();
    let on_disk = std::fs::read(&path).unwrap();
    assert_eq!(on_disk, FileWriter::new(&root).to_bytes().unwrap());
}

#[test]
fn write_into_missing_directory_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("file.h5");
    assert!(matches!(
        FileWriter::new(&Group::new()).write_to(path),
        Err(H5Error::Io(_))
    ));
}

#[test]
fn deep_nesting() {
    let mut root = Group::new();
    let mut cursor = &mut root;
    for depth in 0..32 {
        cursor = cursor.create_group(&format!("level{depth}")).unwrap();
    }
    cursor
        .insert_dataset("leaf", Dataset::from_i64(&[], &[i64::MIN]).unwrap())
        .unwrap();
    let bytes = FileWriter::new(&root).to_bytes().unwrap();
    let file = H5File::from_bytes(&bytes).unwrap();
    let path: Vec<String> = (0..32).map(|d| format!("level{d}")).collect();
    let leaf = file.dataset(&format!("{}/leaf", path.join("/"))).unwrap();
    assert_eq!(leaf.read_i64().unwrap(), vec![i64::MIN]);
}

#[test]
fn wide_group_needs_wider_header_size_field() {
    let mut root = Group::new();
    for i in 0..200 {
        root.create_group(&format!("member_{i:03}")).unwrap();
    }
    let bytes = FileWriter::new(&root).to_bytes().unwrap();
    let file = H5File::from_bytes(&bytes).unwrap();
    assert_eq!(file.root().len(), 200);
    assert_eq!(file.root().members().nth(150).map(|(n, _)| n), Some("member_150"));
}

#[test]
fn nan_and_signed_zero_survive() {
    let values = [f32::NAN, -0.0, f32::INFINITY, f32::MIN_POSITIVE];
    let mut root = Group::new();
    root.insert_dataset("odd", Dataset::from_f32(&[4], &values).unwrap())
        .unwrap();
    let bytes = FileWriter::new(&root).to_bytes().unwrap();
    let read = H5File::from_bytes(&bytes)
        .unwrap()
        .dataset("odd")
        .unwrap()
        .read_f32()
        .unwrap();
    assert_bits_eq(&read, &values);
}

fn arb_shape() -> impl Strategy<Value = Vec<u64>> {
    prop::collection::vec(0u64..5, 0..4)
}

proptest! {
    #[test]
    fn arbitrary_shapes_roundtrip(shape in arb_shape(), seed in any::<i32>()) {
        let count: u64 = shape.iter().product();
        let values: Vec<i32> = (0..count as i32).map(|v| v.wrapping_mul(seed)).collect();
        let mut root = Group::new();
        root.insert_dataset("d", Dataset::from_i32(&shape, &values).unwrap()).unwrap();

        let bytes = FileWriter::new(&root).to_bytes().unwrap();
        let file = H5File::from_bytes(&bytes).unwrap();
        let d = file.dataset("d").unwrap();
        prop_assert_eq!(d.shape(), &shape[..]);
        prop_assert_eq!(d.read_i32().unwrap(), values);
    }

    #[test]
    fn arbitrary_attribute_strings_roundtrip(text in "[ -~]{0,200}") {
        let mut root = Group::new();
        root.set_attr("note", text.as_str()).unwrap();
        let bytes = FileWriter::new(&root).to_bytes().unwrap();
        let file = H5File::from_bytes(&bytes).unwrap();
        prop_assert_eq!(file.root().attr("note").and_then(AttrValue::as_str), Some(text.as_str()));
    }
}
