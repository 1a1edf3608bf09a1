//! The example file on disk, checked against independent fixtures.

use lablog::h5::message::{AttributeMessage, LinkMessage, MessageType};
use lablog::h5::object_header::ObjectHeader;
use lablog::h5::{AttrValue, Datatype, H5File, StringPadding, Superblock};
use lablog::solution::{check_solution, write_solution};
use lablog_test_utils::{
    assert_bits_eq, CONTENT, CONTENT_ATTR, DATASET_NAME, DATASET_PATH, GROUP_NAME, MATRIX, MEAN,
    MEAN_ATTR, SHAPE, SOLUTION_FILE,
};
use tempfile::TempDir;

fn written() -> (TempDir, H5File) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(SOLUTION_FILE);
    write_solution(&path).unwrap();
    let file = H5File::open(&path).unwrap();
    (dir, file)
}

#[test]
fn group_and_dataset_present() {
    let (_dir, file) = written();
    let names: Vec<&str> = file.root().members().map(|(n, _)| n).collect();
    assert_eq!(names, [GROUP_NAME]);
    let group = file.group(GROUP_NAME).unwrap();
    assert_eq!(group.len(), 1);
    assert!(group.dataset(DATASET_NAME).is_some());
}

#[test]
fn dataset_matches_literals() {
    let (_dir, file) = written();
    let ds = file.dataset(DATASET_PATH).unwrap();
    assert_eq!(ds.datatype(), Datatype::F32);
    assert_eq!(ds.shape(), SHAPE);
    assert_eq!(ds.max_shape(), Some(&SHAPE[..]));
    assert_bits_eq(&ds.read_f32().unwrap(), &MATRIX);
}

#[test]
fn attributes_match_literals() {
    let (_dir, file) = written();
    let content = file.group(GROUP_NAME).unwrap().attr(CONTENT_ATTR).unwrap();
    assert_eq!(content.as_str(), Some(CONTENT));

    let mean = file.dataset(DATASET_PATH).unwrap().attr(MEAN_ATTR).unwrap();
    assert_eq!(mean, &AttrValue::F32(MEAN));
}

#[test]
fn content_attribute_bytes_on_disk() {
    let (dir, _file) = written();
    let bytes = std::fs::read(dir.path().join(SOLUTION_FILE)).unwrap();
    let sb = Superblock::parse(&bytes, 0).unwrap();
    let root = ObjectHeader::parse(&bytes, sb.root_group_address as usize).unwrap();
    let link = root
        .messages_of(MessageType::Link)
        .map(|m| LinkMessage::parse(&m.data).unwrap())
        .find(|l| l.name == GROUP_NAME)
        .unwrap();
    let group = ObjectHeader::parse(&bytes, link.address as usize).unwrap();
    let attr = group
        .messages_of(MessageType::Attribute)
        .map(|m| AttributeMessage::parse(&m.data).unwrap())
        .find(|a| a.name == CONTENT_ATTR)
        .unwrap();

    let size = CONTENT.len() as u32 + 1;
    assert_eq!(
        attr.datatype,
        Datatype::FixedString {
            size,
            padding: StringPadding::NullTerm,
        }
    );
    let mut expected = CONTENT.as_bytes().to_vec();
    expected.push(0);
    assert_eq!(attr.data, expected);
}

#[test]
fn check_solution_accepts_written_file() {
    let (_dir, file) = written();
    check_solution(&file).unwrap();
}

#[test]
fn rewriting_is_byte_identical() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(SOLUTION_FILE);
    write_solution(&path).unwrap();
    let first = std::fs::read(&path).unwrap();
    write_solution(&path).unwrap();
    assert_eq!(std::fs::read(&path).unwrap(), first);
}

#[test]
fn checksums_verify_on_disk() {
    let (dir, file) = written();
    let bytes = std::fs::read(dir.path().join(SOLUTION_FILE)).unwrap();
    assert_eq!(file.superblock().eof_address, bytes.len() as u64);
    assert_eq!(file.superblock().version, 2);
}
