use manisum_core::codec::{decode_str, encode, read_manifest, write_manifest};
use manisum_core::{ErrorKind, Manifest};
use proptest::prelude::*;
use std::collections::BTreeMap;

fn manifest_strategy() -> impl Strategy<Value = BTreeMap<String, String>> {
    proptest::collection::btree_map("[a-zA-Z0-9_./-]{1,24}", "[0-9a-f]{1,64}", 0..32)
}

proptest! {
    #[test]
    fn decode_inverts_encode(entries in manifest_strategy()) {
        let m: Manifest = entries.clone().into_iter().collect();
        let text = encode(&m);
        let back = decode_str(&text).unwrap();
        prop_assert_eq!(&back, &m);
        prop_assert_eq!(encode(&back), text);
        prop_assert_eq!(back.len(), entries.len());
    }

    #[test]
    fn encoded_lines_are_sorted(entries in manifest_strategy()) {
        let m: Manifest = entries.into_iter().collect();
        let text = encode(&m);
        let keys: Vec<&str> = text.lines().map(|l| l.split('\t').next().unwrap()).collect();
        let mut sorted = keys.clone();
        sorted.sort();
        prop_assert_eq!(keys, sorted);
    }
}

#[test]
fn exact_bytes_for_two_entries() {
    let m: Manifest = [("b.txt", "222"), ("a.txt", "111")].into_iter().collect();
    assert_eq!(encode(&m), "a.txt\t111\nb.txt\t222\n");
}

#[test]
fn file_roundtrip_and_rewrite_shrinks() {
    let td = tempfile::tempdir().unwrap();
    let path = td.path().join("Manifest");
    let big: Manifest = (0..50).map(|i| (format!("f{i:03}.txt"), "ab".repeat(32))).collect();
    let n = write_manifest(&path, &big).unwrap();
    assert_eq!(n, std::fs::metadata(&path).unwrap().len());
    assert_eq!(read_manifest(&path).unwrap(), big);

    // A smaller manifest must not leave stale tail bytes behind.
    let small: Manifest = [("only.txt", "00")].into_iter().collect();
    write_manifest(&path, &small).unwrap();
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "only.txt\t00\n");
}

#[test]
fn read_errors_are_classified() {
    let td = tempfile::tempdir().unwrap();

    let missing = read_manifest(&td.path().join("nope")).unwrap_err();
    assert_eq!(missing.kind(), ErrorKind::ManifestUnreadable);

    let dir = read_manifest(td.path()).unwrap_err();
    assert_eq!(dir.kind(), ErrorKind::ManifestUnreadable);

    let bad = td.path().join("bad");
    std::fs::write(&bad, "a.txt\t111\nno separator here\n").unwrap();
    let err = read_manifest(&bad).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MalformedManifest);
    assert!(err.to_string().contains("line 2"), "{err}");
}
