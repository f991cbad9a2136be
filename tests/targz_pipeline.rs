//! End-to-end directory packing and extraction.

use std::fs;
use std::io::Write;
use std::path::Path;

use oxtar::{
    compress_directory_targz, expand_directory_targz, expand_directory_targz_from_reader,
    CompressionLevel, EngineError, ExpandOptions, GzipWriter, TypeFlag, UstarMember, UstarWriter,
};

fn fixture_path() -> std::path::PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/data/test.tar.gz")
}

/// Builds an in-memory `.tar.gz` from `(member, payload)` pairs.
fn targz_of(members: &[(UstarMember, &[u8])]) -> Vec<u8> {
    let gzip = GzipWriter::new(Vec::new(), CompressionLevel::Default);
    let mut archive = UstarWriter::new(gzip);
    for (member, payload) in members {
        archive.write_member(member, payload).expect("write member");
    }
    archive.finish().expect("finish archive");
    archive.into_inner().finish().expect("finish gzip")
}

fn member(name: &str, typeflag: TypeFlag, size: u64) -> UstarMember {
    let mut member = UstarMember::default();
    member.set_filename(name).expect("set filename");
    member.typeflag = typeflag;
    member.size = size;
    member
}

#[test]
fn pack_then_extract_reproduces_the_tree() {
    let source = tempfile::tempdir().expect("source dir");
    fs::write(source.path().join("a.txt"), b"alpha").expect("write a");
    fs::create_dir(source.path().join("nested")).expect("mkdir");
    fs::write(source.path().join("nested/b.txt"), b"beta").expect("write b");
    let big: Vec<u8> = b"0123456789".repeat(60_000);
    fs::write(source.path().join("nested/big.bin"), &big).expect("write big");

    let work = tempfile::tempdir().expect("work dir");
    let archive = work.path().join("tree.tar.gz");
    compress_directory_targz(source.path(), &archive).expect("pack");

    let dest = tempfile::tempdir().expect("dest dir");
    let options = ExpandOptions::new(dest.path());
    expand_directory_targz(&options, &archive).expect("extract");

    assert_eq!(fs::read(dest.path().join("a.txt")).expect("a"), b"alpha");
    assert!(dest.path().join("nested").is_dir());
    assert_eq!(
        fs::read(dest.path().join("nested/b.txt")).expect("b"),
        b"beta"
    );
    assert_eq!(
        fs::read(dest.path().join("nested/big.bin")).expect("big"),
        big
    );
}

#[cfg(unix)]
#[test]
fn pack_then_extract_restores_modes_and_symlinks() {
    use std::os::unix::fs::PermissionsExt;

    let source = tempfile::tempdir().expect("source dir");
    let script = source.path().join("run.sh");
    fs::write(&script, b"#!/bin/sh\n").expect("write script");
    fs::set_permissions(&script, fs::Permissions::from_mode(0o750)).expect("chmod");
    std::os::unix::fs::symlink("run.sh", source.path().join("alias")).expect("symlink");

    let work = tempfile::tempdir().expect("work dir");
    let archive = work.path().join("tree.tar.gz");
    compress_directory_targz(source.path(), &archive).expect("pack");

    let dest = tempfile::tempdir().expect("dest dir");
    expand_directory_targz(&ExpandOptions::new(dest.path()), &archive).expect("extract");

    let mode = fs::metadata(dest.path().join("run.sh"))
        .expect("metadata")
        .permissions()
        .mode();
    assert_eq!(mode & 0o7777, 0o750);

    let link = dest.path().join("alias");
    assert!(fs::symlink_metadata(&link).expect("lstat").is_symlink());
    assert_eq!(
        fs::read_link(&link).expect("read link"),
        Path::new("run.sh")
    );
}

#[test]
fn fixture_archive_expands_to_the_known_tree() {
    let dest = tempfile::tempdir().expect("dest dir");
    let options = ExpandOptions::new(dest.path());
    expand_directory_targz(&options, &fixture_path()).expect("extract fixture");

    assert!(dest.path().join("01-test.txt").is_file());
    assert!(dest.path().join("02-test.txt").is_file());
    assert!(dest.path().join("subdir").is_dir());
    assert!(dest.path().join("subdir/thing.txt").is_file());
    assert_eq!(
        fs::read(dest.path().join("subdir/thing.txt")).expect("read"),
        &b"I'm just another file, but in a subdirectory!\n\n- The Sign Painter"[..]
    );
    assert_eq!(fs::read_dir(dest.path()).expect("list").count(), 3);
}

#[test]
fn member_escaping_the_destination_is_rejected() {
    let encoded = targz_of(&[(member("../evil", TypeFlag::Regular, 4), &b"oops"[..])]);

    let dest = tempfile::tempdir().expect("dest dir");
    let options = ExpandOptions::new(dest.path()).input_name("evil.tar.gz");
    let error = expand_directory_targz_from_reader(&options, &encoded[..])
        .expect_err("escape must be rejected");
    assert!(matches!(error, EngineError::UnsafePath { .. }));
    assert!(error.to_string().contains("evil.tar.gz"));
    assert_eq!(
        fs::read_dir(dest.path()).expect("list").count(),
        0,
        "nothing may be written for an unsafe archive"
    );
}

#[test]
fn sneaky_traversal_through_a_subdirectory_is_rejected() {
    let encoded = targz_of(&[(
        member("ok/../../evil", TypeFlag::Regular, 4),
        &b"oops"[..],
    )]);

    let dest = tempfile::tempdir().expect("dest dir");
    let error =
        expand_directory_targz_from_reader(&ExpandOptions::new(dest.path()), &encoded[..])
            .expect_err("escape must be rejected");
    assert!(matches!(error, EngineError::UnsafePath { .. }));
    assert_eq!(fs::read_dir(dest.path()).expect("list").count(), 0);
}

#[cfg(unix)]
#[test]
fn absolute_member_paths_are_rejected() {
    let encoded = targz_of(&[(member("/etc/passwd", TypeFlag::Regular, 3), &b"pwn"[..])]);

    let dest = tempfile::tempdir().expect("dest dir");
    let error =
        expand_directory_targz_from_reader(&ExpandOptions::new(dest.path()), &encoded[..])
            .expect_err("absolute path must be rejected");
    assert!(matches!(error, EngineError::UnsafePath { .. }));
}

#[test]
fn names_that_normalise_to_nothing_are_rejected() {
    let encoded = targz_of(&[(member("./.", TypeFlag::Directory, 0), &b""[..])]);

    let dest = tempfile::tempdir().expect("dest dir");
    let error =
        expand_directory_targz_from_reader(&ExpandOptions::new(dest.path()), &encoded[..])
            .expect_err("empty name must be rejected");
    assert!(matches!(error, EngineError::EmptyMemberName { .. }));
}

#[test]
fn strip_components_drops_leading_elements_and_skips_consumed_members() {
    let encoded = targz_of(&[
        (member("top", TypeFlag::Directory, 0), &b""[..]),
        (member("top/inner.txt", TypeFlag::Regular, 5), &b"hello"[..]),
    ]);

    let dest = tempfile::tempdir().expect("dest dir");
    let options = ExpandOptions::new(dest.path()).strip_components(1);
    expand_directory_targz_from_reader(&options, &encoded[..]).expect("extract");

    // "top" itself is consumed entirely and skipped; the file lands at the
    // destination root.
    assert!(!dest.path().join("top").exists());
    assert_eq!(
        fs::read(dest.path().join("inner.txt")).expect("read"),
        b"hello"
    );
}

#[test]
fn pax_records_are_recognised_and_skipped() {
    let encoded = targz_of(&[
        (
            member("pax-metadata", TypeFlag::PaxExtended, 19),
            &b"19 path=ignored\x0a\x00\x00\x00"[..19],
        ),
        (member("real.txt", TypeFlag::Regular, 4), &b"data"[..]),
    ]);

    let dest = tempfile::tempdir().expect("dest dir");
    expand_directory_targz_from_reader(&ExpandOptions::new(dest.path()), &encoded[..])
        .expect("extract");

    assert!(!dest.path().join("pax-metadata").exists());
    assert_eq!(fs::read(dest.path().join("real.txt")).expect("read"), b"data");
}

#[test]
fn unknown_member_types_are_unsupported() {
    let mut odd = member("strange", TypeFlag::Other(b'Z'), 0);
    odd.mode = 0o644;
    let encoded = targz_of(&[(odd, &b""[..])]);

    let dest = tempfile::tempdir().expect("dest dir");
    let error =
        expand_directory_targz_from_reader(&ExpandOptions::new(dest.path()), &encoded[..])
            .expect_err("unknown type must be rejected");
    assert!(matches!(
        error,
        EngineError::UnsupportedMemberType { type_flag: 'Z', .. }
    ));
}

#[cfg(unix)]
#[test]
fn hard_link_members_are_recreated() {
    let dest = tempfile::tempdir().expect("dest dir");

    // The link target is stored as an absolute path so the link resolves
    // regardless of the process working directory.
    let target_path = dest.path().join("original.txt");
    let mut link = UstarMember::default();
    link.set_filename("copy.txt").expect("filename");
    link.set_linkname(&target_path.to_string_lossy())
        .expect("linkname");
    link.typeflag = TypeFlag::HardLink;

    let encoded = targz_of(&[
        (member("original.txt", TypeFlag::Regular, 8), &b"original"[..]),
        (link, &b""[..]),
    ]);

    expand_directory_targz_from_reader(&ExpandOptions::new(dest.path()), &encoded[..])
        .expect("extract");

    assert_eq!(fs::read(dest.path().join("copy.txt")).expect("read"), b"original");
}

#[test]
fn extraction_from_a_plain_writer_stream_matches_the_file_path() {
    // The reader-based entry point must behave exactly like the file-based
    // one; drive it with the fixture bytes.
    let bytes = fs::read(fixture_path()).expect("read fixture");
    let dest = tempfile::tempdir().expect("dest dir");
    let options = ExpandOptions::new(dest.path()).input_name("test.tar.gz");
    expand_directory_targz_from_reader(&options, &bytes[..]).expect("extract");
    assert!(dest.path().join("subdir/thing.txt").is_file());
}

#[test]
fn corrupted_archives_abort_extraction() {
    let mut bytes = fs::read(fixture_path()).expect("read fixture");
    let mid = bytes.len() / 2;
    bytes[mid] ^= 0xFF;

    let dest = tempfile::tempdir().expect("dest dir");
    let result =
        expand_directory_targz_from_reader(&ExpandOptions::new(dest.path()), &bytes[..]);
    assert!(result.is_err());
}

#[test]
fn writer_flush_is_usable_mid_stream() {
    // GzipWriter::flush must keep the stream decodable without ending it.
    let mut writer = GzipWriter::new(Vec::new(), CompressionLevel::Default);
    writer.write_all(b"first").expect("write");
    writer.flush().expect("flush");
    writer.write_all(b" second").expect("write");
    let encoded = writer.finish().expect("finish");

    let mut decoded = Vec::new();
    oxtar::decompress_gzip(&mut decoded, &encoded).expect("decompress");
    assert_eq!(decoded, b"first second");
}
