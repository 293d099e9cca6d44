//! Integration tests for building and querying record indexes

use std::io::Write;

use proptest::prelude::*;
use seqindex::index::{scan_lookup, DuplicateKeys, IndexOptions, RecordIndex};
use seqindex::io::{Format, Record};
use seqindex::IndexError;
use tempfile::TempDir;

fn write_file(dir: &TempDir, name: &str, data: &[u8]) -> std::path::PathBuf {
    let path = dir.path().join(name);
    let mut f = std::fs::File::create(&path).unwrap();
    f.write_all(data).unwrap();
    path
}

fn fastq_of(records: &[(String, String)]) -> Vec<u8> {
    let mut out = Vec::new();
    for (id, seq) in records {
        let rec = Record {
            id: id.clone(),
            desc: None,
            seq: seq.as_bytes().to_vec(),
            qual: Some(vec![b'F'; seq.len()]),
        };
        rec.write_to(&mut out, Format::Fastq).unwrap();
    }
    out
}

#[test]
fn three_records_lookup_and_not_found() {
    let dir = TempDir::new().unwrap();
    let path = write_file(
        &dir,
        "reads.fq",
        b"@r1\nAAAA\n+\nIIII\n@r2 second read\nCCGG\n+\n#+#+\n@r3\nTT\n+\nII\n",
    );

    let mut idx = RecordIndex::build(&path, Format::Fastq).unwrap();
    assert_eq!(idx.span("r1").map(|s| s.offset), Some(0));
    assert_eq!(idx.span("r2").map(|s| s.offset), Some(16));
    assert_eq!(idx.span("r3").map(|s| s.offset), Some(44));

    let r2 = idx.lookup("r2").unwrap();
    assert_eq!(r2.id, "r2");
    assert_eq!(r2.desc.as_deref(), Some("second read"));
    assert_eq!(r2.seq, b"CCGG");
    assert_eq!(r2.qual.as_deref(), Some(&b"#+#+"[..]));

    match idx.lookup("r4") {
        Err(IndexError::KeyNotFound { key }) => assert_eq!(key, "r4"),
        other => panic!("expected KeyNotFound, got {:?}", other),
    }
}

#[test]
fn malformed_second_record_yields_no_index() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "bad.fq", b"@r1\nAC\n+\nII\n@r2\nGG\nII\n");
    let result = RecordIndex::build(&path, Format::Fastq);
    assert!(matches!(result, Err(IndexError::Format { .. })));
}

#[test]
fn duplicate_policies() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "dup.fa", b">x\nAAA\n>y\nCCC\n>x\nGGG\n");

    assert!(matches!(
        RecordIndex::build(&path, Format::Fasta),
        Err(IndexError::DuplicateKey { .. })
    ));

    let opts = IndexOptions { duplicates: DuplicateKeys::KeepLast };
    let mut idx = RecordIndex::build_with(&path, Format::Fasta, &opts).unwrap();
    assert_eq!(idx.lookup("x").unwrap().seq, b"GGG");
    assert_eq!(idx.lookup("y").unwrap().seq, b"CCC");
}

#[test]
fn wrong_format_is_reported() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "reads.fa", b">chr1\nACGT\n");
    assert!(matches!(RecordIndex::build(&path, Format::Fastq), Err(IndexError::Format { .. })));
}

#[test]
fn indexed_and_scanned_lookup_agree() {
    let dir = TempDir::new().unwrap();
    let records: Vec<(String, String)> = (0..200)
        .map(|i| (format!("read_{}", i), "ACGT".repeat(1 + i % 7)))
        .collect();
    let path = write_file(&dir, "many.fq", &fastq_of(&records));

    let mut idx = RecordIndex::build(&path, Format::Fastq).unwrap();
    assert_eq!(idx.len(), 200);
    for (id, _) in records.iter().step_by(17) {
        let indexed = idx.lookup(id).unwrap();
        let scanned = scan_lookup(&path, Format::Fastq, id).unwrap().unwrap();
        assert_eq!(indexed, scanned);
    }
    assert!(scan_lookup(&path, Format::Fastq, "read_999").unwrap().is_none());
}

#[test]
fn batch_lookup_matches_single_lookups() {
    let dir = TempDir::new().unwrap();
    let records: Vec<(String, String)> = (0..50).map(|i| (format!("q{}", i), "GATTACA".to_string())).collect();
    let path = write_file(&dir, "batch.fq", &fastq_of(&records));

    let mut idx = RecordIndex::build(&path, Format::Fastq).unwrap();
    let keys: Vec<String> = (0..50).rev().map(|i| format!("q{}", i)).collect();
    let batch = idx.lookup_many(&keys, 4).unwrap();
    for (key, rec) in keys.iter().zip(&batch) {
        assert_eq!(&rec.id, key);
        assert_eq!(rec, &idx.lookup(key).unwrap());
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Every indexed key returns its own record, never a neighbour's
    #[test]
    fn lookup_never_aliases(
        seqs in prop::collection::vec("[ACGTN]{0,60}", 1..40),
    ) {
        let dir = TempDir::new().unwrap();
        let records: Vec<(String, String)> = seqs
            .iter()
            .enumerate()
            .map(|(i, s)| (format!("id{}", i), s.clone()))
            .collect();
        let path = write_file(&dir, "p.fq", &fastq_of(&records));

        let mut idx = RecordIndex::build(&path, Format::Fastq).unwrap();
        prop_assert_eq!(idx.len(), records.len());
        for (id, seq) in &records {
            let rec = idx.lookup(id).unwrap();
            prop_assert_eq!(&rec.id, id);
            prop_assert_eq!(&rec.seq, seq.as_bytes());
        }
        prop_assert!(idx.lookup("absent").unwrap_err().is_not_found());
    }

    /// Two builds over the same file answer identically
    #[test]
    fn build_is_idempotent(
        seqs in prop::collection::vec("[ACGT]{1,30}", 1..25),
        wrap in 5usize..20,
    ) {
        let dir = TempDir::new().unwrap();
        let mut data = Vec::new();
        for (i, s) in seqs.iter().enumerate() {
            data.extend_from_slice(format!(">contig{} len={}\n", i, s.len()).as_bytes());
            for chunk in s.as_bytes().chunks(wrap) {
                data.extend_from_slice(chunk);
                data.push(b'\n');
            }
        }
        let path = write_file(&dir, "p.fa", &data);

        let mut a = RecordIndex::build(&path, Format::Fasta).unwrap();
        let mut b = RecordIndex::build(&path, Format::Fasta).unwrap();
        let keys_a: Vec<String> = a.keys().map(str::to_string).collect();
        let keys_b: Vec<String> = b.keys().map(str::to_string).collect();
        prop_assert_eq!(&keys_a, &keys_b);
        for (key, s) in keys_a.iter().zip(&seqs) {
            prop_assert_eq!(a.span(key), b.span(key));
            let ra = a.lookup(key).unwrap();
            prop_assert_eq!(&ra, &b.lookup(key).unwrap());
            prop_assert_eq!(&ra.seq, s.as_bytes());
        }
    }
}
