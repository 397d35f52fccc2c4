//! Tests for folio-model types.

use folio_model::{
    ByteSize, DocumentInfo, Entry, MetadataPatch, PreviewImage, Resolution, SortKey,
};

fn sample_info() -> DocumentInfo {
    DocumentInfo {
        page_count: 12,
        byte_size: ByteSize::new(1_363_149),
        preview: PreviewImage::from_png(vec![1, 2, 3]),
    }
}

#[test]
fn document_info_resolves_every_field() {
    let mut entry = Entry::admit("/in/chapter-1.pdf").expect("admit entry");
    let patch = MetadataPatch::from(sample_info());
    assert!(!patch.is_empty());

    assert!(entry.apply(&patch));
    assert!(entry.is_resolved());
    assert_eq!(entry.page_count.resolved(), Some(&12));
    assert_eq!(entry.size_key(), 1_363_149);
    assert_eq!(entry.byte_size.resolved().map(ToString::to_string).as_deref(), Some("1.3 MB"));
}

#[test]
fn patch_is_idempotent() {
    let mut once = Entry::admit("a.pdf").expect("admit entry");
    let patch = MetadataPatch::from(sample_info());
    once.apply(&patch);

    let mut twice = once.clone();
    assert!(!twice.apply(&patch));
    assert_eq!(once, twice);
}

#[test]
fn later_patch_wins_per_field() {
    let mut entry = Entry::admit("a.pdf").expect("admit entry");
    entry.apply(&MetadataPatch {
        page_count: Some(1),
        byte_size: Some(ByteSize::new(10)),
        preview: None,
    });
    entry.apply(&MetadataPatch {
        page_count: Some(2),
        ..MetadataPatch::default()
    });

    assert_eq!(entry.page_count, Resolution::Resolved(2));
    assert_eq!(entry.byte_size, Resolution::Resolved(ByteSize::new(10)));
    assert!(entry.preview.is_pending());
}

#[test]
fn unresolved_size_sorts_as_zero() {
    let entry = Entry::admit("a.pdf").expect("admit entry");
    assert_eq!(entry.size_key(), 0);
}

#[test]
fn every_admission_gets_a_new_id() {
    let a = Entry::admit("same.pdf").expect("admit entry");
    let b = Entry::admit("same.pdf").expect("admit entry");
    assert_ne!(a.id, b.id);
    assert_eq!(a.source, b.source);
}

#[test]
fn sort_key_serializes_lowercase() {
    let json = serde_json::to_string(&SortKey::Size).expect("serialize sort key");
    assert_eq!(json, "\"size\"");
    let parsed: SortKey = serde_json::from_str("\"name\"").expect("deserialize sort key");
    assert_eq!(parsed, SortKey::Name);
    assert_eq!(SortKey::all().len(), 3);
    assert_eq!(SortKey::default(), SortKey::Default);
}

#[test]
fn resolution_serializes_with_state_tag() {
    let pending: Resolution<u32> = Resolution::Pending;
    let resolved = Resolution::Resolved(7u32);
    assert_eq!(
        serde_json::to_string(&pending).expect("serialize"),
        r#"{"state":"pending"}"#
    );
    assert_eq!(
        serde_json::to_string(&resolved).expect("serialize"),
        r#"{"state":"resolved","value":7}"#
    );
}
