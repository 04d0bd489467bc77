//! Property tests for identity normalization.

use proptest::prelude::*;
use repokey::identity::Identity;
use test_strategy::proptest;

#[proptest]
fn normalization_is_deterministic(#[strategy(r"[a-zA-Z0-9/._-]{0,64}")] path: String) {
    let first = Identity::from_repo_path(&path);
    let second = Identity::from_repo_path(&path);
    prop_assert_eq!(first, second);
}

#[proptest]
fn normalization_is_idempotent(#[strategy(r"[a-zA-Z0-9/._-]{0,64}")] path: String) {
    let once = Identity::from_repo_path(&path);
    let twice = Identity::from_repo_path(once.as_str());
    prop_assert_eq!(&once, &twice);
}

#[proptest]
fn identities_contain_no_separators(#[strategy(r"[a-zA-Z0-9/._-]{0,64}")] path: String) {
    let identity = Identity::from_repo_path(&path);
    prop_assert!(!identity.as_str().contains('/'));
}

#[test]
fn normalizes_documented_examples() {
    assert_eq!(Identity::from_repo_path("/a/b/c").as_str(), "a_b_c");
    assert_eq!(Identity::from_repo_path("a/b").as_str(), "a_b");
    assert_eq!(Identity::from_repo_path("///x").as_str(), "x");
}
