//! Behaviour every SegmentRepository backend must share
//!
//! Each function takes a fresh, empty repository. The `repository_contract!`
//! macro expands them into one `#[tokio::test]` per case for a given backend.

#![allow(dead_code)]

use segline_domain::{Segment, SegmentError, SegmentId, SegmentRepository, UserId};

fn slugs(segments: &[Segment]) -> Vec<&str> {
    segments.iter().map(Segment::slug).collect()
}

async fn seed<R: SegmentRepository>(repo: &R, raw: &[&str]) -> Vec<Segment> {
    let mut created = Vec::new();
    for slug in raw {
        created.push(repo.create(Segment::new(*slug)).await.expect("seed segment"));
    }
    created
}

pub async fn create_assigns_first_id<R: SegmentRepository>(repo: R) {
    let created = repo.create(Segment::new("AVITO_DISCOUNT_30")).await.unwrap();
    assert_eq!(created.id(), Some(SegmentId::new(1)));

    let found = repo.find_by_slug("AVITO_DISCOUNT_30").await.unwrap();
    assert_eq!(found.id(), Some(SegmentId::new(1)));
    assert_eq!(found.slug(), "AVITO_DISCOUNT_30");
}

pub async fn create_normalizes_slug<R: SegmentRepository>(repo: R) {
    let created = repo.create(Segment::new("  avito  discount 30 ")).await.unwrap();
    assert_eq!(created.slug(), "AVITO_DISCOUNT_30");
    assert!(repo.find_by_slug("AVITO_DISCOUNT_30").await.is_ok());
}

pub async fn create_rejects_invalid_slug<R: SegmentRepository>(repo: R) {
    for raw in ["", "   ", "?#@*&%!"] {
        let err = repo.create(Segment::new(raw)).await.unwrap_err();
        assert!(matches!(err, SegmentError::Validation { .. }), "slug {raw:?}");
    }

    let err = repo.create(Segment::new("F".repeat(51))).await.unwrap_err();
    assert!(matches!(err, SegmentError::Validation { .. }));
}

pub async fn create_rejects_duplicate_normalized_slug<R: SegmentRepository>(repo: R) {
    repo.create(Segment::new("avito discount 30")).await.unwrap();

    let err = repo.create(Segment::new("AVITO_DISCOUNT_30")).await.unwrap_err();
    assert!(matches!(err, SegmentError::Conflict(_)));
}

pub async fn find_by_slug_is_exact<R: SegmentRepository>(repo: R) {
    seed(&repo, &["AVITO_DISCOUNT_30"]).await;

    let err = repo.find_by_slug("avito_discount_30").await.unwrap_err();
    assert!(matches!(err, SegmentError::NotFound(_)));
    let err = repo.find_by_slug("AVITO_DISCOUNT_50").await.unwrap_err();
    assert!(matches!(err, SegmentError::NotFound(_)));
}

pub async fn delete_cascades_memberships<R: SegmentRepository>(repo: R) {
    let user = UserId::new(1);
    let created = seed(&repo, &["AVITO_DISCOUNT_30", "AVITO_DISCOUNT_50"]).await;
    repo.add_user_to_segments(user, &created[..1]).await.unwrap();
    repo.add_user_to_segments(UserId::new(2), &created).await.unwrap();

    repo.delete(&created[0]).await.unwrap();

    let err = repo.find_by_user(user).await.unwrap_err();
    assert!(matches!(err, SegmentError::NotFound(_)));
    assert_eq!(
        slugs(&repo.find_by_user(UserId::new(2)).await.unwrap()),
        vec!["AVITO_DISCOUNT_50"]
    );
    assert!(repo.find_by_slug("AVITO_DISCOUNT_30").await.is_err());
}

pub async fn delete_unknown_segment_fails<R: SegmentRepository>(repo: R) {
    let err = repo
        .delete(&Segment::from_parts(SegmentId::new(3), "AVITO_VOICE_MESSAGES"))
        .await
        .unwrap_err();
    assert!(matches!(err, SegmentError::NotFound(_)));

    let err = repo.delete(&Segment::new("NEVER_SAVED")).await.unwrap_err();
    assert!(matches!(err, SegmentError::NotFound(_)));
}

pub async fn assign_then_unassign<R: SegmentRepository>(repo: R) {
    let user = UserId::new(1);
    let created = seed(&repo, &["AVITO_DISCOUNT_30", "AVITO_DISCOUNT_50"]).await;

    repo.add_user_to_segments(user, &created).await.unwrap();
    let mut found = slugs(&repo.find_by_user(user).await.unwrap())
        .into_iter()
        .map(str::to_string)
        .collect::<Vec<_>>();
    found.sort();
    assert_eq!(found, vec!["AVITO_DISCOUNT_30", "AVITO_DISCOUNT_50"]);

    repo.delete_user_from_segments(user, &created[..1]).await.unwrap();
    assert_eq!(
        slugs(&repo.find_by_user(user).await.unwrap()),
        vec!["AVITO_DISCOUNT_50"]
    );
}

pub async fn assign_unknown_segment_keeps_nothing<R: SegmentRepository>(repo: R) {
    let user = UserId::new(1);
    let mut segments = seed(&repo, &["AVITO_DISCOUNT_30"]).await;
    segments.push(Segment::new("AVITO_DISCOUNT_50"));

    let err = repo.add_user_to_segments(user, &segments).await.unwrap_err();
    assert!(matches!(err, SegmentError::NotFound(_)));

    let err = repo.find_by_user(user).await.unwrap_err();
    assert!(matches!(err, SegmentError::NotFound(_)));
}

pub async fn assign_twice_keeps_one_membership<R: SegmentRepository>(repo: R) {
    let user = UserId::new(1);
    let created = seed(&repo, &["X"]).await;

    repo.add_user_to_segments(user, &created).await.unwrap();
    repo.add_user_to_segments(user, &created).await.unwrap();

    assert_eq!(repo.find_by_user(user).await.unwrap().len(), 1);
}

pub async fn empty_lists_are_noops<R: SegmentRepository>(repo: R) {
    let user = UserId::new(1);
    repo.add_user_to_segments(user, &[]).await.unwrap();
    repo.delete_user_from_segments(user, &[]).await.unwrap();
    repo.apply_user_segments(user, &[], &[]).await.unwrap();
}

pub async fn unassign_without_membership_is_noop<R: SegmentRepository>(repo: R) {
    let created = seed(&repo, &["X"]).await;
    repo.delete_user_from_segments(UserId::new(7), &created)
        .await
        .unwrap();
}

pub async fn find_by_unknown_user_fails<R: SegmentRepository>(repo: R) {
    seed(&repo, &["X"]).await;
    let err = repo.find_by_user(UserId::new(42)).await.unwrap_err();
    assert!(matches!(err, SegmentError::NotFound(_)));
}

pub async fn find_by_user_is_ordered_by_id<R: SegmentRepository>(repo: R) {
    let user = UserId::new(1);
    let created = seed(&repo, &["C", "A", "B"]).await;
    let reversed: Vec<Segment> = created.iter().rev().cloned().collect();

    repo.add_user_to_segments(user, &reversed).await.unwrap();

    assert_eq!(slugs(&repo.find_by_user(user).await.unwrap()), vec!["C", "A", "B"]);
}

pub async fn apply_removes_before_adding<R: SegmentRepository>(repo: R) {
    let user = UserId::new(1);
    let created = seed(&repo, &["X", "Y"]).await;
    repo.add_user_to_segments(user, &created[1..]).await.unwrap();

    repo.apply_user_segments(user, &created, &created[..1])
        .await
        .unwrap();

    assert_eq!(slugs(&repo.find_by_user(user).await.unwrap()), vec!["X"]);
}

pub async fn apply_with_unknown_addition_changes_nothing<R: SegmentRepository>(repo: R) {
    let user = UserId::new(1);
    let created = seed(&repo, &["X", "Y"]).await;
    repo.add_user_to_segments(user, &created[..1]).await.unwrap();

    let ghost = Segment::from_parts(SegmentId::new(99), "GHOST");
    let err = repo
        .apply_user_segments(user, &created[..1], &[created[1].clone(), ghost])
        .await
        .unwrap_err();

    assert!(matches!(err, SegmentError::NotFound(_)));
    assert_eq!(slugs(&repo.find_by_user(user).await.unwrap()), vec!["X"]);
}

/// Expand the shared suite into `#[tokio::test]` cases for one backend
macro_rules! repository_contract {
    (@cases $make:expr; $($case:ident),+ $(,)?) => {
        $(
            #[tokio::test]
            async fn $case() {
                crate::common::$case($make).await;
            }
        )+
    };
    ($make:expr) => {
        repository_contract!(@cases $make;
            create_assigns_first_id,
            create_normalizes_slug,
            create_rejects_invalid_slug,
            create_rejects_duplicate_normalized_slug,
            find_by_slug_is_exact,
            delete_cascades_memberships,
            delete_unknown_segment_fails,
            assign_then_unassign,
            assign_unknown_segment_keeps_nothing,
            assign_twice_keeps_one_membership,
            empty_lists_are_noops,
            unassign_without_membership_is_noop,
            find_by_unknown_user_fails,
            find_by_user_is_ordered_by_id,
            apply_removes_before_adding,
            apply_with_unknown_addition_changes_nothing,
        );
    };
}
