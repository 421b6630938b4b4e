//! Tests for the in-memory store.

use super::*;
use crate::domain::{EventDraft, EventOwner, ResourceDraft, Username};
use crate::test_support::utc;
use rstest::{fixture, rstest};

fn event(start: (u32, u32), end: (u32, u32)) -> Event {
    EventDraft::try_new(
        "Workshop",
        utc(2024, 1, 10, start.0, start.1),
        utc(2024, 1, 10, end.0, end.1),
        None,
        None,
    )
    .expect("valid draft")
    .into_event(EventOwner::Unowned, utc(2024, 1, 1, 0, 0))
}

fn room(name: &str) -> Resource {
    ResourceDraft::try_new(name, "room")
        .expect("valid draft")
        .into_resource(utc(2024, 1, 1, 0, 0))
}

#[fixture]
fn store() -> InMemoryStore {
    InMemoryStore::new()
}

async fn seed(store: &InMemoryStore, events: &[&Event], resources: &[&Resource]) {
    for event in events {
        EventRepository::insert(store, event).await.expect("event stored");
    }
    for resource in resources {
        ResourceRepository::insert(store, resource)
            .await
            .expect("resource stored");
    }
}

async fn book(
    store: &InMemoryStore,
    event: &Event,
    resource: &Resource,
) -> Result<Allocation, AllocationRepositoryError> {
    let allocation = Allocation::new(event.id, resource.id, utc(2024, 1, 2, 0, 0));
    store.insert_if_free(&allocation, &event.span).await?;
    Ok(allocation)
}

#[rstest]
#[tokio::test]
async fn adjacent_intervals_both_book(store: InMemoryStore) {
    let first = event((9, 0), (10, 0));
    let second = event((10, 0), (11, 0));
    let resource = room("Room 1");
    seed(&store, &[&first, &second], &[&resource]).await;

    book(&store, &first, &resource).await.expect("first books");
    book(&store, &second, &resource).await.expect("adjacent books");

    let bookings = store
        .bookings_for_resource(&resource.id)
        .await
        .expect("bookings listed");
    assert_eq!(bookings.len(), 2);
}

#[rstest]
#[tokio::test]
async fn overlapping_interval_is_rejected(store: InMemoryStore) {
    let first = event((9, 0), (10, 30));
    let second = event((10, 0), (11, 0));
    let resource = room("Room 1");
    seed(&store, &[&first, &second], &[&resource]).await;

    let kept = book(&store, &first, &resource).await.expect("first books");
    let err = book(&store, &second, &resource)
        .await
        .expect_err("overlap rejected");

    assert_eq!(err, AllocationRepositoryError::overlap(kept.id));
    let bookings = store
        .bookings_for_resource(&resource.id)
        .await
        .expect("bookings listed");
    assert_eq!(bookings.len(), 1);
}

#[rstest]
#[tokio::test]
async fn overlap_on_another_resource_is_allowed(store: InMemoryStore) {
    let first = event((9, 0), (11, 0));
    let second = event((10, 0), (12, 0));
    let (one, two) = (room("Room 1"), room("Room 2"));
    seed(&store, &[&first, &second], &[&one, &two]).await;

    book(&store, &first, &one).await.expect("room 1 books");
    book(&store, &second, &two).await.expect("room 2 books");
}

#[rstest]
#[tokio::test]
async fn repeat_pair_is_a_duplicate(store: InMemoryStore) {
    let meeting = event((9, 0), (10, 0));
    let resource = room("Room 1");
    seed(&store, &[&meeting], &[&resource]).await;

    book(&store, &meeting, &resource).await.expect("first books");
    let err = book(&store, &meeting, &resource)
        .await
        .expect_err("second is refused");

    assert_eq!(err, AllocationRepositoryError::duplicate());
}

#[rstest]
#[tokio::test]
async fn missing_references_are_reported(store: InMemoryStore) {
    let meeting = event((9, 0), (10, 0));
    let resource = room("Room 1");
    seed(&store, &[&meeting], &[]).await;

    let err = book(&store, &meeting, &resource)
        .await
        .expect_err("resource missing");

    assert_eq!(err, AllocationRepositoryError::missing_reference());
}

#[rstest]
#[tokio::test]
async fn deleting_an_event_cascades_to_its_rows(store: InMemoryStore) {
    let a = event((9, 0), (10, 0));
    let b = event((11, 0), (12, 0));
    let (one, two) = (room("Room 1"), room("Room 2"));
    seed(&store, &[&a, &b], &[&one, &two]).await;
    book(&store, &a, &one).await.expect("a/1");
    book(&store, &a, &two).await.expect("a/2");
    let survivor = book(&store, &b, &one).await.expect("b/1");
    let attendee = UserId::random();
    store
        .add_attendee(&a.id, &attendee, utc(2024, 1, 3, 0, 0))
        .await
        .expect("attendee added");

    assert!(store.delete_with_dependents(&a.id).await.expect("delete runs"));

    let remaining = store.all_bookings().await.expect("bookings listed");
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].allocation_id, survivor.id);
    let stats = store
        .stats(utc(2024, 1, 1, 0, 0), 5)
        .await
        .expect("stats read");
    assert_eq!(stats.total_registrations, 0);
    assert!(!store.delete_with_dependents(&a.id).await.expect("second delete"));
}

#[rstest]
#[tokio::test]
async fn deleting_a_resource_removes_its_allocations(store: InMemoryStore) {
    let meeting = event((9, 0), (10, 0));
    let (one, two) = (room("Room 1"), room("Room 2"));
    seed(&store, &[&meeting], &[&one, &two]).await;
    book(&store, &meeting, &one).await.expect("meeting/1");
    book(&store, &meeting, &two).await.expect("meeting/2");

    assert!(store.delete_with_allocations(&one.id).await.expect("delete runs"));

    let remaining = store.all_bookings().await.expect("bookings listed");
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].resource_id, two.id);
}

#[rstest]
#[tokio::test]
async fn attendee_registration_is_idempotent(store: InMemoryStore) {
    let meeting = event((9, 0), (10, 0));
    seed(&store, &[&meeting], &[]).await;
    let user = UserId::random();

    for _ in 0..2 {
        store
            .add_attendee(&meeting.id, &user, utc(2024, 1, 3, 0, 0))
            .await
            .expect("registration succeeds");
    }

    let stats = store
        .stats(utc(2024, 1, 1, 0, 0), 5)
        .await
        .expect("stats read");
    assert_eq!(stats.total_registrations, 1);
}

#[rstest]
#[tokio::test]
async fn usernames_and_emails_are_unique(store: InMemoryStore) {
    let user = |name: &str, email: Option<&str>| User {
        id: UserId::random(),
        username: Username::new(name).expect("valid username"),
        email: email.map(|raw| crate::domain::Email::new(raw).expect("valid email")),
        is_admin: false,
        created_at: utc(2024, 1, 1, 0, 0),
    };
    let hash = PasswordHash::from_phc("$argon2id$stub");
    UserRepository::insert(&store, &user("ada", Some("ada@example.org")), &hash)
        .await
        .expect("first account");

    let same_name = UserRepository::insert(&store, &user("ada", None), &hash).await;
    let same_email =
        UserRepository::insert(&store, &user("grace", Some("ada@example.org")), &hash).await;

    assert_eq!(same_name, Err(UserRepositoryError::duplicate_username()));
    assert_eq!(same_email, Err(UserRepositoryError::duplicate_email()));
    assert!(store.email_exists("ada@example.org").await.expect("lookup"));
}

#[rstest]
#[tokio::test]
async fn clear_all_keeps_accounts(store: InMemoryStore) {
    let meeting = event((9, 0), (10, 0));
    let resource = room("Room 1");
    seed(&store, &[&meeting], &[&resource]).await;
    book(&store, &meeting, &resource).await.expect("booked");

    store.clear_all().await.expect("clear runs");

    assert!(EventRepository::list(&store).await.expect("events").is_empty());
    assert!(ResourceRepository::list(&store).await.expect("resources").is_empty());
    assert!(store.all_bookings().await.expect("bookings").is_empty());
}
