use eventhub::models::{BookingInput, Event, EventInput};
use eventhub::repositories::{BookingRepository, EventRepository};
use eventhub::Error;
use sqlx::PgPool;
use uuid::Uuid;

async fn setup_test_event(pool: &PgPool, title: &str) -> Event {
    let input = EventInput {
        title: Some(title.to_string()),
        slug: None,
        description: Some("Hands-on sessions".to_string()),
        overview: Some("Learn by building".to_string()),
        image: Some("/images/event2.png".to_string()),
        venue: Some("Online".to_string()),
        location: Some("Remote".to_string()),
        date: Some("2025-11-07".to_string()),
        time: Some("18:30".to_string()),
        mode: Some("online".to_string()),
        audience: Some("Everyone".to_string()),
        agenda: Some(vec!["Intro".to_string()]),
        organizer: Some("Hack Club".to_string()),
        tags: Some(vec!["hackathon".to_string()]),
    };

    EventRepository::new(pool).save(None, &input).await.unwrap()
}

fn booking(event_id: Uuid, email: &str) -> BookingInput {
    BookingInput {
        event_id: Some(event_id),
        email: Some(email.to_string()),
    }
}

#[sqlx::test(migrations = "src/db/migrations")]
async fn test_booking_creation_normalizes_email(pool: PgPool) {
    let event = setup_test_event(&pool, "Hack Night").await;

    let repo = BookingRepository::new(&pool);
    let created = repo
        .save(None, &booking(event.id, "  Guest@Example.COM "))
        .await
        .unwrap();

    assert_eq!(created.event_id, event.id);
    assert_eq!(created.email, "guest@example.com");

    let fetched = repo.find_by_id(created.id).await.unwrap().unwrap();
    assert_eq!(fetched.email, "guest@example.com");
}

#[sqlx::test(migrations = "src/db/migrations")]
async fn test_booking_for_missing_event_is_rejected(pool: PgPool) {
    let missing = Uuid::new_v4();
    let repo = BookingRepository::new(&pool);

    let err = repo.save(None, &booking(missing, "a@b.co")).await.unwrap_err();
    assert!(matches!(err, Error::Reference(id) if id == missing));
    assert!(err.to_string().contains(&missing.to_string()));

    assert_eq!(repo.count_by_event(missing).await.unwrap(), 0);
}

#[sqlx::test(migrations = "src/db/migrations")]
async fn test_invalid_email_is_rejected(pool: PgPool) {
    let event = setup_test_event(&pool, "Design Jam").await;
    let repo = BookingRepository::new(&pool);

    match repo.save(None, &booking(event.id, "not-an-email")).await {
        Err(Error::Validation(err)) => assert_eq!(err.field, "email"),
        other => panic!("Expected validation error, got {:?}", other),
    }

    assert_eq!(repo.count_by_event(event.id).await.unwrap(), 0);
}

#[sqlx::test(migrations = "src/db/migrations")]
async fn test_reference_is_checked_before_email(pool: PgPool) {
    let repo = BookingRepository::new(&pool);
    let result = repo.save(None, &booking(Uuid::new_v4(), "broken")).await;

    assert!(matches!(result, Err(Error::Reference(_))));
}

#[sqlx::test(migrations = "src/db/migrations")]
async fn test_email_correction(pool: PgPool) {
    let event = setup_test_event(&pool, "Data Summit").await;
    let repo = BookingRepository::new(&pool);
    let created = repo.save(None, &booking(event.id, "old@example.com")).await.unwrap();

    let patch = BookingInput {
        event_id: None,
        email: Some("New@Example.com".to_string()),
    };
    let updated = repo.save(Some(created.id), &patch).await.unwrap();

    assert_eq!(updated.id, created.id);
    assert_eq!(updated.event_id, event.id);
    assert_eq!(updated.email, "new@example.com");
}

#[sqlx::test(migrations = "src/db/migrations")]
async fn test_moving_booking_to_missing_event_is_rejected(pool: PgPool) {
    let event = setup_test_event(&pool, "AI Day").await;
    let repo = BookingRepository::new(&pool);
    let created = repo.save(None, &booking(event.id, "me@example.com")).await.unwrap();

    let patch = BookingInput {
        event_id: Some(Uuid::new_v4()),
        email: None,
    };
    let result = repo.save(Some(created.id), &patch).await;
    assert!(matches!(result, Err(Error::Reference(_))));

    let unchanged = repo.find_by_id(created.id).await.unwrap().unwrap();
    assert_eq!(unchanged.event_id, event.id);
}

#[sqlx::test(migrations = "src/db/migrations")]
async fn test_missing_events_table_is_a_dependency_error(pool: PgPool) {
    sqlx::query("DROP TABLE events").execute(&pool).await.unwrap();

    let repo = BookingRepository::new(&pool);
    let result = repo.save(None, &booking(Uuid::new_v4(), "a@b.co")).await;

    match result {
        Err(Error::Dependency(message)) => assert!(message.starts_with("Event model not found")),
        other => panic!("Expected dependency error, got {:?}", other),
    }
}

#[sqlx::test(migrations = "src/db/migrations")]
async fn test_event_with_bookings_cannot_be_deleted(pool: PgPool) {
    let event = setup_test_event(&pool, "Sold Out Show").await;
    let bookings = BookingRepository::new(&pool);
    bookings.save(None, &booking(event.id, "fan@example.com")).await.unwrap();
    bookings.save(None, &booking(event.id, "friend@example.com")).await.unwrap();

    let events = EventRepository::new(&pool);
    match events.delete(event.id).await {
        Err(Error::Conflict { field, .. }) => assert_eq!(field, "bookings"),
        other => panic!("Expected conflict, got {:?}", other),
    }

    assert!(events.exists(event.id).await.unwrap());
    let listed = bookings.list_by_event(event.id).await.unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].email, "fan@example.com");
}
