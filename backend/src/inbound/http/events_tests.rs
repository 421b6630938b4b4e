//! Handler tests for the event endpoints over the in-memory store.

use actix_web::http::StatusCode;
use actix_web::test;
use serde_json::{Value, json};

use super::*;
use crate::inbound::http::auth::AuthResponse;
use crate::inbound::http::test_utils::{
    allocate_request, api_app, create_event_request, create_resource_request, memory_state,
    register_request, with_bearer,
};
use crate::domain::Resource;
use crate::test_support::MutableClock;

const START: &str = "2024-01-10T09:00:00Z";
const END: &str = "2024-01-10T10:00:00Z";

macro_rules! call {
    ($app:expr, $req:expr) => {
        test::call_service($app, $req.to_request()).await
    };
}

#[actix_web::test]
async fn created_events_are_listed_and_owned() {
    let app =
        test::init_service(api_app(memory_state(MutableClock::at(2024, 1, 1, 8).shared()))).await;
    let ada: AuthResponse = test::read_body_json(call!(&app, register_request("ada"))).await;

    let res = call!(&app, with_bearer(create_event_request("Standup", START, END), &ada.token));
    assert_eq!(res.status(), StatusCode::CREATED);
    let created: EventView = test::read_body_json(res).await;
    assert_eq!(created.owner_id, Some(ada.user.id));
    assert_eq!(created.category, "meeting");

    let listed: Vec<EventView> = test::read_body_json(call!(
        &app,
        with_bearer(test::TestRequest::get().uri("/api/v1/events"), &ada.token)
    ))
    .await;
    assert_eq!(listed, vec![created]);
}

#[actix_web::test]
async fn inverted_intervals_are_rejected() {
    let app =
        test::init_service(api_app(memory_state(MutableClock::at(2024, 1, 1, 8).shared()))).await;
    let ada: AuthResponse = test::read_body_json(call!(&app, register_request("ada"))).await;

    let res = call!(&app, with_bearer(create_event_request("Backwards", END, START), &ada.token));
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["details"]["field"], "endTime");
}

#[actix_web::test]
async fn naive_timestamps_are_read_as_utc() {
    let app =
        test::init_service(api_app(memory_state(MutableClock::at(2024, 1, 1, 8).shared()))).await;
    let ada: AuthResponse = test::read_body_json(call!(&app, register_request("ada"))).await;

    let created: EventView = test::read_body_json(call!(
        &app,
        with_bearer(
            create_event_request("Local", "2024-01-10T09:00", "2024-01-10 10:30:00"),
            &ada.token
        )
    ))
    .await;
    assert_eq!(created.start_time.to_rfc3339(), "2024-01-10T09:00:00+00:00");
    assert_eq!(created.end_time.to_rfc3339(), "2024-01-10T10:30:00+00:00");
}

#[actix_web::test]
async fn only_the_owner_may_delete() {
    let app =
        test::init_service(api_app(memory_state(MutableClock::at(2024, 1, 1, 8).shared()))).await;
    let ada: AuthResponse = test::read_body_json(call!(&app, register_request("ada"))).await;
    let bob: AuthResponse = test::read_body_json(call!(&app, register_request("bob"))).await;
    let event: EventView = test::read_body_json(call!(
        &app,
        with_bearer(create_event_request("Standup", START, END), &ada.token)
    ))
    .await;
    let uri = format!("/api/v1/events/{}", event.id);

    let refused = call!(&app, with_bearer(test::TestRequest::delete().uri(&uri), &bob.token));
    assert_eq!(refused.status(), StatusCode::FORBIDDEN);

    let listed: Vec<EventView> = test::read_body_json(call!(
        &app,
        with_bearer(test::TestRequest::get().uri("/api/v1/events"), &bob.token)
    ))
    .await;
    assert_eq!(listed.len(), 1);

    let deleted = call!(&app, with_bearer(test::TestRequest::delete().uri(&uri), &ada.token));
    assert_eq!(deleted.status(), StatusCode::NO_CONTENT);

    let again = call!(&app, with_bearer(test::TestRequest::delete().uri(&uri), &ada.token));
    assert_eq!(again.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn malformed_ids_are_invalid_requests() {
    let app =
        test::init_service(api_app(memory_state(MutableClock::at(2024, 1, 1, 8).shared()))).await;
    let ada: AuthResponse = test::read_body_json(call!(&app, register_request("ada"))).await;

    let res = call!(
        &app,
        with_bearer(test::TestRequest::delete().uri("/api/v1/events/not-a-uuid"), &ada.token)
    );
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["details"]["code"], "invalid_id");
}

#[actix_web::test]
async fn attendee_registration_is_idempotent() {
    let app =
        test::init_service(api_app(memory_state(MutableClock::at(2024, 1, 1, 8).shared()))).await;
    let ada: AuthResponse = test::read_body_json(call!(&app, register_request("ada"))).await;
    let event: EventView = test::read_body_json(call!(
        &app,
        with_bearer(create_event_request("Standup", START, END), &ada.token)
    ))
    .await;
    let uri = format!("/api/v1/events/{}/attendees", event.id);

    for _ in 0..2 {
        let res = call!(&app, with_bearer(test::TestRequest::post().uri(&uri), &ada.token));
        assert_eq!(res.status(), StatusCode::NO_CONTENT);
    }
}

#[actix_web::test]
async fn my_events_include_booked_resources() {
    let app =
        test::init_service(api_app(memory_state(MutableClock::at(2024, 1, 1, 8).shared()))).await;
    let ada: AuthResponse = test::read_body_json(call!(&app, register_request("ada"))).await;
    let bob: AuthResponse = test::read_body_json(call!(&app, register_request("bob"))).await;
    let event: EventView = test::read_body_json(call!(
        &app,
        with_bearer(create_event_request("Standup", START, END), &ada.token)
    ))
    .await;
    call!(&app, with_bearer(create_event_request("Other", START, END), &bob.token));
    let room: Resource = test::read_body_json(call!(
        &app,
        with_bearer(create_resource_request("Room 1", "room"), &ada.token)
    ))
    .await;
    call!(
        &app,
        with_bearer(
            allocate_request(&event.id.to_string(), &room.id.to_string()),
            &ada.token
        )
    );

    let mine: Value = test::read_body_json(call!(
        &app,
        with_bearer(test::TestRequest::get().uri("/api/v1/users/me/events"), &ada.token)
    ))
    .await;
    assert_eq!(
        mine,
        json!([{
            "id": event.id,
            "title": "Standup",
            "startTime": event.start_time,
            "endTime": event.end_time,
            "description": "",
            "category": "meeting",
            "ownerId": ada.user.id,
            "createdAt": event.created_at,
            "allocations": [{
                "id": mine[0]["allocations"][0]["id"],
                "eventId": event.id,
                "eventTitle": "Standup",
                "startTime": event.start_time,
                "endTime": event.end_time,
                "resourceId": room.id,
                "resourceName": "Room 1",
            }],
        }])
    );
}

#[actix_web::test]
async fn form_bodies_create_events() {
    let app =
        test::init_service(api_app(memory_state(MutableClock::at(2024, 1, 1, 8).shared()))).await;
    let ada: AuthResponse = test::read_body_json(call!(&app, register_request("ada"))).await;

    let res = call!(
        &app,
        with_bearer(test::TestRequest::post().uri("/api/v1/events"), &ada.token).set_form([
            ("title", "Standup"),
            ("startTime", "2024-01-10T09:00"),
            ("endTime", "2024-01-10T10:00"),
            ("category", "meeting"),
        ])
    );
    assert_eq!(res.status(), StatusCode::CREATED);
    let created: EventView = test::read_body_json(res).await;
    assert_eq!(created.title, "Standup");
    assert_eq!(created.start_time.to_rfc3339(), "2024-01-10T09:00:00+00:00");
}
