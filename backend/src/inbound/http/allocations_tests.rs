//! Handler tests for allocation endpoints over the in-memory store.

use actix_web::http::StatusCode;
use actix_web::test;
use serde_json::Value;

use super::*;
use crate::domain::{EventView, Resource};
use crate::inbound::http::auth::AuthResponse;
use crate::inbound::http::test_utils::{
    allocate_request, api_app, create_event_request, create_resource_request, memory_state,
    register_request, with_bearer,
};
use crate::test_support::MutableClock;

macro_rules! call {
    ($app:expr, $req:expr) => {
        test::call_service($app, $req.to_request()).await
    };
}

macro_rules! json_of {
    ($app:expr, $req:expr) => {
        test::read_body_json(call!($app, $req)).await
    };
}

#[actix_web::test]
async fn overlapping_allocations_conflict() {
    let app =
        test::init_service(api_app(memory_state(MutableClock::at(2024, 1, 1, 8).shared()))).await;
    let ada: AuthResponse = json_of!(&app, register_request("ada"));
    let first: EventView = json_of!(
        &app,
        with_bearer(
            create_event_request("Standup", "2024-01-10T09:00:00Z", "2024-01-10T10:00:00Z"),
            &ada.token
        )
    );
    let second: EventView = json_of!(
        &app,
        with_bearer(
            create_event_request("Review", "2024-01-10T09:30:00Z", "2024-01-10T11:00:00Z"),
            &ada.token
        )
    );
    let adjacent: EventView = json_of!(
        &app,
        with_bearer(
            create_event_request("Retro", "2024-01-10T10:00:00Z", "2024-01-10T11:00:00Z"),
            &ada.token
        )
    );
    let room: Resource =
        json_of!(&app, with_bearer(create_resource_request("Room 1", "room"), &ada.token));
    let room_id = room.id.to_string();

    let res =
        call!(&app, with_bearer(allocate_request(&first.id.to_string(), &room_id), &ada.token));
    assert_eq!(res.status(), StatusCode::CREATED);
    let allocation: Allocation = test::read_body_json(res).await;
    assert_eq!(allocation.event_id, first.id);

    let clash =
        call!(&app, with_bearer(allocate_request(&second.id.to_string(), &room_id), &ada.token));
    assert_eq!(clash.status(), StatusCode::CONFLICT);
    let body: Value = test::read_body_json(clash).await;
    assert_eq!(body["code"], "conflict");

    let touching = call!(
        &app,
        with_bearer(allocate_request(&adjacent.id.to_string(), &room_id), &ada.token)
    );
    assert_eq!(touching.status(), StatusCode::CREATED);

    let listed: Vec<AllocationDetails> = json_of!(
        &app,
        with_bearer(test::TestRequest::get().uri("/api/v1/allocations"), &ada.token)
    );
    let titles: Vec<&str> = listed.iter().map(|row| row.event_title.as_str()).collect();
    assert_eq!(titles, ["Standup", "Retro"]);
}

#[actix_web::test]
async fn repeat_allocation_of_the_same_pair_conflicts() {
    let app =
        test::init_service(api_app(memory_state(MutableClock::at(2024, 1, 1, 8).shared()))).await;
    let ada: AuthResponse = json_of!(&app, register_request("ada"));
    let event: EventView = json_of!(
        &app,
        with_bearer(
            create_event_request("Standup", "2024-01-10T09:00:00Z", "2024-01-10T10:00:00Z"),
            &ada.token
        )
    );
    let room: Resource =
        json_of!(&app, with_bearer(create_resource_request("Room 1", "room"), &ada.token));
    let req = || allocate_request(&event.id.to_string(), &room.id.to_string());

    assert_eq!(call!(&app, with_bearer(req(), &ada.token)).status(), StatusCode::CREATED);
    assert_eq!(call!(&app, with_bearer(req(), &ada.token)).status(), StatusCode::CONFLICT);
}

#[actix_web::test]
async fn availability_reflects_bookings() {
    let app =
        test::init_service(api_app(memory_state(MutableClock::at(2024, 1, 1, 8).shared()))).await;
    let ada: AuthResponse = json_of!(&app, register_request("ada"));
    let first: EventView = json_of!(
        &app,
        with_bearer(
            create_event_request("Standup", "2024-01-10T09:00:00Z", "2024-01-10T10:00:00Z"),
            &ada.token
        )
    );
    let second: EventView = json_of!(
        &app,
        with_bearer(
            create_event_request("Review", "2024-01-10T09:30:00Z", "2024-01-10T11:00:00Z"),
            &ada.token
        )
    );
    let room: Resource =
        json_of!(&app, with_bearer(create_resource_request("Room 1", "room"), &ada.token));
    let availability_uri = format!(
        "/api/v1/allocations/availability?eventId={}&resourceId={}",
        second.id, room.id
    );

    let before: Availability = json_of!(
        &app,
        with_bearer(test::TestRequest::get().uri(&availability_uri), &ada.token)
    );
    assert!(before.available);

    call!(
        &app,
        with_bearer(allocate_request(&first.id.to_string(), &room.id.to_string()), &ada.token)
    );
    let after: Availability = json_of!(
        &app,
        with_bearer(test::TestRequest::get().uri(&availability_uri), &ada.token)
    );
    assert!(!after.available);
}

#[actix_web::test]
async fn unknown_references_are_not_found() {
    let app =
        test::init_service(api_app(memory_state(MutableClock::at(2024, 1, 1, 8).shared()))).await;
    let ada: AuthResponse = json_of!(&app, register_request("ada"));
    let room: Resource =
        json_of!(&app, with_bearer(create_resource_request("Room 1", "room"), &ada.token));

    let res = call!(
        &app,
        with_bearer(
            allocate_request("3fa85f64-5717-4562-b3fc-2c963f66afa6", &room.id.to_string()),
            &ada.token
        )
    );
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn missing_fields_are_invalid_requests() {
    let app =
        test::init_service(api_app(memory_state(MutableClock::at(2024, 1, 1, 8).shared()))).await;
    let ada: AuthResponse = json_of!(&app, register_request("ada"));

    let res = call!(
        &app,
        with_bearer(
            test::TestRequest::post()
                .uri("/api/v1/allocations")
                .set_json(serde_json::json!({"eventId": "3fa85f64-5717-4562-b3fc-2c963f66afa6"})),
            &ada.token
        )
    );
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["details"]["field"], "resourceId");
}

#[actix_web::test]
async fn only_the_event_owner_may_remove() {
    let app =
        test::init_service(api_app(memory_state(MutableClock::at(2024, 1, 1, 8).shared()))).await;
    let ada: AuthResponse = json_of!(&app, register_request("ada"));
    let bob: AuthResponse = json_of!(&app, register_request("bob"));
    let event: EventView = json_of!(
        &app,
        with_bearer(
            create_event_request("Standup", "2024-01-10T09:00:00Z", "2024-01-10T10:00:00Z"),
            &ada.token
        )
    );
    let room: Resource =
        json_of!(&app, with_bearer(create_resource_request("Room 1", "room"), &ada.token));
    let allocation: Allocation = json_of!(
        &app,
        with_bearer(allocate_request(&event.id.to_string(), &room.id.to_string()), &ada.token)
    );
    let uri = format!("/api/v1/allocations/{}", allocation.id);

    let refused = call!(&app, with_bearer(test::TestRequest::delete().uri(&uri), &bob.token));
    assert_eq!(refused.status(), StatusCode::FORBIDDEN);

    let removed = call!(&app, with_bearer(test::TestRequest::delete().uri(&uri), &ada.token));
    assert_eq!(removed.status(), StatusCode::NO_CONTENT);

    let gone = call!(&app, with_bearer(test::TestRequest::delete().uri(&uri), &ada.token));
    assert_eq!(gone.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn form_bodies_allocate() {
    let app =
        test::init_service(api_app(memory_state(MutableClock::at(2024, 1, 1, 8).shared()))).await;
    let ada: AuthResponse = json_of!(&app, register_request("ada"));
    let event: EventView = json_of!(
        &app,
        with_bearer(
            create_event_request("Standup", "2024-01-10T09:00:00Z", "2024-01-10T10:00:00Z"),
            &ada.token
        )
    );
    let room: Resource =
        json_of!(&app, with_bearer(create_resource_request("Room 1", "room"), &ada.token));
    let event_id = event.id.to_string();
    let room_id = room.id.to_string();

    let res = call!(
        &app,
        with_bearer(test::TestRequest::post().uri("/api/v1/allocations"), &ada.token)
            .set_form([("eventId", event_id.as_str()), ("resourceId", room_id.as_str())])
    );
    assert_eq!(res.status(), StatusCode::CREATED);
    let allocation: Allocation = test::read_body_json(res).await;
    assert_eq!(allocation.resource_id, room.id);
}
