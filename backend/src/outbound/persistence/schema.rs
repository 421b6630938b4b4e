//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. When a
//! migration changes the schema, regenerate with `diesel print-schema` or
//! update by hand.

diesel::table! {
    /// Registered accounts.
    users (id) {
        id -> Uuid,
        /// Unique login name.
        username -> Varchar,
        /// Optional unique email, stored lowercased.
        email -> Nullable<Varchar>,
        /// Argon2id PHC string.
        password_hash -> Text,
        is_admin -> Bool,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// SHA-256 digests of issued bearer tokens.
    auth_tokens (digest) {
        digest -> Varchar,
        user_id -> Uuid,
        issued_at -> Timestamptz,
        expires_at -> Timestamptz,
    }
}

diesel::table! {
    /// Scheduled events. `owner_id` is null for unowned events.
    events (id) {
        id -> Uuid,
        title -> Varchar,
        start_time -> Timestamptz,
        end_time -> Timestamptz,
        description -> Text,
        category -> Varchar,
        owner_id -> Nullable<Uuid>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Bookable resources.
    resources (id) {
        id -> Uuid,
        name -> Varchar,
        /// Resource type, such as `room`.
        kind -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Event-resource assignments, unique per pair.
    allocations (id) {
        id -> Uuid,
        event_id -> Uuid,
        resource_id -> Uuid,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Attendee registrations.
    event_attendees (event_id, user_id) {
        event_id -> Uuid,
        user_id -> Uuid,
        registered_at -> Timestamptz,
    }
}

diesel::joinable!(auth_tokens -> users (user_id));
diesel::joinable!(events -> users (owner_id));
diesel::joinable!(allocations -> events (event_id));
diesel::joinable!(allocations -> resources (resource_id));
diesel::joinable!(event_attendees -> events (event_id));
diesel::joinable!(event_attendees -> users (user_id));

diesel::allow_tables_to_appear_in_same_query!(
    users,
    auth_tokens,
    events,
    resources,
    allocations,
    event_attendees,
);
