//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the database migrations exactly; Diesel uses
//! them for compile-time query validation and type-safe SQL generation.

diesel::table! {
    /// Registered user accounts. `email` carries a unique constraint.
    users (id) {
        id -> Uuid,
        name -> Varchar,
        email -> Varchar,
        role -> Varchar,
        password_hash -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Product catalogue.
    products (id) {
        id -> Uuid,
        name -> Varchar,
        description -> Text,
        price_cents -> Int8,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Bookkeeping for idempotent bootstrap seeding, one row per seed key.
    seed_runs (seed_key) {
        seed_key -> Varchar,
        applied_at -> Timestamptz,
    }
}
