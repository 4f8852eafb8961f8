table! {
    authored_events (user_email, event_id) {
        user_email -> Varchar,
        event_id -> Uuid,
    }
}

table! {
    events (id) {
        id -> Uuid,
        id_serial -> Int8,
        name -> Varchar,
        starts_at -> Timestamptz,
        location -> Varchar,
        latitude -> Float8,
        longitude -> Float8,
        description -> Text,
        host_email -> Varchar,
    }
}

table! {
    rsvps (user_email, event_id) {
        user_email -> Varchar,
        event_id -> Uuid,
    }
}

table! {
    users (email) {
        email -> Varchar,
        display_name -> Varchar,
        password_hash -> Varchar,
        make -> Varchar,
        model -> Varchar,
        latitude -> Nullable<Float8>,
        longitude -> Nullable<Float8>,
        radius_m -> Nullable<Float8>,
        city -> Nullable<Varchar>,
    }
}

joinable!(authored_events -> events (event_id));
joinable!(authored_events -> users (user_email));
joinable!(events -> users (host_email));
joinable!(rsvps -> events (event_id));
joinable!(rsvps -> users (user_email));

allow_tables_to_appear_in_same_query!(authored_events, events, rsvps, users,);
