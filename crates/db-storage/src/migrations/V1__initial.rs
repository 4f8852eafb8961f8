use barrel::backend::Pg;
use barrel::{types, Migration};

use crate::migrations::type_polyfills;

pub fn migration() -> String {
    let mut migr = Migration::new();

    migr.create_table("users", |table| {
        table.add_column("email", types::varchar(320).primary(true));
        table.add_column("display_name", types::varchar(100).nullable(false));
        table.add_column("password_hash", types::varchar(255).nullable(false));
        table.add_column("make", types::varchar(50).nullable(false));
        table.add_column("model", types::varchar(20).nullable(false));
        table.add_column("latitude", types::double().nullable(true));
        table.add_column("longitude", types::double().nullable(true));
        table.add_column("radius_m", types::double().nullable(true));
        table.add_column("city", types::varchar(255).nullable(true));
    });

    migr.create_table("events", |table| {
        table.add_column("id", types::uuid().primary(true));
        table.add_column("id_serial", types::custom("BIGSERIAL"));
        table.add_column("name", types::varchar(50).nullable(false));
        table.add_column("starts_at", type_polyfills::datetimetz().indexed(true));
        table.add_column("location", types::varchar(255).nullable(false));
        table.add_column("latitude", types::double().nullable(false).indexed(true));
        table.add_column("longitude", types::double().nullable(false));
        table.add_column("description", types::text().nullable(false));
        table.add_column(
            "host_email",
            types::custom("VARCHAR(320) REFERENCES users(email)").nullable(false),
        );
    });

    migr.create_table("rsvps", |table| {
        table.add_column(
            "user_email",
            types::custom("VARCHAR(320) REFERENCES users(email)"),
        );
        table.add_column("event_id", types::custom("UUID REFERENCES events(id)"));
        table.inject_custom("PRIMARY KEY (user_email, event_id)");
    });

    migr.create_table("authored_events", |table| {
        table.add_column(
            "user_email",
            types::custom("VARCHAR(320) REFERENCES users(email)"),
        );
        table.add_column("event_id", types::custom("UUID REFERENCES events(id)"));
        table.inject_custom("PRIMARY KEY (user_email, event_id)");
    });

    migr.make::<Pg>()
}
