// dwh-core/src/domain/warehouse/checks.rs

use serde::Serialize;

/// A scalar query whose result must be zero on a healthy warehouse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IntegrityCheck {
    pub name: &'static str,
    pub sql: &'static str,
}

impl IntegrityCheck {
    pub fn passes(&self, value: u64) -> bool {
        value == 0
    }
}

pub const INTEGRITY_CHECKS: [IntegrityCheck; 4] = [
    IntegrityCheck {
        name: "duplicate user_id in users",
        sql: "select count(*) - count(distinct user_id) from users",
    },
    IntegrityCheck {
        name: "null song_id in songs",
        sql: "select count(*) from songs where song_id is null",
    },
    IntegrityCheck {
        name: "duplicate song_id in songs",
        sql: "select count(*) - count(distinct song_id) from songs",
    },
    IntegrityCheck {
        name: "null start_time in songplay",
        sql: "select count(*) from songplay where start_time is null",
    },
];

/// Staging tables are dropped at the end of every successful run.
pub const LEFTOVER_STAGING_SQL: &str = "select count(*) from information_schema.tables \
     where table_schema = '{{ schema }}' and table_name in ('staging_events', 'staging_songs')";
