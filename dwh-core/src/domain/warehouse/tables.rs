// dwh-core/src/domain/warehouse/tables.rs
//
// The star schema: two staging tables fed by bulk loads, one fact table and
// four dimensions. DDL and DML are minijinja templates; `redshift` toggles the
// distribution/sort clauses and the load syntax.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Table {
    StagingEvents,
    StagingSongs,
    Songplay,
    Users,
    Songs,
    Artists,
    Time,
}

impl Table {
    /// Drop/create order.
    pub const ALL: [Table; 7] = [
        Table::StagingEvents,
        Table::StagingSongs,
        Table::Songplay,
        Table::Users,
        Table::Songs,
        Table::Artists,
        Table::Time,
    ];

    pub const STAGING: [Table; 2] = [Table::StagingEvents, Table::StagingSongs];

    /// Insert order.
    pub const FINAL: [Table; 5] = [
        Table::Songplay,
        Table::Users,
        Table::Songs,
        Table::Artists,
        Table::Time,
    ];

    /// Quoted where the bare word is a type name.
    pub fn sql_name(&self) -> &'static str {
        match self {
            Table::StagingEvents => "staging_events",
            Table::StagingSongs => "staging_songs",
            Table::Songplay => "songplay",
            Table::Users => "users",
            Table::Songs => "songs",
            Table::Artists => "artists",
            Table::Time => "\"time\"",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Table::Time => "time",
            other => other.sql_name(),
        }
    }

    pub fn is_staging(&self) -> bool {
        matches!(self, Table::StagingEvents | Table::StagingSongs)
    }

    pub fn create_template(&self) -> &'static str {
        match self {
            Table::StagingEvents => STAGING_EVENTS_CREATE,
            Table::StagingSongs => STAGING_SONGS_CREATE,
            Table::Songplay => SONGPLAY_CREATE,
            Table::Users => USERS_CREATE,
            Table::Songs => SONGS_CREATE,
            Table::Artists => ARTISTS_CREATE,
            Table::Time => TIME_CREATE,
        }
    }

    /// Bulk-load template, staging tables only.
    pub fn load_template(&self) -> Option<&'static str> {
        match self {
            Table::StagingEvents => Some(STAGING_EVENTS_LOAD),
            Table::StagingSongs => Some(STAGING_SONGS_LOAD),
            _ => None,
        }
    }

    /// Insert-select template, final tables only.
    pub fn insert_template(&self) -> Option<&'static str> {
        match self {
            Table::Songplay => Some(SONGPLAY_INSERT),
            Table::Users => Some(USERS_INSERT),
            Table::Songs => Some(SONGS_INSERT),
            Table::Artists => Some(ARTISTS_INSERT),
            Table::Time => Some(TIME_INSERT),
            _ => None,
        }
    }
}

pub const SCHEMA_CREATE: &str = "create schema if not exists {{ schema }}";

pub const TABLE_DROP: &str = "drop table if exists {{ table }}";

// --- STAGING TABLES ---

const STAGING_EVENTS_CREATE: &str = r#"create table staging_events(
    artist              varchar,
    auth                varchar,
    firstName           varchar,
    gender              char(1),
    itemInSession       int,
    lastName            varchar,
    length              numeric(12,4),
    level               varchar(6),
    location            varchar,
    method              varchar,
    page                varchar,
    registration        timestamp,
    sessionId           int,
    song                varchar,
    status              varchar(10),
    ts                  timestamp,
    userAgent           varchar,
    userId              int
)"#;

const STAGING_SONGS_CREATE: &str = r#"create table staging_songs(
    num_songs           int,
    artist_id           varchar,
    artist_name         varchar,
    artist_longitude    numeric(11,3),
    artist_latitude     numeric(11,3),
    artist_location     varchar,
    song_id             varchar,
    title               varchar,
    duration            numeric(12,6),
    year                int
)"#;

// --- FACT & DIMENSIONS ---

const SONGPLAY_CREATE: &str = r#"create table songplay(
    start_time          timestamp not null{% if redshift %} sortkey{% endif %},
    user_id             int,
    level               varchar,
    song_id             varchar,
    artist_id           varchar,
    session_id          int,
    location            varchar,
    user_agent          varchar
){% if redshift %} diststyle even{% endif %}"#;

const USERS_CREATE: &str = r#"create table users(
    user_id             int not null{% if redshift %} sortkey{% endif %},
    first_name          varchar not null,
    last_name           varchar not null,
    gender              char(1) not null
){% if redshift %} diststyle all{% endif %}"#;

const SONGS_CREATE: &str = r#"create table songs(
    song_id             varchar not null{% if redshift %} sortkey{% endif %},
    song_title          varchar not null,
    artist_id           varchar not null,
    year                int not null,
    duration            numeric(12,6) not null
){% if redshift %} diststyle all{% endif %}"#;

const ARTISTS_CREATE: &str = r#"create table artists(
    artist_id           varchar not null{% if redshift %} sortkey{% endif %},
    artist_name         varchar not null,
    artist_location     varchar,
    artist_longitude    numeric(11,8),
    artist_latitude     numeric(11,8)
){% if redshift %} diststyle all{% endif %}"#;

const TIME_CREATE: &str = r#"create table "time"(
    start_time          timestamp not null{% if redshift %} sortkey{% endif %},
    hour                int not null,
    day                 int not null,
    week                int not null,
    month               int not null,
    year                int not null
){% if redshift %} diststyle all{% endif %}"#;

// --- BULK LOADS ---
// Redshift COPYs straight from S3 with the cluster role; locally the same
// columns are read from JSON files and the epoch-millisecond fields converted.

const STAGING_EVENTS_LOAD: &str = r#"{% if redshift -%}
copy staging_events from '{{ log_data | literal }}'
    iam_role '{{ role_arn | literal }}'
    json '{{ log_jsonpath | literal }}' timeformat as 'epochmillisecs'
{%- else -%}
insert into staging_events
    select artist, auth, firstName, gender, itemInSession, lastName, length, level,
           location, method, page, epoch_ms(cast(registration as bigint)), sessionId, song,
           cast(status as varchar), epoch_ms(cast(ts as bigint)), userAgent,
           try_cast(userId as int)
    from read_json_auto('{{ log_data | literal }}')
{%- endif %}"#;

const STAGING_SONGS_LOAD: &str = r#"{% if redshift -%}
copy staging_songs from '{{ song_data | literal }}'
    iam_role '{{ role_arn | literal }}'
    json 'auto'
{%- else -%}
insert into staging_songs
    select num_songs, artist_id, artist_name, artist_longitude, artist_latitude,
           artist_location, song_id, title, duration, year
    from read_json_auto('{{ song_data | literal }}')
{%- endif %}"#;

// --- TRANSFORMS ---

const SONGPLAY_INSERT: &str = r#"insert into songplay
    (start_time, user_id, level, song_id, artist_id, session_id, location, user_agent)
    select
        e.ts as start_time,
        e.userId as user_id,
        e.level,
        s.song_id,
        s.artist_id,
        e.sessionId as session_id,
        e.location,
        e.userAgent as user_agent
    from staging_events e
    left outer join staging_songs s on (
        s.artist_name = e.artist and
        s.title = e.song and
        s.duration = e.length
    )
    where e.ts is not null"#;

// One row per user: the attributes of their latest event win.
const USERS_INSERT: &str = r#"insert into users
    (user_id, first_name, last_name, gender)
    select userId, firstName, lastName, gender
    from (
        select
            userId, firstName, lastName, gender,
            row_number() over (partition by userId order by ts desc nulls last) as rn
        from staging_events
        where userId is not null
    ) latest
    where rn = 1"#;

const SONGS_INSERT: &str = r#"insert into songs
    (song_id, song_title, artist_id, year, duration)
    select distinct song_id, title, artist_id, year, duration
    from staging_songs
    where song_id is not null"#;

const ARTISTS_INSERT: &str = r#"insert into artists
    (artist_id, artist_name, artist_location, artist_latitude, artist_longitude)
    select distinct artist_id, artist_name, artist_location, artist_latitude, artist_longitude
    from staging_songs
    where artist_id is not null"#;

const TIME_INSERT: &str = r#"insert into "time"
    (day, hour, month, start_time, week, year)
    select distinct
        extract(day from ts) as day,
        extract(hour from ts) as hour,
        extract(month from ts) as month,
        ts as start_time,
        extract(week from ts) as week,
        extract(year from ts) as year
    from staging_events
    where ts is not null"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_sets_are_consistent() {
        assert!(Table::STAGING.iter().all(|t| t.is_staging()));
        assert!(Table::FINAL.iter().all(|t| !t.is_staging()));
        assert_eq!(Table::ALL.len(), Table::STAGING.len() + Table::FINAL.len());
    }

    #[test]
    fn test_templates_per_kind() {
        for table in Table::STAGING {
            assert!(table.load_template().is_some());
            assert!(table.insert_template().is_none());
        }
        for table in Table::FINAL {
            assert!(table.load_template().is_none());
            assert!(table.insert_template().is_some());
        }
    }

    #[test]
    fn test_users_keep_one_row_per_id() {
        let sql = Table::Users.insert_template().unwrap_or_default();
        assert!(sql.contains("partition by userId"));
        assert!(sql.contains("where rn = 1"));
        assert!(!sql.contains("select distinct"));
    }

    #[test]
    fn test_time_is_quoted() {
        assert_eq!(Table::Time.sql_name(), "\"time\"");
        assert_eq!(Table::Time.label(), "time");
    }
}
