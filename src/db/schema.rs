//! Idempotent schema, applied at startup.

pub const SCHEMA: &str = r#"

CREATE EXTENSION IF NOT EXISTS postgis;

CREATE TABLE IF NOT EXISTS place (
    id SERIAL PRIMARY KEY,
    name VARCHAR(16) NOT NULL,
    geom GEOGRAPHY(POINT, 4326) NOT NULL,
    geog GEOMETRY(POINT, 4326) NOT NULL,
    elevation INTEGER,
    land_address VARCHAR(128),
    road_address VARCHAR(128),
    description TEXT,
    is_searchable BOOLEAN NOT NULL DEFAULT true,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE TABLE IF NOT EXISTS course_interval_difficulty (
    id SERIAL PRIMARY KEY,
    code VARCHAR(16) NOT NULL UNIQUE,
    name VARCHAR(16) NOT NULL,
    level SMALLINT NOT NULL UNIQUE,
    description TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE TABLE IF NOT EXISTS course_interval (
    id SERIAL PRIMARY KEY,
    name VARCHAR(32) NOT NULL,
    description TEXT,
    forward_description TEXT,
    reverse_description TEXT,
    geom GEOMETRY(LINESTRINGZ, 4326) NOT NULL,
    place_a_id INTEGER NOT NULL REFERENCES place (id),
    place_b_id INTEGER NOT NULL REFERENCES place (id),
    course_interval_difficulty_id INTEGER REFERENCES course_interval_difficulty (id),
    length_m INTEGER NOT NULL,
    duration_ab_minutes INTEGER NOT NULL,
    duration_ba_minutes INTEGER NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT ck_course_interval_undirected_order CHECK (place_a_id < place_b_id)
);

CREATE TABLE IF NOT EXISTS course_interval_image (
    id SERIAL PRIMARY KEY,
    course_interval_id INTEGER NOT NULL REFERENCES course_interval (id) ON DELETE CASCADE,
    url VARCHAR(512) NOT NULL,
    title VARCHAR(64),
    description TEXT,
    sort_order INTEGER NOT NULL DEFAULT 1,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE TABLE IF NOT EXISTS course_difficulty (
    id SERIAL PRIMARY KEY,
    code VARCHAR(16) NOT NULL UNIQUE,
    name VARCHAR(16) NOT NULL,
    level SMALLINT NOT NULL UNIQUE,
    description TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE TABLE IF NOT EXISTS course_style (
    id SERIAL PRIMARY KEY,
    code VARCHAR(16) NOT NULL UNIQUE,
    name VARCHAR(16) NOT NULL,
    description TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE TABLE IF NOT EXISTS course (
    id SERIAL PRIMARY KEY,
    name VARCHAR(64) NOT NULL,
    description TEXT,
    is_published BOOLEAN NOT NULL DEFAULT false,
    course_difficulty_id INTEGER NOT NULL REFERENCES course_difficulty (id),
    course_style_id INTEGER NOT NULL REFERENCES course_style (id),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE TABLE IF NOT EXISTS course_image (
    id SERIAL PRIMARY KEY,
    course_id INTEGER NOT NULL REFERENCES course (id) ON DELETE CASCADE,
    url VARCHAR(512) NOT NULL,
    title VARCHAR(64),
    description TEXT,
    sort_order INTEGER NOT NULL DEFAULT 1,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE TABLE IF NOT EXISTS course_course_interval (
    id SERIAL PRIMARY KEY,
    course_id INTEGER NOT NULL REFERENCES course (id) ON DELETE CASCADE,
    interval_id INTEGER NOT NULL REFERENCES course_interval (id) ON DELETE RESTRICT,
    position INTEGER NOT NULL,
    is_reversed BOOLEAN NOT NULL DEFAULT false,
    CONSTRAINT uq_course_course_interval UNIQUE (course_id, interval_id, position)
);

CREATE TABLE IF NOT EXISTS kma_mountain_weather_area (
    id SERIAL PRIMARY KEY,
    code INTEGER NOT NULL UNIQUE,
    name VARCHAR(16) NOT NULL,
    geom GEOGRAPHY(POINT, 4326) NOT NULL,
    geog GEOMETRY(POINT, 4326) NOT NULL,
    elevation INTEGER NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX IF NOT EXISTS idx_place_geom ON place USING GIST (geom);
CREATE INDEX IF NOT EXISTS idx_course_course_interval_course ON course_course_interval (course_id, position);
CREATE INDEX IF NOT EXISTS idx_kma_mountain_weather_area_geog ON kma_mountain_weather_area USING GIST (geog);

"#;
