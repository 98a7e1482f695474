// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use async_trait::async_trait;
use geojson::{GeoJson, Geometry, Value};
use std::sync::Arc;
use std::time::Duration;
use trailine_api::config::Config;
use trailine_api::db::{
    CourseRepository, CourseSearchFilter, PgDb, PlaceRepository, WeatherAreaRepository,
};
use trailine_api::error::{AppError, Result};
use trailine_api::models::{
    CourseAddressRow, CourseDetailRow, CourseDifficulty, CourseIntervalRow, CourseStyle, ImageRow,
    PlaceRow,
};
use trailine_api::routes::create_router;
use trailine_api::services::{CourseService, KmaClient, WeatherService};
use trailine_api::AppState;

// ─── PostgreSQL ──────────────────────────────────────────────

/// Check if a test database is available via environment variable.
#[allow(dead_code)]
pub fn database_url() -> Option<String> {
    std::env::var("TEST_DATABASE_URL").ok()
}

/// Skip test with message if no test database is configured.
#[macro_export]
macro_rules! require_database {
    () => {
        if crate::common::database_url().is_none() {
            eprintln!("⚠️  Skipping: TEST_DATABASE_URL not set");
            return;
        }
    };
}

/// Connect to the test database and reset it to the scenario fixture.
#[allow(dead_code)]
pub async fn test_db() -> PgDb {
    let url = database_url().expect("TEST_DATABASE_URL not set");
    let db = PgDb::connect(&url, 2)
        .await
        .expect("Failed to connect to test database");
    db.init_schema().await.expect("Failed to apply schema");
    sqlx::raw_sql(SEED_SQL)
        .execute(db.pool())
        .await
        .expect("Failed to seed fixtures");
    db
}

/// The route-test scenario, as SQL.
///
/// Course 1 walks A→B, B→C, then C→A over the stored A-C interval reversed.
/// Course 3 reuses A-B and only its name matches "신림". Course 2 is a draft.
#[allow(dead_code)]
pub const SEED_SQL: &str = r#"
TRUNCATE course_course_interval, course_image, course, course_interval_image,
         course_interval, course_interval_difficulty, course_difficulty, course_style,
         place, kma_mountain_weather_area RESTART IDENTITY CASCADE;

INSERT INTO course_difficulty (id, code, name, level, description) VALUES
    (1, 'easy', '쉬움', 1, NULL),
    (2, 'hard', '어려움', 3, NULL),
    (3, 'normal', '보통', 2, NULL);

INSERT INTO course_style (id, code, name, description) VALUES
    (1, 'loop', '순환형', NULL),
    (2, 'linear', '편도형', NULL);

INSERT INTO course_interval_difficulty (id, code, name, level) VALUES
    (1, 'steep', '급경사', 2);

INSERT INTO place (id, name, geom, geog, elevation, land_address, road_address) VALUES
    (1, 'A', ST_GeogFromText('SRID=4326;POINT(126.9640 37.4413)'),
        ST_GeomFromText('POINT(126.9640 37.4413)', 4326), 629,
        '서울특별시 관악구 신림동 산56-1', '경기도 과천시 특정도로명주소-1'),
    (2, 'B', ST_GeogFromText('SRID=4326;POINT(126.9700 37.4450)'),
        ST_GeomFromText('POINT(126.9700 37.4450)', 4326), 500,
        '경기도 과천시 특정지번주소-1', '경기도 과천시 특정도로명주소-2'),
    (3, 'C', ST_GeogFromText('SRID=4326;POINT(126.9800 37.4500)'),
        ST_GeomFromText('POINT(126.9800 37.4500)', 4326), NULL,
        '경기도 과천시 특정지번주소-2', NULL);

INSERT INTO course_interval (id, name, description, forward_description, reverse_description,
                             geom, place_a_id, place_b_id, course_interval_difficulty_id,
                             length_m, duration_ab_minutes, duration_ba_minutes) VALUES
    (10, 'A-B', '설명', '정방향 설명', '역방향 설명',
        ST_GeomFromText('LINESTRING Z(126.9640 37.4413 629, 126.9700 37.4450 500)', 4326),
        1, 2, 1, 1200, 40, 30),
    (11, 'B-C', '설명', '정방향 설명', '역방향 설명',
        ST_GeomFromText('LINESTRING Z(126.9700 37.4450 500, 126.9800 37.4500 300)', 4326),
        2, 3, NULL, 800, 20, 25),
    (12, 'A-C', '설명', '정방향 설명', '역방향 설명',
        ST_GeomFromText('LINESTRING Z(126.9640 37.4413 629, 126.9720 37.4470 450, 126.9800 37.4500 300)', 4326),
        1, 3, NULL, 1550, 60, 50);

INSERT INTO course_interval_image (course_interval_id, url, title, sort_order) VALUES
    (10, 'https://img.example/ab-2.jpg', '두번째', 2),
    (10, 'https://img.example/ab-1.jpg', '첫번째', 1);

INSERT INTO course (id, name, description, is_published, course_difficulty_id, course_style_id) VALUES
    (1, '관악산 둘레길', '관악산을 한 바퀴 도는 코스', true, 1, 1),
    (2, '비공개 코스', NULL, false, 1, 1),
    (3, '신림 계곡길', NULL, true, 2, 2);

INSERT INTO course_image (course_id, url, title, sort_order) VALUES
    (1, 'https://img.example/course-2.jpg', NULL, 2),
    (1, 'https://img.example/course-1.jpg', '정상', 1);

INSERT INTO course_course_interval (course_id, interval_id, position, is_reversed) VALUES
    (1, 10, 1, false),
    (1, 11, 2, false),
    (1, 12, 3, true),
    (2, 10, 1, false),
    (3, 10, 1, false);

INSERT INTO kma_mountain_weather_area (code, name, geom, geog, elevation) VALUES
    (1137, '관악산', ST_GeogFromText('SRID=4326;POINT(126.9640 37.4450)'),
        ST_GeomFromText('POINT(126.9640 37.4450)', 4326), 632),
    (1201, '설악산', ST_GeogFromText('SRID=4326;POINT(128.4655 38.1195)'),
        ST_GeomFromText('POINT(128.4655 38.1195)', 4326), 1708);

SELECT setval('course_id_seq', 3);
SELECT setval('course_interval_id_seq', 12);
SELECT setval('place_id_seq', 3);
"#;

// ─── In-memory fakes ─────────────────────────────────────────

#[derive(Clone)]
pub struct FakeCourse {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub published: bool,
    pub difficulty_id: i32,
    pub style_id: i32,
    pub images: Vec<ImageRow>,
    /// (interval id, position, is_reversed)
    pub links: Vec<(i32, i32, bool)>,
}

#[derive(Clone)]
pub struct FakeInterval {
    pub id: i32,
    pub name: String,
    pub place_a_id: i32,
    pub place_b_id: i32,
    pub points: Vec<(f64, f64, f64)>,
    pub length_m: i32,
    pub duration_ab_minutes: i32,
    pub duration_ba_minutes: i32,
    pub forward_description: Option<String>,
    pub reverse_description: Option<String>,
    pub steep: bool,
    pub images: Vec<ImageRow>,
}

/// In-memory stand-in for the PostgreSQL repositories.
#[derive(Clone, Default)]
pub struct FakeStore {
    pub difficulties: Vec<CourseDifficulty>,
    pub styles: Vec<CourseStyle>,
    pub places: Vec<PlaceRow>,
    pub intervals: Vec<FakeInterval>,
    pub courses: Vec<FakeCourse>,
    pub weather_area: Option<i32>,
    /// Every call fails with a database error
    pub broken: bool,
}

fn image(owner_id: i32, url: &str, title: Option<&str>) -> ImageRow {
    ImageRow {
        owner_id,
        url: url.to_string(),
        title: title.map(str::to_string),
        description: None,
    }
}

/// Text as PostGIS `ST_AsGeoJSON` renders a 2D point.
fn point_geojson(lon: f64, lat: f64) -> String {
    GeoJson::from(Geometry::new(Value::from(&geo::Point::new(lon, lat)))).to_string()
}

/// Text as PostGIS `ST_AsGeoJSON` renders a LINESTRING Z.
fn line_geojson(points: &[(f64, f64, f64)]) -> String {
    let positions = points.iter().map(|&(x, y, z)| vec![x, y, z]).collect();
    GeoJson::from(Geometry::new(Value::LineString(positions))).to_string()
}

fn place(id: i32, name: &str, (lon, lat): (f64, f64), ele: Option<i32>, land: Option<&str>, road: Option<&str>) -> PlaceRow {
    PlaceRow {
        id,
        name: name.to_string(),
        geom: point_geojson(lon, lat),
        elevation: ele,
        land_address: land.map(str::to_string),
        road_address: road.map(str::to_string),
    }
}

fn interval(id: i32, name: &str, (a, b): (i32, i32), points: Vec<(f64, f64, f64)>, length_m: i32, (ab, ba): (i32, i32)) -> FakeInterval {
    FakeInterval {
        id,
        name: name.to_string(),
        place_a_id: a,
        place_b_id: b,
        points,
        length_m,
        duration_ab_minutes: ab,
        duration_ba_minutes: ba,
        forward_description: Some("정방향 설명".to_string()),
        reverse_description: Some("역방향 설명".to_string()),
        steep: false,
        images: Vec::new(),
    }
}

impl FakeStore {
    /// Same data as [`SEED_SQL`].
    pub fn scenario() -> Self {
        let mut ab = interval(
            10,
            "A-B",
            (1, 2),
            vec![(126.9640, 37.4413, 629.0), (126.9700, 37.4450, 500.0)],
            1200,
            (40, 30),
        );
        ab.steep = true;
        ab.images = vec![
            image(10, "https://img.example/ab-1.jpg", Some("첫번째")),
            image(10, "https://img.example/ab-2.jpg", Some("두번째")),
        ];

        Self {
            difficulties: vec![
                CourseDifficulty { id: 1, code: "easy".into(), name: "쉬움".into(), level: 1, description: None },
                CourseDifficulty { id: 2, code: "hard".into(), name: "어려움".into(), level: 3, description: None },
                CourseDifficulty { id: 3, code: "normal".into(), name: "보통".into(), level: 2, description: None },
            ],
            styles: vec![
                CourseStyle { id: 1, code: "loop".into(), name: "순환형".into(), description: None },
                CourseStyle { id: 2, code: "linear".into(), name: "편도형".into(), description: None },
            ],
            places: vec![
                place(1, "A", (126.9640, 37.4413), Some(629), Some("서울특별시 관악구 신림동 산56-1"), Some("경기도 과천시 특정도로명주소-1")),
                place(2, "B", (126.9700, 37.4450), Some(500), Some("경기도 과천시 특정지번주소-1"), Some("경기도 과천시 특정도로명주소-2")),
                place(3, "C", (126.9800, 37.4500), None, Some("경기도 과천시 특정지번주소-2"), None),
            ],
            intervals: vec![
                ab,
                interval(
                    11,
                    "B-C",
                    (2, 3),
                    vec![(126.9700, 37.4450, 500.0), (126.9800, 37.4500, 300.0)],
                    800,
                    (20, 25),
                ),
                interval(
                    12,
                    "A-C",
                    (1, 3),
                    vec![
                        (126.9640, 37.4413, 629.0),
                        (126.9720, 37.4470, 450.0),
                        (126.9800, 37.4500, 300.0),
                    ],
                    1550,
                    (60, 50),
                ),
            ],
            courses: vec![
                FakeCourse {
                    id: 1,
                    name: "관악산 둘레길".to_string(),
                    description: Some("관악산을 한 바퀴 도는 코스".to_string()),
                    published: true,
                    difficulty_id: 1,
                    style_id: 1,
                    images: vec![
                        image(1, "https://img.example/course-1.jpg", Some("정상")),
                        image(1, "https://img.example/course-2.jpg", None),
                    ],
                    links: vec![(10, 1, false), (11, 2, false), (12, 3, true)],
                },
                FakeCourse {
                    id: 2,
                    name: "비공개 코스".to_string(),
                    description: None,
                    published: false,
                    difficulty_id: 1,
                    style_id: 1,
                    images: Vec::new(),
                    links: vec![(10, 1, false)],
                },
                FakeCourse {
                    id: 3,
                    name: "신림 계곡길".to_string(),
                    description: None,
                    published: true,
                    difficulty_id: 2,
                    style_id: 2,
                    images: Vec::new(),
                    links: vec![(10, 1, false)],
                },
            ],
            weather_area: None,
            broken: false,
        }
    }

    fn check(&self) -> Result<()> {
        if self.broken {
            return Err(AppError::Database("connection refused".to_string()));
        }
        Ok(())
    }

    fn published(&self, course_id: i32) -> Option<&FakeCourse> {
        self.courses.iter().find(|c| c.id == course_id && c.published)
    }

    fn interval(&self, id: i32) -> &FakeInterval {
        self.intervals.iter().find(|i| i.id == id).expect("interval exists")
    }

    fn place(&self, id: i32) -> &PlaceRow {
        self.places.iter().find(|p| p.id == id).expect("place exists")
    }

    fn endpoint_places(&self, course: &FakeCourse) -> Vec<&PlaceRow> {
        course
            .links
            .iter()
            .flat_map(|(interval_id, _, _)| {
                let interval = self.interval(*interval_id);
                [self.place(interval.place_a_id), self.place(interval.place_b_id)]
            })
            .collect()
    }

    fn matches(&self, course: &FakeCourse, filter: &CourseSearchFilter) -> bool {
        if !course.published {
            return false;
        }
        if !filter.difficulties.is_empty() && !filter.difficulties.contains(&course.difficulty_id) {
            return false;
        }
        if !filter.course_styles.is_empty() && !filter.course_styles.contains(&course.style_id) {
            return false;
        }
        match filter.word.as_deref() {
            Some(word) => {
                course.name.contains(word)
                    || self.endpoint_places(course).iter().any(|p| {
                        [&p.land_address, &p.road_address]
                            .iter()
                            .any(|a| a.as_deref().is_some_and(|a| a.contains(word)))
                    })
            }
            None => true,
        }
    }

    fn address_rows(&self, course: &FakeCourse) -> Vec<CourseAddressRow> {
        let difficulty = self.difficulties.iter().find(|d| d.id == course.difficulty_id).expect("difficulty exists");
        let style = self.styles.iter().find(|s| s.id == course.style_id).expect("style exists");
        let mut rows = Vec::new();
        for (interval_id, _, _) in &course.links {
            let interval = self.interval(*interval_id);
            let ends = [self.place(interval.place_a_id), self.place(interval.place_b_id)];
            for land in ends {
                for road in ends {
                    rows.push(CourseAddressRow {
                        id: course.id,
                        name: course.name.clone(),
                        difficulty_id: difficulty.id,
                        difficulty_code: difficulty.code.clone(),
                        difficulty_name: difficulty.name.clone(),
                        difficulty_level: difficulty.level,
                        course_style_id: style.id,
                        course_style_code: style.code.clone(),
                        course_style_name: style.name.clone(),
                        land_address: land.land_address.clone(),
                        road_address: road.road_address.clone(),
                    });
                }
            }
        }
        rows
    }
}

#[async_trait]
impl CourseRepository for FakeStore {
    async fn search_course_ids(&self, filter: &CourseSearchFilter) -> Result<Vec<i32>> {
        self.check()?;
        let mut matched: Vec<&FakeCourse> =
            self.courses.iter().filter(|c| self.matches(c, filter)).collect();
        matched.sort_by_key(|c| {
            let name_match = filter.word.as_deref().is_some_and(|w| c.name.contains(w));
            (!name_match, c.id)
        });
        Ok(matched
            .into_iter()
            .skip(filter.offset() as usize)
            .take(filter.page_size as usize)
            .map(|c| c.id)
            .collect())
    }

    async fn count_courses(&self, filter: &CourseSearchFilter) -> Result<u64> {
        self.check()?;
        Ok(self.courses.iter().filter(|c| self.matches(c, filter)).count() as u64)
    }

    async fn course_list_rows(&self, course_ids: &[i32]) -> Result<Vec<CourseAddressRow>> {
        self.check()?;
        Ok(course_ids
            .iter()
            .filter_map(|id| self.published(*id))
            .flat_map(|c| self.address_rows(c))
            .collect())
    }

    async fn course_detail_rows(&self, course_id: i32) -> Result<Vec<CourseDetailRow>> {
        self.check()?;
        let Some(course) = self.published(course_id) else {
            return Ok(Vec::new());
        };
        Ok(self
            .address_rows(course)
            .into_iter()
            .map(|base| CourseDetailRow {
                base,
                description: course.description.clone(),
            })
            .collect())
    }

    async fn course_images(&self, course_id: i32) -> Result<Vec<ImageRow>> {
        self.check()?;
        Ok(self.published(course_id).map(|c| c.images.clone()).unwrap_or_default())
    }

    async fn course_intervals(&self, course_id: i32) -> Result<Vec<CourseIntervalRow>> {
        self.check()?;
        let Some(course) = self.published(course_id) else {
            return Ok(Vec::new());
        };
        let mut links = course.links.clone();
        links.sort_by_key(|(_, position, _)| *position);
        Ok(links
            .into_iter()
            .map(|(interval_id, position, is_reversed)| {
                let i = self.interval(interval_id);
                CourseIntervalRow {
                    interval_id,
                    position,
                    is_reversed,
                    name: i.name.clone(),
                    description: Some("설명".to_string()),
                    forward_description: i.forward_description.clone(),
                    reverse_description: i.reverse_description.clone(),
                    geom: line_geojson(&i.points),
                    place_a_id: i.place_a_id,
                    place_b_id: i.place_b_id,
                    length_m: i.length_m,
                    duration_ab_minutes: i.duration_ab_minutes,
                    duration_ba_minutes: i.duration_ba_minutes,
                    difficulty_id: i.steep.then_some(1),
                    difficulty_code: i.steep.then(|| "steep".to_string()),
                    difficulty_name: i.steep.then(|| "급경사".to_string()),
                    difficulty_level: i.steep.then_some(2),
                }
            })
            .collect())
    }

    async fn interval_images(&self, interval_ids: &[i32]) -> Result<Vec<ImageRow>> {
        self.check()?;
        Ok(self
            .intervals
            .iter()
            .filter(|i| interval_ids.contains(&i.id))
            .flat_map(|i| i.images.clone())
            .collect())
    }

    async fn difficulties(&self) -> Result<Vec<CourseDifficulty>> {
        self.check()?;
        Ok(self.difficulties.clone())
    }

    async fn styles(&self) -> Result<Vec<CourseStyle>> {
        self.check()?;
        Ok(self.styles.clone())
    }
}

#[async_trait]
impl PlaceRepository for FakeStore {
    async fn get_places(&self, place_ids: &[i32]) -> Result<Vec<PlaceRow>> {
        self.check()?;
        Ok(self
            .places
            .iter()
            .filter(|p| place_ids.contains(&p.id))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl WeatherAreaRepository for FakeStore {
    async fn nearest_mountain_area_code(&self, _lat: f64, _lon: f64) -> Result<Option<i32>> {
        self.check()?;
        Ok(self.weather_area)
    }
}

// ─── Apps ────────────────────────────────────────────────────

/// Create a test app over the given store.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_app_with(store: FakeStore) -> (axum::Router, Arc<AppState>) {
    let config = Config::test_default();
    let store = Arc::new(store);

    let course_service = CourseService::new(store.clone(), store.clone());
    let kma = KmaClient::new(&config.kma_api_url, config.kma_auth_key.clone());
    let weather_service = WeatherService::new(
        store,
        kma,
        Duration::from_secs(config.weather_cache_ttl_secs),
    );

    let state = Arc::new(AppState {
        config,
        course_service,
        weather_service,
    });

    (create_router(state.clone()), state)
}

/// Create a test app over the scenario fixture.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    create_app_with(FakeStore::scenario())
}

/// GET `uri` and return the status and JSON body.
#[allow(dead_code)]
pub async fn get_json(app: axum::Router, uri: &str) -> (axum::http::StatusCode, serde_json::Value) {
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt; // for oneshot

    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, body)
}

/// Percent-encode a query value (URIs must be ASCII).
#[allow(dead_code)]
pub fn query_escape(value: &str) -> String {
    value
        .bytes()
        .map(|b| match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                (b as char).to_string()
            }
            _ => format!("%{:02X}", b),
        })
        .collect()
}
