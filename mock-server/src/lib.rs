//! Minimal stand-in for the REST Countries v3.1 API.
//!
//! Serves a fixed fixture set with the two endpoints the app uses. Records are
//! kept as raw JSON so the server stays independent of the core's types;
//! integration tests catch schema drift.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tokio::net::TcpListener;
use tracing::debug;

/// Fixture data served by `app()`.
pub const FIXTURE: &str = include_str!("../fixtures/countries.json");

pub type Db = Arc<Vec<Value>>;

#[derive(Debug, Default, Deserialize)]
pub struct FieldsQuery {
    pub fields: Option<String>,
}

/// Router over the bundled fixture.
pub fn app() -> Router {
    let countries: Vec<Value> =
        serde_json::from_str(FIXTURE).expect("bundled fixture is valid JSON");
    app_with(countries)
}

/// Router over caller-supplied records.
pub fn app_with(countries: Vec<Value>) -> Router {
    let db: Db = Arc::new(countries);
    Router::new()
        .route("/all", get(list_countries))
        .route("/capital/{capital}", get(countries_by_capital))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn list_countries(
    State(db): State<Db>,
    Query(query): Query<FieldsQuery>,
) -> Json<Vec<Value>> {
    let countries: Vec<Value> = match query.fields.as_deref() {
        Some(fields) => db.iter().map(|c| project(c, fields)).collect(),
        None => db.as_ref().clone(),
    };
    debug!(count = countries.len(), "serving /all");
    Json(countries)
}

async fn countries_by_capital(
    State(db): State<Db>,
    Path(capital): Path<String>,
) -> Result<Json<Vec<Value>>, (StatusCode, Json<Value>)> {
    let needle = capital.to_lowercase();
    let matches: Vec<Value> = db
        .iter()
        .filter(|c| {
            c["capital"].as_array().is_some_and(|caps| {
                caps.iter()
                    .filter_map(Value::as_str)
                    .any(|cap| cap.to_lowercase() == needle)
            })
        })
        .cloned()
        .collect();
    debug!(%capital, count = matches.len(), "serving /capital");
    if matches.is_empty() {
        return Err((
            StatusCode::NOT_FOUND,
            Json(json!({"status": 404, "message": "Not Found"})),
        ));
    }
    Ok(Json(matches))
}

/// Keep only the comma-separated top-level `fields` of a record.
fn project(country: &Value, fields: &str) -> Value {
    let Some(object) = country.as_object() else {
        return country.clone();
    };
    let projected: Map<String, Value> = fields
        .split(',')
        .map(str::trim)
        .filter_map(|f| object.get(f).map(|v| (f.to_string(), v.clone())))
        .collect();
    Value::Object(projected)
}
