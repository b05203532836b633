use std::collections::HashMap;
use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use tokio::net::ToSocketAddrs;

use crate::watch::Registry;

#[derive(Debug, serde::Deserialize)]
pub struct StateParams {
    pub unit: Option<String>,
}

async fn export_state(
    State(registry): State<Arc<Registry>>,
    Query(params): Query<StateParams>,
) -> Response {
    let mut body: HashMap<&'static str, serde_json::Value> = HashMap::default();
    let units = match params.unit {
        Some(unit) => match registry.get(&unit) {
            Some(watcher) => {
                let snapshot = watcher.snapshot().await;
                HashMap::from([(unit, snapshot.fields)])
            }
            None => {
                log::debug!("export request for unwatched unit `{unit}`");
                return (
                    axum::http::StatusCode::NOT_FOUND,
                    format!("unit `{unit}` is not watched"),
                )
                    .into_response();
            }
        },
        None => registry.snapshot_all().await,
    };
    body.insert(
        "units",
        serde_json::to_value(units).expect("serialization failed"),
    );

    (axum::http::StatusCode::OK, Json(body)).into_response()
}

pub struct APIServer {
    router: axum::Router,
}

impl APIServer {
    pub async fn new(registry: Arc<Registry>) -> Self {
        let router = axum::Router::new()
            .route("/state", get(export_state))
            .with_state(registry);
        Self { router }
    }

    pub async fn listen(self, addr: impl ToSocketAddrs) {
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .expect("TCP Listener bind");
        axum::serve(listener, self.router.into_make_service())
            .await
            .unwrap()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::unit::UnitName;
    use crate::watch::{WatchConfig, Watcher};

    fn registry_with(units: &[&str]) -> Arc<Registry> {
        let registry = Registry::default();
        for unit in units {
            registry.register(Arc::new(Watcher::new(
                UnitName::new(unit).unwrap(),
                WatchConfig::for_interval(Duration::from_millis(5)),
            )));
        }
        Arc::new(registry)
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn lists_all_watched_units() {
        let registry = registry_with(&["nginx.service", "redis.service"]);
        let response = export_state(State(registry), Query(StateParams { unit: None })).await;
        assert_eq!(response.status(), axum::http::StatusCode::OK);

        let body = body_json(response).await;
        let units = body["units"].as_object().unwrap();
        assert_eq!(units.len(), 2);
        assert_eq!(units["nginx.service"]["current_state"], "unknown");
    }

    #[tokio::test]
    async fn filters_on_the_unit_parameter() {
        let registry = registry_with(&["nginx.service", "redis.service"]);
        let response = export_state(
            State(registry),
            Query(StateParams {
                unit: Some("redis.service".to_owned()),
            }),
        )
        .await;
        assert_eq!(response.status(), axum::http::StatusCode::OK);

        let body = body_json(response).await;
        let units = body["units"].as_object().unwrap();
        assert_eq!(units.len(), 1);
        assert!(units.contains_key("redis.service"));
    }

    #[tokio::test]
    async fn unknown_units_are_not_found() {
        let registry = registry_with(&["nginx.service"]);
        let response = export_state(
            State(registry),
            Query(StateParams {
                unit: Some("ghost.service".to_owned()),
            }),
        )
        .await;
        assert_eq!(response.status(), axum::http::StatusCode::NOT_FOUND);
    }
}
