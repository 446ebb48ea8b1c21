use catalog_core::{
    CatalogClient, CatalogConfig, DetailController, FavoritesNamespace, FetchFailure,
    FetchOutcome, HttpCatalogClient, SqliteFavoritesStore,
};
use httpmock::prelude::*;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

fn config_for(server: &MockServer) -> CatalogConfig {
    CatalogConfig {
        api_base_url: server.base_url().parse().expect("valid URL"),
        api_key: Some("secret".to_string()),
        language: Some("pt-BR".to_string()),
        request_timeout: Duration::from_secs(5),
        ..CatalogConfig::default()
    }
}

#[tokio::test]
async fn fetch_item_decodes_full_record() {
    let server = MockServer::start_async().await;
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/movie/42")
            .query_param("api_key", "secret")
            .query_param("language", "pt-BR");
        then.status(200).json_body(json!({
            "id": 42,
            "title": "X",
            "overview": null,
            "vote_average": 7.5,
            "poster_path": "/x.jpg",
            "homepage": "",
            "genres": [{ "id": 18, "name": "Drama" }, { "id": 80, "name": "Crime" }],
            "runtime": 120
        }));
    });

    let client = HttpCatalogClient::new(&config_for(&server)).unwrap();
    let item = client.fetch_item("42").await.unwrap();

    mock.assert();
    assert_eq!(item.id, 42);
    assert_eq!(item.title, "X");
    assert_eq!(item.rating_label(), "7.5/10");
    assert!(!item.has_homepage());
    assert_eq!(
        item.genres.iter().map(|genre| genre.name.as_str()).collect::<Vec<_>>(),
        vec!["Drama", "Crime"]
    );
}

#[tokio::test]
async fn not_found_status_maps_to_not_found() {
    let server = MockServer::start_async().await;
    server.mock(|when, then| {
        when.method(GET).path("/movie/404");
        then.status(404).json_body(json!({ "status_code": 34 }));
    });

    let client = HttpCatalogClient::new(&config_for(&server)).unwrap();
    let err = client.fetch_item("404").await.unwrap_err();

    assert_eq!(err, FetchFailure::NotFound("404".to_string()));
}

#[tokio::test]
async fn server_error_maps_to_status() {
    let server = MockServer::start_async().await;
    server.mock(|when, then| {
        when.method(GET).path("/movie/1");
        then.status(503);
    });

    let client = HttpCatalogClient::new(&config_for(&server)).unwrap();
    let err = client.fetch_item("1").await.unwrap_err();

    assert_eq!(err, FetchFailure::Status(503));
    assert_eq!(err.code(), "unexpected_status");
}

#[tokio::test]
async fn undecodable_or_invalid_body_maps_to_malformed() {
    let server = MockServer::start_async().await;
    server.mock(|when, then| {
        when.method(GET).path("/movie/2");
        then.status(200).body("<html>maintenance</html>");
    });
    server.mock(|when, then| {
        when.method(GET).path("/movie/3");
        then.status(200)
            .json_body(json!({ "id": 3, "title": "Y", "vote_average": 11.0 }));
    });

    let client = HttpCatalogClient::new(&config_for(&server)).unwrap();

    assert!(matches!(
        client.fetch_item("2").await,
        Err(FetchFailure::Malformed(_))
    ));
    assert!(matches!(
        client.fetch_item("3").await,
        Err(FetchFailure::Malformed(_))
    ));
}

#[tokio::test]
async fn unreachable_service_maps_to_unreachable() {
    let config = CatalogConfig {
        api_base_url: "http://127.0.0.1:9/".parse().unwrap(),
        request_timeout: Duration::from_secs(2),
        ..CatalogConfig::default()
    };
    let client = HttpCatalogClient::new(&config).unwrap();

    assert!(matches!(
        client.fetch_item("42").await,
        Err(FetchFailure::Unreachable(_))
    ));
}

#[tokio::test]
async fn detail_controller_runs_against_http_and_sqlite() {
    let server = MockServer::start_async().await;
    let mock = server.mock(|when, then| {
        when.method(GET).path("/movie/42");
        then.status(200)
            .json_body(json!({ "id": 42, "title": "X", "vote_average": 7.5, "genres": [] }));
    });
    let client = Arc::new(HttpCatalogClient::new(&config_for(&server)).unwrap());
    let store = Arc::new(SqliteFavoritesStore::open_in_memory().unwrap());
    let controller = DetailController::new(client, store, FavoritesNamespace::default());

    assert_eq!(controller.start("42").await, FetchOutcome::Loaded);
    assert!(controller.toggle_favorite().await.unwrap());

    mock.assert_hits(1);
    let state = controller.snapshot();
    assert!(!state.is_loading());
    assert!(state.is_favorite());
}
