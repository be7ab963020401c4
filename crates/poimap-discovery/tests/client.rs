//! Integration tests for the discovery clients and pipeline using wiremock HTTP mocks.

use poimap_core::{Advisory, GeoPoint, SearchRadius};
use poimap_discovery::{
    DiscoveryError, DiscoveryPipeline, EnrichmentClient, GeoSearchClient, HttpSettings,
};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const MILAN: GeoPoint = GeoPoint::new(45.46, 9.19);

fn settings(max_retries: u32) -> HttpSettings {
    HttpSettings {
        timeout_secs: 5,
        user_agent: "poimap-test/0.1".to_owned(),
        max_retries,
        backoff_base_ms: 0,
    }
}

fn search_client(base_url: &str) -> GeoSearchClient {
    GeoSearchClient::with_base_url(base_url, settings(0))
        .expect("client construction should not fail")
}

fn enrichment_client(base_url: &str) -> EnrichmentClient {
    EnrichmentClient::with_base_url(base_url, "en", settings(0))
        .expect("client construction should not fail")
}

fn enrichment_body(title: &str, geometry: Option<&str>) -> serde_json::Value {
    json!({
        "content": { "title": title, "description": format!("{title} description") },
        "media": { "image": format!("{title}.jpg"), "geometry": geometry }
    })
}

async fn mount_enrichment(server: &MockServer, key: &str, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(format!("/pois/{key}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn nearby_sends_center_and_radius_and_parses_candidates() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/pois/nearby"))
        .and(query_param("lat", "45.46"))
        .and(query_param("lng", "9.19"))
        .and(query_param("radius", "5000"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": "duomo", "public": true, "geometry": "[9.1916, 45.4641]" },
            { "id": 7, "public": "true", "geometry": [9.18, 45.47] },
            { "id": "private", "public": false }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let candidates = search_client(&server.uri())
        .nearby(MILAN, SearchRadius::default())
        .await
        .expect("should parse candidates");

    assert_eq!(candidates.len(), 3);
    assert_eq!(candidates[0].id.as_deref(), Some("duomo"));
    assert_eq!(candidates[1].id.as_deref(), Some("7"));
    assert!(candidates[1].is_public());
    assert!(!candidates[2].is_public());
    assert!(candidates[2].geometry.is_none());
}

#[tokio::test]
async fn nearby_surfaces_server_errors() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/pois/nearby"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let result = search_client(&server.uri())
        .nearby(MILAN, SearchRadius::default())
        .await;

    assert!(
        matches!(result, Err(DiscoveryError::UnexpectedStatus { status: 502, .. })),
        "expected UnexpectedStatus(502), got: {result:?}"
    );
}

#[tokio::test]
async fn nearby_retries_transient_failures() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/pois/nearby"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/pois/nearby"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let client = GeoSearchClient::with_base_url(&server.uri(), settings(2)).unwrap();
    let candidates = client
        .nearby(MILAN, SearchRadius::default())
        .await
        .expect("second attempt should succeed");
    assert!(candidates.is_empty());
}

#[tokio::test]
async fn nearby_rejects_non_array_body() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/pois/nearby"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let result = search_client(&server.uri())
        .nearby(MILAN, SearchRadius::default())
        .await;
    assert!(matches!(result, Err(DiscoveryError::Deserialize { .. })));
}

#[tokio::test]
async fn nearby_keeps_candidates_alongside_malformed_fields() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/pois/nearby"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": "duomo", "public": true, "geometry": "[9.1916, 45.4641]" },
            { "id": "hidden", "public": false, "geometry": [9.19, null] },
            { "id": "odd", "public": 1, "geometry": { "type": "Point" } },
            { "id": null, "public": true, "geometry": 42 },
            { "id": "castello", "public": "true", "geometry": [9.1795, 45.4705] }
        ])))
        .mount(&server)
        .await;

    let candidates = search_client(&server.uri())
        .nearby(MILAN, SearchRadius::default())
        .await
        .expect("one malformed hit must not fail the response");

    assert_eq!(candidates.len(), 5);
    let public: Vec<_> = candidates
        .iter()
        .filter(|c| c.is_public())
        .filter_map(|c| c.id.as_deref())
        .collect();
    assert_eq!(public, vec!["duomo", "castello"]);
}

#[tokio::test]
async fn pipeline_over_http_drops_only_the_malformed_candidate() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/pois/nearby"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": "duomo", "public": true, "geometry": "[9.1916, 45.4641]" },
            { "id": "broken", "public": true, "geometry": [9.19, null] },
            { "id": "hidden", "public": false, "geometry": { "type": "Point" } }
        ])))
        .mount(&server)
        .await;
    mount_enrichment(&server, "duomo_en", enrichment_body("Duomo", None)).await;
    mount_enrichment(&server, "broken_en", enrichment_body("Broken", None)).await;

    let pipeline = DiscoveryPipeline::new(
        search_client(&server.uri()),
        enrichment_client(&server.uri()),
        4,
    );
    let outcome = pipeline.discover(MILAN, SearchRadius::default()).await;

    assert!(outcome.advisory.is_none());
    assert_eq!(outcome.pois.len(), 1);
    assert_eq!(outcome.pois[0].id, "duomo");
    assert_eq!(outcome.stats.candidates, 3);
    assert_eq!(outcome.stats.dropped, 1);
}

#[tokio::test]
async fn enrichment_fetch_uses_locale_suffixed_key() {
    let server = MockServer::start().await;
    mount_enrichment(
        &server,
        "duomo_en",
        enrichment_body("Duomo", Some("[9.1916, 45.4641]")),
    )
    .await;

    let record = enrichment_client(&server.uri())
        .fetch("duomo")
        .await
        .expect("should parse record");

    assert_eq!(record.content.title, "Duomo");
    assert_eq!(record.image(), Some("Duomo.jpg"));
    assert!(record.geometry().is_some());
}

#[tokio::test]
async fn enrichment_not_found_is_an_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/pois/ghost_en"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let result = enrichment_client(&server.uri()).fetch("ghost").await;
    assert!(matches!(
        result,
        Err(DiscoveryError::UnexpectedStatus { status: 404, .. })
    ));
}

#[tokio::test]
async fn pipeline_end_to_end_over_http() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/pois/nearby"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": "duomo", "public": true, "geometry": "[9.19, 45.46]" },
            { "id": "galleria", "public": "true", "geometry": "[9.19, 45.46]" },
            { "id": "vault", "public": false, "geometry": "[9.19, 45.46]" }
        ])))
        .mount(&server)
        .await;
    mount_enrichment(
        &server,
        "duomo_en",
        enrichment_body("Duomo", Some("[9.1916, 45.4641]")),
    )
    .await;
    mount_enrichment(&server, "galleria_en", enrichment_body("Galleria", None)).await;

    let pipeline = DiscoveryPipeline::new(
        search_client(&server.uri()),
        enrichment_client(&server.uri()),
        4,
    );
    let outcome = pipeline.discover(MILAN, SearchRadius::default()).await;

    assert!(outcome.advisory.is_none());
    assert_eq!(outcome.pois.len(), 2);
    assert_eq!(outcome.pois[0].id, "duomo");
    assert_eq!(outcome.pois[0].coordinates, GeoPoint::new(45.4641, 9.1916));
    assert_eq!(outcome.pois[1].id, "galleria");
    assert_eq!(outcome.pois[1].coordinates, GeoPoint::new(45.46, 9.19));
    assert_eq!(outcome.stats.public, 2);
}

#[tokio::test]
async fn pipeline_tolerates_one_failed_enrichment() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/pois/nearby"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": "a", "public": true, "geometry": "[9.19, 45.46]" },
            { "id": "b", "public": true, "geometry": "[9.19, 45.46]" }
        ])))
        .mount(&server)
        .await;
    mount_enrichment(&server, "a_en", enrichment_body("A", None)).await;
    Mock::given(method("GET"))
        .and(path("/pois/b_en"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let pipeline = DiscoveryPipeline::new(
        search_client(&server.uri()),
        enrichment_client(&server.uri()),
        4,
    );
    let outcome = pipeline.discover(MILAN, SearchRadius::default()).await;

    assert_eq!(outcome.pois.len(), 1);
    assert_eq!(outcome.pois[0].id, "a");
    assert_eq!(outcome.stats.dropped, 1);
}

#[tokio::test]
async fn pipeline_reports_unreachable_search_as_advisory() {
    let pipeline = DiscoveryPipeline::new(
        search_client("http://127.0.0.1:1"),
        enrichment_client("http://127.0.0.1:1"),
        4,
    );
    let outcome = pipeline.discover(MILAN, SearchRadius::default()).await;

    assert!(outcome.pois.is_empty());
    assert!(matches!(outcome.advisory, Some(Advisory::SearchFailed { .. })));
}
