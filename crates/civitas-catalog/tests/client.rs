//! Integration tests for `CatalogClient` using wiremock HTTP mocks.

use civitas_catalog::{CatalogClient, CatalogError};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(base_url: &str) -> CatalogClient {
    CatalogClient::new(base_url, 5, "civitas-catalog/0.1 (test)")
        .expect("client construction should not fail")
}

async fn mount_token(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/Usuarios/GetToken"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "token": "tok-123",
            "vigencia": "2026-12-31 23:59:59"
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn authenticate_stores_token_and_expiry() {
    let server = MockServer::start().await;
    mount_token(&server).await;

    let mut client = test_client(&server.uri());
    assert!(!client.is_authenticated());

    client.authenticate(None, None).await.expect("token expected");
    assert!(client.is_authenticated());
    assert_eq!(client.token_expiry(), Some("2026-12-31 23:59:59"));
}

#[tokio::test]
async fn authenticate_accepts_capitalised_fields() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/Usuarios/GetToken"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "Token": "tok-upper",
            "Vigencia": "2026-06-30"
        })))
        .mount(&server)
        .await;

    let mut client = test_client(&server.uri());
    client.authenticate(None, None).await.expect("token expected");
    assert!(client.is_authenticated());
}

#[tokio::test]
async fn authenticate_accepts_plain_text_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/Usuarios/GetToken"))
        .respond_with(ResponseTemplate::new(200).set_body_string("  raw-token-body \n"))
        .mount(&server)
        .await;

    let mut client = test_client(&server.uri());
    client.authenticate(None, None).await.expect("token expected");
    assert!(client.is_authenticated());
}

#[tokio::test]
async fn authenticate_forwards_application_credentials() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/Usuarios/GetToken"))
        .and(body_json(serde_json::json!({
            "usuario": "svc-desur",
            "contrasena": "secret"
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "token": "tok-creds" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let mut client = test_client(&server.uri());
    client
        .authenticate(Some("svc-desur"), Some("secret"))
        .await
        .expect("token expected");
}

#[tokio::test]
async fn unauthorized_token_request_is_auth_required_not_silent_fallback() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/Usuarios/GetToken"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let mut client = test_client(&server.uri());
    let result = client.authenticate(None, None).await;
    assert!(
        matches!(result, Err(CatalogError::AuthRequired)),
        "401 must surface as AuthRequired, got: {result:?}"
    );
    assert!(!client.is_authenticated());
}

#[tokio::test]
async fn catalog_call_without_token_is_not_authenticated() {
    let server = MockServer::start().await;
    let client = test_client(&server.uri());

    let result = client.get_colonias().await;
    assert!(matches!(result, Err(CatalogError::NotAuthenticated)));
    assert!(
        server.received_requests().await.unwrap().is_empty(),
        "no request may leave the process without a token"
    );
}

#[tokio::test]
async fn get_colonias_sends_bearer_token() {
    let server = MockServer::start().await;
    mount_token(&server).await;

    Mock::given(method("POST"))
        .and(path("/GetColonias"))
        .and(header("authorization", "Bearer tok-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            { "id_colonia": 1, "colonia": "CENTRO" },
            { "id_colonia": 4, "colonia": "SAN FELIPE" }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let mut client = test_client(&server.uri());
    client.authenticate(None, None).await.unwrap();

    let colonias = client.get_colonias().await.expect("colonias expected");
    assert_eq!(colonias.len(), 2);
    assert_eq!(colonias[0].colonia, "CENTRO");
}

#[tokio::test]
async fn get_calles_posts_colonia_id() {
    let server = MockServer::start().await;
    mount_token(&server).await;

    Mock::given(method("POST"))
        .and(path("/GetCalles"))
        .and(body_json(serde_json::json!({ "id_colonia": 4 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            { "id_calle": 15506, "calle": "CALLE JUAREZ" }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let mut client = test_client(&server.uri());
    client.authenticate(None, None).await.unwrap();

    let calles = client.get_calles(4).await.expect("calles expected");
    assert_eq!(calles[0].id_calle, 15506);
}

#[tokio::test]
async fn exterior_numbers_with_null_coordinates_deserialize() {
    let server = MockServer::start().await;
    mount_token(&server).await;

    Mock::given(method("POST"))
        .and(path("/GetNumerosExteriores"))
        .and(body_json(serde_json::json!({ "id_colonia": 4, "id_calle": 15506 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            { "numero": "101", "latitud": "28.6329957", "longitud": "-106.0691004", "distrito": "1" },
            { "numero": "107", "latitud": null, "longitud": null, "distrito": null }
        ])))
        .mount(&server)
        .await;

    let mut client = test_client(&server.uri());
    client.authenticate(None, None).await.unwrap();

    let numbers = client
        .get_exterior_numbers(4, 15506)
        .await
        .expect("numbers expected");
    assert_eq!(numbers.len(), 2);
    assert!(numbers[0].coordinates().is_some());
    assert!(numbers[1].coordinates().is_none());
}

#[tokio::test]
async fn expired_token_surfaces_auth_required() {
    let server = MockServer::start().await;
    mount_token(&server).await;

    Mock::given(method("POST"))
        .and(path("/GetColonias"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let mut client = test_client(&server.uri());
    client.authenticate(None, None).await.unwrap();

    let result = client.get_colonias().await;
    assert!(matches!(result, Err(CatalogError::AuthRequired)));
}

#[tokio::test]
async fn search_colonia_filters_client_side() {
    let server = MockServer::start().await;
    mount_token(&server).await;

    Mock::given(method("POST"))
        .and(path("/GetColonias"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            { "id_colonia": 1, "colonia": "CENTRO" },
            { "id_colonia": 7, "colonia": "QUINTAS CAROLINAS" },
            { "id_colonia": 8, "colonia": "QUINTAS DEL SOL" }
        ])))
        .mount(&server)
        .await;

    let mut client = test_client(&server.uri());
    client.authenticate(None, None).await.unwrap();

    let hits = client.search_colonia("quintas").await.expect("hits expected");
    assert_eq!(hits.len(), 2);
}

#[tokio::test]
async fn search_by_postal_code_returns_empty_on_error_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/colonias/buscar-cp"))
        .and(query_param("cp", "31125"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let hits = client
        .search_colonia_by_cp("31125")
        .await
        .expect("error statuses collapse to an empty list");
    assert!(hits.is_empty());
}

#[tokio::test]
async fn complete_address_aggregates_catalog_calls() {
    let server = MockServer::start().await;
    mount_token(&server).await;

    Mock::given(method("POST"))
        .and(path("/GetColonias"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            { "id_colonia": 4, "colonia": "SAN FELIPE" }
        ])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/GetCalles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            { "id_calle": 15506, "calle": "CALLE JUAREZ" }
        ])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/GetNumerosExteriores"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            { "numero": "101", "latitud": "28.63", "longitud": "-106.07", "distrito": "1" }
        ])))
        .mount(&server)
        .await;

    let mut client = test_client(&server.uri());
    client.authenticate(None, None).await.unwrap();

    let complete = client
        .complete_address(4, 15506)
        .await
        .expect("aggregation expected");
    assert_eq!(complete.colonia.unwrap().colonia, "SAN FELIPE");
    assert_eq!(complete.calle.unwrap().calle, "CALLE JUAREZ");
    assert_eq!(complete.total_numeros, 1);
}
