//! Router-level tests for the public listing pages and the admin CRUD.

use axum::{
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
    response::Response,
};
use serde_json::{Value, json};
use tower::ServiceExt;

#[path = "test_utils/mod.rs"]
mod test_utils;

use test_utils::{TestApp, property_form};

async fn body_json(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn get(app: &TestApp, uri: &str) -> Response {
    app.router
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn admin_request(
    app: &TestApp,
    token: &str,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> Response {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"));
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.router.clone().oneshot(request).await.unwrap()
}

#[tokio::test]
async fn listing_page_returns_cards_with_placeholder_image() {
    let app = TestApp::new().await.unwrap();
    app.insert_property(property_form("Residencial Jardins"))
        .await
        .unwrap();

    let response = get(&app, "/api/properties").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["total"], 1);
    let card = &body["properties"][0];
    assert_eq!(card["title"], "Residencial Jardins");
    assert_eq!(card["price"], "R$ 850.000");
    assert_eq!(card["bedrooms"], "2 e 3 dormitórios");
    assert_eq!(card["link"], "/empreendimentos/residencial-jardins");
    assert_eq!(card["image"], "/assets/temporario tela.png");
}

#[tokio::test]
async fn listing_filters_narrow_results() {
    let app = TestApp::new().await.unwrap();
    app.insert_property(property_form("Residencial Jardins"))
        .await
        .unwrap();

    let mut moema = property_form("Edifício Moema");
    moema.bairro = "Moema".to_string();
    moema.valor = Some(1_500_000.0);
    moema.areas_disponiveis = vec![120.0];
    moema.status_empreendimento = "Pronto".to_string();
    app.insert_property(moema).await.unwrap();

    let body = body_json(get(&app, "/api/properties?bairro=moema").await).await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["properties"][0]["title"], "Edifício Moema");

    let body = body_json(get(&app, "/api/properties?valor_max=900000").await).await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["properties"][0]["title"], "Residencial Jardins");

    let body = body_json(get(&app, "/api/properties?area=150").await).await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["properties"][0]["neighborhood"], "Moema");

    // An unparseable bound is ignored.
    let body = body_json(get(&app, "/api/properties?valor_min=abc").await).await;
    assert_eq!(body["total"], 2);
}

#[tokio::test]
async fn home_and_featured_feeds_follow_flags() {
    let app = TestApp::new().await.unwrap();

    let mut home = property_form("Casa Home");
    home.home = true;
    app.insert_property(home).await.unwrap();

    let mut featured = property_form("Casa Destaque");
    featured.destaque = true;
    app.insert_property(featured).await.unwrap();

    app.insert_property(property_form("Casa Comum")).await.unwrap();

    let home = body_json(get(&app, "/api/properties/home").await).await;
    let titles: Vec<&str> = home
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Casa Home"]);

    let featured = body_json(get(&app, "/api/properties/featured").await).await;
    assert_eq!(featured.as_array().unwrap().len(), 1);
    assert_eq!(featured[0]["title"], "Casa Destaque");
}

#[tokio::test]
async fn detail_page_includes_related_and_formatted_options() {
    let app = TestApp::new().await.unwrap();

    let main = app
        .insert_property(property_form("Residencial Jardins"))
        .await
        .unwrap();
    let mut other = property_form("Vila Mariana Prime");
    other.home = true;
    app.insert_property(other).await.unwrap();

    let response = get(&app, "/api/properties/residencial-jardins").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["property"]["id"], main.id.to_string());
    assert_eq!(body["quartos"], "2 e 3 dormitórios");
    assert_eq!(body["banheiros"], "2 banheiro");
    assert_eq!(body["price"], "R$ 850.000");
    assert_eq!(body["related"].as_array().unwrap().len(), 1);
    assert_eq!(body["related"][0]["title"], "Vila Mariana Prime");
}

#[tokio::test]
async fn unknown_slug_is_not_found() {
    let app = TestApp::new().await.unwrap();

    let response = get(&app, "/api/properties/nao-existe").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["code"], "PROPERTY_NOT_FOUND");
}

#[tokio::test]
async fn filter_options_collect_distinct_values() {
    let app = TestApp::new().await.unwrap();
    app.insert_property(property_form("Residencial Jardins"))
        .await
        .unwrap();
    let mut moema = property_form("Edifício Moema");
    moema.bairro = "Moema".to_string();
    app.insert_property(moema).await.unwrap();

    let body = body_json(get(&app, "/api/properties/filters").await).await;
    assert_eq!(body["bairros"], json!(["Jardins", "Moema"]));
    assert_eq!(body["tipos"], json!(["Apartamento"]));
    assert!(body["caracteristicas"].as_array().unwrap().len() > 10);
}

#[tokio::test]
async fn images_endpoint_rejects_bad_ids() {
    let app = TestApp::new().await.unwrap();

    let response = get(&app, "/api/properties/images?ids=abc").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let property = app
        .insert_property(property_form("Residencial Jardins"))
        .await
        .unwrap();
    let response = get(&app, &format!("/api/properties/images?ids={}", property.id)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert!(body[property.id.to_string()].is_object());
}

#[tokio::test]
async fn admin_can_create_update_and_delete_property() {
    let app = TestApp::new().await.unwrap();
    let token = app.admin_token().await.unwrap();

    let form = serde_json::to_value(property_form("Residencial Jardins")).unwrap();
    let response = admin_request(&app, &token, "POST", "/api/admin/properties", Some(form)).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    assert_eq!(created["slug"], "residencial-jardins");
    assert_eq!(created["cidade"], "São Paulo");
    assert_eq!(created["responsavel_criacao"], "admin");
    let id = created["id"].as_str().unwrap().to_string();

    let mut update = property_form("Residencial Jardins");
    update.valor = Some(900_000.0);
    let response = admin_request(
        &app,
        &token,
        "PUT",
        &format!("/api/admin/properties/{id}"),
        Some(serde_json::to_value(update).unwrap()),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["valor"], 900_000.0);

    let response = admin_request(
        &app,
        &token,
        "DELETE",
        &format!("/api/admin/properties/{id}"),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = admin_request(
        &app,
        &token,
        "GET",
        &format!("/api/admin/properties/{id}"),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn admin_create_reports_every_invalid_field() {
    let app = TestApp::new().await.unwrap();
    let token = app.admin_token().await.unwrap();

    let response = admin_request(
        &app,
        &token,
        "POST",
        "/api/admin/properties",
        Some(json!({ "titulo": "Sem dados" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert_eq!(body["code"], "VALIDATION_FAILED");
    let details = &body["details"];
    for field in ["titulo_descricao", "valor", "bairro", "area_texto", "quartos", "iframe_mapa"] {
        assert!(details.get(field).is_some(), "missing error for {field}");
    }
}

#[tokio::test]
async fn duplicate_slug_is_a_conflict() {
    let app = TestApp::new().await.unwrap();
    let token = app.admin_token().await.unwrap();
    app.insert_property(property_form("Residencial Jardins"))
        .await
        .unwrap();

    let form = serde_json::to_value(property_form("Residencial Jardins")).unwrap();
    let response = admin_request(&app, &token, "POST", "/api/admin/properties", Some(form)).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let body = body_json(response).await;
    assert_eq!(body["code"], "SLUG_TAKEN");
    assert_eq!(body["details"]["field"], "slug");
}

#[tokio::test]
async fn admin_search_matches_city_and_title() {
    let app = TestApp::new().await.unwrap();
    let token = app.admin_token().await.unwrap();

    let mut santos = property_form("Orla Santos");
    santos.cidade = Some("Santos".to_string());
    app.insert_property(santos).await.unwrap();
    app.insert_property(property_form("Residencial Jardins"))
        .await
        .unwrap();

    let response = admin_request(&app, &token, "GET", "/api/admin/properties?search=santos", None).await;
    let body = body_json(response).await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["properties"][0]["titulo"], "Orla Santos");

    let response = admin_request(&app, &token, "GET", "/api/admin/properties", None).await;
    assert_eq!(body_json(response).await["total"], 2);
}

#[tokio::test]
async fn malformed_admin_id_is_a_validation_error() {
    let app = TestApp::new().await.unwrap();
    let token = app.admin_token().await.unwrap();

    let response = admin_request(&app, &token, "GET", "/api/admin/properties/abc", None).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_FAILED");
}

#[tokio::test]
async fn malformed_property_body_is_a_problem_response() {
    let app = TestApp::new().await.unwrap();
    let token = app.admin_token().await.unwrap();

    let request = Request::builder()
        .method("POST")
        .uri("/api/admin/properties")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"titulo\": "))
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/problem+json"
    );
    let body = body_json(response).await;
    assert_eq!(body["code"], "VALIDATION_FAILED");
    assert!(body["message"].as_str().unwrap().starts_with("JSON syntax error"));
}
