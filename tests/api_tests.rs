use serde_json::{Value, json};
use tokio::net::TcpListener;
use training_admin::{AppConfig, AppState, Services, create_router};

#[derive(Debug)]
pub struct TestApp {
    pub address: String,
}

// The server runs on the in-memory store, so these tests need no database.
async fn spawn_app() -> TestApp {
    let state = AppState::new(Services::in_memory(), AppConfig::default());
    let router = create_router(state);

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    TestApp { address }
}

#[tokio::test]
async fn test_health_check() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/health", app.address))
        .send()
        .await
        .expect("req fail");

    assert!(response.status().is_success());
    assert!(response.headers().contains_key("x-request-id"));
    assert_eq!(response.text().await.unwrap(), "ok");
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let doc: Value = client
        .get(format!("{}/api-docs/openapi.json", app.address))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert!(doc["paths"]["/api/User/{id}/menu"].is_object());
    assert!(doc["components"]["schemas"]["CenterDto"].is_object());
}

#[tokio::test]
async fn test_center_lifecycle() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let base = format!("{}/api/Center", app.address);

    // 1. Create
    let response = client
        .post(&base)
        .json(&json!({ "name": "North", "address": "123 St" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 201);
    let created: Value = response.json().await.unwrap();
    let id = created["id"].as_i64().unwrap();
    assert!(id > 0);
    assert!(created["create_date"].is_string());
    assert_eq!(created["active"], true);

    // 2. Soft delete through the status toggle
    let response = client
        .delete(&base)
        .json(&json!({ "id": id, "active": false }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let stored: Value = client
        .get(format!("{}/{}", base, id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(stored["active"], false);
    assert!(stored["delete_date"].is_string());

    // 3. Listing omits it
    let listed: Vec<Value> = client.get(&base).send().await.unwrap().json().await.unwrap();
    assert!(listed.iter().all(|c| c["id"].as_i64() != Some(id)));
}

#[tokio::test]
async fn test_create_without_body_is_bad_request() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/api/Center", app.address))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "validation");
    assert_eq!(body["field"], "body");
}

#[tokio::test]
async fn test_unknown_record_is_not_found() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/api/Enterprise/12345", app.address))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 404);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "not_found");
}

#[tokio::test]
async fn test_non_numeric_id_is_bad_request() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/api/Program/abc", app.address))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["field"], "id");
}

#[tokio::test]
async fn test_user_password_never_leaves_the_server() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let person: Value = client
        .post(format!("{}/api/Person", app.address))
        .json(&json!({
            "first_name": "Ana",
            "last_name": "Ruiz",
            "document_type": "CC",
            "document_number": "1001",
            "email": "ana@example.com"
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let response = client
        .post(format!("{}/api/User", app.address))
        .json(&json!({
            "username": "ana",
            "email": "ana@example.com",
            "password": "s3cret",
            "person_id": person["id"]
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 201);
    let user: Value = response.json().await.unwrap();
    assert!(user.get("password").is_none());

    let listed: Vec<Value> = client
        .get(format!("{}/api/User", app.address))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);
    assert!(listed[0].get("password").is_none());
}

#[tokio::test]
async fn test_rol_permission_assignment_and_user_menu() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let api = format!("{}/api", app.address);

    async fn post(client: &reqwest::Client, url: String, body: Value) -> Value {
        let response = client.post(url).json(&body).send().await.unwrap();
        assert_eq!(response.status(), 201, "seeding must succeed");
        response.json().await.unwrap()
    }

    let person = post(
        &client,
        format!("{}/Person", api),
        json!({
            "first_name": "Luis",
            "last_name": "Gomez",
            "document_type": "CC",
            "document_number": "2002",
            "email": "luis@example.com"
        }),
    )
    .await;
    let user = post(
        &client,
        format!("{}/User", api),
        json!({
            "username": "luis",
            "email": "luis@example.com",
            "password": "pw",
            "person_id": person["id"]
        }),
    )
    .await;
    let rol = post(&client, format!("{}/Rol", api), json!({ "name": "Instructor" })).await;
    let form = post(
        &client,
        format!("{}/Form", api),
        json!({ "name": "Programs", "path": "/programs" }),
    )
    .await;
    let module = post(&client, format!("{}/Module", api), json!({ "name": "Training" })).await;
    let read = post(&client, format!("{}/Permission", api), json!({ "name": "read" })).await;
    post(
        &client,
        format!("{}/FormModule", api),
        json!({ "form_id": form["id"], "module_id": module["id"] }),
    )
    .await;
    post(
        &client,
        format!("{}/UserRol", api),
        json!({ "user_id": user["id"], "rol_id": rol["id"] }),
    )
    .await;

    let rows = post(
        &client,
        format!("{}/Rol/{}/permissions", api, rol["id"]),
        json!([{ "form_id": form["id"], "permission_ids": [read["id"]] }]),
    )
    .await;
    assert_eq!(rows.as_array().unwrap().len(), 1);

    let permissions: Value = client
        .get(format!("{}/User/{}/permissions", api, user["id"]))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(permissions[0]["rol_name"], "Instructor");
    assert_eq!(permissions[0]["forms"][0]["form_name"], "Programs");
    assert_eq!(permissions[0]["forms"][0]["permissions"][0]["name"], "read");

    let menu: Value = client
        .get(format!("{}/User/{}/menu", api, user["id"]))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(menu[0]["modules"][0]["module_name"], "Training");
    assert_eq!(menu[0]["modules"][0]["forms"], json!(["Programs"]));
}
