use listsync_cli::config::{JobConfig, input_tables_dir, output_tables_dir};
use listsync_cli::run_job;
use serde_json::json;
use std::fs;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_graph(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "access_token": "t" })))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/sites/contoso.sharepoint.com:/sites/Team"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "s1" })))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/sites/s1/lists"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "value": [{
            "id": "l1",
            "name": "Orders",
            "displayName": "Orders",
            "webUrl": "https://contoso.sharepoint.com/sites/Team/Lists/Orders",
            "createdBy": { "user": { "displayName": "Ada", "email": "ada@contoso.com" } }
        }] })))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/sites/s1/lists/l1"))
        .and(query_param("expand", "columns"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "l1",
            "columns": [{ "name": "Title", "displayName": "Title", "required": true }]
        })))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/sites/s1/lists/l1/items"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "value": [] })))
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path("/$batch"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "responses": [] })))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn job_exports_rows_and_list_metadata() {
    let server = MockServer::start().await;
    mount_graph(&server).await;

    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(input_tables_dir(dir.path())).unwrap();
    fs::write(input_tables_dir(dir.path()).join("orders.csv"), "Title\nA-1\nA-2\n").unwrap();

    let config: JobConfig = serde_json::from_value(json!({
        "parameters": {
            "base_host_name": "contoso.sharepoint.com",
            "site_url_rel_path": "/sites/Team",
            "list_name": "Orders",
            "export_list_metadata": true
        },
        "authorization": { "oauth_api": { "credentials": {
            "appKey": "app",
            "#appSecret": "secret",
            "#data": "{\"refresh_token\": \"r1\"}"
        } } },
        "storage": { "input": { "tables": [{ "destination": "orders.csv" }] } },
        "image_parameters": {
            "graph_base_url": server.uri(),
            "oauth_token_url": format!("{}/token", server.uri())
        }
    }))
    .unwrap();
    config.validate(dir.path()).unwrap();

    let report = run_job(&config, dir.path()).await.unwrap();
    assert_eq!(report.written_rows, 2);

    let metadata = fs::read_to_string(output_tables_dir(dir.path()).join("lists_metadata.csv")).unwrap();
    let rows: Vec<&str> = metadata.lines().collect();
    assert_eq!(rows.len(), 2);
    assert!(rows[1].contains("https://contoso.sharepoint.com/sites/Team/Lists/Orders"));
    assert!(rows[1].contains("ada@contoso.com"));
    assert!(rows[1].ends_with(",s1"));
}

#[tokio::test]
async fn job_fails_on_rejected_token_exchange() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(400).set_body_string("invalid_grant"))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let config: JobConfig = serde_json::from_value(json!({
        "parameters": {
            "base_host_name": "contoso.sharepoint.com",
            "site_url_rel_path": "/sites/Team",
            "list_name": "Orders"
        },
        "authorization": { "oauth_api": { "credentials": {
            "appKey": "app",
            "#appSecret": "secret",
            "#data": "{\"refresh_token\": \"r1\"}"
        } } },
        "storage": { "input": { "tables": [{ "destination": "orders.csv" }] } },
        "image_parameters": {
            "graph_base_url": server.uri(),
            "oauth_token_url": format!("{}/token", server.uri())
        }
    }))
    .unwrap();

    let err = run_job(&config, dir.path()).await.unwrap_err();
    assert!(format!("{err:#}").contains("authorization failed"));
}
