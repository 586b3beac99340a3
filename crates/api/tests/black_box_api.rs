use reqwest::StatusCode;
use serde_json::json;

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        // Same router as prod, bound to an ephemeral port.
        let app = tradepost_api::app::build_app();
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn create_good(
    client: &reqwest::Client,
    base_url: &str,
    name: &str,
    unit_value: u32,
    stock: u32,
) -> serde_json::Value {
    let res = client
        .post(format!("{}/goods", base_url))
        .json(&json!({
            "name": name,
            "description": "a test good",
            "weight": 3.5,
            "unit_value": unit_value,
            "stock": stock,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    res.json().await.unwrap()
}

async fn create_hunter(
    client: &reqwest::Client,
    base_url: &str,
    name: &str,
) -> serde_json::Value {
    let res = client
        .post(format!("{}/hunters", base_url))
        .json(&json!({ "name": name, "location": "KaerMorhen" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    res.json().await.unwrap()
}

async fn good_stock(client: &reqwest::Client, base_url: &str, id: &str) -> u64 {
    let res = client
        .get(format!("{}/goods/{}", base_url, id))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    body["stock"].as_u64().unwrap()
}

#[tokio::test]
async fn health_endpoint_responds() {
    let srv = TestServer::spawn().await;

    let client = reqwest::Client::new();
    let res = client
        .get(format!("{}/health", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn unknown_routes_are_not_implemented() {
    let srv = TestServer::spawn().await;

    let client = reqwest::Client::new();
    let res = client
        .get(format!("{}/no/such/route", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_IMPLEMENTED);
}

#[tokio::test]
async fn buy_lifecycle_create_then_delete_restores_stock() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let good = create_good(&client, &srv.base_url, "Sword", 100, 10).await;
    let good_id = good["id"].as_str().unwrap().to_string();
    create_hunter(&client, &srv.base_url, "Geralt").await;

    // Buy two swords.
    let res = client
        .post(format!("{}/transactions", srv.base_url))
        .json(&json!({
            "kind": "buy",
            "party_name": "Geralt",
            "line_items": [{ "good_name": "Sword", "quantity": 2 }],
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let tx: serde_json::Value = res.json().await.unwrap();
    assert_eq!(tx["total_import"], 200);
    assert_eq!(tx["amount"], 2);
    assert_eq!(tx["party_type"], "Hunter");
    let tx_id = tx["id"].as_str().unwrap().to_string();

    assert_eq!(good_stock(&client, &srv.base_url, &good_id).await, 8);

    // Deleting the transaction puts the stock back.
    let res = client
        .delete(format!("{}/transactions/{}", srv.base_url, tx_id))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(good_stock(&client, &srv.base_url, &good_id).await, 10);
}

#[tokio::test]
async fn buy_for_unknown_party_is_rejected() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    create_good(&client, &srv.base_url, "Potion", 10, 5).await;

    let res = client
        .post(format!("{}/transactions", srv.base_url))
        .json(&json!({
            "kind": "buy",
            "party_name": "Yennefer",
            "line_items": [{ "good_name": "Potion", "quantity": 1 }],
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn overdrawn_buy_is_a_server_side_failure() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let good = create_good(&client, &srv.base_url, "Elixir", 50, 1).await;
    let good_id = good["id"].as_str().unwrap().to_string();
    create_hunter(&client, &srv.base_url, "Lambert").await;

    let res = client
        .post(format!("{}/transactions", srv.base_url))
        .json(&json!({
            "kind": "buy",
            "party_name": "Lambert",
            "line_items": [{ "good_name": "Elixir", "quantity": 3 }],
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);

    // Nothing was written.
    assert_eq!(good_stock(&client, &srv.base_url, &good_id).await, 1);
    let res = client
        .get(format!("{}/transactions", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn duplicate_good_name_conflicts() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    create_good(&client, &srv.base_url, "Sword", 100, 10).await;

    let res = client
        .post(format!("{}/goods", srv.base_url))
        .json(&json!({
            "name": "Sword",
            "description": "another sword",
            "weight": 2.0,
            "unit_value": 80,
            "stock": 1,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn patch_transaction_nets_the_stock_difference() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let good = create_good(&client, &srv.base_url, "Bolt", 5, 20).await;
    let good_id = good["id"].as_str().unwrap().to_string();
    create_hunter(&client, &srv.base_url, "Eskel").await;

    let res = client
        .post(format!("{}/transactions", srv.base_url))
        .json(&json!({
            "kind": "buy",
            "party_name": "Eskel",
            "line_items": [{ "good_name": "Bolt", "quantity": 4 }],
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let tx: serde_json::Value = res.json().await.unwrap();
    let tx_id = tx["id"].as_str().unwrap().to_string();
    assert_eq!(good_stock(&client, &srv.base_url, &good_id).await, 16);

    let res = client
        .patch(format!("{}/transactions/{}", srv.base_url, tx_id))
        .json(&json!({
            "line_items": [{ "good_name": "Bolt", "quantity": 10 }],
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["amount"], 10);
    assert_eq!(body["data"]["total_import"], 50);

    assert_eq!(good_stock(&client, &srv.base_url, &good_id).await, 10);
}

#[tokio::test]
async fn patch_transaction_with_unknown_good_is_bad_request() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let good = create_good(&client, &srv.base_url, "Bolt", 5, 20).await;
    let good_id = good["id"].as_str().unwrap().to_string();
    create_hunter(&client, &srv.base_url, "Eskel").await;

    let res = client
        .post(format!("{}/transactions", srv.base_url))
        .json(&json!({
            "kind": "buy",
            "party_name": "Eskel",
            "line_items": [{ "good_name": "Bolt", "quantity": 4 }],
        }))
        .send()
        .await
        .unwrap();
    let tx: serde_json::Value = res.json().await.unwrap();
    let tx_id = tx["id"].as_str().unwrap().to_string();

    let res = client
        .patch(format!("{}/transactions/{}", srv.base_url, tx_id))
        .json(&json!({
            "line_items": [{ "good_name": "Ghost", "quantity": 1 }],
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    // Stock is untouched by the failed rewrite.
    assert_eq!(good_stock(&client, &srv.base_url, &good_id).await, 16);
}

#[tokio::test]
async fn patch_transaction_rejects_non_whitelisted_fields() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    create_good(&client, &srv.base_url, "Bolt", 5, 20).await;
    create_hunter(&client, &srv.base_url, "Eskel").await;

    let res = client
        .post(format!("{}/transactions", srv.base_url))
        .json(&json!({
            "kind": "buy",
            "party_name": "Eskel",
            "line_items": [{ "good_name": "Bolt", "quantity": 1 }],
        }))
        .send()
        .await
        .unwrap();
    let tx: serde_json::Value = res.json().await.unwrap();
    let tx_id = tx["id"].as_str().unwrap().to_string();

    // `kind` is not an updatable field.
    let res = client
        .patch(format!("{}/transactions/{}", srv.base_url, tx_id))
        .json(&json!({
            "kind": "sell",
            "line_items": [{ "good_name": "Bolt", "quantity": 1 }],
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn sell_requires_a_merchant_and_adds_stock() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let good = create_good(&client, &srv.base_url, "Hide", 8, 2).await;
    let good_id = good["id"].as_str().unwrap().to_string();

    let res = client
        .post(format!("{}/merchants", srv.base_url))
        .json(&json!({ "name": "Hattori", "location": "Novigrad", "kind": "blacksmith" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = client
        .post(format!("{}/transactions", srv.base_url))
        .json(&json!({
            "kind": "sell",
            "party_name": "Hattori",
            "line_items": [{ "good_name": "Hide", "quantity": 5 }],
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let tx: serde_json::Value = res.json().await.unwrap();
    assert_eq!(tx["party_type"], "Merchant");

    assert_eq!(good_stock(&client, &srv.base_url, &good_id).await, 7);
}

#[tokio::test]
async fn bulk_delete_by_filter_reports_count() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let good = create_good(&client, &srv.base_url, "Bolt", 5, 50).await;
    let good_id = good["id"].as_str().unwrap().to_string();
    create_hunter(&client, &srv.base_url, "Geralt").await;

    for quantity in [1, 2] {
        let res = client
            .post(format!("{}/transactions", srv.base_url))
            .json(&json!({
                "kind": "buy",
                "party_name": "Geralt",
                "line_items": [{ "good_name": "Bolt", "quantity": quantity }],
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::CREATED);
    }
    assert_eq!(good_stock(&client, &srv.base_url, &good_id).await, 47);

    let res = client
        .delete(format!("{}/transactions?party_name=Geralt", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["deleted"], 2);
    assert_eq!(good_stock(&client, &srv.base_url, &good_id).await, 50);

    // A second pass matches nothing.
    let res = client
        .delete(format!("{}/transactions?party_name=Geralt", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn hunters_support_lookup_and_patch_by_name() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    create_hunter(&client, &srv.base_url, "Ciri").await;

    let res = client
        .get(format!("{}/hunters?name=Ciri", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let hunter: serde_json::Value = res.json().await.unwrap();
    assert_eq!(hunter["location"], "KaerMorhen");

    let res = client
        .patch(format!("{}/hunters?name=Ciri", srv.base_url))
        .json(&json!({ "location": "Novigrad" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let hunter: serde_json::Value = res.json().await.unwrap();
    assert_eq!(hunter["location"], "Novigrad");

    let res = client
        .delete(format!("{}/hunters?name=Ciri", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .get(format!("{}/hunters?name=Ciri", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn good_listing_is_ordered_by_name() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    for name in ["Sword", "Axe", "Bolt"] {
        create_good(&client, &srv.base_url, name, 10, 1).await;
    }

    let res = client
        .get(format!("{}/goods", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    let names = body
        .as_array()
        .unwrap()
        .iter()
        .map(|g| g["name"].as_str().unwrap().to_string())
        .collect::<Vec<_>>();
    assert_eq!(names, ["Axe", "Bolt", "Sword"]);
}

#[tokio::test]
async fn hunter_names_must_be_alphanumeric() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/hunters", srv.base_url))
        .json(&json!({ "name": "Geralt of Rivia!", "location": "Novigrad" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}
