//! PubMedClient 对接本地模拟的 E-utilities 服务

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use pubmed_review::models::RecencyWindow;
use pubmed_review::services::LiteratureSearch;
use pubmed_review::{Config, LiteratureDatabase, PubMedClient};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio_test::{assert_err, assert_ok};

type Recorded = Arc<Mutex<Vec<(String, HashMap<String, String>)>>>;

async fn esearch(
    State(recorded): State<Recorded>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Value> {
    recorded.lock().unwrap().push(("esearch".to_string(), params));
    Json(json!({
        "header": { "type": "esearch", "version": "0.3" },
        "esearchresult": { "count": "2", "retmax": "2", "idlist": ["38000001", "38000002"] }
    }))
}

async fn esummary(
    State(recorded): State<Recorded>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Value> {
    recorded.lock().unwrap().push(("esummary".to_string(), params));
    Json(json!({
        "result": {
            "uids": ["38000001"],
            "38000001": {
                "uid": "38000001",
                "title": "SGLT2 inhibitors in heart failure.",
                "authors": [{ "name": "Kato T", "authtype": "Author" }],
                "source": "Lancet"
            }
        }
    }))
}

async fn efetch(
    State(recorded): State<Recorded>,
    Query(params): Query<HashMap<String, String>>,
) -> String {
    recorded.lock().unwrap().push(("efetch".to_string(), params));
    "1. Lancet. 2024;1:1-2.\n\nSGLT2 inhibitors in heart failure.\n\nAbstract text.".to_string()
}

/// 启动模拟服务，返回 (base_url, 请求记录)
async fn spawn_eutils() -> (String, Recorded) {
    let recorded: Recorded = Arc::default();
    let app = Router::new()
        .route("/eutils/esearch.fcgi", get(esearch))
        .route("/eutils/esummary.fcgi", get(esummary))
        .route("/eutils/efetch.fcgi", get(efetch))
        .route(
            "/broken/esearch.fcgi",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "oops") }),
        )
        .with_state(recorded.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}", addr), recorded)
}

fn client_for(base_url: String) -> PubMedClient {
    let config = Config {
        pubmed_base_url: base_url,
        pubmed_email: Some("lab@example.org".to_string()),
        http_timeout_secs: 5,
        ..Config::default()
    };
    PubMedClient::new(&config).unwrap()
}

#[tokio::test]
async fn test_search_sends_expected_params() {
    let (base, recorded) = spawn_eutils().await;
    let client = client_for(format!("{}/eutils", base));

    let response = assert_ok!(client.search("\"Heart Failure\"[MeSH Terms]", 10).await);
    assert_eq!(response["esearchresult"]["idlist"][0], "38000001");

    let recorded = recorded.lock().unwrap();
    let (endpoint, params) = &recorded[0];
    assert_eq!(endpoint, "esearch");
    assert_eq!(params["db"], "pubmed");
    assert_eq!(params["term"], "\"Heart Failure\"[MeSH Terms]");
    assert_eq!(params["retmax"], "10");
    assert_eq!(params["retmode"], "json");
    assert_eq!(params["email"], "lab@example.org");
}

#[tokio::test]
async fn test_batched_summary_and_fetch() {
    let (base, recorded) = spawn_eutils().await;
    let client = client_for(format!("{}/eutils", base));
    let ids = vec!["38000001".to_string(), "38000002".to_string()];

    client.fetch_summaries(&ids).await.unwrap();
    let text = client.fetch_abstracts(&ids[..1]).await.unwrap();
    assert!(text.contains("Abstract text."));

    let recorded = recorded.lock().unwrap();
    assert_eq!(recorded.len(), 2);
    assert_eq!(recorded[0].1["id"], "38000001,38000002");
    assert_eq!(recorded[1].1["id"], "38000001");
    assert_eq!(recorded[1].1["rettype"], "abstract");
    assert_eq!(recorded[1].1["retmode"], "text");
}

/// 端到端：模拟服务中 38000002 没有元数据 → 只返回一条
#[tokio::test]
async fn test_literature_search_end_to_end() {
    let (base, _recorded) = spawn_eutils().await;
    let search = LiteratureSearch::new(Arc::new(client_for(format!("{}/eutils", base))), 10);

    let papers = search.search_literature("Heart Failure", RecencyWindow::new(5)).await;

    assert_eq!(papers.len(), 1);
    assert_eq!(papers[0].id, "38000001");
    assert_eq!(papers[0].authors, "Kato T");
    assert_eq!(papers[0].source.as_deref(), Some("Lancet"));
}

/// 错误状态码与连接失败都是错误；检索服务将其降级为空结果
#[tokio::test]
async fn test_transport_failures() {
    let (base, _recorded) = spawn_eutils().await;
    let broken = client_for(format!("{}/broken", base));
    assert_err!(broken.search("x", 10).await);

    // 绑定后立即释放端口，得到一个无人监听的地址
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let unreachable = client_for(format!("http://{}", addr));
    assert_err!(unreachable.fetch_summaries(&["1".to_string()]).await);

    let search = LiteratureSearch::new(Arc::new(broken), 10);
    assert!(search.search_literature("Asthma", RecencyWindow::new(5)).await.is_empty());
}
