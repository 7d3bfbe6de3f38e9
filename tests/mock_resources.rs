#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::time::Duration;

use secrecy::SecretString;
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_string_contains, method};
use wiremock::{Mock, MockServer, ResponseTemplate};
use zabbix_api::error::Error;
use zabbix_api::{Application, Params, Proxy, User, ZabbixClient, params};

fn client(base: &MockServer) -> ZabbixClient {
    ZabbixClient::builder(Url::parse(&base.uri()).expect("valid mock url"))
        .auth_token(SecretString::from("secret-token"))
        .timeout(Duration::from_secs(2))
        .connect_timeout(Duration::from_secs(1))
        .insecure_http(true)
        .build()
        .expect("client")
}

#[tokio::test]
async fn get_by_id_returns_the_single_match() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(body_string_contains("usergroup.get"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": "2.0",
            "result": [
                {"usrgrpid": "7", "name": "Zabbix administrators", "gui_access": "0",
                 "users_status": "0", "debug_mode": "1"}
            ],
            "id": 1
        })))
        .mount(&server)
        .await;

    let group = client(&server)
        .user_group_get_by_id("7")
        .await
        .expect("group");
    assert_eq!(group.name, "Zabbix administrators");
    assert_eq!(group.debug_mode, 1);
}

#[tokio::test]
async fn get_by_id_rejects_zero_and_many() {
    let empty = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": "2.0",
            "result": [],
            "id": 1
        })))
        .mount(&empty)
        .await;

    let err = client(&empty)
        .application_get_by_id("1206")
        .await
        .expect_err("should fail");
    assert!(matches!(err, Error::ExpectedOneResult { count: 0 }));

    let crowded = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": "2.0",
            "result": [
                {"applicationid": "1206", "hostid": "10050", "name": "CPU"},
                {"applicationid": "1207", "hostid": "10050", "name": "CPU"}
            ],
            "id": 1
        })))
        .mount(&crowded)
        .await;

    let err = client(&crowded)
        .application_get_by_id("1206")
        .await
        .expect_err("should fail");
    assert!(matches!(err, Error::ExpectedOneResult { count: 2 }));
}

#[tokio::test]
async fn create_writes_ids_back_in_order() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(body_string_contains("application.create"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": "2.0",
            "result": {"applicationids": ["356", "357"]},
            "id": 1
        })))
        .mount(&server)
        .await;

    let mut apps = [
        Application {
            host_id: "10050".to_string(),
            name: "CPU".to_string(),
            ..Application::default()
        },
        Application {
            host_id: "10050".to_string(),
            name: "Memory".to_string(),
            ..Application::default()
        },
    ];
    client(&server)
        .applications_create(&mut apps)
        .await
        .expect("create");

    assert_eq!(apps[0].application_id, "356");
    assert_eq!(apps[1].application_id, "357");

    let requests = server.received_requests().await.expect("requests");
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).expect("json body");
    assert!(body["params"].is_array());
    assert_eq!(body["params"][1]["name"], "Memory");
    assert!(body["params"][0].get("applicationid").is_none());
}

#[tokio::test]
async fn create_count_mismatch_leaves_objects_untouched() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": "2.0",
            "result": {"applicationids": ["356"]},
            "id": 1
        })))
        .mount(&server)
        .await;

    let mut apps = [
        Application {
            host_id: "10050".to_string(),
            name: "CPU".to_string(),
            ..Application::default()
        },
        Application {
            host_id: "10050".to_string(),
            name: "Memory".to_string(),
            ..Application::default()
        },
    ];
    let err = client(&server)
        .applications_create(&mut apps)
        .await
        .expect_err("should fail");

    assert!(matches!(
        err,
        Error::CountMismatch {
            expected: 2,
            got: 1
        }
    ));
    assert!(apps[0].application_id.is_empty());
    assert!(apps[1].application_id.is_empty());
}

#[tokio::test]
async fn delete_clears_ids_and_sends_a_bare_id_array() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(body_string_contains("proxy.delete"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": "2.0",
            "result": {"proxyids": ["10418", "10419"]},
            "id": 1
        })))
        .mount(&server)
        .await;

    let mut proxies = [
        Proxy {
            proxy_id: "10418".to_string(),
            host: "proxy-dmz".to_string(),
            status: 5,
            ..Proxy::default()
        },
        Proxy {
            proxy_id: "10419".to_string(),
            host: "proxy-lab".to_string(),
            status: 5,
            ..Proxy::default()
        },
    ];
    client(&server)
        .proxies_delete(&mut proxies)
        .await
        .expect("delete");

    assert!(proxies[0].proxy_id.is_empty());
    assert!(proxies[1].proxy_id.is_empty());

    let requests = server.received_requests().await.expect("requests");
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).expect("json body");
    assert_eq!(body["params"], json!(["10418", "10419"]));
}

#[tokio::test]
async fn delete_count_mismatch_keeps_ids() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": "2.0",
            "result": {"userids": ["42"]},
            "id": 1
        })))
        .mount(&server)
        .await;

    let mut users = [
        User {
            user_id: "42".to_string(),
            username: "jdoe".to_string(),
            ..User::default()
        },
        User {
            user_id: "43".to_string(),
            username: "jroe".to_string(),
            ..User::default()
        },
    ];
    let err = client(&server)
        .users_delete(&mut users)
        .await
        .expect_err("should fail");

    assert!(matches!(
        err,
        Error::CountMismatch {
            expected: 2,
            got: 1
        }
    ));
    assert_eq!(users[0].user_id, "42");
    assert_eq!(users[1].user_id, "43");
}

#[tokio::test]
async fn lld_delete_accepts_both_response_shapes() {
    let listy = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": "2.0",
            "result": {"ruleids": ["28336", "28337"]},
            "id": 1
        })))
        .mount(&listy)
        .await;

    let ids = vec!["28336".to_string(), "28337".to_string()];
    client(&listy)
        .lld_rules_delete_by_ids(&ids)
        .await
        .expect("list shape");

    let mappy = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": "2.0",
            "result": {"ruleids": {"0": "28336", "1": "28337"}},
            "id": 1
        })))
        .mount(&mappy)
        .await;

    let deleted = client(&mappy)
        .lld_rules_delete_ids(&ids)
        .await
        .expect("map shape");
    assert_eq!(deleted.len(), 2);
    assert!(deleted.contains(&"28336".to_string()));
    assert!(deleted.contains(&"28337".to_string()));
}

#[tokio::test]
async fn get_fills_output_extend_but_respects_the_caller() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": "2.0",
            "result": [],
            "id": 1
        })))
        .mount(&server)
        .await;

    let client = client(&server);
    client.proxies_get(Params::new()).await.expect("default");
    client
        .proxies_get(params! { "output": ["host"] })
        .await
        .expect("explicit");

    let requests = server.received_requests().await.expect("requests");
    let first: serde_json::Value = serde_json::from_slice(&requests[0].body).expect("json body");
    let second: serde_json::Value = serde_json::from_slice(&requests[1].body).expect("json body");

    assert_eq!(first["params"]["output"], "extend");
    assert_eq!(second["params"]["output"], json!(["host"]));
}
