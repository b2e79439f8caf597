#![allow(clippy::unwrap_used)]
// End-to-end tests for `Reconciler` against a mocked CVP server.

use std::time::Duration;

use serde_json::json;
use url::Url;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use portsplit_core::{
    AuthCredentials, ConnectionConfig, CoreError, PlanOptions, PortCategory, ReconcileOptions,
    Reconciler, TlsVerification,
};

const DEVICE: &str = "leaf1.lab";
const MAC: &str = "00:1c:73:00:00:01";

const RECONCILE_CONFIG: &str = "\
hostname leaf1
interface Ethernet1/1/1
   switchport mode tap
   shutdown
interface Ethernet1/2/1
   switchport mode tool
interface Ethernet1/3/1
   description spare
   shutdown
interface Ethernet1/1/5
   description mgmt
ip routing
";

// ── Helpers ─────────────────────────────────────────────────────────

fn svc(suffix: &str) -> String {
    format!("/cvpservice/{suffix}")
}

async fn connect(server: &MockServer) -> Reconciler {
    Mock::given(method("GET"))
        .and(path(svc("cvpInfo/getCvpInfo.do")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "version": "2024.2.0" })))
        .mount(server)
        .await;

    let config = ConnectionConfig {
        url: Url::parse(&server.uri()).unwrap(),
        auth: AuthCredentials::Token("tok".to_string().into()),
        tls: TlsVerification::DangerAcceptInvalid,
        timeout: Duration::from_secs(5),
    };
    Reconciler::connect(&config).await.unwrap()
}

async fn mount_device(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path(svc("provisioning/searchTopology.do")))
        .and(query_param("queryParam", DEVICE))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "netElementList": [{ "fqdn": DEVICE, "systemMacAddress": MAC }]
        })))
        .mount(server)
        .await;
}

async fn mount_configlets(server: &MockServer, configlets: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(svc("provisioning/getConfigletsByNetElementId.do")))
        .and(query_param("netElementId", MAC))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "configletList": configlets })),
        )
        .mount(server)
        .await;
}

async fn mount_reconcile_configlet(server: &MockServer) {
    mount_configlets(
        server,
        json!([
            { "key": "c_base", "name": "leaf1-base", "config": "hostname leaf1\n" },
            { "key": "c_old", "name": "leaf1_reconcile_old", "config": "", "reconciled": true },
            { "key": "c_rec", "name": "leaf1_reconcile", "config": RECONCILE_CONFIG,
              "reconciled": true }
        ]),
    )
    .await;
}

async fn mount_automation_configlet(server: &MockServer, kind: &str) {
    let name = format!("{DEVICE}-{kind}ports-automation");
    Mock::given(method("GET"))
        .and(path(svc("configlet/getConfigletByName.do")))
        .and(query_param("name", name.as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "key": format!("c_{kind}"),
            "name": name,
            "config": "!\n"
        })))
        .mount(server)
        .await;
}

fn updated_ok() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "data": "Configlet is successfully updated",
        "taskIds": []
    }))
}

// ── Happy path ──────────────────────────────────────────────────────

#[tokio::test]
async fn test_full_reconcile() {
    let server = MockServer::start().await;
    let reconciler = connect(&server).await;
    mount_device(&server).await;
    mount_reconcile_configlet(&server).await;
    for kind in ["tap", "tool", "shutdown"] {
        mount_automation_configlet(&server, kind).await;
    }

    Mock::given(method("POST"))
        .and(path(svc("configlet/updateConfiglet.do")))
        .and(body_partial_json(json!({
            "key": "c_tap",
            "name": "leaf1.lab-tapports-automation",
            "config": "!\ninterface Ethernet1/1/1\n   switchport mode tap\n   shutdown\n!\n"
        })))
        .respond_with(updated_ok())
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(svc("configlet/updateConfiglet.do")))
        .and(body_partial_json(json!({
            "key": "c_tool",
            "config": "!\ninterface Ethernet1/2/1\n   switchport mode tool\n   no shutdown\n!\n"
        })))
        .respond_with(updated_ok())
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(svc("configlet/updateConfiglet.do")))
        .and(body_partial_json(json!({
            "key": "c_shutdown",
            "config": "!\ninterface Ethernet1/3/1\n   shutdown\n!\n"
        })))
        .respond_with(updated_ok())
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(svc("provisioning/updateReconcileConfiglet.do")))
        .and(query_param("netElementId", MAC))
        .and(body_partial_json(json!({
            "key": "c_rec",
            "name": "leaf1_reconcile",
            "config": "hostname leaf1\nip routing\n",
            "reconciled": true
        })))
        .respond_with(updated_ok())
        .expect(1)
        .mount(&server)
        .await;

    let report = reconciler
        .run(DEVICE, ReconcileOptions::default())
        .await
        .unwrap();

    assert_eq!(report.device_mac, MAC);
    assert_eq!(report.reconcile_configlet, "leaf1_reconcile");
    assert_eq!(
        report.updated,
        vec![
            "leaf1.lab-tapports-automation",
            "leaf1.lab-toolports-automation",
            "leaf1.lab-shutdownports-automation",
            "leaf1_reconcile",
        ]
    );
    assert_eq!(report.plan.dropped().count(), 1);
}

#[tokio::test]
async fn test_dry_run_writes_nothing() {
    let server = MockServer::start().await;
    let reconciler = connect(&server).await;
    mount_device(&server).await;
    mount_reconcile_configlet(&server).await;
    for kind in ["tap", "tool", "shutdown"] {
        mount_automation_configlet(&server, kind).await;
    }

    Mock::given(method("POST"))
        .respond_with(updated_ok())
        .expect(0)
        .mount(&server)
        .await;

    let report = reconciler
        .run(
            DEVICE,
            ReconcileOptions {
                dry_run: true,
                plan: PlanOptions::default(),
            },
        )
        .await
        .unwrap();

    assert!(report.dry_run);
    assert!(report.updated.is_empty());
    assert!(report.plan.rendered(PortCategory::Tap).is_some());
}

#[tokio::test]
async fn test_retain_unmatched_writes_back_interfaces() {
    let server = MockServer::start().await;
    let reconciler = connect(&server).await;
    mount_device(&server).await;
    mount_reconcile_configlet(&server).await;
    for kind in ["tap", "tool", "shutdown"] {
        mount_automation_configlet(&server, kind).await;
    }

    Mock::given(method("POST"))
        .and(path(svc("configlet/updateConfiglet.do")))
        .respond_with(updated_ok())
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(svc("provisioning/updateReconcileConfiglet.do")))
        .and(body_partial_json(json!({
            "config": "hostname leaf1\ninterface Ethernet1/1/5\n   description mgmt\nip routing\n"
        })))
        .respond_with(updated_ok())
        .expect(1)
        .mount(&server)
        .await;

    let options = ReconcileOptions {
        dry_run: false,
        plan: PlanOptions {
            retain_unmatched: true,
        },
    };
    let report = reconciler.run(DEVICE, options).await.unwrap();
    assert_eq!(report.plan.dropped().count(), 0);
}

// ── Lookup failures ─────────────────────────────────────────────────

#[tokio::test]
async fn test_device_not_found() {
    let server = MockServer::start().await;
    let reconciler = connect(&server).await;

    Mock::given(method("GET"))
        .and(path(svc("provisioning/searchTopology.do")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "netElementList": [] })))
        .mount(&server)
        .await;

    let result = reconciler.run(DEVICE, ReconcileOptions::default()).await;
    assert!(
        matches!(result, Err(CoreError::DeviceNotFound { ref fqdn }) if fqdn == DEVICE),
        "expected DeviceNotFound, got: {result:?}"
    );
}

#[tokio::test]
async fn test_no_configlets() {
    let server = MockServer::start().await;
    let reconciler = connect(&server).await;
    mount_device(&server).await;
    mount_configlets(&server, json!([])).await;

    let result = reconciler.run(DEVICE, ReconcileOptions::default()).await;
    assert!(matches!(result, Err(CoreError::NoConfiglets { .. })));
}

#[tokio::test]
async fn test_no_reconcile_configlet() {
    let server = MockServer::start().await;
    let reconciler = connect(&server).await;
    mount_device(&server).await;
    mount_configlets(
        &server,
        json!([{ "key": "c_base", "name": "leaf1-base", "config": "hostname leaf1\n" }]),
    )
    .await;

    let result = reconciler.run(DEVICE, ReconcileOptions::default()).await;
    assert!(matches!(result, Err(CoreError::NoReconcileConfiglet { .. })));
}

#[tokio::test]
async fn test_missing_automation_configlet_stops_run() {
    let server = MockServer::start().await;
    let reconciler = connect(&server).await;
    mount_device(&server).await;
    mount_reconcile_configlet(&server).await;

    Mock::given(method("GET"))
        .and(path(svc("configlet/getConfigletByName.do")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "errorCode": "132801",
            "errorMessage": "Entity does not exist"
        })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .respond_with(updated_ok())
        .expect(0)
        .mount(&server)
        .await;

    let result = reconciler.run(DEVICE, ReconcileOptions::default()).await;
    assert!(
        matches!(result, Err(CoreError::ConfigletNotFound { ref name }) if name == "leaf1.lab-tapports-automation"),
        "expected ConfigletNotFound, got: {result:?}"
    );
}

// ── Update failures ─────────────────────────────────────────────────

#[tokio::test]
async fn test_empty_update_response_is_fatal() {
    let server = MockServer::start().await;
    let reconciler = connect(&server).await;
    mount_device(&server).await;
    mount_reconcile_configlet(&server).await;
    for kind in ["tap", "tool", "shutdown"] {
        mount_automation_configlet(&server, kind).await;
    }

    Mock::given(method("POST"))
        .and(path(svc("configlet/updateConfiglet.do")))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(svc("provisioning/updateReconcileConfiglet.do")))
        .respond_with(updated_ok())
        .expect(0)
        .mount(&server)
        .await;

    let result = reconciler.run(DEVICE, ReconcileOptions::default()).await;
    match result {
        Err(CoreError::UpdateFailed { configlet, reason }) => {
            assert_eq!(configlet, "leaf1.lab-tapports-automation");
            assert_eq!(reason, "no response");
        }
        other => panic!("expected UpdateFailed, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_connect_probe_failure() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(svc("cvpInfo/getCvpInfo.do")))
        .respond_with(ResponseTemplate::new(503).set_body_string("starting"))
        .mount(&server)
        .await;

    let config = ConnectionConfig {
        url: Url::parse(&server.uri()).unwrap(),
        auth: AuthCredentials::Token("tok".to_string().into()),
        tls: TlsVerification::SystemDefaults,
        timeout: Duration::from_secs(5),
    };

    let result = Reconciler::connect(&config).await;
    assert!(
        matches!(result, Err(CoreError::ConnectionFailed { .. })),
        "expected ConnectionFailed, got: {result:?}"
    );
}
