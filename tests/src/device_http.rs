#![cfg(test)]
use std::net::Ipv4Addr;
use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use hwrev_common::config::Config;
use hwrev_common::device::Enrichment;
use hwrev_common::error::EnrichmentError;
use hwrev_core::discovery::{DiscoveryService, Silent};
use hwrev_core::enricher::device_info::HttpDeviceInfo;

use crate::fakes::{FakeDirectory, FakeStatus, entry, info_page, registered};

/// Serves `body` as the self-description page on 127.0.0.1 and returns the port.
async fn serve_device(body: String) -> u16 {
    let app = Router::new().route("/DeviceInformationX", get(move || async move { body }));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    port
}

#[tokio::test]
async fn real_http_devices_are_identified_or_reported_unreachable() {
    let port = serve_device(info_page("phone\nCisco IP Phone 7861\nCP-7861\nV02\nFCH9988ZZZZ")).await;

    let directory = FakeDirectory::new(vec![
        entry("SEP000000000001", "Cisco 7861"),
        entry("SEP000000000002", "Cisco 7861"),
    ]);
    // Nothing listens on 127.0.0.2, so that device refuses the connection.
    let status = FakeStatus::new([
        registered("SEP000000000001", Ipv4Addr::LOCALHOST),
        registered("SEP000000000002", Ipv4Addr::new(127, 0, 0, 2)),
    ]);
    let cfg = Config {
        device_port: port,
        ..Config::default()
    };
    let device_info = HttpDeviceInfo::from_config(&cfg).unwrap();

    let discovery = DiscoveryService::new(
        Box::new(directory),
        Box::new(status),
        Arc::new(device_info),
        cfg,
    )
    .unwrap()
    .perform_discovery(&Silent)
    .await
    .unwrap();

    let reachable = discovery.inventory.get("SEP000000000001").unwrap();
    let udi = reachable.udi().expect("identified");
    assert_eq!(udi.model_number, "CP-7861");
    assert_eq!(udi.hardware_revision, "V02");
    assert_eq!(udi.serial_number, "FCH9988ZZZZ");

    let refused = discovery.inventory.get("SEP000000000002").unwrap();
    assert_eq!(refused.error(), Some(&EnrichmentError::WebAccessDisabled));
}

#[tokio::test]
async fn garbage_page_is_a_malformed_answer() {
    let port = serve_device("this is not a device page".to_string()).await;

    let directory = FakeDirectory::new(vec![entry("SEP000000000001", "Cisco 7821")]);
    let status = FakeStatus::new([registered("SEP000000000001", Ipv4Addr::LOCALHOST)]);
    let cfg = Config {
        device_port: port,
        ..Config::default()
    };
    let device_info = HttpDeviceInfo::from_config(&cfg).unwrap();

    let discovery = DiscoveryService::new(
        Box::new(directory),
        Box::new(status),
        Arc::new(device_info),
        cfg,
    )
    .unwrap()
    .perform_discovery(&Silent)
    .await
    .unwrap();

    let record = discovery.inventory.get("SEP000000000001").unwrap();
    assert!(matches!(
        record.enrichment,
        Enrichment::Failed(EnrichmentError::Malformed { .. })
    ));
}
