#![cfg(test)]
use std::net::Ipv4Addr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use hwrev_common::config::Config;
use hwrev_common::device::{DeviceRecord, Enrichment, StatusLookup};
use hwrev_common::error::EnrichmentError;
use hwrev_core::discovery::{Discovery, DiscoveryError, DiscoveryObserver, DiscoveryService, Silent};
use hwrev_core::export::{self, Summary};

use crate::fakes::{
    Answer, FakeDevices, FakeDirectory, FakeStatus, entry, info_page, registered, unregistered,
};

const UDI_7841: &str = "phone\nCisco IP Phone 7841\nCP-7841\nV03\nFCH2233ABCD";
const UDI_7821: &str = "phone\nCisco IP Phone 7821\nCP-7821\nV01\nFCH1100AAAA";

fn ip(last: u8) -> Ipv4Addr {
    Ipv4Addr::new(10, 20, 0, last)
}

fn service(
    directory: FakeDirectory,
    status: FakeStatus,
    devices: FakeDevices,
    cfg: Config,
) -> DiscoveryService {
    DiscoveryService::new(Box::new(directory), Box::new(status), Arc::new(devices), cfg).unwrap()
}

fn csv_lines(discovery: &Discovery) -> Vec<String> {
    let mut out = Vec::new();
    export::write_csv(&mut out, &discovery.inventory).unwrap();
    String::from_utf8(out)
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}

#[tokio::test]
async fn full_run_writes_one_row_per_restricted_device() {
    let directory = FakeDirectory::new(vec![
        entry("SEP000000000001", "Cisco 7841"),
        entry("SEP000000000002", "Cisco 8845"),
        entry("SEP000000000003", "Cisco 7821"),
        entry("SEP000000000004", "Cisco 7861"),
    ]);
    let status = FakeStatus::new([
        registered("SEP000000000001", ip(1)),
        registered("SEP000000000002", ip(2)),
        registered("SEP000000000003", ip(3)),
        unregistered("SEP000000000004"),
    ]);
    let devices = FakeDevices::new([
        (ip(1), Answer::Page(info_page(UDI_7841))),
        (ip(3), Answer::Page(info_page(UDI_7821))),
    ]);

    let discovery = service(directory, status, devices, Config::default())
        .perform_discovery(&Silent)
        .await
        .unwrap();

    assert_eq!(discovery.inventory.len(), 3);
    assert!(discovery.inventory.get("SEP000000000002").is_none());
    assert_eq!(discovery.enrichment.candidates, 2);
    assert_eq!(discovery.enrichment.identified, 2);

    let lines = csv_lines(&discovery);
    assert_eq!(lines.len(), 4);
    assert_eq!(
        lines[0],
        "\"Name\",\"Model\",\"Description\",\"Status\",\"ActiveLoadID\",\"InactiveLoadID\",\
         \"IPAddress\",\"SerialNumber\",\"ModelNumber\",\"HardwareRevision\",\"Error\""
    );
    assert_eq!(
        lines[1],
        "\"SEP000000000001\",\"Cisco 7841\",\"SEP000000000001 desk phone\",\"Registered\",\
         \"sip78xx.14-2-1-0001-14\",\"sip78xx.12-8-1-0001-455\",\"10.20.0.1\",\"FCH2233ABCD\",\
         \"CP-7841\",\"V03\",\"\""
    );
    assert!(lines[2].starts_with("\"SEP000000000003\",\"Cisco 7821\""));
    assert!(lines[3].starts_with("\"SEP000000000004\",\"Cisco 7861\""));
    assert!(lines[3].contains("\"UnRegistered\""));
    assert!(lines[3].ends_with(",\"\",\"\",\"\",\"\",\"\""));
}

#[tokio::test]
async fn devices_without_ipv4_are_never_queried() {
    let directory = FakeDirectory::new(vec![
        entry("SEP000000000001", "Cisco 7841"),
        entry("SEP000000000002", "Cisco 7841"),
    ]);
    let status = FakeStatus::new([unregistered("SEP000000000001")]);
    // Any request would be answered with an error, so an untouched record proves no request.
    let devices = FakeDevices::new([]);

    let discovery = service(directory, status, devices, Config::default())
        .perform_discovery(&Silent)
        .await
        .unwrap();

    assert_eq!(discovery.enrichment.candidates, 0);
    for record in discovery.inventory.iter() {
        assert_eq!(record.enrichment, Enrichment::NotAttempted);
    }
    assert_eq!(
        discovery.inventory.get("SEP000000000002").unwrap().status,
        StatusLookup::NotReported
    );
    assert_eq!(discovery.status.not_reported, 1);
}

#[tokio::test(start_paused = true)]
async fn silent_device_times_out_without_holding_up_the_rest() {
    let names: Vec<String> = (1..=6).map(|i| format!("SEP00000000000{i}")).collect();
    let directory = FakeDirectory::new(names.iter().map(|n| entry(n, "Cisco 7841")).collect());
    let status = FakeStatus::new(
        names
            .iter()
            .enumerate()
            .map(|(i, n)| registered(n, ip(i as u8 + 1))),
    );
    let mut answers = vec![(ip(1), Answer::Silent)];
    answers.extend((2..=6).map(|i| (ip(i), Answer::Page(info_page(UDI_7841)))));

    let cfg = Config {
        workers: 2,
        ..Config::default()
    };
    let discovery = service(directory, status, FakeDevices::new(answers), cfg)
        .perform_discovery(&Silent)
        .await
        .unwrap();

    let stuck = discovery.inventory.get("SEP000000000001").unwrap();
    assert_eq!(stuck.error(), Some(&EnrichmentError::Unreachable));
    assert_eq!(discovery.enrichment.identified, 5);
    assert_eq!(discovery.enrichment.failed, 1);

    let lines = csv_lines(&discovery);
    assert!(lines[1].ends_with("\"Request timeout: device unreachable\""));
}

#[tokio::test]
async fn failed_batch_leaves_its_devices_with_unknown_status() {
    let names: Vec<String> = (1..=5).map(|i| format!("SEP00000000000{i}")).collect();
    let directory = FakeDirectory::new(names.iter().map(|n| entry(n, "Cisco 7861")).collect());
    let status = FakeStatus::new(
        names
            .iter()
            .enumerate()
            .map(|(i, n)| registered(n, ip(i as u8 + 1))),
    )
    .failing([1]);
    let status = Arc::new(status);
    let devices = FakeDevices::new((1..=5).map(|i| (ip(i), Answer::Page(info_page(UDI_7841)))));

    let cfg = Config {
        chunk_size: 2,
        ..Config::default()
    };
    let service = DiscoveryService::new(
        Box::new(directory),
        Box::new(SharedStatus(Arc::clone(&status))),
        Arc::new(devices),
        cfg,
    )
    .unwrap();
    let discovery = service.perform_discovery(&Silent).await.unwrap();

    assert_eq!(status.batch_sizes(), vec![2, 2, 1]);
    assert_eq!(discovery.status.batches, 3);
    assert_eq!(discovery.status.failed.len(), 1);
    assert_eq!(discovery.status.failed[0].index, 1);

    for name in ["SEP000000000003", "SEP000000000004"] {
        let record = discovery.inventory.get(name).unwrap();
        assert_eq!(record.status, StatusLookup::BatchFailed);
        assert_eq!(record.enrichment, Enrichment::NotAttempted);
    }
    assert_eq!(discovery.enrichment.identified, 3);

    let summary = Summary::new(&discovery.inventory, &service.config().restricted_models);
    assert_eq!(summary.total, 5);
    assert_eq!(summary.status_unknown, 2);
    assert_eq!(summary.discovered, 3);
    assert_eq!(csv_lines(&discovery).len(), 6);
}

#[tokio::test]
async fn every_batch_failing_aborts_the_run() {
    let directory = FakeDirectory::new(vec![
        entry("SEP000000000001", "Cisco 7841"),
        entry("SEP000000000002", "Cisco 7841"),
    ]);
    let status = FakeStatus::new([]).failing([0, 1]);
    let cfg = Config {
        chunk_size: 1,
        ..Config::default()
    };

    let result = service(directory, status, FakeDevices::new([]), cfg)
        .perform_discovery(&Silent)
        .await;

    assert!(matches!(
        result,
        Err(DiscoveryError::NoStatusPass { batches: 2, .. })
    ));
}

#[tokio::test]
async fn unreachable_directory_aborts_the_run() {
    let result = service(
        FakeDirectory::down(),
        FakeStatus::new([]),
        FakeDevices::new([]),
        Config::default(),
    )
    .perform_discovery(&Silent)
    .await;

    assert!(matches!(result, Err(DiscoveryError::Directory(_))));
}

#[tokio::test]
async fn empty_catalog_still_exports_a_header() {
    let directory = FakeDirectory::new(vec![entry("SEP000000000009", "Cisco 8811")]);
    let discovery = service(
        directory,
        FakeStatus::new([]),
        FakeDevices::new([]),
        Config::default(),
    )
    .perform_discovery(&Silent)
    .await
    .unwrap();

    assert!(discovery.inventory.is_empty());
    assert_eq!(discovery.status.batches, 0);
    assert_eq!(csv_lines(&discovery).len(), 1);
}

#[tokio::test]
async fn unrecognized_and_failed_answers_are_told_apart() {
    let directory = FakeDirectory::new(vec![
        entry("SEP000000000001", "Cisco 7841"),
        entry("SEP000000000002", "Cisco 7841"),
    ]);
    let status = FakeStatus::new([
        registered("SEP000000000001", ip(1)),
        registered("SEP000000000002", ip(2)),
    ]);
    let devices = FakeDevices::new([
        (ip(1), Answer::Page(info_page("no identifier here"))),
        (
            ip(2),
            Answer::Error(EnrichmentError::WebAccessDisabled),
        ),
    ]);

    let discovery = service(directory, status, devices, Config::default())
        .perform_discovery(&Silent)
        .await
        .unwrap();

    let first = discovery.inventory.get("SEP000000000001").unwrap();
    assert_eq!(first.enrichment, Enrichment::Unrecognized);
    assert_eq!(first.error(), None);

    let second = discovery.inventory.get("SEP000000000002").unwrap();
    assert_eq!(second.error(), Some(&EnrichmentError::WebAccessDisabled));

    let lines = csv_lines(&discovery);
    assert!(lines[1].ends_with(",\"\",\"\",\"\",\"\""));
    assert!(lines[2].ends_with("\"Connection error: web access disabled on device\""));
}

#[tokio::test]
async fn observer_sees_every_stage_in_order() {
    #[derive(Default)]
    struct Recorder(Mutex<Vec<String>>);

    impl DiscoveryObserver for Recorder {
        fn catalog_loaded(&self, devices: usize) {
            self.0.lock().unwrap().push(format!("catalog {devices}"));
        }
        fn batch_started(&self, index: usize, total: usize, size: usize) {
            self.0
                .lock()
                .unwrap()
                .push(format!("batch {index}/{total} ({size})"));
        }
        fn enrichment_started(&self, candidates: usize) {
            self.0.lock().unwrap().push(format!("enrich {candidates}"));
        }
        fn device_enriched(&self, done: usize, total: usize, _record: &DeviceRecord) {
            self.0.lock().unwrap().push(format!("device {done}/{total}"));
        }
    }

    let directory = FakeDirectory::new(vec![
        entry("SEP000000000001", "Cisco 7841"),
        entry("SEP000000000002", "Cisco 7841"),
        entry("SEP000000000003", "Cisco 7841"),
    ]);
    let status = FakeStatus::new([
        registered("SEP000000000001", ip(1)),
        registered("SEP000000000002", ip(2)),
    ]);
    let devices = FakeDevices::new([
        (ip(1), Answer::Page(info_page(UDI_7841))),
        (ip(2), Answer::Page(info_page(UDI_7841))),
    ]);
    let cfg = Config {
        chunk_size: 2,
        ..Config::default()
    };

    let recorder = Recorder::default();
    service(directory, status, devices, cfg)
        .perform_discovery(&recorder)
        .await
        .unwrap();

    let events = recorder.0.into_inner().unwrap();
    assert_eq!(
        events,
        vec![
            "catalog 3",
            "batch 0/2 (2)",
            "batch 1/2 (1)",
            "enrich 2",
            "device 1/2",
            "device 2/2",
        ]
    );
}

#[tokio::test]
async fn invalid_configuration_is_rejected_up_front() {
    let cfg = Config {
        chunk_size: 1000,
        ..Config::default()
    };
    let result = DiscoveryService::new(
        Box::new(FakeDirectory::new(vec![])),
        Box::new(FakeStatus::new([])),
        Arc::new(FakeDevices::new([])),
        cfg,
    );
    assert!(matches!(result, Err(DiscoveryError::Config(_))));
}

#[tokio::test]
async fn rerunning_enrichment_keeps_the_same_rows() {
    let directory = FakeDirectory::new(vec![entry("SEP000000000001", "Cisco 7841")]);
    let status = FakeStatus::new([registered("SEP000000000001", ip(1))]);
    let devices = Arc::new(FakeDevices::new([(ip(1), Answer::Page(info_page(UDI_7841)))]));

    let service = DiscoveryService::new(
        Box::new(directory),
        Box::new(status),
        devices.clone(),
        Config::default(),
    )
    .unwrap();
    let mut discovery = service.perform_discovery(&Silent).await.unwrap();
    let first = csv_lines(&discovery);

    let enricher = hwrev_core::enricher::Enricher::new(devices, 4, Duration::from_secs(5));
    enricher.run(&mut discovery.inventory, &Silent).await;
    assert_eq!(csv_lines(&discovery), first);
}

/// Lets a test keep a handle on the fake after handing it to the service.
struct SharedStatus(Arc<FakeStatus>);

#[async_trait::async_trait]
impl hwrev_common::services::StatusService for SharedStatus {
    async fn select_devices(
        &self,
        names: &[String],
    ) -> Result<Vec<hwrev_common::device::DeviceStatus>, hwrev_common::error::ServiceError> {
        self.0.select_devices(names).await
    }
}
