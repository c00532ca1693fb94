//! 통합 테스트 -- 파이프라인 전체 흐름 검증
//!
//! 임시 디렉토리에 `client_data/<client>/network_logs/` 구조를 만들고
//! 탐색부터 JSON Lines 출력까지 전체 흐름을 검증합니다.

use std::fs;
use std::path::{Path, PathBuf};

use netlog_core::config::BareAddressPolicy;
use netlog_core::types::FormatMode;
use netlog_pipeline::{FileStatus, FlattenPipeline, PipelineConfigBuilder};
use serde_json::Value;

const SYSLOG_SAMPLE: &str = concat!(
    "<189><1>logver: date=2024-01-15 time=12:00:00 eventtime=1705320001500000000 itime=1705320000 ",
    "devid=FG100E devname=edge-fw vd=root srcip=10.0.0.5 src=10.0.0.5:51514:port1 ",
    "dst=93.184.216.34:443:wan1 proto=tcp/https policyid=7 policyname=\"allow web\" ",
    "user=\"alice\" sent=50 sentbyte=1200 rcvdbyte=5400 spkt=12 rpkt=10 action=accept\n",
    "<189><1>logver: src=10.0.0.6 proto=17 action=deny msg=\"unterminated\n",
    "<189><1>logver: no kv tokens on this line\n",
    "<189><1>logver: src=10.0.0.7 proto=1 action=deny\n",
);

const DELIMITED_SAMPLE: &str = concat!(
    "date=2024-02-01,time=23:59:59,src=172.16.0.1:8080,proto=6,\"msg=hello, \"\"world\"\"\"\n",
    "\n",
    "action=close,\"note=spans\n",
    "two lines\"\n",
);

const JSON_SAMPLE: &str = concat!(
    "{\"z\": 1, \"a\": {\"nested\": [1, 2, {\"k\": null}]}}\n",
    "{broken json\n",
    "[\"array\", true]\n",
    "\"just a string\"\n",
);

struct Workspace {
    _dir: tempfile::TempDir,
    input: PathBuf,
    output: PathBuf,
}

impl Workspace {
    fn new() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let input = dir.path().join("temp").join("client_data");
        let output = dir.path().join("temp").join("parsed_data");
        fs::create_dir_all(&input).expect("create input root");
        Self {
            _dir: dir,
            input,
            output,
        }
    }

    fn add(&self, rel: &str, content: &str) -> PathBuf {
        let path = self.input.join(rel);
        fs::create_dir_all(path.parent().expect("parent")).expect("create dirs");
        fs::write(&path, content).expect("write source");
        path
    }

    fn pipeline(&self) -> FlattenPipeline {
        let config = PipelineConfigBuilder::new()
            .input_root(&self.input)
            .output_root(&self.output)
            .build()
            .expect("valid config");
        FlattenPipeline::new(config).expect("pipeline")
    }

    fn events(&self, rel: &str) -> Vec<Value> {
        read_events(&self.output.join(rel))
    }
}

fn read_events(path: &Path) -> Vec<Value> {
    fs::read_to_string(path)
        .expect("read output")
        .lines()
        .map(|line| serde_json::from_str(line).expect("every output line is json"))
        .collect()
}

fn keys(value: &Value) -> Vec<&str> {
    value
        .as_object()
        .expect("object")
        .keys()
        .map(String::as_str)
        .collect()
}

#[test]
fn test_syslog_end_to_end() {
    let ws = Workspace::new();
    ws.add("acme/network_logs/fortigate.log", SYSLOG_SAMPLE);

    let summary = ws.pipeline().run_blocking();
    assert!(!summary.has_failures());

    let report = &summary.files[0];
    assert_eq!(report.mode, Some(FormatMode::SyslogKv));
    assert_eq!(report.records, 4);
    assert_eq!(report.written, 2);
    assert_eq!(report.skipped, 2);

    let events = ws.events("acme/network_logs/fortigate.json");
    assert_eq!(events.len(), 2);

    let first = &events[0];
    // eventtime이 itime, date+time보다 우선
    assert_eq!(first["@timestamp"], "2024-01-15T12:00:01.500000+00:00");
    assert_eq!(first["src_ip"], "10.0.0.5");
    assert_eq!(first["src_port"], 51514);
    assert_eq!(first["src_intf"], "port1");
    assert_eq!(first["dst_ip"], "93.184.216.34");
    assert_eq!(first["dst_port"], 443);
    assert_eq!(first["network_transport"], "tcp");
    assert_eq!(first["network_application"], "https");
    assert_eq!(first["policy_id"], 7);
    assert_eq!(first["policy_name"], "allow web");
    assert_eq!(first["user_name"], "alice");
    assert_eq!(first["device_devid"], "FG100E");
    assert_eq!(first["device_devname"], "edge-fw");
    assert_eq!(first["device_vd"], "root");
    assert_eq!(first["bytes_sent"], 1200);
    assert_eq!(first["bytes_received"], 5400);
    assert_eq!(first["packets_sent"], 12);
    assert_eq!(first["packets_received"], 10);
    assert_eq!(first["srcip"], "10.0.0.5");
    assert_eq!(first["action"], "accept");
    for consumed in ["src", "dst", "proto", "eventtime", "itime", "date", "time", "sent"] {
        assert!(first.get(consumed).is_none(), "{consumed} must not pass through");
    }

    let second = &events[1];
    assert_eq!(keys(second), vec!["network_transport", "action"]);
    assert_eq!(second["network_transport"], "icmp");
}

#[test]
fn test_delimited_end_to_end() {
    let ws = Workspace::new();
    ws.add("acme/network_logs/export.csv", DELIMITED_SAMPLE);

    let summary = ws.pipeline().run_blocking();
    assert_eq!(summary.files[0].mode, Some(FormatMode::DelimitedKv));

    let events = ws.events("acme/network_logs/export.json");
    assert_eq!(events.len(), 2);
    assert_eq!(events[0]["@timestamp"], "2024-02-01T23:59:59+00:00");
    assert_eq!(events[0]["src_ip"], "172.16.0.1");
    assert_eq!(events[0]["src_port"], 8080);
    assert!(events[0].get("src_intf").is_none());
    assert_eq!(events[0]["network_transport"], "tcp");
    assert_eq!(events[0]["msg"], "hello, \"world\"");
    assert_eq!(events[1]["note"], "spans\ntwo lines");
}

#[test]
fn test_json_lines_round_trip() {
    let ws = Workspace::new();
    ws.add("acme/network_logs/cloud.json", JSON_SAMPLE);

    let summary = ws.pipeline().run_blocking();
    assert_eq!(summary.files[0].mode, Some(FormatMode::JsonLines));
    assert_eq!(summary.files[0].skipped, 1);

    let expected: Vec<Value> = JSON_SAMPLE
        .lines()
        .filter_map(|line| serde_json::from_str(line).ok())
        .collect();
    let actual = ws.events("acme/network_logs/cloud.json");
    assert_eq!(actual, expected);
    assert_eq!(keys(&actual[0]), vec!["z", "a"]);

    let raw = fs::read_to_string(ws.output.join("acme/network_logs/cloud.json")).unwrap();
    assert!(raw.starts_with("{\"z\":1,\"a\":{\"nested\":[1,2,{\"k\":null}]}}\n"));
}

#[test]
fn test_rerun_is_idempotent() {
    let ws = Workspace::new();
    ws.add("acme/network_logs/fortigate.log", SYSLOG_SAMPLE);
    ws.add("acme/network_logs/export.csv", DELIMITED_SAMPLE);
    ws.add("globex/network_logs/cloud.json", JSON_SAMPLE);

    let pipeline = ws.pipeline();
    pipeline.run_blocking();
    let snapshot = |rel: &str| fs::read(ws.output.join(rel)).unwrap();
    let before = [
        snapshot("acme/network_logs/fortigate.json"),
        snapshot("acme/network_logs/export.json"),
        snapshot("globex/network_logs/cloud.json"),
    ];

    pipeline.run_blocking();
    let after = [
        snapshot("acme/network_logs/fortigate.json"),
        snapshot("acme/network_logs/export.json"),
        snapshot("globex/network_logs/cloud.json"),
    ];
    assert_eq!(before, after);
}

#[test]
fn test_ineligible_files_are_ignored() {
    let ws = Workspace::new();
    ws.add("acme/network_logs/capture.pcap", "a=1\n");
    ws.add("acme/iis_logs/u_ex240115.log", "a=1\n");
    ws.add("acme/network_logs/fw.log", "a=1\n");

    let summary = ws.pipeline().run_blocking();
    assert_eq!(summary.totals.files, 1);
    assert!(!ws.output.join("acme/iis_logs").exists());
}

#[test]
fn test_destination_failure_aborts_only_that_file() {
    let ws = Workspace::new();
    ws.add("acme/network_logs/fw.log", "a=1\n");
    ws.add("globex/network_logs/fw.log", "b=2\n");

    // acme의 출력 디렉토리 자리에 파일을 두어 생성 실패를 유발
    fs::create_dir_all(ws.output.join("acme")).unwrap();
    fs::write(ws.output.join("acme/network_logs"), "blocker").unwrap();

    let summary = ws.pipeline().run_blocking();
    assert_eq!(summary.totals.failed, 1);
    assert_eq!(summary.totals.ok, 1);
    assert!(matches!(summary.files[0].status, FileStatus::Failed { .. }));
    assert_eq!(ws.events("globex/network_logs/fw.json").len(), 1);
}

#[test]
fn test_bare_address_policy_is_configurable() {
    let ws = Workspace::new();
    ws.add("acme/network_logs/fw.log", "src=10.0.0.5,dst=10.0.0.9:53\n");

    ws.pipeline().run_blocking();
    let events = ws.events("acme/network_logs/fw.json");
    assert!(events[0].get("src_ip").is_none());
    assert_eq!(events[0]["dst_port"], 53);

    let config = PipelineConfigBuilder::new()
        .input_root(&ws.input)
        .output_root(&ws.output)
        .bare_address(BareAddressPolicy::IpOnly)
        .build()
        .unwrap();
    FlattenPipeline::new(config).unwrap().run_blocking();
    let events = ws.events("acme/network_logs/fw.json");
    assert_eq!(events[0]["src_ip"], "10.0.0.5");
    assert!(events[0].get("src_port").is_none());
}

#[tokio::test]
async fn test_parallel_run_writes_every_client() {
    let ws = Workspace::new();
    let clients = ["acme", "globex", "initech", "umbrella", "hooli"];
    for client in clients {
        ws.add(&format!("{client}/network_logs/fortigate.log"), SYSLOG_SAMPLE);
        ws.add(&format!("{client}/network_logs/nested/export.csv"), DELIMITED_SAMPLE);
    }

    let config = PipelineConfigBuilder::new()
        .input_root(&ws.input)
        .output_root(&ws.output)
        .workers(3)
        .build()
        .unwrap();
    let summary = FlattenPipeline::new(config).unwrap().run().await.unwrap();

    assert_eq!(summary.totals.files, 10);
    assert_eq!(summary.totals.ok, 10);
    assert_eq!(summary.totals.written, 20);
    for client in clients {
        assert_eq!(ws.events(&format!("{client}/network_logs/fortigate.json")).len(), 2);
        assert_eq!(
            ws.events(&format!("{client}/network_logs/nested/export.json")).len(),
            2
        );
    }
}
