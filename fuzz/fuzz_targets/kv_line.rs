#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use netlog_core::config::BareAddressPolicy;
use netlog_pipeline::kv;
use netlog_pipeline::normalizer::Normalizer;

/// 퍼저용 구조적 입력
#[derive(Arbitrary, Debug)]
struct FuzzInput {
    /// syslog 접두사형 라인 본문
    line: String,
    /// 주소 정책 선택
    ip_only: bool,
}

fuzz_target!(|input: FuzzInput| {
    let policy = if input.ip_only {
        BareAddressPolicy::IpOnly
    } else {
        BareAddressPolicy::Omit
    };

    if let Ok(Some(raw)) = kv::parse_syslog_line(&input.line) {
        let event = Normalizer::new(policy).normalize(&raw);
        let json = serde_json::to_value(&event).expect("canonical event serializes");
        let object = json.as_object().expect("canonical event is an object");
        assert!(object.values().all(|v| !v.is_null()), "null fields must be pruned");
    }
});
