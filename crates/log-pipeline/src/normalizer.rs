//! 의미 정규화기 -- [`RawEvent`]를 평탄화된 [`CanonicalEvent`]로 변환합니다.
//!
//! # 처리 단계 (순서 고정)
//! 1. 타임스탬프: `eventtime`(ns) > `itime`(s) > `date`+`time`(naive, UTC로 간주)
//! 2. 주소 분해: `src`/`dst` 값 `ip[:port[:intf]]`
//! 3. 프로토콜 분해: `proto` 문자열 `전송/응용` 또는 정수 번호
//! 4. 고정 이름 변경 (정책, 사용자, 장비, VPN)
//! 5. 카운터 이름 변경 (선언 순서대로, 뒤 항목이 이김)
//! 6. passthrough: 소비되지 않았고 아직 없는 원시 키를 그대로 복사
//! 7. null 값 제거
//!
//! 단계 2~5는 원시 값이 null이어도 정규 키를 먼저 채웁니다.
//! 이렇게 채워진 키는 6단계에서 같은 이름의 원시 키 복사를 막고, 7단계에서 제거됩니다.

use chrono::{DateTime, NaiveDateTime, Timelike, Utc};
use netlog_core::config::BareAddressPolicy;
use netlog_core::types::{CanonicalEvent, FieldValue, RawEvent, Scalar};

/// 프로토콜 번호 -> 전송 계층 이름
const PROTOCOL_NAMES: &[(i64, &str)] = &[(6, "tcp"), (17, "udp"), (1, "icmp")];

/// 1:1 고정 이름 변경
const FIXED_RENAMES: &[(&str, &str)] = &[
    ("policyid", "policy_id"),
    ("policyname", "policy_name"),
    ("user", "user_name"),
    ("devid", "device_devid"),
    ("devname", "device_devname"),
    ("vd", "device_vd"),
    ("fw", "device_fw"),
    ("vpntype", "vpn_vpntype"),
    ("vpnpolicy", "vpn_vpnpolicy"),
];

/// 카운터 이름 변경 표. 같은 정규 키에 대해서는 뒤에 있는 원시 키가 이깁니다.
const COUNTER_RENAMES: &[(&str, &str)] = &[
    ("sent", "bytes_sent"),
    ("sentbyte", "bytes_sent"),
    ("rcvd", "bytes_received"),
    ("rcvdbyte", "bytes_received"),
    ("spkt", "packets_sent"),
    ("rpkt", "packets_received"),
];

/// passthrough 대상에서 제외되는 원시 키
///
/// 장비/VPN 키는 여기에 없으므로 `device_*`/`vpn_*`와 함께 원래 이름으로도 남습니다.
const CONSUMED_KEYS: &[&str] = &[
    "src",
    "dst",
    "proto",
    "policyid",
    "policyname",
    "user",
    "sent",
    "sentbyte",
    "rcvd",
    "rcvdbyte",
    "spkt",
    "rpkt",
    "eventtime",
    "itime",
    "date",
    "time",
];

/// `date`+`time` 조합에 허용되는 naive 형식
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S%.f",
];

const NANOS_PER_SEC: i64 = 1_000_000_000;

/// 원시 이벤트를 정규 이벤트로 바꾸는 정규화기
///
/// 파일 간 상태를 갖지 않으며 설정된 정책만 보관합니다.
#[derive(Debug, Clone, Copy, Default)]
pub struct Normalizer {
    bare_address: BareAddressPolicy,
}

impl Normalizer {
    /// 구분자 없는 주소 처리 정책으로 정규화기를 생성합니다.
    pub fn new(bare_address: BareAddressPolicy) -> Self {
        Self { bare_address }
    }

    /// 7단계 정규화를 수행합니다.
    pub fn normalize(&self, raw: &RawEvent) -> CanonicalEvent {
        let mut event = CanonicalEvent::new();

        if let Some(ts) = timestamp(raw) {
            event.insert("@timestamp", render_timestamp(&ts));
        }

        for dir in ["src", "dst"] {
            if let Some(value) = raw.get(dir) {
                self.decompose_address(dir, value, &mut event);
            }
        }

        if let Some(value) = raw.get("proto") {
            decompose_protocol(value, &mut event);
        }

        for (from, to) in FIXED_RENAMES {
            if let Some(value) = raw.get(from) {
                event.insert(*to, value.clone());
            }
        }

        for (from, to) in COUNTER_RENAMES {
            if let Some(value) = raw.get(from) {
                event.insert(*to, value.clone());
            }
        }

        for (key, value) in raw.iter() {
            if !CONSUMED_KEYS.contains(&key) && !event.contains_key(key) {
                event.insert(key, value.clone());
            }
        }

        event.prune_nulls();
        event
    }

    /// `ip[:port[:intf]]` 값을 `<dir>_ip`, `<dir>_port`, `<dir>_intf`로 분해합니다.
    fn decompose_address(&self, dir: &str, value: &Scalar, event: &mut CanonicalEvent) {
        let ip_key = format!("{dir}_ip");
        let port_key = format!("{dir}_port");
        let intf_key = format!("{dir}_intf");

        // 세 키는 항상 예약되어 같은 이름의 원시 키가 복사되지 않음
        let text = match value {
            Scalar::Str(s) => s.clone(),
            Scalar::Int(n) => n.to_string(),
            Scalar::Null => {
                event.insert(ip_key, FieldValue::Null);
                event.insert(port_key, FieldValue::Null);
                event.insert(intf_key, FieldValue::Null);
                return;
            }
        };

        if !text.contains(':') {
            let ip = match self.bare_address {
                BareAddressPolicy::IpOnly => FieldValue::Str(text),
                BareAddressPolicy::Omit => FieldValue::Null,
            };
            event.insert(ip_key, ip);
            event.insert(port_key, FieldValue::Null);
            event.insert(intf_key, FieldValue::Null);
            return;
        }

        let mut parts = text.split(':');
        let ip = parts.next().unwrap_or_default();
        let port = parts
            .next()
            .filter(|p| !p.is_empty() && p.bytes().all(|b| b.is_ascii_digit()))
            .and_then(|p| p.parse::<i64>().ok());
        let intf = parts.next();

        event.insert(ip_key, ip);
        event.insert(port_key, port.map_or(FieldValue::Null, FieldValue::Int));
        event.insert(intf_key, intf.map_or(FieldValue::Null, FieldValue::from));
    }
}

/// `proto` 값을 `network_transport`/`network_application`으로 분해합니다.
fn decompose_protocol(value: &Scalar, event: &mut CanonicalEvent) {
    let (transport, application) = match value {
        Scalar::Str(s) => {
            let mut parts = s.split('/');
            let transport = parts.next().map(FieldValue::from).unwrap_or(FieldValue::Null);
            let application = parts.next().map(FieldValue::from).unwrap_or(FieldValue::Null);
            (transport, application)
        }
        Scalar::Int(n) => {
            let name = PROTOCOL_NAMES
                .iter()
                .find(|(num, _)| num == n)
                .map(|(_, name)| (*name).to_owned())
                .unwrap_or_else(|| n.to_string());
            (FieldValue::Str(name), FieldValue::Null)
        }
        Scalar::Null => (FieldValue::Null, FieldValue::Null),
    };

    event.insert("network_transport", transport);
    event.insert("network_application", application);
}

/// 첫 번째로 일치하는 규칙으로 이벤트 시각을 구합니다.
///
/// 값이 있지만 정수가 아니거나 범위를 벗어난 `eventtime`/`itime`은 다음 규칙으로 넘어갑니다.
pub fn timestamp(raw: &RawEvent) -> Option<DateTime<Utc>> {
    if let Some(ns) = raw.get("eventtime").and_then(Scalar::as_int) {
        let secs = ns.div_euclid(NANOS_PER_SEC);
        let nanos = ns.rem_euclid(NANOS_PER_SEC) as u32;
        if let Some(ts) = DateTime::from_timestamp(secs, nanos) {
            return Some(ts);
        }
    }

    if let Some(secs) = raw.get("itime").and_then(Scalar::as_int) {
        if let Some(ts) = DateTime::from_timestamp(secs, 0) {
            return Some(ts);
        }
    }

    let date = raw.get("date").and_then(scalar_text)?;
    let time = raw.get("time").and_then(scalar_text)?;
    parse_naive(&format!("{date} {time}")).map(|naive| naive.and_utc())
}

/// UTC 시각을 `YYYY-MM-DDTHH:MM:SS[.ffffff]+00:00`로 렌더링합니다.
///
/// 마이크로초 부분은 0이 아닐 때만 붙습니다. 마이크로초 미만은 버립니다.
pub fn render_timestamp(ts: &DateTime<Utc>) -> String {
    let micros = ts.nanosecond() / 1_000;
    if micros == 0 {
        ts.format("%Y-%m-%dT%H:%M:%S+00:00").to_string()
    } else {
        format!("{}.{:06}+00:00", ts.format("%Y-%m-%dT%H:%M:%S"), micros)
    }
}

fn parse_naive(text: &str) -> Option<NaiveDateTime> {
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
}

fn scalar_text(value: &Scalar) -> Option<String> {
    (!value.is_null()).then(|| value.to_string())
}
