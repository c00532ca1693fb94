//! 도메인 타입 -- 파이프라인 전역에서 사용되는 공통 타입
//!
//! 원시 key=value 이벤트([`RawEvent`])와 평탄화된 정규 이벤트([`CanonicalEvent`]),
//! 그리고 파일 형식 모드([`FormatMode`])를 정의합니다.

use std::fmt;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

/// 파싱 시점에 결정되는 스칼라 값
///
/// 런타임 타입 검사 대신 명시적인 태그로 문자열/정수/null을 구분합니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scalar {
    /// 문자열 값
    Str(String),
    /// 10진수 숫자로만 이루어진 값
    Int(i64),
    /// 빈 값 (`key=`, `key=""`)
    Null,
}

impl Scalar {
    /// 정수 값이면 반환합니다.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(s) => write!(f, "{s}"),
            Self::Int(n) => write!(f, "{n}"),
            Self::Null => write!(f, "null"),
        }
    }
}

impl Serialize for Scalar {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Str(s) => serializer.serialize_str(s),
            Self::Int(n) => serializer.serialize_i64(*n),
            Self::Null => serializer.serialize_unit(),
        }
    }
}

/// 한 줄(또는 한 레코드)에서 추출한 원시 key=value 매핑
///
/// 키는 유일하며, 같은 키가 다시 나오면 값만 덮어쓰고 위치는 처음 등장한 자리를 유지합니다.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawEvent {
    fields: Vec<(String, Scalar)>,
}

impl RawEvent {
    pub fn new() -> Self {
        Self::default()
    }

    /// 필드를 삽입합니다. 기존 키면 값을 덮어씁니다 (last-token-wins).
    pub fn insert(&mut self, key: impl Into<String>, value: Scalar) {
        let key = key.into();
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Scalar> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Scalar)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, Scalar)> for RawEvent {
    fn from_iter<I: IntoIterator<Item = (K, Scalar)>>(iter: I) -> Self {
        let mut event = Self::new();
        for (k, v) in iter {
            event.insert(k, v);
        }
        event
    }
}

/// 정규 이벤트 필드 값
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Str(String),
    Int(i64),
    Bool(bool),
    Null,
}

impl FieldValue {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl From<Scalar> for FieldValue {
    fn from(value: Scalar) -> Self {
        match value {
            Scalar::Str(s) => Self::Str(s),
            Scalar::Int(n) => Self::Int(n),
            Scalar::Null => Self::Null,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_owned())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Str(s) => serializer.serialize_str(s),
            Self::Int(n) => serializer.serialize_i64(*n),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Null => serializer.serialize_unit(),
        }
    }
}

/// 평탄화된 정규 이벤트
///
/// 고정 카탈로그 필드(`@timestamp`, `src_ip`, `bytes_sent` 등)와
/// 원시 이벤트에서 그대로 복사된 passthrough 필드로 구성됩니다.
/// 삽입 순서대로 JSON 객체로 직렬화됩니다.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CanonicalEvent {
    fields: Vec<(String, FieldValue)>,
}

impl CanonicalEvent {
    pub fn new() -> Self {
        Self::default()
    }

    /// 필드를 설정합니다. 기존 키면 위치를 유지한 채 값을 교체합니다.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<FieldValue>) {
        let key = key.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// null 값을 가진 키를 모두 제거합니다.
    pub fn prune_nulls(&mut self) {
        self.fields.retain(|(_, v)| !v.is_null());
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Serialize for CanonicalEvent {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (k, v) in &self.fields {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

/// 파일 단위 파싱 모드
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormatMode {
    /// 한 줄에 JSON 값 하나 -- 정규화 없이 재인코딩
    JsonLines,
    /// `<n><n>word:` 접두사가 붙은 shell 인용 key=value 라인
    SyslogKv,
    /// 쉼표 구분 행의 key=value 필드
    DelimitedKv,
}

impl FormatMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::JsonLines => "json_lines",
            Self::SyslogKv => "syslog_kv",
            Self::DelimitedKv => "delimited_kv",
        }
    }
}

impl fmt::Display for FormatMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_event_last_value_wins_and_keeps_position() {
        let mut event = RawEvent::new();
        event.insert("a", Scalar::Int(1));
        event.insert("b", Scalar::Str("x".to_owned()));
        event.insert("a", Scalar::Int(2));

        let keys: Vec<&str> = event.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(event.get("a"), Some(&Scalar::Int(2)));
    }

    #[test]
    fn canonical_event_serializes_in_insertion_order() {
        let mut event = CanonicalEvent::new();
        event.insert("@timestamp", "2024-01-15T12:00:00+00:00");
        event.insert("src_port", 443_i64);
        event.insert("zzz", FieldValue::Bool(true));

        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(
            json,
            r#"{"@timestamp":"2024-01-15T12:00:00+00:00","src_port":443,"zzz":true}"#
        );
    }

    #[test]
    fn prune_nulls_removes_only_nulls() {
        let mut event = CanonicalEvent::new();
        event.insert("keep", "v");
        event.insert("drop", FieldValue::Null);
        event.insert("zero", 0_i64);
        event.prune_nulls();

        assert!(!event.contains_key("drop"));
        assert_eq!(event.len(), 2);
    }

    #[test]
    fn scalar_serializes_untagged() {
        let values = vec![Scalar::Str("a".to_owned()), Scalar::Int(7), Scalar::Null];
        assert_eq!(serde_json::to_string(&values).unwrap(), r#"["a",7,null]"#);
    }

    #[test]
    fn format_mode_display() {
        assert_eq!(FormatMode::SyslogKv.to_string(), "syslog_kv");
        assert_eq!(
            serde_json::to_string(&FormatMode::JsonLines).unwrap(),
            r#""json_lines""#
        );
    }
}
