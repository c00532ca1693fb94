//! KV 파서 -- 토큰 목록을 [`RawEvent`]로 변환하는 공통 백엔드
//!
//! 두 토크나이저 프런트엔드가 만든 토큰을 같은 규칙으로 처리합니다.
//!
//! - `=`가 있는 토큰만 첫 번째 `=`에서 key/value로 나눕니다.
//! - `=`가 없거나 key가 빈 토큰은 버립니다.
//! - 같은 key가 다시 나오면 뒤의 값이 이깁니다.
//! - 값은 [`clean_value`]로 정리합니다.
//!
//! 결과가 비어 있으면 `None`("이벤트 없음")이며 호출자는 해당 라인을 건너뜁니다.

use netlog_core::types::{RawEvent, Scalar};

use crate::error::LogPipelineError;
use crate::tokenizer::{SyslogTokenizer, Tokenizer};

/// 값 양끝의 큰따옴표를 최대 몇 겹까지 벗기는지
const MAX_QUOTE_LAYERS: usize = 2;

/// 원시 값을 태그된 스칼라로 정리합니다.
///
/// 1. 앞뒤 공백 제거
/// 2. 양끝을 감싼 큰따옴표 한 겹 제거 (최대 두 번)
/// 3. 빈 문자열이면 [`Scalar::Null`]
/// 4. ASCII 10진 숫자로만 이루어졌으면 [`Scalar::Int`] (i64 범위 초과 시 문자열 유지)
/// 5. 그 외에는 [`Scalar::Str`]
pub fn clean_value(raw: &str) -> Scalar {
    let mut value = raw.trim();

    for _ in 0..MAX_QUOTE_LAYERS {
        match value
            .strip_prefix('"')
            .and_then(|v| v.strip_suffix('"'))
        {
            Some(inner) => value = inner,
            None => break,
        }
    }

    if value.is_empty() {
        return Scalar::Null;
    }

    if value.bytes().all(|b| b.is_ascii_digit()) {
        if let Ok(n) = value.parse::<i64>() {
            return Scalar::Int(n);
        }
    }

    Scalar::Str(value.to_owned())
}

/// 토큰 하나를 key/value 쌍으로 나눕니다.
///
/// `=`가 없거나 key가 비어 있으면 `None`을 반환합니다.
pub fn split_token(token: &str) -> Option<(&str, &str)> {
    let (key, value) = token.split_once('=')?;
    if key.is_empty() {
        return None;
    }
    Some((key, value))
}

/// 토큰 목록을 원시 이벤트로 변환합니다.
///
/// KV 토큰이 하나도 없으면 `None`을 반환합니다.
pub fn parse_tokens<I, S>(tokens: I) -> Option<RawEvent>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut event = RawEvent::new();

    for token in tokens {
        if let Some((key, value)) = split_token(token.as_ref()) {
            event.insert(key, clean_value(value));
        }
    }

    if event.is_empty() { None } else { Some(event) }
}

/// syslog 접두사형 라인 하나를 원시 이벤트로 변환합니다.
///
/// 토큰화 실패는 에러로, KV 토큰이 없는 라인은 `Ok(None)`으로 반환합니다.
pub fn parse_syslog_line(line: &str) -> Result<Option<RawEvent>, LogPipelineError> {
    let tokens = SyslogTokenizer::new().tokenize(line)?;
    Ok(parse_tokens(tokens))
}
