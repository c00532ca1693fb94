//! 형식 판별기 -- 확장자와 첫 번째 비어 있지 않은 라인으로 파싱 모드를 고릅니다.
//!
//! # 판별 순서
//! 1. 확장자가 `json`이면 [`FormatMode::JsonLines`]
//! 2. 첫 번째 비어 있지 않은 라인이 (앞 공백 제거 후) `<`로 시작하면 [`FormatMode::SyslogKv`]
//! 3. 그 외에는 [`FormatMode::DelimitedKv`]
//!
//! 첫 라인을 읽은 뒤 리더를 처음 위치로 되돌리므로 이후 파서가 같은 리더를 그대로 사용합니다.

use std::ffi::OsStr;
use std::io::{self, BufRead, Seek, SeekFrom};
use std::path::Path;

use netlog_core::types::FormatMode;

/// 확장자와 리더 내용으로 파싱 모드를 판별합니다.
///
/// 리더는 판별 후 시작 위치(0)로 되감깁니다.
pub fn classify<R: BufRead + Seek>(
    extension: Option<&str>,
    reader: &mut R,
) -> io::Result<FormatMode> {
    if extension.is_some_and(|ext| ext.eq_ignore_ascii_case("json")) {
        return Ok(FormatMode::JsonLines);
    }

    let first = first_non_empty_line(reader)?;
    reader.seek(SeekFrom::Start(0))?;

    Ok(mode_for_first_line(first.as_deref()))
}

/// 경로의 확장자를 판별기에 넘길 형태로 추출합니다.
pub fn extension_of(path: &Path) -> Option<&str> {
    path.extension().and_then(OsStr::to_str)
}

/// 첫 번째 비어 있지 않은 라인에 대한 KV 모드 결정
pub fn mode_for_first_line(first: Option<&str>) -> FormatMode {
    match first {
        Some(line) if line.trim_start().starts_with('<') => FormatMode::SyslogKv,
        _ => FormatMode::DelimitedKv,
    }
}

fn first_non_empty_line<R: BufRead>(reader: &mut R) -> io::Result<Option<String>> {
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            return Ok(None);
        }
        let line = String::from_utf8_lossy(&buf);
        if !line.trim().is_empty() {
            return Ok(Some(line.into_owned()));
        }
    }
}
