//! JSON-Lines passthrough -- 정규화 없이 한 줄씩 JSON 값을 재인코딩합니다.
//!
//! 각 라인은 독립적인 JSON 값으로 파싱되며, 필드 순서는 입력 그대로 유지됩니다
//! (`serde_json`의 `preserve_order`). 재인코딩은 공백 없는 compact 형식입니다.
//!
//! 공백뿐인 라인은 레코드로 세지 않습니다. 파싱 실패 라인은
//! [`LogPipelineError::Json`]으로 보고되며, 건너뛸지 파일 처리를 멈출지는
//! 호출자가 [`MalformedLinePolicy`](netlog_core::config::MalformedLinePolicy)로 결정합니다.

use std::io::BufRead;

use serde_json::Value;

use crate::error::LogPipelineError;

/// JSON 라인 하나를 파싱합니다.
///
/// `line_no`는 1부터 시작하며 에러 메시지에만 사용됩니다.
pub fn parse_line(line: &str, line_no: usize) -> Result<Value, LogPipelineError> {
    serde_json::from_str(line.trim()).map_err(|e| LogPipelineError::Json {
        line: line_no,
        reason: e.to_string(),
    })
}

/// 리더의 각 비어 있지 않은 라인을 JSON 값으로 읽는 반복자를 만듭니다.
pub fn json_lines<R: BufRead>(reader: R) -> JsonLines<R> {
    JsonLines {
        reader,
        buf: Vec::new(),
        line_no: 0,
    }
}

/// JSON-Lines 레코드 반복자
///
/// 라인 파싱 실패는 `Json`, 읽기 실패는 `Io` 에러 항목으로 나옵니다.
pub struct JsonLines<R> {
    reader: R,
    buf: Vec<u8>,
    line_no: usize,
}

impl<R: BufRead> Iterator for JsonLines<R> {
    type Item = Result<Value, LogPipelineError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.buf.clear();
            match self.reader.read_until(b'\n', &mut self.buf) {
                Ok(0) => return None,
                Ok(_) => {
                    self.line_no += 1;
                    let line = String::from_utf8_lossy(&self.buf);
                    if line.trim().is_empty() {
                        continue;
                    }
                    return Some(parse_line(&line, self.line_no));
                }
                Err(e) => return Some(Err(LogPipelineError::Io(e))),
            }
        }
    }
}
