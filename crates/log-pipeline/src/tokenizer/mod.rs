//! 토큰화 모듈 -- 한 레코드를 순서가 있는 원시 토큰 목록으로 나눕니다.
//!
//! 두 개의 프런트엔드가 같은 백엔드([`kv`](crate::kv))에 토큰을 넘깁니다.
//!
//! - [`SyslogTokenizer`]: 접두사 제거 후 POSIX shell 인용 규칙
//! - [`DelimitedTokenizer`]: 쉼표 구분, 큰따옴표 인용 필드
//!
//! 파일 단위 처리는 [`records`]로 모드에 맞는 레코드 스트림을 얻습니다.
//! 레코드 하나의 토큰화 실패는 [`LogPipelineError::Tokenize`]로 나오며
//! 호출자는 해당 레코드만 건너뜁니다. 그 외 에러(I/O)는 파일 처리 중단 사유입니다.

pub mod delimited;
pub mod syslog;

pub use delimited::DelimitedTokenizer;
pub use syslog::SyslogTokenizer;

use std::io::BufRead;

use netlog_core::types::FormatMode;

use crate::error::LogPipelineError;

/// 한 줄의 텍스트를 토큰으로 나누는 프런트엔드 trait
pub trait Tokenizer: Send + Sync {
    /// 프런트엔드 이름 (진단 메시지에 사용)
    fn format_name(&self) -> &str;

    /// 텍스트 한 줄을 토큰 목록으로 나눕니다.
    fn tokenize(&self, text: &str) -> Result<Vec<String>, LogPipelineError>;
}

/// 레코드 스트림 -- 레코드마다 토큰 목록 또는 에러
pub type TokenRecords<'a> = Box<dyn Iterator<Item = Result<Vec<String>, LogPipelineError>> + 'a>;

/// 모드에 맞는 레코드 스트림을 만듭니다.
///
/// JSON-Lines 모드는 토큰화를 거치지 않으므로 빈 스트림입니다.
pub fn records<'a, R: BufRead + 'a>(mode: FormatMode, reader: R) -> TokenRecords<'a> {
    match mode {
        FormatMode::SyslogKv => Box::new(LineRecords {
            reader,
            tokenizer: SyslogTokenizer::new(),
            buf: Vec::new(),
        }),
        FormatMode::DelimitedKv => Box::new(DelimitedTokenizer::records(reader)),
        FormatMode::JsonLines => Box::new(std::iter::empty()),
    }
}

/// 물리 라인 단위로 토크나이저를 적용하는 레코드 반복자
struct LineRecords<R, T> {
    reader: R,
    tokenizer: T,
    buf: Vec<u8>,
}

impl<R: BufRead, T: Tokenizer> Iterator for LineRecords<R, T> {
    type Item = Result<Vec<String>, LogPipelineError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.buf.clear();
        match self.reader.read_until(b'\n', &mut self.buf) {
            Ok(0) => None,
            Ok(_) => {
                let line = String::from_utf8_lossy(&self.buf);
                Some(self.tokenizer.tokenize(&line))
            }
            Err(e) => Some(Err(LogPipelineError::Io(e))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_mode_has_no_token_stream() {
        assert_eq!(records(FormatMode::JsonLines, "{}\n".as_bytes()).count(), 0);
    }

    #[test]
    fn syslog_records_are_per_line() {
        let input = "<1><2>fw: a=1 b=\"x y\"\n\n<1><2>fw: c=3";
        let recs: Vec<_> = records(FormatMode::SyslogKv, input.as_bytes())
            .collect();
        assert_eq!(recs.len(), 3);
        assert_eq!(recs[0].as_ref().unwrap(), &vec!["a=1", "b=x y"]);
        assert!(recs[1].as_ref().unwrap().is_empty());
        assert_eq!(recs[2].as_ref().unwrap(), &vec!["c=3"]);
    }

    #[test]
    fn syslog_tokenize_error_does_not_end_stream() {
        let input = "<1><2>fw: a=\"open\n<1><2>fw: b=2\n";
        let recs: Vec<_> = records(FormatMode::SyslogKv, input.as_bytes())
            .collect();
        assert_eq!(recs.len(), 2);
        assert!(matches!(recs[0], Err(LogPipelineError::Tokenize { .. })));
        assert_eq!(recs[1].as_ref().unwrap(), &vec!["b=2"]);
    }

    #[test]
    fn delimited_records_use_csv_rules() {
        let input = "a=1,\"b=2,3\"\n";
        let recs: Vec<_> = records(FormatMode::DelimitedKv, input.as_bytes())
            .collect();
        assert_eq!(recs[0].as_ref().unwrap(), &vec!["a=1", "b=2,3"]);
    }
}
