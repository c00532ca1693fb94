//! 쉼표 구분 행 토크나이저
//!
//! 클라우드 콘솔에서 내려받은 방화벽 로그는 한 행에 `key=value` 필드가 쉼표로 나열된
//! CSV 형태입니다. 필드는 큰따옴표로 감쌀 수 있고, 내부 큰따옴표는 두 번 써서 이스케이프합니다.
//! 인용 필드는 여러 물리 라인에 걸칠 수 있으므로 파일 단위 처리는 [`DelimitedTokenizer::records`]로
//! 레코드 스트림을 읽습니다.

use std::io::Read;

use csv::{ByteRecord, ReaderBuilder};

use super::Tokenizer;
use crate::error::LogPipelineError;

const FORMAT_NAME: &str = "delimited";

/// 쉼표 구분 행 토크나이저
#[derive(Debug, Clone, Copy, Default)]
pub struct DelimitedTokenizer;

impl DelimitedTokenizer {
    pub fn new() -> Self {
        Self
    }

    /// 리더에서 CSV 레코드를 하나씩 읽어 필드 목록으로 반환하는 반복자를 만듭니다.
    ///
    /// 헤더 행은 없으며 레코드마다 필드 수가 달라도 됩니다.
    /// UTF-8이 아닌 바이트는 대체 문자로 바뀝니다.
    pub fn records<'a, R: Read + 'a>(
        reader: R,
    ) -> impl Iterator<Item = Result<Vec<String>, LogPipelineError>> + 'a {
        ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader)
            .into_byte_records()
            .map(|record| record.map(fields_of).map_err(LogPipelineError::from))
    }
}

impl Tokenizer for DelimitedTokenizer {
    fn format_name(&self) -> &str {
        FORMAT_NAME
    }

    /// 한 행을 필드로 나눕니다. 여러 레코드가 들어오면 첫 레코드만 사용합니다.
    fn tokenize(&self, text: &str) -> Result<Vec<String>, LogPipelineError> {
        match Self::records(text.as_bytes()).next() {
            Some(record) => record,
            None => Ok(Vec::new()),
        }
    }
}

fn fields_of(record: ByteRecord) -> Vec<String> {
    record
        .iter()
        .map(|field| String::from_utf8_lossy(field).into_owned())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokenize(line: &str) -> Vec<String> {
        DelimitedTokenizer::new().tokenize(line).unwrap()
    }

    #[test]
    fn format_name_is_delimited() {
        assert_eq!(DelimitedTokenizer::new().format_name(), "delimited");
    }

    #[test]
    fn splits_on_commas() {
        assert_eq!(
            tokenize("date=2024-01-15,time=12:00:00,action=deny"),
            vec!["date=2024-01-15", "time=12:00:00", "action=deny"]
        );
    }

    #[test]
    fn quoted_field_keeps_embedded_comma() {
        assert_eq!(
            tokenize(r#"a=1,"msg=hello, world",b=2"#),
            vec!["a=1", "msg=hello, world", "b=2"]
        );
    }

    #[test]
    fn doubled_quotes_are_unescaped() {
        assert_eq!(
            tokenize(r#""msg=say ""hi""",x=1"#),
            vec![r#"msg=say "hi""#, "x=1"]
        );
    }

    #[test]
    fn empty_line_yields_no_tokens() {
        assert!(tokenize("").is_empty());
    }

    #[test]
    fn records_support_multiline_quoted_fields() {
        let input = "a=1,\"msg=line one\nline two\"\nb=2\n";
        let records: Vec<Vec<String>> = DelimitedTokenizer::records(input.as_bytes())
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0][1], "msg=line one\nline two");
        assert_eq!(records[1], vec!["b=2"]);
    }

    #[test]
    fn records_allow_varying_field_counts() {
        let input = "a=1,b=2,c=3\nd=4\n";
        let records: Vec<Vec<String>> = DelimitedTokenizer::records(input.as_bytes())
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(records[0].len(), 3);
        assert_eq!(records[1].len(), 1);
    }

    #[test]
    fn invalid_utf8_is_replaced() {
        let input: &[u8] = b"a=\xff\xfe,b=2\n";
        let records: Vec<Vec<String>> = DelimitedTokenizer::records(input)
            .collect::<Result<_, _>>()
            .unwrap();
        assert!(records[0][0].starts_with("a="));
        assert_eq!(records[0][1], "b=2");
    }
}
