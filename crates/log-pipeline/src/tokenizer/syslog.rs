//! Syslog 접두사형 라인 토크나이저
//!
//! FortiGate 등이 syslog로 내보내는 라인은 `<189><1>logver: ` 같은 우선순위/시설 접두사 뒤에
//! 공백으로 구분된 `key=value` 목록이 이어집니다. 값은 큰따옴표로 감싸질 수 있으며
//! 그 안에 공백이 들어갈 수 있습니다.
//!
//! # 처리 단계
//! 1. `^<숫자><숫자>단어:\s*` 접두사 제거
//! 2. POSIX shell 규칙으로 토큰 분리
//!    - 작은따옴표 내부는 그대로 (이스케이프 없음)
//!    - 큰따옴표 내부의 `\`는 `"`와 `\` 앞에서만 이스케이프
//!    - 인용 밖의 `\`는 다음 문자 하나를 그대로 취함
//!    - 인용부호는 토큰 중간에 올 수 있으며 결과에서 제거됨
//!
//! 닫히지 않은 인용부호나 끝에 남은 `\`는 [`LogPipelineError::Tokenize`]로 실패합니다.

use std::sync::LazyLock;

use regex::Regex;

use super::Tokenizer;
use crate::error::LogPipelineError;

/// `<n><n>word:` 접두사와 뒤따르는 공백
static SYSLOG_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^<\d+><\d+>\w+:\s*").unwrap_or_else(|e| panic!("invalid prefix regex: {e}"))
});

const FORMAT_NAME: &str = "syslog";

/// Syslog 접두사형 key=value 라인 토크나이저
#[derive(Debug, Clone, Copy, Default)]
pub struct SyslogTokenizer;

impl SyslogTokenizer {
    pub fn new() -> Self {
        Self
    }

    /// 라인에서 syslog 접두사를 제거하고 앞뒤 공백을 잘라냅니다.
    ///
    /// 접두사가 없는 라인은 공백만 잘라서 반환합니다.
    pub fn strip_prefix(line: &str) -> &str {
        match SYSLOG_PREFIX.find(line) {
            Some(m) => line[m.end()..].trim(),
            None => line.trim(),
        }
    }

    /// POSIX shell 규칙으로 문자열을 토큰으로 나눕니다.
    pub fn shell_split(input: &str) -> Result<Vec<String>, LogPipelineError> {
        #[derive(Clone, Copy, PartialEq, Eq)]
        enum State {
            /// 토큰 사이 공백
            Between,
            /// 인용 밖 토큰 내부
            Word,
            /// 작은따옴표 내부
            Single,
            /// 큰따옴표 내부
            Double,
        }

        let mut tokens = Vec::new();
        let mut token = String::new();
        // 빈 인용 문자열("")도 토큰으로 인정하기 위한 플래그
        let mut quoted = false;
        let mut state = State::Between;
        let mut chars = input.char_indices().peekable();

        while let Some((offset, ch)) = chars.next() {
            match state {
                State::Between | State::Word => {
                    if is_shell_whitespace(ch) {
                        if state == State::Word || quoted {
                            tokens.push(std::mem::take(&mut token));
                            quoted = false;
                        }
                        state = State::Between;
                    } else if ch == '\\' {
                        match chars.next() {
                            Some((_, escaped)) => token.push(escaped),
                            None => return Err(tokenize_error(offset, "no escaped character")),
                        }
                        state = State::Word;
                    } else if ch == '\'' {
                        quoted = true;
                        state = State::Single;
                    } else if ch == '"' {
                        quoted = true;
                        state = State::Double;
                    } else {
                        token.push(ch);
                        state = State::Word;
                    }
                }
                State::Single => {
                    if ch == '\'' {
                        state = State::Word;
                    } else {
                        token.push(ch);
                    }
                }
                State::Double => {
                    if ch == '"' {
                        state = State::Word;
                    } else if ch == '\\' {
                        match chars.next() {
                            Some((_, escaped @ ('"' | '\\'))) => token.push(escaped),
                            Some((_, other)) => {
                                token.push('\\');
                                token.push(other);
                            }
                            None => return Err(tokenize_error(offset, "no escaped character")),
                        }
                    } else {
                        token.push(ch);
                    }
                }
            }
        }

        match state {
            State::Single | State::Double => {
                Err(tokenize_error(input.len(), "no closing quotation"))
            }
            State::Word => {
                tokens.push(token);
                Ok(tokens)
            }
            State::Between => {
                if quoted {
                    tokens.push(token);
                }
                Ok(tokens)
            }
        }
    }
}

impl Tokenizer for SyslogTokenizer {
    fn format_name(&self) -> &str {
        FORMAT_NAME
    }

    fn tokenize(&self, text: &str) -> Result<Vec<String>, LogPipelineError> {
        Self::shell_split(Self::strip_prefix(text))
    }
}

fn is_shell_whitespace(ch: char) -> bool {
    matches!(ch, ' ' | '\t' | '\r' | '\n')
}

fn tokenize_error(offset: usize, reason: &str) -> LogPipelineError {
    LogPipelineError::Tokenize {
        format: FORMAT_NAME.to_owned(),
        offset,
        reason: reason.to_owned(),
    }
}
