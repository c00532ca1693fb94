//! 로그 파이프라인 에러 타입
//!
//! [`LogPipelineError`]는 경로 라우팅, 토큰화, 파일 입출력 등 파이프라인 내부에서
//! 발생하는 모든 에러를 표현합니다.
//! `From<LogPipelineError> for NetlogError` 변환이 구현되어 있어
//! 상위 레이어에서 `?` 연산자로 자연스럽게 전파할 수 있습니다.

use netlog_core::error::{ConfigError, NetlogError, PipelineError};

/// 로그 파이프라인 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum LogPipelineError {
    /// 소스 경로 구조가 예상과 다름 (루트 마커 없음, 클라이언트 세그먼트 없음)
    #[error("path structure error: {path}: {reason}")]
    PathStructure {
        /// 문제가 된 소스 경로
        path: String,
        /// 실패 사유
        reason: String,
    },

    /// 한 줄의 토큰화 실패 (닫히지 않은 인용부호 등)
    #[error("tokenize error: {format} at offset {offset}: {reason}")]
    Tokenize {
        /// 프런트엔드 이름 (syslog, delimited)
        format: String,
        /// 실패 위치 (문자 오프셋)
        offset: usize,
        /// 실패 사유
        reason: String,
    },

    /// JSON 라인 파싱 실패
    #[error("json error at line {line}: {reason}")]
    Json {
        /// 1부터 시작하는 라인 번호
        line: usize,
        /// 실패 사유
        reason: String,
    },

    /// 출력 파일/디렉토리 생성 실패
    #[error("destination error: {path}: {source}")]
    Destination {
        /// 출력 경로
        path: String,
        /// 원인 I/O 에러
        #[source]
        source: std::io::Error,
    },

    /// 소스 파일 열기/읽기 실패
    #[error("source error: {path}: {source}")]
    Source {
        /// 소스 경로
        path: String,
        /// 원인 I/O 에러
        #[source]
        source: std::io::Error,
    },

    /// 디렉토리 탐색 에러
    #[error("walk error: {0}")]
    Walk(#[from] walkdir::Error),

    /// CSV 레코드 읽기 에러
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// 설정 에러
    #[error("config error: {field}: {reason}")]
    Config {
        /// 설정 필드명
        field: String,
        /// 에러 사유
        reason: String,
    },

    /// 워커 태스크 실패 (패닉, 취소)
    #[error("worker error: {0}")]
    Worker(String),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<LogPipelineError> for NetlogError {
    fn from(err: LogPipelineError) -> Self {
        match err {
            LogPipelineError::PathStructure { .. } => {
                NetlogError::Pipeline(PipelineError::PathStructure(err.to_string()))
            }
            LogPipelineError::Config { field, reason } => {
                NetlogError::Config(ConfigError::InvalidValue { field, reason })
            }
            LogPipelineError::Worker(reason) => {
                NetlogError::Pipeline(PipelineError::Worker(reason))
            }
            LogPipelineError::Io(e) => NetlogError::Io(e),
            other => NetlogError::Pipeline(PipelineError::FileAborted(other.to_string())),
        }
    }
}
