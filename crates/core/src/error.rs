//! 에러 타입 -- 도메인별 에러 정의

/// netlog 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum NetlogError {
    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// 파이프라인 처리 에러
    #[error("pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// 파이프라인 처리 에러
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// 소스 경로에서 루트 마커/클라이언트 세그먼트를 찾지 못함
    #[error("path structure error: {0}")]
    PathStructure(String),

    /// 파일 단위 처리 실패 (해당 파일만 중단)
    #[error("file aborted: {0}")]
    FileAborted(String),

    /// 워커 태스크 실패
    #[error("worker failed: {0}")]
    Worker(String),
}
