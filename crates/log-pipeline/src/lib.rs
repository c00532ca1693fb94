//! netlog 평탄화 파이프라인
//!
//! 사고 대응 중 수집한 방화벽/네트워크 로그 파일을 찾아 형식을 판별하고,
//! key=value 레코드를 정규 이벤트로 평탄화하여 JSON Lines로 기록합니다.
//!
//! # 모듈 구성
//!
//! - [`router`]: 입력 루트 탐색, 클라이언트 식별, 출력 경로 계산
//! - [`classifier`]: 확장자와 첫 라인으로 형식 모드 판별
//! - [`tokenizer`]: syslog 접두사형 / 쉼표 구분 행 토크나이저
//! - [`kv`]: 토큰 -> 원시 이벤트 (값 정리, last-token-wins)
//! - [`normalizer`]: 원시 이벤트 -> 정규 이벤트 (7단계)
//! - [`passthrough`]: JSON-Lines 재인코딩
//! - [`writer`]: JSON Lines 출력
//! - [`pipeline`]: 전체 흐름 오케스트레이션과 실행 리포트
//! - [`config`]: 파이프라인 설정 (core 설정 확장)
//! - [`error`]: 도메인 에러 타입
//!
//! # 아키텍처
//!
//! ```text
//! PathRouter -> classify -> Tokenizer -> kv -> Normalizer -> EventWriter
//!                   |                                           ^
//!                   +------------ JSON-Lines passthrough -------+
//! ```

pub mod classifier;
pub mod config;
pub mod error;
pub mod kv;
pub mod normalizer;
pub mod passthrough;
pub mod pipeline;
pub mod router;
pub mod tokenizer;
pub mod writer;

// --- 주요 타입 re-export ---

// 파이프라인
pub use pipeline::{FileReport, FileStatus, FlattenPipeline, Inspection, RunSummary, RunTotals};

// 설정
pub use config::{PipelineConfig, PipelineConfigBuilder};

// 에러
pub use error::LogPipelineError;

// 라우팅
pub use router::{PathRouter, RootDescriptor, Route};

// 토큰화 / 정규화
pub use normalizer::Normalizer;
pub use tokenizer::{DelimitedTokenizer, SyslogTokenizer, Tokenizer};

// 출력
pub use writer::EventWriter;
