//! netlog 공통 크레이트 -- 도메인 타입, 에러, 설정
//!
//! # 모듈 구성
//!
//! - [`types`]: 원시/정규 이벤트, 태그된 스칼라, 파일 형식 모드
//! - [`error`]: 최상위 에러 타입과 도메인별 에러
//! - [`config`]: `netlog.toml` 설정

pub mod config;
pub mod error;
pub mod types;

// --- 주요 타입 re-export ---

// 에러
pub use error::{ConfigError, NetlogError, PipelineError};

// 설정
pub use config::{BareAddressPolicy, MalformedLinePolicy, NetlogConfig};

// 도메인 타입
pub use types::{CanonicalEvent, FieldValue, FormatMode, RawEvent, Scalar};
