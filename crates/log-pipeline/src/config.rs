//! 로그 파이프라인 설정
//!
//! [`PipelineConfig`]는 core의 [`NetlogConfig`](netlog_core::config::NetlogConfig)를
//! 기반으로 파이프라인 실행에 필요한 값만 평탄하게 모은 설정입니다.
//!
//! # 사용 예시
//! ```ignore
//! use netlog_core::config::NetlogConfig;
//! use netlog_pipeline::config::PipelineConfig;
//!
//! let core_config = NetlogConfig::default();
//! let config = PipelineConfig::from_core(&core_config);
//! ```

use std::path::PathBuf;

use netlog_core::config::{BareAddressPolicy, MalformedLinePolicy, NetlogConfig};
use serde::{Deserialize, Serialize};

use crate::error::LogPipelineError;

/// 로그 파이프라인 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// 입력 루트
    pub input_root: PathBuf,
    /// 출력 루트
    pub output_root: PathBuf,
    /// 클라이언트 세그먼트 앞의 루트 마커
    pub marker: String,
    /// 경로에 포함되어야 하는 하위 트리 이름 (None이면 검사 안 함)
    pub subtree: Option<String>,
    /// 처리 대상 확장자 (소문자, 점 없이)
    pub extensions: Vec<String>,
    /// 구분자 없는 주소 값 처리 정책
    pub bare_address: BareAddressPolicy,
    /// JSON-Lines 모드의 잘못된 라인 처리 정책
    pub on_malformed_line: MalformedLinePolicy,
    /// 동시 처리 파일 수
    pub workers: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::from_core(&NetlogConfig::default())
    }
}

impl PipelineConfig {
    /// core 설정에서 파이프라인 설정을 생성합니다.
    pub fn from_core(core: &NetlogConfig) -> Self {
        let subtree = if core.router.subtree.is_empty() {
            None
        } else {
            Some(core.router.subtree.clone())
        };

        Self {
            input_root: PathBuf::from(&core.router.input_root),
            output_root: PathBuf::from(&core.router.output_root),
            marker: core.router.marker.clone(),
            subtree,
            extensions: core
                .router
                .extensions
                .iter()
                .map(|e| e.to_ascii_lowercase())
                .collect(),
            bare_address: core.normalizer.bare_address,
            on_malformed_line: core.passthrough.on_malformed_line,
            workers: core.runtime.workers,
        }
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), LogPipelineError> {
        const MAX_WORKERS: usize = 256;

        if self.input_root.as_os_str().is_empty() {
            return Err(LogPipelineError::Config {
                field: "input_root".to_owned(),
                reason: "must not be empty".to_owned(),
            });
        }

        if self.output_root.as_os_str().is_empty() {
            return Err(LogPipelineError::Config {
                field: "output_root".to_owned(),
                reason: "must not be empty".to_owned(),
            });
        }

        if self.input_root == self.output_root {
            return Err(LogPipelineError::Config {
                field: "output_root".to_owned(),
                reason: "must differ from input_root".to_owned(),
            });
        }

        if self.marker.is_empty() {
            return Err(LogPipelineError::Config {
                field: "marker".to_owned(),
                reason: "must not be empty".to_owned(),
            });
        }

        if self.extensions.is_empty() {
            return Err(LogPipelineError::Config {
                field: "extensions".to_owned(),
                reason: "at least one extension must be configured".to_owned(),
            });
        }

        if self.workers == 0 || self.workers > MAX_WORKERS {
            return Err(LogPipelineError::Config {
                field: "workers".to_owned(),
                reason: format!("must be 1-{}", MAX_WORKERS),
            });
        }

        Ok(())
    }
}

/// 파이프라인 설정 빌더
#[derive(Default)]
pub struct PipelineConfigBuilder {
    config: PipelineConfig,
}

impl PipelineConfigBuilder {
    /// 새 빌더를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// core 설정을 시작점으로 하는 빌더를 생성합니다.
    pub fn from_core(core: &NetlogConfig) -> Self {
        Self {
            config: PipelineConfig::from_core(core),
        }
    }

    /// 입력 루트를 설정합니다.
    pub fn input_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.config.input_root = root.into();
        self
    }

    /// 출력 루트를 설정합니다.
    pub fn output_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.config.output_root = root.into();
        self
    }

    /// 루트 마커를 설정합니다.
    pub fn marker(mut self, marker: impl Into<String>) -> Self {
        self.config.marker = marker.into();
        self
    }

    /// 필수 하위 트리를 설정합니다. None이면 모든 하위 경로를 허용합니다.
    pub fn subtree(mut self, subtree: Option<String>) -> Self {
        self.config.subtree = subtree;
        self
    }

    /// 처리 대상 확장자를 설정합니다.
    pub fn extensions(mut self, extensions: Vec<String>) -> Self {
        self.config.extensions = extensions
            .into_iter()
            .map(|e| e.to_ascii_lowercase())
            .collect();
        self
    }

    /// 구분자 없는 주소 처리 정책을 설정합니다.
    pub fn bare_address(mut self, policy: BareAddressPolicy) -> Self {
        self.config.bare_address = policy;
        self
    }

    /// 잘못된 JSON 라인 처리 정책을 설정합니다.
    pub fn on_malformed_line(mut self, policy: MalformedLinePolicy) -> Self {
        self.config.on_malformed_line = policy;
        self
    }

    /// 워커 수를 설정합니다.
    pub fn workers(mut self, workers: usize) -> Self {
        self.config.workers = workers;
        self
    }

    /// 설정을 검증하고 `PipelineConfig`를 생성합니다.
    pub fn build(self) -> Result<PipelineConfig, LogPipelineError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        PipelineConfig::default().validate().unwrap();
    }

    #[test]
    fn from_core_maps_empty_subtree_to_none() {
        let mut core = NetlogConfig::default();
        core.router.subtree = String::new();
        core.router.extensions = vec!["LOG".to_owned()];
        let config = PipelineConfig::from_core(&core);
        assert!(config.subtree.is_none());
        assert_eq!(config.extensions, vec!["log"]);
    }

    #[test]
    fn from_core_preserves_policies() {
        let mut core = NetlogConfig::default();
        core.normalizer.bare_address = BareAddressPolicy::IpOnly;
        core.passthrough.on_malformed_line = MalformedLinePolicy::AbortFile;
        core.runtime.workers = 4;
        let config = PipelineConfig::from_core(&core);
        assert_eq!(config.bare_address, BareAddressPolicy::IpOnly);
        assert_eq!(config.on_malformed_line, MalformedLinePolicy::AbortFile);
        assert_eq!(config.workers, 4);
    }

    #[test]
    fn builder_creates_valid_config() {
        let config = PipelineConfigBuilder::new()
            .input_root("/cases/client_data")
            .output_root("/cases/parsed_data")
            .workers(8)
            .build()
            .unwrap();
        assert_eq!(config.workers, 8);
        assert_eq!(config.output_root, PathBuf::from("/cases/parsed_data"));
    }

    #[test]
    fn builder_rejects_same_input_and_output() {
        let result = PipelineConfigBuilder::new()
            .input_root("/cases")
            .output_root("/cases")
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn builder_rejects_zero_workers() {
        assert!(PipelineConfigBuilder::new().workers(0).build().is_err());
    }
}
