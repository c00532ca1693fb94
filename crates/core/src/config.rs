//! 설정 관리 -- netlog.toml 파싱 및 런타임 설정
//!
//! [`NetlogConfig`]는 모든 구성 요소의 설정을 담는 최상위 구조체입니다.
//! 모든 섹션은 생략 가능하며, 생략된 필드는 기본값을 사용합니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선)
//! 2. 설정 파일 (`netlog.toml`)
//! 3. 기본값 (`Default` 구현)
//!
//! 코어는 환경변수를 읽지 않습니다.
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), netlog_core::error::NetlogError> {
//! use netlog_core::config::NetlogConfig;
//!
//! let config = NetlogConfig::load("netlog.toml").await?;
//!
//! let config = NetlogConfig::parse("[runtime]\nworkers = 4")?;
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, NetlogError};

/// 워커 수 상한
const MAX_WORKERS: usize = 256;

/// netlog 통합 설정
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NetlogConfig {
    /// 일반 설정 (로깅)
    #[serde(default)]
    pub general: GeneralConfig,
    /// 경로 라우터 설정
    #[serde(default)]
    pub router: RouterConfig,
    /// 정규화 설정
    #[serde(default)]
    pub normalizer: NormalizerConfig,
    /// JSON-Lines passthrough 설정
    #[serde(default)]
    pub passthrough: PassthroughConfig,
    /// 실행 설정
    #[serde(default)]
    pub runtime: RuntimeConfig,
}

impl NetlogConfig {
    /// TOML 파일에서 설정을 로드하고 검증합니다.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, NetlogError> {
        let config = Self::from_file(path).await?;
        config.validate()?;
        Ok(config)
    }

    /// TOML 파일에서 설정을 읽습니다 (검증 없음).
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, NetlogError> {
        let path = path.as_ref();
        tracing::debug!(path = %path.display(), "reading configuration file");
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                NetlogError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                NetlogError::Io(e)
            }
        })?;
        Self::parse(&content)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, NetlogError> {
        toml::from_str(toml_str).map_err(|e| {
            NetlogError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), NetlogError> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(invalid(
                "general.log_level",
                format!("must be one of: {}", valid_levels.join(", ")),
            ));
        }

        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(invalid(
                "general.log_format",
                format!("must be one of: {}", valid_formats.join(", ")),
            ));
        }

        if self.router.input_root.is_empty() {
            return Err(invalid("router.input_root", "must not be empty".to_owned()));
        }

        if self.router.output_root.is_empty() {
            return Err(invalid("router.output_root", "must not be empty".to_owned()));
        }

        if self.router.marker.is_empty() || self.router.marker.contains(['/', '\\']) {
            return Err(invalid(
                "router.marker",
                "must be a single non-empty path segment".to_owned(),
            ));
        }

        if self.router.extensions.is_empty() {
            return Err(invalid(
                "router.extensions",
                "at least one extension must be configured".to_owned(),
            ));
        }

        if self
            .router
            .extensions
            .iter()
            .any(|ext| ext.is_empty() || ext.starts_with('.'))
        {
            return Err(invalid(
                "router.extensions",
                "extensions must be non-empty and given without a leading '.'".to_owned(),
            ));
        }

        if self.runtime.workers == 0 || self.runtime.workers > MAX_WORKERS {
            return Err(invalid(
                "runtime.workers",
                format!("must be 1-{}", MAX_WORKERS),
            ));
        }

        Ok(())
    }
}

fn invalid(field: &str, reason: String) -> NetlogError {
    ConfigError::InvalidValue {
        field: field.to_owned(),
        reason,
    }
    .into()
}

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty)
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            log_format: "pretty".to_owned(),
        }
    }
}

/// 경로 라우터 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    /// 입력 루트 (`<root>/<client>/network_logs/...`)
    pub input_root: String,
    /// 출력 루트
    pub output_root: String,
    /// 클라이언트 세그먼트 바로 앞에 오는 루트 마커 디렉토리명
    pub marker: String,
    /// 경로에 반드시 포함되어야 하는 하위 트리 이름. 빈 문자열이면 검사하지 않음
    pub subtree: String,
    /// 처리 대상 확장자 (대소문자 무시, 점 없이)
    pub extensions: Vec<String>,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            input_root: "temp/client_data".to_owned(),
            output_root: "temp/parsed_data".to_owned(),
            marker: "client_data".to_owned(),
            subtree: "network_logs".to_owned(),
            extensions: vec![
                "log".to_owned(),
                "txt".to_owned(),
                "csv".to_owned(),
                "json".to_owned(),
            ],
        }
    }
}

/// 구분자 없는 `src`/`dst` 값 처리 정책
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BareAddressPolicy {
    /// `:`가 없으면 주소 필드를 전혀 만들지 않음 (기본값)
    #[default]
    Omit,
    /// `:`가 없어도 값 전체를 `<dir>_ip`로 기록
    IpOnly,
}

/// 정규화 설정
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizerConfig {
    /// 구분자 없는 주소 값 처리 정책
    pub bare_address: BareAddressPolicy,
}

/// JSON-Lines 모드에서 잘못된 라인을 만났을 때의 정책
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MalformedLinePolicy {
    /// 해당 라인만 건너뜀 (기본값)
    #[default]
    SkipLine,
    /// 파일의 나머지 처리를 중단 (이미 쓴 라인은 유지)
    AbortFile,
}

/// JSON-Lines passthrough 설정
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PassthroughConfig {
    /// 잘못된 JSON 라인 처리 정책
    pub on_malformed_line: MalformedLinePolicy,
}

/// 실행 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// 동시에 처리할 파일 수 (1이면 순차 처리)
    pub workers: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self { workers: 1 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        NetlogConfig::default().validate().unwrap();
    }

    #[test]
    fn empty_string_parses_to_defaults() {
        let config = NetlogConfig::parse("").unwrap();
        assert_eq!(config.router.marker, "client_data");
        assert_eq!(config.router.subtree, "network_logs");
        assert_eq!(config.runtime.workers, 1);
        assert_eq!(config.normalizer.bare_address, BareAddressPolicy::Omit);
        assert_eq!(
            config.passthrough.on_malformed_line,
            MalformedLinePolicy::SkipLine
        );
    }

    #[test]
    fn partial_section_keeps_other_defaults() {
        let config = NetlogConfig::parse("[router]\noutput_root = \"/srv/parsed\"\n").unwrap();
        assert_eq!(config.router.output_root, "/srv/parsed");
        assert_eq!(config.router.input_root, "temp/client_data");
    }

    #[test]
    fn policies_parse_from_snake_case() {
        let config = NetlogConfig::parse(
            "[normalizer]\nbare_address = \"ip_only\"\n[passthrough]\non_malformed_line = \"abort_file\"\n",
        )
        .unwrap();
        assert_eq!(config.normalizer.bare_address, BareAddressPolicy::IpOnly);
        assert_eq!(
            config.passthrough.on_malformed_line,
            MalformedLinePolicy::AbortFile
        );
    }

    #[test]
    fn unknown_policy_is_parse_error() {
        let err = NetlogConfig::parse("[normalizer]\nbare_address = \"guess\"\n").unwrap_err();
        assert!(matches!(
            err,
            NetlogError::Config(ConfigError::ParseFailed { .. })
        ));
    }

    #[test]
    fn validate_rejects_zero_workers() {
        let mut config = NetlogConfig::default();
        config.runtime.workers = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_marker_with_separator() {
        let mut config = NetlogConfig::default();
        config.router.marker = "a/b".to_owned();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_dotted_extension() {
        let mut config = NetlogConfig::default();
        config.router.extensions = vec![".log".to_owned()];
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_unknown_log_format() {
        let mut config = NetlogConfig::default();
        config.general.log_format = "xml".to_owned();
        assert!(config.validate().is_err());
    }
}
