//! 경로 라우터 -- 처리 대상 소스 파일을 찾고 대응하는 출력 경로를 계산합니다.
//!
//! # 경로 규칙
//! ```text
//! <input>/.../<marker>/<client>/network_logs/fw.log
//!   -> <output>/<client>/network_logs/fw.json
//! ```
//!
//! 루트 마커 세그먼트를 찾지 못하면 해당 파일만 [`LogPipelineError::PathStructure`]로
//! 실패하며, 나머지 파일 처리는 계속됩니다.

use std::ffi::OsStr;
use std::path::{Component, Path, PathBuf};

use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::config::PipelineConfig;
use crate::error::LogPipelineError;

/// 출력 파일 확장자
const OUTPUT_EXTENSION: &str = "json";

/// 소스 파일 하나의 라우팅 결과
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    /// 소스 파일 경로
    pub source: PathBuf,
    /// 클라이언트 식별자 (루트 마커 바로 다음 세그먼트)
    pub client: String,
    /// 출력 파일 경로
    pub destination: PathBuf,
}

/// 입력 루트와, 소스 경로에서 클라이언트 세그먼트 바로 앞에 오는 마커 이름
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootDescriptor {
    /// 탐색 시작 디렉토리
    pub input_root: PathBuf,
    /// 루트 마커 세그먼트 이름 (예: `client_data`)
    pub marker: String,
}

impl RootDescriptor {
    pub fn new(input_root: impl Into<PathBuf>, marker: impl Into<String>) -> Self {
        Self {
            input_root: input_root.into(),
            marker: marker.into(),
        }
    }

    /// 경로 세그먼트 목록에서 클라이언트 세그먼트의 위치를 찾습니다.
    ///
    /// 첫 번째 마커 바로 다음 세그먼트가 클라이언트이며, 마지막 세그먼트(파일명)는
    /// 클라이언트가 될 수 없습니다.
    pub fn client_index(
        &self,
        source: &Path,
        segments: &[&OsStr],
    ) -> Result<usize, LogPipelineError> {
        let marker_idx = segments
            .iter()
            .position(|s| *s == OsStr::new(self.marker.as_str()))
            .ok_or_else(|| LogPipelineError::PathStructure {
                path: source.display().to_string(),
                reason: format!("root marker '{}' not found", self.marker),
            })?;

        let client_idx = marker_idx + 1;
        if client_idx + 1 >= segments.len() {
            return Err(LogPipelineError::PathStructure {
                path: source.display().to_string(),
                reason: format!("no client segment after root marker '{}'", self.marker),
            });
        }

        Ok(client_idx)
    }
}

/// 소스 파일을 찾아 출력 경로로 대응시키는 경로 라우터
#[derive(Debug, Clone)]
pub struct PathRouter {
    root: RootDescriptor,
    output_root: PathBuf,
    subtree: Option<String>,
    extensions: Vec<String>,
}

impl PathRouter {
    /// 파이프라인 설정으로 라우터를 생성합니다.
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            root: RootDescriptor::new(config.input_root.clone(), config.marker.clone()),
            output_root: config.output_root.clone(),
            subtree: config.subtree.clone(),
            extensions: config.extensions.clone(),
        }
    }

    /// 루트 기술자를 반환합니다.
    pub fn root(&self) -> &RootDescriptor {
        &self.root
    }

    /// 입력 루트를 반환합니다.
    pub fn input_root(&self) -> &Path {
        &self.root.input_root
    }

    /// 파일이 처리 대상인지 확인합니다.
    ///
    /// 확장자(대소문자 무시)가 허용 목록에 있고, 하위 트리가 설정된 경우
    /// 상위 디렉토리 중 하나의 이름이 하위 트리와 일치해야 합니다.
    pub fn is_eligible(&self, path: &Path) -> bool {
        let ext_ok = path
            .extension()
            .and_then(OsStr::to_str)
            .map(|ext| {
                let ext = ext.to_ascii_lowercase();
                self.extensions.iter().any(|allowed| *allowed == ext)
            })
            .unwrap_or(false);

        if !ext_ok {
            return false;
        }

        match &self.subtree {
            Some(subtree) => path
                .parent()
                .map(|dir| {
                    dir.components()
                        .any(|c| c.as_os_str() == OsStr::new(subtree.as_str()))
                })
                .unwrap_or(false),
            None => true,
        }
    }

    /// 소스 경로의 출력 경로를 계산합니다.
    ///
    /// 첫 번째로 등장하는 루트 마커 세그먼트 다음 세그먼트를 클라이언트로 사용하고,
    /// 클라이언트 이후의 하위 디렉토리와 파일 stem을 보존한 채 확장자를 `.json`으로 바꿉니다.
    pub fn route(&self, source: &Path) -> Result<Route, LogPipelineError> {
        let segments: Vec<&OsStr> = source
            .components()
            .filter_map(|c| match c {
                Component::Normal(s) => Some(s),
                _ => None,
            })
            .collect();

        let client_idx = self.root.client_index(source, &segments)?;
        let client = segments[client_idx].to_string_lossy().into_owned();

        let stem = source
            .file_stem()
            .ok_or_else(|| LogPipelineError::PathStructure {
                path: source.display().to_string(),
                reason: "source path has no file name".to_owned(),
            })?;

        let mut destination = self.output_root.join(&client);
        for dir in &segments[client_idx + 1..segments.len() - 1] {
            destination.push(dir);
        }
        // set_extension은 stem 내부의 점을 확장자로 취급하므로 직접 붙인다
        let mut file_name = stem.to_os_string();
        file_name.push(".");
        file_name.push(OUTPUT_EXTENSION);
        destination.push(file_name);

        Ok(Route {
            source: source.to_path_buf(),
            client,
            destination,
        })
    }

    /// 입력 루트를 재귀 탐색하여 처리 대상 파일의 라우팅 결과를 반환합니다.
    ///
    /// 탐색 순서는 파일명 기준으로 정렬되어 실행마다 동일합니다.
    /// 개별 항목의 실패(탐색 에러, 경로 구조 에러)는 `Err`로 포함되며 탐색을 멈추지 않습니다.
    pub fn discover(&self) -> Vec<Result<Route, LogPipelineError>> {
        let mut routes = Vec::new();

        for entry in WalkDir::new(&self.root.input_root).sort_by_file_name() {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    warn!(error = %e, "failed to read directory entry");
                    routes.push(Err(LogPipelineError::Walk(e)));
                    continue;
                }
            };

            if !entry.file_type().is_file() || !self.is_eligible(entry.path()) {
                continue;
            }

            let route = self.route(entry.path());
            match &route {
                Ok(r) => debug!(
                    source = %r.source.display(),
                    destination = %r.destination.display(),
                    client = %r.client,
                    "routed source file"
                ),
                Err(e) => warn!(path = %entry.path().display(), error = %e, "cannot route file"),
            }
            routes.push(route);
        }

        routes
    }
}
