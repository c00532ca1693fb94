//! 출력 기록기 -- 이벤트를 한 줄에 하나씩 compact JSON으로 씁니다.
//!
//! 출력 파일은 소스 파일마다 한 번 truncate 모드로 열립니다. 재실행은 이전 내용을
//! 덮어쓰며 누적되지 않습니다. [`LineWriter`]를 거치므로 중간에 프로세스가 멈춰도
//! 파일에는 완성된 라인만 남습니다.

use std::fs::{self, File};
use std::io::{self, LineWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::LogPipelineError;

/// JSON Lines 이벤트 기록기
pub struct EventWriter<W: Write = LineWriter<File>> {
    path: PathBuf,
    out: W,
    written: u64,
}

impl EventWriter {
    /// 상위 디렉토리를 만들고 출력 파일을 truncate 모드로 엽니다.
    pub fn create(path: &Path) -> Result<Self, LogPipelineError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| destination_error(path, e))?;
        }
        let file = File::create(path).map_err(|e| destination_error(path, e))?;

        Ok(Self {
            path: path.to_path_buf(),
            out: LineWriter::new(file),
            written: 0,
        })
    }
}

impl<W: Write> EventWriter<W> {
    /// 임의의 writer 위에 기록기를 만듭니다. `path`는 에러 메시지에만 쓰입니다.
    pub fn from_writer(path: impl Into<PathBuf>, out: W) -> Self {
        Self {
            path: path.into(),
            out,
            written: 0,
        }
    }

    /// 이벤트 하나를 compact JSON 라인으로 씁니다.
    pub fn write_event<T: Serialize + ?Sized>(&mut self, event: &T) -> Result<(), LogPipelineError> {
        let mut line = serde_json::to_vec(event)
            .map_err(|e| destination_error(&self.path, io::Error::other(e)))?;
        line.push(b'\n');

        self.out
            .write_all(&line)
            .map_err(|e| destination_error(&self.path, e))?;
        self.written += 1;
        Ok(())
    }

    /// 지금까지 쓴 이벤트 수
    pub fn written(&self) -> u64 {
        self.written
    }

    /// 출력 경로
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 버퍼를 비우고 쓴 이벤트 수를 반환합니다.
    pub fn finish(mut self) -> Result<u64, LogPipelineError> {
        self.out
            .flush()
            .map_err(|e| destination_error(&self.path, e))?;
        Ok(self.written)
    }

    /// 내부 writer를 돌려받습니다.
    pub fn into_inner(self) -> W {
        self.out
    }
}

fn destination_error(path: &Path, source: io::Error) -> LogPipelineError {
    LogPipelineError::Destination {
        path: path.display().to_string(),
        source,
    }
}
