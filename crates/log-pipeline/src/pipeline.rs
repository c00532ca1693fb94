//! 파이프라인 오케스트레이션 -- 탐색/판별/토큰화/정규화/기록의 전체 흐름을 관리합니다.
//!
//! [`FlattenPipeline`]은 입력 루트 하나를 처리하는 "process root path" 연산입니다.
//!
//! # 내부 흐름
//! ```text
//! PathRouter -> plan (충돌 검사) -> per file:
//!   classify -> JsonLines  -> passthrough ----------------------> EventWriter
//!            -> SyslogKv   -> SyslogTokenizer    -> kv -> Normalizer -> EventWriter
//!            -> DelimitedKv -> DelimitedTokenizer -> kv -> Normalizer -> EventWriter
//! ```
//!
//! 파일 하나의 실패는 해당 파일의 [`FileReport`]에만 기록되고 실행은 계속됩니다.
//! 병렬 실행 시에도 리포트는 계획 순서대로 모이므로 요약 결과는 항상 같습니다.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use netlog_core::config::MalformedLinePolicy;
use netlog_core::types::FormatMode;
use serde::Serialize;
use tokio::sync::Semaphore;
use tracing::{debug, info, trace, warn};

use crate::classifier;
use crate::config::PipelineConfig;
use crate::error::LogPipelineError;
use crate::kv;
use crate::normalizer::Normalizer;
use crate::passthrough;
use crate::router::{PathRouter, Route};
use crate::tokenizer::{self, TokenRecords};
use crate::writer::EventWriter;

/// 파일 처리 결과 상태
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum FileStatus {
    /// 끝까지 처리됨
    Ok,
    /// 처리 실패 (이미 쓴 출력은 남음)
    Failed { reason: String },
    /// 같은 출력 경로를 갖는 뒤쪽 소스 때문에 처리하지 않음
    Superseded { by: PathBuf },
}

/// 소스 파일 하나의 처리 리포트
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    /// 소스 파일 경로
    pub source: PathBuf,
    /// 클라이언트 식별자 (라우팅 실패 시 None)
    pub client: Option<String>,
    /// 출력 파일 경로 (라우팅 실패 시 None)
    pub destination: Option<PathBuf>,
    /// 판별된 형식 모드
    pub mode: Option<FormatMode>,
    /// 읽은 레코드 수 (공백 라인 제외)
    pub records: u64,
    /// 기록한 이벤트 수
    pub written: u64,
    /// 건너뛴 레코드 수
    pub skipped: u64,
    /// 처리 상태
    pub status: FileStatus,
}

impl FileReport {
    fn for_route(route: &Route) -> Self {
        Self {
            source: route.source.clone(),
            client: Some(route.client.clone()),
            destination: Some(route.destination.clone()),
            mode: None,
            records: 0,
            written: 0,
            skipped: 0,
            status: FileStatus::Ok,
        }
    }

    fn for_source(source: &Path) -> Self {
        Self {
            source: source.to_path_buf(),
            client: None,
            destination: None,
            mode: None,
            records: 0,
            written: 0,
            skipped: 0,
            status: FileStatus::Ok,
        }
    }

    fn failed(source: &Path, err: &LogPipelineError) -> Self {
        let mut report = Self::for_source(source);
        report.status = FileStatus::Failed {
            reason: err.to_string(),
        };
        report
    }

    pub fn is_ok(&self) -> bool {
        self.status == FileStatus::Ok
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.status, FileStatus::Failed { .. })
    }
}

/// 실행 합계
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunTotals {
    /// 발견한 대상 파일 수
    pub files: u64,
    /// 정상 처리된 파일 수
    pub ok: u64,
    /// 실패한 파일 수
    pub failed: u64,
    /// 충돌로 처리하지 않은 파일 수
    pub superseded: u64,
    pub records: u64,
    pub written: u64,
    pub skipped: u64,
}

/// 입력 루트 하나에 대한 실행 요약
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub input_root: PathBuf,
    pub output_root: PathBuf,
    pub totals: RunTotals,
    pub files: Vec<FileReport>,
}

impl RunSummary {
    fn new(input_root: PathBuf, output_root: PathBuf, files: Vec<FileReport>) -> Self {
        let mut totals = RunTotals::default();
        for report in &files {
            totals.files += 1;
            match report.status {
                FileStatus::Ok => totals.ok += 1,
                FileStatus::Failed { .. } => totals.failed += 1,
                FileStatus::Superseded { .. } => totals.superseded += 1,
            }
            totals.records += report.records;
            totals.written += report.written;
            totals.skipped += report.skipped;
        }

        Self {
            input_root,
            output_root,
            totals,
            files,
        }
    }

    /// 실패한 파일이 하나라도 있는지 확인합니다.
    pub fn has_failures(&self) -> bool {
        self.totals.failed > 0
    }
}

/// 실행 계획 항목
#[derive(Debug, Clone)]
pub enum PlanItem {
    /// 변환할 파일
    Process(Route),
    /// 변환 없이 리포트만 남기는 파일 (라우팅 실패, 충돌)
    Report(FileReport),
}

/// 파일 하나를 메모리에서만 변환한 결과 (`inspect`용)
#[derive(Debug, Clone)]
pub struct Inspection {
    pub report: FileReport,
    /// compact JSON 라인 (개행 제외)
    pub lines: Vec<String>,
}

/// 평탄화 파이프라인
///
/// # 사용 예시
/// ```ignore
/// use netlog_pipeline::{FlattenPipeline, PipelineConfigBuilder};
///
/// let config = PipelineConfigBuilder::new()
///     .input_root("temp/client_data")
///     .output_root("temp/parsed_data")
///     .build()?;
/// let summary = FlattenPipeline::new(config)?.run().await?;
/// println!("{} events written", summary.totals.written);
/// ```
#[derive(Debug, Clone)]
pub struct FlattenPipeline {
    config: PipelineConfig,
    router: PathRouter,
    normalizer: Normalizer,
}

impl FlattenPipeline {
    /// 설정을 검증하고 파이프라인을 생성합니다.
    pub fn new(config: PipelineConfig) -> Result<Self, LogPipelineError> {
        config.validate()?;
        let router = PathRouter::new(&config);
        let normalizer = Normalizer::new(config.bare_address);
        Ok(Self {
            config,
            router,
            normalizer,
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn router(&self) -> &PathRouter {
        &self.router
    }

    /// 입력 루트를 탐색하여 실행 계획을 세웁니다.
    ///
    /// 여러 소스가 같은 출력 경로로 대응되면 탐색 순서상 마지막 소스만 처리하고
    /// 나머지는 [`FileStatus::Superseded`]로 남깁니다.
    pub fn plan(&self) -> Vec<PlanItem> {
        let discovered = self.router.discover();

        let mut last_writer: HashMap<PathBuf, PathBuf> = HashMap::new();
        for route in discovered.iter().flatten() {
            last_writer.insert(route.destination.clone(), route.source.clone());
        }

        discovered
            .into_iter()
            .map(|result| match result {
                Ok(route) => match last_writer.get(&route.destination) {
                    Some(winner) if *winner != route.source => {
                        warn!(
                            source = %route.source.display(),
                            winner = %winner.display(),
                            destination = %route.destination.display(),
                            "destination collision, source superseded"
                        );
                        let mut report = FileReport::for_route(&route);
                        report.status = FileStatus::Superseded { by: winner.clone() };
                        PlanItem::Report(report)
                    }
                    _ => PlanItem::Process(route),
                },
                Err(err) => {
                    let source = match &err {
                        LogPipelineError::Walk(e) => e.path().unwrap_or(self.router.input_root()),
                        LogPipelineError::PathStructure { path, .. } => Path::new(path.as_str()),
                        _ => self.router.input_root(),
                    };
                    PlanItem::Report(FileReport::failed(source, &err))
                }
            })
            .collect()
    }

    /// 파일들을 차례로 처리합니다.
    pub fn run_blocking(&self) -> RunSummary {
        info!(
            input_root = %self.config.input_root.display(),
            output_root = %self.config.output_root.display(),
            "starting flatten run"
        );

        let reports = self
            .plan()
            .into_iter()
            .map(|item| match item {
                PlanItem::Process(route) => self.process_file(&route),
                PlanItem::Report(report) => report,
            })
            .collect();

        self.finish_run(reports)
    }

    /// 설정된 워커 수만큼 파일을 동시에 처리합니다.
    ///
    /// 각 파일은 블로킹 스레드에서 처음부터 끝까지 처리되며, 한 출력 파일은
    /// 항상 한 워커만 씁니다.
    pub async fn run(&self) -> Result<RunSummary, LogPipelineError> {
        info!(
            input_root = %self.config.input_root.display(),
            output_root = %self.config.output_root.display(),
            workers = self.config.workers,
            "starting flatten run"
        );

        let this = Arc::new(self.clone());
        let semaphore = Arc::new(Semaphore::new(self.config.workers));
        let mut pending = Vec::new();

        for item in self.plan() {
            match item {
                PlanItem::Process(route) => {
                    let permit = Arc::clone(&semaphore)
                        .acquire_owned()
                        .await
                        .map_err(|e| LogPipelineError::Worker(e.to_string()))?;
                    let this = Arc::clone(&this);
                    let source = route.source.clone();
                    let handle = tokio::task::spawn_blocking(move || {
                        let report = this.process_file(&route);
                        drop(permit);
                        report
                    });
                    pending.push(Pending::Task(source, handle));
                }
                PlanItem::Report(report) => pending.push(Pending::Done(report)),
            }
        }

        let mut reports = Vec::with_capacity(pending.len());
        for item in pending {
            let report = match item {
                Pending::Done(report) => report,
                Pending::Task(source, handle) => match handle.await {
                    Ok(report) => report,
                    Err(e) => {
                        let err = LogPipelineError::Worker(e.to_string());
                        warn!(source = %source.display(), error = %err, "worker task failed");
                        FileReport::failed(&source, &err)
                    }
                },
            };
            reports.push(report);
        }

        Ok(self.finish_run(reports))
    }

    /// 소스 파일 하나를 변환하여 출력 파일에 씁니다.
    pub fn process_file(&self, route: &Route) -> FileReport {
        let mut report = FileReport::for_route(route);
        info!(
            source = %route.source.display(),
            client = %route.client,
            "processing source file"
        );

        match self.transform(route, &mut report) {
            Ok(()) => {
                debug!(
                    source = %route.source.display(),
                    records = report.records,
                    written = report.written,
                    skipped = report.skipped,
                    "file flattened"
                );
            }
            Err(err) => {
                warn!(source = %route.source.display(), error = %err, "file aborted");
                report.status = FileStatus::Failed {
                    reason: err.to_string(),
                };
            }
        }

        report
    }

    /// 파일 하나를 출력 없이 변환하여 처음 `limit`개의 이벤트를 돌려줍니다.
    pub fn inspect(&self, source: &Path, limit: usize) -> Result<Inspection, LogPipelineError> {
        let mut report = FileReport::for_source(source);
        if let Ok(route) = self.router.route(source) {
            report.client = Some(route.client);
            report.destination = Some(route.destination);
        }

        let (mode, reader) = open_classified(source)?;
        report.mode = Some(mode);

        let mut writer = EventWriter::from_writer(source, Vec::new());
        let limit = u64::try_from(limit).unwrap_or(u64::MAX);
        if let Err(err) = self.convert(mode, reader, &mut writer, &mut report, Some(limit)) {
            report.status = FileStatus::Failed {
                reason: err.to_string(),
            };
        }
        report.written = writer.written();

        let output = writer.into_inner();
        let lines = String::from_utf8_lossy(&output)
            .lines()
            .map(str::to_owned)
            .collect();

        Ok(Inspection { report, lines })
    }

    fn transform(&self, route: &Route, report: &mut FileReport) -> Result<(), LogPipelineError> {
        let (mode, reader) = open_classified(&route.source)?;
        report.mode = Some(mode);
        debug!(source = %route.source.display(), mode = %mode, "classified source file");

        let mut writer = EventWriter::create(&route.destination)?;
        let result = self.convert(mode, reader, &mut writer, report, None);
        report.written = writer.written();
        result?;
        writer.finish()?;
        Ok(())
    }

    /// 판별된 모드로 리더 전체를 변환합니다.
    fn convert<R: BufRead, W: Write>(
        &self,
        mode: FormatMode,
        reader: R,
        writer: &mut EventWriter<W>,
        report: &mut FileReport,
        limit: Option<u64>,
    ) -> Result<(), LogPipelineError> {
        match mode {
            FormatMode::JsonLines => self.passthrough(reader, writer, report, limit),
            FormatMode::SyslogKv | FormatMode::DelimitedKv => {
                self.flatten(tokenizer::records(mode, reader), writer, report, limit)
            }
        }
    }

    fn passthrough<R: BufRead, W: Write>(
        &self,
        reader: R,
        writer: &mut EventWriter<W>,
        report: &mut FileReport,
        limit: Option<u64>,
    ) -> Result<(), LogPipelineError> {
        for item in passthrough::json_lines(reader) {
            if reached(writer, limit) {
                break;
            }
            match item {
                Ok(value) => {
                    report.records += 1;
                    writer.write_event(&value)?;
                }
                Err(err @ LogPipelineError::Json { .. }) => {
                    report.records += 1;
                    match self.config.on_malformed_line {
                        MalformedLinePolicy::SkipLine => {
                            report.skipped += 1;
                            trace!(source = %writer.path().display(), error = %err, "skipped malformed json line");
                        }
                        MalformedLinePolicy::AbortFile => return Err(err),
                    }
                }
                Err(err) => return Err(err),
            }
        }
        Ok(())
    }

    fn flatten<W: Write>(
        &self,
        records: TokenRecords<'_>,
        writer: &mut EventWriter<W>,
        report: &mut FileReport,
        limit: Option<u64>,
    ) -> Result<(), LogPipelineError> {
        for record in records {
            if reached(writer, limit) {
                break;
            }
            let tokens = match record {
                Ok(tokens) if tokens.is_empty() => continue,
                Ok(tokens) => tokens,
                Err(err @ LogPipelineError::Tokenize { .. }) => {
                    report.records += 1;
                    report.skipped += 1;
                    trace!(error = %err, "skipped untokenizable record");
                    continue;
                }
                Err(err) => return Err(err),
            };

            report.records += 1;
            match kv::parse_tokens(&tokens) {
                Some(raw) => writer.write_event(&self.normalizer.normalize(&raw))?,
                None => {
                    report.skipped += 1;
                    trace!("skipped record without key=value tokens");
                }
            }
        }
        Ok(())
    }

    fn finish_run(&self, reports: Vec<FileReport>) -> RunSummary {
        let summary = RunSummary::new(
            self.config.input_root.clone(),
            self.config.output_root.clone(),
            reports,
        );
        let t = &summary.totals;
        info!(
            files = t.files,
            ok = t.ok,
            failed = t.failed,
            superseded = t.superseded,
            written = t.written,
            skipped = t.skipped,
            "flatten run complete"
        );
        summary
    }
}

enum Pending {
    Task(PathBuf, tokio::task::JoinHandle<FileReport>),
    Done(FileReport),
}

fn reached<W: Write>(writer: &EventWriter<W>, limit: Option<u64>) -> bool {
    limit.is_some_and(|l| writer.written() >= l)
}

/// 소스 파일을 열고 형식을 판별합니다. 리더는 처음 위치에 있습니다.
fn open_classified(source: &Path) -> Result<(FormatMode, BufReader<File>), LogPipelineError> {
    let source_error = |e| LogPipelineError::Source {
        path: source.display().to_string(),
        source: e,
    };

    let file = File::open(source).map_err(source_error)?;
    let mut reader = BufReader::new(file);
    let mode = classifier::classify(classifier::extension_of(source), &mut reader)
        .map_err(source_error)?;
    Ok((mode, reader))
}
