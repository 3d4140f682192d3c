// src/pipeline/cycle.rs

//! One detect-and-dispatch cycle over every configured board.
//!
//! Boards run one after another and never affect each other: a board
//! whose listing cannot be fetched or parsed is reported and skipped with
//! its watermark untouched. Items within a board are processed oldest
//! first, and the watermark is written once per board after every new
//! item has been attempted.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::Result;
use crate::models::{BoardConfig, Config, Content, FirstRun, NoticeItem, Watermark};
use crate::pipeline::detect::{Candidate, detect};
use crate::services::{
    BoardAdapter, BoardChannels, CategoryClassifier, ChatCompletionBackend, ContentExtractor,
    HttpFetcher, ListParser, NotificationDispatcher, PageFetcher, Summarizer, SummaryBackend,
    WebhookSink, adapter_for,
};
use crate::storage::WatermarkStore;
use crate::utils::http::create_async_client;

/// How a cycle treats persisted state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RunMode {
    #[default]
    Normal,
    /// Never writes watermarks. A baseline replaces the stored numeric
    /// watermark as the starting point.
    DryRun { baseline: Option<u64> },
}

impl RunMode {
    pub fn is_dry_run(&self) -> bool {
        matches!(self, Self::DryRun { .. })
    }
}

/// Per-board processing state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BoardState {
    Idle,
    Fetching,
    Detecting,
    NoNewItems,
    ItemsFound,
    PerItemProcessing,
    PersistWatermark,
    /// First sighting of the board; current listing recorded as seen
    Initialized,
    /// Listing fetch or parse failed
    Failed,
}

/// Outcome of one board within a cycle.
#[derive(Debug, Clone, Serialize)]
pub struct BoardReport {
    pub board: String,
    /// Last state reached before returning to idle
    pub state: BoardState,
    pub new_items: usize,
    pub delivered: usize,
    pub watermark_before: Option<u64>,
    pub watermark_after: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BoardReport {
    fn new(board: &str) -> Self {
        Self {
            board: board.to_string(),
            state: BoardState::Idle,
            new_items: 0,
            delivered: 0,
            watermark_before: None,
            watermark_after: None,
            error: None,
        }
    }

    fn enter(&mut self, state: BoardState) {
        log::debug!("[{}] {:?} -> {:?}", self.board, self.state, state);
        self.state = state;
    }

    fn fail(mut self, message: impl std::fmt::Display) -> Self {
        log::error!("[{}] {}", self.board, message);
        self.error = Some(message.to_string());
        self.enter(BoardState::Failed);
        self
    }
}

/// Summary of a whole cycle.
#[derive(Debug, Clone, Serialize)]
pub struct CycleReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub dry_run: bool,
    pub boards: Vec<BoardReport>,
}

impl CycleReport {
    pub fn new_items(&self) -> usize {
        self.boards.iter().map(|b| b.new_items).sum()
    }

    pub fn failed_boards(&self) -> usize {
        self.boards.iter().filter(|b| b.error.is_some()).count()
    }
}

/// A board with its compiled parser, adapter and resolved channels.
struct BoardRuntime {
    config: BoardConfig,
    parser: ListParser,
    adapter: Box<dyn BoardAdapter>,
    channels: BoardChannels,
}

/// Drives the detect-and-dispatch cycle.
pub struct Orchestrator {
    boards: Vec<BoardRuntime>,
    fetcher: Box<dyn PageFetcher>,
    store: Arc<dyn WatermarkStore>,
    extractor: ContentExtractor,
    classifier: CategoryClassifier,
    summarizer: Summarizer,
    dispatcher: NotificationDispatcher,
    item_delay: Duration,
    first_run: FirstRun,
    first_run_limit: usize,
}

impl Orchestrator {
    pub fn new(
        config: Config,
        fetcher: Box<dyn PageFetcher>,
        store: Arc<dyn WatermarkStore>,
        summarizer: Summarizer,
        dispatcher: NotificationDispatcher,
    ) -> Result<Self> {
        config.validate()?;

        let boards = config
            .boards
            .iter()
            .map(|board| {
                Ok(BoardRuntime {
                    parser: ListParser::new(&board.listing)?,
                    adapter: adapter_for(board),
                    channels: BoardChannels::resolve(board),
                    config: board.clone(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            boards,
            fetcher,
            store,
            extractor: ContentExtractor::new(&config.content)?,
            classifier: CategoryClassifier::new(config.categories.clone()),
            summarizer,
            dispatcher,
            item_delay: Duration::from_millis(config.crawler.item_delay_ms),
            first_run: config.crawler.first_run,
            first_run_limit: config.crawler.first_run_limit,
        })
    }

    /// Wire up the production HTTP fetcher, summarizer and webhook sink.
    pub fn from_config(config: Config, store: Arc<dyn WatermarkStore>) -> Result<Self> {
        let client = create_async_client(&config.crawler)?;

        let backend = ChatCompletionBackend::from_env(client.clone(), &config.summary);
        if backend.is_none() && config.summary.enabled {
            log::warn!(
                "{} is not set, notifications will carry body previews",
                config.summary.api_key_env
            );
        }
        let summarizer = Summarizer::new(
            &config.summary,
            backend.map(|b| Box::new(b) as Box<dyn SummaryBackend>),
        );

        let sink = WebhookSink::new(client.clone(), config.notify.username.clone());
        let dispatcher = NotificationDispatcher::new(Box::new(sink), config.notify.clone());

        Self::new(
            config,
            Box::new(HttpFetcher::new(client)),
            store,
            summarizer,
            dispatcher,
        )
    }

    /// Run every board once.
    pub async fn run_cycle(&self, mode: RunMode) -> CycleReport {
        let started_at = Utc::now();
        log::info!(
            "Starting cycle over {} board(s){}",
            self.boards.len(),
            if mode.is_dry_run() { " (dry run)" } else { "" }
        );

        let mut boards = Vec::with_capacity(self.boards.len());
        for runtime in &self.boards {
            boards.push(self.run_board(runtime, mode).await);
        }

        let report = CycleReport {
            started_at,
            finished_at: Utc::now(),
            dry_run: mode.is_dry_run(),
            boards,
        };
        log::info!(
            "Cycle finished: {} new item(s), {} failed board(s)",
            report.new_items(),
            report.failed_boards()
        );
        report
    }

    async fn run_board(&self, runtime: &BoardRuntime, mode: RunMode) -> BoardReport {
        let board = &runtime.config;
        let mut report = BoardReport::new(&board.key);

        report.enter(BoardState::Fetching);
        let html = match self.fetcher.fetch(&board.list_url).await {
            Ok(html) => html,
            Err(e) => return report.fail(format!("listing fetch failed: {e}")),
        };
        let rows = match runtime.parser.parse(&html) {
            Ok(rows) => rows,
            Err(e) => return report.fail(format!("listing parse failed: {e}")),
        };

        report.enter(BoardState::Detecting);
        let stored = match self.store.get(&board.key).await {
            Ok(mark) => mark,
            Err(e) => return report.fail(format!("watermark read failed: {e}")),
        };
        // A baseline only moves the numeric watermark; seen titles still apply.
        let stored = match mode {
            RunMode::DryRun {
                baseline: Some(baseline),
            } => Some(Watermark {
                last_id: Some(baseline),
                ..stored.unwrap_or_default()
            }),
            _ => stored,
        };
        report.watermark_before = stored.as_ref().and_then(|m| m.last_id);
        let first_sighting = stored.is_none();

        let start = match (stored, self.first_run) {
            (Some(mark), _) => mark,
            (None, FirstRun::DispatchAll) => Watermark::default(),
            (None, FirstRun::Initialize) => {
                let detection = detect(&rows, runtime.adapter.as_ref(), &Watermark::default());
                let mut mark = detection.baseline(None);
                mark.touch();
                report.watermark_after = mark.last_id;
                if mode.is_dry_run() {
                    log::info!(
                        "[{}] No watermark yet; would record {} current item(s) as seen",
                        board.key,
                        detection.current.len()
                    );
                } else if let Err(e) = self.store.set(&board.key, &mark).await {
                    return report.fail(format!("watermark write failed: {e}"));
                } else {
                    log::info!(
                        "[{}] First run: recorded {} current item(s) as seen",
                        board.key,
                        detection.current.len()
                    );
                }
                report.enter(BoardState::Initialized);
                return report;
            }
        };

        let mut detection = detect(&rows, runtime.adapter.as_ref(), &start);
        log::info!(
            "[{}] {} row(s), {} new, {} pinned, {} unresolved",
            board.key,
            rows.len(),
            detection.fresh.len(),
            detection.pinned,
            detection.unresolved
        );

        if detection.fresh.is_empty() {
            report.enter(BoardState::NoNewItems);
            report.watermark_after = report.watermark_before;
            return report;
        }

        report.enter(BoardState::ItemsFound);
        let mut mark = start;
        let limit = self.first_run_limit;
        if first_sighting && limit > 0 && detection.fresh.len() > limit {
            let older = detection.fresh.len() - limit;
            log::info!(
                "[{}] First run: sending the newest {} item(s), recording {} older as seen",
                board.key,
                limit,
                older
            );
            detection.fresh.drain(..older);
            mark = detection.baseline(Some(&mark));
        }
        report.new_items = detection.fresh.len();

        report.enter(BoardState::PerItemProcessing);
        for (idx, candidate) in detection.fresh.iter().enumerate() {
            if idx > 0 && !self.item_delay.is_zero() {
                tokio::time::sleep(self.item_delay).await;
            }
            if self.process_item(runtime, candidate).await {
                report.delivered += 1;
            }
            mark.advance(&candidate.id);
        }

        report.enter(BoardState::PersistWatermark);
        mark.touch();
        report.watermark_after = mark.last_id;
        if mode.is_dry_run() {
            log::info!("[{}] Dry run, watermark not persisted", board.key);
        } else if let Err(e) = self.store.set(&board.key, &mark).await {
            // Items were already sent; the next cycle will resend them.
            return report.fail(format!("watermark write failed: {e}"));
        }

        report
    }

    /// Fetch, summarize and dispatch one item. Returns whether any
    /// channel accepted it.
    async fn process_item(&self, runtime: &BoardRuntime, candidate: &Candidate) -> bool {
        let adapter = runtime.adapter.as_ref();
        let url = adapter.build_detail_url(&candidate.id, &candidate.row);

        let mut item = NoticeItem::new(candidate.id.clone(), &candidate.row.title, url);
        item.category = self.classifier.classify(&item.title);
        log::info!("[{}] New item {}: {}", runtime.config.key, item.id, item.title);

        // Rows without a usable link resolve to the listing itself.
        let content = if item.url == runtime.config.list_url {
            log::warn!("[{}] No detail link for '{}'", runtime.config.key, item.title);
            Content::NotFound
        } else {
            self.extractor
                .fetch(self.fetcher.as_ref(), &item.url, adapter.content_selectors())
                .await
        };
        item.summary = Some(self.summarizer.summarize(&content).await);
        item.content = Some(content);

        self.dispatcher
            .dispatch(&runtime.config, &runtime.channels, &item)
            .await
            .any_delivered()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::error::AppError;
    use crate::models::{NotifyConfig, SummaryConfig};
    use crate::services::{Channel, Message, NotificationSink, StaticFetcher, title_key};
    use crate::storage::MemoryStorage;

    const LIST_URL: &str = "https://www.knu.ac.kr/wbbs/wbbs/bbs/btin/stdList.action?menu_idx=42";
    const MAIN: &str = "https://hooks.test/main";
    const CAREER: &str = "https://hooks.test/career";

    #[derive(Default, Clone)]
    struct Recorder {
        sent: Arc<Mutex<Vec<(Channel, Message)>>>,
        fail_on: Option<Channel>,
    }

    impl Recorder {
        fn sent(&self) -> Vec<(Channel, Message)> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl NotificationSink for Recorder {
        async fn send(&self, channel: &Channel, message: &Message) -> Result<()> {
            if self.fail_on.as_ref() == Some(channel) {
                return Err(AppError::notify(channel.label(), "rejected"));
            }
            self.sent
                .lock()
                .unwrap()
                .push((channel.clone(), message.clone()));
            Ok(())
        }
    }

    fn detail_url(id: u64) -> String {
        format!("https://www.knu.ac.kr/wbbs/wbbs/bbs/btin/view.action?btin_idx={id}&menu_idx=42")
    }

    fn listing() -> String {
        let rows = [
            ("공지", 1336490, "[필독] 학사 일정"),
            ("1523", 1336485, "수강 정정 안내"),
            ("1522", 1336481, "[취업] 2025 채용설명회"),
            ("1521", 1336479, "오래된 공지"),
        ];
        let body: String = rows
            .iter()
            .map(|(num, id, title)| {
                format!(
                    r#"<tr><td class="num">{num}</td><td class="subject"><a href="stdViewBtin.action?btin_idx={id}&menu_idx=42">{title}</a></td></tr>"#
                )
            })
            .collect();
        format!("<html><body><table><tbody>{body}</tbody></table></body></html>")
    }

    fn detail(text: &str) -> String {
        format!(r#"<html><body><div class="board_cont"><p>{text}</p></div></body></html>"#)
    }

    fn fetcher() -> StaticFetcher {
        StaticFetcher::new()
            .with_page(LIST_URL, listing())
            .with_page(detail_url(1336481), detail("2025 채용설명회가 다음 주 목요일 오후 두 시에 열립니다."))
            .with_page(detail_url(1336485), detail("수강 정정 기간은 3월 4일부터 6일까지입니다."))
    }

    fn config() -> Config {
        let mut config = Config::default();
        config.crawler.item_delay_ms = 0;
        let board = &mut config.boards[0];
        board.main_channel = MAIN.into();
        board.category_channels = BTreeMap::from([("career".into(), CAREER.into())]);
        config
    }

    fn orchestrator(
        config: Config,
        fetcher: StaticFetcher,
        store: Arc<MemoryStorage>,
        recorder: &Recorder,
    ) -> Orchestrator {
        let summarizer = Summarizer::disabled(&SummaryConfig::default());
        let dispatcher =
            NotificationDispatcher::new(Box::new(recorder.clone()), NotifyConfig::default());
        Orchestrator::new(config, Box::new(fetcher), store, summarizer, dispatcher).unwrap()
    }

    #[tokio::test]
    async fn test_dispatches_new_items_oldest_first() {
        let store = Arc::new(MemoryStorage::new().with("knu-academic", Watermark::numeric(1336480)));
        let recorder = Recorder::default();
        let relay = orchestrator(config(), fetcher(), store.clone(), &recorder);

        let report = relay.run_cycle(RunMode::Normal).await;

        let sent = recorder.sent();
        let main_urls: Vec<_> = sent
            .iter()
            .filter(|(ch, _)| *ch == Channel::Webhook(MAIN.into()))
            .map(|(_, m)| m.url.clone())
            .collect();
        assert_eq!(main_urls, vec![detail_url(1336481), detail_url(1336485)]);

        let career: Vec<_> = sent
            .iter()
            .filter(|(ch, _)| *ch == Channel::Webhook(CAREER.into()))
            .collect();
        assert_eq!(career.len(), 1);
        assert!(career[0].1.title.contains("2025 채용설명회"));

        assert_eq!(store.snapshot("knu-academic").unwrap().last_id, Some(1336485));
        let board = &report.boards[0];
        assert_eq!(board.state, BoardState::PersistWatermark);
        assert_eq!(board.new_items, 2);
        assert_eq!(board.delivered, 2);
        assert_eq!(board.watermark_before, Some(1336480));
        assert_eq!(board.watermark_after, Some(1336485));
    }

    #[tokio::test]
    async fn test_second_cycle_is_idempotent() {
        let store = Arc::new(MemoryStorage::new().with("knu-academic", Watermark::numeric(1336480)));
        let recorder = Recorder::default();
        let relay = orchestrator(config(), fetcher(), store.clone(), &recorder);

        relay.run_cycle(RunMode::Normal).await;
        let first = recorder.sent().len();
        let report = relay.run_cycle(RunMode::Normal).await;

        assert_eq!(recorder.sent().len(), first);
        assert_eq!(report.boards[0].state, BoardState::NoNewItems);
        assert_eq!(store.snapshot("knu-academic").unwrap().last_id, Some(1336485));
    }

    #[tokio::test]
    async fn test_failed_dispatch_still_advances() {
        let store = Arc::new(MemoryStorage::new().with("knu-academic", Watermark::numeric(1336480)));
        let recorder = Recorder {
            fail_on: Some(Channel::Webhook(MAIN.into())),
            ..Recorder::default()
        };
        let relay = orchestrator(config(), fetcher(), store.clone(), &recorder);

        let report = relay.run_cycle(RunMode::Normal).await;
        assert_eq!(report.boards[0].new_items, 2);
        // Only the career copy got through.
        assert_eq!(report.boards[0].delivered, 1);
        assert_eq!(store.snapshot("knu-academic").unwrap().last_id, Some(1336485));

        let again = relay.run_cycle(RunMode::Normal).await;
        assert_eq!(again.boards[0].new_items, 0);
    }

    #[tokio::test]
    async fn test_board_failure_is_isolated() {
        let mut config = config();
        let mut broken = config.boards[0].clone();
        broken.key = "broken".into();
        broken.list_url = "https://unreachable.test/list".into();
        config.boards.insert(0, broken);

        let store = Arc::new(
            MemoryStorage::new()
                .with("knu-academic", Watermark::numeric(1336480))
                .with("broken", Watermark::numeric(7)),
        );
        let recorder = Recorder::default();
        let relay = orchestrator(config, fetcher(), store.clone(), &recorder);

        let report = relay.run_cycle(RunMode::Normal).await;

        assert_eq!(report.boards[0].state, BoardState::Failed);
        assert!(report.boards[0].error.is_some());
        assert_eq!(store.snapshot("broken").unwrap().last_id, Some(7));
        assert_eq!(report.boards[1].new_items, 2);
        assert_eq!(report.failed_boards(), 1);
    }

    #[tokio::test]
    async fn test_first_run_initializes_without_dispatch() {
        let mut config = config();
        config.crawler.first_run = FirstRun::Initialize;
        let store = Arc::new(MemoryStorage::new());
        let recorder = Recorder::default();
        let relay = orchestrator(config, fetcher(), store.clone(), &recorder);

        let report = relay.run_cycle(RunMode::Normal).await;

        assert!(recorder.sent().is_empty());
        assert_eq!(report.boards[0].state, BoardState::Initialized);
        assert_eq!(store.snapshot("knu-academic").unwrap().last_id, Some(1336485));
    }

    #[tokio::test]
    async fn test_first_run_sends_current_listing() {
        let store = Arc::new(MemoryStorage::new());
        let recorder = Recorder::default();
        let fetcher = fetcher().with_page(detail_url(1336479), detail("오래된 공지 본문입니다."));
        let relay = orchestrator(config(), fetcher, store.clone(), &recorder);

        let report = relay.run_cycle(RunMode::Normal).await;

        let main_urls: Vec<_> = recorder
            .sent()
            .iter()
            .filter(|(ch, _)| *ch == Channel::Webhook(MAIN.into()))
            .map(|(_, m)| m.url.clone())
            .collect();
        assert_eq!(
            main_urls,
            vec![detail_url(1336479), detail_url(1336481), detail_url(1336485)]
        );
        assert_eq!(report.boards[0].new_items, 3);
        assert_eq!(report.boards[0].watermark_before, None);
        assert_eq!(store.snapshot("knu-academic").unwrap().last_id, Some(1336485));
    }

    #[tokio::test]
    async fn test_first_run_sends_only_newest() {
        let mut config = config();
        config.crawler.first_run_limit = 1;
        let store = Arc::new(MemoryStorage::new());
        let recorder = Recorder::default();
        let relay = orchestrator(config, fetcher(), store.clone(), &recorder);

        let report = relay.run_cycle(RunMode::Normal).await;

        let sent = recorder.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].1.url, detail_url(1336485));
        assert_eq!(report.boards[0].new_items, 1);
        assert_eq!(store.snapshot("knu-academic").unwrap().last_id, Some(1336485));

        let again = relay.run_cycle(RunMode::Normal).await;
        assert_eq!(again.boards[0].state, BoardState::NoNewItems);
        assert_eq!(recorder.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_dry_run_uses_baseline_and_never_writes() {
        let store = Arc::new(MemoryStorage::new().with("knu-academic", Watermark::numeric(1336485)));
        let recorder = Recorder::default();
        let relay = orchestrator(config(), fetcher(), store.clone(), &recorder);

        let report = relay
            .run_cycle(RunMode::DryRun {
                baseline: Some(1336480),
            })
            .await;

        assert!(report.dry_run);
        assert_eq!(report.boards[0].new_items, 2);
        assert_eq!(report.boards[0].watermark_after, Some(1336485));
        assert_eq!(store.snapshot("knu-academic").unwrap(), Watermark::numeric(1336485));
    }

    #[tokio::test]
    async fn test_dry_run_baseline_keeps_seen_titles() {
        let listing = listing().replace(
            "</tbody>",
            r#"<tr><td class="num">1520</td><td class="subject"><a href="javascript:;">도서관 휴관 안내</a></td></tr></tbody>"#,
        );
        let stored = Watermark {
            last_id: Some(1336485),
            seen_titles: vec![title_key("도서관 휴관 안내")],
            updated_at: None,
        };
        let store = Arc::new(MemoryStorage::new().with("knu-academic", stored.clone()));
        let recorder = Recorder::default();
        let relay = orchestrator(
            config(),
            fetcher().with_page(LIST_URL, listing),
            store.clone(),
            &recorder,
        );

        let report = relay
            .run_cycle(RunMode::DryRun {
                baseline: Some(1336480),
            })
            .await;

        assert_eq!(report.boards[0].watermark_before, Some(1336480));
        assert_eq!(report.boards[0].new_items, 2);
        assert!(recorder.sent().iter().all(|(_, m)| !m.title.contains("도서관")));
        assert_eq!(store.snapshot("knu-academic").unwrap(), stored);
    }

    #[tokio::test]
    async fn test_linkless_rows_never_fetch_the_listing() {
        let titles = [
            "학생회관 리모델링 공사에 따른 출입 통제 안내",
            "2025학년도 1학기 교내 근로장학생 모집 공고",
            "중앙도서관 야간 열람실 운영 시간 변경 안내",
            "대학원 학위청구논문 심사 일정 및 제출 서류 안내",
            "교내 와이파이 인증 방식 변경에 따른 재설정 방법",
            "졸업 예정자 학위수여식 참석 신청 및 가운 대여 안내",
        ];
        let rows: String = titles
            .iter()
            .enumerate()
            .map(|(i, title)| {
                format!(
                    r#"<tr><td class="num">{}</td><td class="subject"><a href="javascript:;">{title}</a></td></tr>"#,
                    titles.len() - i
                )
            })
            .collect();
        let listing = format!(
            r#"<html><body><div id="board"><table><tbody>{rows}</tbody></table></div></body></html>"#
        );

        let mut config = config();
        config.boards[0].detail_url_template = None;
        let store = Arc::new(MemoryStorage::new().with("knu-academic", Watermark::default()));
        let recorder = Recorder::default();
        let fetcher = StaticFetcher::new().with_page(LIST_URL, listing);
        let relay = orchestrator(config, fetcher, store.clone(), &recorder);

        let report = relay.run_cycle(RunMode::Normal).await;

        assert_eq!(report.boards[0].new_items, 6);
        let sent = recorder.sent();
        assert_eq!(sent.len(), 6);
        for (_, message) in &sent {
            assert_eq!(message.url, LIST_URL);
            assert_eq!(message.description, Content::NOT_FOUND);
            assert!(titles.iter().all(|t| !message.description.contains(t)));
        }
        assert_eq!(store.snapshot("knu-academic").unwrap().seen_titles.len(), 6);
    }

    #[tokio::test]
    async fn test_missing_detail_page_sends_sentinel() {
        let store = Arc::new(MemoryStorage::new().with("knu-academic", Watermark::numeric(1336484)));
        let recorder = Recorder::default();
        let fetcher = StaticFetcher::new().with_page(LIST_URL, listing());
        let relay = orchestrator(config(), fetcher, store.clone(), &recorder);

        relay.run_cycle(RunMode::Normal).await;

        let sent = recorder.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].1.description, Content::FETCH_FAILED);
        assert_eq!(store.snapshot("knu-academic").unwrap().last_id, Some(1336485));
    }
}
