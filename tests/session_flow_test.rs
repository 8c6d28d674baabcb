use httpmock::prelude::*;
use roster_extract::adapters::{Credential, GeminiConfig, GeminiExtractor, MemoryClipboard};
use roster_extract::app::console::{Console, Flow};
use roster_extract::core::engine::RunOutcome;
use roster_extract::core::progress::{ProgressLog, ProgressObserver, Silent};
use roster_extract::core::session::{Completion, Phase, ViewMode};
use roster_extract::utils::error::{EXTRACTION_FAILED_MESSAGE, MISSING_INPUT_MESSAGE};
use roster_extract::{ExtractionEngine, LocalStorage, RosterDocument, Session};
use std::time::Duration;
use tempfile::TempDir;

const GENERATE_PATH: &str = "/models/test-model:generateContent";

fn engine_for(server: &MockServer) -> ExtractionEngine<GeminiExtractor> {
    let extractor = GeminiExtractor::new(GeminiConfig {
        endpoint: server.base_url(),
        model: "test-model".to_string(),
        credential: Credential::Key("test-key".to_string()),
        ..GeminiConfig::default()
    })
    .unwrap();
    ExtractionEngine::new(extractor).with_step_interval(Duration::from_millis(200))
}

fn roster_answer() -> serde_json::Value {
    let roster = serde_json::json!({
        "seriesLabel": "Z SUP 0",
        "periodLabel": "NUIT",
        "weeks": [{
            "weekNumber": 1,
            "monday": {"start": null, "end": null, "code": "HSBR"},
            "tuesday": {"start": "22:40", "end": "30:10", "code": "N1"}
        }]
    });
    serde_json::json!({
        "candidates": [{"content": {"parts": [{"text": roster.to_string()}]}}]
    })
}

#[derive(Default)]
struct LastLog(Option<ProgressLog>);

impl ProgressObserver for LastLog {
    fn finished(&mut self, log: &ProgressLog) {
        self.0 = Some(log.clone());
    }
}

#[tokio::test]
async fn test_pasted_text_produces_a_calendar_roster() {
    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(POST).path(GENERATE_PATH);
        then.status(200).json_body(roster_answer());
    });

    let engine = engine_for(&server);
    let mut session = Session::new();
    session.set_text("S1 HSBR / N1 22:40-30:10").unwrap();

    let outcome = engine.run(&mut session, &mut Silent).await.unwrap();

    api_mock.assert();
    assert_eq!(outcome, RunOutcome::Completed(Completion::Applied));
    assert_eq!(session.view(), Some(ViewMode::Calendar));
    let roster: &RosterDocument = session.roster().unwrap();
    assert_eq!(roster.period_label, "NUIT");
    assert_eq!(roster.weeks[0].tuesday.end_time(), Some("06:10"));
}

#[tokio::test]
async fn test_service_failure_keeps_the_input_for_retry() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path(GENERATE_PATH);
        then.status(500).body("internal");
    });

    let engine = engine_for(&server);
    let mut session = Session::new();
    session.set_text("S1 HSBR").unwrap();
    let mut observer = LastLog::default();

    engine.run(&mut session, &mut observer).await.unwrap();

    assert_eq!(
        session.phase(),
        &Phase::Failed {
            message: EXTRACTION_FAILED_MESSAGE.to_string()
        }
    );
    assert_eq!(session.text(), "S1 HSBR");
    assert!(session.can_submit());
    let log = observer.0.unwrap();
    assert!(log.lines().last().unwrap().contains(EXTRACTION_FAILED_MESSAGE));
}

#[tokio::test]
async fn test_console_session_from_text_to_exports() {
    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(POST).path(GENERATE_PATH);
        then.status(200).json_body(roster_answer());
    });

    let temp_dir = TempDir::new().unwrap();
    let storage = LocalStorage::new(temp_dir.path().to_str().unwrap());
    let mut console = Console::new(engine_for(&server), MemoryClipboard::new(), storage);

    let script = "\
text S1 HSBR
text N1 22:40-30:10
submit
view json
copy
save out/roster.json
csv out/roster.csv
status
quit
text never reached
";
    let mut out = Vec::new();
    console
        .run(script.as_bytes(), &mut out, &mut Silent)
        .await
        .unwrap();
    let printed = String::from_utf8(out).unwrap();

    api_mock.assert_hits(1);
    assert!(printed.contains("HSBR"));
    assert!(printed.contains("\"seriesLabel\": \"Z SUP 0\""));
    assert!(printed.contains("Roster JSON copied to the clipboard."));
    assert!(printed.contains("State: a roster is displayed"));
    assert!(!printed.contains("never reached"));

    let copied = console.clipboard().contents().unwrap();
    let saved = std::fs::read_to_string(temp_dir.path().join("out/roster.json")).unwrap();
    assert_eq!(copied, saved);
    assert_eq!(RosterDocument::from_json(copied).unwrap().weeks.len(), 1);

    let csv = std::fs::read_to_string(temp_dir.path().join("out/roster.csv")).unwrap();
    let mut lines = csv.lines();
    assert_eq!(lines.next(), Some("week,day,date,start,end,code,type,off"));
    assert_eq!(
        lines.next(),
        Some("1,monday,,,,HSBR,HORS SERVICE - BRUXELLES,true")
    );
    assert_eq!(lines.next(), Some("1,tuesday,,22:40,06:10,N1,CONDUITE,false"));
}

#[tokio::test]
async fn test_console_submit_without_input_stays_offline() {
    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(POST).path(GENERATE_PATH);
        then.status(200).json_body(roster_answer());
    });

    let temp_dir = TempDir::new().unwrap();
    let storage = LocalStorage::new(temp_dir.path().to_str().unwrap());
    let mut console = Console::new(engine_for(&server), MemoryClipboard::new(), storage);
    let mut out = Vec::new();

    let flow = console.execute("submit", &mut out, &mut Silent).await;
    assert!(flow.is_err());
    assert_eq!(console.session().notice(), Some(MISSING_INPUT_MESSAGE));

    let flow = console.execute("copy", &mut out, &mut Silent).await;
    assert!(flow.is_err());
    assert!(console.clipboard().contents().is_none());

    assert_eq!(
        console.execute("quit", &mut out, &mut Silent).await.unwrap(),
        Flow::Quit
    );
    api_mock.assert_hits(0);
}

#[tokio::test]
async fn test_console_file_locks_text_input() {
    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(POST)
            .path(GENERATE_PATH)
            .body_contains("application/pdf");
        then.status(200).json_body(roster_answer());
    });

    let temp_dir = TempDir::new().unwrap();
    std::fs::write(temp_dir.path().join("roster.pdf"), b"%PDF-1.7").unwrap();
    let storage = LocalStorage::new(temp_dir.path().to_str().unwrap());
    let mut console = Console::new(engine_for(&server), MemoryClipboard::new(), storage);
    let mut out = Vec::new();

    console
        .execute("text typed first", &mut out, &mut Silent)
        .await
        .unwrap();
    console
        .execute("file roster.pdf", &mut out, &mut Silent)
        .await
        .unwrap();
    assert_eq!(console.session().text(), "");
    assert!(!console.session().text_input_enabled());
    assert!(console
        .execute("text typed later", &mut out, &mut Silent)
        .await
        .is_err());

    console.execute("submit", &mut out, &mut Silent).await.unwrap();
    api_mock.assert();
    assert!(console.session().roster().is_some());

    console.execute("reset", &mut out, &mut Silent).await.unwrap();
    assert_eq!(console.session().phase(), &Phase::Idle);
    assert!(console.session().staged_file().is_none());
    assert!(console.session().text_input_enabled());
}
