//! The dashboard driven end to end through the synchronous runner.

use mindscribe::testing::{demo_dashboard, entry, goal, journal, Call, ScriptedApi};
use mindscribe::dashboard::{Action, Response, Snapshot, SyncRunner};
use mindscribe::session::{ConfiguredIdentity, SessionMode};
use mindscribe::{ChatRole, RecordId, Session};

fn started(api: &ScriptedApi) -> mindscribe::Dashboard {
    let mut dashboard = demo_dashboard();
    let requests = dashboard.start();
    SyncRunner::new(api).run(&mut dashboard, requests);
    dashboard
}

#[test]
fn start_loads_entries_and_goals_for_the_session_user() {
    let api = ScriptedApi::new(journal(3), vec![goal(1, "Sleep by 11")]);
    let dashboard = started(&api);

    assert_eq!(
        api.calls(),
        vec![Call::ListEntries("demo_user".into()), Call::ListGoals("demo_user".into())]
    );
    assert_eq!(dashboard.entries().len(), 3);
    assert_eq!(dashboard.goals()[0].title, "Sleep by 11");
}

#[test]
fn signed_in_user_scopes_every_request() {
    let api = ScriptedApi::new(Vec::new(), Vec::new());
    let identity = ConfiguredIdentity { user_id: Some("user_42".to_string()) };
    let session = Session::resolve(false, &identity, "demo_user");
    assert_eq!(session.mode(), SessionMode::Authenticated);

    let mut dashboard = mindscribe::Dashboard::new(session, Default::default());
    let runner = SyncRunner::new(&api);
    let requests = dashboard.start();
    runner.run(&mut dashboard, requests);
    runner.dispatch(&mut dashboard, Action::CreateEntry { content: "first".into() });

    assert!(api.calls().contains(&Call::CreateEntry {
        user_id: "user_42".into(),
        content: "first".into()
    }));
    assert_eq!(dashboard.entries()[0].user_id, "user_42");
}

#[test]
fn whitespace_entry_makes_no_call() {
    let api = ScriptedApi::new(journal(2), Vec::new());
    let mut dashboard = started(&api);
    let before = dashboard.entries().to_vec();

    SyncRunner::new(&api).dispatch(&mut dashboard, Action::CreateEntry { content: " \n\t ".into() });

    assert!(api.writes().is_empty());
    assert_eq!(dashboard.entries(), before.as_slice());
}

#[test]
fn created_entry_arrives_through_a_full_reload() {
    let api = ScriptedApi::new(journal(2), Vec::new());
    let mut dashboard = started(&api);
    dashboard.drafts.entry = "Slept badly, long walk helped".to_string();
    let content = dashboard.drafts.entry.clone();

    SyncRunner::new(&api).dispatch(&mut dashboard, Action::CreateEntry { content });

    let contents: Vec<_> = dashboard.entries().iter().map(|e| e.content.as_str()).collect();
    assert_eq!(contents, vec!["Slept badly, long walk helped", "day 2", "day 1"]);
    assert!(dashboard.drafts.entry.is_empty());
    assert!(!dashboard.busy().publishing);
}

#[test]
fn failed_create_still_releases_busy_flag() {
    let api = ScriptedApi::new(journal(1), Vec::new());
    api.fail("create_entry");
    let mut dashboard = started(&api);

    SyncRunner::new(&api).dispatch(&mut dashboard, Action::CreateEntry { content: "lost".into() });

    assert!(!dashboard.busy().publishing);
    assert_eq!(dashboard.entries().len(), 1);
    assert_eq!(dashboard.take_last_failure().as_deref(), Some("Failed to create entry"));
}

#[test]
fn toggling_twice_restores_selection() {
    let api = ScriptedApi::new(journal(3), Vec::new());
    let mut dashboard = started(&api);
    dashboard.dispatch(Action::ToggleSelect(RecordId::Int(3)));
    let before = dashboard.selection().to_vec();

    dashboard.dispatch(Action::ToggleSelect(RecordId::Int(1)));
    dashboard.dispatch(Action::ToggleSelect(RecordId::Int(1)));

    assert_eq!(dashboard.selection(), before.as_slice());
}

#[test]
fn empty_batch_makes_no_call() {
    let api = ScriptedApi::new(journal(2), Vec::new());
    let mut dashboard = started(&api);
    SyncRunner::new(&api).dispatch(&mut dashboard, Action::BatchAnalyze);
    assert!(api.writes().is_empty());
}

#[test]
fn batch_sends_exact_ids_and_clears_selection() {
    let api = ScriptedApi::new(journal(3), Vec::new());
    let mut dashboard = started(&api);
    dashboard.dispatch(Action::ToggleSelect(RecordId::Int(3)));
    dashboard.dispatch(Action::ToggleSelect(RecordId::Int(1)));

    SyncRunner::new(&api).dispatch(&mut dashboard, Action::BatchAnalyze);

    assert_eq!(api.writes(), vec![Call::AnalyzeBatch(vec![RecordId::Int(3), RecordId::Int(1)])]);
    assert!(dashboard.selection().is_empty());
    assert!(!dashboard.busy().analyzing);
    let analyzed: Vec<_> = dashboard.entries().iter().map(|e| e.is_analyzed()).collect();
    assert_eq!(analyzed, vec![true, false, true]);
}

#[test]
fn failed_batch_clears_selection_too() {
    let api = ScriptedApi::new(journal(2), Vec::new());
    api.fail("analyze_batch");
    let mut dashboard = started(&api);
    dashboard.dispatch(Action::ToggleSelect(RecordId::Int(2)));

    SyncRunner::new(&api).dispatch(&mut dashboard, Action::BatchAnalyze);

    assert!(dashboard.selection().is_empty());
    assert!(!dashboard.busy().analyzing);
    assert_eq!(dashboard.take_last_failure().as_deref(), Some("Failed to analyze entries"));
}

#[test]
fn declined_delete_never_reaches_the_api() {
    let api = ScriptedApi::new(journal(2), Vec::new());
    let mut dashboard = started(&api);
    let runner = SyncRunner::new(&api);

    runner.dispatch(&mut dashboard, Action::RequestDeleteEntry(RecordId::Int(2)));
    runner.dispatch(&mut dashboard, Action::ConfirmDelete(false));

    assert!(api.writes().is_empty());
    assert_eq!(dashboard.entries().len(), 2);
}

#[test]
fn confirmed_delete_removes_entry() {
    let api = ScriptedApi::new(journal(2), Vec::new());
    let mut dashboard = started(&api);
    let runner = SyncRunner::new(&api);

    runner.dispatch(&mut dashboard, Action::RequestDeleteEntry(RecordId::Int(2)));
    runner.dispatch(&mut dashboard, Action::ConfirmDelete(true));

    assert_eq!(api.writes(), vec![Call::DeleteEntry(RecordId::Int(2))]);
    assert_eq!(dashboard.entries(), &[entry(1, "day 1")]);
}

#[test]
fn goals_are_added_and_removed_without_confirmation() {
    let api = ScriptedApi::new(Vec::new(), Vec::new());
    let mut dashboard = started(&api);
    let runner = SyncRunner::new(&api);

    runner.dispatch(&mut dashboard, Action::CreateGoal { title: "   ".into() });
    assert!(api.writes().is_empty());

    runner.dispatch(&mut dashboard, Action::CreateGoal { title: "Read more".into() });
    let id = dashboard.goals()[0].id.clone();
    runner.dispatch(&mut dashboard, Action::DeleteGoal(id.clone()));

    assert_eq!(
        api.writes(),
        vec![
            Call::CreateGoal { user_id: "demo_user".into(), title: "Read more".into() },
            Call::DeleteGoal(id),
        ]
    );
    assert!(dashboard.goals().is_empty());
}

#[test]
fn chat_sends_five_newest_entries_as_context() {
    let api = ScriptedApi::new(journal(7), Vec::new());
    let mut dashboard = started(&api);

    SyncRunner::new(&api).dispatch(&mut dashboard, Action::SendChat { message: "Why so tired?".into() });

    assert_eq!(
        api.writes(),
        vec![Call::Chat {
            message: "Why so tired?".into(),
            context: "day 7 | day 6 | day 5 | day 4 | day 3".into(),
        }]
    );
    let history = dashboard.chat_history();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].role, ChatRole::User);
    assert_eq!(history[1].role, ChatRole::Assistant);
    assert_eq!(history[1].text, "Reflecting on: Why so tired?");
}

#[test]
fn user_message_is_shown_before_the_reply_arrives() {
    let api = ScriptedApi::new(journal(1), Vec::new());
    let mut dashboard = started(&api);

    let requests = dashboard.dispatch(Action::SendChat { message: "hello".into() });
    assert_eq!(dashboard.chat_history().len(), 1);
    assert_eq!(dashboard.chat_pending(), 1);

    SyncRunner::new(&api).run(&mut dashboard, requests);
    assert_eq!(dashboard.chat_history().len(), 2);
    assert_eq!(dashboard.chat_pending(), 0);
}

#[test]
fn failed_chat_adds_no_reply() {
    let api = ScriptedApi::new(journal(1), Vec::new());
    api.fail("chat");
    let mut dashboard = started(&api);

    SyncRunner::new(&api).dispatch(&mut dashboard, Action::SendChat { message: "hello".into() });

    assert_eq!(dashboard.chat_history().len(), 1);
    assert_eq!(dashboard.chat_pending(), 0);
}

#[test]
fn out_of_order_reloads_keep_the_newest() {
    let mut dashboard = demo_dashboard();
    let first = dashboard.dispatch(Action::Load);
    let second = dashboard.dispatch(Action::Load);
    let seq_of = |requests: &[mindscribe::dashboard::Request]| match requests {
        [mindscribe::dashboard::Request::Load { seq, .. }] => *seq,
        other => panic!("expected a single load, got {:?}", other),
    };

    dashboard.handle(Response::Loaded {
        seq: seq_of(&second),
        release: None,
        result: Ok(Snapshot { entries: vec![entry(2, "fresh")], goals: Vec::new() }),
    });
    dashboard.handle(Response::Loaded {
        seq: seq_of(&first),
        release: None,
        result: Ok(Snapshot { entries: vec![entry(1, "stale")], goals: Vec::new() }),
    });

    assert_eq!(dashboard.entries(), &[entry(2, "fresh")]);
}
