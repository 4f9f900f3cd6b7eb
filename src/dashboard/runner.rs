use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread;

use crate::api::JournalApi;
use crate::dashboard::{Action, Dashboard, Request, Response, Snapshot};

/// Run one request against the API and wrap the outcome.
pub fn execute(api: &dyn JournalApi, request: Request) -> Response {
    log::debug!("Running {} request", request.name());
    match request {
        Request::Load { user_id, seq, release } => {
            let result = api.list_entries(&user_id).and_then(|entries| {
                let goals = api.list_goals(&user_id)?;
                Ok(Snapshot { entries, goals })
            });
            Response::Loaded { seq, release, result }
        }
        Request::CreateEntry { user_id, content } => {
            Response::EntryCreated(api.create_entry(&user_id, &content))
        }
        Request::DeleteEntry { id } => {
            let result = api.delete_entry(&id);
            Response::EntryDeleted { id, result }
        }
        Request::AnalyzeBatch { entry_ids } => {
            let result = api.analyze_batch(&entry_ids);
            Response::BatchAnalyzed { entry_ids, result }
        }
        Request::CreateGoal { user_id, title } => {
            Response::GoalCreated(api.create_goal(&user_id, &title))
        }
        Request::DeleteGoal { id } => {
            let result = api.delete_goal(&id);
            Response::GoalDeleted { id, result }
        }
        Request::Chat { message, context, chat_session } => {
            let result = api.chat(&message, &context);
            Response::ChatReplied { chat_session, result }
        }
    }
}

/// Runs requests on the calling thread until the dashboard has nothing left
/// to ask for. Used by the one-shot CLI commands.
pub struct SyncRunner<'a> {
    api: &'a dyn JournalApi,
}

impl<'a> SyncRunner<'a> {
    pub fn new(api: &'a dyn JournalApi) -> Self {
        Self { api }
    }

    pub fn dispatch(&self, dashboard: &mut Dashboard, action: Action) {
        let requests = dashboard.dispatch(action);
        self.run(dashboard, requests);
    }

    pub fn run(&self, dashboard: &mut Dashboard, requests: Vec<Request>) {
        let mut queue: VecDeque<Request> = requests.into();
        while let Some(request) = queue.pop_front() {
            let response = execute(self.api, request);
            queue.extend(dashboard.handle(response));
        }
    }
}

/// Runs every request on its own worker thread and hands responses back
/// over a channel, so the UI thread never waits on the network.
pub struct BackgroundRunner {
    api: Arc<dyn JournalApi>,
    tx: Sender<Response>,
    rx: Receiver<Response>,
    in_flight: usize,
}

impl BackgroundRunner {
    pub fn new(api: Arc<dyn JournalApi>) -> Self {
        let (tx, rx) = mpsc::channel();
        Self { api, tx, rx, in_flight: 0 }
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn submit(&mut self, requests: Vec<Request>) {
        for request in requests {
            let api = Arc::clone(&self.api);
            let tx = self.tx.clone();
            let name = request.name();
            let spawned = thread::Builder::new()
                .name(format!("journal-api-{}", name))
                .spawn(move || {
                    let response = execute(api.as_ref(), request);
                    // The receiver only goes away when the UI is shutting down
                    let _ = tx.send(response);
                });
            match spawned {
                Ok(_) => self.in_flight += 1,
                Err(e) => log::error!("Failed to start {} request: {}", name, e),
            }
        }
    }

    /// Feed every response that has arrived into the dashboard and start
    /// whatever follow-up requests it asks for. Returns true if anything changed.
    pub fn drain(&mut self, dashboard: &mut Dashboard) -> bool {
        let mut changed = false;
        loop {
            match self.rx.try_recv() {
                Ok(response) => {
                    self.in_flight = self.in_flight.saturating_sub(1);
                    let follow_up = dashboard.handle(response);
                    self.submit(follow_up);
                    changed = true;
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        changed
    }
}
