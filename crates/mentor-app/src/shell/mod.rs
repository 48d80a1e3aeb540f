//! Line-oriented front-end over the session store.
//!
//! One intent is handled at a time: while a reply streams, input is not
//! read, so sends cannot overlap.

mod command;
mod render;

use std::io::Write;

use mentor_ai::Role;
use mentor_common::{Result, SessionId};
use mentor_store::{SessionStore, StreamingReconciler, TurnState};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

use command::{Command, Target};

pub struct Shell {
    store: SessionStore,
}

impl Shell {
    pub fn new(store: SessionStore) -> Self {
        Self { store }
    }

    /// Read commands from stdin until `/quit` or end of input.
    pub async fn run(mut self) -> Result<()> {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        println!("{}\n", command::HELP);
        self.show_active();

        loop {
            print!("\n> ");
            std::io::stdout().flush()?;

            let Some(line) = lines.next_line().await? else {
                break;
            };
            if !self.dispatch(command::parse(&line)).await {
                break;
            }
        }
        Ok(())
    }

    /// Handle one intent. Returns `false` when the shell should exit.
    async fn dispatch(&mut self, command: Command) -> bool {
        match command {
            Command::Empty => {}
            Command::Send(text) => self.send(&text).await,
            Command::New => {
                self.store.create_session();
                self.show_active();
            }
            Command::List => println!("{}", render::session_list(&self.store)),
            Command::Select(target) => match resolve(&self.store, &target) {
                Some(id) => {
                    self.store.select_session(&id);
                    self.show_active();
                }
                None => println!("No such session."),
            },
            Command::Delete(target) => match resolve(&self.store, &target) {
                Some(id) => {
                    self.store.delete_session(&id);
                    println!("{}", render::session_list(&self.store));
                }
                None => println!("No such session."),
            },
            Command::Help => println!("{}", command::HELP),
            Command::Quit => return false,
            Command::Invalid(hint) => println!("{hint}"),
        }
        true
    }

    async fn send(&mut self, text: &str) {
        let Some((reconciler, stream)) = StreamingReconciler::start(&mut self.store, text) else {
            debug!("send rejected");
            return;
        };

        print!("\n{}: ", render::speaker(Role::Assistant));
        let mut stdout = std::io::stdout();
        let _ = stdout.flush();

        let mut shown = 0;
        let outcome = reconciler
            .run(&mut self.store, stream, |_, text| {
                if let Some(new) = text.get(shown..) {
                    print!("{new}");
                    let _ = stdout.flush();
                }
                shown = text.len();
            })
            .await;

        if outcome.state == TurnState::Failed {
            print!("\n{}", outcome.text);
        }
        println!();
    }

    fn show_active(&self) {
        if let Some(session) = self.store.active_session() {
            println!("== {} ==\n", session.title);
            println!("{}", render::transcript(&session.messages));
        }
    }
}

/// Find a session by 1-based recency position, exact id, or unique id
/// suffix.
fn resolve(store: &SessionStore, target: &Target) -> Option<SessionId> {
    let sessions = store.sessions_by_recency();
    match target {
        Target::Index(n) => sessions.get(n.checked_sub(1)?).map(|s| s.id.clone()),
        Target::Id(id) => {
            if let Some(exact) = sessions.iter().find(|s| s.id.as_str() == id) {
                return Some(exact.id.clone());
            }
            let mut matches = sessions.iter().filter(|s| s.id.as_str().ends_with(id.as_str()));
            let first = matches.next()?;
            matches.next().is_none().then(|| first.id.clone())
        }
    }
}
