// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Session Model-View-Update kernel: editor document, pending timers and uploads.
//!
//! The host drives the session with [`Msg`]s; side effects come back out as [`Command`]s for
//! the runtime to execute. All document writes happen inside [`update`], each one on a fresh
//! read of the document.

pub mod paste;

use std::collections::HashSet;
use std::fmt;
use std::time::Duration;

use tracing::{debug, info};
use uuid::Uuid;

use crate::config::SessionConfig;
use crate::logic::reconcile::reconcile_document;
use crate::logic::sanitize::sanitize_html;
use crate::logic::upload::{UploadError, UploadGateway, UploadResult};
use crate::models::clipboard::ImagePayload;
use crate::models::document::EditorDocument;

/// Identity of one armed reconciliation timer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerToken(u64);

/// Identity of one in-flight upload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct UploadTicket(Uuid);

impl UploadTicket {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for UploadTicket {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UploadTicket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// State of one editing session.
pub struct SessionModel<D> {
    /// Live document; `None` once the host editor is gone.
    document: Option<D>,
    config: SessionConfig,
    /// Only this token may run reconciliation.
    pending_reconcile: Option<TimerToken>,
    next_token: u64,
    pending_uploads: HashSet<UploadTicket>,
    /// Latest status message to display.
    pub status: Option<String>,
    /// Latest error message to display.
    pub error: Option<String>,
}

/// Session messages routed through the update function.
#[derive(Debug)]
pub enum Msg {
    /// The host editor reported a content change.
    DocumentChanged,
    /// An image was dropped onto the editor.
    ImageDropped(ImagePayload),
    ReconcileDue(TimerToken),
    UploadCompleted {
        ticket: UploadTicket,
        result: Result<UploadResult, UploadError>,
    },
    DismissError,
    /// The host editor was destroyed.
    Teardown,
}

/// Side effects executed by the runtime.
#[derive(Debug)]
pub enum Command {
    ScheduleReconcile { token: TimerToken, after: Duration },
    UploadImage { ticket: UploadTicket, image: ImagePayload },
}

impl<D: EditorDocument> SessionModel<D> {
    pub fn new(document: D, config: SessionConfig) -> Self {
        Self {
            document: Some(document),
            config,
            pending_reconcile: None,
            next_token: 0,
            pending_uploads: HashSet::new(),
            status: None,
            error: None,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn document(&self) -> Option<&D> {
        self.document.as_ref()
    }

    pub fn document_mut(&mut self) -> Option<&mut D> {
        self.document.as_mut()
    }

    pub fn is_alive(&self) -> bool {
        self.document.is_some()
    }

    /// Number of uploads still waiting for a response.
    pub fn pending_uploads(&self) -> usize {
        self.pending_uploads.len()
    }

    pub fn pending_reconcile(&self) -> Option<TimerToken> {
        self.pending_reconcile
    }

    /// Sanitized HTML ready for persistence, or `None` when there is nothing to save.
    pub fn submit_html(&self) -> Option<String> {
        let document = self.document.as_ref()?;
        let html = sanitize_html(&document.html());
        let trimmed = html.trim();
        if trimmed.is_empty() || trimmed == "<p><br></p>" {
            return None;
        }
        Some(html)
    }
}

/// Update the session model and enqueue commands.
pub fn update<D: EditorDocument>(model: &mut SessionModel<D>, msg: Msg, cmds: &mut Vec<Command>) {
    match msg {
        Msg::DocumentChanged => {
            let after = model.config.debounce();
            schedule_reconcile(model, after, cmds);
        }
        Msg::ImageDropped(image) => paste::begin_upload(model, image, cmds),
        Msg::ReconcileDue(token) => run_reconcile(model, token),
        Msg::UploadCompleted { ticket, result } => paste::finish_upload(model, ticket, result),
        Msg::DismissError => model.error = None,
        Msg::Teardown => {
            model.document = None;
            model.pending_reconcile = None;
            model.pending_uploads.clear();
            debug!("editor session torn down");
        }
    }
}

/// Execute a blocking upload; called on worker threads.
pub fn run_upload(ticket: UploadTicket, image: &ImagePayload, gateway: &dyn UploadGateway) -> Msg {
    Msg::UploadCompleted {
        ticket,
        result: gateway.upload(image),
    }
}

/// Arm a fresh timer token, superseding any pending one.
pub(crate) fn schedule_reconcile<D>(
    model: &mut SessionModel<D>,
    after: Duration,
    cmds: &mut Vec<Command>,
) {
    if model.document.is_none() {
        debug!("ignoring change notification after teardown");
        return;
    }
    let token = TimerToken(model.next_token);
    model.next_token += 1;
    model.pending_reconcile = Some(token);
    cmds.push(Command::ScheduleReconcile { token, after });
}

fn run_reconcile<D: EditorDocument>(model: &mut SessionModel<D>, token: TimerToken) {
    if model.pending_reconcile != Some(token) {
        debug!(?token, "ignoring superseded reconciliation timer");
        return;
    }
    model.pending_reconcile = None;

    let Some(document) = model.document.as_mut() else {
        debug!("reconciliation fired after teardown");
        return;
    };
    let created = reconcile_document(document);
    if created > 0 {
        info!(embeds = created, "embedded video links");
    }
}

pub(crate) fn surface_event<D>(model: &mut SessionModel<D>, message: String, is_error: bool) {
    if is_error {
        model.error = Some(message.clone());
    }
    model.status = Some(message);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::document::MemoryDocument;

    const LINK: &str = "<p>https://youtu.be/dQw4w9WgXcQ</p>";

    fn session(html: &str) -> SessionModel<MemoryDocument> {
        SessionModel::new(MemoryDocument::new(html), SessionConfig::default())
    }

    fn schedule_token(cmds: &[Command]) -> TimerToken {
        match cmds.last() {
            Some(Command::ScheduleReconcile { token, .. }) => *token,
            other => panic!("expected reconcile schedule, got {other:?}"),
        }
    }

    #[test]
    fn change_notification_arms_debounce_timer() {
        let mut model = session("");
        let mut cmds = Vec::new();
        update(&mut model, Msg::DocumentChanged, &mut cmds);

        assert!(matches!(
            cmds.as_slice(),
            [Command::ScheduleReconcile { after, .. }] if *after == Duration::from_millis(250)
        ));
        assert_eq!(model.pending_reconcile(), Some(schedule_token(&cmds)));
    }

    // Only the newest token reconciles; earlier firings are stale.
    #[test]
    fn new_change_supersedes_pending_timer() {
        let mut model = session(LINK);
        let mut cmds = Vec::new();
        update(&mut model, Msg::DocumentChanged, &mut cmds);
        let first = schedule_token(&cmds);
        update(&mut model, Msg::DocumentChanged, &mut cmds);
        let second = schedule_token(&cmds);
        assert_ne!(first, second);

        update(&mut model, Msg::ReconcileDue(first), &mut cmds);
        assert_eq!(model.document().unwrap().writes(), 0);

        update(&mut model, Msg::ReconcileDue(second), &mut cmds);
        assert_eq!(model.document().unwrap().writes(), 1);
        assert!(model.document().unwrap().html().contains("<iframe"));
        assert_eq!(model.pending_reconcile(), None);
    }

    #[test]
    fn reconcile_reads_latest_document() {
        let mut model = session("");
        let mut cmds = Vec::new();
        update(&mut model, Msg::DocumentChanged, &mut cmds);
        let token = schedule_token(&cmds);

        model
            .document_mut()
            .unwrap()
            .edit(|html| html.push_str(LINK));
        update(&mut model, Msg::ReconcileDue(token), &mut cmds);

        assert!(model.document().unwrap().html().contains("youtube.com/embed/dQw4w9WgXcQ"));
    }

    #[test]
    fn teardown_drops_document_and_ignores_later_messages() {
        let mut model = session(LINK);
        let mut cmds = Vec::new();
        update(&mut model, Msg::DocumentChanged, &mut cmds);
        let token = schedule_token(&cmds);

        update(&mut model, Msg::Teardown, &mut cmds);
        update(&mut model, Msg::ReconcileDue(token), &mut cmds);
        cmds.clear();
        update(&mut model, Msg::DocumentChanged, &mut cmds);

        assert!(!model.is_alive());
        assert!(cmds.is_empty());
        assert!(model.submit_html().is_none());
    }

    #[test]
    fn submit_html_sanitizes_and_rejects_blank_documents() {
        assert!(session("").submit_html().is_none());
        assert!(session("<p><br></p>").submit_html().is_none());

        let html = session(r#"<p onclick="x()">hi</p><script>bad()</script>"#)
            .submit_html()
            .unwrap();
        assert_eq!(html, "<p>hi</p>");
    }

    #[test]
    fn dismiss_error_clears_error_only() {
        let mut model = session("");
        surface_event(&mut model, "boom".into(), true);
        update(&mut model, Msg::DismissError, &mut Vec::new());

        assert!(model.error.is_none());
        assert_eq!(model.status.as_deref(), Some("boom"));
    }
}
