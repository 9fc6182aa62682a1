// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Host-facing runtime: owns the session, the debounce deadline and the upload workers.
//!
//! The host calls the event methods from its UI thread and [`EditorRuntime::poll`] from its
//! loop; uploads run on worker threads and report back over a channel, so the document is
//! only ever touched on the host thread.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender};
use tracing::{debug, warn};

use crate::config::SessionConfig;
use crate::logic::upload::{UploadError, UploadGateway};
use crate::models::clipboard::{ImagePayload, PastePayload};
use crate::models::document::EditorDocument;
use crate::mvu::paste::{self, PasteDisposition};
use crate::mvu::{self, Command, Msg, SessionModel, TimerToken, UploadTicket};

/// One editor session wired to its upload workers.
pub struct EditorRuntime<D> {
    model: SessionModel<D>,
    inbox: VecDeque<Msg>,
    upload_tx: Sender<(UploadTicket, ImagePayload)>,
    msg_rx: Receiver<Msg>,
    timer: Option<(Instant, TimerToken)>,
}

impl<D: EditorDocument> EditorRuntime<D> {
    /// Start a session over `document`, spawning `config.upload_workers` upload threads.
    ///
    /// Workers exit when the runtime is dropped.
    pub fn new(document: D, config: SessionConfig, gateway: Arc<dyn UploadGateway>) -> Self {
        let (upload_tx, upload_rx) = crossbeam_channel::unbounded::<(UploadTicket, ImagePayload)>();
        let (msg_tx, msg_rx) = crossbeam_channel::unbounded::<Msg>();

        for _ in 0..config.upload_workers.max(1) {
            let upload_rx = upload_rx.clone();
            let msg_tx = msg_tx.clone();
            let gateway = Arc::clone(&gateway);
            std::thread::spawn(move || {
                for (ticket, image) in upload_rx.iter() {
                    let msg = mvu::run_upload(ticket, &image, gateway.as_ref());
                    let _ = msg_tx.send(msg);
                }
            });
        }

        Self {
            model: SessionModel::new(document, config),
            inbox: VecDeque::new(),
            upload_tx,
            msg_rx,
            timer: None,
        }
    }

    /// The host editor's content changed.
    pub fn document_changed(&mut self, now: Instant) {
        self.dispatch(Msg::DocumentChanged, now);
    }

    /// A paste event arrived; the return value tells the host whether to run its default paste.
    pub fn paste(&mut self, payload: PastePayload, now: Instant) -> PasteDisposition {
        let mut cmds = Vec::new();
        let disposition = paste::intercept(&mut self.model, payload, &mut cmds);
        self.execute(cmds, now);
        disposition
    }

    /// An image was dropped onto the editor.
    pub fn drop_image(&mut self, image: ImagePayload, now: Instant) {
        self.dispatch(Msg::ImageDropped(image), now);
    }

    /// Apply finished uploads and a due reconciliation timer.
    pub fn poll(&mut self, now: Instant) {
        while let Ok(msg) = self.msg_rx.try_recv() {
            self.inbox.push_back(msg);
        }

        if let Some((_, token)) = self.timer.filter(|(deadline, _)| *deadline <= now) {
            self.timer = None;
            self.inbox.push_back(Msg::ReconcileDue(token));
        }

        while let Some(msg) = self.inbox.pop_front() {
            self.dispatch(msg, now);
        }
    }

    /// Block up to `timeout` for a worker message; queues it for the next [`poll`](Self::poll).
    pub fn wait_for_message(&mut self, timeout: Duration) -> bool {
        match self.msg_rx.recv_timeout(timeout) {
            Ok(msg) => {
                self.inbox.push_back(msg);
                true
            }
            Err(_) => false,
        }
    }

    /// When the armed reconciliation timer fires, if any.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.timer.map(|(deadline, _)| deadline)
    }

    /// The host editor is gone; late completions become no-ops.
    pub fn teardown(&mut self) {
        self.timer = None;
        self.dispatch(Msg::Teardown, Instant::now());
    }

    pub fn dismiss_error(&mut self) {
        self.dispatch(Msg::DismissError, Instant::now());
    }

    pub fn model(&self) -> &SessionModel<D> {
        &self.model
    }

    pub fn document(&self) -> Option<&D> {
        self.model.document()
    }

    pub fn document_mut(&mut self) -> Option<&mut D> {
        self.model.document_mut()
    }

    /// See [`SessionModel::submit_html`].
    pub fn submit_html(&self) -> Option<String> {
        self.model.submit_html()
    }

    fn dispatch(&mut self, msg: Msg, now: Instant) {
        let mut cmds = Vec::new();
        mvu::update(&mut self.model, msg, &mut cmds);
        self.execute(cmds, now);
    }

    fn execute(&mut self, cmds: Vec<Command>, now: Instant) {
        for cmd in cmds {
            match cmd {
                Command::ScheduleReconcile { token, after } => {
                    debug!(?token, ?after, "reconciliation scheduled");
                    self.timer = Some((now + after, token));
                }
                Command::UploadImage { ticket, image } => {
                    if self.upload_tx.send((ticket, image)).is_err() {
                        warn!(%ticket, "upload workers are gone");
                        self.inbox.push_back(Msg::UploadCompleted {
                            ticket,
                            result: Err(UploadError::Network("upload workers unavailable".into())),
                        });
                    }
                }
            }
        }
    }
}
