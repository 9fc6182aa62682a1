// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Paste and drop interception.
//!
//! Images never enter the document as raw bytes: they are uploaded and inserted by URL once
//! the upload succeeds. Video links in pasted text are left to the default paste and picked
//! up by a scheduled reconciliation pass.

use tracing::{debug, info, warn};

use super::{Command, SessionModel, UploadTicket, schedule_reconcile, surface_event};
use crate::logic::embed::match_video;
use crate::logic::upload::{UploadError, UploadResult};
use crate::models::clipboard::{ImagePayload, PastePayload};
use crate::models::document::EditorDocument;
use crate::models::fragment::Element;

/// Inline style of inserted images.
pub const UPLOADED_IMAGE_STYLE: &str = "max-width: 100%; height: auto;";

/// What the host editor should do with the original paste event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PasteDisposition {
    /// Let the editor's own paste handling run.
    Default,
    /// The event was consumed; suppress the editor's handling.
    Handled,
}

/// Inspect a paste event and decide how it is handled.
pub fn intercept<D: EditorDocument>(
    model: &mut SessionModel<D>,
    payload: PastePayload,
    cmds: &mut Vec<Command>,
) -> PasteDisposition {
    if !model.is_alive() {
        return PasteDisposition::Default;
    }

    let (image, text) = payload.into_parts();
    if let Some(image) = image {
        begin_upload(model, image, cmds);
        return PasteDisposition::Handled;
    }

    if let Some(id) = text.as_deref().and_then(match_video) {
        debug!(video = %id, "pasted text contains a video link");
        let after = model.config.paste_reconcile_delay();
        schedule_reconcile(model, after, cmds);
    }
    PasteDisposition::Default
}

pub(crate) fn begin_upload<D>(model: &mut SessionModel<D>, image: ImagePayload, cmds: &mut Vec<Command>) {
    if model.document.is_none() {
        debug!("ignoring image after teardown");
        return;
    }
    if !image.is_image() {
        surface_event(model, "Only image files can be uploaded.".into(), true);
        return;
    }

    let ticket = UploadTicket::new();
    info!(%ticket, mime = %image.mime, bytes = image.bytes.len(), "uploading image");
    model.pending_uploads.insert(ticket);
    model.status = Some("Uploading image...".into());
    cmds.push(Command::UploadImage { ticket, image });
}

pub(crate) fn finish_upload<D: EditorDocument>(
    model: &mut SessionModel<D>,
    ticket: UploadTicket,
    result: Result<UploadResult, UploadError>,
) {
    let Some(document) = model.document.as_mut() else {
        debug!(%ticket, "upload finished after teardown");
        return;
    };
    if !model.pending_uploads.remove(&ticket) {
        debug!(%ticket, "ignoring completion for unknown upload");
        return;
    }

    match result {
        Ok(uploaded) => {
            let image = Element::new("img")
                .with_attr("src", uploaded.url.as_str())
                .with_attr("alt", model.config.uploaded_image_alt.as_str())
                .with_attr("style", UPLOADED_IMAGE_STYLE);
            let mut html = document.html();
            html.push_str(&image.to_html());
            html.push_str("<br>");
            document.set_html(&html);

            info!(%ticket, url = %uploaded.url, "image inserted");
            model.status = Some("Image uploaded.".into());
        }
        Err(err) => {
            warn!(%ticket, error = %err, "image upload failed");
            surface_event(model, err.to_string(), true);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SessionConfig;
    use crate::models::clipboard::ClipboardItem;
    use crate::models::document::MemoryDocument;
    use crate::mvu::{Msg, update};

    fn session(html: &str) -> SessionModel<MemoryDocument> {
        SessionModel::new(MemoryDocument::new(html), SessionConfig::default())
    }

    fn png() -> ClipboardItem {
        ClipboardItem::File {
            mime: "image/png".into(),
            name: None,
            bytes: vec![0x89, b'P', b'N', b'G'],
        }
    }

    fn upload_ticket(cmds: &[Command]) -> UploadTicket {
        match cmds {
            [Command::UploadImage { ticket, .. }] => *ticket,
            other => panic!("expected one upload, got {other:?}"),
        }
    }

    #[test]
    fn image_paste_is_handled_and_uploaded() {
        let mut model = session("<p>a</p>");
        let mut cmds = Vec::new();
        let payload = PastePayload {
            items: vec![ClipboardItem::Text("ignored".into()), png()],
        };

        assert_eq!(intercept(&mut model, payload, &mut cmds), PasteDisposition::Handled);
        upload_ticket(&cmds);
        assert_eq!(model.pending_uploads(), 1);
        assert_eq!(model.document().unwrap().writes(), 0);
    }

    #[test]
    fn successful_upload_appends_image_to_current_document() {
        let mut model = session("<p>a</p>");
        let mut cmds = Vec::new();
        intercept(&mut model, PastePayload { items: vec![png()] }, &mut cmds);
        let ticket = upload_ticket(&cmds);

        model
            .document_mut()
            .unwrap()
            .edit(|html| html.push_str("<p>typed meanwhile</p>"));
        let result = Ok(UploadResult {
            url: "/uploads/a.png".into(),
        });
        update(&mut model, Msg::UploadCompleted { ticket, result }, &mut cmds);

        assert_eq!(
            model.document().unwrap().html(),
            r#"<p>a</p><p>typed meanwhile</p><img alt="Uploaded image" src="/uploads/a.png" style="max-width: 100%; height: auto;"><br>"#
        );
        assert_eq!(model.pending_uploads(), 0);
        assert!(model.error.is_none());
    }

    #[test]
    fn failed_upload_surfaces_error_and_leaves_document() {
        let mut model = session("<p>a</p>");
        let mut cmds = Vec::new();
        intercept(&mut model, PastePayload { items: vec![png()] }, &mut cmds);
        let ticket = upload_ticket(&cmds);

        let result = Err(UploadError::Rejected {
            status: 400,
            detail: "Only image files can be uploaded.".into(),
        });
        update(&mut model, Msg::UploadCompleted { ticket, result }, &mut cmds);

        assert_eq!(model.document().unwrap().writes(), 0);
        assert_eq!(model.error.as_deref(), Some("Only image files can be uploaded."));
    }

    // Empty or non-image files fall through to the editor.
    #[test]
    fn malformed_files_use_default_paste() {
        let mut model = session("");
        let mut cmds = Vec::new();
        let payload = PastePayload {
            items: vec![
                ClipboardItem::File {
                    mime: "image/png".into(),
                    name: None,
                    bytes: Vec::new(),
                },
                ClipboardItem::File {
                    mime: "application/pdf".into(),
                    name: Some("a.pdf".into()),
                    bytes: vec![1],
                },
            ],
        };

        assert_eq!(intercept(&mut model, payload, &mut cmds), PasteDisposition::Default);
        assert!(cmds.is_empty());
    }

    #[test]
    fn text_with_video_link_schedules_reconcile_without_writing() {
        let mut model = session("");
        let mut cmds = Vec::new();
        let disposition = intercept(
            &mut model,
            PastePayload::text("look https://youtu.be/dQw4w9WgXcQ"),
            &mut cmds,
        );

        assert_eq!(disposition, PasteDisposition::Default);
        assert!(matches!(
            cmds.as_slice(),
            [Command::ScheduleReconcile { after, .. }] if after.is_zero()
        ));
        assert_eq!(model.document().unwrap().writes(), 0);
    }

    #[test]
    fn plain_text_paste_schedules_nothing() {
        let mut model = session("");
        let mut cmds = Vec::new();
        intercept(&mut model, PastePayload::text("hello"), &mut cmds);
        assert!(cmds.is_empty());
    }

    #[test]
    fn dropped_non_image_is_rejected() {
        let mut model = session("");
        let mut cmds = Vec::new();
        update(
            &mut model,
            Msg::ImageDropped(ImagePayload::new("text/plain", b"x".to_vec())),
            &mut cmds,
        );

        assert!(cmds.is_empty());
        assert_eq!(model.error.as_deref(), Some("Only image files can be uploaded."));
    }

    #[test]
    fn completion_after_teardown_is_ignored() {
        let mut model = session("<p>a</p>");
        let mut cmds = Vec::new();
        intercept(&mut model, PastePayload { items: vec![png()] }, &mut cmds);
        let ticket = upload_ticket(&cmds);

        update(&mut model, Msg::Teardown, &mut cmds);
        let result = Ok(UploadResult { url: "/u.png".into() });
        update(&mut model, Msg::UploadCompleted { ticket, result }, &mut cmds);

        assert!(model.document().is_none());
        assert!(model.status.as_deref() != Some("Image uploaded."));
    }
}
