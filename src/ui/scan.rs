use iced::widget::{button, canvas, column, container, image, row, stack, text};
use iced::{Alignment, Element, Length};

use smart_scan::capture::{CaptureState, PreviewMode};

use super::overlay::ScanFrame;
use crate::{Message, SmartScan};

const PREVIEW_HEIGHT: f32 = 420.0;

pub fn view(app: &SmartScan) -> Element<Message> {
    let body: Element<Message> = match app.capture.state() {
        CaptureState::Idle => idle(app),
        CaptureState::Previewing(mode) => previewing(app, *mode),
        CaptureState::Captured { mode, .. } => captured(app, *mode),
    };

    column![
        super::heading("Scan Document", "Capture a document with your camera"),
        body,
    ]
    .spacing(20)
    .into()
}

fn idle(app: &SmartScan) -> Element<Message> {
    let card = column![
        text("Ready to scan").size(20),
        text("Place your document on a flat surface with good lighting").size(14),
        button("Start Camera")
            .on_press(Message::StartCamera)
            .padding(12),
    ]
    .spacing(12)
    .align_x(Alignment::Center);

    column![
        container(card)
            .padding(24)
            .width(Length::Fill)
            .center_x(Length::Fill)
            .style(container::rounded_box),
        text(format!("{} recent scans", app.files.len())).size(14),
    ]
    .spacing(12)
    .into()
}

fn previewing(app: &SmartScan, mode: PreviewMode) -> Element<Message> {
    let feed: Element<Message> = match (&app.preview, mode) {
        (Some(handle), PreviewMode::Live) => image(handle.clone())
            .width(Length::Fill)
            .height(Length::Fill)
            .into(),
        (None, PreviewMode::Live) => centered_note("Starting camera..."),
        (_, PreviewMode::Degraded) => {
            centered_note("Camera preview unavailable. Capture will save a placeholder.")
        }
    };

    // Later layers draw on top: the frame guides sit over the feed
    let preview = stack![
        feed,
        canvas(ScanFrame::default())
            .width(Length::Fill)
            .height(Length::Fill),
    ]
    .width(Length::Fill)
    .height(PREVIEW_HEIGHT);

    column![
        container(preview).style(container::rounded_box),
        text("Position the document within the frame").size(14),
        row![
            button("Cancel")
                .on_press(Message::CancelScan)
                .style(button::secondary)
                .padding(12),
            button("Capture")
                .on_press(Message::CaptureDocument)
                .padding(12),
        ]
        .spacing(12),
    ]
    .spacing(12)
    .align_x(Alignment::Center)
    .into()
}

fn captured(app: &SmartScan, mode: PreviewMode) -> Element<Message> {
    let still: Element<Message> = match &app.captured {
        Some(handle) => image(handle.clone())
            .width(Length::Fill)
            .height(PREVIEW_HEIGHT)
            .into(),
        None => container(centered_note("Placeholder scan"))
            .height(PREVIEW_HEIGHT)
            .into(),
    };

    let note = match mode {
        PreviewMode::Live => "Document captured",
        PreviewMode::Degraded => "Captured without a camera",
    };

    column![
        container(still).style(container::rounded_box),
        text(note).size(14),
        row![
            button("Retake")
                .on_press(Message::Retake)
                .style(button::secondary)
                .padding(12),
            button("Save Scan")
                .on_press(Message::SaveScan)
                .padding(12),
        ]
        .spacing(12),
    ]
    .spacing(12)
    .align_x(Alignment::Center)
    .into()
}

fn centered_note(note: &str) -> Element<'_, Message> {
    container(text(note).size(14))
        .width(Length::Fill)
        .height(Length::Fill)
        .center_x(Length::Fill)
        .center_y(Length::Fill)
        .into()
}
