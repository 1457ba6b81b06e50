use iced::widget::{column, container, image, row, text, text_input, Column};
use iced::{Alignment, Element, Length};

use smart_scan::state::FileRecord;

use crate::{Message, SmartScan};

const THUMBNAIL_SIZE: f32 = 48.0;

pub fn view(app: &SmartScan) -> Element<Message> {
    let list: Element<Message> = if app.file_list.is_empty() {
        let note = if app.file_query.is_empty() {
            "No files yet. Scan a document to see it here."
        } else {
            "No files match your search."
        };
        container(text(note).size(14))
            .padding(24)
            .center_x(Length::Fill)
            .into()
    } else {
        Column::with_children(app.file_list.iter().map(|file| file_row(app, file)))
            .spacing(8)
            .into()
    };

    column![
        super::heading("Files", "Your recently scanned documents"),
        text_input("Search files...", &app.file_query)
            .on_input(Message::FileQueryChanged)
            .padding(10),
        text(format!("{} files", app.file_list.len())).size(13),
        list,
    ]
    .spacing(16)
    .into()
}

fn file_row<'a>(app: &'a SmartScan, file: &'a FileRecord) -> Element<'a, Message> {
    let preview: Element<Message> = match app.thumbnails.get(&file.id) {
        Some(handle) => image(handle.clone())
            .width(THUMBNAIL_SIZE)
            .height(THUMBNAIL_SIZE)
            .into(),
        None => container(text(super::kind_badge(file.kind())).size(12))
            .width(THUMBNAIL_SIZE)
            .height(THUMBNAIL_SIZE)
            .center_x(THUMBNAIL_SIZE)
            .center_y(THUMBNAIL_SIZE)
            .style(container::rounded_box)
            .into(),
    };

    let date = file
        .created_at()
        .map(|at| at.format("%b %-d, %Y").to_string())
        .unwrap_or_else(|| file.date.clone());

    container(
        row![
            preview,
            column![
                text(&file.name).size(15),
                text(format!("{} · {} · {}", super::kind_badge(file.kind()), file.size, date)).size(12),
            ]
            .spacing(4)
            .width(Length::Fill),
        ]
        .spacing(12)
        .align_y(Alignment::Center),
    )
    .padding(12)
    .width(Length::Fill)
    .style(container::rounded_box)
    .into()
}
