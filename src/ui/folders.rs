use iced::widget::{button, column, container, row, text, text_input, Column};
use iced::{Alignment, Element, Length};

use smart_scan::state::FolderRecord;

use crate::{Message, SmartScan};

pub fn view(app: &SmartScan) -> Element<Message> {
    let header = row![
        super::heading("Folders", "Organize your scanned documents"),
        button(if app.new_folder_open { "Close" } else { "New Folder" })
            .on_press(Message::ToggleNewFolder)
            .padding(10),
    ]
    .spacing(12)
    .align_y(Alignment::Center);

    let mut page: Column<Message> = column![
        header,
        text_input("Search folders...", &app.folder_query)
            .on_input(Message::FolderQueryChanged)
            .padding(10),
    ]
    .spacing(16);

    if app.new_folder_open {
        page = page.push(new_folder_form(app));
    }

    let list: Element<Message> = if app.folder_list.is_empty() {
        empty_state(app.folder_query.is_empty())
    } else {
        Column::with_children(app.folder_list.iter().map(folder_row))
            .spacing(8)
            .into()
    };

    page.push(list).into()
}

fn new_folder_form(app: &SmartScan) -> Element<Message> {
    let create = button("Create").padding(10);
    // Blank names are rejected by the collection too; this just greys the button
    let create = if app.new_folder_name.trim().is_empty() {
        create
    } else {
        create.on_press(Message::CreateFolder)
    };

    container(
        column![
            text("Create New Folder").size(18),
            text_input("Folder name", &app.new_folder_name)
                .on_input(Message::NewFolderNameChanged)
                .on_submit(Message::CreateFolder)
                .padding(10),
            row![
                button("Cancel")
                    .on_press(Message::ToggleNewFolder)
                    .style(button::secondary)
                    .padding(10),
                create,
            ]
            .spacing(8),
        ]
        .spacing(10),
    )
    .padding(16)
    .width(Length::Fill)
    .style(container::rounded_box)
    .into()
}

fn folder_row(folder: &FolderRecord) -> Element<Message> {
    container(
        row![
            text(&folder.name).size(16).width(Length::Fill),
            text(format!("{} files", folder.file_count)).size(13),
        ]
        .spacing(8)
        .align_y(Alignment::Center),
    )
    .padding(14)
    .width(Length::Fill)
    .style(container::rounded_box)
    .into()
}

fn empty_state(no_query: bool) -> Element<'static, Message> {
    let note = if no_query {
        "No folders yet. Create one to get started."
    } else {
        "No folders match your search."
    };

    container(text(note).size(14))
        .padding(24)
        .center_x(Length::Fill)
        .into()
}
