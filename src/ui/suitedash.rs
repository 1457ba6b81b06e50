use iced::widget::{button, column, container, progress_bar, row, text, text_input, Column};
use iced::{Alignment, Element, Length};

use smart_scan::flows::{Connection, PROJECTS};

use crate::{Message, SmartScan};

pub fn view(app: &SmartScan) -> Element<Message> {
    let body = match app.suitedash.connection() {
        Some(connection) => connected(app, connection),
        None => connect_form(app),
    };

    column![
        super::heading("SuiteDash", "Upload scans to your SuiteDash projects"),
        body,
    ]
    .spacing(20)
    .into()
}

fn connect_form(app: &SmartScan) -> Element<Message> {
    let connecting = app.suitedash.is_connecting();
    let connect = button(text(if connecting { "Connecting..." } else { "Connect" }).align_x(Alignment::Center))
        .width(Length::Fill)
        .padding(12);
    let connect: Element<Message> = if connecting {
        row![
            connect,
            button("Cancel")
                .on_press(Message::CancelConnect)
                .style(button::secondary)
                .padding(12),
        ]
        .spacing(8)
        .into()
    } else {
        connect.on_press(Message::Connect).into()
    };

    container(
        column![
            text("Connect your account").size(18),
            text_input("API key", &app.api_key)
                .on_input(Message::ApiKeyChanged)
                .secure(true)
                .padding(10),
            text_input("Company URL (yourcompany.suitedash.com)", &app.company_url)
                .on_input(Message::CompanyUrlChanged)
                .on_submit(Message::Connect)
                .padding(10),
            connect,
        ]
        .spacing(12),
    )
    .padding(16)
    .width(Length::Fill)
    .style(container::rounded_box)
    .into()
}

fn connected(app: &SmartScan, connection: Connection) -> Element<Message> {
    let account = container(
        row![
            column![
                text("Connected").size(18),
                text(connection.company_url).size(13),
            ]
            .spacing(4)
            .width(Length::Fill),
            button("Disconnect")
                .on_press(Message::Disconnect)
                .style(button::secondary)
                .padding(10),
        ]
        .align_y(Alignment::Center),
    )
    .padding(16)
    .width(Length::Fill)
    .style(container::rounded_box);

    let projects = Column::with_children(PROJECTS.iter().map(|project| {
        let style = if app.selected_project == Some(project.id) {
            button::primary
        } else {
            button::secondary
        };
        button(
            row![
                text(project.name).width(Length::Fill),
                text(format!("{} files", project.file_count)).size(13),
            ]
            .align_y(Alignment::Center),
        )
        .on_press(Message::ProjectSelected(project.id))
        .style(style)
        .width(Length::Fill)
        .padding(12)
        .into()
    }))
    .spacing(8);

    column![
        account,
        text("Projects").size(18),
        projects,
        upload_panel(app),
    ]
    .spacing(12)
    .into()
}

fn upload_panel(app: &SmartScan) -> Element<Message> {
    if app.suitedash.is_uploading() {
        return column![
            text(format!("Uploading... {}%", app.upload_progress)).size(14),
            progress_bar(0.0..=100.0, f32::from(app.upload_progress)).height(10),
            button("Cancel Upload")
                .on_press(Message::CancelUpload)
                .style(button::secondary)
                .padding(10),
        ]
        .spacing(8)
        .into();
    }

    let label = match app.selected_project_name() {
        Some(name) => format!("Upload {} files to {}", app.files.len(), name),
        None => "Select a project to upload".to_string(),
    };
    let upload = button(text(label).align_x(Alignment::Center))
        .width(Length::Fill)
        .padding(14);

    if app.selected_project.is_some() {
        upload.on_press(Message::Upload).into()
    } else {
        upload.into()
    }
}
