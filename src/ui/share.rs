use iced::widget::{button, column, container, row, text, text_input, Row};
use iced::{Alignment, Element, Length};
use iced_aw::Wrap;

use smart_scan::flows::FileSelection;

use crate::{Message, QuickTarget, SmartScan};

pub fn view(app: &SmartScan) -> Element<Message> {
    column![
        super::heading("Share Files", "Send documents to your team"),
        section("Select Files", file_selection(app)),
        section("Recipients", recipients(app)),
        section(
            "Message",
            text_input("Add a message (optional)", &app.share_message)
                .on_input(Message::ShareMessageChanged)
                .padding(10)
                .into(),
        ),
        send_button(app),
        section("Quick Share", quick_share()),
    ]
    .spacing(16)
    .into()
}

fn section<'a>(title: &'a str, body: Element<'a, Message>) -> Element<'a, Message> {
    container(column![text(title).size(18), body].spacing(10))
        .padding(16)
        .width(Length::Fill)
        .style(container::rounded_box)
        .into()
}

fn file_selection(app: &SmartScan) -> Element<Message> {
    let presets = FileSelection::ALL.iter().map(|&selection| {
        let style = if selection == app.selection {
            button::primary
        } else {
            button::secondary
        };
        button(text(selection.label()).size(14))
            .on_press(Message::SelectionChanged(selection))
            .style(style)
            .padding([8, 12])
            .into()
    });

    column![
        Row::with_children(presets).spacing(8),
        text(format!("{} files selected", app.selection.count())).size(13),
    ]
    .spacing(8)
    .into()
}

fn recipients(app: &SmartScan) -> Element<Message> {
    let chips: Vec<Element<Message>> = app
        .recipient_list
        .iter()
        .enumerate()
        .map(|(index, recipient)| {
            container(
                row![
                    text(recipient).size(13),
                    button(text("x").size(12))
                        .on_press(Message::RemoveRecipient(index))
                        .style(button::text)
                        .padding(2),
                ]
                .spacing(6)
                .align_y(Alignment::Center),
            )
            .padding([4, 10])
            .style(container::rounded_box)
            .into()
        })
        .collect();

    // Chips wrap onto new lines instead of overflowing the row
    let listed: Element<Message> = if chips.is_empty() {
        text("No recipients yet").size(13).into()
    } else {
        Wrap::with_elements(chips)
            .spacing(6.0)
            .line_spacing(6.0)
            .into()
    };

    column![
        listed,
        row![
            text_input("Employee email", &app.new_recipient)
                .on_input(Message::RecipientInputChanged)
                .on_submit(Message::AddRecipient)
                .padding(10),
            button("Add").on_press(Message::AddRecipient).padding(10),
        ]
        .spacing(8),
        button("Add Employee")
            .on_press(Message::FillSampleRecipient)
            .style(button::text),
    ]
    .spacing(10)
    .into()
}

fn send_button(app: &SmartScan) -> Element<Message> {
    let ready = app.selection.count() > 0 && !app.share.is_pending();
    let label = if app.share.is_pending() {
        "Sending..."
    } else {
        "Send Files"
    };

    let send = button(text(label).align_x(Alignment::Center))
        .width(Length::Fill)
        .padding(14);

    if ready {
        send.on_press(Message::SendFiles).into()
    } else {
        send.into()
    }
}

fn quick_share() -> Element<'static, Message> {
    let targets = QuickTarget::ALL.iter().map(|&target| {
        button(text(target.label()).align_x(Alignment::Center))
            .on_press(Message::QuickShare(target))
            .style(button::secondary)
            .width(Length::Fill)
            .padding(12)
            .into()
    });

    column![
        Row::with_children(targets).spacing(8),
        button("Copy Share Link")
            .on_press(Message::CopyShareLink)
            .style(button::text),
    ]
    .spacing(8)
    .into()
}
