use iced::widget::{button, column, container, text};
use iced::{Alignment, Element, Length};

use crate::Message;

/// First-run introduction screen
pub fn view() -> Element<'static, Message> {
    let content = column![
        text("Smart Scan").size(48),
        text("Scan, organize and share your documents").size(16),
        column![
            text("Capture documents with your camera"),
            text("Keep scans in folders"),
            text("Share files with your team"),
            text("Upload to SuiteDash projects"),
        ]
        .spacing(8),
        button("Get Started")
            .on_press(Message::IntroductionCompleted)
            .padding(12),
    ]
    .spacing(28)
    .padding(40)
    .align_x(Alignment::Center);

    container(content)
        .width(Length::Fill)
        .height(Length::Fill)
        .center_x(Length::Fill)
        .center_y(Length::Fill)
        .into()
}
