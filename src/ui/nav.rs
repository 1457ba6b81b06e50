use iced::widget::{button, container, text, Row};
use iced::{Alignment, Element, Length};

use smart_scan::state::Tab;

use crate::Message;

/// Bottom navigation bar with one button per tab
pub fn view(active: Tab) -> Element<'static, Message> {
    let buttons = Tab::ALL.iter().map(|&tab| {
        let style = if tab == active {
            button::primary
        } else {
            button::text
        };

        button(text(tab.label()).size(13).align_x(Alignment::Center))
            .on_press(Message::TabSelected(tab))
            .style(style)
            .width(Length::Fill)
            .padding([10, 4])
            .into()
    });

    container(Row::with_children(buttons).spacing(4))
        .padding(8)
        .width(Length::Fill)
        .style(container::rounded_box)
        .into()
}
