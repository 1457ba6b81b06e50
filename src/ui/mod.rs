/// User interface module
///
/// One view per tab, the bottom navigation bar, the first-run splash and
/// the scan-frame overlay drawn over the camera preview.

pub mod files;
pub mod folders;
pub mod nav;
pub mod overlay;
pub mod scan;
pub mod share;
pub mod splash;
pub mod suitedash;

use iced::widget::{column, container, scrollable, text, Column};
use iced::{Element, Length};

use smart_scan::state::{FileKind, Tab};

use crate::{Message, SmartScan};

/// Active tab view, status line and navigation bar
pub fn shell(app: &SmartScan) -> Element<Message> {
    let content = match app.router.active() {
        Tab::Scan => scan::view(app),
        Tab::Folders => folders::view(app),
        Tab::Files => files::view(app),
        Tab::Share => share::view(app),
        Tab::SuiteDash => suitedash::view(app),
    };

    let mut page: Column<Message> = column![scrollable(container(content).padding(16)).height(Length::Fill)];

    if !app.status.is_empty() {
        page = page.push(container(text(&app.status).size(14)).padding([6, 16]));
    }

    page.push(nav::view(app.router.active())).into()
}

/// Screen title with a subtitle underneath
pub fn heading<'a>(title: &'a str, subtitle: &'a str) -> Element<'a, Message> {
    column![text(title).size(26), text(subtitle).size(14)]
        .spacing(4)
        .into()
}

/// Short badge shown next to a file
pub fn kind_badge(kind: FileKind) -> &'static str {
    match kind {
        FileKind::Pdf => "PDF",
        FileKind::Image => "IMG",
        FileKind::Other => "DOC",
    }
}
