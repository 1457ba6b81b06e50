/// Scan frame drawn over the camera preview
use iced::widget::canvas::{self, Path, Stroke};
use iced::{Color, Point, Rectangle, Size};

use crate::Message;

/// Corner guides framing where the document should sit
#[derive(Debug, Clone, Copy)]
pub struct ScanFrame {
    /// Fraction of the preview left clear on each side
    pub inset: f32,
    pub color: Color,
}

impl Default for ScanFrame {
    fn default() -> Self {
        Self {
            inset: 0.1,
            color: Color::from_rgba(1.0, 1.0, 1.0, 0.9),
        }
    }
}

impl ScanFrame {
    /// Rectangle the guides enclose, in canvas coordinates
    pub fn target(&self, size: Size) -> Rectangle {
        let dx = size.width * self.inset;
        let dy = size.height * self.inset;
        Rectangle::new(
            Point::new(dx, dy),
            Size::new(size.width - 2.0 * dx, size.height - 2.0 * dy),
        )
    }
}

impl canvas::Program<Message> for ScanFrame {
    type State = ();

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &iced::Renderer,
        _theme: &iced::Theme,
        bounds: Rectangle,
        _cursor: iced::mouse::Cursor,
    ) -> Vec<canvas::Geometry> {
        let mut frame = canvas::Frame::new(renderer, bounds.size());
        let target = self.target(bounds.size());

        if target.width <= 0.0 || target.height <= 0.0 {
            return vec![frame.into_geometry()];
        }

        let arm = target.width.min(target.height) * 0.15;
        let (left, top) = (target.x, target.y);
        let (right, bottom) = (target.x + target.width, target.y + target.height);

        // Each corner is an L: (corner, horizontal direction, vertical direction)
        let corners = [
            (Point::new(left, top), 1.0, 1.0),
            (Point::new(right, top), -1.0, 1.0),
            (Point::new(left, bottom), 1.0, -1.0),
            (Point::new(right, bottom), -1.0, -1.0),
        ];

        let mut builder = canvas::path::Builder::new();
        for (corner, h, v) in corners {
            builder.move_to(Point::new(corner.x + h * arm, corner.y));
            builder.line_to(corner);
            builder.line_to(Point::new(corner.x, corner.y + v * arm));
        }

        frame.stroke(
            &builder.build(),
            Stroke::default().with_color(self.color).with_width(3.0),
        );

        // Faint outline between the corners
        frame.stroke(
            &Path::rectangle(target.position(), target.size()),
            Stroke::default()
                .with_color(Color { a: 0.25, ..self.color })
                .with_width(1.0),
        );

        vec![frame.into_geometry()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_is_inset_on_every_side() {
        let target = ScanFrame::default().target(Size::new(400.0, 300.0));

        assert_eq!(target.x, 40.0);
        assert_eq!(target.y, 30.0);
        assert_eq!(target.width, 320.0);
        assert_eq!(target.height, 240.0);
    }

    #[test]
    fn test_zero_inset_covers_the_preview() {
        let frame = ScanFrame {
            inset: 0.0,
            ..ScanFrame::default()
        };
        let target = frame.target(Size::new(200.0, 100.0));
        assert_eq!(target, Rectangle::new(Point::ORIGIN, Size::new(200.0, 100.0)));
    }
}
