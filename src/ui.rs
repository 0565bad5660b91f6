use crate::app::App;
use crate::format::{format_number, format_status};
use crate::scale::{Axis, TickStyle, to_row};
use crate::window::RollingWindow;
use ratatui::{
    Frame,
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    symbols::line,
    widgets::{Clear, Widget},
};

/// Columns reserved left of the plot for axis labels.
pub const LEFT_MARGIN: u16 = 8;

/// Rows reserved below the plot.
pub const BOTTOM_MARGIN: u16 = 2;

/// Maximum width of an axis label.
const LABEL_WIDTH: usize = 7;

const STATUS_PREFIX: &str = "Last value: ";

/// Terminal size and the plot dimensions derived from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    pub width: u16,
    pub height: u16,
}

impl Geometry {
    pub fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }

    pub fn graph_width(&self) -> u16 {
        self.width.saturating_sub(LEFT_MARGIN)
    }

    pub fn graph_height(&self) -> u16 {
        self.height.saturating_sub(BOTTOM_MARGIN)
    }

    /// Number of bars that fit between the left and right border.
    pub fn capacity(&self) -> usize {
        usize::from(self.graph_width().saturating_sub(2))
    }

    /// Whether there is room for at least one plot cell inside the border.
    pub fn is_drawable(&self) -> bool {
        self.width >= LEFT_MARGIN + 3 && self.height >= BOTTOM_MARGIN + 3
    }
}

impl From<Rect> for Geometry {
    fn from(area: Rect) -> Self {
        Self::new(area.width, area.height)
    }
}

/// Renders the chart over the whole frame.
pub fn render(frame: &mut Frame, app: &App) {
    frame.render_widget(app.chart(), frame.area());
}

/// One frame of the bar chart: border, status line, bars and axis labels.
pub struct StreamChart<'a> {
    samples: &'a RollingWindow,
    last: Option<f64>,
    tick_style: TickStyle,
}

impl<'a> StreamChart<'a> {
    pub fn new(samples: &'a RollingWindow, last: Option<f64>, tick_style: TickStyle) -> Self {
        Self {
            samples,
            last,
            tick_style,
        }
    }
}

impl Widget for StreamChart<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Clear.render(area, buf);

        let geometry = Geometry::from(area);
        if !geometry.is_drawable() {
            return;
        }

        let mut grid = Grid { area, buf };
        draw_border(&mut grid, geometry);

        if let Some(last) = self.last {
            let status = format!("{STATUS_PREFIX}{}", format_status(last));
            grid.text(LEFT_MARGIN + 1, 0, &status);
        }

        let graph_height = geometry.graph_height();
        let Some(axis) = Axis::compute(self.samples.values(), graph_height, self.tick_style) else {
            return;
        };

        let bar = Style::default().add_modifier(Modifier::REVERSED);
        let right_border = geometry.width - 1;
        for (x, value) in (LEFT_MARGIN + 1..right_border).zip(self.samples.iter()) {
            let top = to_row(axis.scale.row_of(value, graph_height));
            for y in top..graph_height {
                grid.put(x, y, " ", bar);
            }
        }

        for tick in &axis.ticks {
            grid.text(0, tick.row, &format_number(tick.value, LABEL_WIDTH));
        }
    }
}

/// Frame around the plot area, right of the label margin.
fn draw_border(grid: &mut Grid<'_>, geometry: Geometry) {
    let right = geometry.width - 1;
    let bottom = geometry.graph_height();
    let inner_width = geometry.width - LEFT_MARGIN - 2;
    let inner_height = bottom - 1;

    grid.hline(LEFT_MARGIN + 1, 0, inner_width);
    grid.hline(LEFT_MARGIN + 1, bottom, inner_width);
    grid.vline(LEFT_MARGIN, 1, inner_height);
    grid.vline(right, 1, inner_height);

    let plain = Style::default();
    grid.put(LEFT_MARGIN, 0, line::TOP_LEFT, plain);
    grid.put(right, 0, line::TOP_RIGHT, plain);
    grid.put(LEFT_MARGIN, bottom, line::BOTTOM_LEFT, plain);
    grid.put(right, bottom, line::BOTTOM_RIGHT, plain);
}

/// Cell writer in coordinates relative to `area`, clipping anything outside.
struct Grid<'a> {
    area: Rect,
    buf: &'a mut Buffer,
}

impl Grid<'_> {
    fn put(&mut self, x: u16, y: u16, symbol: &str, style: Style) {
        if x >= self.area.width || y >= self.area.height {
            return;
        }
        if let Some(cell) = self.buf.cell_mut((self.area.x + x, self.area.y + y)) {
            cell.set_symbol(symbol).set_style(style);
        }
    }

    fn text(&mut self, x: u16, y: u16, s: &str) {
        if x >= self.area.width || y >= self.area.height {
            return;
        }
        let max_width = usize::from(self.area.width - x);
        self.buf.set_stringn(
            self.area.x + x,
            self.area.y + y,
            s,
            max_width,
            Style::default(),
        );
    }

    fn hline(&mut self, x: u16, y: u16, len: u16) {
        for dx in 0..len {
            self.put(x + dx, y, line::HORIZONTAL, Style::default());
        }
    }

    fn vline(&mut self, x: u16, y: u16, len: u16) {
        for dy in 0..len {
            self.put(x, y + dy, line::VERTICAL, Style::default());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window_of(values: &[f64], capacity: usize) -> RollingWindow {
        let mut window = RollingWindow::new(capacity);
        for v in values {
            window.push(*v);
        }
        window
    }

    fn draw(values: &[f64], width: u16, height: u16) -> Buffer {
        let geometry = Geometry::new(width, height);
        let window = window_of(values, geometry.capacity());
        let mut buf = Buffer::empty(Rect::new(0, 0, width, height));
        StreamChart::new(&window, values.last().copied(), TickStyle::Even)
            .render(buf.area, &mut buf);
        buf
    }

    fn text_at(buf: &Buffer, x: u16, y: u16, len: u16) -> String {
        (x..x + len).map(|x| buf[(x, y)].symbol()).collect()
    }

    fn row_text(buf: &Buffer, y: u16) -> String {
        text_at(buf, 0, y, buf.area.width)
    }

    fn label(buf: &Buffer, y: u16) -> String {
        text_at(buf, 0, y, 7).trim().to_string()
    }

    fn is_bar(buf: &Buffer, x: u16, y: u16) -> bool {
        buf[(x, y)].symbol() == " " && buf[(x, y)].modifier.contains(Modifier::REVERSED)
    }

    #[test]
    fn test_geometry() {
        let geometry = Geometry::new(80, 24);
        assert_eq!(geometry.graph_width(), 72);
        assert_eq!(geometry.graph_height(), 22);
        assert_eq!(geometry.capacity(), 70);
        assert!(geometry.is_drawable());

        assert_eq!(Geometry::new(5, 1).capacity(), 0);
        assert!(!Geometry::new(10, 24).is_drawable());
        assert!(!Geometry::new(80, 4).is_drawable());
    }

    #[test]
    fn test_border_without_samples() {
        let buf = draw(&[], 30, 12);

        assert_eq!(buf[(8, 0)].symbol(), line::TOP_LEFT);
        assert_eq!(buf[(29, 0)].symbol(), line::TOP_RIGHT);
        assert_eq!(buf[(8, 10)].symbol(), line::BOTTOM_LEFT);
        assert_eq!(buf[(29, 10)].symbol(), line::BOTTOM_RIGHT);
        assert_eq!(buf[(9, 0)].symbol(), line::HORIZONTAL);
        assert_eq!(buf[(28, 10)].symbol(), line::HORIZONTAL);
        assert_eq!(buf[(8, 1)].symbol(), line::VERTICAL);
        assert_eq!(buf[(29, 9)].symbol(), line::VERTICAL);

        // Nothing in the label margin or below the frame
        assert_eq!(row_text(&buf, 11).trim(), "");
        assert_eq!(text_at(&buf, 0, 5, 8).trim(), "");
    }

    #[test]
    fn test_status_line() {
        let buf = draw(&[1.0, 2.5], 40, 12);
        let status = text_at(&buf, 9, 0, 21);

        assert_eq!(status, format!("Last value: {:>9}", "2.5"));
        assert_eq!(buf[(30, 0)].symbol(), line::HORIZONTAL);
    }

    #[test]
    fn test_bars_grow_upward() {
        let buf = draw(&[1.0, 2.0, 3.0], 40, 12);

        // Rows 1..=9 are inside the frame; min maps to 9, max to 1.
        assert!(is_bar(&buf, 9, 9));
        assert!(!is_bar(&buf, 9, 8));

        assert!(is_bar(&buf, 10, 5));
        assert!(is_bar(&buf, 10, 9));
        assert!(!is_bar(&buf, 10, 4));

        for y in 1..=9 {
            assert!(is_bar(&buf, 11, y));
        }
        assert!(!is_bar(&buf, 12, 5));
        assert_eq!(buf[(11, 10)].symbol(), line::HORIZONTAL);
    }

    #[test]
    fn test_axis_labels() {
        let buf = draw(&[1.0, 2.0, 3.0], 40, 12);

        assert_eq!(label(&buf, 1), "3");
        assert_eq!(label(&buf, 9), "1");
    }

    #[test]
    fn test_flat_samples_sit_mid_plot() {
        let buf = draw(&[5.0, 5.0, 5.0], 40, 24);

        for x in 9..12 {
            assert!(is_bar(&buf, x, 11));
            assert!(is_bar(&buf, x, 21));
            assert!(!is_bar(&buf, x, 10));
        }
        assert_eq!(label(&buf, 1), "6");
        assert_eq!(label(&buf, 21), "4");
    }

    #[test]
    fn test_extreme_samples_stay_inside_border() {
        let buf = draw(&[1e308, -1e308], 30, 12);

        assert_eq!(text_at(&buf, 9, 0, 11), "Last value:");
        assert!(!is_bar(&buf, 9, 0));
        assert!(is_bar(&buf, 9, 1));
        assert!(is_bar(&buf, 10, 9));
        assert!(!is_bar(&buf, 10, 8));

        assert_eq!(label(&buf, 1), "1E+308");
        assert_eq!(label(&buf, 9), "-1E+308");
    }

    #[test]
    fn test_full_window_stays_inside_border() {
        let values: Vec<f64> = (0..100).map(f64::from).collect();
        let buf = draw(&values, 30, 12);

        assert!(is_bar(&buf, 28, 1));
        assert_eq!(buf[(29, 1)].symbol(), line::VERTICAL);
    }

    #[test]
    fn test_render_into_offset_area() {
        let window = window_of(&[1.0, 2.0], 20);
        let mut buf = Buffer::empty(Rect::new(0, 0, 50, 20));
        let area = Rect::new(2, 1, 30, 12);
        StreamChart::new(&window, Some(2.0), TickStyle::Even).render(area, &mut buf);

        assert_eq!(buf[(10, 1)].symbol(), line::TOP_LEFT);
        assert_eq!(buf[(10, 11)].symbol(), line::BOTTOM_LEFT);
        assert!(is_bar(&buf, 12, 2));
        assert_eq!(buf[(0, 0)].symbol(), " ");
    }

    #[test]
    fn test_too_small_only_clears() {
        let window = window_of(&[1.0], 1);
        let mut buf = Buffer::empty(Rect::new(0, 0, 10, 4));
        buf.set_string(0, 0, "stale", Style::default());
        StreamChart::new(&window, Some(1.0), TickStyle::Even).render(buf.area, &mut buf);

        for y in 0..4 {
            assert_eq!(row_text(&buf, y).trim(), "");
        }
    }

    #[test]
    fn test_nice_tick_labels() {
        let window = window_of(&[0.0, 100.0], 30);
        let mut buf = Buffer::empty(Rect::new(0, 0, 40, 24));
        StreamChart::new(&window, Some(100.0), TickStyle::Nice).render(buf.area, &mut buf);

        assert_eq!(label(&buf, 1), "100");
        assert_eq!(label(&buf, 11), "50");
        assert_eq!(label(&buf, 21), "0");
    }
}
