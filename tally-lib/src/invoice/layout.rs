//! Where every piece of text goes on the invoice page.
//!
//! Coordinates are in points with the origin at the top left corner of the page, the way the
//! page is designed. [`TextRun::baseline`] converts to the bottom-up PDF coordinate space.

use chrono::NaiveDateTime;

use crate::{
    invoice::metrics::bold_text_width,
    job::{JobRecord, format_money},
};

pub const PAGE_WIDTH: f32 = 612.0;
pub const PAGE_HEIGHT: f32 = 792.0;
pub const MARGIN: f32 = 40.0;
pub const LINE_HEIGHT: f32 = 24.0;

const TITLE_Y: f32 = 40.0;
const HEADER_Y: f32 = TITLE_Y + 40.0;
const FIRST_ROW_Y: f32 = HEADER_Y + 30.0;
const TOTAL_GAP: f32 = 10.0;

/// x offsets of the title, date and amount columns
pub const COLUMNS: [f32; 3] = [40.0, 250.0, 450.0];
const HEADINGS: [&str; 3] = ["Job Title", "Posted Date", "Amount"];

const TITLE_SIZE: f32 = 24.0;
const HEADER_SIZE: f32 = 16.0;
const ROW_SIZE: f32 = 14.0;
const TOTAL_SIZE: f32 = 18.0;

/// Helvetica's ascender, as a fraction of the font size
const ASCENT: f32 = 0.718;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Slot for the optional logo, anchored to the top right corner.
pub const LOGO: Rect = Rect {
    x: PAGE_WIDTH - 140.0,
    y: 20.0,
    width: 100.0,
    height: 40.0,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Weight {
    Regular,
    Bold,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub text: String,
    pub x: f32,
    /// Top of the line box
    pub y: f32,
    pub size: f32,
    pub weight: Weight,
}

impl TextRun {
    fn new(text: impl Into<String>, x: f32, y: f32, size: f32, weight: Weight) -> Self {
        Self {
            text: text.into(),
            x,
            y,
            size,
            weight,
        }
    }

    /// Baseline of this run measured up from the bottom of the page.
    pub fn baseline(&self) -> f32 {
        PAGE_HEIGHT - self.y - self.size * ASCENT
    }
}

/// The text of a monthly invoice page, laid out.
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceLayout {
    pub title: TextRun,
    pub header: [TextRun; 3],
    pub rows: Vec<[TextRun; 3]>,
    pub total: TextRun,
}

impl InvoiceLayout {
    /// Lay out `jobs` in the order given. Rows that don't fit the page are still laid out,
    /// below its bottom edge.
    pub fn new(month: &str, jobs: &[JobRecord], currency: &str) -> Self {
        let title = TextRun::new(
            format!("Invoice \u{2013} {month}"),
            MARGIN,
            TITLE_Y,
            TITLE_SIZE,
            Weight::Bold,
        );

        let [title_x, date_x, amount_x] = COLUMNS;
        let [title_heading, date_heading, amount_heading] = HEADINGS;
        let heading =
            |text: &str, x: f32| TextRun::new(text, x, HEADER_Y, HEADER_SIZE, Weight::Bold);
        let header = [
            heading(title_heading, title_x),
            heading(date_heading, date_x),
            heading(amount_heading, amount_x),
        ];

        let mut y = FIRST_ROW_Y;
        let mut rows = Vec::with_capacity(jobs.len());
        for job in jobs {
            rows.push([
                TextRun::new(job.title.as_str(), title_x, y, ROW_SIZE, Weight::Regular),
                TextRun::new(
                    format_invoice_date(job.invoice_date()),
                    date_x,
                    y,
                    ROW_SIZE,
                    Weight::Regular,
                ),
                TextRun::new(
                    format_money(currency, job.amount),
                    amount_x,
                    y,
                    ROW_SIZE,
                    Weight::Regular,
                ),
            ]);
            y += LINE_HEIGHT;
        }

        let sum: f64 = jobs.iter().map(|job| job.amount).sum();
        let total_text = format!("Total: {}", format_money(currency, sum));
        let total_x = PAGE_WIDTH - bold_text_width(&total_text, TOTAL_SIZE) - MARGIN;
        let total = TextRun::new(total_text, total_x, y + TOTAL_GAP, TOTAL_SIZE, Weight::Bold);

        Self {
            title,
            header,
            rows,
            total,
        }
    }

    /// Every run on the page, top to bottom.
    pub fn runs(&self) -> impl Iterator<Item = &TextRun> {
        std::iter::once(&self.title)
            .chain(self.header.iter())
            .chain(self.rows.iter().flatten())
            .chain(std::iter::once(&self.total))
    }
}

/// Medium date followed by short time, e.g. `Mar 21, 2025 at 3:04 PM`.
pub fn format_invoice_date(date: NaiveDateTime) -> String {
    date.format("%b %-d, %Y at %-I:%M %p").to_string()
}

#[cfg(test)]
mod test {
    use crate::job::test::{date, record};

    use super::*;

    #[test]
    fn test_empty_invoice() {
        let layout = InvoiceLayout::new("Mar 2025", &[], "$");

        assert_eq!(layout.title.text, "Invoice \u{2013} Mar 2025");
        assert_eq!(
            layout.header.each_ref().map(|r| r.text.as_str()),
            ["Job Title", "Posted Date", "Amount"]
        );
        assert!(layout.rows.is_empty());
        assert_eq!(layout.total.text, "Total: $0.00");
        assert_eq!(layout.runs().count(), 5);
    }

    #[test]
    fn test_rows() {
        let mut posted = record(1, date(2025, 3, 1));
        posted.title = "Posted".into();
        posted.completed_date = Some(date(2025, 3, 5));
        posted.posted_date = date(2025, 3, 21).and_hms_opt(15, 4, 0);
        posted.amount = 100.0;

        let mut completed = record(2, date(2025, 3, 1));
        completed.completed_date = Some(date(2025, 3, 9));
        completed.amount = 50.25;

        let open = record(3, date(2025, 3, 12));

        let layout = InvoiceLayout::new("Mar 2025", &[posted, completed, open], "$");

        let texts: Vec<[&str; 3]> = layout
            .rows
            .iter()
            .map(|row| row.each_ref().map(|r| r.text.as_str()))
            .collect();
        assert_eq!(
            texts,
            vec![
                ["Posted", "Mar 21, 2025 at 3:04 PM", "$100.00"],
                ["Job 2", "Mar 9, 2025 at 12:00 AM", "$50.25"],
                ["Job 3", "Mar 12, 2025 at 12:00 AM", "$40.00"],
            ]
        );

        let ys: Vec<f32> = layout.rows.iter().map(|[title, _, _]| title.y).collect();
        assert_eq!(ys, vec![110.0, 134.0, 158.0]);
        assert_eq!(layout.total.y, 192.0);
        assert_eq!(layout.total.text, "Total: $190.25");
    }

    #[test]
    fn test_total_right_aligned() {
        let layout = InvoiceLayout::new("Mar 2025", &[record(1, date(2025, 3, 1))], "$");

        let right_edge =
            layout.total.x + bold_text_width(&layout.total.text, layout.total.size);
        assert!((right_edge - (PAGE_WIDTH - MARGIN)).abs() < 1e-3);
    }

    #[test]
    fn test_overflow_is_not_paginated() {
        let jobs: Vec<JobRecord> = (0..40).map(|i| record(i, date(2025, 3, 1))).collect();

        let layout = InvoiceLayout::new("Mar 2025", &jobs, "$");

        assert_eq!(layout.rows.len(), 40);
        assert!(layout.total.y > PAGE_HEIGHT);
    }

    #[test]
    fn test_baseline() {
        let run = TextRun::new("x", 0.0, 0.0, 10.0, Weight::Regular);

        assert!((run.baseline() - (PAGE_HEIGHT - 7.18)).abs() < 1e-3);
    }
}
