//! Per-user PDF report.
//!
//! Report generation is split in two steps. [`build_report_layout`] decides what goes
//! where (pure, easy to test) and [`render_pdf`] draws that layout with `printpdf`.
//! Coordinates in the layout are millimetres measured from the top-left corner of an
//! A4 page; the renderer flips them into PDF space.

use crate::{
    config::ReportSettings,
    core::{
        directory::UserRecord,
        format::{format_currency, format_date, iso_date, or_not_available, slugify},
    },
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Line, Mm, PdfDocument, PdfLayerReference, Point, Rect,
    Rgb,
};
use tracing::{debug, instrument};

/// A4 width in millimetres
pub const PAGE_WIDTH_MM: f32 = 210.0;
/// A4 height in millimetres
pub const PAGE_HEIGHT_MM: f32 = 297.0;
/// Height of a single-line table row, header included
pub const ROW_HEIGHT_MM: f32 = 8.0;
/// Extra height added to a row for each wrapped line after the first
pub const LINE_HEIGHT_MM: f32 = 4.5;
/// Top of the financial table
pub const FINANCIAL_TABLE_TOP_MM: f32 = 105.0;
/// Assumed end of the previous table when no financial table was drawn
pub const FALLBACK_TABLE_END_MM: f32 = 150.0;
/// Maximum number of transactions listed in a report
pub const REPORT_TRANSACTION_LIMIT: usize = 10;

const LEFT_MARGIN_MM: f32 = 20.0;
const CELL_PADDING_MM: f32 = 2.0;
const TABLE_FONT_SIZE: f32 = 10.0;
const FINANCIAL_COLUMNS: [(&str, f32); 2] = [("Item", 85.0), ("Valor", 85.0)];
const TRANSACTION_COLUMNS: [(&str, f32); 4] = [
    ("Data", 28.0),
    ("Tipo", 24.0),
    ("Descrição", 83.0),
    ("Valor", 35.0),
];

/// A single line of free text on the page
#[derive(Clone, Debug, PartialEq)]
pub struct TextLine {
    /// Text content
    pub text: String,
    /// Distance from the left edge
    pub x: f32,
    /// Baseline distance from the top edge
    pub y: f32,
    /// Font size in points
    pub size: f32,
}

impl TextLine {
    fn new(text: impl Into<String>, y: f32, size: f32) -> Self {
        Self {
            text: text.into(),
            x: LEFT_MARGIN_MM,
            y,
            size,
        }
    }
}

/// A grid table with a shaded header row
#[derive(Clone, Debug, PartialEq)]
pub struct Table {
    /// Distance of the header's top edge from the top of the page
    pub top: f32,
    /// Column titles
    pub head: Vec<String>,
    /// Column widths in millimetres
    pub widths: Vec<f32>,
    /// Body cells, one vector per row
    pub rows: Vec<Vec<String>>,
}

impl Table {
    fn new<const N: usize>(top: f32, columns: [(&str, f32); N], rows: Vec<Vec<String>>) -> Self {
        Self {
            top,
            head: columns.iter().map(|(title, _)| (*title).to_string()).collect(),
            widths: columns.iter().map(|(_, width)| *width).collect(),
            rows,
        }
    }

    /// Body cells wrapped to their column widths: one vector of lines per cell.
    #[must_use]
    pub fn wrapped_rows(&self) -> Vec<Vec<Vec<String>>> {
        self.rows
            .iter()
            .map(|row| {
                row.iter()
                    .zip(&self.widths)
                    .map(|(cell, width)| wrap_cell(cell, *width))
                    .collect()
            })
            .collect()
    }

    /// Height of each body row, grown to fit its tallest wrapped cell.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn row_heights(&self) -> Vec<f32> {
        self.wrapped_rows()
            .iter()
            .map(|cells| {
                let lines = cells.iter().map(Vec::len).max().unwrap_or(1);
                LINE_HEIGHT_MM.mul_add(lines.saturating_sub(1) as f32, ROW_HEIGHT_MM)
            })
            .collect()
    }

    /// Distance of the table's bottom edge from the top of the page.
    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.top + ROW_HEIGHT_MM + self.row_heights().iter().sum::<f32>()
    }
}

/// Everything that ends up on the page
#[derive(Clone, Debug, PartialEq)]
pub struct ReportLayout {
    /// Document title stored in the PDF metadata
    pub title: String,
    /// Title, identity block and section headings
    pub lines: Vec<TextLine>,
    /// Financial summary, present only when the user has a snapshot
    pub financial_table: Option<Table>,
    /// Latest transactions, present only when the user has any
    pub transactions_table: Option<Table>,
}

/// A rendered report ready to be downloaded
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PdfReport {
    /// Suggested download name
    pub file_name: String,
    /// PDF document bytes
    pub bytes: Vec<u8>,
}

/// Download name of a user report: `<prefix>-<slug>-<YYYY-MM-DD>.pdf`.
#[must_use]
pub fn pdf_file_name(prefix: &str, name: Option<&str>, generated_at: &DateTime<Utc>) -> String {
    format!("{prefix}-{}-{}.pdf", slugify(name), iso_date(generated_at))
}

/// Decides the content and position of every element of a user's report.
///
/// Nested financial fields are only read when the snapshot exists. The transactions
/// section is placed below the financial table, or below the fallback position when
/// there is no financial table.
#[must_use]
pub fn build_report_layout(user: &UserRecord, settings: &ReportSettings) -> ReportLayout {
    let offset = settings.display_offset();
    let title = format!("{} - Relatório do Cliente", settings.brand);

    let identity = [
        format!("Cliente: {}", or_not_available(user.name.as_deref())),
        format!("E-mail: {}", or_not_available(user.email.as_deref())),
        format!("Telefone: {}", or_not_available(user.phone.as_deref())),
        format!("Data de Cadastro: {}", format_date(&user.created_at, &offset)),
        format!("Último Acesso: {}", format_date(&user.last_access_at, &offset)),
    ];

    let mut lines = vec![TextLine::new(title.clone(), 20.0, 20.0)];
    let mut y = 35.0;
    for text in identity {
        lines.push(TextLine::new(text, y, 12.0));
        y += 10.0;
    }

    let financial_table = user.financial_data.as_ref().map(|data| {
        lines.push(TextLine::new("Dados Financeiros", 95.0, 16.0));
        let rows = [
            ("Renda Mensal", data.monthly_income),
            ("Gastos Mensais", data.monthly_expenses),
            ("Total Livre", data.free_total()),
            ("Cartão de Crédito", data.credit_card_debt),
            ("Empréstimos", data.loan_debt),
            ("Cheque Especial", data.overdraft_debt),
        ]
        .into_iter()
        .map(|(label, amount)| vec![label.to_string(), format_currency(amount)])
        .collect();
        Table::new(FINANCIAL_TABLE_TOP_MM, FINANCIAL_COLUMNS, rows)
    });

    let transactions_table = (!user.transactions.is_empty()).then(|| {
        let last_end = financial_table
            .as_ref()
            .map_or(FALLBACK_TABLE_END_MM, Table::bottom);
        lines.push(TextLine::new("Transações", last_end + 20.0, 16.0));
        let rows = user
            .transactions
            .iter()
            .take(REPORT_TRANSACTION_LIMIT)
            .map(|tx| {
                vec![
                    format_date(&tx.date, &offset),
                    tx.kind.label().to_string(),
                    tx.description.clone(),
                    format_currency(tx.amount),
                ]
            })
            .collect();
        Table::new(last_end + 30.0, TRANSACTION_COLUMNS, rows)
    });

    ReportLayout {
        title,
        lines,
        financial_table,
        transactions_table,
    }
}

/// Draws a layout onto a single A4 page and returns the PDF bytes.
pub fn render_pdf(layout: &ReportLayout) -> Result<Vec<u8>> {
    let (doc, page, layer) = PdfDocument::new(
        layout.title.clone(),
        Mm(PAGE_WIDTH_MM),
        Mm(PAGE_HEIGHT_MM),
        "Relatório",
    );
    let canvas = doc.get_page(page).get_layer(layer);
    let regular = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(pdf_error)?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(pdf_error)?;

    canvas.set_fill_color(text_color());
    for (index, line) in layout.lines.iter().enumerate() {
        // The title is the only bold free-text line
        let font = if index == 0 { &bold } else { &regular };
        canvas.use_text(
            line.text.clone(),
            line.size,
            Mm(line.x),
            Mm(PAGE_HEIGHT_MM - line.y),
            font,
        );
    }

    for table in [&layout.financial_table, &layout.transactions_table]
        .into_iter()
        .flatten()
    {
        draw_table(&canvas, table, &regular, &bold);
    }

    doc.save_to_bytes().map_err(pdf_error)
}

/// Builds and renders the report of one user.
#[instrument(skip(user, settings), fields(user_id = user.id))]
pub fn generate_user_report(
    user: &UserRecord,
    generated_at: &DateTime<Utc>,
    settings: &ReportSettings,
) -> Result<PdfReport> {
    let layout = build_report_layout(user, settings);
    let bytes = render_pdf(&layout)?;
    debug!("Rendered user report ({} bytes)", bytes.len());

    Ok(PdfReport {
        file_name: pdf_file_name(&settings.pdf_prefix, user.name.as_deref(), generated_at),
        bytes,
    })
}

fn draw_table(
    canvas: &PdfLayerReference,
    table: &Table,
    regular: &IndirectFontRef,
    bold: &IndirectFontRef,
) {
    let width: f32 = table.widths.iter().sum();
    let left = LEFT_MARGIN_MM;
    let top = PAGE_HEIGHT_MM - table.top;
    let bottom = PAGE_HEIGHT_MM - table.bottom();

    // Header background (51, 65, 85)
    canvas.set_fill_color(Color::Rgb(Rgb::new(0.2, 0.255, 0.333, None)));
    canvas.add_rect(Rect::new(
        Mm(left),
        Mm(top - ROW_HEIGHT_MM),
        Mm(left + width),
        Mm(top),
    ));

    let head: Vec<Vec<String>> = table.head.iter().map(|title| vec![title.clone()]).collect();
    canvas.set_fill_color(Color::Rgb(Rgb::new(1.0, 1.0, 1.0, None)));
    draw_row(canvas, &head, &table.widths, top, bold);

    canvas.set_fill_color(text_color());
    let mut row_top = top - ROW_HEIGHT_MM;
    let mut edges = vec![top, row_top];
    for (cells, height) in table.wrapped_rows().iter().zip(table.row_heights()) {
        draw_row(canvas, cells, &table.widths, row_top, regular);
        row_top -= height;
        edges.push(row_top);
    }

    canvas.set_outline_color(Color::Rgb(Rgb::new(0.6, 0.6, 0.6, None)));
    canvas.set_outline_thickness(0.3);
    for y in edges {
        canvas.add_line(segment((left, y), (left + width, y)));
    }
    let mut x = left;
    canvas.add_line(segment((x, top), (x, bottom)));
    for column_width in &table.widths {
        x += column_width;
        canvas.add_line(segment((x, top), (x, bottom)));
    }
}

fn draw_row(
    canvas: &PdfLayerReference,
    cells: &[Vec<String>],
    widths: &[f32],
    row_top: f32,
    font: &IndirectFontRef,
) {
    let first_baseline = row_top - ROW_HEIGHT_MM + 2.5;
    let mut x = LEFT_MARGIN_MM;
    for (lines, width) in cells.iter().zip(widths) {
        for (index, line) in lines.iter().enumerate() {
            #[allow(clippy::cast_precision_loss)]
            let baseline = LINE_HEIGHT_MM.mul_add(-(index as f32), first_baseline);
            canvas.use_text(
                line.clone(),
                TABLE_FONT_SIZE,
                Mm(x + CELL_PADDING_MM),
                Mm(baseline),
                font,
            );
        }
        x += width;
    }
}

/// Number of characters that fit on one line of a column, using an average glyph
/// width of half an em.
// Cast safety: column widths are small positive numbers
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn chars_per_line(width_mm: f32) -> usize {
    const POINT_MM: f32 = 0.3528;
    let glyph_mm = TABLE_FONT_SIZE * 0.5 * POINT_MM;
    ((width_mm - 2.0 * CELL_PADDING_MM) / glyph_mm).floor().max(1.0) as usize
}

/// Breaks cell text into lines that fit the column. Words longer than a whole line
/// are split across lines; nothing is dropped.
#[must_use]
pub fn wrap_cell(text: &str, width_mm: f32) -> Vec<String> {
    let limit = chars_per_line(width_mm);
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let chars: Vec<char> = word.chars().collect();
        for piece in chars.chunks(limit) {
            if current_len > 0 && current_len + 1 + piece.len() > limit {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
            }
            if current_len > 0 {
                current.push(' ');
                current_len += 1;
            }
            current.extend(piece);
            current_len += piece.len();
        }
    }

    if current_len > 0 || lines.is_empty() {
        lines.push(current);
    }
    lines
}

fn segment(from: (f32, f32), to: (f32, f32)) -> Line {
    Line {
        points: vec![
            (Point::new(Mm(from.0), Mm(from.1)), false),
            (Point::new(Mm(to.0), Mm(to.1)), false),
        ],
        is_closed: false,
    }
}

fn text_color() -> Color {
    Color::Rgb(Rgb::new(0.0, 0.0, 0.0, None))
}

fn pdf_error(e: printpdf::Error) -> Error {
    Error::Report {
        message: format!("Failed to build PDF: {e}"),
    }
}
