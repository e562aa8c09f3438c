//! Order invoice: a fixed text template rendered to PDF.
//!
//! [`Invoice::from_order`] lays the document out as a list of lines and
//! [`Invoice::render_pdf`] streams them top to bottom onto A4 pages.

use model::entities::{order, order_item, prelude::*};
use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument};
use sea_orm::{DatabaseConnection, EntityTrait, ModelTrait, QueryOrder};
use tracing::{debug, instrument, trace};

use crate::error::{ComputeError, Result};
use crate::money;

const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
/// Roughly the 40pt margin of the printed invoices.
const MARGIN_MM: f32 = 14.0;
const PT_TO_MM: f32 = 0.3528;
/// Average Helvetica glyph width as a fraction of the font size.
const AVG_GLYPH_WIDTH: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceLine {
    pub text: String,
    pub font_size: f32,
    pub align: Align,
    pub bold: bool,
    /// Extra vertical gap above the line, in lines of its own size.
    pub gap_before: f32,
}

impl InvoiceLine {
    fn new(text: impl Into<String>, font_size: f32) -> Self {
        Self {
            text: text.into(),
            font_size,
            align: Align::Left,
            bold: false,
            gap_before: 0.0,
        }
    }

    fn aligned(mut self, align: Align) -> Self {
        self.align = align;
        self
    }

    fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    fn gap(mut self, lines: f32) -> Self {
        self.gap_before = lines;
        self
    }

    fn line_height_mm(&self) -> f32 {
        self.font_size * 1.2 * PT_TO_MM
    }

    fn height_mm(&self) -> f32 {
        self.line_height_mm() * (1.0 + self.gap_before)
    }

    fn x_mm(&self) -> f32 {
        let width = self.text.chars().count() as f32 * self.font_size * AVG_GLYPH_WIDTH * PT_TO_MM;
        let usable = PAGE_WIDTH_MM - 2.0 * MARGIN_MM;
        match self.align {
            Align::Left => MARGIN_MM,
            Align::Center => MARGIN_MM + ((usable - width) / 2.0).max(0.0),
            Align::Right => (PAGE_WIDTH_MM - MARGIN_MM - width).max(MARGIN_MM),
        }
    }
}

/// A laid-out invoice for one order.
#[derive(Debug, Clone, PartialEq)]
pub struct Invoice {
    order_id: i32,
    lines: Vec<InvoiceLine>,
}

impl Invoice {
    pub fn from_order(order: &order::Model, items: &[order_item::Model]) -> Self {
        let mut lines = vec![
            InvoiceLine::new("Facture / Commande", 20.0)
                .aligned(Align::Center)
                .bold(),
            InvoiceLine::new(format!("Commande: {}", order.id), 12.0).gap(1.0),
            InvoiceLine::new(
                format!("Date: {}", order.created_at.format("%d/%m/%Y %H:%M")),
                12.0,
            ),
            InvoiceLine::new(
                format!("Client: {} <{}>", order.customer_full_name, order.customer_email),
                12.0,
            ),
            InvoiceLine::new(format!("Téléphone: {}", order.phone), 12.0),
            InvoiceLine::new(format!("Adresse: {}", order.shipping_address), 12.0),
            InvoiceLine::new(format!("Statut: {}", order.status), 12.0),
            InvoiceLine::new("Articles:", 14.0).bold().gap(1.0),
        ];

        lines.extend(items.iter().enumerate().map(|(idx, item)| {
            let mut line = InvoiceLine::new(
                format!(
                    "{}. {} - Taille: {}, Couleur: {}, Qté: {}, Prix: {}",
                    idx + 1,
                    item.name,
                    item.size,
                    item.color,
                    item.quantity,
                    money::format_tnd(item.price)
                ),
                12.0,
            );
            if idx == 0 {
                line = line.gap(0.5);
            }
            line
        }));

        lines.push(
            InvoiceLine::new(format!("Total: {}", money::format_tnd(order.total_amount)), 14.0)
                .aligned(Align::Right)
                .bold()
                .gap(1.0),
        );

        Self {
            order_id: order.id,
            lines,
        }
    }

    pub fn lines(&self) -> &[InvoiceLine] {
        &self.lines
    }

    pub fn filename(&self) -> String {
        format!("order_{}.pdf", self.order_id)
    }

    /// Renders the invoice, starting a new page whenever the next line would
    /// cross the bottom margin.
    #[instrument(skip(self), fields(order_id = self.order_id, num_lines = self.lines.len()))]
    pub fn render_pdf(&self) -> Result<Vec<u8>> {
        trace!("Rendering invoice PDF");
        let (doc, page, layer) = PdfDocument::new(
            format!("Commande {}", self.order_id),
            Mm(PAGE_WIDTH_MM),
            Mm(PAGE_HEIGHT_MM),
            "Layer 1",
        );
        let regular = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| ComputeError::Pdf(format!("{e:?}")))?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| ComputeError::Pdf(format!("{e:?}")))?;

        let mut current_layer = doc.get_page(page).get_layer(layer);
        let mut cursor = PAGE_HEIGHT_MM - MARGIN_MM;
        let mut pages = 1;

        for line in &self.lines {
            if cursor - line.height_mm() < MARGIN_MM {
                let (page, layer) = doc.add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");
                current_layer = doc.get_page(page).get_layer(layer);
                cursor = PAGE_HEIGHT_MM - MARGIN_MM;
                pages += 1;
            }
            cursor -= line.height_mm();
            let font: &IndirectFontRef = if line.bold { &bold } else { &regular };
            current_layer.use_text(line.text.clone(), line.font_size, Mm(line.x_mm()), Mm(cursor), font);
        }

        let bytes = doc
            .save_to_bytes()
            .map_err(|e| ComputeError::Pdf(format!("{e:?}")))?;
        debug!("Rendered invoice: {} pages, {} bytes", pages, bytes.len());
        Ok(bytes)
    }
}

/// Loads an order with its lines and lays out its invoice.
/// Returns `None` when the order does not exist.
#[instrument(skip(db))]
pub async fn load_invoice(db: &DatabaseConnection, order_id: i32) -> Result<Option<Invoice>> {
    let Some(order) = Order::find_by_id(order_id).one(db).await? else {
        debug!("Order {} not found", order_id);
        return Ok(None);
    };
    let items = order
        .find_related(OrderItem)
        .order_by_asc(order_item::Column::Id)
        .all(db)
        .await?;
    Ok(Some(Invoice::from_order(&order, &items)))
}
