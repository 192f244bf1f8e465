use crate::analyze::IssuesAnalyzed;
use crate::report::chart::ChartRenderer;
use crate::report::sections::report_sections;
use crate::report::Block;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use markdown_builder::{Image, List, ListItem, Markdown};

pub trait MarkdownReport {
    fn report_create(&self, charts: &dyn ChartRenderer) -> String;
}

impl MarkdownReport for IssuesAnalyzed {
    fn report_create(&self, charts: &dyn ChartRenderer) -> String {
        let mut doc = Markdown::new();
        for section in report_sections() {
            for block in section.build(self, charts) {
                doc.add_block(block);
            }
        }
        doc.render()
    }
}

trait MarkdownExt {
    fn add_block(&mut self, block: Block);
}

impl MarkdownExt for Markdown {
    fn add_block(&mut self, block: Block) {
        match block {
            Block::Heading(1, text) => {
                self.header1(text);
            }
            Block::Heading(2, text) => {
                self.header2(text);
            }
            Block::Heading(_, text) => {
                self.header3(text);
            }
            Block::Paragraph(text) => {
                self.paragraph(text);
            }
            Block::Bullets(items) if items.is_empty() => {}
            Block::Bullets(items) => {
                self.list(List::unordered_with(
                    items.into_iter().map(ListItem::from).collect(),
                ));
            }
            Block::Image { alt, png } => {
                self.image(Image::from(png_data_uri(&png), alt, false));
            }
            Block::Rule => {
                self.paragraph("---");
            }
        }
    }
}

pub fn png_data_uri(png: &[u8]) -> String {
    format!("data:image/png;base64,{}", STANDARD.encode(png))
}
