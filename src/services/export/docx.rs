//! DOCX 文档写入
//!
//! 将目录树和文件记录写成一个 Word 文档

use chrono::Utc;
use docx_rs::{BreakType, Docx, Paragraph, Run, RunFonts, Style, StyleType};
use std::fs::File;
use std::path::Path;
use tracing::info;

use super::types::FileRecord;
use super::ExportError;

const CODE_FONT: &str = "Consolas";
/// 9pt，单位为半磅
const CODE_FONT_SIZE: usize = 18;

/// DOCX 导出器
pub struct DocxExporter<'a> {
    source: &'a Path,
    tree: &'a str,
    records: &'a [FileRecord],
}

impl<'a> DocxExporter<'a> {
    pub fn new(source: &'a Path, tree: &'a str, records: &'a [FileRecord]) -> Self {
        Self {
            source,
            tree,
            records,
        }
    }

    /// 构建文档
    pub fn build(&self) -> Docx {
        let mut docx = Docx::new()
            .add_style(heading_style(1, 32))
            .add_style(heading_style(2, 28))
            .add_style(heading_style(3, 24))
            .add_paragraph(heading("Project Documentation Export", 1))
            .add_paragraph(text_paragraph(&format!("Source path: {}", self.source.display())))
            .add_paragraph(text_paragraph(&format!(
                "Generated at: {} UTC",
                Utc::now().format("%Y-%m-%dT%H:%M:%S%.6f")
            )))
            .add_paragraph(heading("Folder Structure", 2))
            .add_paragraph(code_block(self.tree))
            .add_paragraph(Paragraph::new().add_run(Run::new().add_break(BreakType::Page)))
            .add_paragraph(heading("File Contents", 2));

        for record in self.records {
            docx = docx
                .add_paragraph(heading(&record.path, 3))
                .add_paragraph(text_paragraph(&format!(
                    "Size: {} bytes | Modified: {}",
                    record.size, record.modified
                )))
                .add_paragraph(code_block(&record.content));
        }

        docx
    }

    /// 写入文件
    pub fn write_to(&self, output: &Path) -> Result<(), ExportError> {
        let file = File::create(output).map_err(|e| ExportError::Io(output.to_path_buf(), e))?;
        self.build()
            .build()
            .pack(file)
            .map_err(|e| ExportError::Pack(e.to_string()))?;

        info!(
            "DOCX written: {} ({} files)",
            output.display(),
            self.records.len()
        );
        Ok(())
    }
}

fn heading_style(level: u8, size: usize) -> Style {
    Style::new(format!("Heading{}", level), StyleType::Paragraph)
        .name(format!("Heading {}", level))
        .size(size)
        .bold()
}

fn heading(text: &str, level: u8) -> Paragraph {
    Paragraph::new()
        .style(&format!("Heading{}", level))
        .add_run(Run::new().add_text(sanitize_xml_text(text)))
}

fn text_paragraph(text: &str) -> Paragraph {
    Paragraph::new().add_run(Run::new().add_text(sanitize_xml_text(text)))
}

/// 等宽字体代码块，每行之间插入换行
fn code_block(text: &str) -> Paragraph {
    let mut run = Run::new()
        .fonts(
            RunFonts::new()
                .ascii(CODE_FONT)
                .hi_ansi(CODE_FONT)
                .cs(CODE_FONT),
        )
        .size(CODE_FONT_SIZE);

    for (index, line) in sanitize_xml_text(text).split('\n').enumerate() {
        if index > 0 {
            run = run.add_break(BreakType::TextWrapping);
        }
        if !line.is_empty() {
            run = run.add_text(line);
        }
    }

    Paragraph::new().add_run(run)
}

/// 去掉 XML 1.0 不允许的字符，统一换行为 `\n`
pub fn sanitize_xml_text(text: &str) -> String {
    text.replace("\r\n", "\n")
        .chars()
        .filter(|&c| match c {
            '\t' | '\n' => true,
            '\u{FFFE}' | '\u{FFFF}' => false,
            c => c >= ' ',
        })
        .collect()
}
