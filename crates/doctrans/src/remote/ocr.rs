use crate::error::OcrError;

/// Analyzer model used for plain text extraction.
pub const READ_MODEL_ID: &str = "prebuilt-read";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OcrPage {
    pub page_number: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundingRegion {
    pub page_number: u32,
}

/// A recognized paragraph with the pages it appears on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OcrParagraph {
    pub content: String,
    pub bounding_regions: Vec<BoundingRegion>,
}

/// Per-page, per-paragraph content structure returned by the analyzer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OcrAnalysis {
    pub pages: Vec<OcrPage>,
    pub paragraphs: Vec<OcrParagraph>,
}

impl OcrAnalysis {
    /// Concatenates the paragraphs whose bounding regions fall on a page.
    pub fn page_text(&self, page_number: u32) -> String {
        let mut text = String::new();
        for paragraph in &self.paragraphs {
            if paragraph
                .bounding_regions
                .iter()
                .any(|region| region.page_number == page_number)
            {
                text.push_str(&paragraph.content);
                text.push_str("\n\n");
            }
        }
        text
    }
}

/// Handle for an in-flight OCR analysis.
pub trait OcrPoller: Send {
    fn is_done(&mut self) -> Result<bool, OcrError>;

    /// Consumes the handle and yields the analysis. Only valid after
    /// `is_done` returned true.
    fn take_result(self: Box<Self>) -> Result<OcrAnalysis, OcrError>;
}

/// Remote OCR analyzer.
pub trait OcrAnalyzer: Send + Sync {
    fn begin_analyze(
        &self,
        document: &[u8],
        model_id: &str,
    ) -> Result<Box<dyn OcrPoller>, OcrError>;
}
