//! Paginated PDF export of a single analysis.
//!
//! Rendering runs in two steps. [`ReportRenderer::layout`] wraps and paginates the
//! sections into positioned lines and has no clock or I/O. The PDF writer then turns
//! that layout into bytes, adding the generation timestamp and page footers.

use chrono::{DateTime, Utc};
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, StringFormat, dictionary};
use serde::Serialize;

use crate::config::ReportConfig;
use crate::contract::AnalysisResult;
use crate::error::Result;

pub mod metrics;

pub use metrics::FontFace;
use metrics::encode_win_ansi;

pub const REPORT_TITLE: &str = "Stress Analysis Report";

const HEADING_SPACING: f32 = 1.8;
const SECTION_GAP_LINES: f32 = 0.5;
const FOOTER_SIZE_DELTA: f32 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportSection {
    InputText,
    AnalysisSummary,
    DetailedReasoning,
    Explanation,
    Suggestions,
}

impl ReportSection {
    pub fn title(&self) -> &'static str {
        match self {
            ReportSection::InputText => "Input Text",
            ReportSection::AnalysisSummary => "Analysis Summary",
            ReportSection::DetailedReasoning => "Detailed Reasoning",
            ReportSection::Explanation => "Explanation",
            ReportSection::Suggestions => "Suggestions",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStyle {
    Title,
    /// Label of the generation timestamp; the time itself is filled in when writing.
    Timestamp,
    Heading,
    Body,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlacedLine {
    pub text: String,
    pub style: LineStyle,
    /// Distance from the top edge of the page to the text baseline.
    pub baseline: f32,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReportPage {
    pub lines: Vec<PlacedLine>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportLayout {
    pub pages: Vec<ReportPage>,
    /// Every emitted section with the index of the page its title is on.
    pub sections: Vec<(ReportSection, usize)>,
}

impl ReportLayout {
    pub fn section_order(&self) -> Vec<ReportSection> {
        self.sections.iter().map(|(section, _)| *section).collect()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ReportRenderer {
    page: ReportConfig,
}

impl ReportRenderer {
    pub fn new(page: ReportConfig) -> Self {
        Self { page }
    }

    pub fn page_setup(&self) -> &ReportConfig {
        &self.page
    }

    /// Render the report stamped with the current time.
    pub fn render(&self, original_text: &str, result: &AnalysisResult) -> Result<Vec<u8>> {
        self.render_at(original_text, result, Utc::now())
    }

    /// Render the report with a fixed timestamp. Identical inputs give identical bytes.
    pub fn render_at(
        &self,
        original_text: &str,
        result: &AnalysisResult,
        generated_at: DateTime<Utc>,
    ) -> Result<Vec<u8>> {
        let layout = self.layout(original_text, result);
        let bytes = self.write_pdf(&layout, generated_at)?;
        tracing::debug!(
            pages = layout.pages.len(),
            sections = layout.sections.len(),
            bytes = bytes.len(),
            "report rendered"
        );
        Ok(bytes)
    }

    pub fn layout(&self, original_text: &str, result: &AnalysisResult) -> ReportLayout {
        let mut cursor = PageCursor::new(&self.page);
        cursor.place_header();

        let width = self.content_width();
        for (section, body) in section_bodies(original_text, result) {
            let lines = body
                .iter()
                .flat_map(|paragraph| {
                    wrap_text(paragraph, FontFace::Helvetica, self.page.body_size, width)
                })
                .collect::<Vec<_>>();
            cursor.place_section(section, &lines);
        }
        cursor.finish()
    }

    /// Horizontal space between the margins, in points.
    pub fn content_width(&self) -> f32 {
        self.page.page_width - 2.0 * self.page.margin
    }

    fn write_pdf(&self, layout: &ReportLayout, generated_at: DateTime<Utc>) -> Result<Vec<u8>> {
        let page = &self.page;
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let mut fonts = lopdf::Dictionary::new();
        for face in [FontFace::Helvetica, FontFace::HelveticaBold] {
            let font_id = doc.add_object(dictionary! {
                "Type" => "Font",
                "Subtype" => "Type1",
                "BaseFont" => face.base_font(),
                "Encoding" => "WinAnsiEncoding",
            });
            fonts.set(face.resource_name(), font_id);
        }
        let resources_id = doc.add_object(dictionary! {
            "Font" => fonts,
        });

        let stamp = format!("Generated: {}", generated_at.format("%Y-%m-%d %H:%M:%S UTC"));
        let total = layout.pages.len();
        let mut kids: Vec<Object> = Vec::with_capacity(total);

        for (idx, report_page) in layout.pages.iter().enumerate() {
            let mut operations = Vec::new();
            for line in &report_page.lines {
                let (font, size, text) = match line.style {
                    LineStyle::Title => (FontFace::HelveticaBold, page.title_size, line.text.as_str()),
                    LineStyle::Timestamp => (FontFace::Helvetica, page.body_size, stamp.as_str()),
                    LineStyle::Heading => {
                        (FontFace::HelveticaBold, page.heading_size, line.text.as_str())
                    }
                    LineStyle::Body => (FontFace::Helvetica, page.body_size, line.text.as_str()),
                };
                if text.is_empty() {
                    continue;
                }
                push_text(
                    &mut operations,
                    font,
                    size,
                    page.margin,
                    page.page_height - line.baseline,
                    text,
                );
            }

            let footer = format!("Page {} of {}", idx + 1, total);
            push_text(
                &mut operations,
                FontFace::Helvetica,
                page.body_size - FOOTER_SIZE_DELTA,
                page.margin,
                page.margin / 2.0,
                &footer,
            );

            let content = Content { operations };
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(page_id.into());
        }

        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => Object::Integer(total as i64),
            "Resources" => resources_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Real(page.page_width),
                Object::Real(page.page_height),
            ],
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages));

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let info_id = doc.add_object(dictionary! {
            "Title" => Object::string_literal(REPORT_TITLE),
            "Producer" => Object::string_literal(concat!("stress-lens ", env!("CARGO_PKG_VERSION"))),
            "CreationDate" => Object::string_literal(generated_at.format("D:%Y%m%d%H%M%SZ").to_string()),
        });
        doc.trailer.set("Info", info_id);

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer)?;
        Ok(buffer)
    }
}

/// Section bodies in report order. Suggestions are left out when there are none.
fn section_bodies(original_text: &str, result: &AnalysisResult) -> Vec<(ReportSection, Vec<String>)> {
    let reasoning = &result.reasoning;
    let mut sections = vec![
        (
            ReportSection::InputText,
            original_text.lines().map(str::to_string).collect(),
        ),
        (
            ReportSection::AnalysisSummary,
            vec![
                format!("Stress Level: {}", result.level.as_str().to_uppercase()),
                format!("Confidence: {}%", result.confidence),
            ],
        ),
        (
            ReportSection::DetailedReasoning,
            vec![
                format!("Negative Word Score: {}/100", reasoning.negative_word_score),
                format!("Emotional Tone: {} (-100 to 100)", reasoning.emotional_tone),
                format!(
                    "Cognitive Overload Index: {}/100",
                    reasoning.cognitive_overload_index
                ),
            ],
        ),
        (
            ReportSection::Explanation,
            result.explanation.lines().map(str::to_string).collect(),
        ),
    ];
    if !result.suggestions.is_empty() {
        sections.push((
            ReportSection::Suggestions,
            result
                .suggestions
                .iter()
                .enumerate()
                .map(|(i, s)| format!("{}. {}", i + 1, s))
                .collect(),
        ));
    }
    sections
}

/// Running vertical position while laying out pages.
struct PageCursor<'a> {
    page: &'a ReportConfig,
    pages: Vec<ReportPage>,
    sections: Vec<(ReportSection, usize)>,
    y: f32,
}

impl<'a> PageCursor<'a> {
    fn new(page: &'a ReportConfig) -> Self {
        Self {
            page,
            pages: vec![ReportPage::default()],
            sections: Vec::new(),
            y: page.margin,
        }
    }

    /// Lowest baseline allowed; the strip below it holds the footer.
    fn bottom(&self) -> f32 {
        self.page.page_height - self.page.margin - self.page.line_height
    }

    fn heading_advance(&self) -> f32 {
        self.page.heading_size * HEADING_SPACING
    }

    fn new_page(&mut self) {
        self.pages.push(ReportPage::default());
        self.y = self.page.margin;
    }

    fn place(&mut self, text: impl Into<String>, style: LineStyle) {
        let baseline = self.y;
        if let Some(current) = self.pages.last_mut() {
            current.lines.push(PlacedLine {
                text: text.into(),
                style,
                baseline,
            });
        }
    }

    fn place_header(&mut self) {
        self.y += self.page.title_size;
        self.place(REPORT_TITLE, LineStyle::Title);
        self.y += self.page.line_height;
        self.place("Generated:", LineStyle::Timestamp);
        self.y += self.page.line_height * SECTION_GAP_LINES;
    }

    fn place_section(&mut self, section: ReportSection, lines: &[String]) {
        // Keep the title together with its first body line.
        let first_line = if lines.is_empty() { 0.0 } else { self.page.line_height };
        if self.y + self.heading_advance() + first_line > self.bottom() {
            self.new_page();
        }
        self.y += self.heading_advance();
        self.place(section.title(), LineStyle::Heading);
        self.sections.push((section, self.pages.len() - 1));

        for line in lines {
            if self.y + self.page.line_height > self.bottom() {
                self.new_page();
            }
            self.y += self.page.line_height;
            self.place(line.as_str(), LineStyle::Body);
        }
        self.y += self.page.line_height * SECTION_GAP_LINES;
    }

    fn finish(self) -> ReportLayout {
        ReportLayout {
            pages: self.pages,
            sections: self.sections,
        }
    }
}

/// Greedy word wrap so each line measures at most `max_width` points in `face` at
/// `size`. Words wider than a line are split. A blank paragraph becomes one empty line.
pub fn wrap_text(paragraph: &str, face: FontFace, size: f32, max_width: f32) -> Vec<String> {
    let limit = (max_width * 1000.0 / size).floor().max(0.0) as u32;
    let space = face.char_units(' ');
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_units = 0;

    for mut word in paragraph.split_whitespace() {
        let mut word_units = face.str_units(word);
        while word_units > limit {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
                current_units = 0;
            }
            let (head, tail) = word.split_at(split_point(word, face, limit));
            lines.push(head.to_string());
            word = tail;
            word_units = face.str_units(word);
        }
        if word.is_empty() {
            continue;
        }

        if !current.is_empty() && current_units + space + word_units > limit {
            lines.push(std::mem::take(&mut current));
            current_units = 0;
        }
        if !current.is_empty() {
            current.push(' ');
            current_units += space;
        }
        current.push_str(word);
        current_units += word_units;
    }

    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

/// Byte offset just past the longest prefix of `word` that fits in `limit` units.
/// Always covers at least one character.
fn split_point(word: &str, face: FontFace, limit: u32) -> usize {
    let mut used = 0;
    let mut end = 0;
    for (idx, c) in word.char_indices() {
        let units = face.char_units(c);
        if end > 0 && used + units > limit {
            break;
        }
        used += units;
        end = idx + c.len_utf8();
    }
    end
}

fn push_text(
    operations: &mut Vec<Operation>,
    face: FontFace,
    size: f32,
    x: f32,
    y: f32,
    text: &str,
) {
    operations.push(Operation::new("BT", vec![]));
    operations.push(Operation::new("Tf", vec![face.resource_name().into(), size.into()]));
    operations.push(Operation::new("Td", vec![x.into(), y.into()]));
    operations.push(Operation::new(
        "Tj",
        vec![Object::String(encode_win_ansi(text), StringFormat::Literal)],
    ));
    operations.push(Operation::new("ET", vec![]));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::{ReasoningScores, StressLevel, StressfulKeyword};

    fn result(level: StressLevel, suggestions: Vec<&str>) -> AnalysisResult {
        AnalysisResult {
            level,
            confidence: 82,
            explanation: "Repeated mentions of deadlines and poor sleep.".into(),
            keywords: vec![StressfulKeyword::new("deadline", 8)],
            suggestions: suggestions.into_iter().map(String::from).collect(),
            reasoning: ReasoningScores {
                negative_word_score: 64,
                emotional_tone: -48,
                cognitive_overload_index: 77,
            },
        }
    }

    #[test]
    fn sections_follow_fixed_order() {
        let renderer = ReportRenderer::default();
        let layout = renderer.layout("text", &result(StressLevel::High, vec!["Rest", "Walk"]));
        assert_eq!(
            layout.section_order(),
            vec![
                ReportSection::InputText,
                ReportSection::AnalysisSummary,
                ReportSection::DetailedReasoning,
                ReportSection::Explanation,
                ReportSection::Suggestions,
            ]
        );
    }

    #[test]
    fn empty_suggestions_omit_the_section_even_when_high() {
        let renderer = ReportRenderer::default();
        let layout = renderer.layout("text", &result(StressLevel::High, vec![]));
        assert!(!layout.section_order().contains(&ReportSection::Suggestions));
        assert_eq!(layout.sections.len(), 4);
    }

    #[test]
    fn summary_and_reasoning_lines() {
        let renderer = ReportRenderer::default();
        let layout = renderer.layout("text", &result(StressLevel::Medium, vec![]));
        let body: Vec<&str> = layout.pages[0]
            .lines
            .iter()
            .filter(|l| l.style == LineStyle::Body)
            .map(|l| l.text.as_str())
            .collect();
        assert!(body.contains(&"Stress Level: MEDIUM"));
        assert!(body.contains(&"Confidence: 82%"));
        assert!(body.contains(&"Negative Word Score: 64/100"));
        assert!(body.contains(&"Emotional Tone: -48 (-100 to 100)"));
        assert!(body.contains(&"Cognitive Overload Index: 77/100"));
    }

    #[test]
    fn long_input_paginates_without_orphaned_titles() {
        let renderer = ReportRenderer::default();
        let text = "I have too much to do and not enough time. ".repeat(400);
        let layout = renderer.layout(&text, &result(StressLevel::High, vec!["Breathe"; 30]));
        assert!(layout.pages.len() > 2);

        let bottom = renderer.page.page_height - renderer.page.margin - renderer.page.line_height;
        for page in &layout.pages {
            for (idx, line) in page.lines.iter().enumerate() {
                assert!(line.baseline <= bottom + f32::EPSILON);
                if line.style == LineStyle::Heading {
                    let next = page.lines.get(idx + 1).expect("title must not end a page");
                    assert_eq!(next.style, LineStyle::Body);
                }
            }
        }
        // Titles appear exactly once each.
        let headings = layout
            .pages
            .iter()
            .flat_map(|p| p.lines.iter())
            .filter(|l| l.style == LineStyle::Heading)
            .count();
        assert_eq!(headings, 5);
    }

    #[test]
    fn layout_is_deterministic() {
        let renderer = ReportRenderer::default();
        let text = "Exams, rent, and a broken laptop.\n\nI can't sleep.";
        let r = result(StressLevel::High, vec!["Make a plan"]);
        assert_eq!(renderer.layout(text, &r), renderer.layout(text, &r));
    }

    #[test]
    fn wrap_measures_glyphs_and_splits_long_words() {
        // a and b are 556 units, c is 500, d is 556, space is 278.
        let lines = wrap_text("aaaa bbbb cccccccccccc dd", FontFace::Helvetica, 10.0, 23.0);
        assert_eq!(lines, vec!["aaaa", "bbbb", "cccc", "cccc", "cccc", "dd"]);
        for line in &lines {
            assert!(FontFace::Helvetica.measure(line, 10.0) <= 23.0);
        }
        assert_eq!(wrap_text("   ", FontFace::Helvetica, 10.0, 100.0), vec![String::new()]);
    }

    #[test]
    fn narrow_glyphs_pack_more_per_line_than_wide_ones() {
        let narrow = wrap_text(&"il ".repeat(60), FontFace::Helvetica, 11.0, 200.0);
        let wide = wrap_text(&"WM ".repeat(60), FontFace::Helvetica, 11.0, 200.0);
        assert!(narrow.len() < wide.len());
    }

    #[test]
    fn glyph_wider_than_the_line_still_makes_progress() {
        let lines = wrap_text("WWW", FontFace::Helvetica, 10.0, 5.0);
        assert_eq!(lines, vec!["W", "W", "W"]);
    }

    #[test]
    fn body_lines_fit_between_margins_for_wide_text() {
        let renderer = ReportRenderer::default();
        let inputs = [
            "I CAN'T TAKE THIS ANYMORE ".repeat(10),
            "W".repeat(300),
            "WWWW MMMM @@@@ ".repeat(30),
        ];
        let limit = renderer.content_width();
        for text in &inputs {
            let layout = renderer.layout(text, &result(StressLevel::High, vec!["BREATHE SLOWLY"; 3]));
            for line in layout.pages.iter().flat_map(|p| p.lines.iter()) {
                if line.style != LineStyle::Body {
                    continue;
                }
                let width = FontFace::Helvetica.measure(&line.text, renderer.page.body_size);
                assert!(width <= limit + 1e-3, "{width} > {limit}: {:?}", line.text);
            }
        }
    }
}
