// SPDX-License-Identifier: MIT
//
// Markup output: buffering and minimal-diff span/anchor emission.
//
// Two components work together:
//
//   OutputBuffer: accumulates markup bytes for one input character (or one
//   completed escape sequence) so the converter hands the sink whole tags,
//   never half of one.
//
//   MarkupWriter: remembers the last emitted style and anchor and only
//   writes tags on change. A run of characters in the same style costs one
//   `<span …>` and one `</span>` no matter how many SGR sequences re-state
//   that style in between.
//
// Nesting is always anchor outside, span inside:
//
//   <a href="…" class="ansi-link"><span style="…">text</span></a>
//
// so any anchor transition with a span open closes the span first and
// reopens it afterwards.
//
// How a style turns into attributes is the one thing that differs between
// inline and class rendering. That lives behind `StyleMarkup`; everything
// else here is shared.

use std::collections::BTreeMap;
use std::io::{self, Write};

use tint_color::Rgb;

use crate::attr::Attr;
use crate::style::{Paint, ResolvedStyle};

// ─── OutputBuffer ────────────────────────────────────────────────────────────

/// A byte buffer drained into the caller's sink after each completed unit.
pub struct OutputBuffer {
    buf: Vec<u8>,
}

const DEFAULT_CAPACITY: usize = 256;

impl OutputBuffer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            buf: Vec::with_capacity(DEFAULT_CAPACITY),
        }
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// The accumulated bytes (for testing and debugging).
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    #[inline]
    pub fn push_str(&mut self, s: &str) {
        self.buf.extend_from_slice(s.as_bytes());
    }

    #[inline]
    pub fn push_char(&mut self, ch: char) {
        let mut enc = [0u8; 4];
        self.buf.extend_from_slice(ch.encode_utf8(&mut enc).as_bytes());
    }

    /// Clear the buffer for reuse (keeps allocated capacity).
    #[inline]
    pub fn clear(&mut self) {
        self.buf.clear();
    }

    /// Move accumulated output into `w` without flushing it.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to `w` fails.
    pub fn drain_to(&mut self, w: &mut impl Write) -> io::Result<()> {
        if !self.buf.is_empty() {
            w.write_all(&self.buf)?;
            self.buf.clear();
        }
        Ok(())
    }

    /// Move accumulated output into `w` and flush it.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to or flushing `w` fails.
    pub fn flush_to(&mut self, w: &mut impl Write) -> io::Result<()> {
        self.drain_to(w)?;
        w.flush()
    }
}

impl Write for OutputBuffer {
    #[inline]
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        // Real flushing goes through flush_to().
        Ok(())
    }
}

impl Default for OutputBuffer {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Escaping ────────────────────────────────────────────────────────────────

/// Entity for a reserved markup character.
#[inline]
const fn entity(ch: char) -> Option<&'static str> {
    match ch {
        '<' => Some("&lt;"),
        '>' => Some("&gt;"),
        '&' => Some("&amp;"),
        '"' => Some("&quot;"),
        '\'' => Some("&apos;"),
        _ => None,
    }
}

fn push_escaped_char(out: &mut OutputBuffer, ch: char, escape: bool) {
    match entity(ch).filter(|_| escape) {
        Some(e) => out.push_str(e),
        None => out.push_char(ch),
    }
}

fn push_escaped(out: &mut OutputBuffer, s: &str, escape: bool) {
    if escape {
        s.chars().for_each(|ch| push_escaped_char(out, ch, true));
    } else {
        out.push_str(s);
    }
}

// ─── Span Tags ───────────────────────────────────────────────────────────────

/// Attributes of one `<span>` open tag.
///
/// Properties are keyed in a `BTreeMap` so the `style` attribute always
/// comes out sorted by property name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpanTag {
    pub classes: Vec<String>,
    pub props: BTreeMap<&'static str, String>,
}

impl SpanTag {
    /// `<span class="…" style="k:v;k:v">`, omitting empty attributes.
    pub fn write_to(&self, out: &mut OutputBuffer) {
        out.push_str("<span");
        if !self.classes.is_empty() {
            out.push_str(" class=\"");
            // Class names carry the configured prefix; escaped regardless of
            // the text escaping setting.
            push_escaped(out, &self.classes.join(" "), true);
            out.push_str("\"");
        }
        if !self.props.is_empty() {
            let style = self
                .props
                .iter()
                .map(|(k, v)| format!("{k}:{v}"))
                .collect::<Vec<_>>()
                .join(";");
            out.push_str(" style=\"");
            out.push_str(&style);
            out.push_str("\"");
        }
        out.push_str(">");
    }
}

/// The style-to-markup capability: inline CSS or CSS classes.
pub trait StyleMarkup {
    /// Tag attributes for a non-empty style.
    fn span_tag(&self, style: &ResolvedStyle) -> SpanTag;
}

fn paint_css(paint: &Paint) -> Option<String> {
    match paint {
        Paint::None => None,
        Paint::Rgb(rgb) => Some(rgb.css()),
        Paint::Token(token) => Some(token.clone()),
    }
}

/// Everything as `style="…"` properties.
#[derive(Debug, Clone, Default)]
pub struct InlineStyles {
    /// Theme foreground, used to fade dim text that has a background but
    /// no foreground of its own.
    default_fg: Option<Rgb>,
}

impl InlineStyles {
    #[must_use]
    pub const fn new(default_fg: Option<Rgb>) -> Self {
        Self { default_fg }
    }
}

impl StyleMarkup for InlineStyles {
    fn span_tag(&self, style: &ResolvedStyle) -> SpanTag {
        let mut props = BTreeMap::new();
        let fg = paint_css(&style.fg);
        let bg = paint_css(&style.bg);
        if let Some(fg) = &fg {
            props.insert("color", fg.clone());
        }
        if let Some(bg) = &bg {
            props.insert("background-color", bg.clone());
        }
        if style.attrs.contains(Attr::BOLD) {
            props.insert("font-weight", "bold".to_owned());
        }
        if style.attrs.contains(Attr::ITALIC) {
            props.insert("font-style", "italic".to_owned());
        }
        let decorations: Vec<&str> = [(Attr::UNDERLINE, "underline"), (Attr::STRIKE, "line-through")]
            .into_iter()
            .filter(|(attr, _)| style.attrs.contains(*attr))
            .map(|(_, value)| value)
            .collect();
        if !decorations.is_empty() {
            props.insert("text-decoration", decorations.join(" "));
        }

        if style.attrs.contains(Attr::HIDDEN) {
            props.insert("opacity", "0".to_owned());
        } else if style.attrs.contains(Attr::DIM) {
            // Opacity would fade the background too; with one, fade the
            // text color through its alpha channel instead.
            match (&fg, &bg) {
                (_, None) => {
                    props.insert("opacity", "0.5".to_owned());
                }
                (Some(fg), Some(_)) => {
                    props.insert("color", format!("{fg}80"));
                }
                (None, Some(_)) => {
                    if let Some(default_fg) = self.default_fg {
                        props.insert("color", format!("{}80", default_fg.css()));
                    }
                }
            }
        }

        SpanTag {
            classes: Vec::new(),
            props,
        }
    }
}

/// Indexed colors and flags as prefixed class names.
///
/// True colors have no class; they fall back to inline properties.
#[derive(Debug, Clone)]
pub struct CssClasses {
    prefix: String,
}

impl CssClasses {
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

/// Flag classes in emission order.
const FLAG_CLASSES: [(Attr, &str); 6] = [
    (Attr::BOLD, "bold"),
    (Attr::UNDERLINE, "underline"),
    (Attr::STRIKE, "strike"),
    (Attr::ITALIC, "italic"),
    (Attr::DIM, "dim"),
    (Attr::HIDDEN, "hidden"),
];

impl StyleMarkup for CssClasses {
    fn span_tag(&self, style: &ResolvedStyle) -> SpanTag {
        let mut tag = SpanTag::default();
        let p = &self.prefix;
        for (paint, role, prop) in [(&style.fg, "fg", "color"), (&style.bg, "bg", "background-color")] {
            match paint {
                Paint::None => {}
                Paint::Token(token) => tag.classes.push(format!("{p}{role}-{token}")),
                Paint::Rgb(rgb) => {
                    tag.props.insert(prop, rgb.css());
                }
            }
        }
        for (attr, name) in FLAG_CLASSES {
            if style.attrs.contains(attr) {
                tag.classes.push(format!("{p}{name}"));
            }
        }
        tag
    }
}

// ─── Anchor ──────────────────────────────────────────────────────────────────

/// An OSC 8 hyperlink target.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Anchor {
    pub url: String,
    /// Extra attributes such as `id`, emitted sorted by key.
    pub params: BTreeMap<String, String>,
}

impl Anchor {
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            params: BTreeMap::new(),
        }
    }

    /// `<a href="…" class="<prefix>link" k="v"…>`.
    fn write_open(&self, out: &mut OutputBuffer, class_prefix: &str, escape: bool) {
        out.push_str("<a href=\"");
        push_escaped(out, &self.url, escape);
        out.push_str("\" class=\"");
        push_escaped(out, class_prefix, true);
        out.push_str("link\"");
        for (k, v) in &self.params {
            out.push_str(" ");
            push_escaped(out, k, escape);
            out.push_str("=\"");
            push_escaped(out, v, escape);
            out.push_str("\"");
        }
        out.push_str(">");
    }
}

// ─── MarkupWriter ────────────────────────────────────────────────────────────

/// Stateful emitter that skips redundant tags.
pub struct MarkupWriter {
    markup: Box<dyn StyleMarkup + Send>,
    class_prefix: String,
    escape_html: bool,
    prev_style: ResolvedStyle,
    prev_anchor: Option<Anchor>,
    span_open: bool,
    anchor_open: bool,
}

impl MarkupWriter {
    #[must_use]
    pub fn new(
        markup: Box<dyn StyleMarkup + Send>,
        class_prefix: impl Into<String>,
        escape_html: bool,
    ) -> Self {
        Self {
            markup,
            class_prefix: class_prefix.into(),
            escape_html,
            prev_style: ResolvedStyle::default(),
            prev_anchor: None,
            span_open: false,
            anchor_open: false,
        }
    }

    #[inline]
    #[must_use]
    pub const fn span_open(&self) -> bool {
        self.span_open
    }

    #[inline]
    #[must_use]
    pub const fn anchor_open(&self) -> bool {
        self.anchor_open
    }

    #[inline]
    #[must_use]
    pub const fn anchor(&self) -> Option<&Anchor> {
        self.prev_anchor.as_ref()
    }

    /// Emit one text character.
    ///
    /// `style` is `Some` when the attribute state may have changed since the
    /// previous character; the span is only touched if it actually differs.
    pub fn write_char(&mut self, out: &mut OutputBuffer, style: Option<ResolvedStyle>, ch: char) {
        if let Some(style) = style.filter(|s| *s != self.prev_style) {
            if self.span_open {
                out.push_str("</span>");
            }
            self.span_open = !style.is_empty();
            self.prev_style = style;
            if self.span_open {
                self.open_span(out);
            }
        }
        push_escaped_char(out, ch, self.escape_html);
    }

    /// Apply an OSC 8 transition: `Some` opens (or replaces) the anchor,
    /// `None` closes it.
    pub fn set_anchor(&mut self, out: &mut OutputBuffer, anchor: Option<Anchor>) {
        if anchor.is_none() && !self.anchor_open {
            return;
        }
        let reopen = self.span_open;
        if reopen {
            out.push_str("</span>");
        }
        if self.anchor_open {
            out.push_str("</a>");
        }
        match &anchor {
            Some(a) => {
                log::debug!("anchor -> {}", a.url);
                a.write_open(out, &self.class_prefix, self.escape_html);
            }
            None => log::debug!("anchor closed"),
        }
        self.anchor_open = anchor.is_some();
        self.prev_anchor = anchor;
        if reopen {
            self.open_span(out);
        }
    }

    /// Close whatever is open, span first. The writer is then back at "nothing
    /// emitted", so a later character reopens its span.
    pub fn finish(&mut self, out: &mut OutputBuffer) {
        if self.span_open {
            out.push_str("</span>");
        }
        if self.anchor_open {
            out.push_str("</a>");
        }
        self.clear_emitted();
    }

    /// Forget all emission state without writing anything.
    pub fn reset(&mut self) {
        self.clear_emitted();
    }

    fn clear_emitted(&mut self) {
        self.prev_style = ResolvedStyle::default();
        self.prev_anchor = None;
        self.span_open = false;
        self.anchor_open = false;
    }

    fn open_span(&self, out: &mut OutputBuffer) {
        self.markup.span_tag(&self.prev_style).write_to(out);
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn text(out: &OutputBuffer) -> &str {
        std::str::from_utf8(out.as_bytes()).unwrap()
    }

    fn styled(fg: Option<u32>, bg: Option<u32>, attrs: Attr) -> ResolvedStyle {
        ResolvedStyle {
            fg: Paint::from(fg.map(Rgb::from_packed)),
            bg: Paint::from(bg.map(Rgb::from_packed)),
            attrs,
        }
    }

    fn inline_tag(style: &ResolvedStyle) -> String {
        let mut out = OutputBuffer::new();
        InlineStyles::new(None).span_tag(style).write_to(&mut out);
        text(&out).to_owned()
    }

    #[test]
    fn output_buffer_drain_and_flush() {
        let mut out = OutputBuffer::new();
        out.push_str("<b>");
        out.push_char('é');
        let mut sink = Vec::new();
        out.drain_to(&mut sink).unwrap();
        assert!(out.is_empty());
        assert_eq!(sink, "<b>é".as_bytes());
        out.flush_to(&mut sink).unwrap();
        assert_eq!(sink.len(), 5);
    }

    #[test]
    fn output_buffer_write_trait() {
        let mut out = OutputBuffer::default();
        write!(out, "{}", 42).unwrap();
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn inline_props_are_sorted() {
        let style = styled(Some(0xe05561), None, Attr::STRIKE);
        assert_eq!(
            inline_tag(&style),
            r#"<span style="color:#e05561;text-decoration:line-through">"#
        );
    }

    #[test]
    fn inline_every_flag() {
        let style = styled(
            Some(0x010203),
            Some(0x040506),
            Attr::BOLD | Attr::ITALIC | Attr::UNDERLINE | Attr::STRIKE,
        );
        assert_eq!(
            inline_tag(&style),
            concat!(
                r#"<span style="background-color:#040506;color:#010203;font-style:italic;"#,
                r#"font-weight:bold;text-decoration:underline line-through">"#
            )
        );
    }

    #[test]
    fn inline_hidden_wins_over_dim() {
        let style = styled(None, Some(0x4f5666), Attr::ITALIC | Attr::HIDDEN | Attr::DIM);
        assert_eq!(
            inline_tag(&style),
            r#"<span style="background-color:#4f5666;font-style:italic;opacity:0">"#
        );
    }

    #[test]
    fn inline_dim_variants() {
        assert_eq!(inline_tag(&styled(None, None, Attr::DIM)), r#"<span style="opacity:0.5">"#);
        assert_eq!(
            inline_tag(&styled(Some(0x4aa5f0), None, Attr::DIM)),
            r#"<span style="color:#4aa5f0;opacity:0.5">"#
        );
        assert_eq!(
            inline_tag(&styled(Some(0x4aa5f0), Some(0x4aa5f0), Attr::DIM)),
            r#"<span style="background-color:#4aa5f0;color:#4aa5f080">"#
        );
        // Background only, no theme foreground: nothing to fade.
        assert_eq!(
            inline_tag(&styled(None, Some(0x4aa5f0), Attr::DIM)),
            r#"<span style="background-color:#4aa5f0">"#
        );
    }

    #[test]
    fn inline_dim_falls_back_to_theme_foreground() {
        let mut out = OutputBuffer::new();
        let markup = InlineStyles::new(Some(Rgb::new(0xee, 0xee, 0xee)));
        markup
            .span_tag(&styled(None, Some(0xe05561), Attr::DIM))
            .write_to(&mut out);
        assert_eq!(
            text(&out),
            r#"<span style="background-color:#e05561;color:#eeeeee80">"#
        );
    }

    #[test]
    fn class_order_and_truecolor_fallback() {
        let markup = CssClasses::new("ansi-");
        let style = ResolvedStyle {
            fg: Paint::Token("inverse".into()),
            bg: Paint::Token("inverse".into()),
            attrs: Attr::all().difference(Attr::INVERSE),
        };
        assert_eq!(
            markup.span_tag(&style).classes,
            [
                "ansi-fg-inverse",
                "ansi-bg-inverse",
                "ansi-bold",
                "ansi-underline",
                "ansi-strike",
                "ansi-italic",
                "ansi-dim",
                "ansi-hidden"
            ]
        );

        let mut out = OutputBuffer::new();
        markup
            .span_tag(&styled(Some(0x020202), Some(0xfff067), Attr::DIM))
            .write_to(&mut out);
        assert_eq!(
            text(&out),
            r#"<span class="ansi-dim" style="background-color:#fff067;color:#020202">"#
        );
    }

    #[test]
    fn escaping() {
        let mut out = OutputBuffer::new();
        for ch in "<a href='x'>&\"".chars() {
            push_escaped_char(&mut out, ch, true);
        }
        assert_eq!(text(&out), "&lt;a href=&apos;x&apos;&gt;&amp;&quot;");
        out.clear();
        push_escaped(&mut out, "<raw>", false);
        assert_eq!(text(&out), "<raw>");
    }

    fn writer() -> MarkupWriter {
        MarkupWriter::new(Box::new(InlineStyles::new(None)), "ansi-", true)
    }

    #[test]
    fn same_style_opens_one_span() {
        let mut w = writer();
        let mut out = OutputBuffer::new();
        let red = styled(Some(0xe05561), None, Attr::empty());
        w.write_char(&mut out, Some(red.clone()), 'a');
        w.write_char(&mut out, Some(red), 'b');
        w.write_char(&mut out, None, 'c');
        w.finish(&mut out);
        assert_eq!(text(&out), r#"<span style="color:#e05561">abc</span>"#);
    }

    #[test]
    fn empty_style_closes_without_reopening() {
        let mut w = writer();
        let mut out = OutputBuffer::new();
        w.write_char(&mut out, Some(styled(Some(0x3f4451), None, Attr::empty())), 'a');
        w.write_char(&mut out, Some(ResolvedStyle::default()), 'b');
        assert!(!w.span_open());
        w.finish(&mut out);
        assert_eq!(text(&out), r#"<span style="color:#3f4451">a</span>b"#);
    }

    #[test]
    fn anchor_wraps_open_span() {
        let mut w = writer();
        let mut out = OutputBuffer::new();
        let red = styled(Some(0xe05561), None, Attr::empty());
        w.write_char(&mut out, Some(red), 'x');
        w.set_anchor(&mut out, Some(Anchor::new("http://example.com")));
        w.write_char(&mut out, None, 'y');
        w.set_anchor(&mut out, None);
        w.write_char(&mut out, Some(ResolvedStyle::default()), 'z');
        w.finish(&mut out);
        assert_eq!(
            text(&out),
            concat!(
                r#"<span style="color:#e05561">x</span>"#,
                r#"<a href="http://example.com" class="ansi-link"><span style="color:#e05561">y</span></a>"#,
                r#"<span style="color:#e05561"></span>z"#
            )
        );
    }

    #[test]
    fn next_anchor_replaces_current() {
        let mut w = writer();
        let mut out = OutputBuffer::new();
        w.set_anchor(&mut out, Some(Anchor::new("a")));
        let mut next = Anchor::new("b");
        next.params.insert("rel".into(), "noopener".into());
        next.params.insert("id".into(), "x".into());
        w.set_anchor(&mut out, Some(next.clone()));
        assert_eq!(w.anchor(), Some(&next));
        w.finish(&mut out);
        assert_eq!(
            text(&out),
            r#"<a href="a" class="ansi-link"></a><a href="b" class="ansi-link" id="x" rel="noopener"></a>"#
        );
    }

    #[test]
    fn closing_without_anchor_is_a_noop() {
        let mut w = writer();
        let mut out = OutputBuffer::new();
        w.write_char(&mut out, Some(styled(Some(1), None, Attr::empty())), 'a');
        w.set_anchor(&mut out, None);
        assert_eq!(text(&out), r#"<span style="color:#000001">a"#);
    }

    #[test]
    fn anchor_attributes_are_escaped() {
        let mut w = writer();
        let mut out = OutputBuffer::new();
        let mut anchor = Anchor::new("http://e/?a=1&b=\"2\"");
        anchor.params.insert("title".into(), "<x>".into());
        w.set_anchor(&mut out, Some(anchor));
        assert_eq!(
            text(&out),
            r#"<a href="http://e/?a=1&amp;b=&quot;2&quot;" class="ansi-link" title="&lt;x&gt;">"#
        );
    }

    #[test]
    fn class_prefix_is_escaped_even_without_text_escaping() {
        let prefix = "x\"><b ";
        let mut w = MarkupWriter::new(Box::new(CssClasses::new(prefix)), prefix, false);
        let mut out = OutputBuffer::new();
        w.set_anchor(&mut out, Some(Anchor::new("u")));
        let bold = ResolvedStyle {
            attrs: Attr::BOLD,
            ..ResolvedStyle::default()
        };
        w.write_char(&mut out, Some(bold), '<');
        w.finish(&mut out);
        assert_eq!(
            text(&out),
            concat!(
                r#"<a href="u" class="x&quot;&gt;&lt;b link">"#,
                r#"<span class="x&quot;&gt;&lt;b bold"><</span></a>"#
            )
        );
    }

    #[test]
    fn finish_closes_span_before_anchor() {
        let mut w = writer();
        let mut out = OutputBuffer::new();
        w.set_anchor(&mut out, Some(Anchor::new("u")));
        w.write_char(&mut out, Some(styled(None, None, Attr::BOLD)), 'a');
        out.clear();
        w.finish(&mut out);
        assert_eq!(text(&out), "</span></a>");
        assert!(!w.span_open() && !w.anchor_open());
    }
}
