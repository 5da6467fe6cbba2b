// src/page.rs

use anyhow::{anyhow, bail, Context, Result};
use regex::Regex;
use scraper::{Html, Selector};
use std::path::Path;
use tracing::{debug, instrument};

use crate::render::{header_cells_html, row_html, Cell, Row, TableTarget};

/// An existing element in the page that receives appended children.
#[derive(Debug, Clone)]
struct Container {
    id: String,
    /// Byte offset of the element's closing tag in the page source.
    close_at: usize,
    appended: String,
}

/// An HTML page template holding the header-row and body containers.
///
/// Appended cells and rows are inserted right before each container's
/// closing tag; whatever the template already holds stays in place.
#[derive(Debug, Clone)]
pub struct Page {
    source: String,
    header: Container,
    body: Container,
}

impl Page {
    /// Read a page template from disk.
    #[instrument(level = "debug", skip_all, fields(path = %path.as_ref().display()))]
    pub fn load(path: impl AsRef<Path>, header_id: &str, body_id: &str) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("reading page template {}", path.display()))?;
        Self::parse(source, header_id, body_id)
            .with_context(|| format!("loading page template {}", path.display()))
    }

    /// Locate both containers in `source`.
    pub fn parse(source: impl Into<String>, header_id: &str, body_id: &str) -> Result<Self> {
        let source = source.into();
        let doc = Html::parse_document(&source);
        let header = locate(&doc, &source, header_id)?;
        let body = locate(&doc, &source, body_id)?;
        debug!(
            header = %header.id,
            header_close = header.close_at,
            body = %body.id,
            body_close = body.close_at,
            "located containers"
        );
        Ok(Self {
            source,
            header,
            body,
        })
    }

    /// The page with every appended child in place.
    pub fn to_html(&self) -> String {
        let mut inserts = [&self.header, &self.body];
        // insert back to front so earlier offsets stay valid
        inserts.sort_by(|a, b| b.close_at.cmp(&a.close_at));

        let mut out = self.source.clone();
        for c in inserts {
            out.insert_str(c.close_at, &c.appended);
        }
        out
    }
}

impl TableTarget for Page {
    fn append_header_cell(&mut self, cell: Cell) {
        self.header
            .appended
            .push_str(&header_cells_html(std::slice::from_ref(&cell)));
    }

    fn append_row(&mut self, row: Row) {
        self.body.appended.push_str(&row_html(&row));
    }
}

/// Elements whose contents are raw text: tags inside them are not markup.
const RAW_TEXT: &[&str] = &["script", "style", "textarea", "title", "xmp", "noembed", "noframes"];

fn locate(doc: &Html, source: &str, id: &str) -> Result<Container> {
    let selector = Selector::parse(&format!("#{}", id))
        .map_err(|e| anyhow!("invalid container id {:?}: {:?}", id, e))?;
    let element = doc
        .select(&selector)
        .next()
        .ok_or_else(|| anyhow!("container #{} not found in page template", id))?;
    let tag = element.value().name().to_string();

    let close_at = find_close(source, &tag, id)?;
    Ok(Container {
        id: id.to_string(),
        close_at,
        appended: String::new(),
    })
}

/// Byte offset of the closing tag matching the first `<tag id=...>` that is
/// real markup. Comments, declarations and raw-text element bodies are
/// skipped; nested elements of the same name are balanced.
fn find_close(source: &str, tag: &str, id: &str) -> Result<usize> {
    // attribute values may contain '>'
    let token = Regex::new(
        r#"(?s)<!--.*?(?:-->|\z)|<![^>]*>|<\?[^>]*>|<(/?)([A-Za-z][A-Za-z0-9:-]*)((?:[^>"']|"[^"]*"|'[^']*')*)>"#,
    )?;
    let attr = Regex::new(
        r#"([^\s"'>/=]+)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+)))?"#,
    )?;

    let mut depth = 0usize;
    let mut pos = 0;
    while let Some(caps) = token.captures_at(source, pos) {
        let whole = caps.get(0).map(|m| (m.start(), m.end())).unwrap_or_default();
        pos = whole.1;
        let Some(name) = caps.get(2) else {
            continue;
        };
        let name = name.as_str().to_ascii_lowercase();
        let closing = caps.get(1).map_or(false, |m| !m.is_empty());
        let attrs = caps.get(3).map_or("", |m| m.as_str());
        let self_closing = attrs.trim_end().ends_with('/');

        if depth > 0 && name == tag {
            if closing {
                depth -= 1;
                if depth == 0 {
                    return Ok(whole.0);
                }
            } else if !self_closing {
                depth += 1;
            }
        } else if depth == 0 && !closing && name == tag {
            let matches_id = attr
                .captures_iter(attrs)
                .find(|c| c[1].eq_ignore_ascii_case("id"))
                .and_then(|c| c.get(2).or_else(|| c.get(3)).or_else(|| c.get(4)))
                .map_or(false, |v| v.as_str() == id);
            if matches_id {
                if self_closing {
                    bail!("container #{} is self-closing", id);
                }
                depth = 1;
                continue;
            }
        }

        if !closing && RAW_TEXT.contains(&name.as_str()) {
            let end_tag = Regex::new(&format!(r"(?i)</{}[\s>/]", regex::escape(&name)))?;
            match end_tag.find_at(source, pos) {
                Some(m) => pos = m.start(),
                None => break,
            }
        }
    }

    if depth > 0 {
        bail!("container #{} needs an explicit </{}> closing tag", id, tag);
    }
    bail!("container #{} has no <{}> opening tag in the source", id, tag)
}
