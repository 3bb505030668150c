use anyhow::{Context, Result, bail};
use log::{debug, info};
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::str::FromStr;

pub const DEFAULT_TARGET: &str = "#excel_table";

/// An `#id` query selector, the only kind a host page is addressed with.
#[derive(Debug, Clone, PartialEq)]
pub struct Selector {
    id: String,
}

impl Selector {
    pub fn parse(s: &str) -> Result<Self> {
        let Some(id) = s.trim().strip_prefix('#') else {
            bail!("Unsupported selector {:?}: only #id selectors are supported", s);
        };

        if id.is_empty() || id.chars().any(|c| c.is_whitespace() || "#.[]>:,\"'".contains(c)) {
            bail!("Invalid id selector: {:?}", s);
        }

        Ok(Self { id: id.to_string() })
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

impl FromStr for Selector {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Replace the content of the element matching `selector` with `fragment`.
///
/// Works on the page text directly: the element's opening tag and its
/// balancing closing tag are kept, everything between them is replaced.
pub fn set_inner_html(page: &str, selector: &Selector, fragment: &str) -> Result<String> {
    // ASCII lowercasing keeps byte offsets aligned with `page`
    let lower = page.to_ascii_lowercase();

    let tag = find_element(page, &lower, selector.id())
        .with_context(|| format!("No element matches #{}", selector.id()))?;

    let name = match &tag.kind {
        TagKind::Open(name) => name.clone(),
        TagKind::SelfClosing(_) => {
            bail!("Element #{} is self-closing and has no content", selector.id())
        }
        TagKind::Close(_) => bail!("No element matches #{}", selector.id()),
    };

    let content_start = tag.end;
    let content_end = find_closing_tag(&lower, &name, content_start)
        .with_context(|| format!("No closing </{}> for #{}", name, selector.id()))?;

    debug!(
        "Replacing {} bytes inside <{} id=\"{}\">",
        content_end - content_start,
        name,
        selector.id()
    );

    let mut output = String::with_capacity(page.len() - (content_end - content_start) + fragment.len());
    output.push_str(&page[..content_start]);
    output.push_str(fragment);
    output.push_str(&page[content_end..]);

    Ok(output)
}

// Elements whose content is text, never markup
const RAW_TEXT_ELEMENTS: [&str; 4] = ["script", "style", "textarea", "title"];

#[derive(Debug, PartialEq)]
enum TagKind {
    Open(String),
    SelfClosing(String),
    Close(String),
}

#[derive(Debug)]
struct Tag {
    start: usize,
    end: usize,
    kind: TagKind,
}

// Next element tag at or after `from`; comments, doctypes and stray '<' are skipped
fn next_tag(lower: &str, from: usize) -> Option<Tag> {
    let mut pos = from;

    while let Some(offset) = lower[pos..].find('<') {
        let start = pos + offset;
        let rest = &lower[start..];

        if rest.starts_with("<!--") {
            pos = start + rest.find("-->")? + 3;
            continue;
        }

        match rest.as_bytes().get(1) {
            Some(b'/') => {
                let name = tag_name(&rest[2..]);
                if name.is_empty() {
                    pos = start + 1;
                    continue;
                }
                let end = start + rest.find('>')? + 1;
                return Some(Tag {
                    start,
                    end,
                    kind: TagKind::Close(name),
                });
            }
            Some(b) if b.is_ascii_alphabetic() => {
                let name = tag_name(&rest[1..]);
                match find_tag_end(lower, start + 1 + name.len()) {
                    Some(end) => {
                        let kind = if lower[..end].ends_with("/>") {
                            TagKind::SelfClosing(name)
                        } else {
                            TagKind::Open(name)
                        };
                        return Some(Tag { start, end, kind });
                    }
                    None => pos = start + 1,
                }
            }
            Some(b'!') | Some(b'?') => pos = start + rest.find('>')? + 1,
            _ => pos = start + 1,
        }
    }

    None
}

// Where scanning resumes after `tag`: past the text content of script-like elements
fn resume_after(lower: &str, tag: &Tag) -> usize {
    match &tag.kind {
        TagKind::Open(name) if RAW_TEXT_ELEMENTS.contains(&name.as_str()) => {
            let close = format!("</{}", name);
            lower[tag.end..]
                .find(&close)
                .map_or(lower.len(), |offset| tag.end + offset)
        }
        _ => tag.end,
    }
}

// Opening tag of the element whose id attribute equals `id` exactly
fn find_element(page: &str, lower: &str, id: &str) -> Option<Tag> {
    let mut pos = 0;

    while let Some(tag) = next_tag(lower, pos) {
        if matches!(tag.kind, TagKind::Open(_) | TagKind::SelfClosing(_))
            && has_id(&page[tag.start..tag.end], &lower[tag.start..tag.end], id)
        {
            return Some(tag);
        }
        pos = resume_after(lower, &tag);
    }

    None
}

fn tag_name(rest: &str) -> String {
    rest.chars()
        .take_while(|c| c.is_ascii_alphanumeric() || *c == '-')
        .collect()
}

// Attribute names are case-insensitive, id values are not
fn has_id(tag: &str, lower_tag: &str, id: &str) -> bool {
    lower_tag.match_indices("id=").any(|(pos, _)| {
        let after_space = lower_tag[..pos]
            .chars()
            .next_back()
            .is_some_and(char::is_whitespace);
        after_space && attribute_value(&tag[pos + 3..]) == Some(id)
    })
}

fn attribute_value(rest: &str) -> Option<&str> {
    match rest.chars().next()? {
        quote @ ('"' | '\'') => {
            let inner = &rest[1..];
            inner.find(quote).map(|end| &inner[..end])
        }
        _ => rest
            .split(|c: char| c.is_whitespace() || c == '>')
            .next()
            .map(|value| value.trim_end_matches('/')),
    }
}

// Index just past the '>' ending a tag whose attributes start at `from`
fn find_tag_end(lower: &str, from: usize) -> Option<usize> {
    let mut quote: Option<char> = None;
    let mut after_equals = false;

    for (i, c) in lower[from..].char_indices() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None => match c {
                '"' | '\'' if after_equals => quote = Some(c),
                '>' => return Some(from + i + 1),
                '=' => {
                    after_equals = true;
                    continue;
                }
                c if c.is_whitespace() => continue,
                _ => {}
            },
        }
        after_equals = false;
    }

    None
}

fn find_closing_tag(lower: &str, name: &str, from: usize) -> Option<usize> {
    let mut depth = 1usize;
    let mut pos = from;

    if RAW_TEXT_ELEMENTS.contains(&name) {
        let close = format!("</{}", name);
        return lower[from..].find(&close).map(|offset| from + offset);
    }

    while let Some(tag) = next_tag(lower, pos) {
        match &tag.kind {
            TagKind::Open(n) if n == name => depth += 1,
            TagKind::Close(n) if n == name => {
                depth -= 1;
                if depth == 0 {
                    return Some(tag.start);
                }
            }
            _ => {}
        }
        pos = resume_after(lower, &tag);
    }

    None
}

/// Final destination of a rendered fragment.
#[derive(Debug, Clone)]
pub enum Sink {
    Stdout,
    File(PathBuf),
    Page {
        page: PathBuf,
        selector: Selector,
        output: Option<PathBuf>,
    },
}

impl Sink {
    pub fn write(&self, fragment: &str) -> Result<()> {
        match self {
            Sink::Stdout => {
                let mut stdout = std::io::stdout().lock();
                writeln!(stdout, "{}", fragment).context("Failed to write to stdout")?;
            }
            Sink::File(path) => {
                fs::write(path, fragment)
                    .with_context(|| format!("Failed to write to file: {}", path.display()))?;
                info!("Wrote {} bytes to {}", fragment.len(), path.display());
            }
            Sink::Page {
                page,
                selector,
                output,
            } => {
                let html = fs::read_to_string(page)
                    .with_context(|| format!("Failed to read page: {}", page.display()))?;
                let updated = set_inner_html(&html, selector, fragment)?;

                match output {
                    Some(path) => Sink::File(path.clone()).write(&updated)?,
                    None => Sink::Stdout.write(&updated)?,
                }
            }
        }

        Ok(())
    }
}
