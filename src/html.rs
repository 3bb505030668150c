use crate::excel::{Cell, Sheet};
use crate::utils::helpers::escape_html;

pub const TABLE_TAG: &str = "<table><thead>{header}</thead><tbody>{body}</tbody></table>";

const HEADER_PLACEHOLDER: &str = "{header}";
const BODY_PLACEHOLDER: &str = "{body}";

/// Render `sheet` as an HTML table using [`TABLE_TAG`].
///
/// Row 0 becomes the `<thead>` row, every other row a `<tbody>` row. A missing
/// sheet renders as a table with empty head and body.
pub fn to_html_table(sheet: Option<&Sheet>) -> String {
    to_html_table_with(sheet, TABLE_TAG)
}

/// Same as [`to_html_table`] with a caller supplied outer template.
///
/// `{header}` and `{body}` in the template are replaced by the rendered rows.
pub fn to_html_table_with(sheet: Option<&Sheet>, template: &str) -> String {
    let (thead, tbody) = match sheet {
        Some(sheet) => (render_header(sheet), render_body(sheet)),
        None => (String::new(), String::new()),
    };

    // Single pass so placeholder text inside cells is never substituted
    let mut output = String::with_capacity(template.len() + thead.len() + tbody.len());
    let mut rest = template;

    while let Some(pos) = rest.find('{') {
        output.push_str(&rest[..pos]);
        let tail = &rest[pos..];

        if tail.starts_with(HEADER_PLACEHOLDER) {
            output.push_str(&thead);
            rest = &tail[HEADER_PLACEHOLDER.len()..];
        } else if tail.starts_with(BODY_PLACEHOLDER) {
            output.push_str(&tbody);
            rest = &tail[BODY_PLACEHOLDER.len()..];
        } else {
            output.push('{');
            rest = &tail[1..];
        }
    }
    output.push_str(rest);

    output
}

fn render_header(sheet: &Sheet) -> String {
    match sheet.header() {
        Some(row) => render_row(row, sheet.ncols, "th"),
        None => String::new(),
    }
}

fn render_body(sheet: &Sheet) -> String {
    sheet
        .body_rows()
        .map(|row| render_row(row, sheet.ncols, "td"))
        .collect()
}

fn render_row(row: &[Cell], ncols: usize, tag: &str) -> String {
    let mut html = String::from("<tr>");

    for cx in 0..ncols {
        let value = row.get(cx).map(|cell| cell.value.as_str()).unwrap_or("");
        html.push('<');
        html.push_str(tag);
        html.push('>');
        html.push_str(&escape_html(value));
        html.push_str("</");
        html.push_str(tag);
        html.push('>');
    }

    html.push_str("</tr>");
    html
}
