use httpmock::prelude::*;
use rust_xlsxwriter::{Format, Workbook as XlsxWorkbook};
use std::fs;
use std::net::TcpListener;

use excel_html::display::{Selector, Sink, set_inner_html};
use excel_html::excel;
use excel_html::fetch::{AsyncFetcher, Fetcher, Source};
use excel_html::html::to_html_table;
use excel_html::json_export::sheet_to_records;
use excel_html::loader::{async_load, sync_load};

const EMPTY_TABLE: &str = "<table><thead></thead><tbody></tbody></table>";

fn sample_workbook() -> Vec<u8> {
    let mut workbook = XlsxWorkbook::new();

    let data = workbook.add_worksheet();
    data.set_name("Data").unwrap();
    data.write_string(0, 0, "Item").unwrap();
    data.write_string(0, 1, "Qty").unwrap();
    data.write_string(1, 0, "Apple").unwrap();
    data.write_number(1, 1, 3.0).unwrap();
    data.write_string(2, 0, "Pear").unwrap();
    data.write_number(2, 1, 1.5).unwrap();

    let notes = workbook.add_worksheet();
    notes.set_name("Notes").unwrap();
    notes.write_string(0, 0, "n/a").unwrap();

    workbook.save_to_buffer().unwrap()
}

const SAMPLE_TABLE: &str = "<table><thead><tr><th>Item</th><th>Qty</th></tr></thead>\
<tbody><tr><td>Apple</td><td>3.0</td></tr><tr><td>Pear</td><td>1.5</td></tr></tbody></table>";

#[test]
fn test_extract_named_sheet() {
    let (workbook, sheet) = excel::extract(&sample_workbook(), Some("Data")).unwrap();

    assert_eq!(workbook.sheet_names(), vec!["Data", "Notes"]);
    let sheet = sheet.unwrap();
    assert_eq!((sheet.nrows, sheet.ncols), (3, 2));
    assert_eq!(to_html_table(Some(&sheet)), SAMPLE_TABLE);
}

#[test]
fn test_extract_unknown_sheet_is_none() {
    let (workbook, sheet) = excel::extract(&sample_workbook(), Some("Missing")).unwrap();

    assert_eq!(workbook.len(), 2);
    assert!(sheet.is_none());
    assert_eq!(to_html_table(sheet.as_ref()), EMPTY_TABLE);
}

#[test]
fn test_extract_without_name_has_no_sheet() {
    let (workbook, sheet) = excel::extract(&sample_workbook(), None).unwrap();
    assert_eq!(workbook.len(), 2);
    assert!(sheet.is_none());
    assert_eq!(to_html_table(sheet.as_ref()), EMPTY_TABLE);
}

fn typed_workbook() -> Vec<u8> {
    let mut workbook = XlsxWorkbook::new();
    let date_format = Format::new().set_num_format("yyyy-mm-dd");

    let data = workbook.add_worksheet();
    data.set_name("Data").unwrap();
    data.write_string(0, 0, "When").unwrap();
    data.write_string(0, 1, "Done").unwrap();
    data.write_string(0, 2, "Note").unwrap();
    data.write_number_with_format(1, 0, 45292.0, &date_format).unwrap();
    data.write_boolean(1, 1, true).unwrap();
    data.write_string(1, 2, "<b>Tom & Jerry</b>").unwrap();
    data.write_number_with_format(2, 0, 1e300, &date_format).unwrap();
    data.write_boolean(2, 1, false).unwrap();

    workbook.save_to_buffer().unwrap()
}

#[test]
fn test_dates_and_booleans_render_raw_values() {
    let (_, sheet) = excel::extract(&typed_workbook(), Some("Data")).unwrap();
    let html = to_html_table(sheet.as_ref());

    assert!(html.contains("<tr><td>45292.0</td><td>1</td>"));
    assert!(html.contains("<tr><td>1e+300</td><td>0</td><td></td></tr>"));
}

#[test]
fn test_cell_text_from_workbook_is_escaped() {
    let (_, sheet) = excel::extract(&typed_workbook(), Some("Data")).unwrap();
    let html = to_html_table(sheet.as_ref());

    assert!(html.contains("<td>&lt;b&gt;Tom &amp; Jerry&lt;/b&gt;</td>"));
    assert!(!html.contains("<b>Tom"));
}

#[test]
fn test_json_export_converts_dates_and_booleans() {
    let (_, sheet) = excel::extract(&typed_workbook(), Some("Data")).unwrap();
    let records = sheet_to_records(&sheet.unwrap());

    assert_eq!(records[0]["When"], "2024-01-01");
    assert_eq!(records[0]["Done"], true);
    assert_eq!(records[1]["When"], "1e+300");
    assert_eq!(records[1]["Done"], false);
}

#[test]
fn test_sheet_starting_after_a1_keeps_absolute_positions() {
    let mut workbook = XlsxWorkbook::new();
    let data = workbook.add_worksheet();
    data.set_name("Data").unwrap();
    data.write_string(2, 2, "h").unwrap();
    data.write_number(3, 3, 5.0).unwrap();
    let bytes = workbook.save_to_buffer().unwrap();

    let (_, sheet) = excel::extract(&bytes, Some("Data")).unwrap();
    let sheet = sheet.unwrap();
    assert_eq!((sheet.nrows, sheet.ncols), (4, 4));

    let empty_row = "<tr><td></td><td></td><td></td><td></td></tr>";
    let expected = format!(
        "<table><thead><tr><th></th><th></th><th></th><th></th></tr></thead>\
         <tbody>{}<tr><td></td><td></td><td>h</td><td></td></tr>\
         <tr><td></td><td></td><td></td><td>5.0</td></tr></tbody></table>",
        empty_row
    );
    assert_eq!(to_html_table(Some(&sheet)), expected);
}

#[test]
fn test_open_workbook_from_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("book.xlsx");
    fs::write(&path, sample_workbook()).unwrap();

    let workbook = excel::open_workbook(&path).unwrap();
    let records = sheet_to_records(workbook.sheet_by_name("Data").unwrap());
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["Item"], "Apple");
    assert_eq!(records[0]["Qty"], 3);
}

// Port of a listener that has already been closed
fn closed_port_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}/sample_workbook.xls", port)
}

#[test]
fn test_sync_load_over_http() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/sample_workbook.xlsx");
        then.status(200).body(sample_workbook());
    });

    let fetcher = Fetcher::new().unwrap();
    let source = Source::parse(&server.url("/sample_workbook.xlsx"));
    let loaded = sync_load(&fetcher, &source, Some("Data")).unwrap().unwrap();

    mock.assert();
    assert_eq!(to_html_table(loaded.sheet.as_ref()), SAMPLE_TABLE);
}

#[test]
fn test_sync_load_non_ok_status_is_none() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/missing.xls");
        then.status(404);
    });

    let fetcher = Fetcher::new().unwrap();
    let source = Source::parse(&server.url("/missing.xls"));
    assert!(sync_load(&fetcher, &source, Some("Data")).unwrap().is_none());
}

#[test]
fn test_sync_load_garbage_body_is_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/broken.xls");
        then.status(200).body("not a workbook");
    });

    let fetcher = Fetcher::new().unwrap();
    let source = Source::parse(&server.url("/broken.xls"));
    assert!(sync_load(&fetcher, &source, Some("Data")).is_err());
}

#[tokio::test]
async fn test_async_load_over_http() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/sample_workbook.xlsx");
            then.status(200).body(sample_workbook());
        })
        .await;

    let fetcher = AsyncFetcher::new().unwrap();
    let source = Source::parse(&server.url("/sample_workbook.xlsx"));
    let loaded = async_load(&fetcher, &source, Some("Data"))
        .await
        .unwrap()
        .unwrap();

    mock.assert_async().await;
    assert_eq!(to_html_table(loaded.sheet.as_ref()), SAMPLE_TABLE);
}

#[tokio::test]
async fn test_async_load_non_ok_status_is_none() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/down.xls");
            then.status(503);
        })
        .await;

    let fetcher = AsyncFetcher::new().unwrap();
    let source = Source::parse(&server.url("/down.xls"));
    let loaded = async_load(&fetcher, &source, Some("Data")).await.unwrap();
    assert!(loaded.is_none());
}

#[tokio::test]
async fn test_async_load_connection_refused_is_error() {
    let fetcher = AsyncFetcher::new().unwrap();
    let source = Source::parse(&closed_port_url());

    let err = async_load(&fetcher, &source, Some("Data")).await.unwrap_err();
    assert!(err.to_string().contains("Request failed"));
}

#[test]
fn test_sync_load_connection_refused_is_error() {
    let fetcher = Fetcher::new().unwrap();
    let source = Source::parse(&closed_port_url());
    assert!(sync_load(&fetcher, &source, Some("Data")).is_err());
}

#[tokio::test]
async fn test_async_load_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("book.xlsx");
    fs::write(&path, sample_workbook()).unwrap();

    let fetcher = AsyncFetcher::new().unwrap();
    let loaded = async_load(&fetcher, &Source::Path(path), Some("Notes"))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(
        to_html_table(loaded.sheet.as_ref()),
        "<table><thead><tr><th>n/a</th></tr></thead><tbody></tbody></table>"
    );
}

#[test]
fn test_table_injected_into_page() {
    let dir = tempfile::tempdir().unwrap();
    let page = dir.path().join("index.html");
    let output = dir.path().join("rendered.html");
    fs::write(
        &page,
        "<html><body><h1>Stock</h1><div id=\"excel_table\"><p>Loading...</p></div></body></html>",
    )
    .unwrap();

    let (_, sheet) = excel::extract(&sample_workbook(), Some("Data")).unwrap();
    let sink = Sink::Page {
        page,
        selector: Selector::parse("#excel_table").unwrap(),
        output: Some(output.clone()),
    };
    sink.write(&to_html_table(sheet.as_ref())).unwrap();

    let expected = format!(
        "<html><body><h1>Stock</h1><div id=\"excel_table\">{}</div></body></html>",
        SAMPLE_TABLE
    );
    assert_eq!(fs::read_to_string(output).unwrap(), expected);
}

#[test]
fn test_injection_keeps_page_untouched_outside_target() {
    let page = "<div id=\"outcome\">1</div><div id=\"excel_table\"></div>";
    let selector = Selector::parse("#outcome").unwrap();
    let updated = set_inner_html(page, &selector, "<ul><li>4</li></ul>").unwrap();
    assert_eq!(
        updated,
        "<div id=\"outcome\"><ul><li>4</li></ul></div><div id=\"excel_table\"></div>"
    );
}
