use anyhow::Result;
use log::info;

use crate::excel::{self, Sheet, Workbook};
use crate::fetch::{AsyncFetcher, Fetcher, Source, read_source, read_source_async};

pub const DATA_URL: &str =
    "https://raw.githubusercontent.com/leriomaggio/pyscript-fetch-resources/main/sample_workbook.xls";
pub const DEFAULT_SHEET: &str = "Data";

#[derive(Debug, Clone)]
pub struct Loaded {
    pub workbook: Workbook,
    pub sheet: Option<Sheet>,
}

/// Fetch and decode `source`, blocking until the response arrives.
///
/// `Ok(None)` means the server answered with something other than 200.
pub fn sync_load(fetcher: &Fetcher, source: &Source, sheet_name: Option<&str>) -> Result<Option<Loaded>> {
    match read_source(fetcher, source)? {
        Some(content) => extract_loaded(source, &content, sheet_name).map(Some),
        None => Ok(None),
    }
}

pub async fn async_load(
    fetcher: &AsyncFetcher,
    source: &Source,
    sheet_name: Option<&str>,
) -> Result<Option<Loaded>> {
    match read_source_async(fetcher, source).await? {
        Some(content) => extract_loaded(source, &content, sheet_name).map(Some),
        None => Ok(None),
    }
}

fn extract_loaded(source: &Source, content: &[u8], sheet_name: Option<&str>) -> Result<Loaded> {
    let (workbook, sheet) = excel::extract(content, sheet_name)?;
    info!("Loaded {} sheet(s) from {}", workbook.len(), source);
    Ok(Loaded { workbook, sheet })
}
