use crate::domain::model::{AnchorPosition, ScoreRecord};
use crate::domain::ports::Storage;
use crate::utils::error::{EtlError, Result};
use std::path::Path;

/// Spreadsheet tools need the BOM to pick UTF-8 for CSV files.
pub const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

pub const CSV_HEADER: [&str; 16] = [
    "Name",
    "Tiange",
    "Renge",
    "Dige",
    "Waige",
    "Zongge",
    "Sancai",
    "Jichuyun",
    "Chenggongyun",
    "Shejiaoyun",
    "Rengeanshi",
    "Digeanshi",
    "Waigeanshi",
    "Zonggeanshi",
    "Zongping",
    "Score",
];

/// `result_童-` when the anchor leads, `result_-童` when it trails.
pub fn report_stem(anchor: &str, position: AnchorPosition) -> String {
    match position {
        AnchorPosition::First => format!("result_{}-", anchor),
        AnchorPosition::Second => format!("result_-{}", anchor),
    }
}

pub fn render_json(records: &[ScoreRecord]) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec_pretty(records)?)
}

pub fn render_csv(records: &[ScoreRecord]) -> Result<Vec<u8>> {
    let mut buffer = Vec::with_capacity(UTF8_BOM.len() + records.len() * 512);
    buffer.extend_from_slice(UTF8_BOM);

    let mut writer = csv::Writer::from_writer(buffer);
    writer.write_record(CSV_HEADER)?;
    for record in records {
        let score = record.score.to_string();
        writer.write_record([
            record.name.as_str(),
            record.tiange.as_str(),
            record.renge.as_str(),
            record.dige.as_str(),
            record.waige.as_str(),
            record.zongge.as_str(),
            record.sancai.as_str(),
            record.jichuyun.as_str(),
            record.chenggongyun.as_str(),
            record.shejiaoyun.as_str(),
            record.rengeanshi.as_str(),
            record.digeanshi.as_str(),
            record.waigeanshi.as_str(),
            record.zonggeanshi.as_str(),
            record.zongping.as_str(),
            score.as_str(),
        ])?;
    }

    writer
        .into_inner()
        .map_err(|e| EtlError::IoError(e.into_error()))
}

const STAGING_SUFFIX: &str = ".tmp";

/// Write both report files and return their paths.
///
/// Both files are staged under a temporary name first and only renamed into
/// place once every write succeeded, so a failed run leaves no report behind.
pub async fn write_reports<S: Storage>(
    storage: &S,
    output_dir: &str,
    stem: &str,
    records: &[ScoreRecord],
) -> Result<Vec<String>> {
    let json_path = Path::new(output_dir).join(format!("{}.json", stem));
    let csv_path = Path::new(output_dir).join(format!("{}.csv", stem));

    let reports = [(json_path, render_json(records)?), (csv_path, render_csv(records)?)];

    let mut staged: Vec<(String, String)> = Vec::with_capacity(reports.len());
    for (path, data) in &reports {
        let path = path.to_string_lossy().to_string();
        let staging = format!("{}{}", path, STAGING_SUFFIX);
        tracing::debug!("Writing {} bytes to {}", data.len(), staging);
        if let Err(e) = storage.write_file(&staging, data).await {
            discard(storage, &staged).await;
            return Err(e);
        }
        staged.push((staging, path));
    }

    let mut written = Vec::with_capacity(staged.len());
    for (staging, path) in &staged {
        storage.rename_file(staging, path).await?;
        written.push(path.clone());
    }

    Ok(written)
}

async fn discard<S: Storage>(storage: &S, staged: &[(String, String)]) {
    for (staging, _) in staged {
        if let Err(e) = storage.remove_file(staging).await {
            tracing::warn!("Could not remove staged report {}: {}", staging, e);
        }
    }
}
