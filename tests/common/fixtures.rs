//! Report fixtures and configuration builders

use flate2::Compression;
use flate2::write::GzEncoder;
use report_sync::Config;
use std::io::Write;
use std::path::Path;

/// Prefix used by every synthetic listing
pub const TEST_PREFIX: &str = "reports/cost-csv";

/// Gzip-compress `data`
pub fn gzip(data: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).expect("gzip write failed");
    encoder.finish().expect("gzip finish failed")
}

/// Deterministic CSV body for report number `n`
pub fn report_csv(n: usize) -> String {
    format!(
        "lineItem/referenceNo,product/service,cost/myCost\n{n:08},COMPUTE,{}.{:02}\n",
        n * 3,
        n % 100
    )
}

/// Object name for report number `n`
pub fn report_object_name(n: usize) -> String {
    format!("{TEST_PREFIX}/{n:010}.csv.gz")
}

/// Local file name the worker derives for report number `n`
pub fn report_file_name(n: usize) -> String {
    format!("{n:010}.csv")
}

/// Valid configuration writing into `dest` with `workers` slots
pub fn test_config(dest: &Path, workers: usize) -> Config {
    let mut config = Config::default();
    config.store.bucket = "ocid1.tenancy.oc1..test".to_string();
    config.store.prefix = TEST_PREFIX.to_string();
    config.download.destination_dir = dest.to_path_buf();
    config.download.max_concurrent_downloads = workers;
    config
}
