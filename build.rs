use time::format_description::well_known::Iso8601;
use time::OffsetDateTime;

/// Stamp `ply-cli --version` with the build date and time (UTC).
///
/// `SOURCE_DATE_EPOCH` pins the stamp for reproducible builds.
fn main() {
    let built = std::env::var("SOURCE_DATE_EPOCH")
        .ok()
        .and_then(|secs| secs.trim().parse::<i64>().ok())
        .and_then(|secs| OffsetDateTime::from_unix_timestamp(secs).ok())
        .unwrap_or_else(OffsetDateTime::now_utc);

    let stamp = built.format(&Iso8601::DEFAULT).unwrap_or_else(|_| "unknown".to_string());
    let (date, time) = stamp.split_once('T').unwrap_or((stamp.as_str(), ""));
    let time = time.split('.').next().unwrap_or_default();

    println!("cargo:rustc-env=PLY_BUILD_DATE={date}");
    println!("cargo:rustc-env=PLY_BUILD_TIME={time}");
    println!("cargo:rerun-if-env-changed=SOURCE_DATE_EPOCH");
}
