use ingest::{normalize_payload, IngestConfig, RawPayload};
use serde_json::json;

fn main() {
    let document = json!({
        "rows": [
            [101, "Birds", "DSC_0001.jpg", "20240115", "20240115103000", "2500000",
             r#"a:2:{s:11:"GPSLatitude";d:12.5;s:12:"GPSLongitude";d:77.25;}"#, "Alice"],
            [102, "Birds", "IMG-20240116-WA0003.jpg", "20240116", "20240116081500", 800000,
             "", "Bob\n"],
            ["oops", null, "", "2024-99-99"]
        ],
        "cached": true,
        "cache_age": 42
    });

    let config = IngestConfig::default();
    let payload = match RawPayload::from_value(document, &config) {
        Ok(payload) => payload,
        Err(err) => {
            eprintln!("payload rejected: {err}");
            return;
        }
    };

    for record in normalize_payload(&payload, &config) {
        println!("{record:#?}");
    }
}
