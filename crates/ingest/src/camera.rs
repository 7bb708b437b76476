//! Camera model resolution.
//!
//! Sources are consulted in order: the keyed record's explicit
//! `camera_make`/`camera_model`, metadata `Make`/`Model` at the top level,
//! the same pair under `data`, and finally the filename conventions of
//! common devices.
use once_cell::sync::Lazy;
use regex::Regex;

use crate::fields;
use crate::metadata::Metadata;

/// Model strings that carry no information.
const PLACEHOLDERS: [&str; 6] = ["", "unknown", "unknown camera", "n/a", "none", "-"];

/// Filename conventions, most specific first.
const FILENAME_PATTERNS: [(&str, &str); 14] = [
    (r"^PXL_\d{8}_\d+", "Google Pixel"),
    (r"^IMG-\d{8}-WA\d+", "WhatsApp (smartphone)"),
    (r"^DJI_\d+", "DJI drone"),
    (r"^(GOPR|GP\d{2}|GH\d{2}|GX\d{2})\d+", "GoPro"),
    (r"^DSCN\d+", "Nikon Coolpix"),
    (r"^DSCF\d+", "Fujifilm"),
    (r"^_?DSC_\d+", "Nikon DSLR"),
    (r"^_?DSC\d{4,}", "Sony"),
    (r"^_MG_\d+", "Canon EOS"),
    (r"^IMG_\d{8}_\d{6}", "Android smartphone"),
    (r"^IMG_\d+", "Canon or iPhone"),
    (r"^P\d{7}", "Panasonic / Olympus"),
    (r"^SAM_\d+", "Samsung"),
    (r"^\d{8}[_-]?\d{6}", "Smartphone"),
];

static FILENAME_RULES: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    FILENAME_PATTERNS
        .iter()
        .map(|(pattern, label)| {
            let regex = Regex::new(&format!("(?i){pattern}")).expect("camera filename pattern");
            (regex, *label)
        })
        .collect()
});

/// Explicit make/model pair from a keyed record.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct CameraHint<'a> {
    pub(crate) make: Option<&'a serde_json::Value>,
    pub(crate) model: Option<&'a serde_json::Value>,
}

/// Resolves the camera model for a record.
pub(crate) fn resolve(hint: CameraHint<'_>, metadata: Option<&Metadata>, filename: &str) -> Option<String> {
    compose(hint.make, hint.model)
        .or_else(|| metadata.and_then(|m| compose(m.get("Make"), m.get("Model"))))
        .or_else(|| {
            let data = metadata?.get("data")?.as_object()?;
            compose(data.get("Make"), data.get("Model"))
        })
        .or_else(|| from_filename(filename).map(str::to_string))
}

/// `"{make} {model}"`, or just the model when it already names the make.
///
/// A make without a model is not a camera model.
fn compose(make: Option<&serde_json::Value>, model: Option<&serde_json::Value>) -> Option<String> {
    let model = clean(model)?;
    match clean(make) {
        Some(make) if !model.to_lowercase().starts_with(&make.to_lowercase()) => {
            Some(format!("{make} {model}"))
        }
        _ => Some(model),
    }
}

fn clean(value: Option<&serde_json::Value>) -> Option<String> {
    let text = fields::sanitize_optional_string(fields::text(value), true)?;
    let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
    (!PLACEHOLDERS.contains(&text.to_lowercase().as_str())).then_some(text)
}

/// Guesses a device from its filename convention.
pub(crate) fn from_filename(filename: &str) -> Option<&'static str> {
    let name = filename.trim();
    let name = match name.get(..5) {
        Some(prefix) if prefix.eq_ignore_ascii_case("file:") => &name[5..],
        _ => name,
    };
    let name = name.replace(' ', "_");
    FILENAME_RULES
        .iter()
        .find(|(regex, _)| regex.is_match(&name))
        .map(|(_, label)| *label)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn all_patterns_compile() {
        assert_eq!(FILENAME_RULES.len(), FILENAME_PATTERNS.len());
    }

    #[test]
    fn filename_conventions() {
        let cases = [
            ("PXL_20240101_123456789.jpg", Some("Google Pixel")),
            ("IMG-20240101-WA0003.jpg", Some("WhatsApp (smartphone)")),
            ("DJI_0042.JPG", Some("DJI drone")),
            ("GOPR0123.JPG", Some("GoPro")),
            ("GX010045.MP4", Some("GoPro")),
            ("DSCN1234.JPG", Some("Nikon Coolpix")),
            ("DSCF0001.jpg", Some("Fujifilm")),
            ("DSC_0001.JPG", Some("Nikon DSLR")),
            ("_DSC_0001.JPG", Some("Nikon DSLR")),
            ("DSC01234.JPG", Some("Sony")),
            ("_MG_1234.CR2", Some("Canon EOS")),
            ("IMG_20240101_101010.jpg", Some("Android smartphone")),
            ("IMG_1234.JPG", Some("Canon or iPhone")),
            ("P1010001.JPG", Some("Panasonic / Olympus")),
            ("SAM_0001.JPG", Some("Samsung")),
            ("20240101_101010.jpg", Some("Smartphone")),
            ("Taj Mahal at dusk.jpg", None),
        ];
        for (filename, expected) in cases {
            assert_eq!(from_filename(filename), expected, "{filename}");
        }
    }

    #[test]
    fn filename_normalization() {
        assert_eq!(from_filename("File:img 1234.jpg"), Some("Canon or iPhone"));
        assert_eq!(from_filename("  dsc_0001.jpg "), Some("Nikon DSLR"));
    }

    #[test]
    fn make_prefix_not_duplicated() {
        assert_eq!(
            compose(Some(&json!("Canon")), Some(&json!("Canon EOS 80D"))),
            Some("Canon EOS 80D".into())
        );
        assert_eq!(
            compose(Some(&json!("NIKON CORPORATION")), Some(&json!("NIKON D750"))),
            Some("NIKON CORPORATION NIKON D750".into())
        );
        assert_eq!(
            compose(Some(&json!("Apple")), Some(&json!("iPhone 13"))),
            Some("Apple iPhone 13".into())
        );
        assert_eq!(compose(Some(&json!("Apple")), None), None);
    }

    #[test]
    fn placeholders_fall_through() {
        let metadata = json!({"Model": "Unknown", "data": {"Model": "X-T4", "Make": "FUJIFILM"}});
        let metadata = metadata.as_object().cloned();
        assert_eq!(
            resolve(CameraHint::default(), metadata.as_ref(), "DSC_1.jpg"),
            Some("FUJIFILM X-T4".into())
        );

        let hint_value = json!("n/a");
        let hint = CameraHint {
            make: None,
            model: Some(&hint_value),
        };
        assert_eq!(resolve(hint, None, "DSC_1.jpg"), Some("Nikon DSLR".into()));
    }

    #[test]
    fn explicit_hint_wins() {
        let make = json!("Canon");
        let model = json!("EOS R5");
        let hint = CameraHint {
            make: Some(&make),
            model: Some(&model),
        };
        let metadata = json!({"Model": "Other"}).as_object().cloned();
        assert_eq!(
            resolve(hint, metadata.as_ref(), "PXL_20240101_1.jpg"),
            Some("Canon EOS R5".into())
        );
    }

    #[test]
    fn nothing_matches() {
        assert_eq!(resolve(CameraHint::default(), None, "Map of India.svg"), None);
    }
}
