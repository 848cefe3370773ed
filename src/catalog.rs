//! The variant catalog: the fixed, ordered list of sizes every upload gets.
//!
//! | name | width | height | fit | quality |
//! |---|---|---|---|---|
//! | `thumbnail` | 400 | auto | preserve-aspect | 85 |
//! | `thumbnail_small` | 200 | auto | preserve-aspect | 85 |
//! | `webcomic_page` | 800 | auto | preserve-aspect | 90 |
//! | `webcomic_mobile` | 400 | auto | preserve-aspect | 85 |
//! | `cover_image` | 600 | 800 | crop-to-fill | 85 |
//! | `social_preview` | 1200 | 630 | crop-to-fill | 85 |
//! | `avatar` | 200 | 200 | crop-to-fill | 85 |
//!
//! Names are the keys of the persisted metadata map, so they must stay
//! stable. Order only decides the order variants are reported in.

use crate::imaging::{FitPolicy, Quality, ResizeTarget};
use serde::Serialize;

/// One named size in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VariantSpec {
    pub name: &'static str,
    pub width: u32,
    /// `None` derives the height from the source aspect ratio.
    pub height: Option<u32>,
    pub fit: FitPolicy,
    /// `None` falls back to the configured default quality.
    pub quality: Option<Quality>,
}

impl VariantSpec {
    pub fn target(&self) -> ResizeTarget {
        ResizeTarget::new(self.width, self.height, self.fit)
    }
}

const fn spec(
    name: &'static str,
    width: u32,
    height: Option<u32>,
    fit: FitPolicy,
    quality: u32,
) -> VariantSpec {
    VariantSpec {
        name,
        width,
        height,
        fit,
        quality: Some(Quality(quality)),
    }
}

/// The production catalog.
pub const CATALOG: &[VariantSpec] = &[
    spec("thumbnail", 400, None, FitPolicy::PreserveAspect, 85),
    spec("thumbnail_small", 200, None, FitPolicy::PreserveAspect, 85),
    spec("webcomic_page", 800, None, FitPolicy::PreserveAspect, 90),
    spec("webcomic_mobile", 400, None, FitPolicy::PreserveAspect, 85),
    spec("cover_image", 600, Some(800), FitPolicy::CropToFill, 85),
    spec("social_preview", 1200, Some(630), FitPolicy::CropToFill, 85),
    spec("avatar", 200, Some(200), FitPolicy::CropToFill, 85),
];

/// Look up a spec by name.
pub fn find(name: &str) -> Option<&'static VariantSpec> {
    CATALOG.iter().find(|s| s.name == name)
}

/// Catalog names in generation order.
pub fn names() -> impl Iterator<Item = &'static str> {
    CATALOG.iter().map(|s| s.name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn catalog_names_are_unique() {
        let unique: HashSet<&str> = names().collect();
        assert_eq!(unique.len(), CATALOG.len());
    }

    #[test]
    fn catalog_order_is_stable() {
        let ordered: Vec<&str> = names().collect();
        assert_eq!(
            ordered,
            vec![
                "thumbnail",
                "thumbnail_small",
                "webcomic_page",
                "webcomic_mobile",
                "cover_image",
                "social_preview",
                "avatar",
            ]
        );
    }

    #[test]
    fn cover_entries_have_fixed_boxes() {
        for spec in CATALOG.iter().filter(|s| s.fit == FitPolicy::CropToFill) {
            assert!(spec.height.is_some(), "{} needs a height", spec.name);
        }
        assert_eq!(find("social_preview").unwrap().height, Some(630));
        assert_eq!(find("avatar").unwrap().target().width, 200);
    }

    #[test]
    fn auto_height_entries_preserve_aspect() {
        for name in ["thumbnail", "thumbnail_small", "webcomic_page", "webcomic_mobile"] {
            let spec = find(name).unwrap();
            assert_eq!(spec.height, None);
            assert_eq!(spec.fit, FitPolicy::PreserveAspect);
        }
    }

    #[test]
    fn webcomic_page_uses_higher_quality() {
        assert_eq!(find("webcomic_page").unwrap().quality, Some(Quality(90)));
        assert_eq!(find("thumbnail").unwrap().quality, Some(Quality(85)));
    }

    #[test]
    fn unknown_name_is_none() {
        assert!(find("banner").is_none());
    }
}
